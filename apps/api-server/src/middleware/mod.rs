//! Middleware modules.

pub mod cron_auth;
pub mod error;
