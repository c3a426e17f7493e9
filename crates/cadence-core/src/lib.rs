//! # Cadence Core
//!
//! The domain layer of the Cadence post scheduler: slot allocation, the
//! publish state machine, and the ports they run against.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod schedule;
pub mod services;

pub use error::{DomainError, RepoError};
