//! Sweep trigger guard.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Proof that a request may trigger a publish sweep.
///
/// When a cron secret is configured the request must carry
/// `Authorization: Bearer <secret>`; otherwise every request passes.
#[derive(Debug, Clone, Copy)]
pub struct CronAuth;

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Compare without returning early on the first differing byte.
fn secrets_match(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

impl FromRequest for CronAuth {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState not found in app data");
            return ready(Err(AppError::Internal(
                "Server configuration error".to_string(),
            )));
        };

        let Some(expected) = state.cron_secret.as_deref() else {
            return ready(Ok(CronAuth));
        };

        match bearer(req) {
            Some(given) if secrets_match(given, expected) => ready(Ok(CronAuth)),
            _ => {
                tracing::warn!(path = %req.path(), "Rejected sweep trigger with bad credentials");
                ready(Err(AppError::Unauthorized))
            }
        }
    }
}
