//! Platform connection check.

use actix_web::{HttpResponse, web};

use cadence_shared::dto::AccountResponse;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/platform/account - verify the configured credentials.
pub async fn account(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let account = state.platform.account().await?;
    Ok(HttpResponse::Ok().json(AccountResponse {
        connected: true,
        id: account.id,
        username: account.username,
        name: account.name,
    }))
}
