//! Schedule preview.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use cadence_shared::dto::PreviewResponse;

use crate::middleware::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    7
}

/// GET /api/schedule/preview?count=N - next N auto-allocation slots.
pub async fn preview(
    state: web::Data<AppState>,
    query: web::Query<PreviewQuery>,
) -> AppResult<HttpResponse> {
    let slots = state.scheduling.preview(query.count).await?;
    Ok(HttpResponse::Ok().json(PreviewResponse { slots }))
}
