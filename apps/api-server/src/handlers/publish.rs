//! Publish sweep trigger.

use actix_web::{HttpResponse, web};

use cadence_core::services::SweepReport;
use cadence_shared::dto::{SweepResponse, SweepResultItem};

use crate::middleware::cron_auth::CronAuth;
use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(crate) fn sweep_response(report: SweepReport) -> SweepResponse {
    SweepResponse {
        processed_count: report.processed_count,
        results: report
            .results
            .into_iter()
            .map(|r| SweepResultItem {
                id: r.id,
                status: r.status.to_string(),
                platform_post_id: r.platform_post_id,
                error: r.error,
            })
            .collect(),
    }
}

/// GET|POST /api/publish, GET /api/cron/publish - publish every due post.
pub async fn sweep(_auth: CronAuth, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let report = state.publisher.sweep().await?;
    Ok(HttpResponse::Ok().json(sweep_response(report)))
}
