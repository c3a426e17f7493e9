//! Settings handlers.

use actix_web::{HttpResponse, web};

use cadence_core::domain::{Settings, SettingsPatch};
use cadence_shared::dto::{SettingsResponse, UpdateSettingsRequest};

use crate::middleware::error::AppResult;
use crate::state::AppState;

fn settings_response(settings: Settings) -> SettingsResponse {
    SettingsResponse {
        post_frequency: settings.post_frequency.to_string(),
        preferred_time: settings.preferred_time.to_string(),
        timezone: settings.timezone.name().to_string(),
    }
}

/// GET /api/settings
pub async fn get(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let settings = state.scheduling.settings().await?;
    Ok(HttpResponse::Ok().json(settings_response(settings)))
}

/// PATCH /api/settings - omitted fields keep their current value.
pub async fn update(
    state: web::Data<AppState>,
    body: web::Json<UpdateSettingsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let patch = SettingsPatch {
        post_frequency: req.post_frequency,
        preferred_time: req.preferred_time,
        timezone: req.timezone,
    };

    let settings = state.scheduling.update_settings(patch).await?;
    Ok(HttpResponse::Ok().json(settings_response(settings)))
}
