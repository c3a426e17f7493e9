//! Image upload and serving.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde::Deserialize;

use cadence_shared::dto::UploadResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub filename: Option<String>,
}

/// POST /api/upload?filename=... - raw image body, typed by `Content-Type`.
pub async fn upload(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    if body.is_empty() {
        return Err(AppError::BadRequest("No file provided".to_string()));
    }

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest(format!(
            "Expected an image, got {content_type}"
        )));
    }

    let filename = query.filename.as_deref().unwrap_or("upload.jpg");
    let size = body.len();
    let url = state
        .assets
        .upload(body.to_vec(), filename, content_type)
        .await?;

    tracing::info!(url = %url, size, "Image uploaded");
    Ok(HttpResponse::Created().json(UploadResponse { url }))
}

/// GET /uploads/{key} - serve a stored image.
pub async fn serve(state: web::Data<AppState>, key: web::Path<String>) -> AppResult<HttpResponse> {
    let asset = state.assets.read(&key).await?;
    Ok(HttpResponse::Ok()
        .content_type(asset.content_type)
        .body(asset.bytes))
}
