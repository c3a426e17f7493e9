//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use cadence_core::domain::{Post, PostEdit};
use cadence_core::services::NewPostRequest;
use cadence_shared::ApiResponse;
use cadence_shared::dto::{CreatePostsRequest, CreatePostsResponse, PostResponse, UpdatePostRequest};

use crate::middleware::error::AppResult;
use crate::state::AppState;

pub(crate) fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        image_url: post.image_url,
        caption: post.caption,
        scheduled_at: post.scheduled_at,
        is_pinned: post.is_pinned,
        status: post.status.to_string(),
        published_at: post.published_at,
        platform_post_id: post.platform_post_id,
        error_message: post.error_message,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.scheduling.list_posts().await?;
    let body: Vec<PostResponse> = posts.into_iter().map(post_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/posts - create a batch; unpinned items are placed by the allocator.
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<CreatePostsRequest>,
) -> AppResult<HttpResponse> {
    let requests = body
        .into_inner()
        .posts
        .into_iter()
        .map(|item| NewPostRequest {
            image_url: item.image_url,
            caption: item.caption,
            scheduled_at: item.scheduled_at,
        })
        .collect();

    let created = state.scheduling.create_batch(requests).await?;
    Ok(HttpResponse::Created().json(CreatePostsResponse {
        created: created.len(),
        posts: created.into_iter().map(post_response).collect(),
    }))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, id: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.scheduling.get_post(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// PATCH /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let edit = PostEdit {
        caption: req.caption,
        scheduled_at: req.scheduled_at,
    };

    let post = state.scheduling.update_post(id.into_inner(), edit).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(state: web::Data<AppState>, id: web::Path<Uuid>) -> AppResult<HttpResponse> {
    state.scheduling.delete_post(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted")))
}

/// POST /api/posts/{id}/retry - requeue a failed post.
pub async fn retry(state: web::Data<AppState>, id: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.scheduling.retry_post(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}
