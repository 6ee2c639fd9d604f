// src/handlers/comment_handlers.rs

use actix_web::{get, post, web, HttpResponse};

use crate::dtos::comment_dtos::CreateCommentIn;
use crate::errors::ApiError;
use crate::AppState;

fn required_post_id(path: web::Path<String>) -> Result<String, ApiError> {
    let post_id = path.into_inner();
    if post_id.trim().is_empty() {
        return Err(ApiError::BadRequest("postId is required".to_string()));
    }
    Ok(post_id)
}

/// GET /api/posts/{post_id}/comments
#[get("/posts/{post_id}/comments")]
pub async fn list_comments(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let post_id = required_post_id(path)?;
    let comments = app_state.comments.list_by_post(&post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /api/posts/{post_id}/comments
#[post("/posts/{post_id}/comments")]
pub async fn create_comment(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CreateCommentIn>,
) -> Result<HttpResponse, ApiError> {
    let post_id = required_post_id(path)?;
    let body = body.into_inner();

    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    if !present(&body.content) || !present(&body.user_id) {
        return Err(ApiError::BadRequest("content and userId are required".to_string()));
    }

    let comment = app_state
        .comments
        .create(
            body.content.as_deref(),
            body.image_url.as_deref(),
            body.user_id.as_deref().unwrap_or_default(),
            &post_id,
        )
        .await?;

    Ok(HttpResponse::Created().json(comment))
}
