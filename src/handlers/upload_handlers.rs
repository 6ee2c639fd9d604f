// src/handlers/upload_handlers.rs
use actix_web::{post, web, HttpResponse};
use base64::{Engine as _, engine::general_purpose};
use log::warn;

use crate::dtos::upload_dtos::UploadImageIn;
use crate::errors::ApiError;
use crate::services::storage_service::{ImageFile, StorageService};
use crate::AppState;

/// Strips a `data:<type>;base64,` prefix when present.
fn strip_data_url(data: &str) -> &str {
    match data.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    }
}

/// POST /api/uploads
/// Stores a post or comment image and returns its public URL.
#[post("/uploads")]
pub async fn upload_image(
    app_state: web::Data<AppState>,
    body: web::Json<UploadImageIn>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();

    let user_id = body
        .user_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))?;

    let bytes = general_purpose::STANDARD
        .decode(strip_data_url(body.image_data.trim()))
        .map_err(|e| {
            warn!("rejected upload from {}: {}", user_id, e);
            ApiError::BadRequest("Invalid base64 image data".to_string())
        })?;

    let file = ImageFile {
        name: body.file_name,
        content_type: body.content_type,
        bytes,
    };

    let check = StorageService::validate(&file);
    if !check.valid {
        return Err(ApiError::BadRequest(check.error.unwrap_or_default()));
    }

    let uploaded = app_state
        .storage
        .upload(&file, user_id, body.kind)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(HttpResponse::Created().json(uploaded))
}
