// src/services/storage_service.rs - image validation + upload to object storage

use std::sync::{Arc, LazyLock};

use log::{error, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repositories::{ObjectStorage, RepoError};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const FILE_TOO_LARGE_ERROR: &str = "File size too large. Maximum size is 5MB.";

static EXTENSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,10}$").expect("valid extension pattern"));

const ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Error)]
#[error("Upload failed: {0}")]
pub struct UploadError(#[from] RepoError);

/// Which bucket an image goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Post,
    Comment,
}

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageValidation {
    pub valid: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedImage {
    pub url: String,
    pub path: String,
}

/// Essence of a content type (`image/png; charset=x` -> `image/png`).
fn essence(content_type: &str) -> Option<String> {
    content_type
        .trim()
        .parse::<mime::Mime>()
        .ok()
        .map(|m| m.essence_str().to_ascii_lowercase())
}

fn extension_for(file: &ImageFile) -> String {
    let from_name = file
        .name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| EXTENSION_RE.is_match(ext));
    if let Some(ext) = from_name {
        return ext.to_string();
    }

    match essence(&file.content_type).as_deref() {
        Some("image/jpeg") | Some("image/jpg") => "jpg",
        Some("image/png") => "png",
        Some("image/gif") => "gif",
        Some("image/webp") => "webp",
        _ => "bin",
    }
    .to_string()
}

/// `{user_id}/{user_id}-{millis}.{ext}`
pub fn object_path(user_id: &str, file: &ImageFile, now_millis: i64) -> String {
    format!("{0}/{0}-{1}.{2}", user_id, now_millis, extension_for(file))
}

#[derive(Clone)]
pub struct StorageService {
    storage: Arc<dyn ObjectStorage>,
    post_bucket: String,
    comment_bucket: String,
}

impl StorageService {
    pub fn new(storage: Arc<dyn ObjectStorage>, post_bucket: &str, comment_bucket: &str) -> Self {
        Self {
            storage,
            post_bucket: post_bucket.to_string(),
            comment_bucket: comment_bucket.to_string(),
        }
    }

    pub fn bucket(&self, kind: ImageKind) -> &str {
        match kind {
            ImageKind::Post => &self.post_bucket,
            ImageKind::Comment => &self.comment_bucket,
        }
    }

    pub fn validate(file: &ImageFile) -> ImageValidation {
        let allowed = essence(&file.content_type)
            .map(|t| ALLOWED_TYPES.contains(&t.as_str()))
            .unwrap_or(false);

        if !allowed {
            return ImageValidation {
                valid: false,
                error: Some(
                    "Invalid file type. Please upload a JPEG, PNG, GIF, or WebP image.".to_string(),
                ),
            };
        }

        if file.bytes.len() > MAX_IMAGE_BYTES {
            return ImageValidation {
                valid: false,
                error: Some(FILE_TOO_LARGE_ERROR.to_string()),
            };
        }

        ImageValidation { valid: true, error: None }
    }

    /// Single attempt; never overwrites an existing object.
    pub async fn upload(
        &self,
        file: &ImageFile,
        user_id: &str,
        kind: ImageKind,
    ) -> Result<UploadedImage, UploadError> {
        let bucket = self.bucket(kind);
        let path = object_path(user_id, file, chrono::Utc::now().timestamp_millis());

        let stored = self
            .storage
            .upload_object(bucket, &path, file.content_type.trim(), file.bytes.clone())
            .await
            .map_err(|e| {
                error!("upload to {}/{} failed: {}", bucket, path, e);
                UploadError(e)
            })?;

        let url = self.storage.public_url(bucket, &stored);
        info!("uploaded {} bytes to {}/{}", file.bytes.len(), bucket, stored);
        Ok(UploadedImage { url, path: stored })
    }
}
