use serde::{Deserialize, Serialize};

use crate::services::storage_service::ImageKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageIn {
    /// base64, optionally with a `data:image/png;base64,` prefix
    pub image_data: String,
    pub file_name: String,
    pub content_type: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub kind: ImageKind,
}
