use serde::{Deserialize, Serialize};

/// Body of `POST /api/posts`. Every field may be absent on the wire; the
/// handler decides which absences are errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostIn {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}
