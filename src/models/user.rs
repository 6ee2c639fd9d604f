use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User as the identity backend returns it (`auth.users` row shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Provider profile data, e.g. GitHub's `user_name` and `avatar_url`.
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl BackendUser {
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Application-side user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<&BackendUser> for User {
    fn from(raw: &BackendUser) -> Self {
        User {
            id: raw.id.clone(),
            email: raw.email.clone(),
            username: raw.metadata_str("user_name").map(str::to_string),
            avatar_url: raw.metadata_str("avatar_url").map(str::to_string),
        }
    }
}

/// Null in, null out.
pub fn transform_user(raw: Option<&BackendUser>) -> Option<User> {
    raw.map(User::from)
}
