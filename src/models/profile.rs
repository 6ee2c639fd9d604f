use serde::{Deserialize, Serialize};

use crate::models::user::BackendUser;

pub const ANONYMOUS_USERNAME: &str = "anonymous";

/// Row in the `profiles` table. `id` equals the auth user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Upsert payload derived from the identity provider's data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl NewProfile {
    /// Username falls back from `user_name` metadata to the email's local
    /// part and then to "anonymous". Empty values fall through.
    pub fn from_user(user: &BackendUser) -> Self {
        let username = user
            .metadata_str("user_name")
            .filter(|name| !name.is_empty())
            .or_else(|| {
                user.email
                    .as_deref()
                    .and_then(|email| email.split('@').next())
                    .filter(|local| !local.is_empty())
            })
            .unwrap_or(ANONYMOUS_USERNAME)
            .to_string();

        NewProfile {
            id: user.id.clone(),
            username,
            avatar_url: user.metadata_str("avatar_url").map(str::to_string),
        }
    }
}
