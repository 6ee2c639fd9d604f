use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::BackendUser;

/// Token response from the identity backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: BackendUser,
}

/// Claims carried in a Supabase access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Reads the claims without checking the signature. Only for local
/// bookkeeping; the backend verifies the token on every request.
pub fn peek_claims(token: &str) -> Option<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

impl Session {
    pub fn expiry(&self) -> Option<i64> {
        self.expires_at
            .or_else(|| peek_claims(&self.access_token).and_then(|c| c.exp))
    }

    /// Sessions with no known expiry are treated as live.
    pub fn is_expired(&self, now_unix: i64) -> bool {
        match self.expiry() {
            Some(exp) => exp <= now_unix,
            None => false,
        }
    }
}
