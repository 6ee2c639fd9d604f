use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Challenge method sent to the identity backend.
pub const CHALLENGE_METHOD: &str = "s256";

/// Verifier/challenge pair for one OAuth sign-in. Only the challenge goes
/// to the provider; the verifier is kept until the code comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self::from_verifier(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self { verifier, challenge }
    }
}
