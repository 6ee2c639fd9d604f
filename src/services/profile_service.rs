use std::sync::Arc;

use log::{debug, error};

use crate::models::profile::{NewProfile, Profile};
use crate::models::user::BackendUser;
use crate::repositories::ProfileRepository;
use crate::services::ServiceError;

/// Keeps `profiles` in sync with identity-provider data. The profile row is
/// a derived cache, so callers treat failures here as non-fatal.
#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    pub async fn ensure_profile(&self, user: &BackendUser) -> Result<Profile, ServiceError> {
        let profile = NewProfile::from_user(user);
        match self.repo.upsert_profile(&profile).await {
            Ok(saved) => {
                debug!("profile {} synced as {}", saved.id, saved.username);
                Ok(saved)
            }
            Err(e) => {
                error!("Error syncing profile for {}: {}", user.id, e);
                Err(e.into())
            }
        }
    }
}
