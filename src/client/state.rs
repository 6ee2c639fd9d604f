use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::{error, warn};

use crate::client::auth::{AuthService, SignInRedirect, Subscription};
use crate::models::user::User;
use crate::services::profile_service::ProfileService;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Auth view state for one mounted UI. Once unmounted, late results from
/// in-flight calls are dropped instead of applied.
pub struct AuthStore {
    auth: Arc<AuthService>,
    profiles: ProfileService,
    state: Arc<Mutex<AuthState>>,
    cancelled: Arc<AtomicBool>,
    subscription: Subscription,
}

fn apply(state: &Mutex<AuthState>, cancelled: &AtomicBool, f: impl FnOnce(&mut AuthState)) {
    if cancelled.load(Ordering::SeqCst) {
        return;
    }
    f(&mut state.lock().unwrap_or_else(PoisonError::into_inner));
}

impl AuthStore {
    pub fn mount(auth: Arc<AuthService>, profiles: ProfileService) -> Self {
        let state = Arc::new(Mutex::new(AuthState {
            user: None,
            loading: true,
            error: None,
        }));
        let cancelled = Arc::new(AtomicBool::new(false));

        let subscription = {
            let state = state.clone();
            let cancelled = cancelled.clone();
            auth.on_auth_state_change(move |_event, user| {
                apply(&state, &cancelled, |s| {
                    s.user = user;
                    s.loading = false;
                });
            })
        };

        Self { auth, profiles, state, cancelled, subscription }
    }

    fn update(&self, f: impl FnOnce(&mut AuthState)) {
        apply(&self.state, &self.cancelled, f);
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Resolves the current user. Profile sync runs on the way but never
    /// blocks or fails the load.
    pub async fn load(&self) {
        self.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let user = match self.auth.get_current_user().await {
            Ok(user) => user,
            Err(e) => {
                error!("failed to load current user: {}", e);
                self.update(|s| {
                    s.error = Some(e.to_string());
                    s.user = None;
                    s.loading = false;
                });
                return;
            }
        };

        if user.is_some() {
            if let Ok(Some(session)) = self.auth.get_session().await {
                if let Err(e) = self.profiles.ensure_profile(&session.user).await {
                    warn!("Failed to ensure profile: {}", e);
                }
            }
        }

        self.update(|s| {
            s.user = user;
            s.loading = false;
        });
    }

    /// Returns where to send the browser. `loading` stays set until the
    /// resulting auth event arrives.
    pub fn sign_in(&self) -> SignInRedirect {
        self.update(|s| s.loading = true);
        self.auth.sign_in_with_provider()
    }

    pub async fn sign_out(&self) {
        self.update(|s| s.loading = true);
        if let Err(e) = self.auth.sign_out().await {
            self.update(|s| s.error = Some(e.to_string()));
        }
        self.update(|s| s.loading = false);
    }

    pub fn unmount(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.subscription.unsubscribe();
    }
}
