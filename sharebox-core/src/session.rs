//! Session store
//!
//! One `Session` exists per running client. It is created once by the shell
//! and handed (cloned, it is a shared handle) to the API client and the
//! router. Lifecycle:
//! - `init`: restore a persisted token if it decodes and has not expired
//! - `login`: adopt a freshly issued token
//! - `logout`: forget everything, idempotently
//!
//! Navigation side effects are queued as redirects and drained by the router.

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{self, AuthError, Identity};
use crate::router::{Navigation, Route};
use crate::storage::{StorageError, TokenStore};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    identity: Option<Identity>,
    redirect: Vec<Navigation>,
}

/// Shared handle to the current session
#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    store: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Restore the session from storage
    pub fn init(store: Arc<dyn TokenStore>) -> Self {
        let session = Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            store,
        };

        let saved = match session.store.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Failed to read stored token: {}", e);
                None
            }
        };

        if let Some(token) = saved {
            match auth::decode_unexpired(&token) {
                Ok(claims) => {
                    info!("Restored session for {}", claims.email);
                    let mut state = session.lock();
                    state.identity = Some(claims.identity());
                    state.token = Some(token);
                }
                Err(e) => {
                    warn!("Discarding stored token: {}", e);
                    if let Err(e) = session.store.clear() {
                        warn!("Failed to remove stored token: {}", e);
                    }
                }
            }
        }

        session
    }

    /// Adopt a token from a successful login and head to the dashboard.
    ///
    /// A token that does not decode leaves the session untouched.
    pub fn login(&self, token: &str) -> Result<Identity, SessionError> {
        let claims = auth::decode_claims(token)?;
        self.store.save(token)?;

        let identity = claims.identity();
        info!("Logged in as {}", identity.email);

        let mut state = self.lock();
        state.token = Some(token.to_string());
        state.identity = Some(identity.clone());
        state.redirect.push(Navigation::push(Route::Dashboard));

        Ok(identity)
    }

    /// Clear the session and return to the entry screen
    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to remove stored token: {}", e);
        }

        let mut state = self.lock();
        if state.identity.is_some() || state.token.is_some() {
            info!("Logged out");
        }
        state.identity = None;
        state.token = None;
        state.redirect.push(Navigation::replace(Route::Login));
    }

    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.lock().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().identity.is_some()
    }

    /// Pop the oldest pending navigation request
    pub fn take_redirect(&self) -> Option<Navigation> {
        let mut state = self.lock();
        if state.redirect.is_empty() {
            None
        } else {
            Some(state.redirect.remove(0))
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
