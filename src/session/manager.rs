/// Session lifecycle: bootstrap, login, change-password, logout
use crate::{
    api::{AuthApi, LoginResponse},
    error::{ClinicError, ClinicResult},
    session::{Principal, Session, SessionStatus},
    storage::{KeyValueStore, StorageKeys},
    store::BearerSource,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Owns the bearer token and the current principal
///
/// State is published through a `watch` channel. Every login and logout
/// advances a generation counter; a bootstrap that started under an older
/// generation drops its result instead of overwriting the newer state.
pub struct SessionManager {
    auth: Arc<dyn AuthApi>,
    store: Arc<dyn KeyValueStore>,
    token_key: String,
    state: watch::Sender<Session>,
    generation: AtomicU64,
}

impl SessionManager {
    /// Create a manager in the `Bootstrapping` state
    pub fn new(auth: Arc<dyn AuthApi>, store: Arc<dyn KeyValueStore>, keys: &StorageKeys) -> Self {
        let (state, _) = watch::channel(Session::bootstrapping());
        Self {
            auth,
            store,
            token_key: keys.token(),
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.state.borrow().principal().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Wait until the session has left `Bootstrapping`
    pub async fn resolved(&self) -> Session {
        let mut rx = self.state.subscribe();
        let session = match rx.wait_for(Session::is_resolved).await {
            Ok(session) => session.clone(),
            Err(_) => self.session(),
        };
        session
    }

    /// Token persisted in durable storage, if any
    pub fn stored_token(&self) -> Option<String> {
        match self.store.get(&self.token_key) {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                warn!("Failed to read stored token: {}", e);
                None
            }
        }
    }

    /// Resolve the session from the persisted token
    ///
    /// Re-validates the token on every call. Always ends in `Authenticated`
    /// or `Unauthenticated`; any failure clears the stored token.
    pub async fn bootstrap(&self) -> SessionStatus {
        let generation = self.generation.load(Ordering::SeqCst);

        let Some(token) = self.stored_token() else {
            debug!("No stored token, session is unauthenticated");
            self.resolve(generation, Session::unauthenticated());
            return self.status();
        };

        match self.auth.me(&token).await {
            Ok(user) => {
                let principal = Principal::from(user);
                info!("Session restored for {} ({})", principal.email, principal.role);
                self.resolve(generation, Session::authenticated(principal, token));
            }
            Err(e) => {
                warn!("Stored token rejected: {}", e);
                if self.generation.load(Ordering::SeqCst) == generation {
                    self.clear_stored_token();
                }
                self.resolve(generation, Session::unauthenticated());
            }
        }

        self.status()
    }

    /// Submit credentials; on success persist the token and authenticate
    ///
    /// Failures leave the current session untouched, except that a session
    /// still bootstrapping resolves to `Unauthenticated`.
    pub async fn login(&self, email: &str, password: &str) -> ClinicResult<Principal> {
        debug!("Login attempt for {}", email);

        match self.try_login(email, password).await {
            Ok((principal, token)) => {
                self.generation.fetch_add(1, Ordering::SeqCst);
                info!("Logged in as {} ({})", principal.email, principal.role);
                self.state
                    .send_replace(Session::authenticated(principal.clone(), token));
                Ok(principal)
            }
            Err(e) => {
                warn!("Login failed for {}: {}", email, e);
                self.state.send_if_modified(|session| {
                    if session.is_resolved() {
                        return false;
                    }
                    // A bootstrap still in flight must not flip this back
                    self.generation.fetch_add(1, Ordering::SeqCst);
                    *session = Session::unauthenticated();
                    true
                });
                Err(e)
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> ClinicResult<(Principal, String)> {
        let LoginResponse { access_token, user } =
            self.auth.login(email, password).await.map_err(|e| match e {
                ClinicError::Status { .. } => {
                    ClinicError::Authentication("Invalid email or password".to_string())
                }
                other => other,
            })?;

        if access_token.trim().is_empty() {
            return Err(ClinicError::MalformedResponse(
                "Login response carries an empty access token".to_string(),
            ));
        }

        self.store.set(&self.token_key, &access_token)?;

        Ok((Principal::from(user), access_token))
    }

    /// Change the password of the signed-in account
    ///
    /// Never mutates session state; the current token stays valid.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> ClinicResult<()> {
        let token = self
            .bearer_token()
            .ok_or_else(|| ClinicError::Authentication("No active session".to_string()))?;

        match self
            .auth
            .change_password(&token, current_password, new_password)
            .await
        {
            Ok(()) => {
                info!("Password changed");
                Ok(())
            }
            Err(e) => {
                warn!("Password change failed: {}", e);
                Err(e)
            }
        }
    }

    /// Clear the token and principal; no network call
    pub fn logout(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.clear_stored_token();
        self.state.send_replace(Session::unauthenticated());
        info!("Logged out");
    }

    /// Publish a bootstrap result unless a login or logout superseded it
    fn resolve(&self, generation: u64, next: Session) {
        self.state.send_if_modified(|session| {
            if self.generation.load(Ordering::SeqCst) != generation {
                debug!("Discarding stale bootstrap result");
                return false;
            }
            *session = next;
            true
        });
    }

    fn clear_stored_token(&self) {
        if let Err(e) = self.store.remove(&self.token_key) {
            warn!("Failed to clear stored token: {}", e);
        }
    }
}

impl BearerSource for SessionManager {
    /// Session token, else the persisted one
    fn bearer_token(&self) -> Option<String> {
        let token = self.state.borrow().token().map(str::to_string);
        token.or_else(|| self.stored_token())
    }
}
