//! Session controller — the authentication lifecycle state machine.
//!
//! ARCHITECTURE
//! ============
//! One controller instance owns the session for the life of the process.
//! It bootstraps from the credential store, verifies the stored token with
//! the gateway, and publishes every state change through a watch channel;
//! the rest of the application subscribes instead of reaching into any
//! global. The gateway's auth-failure hook is wired to `logout`, so a
//! server-side token revocation observed by *any* request deauthenticates
//! the whole application.
//!
//! FAILURE SEMANTICS
//! =================
//! Background verification never surfaces errors to callers — a rejected
//! token signs the user out, a network failure retries after a fixed
//! delay. Errors from explicit user actions (login, register, profile
//! update) always propagate so the initiating form can render them.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::api::AuthGateway;
use crate::error::{ApiError, friendly_login_error};
use crate::nav::Navigator;
use crate::routes::HOME_ROUTE;
use crate::store::CredentialStore;
use crate::types::UserRecord;

/// Delay between verification attempts after a transient failure.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);

// =============================================================================
// SESSION SNAPSHOT
// =============================================================================

/// Point-in-time view of the authentication state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    /// Bearer token, present whenever a user is signed in.
    pub token: Option<String>,
    /// Verified user record; `Some` is the definition of "authenticated".
    pub user: Option<UserRecord>,
    /// True until the initial verification pass resolves. While set, no
    /// redirect decision may consult `is_authenticated`.
    pub checking_auth: bool,
}

impl Session {
    /// Initial state at process start, before the store has been read.
    #[must_use]
    pub fn checking() -> Self {
        Self { token: None, user: None, checking_auth: true }
    }

    /// Resolved anonymous state.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| user.role.can_administer())
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Tuning knobs for the bootstrap verification loop.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Fixed delay between verification attempts on transient failure.
    pub retry_delay: Duration,
    /// Maximum verification attempts. `None` retries indefinitely, which
    /// is the historical behavior; when capped and exhausted, the session
    /// resolves signed out but the stored token is retained so the next
    /// start tries again.
    pub retry_limit: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { retry_delay: DEFAULT_RETRY_DELAY, retry_limit: None }
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Orchestrates the authentication lifecycle against a credential store
/// and an [`AuthGateway`].
pub struct SessionController<S, G> {
    store: S,
    gateway: Arc<G>,
    config: SessionConfig,
    sessions: watch::Sender<Session>,
    navigator: Mutex<Option<Arc<dyn Navigator>>>,
}

impl<S, G> SessionController<S, G>
where
    S: CredentialStore + 'static,
    G: AuthGateway + 'static,
{
    /// Create the controller and wire the gateway's auth-failure hook to
    /// `logout`. The session starts in the checking state.
    pub fn new(store: S, gateway: Arc<G>, config: SessionConfig) -> Arc<Self> {
        let (sessions, _) = watch::channel(Session::checking());
        let controller = Arc::new(Self {
            store,
            gateway,
            config,
            sessions,
            navigator: Mutex::new(None),
        });
        controller.attach_auth_failure_hook();
        controller
    }

    /// Register the navigation capability used for the logout redirect.
    pub fn set_navigator(&self, navigator: Arc<dyn Navigator>) {
        if let Ok(mut slot) = self.navigator.lock() {
            *slot = Some(navigator);
        }
    }

    /// Current session snapshot.
    #[must_use]
    pub fn current(&self) -> Session {
        self.sessions.borrow().clone()
    }

    /// Subscribe to session changes. Each observer sees the latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.sessions.subscribe()
    }

    // -------------------------------------------------------------------------
    // Bootstrap
    // -------------------------------------------------------------------------

    /// Verify any stored token and resolve the session. Runs exactly once
    /// per process start.
    ///
    /// With no stored token this resolves signed out without touching the
    /// network. With a token, `get_profile` is attempted; a rejected token
    /// clears the stored credentials, while transient failures retry after
    /// `retry_delay` without deauthenticating. Every exit path resolves
    /// `checking_auth`.
    pub async fn bootstrap(&self) {
        let credentials = self.store.load();
        let Some(token) = credentials.token else {
            tracing::debug!("no stored token — resolving signed out");
            self.publish(Session::signed_out());
            return;
        };

        self.gateway.set_token(&token);
        self.publish(Session {
            token: Some(token.clone()),
            user: None,
            checking_auth: true,
        });

        let mut attempts: u32 = 0;
        let resolved = loop {
            match self.gateway.get_profile().await {
                Ok(user) => {
                    // Keep the token, refresh the persisted user.
                    if let Err(e) = self.store.save(&token, &user) {
                        tracing::warn!(error = %e, "failed to persist refreshed profile");
                    }
                    tracing::info!(user = %user.id, "stored session verified");
                    break Session {
                        token: Some(token.clone()),
                        user: Some(user),
                        checking_auth: false,
                    };
                }
                Err(e) if e.is_auth() => {
                    tracing::info!(error = %e, "stored token rejected — signing out");
                    self.discard_credentials();
                    break Session::signed_out();
                }
                Err(e) => {
                    attempts = attempts.saturating_add(1);
                    if let Some(limit) = self.config.retry_limit {
                        if attempts >= limit {
                            tracing::warn!(
                                error = %e,
                                attempts,
                                "verification retries exhausted — resolving signed out, token retained"
                            );
                            break Session {
                                token: Some(token.clone()),
                                user: None,
                                checking_auth: false,
                            };
                        }
                    }
                    tracing::warn!(
                        error = %e,
                        delay = ?self.config.retry_delay,
                        "profile verification failed — retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        };
        self.publish(resolved);
    }

    // -------------------------------------------------------------------------
    // Explicit transitions
    // -------------------------------------------------------------------------

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Propagates the gateway error with the generic invalid-credentials
    /// message replaced by a friendlier one; the session is unchanged on
    /// failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord, ApiError> {
        match self.gateway.login(email, password).await {
            Ok(payload) => {
                self.adopt(payload.token, payload.user.clone());
                Ok(payload.user)
            }
            Err(e) => {
                if e.is_auth() {
                    self.logout();
                }
                Err(friendly_login_error(e))
            }
        }
    }

    /// Create an account; the backend signs the new user in immediately.
    ///
    /// # Errors
    ///
    /// Propagates the gateway error verbatim; the session is unchanged on
    /// failure.
    pub async fn register(&self, fields: &serde_json::Value) -> Result<UserRecord, ApiError> {
        match self.gateway.register(fields).await {
            Ok(payload) => {
                self.adopt(payload.token, payload.user.clone());
                Ok(payload.user)
            }
            Err(e) => {
                if e.is_auth() {
                    self.logout();
                }
                Err(e)
            }
        }
    }

    /// Adopt a token/user pair obtained out of band (registration redirect,
    /// federated-auth callback). No network call; same persistence side
    /// effects as `login`.
    pub fn set_auth_state(&self, token: &str, user: UserRecord) {
        self.adopt(token.to_owned(), user);
    }

    /// Replace the in-memory user record and persist it. The token is
    /// untouched and nothing is re-verified. Ignored when signed out.
    pub fn update_user(&self, user: UserRecord) {
        let Some(token) = self.current().token else {
            tracing::warn!("update_user ignored — no active session");
            return;
        };
        if let Err(e) = self.store.save(&token, &user) {
            tracing::warn!(error = %e, "failed to persist updated user");
        }
        self.publish(Session {
            token: Some(token),
            user: Some(user),
            checking_auth: false,
        });
    }

    /// Update profile fields on the server and apply the result.
    ///
    /// # Errors
    ///
    /// Propagates the gateway error; the session is unchanged on failure.
    pub async fn update_profile(&self, fields: &serde_json::Value) -> Result<UserRecord, ApiError> {
        match self.gateway.update_profile(fields).await {
            Ok(update) => {
                let token = match update.token {
                    // The backend rotated the token (e.g. email change).
                    Some(token) => {
                        self.gateway.set_token(&token);
                        token
                    }
                    None => self.current().token.unwrap_or_default(),
                };
                self.adopt(token, update.user.clone());
                Ok(update.user)
            }
            Err(e) => {
                if e.is_auth() {
                    self.logout();
                }
                Err(e)
            }
        }
    }

    /// Upload a new profile picture and apply the refreshed user record.
    ///
    /// # Errors
    ///
    /// Propagates the gateway error; the session is unchanged on failure.
    pub async fn upload_profile_picture(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<UserRecord, ApiError> {
        match self.gateway.upload_profile_picture(bytes, content_type).await {
            Ok(user) => {
                self.update_user(user.clone());
                Ok(user)
            }
            Err(e) => {
                if e.is_auth() {
                    self.logout();
                }
                Err(e)
            }
        }
    }

    /// Sign out: clear the gateway token and stored credentials, publish
    /// the anonymous resolved session, and redirect home.
    ///
    /// Idempotent — the auth-failure hook may invoke this from several
    /// failing requests at once and the end state is the same.
    pub fn logout(&self) {
        self.discard_credentials();
        self.publish(Session::signed_out());

        let navigator = self.navigator.lock().ok().and_then(|slot| slot.clone());
        if let Some(navigator) = navigator {
            navigator.replace(HOME_ROUTE);
        } else {
            tracing::debug!("no navigator registered — skipping logout redirect");
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn attach_auth_failure_hook(self: &Arc<Self>) {
        // Weak reference: the gateway outliving the controller must not
        // keep it alive through the hook.
        let weak = Arc::downgrade(self);
        self.gateway.on_auth_failure(Arc::new(move || {
            if let Some(controller) = weak.upgrade() {
                tracing::info!("auth failure reported by gateway — signing out");
                controller.logout();
            }
        }));
    }

    fn adopt(&self, token: String, user: UserRecord) {
        self.gateway.set_token(&token);
        if let Err(e) = self.store.save(&token, &user) {
            tracing::warn!(error = %e, "failed to persist credentials");
        }
        self.publish(Session {
            token: Some(token),
            user: Some(user),
            checking_auth: false,
        });
    }

    fn discard_credentials(&self) {
        self.gateway.clear_token();
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear stored credentials");
        }
    }

    fn publish(&self, session: Session) {
        self.sessions.send_replace(session);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
