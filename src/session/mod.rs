//! Session store.
//!
//! Owns the operator's session: the bearer token, the signed-in user, the
//! lifecycle phase and the last user-facing error. It is the only writer of
//! the client's credential, and it registers the response guard that turns
//! any 401 into a forced logout.
//!
//! # Phases
//!
//! ```text
//!   new() ──token──▶ Initializing ──/auth/me ok──▶ Authenticated
//!     │                   │                             │
//!     └──no token──▶ Unauthenticated ◀──fail / logout / 401──┘
//!                         │        ▲
//!                         └─login──┘
//! ```
//!
//! State sits behind a plain mutex that is never held across an await.
//! Observers get immutable [`SessionSnapshot`]s through a watch channel.

pub mod messages;
pub mod storage;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, Body, Exchange, GuardHandle, RequestOptions, ResponseGuard};
use crate::shared::error::{ApiError, AuthError};
use crate::shared::models::{AdminUser, LoginResponse};

pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

const LOGIN_PATH: &str = "/auth/login";
const ME_PATH: &str = "/auth/me";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// A stored token is being verified.
    Initializing,
    #[default]
    Unauthenticated,
    Authenticated,
}

/// Immutable copy of the session state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// Present only while authenticated.
    pub user: Option<AdminUser>,
    pub token_present: bool,
    pub error: Option<String>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated
    }
}

#[derive(Debug, Default)]
struct SessionState {
    phase: SessionPhase,
    token: Option<String>,
    user: Option<AdminUser>,
    error: Option<String>,
    closed: bool,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        let authenticated = self.phase == SessionPhase::Authenticated;
        SessionSnapshot {
            phase: self.phase,
            user: self.user.clone().filter(|_| authenticated),
            token_present: self.token.is_some(),
            error: self.error.clone(),
        }
    }
}

struct SessionInner {
    client: ApiClient,
    storage: Arc<dyn TokenStorage>,
    state: Mutex<SessionState>,
    snapshots: watch::Sender<SessionSnapshot>,
    closed: watch::Sender<bool>,
    initialized: AtomicBool,
}

impl SessionInner {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate live state and publish the result. `None` once shut down.
    fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        let result = f(&mut state);
        let snapshot = state.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        Some(result)
    }

    /// Resolves once the store is shut down.
    async fn closed(&self) {
        let mut closed = self.closed.subscribe();
        // The sender lives as long as `self`, so this only returns on close.
        let _ = closed.wait_for(|closed| *closed).await;
    }

    /// Drop token and user, detach the credential and forget the stored token.
    ///
    /// Must run under the state lock so credential and state change together.
    fn end_session(&self, state: &mut SessionState) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "failed to remove stored token");
        }
        self.client.clear_credential();
        state.token = None;
        state.user = None;
        state.phase = SessionPhase::Unauthenticated;
    }

    /// Forced logout after a request sent with `sent` was rejected.
    ///
    /// Acts only while that same token is the session token, so repeated or
    /// stale rejections are no-ops.
    fn expire(&self, sent: Option<&str>) {
        let Some(sent) = sent else {
            return;
        };
        let expired = self.with_state(|state| {
            if state.token.as_deref() != Some(sent) {
                return false;
            }
            self.end_session(state);
            state.error = Some(messages::SESSION_EXPIRED.to_string());
            true
        });
        if expired == Some(true) {
            warn!("session expired, signed out");
        }
    }
}

/// Forwards 401s to the owning session store.
struct SessionGuard {
    session: Weak<SessionInner>,
}

impl ResponseGuard for SessionGuard {
    fn inspect(&self, exchange: &Exchange<'_>) {
        let Err(error) = exchange.outcome else {
            return;
        };
        if !error.is_unauthorized() {
            return;
        }
        debug!(path = exchange.path, "unauthorized response");
        if let Some(session) = self.session.upgrade() {
            session.expire(exchange.credential);
        }
    }
}

/// The operator session. Construct once per process and share by `Arc`.
pub struct SessionStore {
    inner: Arc<SessionInner>,
    guard: Mutex<Option<GuardHandle>>,
}

impl SessionStore {
    /// Create the store and register its response guard on `client`.
    ///
    /// A stored token is attached to the client right away and the phase
    /// starts at `Initializing`; call [`initialize`](Self::initialize) to
    /// verify it.
    pub fn new(client: ApiClient, storage: Arc<dyn TokenStorage>) -> Self {
        let token = storage.load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to read stored token, starting signed out");
            None
        });

        let state = match token {
            Some(token) => {
                client.set_credential(token.clone());
                SessionState {
                    phase: SessionPhase::Initializing,
                    token: Some(token),
                    ..SessionState::default()
                }
            }
            None => {
                client.clear_credential();
                SessionState::default()
            }
        };

        let (snapshots, _) = watch::channel(state.snapshot());
        let (closed, _) = watch::channel(false);

        let inner = Arc::new(SessionInner {
            client,
            storage,
            state: Mutex::new(state),
            snapshots,
            closed,
            initialized: AtomicBool::new(false),
        });

        let guard = inner.client.register_guard(Arc::new(SessionGuard {
            session: Arc::downgrade(&inner),
        }));

        Self {
            inner,
            guard: Mutex::new(Some(guard)),
        }
    }

    /// Client whose credential this store manages.
    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshots.borrow().clone()
    }

    /// Receive a snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.lock().phase
    }

    /// Signed-in user. `None` unless the phase is `Authenticated`.
    pub fn current_user(&self) -> Option<AdminUser> {
        self.inner.lock().snapshot().user
    }

    pub fn token(&self) -> Option<String> {
        self.inner.lock().token.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    /// Verify the stored token once. Later calls return immediately.
    pub async fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let Some(token) = self.inner.with_state(|state| state.token.clone()).flatten() else {
            debug!("no stored session");
            return;
        };

        info!("verifying stored session");
        let request = self
            .inner
            .client
            .get::<AdminUser>(ME_PATH, RequestOptions::new());

        let result = tokio::select! {
            biased;
            _ = self.inner.closed() => {
                debug!("session closed during verification");
                return;
            }
            result = request => result,
        };

        match result {
            Ok(user) => {
                let verified = self.inner.with_state(|state| {
                    if state.token.as_deref() != Some(token.as_str()) {
                        return false;
                    }
                    state.user = Some(user);
                    state.phase = SessionPhase::Authenticated;
                    true
                });
                if verified == Some(true) {
                    info!(phase = ?SessionPhase::Authenticated, "stored session verified");
                }
            }
            Err(e) => {
                warn!(error = %e, "stored session rejected");
                self.inner.expire(Some(&token));
            }
        }
    }

    /// Sign in with an identifier and a secret.
    ///
    /// The identifier is trimmed. On failure the matching message is stored
    /// as the session error and the error is returned as well.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<AdminUser, AuthError> {
        let identifier = identifier.trim();
        self.inner
            .with_state(|state| state.error = None)
            .ok_or(AuthError::Cancelled)?;

        if identifier.is_empty() || secret.is_empty() {
            return Err(self.fail_login(AuthError::MissingCredentials));
        }

        info!("signing in");
        let body = Body::form([("username", identifier), ("password", secret)]);
        let request = self
            .inner
            .client
            .post::<LoginResponse>(LOGIN_PATH, Some(body), RequestOptions::new());

        let result = tokio::select! {
            biased;
            _ = self.inner.closed() => return Err(AuthError::Cancelled),
            result = request => result,
        };

        let response = match result.and_then(require_token) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "sign in failed");
                return Err(self.fail_login(AuthError::from_api(e)));
            }
        };

        let LoginResponse {
            access_token, user, ..
        } = response;
        let signed_in = user.clone();
        let inner = &self.inner;
        inner
            .with_state(move |state| {
                if let Err(e) = inner.storage.save(&access_token) {
                    warn!(error = %e, "failed to persist token");
                }
                inner.client.set_credential(access_token.clone());
                state.token = Some(access_token);
                state.user = Some(user);
                state.phase = SessionPhase::Authenticated;
                state.error = None;
            })
            .ok_or(AuthError::Cancelled)?;

        info!(user_id = signed_in.id, role = %signed_in.role, "signed in");
        Ok(signed_in)
    }

    /// Sign out. Does nothing when already signed out; keeps the error.
    pub fn logout(&self) {
        let inner = &self.inner;
        let ended = inner.with_state(|state| {
            if state.token.is_none() && state.phase == SessionPhase::Unauthenticated {
                return false;
            }
            inner.end_session(state);
            true
        });
        if ended == Some(true) {
            info!("signed out");
        }
    }

    pub fn clear_error(&self) {
        self.inner.with_state(|state| state.error = None);
    }

    /// Tear the store down.
    ///
    /// The guard is deregistered, in-flight login and verification results
    /// are discarded and the state stops changing. Called on drop.
    pub fn shutdown(&self) {
        let first = {
            let mut state = self.inner.lock();
            !std::mem::replace(&mut state.closed, true)
        };
        self.inner.closed.send_replace(true);
        if let Some(handle) = self
            .guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.eject();
        }
        if first {
            debug!("session store shut down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().closed
    }

    fn fail_login(&self, error: AuthError) -> AuthError {
        let message = error.user_message().to_string();
        self.inner.with_state(|state| state.error = Some(message));
        error
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("SessionStore")
            .field("phase", &state.phase)
            .field("token_present", &state.token.is_some())
            .field("closed", &state.closed)
            .finish()
    }
}

fn require_token(response: LoginResponse) -> Result<LoginResponse, ApiError> {
    if response.access_token.trim().is_empty() {
        return Err(ApiError::invalid_response("login response without access token"));
    }
    Ok(response)
}
