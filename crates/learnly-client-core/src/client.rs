use anyhow::Context;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::{CancellationToken, DropGuard};

use learnly_shared::{
    const_config::{
        path::PATH_ME,
        storage::{STORAGE_KEY_TOKEN, STORAGE_KEY_USER},
    },
    errors::NotLoggedInError,
    responses::MeResponse,
    session::Session,
    token::AuthToken,
    user::UserSummary,
};

use crate::storage::{self, DurableStore, MemoryStore};

mod api;
mod refresh;

pub use api::SignInError;

/// Single source of truth for "is a user logged in, and who".
///
/// Constructed explicitly and passed by handle to whatever rendering layer
/// needs it. Cloning is cheap; all clones share the same session. The
/// passive refresh task is started on construction and stopped when the last
/// clone is dropped.
#[derive(Debug, Clone)]
pub struct Client {
    api_client: reqwest::Client,
    inner: Arc<Mutex<ClientInner>>,
    /// Cancels the passive refresh task when the last clone is dropped
    _refresh_guard: Arc<DropGuard>,
}

#[derive(Debug)]
struct ClientInner {
    server_address: String,
    session: Option<Session>,
    store: Box<dyn DurableStore>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(
            "http://localhost:8789".to_string(),
            Box::new(MemoryStore::default()),
        )
    }
}

/// Raised by [`Client::login`]. The session is guaranteed to be fully
/// cleared (token and user both absent) when this is returned.
#[derive(Debug, thiserror::Error)]
#[error("Log-In Failed")]
pub struct LoginFailed;

/// Normalized outcome of the external identity call: a user, or a typed
/// failure. An absent user record and a transport problem both land here so
/// nothing downstream distinguishes "null" from "exception".
#[derive(Debug, thiserror::Error)]
pub(crate) enum IdentityError {
    #[error("token was not accepted by the identity endpoint")]
    InvalidToken,
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl ClientInner {
    /// Reconciles durable storage with the in-memory state at startup.
    ///
    /// The pair of keys is restored together or not at all; corrupt entries
    /// count as absent and an incomplete pair is cleared from storage.
    #[tracing::instrument(skip(store))]
    fn restore(server_address: String, store: Box<dyn DurableStore>) -> Self {
        let token: Option<AuthToken> = storage::get_parsed(store.as_ref(), STORAGE_KEY_TOKEN);
        let user: Option<UserSummary> = storage::get_parsed(store.as_ref(), STORAGE_KEY_USER);
        let mut result = Self {
            server_address,
            session: None,
            store,
        };
        match (token, user) {
            (Some(token), Some(user)) => result.session = Some(Session { token, user }),
            (None, None) => {}
            _ => {
                tracing::warn!("stored session was incomplete, clearing it");
                result.store.remove(STORAGE_KEY_TOKEN);
                result.store.remove(STORAGE_KEY_USER);
            }
        }
        result
    }

    /// Applies a transition and writes through to durable storage while the
    /// lock is held, so no reader observes a half-updated session
    fn apply_session(&mut self, session: Option<Session>) {
        self.session = session;
        match self.session.clone() {
            Some(session) => {
                storage::set_serialized(self.store.as_mut(), STORAGE_KEY_TOKEN, &session.token);
                storage::set_serialized(self.store.as_mut(), STORAGE_KEY_USER, &session.user);
            }
            None => {
                self.store.remove(STORAGE_KEY_TOKEN);
                self.store.remove(STORAGE_KEY_USER);
            }
        }
    }
}

impl Client {
    #[tracing::instrument(name = "NEW CLIENT-CORE", skip(store))]
    pub fn new(server_address: String, store: Box<dyn DurableStore>) -> Self {
        let api_client = reqwest::Client::builder()
            .build()
            .expect("Unable to create reqwest client");
        let inner = Arc::new(Mutex::new(ClientInner::restore(server_address, store)));
        let cancellation_token = CancellationToken::new();
        refresh::spawn_refresh_task(
            api_client.clone(),
            Arc::downgrade(&inner),
            cancellation_token.clone(),
        );
        Self {
            api_client,
            inner,
            _refresh_guard: Arc::new(cancellation_token.drop_guard()),
        }
    }

    /// Validates `token` against the identity endpoint and establishes the
    /// session.
    ///
    /// On failure of any kind the session ends fully cleared, never
    /// partially populated.
    #[tracing::instrument(skip(self, token))]
    pub async fn login(&self, token: AuthToken) -> Result<(), LoginFailed> {
        let server_address = self.server_address();
        match fetch_current_user(&self.api_client, &server_address, &token).await {
            Ok(user) => {
                self.lock_inner().apply_session(Some(Session { token, user }));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("log-in error: {e}");
                self.lock_inner().apply_session(None);
                Err(LoginFailed)
            }
        }
    }

    pub fn current_user(&self) -> Option<UserSummary> {
        self.lock_inner().session.as_ref().map(|s| s.user.clone())
    }

    /// The current user for views that cannot render without one
    pub fn try_current_user(&self) -> Result<UserSummary, NotLoggedInError> {
        self.current_user().ok_or(NotLoggedInError)
    }

    pub fn auth_token(&self) -> Option<AuthToken> {
        self.lock_inner().session.as_ref().map(|s| s.token.clone())
    }

    pub fn session(&self) -> Option<Session> {
        self.lock_inner().session.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.lock_inner().session.is_some()
    }

    fn server_address(&self) -> String {
        self.lock_inner().server_address.clone()
    }

    fn path_to_url(&self, path: &str) -> String {
        format!("{}{path}", self.server_address())
    }

    fn lock_inner(&self) -> MutexGuard<'_, ClientInner> {
        self.inner.lock().expect("mutex poisoned")
    }
}

/// Calls `GET /@me` with `token` as the bearer
#[tracing::instrument(skip(api_client, token))]
pub(crate) async fn fetch_current_user(
    api_client: &reqwest::Client,
    server_address: &str,
    token: &AuthToken,
) -> Result<UserSummary, IdentityError> {
    let response = api_client
        .request(PATH_ME.method, format!("{server_address}{}", PATH_ME.path))
        .bearer_auth(token.as_ref())
        .send()
        .await
        .context("failed to send request")?;
    let body: MeResponse = response
        .json()
        .await
        .context("failed to parse result as json")?;
    match (body.code, body.user) {
        (200, Some(user)) => Ok(user),
        _ => Err(IdentityError::InvalidToken),
    }
}
