//! Passive refresh: periodic background re-validation of the stored token.
//!
//! The task is owned by the client's lifecycle: started on construction and
//! cancelled when the last clone of the client is dropped.

use std::sync::{Mutex, Weak};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use learnly_shared::{const_config::client::CLIENT_SESSION_REFRESH_INTERVAL, session::Session};

use super::{fetch_current_user, ClientInner};

pub(super) fn spawn_refresh_task(
    api_client: reqwest::Client,
    inner: Weak<Mutex<ClientInner>>,
    cancellation_token: CancellationToken,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLIENT_SESSION_REFRESH_INTERVAL.into());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // First tick completes immediately
        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    tracing::info!("session refresh task stopped");
                    break;
                }
                _ = interval.tick() => {}
            }
            let Some(inner) = inner.upgrade() else { break };
            refresh_session(&api_client, &inner).await;
        }
    });
}

/// Re-applies a successful fetch. A failure is logged and leaves the session
/// untouched: only an explicit login clears on failure, so a token the
/// server no longer accepts can sit here until the user acts.
#[tracing::instrument(skip_all)]
pub(super) async fn refresh_session(api_client: &reqwest::Client, inner: &Mutex<ClientInner>) {
    let snapshot = {
        let guard = inner.lock().expect("mutex poisoned");
        guard
            .session
            .as_ref()
            .map(|s| (s.token.clone(), guard.server_address.clone()))
    };
    let Some((token, server_address)) = snapshot else {
        return;
    };
    match fetch_current_user(api_client, &server_address, &token).await {
        Ok(user) => {
            let mut guard = inner.lock().expect("mutex poisoned");
            // Skip the write if the session changed while the fetch was in
            // flight, the newer transition wins
            if guard.session.as_ref().is_some_and(|s| s.token == token) {
                guard.apply_session(Some(Session { token, user }));
            }
        }
        Err(e) => tracing::warn!("session refresh failed: {e}"),
    }
}
