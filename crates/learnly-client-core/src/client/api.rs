use anyhow::{anyhow, Context};
use secrecy::ExposeSecret as _;

use learnly_shared::{
    const_config::path::{PATH_LOG_IN, PATH_LOG_OUT},
    req_args::SignInReqArgs,
    responses::{SignInResponse, SignOutResponse},
    token::AuthToken,
    user::UserSummary,
};

use crate::Client;

#[derive(Debug, thiserror::Error)]
pub enum SignInError {
    #[error("Invalid Credentials")]
    InvalidCredentials,
    #[error("Unexpected Error")]
    Unexpected(#[from] anyhow::Error),
}

impl Client {
    /// Exchanges credentials for a token at `POST /log-in`.
    ///
    /// Does not touch the session; pass the returned token to
    /// [`Client::login`] to establish one.
    #[tracing::instrument(skip(args))]
    pub async fn request_token(
        &self,
        args: &SignInReqArgs,
    ) -> Result<(AuthToken, UserSummary), SignInError> {
        let args = serde_json::json!({
            "username": args.username,
            "password": args.password.expose_secret(),
        });
        let response = self
            .api_client
            .request(PATH_LOG_IN.method, self.path_to_url(PATH_LOG_IN.path))
            .json(&args)
            .send()
            .await
            .context("failed to send request")?;
        let body: SignInResponse = response
            .json()
            .await
            .context("failed to parse result as json")?;
        match body {
            SignInResponse {
                code: 200,
                token: Some(token),
                user: Some(user),
                ..
            } => Ok((token, user)),
            SignInResponse { code: 401, .. } => Err(SignInError::InvalidCredentials),
            SignInResponse { code, error, .. } => Err(SignInError::Unexpected(anyhow!(
                "sign-in rejected with code {code}: {}",
                error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "no error message".to_string())
            ))),
        }
    }

    /// Best-effort invalidation on the server followed by an unconditional
    /// local clear. Never raises to the caller.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(token) = self.auth_token() {
            if let Err(e) = self.invalidate_session(&token).await {
                tracing::warn!("failed to invalidate the session on the server: {e}");
            }
        }
        // Clear local state whether or not the server call went through
        self.lock_inner().apply_session(None);
    }

    async fn invalidate_session(&self, token: &AuthToken) -> anyhow::Result<()> {
        let response = self
            .api_client
            .request(PATH_LOG_OUT.method, self.path_to_url(PATH_LOG_OUT.path))
            .bearer_auth(token.as_ref())
            .json(&serde_json::json!({ "token": token.as_ref() }))
            .send()
            .await
            .context("failed to send request")?;
        let body: SignOutResponse = response
            .json()
            .await
            .context("failed to parse result as json")?;
        if body.code == 200 {
            Ok(())
        } else {
            Err(anyhow!(
                "log-out rejected with code {}: {}",
                body.code,
                body.error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "no error message".to_string())
            ))
        }
    }
}
