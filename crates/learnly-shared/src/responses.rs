//! Wire shape of the identity server's responses.
//!
//! Every body carries a `code` mirroring the HTTP status and, on failure, an
//! `error` object with a short status and a human readable message. Success
//! payloads are flattened next to `code` rather than nested.

use crate::{token::AuthToken, user::UserSummary};

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: String,
    pub message: String,
}

/// Body returned by `GET /@me`
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct MeResponse {
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Body returned by `POST /log-in`
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SignInResponse {
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<AuthToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Body returned by `POST /log-out`
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SignOutResponse {
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ErrorBody {
    pub fn new<S: Into<String>, M: Into<String>>(status: S, message: M) -> Self {
        Self {
            status: status.into(),
            message: message.into(),
        }
    }
}
