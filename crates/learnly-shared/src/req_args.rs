//! This module stores the expected format of the arguments for the requests.
//! The structure is supposed to match the endpoints, for example `/log-in`
//! maps to [`SignInReqArgs`].

use secrecy::{ExposeSecret, SecretString};
use std::fmt::Debug;

#[derive(serde::Deserialize, Clone)]
pub struct SignInReqArgs {
    pub username: String,
    pub password: SecretString,
}

impl SignInReqArgs {
    pub fn new<S: Into<String>>(username: S, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl Debug for SignInReqArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInReqArgs")
            .field("username", &self.username)
            .field("has_password", &!self.password.expose_secret().is_empty())
            .finish()
    }
}
