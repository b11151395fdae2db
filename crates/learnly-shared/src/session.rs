use crate::{token::AuthToken, user::UserSummary};

/// The in-memory record of the current authentication token and user
/// identity.
///
/// Invariant: token and user exist together or not at all, which is why this
/// is a single struct rather than two independent options.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: AuthToken,
    pub user: UserSummary,
}
