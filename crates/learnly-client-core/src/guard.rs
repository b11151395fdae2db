//! Access control for protected views

use learnly_shared::user::UserSummary;

/// Outcome of an access check for a protected view
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The requested view may render
    Render,
    /// Navigate here instead. Carries the originally requested path as a
    /// `redirect` query parameter so the log-in flow can forward the user
    /// back afterwards
    Redirect(String),
}

/// Pure decision over the current session: logged in renders, anonymous is
/// sent to the log-in view
pub fn check_access(requested_path: &str, user: Option<&UserSummary>) -> AccessDecision {
    match user {
        Some(_) => AccessDecision::Render,
        None => AccessDecision::Redirect(format!("/log-in?redirect={requested_path}")),
    }
}
