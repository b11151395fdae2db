//! Stores settings that are not expected to need to change but grouped
//! together for discoverability and reuse. Each constant is prefixed by the
//! module name to allow importing the constant only and still be readable

use learnly_time::Seconds;

pub mod client {
    use super::*;
    /// How often the background task re-validates the stored token while one
    /// is present
    pub const CLIENT_SESSION_REFRESH_INTERVAL: Seconds = Seconds::new(60);
}

pub mod storage {
    /// Durable-store keys for the persisted session. The session store is
    /// the sole writer of these keys
    pub const STORAGE_KEY_TOKEN: &str = "token";
    pub const STORAGE_KEY_USER: &str = "user";
}

pub mod path {
    mod path_spec;
    pub use path_spec::PathSpec;
    pub const PATH_LOG_IN: PathSpec = PathSpec::post("/log-in");
    pub const PATH_LOG_OUT: PathSpec = PathSpec::post("/log-out");
    pub const PATH_ME: PathSpec = PathSpec::get("/@me");
}
