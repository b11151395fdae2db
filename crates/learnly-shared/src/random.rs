use rand::distributions::DistString as _;

/// Length used for tokens when the caller has no reason to pick another one
const DEFAULT_TOKEN_LEN: usize = 32;

pub fn random_string(len: usize) -> String {
    rand::distributions::Alphanumeric.sample_string(&mut rand::thread_rng(), len)
}

pub fn random_string_def_len() -> String {
    random_string(DEFAULT_TOKEN_LEN)
}
