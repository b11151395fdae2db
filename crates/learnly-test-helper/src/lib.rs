//! Spins up a stub identity server implementing the wire contract of
//! `/log-in`, `/@me` and `/log-out` against an in-memory user table, so the
//! client core can be exercised over real HTTP without a database.

#![warn(unused_crate_dependencies)]

use actix_web::{http::StatusCode, web, App, HttpRequest, HttpResponse, HttpServer};
use anyhow::Context;
use secrecy::ExposeSecret as _;
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, Mutex, MutexGuard},
};
use tracing::info;

use learnly_shared::{
    const_config::path::{PATH_LOG_IN, PATH_LOG_OUT, PATH_ME},
    random_string, random_string_def_len,
    req_args::SignInReqArgs,
    responses::ErrorBody,
    telemetry::{self, get_subscriber, init_subscriber},
    token::AuthToken,
    user::UserSummary,
};
use learnly_time::{Seconds, Timestamp};

/// Stub sessions outlive any test by a wide margin
const SESSION_LIFETIME: Seconds = Seconds::new(3600);

// Ensure that the `tracing` stack is only initialised once
static TRACING: LazyLock<String> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let log_file_name = format!("client_tests_{}", random_string(8));
        let (file, path) = telemetry::create_trace_file(&log_file_name).unwrap();
        let subscriber = get_subscriber(subscriber_name, default_filter_level, file);
        init_subscriber(subscriber).unwrap();
        format!("Traces for tests being written to: {path:?}")
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).unwrap();
        "Traces set to std::io::sink".to_string()
    }
});

pub fn start_tracing() {
    LazyLock::force(&TRACING);
}

#[derive(Debug, Default)]
pub struct IdentityState {
    users: HashMap<String, StubUser>,
    sessions: HashMap<String, StubSession>,
    /// When set every token is rejected, simulating expiry on the server side
    reject_all: bool,
    /// When set `/log-out` answers with a server error
    fail_log_out: bool,
    log_out_calls: u32,
}

#[derive(Debug, Clone)]
struct StubUser {
    password: String,
    summary: UserSummary,
}

#[derive(Debug, Clone)]
struct StubSession {
    username: String,
    created: Timestamp,
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub username: String,
    pub password: String,
    pub display_name: String,
}

impl TestUser {
    pub fn generate() -> Self {
        Self {
            username: random_string(12),
            password: random_string_def_len(),
            display_name: random_string(12),
        }
    }

    fn summary(&self) -> UserSummary {
        UserSummary {
            username: self
                .username
                .as_str()
                .try_into()
                .expect("generated username is valid"),
            display_name: self
                .display_name
                .as_str()
                .try_into()
                .expect("generated display name is valid"),
            avatar: None,
            bio: None,
            country: "Trinidad and Tobago".to_string(),
            points: 7,
        }
    }
}

pub struct TestApp<C> {
    pub address: String,
    pub state: Arc<Mutex<IdentityState>>,
    pub core_client: C,
    pub test_user: TestUser,
}

impl<C> TestApp<C> {
    /// Mints a valid token for the seeded test user directly in the stub's
    /// session table (the equivalent of having signed in elsewhere)
    pub fn issue_token(&self) -> AuthToken {
        let token = AuthToken::new_rand();
        self.lock_state().sessions.insert(
            token.as_ref().to_string(),
            StubSession {
                username: self.test_user.username.clone(),
                created: Timestamp::now(),
            },
        );
        token
    }

    /// Changes the display name the identity endpoint reports for the test
    /// user, without touching any issued token
    pub fn rename_user(&self, new_display_name: &str) {
        let mut state = self.lock_state();
        let user = state
            .users
            .get_mut(&self.test_user.username)
            .expect("test user is seeded");
        user.summary.display_name = new_display_name
            .try_into()
            .expect("display name used in test is valid");
    }

    /// Makes `/@me` reject every token from now on
    pub fn reject_all_tokens(&self) {
        self.lock_state().reject_all = true;
    }

    /// Makes `/log-out` answer with a server error from now on
    pub fn fail_log_out(&self) {
        self.lock_state().fail_log_out = true;
    }

    pub fn log_out_calls(&self) -> u32 {
        self.lock_state().log_out_calls
    }

    pub fn active_session_count(&self) -> usize {
        self.lock_state().sessions.len()
    }

    fn lock_state(&self) -> MutexGuard<'_, IdentityState> {
        self.state.lock().expect("mutex poisoned")
    }
}

/// Starts the stub server on a random port and builds the client under test
/// against its address
pub async fn spawn_app<C>(make_client: impl FnOnce(String) -> C) -> TestApp<C> {
    let test_user = TestUser::generate();
    let mut state = IdentityState::default();
    state.users.insert(
        test_user.username.clone(),
        StubUser {
            password: test_user.password.clone(),
            summary: test_user.summary(),
        },
    );
    let state = Arc::new(Mutex::new(state));
    let address = spawn_stub_identity_server(Arc::clone(&state))
        .expect("failed to start stub identity server");
    TestApp {
        address: address.clone(),
        state,
        core_client: make_client(address),
        test_user,
    }
}

fn spawn_stub_identity_server(state: Arc<Mutex<IdentityState>>) -> anyhow::Result<String> {
    let listener =
        std::net::TcpListener::bind("127.0.0.1:0").context("failed to bind random port")?;
    let port = listener
        .local_addr()
        .context("failed to read local address")?
        .port();
    let data = web::Data::new(state);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route(PATH_LOG_IN.path, web::post().to(sign_in))
            .route(PATH_ME.path, web::get().to(me))
            .route(PATH_LOG_OUT.path, web::post().to(log_out))
    })
    .listen(listener)
    .context("failed to listen on bound port")?
    .run();
    tokio::spawn(server);
    let address = format!("http://localhost:{port}");
    info!("stub identity server listening on {address}");
    Ok(address)
}

type State = web::Data<Arc<Mutex<IdentityState>>>;

async fn sign_in(state: State, args: web::Json<SignInReqArgs>) -> HttpResponse {
    let mut state = state.lock().expect("mutex poisoned");
    let (password_ok, summary) = match state.users.get(&args.username) {
        Some(user) => (
            user.password == args.password.expose_secret(),
            user.summary.clone(),
        ),
        None => return exception_response(StatusCode::UNAUTHORIZED, "Invalid Credentials"),
    };
    if !password_ok {
        return exception_response(StatusCode::UNAUTHORIZED, "Invalid Credentials");
    }
    let token = AuthToken::new_rand();
    state.sessions.insert(
        token.as_ref().to_string(),
        StubSession {
            username: args.username.clone(),
            created: Timestamp::now(),
        },
    );
    standard_response(
        StatusCode::OK,
        serde_json::json!({ "user": summary, "token": token }),
    )
}

async fn me(req: HttpRequest, state: State) -> HttpResponse {
    let state = state.lock().expect("mutex poisoned");
    let denied =
        || exception_response(StatusCode::UNAUTHORIZED, "You are Not Authorised to View this Resource");
    let Some(token) = bearer_token(&req) else {
        return denied();
    };
    if state.reject_all {
        return denied();
    }
    let Some(session) = state.sessions.get(&token) else {
        return denied();
    };
    if session.created.elapsed().is_some_and(|age| age > SESSION_LIFETIME) {
        return denied();
    }
    let Some(user) = state.users.get(&session.username) else {
        return denied();
    };
    standard_response(StatusCode::OK, serde_json::json!({ "user": user.summary }))
}

async fn log_out(req: HttpRequest, state: State) -> HttpResponse {
    let mut state = state.lock().expect("mutex poisoned");
    state.log_out_calls += 1;
    if state.fail_log_out {
        return exception_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An Internal Server Error has Occured",
        );
    }
    if let Some(token) = bearer_token(&req) {
        state.sessions.remove(&token);
    }
    standard_response(
        StatusCode::OK,
        serde_json::json!({ "message": "Successfully Logged Out!" }),
    )
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    header.strip_prefix("Bearer ").map(ToString::to_string)
}

/// Mirrors the identity server's response envelope: `code` plus any extra
/// top-level fields
fn standard_response(status: StatusCode, extra: Value) -> HttpResponse {
    let mut body = serde_json::json!({ "code": status.as_u16() });
    if let Value::Object(extra) = extra {
        body.as_object_mut().expect("body is an object").extend(extra);
    }
    HttpResponse::build(status).json(body)
}

fn exception_response(status: StatusCode, message: &str) -> HttpResponse {
    let error = ErrorBody::new(status.canonical_reason().unwrap_or("Error"), message);
    standard_response(status, serde_json::json!({ "error": error }))
}
