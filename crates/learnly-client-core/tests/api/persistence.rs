use crate::helpers::spawn_app_with_store;
use learnly_client_core::{get_parsed, set_serialized, Client, DurableStore, FileStore};
use learnly_shared::{
    const_config::storage::{STORAGE_KEY_TOKEN, STORAGE_KEY_USER},
    random_string,
    token::AuthToken,
    user::UserSummary,
};
use std::path::PathBuf;

fn temp_store_path() -> PathBuf {
    std::env::temp_dir().join(format!("learnly-session-{}.json", random_string(8)))
}

#[tokio::test]
async fn session_survives_a_restart() {
    // Arrange
    let path = temp_store_path();
    let app = spawn_app_with_store(Box::new(FileStore::open(&path))).await;
    let token = app.issue_token();
    app.core_client.login(token.clone()).await.unwrap();

    // Act - same durable file, fresh client: the page-reload analog
    let restarted = Client::new(app.address.clone(), Box::new(FileStore::open(&path)));

    // Assert - restored without any network call
    assert!(restarted.is_logged_in());
    assert_eq!(restarted.auth_token(), Some(token));
    assert_eq!(
        restarted.current_user().unwrap().username.as_ref(),
        app.test_user.username
    );
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn login_writes_both_keys_to_durable_storage() {
    // Arrange
    let path = temp_store_path();
    let app = spawn_app_with_store(Box::new(FileStore::open(&path))).await;
    let token = app.issue_token();

    // Act
    app.core_client.login(token.clone()).await.unwrap();

    // Assert
    let reopened = FileStore::open(&path);
    let stored_token: Option<AuthToken> = get_parsed(&reopened, STORAGE_KEY_TOKEN);
    let stored_user: Option<UserSummary> = get_parsed(&reopened, STORAGE_KEY_USER);
    assert_eq!(stored_token, Some(token));
    assert_eq!(
        stored_user.unwrap().username.as_ref(),
        app.test_user.username
    );
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn logout_removes_both_keys_from_durable_storage() {
    // Arrange
    let path = temp_store_path();
    let app = spawn_app_with_store(Box::new(FileStore::open(&path))).await;
    let token = app.issue_token();
    app.core_client.login(token).await.unwrap();

    // Act
    app.core_client.logout().await;

    // Assert
    let reopened = FileStore::open(&path);
    assert!(reopened.get(STORAGE_KEY_TOKEN).is_none());
    assert!(reopened.get(STORAGE_KEY_USER).is_none());
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn an_incomplete_stored_pair_is_cleared_at_startup() {
    // Arrange - a token with no matching user in storage
    let path = temp_store_path();
    let mut store = FileStore::open(&path);
    set_serialized(&mut store, STORAGE_KEY_TOKEN, &AuthToken::from("tok-123"));
    drop(store);

    // Act
    let client = Client::new(
        "http://localhost:8789".to_string(),
        Box::new(FileStore::open(&path)),
    );

    // Assert - in-memory and durable state both reconciled to anonymous
    assert!(!client.is_logged_in());
    let reopened = FileStore::open(&path);
    assert!(reopened.get(STORAGE_KEY_TOKEN).is_none());
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn a_corrupt_stored_user_is_treated_as_absent() {
    // Arrange
    let path = temp_store_path();
    let mut store = FileStore::open(&path);
    set_serialized(&mut store, STORAGE_KEY_TOKEN, &AuthToken::from("tok-123"));
    store.set(STORAGE_KEY_USER, serde_json::json!(["not", "a", "user"]));
    drop(store);

    // Act
    let client = Client::new(
        "http://localhost:8789".to_string(),
        Box::new(FileStore::open(&path)),
    );

    // Assert
    assert!(!client.is_logged_in());
    std::fs::remove_file(&path).unwrap();
}
