use crate::helpers::{a_user, spawn_app_with_client};
use learnly_client_core::{set_serialized, Client, MemoryStore};
use learnly_shared::{
    const_config::storage::{STORAGE_KEY_TOKEN, STORAGE_KEY_USER},
    token::AuthToken,
};

#[tokio::test]
async fn logout_clears_the_session_and_notifies_the_server() {
    // Arrange
    let app = spawn_app_with_client().await;
    let token = app.issue_token();
    app.core_client.login(token).await.unwrap();
    assert_eq!(app.active_session_count(), 1);

    // Act
    app.core_client.logout().await;

    // Assert
    assert!(!app.core_client.is_logged_in());
    assert_eq!(app.log_out_calls(), 1);
    assert_eq!(app.active_session_count(), 0);
}

#[tokio::test]
async fn logout_clears_the_session_even_when_the_server_errors() {
    // Arrange
    let app = spawn_app_with_client().await;
    let token = app.issue_token();
    app.core_client.login(token).await.unwrap();
    app.fail_log_out();

    // Act
    app.core_client.logout().await;

    // Assert
    assert!(!app.core_client.is_logged_in());
    assert!(app.core_client.auth_token().is_none());
}

#[tokio::test]
async fn logout_clears_the_session_even_when_the_server_is_unreachable() {
    // Arrange - a preloaded session pointed at a closed port
    let mut store = MemoryStore::default();
    set_serialized(&mut store, STORAGE_KEY_TOKEN, &AuthToken::from("tok-123"));
    set_serialized(&mut store, STORAGE_KEY_USER, &a_user());
    let client = Client::new("http://127.0.0.1:9".to_string(), Box::new(store));
    assert!(client.is_logged_in());

    // Act
    client.logout().await;

    // Assert
    assert!(!client.is_logged_in());
}

#[tokio::test]
async fn logout_without_a_session_skips_the_server_call() {
    // Arrange
    let app = spawn_app_with_client().await;

    // Act
    app.core_client.logout().await;

    // Assert
    assert!(!app.core_client.is_logged_in());
    assert_eq!(app.log_out_calls(), 0);
}
