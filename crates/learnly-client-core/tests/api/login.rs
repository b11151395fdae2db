use crate::helpers::spawn_app_with_client;

#[tokio::test]
async fn login_success_populates_the_session() {
    // Arrange
    let app = spawn_app_with_client().await;
    let token = app.issue_token();

    // Act
    app.core_client.login(token.clone()).await.unwrap();

    // Assert
    assert!(app.core_client.is_logged_in());
    let user = app.core_client.current_user().unwrap();
    assert_eq!(user.username.as_ref(), app.test_user.username);
    assert_eq!(app.core_client.auth_token(), Some(token));
    assert!(app.core_client.try_current_user().is_ok());
}

#[tokio::test]
async fn login_with_rejected_token_fails_and_clears() {
    // Arrange
    let app = spawn_app_with_client().await;

    // Act
    let outcome = app.core_client.login("not-a-real-token".into()).await;

    // Assert
    assert_eq!(outcome.unwrap_err().to_string(), "Log-In Failed");
    assert!(!app.core_client.is_logged_in());
    assert!(app.core_client.auth_token().is_none());
    assert!(app.core_client.current_user().is_none());
    assert_eq!(
        app.core_client.try_current_user().unwrap_err().to_string(),
        "The user has not logged in"
    );
}

#[tokio::test]
async fn failed_login_replaces_an_existing_session() {
    // Arrange
    let app = spawn_app_with_client().await;
    let token = app.issue_token();
    app.core_client.login(token).await.unwrap();

    // Act
    let outcome = app.core_client.login("expired-token".into()).await;

    // Assert
    assert!(outcome.is_err());
    assert!(!app.core_client.is_logged_in());
}

#[tokio::test]
async fn token_and_user_are_always_paired() {
    // Arrange
    let app = spawn_app_with_client().await;
    let paired = |client: &learnly_client_core::Client| {
        client.auth_token().is_some() == client.current_user().is_some()
    };
    assert!(paired(&app.core_client));

    // Act + Assert after each transition
    let _ = app.core_client.login("bad-token".into()).await;
    assert!(paired(&app.core_client));

    let token = app.issue_token();
    app.core_client.login(token).await.unwrap();
    assert!(paired(&app.core_client));

    app.core_client.logout().await;
    assert!(paired(&app.core_client));
}
