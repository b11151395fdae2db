use crate::helpers::spawn_app_with_client;
use learnly_client_core::SignInError;
use learnly_shared::req_args::SignInReqArgs;

#[tokio::test]
async fn sign_in_then_login_round_trip() {
    // Arrange
    let app = spawn_app_with_client().await;
    let args = SignInReqArgs::new(
        app.test_user.username.clone(),
        app.test_user.password.clone().into(),
    );

    // Act - exchange credentials for a token
    let (token, user) = app.core_client.request_token(&args).await.unwrap();

    // Assert - the exchange itself does not establish a session
    assert_eq!(user.username.as_ref(), app.test_user.username);
    assert!(!app.core_client.is_logged_in());

    // Act - establish the session with the returned token
    app.core_client.login(token).await.unwrap();

    // Assert
    assert!(app.core_client.is_logged_in());
}

#[tokio::test]
async fn sign_in_with_wrong_password_is_rejected() {
    // Arrange
    let app = spawn_app_with_client().await;
    let args = SignInReqArgs::new(
        app.test_user.username.clone(),
        "random-password".to_string().into(),
    );

    // Act
    let outcome = app.core_client.request_token(&args).await;

    // Assert
    assert!(matches!(outcome, Err(SignInError::InvalidCredentials)));
    assert!(!app.core_client.is_logged_in());
}

#[tokio::test]
async fn sign_in_with_unknown_user_is_rejected() {
    // Arrange
    let app = spawn_app_with_client().await;
    let args = SignInReqArgs::new("random-username", "random-password".to_string().into());

    // Act
    let outcome = app.core_client.request_token(&args).await;

    // Assert
    assert!(matches!(outcome, Err(SignInError::InvalidCredentials)));
}
