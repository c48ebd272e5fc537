use parley_shared::req_args::{LoginReqArgs, RegisterReqArgs};
use rstest::rstest;
use serde_json::json;

use crate::helpers::{no_cb, spawn_app, wait_until, TEST_TOKEN};

#[tokio::test]
async fn login_stores_session() {
    // Arrange
    let app = spawn_app().await;
    let user = json!({"id": "u1", "name": "Ann", "email": "ann@example.com"});
    app.backend.respond_with(
        "POST",
        "/auth/login",
        200,
        json!({"token": TEST_TOKEN, "user": user}),
    );
    let login_args = LoginReqArgs::new("ann@example.com", "secret".to_string().into());

    // Act
    let body = app
        .core_client
        .login(login_args, no_cb)
        .await
        .unwrap()
        .unwrap();

    // Assert - Response passed through unchanged
    assert_eq!(body["token"], TEST_TOKEN);

    // Assert - Session stored
    assert_eq!(app.stored_token().as_deref(), Some(TEST_TOKEN));
    assert_eq!(app.core_client.user_data().unwrap().as_value(), &user);
    assert!(app.core_client.is_logged_in());

    // Assert - Credentials sent as json
    let request = app.backend.single_request();
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.body,
        Some(json!({"email": "ann@example.com", "password": "secret"}))
    );
    assert!(request.authorization.is_none());
}

#[tokio::test]
async fn login_failure_keeps_nothing() {
    // Arrange
    let app = spawn_app().await;
    app.backend.respond_with(
        "POST",
        "/auth/login",
        400,
        json!({"error": "Invalid credentials"}),
    );
    let login_args = LoginReqArgs::new("ann@example.com", "wrong".to_string().into());

    // Act
    let outcome = app.core_client.login(login_args, no_cb).await.unwrap();

    // Assert
    let err = outcome.unwrap_err();
    assert!(err.to_string().contains("Invalid credentials"), "{err:#}");
    assert!(!app.core_client.is_logged_in());
}

#[rstest]
#[case::missing(json!({"user": {"id": "u1"}}))]
#[case::empty(json!({"token": "", "user": {"id": "u1"}}))]
#[tokio::test]
async fn login_without_token_in_response_stores_nothing(#[case] response: serde_json::Value) {
    // Arrange
    let app = spawn_app().await;
    app.backend.respond_with("POST", "/auth/login", 200, response);
    let login_args = LoginReqArgs::new("ann@example.com", "secret".to_string().into());

    // Act
    let outcome = app.core_client.login(login_args, no_cb).await.unwrap();

    // Assert
    assert!(outcome.is_ok());
    assert!(app.stored_token().is_none());
    assert!(app.core_client.user_data().is_none());
}

#[tokio::test]
async fn register_stores_session() {
    // Arrange
    let app = spawn_app().await;
    app.backend.respond_with(
        "POST",
        "/auth/register",
        201,
        json!({"token": TEST_TOKEN, "user": {"id": "u2", "name": "Bo"}}),
    );
    let args = RegisterReqArgs::new("bo@example.com", "pw".to_string().into(), "Bo");

    // Act
    let outcome = app.core_client.register(args, no_cb).await.unwrap();

    // Assert
    assert!(outcome.is_ok());
    assert_eq!(app.stored_token().as_deref(), Some(TEST_TOKEN));
    assert_eq!(
        app.backend.single_request().body,
        Some(json!({"email": "bo@example.com", "password": "pw", "name": "Bo"}))
    );
}

#[tokio::test]
async fn logout_sends_token_then_clears_session() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);

    // Act
    let rx = app.core_client.logout(no_cb);

    // Assert - Cleared without waiting for the response
    assert!(app.stored_token().is_none());
    assert!(app.core_client.user_data().is_none());

    // Assert - Request still carried the token
    rx.await.unwrap().unwrap();
    let request = app.backend.single_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/auth/logout");
    assert_eq!(
        request.authorization.as_deref(),
        Some(format!("Bearer {TEST_TOKEN}").as_str())
    );
}

#[tokio::test]
async fn logout_clears_session_even_if_request_fails() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    app.backend
        .respond_with("POST", "/auth/logout", 500, json!({"error": "boom"}));

    // Act
    let outcome = app.core_client.logout(no_cb).await.unwrap();

    // Assert
    assert!(outcome.is_err());
    assert!(app.stored_token().is_none());
}

#[tokio::test]
async fn logout_no_wait_clears_session() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);

    // Act
    app.core_client.logout_no_wait();

    // Assert
    assert!(app.stored_token().is_none());
    wait_until(|| app.backend.requests().len() == 1)
        .await
        .unwrap();
    assert_eq!(app.backend.single_request().path, "/auth/logout");
}

#[tokio::test]
async fn current_user_uses_get() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    app.backend
        .respond_with("GET", "/auth/me", 200, json!({"id": "u1", "name": "Ann"}));

    // Act
    let body = app
        .core_client
        .current_user(no_cb)
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert_eq!(body, json!({"id": "u1", "name": "Ann"}));
    let request = app.backend.single_request();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/auth/me");
    assert_eq!(request.query, "");
}
