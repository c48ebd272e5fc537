use parley_shared::{
    id::CallId,
    req_args::{CallType, InitiateCallReqArgs, PageReqArgs},
};
use rstest::rstest;
use serde_json::json;

use crate::helpers::{no_cb, spawn_app, TEST_TOKEN};

#[tokio::test]
async fn initiate_call_body() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    app.backend.respond_with(
        "POST",
        "/calls/initiate",
        201,
        json!({"id": "k1", "status": "ringing"}),
    );
    let args = InitiateCallReqArgs {
        conversation_id: "c1".try_into().unwrap(),
        call_type: CallType::Video,
    };

    // Act
    let body = app
        .core_client
        .initiate_call(&args, no_cb)
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert_eq!(body["id"], "k1");
    let request = app.backend.single_request();
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.body,
        Some(json!({"conversationId": "c1", "callType": "video"}))
    );
}

#[rstest]
#[case::answer("answer")]
#[case::decline("decline")]
#[case::end("end")]
#[tokio::test]
async fn call_actions_post_without_body(#[case] action: &str) {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let call_id: CallId = "k9".try_into().unwrap();

    // Act
    let rx = match action {
        "answer" => app.core_client.answer_call(&call_id, no_cb),
        "decline" => app.core_client.decline_call(&call_id, no_cb),
        "end" => app.core_client.end_call(&call_id, no_cb),
        _ => unreachable!(),
    };
    rx.await.unwrap().unwrap();

    // Assert
    let request = app.backend.single_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, format!("/calls/k9/{action}"));
    assert!(request.body.is_none());
    assert_eq!(
        request.authorization,
        Some(format!("Bearer {TEST_TOKEN}"))
    );
}

#[tokio::test]
async fn call_history_default_page() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    app.backend
        .respond_with("GET", "/calls/history", 200, json!({"calls": []}));

    // Act
    let body = app
        .core_client
        .call_history(PageReqArgs::call_history_default(), no_cb)
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert_eq!(body, json!({"calls": []}));
    let request = app.backend.single_request();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/calls/history");
    assert_eq!(request.query, "page=1&limit=20");
}
