use parley_client_core::ConnectionState;
use parley_shared::{
    events::{
        names::*, AuthenticatedBody, ChatEvent, EventBody, EventFamily, LifecycleEvent,
        PresenceEvent, TypingEvent,
    },
    id::{CallId, ConversationId},
};
use rstest::rstest;
use serde_json::{json, Value};
use std::time::Duration;

use crate::helpers::{spawn_app, wait_until, Recorder, TEST_TOKEN};

fn conversation(id: &str) -> ConversationId {
    id.try_into().unwrap()
}

fn call(id: &str) -> CallId {
    id.try_into().unwrap()
}

#[tokio::test]
async fn connect_without_token_does_nothing() {
    // Arrange
    let app = spawn_app().await;
    let (channel, connector) = app.mock_event_channel();

    // Act
    channel.connect().await.unwrap();

    // Assert
    assert_eq!(channel.state(), ConnectionState::Disconnected);
    assert_eq!(connector.connect_count(), 0);
}

#[tokio::test]
async fn connect_with_empty_token_does_nothing() {
    // Arrange
    let app = spawn_app().await;
    app.store_token("");
    let (channel, connector) = app.mock_event_channel();

    // Act
    channel.connect().await.unwrap();

    // Assert
    assert_eq!(channel.state(), ConnectionState::Disconnected);
    assert_eq!(connector.connect_count(), 0);
    assert!(connector.emitted().is_empty());
}

#[tokio::test]
async fn socket_url_is_api_url_without_suffix() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();

    // Act
    channel.connect().await.unwrap();

    // Assert
    let expected = app.address.strip_suffix("/api").unwrap().to_string();
    assert_eq!(connector.connect_urls(), vec![expected]);
}

#[tokio::test]
async fn authenticates_once_connected() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();

    // Act - Connect
    channel.connect().await.unwrap();

    // Assert - Nothing sent before the transport reports it is up
    assert_eq!(channel.state(), ConnectionState::Connecting);
    assert!(connector.emitted().is_empty());

    // Act - Transport up
    connector.inject(EVENT_CONNECT, Value::Null);

    // Assert - Exactly one authenticate carrying the token
    wait_until(|| !connector.emitted().is_empty()).await.unwrap();
    assert_eq!(
        connector.emitted(),
        vec![(EVENT_AUTHENTICATE.to_string(), json!(TEST_TOKEN))]
    );
    assert_eq!(channel.state(), ConnectionState::ConnectedUnauthenticated);
    assert!(!channel.is_connected());

    // Act - Backend accepts the token
    connector.inject(EVENT_AUTHENTICATED, json!({"user": {"id": "u1"}}));

    // Assert
    wait_until(|| channel.is_connected()).await.unwrap();
    assert_eq!(channel.state(), ConnectionState::ConnectedAuthenticated);
    assert_eq!(connector.emitted().len(), 1);
}

#[tokio::test]
async fn authentication_error_disconnects() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    let lifecycle = Recorder::<LifecycleEvent>::new();
    channel.on_lifecycle(lifecycle.handler());
    channel.connect().await.unwrap();
    connector.inject(EVENT_CONNECT, Value::Null);

    // Act
    connector.inject(EVENT_AUTHENTICATION_ERROR, json!({"message": "bad token"}));

    // Assert
    wait_until(|| lifecycle.len() == 2).await.unwrap();
    assert_eq!(channel.state(), ConnectionState::Disconnected);
    assert_eq!(connector.closed(), vec![1]);
    assert_eq!(
        lifecycle.events(),
        vec![
            LifecycleEvent::Connected,
            LifecycleEvent::AuthenticationError(EventBody::new(json!({"message": "bad token"}))),
        ]
    );
}

#[tokio::test]
async fn server_disconnect_updates_state() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    channel.connect().await.unwrap();
    connector.inject(EVENT_CONNECT, Value::Null);
    connector.inject(EVENT_AUTHENTICATED, json!({}));
    wait_until(|| channel.is_connected()).await.unwrap();

    // Act
    connector.inject(EVENT_DISCONNECT, json!("transport close"));

    // Assert
    wait_until(|| channel.state() == ConnectionState::Disconnected)
        .await
        .unwrap();
    assert!(!channel.is_connected());

    // Assert - Publishing afterwards goes nowhere
    channel.join_conversation(&conversation("c1")).await;
    assert_eq!(connector.emitted().len(), 1);
}

#[tokio::test]
async fn disconnect_twice_is_fine() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    channel.connect().await.unwrap();

    // Act
    channel.disconnect().await;
    channel.disconnect().await;

    // Assert
    assert_eq!(channel.state(), ConnectionState::Disconnected);
    assert_eq!(connector.closed(), vec![1]);
}

#[tokio::test]
async fn reconnect_replaces_connection() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    channel.connect().await.unwrap();

    // Act
    channel.connect().await.unwrap();

    // Assert
    assert_eq!(connector.connect_count(), 2);
    assert_eq!(connector.closed(), vec![1]);
    assert_eq!(channel.state(), ConnectionState::Connecting);
}

#[tokio::test]
async fn events_from_replaced_connection_ignored() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    let lifecycle = Recorder::<LifecycleEvent>::new();
    channel.on_lifecycle(lifecycle.handler());
    channel.connect().await.unwrap();
    channel.connect().await.unwrap();

    // Act - Old connection still talking
    connector.inject_on(1, EVENT_CONNECT, Value::Null);
    connector.inject_on(1, EVENT_AUTHENTICATED, json!({}));
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Assert
    assert_eq!(channel.state(), ConnectionState::Connecting);
    assert!(connector.emitted().is_empty());
    assert_eq!(lifecycle.len(), 0);

    // Act - New connection comes up
    connector.inject_on(2, EVENT_CONNECT, Value::Null);

    // Assert - Authenticates on the new connection only
    wait_until(|| lifecycle.len() == 1).await.unwrap();
    assert!(connector.emitted_on(1).is_empty());
    assert_eq!(connector.emitted_on(2).len(), 1);
}

#[tokio::test]
async fn connect_failure_reported() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    let lifecycle = Recorder::<LifecycleEvent>::new();
    channel.on_lifecycle(lifecycle.handler());
    connector.fail_next_connect("connection refused");

    // Act
    let outcome = channel.connect().await;

    // Assert
    let err = outcome.unwrap_err();
    assert!(format!("{err:#}").contains("connection refused"), "{err:#}");
    assert_eq!(channel.state(), ConnectionState::Disconnected);
    let events = lifecycle.events();
    assert_eq!(events.len(), 1);
    assert!(
        matches!(&events[0], LifecycleEvent::ConnectError(body) if body.as_value().as_str().unwrap().contains("connection refused")),
        "{events:?}"
    );
}

#[rstest]
#[case::join_conversation(EVENT_JOIN_CONVERSATION)]
#[case::typing_start(EVENT_TYPING_START)]
#[case::join_call(EVENT_JOIN_CALL)]
#[case::call_offer(EVENT_CALL_OFFER)]
#[tokio::test]
async fn publish_without_connection_is_noop(#[case] event: &str) {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();

    // Act
    match event {
        EVENT_JOIN_CONVERSATION => channel.join_conversation(&conversation("c1")).await,
        EVENT_TYPING_START => channel.start_typing(&conversation("c1")).await,
        EVENT_JOIN_CALL => channel.join_call(&call("k1")).await,
        EVENT_CALL_OFFER => channel.send_call_offer(&call("k1"), json!({"sdp": "x"})).await,
        _ => unreachable!(),
    }

    // Assert
    assert!(connector.emitted().is_empty());
    assert_eq!(channel.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn publish_payloads() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    channel.connect().await.unwrap();
    connector.inject(EVENT_CONNECT, Value::Null);
    wait_until(|| connector.emitted().len() == 1).await.unwrap();

    // Act
    channel.join_conversation(&conversation("c1")).await;
    channel.leave_conversation(&conversation("c1")).await;
    channel.start_typing(&conversation("c1")).await;
    channel.stop_typing(&conversation("c1")).await;
    channel.join_call(&call("k1")).await;
    channel.leave_call(&call("k1")).await;
    channel.send_call_offer(&call("k1"), json!({"sdp": "o"})).await;
    channel.send_call_answer(&call("k1"), json!({"sdp": "a"})).await;
    channel
        .send_ice_candidate(&call("k1"), json!({"candidate": "c"}))
        .await;

    // Assert
    let expected: Vec<(String, Value)> = vec![
        (EVENT_AUTHENTICATE, json!(TEST_TOKEN)),
        (EVENT_JOIN_CONVERSATION, json!("c1")),
        (EVENT_LEAVE_CONVERSATION, json!("c1")),
        (EVENT_TYPING_START, json!({"conversationId": "c1"})),
        (EVENT_TYPING_STOP, json!({"conversationId": "c1"})),
        (EVENT_JOIN_CALL, json!("k1")),
        (EVENT_LEAVE_CALL, json!("k1")),
        (EVENT_CALL_OFFER, json!({"callId": "k1", "offer": {"sdp": "o"}})),
        (EVENT_CALL_ANSWER, json!({"callId": "k1", "answer": {"sdp": "a"}})),
        (
            EVENT_ICE_CANDIDATE,
            json!({"callId": "k1", "candidate": {"candidate": "c"}}),
        ),
    ]
    .into_iter()
    .map(|(name, payload)| (name.to_string(), payload))
    .collect();
    assert_eq!(connector.emitted(), expected);
}

#[tokio::test]
async fn events_routed_to_family_handlers() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    let chat = Recorder::<ChatEvent>::new();
    let typing = Recorder::<TypingEvent>::new();
    let presence = Recorder::<PresenceEvent>::new();
    channel.on_chat(chat.handler());
    channel.on_typing(typing.handler());
    channel.on_presence(presence.handler());
    channel.connect().await.unwrap();

    // Act
    connector.inject(EVENT_NEW_MESSAGE, json!({"id": "m1", "content": "hi"}));
    connector.inject(EVENT_USER_TYPING, json!({"userId": "u2"}));
    connector.inject(EVENT_USER_STOP_TYPING, json!({"userId": "u2"}));
    connector.inject(EVENT_USER_ONLINE, json!({"userId": "u3"}));
    connector.inject("some_future_event", json!({}));
    connector.inject(EVENT_USER_OFFLINE, json!({"userId": "u3"}));

    // Assert
    wait_until(|| presence.len() == 2).await.unwrap();
    assert_eq!(
        chat.events(),
        vec![ChatEvent::NewMessage(EventBody::new(
            json!({"id": "m1", "content": "hi"})
        ))]
    );
    assert_eq!(
        typing.events(),
        vec![
            TypingEvent::UserTyping(EventBody::new(json!({"userId": "u2"}))),
            TypingEvent::UserStopTyping(EventBody::new(json!({"userId": "u2"}))),
        ]
    );
    assert_eq!(
        presence.events(),
        vec![
            PresenceEvent::UserOnline(EventBody::new(json!({"userId": "u3"}))),
            PresenceEvent::UserOffline(EventBody::new(json!({"userId": "u3"}))),
        ]
    );
}

#[tokio::test]
async fn replacing_handler_drops_previous() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    let first = Recorder::<ChatEvent>::new();
    let second = Recorder::<ChatEvent>::new();

    // Act
    let replaced_first = channel.on_chat(first.handler());
    let replaced_second = channel.on_chat(second.handler());
    channel.connect().await.unwrap();
    connector.inject(EVENT_NEW_MESSAGE, json!({"id": "m1"}));

    // Assert
    assert!(!replaced_first);
    assert!(replaced_second);
    wait_until(|| second.len() == 1).await.unwrap();
    assert_eq!(first.len(), 0);
}

#[tokio::test]
async fn cleared_handler_not_called() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    let chat = Recorder::<ChatEvent>::new();
    let lifecycle = Recorder::<LifecycleEvent>::new();
    channel.on_chat(chat.handler());
    channel.on_lifecycle(lifecycle.handler());

    // Act
    assert!(channel.clear_handler(EventFamily::Chat));
    channel.connect().await.unwrap();
    connector.inject(EVENT_NEW_MESSAGE, json!({"id": "m1"}));
    connector.inject(EVENT_CONNECT, Value::Null);

    // Assert - Lifecycle event after the chat one proves it was processed
    wait_until(|| lifecycle.len() == 1).await.unwrap();
    assert_eq!(chat.len(), 0);
    assert!(!channel.has_handler(EventFamily::Chat));
    assert!(!channel.clear_handler(EventFamily::Chat));
}

#[tokio::test]
async fn handlers_survive_reconnect() {
    // Arrange
    let app = spawn_app().await;
    app.store_token(TEST_TOKEN);
    let (channel, connector) = app.mock_event_channel();
    let lifecycle = Recorder::<LifecycleEvent>::new();
    channel.on_lifecycle(lifecycle.handler());
    channel.connect().await.unwrap();
    channel.disconnect().await;

    // Act
    channel.connect().await.unwrap();
    connector.inject(EVENT_CONNECT, Value::Null);
    connector.inject(EVENT_AUTHENTICATED, json!({"user": {"id": "u1"}}));

    // Assert
    wait_until(|| lifecycle.len() == 2).await.unwrap();
    assert_eq!(
        lifecycle.events()[1],
        LifecycleEvent::Authenticated(AuthenticatedBody {
            user: Some(parley_shared::user::UserData::new(json!({"id": "u1"}))),
        })
    );
}
