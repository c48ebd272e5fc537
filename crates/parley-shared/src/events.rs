//! Events exchanged over the realtime event channel
//!
//! Outbound events are built by the client so their payloads are fully typed.
//! Inbound payloads are defined by the backend, they are grouped by family
//! and variant here but the bodies themselves are passed through untouched

use crate::{
    id::{CallId, ConversationId},
    token::AuthToken,
    user::UserData,
};
use serde_json::{json, Value};

/// Groups inbound events. Each family has at most one registered handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EventFamily {
    Lifecycle,
    Chat,
    Typing,
    Call,
    Signaling,
    Presence,
}

/// Events sent by the client
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Authenticate(AuthToken),
    JoinConversation(ConversationId),
    LeaveConversation(ConversationId),
    TypingStart(ConversationId),
    TypingStop(ConversationId),
    JoinCall(CallId),
    LeaveCall(CallId),
    CallOffer { call_id: CallId, offer: Value },
    CallAnswer { call_id: CallId, answer: Value },
    IceCandidate { call_id: CallId, candidate: Value },
}

/// Body of an inbound event as sent by the backend
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EventBody(Value);

/// Body of the `authenticated` acknowledgment
#[derive(Debug, Clone, PartialEq, Default, serde::Deserialize)]
pub struct AuthenticatedBody {
    #[serde(default)]
    pub user: Option<UserData>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// The transport finished connecting, authentication is sent next
    Connected,
    Authenticated(AuthenticatedBody),
    AuthenticationError(EventBody),
    Disconnected(EventBody),
    ConnectError(EventBody),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    NewMessage(EventBody),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypingEvent {
    UserTyping(EventBody),
    UserStopTyping(EventBody),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    Incoming(EventBody),
    Answered(EventBody),
    Declined(EventBody),
    Ended(EventBody),
}

/// Peer connection setup relayed by the backend, not interpreted here
#[derive(Debug, Clone, PartialEq)]
pub enum SignalingEvent {
    Offer(EventBody),
    Answer(EventBody),
    IceCandidate(EventBody),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresenceEvent {
    UserOnline(EventBody),
    UserOffline(EventBody),
}

/// Any inbound event the client understands
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Lifecycle(LifecycleEvent),
    Chat(ChatEvent),
    Typing(TypingEvent),
    Call(CallEvent),
    Signaling(SignalingEvent),
    Presence(PresenceEvent),
}

pub mod names {
    pub const EVENT_AUTHENTICATE: &str = "authenticate";
    pub const EVENT_AUTHENTICATED: &str = "authenticated";
    pub const EVENT_AUTHENTICATION_ERROR: &str = "authentication_error";
    pub const EVENT_CALL_ANSWER: &str = "call_answer";
    pub const EVENT_CALL_ANSWERED: &str = "call_answered";
    pub const EVENT_CALL_DECLINED: &str = "call_declined";
    pub const EVENT_CALL_ENDED: &str = "call_ended";
    pub const EVENT_CALL_OFFER: &str = "call_offer";
    pub const EVENT_CONNECT: &str = "connect";
    pub const EVENT_CONNECT_ERROR: &str = "connect_error";
    pub const EVENT_DISCONNECT: &str = "disconnect";
    pub const EVENT_ICE_CANDIDATE: &str = "ice_candidate";
    pub const EVENT_INCOMING_CALL: &str = "incoming_call";
    pub const EVENT_JOIN_CALL: &str = "join_call";
    pub const EVENT_JOIN_CONVERSATION: &str = "join_conversation";
    pub const EVENT_LEAVE_CALL: &str = "leave_call";
    pub const EVENT_LEAVE_CONVERSATION: &str = "leave_conversation";
    pub const EVENT_NEW_MESSAGE: &str = "new_message";
    pub const EVENT_TYPING_START: &str = "typing_start";
    pub const EVENT_TYPING_STOP: &str = "typing_stop";
    pub const EVENT_USER_OFFLINE: &str = "user_offline";
    pub const EVENT_USER_ONLINE: &str = "user_online";
    pub const EVENT_USER_STOP_TYPING: &str = "user_stop_typing";
    pub const EVENT_USER_TYPING: &str = "user_typing";
}

use names::*;

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Authenticate(_) => EVENT_AUTHENTICATE,
            ClientEvent::JoinConversation(_) => EVENT_JOIN_CONVERSATION,
            ClientEvent::LeaveConversation(_) => EVENT_LEAVE_CONVERSATION,
            ClientEvent::TypingStart(_) => EVENT_TYPING_START,
            ClientEvent::TypingStop(_) => EVENT_TYPING_STOP,
            ClientEvent::JoinCall(_) => EVENT_JOIN_CALL,
            ClientEvent::LeaveCall(_) => EVENT_LEAVE_CALL,
            ClientEvent::CallOffer { .. } => EVENT_CALL_OFFER,
            ClientEvent::CallAnswer { .. } => EVENT_CALL_ANSWER,
            ClientEvent::IceCandidate { .. } => EVENT_ICE_CANDIDATE,
        }
    }

    /// The payload as the backend expects it
    pub fn into_payload(self) -> Value {
        match self {
            ClientEvent::Authenticate(token) => token.into(),
            ClientEvent::JoinConversation(id) | ClientEvent::LeaveConversation(id) => {
                Value::String(id.into())
            }
            ClientEvent::TypingStart(id) | ClientEvent::TypingStop(id) => {
                json!({ "conversationId": id })
            }
            ClientEvent::JoinCall(id) | ClientEvent::LeaveCall(id) => Value::String(id.into()),
            ClientEvent::CallOffer { call_id, offer } => json!({ "callId": call_id, "offer": offer }),
            ClientEvent::CallAnswer { call_id, answer } => {
                json!({ "callId": call_id, "answer": answer })
            }
            ClientEvent::IceCandidate { call_id, candidate } => {
                json!({ "callId": call_id, "candidate": candidate })
            }
        }
    }
}

impl EventBody {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl ServerEvent {
    /// Maps an inbound event name to its typed form
    ///
    /// Returns `None` for names the client does not know about
    pub fn from_wire(name: &str, payload: Value) -> Option<Self> {
        let body = EventBody::new(payload);
        let result = match name {
            EVENT_CONNECT => Self::Lifecycle(LifecycleEvent::Connected),
            EVENT_AUTHENTICATED => Self::Lifecycle(LifecycleEvent::Authenticated(
                // A malformed body still means the backend accepted the token
                serde_json::from_value(body.into_inner()).unwrap_or_default(),
            )),
            EVENT_AUTHENTICATION_ERROR => {
                Self::Lifecycle(LifecycleEvent::AuthenticationError(body))
            }
            EVENT_DISCONNECT => Self::Lifecycle(LifecycleEvent::Disconnected(body)),
            EVENT_CONNECT_ERROR => Self::Lifecycle(LifecycleEvent::ConnectError(body)),
            EVENT_NEW_MESSAGE => Self::Chat(ChatEvent::NewMessage(body)),
            EVENT_USER_TYPING => Self::Typing(TypingEvent::UserTyping(body)),
            EVENT_USER_STOP_TYPING => Self::Typing(TypingEvent::UserStopTyping(body)),
            EVENT_INCOMING_CALL => Self::Call(CallEvent::Incoming(body)),
            EVENT_CALL_ANSWERED => Self::Call(CallEvent::Answered(body)),
            EVENT_CALL_DECLINED => Self::Call(CallEvent::Declined(body)),
            EVENT_CALL_ENDED => Self::Call(CallEvent::Ended(body)),
            EVENT_CALL_OFFER => Self::Signaling(SignalingEvent::Offer(body)),
            EVENT_CALL_ANSWER => Self::Signaling(SignalingEvent::Answer(body)),
            EVENT_ICE_CANDIDATE => Self::Signaling(SignalingEvent::IceCandidate(body)),
            EVENT_USER_ONLINE => Self::Presence(PresenceEvent::UserOnline(body)),
            EVENT_USER_OFFLINE => Self::Presence(PresenceEvent::UserOffline(body)),
            _ => return None,
        };
        Some(result)
    }

    pub fn family(&self) -> EventFamily {
        match self {
            ServerEvent::Lifecycle(_) => EventFamily::Lifecycle,
            ServerEvent::Chat(_) => EventFamily::Chat,
            ServerEvent::Typing(_) => EventFamily::Typing,
            ServerEvent::Call(_) => EventFamily::Call,
            ServerEvent::Signaling(_) => EventFamily::Signaling,
            ServerEvent::Presence(_) => EventFamily::Presence,
        }
    }
}
