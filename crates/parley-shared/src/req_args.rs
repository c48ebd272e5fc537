//! This module stores the expected format of the arguments for the requests.
//! Names follow the endpoint they are sent to, for example `/auth/login` maps
//! to [`LoginReqArgs`]. Structs holding secrets are not serializable and are
//! turned into json by the client so the secret is only exposed there

use crate::{
    const_config::pagination::{
        PAGINATION_CALL_HISTORY_LIMIT, PAGINATION_FIRST_PAGE, PAGINATION_MESSAGES_LIMIT,
    },
    id::{ConversationId, UserId},
};
use secrecy::{ExposeSecret, SecretString};
use std::fmt::Debug;

#[derive(serde::Deserialize, Clone)]
pub struct LoginReqArgs {
    pub email: String,
    pub password: SecretString,
}

#[derive(serde::Deserialize, Clone)]
pub struct RegisterReqArgs {
    pub email: String,
    pub password: SecretString,
    pub name: String,
}

/// Query string for the paginated list endpoints
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PageReqArgs {
    pub page: u32,
    pub limit: u32,
}

/// Free form on the backend, `text` unless the caller says otherwise
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct MessageType(String);

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageReqArgs {
    pub content: String,
    pub message_type: MessageType,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationReqArgs {
    #[serde(rename = "type")]
    pub kind: String,
    pub participant_ids: Vec<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CallType {
    Voice,
    Video,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InitiateCallReqArgs {
    pub conversation_id: ConversationId,
    pub call_type: CallType,
}

impl LoginReqArgs {
    pub fn new<S: Into<String>>(email: S, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

impl RegisterReqArgs {
    pub fn new<S: Into<String>, N: Into<String>>(email: S, password: SecretString, name: N) -> Self {
        Self {
            email: email.into(),
            password,
            name: name.into(),
        }
    }
}

impl Debug for LoginReqArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginReqArgs")
            .field("email", &self.email)
            .field("has_password", &!self.password.expose_secret().is_empty())
            .finish()
    }
}

impl Debug for RegisterReqArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterReqArgs")
            .field("email", &self.email)
            .field("has_password", &!self.password.expose_secret().is_empty())
            .field("name", &self.name)
            .finish()
    }
}

impl PageReqArgs {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub fn messages_default() -> Self {
        Self::new(PAGINATION_FIRST_PAGE, PAGINATION_MESSAGES_LIMIT)
    }

    pub fn call_history_default() -> Self {
        Self::new(PAGINATION_FIRST_PAGE, PAGINATION_CALL_HISTORY_LIMIT)
    }
}

impl MessageType {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }
}

impl Default for MessageType {
    fn default() -> Self {
        Self::new("text")
    }
}

impl AsRef<str> for MessageType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SendMessageReqArgs {
    /// Plain text message
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            message_type: MessageType::default(),
        }
    }

    pub fn message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }
}

impl CreateConversationReqArgs {
    pub fn new<S: Into<String>>(kind: S, participant_ids: Vec<UserId>) -> Self {
        Self {
            kind: kind.into(),
            participant_ids,
            name: None,
        }
    }

    pub fn name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }
}
