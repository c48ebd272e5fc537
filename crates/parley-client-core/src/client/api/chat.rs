use futures::channel::oneshot;
use parley_shared::{
    const_config::path::{
        PATH_CHAT_CONVERSATIONS, PATH_CHAT_CONVERSATION_CREATE, PATH_CHAT_MESSAGES,
        PATH_CHAT_MESSAGE_SEND,
    },
    id::ConversationId,
    req_args::{CreateConversationReqArgs, PageReqArgs, SendMessageReqArgs},
};

use crate::client::{UiCallBack, NO_ARGS};
use crate::Client;

impl Client {
    #[tracing::instrument(skip(ui_notify))]
    pub fn conversations<F: UiCallBack>(
        &self,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.send_request_expect_json(&PATH_CHAT_CONVERSATIONS, NO_ARGS, ui_notify)
    }

    /// Use [`PageReqArgs::messages_default`] for the first page
    #[tracing::instrument(skip(ui_notify))]
    pub fn messages<F: UiCallBack>(
        &self,
        conversation_id: &ConversationId,
        page: PageReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.send_request_expect_json(
            &PATH_CHAT_MESSAGES.with_id(conversation_id),
            Some(&page),
            ui_notify,
        )
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn send_message<F: UiCallBack>(
        &self,
        conversation_id: &ConversationId,
        args: &SendMessageReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.send_request_expect_json(
            &PATH_CHAT_MESSAGE_SEND.with_id(conversation_id),
            Some(args),
            ui_notify,
        )
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn create_conversation<F: UiCallBack>(
        &self,
        args: &CreateConversationReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.send_request_expect_json(&PATH_CHAT_CONVERSATION_CREATE, Some(args), ui_notify)
    }
}
