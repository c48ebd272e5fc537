use futures::channel::oneshot;
use parley_shared::{
    const_config::path::{
        PathSpec, PATH_CALLS_ANSWER, PATH_CALLS_DECLINE, PATH_CALLS_END, PATH_CALLS_HISTORY,
        PATH_CALLS_INITIATE,
    },
    id::CallId,
    req_args::{InitiateCallReqArgs, PageReqArgs},
};

use crate::client::{UiCallBack, NO_ARGS};
use crate::Client;

impl Client {
    #[tracing::instrument(skip(ui_notify))]
    pub fn initiate_call<F: UiCallBack>(
        &self,
        args: &InitiateCallReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.send_request_expect_json(&PATH_CALLS_INITIATE, Some(args), ui_notify)
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn answer_call<F: UiCallBack>(
        &self,
        call_id: &CallId,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.call_action(&PATH_CALLS_ANSWER, call_id, ui_notify)
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn decline_call<F: UiCallBack>(
        &self,
        call_id: &CallId,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.call_action(&PATH_CALLS_DECLINE, call_id, ui_notify)
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn end_call<F: UiCallBack>(
        &self,
        call_id: &CallId,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.call_action(&PATH_CALLS_END, call_id, ui_notify)
    }

    /// Use [`PageReqArgs::call_history_default`] for the first page
    #[tracing::instrument(skip(ui_notify))]
    pub fn call_history<F: UiCallBack>(
        &self,
        page: PageReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.send_request_expect_json(&PATH_CALLS_HISTORY, Some(&page), ui_notify)
    }

    fn call_action<F: UiCallBack>(
        &self,
        path_spec: &PathSpec,
        call_id: &CallId,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.send_request_expect_json(&path_spec.with_id(call_id), NO_ARGS, ui_notify)
    }
}
