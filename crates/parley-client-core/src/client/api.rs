use futures::channel::oneshot;
use parley_shared::{
    const_config::path::{PATH_AUTH_LOGOUT, PATH_AUTH_ME, PATH_AUTH_REGISTER},
    req_args::RegisterReqArgs,
};
use secrecy::ExposeSecret as _;

use crate::client::{UiCallBack, NO_ARGS};
use crate::Client;

pub mod calls;
pub mod chat;

impl Client {
    /// Creates an account and stores the returned session
    #[tracing::instrument(skip(ui_notify))]
    pub fn register<F: UiCallBack>(
        &self,
        args: RegisterReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        let args = serde_json::json!({
            "email": args.email,
            "password": args.password.expose_secret(),
            "name": args.name,
        });
        self.send_request_start_session(&PATH_AUTH_REGISTER, &args, ui_notify)
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn logout<F: UiCallBack>(
        &self,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        // The request already carries the token so it is safe to clear now
        let result = self.send_request_expect_json(&PATH_AUTH_LOGOUT, NO_ARGS, ui_notify);
        self.clear_session(); // Clear session even if logout fails
        result
    }

    #[tracing::instrument]
    pub fn logout_no_wait(&self) {
        self.send_request_no_wait(&PATH_AUTH_LOGOUT);
        self.clear_session(); // Clear session even if logout fails
    }

    #[tracing::instrument(skip(ui_notify))]
    pub fn current_user<F: UiCallBack>(
        &self,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        self.send_request_expect_json(&PATH_AUTH_ME, NO_ARGS, ui_notify)
    }

    fn clear_session(&self) {
        parley_shared::log_err_as_error!(self.credentials.clear());
    }
}
