use anyhow::Context;
use closure_traits::{ChannelCallBack, ChannelCallBackOutput};
use futures::channel::oneshot;
use parley_shared::{
    const_config::path::{PathSpec, PATH_AUTH_LOGIN},
    errors::ResponseError,
    req_args::LoginReqArgs,
    token::AuthToken,
    user::UserData,
};
use reqwest::{header, StatusCode};
use secrecy::ExposeSecret as _;
use std::fmt::Debug;
use tracing::{info, warn};

use crate::{configuration::ClientConfig, credentials::Credentials};

pub mod api;
pub mod event_channel;

/// Used for requests that send neither a body nor a query string
pub const NO_ARGS: Option<&()> = None;

/// Request wrapper around the REST api
///
/// The bearer token is read from the [`Credentials`] right before each
/// request is sent and a 401 response clears the stored session
#[derive(Debug, Clone)]
pub struct Client {
    api_client: reqwest::Client,
    api_url: String,
    credentials: Credentials,
}

impl Client {
    #[tracing::instrument(name = "NEW CLIENT-CORE")]
    pub fn new(config: &ClientConfig, credentials: Credentials) -> anyhow::Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let api_client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(config.request_timeout())
            .build()
            .context("unable to create reqwest client")?;
        Ok(Self {
            api_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Signs in and stores the returned session
    #[tracing::instrument(skip(ui_notify))]
    pub fn login<F: UiCallBack>(
        &self,
        args: LoginReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>> {
        let args = serde_json::json!({
            "email": args.email,
            "password": args.password.expose_secret(),
        });
        self.send_request_start_session(&PATH_AUTH_LOGIN, &args, ui_notify)
    }

    pub fn is_logged_in(&self) -> bool {
        self.credentials.token().is_some()
    }

    pub fn user_data(&self) -> Option<UserData> {
        self.credentials.user_data()
    }

    #[tracing::instrument(skip(args, on_done))]
    // WARNING: Must skip args as it my contain sensitive info and "safe" versions
    // would usually already be logged by the caller
    fn initiate_request<T, F, O>(&self, path_spec: &PathSpec, args: Option<&T>, on_done: F)
    where
        T: serde::Serialize + ?Sized,
        F: ChannelCallBack<O>,
        O: ChannelCallBackOutput,
    {
        let mut request = self
            .api_client
            .request(path_spec.method.clone(), self.path_to_url(path_spec));
        if let Some(args) = args {
            request = if path_spec.is_get() {
                request.query(args)
            } else {
                request.json(args)
            };
        }
        // Read right before sending so a token cleared by another request is
        // never reused
        if let Some(token) = self.credentials.token() {
            request = request.bearer_auth(token.as_str());
        }
        let credentials = self.credentials.clone();
        reqwest_cross::fetch(request, move |resp| {
            clear_credentials_on_unauthorized(&resp, &credentials);
            on_done(resp)
        })
    }

    fn send_request_expect_json<F, T>(
        &self,
        path_spec: &PathSpec,
        args: Option<&T>,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>>
    where
        T: serde::Serialize + ?Sized,
        F: UiCallBack,
    {
        let (tx, rx) = oneshot::channel();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async {
            let msg = process_json_body(resp).await;
            if tx.send(msg).is_err() {
                warn!("receiver dropped before response was delivered");
            }
            ui_notify();
        };
        self.initiate_request(path_spec, args, on_done);
        rx
    }

    fn send_request_start_session<F, T>(
        &self,
        path_spec: &PathSpec,
        args: &T,
        ui_notify: F,
    ) -> oneshot::Receiver<anyhow::Result<serde_json::Value>>
    where
        T: serde::Serialize + ?Sized,
        F: UiCallBack,
    {
        let (tx, rx) = oneshot::channel();
        let credentials = self.credentials.clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_session(resp, &credentials).await;
            if tx.send(msg).is_err() {
                warn!("receiver dropped before response was delivered");
            }
            ui_notify();
        };
        self.initiate_request(path_spec, Some(args), on_done);
        rx
    }

    fn send_request_no_wait(&self, path_spec: &PathSpec) {
        self.initiate_request(path_spec, NO_ARGS, |_| async {});
    }

    #[tracing::instrument(ret)]
    fn path_to_url(&self, path_spec: &PathSpec) -> String {
        format!("{}{}", self.api_url, path_spec.path)
    }
}

/// Runs before the response is handed on so the session is already gone by
/// the time the caller sees the failure
fn clear_credentials_on_unauthorized(
    response: &reqwest::Result<reqwest::Response>,
    credentials: &Credentials,
) {
    let Ok(response) = response else {
        return;
    };
    if response.status() == StatusCode::UNAUTHORIZED {
        info!("token expired or invalid, clearing stored session");
        parley_shared::log_err_as_error!(credentials.clear());
    }
}

// No `ret` here, bodies can hold tokens
#[tracing::instrument(err(Debug))]
async fn process_json_body(
    response: reqwest::Result<reqwest::Response>,
) -> anyhow::Result<serde_json::Value> {
    let (response, status) = extract_response(response)?;
    if !status.is_success() {
        return Err(handle_error(response).await);
    }
    let bytes = response
        .bytes()
        .await
        .context("failed to read response body")?;
    if bytes.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_slice(&bytes).context("failed to parse result as json")
}

/// Same as [`process_json_body`] but also stores the session found in the body
#[tracing::instrument(err(Debug))]
async fn process_session(
    response: reqwest::Result<reqwest::Response>,
    credentials: &Credentials,
) -> anyhow::Result<serde_json::Value> {
    let body = process_json_body(response).await?;
    match body
        .get("token")
        .and_then(serde_json::Value::as_str)
        .filter(|token| !token.is_empty())
    {
        Some(token) => {
            let user_data = UserData::new(
                body.get("user")
                    .cloned()
                    .unwrap_or(serde_json::Value::Null),
            );
            credentials
                .store_session(&AuthToken::from(token), &user_data)
                .context("failed to store session")?;
        }
        None => warn!("session response did not include a usable token, nothing stored"),
    }
    Ok(body)
}

#[tracing::instrument(ret)]
async fn handle_error(response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    debug_assert!(
        !status.is_success(),
        "this is supposed to be an error, right? Status code is: {status}"
    );
    let Ok(body) = response.text().await else {
        return anyhow::anyhow!("failed to get response body (status code: {status})");
    };
    ResponseError { status, body }.into()
}

/// Provides a way to standardize the error message
#[tracing::instrument(ret, err(Debug))]
fn extract_response(
    response: reqwest::Result<reqwest::Response>,
) -> anyhow::Result<(reqwest::Response, StatusCode)> {
    if response.is_err() {
        info!("Response is err: {:#?}", response);
    }
    let response = response.context("failed to send request")?;
    let status = response.status();
    Ok((response, status))
}

pub trait UiCallBack: 'static + Send + FnOnce() {}
impl<T> UiCallBack for T where T: 'static + Send + FnOnce() {}

pub mod closure_traits {
    pub trait ChannelCallBack<O>:
        'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    impl<T, O> ChannelCallBack<O> for T where
        T: 'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    pub trait ChannelCallBackOutput: futures::Future<Output = ()> + Send {}
    impl<T> ChannelCallBackOutput for T where T: futures::Future<Output = ()> + Send {}
}
