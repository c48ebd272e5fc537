#![warn(unused_crate_dependencies)]

use anyhow::bail;
use parley_client_core::{Client, ClientConfig, Credentials, EventChannel};
use parley_shared::{
    telemetry::{self, get_subscriber, init_subscriber},
    token::AuthToken,
    user::UserData,
};
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

mod mock_backend;
mod mock_transport;

pub use mock_backend::{MockBackend, RecordedRequest};
pub use mock_transport::{MockConnector, MockTransportState};

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);

// Ensure that the `tracing` stack is only initialised once
pub static TRACING: LazyLock<String> = LazyLock::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let log_file_name = format!("client_tests{}", Uuid::new_v4());
        let (file, path) = telemetry::create_trace_file(&log_file_name).unwrap();
        let subscriber = get_subscriber(subscriber_name, default_filter_level, file);
        init_subscriber(subscriber).unwrap();
        format!("Traces for tests being written to: {path:?}")
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber).unwrap();
        "Traces set to std::io::sink".to_string()
    }
});

pub struct TestApp {
    /// Api url of the mock backend (includes the `/api` suffix)
    pub address: String,
    pub backend: MockBackend,
    pub core_client: Client,
    pub credentials: Credentials,
}

impl Debug for TestApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestApp")
            .field("address", &self.address)
            .finish()
    }
}

/// Empty function for use when a call back isn't needed
pub fn no_cb() {}

/// Starts a mock backend and a client pointed at it with empty in memory
/// credentials
pub async fn spawn_app() -> TestApp {
    start_tracing();
    let backend = MockBackend::spawn().await;
    let address = backend.api_url();
    let credentials = Credentials::in_memory();
    let core_client = Client::new(&ClientConfig::new(&address), credentials.clone())
        .expect("failed to build client");
    TestApp {
        address,
        backend,
        core_client,
        credentials,
    }
}

impl TestApp {
    /// Stores a session as if the user had logged in before
    pub fn store_token(&self, token: &str) {
        self.credentials
            .store_session(
                &AuthToken::from(token),
                &UserData::new(serde_json::json!({"id": "u1", "name": "Test User"})),
            )
            .expect("failed to store session");
    }

    pub fn stored_token(&self) -> Option<String> {
        self.credentials.token().map(|t| t.as_str().to_string())
    }

    /// Event channel sharing this app's credentials but backed by an in
    /// memory transport
    pub fn mock_event_channel(&self) -> (EventChannel, MockConnector) {
        let connector = MockConnector::default();
        let channel = EventChannel::new(
            self.core_client.event_channel().socket_url(),
            self.credentials.clone(),
            connector.clone(),
        );
        (channel, connector)
    }
}

fn start_tracing() {
    // Accessing TRACING also forces the LazyLock to initialize
    let logging_msg = TRACING.deref();
    println!("{logging_msg}");
}

/// Polls `condition` until it holds or the wait times out
pub async fn wait_until<F>(mut condition: F) -> anyhow::Result<()>
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < WAIT_TIMEOUT {
        if condition() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    bail!("Timed out after {WAIT_TIMEOUT:?}")
}
