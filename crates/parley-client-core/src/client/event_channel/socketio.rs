use anyhow::Context as _;
use futures::{future::BoxFuture, FutureExt as _};
use parley_shared::{
    const_config::client::CLIENT_REQUEST_TIMEOUT,
    events::names::{EVENT_CONNECT, EVENT_CONNECT_ERROR, EVENT_DISCONNECT},
};
use rust_socketio::{
    asynchronous::{Client as SocketClient, ClientBuilder},
    Event, Payload, TransportType,
};
use serde_json::Value;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{debug, info, warn};

use super::transport::{Connector, InboundSink, Transport};

/// Connects using Socket.IO (websocket preferred, long-polling as fallback)
#[derive(Debug, Clone)]
pub struct SocketIoConnector {
    connect_timeout: Duration,
}

struct SocketIoTransport {
    socket: SocketClient,
}

impl Default for SocketIoConnector {
    fn default() -> Self {
        Self::new(CLIENT_REQUEST_TIMEOUT)
    }
}

impl SocketIoConnector {
    /// `connect_timeout` bounds the handshake with the backend
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Connector for SocketIoConnector {
    #[tracing::instrument(skip(self, sink))]
    fn connect(
        &self,
        url: String,
        sink: InboundSink,
    ) -> BoxFuture<'_, anyhow::Result<Box<dyn Transport>>> {
        async move {
            let connected = Arc::new(AtomicBool::new(false));
            let on_connect = sink.clone();
            let on_connect_flag = Arc::clone(&connected);
            let on_close = sink.clone();
            let on_error = sink.clone();
            let builder = ClientBuilder::new(url)
                .transport_type(TransportType::Any)
                .reconnect(false)
                .on(Event::Connect, move |payload, _| {
                    on_connect_flag.store(true, Ordering::SeqCst);
                    on_connect.deliver(EVENT_CONNECT, payload_to_value(payload));
                    async {}.boxed()
                })
                .on(Event::Close, move |payload, _| {
                    on_close.deliver(EVENT_DISCONNECT, payload_to_value(payload));
                    async {}.boxed()
                })
                .on(Event::Error, move |payload, _| {
                    route_error(&connected, &on_error, payload);
                    async {}.boxed()
                })
                .on_any(move |event, payload, _| {
                    sink.deliver(String::from(event), payload_to_value(payload));
                    async {}.boxed()
                });
            let socket = tokio::time::timeout(self.connect_timeout, builder.connect())
                .await
                .with_context(|| {
                    format!(
                        "timed out after {:?} connecting to event channel",
                        self.connect_timeout
                    )
                })?
                .context("failed to connect to event channel")?;
            info!("event channel transport connected");
            Ok(Box::new(SocketIoTransport { socket }) as Box<dyn Transport>)
        }
        .boxed()
    }
}

impl Transport for SocketIoTransport {
    fn emit(&self, event: &'static str, payload: Value) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            tokio::time::timeout(CLIENT_REQUEST_TIMEOUT, self.socket.emit(event, payload))
                .await
                .context("timed out emitting event")?
                .with_context(|| format!("failed to emit {event}"))
        }
        .boxed()
    }

    fn close(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            debug!("closing event channel transport");
            self.socket
                .disconnect()
                .await
                .context("failed to disconnect event channel transport")
        }
        .boxed()
    }
}

/// Only errors before the connection came up end it. Later ones are packet
/// level problems on a live connection and are just logged
fn route_error(connected: &AtomicBool, sink: &InboundSink, payload: Payload) {
    let value = payload_to_value(payload);
    if connected.load(Ordering::SeqCst) {
        warn!(error = ?value, "event channel transport reported an error");
    } else {
        sink.deliver(EVENT_CONNECT_ERROR, value);
    }
}

/// Socket.IO events can carry several arguments, the backend only ever sends
/// one so the first is used
fn payload_to_value(payload: Payload) -> Value {
    match payload {
        Payload::Text(mut values) => {
            if values.is_empty() {
                Value::Null
            } else {
                values.swap_remove(0)
            }
        }
        Payload::Binary(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
        #[allow(deprecated)]
        Payload::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
    }
}
