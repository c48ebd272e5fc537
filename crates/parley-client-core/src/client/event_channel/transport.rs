//! The seam between [`EventChannel`](super::EventChannel) and whatever carries
//! the events. Production uses Socket.IO, tests plug in an in-memory version

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::debug;

/// Identifies one connection attempt. Events tagged with an older generation
/// are from a connection that has since been replaced
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub name: String,
    pub payload: serde_json::Value,
}

/// Where a transport pushes the events it receives
#[derive(Debug, Clone)]
pub struct InboundSink {
    generation: Generation,
    tx: mpsc::UnboundedSender<(Generation, InboundEvent)>,
}

impl InboundSink {
    pub(crate) fn new(
        generation: Generation,
        tx: mpsc::UnboundedSender<(Generation, InboundEvent)>,
    ) -> Self {
        Self { generation, tx }
    }

    /// Hands an event to the channel. Events arriving after the channel
    /// stopped listening are dropped
    pub fn deliver(&self, name: impl Into<String>, payload: serde_json::Value) {
        let event = InboundEvent {
            name: name.into(),
            payload,
        };
        if let Err(err) = self.tx.send((self.generation, event)) {
            debug!(event = ?err.0 .1.name, "event channel no longer listening, event dropped");
        }
    }
}

/// A live connection
pub trait Transport: Send + Sync + 'static {
    fn emit(&self, event: &'static str, payload: serde_json::Value)
        -> BoxFuture<'_, anyhow::Result<()>>;

    fn close(&self) -> BoxFuture<'_, anyhow::Result<()>>;
}

/// Opens connections
///
/// The transport must deliver `connect` once it is ready to emit, then
/// `disconnect` or `connect_error` when it goes away, along with every
/// application event it receives
pub trait Connector: Send + Sync + 'static {
    fn connect(
        &self,
        url: String,
        sink: InboundSink,
    ) -> BoxFuture<'_, anyhow::Result<Box<dyn Transport>>>;
}
