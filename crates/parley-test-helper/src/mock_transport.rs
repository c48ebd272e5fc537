//! In memory event channel transport. Tests play the backend by injecting
//! inbound events and inspecting what the client emitted

use futures::{future::BoxFuture, FutureExt as _};
use parley_client_core::{Connector, InboundSink, Transport};
use serde_json::Value;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct MockTransportState {
    /// Urls passed to every connect call
    pub connect_urls: Vec<String>,
    /// (connection number, event name, payload)
    pub emitted: Vec<(usize, String, Value)>,
    /// Connection numbers of transports that were closed
    pub closed: Vec<usize>,
    /// Makes the next connect call fail with this message
    pub fail_next_connect: Option<String>,
    /// One per successful connect, in order
    sinks: Vec<InboundSink>,
}

#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockTransportState>>,
}

struct MockTransport {
    connection_number: usize,
    state: Arc<Mutex<MockTransportState>>,
}

impl MockConnector {
    /// Plays the backend sending `name` on the latest connection
    pub fn inject(&self, name: &str, payload: Value) {
        let connection_number = self.connect_count();
        self.inject_on(connection_number, name, payload);
    }

    /// Same as [`Self::inject`] but on an earlier connection (numbered from 1)
    pub fn inject_on(&self, connection_number: usize, name: &str, payload: Value) {
        let sink = self
            .state
            .lock()
            .unwrap()
            .sinks
            .get(connection_number.wrapping_sub(1))
            .cloned()
            .expect("no such connection");
        sink.deliver(name, payload);
    }

    pub fn fail_next_connect(&self, msg: &str) {
        self.state.lock().unwrap().fail_next_connect = Some(msg.to_string());
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().unwrap().connect_urls.len()
    }

    pub fn connect_urls(&self) -> Vec<String> {
        self.state.lock().unwrap().connect_urls.clone()
    }

    /// Emitted (name, payload) pairs across all connections
    pub fn emitted(&self) -> Vec<(String, Value)> {
        self.state
            .lock()
            .unwrap()
            .emitted
            .iter()
            .map(|(_, name, payload)| (name.clone(), payload.clone()))
            .collect()
    }

    pub fn emitted_on(&self, connection_number: usize) -> Vec<(String, Value)> {
        self.state
            .lock()
            .unwrap()
            .emitted
            .iter()
            .filter(|(n, _, _)| *n == connection_number)
            .map(|(_, name, payload)| (name.clone(), payload.clone()))
            .collect()
    }

    pub fn closed(&self) -> Vec<usize> {
        self.state.lock().unwrap().closed.clone()
    }
}

impl Connector for MockConnector {
    fn connect(
        &self,
        url: String,
        sink: InboundSink,
    ) -> BoxFuture<'_, anyhow::Result<Box<dyn Transport>>> {
        async move {
            let mut guard = self.state.lock().unwrap();
            if let Some(msg) = guard.fail_next_connect.take() {
                anyhow::bail!("{msg}");
            }
            guard.connect_urls.push(url);
            guard.sinks.push(sink);
            Ok(Box::new(MockTransport {
                connection_number: guard.connect_urls.len(),
                state: Arc::clone(&self.state),
            }) as Box<dyn Transport>)
        }
        .boxed()
    }
}

impl Transport for MockTransport {
    fn emit(&self, event: &'static str, payload: Value) -> BoxFuture<'_, anyhow::Result<()>> {
        self.state
            .lock()
            .unwrap()
            .emitted
            .push((self.connection_number, event.to_string(), payload));
        async { Ok(()) }.boxed()
    }

    fn close(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        self.state
            .lock()
            .unwrap()
            .closed
            .push(self.connection_number);
        async { Ok(()) }.boxed()
    }
}
