//! Client side of the realtime event channel
//!
//! The channel owns at most one transport at a time. It authenticates right
//! after the transport connects, tears the connection down when the backend
//! rejects the token and never reconnects on its own

use anyhow::Context as _;
use parley_shared::{
    events::{
        CallEvent, ChatEvent, ClientEvent, EventBody, EventFamily, LifecycleEvent, PresenceEvent,
        ServerEvent, SignalingEvent, TypingEvent,
    },
    id::{CallId, ConversationId},
    token::AuthToken,
};
use std::{
    fmt::Debug,
    sync::{Arc, Mutex},
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{configuration::socket_url_from, credentials::Credentials, Client};

mod handlers;
pub mod socketio;
pub mod transport;

use handlers::HandlerSlots;
pub use handlers::Handler;
use socketio::SocketIoConnector;
use transport::{Connector, Generation, InboundEvent, InboundSink, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    ConnectedUnauthenticated,
    ConnectedAuthenticated,
}

/// Owned handle to the event channel. Clones share the same connection
#[derive(Clone)]
pub struct EventChannel {
    socket_url: String,
    credentials: Credentials,
    connector: Arc<dyn Connector>,
    inner: Arc<Mutex<ChannelInner>>,
    handlers: Arc<Mutex<HandlerSlots>>,
}

#[derive(Default)]
struct ChannelInner {
    state: ConnectionState,
    generation: Generation,
    transport: Option<Arc<dyn Transport>>,
}

/// What the dispatch loop should do after an inbound event was applied
enum Followup {
    Nothing,
    Authenticate(Arc<dyn Transport>),
    Close(Option<Arc<dyn Transport>>),
}

impl Client {
    /// Event channel for the same backend and credentials as this client
    pub fn event_channel(&self) -> EventChannel {
        EventChannel::new(
            socket_url_from(self.api_url()),
            self.credentials().clone(),
            SocketIoConnector::default(),
        )
    }
}

impl EventChannel {
    pub fn new(
        socket_url: impl Into<String>,
        credentials: Credentials,
        connector: impl Connector,
    ) -> Self {
        Self {
            socket_url: socket_url.into(),
            credentials,
            connector: Arc::new(connector),
            inner: Default::default(),
            handlers: Default::default(),
        }
    }

    pub fn socket_url(&self) -> &str {
        &self.socket_url
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().expect("mutex poisoned").state
    }

    /// True only once the backend has accepted the token
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::ConnectedAuthenticated
    }

    /// Opens a new connection, replacing any existing one
    ///
    /// Does nothing if there is no stored token. Returns once the transport
    /// has been asked to connect, authentication happens in the background
    #[tracing::instrument(skip(self), fields(url = %self.socket_url))]
    pub async fn connect(&self) -> anyhow::Result<()> {
        let Some(token) = self.credentials.token() else {
            info!("no auth token found, cannot connect to event channel");
            return Ok(());
        };

        self.disconnect().await;

        let generation = {
            let mut guard = self.inner.lock().expect("mutex poisoned");
            guard.generation += 1;
            guard.state = ConnectionState::Connecting;
            guard.generation
        };
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = InboundSink::new(generation, tx);

        let transport = match self.connector.connect(self.socket_url.clone(), sink).await {
            Ok(transport) => Arc::<dyn Transport>::from(transport),
            Err(err) => {
                error!(?err, "event channel connection error");
                if self.mark_disconnected(generation) {
                    self.notify(ServerEvent::Lifecycle(LifecycleEvent::ConnectError(
                        EventBody::new(serde_json::Value::String(format!("{err:#}"))),
                    )));
                }
                return Err(err).context("failed to connect event channel");
            }
        };

        let is_current = {
            let mut guard = self.inner.lock().expect("mutex poisoned");
            if guard.generation == generation {
                guard.transport = Some(Arc::clone(&transport));
                true
            } else {
                false
            }
        };
        if !is_current {
            // A disconnect came in while the transport was still connecting
            debug!("connection superseded before it finished, closing it");
            parley_shared::log_err_as_warn!(transport.close().await);
            return Ok(());
        }

        tokio::spawn(self.clone().dispatch(generation, token, rx));
        Ok(())
    }

    /// Tears down the current connection if there is one. Safe to call when
    /// already disconnected
    #[tracing::instrument(skip(self))]
    pub async fn disconnect(&self) {
        let transport = {
            let mut guard = self.inner.lock().expect("mutex poisoned");
            // Any events still in flight for the old connection are now stale
            guard.generation += 1;
            guard.state = ConnectionState::Disconnected;
            guard.transport.take()
        };
        if let Some(transport) = transport {
            parley_shared::log_err_as_warn!(transport.close().await);
            info!("event channel disconnected");
        }
    }

    pub async fn join_conversation(&self, conversation_id: &ConversationId) {
        self.publish(ClientEvent::JoinConversation(conversation_id.clone()))
            .await;
    }

    pub async fn leave_conversation(&self, conversation_id: &ConversationId) {
        self.publish(ClientEvent::LeaveConversation(conversation_id.clone()))
            .await;
    }

    pub async fn start_typing(&self, conversation_id: &ConversationId) {
        self.publish(ClientEvent::TypingStart(conversation_id.clone()))
            .await;
    }

    pub async fn stop_typing(&self, conversation_id: &ConversationId) {
        self.publish(ClientEvent::TypingStop(conversation_id.clone()))
            .await;
    }

    pub async fn join_call(&self, call_id: &CallId) {
        self.publish(ClientEvent::JoinCall(call_id.clone())).await;
    }

    pub async fn leave_call(&self, call_id: &CallId) {
        self.publish(ClientEvent::LeaveCall(call_id.clone())).await;
    }

    pub async fn send_call_offer(&self, call_id: &CallId, offer: serde_json::Value) {
        self.publish(ClientEvent::CallOffer {
            call_id: call_id.clone(),
            offer,
        })
        .await;
    }

    pub async fn send_call_answer(&self, call_id: &CallId, answer: serde_json::Value) {
        self.publish(ClientEvent::CallAnswer {
            call_id: call_id.clone(),
            answer,
        })
        .await;
    }

    pub async fn send_ice_candidate(&self, call_id: &CallId, candidate: serde_json::Value) {
        self.publish(ClientEvent::IceCandidate {
            call_id: call_id.clone(),
            candidate,
        })
        .await;
    }

    /// Emits `event` on the current connection. Without a connection this is
    /// a no-op and emit failures are only logged
    #[tracing::instrument(skip(self, event), fields(event = event.name()))]
    pub async fn publish(&self, event: ClientEvent) {
        let Some(transport) = self.current_transport() else {
            debug!("no connection, event not sent");
            return;
        };
        parley_shared::log_err_as_warn!(transport.emit(event.name(), event.into_payload()).await);
    }

    /// Each `on_*` replaces the handler of its family and returns true if
    /// there was one already
    pub fn on_lifecycle<F>(&self, handler: F) -> bool
    where
        F: Fn(LifecycleEvent) + Send + Sync + 'static,
    {
        self.register(EventFamily::Lifecycle, |slots| {
            slots.set_lifecycle(Arc::new(handler))
        })
    }

    pub fn on_chat<F>(&self, handler: F) -> bool
    where
        F: Fn(ChatEvent) + Send + Sync + 'static,
    {
        self.register(EventFamily::Chat, |slots| slots.set_chat(Arc::new(handler)))
    }

    pub fn on_typing<F>(&self, handler: F) -> bool
    where
        F: Fn(TypingEvent) + Send + Sync + 'static,
    {
        self.register(EventFamily::Typing, |slots| {
            slots.set_typing(Arc::new(handler))
        })
    }

    pub fn on_call<F>(&self, handler: F) -> bool
    where
        F: Fn(CallEvent) + Send + Sync + 'static,
    {
        self.register(EventFamily::Call, |slots| slots.set_call(Arc::new(handler)))
    }

    pub fn on_signaling<F>(&self, handler: F) -> bool
    where
        F: Fn(SignalingEvent) + Send + Sync + 'static,
    {
        self.register(EventFamily::Signaling, |slots| {
            slots.set_signaling(Arc::new(handler))
        })
    }

    pub fn on_presence<F>(&self, handler: F) -> bool
    where
        F: Fn(PresenceEvent) + Send + Sync + 'static,
    {
        self.register(EventFamily::Presence, |slots| {
            slots.set_presence(Arc::new(handler))
        })
    }

    /// Removes the handler for `family`. Returns true if there was one
    pub fn clear_handler(&self, family: EventFamily) -> bool {
        self.handlers.lock().expect("mutex poisoned").clear(family)
    }

    pub fn has_handler(&self, family: EventFamily) -> bool {
        self.handlers.lock().expect("mutex poisoned").is_set(family)
    }

    fn register(&self, family: EventFamily, set: impl FnOnce(&mut HandlerSlots) -> bool) -> bool {
        let replaced = set(&mut self.handlers.lock().expect("mutex poisoned"));
        if replaced {
            debug!(%family, "replaced existing event handler");
        }
        replaced
    }

    fn current_transport(&self) -> Option<Arc<dyn Transport>> {
        self.inner.lock().expect("mutex poisoned").transport.clone()
    }

    /// Marks the channel disconnected if `generation` is still current
    fn mark_disconnected(&self, generation: Generation) -> bool {
        let mut guard = self.inner.lock().expect("mutex poisoned");
        if guard.generation != generation {
            return false;
        }
        guard.state = ConnectionState::Disconnected;
        guard.transport = None;
        true
    }

    fn notify(&self, event: ServerEvent) {
        let pending = self.handlers.lock().expect("mutex poisoned").prepare(event);
        if let Some(pending) = pending {
            pending.run();
        }
    }

    async fn dispatch(
        self,
        generation: Generation,
        token: AuthToken,
        mut rx: mpsc::UnboundedReceiver<(Generation, InboundEvent)>,
    ) {
        debug!(generation, "event dispatch started");
        while let Some((event_generation, event)) = rx.recv().await {
            debug_assert_eq!(event_generation, generation);
            if !self.handle_inbound(generation, &token, event).await {
                break;
            }
        }
        debug!(generation, "event dispatch stopped");
    }

    /// Applies one inbound event. Returns false once this connection is over
    #[tracing::instrument(skip(self, token, event), fields(event = %event.name))]
    async fn handle_inbound(
        &self,
        generation: Generation,
        token: &AuthToken,
        event: InboundEvent,
    ) -> bool {
        let Some(event) = ServerEvent::from_wire(&event.name, event.payload) else {
            debug!("ignoring unknown event");
            return self.is_generation_current(generation);
        };

        let (followup, keep_going) = {
            let mut guard = self.inner.lock().expect("mutex poisoned");
            if guard.generation != generation {
                return false;
            }
            match &event {
                ServerEvent::Lifecycle(LifecycleEvent::Connected) => {
                    guard.state = ConnectionState::ConnectedUnauthenticated;
                    match guard.transport.clone() {
                        Some(transport) => (Followup::Authenticate(transport), true),
                        None => (Followup::Nothing, true),
                    }
                }
                ServerEvent::Lifecycle(LifecycleEvent::Authenticated(body)) => {
                    guard.state = ConnectionState::ConnectedAuthenticated;
                    let user = body.user.as_ref().and_then(|u| u.name());
                    info!(?user, "event channel authenticated");
                    (Followup::Nothing, true)
                }
                ServerEvent::Lifecycle(LifecycleEvent::AuthenticationError(body)) => {
                    error!(?body, "event channel authentication failed");
                    guard.generation += 1;
                    guard.state = ConnectionState::Disconnected;
                    (Followup::Close(guard.transport.take()), false)
                }
                ServerEvent::Lifecycle(LifecycleEvent::Disconnected(_)) => {
                    info!("disconnected from event channel");
                    guard.generation += 1;
                    guard.state = ConnectionState::Disconnected;
                    // Transport is already gone, only drop the handle
                    guard.transport = None;
                    (Followup::Nothing, false)
                }
                ServerEvent::Lifecycle(LifecycleEvent::ConnectError(body)) => {
                    error!(?body, "event channel connection error");
                    guard.generation += 1;
                    guard.state = ConnectionState::Disconnected;
                    (Followup::Close(guard.transport.take()), false)
                }
                _ => (Followup::Nothing, true),
            }
        };

        match followup {
            Followup::Nothing => {}
            Followup::Authenticate(transport) => {
                let authenticate = ClientEvent::Authenticate(token.clone());
                parley_shared::log_err_as_warn!(
                    transport
                        .emit(authenticate.name(), authenticate.into_payload())
                        .await
                );
            }
            Followup::Close(Some(transport)) => {
                parley_shared::log_err_as_warn!(transport.close().await);
            }
            Followup::Close(None) => {}
        }

        self.notify(event);
        keep_going
    }

    fn is_generation_current(&self, generation: Generation) -> bool {
        self.inner.lock().expect("mutex poisoned").generation == generation
    }
}

impl Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (state, has_transport) = {
            let guard = self.inner.lock().expect("mutex poisoned");
            (guard.state, guard.transport.is_some())
        };
        f.debug_struct("EventChannel")
            .field("socket_url", &self.socket_url)
            .field("state", &state)
            .field("has_transport", &has_transport)
            .field("handlers", &self.handlers)
            .finish()
    }
}
