use parley_shared::events::{
    CallEvent, ChatEvent, EventFamily, LifecycleEvent, PresenceEvent, ServerEvent,
    SignalingEvent, TypingEvent,
};
use std::{fmt::Debug, sync::Arc};

pub type Handler<E> = Arc<dyn Fn(E) + Send + Sync>;

/// At most one handler per event family
#[derive(Default)]
pub(super) struct HandlerSlots {
    lifecycle: Option<Handler<LifecycleEvent>>,
    chat: Option<Handler<ChatEvent>>,
    typing: Option<Handler<TypingEvent>>,
    call: Option<Handler<CallEvent>>,
    signaling: Option<Handler<SignalingEvent>>,
    presence: Option<Handler<PresenceEvent>>,
}

/// A handler taken out of its slot ready to be called without holding any
/// lock, so handlers may register other handlers
pub(super) struct PendingCall(Box<dyn FnOnce() + Send>);

impl HandlerSlots {
    pub(super) fn set_lifecycle(&mut self, handler: Handler<LifecycleEvent>) -> bool {
        self.lifecycle.replace(handler).is_some()
    }

    pub(super) fn set_chat(&mut self, handler: Handler<ChatEvent>) -> bool {
        self.chat.replace(handler).is_some()
    }

    pub(super) fn set_typing(&mut self, handler: Handler<TypingEvent>) -> bool {
        self.typing.replace(handler).is_some()
    }

    pub(super) fn set_call(&mut self, handler: Handler<CallEvent>) -> bool {
        self.call.replace(handler).is_some()
    }

    pub(super) fn set_signaling(&mut self, handler: Handler<SignalingEvent>) -> bool {
        self.signaling.replace(handler).is_some()
    }

    pub(super) fn set_presence(&mut self, handler: Handler<PresenceEvent>) -> bool {
        self.presence.replace(handler).is_some()
    }

    /// Returns true if a handler was removed
    pub(super) fn clear(&mut self, family: EventFamily) -> bool {
        match family {
            EventFamily::Lifecycle => self.lifecycle.take().is_some(),
            EventFamily::Chat => self.chat.take().is_some(),
            EventFamily::Typing => self.typing.take().is_some(),
            EventFamily::Call => self.call.take().is_some(),
            EventFamily::Signaling => self.signaling.take().is_some(),
            EventFamily::Presence => self.presence.take().is_some(),
        }
    }

    pub(super) fn is_set(&self, family: EventFamily) -> bool {
        match family {
            EventFamily::Lifecycle => self.lifecycle.is_some(),
            EventFamily::Chat => self.chat.is_some(),
            EventFamily::Typing => self.typing.is_some(),
            EventFamily::Call => self.call.is_some(),
            EventFamily::Signaling => self.signaling.is_some(),
            EventFamily::Presence => self.presence.is_some(),
        }
    }

    /// Pairs the event with the handler of its family, `None` if nobody is
    /// listening
    pub(super) fn prepare(&self, event: ServerEvent) -> Option<PendingCall> {
        fn bind<E: Send + 'static>(handler: &Option<Handler<E>>, event: E) -> Option<PendingCall> {
            let handler = Arc::clone(handler.as_ref()?);
            Some(PendingCall(Box::new(move || handler(event))))
        }
        match event {
            ServerEvent::Lifecycle(e) => bind(&self.lifecycle, e),
            ServerEvent::Chat(e) => bind(&self.chat, e),
            ServerEvent::Typing(e) => bind(&self.typing, e),
            ServerEvent::Call(e) => bind(&self.call, e),
            ServerEvent::Signaling(e) => bind(&self.signaling, e),
            ServerEvent::Presence(e) => bind(&self.presence, e),
        }
    }
}

impl PendingCall {
    pub(super) fn run(self) {
        (self.0)()
    }
}

impl Debug for HandlerSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSlots")
            .field("lifecycle", &self.lifecycle.is_some())
            .field("chat", &self.chat.is_some())
            .field("typing", &self.typing.is_some())
            .field("call", &self.call.is_some())
            .field("signaling", &self.signaling.is_some())
            .field("presence", &self.presence.is_some())
            .finish()
    }
}
