//! Networking access layer shared by Parley clients: the REST request wrapper,
//! the durable session credential store and the realtime event channel
//! NB: The assumption is made that the tokio runtime has already been started
//! before any functions from this library are called

#![warn(unused_crate_dependencies)]


mod client;
pub mod configuration;
pub mod credentials;

pub use client::{
    event_channel::{
        socketio::SocketIoConnector,
        transport::{Connector, Generation, InboundEvent, InboundSink, Transport},
        ConnectionState, EventChannel, Handler,
    },
    Client, UiCallBack, NO_ARGS,
};
pub use configuration::{get_configuration, ClientConfig};
pub use credentials::{
    CredentialStore, CredentialStoreError, Credentials, FileCredentialStore,
    MemoryCredentialStore, StorageKey,
};
