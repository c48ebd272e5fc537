mod auth;
mod calls;
mod event_channel;
