//! Code shared between the Parley client crates: what goes over the wire and
//! the settings that shape it

#![warn(unused_crate_dependencies)]

pub mod const_config;
pub mod errors;
pub mod events;
pub mod id;
mod macros;
pub mod req_args;
pub mod telemetry;
pub mod token;
pub mod user;
