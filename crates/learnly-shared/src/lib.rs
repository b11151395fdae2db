//! Code shared between the client core and the identity server

#![warn(unused_crate_dependencies)]

pub mod const_config;
pub mod errors;
pub mod random;
pub mod req_args;
pub mod responses;
pub mod session;
pub mod telemetry;
pub mod token;
pub mod user;

pub use random::{random_string, random_string_def_len};
