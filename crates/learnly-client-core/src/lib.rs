//! Stores the functionality that should be shared between different clients
//! NB: The assumption is made that the async runtime has already been started
//! before any functions from this library are called

#![warn(unused_crate_dependencies)]

mod client;
mod guard;
mod storage;

pub use client::{Client, LoginFailed, SignInError};
pub use guard::{check_access, AccessDecision};
pub use storage::{get_parsed, set_serialized, DurableStore, FileStore, MemoryStore};
