//! Taskwire Worker
//!
//! This crate provides the callee side of the protocol: an immutable action
//! registry built at startup and the dispatcher loop that executes incoming
//! calls and answers each one with exactly one tagged reply.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{serve, spawn};
pub use registry::{Registry, RegistryBuilder};
