//! Taskwire Client
//!
//! This crate provides the caller side of the protocol: discovery of the
//! worker's action surface and the proxy manager that correlates replies to
//! outstanding calls.

pub mod proxy;

pub use proxy::{ProxyFn, WorkerProxy};
