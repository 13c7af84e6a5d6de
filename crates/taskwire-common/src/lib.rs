//! Taskwire Common Types and Transport
//!
//! This crate provides the core protocol definitions and the in-process
//! duplex transport for the Taskwire worker-call system.
//!
//! # Overview
//!
//! Taskwire lets a caller invoke a predeclared set of functions living in an
//! isolated worker task as if they were local async functions. This crate
//! contains the pieces shared by both sides:
//!
//! - **Protocol Layer**: Call/Reply message types, the reserved discovery
//!   action, and error handling
//! - **Transport Layer**: a bidirectional in-process channel delivering
//!   messages in order, exactly once, per direction
//!
//! # Wire Messages
//!
//! Messages are JSON-shaped structural values:
//!
//! ```text
//! Call:  {"id": 0, "action": "add", "payload": [1, 2]}
//! Reply: {"id": 0, "outcome": "success", "payload": 3}
//! ```
//!
//! # Example
//!
//! ```
//! use taskwire_common::{Call, Reply};
//! use serde_json::json;
//!
//! // Create a call
//! let call = Call::new(0, "add", vec![json!(1), json!(2)]);
//!
//! // Process and create the matching reply
//! let reply = Reply::success(call.id, json!(3));
//! ```

pub mod protocol;
pub mod transport;

pub use protocol::*;
