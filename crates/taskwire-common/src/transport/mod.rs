//! Taskwire Transport Layer
//!
//! This module provides the bidirectional in-process channel connecting a
//! caller to its worker.
//!
//! # Architecture
//!
//! The channel is a pair of unbounded mpsc queues, one per direction:
//!
//! - **caller → worker**: [`Call`](crate::Call) messages
//! - **worker → caller**: [`Reply`](crate::Reply) messages
//!
//! Each direction delivers messages in order, exactly once. Messages are
//! owned structural values, so sending is always a structural copy, never a
//! shared reference. There is no framing or byte-level codec: serialization
//! stays at the serde level of the message types themselves.
//!
//! # Failure Signal
//!
//! Closure of a direction is the out-of-band failure signal: when one side
//! drops its endpoint, the peer's `recv` returns `None` and its `send`
//! starts failing with [`ChannelClosed`](crate::TaskwireError::ChannelClosed).

pub mod duplex;

pub use duplex::{duplex, CallerEndpoint, WorkerEndpoint};

#[cfg(test)]
mod tests;
