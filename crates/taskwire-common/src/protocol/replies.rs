//! Taskwire reply types
//!
//! This module defines the tagged result message a worker sends back for
//! every processed call.

use super::CallId;
use serde::{Deserialize, Serialize};

/// Whether the invocation succeeded or failed.
///
/// Serialized lowercase on the wire (`"success"` / `"error"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The action returned normally; the payload is its return value
    Success,
    /// The action raised; the payload is the raised error value
    Error,
}

/// A reply message sent from the worker back to the caller.
///
/// Every processed [`Call`](super::Call) produces exactly one `Reply` with
/// the same id. The caller uses the id to resolve the matching pending call:
/// a success reply fulfils it with `payload`, an error reply fails it with
/// `payload` as the carried error value.
///
/// # Example
///
/// ```
/// use taskwire_common::{Outcome, Reply};
/// use serde_json::json;
///
/// let ok = Reply::success(3, json!(42));
/// assert_eq!(ok.outcome, Outcome::Success);
///
/// let failed = Reply::error(3, json!({"message": "division by zero"}));
/// assert_eq!(failed.outcome, Outcome::Error);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    /// Identifier of the call this reply answers
    pub id: CallId,
    /// Success or error tag
    pub outcome: Outcome,
    /// Return value (success) or error value (error)
    pub payload: serde_json::Value,
}

impl Reply {
    /// Creates a successful reply carrying the action's return value.
    pub fn success(id: CallId, payload: serde_json::Value) -> Self {
        Reply {
            id,
            outcome: Outcome::Success,
            payload,
        }
    }

    /// Creates an error reply carrying the raised error value.
    ///
    /// The payload is kept structural: whatever value the action raised is
    /// forwarded as-is so the caller can inspect it.
    pub fn error(id: CallId, payload: serde_json::Value) -> Self {
        Reply {
            id,
            outcome: Outcome::Error,
            payload,
        }
    }

    /// True when this reply carries a success outcome.
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}
