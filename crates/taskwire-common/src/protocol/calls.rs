use serde::{Deserialize, Serialize};

/// Call identifier, unique among the calls in flight from one caller.
///
/// Ids come from a per-proxy-manager monotonically increasing counter
/// starting at 0. They are never reused, even after the call completes.
pub type CallId = u64;

/// Positional arguments carried by a call (JSON values).
pub type CallArgs = Vec<serde_json::Value>;

/// A call message sent from the caller to the worker.
///
/// # Call Flow
///
/// 1. Caller assigns a fresh id and registers a pending call for it
/// 2. The `Call` is sent over the channel
/// 3. Worker looks up `action` in its registry and executes it with
///    `payload` as positional arguments
/// 4. Worker answers with exactly one [`Reply`](super::Reply) carrying the
///    same id
///
/// # Example
///
/// ```
/// use taskwire_common::Call;
/// use serde_json::json;
///
/// let call = Call::new(7, "multiply", vec![json!(6), json!(7)]);
/// assert_eq!(call.action, "multiply");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Call {
    /// Identifier used to match this call to its reply
    pub id: CallId,
    /// Name of the registered action to invoke
    pub action: String,
    /// Positional arguments for the action
    pub payload: CallArgs,
}

impl Call {
    /// Creates a new call message.
    ///
    /// # Arguments
    ///
    /// * `id` - Fresh identifier from the caller's counter
    /// * `action` - Name of the action to invoke
    /// * `payload` - Positional arguments
    pub fn new(id: CallId, action: impl Into<String>, payload: CallArgs) -> Self {
        Call {
            id,
            action: action.into(),
            payload,
        }
    }
}
