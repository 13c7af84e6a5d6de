use tokio::sync::mpsc;

use crate::protocol::error::{Result, TaskwireError};
use crate::protocol::{Call, Reply};

/// Caller-side endpoint of a duplex channel.
///
/// Sends [`Call`] messages to the worker and receives [`Reply`] messages
/// back. The fields are public so the caller can split them: the proxy
/// manager hands the reply receiver to its receiver task while call sites
/// keep the sender.
pub struct CallerEndpoint {
    /// Outgoing call messages
    pub calls: mpsc::UnboundedSender<Call>,
    /// Incoming reply messages
    pub replies: mpsc::UnboundedReceiver<Reply>,
}

/// Worker-side endpoint of a duplex channel.
///
/// Receives [`Call`] messages from the caller and sends [`Reply`] messages
/// back.
pub struct WorkerEndpoint {
    /// Incoming call messages
    pub calls: mpsc::UnboundedReceiver<Call>,
    /// Outgoing reply messages
    pub replies: mpsc::UnboundedSender<Reply>,
}

/// Creates a connected pair of endpoints.
///
/// Both directions are unbounded, ordered, exactly-once. Dropping either
/// endpoint closes its outgoing direction, which the peer observes as a
/// channel failure.
///
/// # Example
///
/// ```
/// use taskwire_common::transport::duplex;
/// use taskwire_common::{Call, Reply};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (caller, mut worker) = duplex();
///
/// caller.send(Call::new(0, "add", vec![json!(1), json!(2)])).unwrap();
/// let call = worker.recv().await.unwrap();
/// worker.send(Reply::success(call.id, json!(3))).unwrap();
/// # }
/// ```
pub fn duplex() -> (CallerEndpoint, WorkerEndpoint) {
    let (call_tx, call_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();

    (
        CallerEndpoint {
            calls: call_tx,
            replies: reply_rx,
        },
        WorkerEndpoint {
            calls: call_rx,
            replies: reply_tx,
        },
    )
}

impl CallerEndpoint {
    /// Sends a call to the worker.
    ///
    /// # Errors
    ///
    /// Returns [`TaskwireError::ChannelClosed`] if the worker side is gone.
    pub fn send(&self, call: Call) -> Result<()> {
        self.calls
            .send(call)
            .map_err(|_| TaskwireError::ChannelClosed("worker endpoint dropped".to_string()))
    }

    /// Receives the next reply, or `None` once the worker side is gone.
    pub async fn recv(&mut self) -> Option<Reply> {
        self.replies.recv().await
    }
}

impl WorkerEndpoint {
    /// Sends a reply to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`TaskwireError::ChannelClosed`] if the caller side is gone.
    pub fn send(&self, reply: Reply) -> Result<()> {
        self.replies
            .send(reply)
            .map_err(|_| TaskwireError::ChannelClosed("caller endpoint dropped".to_string()))
    }

    /// Receives the next call, or `None` once the caller side is gone.
    pub async fn recv(&mut self) -> Option<Call> {
        self.calls.recv().await
    }
}
