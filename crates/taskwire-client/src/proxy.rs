use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use taskwire_common::transport::CallerEndpoint;
use taskwire_common::{
    Call, CallArgs, CallId, Outcome, Reply, Result, TaskwireError, DISCOVER_ACTION,
};

type PendingResult = Result<Value>;

/// State shared between the proxy surface and the reply-receiver task.
///
/// The pending map and the closable sender are the only mutable pieces.
/// Lock scopes never cross an await, so plain sync mutexes are enough.
struct Shared {
    /// Outgoing call sender; taken on terminate
    calls: Mutex<Option<mpsc::UnboundedSender<Call>>>,
    /// Calls awaiting their reply, keyed by id
    pending: Mutex<HashMap<CallId, oneshot::Sender<PendingResult>>>,
    /// Monotonic id source, scoped to this proxy instance
    next_id: AtomicU64,
    /// Count of replies that matched no pending call
    violations: AtomicU64,
}

impl Shared {
    /// Registers a pending call and sends its call message.
    ///
    /// The pending entry is inserted before the send so a reply can never
    /// race past its own bookkeeping. If the send fails the entry is backed
    /// out and the error returned directly.
    fn issue(&self, action: &str, payload: CallArgs) -> Result<oneshot::Receiver<PendingResult>> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(id, tx);

        let sent = {
            let calls = self.calls.lock().unwrap();
            match calls.as_ref() {
                Some(sender) => sender
                    .send(Call::new(id, action, payload))
                    .map_err(|_| TaskwireError::ChannelClosed("worker endpoint dropped".to_string())),
                None => Err(TaskwireError::Terminated),
            }
        };

        if let Err(err) = sent {
            self.pending.lock().unwrap().remove(&id);
            return Err(err);
        }

        tracing::debug!(id, %action, "call issued");
        Ok(rx)
    }

    /// Routes one reply to the pending call it answers.
    ///
    /// A reply with an unknown (or already completed) id is a protocol
    /// violation: it is logged, counted, and dropped without touching any
    /// other pending call.
    fn complete(&self, reply: Reply) {
        let entry = self.pending.lock().unwrap().remove(&reply.id);
        let Some(tx) = entry else {
            self.violations.fetch_add(1, Ordering::SeqCst);
            tracing::error!(id = reply.id, payload = %reply.payload, "worker replied to an unknown call");
            return;
        };

        let result = match reply.outcome {
            Outcome::Success => Ok(reply.payload),
            Outcome::Error => Err(TaskwireError::Faulted(reply.payload)),
        };
        // The awaiting side may have been dropped; nothing left to do then.
        let _ = tx.send(result);
    }

    /// Rejects every pending call with a channel error and clears the set.
    ///
    /// There is no telling which in-flight call caused the failure, so all
    /// of them are failed rather than leaking an unresolved awaitable.
    fn fail_all(&self, reason: &str) {
        let drained: Vec<_> = {
            let mut pending = self.pending.lock().unwrap();
            pending.drain().collect()
        };
        if drained.is_empty() {
            return;
        }

        tracing::error!(pending = drained.len(), %reason, "channel failed, rejecting all pending calls");
        for (_, tx) in drained {
            let _ = tx.send(Err(TaskwireError::ChannelClosed(reason.to_string())));
        }
    }
}

/// Issues a call and awaits its reply.
async fn call_over(shared: &Shared, action: &str, payload: CallArgs) -> Result<Value> {
    let rx = shared.issue(action, payload)?;
    match rx.await {
        Ok(result) => result,
        // The sender can only disappear once nothing holds the shared state
        // any more, which means the channel is long gone.
        Err(_) => Err(TaskwireError::ChannelClosed("pending call abandoned".to_string())),
    }
}

/// Drains replies until the worker side hangs up, then fails what is left.
async fn run_receiver(mut replies: mpsc::UnboundedReceiver<Reply>, shared: Arc<Shared>) {
    while let Some(reply) = replies.recv().await {
        shared.complete(reply);
    }
    shared.fail_all("worker endpoint dropped");
}

/// Caller-side proxy manager for one worker.
///
/// Connecting performs the discovery handshake and synthesizes one
/// [`ProxyFn`] per discovered action name. Every call gets a fresh monotonic
/// id and a pending-call entry; the receiver task resolves entries as tagged
/// replies arrive, in whatever order the worker finishes them.
///
/// # Example
///
/// ```no_run
/// use taskwire_client::WorkerProxy;
/// use taskwire_common::transport::duplex;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> taskwire_common::Result<()> {
/// let (endpoint, _worker_side) = duplex();
/// let proxy = WorkerProxy::connect(endpoint).await?;
///
/// let sum = proxy.call("add", vec![json!(2), json!(3)]).await?;
/// assert_eq!(sum, json!(5));
///
/// proxy.terminate();
/// # Ok(())
/// # }
/// ```
pub struct WorkerProxy {
    shared: Arc<Shared>,
    functions: HashMap<String, ProxyFn>,
    receiver: JoinHandle<()>,
}

impl std::fmt::Debug for WorkerProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerProxy")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl WorkerProxy {
    /// Connects to the worker behind `endpoint`.
    ///
    /// Starts the reply receiver, then sends the reserved discovery call
    /// (which consumes id 0 from the same counter as ordinary calls) and
    /// builds the proxy surface from the returned name list.
    ///
    /// # Errors
    ///
    /// Fails if the channel is already dead or the discovery payload is not
    /// a list of action names.
    pub async fn connect(endpoint: CallerEndpoint) -> Result<WorkerProxy> {
        let CallerEndpoint { calls, replies } = endpoint;

        let shared = Arc::new(Shared {
            calls: Mutex::new(Some(calls)),
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            violations: AtomicU64::new(0),
        });
        let receiver = tokio::spawn(run_receiver(replies, shared.clone()));

        let payload = call_over(&shared, DISCOVER_ACTION, vec![]).await?;
        let names: Vec<String> = serde_json::from_value(payload).map_err(|e| {
            TaskwireError::InvalidReply(format!("discovery payload was not a name list: {}", e))
        })?;

        let functions: HashMap<String, ProxyFn> = names
            .into_iter()
            .filter(|name| name != DISCOVER_ACTION)
            .map(|name| {
                let proxy_fn = ProxyFn {
                    name: name.clone(),
                    shared: shared.clone(),
                };
                (name, proxy_fn)
            })
            .collect();

        tracing::debug!(actions = functions.len(), "connected to worker");

        Ok(WorkerProxy {
            shared,
            functions,
            receiver,
        })
    }

    /// Sorted names of the discovered actions.
    pub fn actions(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns a callable handle for one discovered action.
    ///
    /// Handles are cheap clones closing over the shared channel state, so
    /// they can be moved into tasks independently of the proxy itself.
    pub fn function(&self, name: &str) -> Option<ProxyFn> {
        self.functions.get(name).cloned()
    }

    /// Invokes a discovered action with positional arguments.
    ///
    /// # Errors
    ///
    /// * [`TaskwireError::UnknownAction`] when `action` was not discovered
    /// * [`TaskwireError::Faulted`] when the worker action raised
    /// * [`TaskwireError::ChannelClosed`] when the channel failed mid-call
    /// * [`TaskwireError::Terminated`] when issued after [`terminate`](Self::terminate)
    pub async fn call(&self, action: &str, payload: CallArgs) -> Result<Value> {
        if !self.functions.contains_key(action) {
            return Err(TaskwireError::UnknownAction(action.to_string()));
        }
        call_over(&self.shared, action, payload).await
    }

    /// Releases the worker channel.
    ///
    /// Stops reply processing first, then hangs up on the worker (which ends
    /// its dispatcher loop). Pending calls are not failed here: with the
    /// channel released their replies simply never arrive. Safe to call any
    /// number of times, with any number of calls outstanding.
    pub fn terminate(&self) {
        self.receiver.abort();
        if self.shared.calls.lock().unwrap().take().is_some() {
            tracing::debug!("proxy terminated, channel released");
        }
    }

    /// Number of replies received that matched no pending call.
    pub fn protocol_violations(&self) -> u64 {
        self.shared.violations.load(Ordering::SeqCst)
    }

    /// Number of calls currently awaiting a reply.
    pub fn outstanding(&self) -> usize {
        self.shared.pending.lock().unwrap().len()
    }
}

/// Callable handle for one discovered worker action.
#[derive(Clone)]
pub struct ProxyFn {
    name: String,
    shared: Arc<Shared>,
}

impl ProxyFn {
    /// Action name this handle invokes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the action with positional arguments.
    pub async fn call(&self, payload: CallArgs) -> Result<Value> {
        call_over(&self.shared, &self.name, payload).await
    }
}
