use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::json;
use taskwire_common::transport::{duplex, CallerEndpoint, WorkerEndpoint};
use taskwire_common::{Call, Reply, TaskwireError, DISCOVER_ACTION};

use crate::registry::Registry;

/// Runs the dispatcher loop until the caller endpoint closes.
///
/// Every received call is answered with exactly one reply carrying the same
/// id. Discovery calls are answered inline; everything else is executed on
/// its own task so a long-running invocation never blocks acceptance of the
/// calls behind it. Any failure during invocation, including a panic, is
/// converted into an error reply at this boundary and never takes the loop
/// down.
pub async fn serve(registry: Registry, mut endpoint: WorkerEndpoint) {
    let registry = Arc::new(registry);
    // The registry is immutable, so the discovery payload can be computed once.
    let functionality = json!(registry.names());

    tracing::debug!(actions = registry.len(), "worker dispatcher started");

    while let Some(call) = endpoint.recv().await {
        if call.action == DISCOVER_ACTION {
            if endpoint.send(Reply::success(call.id, functionality.clone())).is_err() {
                break;
            }
            continue;
        }

        let registry = registry.clone();
        let replies = endpoint.replies.clone();
        tokio::spawn(async move {
            let reply = execute(&registry, call).await;
            if replies.send(reply).is_err() {
                tracing::debug!("caller endpoint gone, dropping reply");
            }
        });
    }

    tracing::debug!("caller endpoint closed, worker dispatcher stopping");
}

/// Builds a duplex channel and serves `registry` on a spawned task.
///
/// This is the reference wiring for an in-process worker: the returned
/// endpoint is handed to the caller side, and the join handle completes once
/// the caller hangs up and the dispatcher loop drains.
pub fn spawn(registry: Registry) -> (CallerEndpoint, tokio::task::JoinHandle<()>) {
    let (caller, worker) = duplex();
    let handle = tokio::spawn(serve(registry, worker));
    (caller, handle)
}

/// Executes one call against the registry and produces its reply.
async fn execute(registry: &Registry, call: Call) -> Reply {
    let handler = match registry.get(&call.action) {
        Some(handler) => handler.clone(),
        None => {
            // An unmatched action is still answered, as an invocation error.
            tracing::debug!(action = %call.action, id = call.id, "call names an unregistered action");
            let raised = TaskwireError::UnknownAction(call.action).to_string();
            return Reply::error(call.id, json!(raised));
        }
    };

    match AssertUnwindSafe(handler(call.payload)).catch_unwind().await {
        Ok(Ok(value)) => Reply::success(call.id, value),
        Ok(Err(raised)) => Reply::error(call.id, raised),
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(action = %call.action, id = call.id, %message, "action panicked during invocation");
            Reply::error(call.id, json!(format!("worker panicked: {}", message)))
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::time::Duration;

    fn arithmetic_registry() -> Registry {
        Registry::builder()
            .register_fn("add", |args: Vec<Value>| {
                let a = args[0].as_i64().ok_or(json!("expected a number"))?;
                let b = args[1].as_i64().ok_or(json!("expected a number"))?;
                Ok(json!(a + b))
            })
            .register_fn("throw_error", |args: Vec<Value>| {
                Err(json!({"message": args[0].clone()}))
            })
            .build()
    }

    #[tokio::test]
    async fn test_discovery_reply_lists_registered_names() {
        let (mut caller, _handle) = spawn(arithmetic_registry());

        caller.send(Call::new(0, DISCOVER_ACTION, vec![])).unwrap();
        let reply = caller.recv().await.unwrap();

        assert_eq!(reply.id, 0);
        assert!(reply.is_success());
        assert_eq!(reply.payload, json!(["add", "throw_error"]));
    }

    #[tokio::test]
    async fn test_call_is_answered_with_matching_id() {
        let (mut caller, _handle) = spawn(arithmetic_registry());

        caller.send(Call::new(17, "add", vec![json!(2), json!(3)])).unwrap();
        let reply = caller.recv().await.unwrap();

        assert_eq!(reply.id, 17);
        assert!(reply.is_success());
        assert_eq!(reply.payload, json!(5));
    }

    #[tokio::test]
    async fn test_raising_handler_produces_error_reply() {
        let (mut caller, _handle) = spawn(arithmetic_registry());

        caller
            .send(Call::new(1, "throw_error", vec![json!("I failed")]))
            .unwrap();
        let reply = caller.recv().await.unwrap();

        assert_eq!(reply.id, 1);
        assert!(!reply.is_success());
        assert_eq!(reply.payload["message"], json!("I failed"));
    }

    #[tokio::test]
    async fn test_unknown_action_is_answered_and_loop_survives() {
        let (mut caller, _handle) = spawn(arithmetic_registry());

        caller.send(Call::new(1, "missing", vec![])).unwrap();
        let reply = caller.recv().await.unwrap();
        assert_eq!(reply.id, 1);
        assert!(!reply.is_success());

        // The dispatcher keeps serving afterwards.
        caller.send(Call::new(2, "add", vec![json!(1), json!(1)])).unwrap();
        let reply = caller.recv().await.unwrap();
        assert_eq!(reply.id, 2);
        assert_eq!(reply.payload, json!(2));
    }

    #[tokio::test]
    async fn test_slow_call_does_not_block_later_calls() {
        let registry = Registry::builder()
            .register("slow", |_args| async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(json!("slow done"))
            })
            .register_fn("fast", |_args| Ok(json!("fast done")))
            .build();
        let (mut caller, _handle) = spawn(registry);

        caller.send(Call::new(0, "slow", vec![])).unwrap();
        caller.send(Call::new(1, "fast", vec![])).unwrap();

        // The later, faster call completes first; the slow one still lands.
        let first = caller.recv().await.unwrap();
        assert_eq!(first.id, 1);
        let second = caller.recv().await.unwrap();
        assert_eq!(second.id, 0);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let registry = Registry::builder()
            .register_fn("explode", |_args| -> Result<Value, Value> {
                panic!("kaboom");
            })
            .register_fn("ping", |_args| Ok(json!("pong")))
            .build();
        let (mut caller, _handle) = spawn(registry);

        caller.send(Call::new(0, "explode", vec![])).unwrap();
        let reply = caller.recv().await.unwrap();
        assert_eq!(reply.id, 0);
        assert!(!reply.is_success());
        assert!(reply.payload.as_str().unwrap().contains("kaboom"));

        caller.send(Call::new(1, "ping", vec![])).unwrap();
        let reply = caller.recv().await.unwrap();
        assert_eq!(reply.payload, json!("pong"));
    }

    #[tokio::test]
    async fn test_every_call_gets_exactly_one_reply() {
        let (mut caller, _handle) = spawn(arithmetic_registry());

        for id in 0..50u64 {
            caller
                .send(Call::new(id, "add", vec![json!(id), json!(1)]))
                .unwrap();
        }

        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let reply = caller.recv().await.unwrap();
            assert!(seen.insert(reply.id), "duplicate reply for id {}", reply.id);
            assert_eq!(reply.payload, json!(reply.id + 1));
        }
        assert_eq!(seen.len(), 50);
    }

    #[tokio::test]
    async fn test_dispatcher_stops_when_caller_hangs_up() {
        let (caller, handle) = spawn(arithmetic_registry());
        drop(caller);
        handle.await.unwrap();
    }
}
