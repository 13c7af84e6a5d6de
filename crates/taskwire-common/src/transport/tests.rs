//! Tests for the duplex transport

#[cfg(test)]
mod tests {
    use super::super::duplex;
    use crate::protocol::{Call, Reply, TaskwireError};
    use serde_json::json;

    #[tokio::test]
    async fn test_calls_arrive_in_send_order() {
        let (caller, mut worker) = duplex();

        for id in 0..10u64 {
            caller.send(Call::new(id, "noop", vec![])).unwrap();
        }

        for expected in 0..10u64 {
            let call = worker.recv().await.unwrap();
            assert_eq!(call.id, expected);
        }
    }

    #[tokio::test]
    async fn test_replies_flow_back() {
        let (mut caller, worker) = duplex();

        worker.send(Reply::success(4, json!("done"))).unwrap();
        let reply = caller.recv().await.unwrap();

        assert_eq!(reply.id, 4);
        assert_eq!(reply.payload, json!("done"));
    }

    #[tokio::test]
    async fn test_send_fails_after_peer_drops() {
        let (caller, worker) = duplex();
        drop(worker);

        let err = caller.send(Call::new(0, "noop", vec![])).unwrap_err();
        assert!(matches!(err, TaskwireError::ChannelClosed(_)));
    }

    #[tokio::test]
    async fn test_recv_sees_closure_after_peer_drops() {
        let (caller, mut worker) = duplex();
        caller.send(Call::new(0, "noop", vec![])).unwrap();
        drop(caller);

        // Messages already in flight still drain before the closure shows.
        assert!(worker.recv().await.is_some());
        assert!(worker.recv().await.is_none());
    }
}
