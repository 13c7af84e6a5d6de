//! End-to-end demo: a calculator worker driven through the proxy surface.
//!
//! Run with:
//!   cargo run -p taskwire-client --example calculator

use serde_json::{json, Value};
use taskwire_client::WorkerProxy;
use taskwire_worker::{spawn, Registry};

fn int_args(args: &[Value]) -> Result<(i64, i64), Value> {
    let a = args.first().and_then(Value::as_i64);
    let b = args.get(1).and_then(Value::as_i64);
    match (a, b) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(json!({"message": "expected two integers"})),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let registry = Registry::builder()
        .register_fn("add", |args: Vec<Value>| {
            let (a, b) = int_args(&args)?;
            Ok(json!(a + b))
        })
        .register_fn("subtract", |args: Vec<Value>| {
            let (a, b) = int_args(&args)?;
            Ok(json!(a - b))
        })
        .register_fn("multiply", |args: Vec<Value>| {
            let (a, b) = int_args(&args)?;
            Ok(json!(a * b))
        })
        .register_fn("throw_error", |args: Vec<Value>| {
            Err(json!({"message": args.first().cloned().unwrap_or(Value::Null)}))
        })
        .build();

    let (endpoint, worker) = spawn(registry);
    let proxy = WorkerProxy::connect(endpoint).await?;

    println!("worker exposes: {:?}", proxy.actions());

    let sum = proxy.call("add", vec![json!(2), json!(40)]).await?;
    println!("2 + 40 = {}", sum);

    let product = proxy.call("multiply", vec![json!(6), json!(7)]).await?;
    println!("6 * 7 = {}", product);

    match proxy.call("throw_error", vec![json!("demo failure")]).await {
        Err(err) => println!("throw_error rejected as expected: {}", err),
        Ok(value) => println!("unexpected success: {}", value),
    }

    proxy.terminate();
    worker.await?;

    Ok(())
}
