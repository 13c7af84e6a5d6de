// Criterion benchmarks for the taskwire-common protocol layer
//
// Run benchmarks with:
//   cargo bench -p taskwire-common

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use taskwire_common::{Call, Reply};

fn bench_call_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_serialization");

    group.bench_function("serialize_small", |b| {
        let call = Call::new(0, "add", vec![json!(1), json!(2)]);
        b.iter(|| serde_json::to_string(black_box(&call)));
    });

    group.bench_function("serialize_medium", |b| {
        let call = Call::new(
            0,
            "sum",
            vec![json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]), json!({"scale": 2})],
        );
        b.iter(|| serde_json::to_string(black_box(&call)));
    });

    group.bench_function("deserialize_small", |b| {
        let data = r#"{"id":0,"action":"add","payload":[1,2]}"#;
        b.iter(|| serde_json::from_str::<Call>(black_box(data)));
    });

    group.finish();
}

fn bench_reply_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("reply_serialization");

    group.bench_function("serialize_success", |b| {
        let reply = Reply::success(0, json!(3));
        b.iter(|| serde_json::to_string(black_box(&reply)));
    });

    group.bench_function("serialize_error", |b| {
        let reply = Reply::error(0, json!({"message": "boom"}));
        b.iter(|| serde_json::to_string(black_box(&reply)));
    });

    group.bench_function("deserialize_success", |b| {
        let data = r#"{"id":0,"outcome":"success","payload":3}"#;
        b.iter(|| serde_json::from_str::<Reply>(black_box(data)));
    });

    group.finish();
}

criterion_group!(benches, bench_call_serialization, bench_reply_serialization);
criterion_main!(benches);
