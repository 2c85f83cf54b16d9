//! Rule evaluation benchmarks
//!
//! Measures the cost of evaluating field rule lists and whole payloads.

use criterion::measurement::WallTime;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkGroup, Criterion};
use serde_json::json;
use storefront_validate::prelude::*;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

/// Bench one rule list against one value
fn bench_rules(
    group: &mut BenchmarkGroup<'_, WallTime>,
    rt: &Runtime,
    name: &str,
    value: Value,
    rules: &[Rule],
) {
    let value = &value;
    group.bench_function(name, |b| {
        b.to_async(rt)
            .iter(move || async move { evaluate(black_box(value), rules).await })
    });
}

/// Benchmark the declarative rules on a single field
fn bench_field_rules(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("field_rules");

    let length = [required(()), min_length(3, ()), max_length(50, ())];
    bench_rules(&mut group, &rt, "length_pass", Value::from("storefront"), &length);

    let contact = [required(()), email(())];
    bench_rules(&mut group, &rt, "email_pass", Value::from("buyer@example.com"), &contact);
    bench_rules(&mut group, &rt, "email_fail", Value::from("buyer at example dot com"), &contact);

    let price = [required(()), range(0.01, 100_000, ())];
    bench_rules(&mut group, &rt, "numeric_range", Value::from("129.95"), &price);

    // Empty optional field short-circuits every declarative rule
    let optional = [min_length(3, ()), email(()), phone(())];
    bench_rules(&mut group, &rt, "optional_empty", Value::Null, &optional);

    group.finish();
}

/// Benchmark the async rules with an in-process check
fn bench_async_rules(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("async_rules");

    let username = [
        required(()),
        min_length(3, ()),
        unique(check_fn(|name: String| async move { Ok(name != "admin") }), ()),
    ];
    bench_rules(&mut group, &rt, "unique", Value::from("shopper42"), &username);

    let promo = [custom_async(
        |value: Value| async move {
            Ok((value.to_string() != "SPRING").then(|| "Unknown promo code".to_string()))
        },
        (),
    )];
    bench_rules(&mut group, &rt, "custom_async", Value::from("SPRING"), &promo);

    group.finish();
}

/// Benchmark whole-payload validation
fn bench_payload(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("payload");

    let checkout = PayloadValidator::new()
        .field("email", [required(()), email(())])
        .field("name", [required(()), max_length(100, ())])
        .field("phone", [phone(())])
        .field("zip", [required(()), min_length(5, ()), max_length(10, ())])
        .field("quantity", [required(()), range(1, 99, ())]);

    let valid = json!({
        "email": "buyer@example.com",
        "name": "Ada Lovelace",
        "phone": "555-123-4567",
        "zip": "94107",
        "quantity": 2
    });
    let (validator, body) = (&checkout, &valid);
    group.bench_function("checkout_valid", |b| {
        b.to_async(&rt)
            .iter(move || async move { validator.validate(black_box(body)).await })
    });

    let invalid = json!({
        "email": "nope",
        "phone": "12",
        "zip": "1",
        "quantity": 500
    });
    let body = &invalid;
    group.bench_function("checkout_invalid", |b| {
        b.to_async(&rt).iter(move || async move {
            let outcome = validator.validate(black_box(body)).await;
            outcome.map(|r| r.map_err(|e| e.to_api_error()))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_field_rules, bench_async_rules, bench_payload);
criterion_main!(benches);
