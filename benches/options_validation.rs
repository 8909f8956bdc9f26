//! Benchmarks for options validation.
//!
//! These benchmarks measure compiling an option schema and validating option
//! sets of growing size against it.

use addon_store::options::{OptionsSchema, OptionsValidator};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Map, Value};

fn schema() -> OptionsSchema {
    serde_json::from_value(json!({
        "port": "int",
        "ratio": "float",
        "debug": "bool",
        "name": "str",
        "secret": "password",
        "users": [{"name": "str", "admin": "bool", "quota": "int"}]
    }))
    .unwrap()
}

fn options(users: usize) -> Map<String, Value> {
    let users: Vec<Value> = (0..users)
        .map(|i| json!({"name": format!("user{i}"), "admin": "yes", "quota": i.to_string()}))
        .collect();
    match json!({
        "port": "8080",
        "ratio": 0.5,
        "debug": "off",
        "name": "bench",
        "secret": "hunter2",
        "users": users
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn bench_compile_schema(c: &mut Criterion) {
    let raw = serde_json::to_value(schema()).unwrap();

    c.bench_function("options_compile_schema", |b| {
        b.iter(|| {
            let schema: OptionsSchema = serde_json::from_value(black_box(raw.clone())).unwrap();
            black_box(schema)
        })
    });
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("options_validate");
    let validator = OptionsValidator::new(schema());

    for size in [0, 10, 100, 1000] {
        let options = options(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &options, |b, options| {
            b.iter(|| black_box(validator.validate(options).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile_schema, bench_validate);
criterion_main!(benches);
