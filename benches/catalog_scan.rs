//! Benchmarks for catalog scanning.
//!
//! These benchmarks measure how long a full rescan takes for store roots of
//! various sizes, and how long parsing a single definition takes.

use addon_store::catalog;
use addon_store::config::{parse_document, AddonConfig};
use addon_store::repository::DirectoryName;
use addon_store::settings::StoreSettings;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn definition(slug: &str) -> String {
    json!({
        "name": format!("Addon {slug}"),
        "version": "1.0",
        "slug": slug,
        "description": "Benchmark addon",
        "startup": "before",
        "ports": {"8080/tcp": 8080},
        "map": ["config:rw", "ssl"],
        "options": {"port": 8080, "users": []},
        "schema": {"port": "int", "users": [{"name": "str", "admin": "bool"}]}
    })
    .to_string()
}

/// Creates a store root with `count` addons split across core, local and one
/// external repository.
fn create_store(count: usize) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let repo = root.join("addons/git/bench");
    std::fs::create_dir_all(&repo).unwrap();
    std::fs::write(
        repo.join("repository.json"),
        json!({"name": "Bench"}).to_string(),
    )
    .unwrap();

    for i in 0..count {
        let folder = match i % 3 {
            0 => root.join("addons/core"),
            1 => root.join("addons/local"),
            _ => repo.clone(),
        };
        write_definition(&folder, &format!("addon{i}"));
    }
    temp
}

fn write_definition(folder: &Path, slug: &str) {
    let dir = folder.join(slug);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.json"), definition(slug)).unwrap();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_scan");

    for size in [10, 100, 500] {
        let store = create_store(size);
        let settings = StoreSettings::from_root(store.path());
        group.bench_with_input(BenchmarkId::from_parameter(size), &settings, |b, settings| {
            b.iter(|| black_box(catalog::scan(settings, &DirectoryName)))
        });
    }

    group.finish();
}

fn bench_parse_definition(c: &mut Criterion) {
    let content = definition("ssh");
    let path = Path::new("config.json");

    c.bench_function("parse_definition", |b| {
        b.iter(|| {
            let config: AddonConfig = parse_document(path, black_box(&content)).unwrap();
            config.validate(path).unwrap();
            black_box(config)
        })
    });
}

criterion_group!(benches, bench_scan, bench_parse_definition);
criterion_main!(benches);
