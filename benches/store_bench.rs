//! Benchmarks for the Furnish store
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use furnish::store::furniture::NewItem;
use furnish::store::Store;
use tempfile::tempdir;

fn store_with_items(count: usize) -> (Store, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    let category = store.create_category("TABLE").unwrap();
    for i in 0..count {
        store
            .create_item(
                category.id,
                NewItem {
                    name: format!("Table {}", i),
                    price: 100.0 + i as f64,
                    quantity: (i % 12) as i64,
                    image: None,
                },
            )
            .unwrap();
    }

    (store, dir)
}

fn bench_item_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("items");

    group.bench_function("create_item", |b| {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        let category = store.create_category("CHAIR").unwrap();
        let mut i = 0;

        b.iter(|| {
            i += 1;
            store
                .create_item(
                    category.id,
                    NewItem {
                        name: format!("Chair {}", i),
                        price: 80.0,
                        quantity: 4,
                        image: None,
                    },
                )
                .unwrap()
        });
    });

    for size in [10, 100, 1000] {
        let (store, _dir) = store_with_items(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("list_all_items_{}", size), |b| {
            b.iter(|| black_box(store.list_all_items().unwrap()))
        });
    }

    group.finish();
}

fn bench_report_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("reports");

    for size in [10, 100, 1000] {
        let (store, _dir) = store_with_items(size);
        let mut day = 0u32;

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("generate_report_{}_items", size), |b| {
            b.iter(|| {
                // A fresh date each iteration; reports are unique per date
                day += 1;
                let date = format!("2{:03}-{:02}-{:02}", day / 372, day / 31 % 12 + 1, day % 31 + 1);
                black_box(store.generate_report(&date).unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_item_creation, bench_report_generation);
criterion_main!(benches);
