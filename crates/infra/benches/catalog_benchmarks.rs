use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use catalog_core::{AggregateRoot, FixedClock, Money};
use catalog_events::OutboxRecord;
use catalog_infra::product_store::{EventSink, InMemoryCatalogStore, ProductStore};
use catalog_infra::use_cases::{ActivateProductRequest, CreateProductRequest};
use catalog_infra::{CatalogServices, Plan};
use catalog_products::{Discount, PricingCalculator, Product, ProductId};

fn product_with_discount(amount: Money) -> Product {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let mut product = Product::create(
        ProductId::generate(),
        "Bench Product",
        "Used for benchmarks",
        "bench",
        Money::from_fraction(123_457, 100).unwrap(),
        now,
    )
    .unwrap();
    product.activate(now).unwrap();
    product
        .apply_discount(
            Discount::new("bench", amount, now, now + Duration::days(30)),
            now,
        )
        .unwrap();
    product.take_events();
    product
}

fn bench_effective_price(c: &mut Criterion) {
    let mut group = c.benchmark_group("effective_price");
    let calculator = PricingCalculator::new();
    let at = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();

    let decimal = product_with_discount(Money::percent(15));
    group.bench_function("percent_discount", |b| {
        b.iter(|| black_box(calculator.effective_price(black_box(&decimal), at)));
    });

    let thirds = product_with_discount(Money::from_fraction(1, 3).unwrap());
    group.bench_function("repeating_fraction_then_round", |b| {
        b.iter(|| {
            let price = calculator.effective_price(black_box(&thirds), at);
            black_box(price.to_minor_units().unwrap())
        });
    });

    let expired = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    group.bench_function("outside_window", |b| {
        b.iter(|| black_box(calculator.effective_price(black_box(&decimal), expired)));
    });

    group.finish();
}

fn bench_plan_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_building");
    let store = InMemoryCatalogStore::new();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    for transitions in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(*transitions as u64));
        group.bench_with_input(
            BenchmarkId::new("activate_deactivate_cycles", transitions),
            transitions,
            |b, &n| {
                b.iter(|| {
                    let mut product = product_with_discount(Money::zero());
                    product.remove_discount(now).unwrap();
                    for i in 0..n {
                        let at = now + Duration::seconds(i as i64);
                        product.deactivate(at).unwrap();
                        product.activate(at).unwrap();
                    }

                    let mut plan = Plan::new();
                    plan.extend(ProductStore::build_upsert(&store, &product));
                    for event in product.take_events() {
                        let record = OutboxRecord::from_event(&event, now).unwrap();
                        plan.push(EventSink::build_insert(&store, record));
                    }
                    black_box(plan)
                });
            },
        );
    }

    group.finish();
}

fn bench_command_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("command_latency");
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
    let services = CatalogServices::in_memory(clock);

    group.bench_function("create_product", |b| {
        b.iter(|| {
            runtime
                .block_on(services.create_product.execute(CreateProductRequest {
                    name: black_box("Kettle".to_string()),
                    description: "Electric kettle".to_string(),
                    category: "kitchen".to_string(),
                    base_price: Money::from_minor_units(3999),
                }))
                .unwrap()
        });
    });

    group.bench_function("create_and_activate", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let created = services
                    .create_product
                    .execute(CreateProductRequest {
                        name: "Kettle".to_string(),
                        description: "Electric kettle".to_string(),
                        category: "kitchen".to_string(),
                        base_price: Money::from_minor_units(3999),
                    })
                    .await
                    .unwrap();
                services
                    .activate_product
                    .execute(ActivateProductRequest {
                        product_id: created.product_id,
                    })
                    .await
                    .unwrap()
            })
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_effective_price,
    bench_plan_building,
    bench_command_latency
);
criterion_main!(benches);
