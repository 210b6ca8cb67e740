//! 捐赠写入与读取路径基准测试（内存后端）

use cityrank::ranking::RankingEngine;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

fn seeded_engine(rt: &tokio::runtime::Runtime, cities: usize) -> Arc<RankingEngine> {
    let engine = Arc::new(RankingEngine::in_memory());
    rt.block_on(async {
        for i in 0..cities {
            engine
                .record_donation(&format!("city_{}", i), (i % 97 + 1) as f64, "seed")
                .await
                .unwrap();
        }
    });
    engine
}

fn bench_record_donation(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("engine/record_donation");

    for cities in [10, 100, 1_000] {
        let engine = seeded_engine(&rt, cities);
        let counter = AtomicU64::new(0);
        group.bench_function(BenchmarkId::from_parameter(cities), |b| {
            b.to_async(&rt).iter(|| {
                let engine = Arc::clone(&engine);
                let i = counter.fetch_add(1, Ordering::Relaxed);
                async move {
                    engine
                        .record_donation(&format!("city_{}", i % cities as u64), 5.0, "bench")
                        .await
                        .unwrap()
                }
            });
        });
    }

    group.finish();
}

fn bench_reads(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let engine = seeded_engine(&rt, 1_000);

    let top = Arc::clone(&engine);
    c.bench_function("engine/top_cities", |b| {
        b.to_async(&rt).iter(|| {
            let e = Arc::clone(&top);
            async move { e.top_cities(10).await.unwrap() }
        });
    });

    let ctx = Arc::clone(&engine);
    c.bench_function("engine/city_context", |b| {
        b.to_async(&rt).iter(|| {
            let e = Arc::clone(&ctx);
            async move { e.city_context("city_500", 3).await.unwrap() }
        });
    });
}

criterion_group!(benches, bench_record_donation, bench_reads);
criterion_main!(benches);
