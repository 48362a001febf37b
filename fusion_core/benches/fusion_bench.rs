use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fusion_core::audit::CsvAudit;
use fusion_core::{
    EngineConfig, FusionEngine, Measurement, MeasurementQueue, SensorClass, TrackRegistry,
};
use std::sync::Arc;

fn make_batch(n: usize, base_ts: u64) -> Vec<Measurement> {
    (0..n)
        .map(|i| Measurement {
            timestamp_ms: base_ts + i as u64,
            class: SensorClass::Radar,
            sensor_id: if i % 2 == 0 {
                "TPS-77-LONG-RANGE".into()
            } else {
                "AN-MPQ-53-PATRIOT".into()
            },
            lat: 40.0 + (i as f64) * 1e-6,
            lon: 32.9,
            alt: 1200.0,
            extras: String::new(),
        })
        .collect()
}

fn bench_process_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("fusion");

    for n in [1usize, 10, 100, 1000] {
        group.bench_function(format!("{n}_measurements"), |b| {
            let csv = std::env::temp_dir().join("skyfuse-bench.csv");
            b.iter(|| {
                let mut engine = FusionEngine::new(
                    Arc::new(EngineConfig::default()),
                    Arc::new(MeasurementQueue::new()),
                    Arc::new(TrackRegistry::new()),
                    Arc::new(CsvAudit::create(&csv)),
                );
                // Warm up: first batch initializes the estimator
                engine.process_batch(&make_batch(1, 1000));
                black_box(engine.process_batch(&make_batch(n, 1100)));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_process_batch);
criterion_main!(benches);
