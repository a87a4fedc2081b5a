// benches/bench_orchestrator_tick.rs
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, Criterion, PlotConfiguration,
};
use std::time::Duration;

use adaptive_traffic_control::config::ControllerConfig;
use adaptive_traffic_control::control_system::orchestrator::IntersectionOrchestrator;
use adaptive_traffic_control::models::detection::DetectionReport;
use adaptive_traffic_control::models::lane::LaneCounts;

fn loaded_orchestrator() -> IntersectionOrchestrator {
    let mut orchestrator = IntersectionOrchestrator::new(ControllerConfig::default()).unwrap();
    let report = DetectionReport::new(LaneCounts::new(12, 4, 9, 2), false);
    orchestrator.update_vehicle_counts(&report).unwrap();
    orchestrator
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("orchestrator_tick");

    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    // One-second ticks vs. large catch-up ticks crossing several phases.
    for &elapsed in [1.0f64, 40.0].iter() {
        group.bench_function(format!("elapsed_{}", elapsed), |b| {
            let mut orchestrator = loaded_orchestrator();
            b.iter(|| {
                orchestrator.tick(black_box(elapsed)).unwrap();
                black_box(&orchestrator);
            });
        });
    }
    group.finish();
}

fn bench_status_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("status_snapshot");
    group.sample_size(100);

    group.bench_function("get_current_status", |b| {
        let orchestrator = loaded_orchestrator();
        b.iter(|| black_box(orchestrator.get_current_status()));
    });
    group.finish();
}

criterion_group!(benches, bench_tick, bench_status_snapshot);
criterion_main!(benches);
