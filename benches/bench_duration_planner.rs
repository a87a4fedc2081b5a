// benches/bench_duration_planner.rs
use criterion::{
    black_box, criterion_group, criterion_main, AxisScale, Criterion, PlotConfiguration,
};
use std::time::Duration;

use adaptive_traffic_control::control_system::duration_planner::GreenDurationPlanner;

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("duration_planner");

    group.sample_size(100);
    group.measurement_time(Duration::from_secs(5));
    group.warm_up_time(Duration::from_secs(2));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Linear));

    let planner = GreenDurationPlanner {
        base_secs: 30,
        min_secs: 10,
        max_secs: 120,
        scale_factor: 1.0,
    };

    // Benchmark planning across light, moderate and saturated loads.
    for &count in [0i64, 25, 500].iter() {
        group.bench_function(format!("count_{}", count), |b| {
            b.iter(|| black_box(planner.plan(black_box(count))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
