use cartesian_series::core::{AxisDirection, ChartAxis, Point, SeriesId};
use cartesian_series::extensions::{ScatterConfig, ScatterRecord, ScatterSeries};
use cartesian_series::interaction::ChartHighlightState;
use cartesian_series::render::Scene;
use cartesian_series::series::CartesianSeries;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn scatter_10k() -> (Scene, CartesianSeries<ScatterRecord, ScatterSeries>) {
    let mut scene = Scene::new();
    let root = scene.root();
    let hooks = ScatterSeries::new(ScatterConfig::default()).expect("scatter hooks");
    let mut series = CartesianSeries::new(
        &mut scene,
        root,
        SeriesId::new("bench"),
        ScatterSeries::series_opts(),
        hooks,
    )
    .expect("series init");

    series.hooks_mut().set_records((0..10_000).map(|i| {
        let t = i as f64;
        ScatterRecord::new(t * 0.1, 500.0 + (t * 0.01).sin() * 400.0)
    }));
    series.set_axes(
        ChartAxis::linear(AxisDirection::X, 0.0, 1_000.0, (0.0, 1_920.0)).expect("x axis"),
        ChartAxis::linear(AxisDirection::Y, 0.0, 1_000.0, (1_080.0, 0.0)).expect("y axis"),
    );
    series
        .update(&mut scene, &ChartHighlightState::new())
        .expect("update");
    (scene, series)
}

fn bench_pick_closest_datum_10k(c: &mut Criterion) {
    let (scene, series) = scatter_10k();

    c.bench_function("pick_closest_datum_10k", |b| {
        b.iter(|| {
            let _ = series.pick_node_closest_datum(&scene, black_box(Point::new(960.0, 540.0)));
        })
    });
}

fn bench_pick_main_axis_first_10k(c: &mut Criterion) {
    let (scene, series) = scatter_10k();

    c.bench_function("pick_main_axis_first_10k", |b| {
        b.iter(|| {
            let _ =
                series.pick_node_main_axis_first(&scene, black_box(Point::new(960.0, 540.0)), false);
        })
    });
}

fn bench_pick_exact_shape_10k(c: &mut Criterion) {
    let (scene, series) = scatter_10k();

    c.bench_function("pick_exact_shape_10k", |b| {
        b.iter(|| {
            let _ = series.pick_node_exact_shape(&scene, black_box(Point::new(960.0, 540.0)));
        })
    });
}

fn bench_update_unchanged_10k(c: &mut Criterion) {
    let (mut scene, mut series) = scatter_10k();
    let chart = ChartHighlightState::new();

    c.bench_function("update_unchanged_10k", |b| {
        b.iter(|| {
            series.mark_node_data_dirty();
            series.update(&mut scene, &chart).expect("update");
        })
    });
}

criterion_group!(
    benches,
    bench_pick_closest_datum_10k,
    bench_pick_main_axis_first_10k,
    bench_pick_exact_shape_10k,
    bench_update_unchanged_10k
);
criterion_main!(benches);
