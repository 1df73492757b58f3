use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use qtty::{Degrees, Seconds};
use std::collections::BTreeSet;

use survey_scheduler::config::SchedulerConfig;
use survey_scheduler::models::{
    FootprintTile, HorizontalPosition, ModifiedJulianDate, ObsConditions, ObservingPlan, Pointing,
    Program, TileCandidate, TileId,
};
use survey_scheduler::progress::ProgressStore;
use survey_scheduler::scheduler::{
    compute_overhead, PrefetchedMoon, SelectionRequest, SelectionStrategy, TileSelector,
};

const MJD: f64 = 58_850.2;

/// Plan whose only eligible tiles sit at the end, so every candidate is visited.
fn late_match_plan(count: i32, lst: f64) -> ObservingPlan {
    let tiles = (0..count)
        .map(|i| {
            let eligible = i >= count - 5;
            let (lst_min, lst_max) = if eligible {
                (lst - 30.0, lst + 30.0)
            } else {
                ((lst + 90.0) % 360.0, (lst + 120.0) % 360.0)
            };
            TileCandidate {
                tile_id: TileId(i + 1),
                ra: Degrees::new((i as f64 * 0.37) % 360.0),
                dec: Degrees::new(-20.0 + (i % 80) as f64),
                pass_number: i % 8,
                program: Program::Dark,
                lst_min: Degrees::new(lst_min),
                lst_max: Degrees::new(lst_max),
                expected_exposure_length: Seconds::new(1000.0),
                extinction: 0.02,
                status: 0,
                obs_conditions: ObsConditions::DARK,
                priority: Some((i % 10) as f64),
                lst_assigned: Some(lst),
            }
        })
        .collect();
    ObservingPlan::new(tiles, 0.3)
}

fn bench_overhead(c: &mut Criterion) {
    let config = SchedulerConfig::default();
    c.bench_function("compute_overhead", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(compute_overhead(
                    black_box(Pointing::new(10.0, 20.0)),
                    black_box(Pointing::new(i as f64 * 0.36, 25.0)),
                    true,
                    &config.overhead,
                ));
            }
        });
    });
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_next_tile");
    let config = SchedulerConfig::default();
    let lst = ModifiedJulianDate::new(MJD)
        .local_sidereal_time(Degrees::new(config.site.longitude))
        .value();
    let observed = BTreeSet::new();
    let request = SelectionRequest {
        mjd: ModifiedJulianDate::new(MJD),
        observed: &observed,
        slew_required: true,
        previous: Pointing::new(100.0, 10.0),
        moon: HorizontalPosition::new(-30.0, 270.0),
    };

    for size in [100, 1_000, 10_000] {
        let plan = late_match_plan(size, lst);

        let first = TileSelector::new(config.clone(), PrefetchedMoon::new(config.site.latitude));
        group.bench_with_input(BenchmarkId::new("first_eligible", size), &plan, |b, plan| {
            b.iter(|| black_box(first.select_next_tile(plan, &request)));
        });

        let mut merit_config = config.clone();
        merit_config.selection.strategy = SelectionStrategy::BestMerit;
        let best = TileSelector::new(merit_config, PrefetchedMoon::new(config.site.latitude));
        group.bench_with_input(BenchmarkId::new("best_merit", size), &plan, |b, plan| {
            b.iter(|| black_box(best.select_next_tile(plan, &request)));
        });
    }

    group.finish();
}

fn bench_progress(c: &mut Criterion) {
    let footprint: Vec<FootprintTile> = (1..=10_000)
        .map(|id| FootprintTile::new(id, id % 8, (id as f64 * 0.036) % 360.0, 0.0))
        .collect();
    let mut store = ProgressStore::new(&footprint, 16);
    for id in (1..=10_000).step_by(3) {
        let _ = store.add_exposure(
            TileId(id),
            ModifiedJulianDate::new(MJD + id as f64 * 1e-4),
            900.0,
            0.6,
            1.1,
            1.0,
        );
    }

    let mut group = c.benchmark_group("progress");
    group.bench_function("get_observed", |b| {
        b.iter(|| black_box(store.get_observed(black_box(true))));
    });
    group.bench_function("completed", |b| {
        b.iter(|| black_box(store.completed(None, true)));
    });
    group.bench_function("to_json", |b| {
        b.iter(|| black_box(store.to_json()));
    });
    group.finish();
}

criterion_group!(benches, bench_overhead, bench_selection, bench_progress);
criterion_main!(benches);
