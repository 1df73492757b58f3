//! Example simulating one observing night
//!
//! This example shows how to:
//! 1. Build a footprint and a nightly plan
//! 2. Repeatedly pick the next tile with the selection engine
//! 3. Record each exposure in the progress store
//! 4. Summarise the night
//!
//! To run this example:
//! ```bash
//! cargo run --example simulate_night
//! ```

use qtty::{Degrees, Seconds};

use survey_scheduler::config::SchedulerConfig;
use survey_scheduler::models::{
    FootprintTile, HorizontalPosition, ModifiedJulianDate, ObsConditions, ObservingPlan, Pointing,
    Program, SummaryFilter, TileCandidate,
};
use survey_scheduler::progress::{write_summary_csv, ProgressStore};
use survey_scheduler::scheduler::{PrefetchedMoon, SelectionRequest, TileSelector};

const SECONDS_PER_DAY: f64 = 86_400.0;

fn main() -> anyhow::Result<()> {
    let config = SchedulerConfig::default();
    let dusk = ModifiedJulianDate::new(58_850.08);
    let dawn = ModifiedJulianDate::new(58_850.50);
    let dusk_lst = dusk
        .local_sidereal_time(Degrees::new(config.site.longitude))
        .value();

    // A ring of tiles at the site latitude, each visible for three hours
    // around transit.
    let footprint: Vec<FootprintTile> = (0..72)
        .map(|i| FootprintTile::new(1000 + i, i % 2, 5.0 * i as f64, config.site.latitude))
        .collect();
    let plan = ObservingPlan::new(
        footprint
            .iter()
            .map(|tile| TileCandidate {
                tile_id: tile.tile_id,
                ra: tile.ra,
                dec: tile.dec,
                pass_number: tile.pass_number,
                program: Program::Dark,
                lst_min: Degrees::new(tile.ra.value() - 22.5),
                lst_max: Degrees::new(tile.ra.value() + 22.5),
                expected_exposure_length: Seconds::new(1000.0),
                extinction: 0.03,
                status: 0,
                obs_conditions: ObsConditions::DARK,
                priority: None,
                lst_assigned: None,
            })
            .collect(),
        0.12,
    );

    println!("=== Simulated night ===");
    println!("Dusk MJD {} (LST {:.1} deg), {} candidates", dusk, dusk_lst, plan.len());

    let selector = TileSelector::new(config.clone(), PrefetchedMoon::new(config.site.latitude));
    let mut progress = ProgressStore::from_config(&footprint, &config.progress);
    let moon = HorizontalPosition::new(-25.0, 80.0);

    let mut now = dusk.value();
    let mut previous = Pointing::new(0.0, config.site.latitude);

    while now < dawn.value() {
        let observed = progress.get_observed(true);
        let request = SelectionRequest {
            mjd: ModifiedJulianDate::new(now),
            observed: &observed,
            slew_required: true,
            previous,
            moon,
        };

        let Some((tile, overhead)) = selector.select_next_tile(&plan, &request) else {
            // Nothing up yet: wait five minutes and try again.
            now += 300.0 / SECONDS_PER_DAY;
            continue;
        };

        // Pretend the exposure reached 90% of the design depth.
        let start = now + overhead.value() / SECONDS_PER_DAY;
        let exptime = 0.9 * tile.max_exposure_length / 2.0;
        let status = progress.add_exposure(
            tile.tile_id,
            ModifiedJulianDate::new(start),
            exptime,
            1.05,
            1.1,
            1.0,
        )?;
        println!(
            "MJD {:.5}  tile {:>5}  overhead {:>6.1} s  -> {}",
            start,
            tile.tile_id,
            overhead.value(),
            status
        );

        previous = Pointing::new(tile.ra, tile.dec);
        now = start + exptime / SECONDS_PER_DAY;
    }

    println!(
        "\nCompleted {:.0} of {} tiles",
        progress.completed(None, false),
        progress.num_tiles()
    );
    write_summary_csv(
        std::io::stdout().lock(),
        &progress.get_summary(SummaryFilter::Completed),
    )?;
    Ok(())
}
