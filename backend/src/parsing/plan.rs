use anyhow::{anyhow, bail, Context, Result};
use qtty::{Degrees, Seconds};
use serde::Deserialize;
use std::path::Path;

use crate::models::{ObsConditions, ObservingPlan, Program, TileCandidate, TileId};

/// Plan files give LST in hours.
const DEGREES_PER_HOUR: f64 = 15.0;

/// Header comment carrying the Moon illumination fraction in CSV plans.
const MOONFRAC_KEY: &str = "MOONFRAC";

/// Raw plan row, shared by the CSV and JSON layouts.
#[derive(Debug, Deserialize)]
struct RawPlanRow {
    #[serde(rename = "TILEID")]
    tile_id: i32,
    #[serde(rename = "RA")]
    ra: f64,
    #[serde(rename = "DEC")]
    dec: f64,
    #[serde(rename = "PASS")]
    pass_number: i32,
    #[serde(rename = "PROGRAM")]
    program: String,
    #[serde(rename = "LSTMIN")]
    lst_min_hours: f64,
    #[serde(rename = "LSTMAX")]
    lst_max_hours: f64,
    #[serde(rename = "EXPLEN")]
    exposure_length: f64,
    #[serde(rename = "EBV_MED")]
    ebv_median: f64,
    #[serde(rename = "STATUS")]
    status: i32,
    #[serde(rename = "OBSCONDITIONS")]
    obs_conditions: u32,
    #[serde(rename = "PRIORITY", default)]
    priority: Option<f64>,
    #[serde(rename = "LSTASSIGNED", default)]
    lst_assigned_hours: Option<f64>,
}

impl RawPlanRow {
    fn into_candidate(self) -> Result<TileCandidate> {
        if self.tile_id <= 0 {
            bail!("TILEID must be positive, got {}", self.tile_id);
        }
        let program: Program = self
            .program
            .parse()
            .map_err(|e: String| anyhow!("tile {}: {}", self.tile_id, e))?;

        if !(self.exposure_length.is_finite() && self.exposure_length > 0.0) {
            bail!(
                "tile {}: EXPLEN must be positive, got {}",
                self.tile_id,
                self.exposure_length
            );
        }
        if !(-90.0..=90.0).contains(&self.dec) {
            bail!("tile {}: DEC {} out of range", self.tile_id, self.dec);
        }

        Ok(TileCandidate {
            tile_id: TileId(self.tile_id),
            ra: Degrees::new(self.ra),
            dec: Degrees::new(self.dec),
            pass_number: self.pass_number,
            program,
            lst_min: Degrees::new(self.lst_min_hours * DEGREES_PER_HOUR),
            lst_max: Degrees::new(self.lst_max_hours * DEGREES_PER_HOUR),
            expected_exposure_length: Seconds::new(self.exposure_length),
            extinction: self.ebv_median,
            status: self.status,
            obs_conditions: ObsConditions(self.obs_conditions),
            priority: self.priority,
            lst_assigned: self.lst_assigned_hours.map(|h| h * DEGREES_PER_HOUR),
        })
    }
}

/// Find `# MOONFRAC = <value>` among the leading comment lines.
fn read_moon_fraction(content: &str) -> Result<Option<f64>> {
    for line in content.lines() {
        let Some(comment) = line.trim_start().strip_prefix('#') else {
            continue;
        };
        let Some((key, value)) = comment.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case(MOONFRAC_KEY) {
            let fraction: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid {} value: {}", MOONFRAC_KEY, value.trim()))?;
            return Ok(Some(fraction));
        }
    }
    Ok(None)
}

fn check_moon_fraction(fraction: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&fraction) {
        bail!("Moon illumination fraction {} outside [0, 1]", fraction);
    }
    Ok(fraction)
}

/// Parse a CSV observing plan from a file.
pub fn parse_plan_csv(csv_path: &Path) -> Result<ObservingPlan> {
    let content = std::fs::read_to_string(csv_path)
        .with_context(|| format!("Failed to read plan file: {}", csv_path.display()))?;
    parse_plan_csv_str(&content)
        .with_context(|| format!("Failed to parse plan file: {}", csv_path.display()))
}

/// Parse a CSV observing plan.
///
/// Rows keep file order. LST columns are converted from hours to degrees.
/// The Moon fraction comes from a `# MOONFRAC = <f>` comment line and
/// defaults to 0 when absent.
pub fn parse_plan_csv_str(content: &str) -> Result<ObservingPlan> {
    let moon_fraction = match read_moon_fraction(content)? {
        Some(fraction) => check_moon_fraction(fraction)?,
        None => {
            log::warn!("Plan has no {} comment, assuming 0", MOONFRAC_KEY);
            0.0
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut tiles = Vec::new();
    for (index, row) in reader.deserialize::<RawPlanRow>().enumerate() {
        let row = row.with_context(|| format!("Invalid plan row {}", index + 1))?;
        let candidate = row
            .into_candidate()
            .with_context(|| format!("Invalid plan row {}", index + 1))?;
        tiles.push(candidate);
    }

    log::debug!(
        "Parsed {} plan candidates (moon fraction {:.3})",
        tiles.len(),
        moon_fraction
    );
    Ok(ObservingPlan::new(tiles, moon_fraction))
}

#[derive(Debug, Deserialize)]
struct PlanJson {
    moon_frac: f64,
    tiles: Vec<RawPlanRow>,
}

/// Parse a JSON observing plan from a file.
pub fn parse_plan_json(json_path: &Path) -> Result<ObservingPlan> {
    let content = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read plan file: {}", json_path.display()))?;
    parse_plan_json_str(&content)
        .with_context(|| format!("Failed to parse plan file: {}", json_path.display()))
}

/// Parse a JSON observing plan: `{"moon_frac": f, "tiles": [...]}` where each
/// tile uses the CSV column names.
pub fn parse_plan_json_str(content: &str) -> Result<ObservingPlan> {
    let deserializer = &mut serde_json::Deserializer::from_str(content);
    let raw: PlanJson = serde_path_to_error::deserialize(deserializer)
        .map_err(|e| anyhow!("Invalid plan JSON at '{}': {}", e.path(), e.inner()))?;

    let moon_fraction = check_moon_fraction(raw.moon_frac)?;
    let tiles = raw
        .tiles
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            row.into_candidate()
                .with_context(|| format!("Invalid plan entry tiles[{}]", index))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ObservingPlan::new(tiles, moon_fraction))
}

/// Parse a plan, choosing the format from the file extension.
pub fn parse_plan(path: &Path) -> Result<ObservingPlan> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => parse_plan_json(path),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => parse_plan_csv(path),
        _ => bail!(
            "Unsupported plan format for {} (expected .csv or .json)",
            path.display()
        ),
    }
}
