use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::models::FootprintTile;

#[derive(Debug, Deserialize)]
struct RawFootprintRow {
    #[serde(rename = "TILEID")]
    tile_id: i32,
    #[serde(rename = "PASS")]
    pass_number: i32,
    #[serde(rename = "RA")]
    ra: f64,
    #[serde(rename = "DEC")]
    dec: f64,
    /// Optional survey-membership flag; rows with 0 are skipped.
    #[serde(rename = "IN_DESI", default)]
    in_survey: Option<i32>,
}

/// Parse the survey footprint from a CSV file with columns
/// `TILEID,PASS,RA,DEC[,IN_DESI]`.
pub fn parse_footprint_csv(csv_path: &Path) -> Result<Vec<FootprintTile>> {
    let reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open footprint file: {}", csv_path.display()))?;
    read_footprint(reader)
        .with_context(|| format!("Failed to parse footprint file: {}", csv_path.display()))
}

pub fn parse_footprint_csv_str(content: &str) -> Result<Vec<FootprintTile>> {
    let reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    read_footprint(reader)
}

fn read_footprint<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<FootprintTile>> {
    let mut tiles = Vec::new();
    let mut skipped = 0usize;
    for (index, row) in reader.deserialize::<RawFootprintRow>().enumerate() {
        let row = row.with_context(|| format!("Invalid footprint row {}", index + 1))?;
        if row.in_survey == Some(0) {
            skipped += 1;
            continue;
        }
        if row.tile_id <= 0 {
            bail!(
                "Invalid footprint row {}: TILEID must be positive, got {}",
                index + 1,
                row.tile_id
            );
        }
        tiles.push(FootprintTile::new(row.tile_id, row.pass_number, row.ra, row.dec));
    }
    log::debug!(
        "Parsed {} footprint tiles ({} outside the survey skipped)",
        tiles.len(),
        skipped
    );
    Ok(tiles)
}
