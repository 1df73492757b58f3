//! Progress persistence: versioned JSON snapshots and CSV summary export.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::Path;

use super::error::{ProgressError, ProgressResult};
use super::store::ProgressStore;
use super::PROGRESS_SCHEMA_VERSION;
use crate::config::ProgressSettings;
use crate::models::{ModifiedJulianDate, TileProgress, TileSummary};

/// On-disk layout of a saved store.
#[derive(Debug, Serialize, Deserialize)]
struct ProgressSnapshot {
    version: u32,
    max_exposures: usize,
    last_mjd: Option<ModifiedJulianDate>,
    /// SHA-256 of the serialized `tiles` array.
    checksum: String,
    tiles: Vec<TileProgress>,
}

/// Only the version tag, read before the rest of the document.
#[derive(Debug, Deserialize)]
struct VersionTag {
    version: u32,
}

/// SHA-256 of `content` as lowercase hex.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

fn tiles_checksum(tiles: &[TileProgress]) -> ProgressResult<String> {
    Ok(calculate_checksum(&serde_json::to_string(tiles)?))
}

impl ProgressStore {
    /// Serialize the store to a JSON document tagged with the current schema
    /// version.
    pub fn to_json(&self) -> ProgressResult<String> {
        let snapshot = ProgressSnapshot {
            version: PROGRESS_SCHEMA_VERSION,
            max_exposures: self.max_exposures,
            last_mjd: self.last_mjd,
            checksum: tiles_checksum(&self.tiles)?,
            tiles: self.tiles.clone(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Rebuild a store from [`ProgressStore::to_json`] output.
    ///
    /// Fails with [`ProgressError::SchemaVersionMismatch`] unless the document
    /// carries `expected_version`, and with [`ProgressError::ChecksumMismatch`]
    /// if the tile table was altered.
    pub fn from_json(content: &str, expected_version: u32) -> ProgressResult<Self> {
        let tag: VersionTag = serde_json::from_str(content)?;
        if tag.version != expected_version {
            return Err(ProgressError::SchemaVersionMismatch {
                found: tag.version,
                expected: expected_version,
            });
        }

        let snapshot: ProgressSnapshot = serde_json::from_str(content)?;
        let computed = tiles_checksum(&snapshot.tiles)?;
        if computed != snapshot.checksum {
            return Err(ProgressError::ChecksumMismatch {
                stored: snapshot.checksum,
                computed,
            });
        }

        let mut tiles = snapshot.tiles;
        let mut last_mjd = snapshot.last_mjd;
        for tile in &mut tiles {
            if tile.num_exposures() > snapshot.max_exposures {
                return Err(ProgressError::Serialization(format!(
                    "tile {} holds {} exposures, more than the maximum of {}",
                    tile.tile_id,
                    tile.num_exposures(),
                    snapshot.max_exposures
                )));
            }
            if tile.exposures().windows(2).any(|w| w[1].mjd <= w[0].mjd) {
                return Err(ProgressError::Serialization(format!(
                    "tile {} exposures are not in increasing time order",
                    tile.tile_id
                )));
            }
            if tile.refresh_status() {
                log::warn!(
                    "Stored status of tile {} disagreed with its exposures; now {}",
                    tile.tile_id,
                    tile.status()
                );
            }
            if let Some(exposure) = tile.last_exposure() {
                if last_mjd.map_or(true, |last| exposure.mjd > last) {
                    last_mjd = Some(exposure.mjd);
                }
            }
        }

        Ok(Self {
            tiles,
            max_exposures: snapshot.max_exposures,
            last_mjd,
        })
    }

    /// Write the store to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ProgressResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!(
            "Saved progress for {} tiles to {}",
            self.num_tiles(),
            path.display()
        );
        Ok(())
    }

    /// Load a store saved with [`ProgressStore::save`], checking the schema
    /// version configured in `settings`.
    pub fn load<P: AsRef<Path>>(path: P, settings: &ProgressSettings) -> ProgressResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let store = Self::from_json(&content, settings.schema_version)?;
        if store.max_exposures != settings.max_exposures {
            log::warn!(
                "{} was saved with max_exposures = {}, configured value {} ignored",
                path.display(),
                store.max_exposures,
                settings.max_exposures
            );
        }
        log::info!(
            "Loaded progress for {} tiles from {} (last MJD {:?})",
            store.num_tiles(),
            path.display(),
            store.last_mjd.map(|m| m.value())
        );
        Ok(store)
    }
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    #[serde(rename = "TILEID")]
    tile_id: i32,
    #[serde(rename = "PASS")]
    pass_number: i32,
    #[serde(rename = "RA")]
    ra: f64,
    #[serde(rename = "DEC")]
    dec: f64,
    #[serde(rename = "STATUS")]
    status: u8,
    #[serde(rename = "NEXP")]
    num_exposures: usize,
    #[serde(rename = "MJD_MIN")]
    mjd_min: Option<f64>,
    #[serde(rename = "MJD_MAX")]
    mjd_max: Option<f64>,
    #[serde(rename = "EXPTIME")]
    exptime: f64,
    #[serde(rename = "SNR2FRAC")]
    snr2frac: f64,
    #[serde(rename = "AIRMASS")]
    airmass: f64,
    #[serde(rename = "SEEING")]
    seeing: f64,
}

impl From<&TileSummary> for SummaryRow {
    fn from(summary: &TileSummary) -> Self {
        Self {
            tile_id: summary.tile_id.value(),
            pass_number: summary.pass_number,
            ra: summary.ra,
            dec: summary.dec,
            status: summary.status.code(),
            num_exposures: summary.num_exposures,
            mjd_min: summary.mjd_min.map(|m| m.value()),
            mjd_max: summary.mjd_max.map(|m| m.value()),
            exptime: summary.exptime,
            snr2frac: summary.snr2frac,
            airmass: summary.airmass,
            seeing: summary.seeing,
        }
    }
}

/// Write summaries as CSV with a header row. Status is written as its
/// numeric code and missing MJDs as empty fields.
pub fn write_summary_csv<W: Write>(writer: W, summaries: &[TileSummary]) -> ProgressResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for summary in summaries {
        csv_writer.serialize(SummaryRow::from(summary))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FootprintTile, SummaryFilter, TileId};

    fn store() -> ProgressStore {
        let footprint = vec![
            FootprintTile::new(1, 0, 10.0, 5.0),
            FootprintTile::new(2, 0, 20.0, 5.0),
        ];
        let mut store = ProgressStore::new(&footprint, 4);
        store
            .add_exposure(TileId(1), ModifiedJulianDate::new(58000.1), 900.0, 0.7, 1.2, 1.1)
            .unwrap();
        store
            .add_exposure(TileId(1), ModifiedJulianDate::new(58000.15), 900.0, 0.45, 1.3, 0.9)
            .unwrap();
        store
    }

    #[test]
    fn test_checksum_consistency() {
        assert_eq!(calculate_checksum("abc"), calculate_checksum("abc"));
        assert_ne!(calculate_checksum("abc"), calculate_checksum("abd"));
        assert_eq!(calculate_checksum("").len(), 64);
    }

    #[test]
    fn test_json_round_trip() {
        let original = store();
        let json = original.to_json().unwrap();
        let restored = ProgressStore::from_json(&json, PROGRESS_SCHEMA_VERSION).unwrap();

        assert_eq!(restored, original);
        assert_eq!(
            restored.get_summary(SummaryFilter::All),
            original.get_summary(SummaryFilter::All)
        );
    }

    #[test]
    fn test_version_mismatch() {
        let json = store().to_json().unwrap();
        let err = ProgressStore::from_json(&json, PROGRESS_SCHEMA_VERSION + 1).unwrap_err();
        assert!(matches!(err, ProgressError::SchemaVersionMismatch { .. }));
    }

    #[test]
    fn test_tampered_tiles_rejected() {
        let json = store().to_json().unwrap();
        let tampered = json.replacen("0.45", "0.55", 1);
        assert_ne!(json, tampered);

        let err = ProgressStore::from_json(&tampered, PROGRESS_SCHEMA_VERSION).unwrap_err();
        assert!(matches!(err, ProgressError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        let err = ProgressStore::from_json("not json", PROGRESS_SCHEMA_VERSION).unwrap_err();
        assert!(matches!(err, ProgressError::Serialization(_)));
    }

    #[test]
    fn test_summary_csv() {
        let summaries = store().get_summary(SummaryFilter::All);
        let mut buffer = Vec::new();
        write_summary_csv(&mut buffer, &summaries).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "TILEID,PASS,RA,DEC,STATUS,NEXP,MJD_MIN,MJD_MAX,EXPTIME,SNR2FRAC,AIRMASS,SEEING"
        );
        assert!(lines[1].starts_with("1,0,10.0,5.0,2,2,58000.1,58000.15,1800.0,"));
        // Unobserved tiles export positive zeros.
        assert_eq!(lines[2], "2,0,20.0,5.0,0,0,,,0.0,0.0,0.0,0.0");
    }
}
