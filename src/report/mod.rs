//! Report schema, row building and CSV emission.
//!
//! The column set is finalized before any row is built: base columns are
//! fixed, and extended-mode columns (window triplets, per-tier tallies,
//! per-vehicle counts) derive from the run configuration and the tier
//! catalog fetched at startup. Rows are plain value vectors aligned to the
//! schema, so the writer never has to reconcile columns mid-run.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::calculate::{top_low_tier_mean, CalcError};
use crate::models::{PlayerIdentity, PlayerStats, TierCatalog, TierSummary, VehicleRecord};

/// Base output columns, in the fixed report order.
pub const BASE_COLUMNS: [&str; 16] = [
    "name",
    "id",
    "battles",
    "tot_xp",
    "avg_xp",
    "tot_spots",
    "avg_spots",
    "tot_kills",
    "avg_kills",
    "tot_dmg",
    "avg_dmg",
    "wins",
    "win_pct",
    "avg_tier",
    "vehicle_battles",
    "battles_top3_low_tiers",
];

/// Errors from report construction and writing.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Calc(#[from] CalcError),

    #[error("Tier summary is missing the window of size {k}")]
    MissingWindow { k: usize },

    #[error("Vehicle {vehicle_id} has tier {tier} outside 1..=10")]
    TierOutOfRange { vehicle_id: u64, tier: u8 },
}

/// The ordered column set for one run.
#[derive(Debug, Clone)]
pub struct ReportSchema {
    columns: Vec<String>,
    windows: Vec<usize>,
    vehicle_ids: Vec<u64>,
    extended: bool,
}

impl ReportSchema {
    /// Base schema: the fixed columns only.
    pub fn base() -> Self {
        Self {
            columns: BASE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            windows: Vec::new(),
            vehicle_ids: Vec::new(),
            extended: false,
        }
    }

    /// Extended schema: base columns, then one triplet per window size,
    /// then per-tier tallies, then one column per catalog vehicle id in
    /// ascending id order.
    ///
    /// The legacy `battles_top3_low_tiers` mean column is superseded by the
    /// window triplets here; keeping it would duplicate the k=3 column name.
    pub fn extended(windows: &[usize], catalog: &TierCatalog) -> Self {
        let mut columns: Vec<String> = BASE_COLUMNS[..BASE_COLUMNS.len() - 1]
            .iter()
            .map(|c| c.to_string())
            .collect();

        for &k in windows {
            columns.push(format!("battles_top{}_low_tiers", k));
            columns.push(format!("sum_tier_top{}_low_tiers", k));
            columns.push(format!("weighted_sum_tier_top{}_low_tiers", k));
        }

        for tier in 1..=10 {
            columns.push(format!("t{}_battles", tier));
        }

        let vehicle_ids: Vec<u64> = catalog.sorted_ids().collect();
        for id in &vehicle_ids {
            columns.push(id.to_string());
        }

        Self {
            columns,
            windows: windows.to_vec(),
            vehicle_ids,
            extended: true,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }
}

/// Build one output row, aligned to the schema's column order.
///
/// Fails with a division-by-zero error for players with no recorded
/// battles; every derived average divides by the battle total.
pub fn build_row(
    identity: &PlayerIdentity,
    stats: &PlayerStats,
    vehicles: &[VehicleRecord],
    summary: &TierSummary,
    schema: &ReportSchema,
) -> Result<Vec<String>, ReportError> {
    if !stats.has_battles() {
        return Err(CalcError::DivisionByZero("player has 0 total battles".to_string()).into());
    }
    let battles = stats.battles as f64;

    let mut row = Vec::with_capacity(schema.columns().len());
    row.push(identity.name.clone());
    row.push(identity.id.to_string());
    row.push(stats.battles.to_string());
    row.push(stats.experience.to_string());
    row.push(fmt_f64(stats.experience as f64 / battles));
    row.push(stats.spots.to_string());
    row.push(fmt_f64(stats.spots as f64 / battles));
    row.push(stats.kills.to_string());
    row.push(fmt_f64(stats.kills as f64 / battles));
    row.push(stats.damage.to_string());
    row.push(fmt_f64(stats.damage as f64 / battles));
    row.push(stats.wins.to_string());
    row.push(fmt_f64(stats.wins as f64 / battles * 100.0));
    row.push(fmt_f64(summary.average_tier));
    row.push(summary.total_vehicle_battles.to_string());

    if !schema.is_extended() {
        row.push(fmt_f64(top_low_tier_mean(vehicles, 3)));
    }

    if schema.is_extended() {
        for &k in &schema.windows {
            let window = summary
                .low_tier_windows
                .iter()
                .find(|w| w.k == k)
                .ok_or(ReportError::MissingWindow { k })?;
            row.push(window.battles_summed.to_string());
            row.push(window.tier_summed.to_string());
            row.push(fmt_f64(window.weighted_tier));
        }

        let mut tier_battles = [0u64; 10];
        for v in vehicles {
            // The fetch boundary validates tiers, but VehicleRecord itself
            // does not; never index out of the tally array.
            let slot = tier_battles
                .get_mut(usize::from(v.tier).wrapping_sub(1))
                .ok_or(ReportError::TierOutOfRange {
                    vehicle_id: v.vehicle_id,
                    tier: v.tier,
                })?;
            *slot += v.battle_count;
        }
        for count in tier_battles {
            row.push(count.to_string());
        }

        let by_id: HashMap<u64, u64> = vehicles
            .iter()
            .map(|v| (v.vehicle_id, v.battle_count))
            .collect();
        for id in &schema.vehicle_ids {
            row.push(by_id.get(id).copied().unwrap_or(0).to_string());
        }
    }

    debug_assert_eq!(row.len(), schema.columns().len());
    Ok(row)
}

fn fmt_f64(value: f64) -> String {
    format!("{}", value)
}

/// CSV report writer.
///
/// Callers buffer rows and hand them over in one batch, so a failed run
/// never leaves a partially written file behind.
pub struct CsvReport {
    path: PathBuf,
}

impl CsvReport {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn ensure_dir(&self) -> Result<(), ReportError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Write the header and all rows, then flush.
    pub fn write(&self, schema: &ReportSchema, rows: &[Vec<String>]) -> Result<usize, ReportError> {
        self.ensure_dir()?;

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(schema.columns())?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!("Wrote {} rows to {:?}", rows.len(), self.path);
        Ok(rows.len())
    }

    /// Catalog-only output: a header of vehicle ids (ascending) and one
    /// data row of display names.
    pub fn write_catalog(&self, catalog: &TierCatalog) -> Result<(), ReportError> {
        self.ensure_dir()?;

        let mut writer = csv::Writer::from_path(&self.path)?;
        if catalog.is_empty() {
            // No columns to name: leave the file empty rather than emit a
            // zero-field record.
            writer.flush()?;
            info!("Wrote empty catalog to {:?}", self.path);
            return Ok(());
        }

        let header: Vec<String> = catalog.sorted_ids().map(|id| id.to_string()).collect();
        let names: Vec<&str> = catalog.iter().map(|(_, v)| v.name.as_str()).collect();
        writer.write_record(&header)?;
        writer.write_record(&names)?;
        writer.flush()?;

        info!("Wrote catalog ({} vehicles) to {:?}", catalog.len(), self.path);
        Ok(())
    }
}
