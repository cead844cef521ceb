//! Batch driver.
//!
//! Orchestrates the per-player pipeline: resolve → fetch stats → fetch
//! vehicles → aggregate → build row. Players run strictly sequentially, in
//! input order. Rows are buffered and the CSV file is written only once the
//! batch outcome is decided, so an aborted run leaves no partial file.

use std::path::Path;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::calculate::compute_tier_summary;
use crate::config::AppConfig;
use crate::fetch::{ApiClient, FetchError};
use crate::report::{build_row, CsvReport, ReportError, ReportSchema};

/// Pipeline stage a per-player failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Stats,
    Vehicles,
    Aggregate,
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Resolve => write!(f, "resolve"),
            Stage::Stats => write!(f, "stats"),
            Stage::Vehicles => write!(f, "vehicles"),
            Stage::Aggregate => write!(f, "aggregate"),
            Stage::Report => write!(f, "report"),
        }
    }
}

/// One player's failure, carrying the name and stage for reporting.
#[derive(Debug, Error)]
#[error("player '{player}' failed during {stage}: {message}")]
pub struct PlayerError {
    pub player: String,
    pub stage: Stage,
    pub message: String,
}

impl PlayerError {
    fn new(player: &str, stage: Stage, err: impl std::fmt::Display) -> Self {
        Self {
            player: player.to_string(),
            stage,
            message: err.to_string(),
        }
    }
}

/// Errors that abort the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read input names: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error(transparent)]
    Player(#[from] PlayerError),
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Names read from the input file
    pub players: usize,

    /// Rows written to the report
    pub rows_written: usize,

    /// Per-player failures recorded and skipped (skip-failures mode only);
    /// each carries the player name, stage and cause
    pub skipped: Vec<PlayerError>,

    pub duration: Duration,
}

/// The statistics-aggregation pipeline.
pub struct Pipeline {
    client: ApiClient,
    config: AppConfig,
}

impl Pipeline {
    pub fn new(client: ApiClient, config: AppConfig) -> Self {
        Self { client, config }
    }

    /// Process every name in `input` and write the report to `output`.
    ///
    /// In extended mode the vehicle catalog (hence the full column set) is
    /// fetched before any player is processed; a catalog failure aborts the
    /// run. The default failure policy aborts on the first per-player
    /// error; with `skip_failures` the error is recorded and the batch
    /// continues.
    pub async fn run(&self, input: &Path, output: &Path) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let names = read_names(input)?;
        info!("Processing {} players", names.len());

        let (schema, windows) = if self.config.extended {
            let catalog = self.client.fetch_tier_catalog().await?;
            (
                ReportSchema::extended(&self.config.windows, &catalog),
                self.config.windows.clone(),
            )
        } else {
            (ReportSchema::base(), Vec::new())
        };

        let mut rows = Vec::with_capacity(names.len());
        let mut skipped = Vec::new();

        for name in &names {
            match self.process_player(name, &schema, &windows).await {
                Ok(row) => rows.push(row),
                Err(e) if self.config.skip_failures => {
                    warn!("Skipping {}: {}", name, e);
                    skipped.push(e);
                }
                Err(e) => {
                    error!("{}", e);
                    return Err(e.into());
                }
            }
        }

        let rows_written = CsvReport::new(output.to_path_buf()).write(&schema, &rows)?;

        Ok(RunSummary {
            players: names.len(),
            rows_written,
            skipped,
            duration: started.elapsed(),
        })
    }

    /// Catalog-only mode: fetch the vehicle catalog and emit the id → name
    /// mapping as a single-row report.
    pub async fn run_catalog(&self, output: &Path) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();

        let catalog = self.client.fetch_tier_catalog().await?;
        CsvReport::new(output.to_path_buf()).write_catalog(&catalog)?;

        Ok(RunSummary {
            players: 0,
            rows_written: 1,
            skipped: Vec::new(),
            duration: started.elapsed(),
        })
    }

    /// Run the full pipeline for one player.
    async fn process_player(
        &self,
        name: &str,
        schema: &ReportSchema,
        windows: &[usize],
    ) -> Result<Vec<String>, PlayerError> {
        let identity = self
            .client
            .resolve(name)
            .await
            .map_err(|e| PlayerError::new(name, Stage::Resolve, e))?;

        let stats = self
            .client
            .fetch_player_stats(identity.id)
            .await
            .map_err(|e| PlayerError::new(name, Stage::Stats, e))?;

        let vehicles = self
            .client
            .fetch_player_vehicles(identity.id)
            .await
            .map_err(|e| PlayerError::new(name, Stage::Vehicles, e))?;

        let summary = compute_tier_summary(&vehicles, stats.battles, windows)
            .map_err(|e| PlayerError::new(name, Stage::Aggregate, e))?;

        let row = build_row(&identity, &stats, &vehicles, &summary, schema)
            .map_err(|e| PlayerError::new(name, Stage::Report, e))?;

        info!(
            "Processed {} (id {}): {} battles",
            identity.name, identity.id, stats.battles
        );
        Ok(row)
    }
}

/// Read player names from the input file: one per line, trimmed, blank
/// lines skipped. The file handle is scoped to this call.
fn read_names(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
