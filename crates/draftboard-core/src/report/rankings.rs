// Ranking reports: adjusted consensus ranking, snapshot delta and movement
// from a personal starting list.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::movement::{simulate_movement, MovementReport};
use crate::player::RankedEntry;
use crate::ranking::adjust::adjust_ranks;
use crate::ranking::delta::{compute_delta, DeltaRow};
use crate::ranking::offsets::{apply_offsets, OffsetStore};
use crate::ranking::source::{load_ranking_list, load_rankings};
use crate::report::tables::{adjusted_ranking_table, delta_table, movement_table};
use crate::report::tsv::TsvTable;
use crate::report::{report_file_name, Report};

/// Apply stored offsets to resolved entries and recompute the dense order.
fn adjust_with_store(store: &dyn OffsetStore, mut rows: Vec<RankedEntry>) -> Result<Vec<RankedEntry>> {
    let offsets = store.load_offsets().context("failed to load rank offsets")?;
    apply_offsets(&mut rows, &offsets);
    let adjusted = adjust_ranks(rows);
    info!("adjusted {} ranked players ({} stored offsets)", adjusted.len(), offsets.len());
    Ok(adjusted)
}

// ---------------------------------------------------------------------------
// Adjusted ranking
// ---------------------------------------------------------------------------

/// Consensus ranking with manual offsets applied.
pub struct AdjustedRankingReport<'a> {
    config: &'a Config,
    offsets: &'a dyn OffsetStore,
    source: PathBuf,
    kind: &'static str,
}

impl<'a> AdjustedRankingReport<'a> {
    /// The latest consensus snapshot.
    pub fn current(config: &'a Config, offsets: &'a dyn OffsetStore) -> Self {
        Self {
            config,
            offsets,
            source: config.resolve(&config.paths.rankings),
            kind: "rankings",
        }
    }

    /// The previous consensus snapshot, adjusted with the same offsets.
    pub fn previous(config: &'a Config, offsets: &'a dyn OffsetStore) -> Self {
        Self {
            config,
            offsets,
            source: config.resolve(&config.paths.previous_rankings),
            kind: "rankings_previous",
        }
    }
}

impl Report for AdjustedRankingReport<'_> {
    type Row = RankedEntry;
    type Output = Vec<RankedEntry>;

    fn read(&self) -> Result<Vec<RankedEntry>> {
        Ok(load_rankings(&self.source, self.config.report.max_rows)?)
    }

    fn transform(&self, rows: Vec<RankedEntry>) -> Result<Vec<RankedEntry>> {
        adjust_with_store(self.offsets, rows)
    }

    fn format(&self, output: &Vec<RankedEntry>) -> TsvTable {
        adjusted_ranking_table(output)
    }

    fn file_name(&self) -> String {
        report_file_name(self.kind, self.config.season.year)
    }
}

// ---------------------------------------------------------------------------
// Delta
// ---------------------------------------------------------------------------

/// Reads the previous snapshot and diffs it against an already adjusted
/// latest snapshot.
pub struct DeltaReport<'a> {
    previous: AdjustedRankingReport<'a>,
    latest: &'a [RankedEntry],
}

impl<'a> DeltaReport<'a> {
    pub fn new(config: &'a Config, offsets: &'a dyn OffsetStore, latest: &'a [RankedEntry]) -> Self {
        Self {
            previous: AdjustedRankingReport::previous(config, offsets),
            latest,
        }
    }
}

impl Report for DeltaReport<'_> {
    type Row = RankedEntry;
    type Output = Vec<DeltaRow>;

    fn read(&self) -> Result<Vec<RankedEntry>> {
        self.previous.read()
    }

    fn transform(&self, rows: Vec<RankedEntry>) -> Result<Vec<DeltaRow>> {
        let previous = self.previous.transform(rows)?;
        let limits = self.previous.config.report.delta_limits();
        let delta = compute_delta(&previous, self.latest, limits);
        info!("ranking delta: {} rows", delta.len());
        Ok(delta)
    }

    fn format(&self, output: &Vec<DeltaRow>) -> TsvTable {
        delta_table(output)
    }

    fn file_name(&self) -> String {
        report_file_name("delta", self.previous.config.season.year)
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Reads the personal starting list and measures how far each player moves
/// to reach `target`.
pub struct MovementFromListReport<'a> {
    config: &'a Config,
    target: &'a [RankedEntry],
}

impl<'a> MovementFromListReport<'a> {
    pub fn new(config: &'a Config, target: &'a [RankedEntry]) -> Self {
        Self { config, target }
    }
}

impl Report for MovementFromListReport<'_> {
    type Row = RankedEntry;
    type Output = MovementReport;

    fn read(&self) -> Result<Vec<RankedEntry>> {
        let path = self.config.resolve(&self.config.paths.start_ranking_list);
        Ok(load_ranking_list(&path)?)
    }

    fn transform(&self, rows: Vec<RankedEntry>) -> Result<MovementReport> {
        let report = simulate_movement(&rows, self.target);
        info!(
            "movement: {} players compared, {} moved",
            report.records.len(),
            report.non_zero().len()
        );
        Ok(report)
    }

    fn format(&self, output: &MovementReport) -> TsvTable {
        movement_table(output)
    }

    fn file_name(&self) -> String {
        report_file_name("movement", self.config.season.year)
    }
}
