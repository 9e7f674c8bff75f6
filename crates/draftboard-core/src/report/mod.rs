// Report pipeline: read rows, resolve identities, transform, format, emit.
//
// A report supplies the read/transform/format steps; the runner owns identity
// resolution so every report resolves names the same way.

pub mod pipelines;
pub mod rankings;
pub mod tables;
pub mod tsv;
pub mod zscores;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::identity::{resolve_with_index, NameIndex, Resolution, RosterSource};
use crate::player::Player;

use self::tsv::TsvTable;

// ---------------------------------------------------------------------------
// Report capability
// ---------------------------------------------------------------------------

pub trait Report {
    /// Source row type; resolved against the roster before `transform`.
    type Row: Player;
    /// Transformed rows handed to `format` and back to the caller.
    type Output;

    fn read(&self) -> Result<Vec<Self::Row>>;
    fn transform(&self, rows: Vec<Self::Row>) -> Result<Self::Output>;
    fn format(&self, output: &Self::Output) -> TsvTable;
    /// Output file name, without directory.
    fn file_name(&self) -> String;
}

/// `draftboard_<kind>_<season>.tsv`
pub fn report_file_name(kind: &str, season: i32) -> String {
    format!("draftboard_{kind}_{season}.tsv")
}

/// Everything one report run produced.
#[derive(Debug, Clone)]
pub struct ReportResult<T> {
    pub output: T,
    pub table: TsvTable,
    pub resolution: Resolution,
    pub file_name: String,
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

/// Destination for rendered tables.
pub trait Emitter {
    fn emit(&mut self, file_name: &str, table: &TsvTable) -> Result<()>;
}

/// Writes each table as a `.tsv` file under a directory.
#[derive(Debug, Clone)]
pub struct TsvFileEmitter {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl TsvFileEmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Emitter for TsvFileEmitter {
    fn emit(&mut self, file_name: &str, table: &TsvTable) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create report directory {}", self.dir.display()))?;
        let path = self.dir.join(file_name);
        let file = std::fs::File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        table
            .write_to(std::io::BufWriter::new(file))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("report written: {} ({} rows)", path.display(), table.rows.len());
        self.written.push(path);
        Ok(())
    }
}

/// Keeps emitted tables in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEmitter {
    pub tables: Vec<(String, TsvTable)>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<&TsvTable> {
        self.tables.iter().find(|(name, _)| name == file_name).map(|(_, t)| t)
    }
}

impl Emitter for MemoryEmitter {
    fn emit(&mut self, file_name: &str, table: &TsvTable) -> Result<()> {
        self.tables.push((file_name.to_string(), table.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Runs reports against one roster snapshot.
///
/// The name index is built once per runner, so a run sees a consistent
/// roster even when several reports are chained.
pub struct ReportRunner {
    index: NameIndex,
}

impl ReportRunner {
    pub fn new(roster: &dyn RosterSource) -> Result<Self> {
        let players = roster.all_players().context("failed to load roster")?;
        let index = NameIndex::build(&players);
        info!("roster loaded: {} names indexed", index.len());
        Ok(Self { index })
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    /// Resolve any player rows against the runner's roster.
    pub fn resolve<P: Player>(&self, rows: &mut [P]) -> Resolution {
        let mut resolution = resolve_with_index(&self.index, rows);
        resolution.duplicates = self.index.duplicates().to_vec();
        resolution
    }

    /// Read, resolve, transform and format without emitting.
    pub fn run<R: Report>(&self, report: &R) -> Result<ReportResult<R::Output>> {
        let mut rows = report.read()?;
        let resolution = self.resolve(&mut rows);
        info!(
            "{}: {} rows read, {} resolved",
            report.file_name(),
            rows.len(),
            resolution.resolved
        );
        let output = report.transform(rows)?;
        let table = report.format(&output);
        Ok(ReportResult {
            output,
            table,
            resolution,
            file_name: report.file_name(),
        })
    }

    pub fn run_and_emit<R: Report>(&self, report: &R, emitter: &mut dyn Emitter) -> Result<ReportResult<R::Output>> {
        let result = self.run(report)?;
        emitter.emit(&result.file_name, &result.table)?;
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
