// Multi-report pipelines used by the command surface.
//
// Every pipeline starts from the adjusted consensus ranking, which defines
// the player population the other reports work over.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::identity::{Resolution, RosterStore};
use crate::integrity::{self, IntegrityReport};
use crate::movement::MovementReport;
use crate::player::{CanonicalPlayer, PlayerId, RankedEntry};
use crate::ranking::delta::DeltaRow;
use crate::ranking::offsets::{apply_offset_batch, seed_baseline_offsets, OffsetStore};
use crate::ranking::source::load_rankings;
use crate::report::rankings::{AdjustedRankingReport, DeltaReport, MovementFromListReport};
use crate::report::tables::combined_table;
use crate::report::tsv::{append_horizontally, TsvTable};
use crate::report::zscores::{BatterZScoreReport, PitcherZScoreReport};
use crate::report::{report_file_name, Emitter, MemoryEmitter, ReportResult, ReportRunner};
use crate::valuation::merge::{combine, MergeOutcome};
use crate::valuation::zscore::{ScoredBatter, ScoredPitcher};

/// Shared collaborators for one command invocation.
pub struct Pipeline<'a> {
    pub config: &'a Config,
    pub runner: &'a ReportRunner,
    pub offsets: &'a dyn OffsetStore,
}

/// Players added to the roster from the consensus ranking.
#[derive(Debug, Clone)]
pub struct AddMissingOutcome {
    pub inserted: Vec<(PlayerId, String)>,
    /// Resolution of the same ranking against the refreshed roster.
    pub resolution: Resolution,
}

pub struct ZScoreRun {
    pub rankings: ReportResult<Vec<RankedEntry>>,
    pub batters: ReportResult<Vec<ScoredBatter>>,
    pub pitchers: ReportResult<Vec<ScoredPitcher>>,
    pub combined: MergeOutcome,
    pub combined_table: TsvTable,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, runner: &'a ReportRunner, offsets: &'a dyn OffsetStore) -> Self {
        Self { config, runner, offsets }
    }

    pub fn rankings(&self, emitter: &mut dyn Emitter) -> Result<ReportResult<Vec<RankedEntry>>> {
        let report = AdjustedRankingReport::current(self.config, self.offsets);
        self.runner.run_and_emit(&report, emitter)
    }

    /// Batter, pitcher and combined z-scores over the ranked population.
    pub fn zscores(&self, emitter: &mut dyn Emitter) -> Result<ZScoreRun> {
        let rankings = self.rankings(emitter)?;
        let population = rankings.output.as_slice();

        let batters = self
            .runner
            .run_and_emit(&BatterZScoreReport::new(self.config, population), emitter)?;
        let pitchers = self
            .runner
            .run_and_emit(&PitcherZScoreReport::new(self.config, population), emitter)?;

        let combined = combine(&rankings.output, &batters.output, &pitchers.output);
        if !combined.gaps.is_empty() {
            warn!("{} ranked players missing from projections", combined.gaps.len());
        }
        let table = combined_table(&combined.rows);
        emitter.emit(&report_file_name("combined_zscores", self.config.season.year), &table)?;
        info!("combined z-scores: {} rows", combined.rows.len());

        Ok(ZScoreRun {
            rankings,
            batters,
            pitchers,
            combined,
            combined_table: table,
        })
    }

    pub fn movement(&self, emitter: &mut dyn Emitter) -> Result<ReportResult<MovementReport>> {
        let mut scratch = MemoryEmitter::new();
        let target = self.rankings(&mut scratch)?;
        let result = self
            .runner
            .run_and_emit(&MovementFromListReport::new(self.config, &target.output), emitter)?;
        if result.output.universe_mismatch {
            warn!("starting list and current ranking cover different players");
        }
        Ok(result)
    }

    pub fn delta(&self, emitter: &mut dyn Emitter) -> Result<ReportResult<Vec<DeltaRow>>> {
        let mut scratch = MemoryEmitter::new();
        let latest = self.rankings(&mut scratch)?;
        self.runner
            .run_and_emit(&DeltaReport::new(self.config, self.offsets, &latest.output), emitter)
    }

    /// Reset offsets to catcher/closer baselines for the current ranking.
    pub fn seed_offsets(&self) -> Result<usize> {
        let mut scratch = MemoryEmitter::new();
        let rankings = self.rankings(&mut scratch)?;
        seed_baseline_offsets(self.offsets, &rankings.output, &self.config.offsets)
    }

    pub fn adjust_offsets(&self, batch: &str) -> Result<usize> {
        let written = apply_offset_batch(self.offsets, batch)?;
        if written.is_empty() {
            bail!("no valid id,offset pairs in '{batch}'");
        }
        Ok(written.len())
    }

    /// Insert every consensus-ranked name the roster does not know, then
    /// resolve the ranking again against the refreshed roster.
    ///
    /// `limit` overrides the configured row limit (0 reads everything).
    pub fn add_missing_players<R: RosterStore>(&self, roster: &R, limit: Option<usize>) -> Result<AddMissingOutcome> {
        let path = self.config.resolve(&self.config.paths.rankings);
        let mut rows = load_rankings(&path, limit.unwrap_or(self.config.report.max_rows))?;
        let before = self.runner.resolve(&mut rows);

        let mut inserted = Vec::new();
        for name in distinct_names(before.unresolved) {
            let id = roster.insert_player(&name)?;
            info!("added '{}' to the roster as id {}", name, id);
            inserted.push((id, name));
        }

        let refreshed = ReportRunner::new(roster)?;
        let resolution = refreshed.resolve(&mut rows);
        if !resolution.unresolved.is_empty() {
            warn!("{} ranked players still unresolved after import", resolution.unresolved.len());
        }
        Ok(AddMissingOutcome { inserted, resolution })
    }

    /// Check the roster for names that resolve ambiguously or not at all.
    ///
    /// With `fix`, accented names that have no alias get their plain spelling
    /// stored as one.
    pub fn check_roster<R: RosterStore>(&self, roster: &R, fix: bool) -> Result<IntegrityReport> {
        let players = roster.all_players()?;
        let report = integrity::check_roster(&players);
        if fix {
            for missing in &report.missing_plain_aliases {
                let player = CanonicalPlayer::new(missing.id, missing.primary_name.as_str())
                    .with_alias(missing.plain_name.as_str());
                roster.upsert_player(&player)?;
                info!("player {} alias set to '{}'", missing.id, missing.plain_name);
            }
        }
        Ok(report)
    }

    /// Run the named sections and lay their tables side by side in one file.
    pub fn board(&self, sections: &[BoardSection], emitter: &mut dyn Emitter) -> Result<TsvTable> {
        if sections.is_empty() {
            bail!("board needs at least one section");
        }

        let mut scratch = MemoryEmitter::new();
        let mut zscores: Option<ZScoreRun> = None;
        let mut tables = Vec::with_capacity(sections.len());
        for section in sections {
            let table = match section {
                BoardSection::Rankings => self.rankings(&mut scratch)?.table,
                BoardSection::Movement => self.movement(&mut scratch)?.table,
                BoardSection::Delta => self.delta(&mut scratch)?.table,
                BoardSection::Batters | BoardSection::Pitchers | BoardSection::Combined => {
                    if zscores.is_none() {
                        zscores = Some(self.zscores(&mut scratch)?);
                    }
                    let Some(run) = zscores.as_ref() else {
                        bail!("z-score run unavailable");
                    };
                    match section {
                        BoardSection::Batters => run.batters.table.clone(),
                        BoardSection::Pitchers => run.pitchers.table.clone(),
                        _ => run.combined_table.clone(),
                    }
                }
            };
            tables.push(table);
        }

        let board = append_horizontally(&tables);
        emitter.emit(&report_file_name("board", self.config.season.year), &board)?;
        Ok(board)
    }
}

/// Trimmed, non-empty names with case-insensitive repeats removed, first
/// spelling kept.
fn distinct_names(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(n.to_lowercase()))
        .collect()
}

// ---------------------------------------------------------------------------
// Board sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardSection {
    Rankings,
    Batters,
    Pitchers,
    Combined,
    Movement,
    Delta,
}

impl BoardSection {
    pub const ALL: [BoardSection; 6] = [
        BoardSection::Rankings,
        BoardSection::Batters,
        BoardSection::Pitchers,
        BoardSection::Combined,
        BoardSection::Movement,
        BoardSection::Delta,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BoardSection::Rankings => "rankings",
            BoardSection::Batters => "batters",
            BoardSection::Pitchers => "pitchers",
            BoardSection::Combined => "combined",
            BoardSection::Movement => "movement",
            BoardSection::Delta => "delta",
        }
    }
}

impl fmt::Display for BoardSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoardSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        BoardSection::ALL
            .into_iter()
            .find(|section| section.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = BoardSection::ALL.iter().map(BoardSection::name).collect();
                format!("unknown board section '{}' (expected one of: {})", s.trim(), names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_names_ignore_case_and_blanks() {
        let names = vec![
            "Mystery Man".to_string(),
            " mystery man ".to_string(),
            "".to_string(),
            "Another Prospect".to_string(),
        ];
        assert_eq!(distinct_names(names), vec!["Mystery Man", "Another Prospect"]);
    }

    #[test]
    fn board_section_names_parse_case_insensitively() {
        assert_eq!("Rankings".parse::<BoardSection>(), Ok(BoardSection::Rankings));
        assert_eq!(" combined ".parse::<BoardSection>(), Ok(BoardSection::Combined));
        let err = "teams".parse::<BoardSection>().unwrap_err();
        assert!(err.contains("unknown board section 'teams'"));
    }

    #[test]
    fn every_section_round_trips_through_its_name() {
        for section in BoardSection::ALL {
            assert_eq!(section.name().parse::<BoardSection>(), Ok(section));
        }
    }
}
