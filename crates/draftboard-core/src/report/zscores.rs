// Per-role z-score reports over projection files.

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::player::{Player, RankedEntry, Role};
use crate::report::tables::{batter_zscore_table, pitcher_zscore_table};
use crate::report::tsv::TsvTable;
use crate::report::{report_file_name, Report};
use crate::valuation::merge::select_role;
use crate::valuation::projections::{
    load_batter_projections, load_pitcher_projections, BatterProjection, PitcherProjection,
};
use crate::valuation::zscore::{score_batters, score_pitchers, sort_by_total_desc, ScoredBatter, ScoredPitcher};

/// Narrow projections to the ranked players of `role`.
fn scoring_pool<T: Player + Clone>(rows: Vec<T>, population: &[RankedEntry], role: Role) -> Vec<T> {
    let selection = select_role(population, &rows, role);
    info!(
        "{} pool: {} of {} projections selected, {} coverage gaps",
        role,
        selection.rows.len(),
        rows.len(),
        selection.gaps.len()
    );
    selection.rows
}

// ---------------------------------------------------------------------------
// Batters
// ---------------------------------------------------------------------------

pub struct BatterZScoreReport<'a> {
    config: &'a Config,
    population: &'a [RankedEntry],
}

impl<'a> BatterZScoreReport<'a> {
    /// Only batters in `population` are scored.
    pub fn new(config: &'a Config, population: &'a [RankedEntry]) -> Self {
        Self { config, population }
    }
}

impl Report for BatterZScoreReport<'_> {
    type Row = BatterProjection;
    type Output = Vec<ScoredBatter>;

    fn read(&self) -> Result<Vec<BatterProjection>> {
        let path = self.config.resolve(&self.config.paths.batter_projections);
        Ok(load_batter_projections(&path)?)
    }

    fn transform(&self, rows: Vec<BatterProjection>) -> Result<Vec<ScoredBatter>> {
        let pool = scoring_pool(rows, self.population, Role::Batter);
        let mut scored = score_batters(&pool);
        sort_by_total_desc(&mut scored, |s| s.zscores.total);
        Ok(scored)
    }

    fn format(&self, output: &Vec<ScoredBatter>) -> TsvTable {
        batter_zscore_table(output)
    }

    fn file_name(&self) -> String {
        report_file_name("batters_zscores", self.config.season.year)
    }
}

// ---------------------------------------------------------------------------
// Pitchers
// ---------------------------------------------------------------------------

pub struct PitcherZScoreReport<'a> {
    config: &'a Config,
    population: &'a [RankedEntry],
}

impl<'a> PitcherZScoreReport<'a> {
    pub fn new(config: &'a Config, population: &'a [RankedEntry]) -> Self {
        Self { config, population }
    }
}

impl Report for PitcherZScoreReport<'_> {
    type Row = PitcherProjection;
    type Output = Vec<ScoredPitcher>;

    fn read(&self) -> Result<Vec<PitcherProjection>> {
        let path = self.config.resolve(&self.config.paths.pitcher_projections);
        Ok(load_pitcher_projections(&path)?)
    }

    fn transform(&self, rows: Vec<PitcherProjection>) -> Result<Vec<ScoredPitcher>> {
        let pool = scoring_pool(rows, self.population, Role::Pitcher);
        let mut scored = score_pitchers(&pool);
        sort_by_total_desc(&mut scored, |s| s.zscores.total);
        Ok(scored)
    }

    fn format(&self, output: &Vec<ScoredPitcher>) -> TsvTable {
        pitcher_zscore_table(output)
    }

    fn file_name(&self) -> String {
        report_file_name("pitchers_zscores", self.config.season.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection(id: i64, name: &str) -> BatterProjection {
        BatterProjection {
            identity: Some(id),
            name: name.into(),
            pa: 600,
            r: 80,
            hr: 20,
            rbi: 80,
            sb: 10,
            avg: 0.265,
        }
    }

    #[test]
    fn pool_keeps_ranked_players_of_the_role_only() {
        let rows = vec![
            projection(1, "Ranked Bat"),
            projection(2, "Unranked Bat"),
            projection(3, "Two-Way Arm"),
        ];
        let population = vec![
            RankedEntry::new("Two-Way Arm", 1).with_identity(3).with_position("SP1"),
            RankedEntry::new("Ranked Bat", 2).with_identity(1).with_position("1B"),
        ];

        let pool = scoring_pool(rows, &population, Role::Batter);
        let names: Vec<&str> = pool.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Ranked Bat"]);
    }

    #[test]
    fn empty_ranking_scores_nobody() {
        let pool = scoring_pool(vec![projection(1, "Anyone")], &[], Role::Batter);
        assert!(pool.is_empty());
    }
}
