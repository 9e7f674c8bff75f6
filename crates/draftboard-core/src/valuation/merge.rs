// Population merging: the ranking source defines who is scored and in which
// role; the projection sources define how.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::player::{Player, PlayerId, RankedEntry, Role};
use crate::valuation::zscore::{sort_by_total_desc, ScoredBatter, ScoredPitcher};

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// A ranked player with no row in the projection population of their role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    pub identity: PlayerId,
    pub name: String,
    pub role: Role,
}

/// Build an identity lookup, dropping rows without an identity. When two rows
/// share an identity the first one is kept.
pub fn index_by_identity<T: Player>(rows: &[T]) -> HashMap<PlayerId, &T> {
    let mut lookup: HashMap<PlayerId, &T> = HashMap::with_capacity(rows.len());
    for row in rows {
        let Some(id) = row.identity() else {
            continue;
        };
        if lookup.contains_key(&id) {
            warn!("duplicate projection for player id {} ('{}') ignored", id, row.name());
            continue;
        }
        lookup.insert(id, row);
    }
    lookup
}

/// Walk the authoritative population once, yielding each resolved,
/// not-yet-seen entry with its identity and role.
fn authoritative_members<'a>(
    authoritative: &'a [RankedEntry],
    unresolved: &'a mut Vec<String>,
) -> impl Iterator<Item = (&'a RankedEntry, PlayerId, Role)> + 'a {
    let mut seen: HashSet<PlayerId> = HashSet::new();
    authoritative.iter().filter_map(move |entry| {
        let Some(id) = entry.identity else {
            warn!("ranked player '{}' has no identity; skipped", entry.name);
            unresolved.push(entry.name.clone());
            return None;
        };
        if !seen.insert(id) {
            warn!("ranked player '{}' (id {}) listed twice; later listing skipped", entry.name, id);
            return None;
        }
        Some((entry, id, entry.role()))
    })
}

fn report_gap(gaps: &mut Vec<CoverageGap>, entry: &RankedEntry, id: PlayerId, role: Role) {
    warn!(
        "ranked player '{}' (id {}) has no {} projection; skipped",
        entry.name, id, role
    );
    gaps.push(CoverageGap {
        identity: id,
        name: entry.name.clone(),
        role,
    });
}

// ---------------------------------------------------------------------------
// Scoring population selection
// ---------------------------------------------------------------------------

/// Projections of one role restricted to the ranked population.
#[derive(Debug, Clone)]
pub struct RoleSelection<T> {
    pub rows: Vec<T>,
    pub gaps: Vec<CoverageGap>,
    pub unresolved: Vec<String>,
}

/// Select, in ranking order, the projection row for every ranked player of
/// `role`. Z-scores are then computed over this population only.
pub fn select_role<T: Player + Clone>(authoritative: &[RankedEntry], rows: &[T], role: Role) -> RoleSelection<T> {
    let lookup = index_by_identity(rows);

    let mut selected = Vec::new();
    let mut gaps = Vec::new();
    let mut unresolved = Vec::new();
    for (entry, id, entry_role) in authoritative_members(authoritative, &mut unresolved) {
        if entry_role != role {
            continue;
        }
        match lookup.get(&id) {
            Some(row) => selected.push((*row).clone()),
            None => report_gap(&mut gaps, entry, id, role),
        }
    }
    RoleSelection {
        rows: selected,
        gaps,
        unresolved,
    }
}

// ---------------------------------------------------------------------------
// Combined rows
// ---------------------------------------------------------------------------

/// One role-correct row of the combined board.
///
/// `slots` hold R/HR/RBI/SB/AVG for batters and W/SV/K/ERA/WHIP for pitchers.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedScoreRow {
    pub identity: PlayerId,
    pub name: String,
    pub role: Role,
    pub slots: [f64; 5],
    pub total_z: f64,
}

impl CombinedScoreRow {
    pub fn from_batter(identity: PlayerId, batter: &ScoredBatter) -> Self {
        let z = &batter.zscores;
        Self {
            identity,
            name: batter.projection.name.clone(),
            role: Role::Batter,
            slots: [z.r, z.hr, z.rbi, z.sb, z.avg],
            total_z: z.total,
        }
    }

    pub fn from_pitcher(identity: PlayerId, pitcher: &ScoredPitcher) -> Self {
        let z = &pitcher.zscores;
        Self {
            identity,
            name: pitcher.projection.name.clone(),
            role: Role::Pitcher,
            slots: [z.w, z.sv, z.k, z.era, z.whip],
            total_z: z.total,
        }
    }
}

/// Combined rows plus the players that could not be merged.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub rows: Vec<CombinedScoreRow>,
    pub gaps: Vec<CoverageGap>,
    pub unresolved: Vec<String>,
}

/// Build one combined row per resolved ranked player whose role-specific
/// scored row exists, sorted descending by total z-score.
///
/// Unresolved players and coverage gaps are skipped and reported; neither
/// stops the merge.
pub fn combine(
    authoritative: &[RankedEntry],
    batters: &[ScoredBatter],
    pitchers: &[ScoredPitcher],
) -> MergeOutcome {
    let batter_lookup = index_by_identity(batters);
    let pitcher_lookup = index_by_identity(pitchers);

    let mut outcome = MergeOutcome::default();
    let mut unresolved = Vec::new();
    for (entry, id, role) in authoritative_members(authoritative, &mut unresolved) {
        let row = match role {
            Role::Batter => batter_lookup.get(&id).map(|b| CombinedScoreRow::from_batter(id, b)),
            Role::Pitcher => pitcher_lookup.get(&id).map(|p| CombinedScoreRow::from_pitcher(id, p)),
        };
        match row {
            Some(row) => outcome.rows.push(row),
            None => report_gap(&mut outcome.gaps, entry, id, role),
        }
    }
    outcome.unresolved = unresolved;

    sort_by_total_desc(&mut outcome.rows, |r| r.total_z);
    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
