// Rank movement simulation.
//
// Measures how far each player has to be dragged, one at a time, to turn a
// starting ranking into a target ranking. Each relocation is applied to a
// working copy before the next one is measured, so results depend on order.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::player::{Player, PlayerId};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Movement for one player of the starting list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRecord {
    pub identity: PlayerId,
    pub name: String,
    /// Zero-based position in the starting list (shared universe only).
    pub start_position: usize,
    /// Zero-based position in the target list, if the player appears there.
    pub target_position: Option<usize>,
    /// Positions moved; positive means moved up.
    pub movement: i64,
}

#[derive(Debug, Clone, Default)]
pub struct MovementReport {
    /// One record per starting player, in starting order.
    pub records: Vec<MovementRecord>,
    /// The two lists did not cover the same set of identities.
    pub universe_mismatch: bool,
    /// Target players skipped because they are not in the starting list.
    pub outside_universe: Vec<String>,
    /// Starting players that had no identity.
    pub unresolved: Vec<String>,
}

impl MovementReport {
    /// Records with a non-zero movement, in starting order.
    pub fn non_zero(&self) -> Vec<&MovementRecord> {
        self.records.iter().filter(|r| r.movement != 0).collect()
    }

    /// Non-zero records ordered by magnitude, ties broken by the better
    /// target position.
    pub fn by_magnitude(&self) -> Vec<&MovementRecord> {
        let mut rows = self.non_zero();
        rows.sort_by_key(|r| (std::cmp::Reverse(r.movement.abs()), r.target_position));
        rows
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Resolved identities in list order, first occurrence only.
fn distinct_identities<P: Player>(players: &[P]) -> Vec<(PlayerId, &P)> {
    let mut seen = HashSet::new();
    players
        .iter()
        .filter_map(|p| p.identity().map(|id| (id, p)))
        .filter(|(id, p)| {
            let fresh = seen.insert(*id);
            if !fresh {
                debug!("player '{}' (id {}) repeated in list; later entry ignored", p.name(), id);
            }
            fresh
        })
        .collect()
}

/// Simulate reordering `start` into `target`.
///
/// Both lists are restricted to the identities they share. Walking the target
/// in order, each player is located in the working list, its movement is
/// recorded as `current - target` (target index clamped to the working list),
/// and if non-zero it is removed and reinserted at the target index.
pub fn simulate_movement<S: Player, T: Player>(start: &[S], target: &[T]) -> MovementReport {
    let mut report = MovementReport {
        unresolved: start
            .iter()
            .filter(|p| p.identity().is_none())
            .map(|p| p.name().to_string())
            .collect(),
        ..MovementReport::default()
    };
    for name in &report.unresolved {
        warn!("starting player '{}' has no identity; excluded from movement", name);
    }

    let start_players = distinct_identities(start);
    let target_players = distinct_identities(target);

    let start_ids: HashSet<PlayerId> = start_players.iter().map(|(id, _)| *id).collect();
    let target_ids: HashSet<PlayerId> = target_players.iter().map(|(id, _)| *id).collect();

    if start_ids != target_ids {
        warn!(
            "player universe mismatch: {} starting players, {} target players",
            start_ids.len(),
            target_ids.len()
        );
        report.universe_mismatch = true;
    }

    let shared_start: Vec<(PlayerId, &S)> = start_players
        .into_iter()
        .filter(|(id, _)| target_ids.contains(id))
        .collect();

    let mut shared_target: Vec<(PlayerId, &T)> = Vec::with_capacity(target_players.len());
    for (id, player) in target_players {
        if start_ids.contains(&id) {
            shared_target.push((id, player));
        } else {
            warn!("target player '{}' (id {}) not in the starting list", player.name(), id);
            report.outside_universe.push(player.name().to_string());
        }
    }

    let mut working: Vec<PlayerId> = shared_start.iter().map(|(id, _)| *id).collect();
    let mut moves: Vec<(PlayerId, i64)> = Vec::new();

    for (target_index, (id, player)) in shared_target.iter().enumerate() {
        if working.is_empty() {
            break;
        }
        let Some(current) = working.iter().position(|w| w == id) else {
            warn!("target player '{}' not found in working list", player.name());
            continue;
        };
        let mut clamped = target_index.min(working.len() - 1);
        let movement = current as i64 - clamped as i64;
        moves.push((*id, movement));

        if movement != 0 {
            let moved = working.remove(current);
            if current < clamped {
                clamped -= 1;
            }
            working.insert(clamped, moved);
        }
    }

    report.records = shared_start
        .iter()
        .enumerate()
        .map(|(start_position, (id, player))| MovementRecord {
            identity: *id,
            name: player.name().to_string(),
            start_position,
            target_position: shared_target.iter().position(|(t, _)| t == id),
            movement: moves
                .iter()
                .find(|(m, _)| m == id)
                .map(|(_, movement)| *movement)
                .unwrap_or(0),
        })
        .collect();

    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::RankedEntry;

    fn list(names: &[(&str, PlayerId)]) -> Vec<RankedEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, (name, id))| RankedEntry::new(*name, i as u32 + 1).with_identity(*id))
            .collect()
    }

    fn movements(report: &MovementReport) -> Vec<(&str, i64)> {
        report.records.iter().map(|r| (r.name.as_str(), r.movement)).collect()
    }

    #[test]
    fn single_drag_to_top() {
        let start = list(&[("A", 1), ("B", 2), ("C", 3)]);
        let target = list(&[("C", 3), ("A", 1), ("B", 2)]);
        let report = simulate_movement(&start, &target);

        assert_eq!(movements(&report), vec![("A", 0), ("B", 0), ("C", 2)]);
        let non_zero: Vec<&str> = report.non_zero().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(non_zero, vec!["C"]);
        assert!(!report.universe_mismatch);
    }

    #[test]
    fn identical_lists_have_no_movement() {
        let start = list(&[("A", 1), ("B", 2), ("C", 3)]);
        let report = simulate_movement(&start, &start);
        assert!(report.non_zero().is_empty());
    }

    #[test]
    fn moving_down_compensates_for_removal() {
        // A drops from first to last
        let start = list(&[("A", 1), ("B", 2), ("C", 3)]);
        let target = list(&[("B", 2), ("C", 3), ("A", 1)]);
        let report = simulate_movement(&start, &target);
        // B is dragged above A giving [B,A,C]; C is then dragged above A
        assert_eq!(movements(&report), vec![("A", 0), ("B", 1), ("C", 1)]);
    }

    #[test]
    fn full_reversal_is_order_dependent() {
        let start = list(&[("A", 1), ("B", 2), ("C", 3), ("D", 4)]);
        let target = list(&[("D", 4), ("C", 3), ("B", 2), ("A", 1)]);
        let report = simulate_movement(&start, &target);
        // D: 3 -> 0, then [D,A,B,C]; C: 3 -> 1, then [D,C,A,B]; B: 3 -> 2
        assert_eq!(movements(&report), vec![("A", 0), ("B", 1), ("C", 2), ("D", 3)]);
    }

    #[test]
    fn universe_is_restricted_to_shared_identities() {
        let start = list(&[("A", 1), ("Gone", 9), ("B", 2)]);
        let target = list(&[("New", 8), ("B", 2), ("A", 1)]);
        let report = simulate_movement(&start, &target);

        assert!(report.universe_mismatch);
        assert_eq!(report.outside_universe, vec!["New".to_string()]);
        // Only A and B remain; B moves above A
        assert_eq!(movements(&report), vec![("A", 0), ("B", 1)]);
        assert_eq!(report.records[1].target_position, Some(0));
    }

    #[test]
    fn unresolved_starting_players_are_reported() {
        let mut start = list(&[("A", 1), ("B", 2)]);
        start.push(RankedEntry::new("Nobody", 3));
        let target = list(&[("B", 2), ("A", 1)]);
        let report = simulate_movement(&start, &target);
        assert_eq!(report.unresolved, vec!["Nobody".to_string()]);
        assert_eq!(report.records.len(), 2);
        assert!(!report.universe_mismatch);
    }

    #[test]
    fn by_magnitude_orders_largest_first() {
        let start = list(&[("A", 1), ("B", 2), ("C", 3), ("D", 4)]);
        let target = list(&[("D", 4), ("C", 3), ("B", 2), ("A", 1)]);
        let report = simulate_movement(&start, &target);
        let ordered: Vec<&str> = report.by_magnitude().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(ordered, vec!["D", "C", "B"]);
    }

    #[test]
    fn empty_lists_produce_empty_report() {
        let empty: Vec<RankedEntry> = Vec::new();
        let report = simulate_movement(&empty, &empty);
        assert!(report.records.is_empty());
        assert!(!report.universe_mismatch);
    }
}
