// Adjusted-rank delta between two ranking snapshots.

use std::collections::HashMap;

use crate::player::{PlayerId, RankedEntry};

/// Movement of one player between a previous and the latest snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaRow {
    pub identity: Option<PlayerId>,
    pub name: String,
    pub team: Option<String>,
    pub position: Option<String>,
    /// Adjusted rank in the previous snapshot; 0 when the player was absent.
    pub previous_rank: u32,
    pub current_rank: u32,
}

impl DeltaRow {
    /// Positive when the player moved up.
    pub fn movement(&self) -> i64 {
        i64::from(self.previous_rank) - i64::from(self.current_rank)
    }
}

/// Window and size limits for the emitted delta.
#[derive(Debug, Clone, Copy)]
pub struct DeltaLimits {
    /// Keep a row only when either rank is within this many slots.
    pub window: u32,
    pub limit: usize,
}

/// Diff two adjusted snapshots by identity.
///
/// Rows without a previous rank are dropped. The rest are filtered to the
/// window, sorted by |movement| descending then current rank ascending, and
/// truncated to `limit`.
pub fn compute_delta(previous: &[RankedEntry], latest: &[RankedEntry], limits: DeltaLimits) -> Vec<DeltaRow> {
    let mut previous_by_id: HashMap<PlayerId, &RankedEntry> = HashMap::new();
    for entry in previous {
        if let Some(id) = entry.identity {
            previous_by_id.entry(id).or_insert(entry);
        }
    }

    let mut rows: Vec<DeltaRow> = latest
        .iter()
        .map(|current| {
            let previous_rank = current
                .identity
                .and_then(|id| previous_by_id.get(&id))
                .map(|old| old.adjusted_rank)
                .unwrap_or(0);
            DeltaRow {
                identity: current.identity,
                name: current.name.clone(),
                team: current.team.clone(),
                position: current.position.clone(),
                previous_rank,
                current_rank: current.adjusted_rank,
            }
        })
        .filter(|r| r.previous_rank > 0 && (r.previous_rank <= limits.window || r.current_rank <= limits.window))
        .collect();

    rows.sort_by(|a, b| {
        b.movement()
            .abs()
            .cmp(&a.movement().abs())
            .then(a.current_rank.cmp(&b.current_rank))
    });
    rows.truncate(limits.limit);
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(rows: &[(&str, PlayerId, u32)]) -> Vec<RankedEntry> {
        rows.iter()
            .map(|(name, id, adjusted)| {
                let mut e = RankedEntry::new(*name, *adjusted).with_identity(*id);
                e.adjusted_rank = *adjusted;
                e
            })
            .collect()
    }

    const WIDE: DeltaLimits = DeltaLimits { window: 250, limit: 50 };

    #[test]
    fn movement_is_previous_minus_current() {
        let previous = snapshot(&[("A", 1, 1), ("B", 2, 2), ("C", 3, 3)]);
        let latest = snapshot(&[("C", 3, 1), ("A", 1, 2), ("B", 2, 3)]);
        let delta = compute_delta(&previous, &latest, WIDE);

        assert_eq!(delta[0].name, "C");
        assert_eq!(delta[0].movement(), 2);
        // A and B both moved by 1; A has the better current rank
        assert_eq!(delta[1].name, "A");
        assert_eq!(delta[1].movement(), -1);
        assert_eq!(delta[2].name, "B");
    }

    #[test]
    fn new_players_are_dropped() {
        let previous = snapshot(&[("A", 1, 1)]);
        let mut latest = snapshot(&[("A", 1, 1), ("New", 9, 2)]);
        latest.push(RankedEntry::new("Unresolved", 3));
        let delta = compute_delta(&previous, &latest, WIDE);
        assert_eq!(delta.len(), 1);
        assert_eq!(delta[0].name, "A");
    }

    #[test]
    fn window_and_limit_are_applied() {
        let previous = snapshot(&[("A", 1, 300), ("B", 2, 10), ("C", 3, 20), ("D", 4, 30)]);
        let latest = snapshot(&[("A", 1, 290), ("B", 2, 12), ("C", 3, 25), ("D", 4, 40)]);
        let delta = compute_delta(&previous, &latest, DeltaLimits { window: 250, limit: 2 });
        let names: Vec<&str> = delta.iter().map(|r| r.name.as_str()).collect();
        // A falls outside the window on both sides
        assert_eq!(names, vec!["D", "C"]);
    }
}
