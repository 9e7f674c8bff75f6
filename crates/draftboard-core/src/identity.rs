// Cross-source player identity resolution tolerant of name aliases.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, warn};

use crate::player::{CanonicalPlayer, Player, PlayerId};

// ---------------------------------------------------------------------------
// Roster access
// ---------------------------------------------------------------------------

/// Read-only access to the full roster snapshot.
pub trait RosterSource {
    fn all_players(&self) -> Result<Vec<CanonicalPlayer>>;
}

/// A roster that can also take new players.
pub trait RosterStore: RosterSource {
    /// Insert a player with no aliases and return the id the store assigned.
    fn insert_player(&self, name: &str) -> Result<PlayerId>;
    /// Insert or replace a player by id.
    fn upsert_player(&self, player: &CanonicalPlayer) -> Result<()>;
}

impl RosterSource for [CanonicalPlayer] {
    fn all_players(&self) -> Result<Vec<CanonicalPlayer>> {
        Ok(self.to_vec())
    }
}

impl RosterSource for Vec<CanonicalPlayer> {
    fn all_players(&self) -> Result<Vec<CanonicalPlayer>> {
        Ok(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Name index
// ---------------------------------------------------------------------------

/// A name that was already claimed by another player when the index was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateName {
    pub name: String,
    pub kept: PlayerId,
    pub ignored: PlayerId,
}

/// Case-insensitive lookup from trimmed names and aliases to player ids.
#[derive(Debug, Default)]
pub struct NameIndex {
    by_name: HashMap<String, PlayerId>,
    duplicates: Vec<DuplicateName>,
}

pub(crate) fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl NameIndex {
    /// Insert each roster player's primary name and aliases in roster order.
    /// The first insertion of a name wins; later ones are recorded in
    /// `duplicates` and never overwrite.
    pub fn build(roster: &[CanonicalPlayer]) -> Self {
        let mut index = NameIndex::default();
        for player in roster {
            for name in player.names() {
                index.insert(name, player.id);
            }
        }
        index
    }

    fn insert(&mut self, name: &str, id: PlayerId) {
        let key = normalize(name);
        if key.is_empty() {
            return;
        }
        match self.by_name.get(&key) {
            Some(&kept) => {
                warn!("duplicate roster name '{}' ignored (kept id {}, ignored id {})", name.trim(), kept, id);
                self.duplicates.push(DuplicateName {
                    name: name.trim().to_string(),
                    kept,
                    ignored: id,
                });
            }
            None => {
                self.by_name.insert(key, id);
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<PlayerId> {
        self.by_name.get(&normalize(name)).copied()
    }

    pub fn duplicates(&self) -> &[DuplicateName] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Batch resolution
// ---------------------------------------------------------------------------

/// Outcome of one resolution batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: usize,
    pub unresolved: Vec<String>,
    pub duplicates: Vec<DuplicateName>,
}

/// Set `identity` on every entry from the roster snapshot.
///
/// Entries whose trimmed name is not found get `None`. This never fails; the
/// returned `Resolution` carries the diagnostics.
pub fn resolve_identities<P: Player>(roster: &[CanonicalPlayer], entries: &mut [P]) -> Resolution {
    let index = NameIndex::build(roster);
    let mut resolution = resolve_with_index(&index, entries);
    resolution.duplicates = index.duplicates().to_vec();
    resolution
}

/// Resolve against a prebuilt index. Duplicates are left empty since they
/// belong to the index, not to this batch.
pub fn resolve_with_index<P: Player>(index: &NameIndex, entries: &mut [P]) -> Resolution {
    let mut resolution = Resolution::default();
    for entry in entries.iter_mut() {
        match index.lookup(entry.name()) {
            Some(id) => {
                entry.set_identity(Some(id));
                resolution.resolved += 1;
            }
            None => {
                entry.set_identity(None);
                warn!("player not found in roster: '{}'", entry.name().trim());
                resolution.unresolved.push(entry.name().trim().to_string());
            }
        }
    }
    debug!(
        "resolved {} of {} players ({} unresolved)",
        resolution.resolved,
        entries.len(),
        resolution.unresolved.len()
    );
    resolution
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::RankedEntry;

    fn roster() -> Vec<CanonicalPlayer> {
        vec![
            CanonicalPlayer::new(1, "Mike Trout").with_alias("Trout"),
            CanonicalPlayer::new(2, "Shohei Ohtani").with_alias("Shohei Ohtani (Batter)"),
            CanonicalPlayer::new(3, "Will Smith").with_alias("Will D. Smith"),
            CanonicalPlayer::new(4, "Will Smith").with_alias("Will G. Smith"),
        ]
    }

    #[test]
    fn alias_resolves_with_trim_and_case_folding() {
        let mut entries = vec![RankedEntry::new(" trout ", 1)];
        let res = resolve_identities(&roster(), &mut entries);
        assert_eq!(entries[0].identity, Some(1));
        assert_eq!(res.resolved, 1);
        assert!(res.unresolved.is_empty());
    }

    #[test]
    fn primary_name_resolves() {
        let mut entries = vec![RankedEntry::new("SHOHEI OHTANI", 1)];
        resolve_identities(&roster(), &mut entries);
        assert_eq!(entries[0].identity, Some(2));
    }

    #[test]
    fn first_insertion_wins_on_collision() {
        let mut entries = vec![RankedEntry::new("Will Smith", 1), RankedEntry::new("Will G. Smith", 2)];
        let res = resolve_identities(&roster(), &mut entries);
        assert_eq!(entries[0].identity, Some(3));
        assert_eq!(entries[1].identity, Some(4));
        assert_eq!(
            res.duplicates,
            vec![DuplicateName {
                name: "Will Smith".into(),
                kept: 3,
                ignored: 4,
            }]
        );
    }

    #[test]
    fn alias_repeating_own_primary_name_is_reported() {
        let roster = vec![CanonicalPlayer::new(9, "Bobby Witt Jr.").with_alias("BOBBY WITT JR.")];
        let index = NameIndex::build(&roster);
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.duplicates(),
            &[DuplicateName {
                name: "BOBBY WITT JR.".into(),
                kept: 9,
                ignored: 9,
            }]
        );
        assert_eq!(index.lookup("bobby witt jr."), Some(9));
    }

    #[test]
    fn unresolved_name_clears_identity() {
        let mut entries = vec![RankedEntry::new("Nobody Known", 1).with_identity(77)];
        let res = resolve_identities(&roster(), &mut entries);
        assert_eq!(entries[0].identity, None);
        assert_eq!(res.unresolved, vec!["Nobody Known".to_string()]);
    }

    #[test]
    fn blank_aliases_are_skipped() {
        let roster = vec![CanonicalPlayer::new(5, "Juan Soto").with_alias("   ")];
        let index = NameIndex::build(&roster);
        assert_eq!(index.len(), 1);
        assert_eq!(index.lookup(""), None);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut entries: Vec<RankedEntry> = Vec::new();
        let res = resolve_identities(&roster(), &mut entries);
        assert_eq!(res.resolved, 0);
        assert!(res.unresolved.is_empty());
    }
}
