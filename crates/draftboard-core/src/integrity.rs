// Roster integrity checks: names shared across players, redundant aliases,
// accented names without a plain spelling and suspected duplicate players.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{info, warn};

use crate::identity::{normalize, NameIndex};
use crate::player::{CanonicalPlayer, PlayerId};

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// One name that resolves to more than one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub name: String,
    /// The id that wins resolution first, then every id that lost.
    pub ids: Vec<PlayerId>,
}

/// A player whose alias repeats the primary name or the other alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedundantAlias {
    pub id: PlayerId,
    pub primary_name: String,
    pub aliases: Vec<String>,
}

/// An accented primary name with no alias, so a plain-ASCII spelling in a
/// source file cannot resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPlainAlias {
    pub id: PlayerId,
    pub primary_name: String,
    pub plain_name: String,
}

/// Two players whose primary names differ only by accents or case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspectedDuplicate {
    pub first_id: PlayerId,
    pub first_name: String,
    pub second_id: PlayerId,
    pub second_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub missing_plain_aliases: Vec<MissingPlainAlias>,
    pub collisions: Vec<NameCollision>,
    pub redundant_aliases: Vec<RedundantAlias>,
    pub suspected_duplicates: Vec<SuspectedDuplicate>,
}

impl IntegrityReport {
    pub fn issue_count(&self) -> usize {
        self.missing_plain_aliases.len()
            + self.collisions.len()
            + self.redundant_aliases.len()
            + self.suspected_duplicates.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }
}

// ---------------------------------------------------------------------------
// Accent folding
// ---------------------------------------------------------------------------

fn fold_char(c: char) -> Option<char> {
    let plain = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        'ý' | 'ÿ' => 'y',
        'Ý' => 'Y',
        _ => return None,
    };
    Some(plain)
}

/// Replace the accented Latin letters found in player names with their plain
/// letter. Case is kept; other characters pass through.
pub fn fold_accents(name: &str) -> String {
    name.chars().map(|c| fold_char(c).unwrap_or(c)).collect()
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn missing_plain_aliases(roster: &[CanonicalPlayer]) -> Vec<MissingPlainAlias> {
    roster
        .iter()
        .filter(|p| p.aliases.iter().all(|a| a.trim().is_empty()))
        .filter_map(|p| {
            let primary = p.primary_name.trim();
            let plain = fold_accents(primary);
            (plain != primary).then(|| MissingPlainAlias {
                id: p.id,
                primary_name: primary.to_string(),
                plain_name: plain,
            })
        })
        .collect()
}

/// Names claimed by more than one id, most ids first, then by name.
fn collisions(index: &NameIndex) -> Vec<NameCollision> {
    let mut by_name: HashMap<String, NameCollision> = HashMap::new();
    for dup in index.duplicates().iter().filter(|d| d.kept != d.ignored) {
        let entry = by_name.entry(normalize(&dup.name)).or_insert_with(|| NameCollision {
            name: dup.name.clone(),
            ids: vec![dup.kept],
        });
        if !entry.ids.contains(&dup.ignored) {
            entry.ids.push(dup.ignored);
        }
    }
    let mut found: Vec<NameCollision> = by_name.into_values().collect();
    found.sort_by(|a, b| b.ids.len().cmp(&a.ids.len()).then_with(|| a.name.cmp(&b.name)));
    found
}

fn redundant_aliases(roster: &[CanonicalPlayer]) -> Vec<RedundantAlias> {
    roster
        .iter()
        .filter(|p| {
            let mut seen = HashSet::new();
            p.names()
                .map(normalize)
                .filter(|n| !n.is_empty())
                .any(|n| !seen.insert(n))
        })
        .map(|p| RedundantAlias {
            id: p.id,
            primary_name: p.primary_name.clone(),
            aliases: p.aliases.clone(),
        })
        .collect()
}

/// Every pair of players, lower id first, whose primary names match once
/// accents and case are ignored.
fn suspected_duplicates(roster: &[CanonicalPlayer]) -> Vec<SuspectedDuplicate> {
    let mut groups: BTreeMap<String, Vec<&CanonicalPlayer>> = BTreeMap::new();
    for player in roster {
        let key = normalize(&fold_accents(&player.primary_name));
        if !key.is_empty() {
            groups.entry(key).or_default().push(player);
        }
    }

    let mut pairs = Vec::new();
    for mut group in groups.into_values().filter(|g| g.len() > 1) {
        group.sort_by_key(|p| p.id);
        for (i, first) in group.iter().enumerate() {
            for second in &group[i + 1..] {
                pairs.push(SuspectedDuplicate {
                    first_id: first.id,
                    first_name: first.primary_name.clone(),
                    second_id: second.id,
                    second_name: second.primary_name.clone(),
                });
            }
        }
    }
    pairs.sort_by(|a, b| a.first_name.cmp(&b.first_name).then(a.first_id.cmp(&b.first_id)));
    pairs
}

/// Run every check over one roster snapshot. Nothing is modified.
pub fn check_roster(roster: &[CanonicalPlayer]) -> IntegrityReport {
    let index = NameIndex::build(roster);
    let report = IntegrityReport {
        missing_plain_aliases: missing_plain_aliases(roster),
        collisions: collisions(&index),
        redundant_aliases: redundant_aliases(roster),
        suspected_duplicates: suspected_duplicates(roster),
    };

    if report.is_clean() {
        info!("roster integrity: {} players, no issues", roster.len());
    } else {
        warn!(
            "roster integrity: {} accented names without alias, {} shared names, {} redundant aliases, {} suspected duplicates",
            report.missing_plain_aliases.len(),
            report.collisions.len(),
            report.redundant_aliases.len(),
            report.suspected_duplicates.len()
        );
    }
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
