// Shared player data model: identities, roles and the ranking row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable numeric key correlating the same real-world player across sources.
pub type PlayerId = i64;

// ---------------------------------------------------------------------------
// Player capability
// ---------------------------------------------------------------------------

/// Fields shared by every record shape that names a player (ranking rows,
/// batter projections, pitcher projections).
///
/// Identity resolution works against this trait so a single resolver pass can
/// enrich any source.
pub trait Player {
    fn identity(&self) -> Option<PlayerId>;
    fn set_identity(&mut self, identity: Option<PlayerId>);
    fn name(&self) -> &str;

    /// Source-given position string. Projection rows carry none.
    fn position(&self) -> Option<&str> {
        None
    }

    fn role(&self) -> Role {
        Role::from_position(self.position())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Whether a player is scored in the batter or the pitcher population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Batter,
    Pitcher,
}

impl Role {
    /// Infer the role from a ranking position string.
    ///
    /// Any value starting with "SP" or "RP", or exactly "P" (case-insensitive),
    /// is a pitcher. Everything else, including a missing position, is a batter.
    pub fn from_position(position: Option<&str>) -> Self {
        let Some(pos) = position.map(str::trim).filter(|p| !p.is_empty()) else {
            return Role::Batter;
        };
        let upper = pos.to_uppercase();
        if upper.starts_with("SP") || upper.starts_with("RP") || upper == "P" {
            Role::Pitcher
        } else {
            Role::Batter
        }
    }

    /// Single-letter tag used in the combined score table.
    pub fn tag(&self) -> &'static str {
        match self {
            Role::Batter => "B",
            Role::Pitcher => "P",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Batter => write!(f, "batter"),
            Role::Pitcher => write!(f, "pitcher"),
        }
    }
}

/// Ranking positions such as "C", "C1" or "C,1B" mark a catcher. Center
/// fielders ("CF") do not.
pub fn is_catcher(position: Option<&str>) -> bool {
    position
        .map(|p| {
            let upper = p.trim().to_uppercase();
            upper.starts_with('C') && !upper.starts_with("CF")
        })
        .unwrap_or(false)
}

/// Relief-pitcher positions ("RP", "RP3") are treated as closers.
pub fn is_closer(position: Option<&str>) -> bool {
    position
        .map(|p| p.trim().to_uppercase().starts_with("RP"))
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Canonical roster record
// ---------------------------------------------------------------------------

/// A player as known to the roster store: one id, one primary name and up to
/// two aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPlayer {
    pub id: PlayerId,
    pub primary_name: String,
    pub aliases: Vec<String>,
}

impl CanonicalPlayer {
    pub fn new(id: PlayerId, primary_name: impl Into<String>) -> Self {
        Self {
            id,
            primary_name: primary_name.into(),
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// The primary name followed by each alias, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

// ---------------------------------------------------------------------------
// Ranked entry
// ---------------------------------------------------------------------------

/// One row of a ranking source (expert consensus list or a personal list).
///
/// `identity` is filled by the resolver; `offset` and `adjusted_rank` by the
/// rank adjuster.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub identity: Option<PlayerId>,
    pub name: String,
    pub team: Option<String>,
    pub position: Option<String>,
    pub rank: u32,
    pub offset: i32,
    pub adjusted_rank: u32,
}

impl RankedEntry {
    pub fn new(name: impl Into<String>, rank: u32) -> Self {
        Self {
            identity: None,
            name: name.into(),
            team: None,
            position: None,
            rank,
            offset: 0,
            adjusted_rank: 0,
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_identity(mut self, identity: PlayerId) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    /// `rank - offset`. A positive offset promotes the player.
    pub fn effective_rank(&self) -> i64 {
        i64::from(self.rank) - i64::from(self.offset)
    }
}

impl Player for RankedEntry {
    fn identity(&self) -> Option<PlayerId> {
        self.identity
    }

    fn set_identity(&mut self, identity: Option<PlayerId>) {
        self.identity = identity;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Option<&str> {
        self.position.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
