// Statistical season projections: types and CSV loading.
//
// Reads FanGraphs/Steamer-style export files, one for batters and one for
// pitchers. Counting stats may be fractional and are rounded.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::player::{Player, PlayerId};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Projected season line for a batter.
#[derive(Debug, Clone, PartialEq)]
pub struct BatterProjection {
    pub identity: Option<PlayerId>,
    pub name: String,
    pub pa: u32,
    pub r: u32,
    pub hr: u32,
    pub rbi: u32,
    pub sb: u32,
    pub avg: f64,
}

/// Projected season line for a pitcher.
#[derive(Debug, Clone, PartialEq)]
pub struct PitcherProjection {
    pub identity: Option<PlayerId>,
    pub name: String,
    pub ip: f64,
    pub w: u32,
    pub k: u32,
    pub sv: u32,
    pub h: u32,
    pub bb: u32,
    pub era: f64,
    pub whip: f64,
}

impl Player for BatterProjection {
    fn identity(&self) -> Option<PlayerId> {
        self.identity
    }

    fn set_identity(&mut self, identity: Option<PlayerId>) {
        self.identity = identity;
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Player for PitcherProjection {
    fn identity(&self) -> Option<PlayerId> {
        self.identity
    }

    fn set_identity(&mut self, identity: Option<PlayerId>) {
        self.identity = identity;
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawBatter {
    Name: String,
    PA: f64,
    R: f64,
    HR: f64,
    RBI: f64,
    SB: f64,
    #[serde(alias = "BA")]
    AVG: f64,
}

/// FanGraphs exports strikeouts as SO. WHIP is derived from H and BB when the
/// export leaves it out.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPitcher {
    Name: String,
    IP: f64,
    W: f64,
    #[serde(alias = "K")]
    SO: f64,
    SV: f64,
    #[serde(default)]
    H: f64,
    #[serde(default)]
    BB: f64,
    ERA: f64,
    #[serde(default)]
    WHIP: Option<f64>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

fn count(value: f64) -> u32 {
    value.max(0.0).round() as u32
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_batters_from_reader<R: Read>(rdr: R) -> Result<Vec<BatterProjection>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut batters = Vec::new();
    for result in reader.deserialize::<RawBatter>() {
        match result {
            Ok(raw) => {
                if !all_finite(&[raw.PA, raw.AVG]) {
                    warn!("skipping batter '{}': non-finite PA/AVG value", raw.Name.trim());
                    continue;
                }
                batters.push(BatterProjection {
                    identity: None,
                    name: raw.Name.trim().to_string(),
                    pa: count(raw.PA),
                    r: count(raw.R),
                    hr: count(raw.HR),
                    rbi: count(raw.RBI),
                    sb: count(raw.SB),
                    avg: raw.AVG,
                });
            }
            Err(e) => {
                warn!("skipping malformed batter row: {}", e);
            }
        }
    }
    Ok(batters)
}

fn load_pitchers_from_reader<R: Read>(rdr: R) -> Result<Vec<PitcherProjection>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut pitchers = Vec::new();
    for result in reader.deserialize::<RawPitcher>() {
        match result {
            Ok(raw) => {
                let whip = match raw.WHIP {
                    Some(whip) => whip,
                    None if raw.IP > 0.0 => (raw.H + raw.BB) / raw.IP,
                    None => 0.0,
                };
                if !all_finite(&[raw.IP, raw.ERA, whip]) {
                    warn!("skipping pitcher '{}': non-finite IP/ERA/WHIP value", raw.Name.trim());
                    continue;
                }
                pitchers.push(PitcherProjection {
                    identity: None,
                    name: raw.Name.trim().to_string(),
                    ip: raw.IP,
                    w: count(raw.W),
                    k: count(raw.SO),
                    sv: count(raw.SV),
                    h: count(raw.H),
                    bb: count(raw.BB),
                    era: raw.ERA,
                    whip,
                });
            }
            Err(e) => {
                warn!("skipping malformed pitcher row: {}", e);
            }
        }
    }
    Ok(pitchers)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load batter projections from a CSV file.
pub fn load_batter_projections(path: &Path) -> Result<Vec<BatterProjection>, ProjectionError> {
    let file = std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let batters = load_batters_from_reader(file).map_err(|e| ProjectionError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if batters.is_empty() {
        return Err(ProjectionError::Validation(format!(
            "batter CSV {} produced zero valid rows",
            path.display()
        )));
    }
    info!("loaded {} batter projections", batters.len());
    Ok(batters)
}

/// Load pitcher projections from a CSV file.
pub fn load_pitcher_projections(path: &Path) -> Result<Vec<PitcherProjection>, ProjectionError> {
    let file = std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let pitchers = load_pitchers_from_reader(file).map_err(|e| ProjectionError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if pitchers.is_empty() {
        return Err(ProjectionError::Validation(format!(
            "pitcher CSV {} produced zero valid rows",
            path.display()
        )));
    }
    info!("loaded {} pitcher projections", pitchers.len());
    Ok(pitchers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
