// Ranking source loading: the expert-consensus CSV and numbered ranking lists.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::player::RankedEntry;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RankingSourceError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Consensus CSV
// ---------------------------------------------------------------------------

/// Consensus ranking row. Headers are upper-cased before deserializing so
/// `Rk`/`RK` both match; extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRankingRow {
    #[serde(rename = "RK")]
    rank: String,
    #[serde(rename = "PLAYER NAME")]
    name: String,
    #[serde(rename = "TEAM", default)]
    team: String,
    #[serde(rename = "POS", default)]
    position: String,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Read at most `max_rows` rows (0 reads everything).
fn load_rankings_from_reader<R: Read>(rdr: R, max_rows: usize) -> Result<Vec<RankedEntry>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers: csv::StringRecord = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().trim_matches('"').to_uppercase())
        .collect();
    reader.set_headers(headers);

    let mut entries = Vec::new();
    for result in reader.deserialize::<RawRankingRow>() {
        if max_rows > 0 && entries.len() >= max_rows {
            break;
        }
        match result {
            Ok(raw) => {
                let Some(name) = non_empty(&raw.name) else {
                    warn!("skipping ranking row with empty player name");
                    continue;
                };
                let Ok(rank) = raw.rank.trim().parse::<u32>() else {
                    warn!("skipping '{}': unparseable rank '{}'", name, raw.rank);
                    continue;
                };
                entries.push(RankedEntry {
                    team: non_empty(&raw.team),
                    position: non_empty(&raw.position),
                    ..RankedEntry::new(name, rank)
                });
            }
            Err(e) => {
                warn!("skipping malformed ranking row: {}", e);
            }
        }
    }
    Ok(entries)
}

/// Load the expert-consensus ranking CSV.
pub fn load_rankings(path: &Path, max_rows: usize) -> Result<Vec<RankedEntry>, RankingSourceError> {
    let file = std::fs::File::open(path).map_err(|e| RankingSourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let entries = load_rankings_from_reader(file, max_rows).map_err(|e| RankingSourceError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    info!("loaded {} ranked players from {}", entries.len(), path.display());
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Numbered ranking list
// ---------------------------------------------------------------------------

/// Parse a pasted ranking list of `"<rank>. <name>"` lines. Blank lines,
/// headings and lines without a numeric prefix are skipped.
pub fn parse_ranking_list(text: &str) -> Vec<RankedEntry> {
    text.lines()
        .filter_map(|raw| {
            let line = raw.trim();
            if !line.starts_with(|c: char| c.is_ascii_digit()) {
                return None;
            }
            let (rank_part, name_part) = line.split_once('.')?;
            let rank = rank_part.trim().parse::<u32>().ok()?;
            let name = non_empty(name_part)?;
            Some(RankedEntry::new(name, rank))
        })
        .collect()
}

/// Load a numbered ranking list from a text file.
pub fn load_ranking_list(path: &Path) -> Result<Vec<RankedEntry>, RankingSourceError> {
    let text = std::fs::read_to_string(path).map_err(|e| RankingSourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let entries = parse_ranking_list(&text);
    info!("loaded {} ranked players from {}", entries.len(), path.display());
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
