// Manual per-player rank offsets: storage seam, baseline seeding and batch
// adjustments.

use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::OffsetConfig;
use crate::player::{is_catcher, is_closer, PlayerId, RankedEntry};

// ---------------------------------------------------------------------------
// Storage seam
// ---------------------------------------------------------------------------

/// Key/value access to manual offsets. Players without a stored offset are
/// treated as 0.
pub trait OffsetStore {
    fn load_offsets(&self) -> Result<HashMap<PlayerId, i32>>;
    fn upsert_offset(&self, player_id: PlayerId, offset: i32) -> Result<()>;
    fn clear_offsets(&self) -> Result<()>;
}

/// In-process offset store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryOffsetStore {
    offsets: RefCell<HashMap<PlayerId, i32>>,
}

impl MemoryOffsetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(offsets: HashMap<PlayerId, i32>) -> Self {
        Self {
            offsets: RefCell::new(offsets),
        }
    }
}

impl OffsetStore for MemoryOffsetStore {
    fn load_offsets(&self) -> Result<HashMap<PlayerId, i32>> {
        Ok(self.offsets.borrow().clone())
    }

    fn upsert_offset(&self, player_id: PlayerId, offset: i32) -> Result<()> {
        self.offsets.borrow_mut().insert(player_id, offset);
        Ok(())
    }

    fn clear_offsets(&self) -> Result<()> {
        self.offsets.borrow_mut().clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Applying offsets
// ---------------------------------------------------------------------------

/// Copy each entry's stored offset onto it. Unresolved entries and players
/// with no stored offset get 0.
pub fn apply_offsets(entries: &mut [RankedEntry], offsets: &HashMap<PlayerId, i32>) {
    for entry in entries.iter_mut() {
        entry.offset = entry
            .identity
            .and_then(|id| offsets.get(&id).copied())
            .unwrap_or(0);
    }
}

// ---------------------------------------------------------------------------
// Baseline seeding
// ---------------------------------------------------------------------------

/// Reset the store and seed baseline offsets from a resolved ranking:
/// catchers get `catcher_baseline`, closers get `closer_baseline`.
///
/// Returns the number of offsets written.
pub fn seed_baseline_offsets(
    store: &dyn OffsetStore,
    entries: &[RankedEntry],
    settings: &OffsetConfig,
) -> Result<usize> {
    store.clear_offsets()?;

    let mut inserted = 0;
    for entry in entries {
        let Some(id) = entry.identity else {
            continue;
        };
        let position = entry.position.as_deref();
        let offset = if is_catcher(position) {
            settings.catcher_baseline
        } else if is_closer(position) {
            settings.closer_baseline
        } else {
            continue;
        };
        store.upsert_offset(id, offset)?;
        inserted += 1;
    }

    info!("baseline offsets inserted: {}", inserted);
    Ok(inserted)
}

// ---------------------------------------------------------------------------
// Batch adjustments
// ---------------------------------------------------------------------------

/// Parse a batch such as `"123,10|456,-5"` into `(player_id, offset)` pairs.
/// Malformed pairs are skipped with a warning.
pub fn parse_offset_batch(batch: &str) -> Vec<(PlayerId, i32)> {
    let mut pairs = Vec::new();
    for pair in batch.split('|').map(str::trim).filter(|p| !p.is_empty()) {
        let parts: Vec<&str> = pair.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
        let [id, offset] = parts.as_slice() else {
            warn!("skipping malformed offset pair '{}'", pair);
            continue;
        };
        match (id.parse::<PlayerId>(), offset.parse::<i32>()) {
            (Ok(id), Ok(offset)) => pairs.push((id, offset)),
            _ => warn!("skipping non-numeric offset pair '{}'", pair),
        }
    }
    pairs
}

/// Upsert every valid pair of `batch`. Returns the pairs that were written.
pub fn apply_offset_batch(store: &dyn OffsetStore, batch: &str) -> Result<Vec<(PlayerId, i32)>> {
    let pairs = parse_offset_batch(batch);
    for &(id, offset) in &pairs {
        store.upsert_offset(id, offset)?;
        info!("player {} -> offset {}", id, offset);
    }
    Ok(pairs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
