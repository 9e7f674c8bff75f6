// Offset-adjusted rank recomputation.

use crate::player::RankedEntry;

/// Reorder a ranked population by `rank - offset` and assign a dense
/// `adjusted_rank` of 1..=N.
///
/// Ties on effective rank fall back to the original rank; entries equal on
/// both keep their input order (the sort is stable). Offsets larger than the
/// list are allowed and only influence ordering.
pub fn adjust_ranks(mut entries: Vec<RankedEntry>) -> Vec<RankedEntry> {
    entries.sort_by_key(|e| (e.effective_rank(), e.rank));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.adjusted_rank = (index + 1) as u32;
    }
    entries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
