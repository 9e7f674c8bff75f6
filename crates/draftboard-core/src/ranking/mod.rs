// Ranking sources, manual offsets, adjusted ranks and snapshot deltas.

pub mod adjust;
pub mod delta;
pub mod offsets;
pub mod source;
