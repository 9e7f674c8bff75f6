// Valuation engine: projections, z-scores and population merging.

pub mod merge;
pub mod projections;
pub mod zscore;
