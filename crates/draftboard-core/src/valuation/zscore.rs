// Category z-scores for the batter and pitcher scoring pools. Rate stats
// (AVG, ERA, WHIP) are weighted by playing time.

use crate::player::{Player, PlayerId};
use crate::valuation::projections::{BatterProjection, PitcherProjection};

// ---------------------------------------------------------------------------
// Pool statistics
// ---------------------------------------------------------------------------

/// Spread of one category over the scoring pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Spreads below this count as no spread at all.
const STDEV_EPSILON: f64 = 1e-9;

/// Population mean and standard deviation (divides by N). An empty slice
/// yields zeros.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    PoolStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// `(value - mean) / stdev`, or 0.0 when the pool has no spread.
pub fn compute_zscore(value: f64, stats: &PoolStats) -> f64 {
    if stats.stdev < STDEV_EPSILON {
        return 0.0;
    }
    (value - stats.mean) / stats.stdev
}

/// Volume-weighted rate z-score: `((value - mean) * volume) / (stdev * mean_volume)`.
///
/// A rate over a small sample counts for proportionally less. Returns 0.0
/// when either the standard deviation or the mean volume is approximately zero.
pub fn weighted_rate_zscore(value: f64, stats: &PoolStats, volume: f64, mean_volume: f64) -> f64 {
    if stats.stdev < STDEV_EPSILON || mean_volume.abs() < STDEV_EPSILON {
        return 0.0;
    }
    ((value - stats.mean) * volume) / (stats.stdev * mean_volume)
}

/// Same as [`weighted_rate_zscore`] for categories where lower is better:
/// `((mean - value) * volume) / (stdev * mean_volume)`.
pub fn inverted_rate_zscore(value: f64, stats: &PoolStats, volume: f64, mean_volume: f64) -> f64 {
    if stats.stdev < STDEV_EPSILON || mean_volume.abs() < STDEV_EPSILON {
        return 0.0;
    }
    ((stats.mean - value) * volume) / (stats.stdev * mean_volume)
}

// ---------------------------------------------------------------------------
// Per-category z-score structs
// ---------------------------------------------------------------------------

/// Per-category z-scores for a batter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatterZScores {
    pub r: f64,
    pub hr: f64,
    pub rbi: f64,
    pub sb: f64,
    /// PA-weighted batting average.
    pub avg: f64,
    pub total: f64,
}

/// Per-category z-scores for a pitcher. ERA and WHIP are inverted and
/// IP-weighted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PitcherZScores {
    pub w: f64,
    pub k: f64,
    pub sv: f64,
    pub era: f64,
    pub whip: f64,
    pub total: f64,
}

// ---------------------------------------------------------------------------
// Pool stats structs
// ---------------------------------------------------------------------------

/// Aggregated pool statistics for all batter categories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatterPoolStats {
    pub r: PoolStats,
    pub hr: PoolStats,
    pub rbi: PoolStats,
    pub sb: PoolStats,
    pub avg: PoolStats,
    pub mean_pa: f64,
}

/// Aggregated pool statistics for all pitcher categories.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitcherPoolStats {
    pub w: PoolStats,
    pub k: PoolStats,
    pub sv: PoolStats,
    pub era: PoolStats,
    pub whip: PoolStats,
    pub mean_ip: f64,
}

/// Compute per-category pool stats for a batter population.
pub fn compute_batter_pool_stats(pool: &[BatterProjection]) -> BatterPoolStats {
    let stats_of = |f: fn(&BatterProjection) -> f64| {
        let values: Vec<f64> = pool.iter().map(f).collect();
        compute_pool_stats(&values)
    };
    BatterPoolStats {
        r: stats_of(|b| b.r as f64),
        hr: stats_of(|b| b.hr as f64),
        rbi: stats_of(|b| b.rbi as f64),
        sb: stats_of(|b| b.sb as f64),
        avg: stats_of(|b| b.avg),
        mean_pa: stats_of(|b| b.pa as f64).mean,
    }
}

/// Compute per-category pool stats for a pitcher population.
pub fn compute_pitcher_pool_stats(pool: &[PitcherProjection]) -> PitcherPoolStats {
    let stats_of = |f: fn(&PitcherProjection) -> f64| {
        let values: Vec<f64> = pool.iter().map(f).collect();
        compute_pool_stats(&values)
    };
    PitcherPoolStats {
        w: stats_of(|p| p.w as f64),
        k: stats_of(|p| p.k as f64),
        sv: stats_of(|p| p.sv as f64),
        era: stats_of(|p| p.era),
        whip: stats_of(|p| p.whip),
        mean_ip: stats_of(|p| p.ip).mean,
    }
}

// ---------------------------------------------------------------------------
// Z-score computation for individual players
// ---------------------------------------------------------------------------

pub fn compute_batter_zscores(batter: &BatterProjection, stats: &BatterPoolStats) -> BatterZScores {
    let r = compute_zscore(batter.r as f64, &stats.r);
    let hr = compute_zscore(batter.hr as f64, &stats.hr);
    let rbi = compute_zscore(batter.rbi as f64, &stats.rbi);
    let sb = compute_zscore(batter.sb as f64, &stats.sb);
    let avg = weighted_rate_zscore(batter.avg, &stats.avg, batter.pa as f64, stats.mean_pa);

    BatterZScores {
        r,
        hr,
        rbi,
        sb,
        avg,
        total: r + hr + rbi + sb + avg,
    }
}

pub fn compute_pitcher_zscores(pitcher: &PitcherProjection, stats: &PitcherPoolStats) -> PitcherZScores {
    let w = compute_zscore(pitcher.w as f64, &stats.w);
    let k = compute_zscore(pitcher.k as f64, &stats.k);
    let sv = compute_zscore(pitcher.sv as f64, &stats.sv);
    let era = inverted_rate_zscore(pitcher.era, &stats.era, pitcher.ip, stats.mean_ip);
    let whip = inverted_rate_zscore(pitcher.whip, &stats.whip, pitcher.ip, stats.mean_ip);

    PitcherZScores {
        w,
        k,
        sv,
        era,
        whip,
        total: w + k + sv + era + whip,
    }
}

// ---------------------------------------------------------------------------
// Scored rows
// ---------------------------------------------------------------------------

/// A batter projection together with its z-scores against its population.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBatter {
    pub projection: BatterProjection,
    pub zscores: BatterZScores,
}

/// A pitcher projection together with its z-scores against its population.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPitcher {
    pub projection: PitcherProjection,
    pub zscores: PitcherZScores,
}

impl Player for ScoredBatter {
    fn identity(&self) -> Option<PlayerId> {
        self.projection.identity
    }

    fn set_identity(&mut self, identity: Option<PlayerId>) {
        self.projection.identity = identity;
    }

    fn name(&self) -> &str {
        &self.projection.name
    }
}

impl Player for ScoredPitcher {
    fn identity(&self) -> Option<PlayerId> {
        self.projection.identity
    }

    fn set_identity(&mut self, identity: Option<PlayerId>) {
        self.projection.identity = identity;
    }

    fn name(&self) -> &str {
        &self.projection.name
    }
}

// ---------------------------------------------------------------------------
// Top-level entry points
// ---------------------------------------------------------------------------

/// Score every batter against the population statistics of `population`.
///
/// Returns a new collection in input order; the input is left untouched.
/// An empty population yields an empty result and zero-variance categories
/// score 0 for everyone.
pub fn score_batters(population: &[BatterProjection]) -> Vec<ScoredBatter> {
    let stats = compute_batter_pool_stats(population);
    population
        .iter()
        .map(|b| ScoredBatter {
            projection: b.clone(),
            zscores: compute_batter_zscores(b, &stats),
        })
        .collect()
}

/// Score every pitcher against the population statistics of `population`.
pub fn score_pitchers(population: &[PitcherProjection]) -> Vec<ScoredPitcher> {
    let stats = compute_pitcher_pool_stats(population);
    population
        .iter()
        .map(|p| ScoredPitcher {
            projection: p.clone(),
            zscores: compute_pitcher_zscores(p, &stats),
        })
        .collect()
}

/// Sort scored rows descending by total z-score.
pub fn sort_by_total_desc<T>(rows: &mut [T], total: impl Fn(&T) -> f64) {
    rows.sort_by(|a, b| total(b).partial_cmp(&total(a)).unwrap_or(std::cmp::Ordering::Equal));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
