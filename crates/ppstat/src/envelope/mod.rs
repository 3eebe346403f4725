//! Monte Carlo envelopes under CSR.
//!
//! Purpose
//! - Compare an observed estimator curve against `n_simulations` CSR
//!   realizations with the same window and point count.
//!
//! Model
//! - Simulation `s` draws from `ReplayToken { seed, index: s }`, so results do
//!   not depend on how the worker pool schedules simulations.
//! - The correction and, for g, the kernel bandwidth are resolved once on the
//!   observed pattern; every simulated curve reuses them.
//! - Simulations run on a fixed-size rayon pool in batches; the abort flag is
//!   checked between batches. Aggregation waits for every batch.
//! - Pointwise: rank-th smallest / largest simulated value per radius.
//! - Global: centre ± the rank-th largest maximum absolute deviation of a
//!   simulated curve from the centre, one band width for all radii. The centre
//!   is the mean of the simulated curves.

mod aggregate;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::estimate::{
    estimate, Bandwidth, Correction, Curve, Estimator, EstimatorCfg, RadiusGrid,
};
use crate::pattern::{simulate_csr_replay, Pattern, ReplayToken};

pub use aggregate::{Exceedance, Side};

/// Envelope configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeCfg {
    /// Default 99.
    pub n_simulations: usize,
    /// 1 picks the extreme simulated values. Default 1.
    pub rank: usize,
    /// Joint band over all radii instead of per-radius bounds. Default false.
    pub global: bool,
    /// Base seed for the per-simulation replay tokens. Default 0.
    pub seed: u64,
    /// Worker threads; `None` uses rayon's default. Default None.
    pub threads: Option<usize>,
    /// Simulations per batch between abort checks. Default 32.
    pub batch_size: usize,
}

impl Default for EnvelopeCfg {
    fn default() -> Self {
        Self {
            n_simulations: 99,
            rank: 1,
            global: false,
            seed: 0,
            threads: None,
            batch_size: 32,
        }
    }
}

impl EnvelopeCfg {
    pub fn validate(&self) -> Result<()> {
        if self.rank == 0 || self.n_simulations < self.rank {
            return Err(Error::InsufficientSimulations {
                n_simulations: self.n_simulations,
                rank: self.rank,
            });
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch_size must be > 0"));
        }
        if self.threads == Some(0) {
            return Err(Error::config("threads must be > 0"));
        }
        Ok(())
    }
}

/// Observed curve with simulation bounds on one radius grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Envelope {
    pub observed: Curve,
    pub lower: Curve,
    pub upper: Curve,
    /// Mean of the simulated curves.
    pub centre: Curve,
    pub n_simulations: usize,
    pub rank: usize,
    pub global: bool,
    /// Monte Carlo p-value of the maximum-absolute-deviation test:
    /// (1 + #{simulated deviation >= observed deviation}) / (n_simulations + 1).
    pub mad_p_value: f64,
}

impl Envelope {
    /// Radii where the observed curve leaves the band.
    pub fn exceedances(&self) -> Vec<Exceedance> {
        aggregate::exceedances(self)
    }
}

/// `envelope(pattern, estimator, correction, cfg)` without an abort flag.
pub fn envelope(
    pattern: &Pattern,
    estimator: Estimator,
    correction: Correction,
    grid: &RadiusGrid,
    est_cfg: &EstimatorCfg,
    cfg: &EnvelopeCfg,
) -> Result<Envelope> {
    let never = AtomicBool::new(false);
    envelope_with_abort(pattern, estimator, correction, grid, est_cfg, cfg, &never)
}

/// Envelope that stops with `Aborted` once `abort` is raised; the flag is
/// checked before each batch.
pub fn envelope_with_abort(
    pattern: &Pattern,
    estimator: Estimator,
    correction: Correction,
    grid: &RadiusGrid,
    est_cfg: &EstimatorCfg,
    cfg: &EnvelopeCfg,
    abort: &AtomicBool,
) -> Result<Envelope> {
    cfg.validate()?;
    est_cfg.validate()?;
    let resolved = correction.resolve(estimator, pattern.len(), est_cfg)?;
    let mut pinned = *est_cfg;
    if estimator.uses_bandwidth() {
        pinned.bandwidth = Bandwidth::Fixed(est_cfg.bandwidth.resolve(pattern)?);
    }
    let est_cfg = &pinned;
    let observed = estimate(pattern, estimator, resolved, grid, est_cfg)?;

    let started = Instant::now();
    tracing::info!(
        estimator = estimator.name(),
        correction = resolved.name(),
        n_points = pattern.len(),
        n_simulations = cfg.n_simulations,
        rank = cfg.rank,
        global = cfg.global,
        "envelope simulation start"
    );

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(t) = cfg.threads {
        builder = builder.num_threads(t);
    }
    let pool = builder
        .build()
        .map_err(|e| Error::config(format!("worker pool: {e}")))?;

    let window = *pattern.window();
    let count = pattern.len();
    let simulate = |index: usize| -> Result<Vec<f64>> {
        let tok = ReplayToken {
            seed: cfg.seed,
            index: index as u64,
        };
        let sim = simulate_csr_replay(&window, count, tok);
        let curve = estimate(&sim, estimator, resolved, grid, est_cfg)?;
        Ok(curve.values().to_vec())
    };
    let simulated = run_batches(&pool, cfg, abort, simulate, |_| {})?;

    let env = aggregate::build(observed, &simulated, cfg)?;
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        mad_p_value = env.mad_p_value,
        "envelope simulation done"
    );
    Ok(env)
}

/// Runs `simulate(0..n_simulations)` on `pool` in batches of `cfg.batch_size`.
/// `abort` is read before each batch; `after_batch` sees the completed count.
fn run_batches(
    pool: &rayon::ThreadPool,
    cfg: &EnvelopeCfg,
    abort: &AtomicBool,
    simulate: impl Fn(usize) -> Result<Vec<f64>> + Sync,
    mut after_batch: impl FnMut(usize),
) -> Result<Vec<Vec<f64>>> {
    let mut simulated: Vec<Vec<f64>> = Vec::with_capacity(cfg.n_simulations);
    let mut start = 0usize;
    while start < cfg.n_simulations {
        if abort.load(Ordering::Relaxed) {
            tracing::warn!(completed = start, "envelope simulation aborted");
            return Err(Error::Aborted { completed: start });
        }
        let end = (start + cfg.batch_size).min(cfg.n_simulations);
        let batch: Vec<Vec<f64>> = pool.install(|| {
            (start..end)
                .into_par_iter()
                .map(&simulate)
                .collect::<Result<Vec<_>>>()
        })?;
        simulated.extend(batch);
        tracing::debug!(completed = end, total = cfg.n_simulations, "envelope batch done");
        after_batch(end);
        start = end;
    }
    Ok(simulated)
}

#[cfg(test)]
mod tests;
