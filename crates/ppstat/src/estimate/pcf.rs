//! Pair correlation function g.
//!
//! g(r) = |W| / (2πr n(n − 1)) Σ_i Σ_{j≠i} κ_h(r − d_ij) e_ij with an
//! Epanechnikov kernel of half-width h. Undefined at r = 0, so the curve is
//! reported on the positive part of the grid only.

use std::f64::consts::TAU;

use super::edge::pair_weight;
use super::types::{Correction, Curve, Estimator, EstimatorCfg, RadiusGrid};
use crate::distance::{close_pairs, ClosePair};
use crate::error::{Error, Result};
use crate::pattern::Pattern;

pub fn pair_correlation(
    pattern: &Pattern,
    grid: &RadiusGrid,
    correction: Correction,
    cfg: &EstimatorCfg,
) -> Result<Curve> {
    let n = pattern.len();
    if n < 2 {
        return Err(Error::undefined(format!("g needs at least 2 points, got {n}")));
    }
    let resolved = correction.resolve(Estimator::Pcf, n, cfg)?;
    let grid = grid.positive(Estimator::Pcf)?;
    let h = cfg.bandwidth.resolve(pattern)?;
    tracing::debug!(
        n,
        radii = grid.len(),
        correction = resolved.name(),
        bandwidth = h,
        "g estimate"
    );
    let pairs = close_pairs(pattern, grid.max() + h);
    let weights = pair_weights(pattern, &pairs, resolved, cfg.eps)?;
    let smoothed = kernel_smooth(grid.as_slice(), &pairs, h, |k| weights[k]);

    let nf = n as f64;
    let area = pattern.window().area();
    let values = grid
        .as_slice()
        .iter()
        .zip(smoothed)
        .map(|(&r, s)| area * s / (TAU * r * nf * (nf - 1.0)))
        .collect();
    Ok(Curve::new(
        Estimator::Pcf,
        Some(resolved),
        grid.as_slice().to_vec(),
        values,
    ))
}

pub(crate) fn pair_weights(
    pattern: &Pattern,
    pairs: &[ClosePair],
    correction: Correction,
    eps: f64,
) -> Result<Vec<f64>> {
    pairs
        .iter()
        .map(|p| pair_weight(pattern.window(), pattern.points(), p, correction, eps))
        .collect()
}

/// Epanechnikov kernel with half-width `h`.
#[inline]
pub(crate) fn epanechnikov(u: f64, h: f64) -> f64 {
    let t = u / h;
    if t.abs() >= 1.0 {
        0.0
    } else {
        0.75 * (1.0 - t * t) / h
    }
}

/// `out[k] = Σ_pairs weight(pair) · κ_h(rs[k] − d)`.
pub(crate) fn kernel_smooth(
    rs: &[f64],
    pairs: &[ClosePair],
    h: f64,
    weight: impl Fn(usize) -> f64,
) -> Vec<f64> {
    let mut out = vec![0.0; rs.len()];
    for (idx, p) in pairs.iter().enumerate() {
        let lo = rs.partition_point(|r| *r <= p.d - h);
        let hi = rs.partition_point(|r| *r < p.d + h);
        if lo >= hi {
            continue;
        }
        let w = weight(idx);
        for k in lo..hi {
            out[k] += w * epanechnikov(rs[k] - p.d, h);
        }
    }
    out
}
