//! Ripley's K and the L transform.
//!
//! K(r) = (1/λ) · mean_i Σ_{j≠i} 1{d_ij ≤ r} e_ij with λ = (n − 1)/|W|, the
//! intensity of the other points seen from each point. Border correction
//! averages only over points at least r from the boundary.

use std::f64::consts::PI;

use super::edge::pair_weight;
use super::types::{Correction, Curve, Estimator, EstimatorCfg, RadiusGrid};
use crate::distance::{close_pairs, ClosePair};
use crate::error::{Error, Result};
use crate::pattern::Pattern;

pub fn k_function(
    pattern: &Pattern,
    grid: &RadiusGrid,
    correction: Correction,
    cfg: &EstimatorCfg,
) -> Result<Curve> {
    let n = pattern.len();
    if n < 2 {
        return Err(Error::undefined(format!("K needs at least 2 points, got {n}")));
    }
    let resolved = correction.resolve(Estimator::K, n, cfg)?;
    tracing::debug!(
        n,
        radii = grid.len(),
        correction = resolved.name(),
        "K estimate"
    );
    let pairs = close_pairs(pattern, grid.max());
    let values = match resolved {
        Correction::Border => border_k(pattern, grid, &pairs)?,
        c => weighted_k(pattern, grid, &pairs, c, cfg.eps)?,
    };
    Ok(Curve::new(
        Estimator::K,
        Some(resolved),
        grid.as_slice().to_vec(),
        values,
    ))
}

/// L(r) = sqrt(K(r) / π) with K's correction.
pub fn l_function(
    pattern: &Pattern,
    grid: &RadiusGrid,
    correction: Correction,
    cfg: &EstimatorCfg,
) -> Result<Curve> {
    let resolved = correction.resolve(Estimator::L, pattern.len(), cfg)?;
    let k = k_function(pattern, grid, resolved, cfg)?;
    Ok(k.map(Estimator::L, |_, v| k_to_l(v)))
}

#[inline]
pub(crate) fn k_to_l(k: f64) -> f64 {
    (k / PI).sqrt()
}

fn weighted_k(
    pattern: &Pattern,
    grid: &RadiusGrid,
    pairs: &[ClosePair],
    correction: Correction,
    eps: f64,
) -> Result<Vec<f64>> {
    let window = pattern.window();
    let n = pattern.len() as f64;
    let mut contrib: Vec<(f64, f64)> = pairs
        .iter()
        .map(|p| pair_weight(window, pattern.points(), p, correction, eps).map(|w| (p.d, w)))
        .collect::<Result<_>>()?;
    contrib.sort_by(|a, b| a.0.total_cmp(&b.0));

    let scale = window.area() / (n * (n - 1.0));
    let mut acc = 0.0;
    let mut next = 0usize;
    Ok(grid
        .as_slice()
        .iter()
        .map(|&r| {
            while next < contrib.len() && contrib[next].0 <= r {
                acc += contrib[next].1;
                next += 1;
            }
            scale * acc
        })
        .collect())
}

fn border_k(pattern: &Pattern, grid: &RadiusGrid, pairs: &[ClosePair]) -> Result<Vec<f64>> {
    let rs = grid.as_slice();
    let window = pattern.window();
    let n = pattern.len();
    let lambda_other = (n - 1) as f64 / window.area();
    let b: Vec<f64> = pattern
        .points()
        .iter()
        .map(|p| window.boundary_distance(*p))
        .collect();

    // Difference arrays over grid indices.
    let mut eligible = vec![0i64; rs.len() + 1];
    let mut counts = vec![0i64; rs.len() + 1];
    for &bi in &b {
        let end = rs.partition_point(|r| *r <= bi);
        eligible[0] += 1;
        eligible[end] -= 1;
    }
    for p in pairs {
        let lo = rs.partition_point(|r| *r < p.d);
        for centre in [p.i, p.j] {
            let end = rs.partition_point(|r| *r <= b[centre]);
            if lo < end {
                counts[lo] += 1;
                counts[end] -= 1;
            }
        }
    }

    let mut out = Vec::with_capacity(rs.len());
    let (mut m, mut c) = (0i64, 0i64);
    for (k, &r) in rs.iter().enumerate() {
        m += eligible[k];
        c += counts[k];
        if m == 0 {
            return Err(Error::undefined(format!(
                "border-corrected K at r = {r}: no point lies at least r from the boundary"
            )));
        }
        out.push(c as f64 / m as f64 / lambda_other);
    }
    Ok(out)
}
