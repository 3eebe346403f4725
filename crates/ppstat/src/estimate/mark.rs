//! Stoyan's mark correlation function for marked patterns.
//!
//! k_mm(r) = [Σ κ_h(r − d_ij) m_i m_j e_ij / Σ κ_h(r − d_ij) e_ij] / m̄².
//! Values above 1 mean pairs at distance r carry larger marks than an
//! average pair (e.g. neighbouring cacti are both tall).

use super::pcf::{kernel_smooth, pair_weights};
use super::types::{Correction, Curve, Estimator, EstimatorCfg, RadiusGrid};
use crate::distance::close_pairs;
use crate::error::{Error, Result};
use crate::pattern::MarkedPattern;

pub fn mark_correlation(
    marked: &MarkedPattern,
    grid: &RadiusGrid,
    correction: Correction,
    cfg: &EstimatorCfg,
) -> Result<Curve> {
    let pattern = marked.pattern();
    let n = pattern.len();
    if n < 2 {
        return Err(Error::undefined(format!(
            "mark correlation needs at least 2 points, got {n}"
        )));
    }
    let resolved = correction.resolve(Estimator::MarkCorrelation, n, cfg)?;
    let grid = grid.positive(Estimator::MarkCorrelation)?;
    let mbar = marked.mean_mark()?;
    if mbar.abs() <= cfg.eps {
        return Err(Error::undefined("mark correlation with zero mean mark"));
    }
    let h = cfg.bandwidth.resolve(pattern)?;
    tracing::debug!(
        n,
        radii = grid.len(),
        correction = resolved.name(),
        bandwidth = h,
        "mark correlation estimate"
    );

    let pairs = close_pairs(pattern, grid.max() + h);
    let weights = pair_weights(pattern, &pairs, resolved, cfg.eps)?;
    let marks = marked.marks();
    let products: Vec<f64> = pairs.iter().map(|p| marks[p.i] * marks[p.j]).collect();
    let num = kernel_smooth(grid.as_slice(), &pairs, h, |k| weights[k] * products[k]);
    let den = kernel_smooth(grid.as_slice(), &pairs, h, |k| weights[k]);

    let values = grid
        .as_slice()
        .iter()
        .zip(num.iter().zip(&den))
        .map(|(&r, (&a, &b))| {
            if b > 0.0 {
                Ok(a / b / (mbar * mbar))
            } else {
                Err(Error::undefined(format!(
                    "mark correlation at r = {r}: no pair within the kernel bandwidth {h}"
                )))
            }
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(Curve::new(
        Estimator::MarkCorrelation,
        Some(resolved),
        grid.as_slice().to_vec(),
        values,
    ))
}
