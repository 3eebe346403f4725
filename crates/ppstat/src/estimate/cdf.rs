//! Distance distribution functions G (nearest neighbour) and F (empty space).
//!
//! Both are empirical CDFs of a set of distances `d_k`, each paired with the
//! distance `b_k` from its origin to the window boundary:
//! - none: #{d_k <= r} / N
//! - border (reduced sample): #{d_k <= r <= b_k} / #{b_k >= r}

use super::types::{Correction, Curve, Estimator, EstimatorCfg, RadiusGrid};
use crate::distance::{nearest_neighbor_distances, nearest_point_distances};
use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// Nearest-neighbour distance distribution G.
pub fn g_function(
    pattern: &Pattern,
    grid: &RadiusGrid,
    correction: Correction,
    cfg: &EstimatorCfg,
) -> Result<Curve> {
    let resolved = correction.resolve(Estimator::G, pattern.len(), cfg)?;
    tracing::debug!(
        n = pattern.len(),
        radii = grid.len(),
        correction = resolved.name(),
        "G estimate"
    );
    let nn = nearest_neighbor_distances(pattern)?;
    let window = pattern.window();
    let b: Vec<f64> = pattern
        .points()
        .iter()
        .map(|p| window.boundary_distance(*p))
        .collect();
    let values = ecdf(grid.as_slice(), &nn, &b, resolved, Estimator::G)?;
    Ok(Curve::new(
        Estimator::G,
        Some(resolved),
        grid.as_slice().to_vec(),
        values,
    ))
}

/// Empty-space function F over the configured query locations.
pub fn f_function(
    pattern: &Pattern,
    grid: &RadiusGrid,
    correction: Correction,
    cfg: &EstimatorCfg,
) -> Result<Curve> {
    if pattern.is_empty() {
        return Err(Error::undefined("F of an empty pattern"));
    }
    let resolved = correction.resolve(Estimator::F, pattern.len(), cfg)?;
    let window = pattern.window();
    let queries = cfg.f_queries.locations(window);
    if queries.is_empty() {
        return Err(Error::undefined("F needs at least one query location"));
    }
    tracing::debug!(
        n = pattern.len(),
        queries = queries.len(),
        radii = grid.len(),
        correction = resolved.name(),
        "F estimate"
    );
    let d = nearest_point_distances(&queries, pattern)?;
    let b: Vec<f64> = queries.iter().map(|q| window.boundary_distance(*q)).collect();
    let values = ecdf(grid.as_slice(), &d, &b, resolved, Estimator::F)?;
    Ok(Curve::new(
        Estimator::F,
        Some(resolved),
        grid.as_slice().to_vec(),
        values,
    ))
}

fn ecdf(
    rs: &[f64],
    d: &[f64],
    b: &[f64],
    correction: Correction,
    estimator: Estimator,
) -> Result<Vec<f64>> {
    match correction {
        Correction::None => {
            let mut sorted = d.to_vec();
            sorted.sort_by(|x, y| x.total_cmp(y));
            let total = sorted.len() as f64;
            Ok(rs
                .iter()
                .map(|r| sorted.partition_point(|v| v <= r) as f64 / total)
                .collect())
        }
        Correction::Border => {
            let mut hits = vec![0i64; rs.len() + 1];
            let mut at_risk = vec![0i64; rs.len() + 1];
            for (&dk, &bk) in d.iter().zip(b) {
                let end = rs.partition_point(|r| *r <= bk);
                at_risk[0] += 1;
                at_risk[end] -= 1;
                let lo = rs.partition_point(|r| *r < dk);
                if lo < end {
                    hits[lo] += 1;
                    hits[end] -= 1;
                }
            }
            let mut out = Vec::with_capacity(rs.len());
            let (mut num, mut den) = (0i64, 0i64);
            for (k, &r) in rs.iter().enumerate() {
                num += hits[k];
                den += at_risk[k];
                if den == 0 {
                    return Err(Error::undefined(format!(
                        "reduced-sample {estimator} at r = {r}: no location lies at least r from the boundary"
                    )));
                }
                out.push(num as f64 / den as f64);
            }
            Ok(out)
        }
        other => Err(Error::UnsupportedCorrection {
            estimator: estimator.name(),
            correction: other.name(),
        }),
    }
}
