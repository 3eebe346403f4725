//! Edge-correction weights for rectangular windows.
//!
//! - Isotropic (Ripley): 1 / fraction of the circle `C(x_i, d_ij)` inside W.
//! - Translation: |W| / |W ∩ (W + x_j − x_i)|.
//!
//! Both fail with `UndefinedEstimatorValue` when the denominator falls below
//! `eps` (relative to the full circle or the window area).

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use nalgebra::Vector2;

use super::types::Correction;
use crate::distance::ClosePair;
use crate::error::{Error, Result};
use crate::pattern::Window;

/// Fraction of the circumference of the circle centred at `c` with radius `r`
/// that lies inside `window`. `c` must be inside the window.
pub fn circle_fraction_inside(window: &Window, c: Vector2<f64>, r: f64) -> f64 {
    if r <= 0.0 {
        return 1.0;
    }
    // Outward normal angles of the left, right, bottom and top edges.
    const NORMALS: [f64; 4] = [PI, 0.0, 3.0 * FRAC_PI_2, FRAC_PI_2];
    let dists = window.edge_distances(c);
    let mut arcs: Vec<(f64, f64)> = Vec::with_capacity(8);
    for (phi, d) in NORMALS.iter().zip(dists) {
        let d = d.max(0.0);
        if d >= r {
            continue;
        }
        let half = (d / r).acos();
        let start = (phi - half).rem_euclid(TAU);
        let end = start + 2.0 * half;
        if end > TAU {
            arcs.push((start, TAU));
            arcs.push((0.0, end - TAU));
        } else {
            arcs.push((start, end));
        }
    }
    if arcs.is_empty() {
        return 1.0;
    }
    arcs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut outside = 0.0;
    let (mut lo, mut hi) = arcs[0];
    for &(s, e) in &arcs[1..] {
        if s > hi {
            outside += hi - lo;
            lo = s;
            hi = e;
        } else if e > hi {
            hi = e;
        }
    }
    outside += hi - lo;
    (1.0 - outside / TAU).clamp(0.0, 1.0)
}

/// Ripley's isotropic weight for a pair at distance `r` seen from `c`.
pub fn isotropic_weight(window: &Window, c: Vector2<f64>, r: f64, eps: f64) -> Result<f64> {
    let frac = circle_fraction_inside(window, c, r);
    if frac <= eps {
        return Err(Error::undefined(format!(
            "isotropic weight at ({}, {}) r = {r}: circle fraction {frac} inside the window",
            c.x, c.y
        )));
    }
    Ok(1.0 / frac)
}

/// Translation weight for displacement `delta`.
pub fn translation_weight(window: &Window, delta: Vector2<f64>, eps: f64) -> Result<f64> {
    let ow = window.width() - delta.x.abs();
    let oh = window.height() - delta.y.abs();
    let area = window.area();
    if ow <= 0.0 || oh <= 0.0 || ow * oh <= eps * area {
        return Err(Error::undefined(format!(
            "translation weight for displacement ({}, {}): window overlap vanishes",
            delta.x, delta.y
        )));
    }
    Ok(area / (ow * oh))
}

/// Sum of the two ordered weights `e_ij + e_ji` for `pair`.
///
/// Only `None`, `Isotropic` and `Translation` are pair weights; border
/// corrections are applied by the estimators themselves.
pub(crate) fn pair_weight(
    window: &Window,
    points: &[Vector2<f64>],
    pair: &ClosePair,
    correction: Correction,
    eps: f64,
) -> Result<f64> {
    match correction {
        Correction::None | Correction::Border => Ok(2.0),
        Correction::Isotropic => Ok(isotropic_weight(window, points[pair.i], pair.d, eps)?
            + isotropic_weight(window, points[pair.j], pair.d, eps)?),
        Correction::Translation => Ok(2.0 * translation_weight(window, pair.delta, eps)?),
        Correction::Best => Err(Error::undefined("unresolved best correction")),
    }
}
