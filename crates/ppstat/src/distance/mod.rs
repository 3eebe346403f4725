//! Distance & pairwise geometry engine.
//!
//! Purpose
//! - Pairwise distance matrix, nearest-neighbour distances, and the distance
//!   from an arbitrary location to a pattern.
//! - `close_pairs` feeds the K, g and mark-correlation estimators with every
//!   pair inside the largest radius of interest.
//!
//! The bucket grid in `grid.rs` only prunes candidates; results are identical
//! to the O(n²) scans.

mod grid;

use nalgebra::{DMatrix, Vector2};

use crate::error::{Error, Result};
use crate::pattern::Pattern;

pub(crate) use grid::GridIndex;

/// Unordered pair `i < j` with displacement `p_j - p_i` and its length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClosePair {
    pub i: usize,
    pub j: usize,
    pub delta: Vector2<f64>,
    pub d: f64,
}

/// Full symmetric distance matrix with zero diagonal. O(n²) time and space.
pub fn pairwise_distances(pattern: &Pattern) -> DMatrix<f64> {
    let pts = pattern.points();
    let n = pts.len();
    let mut m = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (pts[j] - pts[i]).norm();
            m[(i, j)] = d;
            m[(j, i)] = d;
        }
    }
    m
}

/// Per-point distance to the closest other point.
///
/// Fails with `UndefinedEstimatorValue` for fewer than two points.
pub fn nearest_neighbor_distances(pattern: &Pattern) -> Result<Vec<f64>> {
    if pattern.len() < 2 {
        return Err(Error::undefined(format!(
            "nearest-neighbour distances need at least 2 points, got {}",
            pattern.len()
        )));
    }
    let grid = GridIndex::build(pattern.points(), *pattern.window());
    pattern
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            grid.nearest(*p, Some(i))
                .ok_or_else(|| Error::undefined("point without neighbour"))
        })
        .collect()
}

/// Distance from `location` (not necessarily in the pattern) to the closest point.
///
/// Fails with `UndefinedEstimatorValue` for an empty pattern.
pub fn nearest_point_distance(location: Vector2<f64>, pattern: &Pattern) -> Result<f64> {
    if pattern.is_empty() {
        return Err(Error::undefined("nearest point of an empty pattern"));
    }
    if pattern.window().contains_eps(location, 0.0) {
        let grid = GridIndex::build(pattern.points(), *pattern.window());
        if let Some(d) = grid.nearest(location, None) {
            return Ok(d);
        }
    }
    Ok(brute_nearest(location, pattern.points()))
}

/// Same as `nearest_point_distance` for many locations inside the window,
/// sharing one index.
pub(crate) fn nearest_point_distances(
    locations: &[Vector2<f64>],
    pattern: &Pattern,
) -> Result<Vec<f64>> {
    if pattern.is_empty() {
        return Err(Error::undefined("nearest point of an empty pattern"));
    }
    let grid = GridIndex::build(pattern.points(), *pattern.window());
    Ok(locations
        .iter()
        .map(|q| {
            if pattern.window().contains_eps(*q, 0.0) {
                grid.nearest(*q, None)
                    .unwrap_or_else(|| brute_nearest(*q, pattern.points()))
            } else {
                brute_nearest(*q, pattern.points())
            }
        })
        .collect())
}

/// Every unordered pair with `0 < d <= rmax`, ordered by `(i, j)`.
///
/// Coincident points (d = 0) are dropped: they never count at any radius.
pub fn close_pairs(pattern: &Pattern, rmax: f64) -> Vec<ClosePair> {
    let pts = pattern.points();
    if pts.len() < 2 || !(rmax > 0.0) {
        return Vec::new();
    }
    let grid = GridIndex::build(pts, *pattern.window());
    let reach = if rmax.is_finite() {
        (rmax / grid.cell_size()).floor() as usize + 1
    } else {
        usize::MAX
    };
    let mut out = Vec::new();
    grid.for_each_candidate_pair(reach, |i, j| {
        let delta = pts[j] - pts[i];
        let d = delta.norm();
        if d > 0.0 && d <= rmax {
            out.push(ClosePair { i, j, delta, d });
        }
    });
    out.sort_by(|a, b| (a.i, a.j).cmp(&(b.i, b.j)));
    out
}

fn brute_nearest(q: Vector2<f64>, pts: &[Vector2<f64>]) -> f64 {
    pts.iter()
        .map(|p| (p - q).norm())
        .fold(f64::INFINITY, f64::min)
}
