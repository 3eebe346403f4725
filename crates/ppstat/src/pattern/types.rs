//! Window, point pattern and marked pattern.
//!
//! - `Window`: axis-aligned rectangle with strictly positive extent.
//! - `Pattern`: immutable points inside a window; intensity λ = n / area.
//! - `MarkedPattern`: a pattern with one scalar mark per point.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Construction tolerances.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternCfg {
    /// Absolute slack on each window bound. Points within it are accepted and
    /// clamped onto the boundary.
    pub tolerance: f64,
}

impl Default for PatternCfg {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

/// Axis-aligned observation window `[xmin, xmax] × [ymin, ymax]`.
///
/// Deserialisation goes through [`Window::new`], so loaded windows are
/// validated like constructed ones.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct Window {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
}

impl Window {
    /// Fails with `DegenerateWindow` on zero, negative or non-finite extent.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err(Error::degenerate("window bounds must be finite"));
        }
        if xmax <= xmin || ymax <= ymin {
            return Err(Error::degenerate(format!(
                "window [{xmin}, {xmax}] x [{ymin}, {ymax}] has non-positive extent"
            )));
        }
        let w = Self {
            xmin,
            xmax,
            ymin,
            ymax,
        };
        if !(w.width().is_finite() && w.height().is_finite() && w.area().is_finite()) {
            return Err(Error::degenerate(format!(
                "window [{xmin}, {xmax}] x [{ymin}, {ymax}] has non-finite extent"
            )));
        }
        Ok(w)
    }

    #[inline]
    pub fn xmin(&self) -> f64 {
        self.xmin
    }
    #[inline]
    pub fn xmax(&self) -> f64 {
        self.xmax
    }
    #[inline]
    pub fn ymin(&self) -> f64 {
        self.ymin
    }
    #[inline]
    pub fn ymax(&self) -> f64 {
        self.ymax
    }
    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }
    #[inline]
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
    #[inline]
    pub fn shorter_side(&self) -> f64 {
        self.width().min(self.height())
    }

    #[inline]
    pub fn contains_eps(&self, p: Vector2<f64>, eps: f64) -> bool {
        p.x >= self.xmin - eps
            && p.x <= self.xmax + eps
            && p.y >= self.ymin - eps
            && p.y <= self.ymax + eps
    }

    /// Distance from `p` to the nearest window edge (0 on or outside the boundary).
    #[inline]
    pub fn boundary_distance(&self, p: Vector2<f64>) -> f64 {
        let d = (p.x - self.xmin)
            .min(self.xmax - p.x)
            .min(p.y - self.ymin)
            .min(self.ymax - p.y);
        d.max(0.0)
    }

    /// Distances to the (left, right, bottom, top) edges.
    #[inline]
    pub(crate) fn edge_distances(&self, p: Vector2<f64>) -> [f64; 4] {
        [
            p.x - self.xmin,
            self.xmax - p.x,
            p.y - self.ymin,
            self.ymax - p.y,
        ]
    }

    #[inline]
    fn clamp(&self, p: Vector2<f64>) -> Vector2<f64> {
        Vector2::new(
            p.x.clamp(self.xmin, self.xmax),
            p.y.clamp(self.ymin, self.ymax),
        )
    }
}

#[derive(Deserialize)]
struct WindowBounds {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
}

impl TryFrom<WindowBounds> for Window {
    type Error = Error;

    fn try_from(b: WindowBounds) -> Result<Self> {
        Window::new(b.xmin, b.xmax, b.ymin, b.ymax)
    }
}

/// Immutable point pattern in a rectangular window.
///
/// Invariant: every point lies inside `window` (boundary inclusive).
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    points: Vec<Vector2<f64>>,
    window: Window,
}

impl Pattern {
    /// `create(points, window)` with default tolerances.
    pub fn new(points: Vec<Vector2<f64>>, window: Window) -> Result<Self> {
        Self::with_cfg(points, window, PatternCfg::default())
    }

    pub fn with_cfg(points: Vec<Vector2<f64>>, window: Window, cfg: PatternCfg) -> Result<Self> {
        let tol = cfg.tolerance.max(0.0);
        let mut checked = Vec::with_capacity(points.len());
        for (i, p) in points.into_iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(Error::geometry(format!("point {i} is not finite")));
            }
            if !window.contains_eps(p, tol) {
                return Err(Error::geometry(format!(
                    "point {i} at ({}, {}) lies outside the window",
                    p.x, p.y
                )));
            }
            checked.push(window.clamp(p));
        }
        Ok(Self {
            points: checked,
            window,
        })
    }

    /// Build from separate coordinate columns (East / North).
    pub fn from_columns(east: &[f64], north: &[f64], window: Window) -> Result<Self> {
        if east.len() != north.len() {
            return Err(Error::geometry(format!(
                "coordinate columns differ in length ({} vs {})",
                east.len(),
                north.len()
            )));
        }
        let pts = east
            .iter()
            .zip(north)
            .map(|(&x, &y)| Vector2::new(x, y))
            .collect();
        Self::new(pts, window)
    }

    /// Caller guarantees every point lies in `window`.
    pub(crate) fn from_parts_unchecked(points: Vec<Vector2<f64>>, window: Window) -> Self {
        debug_assert!(points.iter().all(|p| window.contains_eps(*p, 0.0)));
        Self { points, window }
    }

    #[inline]
    pub fn points(&self) -> &[Vector2<f64>] {
        &self.points
    }
    #[inline]
    pub fn window(&self) -> &Window {
        &self.window
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// λ = n / area.
    pub fn intensity(&self) -> Result<f64> {
        let area = self.window.area();
        if !(area > 0.0) {
            return Err(Error::degenerate(format!("window area {area} is not positive")));
        }
        Ok(self.points.len() as f64 / area)
    }
}

/// Point pattern with one finite scalar mark per point.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkedPattern {
    pattern: Pattern,
    marks: Vec<f64>,
}

impl MarkedPattern {
    pub fn new(pattern: Pattern, marks: Vec<f64>) -> Result<Self> {
        if marks.len() != pattern.len() {
            return Err(Error::InvalidMarks {
                reason: format!("{} marks for {} points", marks.len(), pattern.len()),
            });
        }
        if let Some(i) = marks.iter().position(|m| !m.is_finite()) {
            return Err(Error::InvalidMarks {
                reason: format!("mark {i} is not finite"),
            });
        }
        Ok(Self { pattern, marks })
    }

    #[inline]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
    #[inline]
    pub fn marks(&self) -> &[f64] {
        &self.marks
    }

    /// Arithmetic mean of the marks; `UndefinedEstimatorValue` when empty.
    pub fn mean_mark(&self) -> Result<f64> {
        if self.marks.is_empty() {
            return Err(Error::undefined("mean mark of an empty pattern"));
        }
        Ok(self.marks.iter().sum::<f64>() / self.marks.len() as f64)
    }
}
