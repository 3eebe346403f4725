//! Estimator kinds, edge corrections, radius grids, curves and configuration.
//!
//! - `Correction`: tagged edge-correction choice; `resolve` pins `Best` down to
//!   a concrete method and rejects corrections an estimator does not offer.
//! - `RadiusGrid`: validated, strictly increasing radii starting at or above 0.
//! - `Curve`: immutable `(r, value)` sequence tagged with what produced it.
//! - `EstimatorCfg`: every default that used to be implicit (grid, bandwidth,
//!   F query locations, `Best` threshold, near-zero guard).

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distance::nearest_neighbor_distances;
use crate::error::{Error, Result};
use crate::pattern::{Pattern, ReplayToken, Window};

/// Summary function computed over a radius grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Estimator {
    /// Ripley's K.
    K,
    /// Variance-stabilised L = sqrt(K / π).
    L,
    /// Pair correlation g.
    Pcf,
    /// Nearest-neighbour distance distribution G.
    G,
    /// Empty-space function F.
    F,
    /// Stoyan's mark correlation k_mm (marked patterns only).
    MarkCorrelation,
}

impl Estimator {
    pub fn name(self) -> &'static str {
        match self {
            Self::K => "K",
            Self::L => "L",
            Self::Pcf => "g",
            Self::G => "G",
            Self::F => "F",
            Self::MarkCorrelation => "kmm",
        }
    }

    /// Whether r = 0 is excluded from the estimator's grid.
    pub fn needs_positive_radii(self) -> bool {
        matches!(self, Self::Pcf | Self::MarkCorrelation)
    }

    /// Kernel-smoothed estimators read `EstimatorCfg::bandwidth`.
    pub fn uses_bandwidth(self) -> bool {
        matches!(self, Self::Pcf | Self::MarkCorrelation)
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Edge-correction method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correction {
    /// No adjustment; biased low near the boundary.
    None,
    /// Ripley's isotropic correction.
    Isotropic,
    /// Translation correction (window overlap with its translate).
    Translation,
    /// Border / reduced-sample ("rs"): only points at least r from the
    /// boundary contribute at radius r.
    Border,
    /// Resolved per estimator by [`Correction::resolve`].
    Best,
}

impl Correction {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Isotropic => "isotropic",
            Self::Translation => "translation",
            Self::Border => "border",
            Self::Best => "best",
        }
    }

    fn supported_by(self, estimator: Estimator) -> bool {
        match estimator {
            Estimator::K | Estimator::L => !matches!(self, Self::Best),
            Estimator::Pcf | Estimator::MarkCorrelation => {
                matches!(self, Self::None | Self::Isotropic | Self::Translation)
            }
            Estimator::G | Estimator::F => matches!(self, Self::None | Self::Border),
        }
    }

    /// Concrete correction for `estimator` on a pattern of `n_points`.
    ///
    /// `Best` rule:
    /// - K, L: isotropic up to `cfg.best_max_points`, border above.
    /// - g, k_mm: isotropic up to `cfg.best_max_points`, translation above.
    /// - G, F: border (reduced sample).
    pub fn resolve(
        self,
        estimator: Estimator,
        n_points: usize,
        cfg: &EstimatorCfg,
    ) -> Result<Self> {
        let small = n_points <= cfg.best_max_points;
        let resolved = match (self, estimator) {
            (Self::Best, Estimator::K | Estimator::L) if small => Self::Isotropic,
            (Self::Best, Estimator::K | Estimator::L) => {
                tracing::warn!(
                    n_points,
                    limit = cfg.best_max_points,
                    "best correction falls back to border for a large pattern"
                );
                Self::Border
            }
            (Self::Best, Estimator::Pcf | Estimator::MarkCorrelation) if small => Self::Isotropic,
            (Self::Best, Estimator::Pcf | Estimator::MarkCorrelation) => Self::Translation,
            (Self::Best, Estimator::G | Estimator::F) => Self::Border,
            (c, _) => c,
        };
        if !resolved.supported_by(estimator) {
            return Err(Error::UnsupportedCorrection {
                estimator: estimator.name(),
                correction: resolved.name(),
            });
        }
        Ok(resolved)
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Correction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "iso" | "isotropic" | "ripley" => Ok(Self::Isotropic),
            "trans" | "translate" | "translation" => Ok(Self::Translation),
            "rs" | "border" | "bord" => Ok(Self::Border),
            "best" => Ok(Self::Best),
            _ => Err(Error::UnknownCorrection { name: s.to_string() }),
        }
    }
}

/// Strictly increasing, finite, non-negative radii.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RadiusGrid {
    r: Vec<f64>,
}

impl RadiusGrid {
    pub fn new(r: Vec<f64>) -> Result<Self> {
        if r.is_empty() {
            return Err(Error::grid("no radii"));
        }
        if let Some(v) = r.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(Error::grid(format!("radius {v} is negative or not finite")));
        }
        if r.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::grid("radii must be strictly increasing"));
        }
        Ok(Self { r })
    }

    /// `n` equally spaced radii from 0 to `rmax` inclusive.
    pub fn regular(rmax: f64, n: usize) -> Result<Self> {
        if n < 2 {
            return Err(Error::grid("a regular grid needs at least 2 radii"));
        }
        if !(rmax.is_finite() && rmax > 0.0) {
            return Err(Error::grid(format!("rmax {rmax} must be finite and positive")));
        }
        let step = rmax / (n - 1) as f64;
        let mut r: Vec<f64> = (0..n).map(|k| k as f64 * step).collect();
        r[n - 1] = rmax;
        Self::new(r)
    }

    /// `cfg.n_radii` radii from 0 to `cfg.rmax_fraction` × shorter window side.
    pub fn default_for(window: &Window, cfg: &EstimatorCfg) -> Result<Self> {
        Self::regular(cfg.rmax_fraction * window.shorter_side(), cfg.n_radii)
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.r
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.r.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }
    #[inline]
    pub fn max(&self) -> f64 {
        self.r.last().copied().unwrap_or(0.0)
    }

    /// The grid with r <= 0 dropped; `UndefinedEstimatorValue` if nothing is left.
    pub fn positive(&self, estimator: Estimator) -> Result<Self> {
        let r: Vec<f64> = self.r.iter().copied().filter(|v| *v > 0.0).collect();
        if r.is_empty() {
            return Err(Error::undefined(format!(
                "{} is undefined at r = 0 and the grid has no positive radius",
                estimator.name()
            )));
        }
        Ok(Self { r })
    }

    /// Grid the estimator is actually evaluated on.
    pub fn for_estimator(&self, estimator: Estimator) -> Result<Self> {
        if estimator.needs_positive_radii() {
            self.positive(estimator)
        } else {
            Ok(self.clone())
        }
    }
}

/// Ordered `(r, value)` pairs tagged with their estimator and correction.
///
/// `correction` is `None` for closed-form CSR reference curves.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Curve {
    estimator: Estimator,
    correction: Option<Correction>,
    r: Vec<f64>,
    values: Vec<f64>,
}

impl Curve {
    pub(crate) fn new(
        estimator: Estimator,
        correction: Option<Correction>,
        r: Vec<f64>,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(r.len(), values.len());
        Self {
            estimator,
            correction,
            r,
            values,
        }
    }

    #[inline]
    pub fn estimator(&self) -> Estimator {
        self.estimator
    }
    #[inline]
    pub fn correction(&self) -> Option<Correction> {
        self.correction
    }
    #[inline]
    pub fn r(&self) -> &[f64] {
        &self.r
    }
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.r.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.r.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at the grid radius equal to `r`, if present.
    pub fn value_at(&self, r: f64) -> Option<f64> {
        self.r.iter().position(|v| *v == r).map(|k| self.values[k])
    }

    /// Same tags and grid with every value mapped through `f`.
    pub fn map(&self, estimator: Estimator, f: impl Fn(f64, f64) -> f64) -> Curve {
        let values = self.iter().map(|(r, v)| f(r, v)).collect();
        Curve::new(estimator, self.correction, self.r.clone(), values)
    }
}

/// Kernel bandwidth rule for g and k_mm (Epanechnikov half-width h).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bandwidth {
    /// h = c × mean nearest-neighbour distance.
    NearestNeighbour(f64),
    /// Stoyan's rule h = c / sqrt(λ).
    Stoyan(f64),
    /// Fixed h.
    Fixed(f64),
}

impl Bandwidth {
    fn coefficient(self) -> f64 {
        match self {
            Self::NearestNeighbour(c) | Self::Stoyan(c) | Self::Fixed(c) => c,
        }
    }

    /// Kernel half-width for `pattern`.
    pub fn resolve(self, pattern: &Pattern) -> Result<f64> {
        let h = match self {
            Self::NearestNeighbour(c) => {
                let nn = nearest_neighbor_distances(pattern)?;
                c * nn.iter().sum::<f64>() / nn.len() as f64
            }
            Self::Stoyan(c) => {
                let lambda = pattern.intensity()?;
                if !(lambda > 0.0) {
                    return Err(Error::undefined("Stoyan bandwidth of an empty pattern"));
                }
                c / lambda.sqrt()
            }
            Self::Fixed(h) => h,
        };
        if !(h.is_finite() && h > 0.0) {
            return Err(Error::undefined(format!("kernel bandwidth {h} is not positive")));
        }
        Ok(h)
    }
}

/// Query locations for the empty-space function F.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryLocations {
    /// Cell centres of an `nx × ny` lattice over the window.
    Grid { nx: usize, ny: usize },
    /// `count` uniform locations from a fixed seed.
    Random { count: usize, seed: u64 },
}

impl QueryLocations {
    pub fn locations(self, window: &Window) -> Vec<Vector2<f64>> {
        match self {
            Self::Grid { nx, ny } => {
                let dx = window.width() / nx.max(1) as f64;
                let dy = window.height() / ny.max(1) as f64;
                let mut out = Vec::with_capacity(nx * ny);
                for iy in 0..ny {
                    for ix in 0..nx {
                        out.push(Vector2::new(
                            window.xmin() + (ix as f64 + 0.5) * dx,
                            window.ymin() + (iy as f64 + 0.5) * dy,
                        ));
                    }
                }
                out
            }
            Self::Random { count, seed } => {
                let mut rng = ReplayToken { seed, index: 0 }.to_std_rng();
                (0..count)
                    .map(|_| {
                        Vector2::new(
                            rng.gen_range(window.xmin()..window.xmax()),
                            rng.gen_range(window.ymin()..window.ymax()),
                        )
                    })
                    .collect()
            }
        }
    }
}

/// Estimator configuration (defaults documented per field).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorCfg {
    /// Default grid reaches this fraction of the shorter window side. Default 0.25.
    pub rmax_fraction: f64,
    /// Radii in the default grid. Default 129.
    pub n_radii: usize,
    /// Kernel rule for g and k_mm. Default `NearestNeighbour(0.15)`.
    pub bandwidth: Bandwidth,
    /// F query locations. Default 128 × 128 lattice.
    pub f_queries: QueryLocations,
    /// Largest pattern for which `Best` picks isotropic. Default 3000.
    pub best_max_points: usize,
    /// Relative threshold below which edge-correction denominators count as zero.
    /// Default 1e-12.
    pub eps: f64,
}

impl Default for EstimatorCfg {
    fn default() -> Self {
        Self {
            rmax_fraction: 0.25,
            n_radii: 129,
            bandwidth: Bandwidth::NearestNeighbour(0.15),
            f_queries: QueryLocations::Grid { nx: 128, ny: 128 },
            best_max_points: 3000,
            eps: 1e-12,
        }
    }
}

impl EstimatorCfg {
    pub fn validate(&self) -> Result<()> {
        if !(self.rmax_fraction.is_finite() && self.rmax_fraction > 0.0) {
            return Err(Error::config("rmax_fraction must be finite and > 0"));
        }
        if self.n_radii < 2 {
            return Err(Error::config("n_radii must be >= 2"));
        }
        let c = self.bandwidth.coefficient();
        if !(c.is_finite() && c > 0.0) {
            return Err(Error::config("bandwidth coefficient must be finite and > 0"));
        }
        if !(self.eps.is_finite() && self.eps >= 0.0) {
            return Err(Error::config("eps must be finite and >= 0"));
        }
        Ok(())
    }
}
