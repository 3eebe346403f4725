//! Estimator library: K, L, g, G, F and the mark correlation function.
//!
//! Purpose
//! - Turn a `Pattern` and a `RadiusGrid` into an immutable `Curve`, with the
//!   edge correction picked from a tagged `Correction` at call time.
//! - Keep every default explicit in `EstimatorCfg` (grid, bandwidth, F query
//!   locations, `Best` threshold, near-zero guard).
//!
//! Numerics
//! - K(0) = 0 for every correction; coincident points never count.
//! - g and k_mm drop r <= 0 from their grid.
//! - Near-zero edge-correction denominators and empty border normalisers fail
//!   with `UndefinedEstimatorValue` instead of producing NaN or infinity.

mod cdf;
pub mod edge;
mod kfunc;
mod mark;
mod pcf;
mod theory;
mod types;

pub use cdf::{f_function, g_function};
pub use kfunc::{k_function, l_function};
pub use mark::mark_correlation;
pub use pcf::pair_correlation;
pub use theory::csr_theory;
pub use types::{
    Bandwidth, Correction, Curve, Estimator, EstimatorCfg, QueryLocations, RadiusGrid,
};

use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// Evaluate `estimator` on `pattern` with `correction`.
///
/// Mark correlation needs marks and is only reachable through
/// [`mark_correlation`].
pub fn estimate(
    pattern: &Pattern,
    estimator: Estimator,
    correction: Correction,
    grid: &RadiusGrid,
    cfg: &EstimatorCfg,
) -> Result<Curve> {
    match estimator {
        Estimator::K => k_function(pattern, grid, correction, cfg),
        Estimator::L => l_function(pattern, grid, correction, cfg),
        Estimator::Pcf => pair_correlation(pattern, grid, correction, cfg),
        Estimator::G => g_function(pattern, grid, correction, cfg),
        Estimator::F => f_function(pattern, grid, correction, cfg),
        Estimator::MarkCorrelation => Err(Error::InvalidMarks {
            reason: "mark correlation needs a marked pattern".into(),
        }),
    }
}
