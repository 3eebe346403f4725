//! Closed-form values under CSR (Poisson) for comparison plots.

use std::f64::consts::PI;

use super::types::{Curve, Estimator, RadiusGrid};
use crate::error::{Error, Result};

/// Theoretical CSR curve for `estimator` at intensity `lambda`.
///
/// K = πr², L = r, g = 1, G = F = 1 − exp(−λπr²), k_mm = 1.
pub fn csr_theory(estimator: Estimator, lambda: f64, grid: &RadiusGrid) -> Result<Curve> {
    if !(lambda.is_finite() && lambda >= 0.0) {
        return Err(Error::config(format!("intensity {lambda} must be finite and >= 0")));
    }
    let grid = grid.for_estimator(estimator)?;
    let values = grid
        .as_slice()
        .iter()
        .map(|&r| match estimator {
            Estimator::K => PI * r * r,
            Estimator::L => r,
            Estimator::Pcf | Estimator::MarkCorrelation => 1.0,
            Estimator::G | Estimator::F => 1.0 - (-lambda * PI * r * r).exp(),
        })
        .collect();
    Ok(Curve::new(estimator, None, grid.as_slice().to_vec(), values))
}
