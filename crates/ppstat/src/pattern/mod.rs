//! Point Pattern Store.
//!
//! Purpose
//! - Hold point coordinates together with their rectangular observation
//!   window and derived intensity.
//! - Provide the CSR sampler the envelope simulator draws synthetic patterns from.
//!
//! Invariants
//! - Windows have strictly positive, finite extent.
//! - Every stored point lies inside its window; points within the configured
//!   tolerance outside are clamped onto the boundary.

pub mod rand;
mod types;

pub use self::rand::{simulate_csr, simulate_csr_replay, ReplayToken};
pub use types::{MarkedPattern, Pattern, PatternCfg, Window};

#[cfg(test)]
mod tests;
