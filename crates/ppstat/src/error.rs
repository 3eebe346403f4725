//! Error type shared by every module of the crate.
//!
//! All failures are deterministic input or numeric problems; nothing here is
//! transient, so callers should not retry.

use std::fmt;

/// Typed failure reported by pattern construction, estimators and envelopes.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A point lies outside the window (beyond tolerance) or is not finite.
    InvalidGeometry { reason: String },
    /// The window has zero, negative or non-finite extent.
    DegenerateWindow { reason: String },
    /// `rank` exceeds the number of simulations (or is zero).
    InsufficientSimulations { n_simulations: usize, rank: usize },
    /// The estimator has no defined value (g at r = 0, an empty normaliser,
    /// a near-zero edge-correction denominator, ...).
    UndefinedEstimatorValue { reason: String },
    /// The radius grid is empty, unsorted, negative or non-finite.
    InvalidRadiusGrid { reason: String },
    /// Mark vector does not match the pattern.
    InvalidMarks { reason: String },
    /// The estimator does not offer the requested edge correction.
    UnsupportedCorrection {
        estimator: &'static str,
        correction: &'static str,
    },
    /// A correction name that does not parse.
    UnknownCorrection { name: String },
    /// A configuration value is out of range.
    InvalidConfig { reason: String },
    /// The caller raised the abort flag between simulation batches.
    Aborted { completed: usize },
}

impl Error {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateWindow {
            reason: reason.into(),
        }
    }

    pub(crate) fn undefined(reason: impl Into<String>) -> Self {
        Self::UndefinedEstimatorValue {
            reason: reason.into(),
        }
    }

    pub(crate) fn grid(reason: impl Into<String>) -> Self {
        Self::InvalidRadiusGrid {
            reason: reason.into(),
        }
    }

    pub(crate) fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
            Self::DegenerateWindow { reason } => write!(f, "degenerate window: {reason}"),
            Self::InsufficientSimulations {
                n_simulations,
                rank,
            } => write!(
                f,
                "insufficient simulations: rank {rank} needs at least {rank} simulations, got {n_simulations}"
            ),
            Self::UndefinedEstimatorValue { reason } => {
                write!(f, "undefined estimator value: {reason}")
            }
            Self::InvalidRadiusGrid { reason } => write!(f, "invalid radius grid: {reason}"),
            Self::InvalidMarks { reason } => write!(f, "invalid marks: {reason}"),
            Self::UnsupportedCorrection {
                estimator,
                correction,
            } => write!(
                f,
                "estimator {estimator} does not support the {correction} correction"
            ),
            Self::UnknownCorrection { name } => write!(f, "unknown edge correction {name:?}"),
            Self::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
            Self::Aborted { completed } => {
                write!(f, "aborted after {completed} completed simulations")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
