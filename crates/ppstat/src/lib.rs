//! Second-order and distance-based summary statistics for planar point
//! patterns in a rectangular window.
//!
//! Layout
//! - `pattern`: validated windows and point sets, CSR simulation.
//! - `distance`: pairwise, nearest-neighbour and empty-space distances.
//! - `estimate`: K, L, g, G, F and mark correlation with edge corrections.
//! - `envelope`: Monte Carlo envelopes under CSR on a worker pool.
//!
//! Every operation is a pure function of its inputs plus an explicit seed;
//! curves are immutable once returned. Logging goes through `tracing`, the
//! caller installs a subscriber.

pub mod distance;
pub mod envelope;
pub mod error;
pub mod estimate;
pub mod pattern;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use envelope::{envelope, envelope_with_abort, Envelope, EnvelopeCfg};
pub use error::{Error, Result};
pub use estimate::{
    estimate, mark_correlation, Correction, Curve, Estimator, EstimatorCfg, RadiusGrid,
};
pub use nalgebra::Vector2 as Vec2;
pub use pattern::{MarkedPattern, Pattern, PatternCfg, Window};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::distance::{
        close_pairs, nearest_neighbor_distances, nearest_point_distance, pairwise_distances,
    };
    pub use crate::envelope::{
        envelope, envelope_with_abort, Envelope, EnvelopeCfg, Exceedance, Side,
    };
    pub use crate::error::{Error, Result};
    pub use crate::estimate::{
        csr_theory, estimate, f_function, g_function, k_function, l_function, mark_correlation,
        pair_correlation, Bandwidth, Correction, Curve, Estimator, EstimatorCfg, QueryLocations,
        RadiusGrid,
    };
    pub use crate::pattern::{
        simulate_csr, simulate_csr_replay, MarkedPattern, Pattern, PatternCfg, ReplayToken, Window,
    };
    pub use nalgebra::Vector2 as Vec2;
}
