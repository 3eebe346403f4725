//! CSR (binomial) simulation inside a window, with replay tokens.
//!
//! Model
//! - `count` independent points, each uniform on the window.
//! - Determinism uses a replay token `(seed, index)` that keys its own RNG,
//!   so simulation `k` of an envelope is reproducible on its own.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{Pattern, Window};

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    /// Domain tag filling the upper half of the key.
    const DOMAIN: [u8; 16] = *b"ppstat/csr/v1\0\0\0";

    /// Independent stream per `(seed, index)`: both words plus a domain tag
    /// form the 256-bit ChaCha key of `StdRng`.
    pub fn to_std_rng(self) -> StdRng {
        let mut key = [0u8; 32];
        key[..8].copy_from_slice(&self.seed.to_le_bytes());
        key[8..16].copy_from_slice(&self.index.to_le_bytes());
        key[16..].copy_from_slice(&Self::DOMAIN);
        StdRng::from_seed(key)
    }
}

/// Draw `count` independent uniform points in `window`.
pub fn simulate_csr<R: Rng + ?Sized>(window: &Window, count: usize, rng: &mut R) -> Pattern {
    let pts: Vec<Vector2<f64>> = (0..count)
        .map(|_| {
            Vector2::new(
                rng.gen_range(window.xmin()..window.xmax()),
                rng.gen_range(window.ymin()..window.ymax()),
            )
        })
        .collect();
    Pattern::from_parts_unchecked(pts, *window)
}

/// `simulate_csr` driven by a replay token.
pub fn simulate_csr_replay(window: &Window, count: usize, tok: ReplayToken) -> Pattern {
    let mut rng = tok.to_std_rng();
    simulate_csr(window, count, &mut rng)
}
