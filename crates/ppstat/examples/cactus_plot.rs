//! End-to-end run on a synthetic cactus plot.
//!
//! Builds a clustered pattern (parents uniform, offspring in small discs) in a
//! 40 × 25 m plot, estimates K/L/g/G/F, runs a 99-simulation CSR envelope for L
//! and G, and a mark correlation on a size mark. The curves are printed as
//! JSON for an external plotting step.
//!
//! Run: `cargo run -p ppstat --example cactus_plot`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing_subscriber::fmt::SubscriberBuilder;

use ppstat::prelude::*;

fn synthetic_plot(window: Window, seed: u64) -> Result<MarkedPattern> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::new();
    let mut marks = Vec::new();
    for _ in 0..12 {
        let parent = Vec2::new(
            rng.gen_range(window.xmin()..window.xmax()),
            rng.gen_range(window.ymin()..window.ymax()),
        );
        let size = rng.gen_range(0.5..2.0);
        for _ in 0..rng.gen_range(4..12) {
            let (rho, theta): (f64, f64) = (
                1.5 * rng.gen::<f64>().sqrt(),
                rng.gen_range(0.0..std::f64::consts::TAU),
            );
            let p = parent + Vec2::new(rho * theta.cos(), rho * theta.sin());
            if window.contains_eps(p, 0.0) {
                points.push(p);
                marks.push(size + 0.2 * rng.gen::<f64>());
            }
        }
    }
    MarkedPattern::new(Pattern::new(points, window)?, marks)
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();

    let window = Window::new(0.0, 40.0, 0.0, 25.0)?;
    let marked = synthetic_plot(window, 2024)?;
    let pattern = marked.pattern();
    let est_cfg = EstimatorCfg::default();
    let grid = RadiusGrid::default_for(&window, &est_cfg)?;
    let lambda = pattern.intensity()?;
    tracing::info!(n = pattern.len(), lambda, "synthetic plot ready");

    let mut curves = Vec::new();
    for (estimator, correction) in [
        (Estimator::K, Correction::Isotropic),
        (Estimator::L, Correction::Isotropic),
        (Estimator::Pcf, Correction::Translation),
        (Estimator::G, Correction::Border),
        (Estimator::F, Correction::Border),
    ] {
        let observed = estimate(pattern, estimator, correction, &grid, &est_cfg)?;
        let theory = csr_theory(estimator, lambda, &grid)?;
        curves.push(json!({ "observed": observed, "theory": theory }));
    }

    let env_cfg = EnvelopeCfg {
        seed: 7,
        ..EnvelopeCfg::default()
    };
    let mut envelopes = Vec::new();
    for estimator in [Estimator::L, Estimator::G] {
        let env = envelope(pattern, estimator, Correction::Best, &grid, &est_cfg, &env_cfg)?;
        tracing::info!(
            estimator = estimator.name(),
            exceedances = env.exceedances().len(),
            mad_p_value = env.mad_p_value,
            "envelope"
        );
        envelopes.push(json!({ "envelope": env, "exceedances": env.exceedances() }));
    }

    let kmm = mark_correlation(&marked, &grid, Correction::Isotropic, &est_cfg)?;

    let out = json!({
        "n": pattern.len(),
        "intensity": lambda,
        "curves": curves,
        "envelopes": envelopes,
        "mark_correlation": kmm,
    });
    println!("{out}");
    Ok(())
}
