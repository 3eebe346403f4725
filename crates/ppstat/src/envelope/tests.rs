use std::sync::atomic::AtomicBool;

use super::*;
use crate::pattern::Window;
use tracing_subscriber::fmt::SubscriberBuilder;

fn init_tracing() {
    let _ = SubscriberBuilder::default()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

fn square(side: f64) -> Window {
    Window::new(0.0, side, 0.0, side).unwrap()
}

fn csr(window: Window, n: usize, seed: u64) -> Pattern {
    simulate_csr_replay(&window, n, ReplayToken { seed, index: 0 })
}

fn clustered() -> Pattern {
    let cluster = Window::new(4.5, 5.5, 4.5, 5.5).unwrap();
    let inner = csr(cluster, 50, 8);
    Pattern::new(inner.points().to_vec(), square(10.0)).unwrap()
}

#[test]
fn rank_one_pointwise_bounds_are_simulation_extremes() {
    init_tracing();
    let p = csr(square(10.0), 40, 3);
    let est_cfg = EstimatorCfg::default();
    let grid = RadiusGrid::regular(2.0, 9).unwrap();
    let cfg = EnvelopeCfg {
        n_simulations: 19,
        seed: 11,
        ..EnvelopeCfg::default()
    };
    let env = envelope(&p, Estimator::K, Correction::Isotropic, &grid, &est_cfg, &cfg).unwrap();

    let sims: Vec<Curve> = (0..19)
        .map(|index| {
            let sim = simulate_csr_replay(p.window(), 40, ReplayToken { seed: 11, index });
            estimate(&sim, Estimator::K, Correction::Isotropic, &grid, &est_cfg).unwrap()
        })
        .collect();
    for k in 0..grid.len() {
        let lo = sims.iter().map(|c| c.values()[k]).fold(f64::INFINITY, f64::min);
        let hi = sims.iter().map(|c| c.values()[k]).fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(env.lower.values()[k], lo);
        assert_eq!(env.upper.values()[k], hi);
        assert!(env.lower.values()[k] <= env.centre.values()[k]);
        assert!(env.centre.values()[k] <= env.upper.values()[k]);
    }
    assert_eq!(env.n_simulations, 19);
    assert!(!env.global);
}

#[test]
fn same_seed_is_identical_across_thread_counts() {
    let p = csr(square(6.0), 30, 4);
    let est_cfg = EstimatorCfg::default();
    let grid = RadiusGrid::default_for(p.window(), &est_cfg).unwrap();
    let one = EnvelopeCfg {
        n_simulations: 25,
        seed: 99,
        threads: Some(1),
        batch_size: 4,
        ..EnvelopeCfg::default()
    };
    let many = EnvelopeCfg {
        threads: Some(3),
        batch_size: 32,
        ..one
    };
    let a = envelope(&p, Estimator::L, Correction::Translation, &grid, &est_cfg, &one).unwrap();
    let b = envelope(&p, Estimator::L, Correction::Translation, &grid, &est_cfg, &many).unwrap();
    assert_eq!(a, b);

    let other = EnvelopeCfg { seed: 100, ..one };
    let c = envelope(&p, Estimator::L, Correction::Translation, &grid, &est_cfg, &other).unwrap();
    assert_ne!(a.upper, c.upper);
}

#[test]
fn clustered_g_leaves_the_band() {
    init_tracing();
    let p = clustered();
    let grid = RadiusGrid::new(vec![0.0, 0.3, 0.6]).unwrap();
    let env = envelope(
        &p,
        Estimator::G,
        Correction::None,
        &grid,
        &EstimatorCfg::default(),
        &EnvelopeCfg::default(),
    )
    .unwrap();
    let ex = env.exceedances();
    assert!(ex.iter().any(|e| e.r == 0.3 && e.side == Side::Above));
    assert!(ex.iter().all(|e| e.side == Side::Above));
    assert_eq!(env.mad_p_value, 0.01);
}

#[test]
fn global_band_has_constant_width() {
    let p = csr(square(10.0), 50, 5);
    let est_cfg = EstimatorCfg::default();
    let grid = RadiusGrid::default_for(p.window(), &est_cfg).unwrap();
    let cfg = EnvelopeCfg {
        n_simulations: 39,
        rank: 2,
        global: true,
        ..EnvelopeCfg::default()
    };
    let env = envelope(&p, Estimator::L, Correction::Isotropic, &grid, &est_cfg, &cfg).unwrap();
    let widths: Vec<f64> = env
        .upper
        .values()
        .iter()
        .zip(env.lower.values())
        .map(|(u, l)| u - l)
        .collect();
    assert!(widths[0] > 0.0);
    for w in &widths {
        assert!((w - widths[0]).abs() < 1e-9);
    }
    assert!(env.global);
    assert_eq!(env.rank, 2);
}

#[test]
fn best_is_resolved_once_for_observed_and_simulated() {
    let p = csr(square(10.0), 40, 6);
    let est_cfg = EstimatorCfg::default();
    let grid = RadiusGrid::default_for(p.window(), &est_cfg).unwrap();
    let cfg = EnvelopeCfg {
        n_simulations: 9,
        ..EnvelopeCfg::default()
    };
    let env = envelope(&p, Estimator::K, Correction::Best, &grid, &est_cfg, &cfg).unwrap();
    assert_eq!(env.observed.correction(), Some(Correction::Isotropic));
    assert_eq!(env.upper.correction(), Some(Correction::Isotropic));
}

#[test]
fn rank_must_fit_in_the_simulation_count() {
    let p = csr(square(5.0), 20, 7);
    let est_cfg = EstimatorCfg::default();
    let grid = RadiusGrid::default_for(p.window(), &est_cfg).unwrap();
    for (n_simulations, rank) in [(5, 0), (5, 6), (0, 1)] {
        let cfg = EnvelopeCfg {
            n_simulations,
            rank,
            ..EnvelopeCfg::default()
        };
        let err = envelope(&p, Estimator::K, Correction::None, &grid, &est_cfg, &cfg).unwrap_err();
        assert_eq!(err, Error::InsufficientSimulations { n_simulations, rank });
    }
}

#[test]
fn raised_abort_flag_stops_before_the_first_batch() {
    let p = csr(square(5.0), 20, 7);
    let est_cfg = EstimatorCfg::default();
    let grid = RadiusGrid::default_for(p.window(), &est_cfg).unwrap();
    let abort = AtomicBool::new(true);
    let err = envelope_with_abort(
        &p,
        Estimator::K,
        Correction::None,
        &grid,
        &est_cfg,
        &EnvelopeCfg::default(),
        &abort,
    )
    .unwrap_err();
    assert_eq!(err, Error::Aborted { completed: 0 });
}

#[test]
fn config_defaults_and_serde() {
    let cfg: EnvelopeCfg = serde_json::from_str(r#"{"global": true}"#).unwrap();
    assert_eq!(
        cfg,
        EnvelopeCfg {
            global: true,
            ..EnvelopeCfg::default()
        }
    );
    assert_eq!(cfg.n_simulations, 99);
    assert!(EnvelopeCfg {
        batch_size: 0,
        ..cfg
    }
    .validate()
    .is_err());
    assert!(EnvelopeCfg {
        threads: Some(0),
        ..cfg
    }
    .validate()
    .is_err());
}

#[test]
fn g_envelope_smooths_every_curve_with_the_observed_bandwidth() {
    let p = clustered();
    let est_cfg = EstimatorCfg::default();
    let grid = RadiusGrid::regular(2.0, 9).unwrap();
    let cfg = EnvelopeCfg {
        n_simulations: 19,
        seed: 5,
        ..EnvelopeCfg::default()
    };
    let h = est_cfg.bandwidth.resolve(&p).unwrap();
    let sim = simulate_csr_replay(p.window(), p.len(), ReplayToken { seed: 5, index: 0 });
    // a CSR draw is far less dense than the cluster
    assert!(est_cfg.bandwidth.resolve(&sim).unwrap() > 4.0 * h);

    let env = envelope(&p, Estimator::Pcf, Correction::Isotropic, &grid, &est_cfg, &cfg).unwrap();
    let fixed = EstimatorCfg {
        bandwidth: Bandwidth::Fixed(h),
        ..est_cfg
    };
    let pinned =
        envelope(&p, Estimator::Pcf, Correction::Isotropic, &grid, &fixed, &cfg).unwrap();
    assert_eq!(env, pinned);

    let first = estimate(&sim, Estimator::Pcf, Correction::Isotropic, &grid, &fixed).unwrap();
    for (k, v) in first.values().iter().enumerate() {
        assert!(env.lower.values()[k] <= *v && *v <= env.upper.values()[k]);
    }
}

#[test]
fn abort_raised_mid_run_reports_completed_batches() {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .unwrap();
    let cfg = EnvelopeCfg {
        n_simulations: 10,
        batch_size: 4,
        ..EnvelopeCfg::default()
    };
    let abort = AtomicBool::new(false);
    let mut seen = Vec::new();
    let err = run_batches(
        &pool,
        &cfg,
        &abort,
        |i| Ok(vec![i as f64]),
        |completed| {
            seen.push(completed);
            abort.store(true, std::sync::atomic::Ordering::Relaxed);
        },
    )
    .unwrap_err();
    assert_eq!(err, Error::Aborted { completed: 4 });
    assert_eq!(seen, vec![4]);

    let calm = AtomicBool::new(false);
    let all = run_batches(&pool, &cfg, &calm, |i| Ok(vec![i as f64]), |_| {}).unwrap();
    let order: Vec<f64> = all.iter().map(|v| v[0]).collect();
    assert_eq!(order, (0..10).map(|i| i as f64).collect::<Vec<_>>());
}
