//! Reduce simulated curves to envelope bounds.

use serde::Serialize;

use super::{Envelope, EnvelopeCfg};
use crate::error::{Error, Result};
use crate::estimate::Curve;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Above,
    Below,
}

/// Radius where the observed value falls outside `[lower, upper]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Exceedance {
    pub r: f64,
    pub observed: f64,
    pub bound: f64,
    pub side: Side,
}

pub(super) fn build(
    observed: Curve,
    simulated: &[Vec<f64>],
    cfg: &EnvelopeCfg,
) -> Result<Envelope> {
    let n_sim = simulated.len();
    if n_sim < cfg.rank || cfg.rank == 0 {
        return Err(Error::InsufficientSimulations {
            n_simulations: n_sim,
            rank: cfg.rank,
        });
    }
    let m = observed.len();
    debug_assert!(simulated.iter().all(|s| s.len() == m));

    let mut centre = vec![0.0; m];
    for sim in simulated {
        for (c, v) in centre.iter_mut().zip(sim) {
            *c += v;
        }
    }
    centre.iter_mut().for_each(|c| *c /= n_sim as f64);

    let deviation = |values: &[f64]| -> f64 {
        values
            .iter()
            .zip(&centre)
            .map(|(v, c)| (v - c).abs())
            .fold(0.0, f64::max)
    };
    let mut sim_dev: Vec<f64> = simulated.iter().map(|s| deviation(s)).collect();
    let obs_dev = deviation(observed.values());
    let at_least = sim_dev.iter().filter(|d| **d >= obs_dev).count();
    let mad_p_value = (1 + at_least) as f64 / (n_sim + 1) as f64;

    let (lower, upper) = if cfg.global {
        sim_dev.sort_by(|a, b| b.total_cmp(a));
        let u = sim_dev[cfg.rank - 1];
        (
            centre.iter().map(|c| c - u).collect::<Vec<_>>(),
            centre.iter().map(|c| c + u).collect::<Vec<_>>(),
        )
    } else {
        let mut lower = Vec::with_capacity(m);
        let mut upper = Vec::with_capacity(m);
        let mut column = vec![0.0; n_sim];
        for k in 0..m {
            for (slot, sim) in column.iter_mut().zip(simulated) {
                *slot = sim[k];
            }
            column.sort_by(|a, b| a.total_cmp(b));
            lower.push(column[cfg.rank - 1]);
            upper.push(column[n_sim - cfg.rank]);
        }
        (lower, upper)
    };

    let tagged = |values: Vec<f64>| {
        Curve::new(
            observed.estimator(),
            observed.correction(),
            observed.r().to_vec(),
            values,
        )
    };
    Ok(Envelope {
        lower: tagged(lower),
        upper: tagged(upper),
        centre: tagged(centre),
        observed,
        n_simulations: n_sim,
        rank: cfg.rank,
        global: cfg.global,
        mad_p_value,
    })
}

pub(super) fn exceedances(env: &Envelope) -> Vec<Exceedance> {
    env.observed
        .iter()
        .zip(env.lower.values().iter().zip(env.upper.values()))
        .filter_map(|((r, v), (&lo, &hi))| {
            if v > hi {
                Some(Exceedance {
                    r,
                    observed: v,
                    bound: hi,
                    side: Side::Above,
                })
            } else if v < lo {
                Some(Exceedance {
                    r,
                    observed: v,
                    bound: lo,
                    side: Side::Below,
                })
            } else {
                None
            }
        })
        .collect()
}
