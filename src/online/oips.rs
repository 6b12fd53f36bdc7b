//! Online inducing point selection (OIPS)
//!
//! Streaming accept/decay/remove maintenance of a bounded inducing set.
//! Each incoming point is accepted when its distance to the nearest member
//! exceeds the current acceptance threshold (or while the set is below the
//! kmin floor); the threshold decays by η per processed point so acceptance
//! tightens geometrically over time. A finite removal threshold prunes
//! mutually-too-close members after insertions; removals are the only way
//! this crate ever discards published inducing points and each one is
//! logged.

use crate::core::{Point, Result, SelectionError};
use crate::kernel::Kernel;
use crate::utils::find_nearest_center_kernelized;
use log::info;
use serde::{Deserialize, Serialize};

/// Online-IP-Selection configuration
///
/// Distances are kernel-induced when the caller supplies a kernel, plain
/// Euclidean otherwise; the thresholds live on whichever scale that
/// implies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OIPS {
    /// Initial acceptance threshold
    pub rho_accept: f64,
    /// Per-point decay factor applied to the acceptance threshold
    pub eta: f64,
    /// Hard cap on the set size
    pub kmax: usize,
    /// Size floor below which every point is accepted
    pub kmin: usize,
    /// Removal threshold; members closer than this are pruned (infinite
    /// disables removal)
    pub rho_remove: f64,
}

impl OIPS {
    /// Threshold-first constructor (η = 0.95, kmin = 10, no cap, no
    /// removal)
    ///
    /// # Panics
    /// Panics if the threshold is not positive
    pub fn new(rho_accept: f64) -> Self {
        assert!(
            rho_accept > 0.0,
            "Acceptance threshold must be positive, got: {}",
            rho_accept
        );
        Self {
            rho_accept,
            eta: 0.95,
            kmax: usize::MAX,
            kmin: 10,
            rho_remove: f64::INFINITY,
        }
    }

    /// Capacity-first constructor: bound the set at kmax with a slower
    /// decay (η = 0.98, kmin = 10)
    pub fn with_capacity(kmax: usize) -> Self {
        assert!(kmax > 0, "Capacity must be positive");
        Self {
            rho_accept: 0.8,
            eta: 0.98,
            kmax,
            kmin: 10.min(kmax),
            rho_remove: f64::INFINITY,
        }
    }

    /// Set the decay factor (must lie in (0, 1))
    pub fn with_eta(mut self, eta: f64) -> Self {
        assert!(eta > 0.0 && eta < 1.0, "Decay factor must lie in (0, 1)");
        self.eta = eta;
        self
    }

    /// Set the size cap
    pub fn with_kmax(mut self, kmax: usize) -> Self {
        assert!(kmax >= self.kmin, "Capacity cannot undercut the kmin floor");
        self.kmax = kmax;
        self
    }

    /// Set the size floor
    pub fn with_kmin(mut self, kmin: usize) -> Self {
        assert!(kmin <= self.kmax, "Floor cannot exceed the capacity");
        self.kmin = kmin;
        self
    }

    /// Set the removal threshold
    pub fn with_removal(mut self, rho_remove: f64) -> Self {
        assert!(rho_remove > 0.0, "Removal threshold must be positive");
        self.rho_remove = rho_remove;
        self
    }
}

impl Default for OIPS {
    /// Defaults from the method's reference parameterization
    fn default() -> Self {
        Self::new(0.8)
    }
}

/// Initialize from a first batch: stream every point through the accept
/// rule starting from an empty set. Returns the set and the decayed
/// threshold.
pub(crate) fn init(
    alg: &OIPS,
    points: &[Point],
    kernel: Option<&dyn Kernel>,
) -> Result<(Vec<Point>, f64)> {
    let mut z = Vec::new();
    let mut threshold = alg.rho_accept;
    absorb(alg, &mut z, &mut threshold, points, kernel);
    if z.is_empty() {
        return Err(SelectionError::InvalidSize("empty dataset".into()));
    }
    Ok((z, threshold))
}

/// Process a batch against an existing set, in place
pub(crate) fn update(
    alg: &OIPS,
    z: &mut Vec<Point>,
    threshold: &mut f64,
    batch: &[Point],
    kernel: Option<&dyn Kernel>,
) {
    absorb(alg, z, threshold, batch, kernel);
}

fn absorb(
    alg: &OIPS,
    z: &mut Vec<Point>,
    threshold: &mut f64,
    batch: &[Point],
    kernel: Option<&dyn Kernel>,
) {
    for x in batch {
        let accept = if z.len() >= alg.kmax {
            false
        } else if z.len() < alg.kmin || z.is_empty() {
            true
        } else {
            let (_, dist) = find_nearest_center_kernelized(x, z, kernel);
            dist > *threshold
        };
        if accept {
            z.push(x.clone());
        }
        *threshold *= alg.eta;
    }

    if alg.rho_remove.is_finite() {
        prune(alg, z, kernel);
    }
}

/// Prune members that sit closer than the removal threshold to an earlier
/// member; earlier points win
fn prune(alg: &OIPS, z: &mut Vec<Point>, kernel: Option<&dyn Kernel>) {
    let mut keep = vec![true; z.len()];
    for i in 1..z.len() {
        for j in 0..i {
            if !keep[j] {
                continue;
            }
            let (_, dist) = find_nearest_center_kernelized(&z[i], &z[j..j + 1], kernel);
            if dist < alg.rho_remove {
                keep[i] = false;
                info!(
                    "oips: removing inducing point {} ({:.6} from point {}, below removal threshold {:.6})",
                    i, dist, j, alg.rho_remove
                );
                break;
            }
        }
    }
    let mut it = keep.iter();
    z.retain(|_| *it.next().unwrap());
}
