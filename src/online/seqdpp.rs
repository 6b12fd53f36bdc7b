//! Sequential determinantal point process
//!
//! Online DPP variant: each new batch is sampled from the DPP induced by
//! its kernel matrix conditioned on the already-accepted inducing points
//! (Schur complement against the stored Gram block). Accepted points are
//! appended; previously accepted points are never reconsidered or removed.

use crate::core::{Point, Result, SelectionError};
use crate::kernel::Kernel;
use crate::offline::dpp::std_dpp_indices;
use nalgebra::{Cholesky, DMatrix};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sequential DPP configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeqDPP {
    /// Jitter added to the stored Gram block before factorization
    pub jitter: f64,
}

impl SeqDPP {
    /// Create a sequential DPP sampler with the default jitter
    pub fn new() -> Self {
        Self { jitter: 1e-7 }
    }

    /// Set the factorization jitter
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        assert!(jitter >= 0.0, "Jitter cannot be negative");
        self.jitter = jitter;
        self
    }
}

impl Default for SeqDPP {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize from a first batch with a non-empty standard-DPP draw;
/// returns the accepted points and their Gram block
pub(crate) fn init<R: Rng + ?Sized>(
    rng: &mut R,
    points: &[Point],
    kernel: &dyn Kernel,
) -> Result<(Vec<Point>, DMatrix<f64>)> {
    let gram = kernel.gram(points);
    let indices = std_dpp_indices(rng, gram.clone(), false)?;
    let z: Vec<Point> = indices.iter().map(|&i| points[i].clone()).collect();
    let gram_z = DMatrix::from_fn(indices.len(), indices.len(), |r, c| {
        gram[(indices[r], indices[c])]
    });
    Ok((z, gram_z))
}

/// Append a conditional DPP draw over the batch to the existing set, in
/// place; the stored Gram block grows by the accepted rows and columns
pub(crate) fn update<R: Rng + ?Sized>(
    rng: &mut R,
    alg: &SeqDPP,
    z: &mut Vec<Point>,
    gram_z: &mut DMatrix<f64>,
    batch: &[Point],
    kernel: &dyn Kernel,
) -> Result<()> {
    let m = z.len();
    let kbb = kernel.gram(batch);
    let kbz = kernel.cross_gram(batch, z);

    let jittered = gram_z.clone() + DMatrix::identity(m, m) * alg.jitter;
    let chol = Cholesky::new(jittered).ok_or_else(|| {
        SelectionError::StateMismatch(
            "stored Gram block is not positive definite; state does not match the inducing set"
                .into(),
        )
    })?;

    // Conditional kernel of the batch given Z: K_BB - K_BZ K_ZZ^-1 K_ZB
    let mut conditional = &kbb - &kbz * chol.solve(&kbz.transpose());
    // Symmetrize against round-off before the eigendecomposition
    conditional = (&conditional + conditional.transpose()) * 0.5;

    let accepted = std_dpp_indices(rng, conditional, true)?;
    if accepted.is_empty() {
        return Ok(());
    }

    let grown = accepted.len() + m;
    let gram_new = DMatrix::from_fn(grown, grown, |r, c| match (r < m, c < m) {
        (true, true) => gram_z[(r, c)],
        (true, false) => kbz[(accepted[c - m], r)],
        (false, true) => kbz[(accepted[r - m], c)],
        (false, false) => kbb[(accepted[r - m], accepted[c - m])],
    });
    *gram_z = gram_new;
    z.extend(accepted.into_iter().map(|i| batch[i].clone()));
    Ok(())
}
