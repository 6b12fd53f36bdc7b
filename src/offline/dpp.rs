//! Determinantal point process samplers
//!
//! Both offline variants sample subsets with probability proportional to
//! the determinant of the Gram submatrix indexed by the subset: an
//! eigendecomposition picks a set of eigenvectors, then points are drawn
//! one at a time with iterative orthogonal-projection elimination of the
//! chosen directions.

use crate::core::{Point, Result, SelectionError};
use crate::kernel::Kernel;
use crate::utils::sample_weighted_index;
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Retry bound for the standard DPP's non-empty contract
const MAX_EMPTY_RETRIES: usize = 10;

/// Relative eigenvalue threshold below which a direction counts as rank
/// deficient
const RANK_TOL: f64 = 1e-10;

/// k-DPP sampler returning exactly m diverse points
///
/// The output is a subset of the input. Fails with `InvalidSize` when m
/// exceeds the numerical rank of the Gram matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KDPP {
    /// Number of inducing points to draw
    pub m: usize,
}

impl KDPP {
    /// Create a k-DPP sampler drawing m points
    pub fn new(m: usize) -> Self {
        Self { m }
    }
}

/// Standard DPP sampler with random output size
///
/// Each eigenvector is kept independently with probability λ/(1+λ), so the
/// subset size is itself random, but the result is never empty: an empty
/// sample is redrawn up to 10 times, after which the highest-eigenvalue
/// component is force-included. `EmptyResult` is returned only when even
/// that fails (all eigenvalues numerically zero).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdDPP;

impl StdDPP {
    /// Create a standard DPP sampler
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn select_kdpp<R: Rng + ?Sized>(
    rng: &mut R,
    alg: &KDPP,
    points: &[Point],
    kernel: &dyn Kernel,
) -> Result<Vec<Point>> {
    let n = points.len();
    if alg.m == 0 {
        return Err(SelectionError::InvalidSize(
            "cannot select an empty subset (m = 0)".into(),
        ));
    }
    if alg.m > n {
        return Err(SelectionError::InvalidSize(format!(
            "requested {} points from a dataset of {}",
            alg.m, n
        )));
    }

    let (values, vectors) = eigen_ascending(kernel.gram(points));
    let rank = numerical_rank(&values);
    if alg.m > rank {
        return Err(SelectionError::InvalidSize(format!(
            "requested {} points but the Gram matrix has rank {}",
            alg.m, rank
        )));
    }

    let basis = sample_fixed_size_basis(rng, &values, &vectors, alg.m);
    let indices = sample_points_from_basis(rng, basis, n);
    if indices.len() != alg.m {
        return Err(SelectionError::InvalidSize(format!(
            "Gram matrix too degenerate to draw {} points",
            alg.m
        )));
    }
    Ok(indices.into_iter().map(|i| points[i].clone()).collect())
}

pub(crate) fn select_std_dpp<R: Rng + ?Sized>(
    rng: &mut R,
    points: &[Point],
    kernel: &dyn Kernel,
) -> Result<Vec<Point>> {
    let gram = kernel.gram(points);
    let indices = std_dpp_indices(rng, gram, false)?;
    Ok(indices.into_iter().map(|i| points[i].clone()).collect())
}

/// Standard-DPP index sampling over an arbitrary PSD kernel matrix
///
/// With `allow_empty` the non-empty contract is waived (used by the
/// sequential variant, where an update is allowed to append nothing).
pub(crate) fn std_dpp_indices<R: Rng + ?Sized>(
    rng: &mut R,
    gram: DMatrix<f64>,
    allow_empty: bool,
) -> Result<Vec<usize>> {
    let n = gram.nrows();
    if n == 0 {
        return if allow_empty {
            Ok(Vec::new())
        } else {
            Err(SelectionError::InvalidSize("empty dataset".into()))
        };
    }

    let (values, vectors) = eigen_ascending(gram);

    for _ in 0..MAX_EMPTY_RETRIES {
        let basis: Vec<DVector<f64>> = values
            .iter()
            .zip(vectors.iter())
            .filter(|(lambda, _)| rng.gen::<f64>() < **lambda / (1.0 + **lambda))
            .map(|(_, v)| v.clone())
            .collect();
        if !basis.is_empty() {
            return Ok(sample_points_from_basis(rng, basis, n));
        }
        if allow_empty {
            return Ok(Vec::new());
        }
    }

    // Deterministic fallback: force the dominant component
    let best = values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap();
    if values[best] <= 0.0 {
        return Err(SelectionError::EmptyResult {
            retries: MAX_EMPTY_RETRIES,
        });
    }
    let basis = vec![vectors[best].clone()];
    Ok(sample_points_from_basis(rng, basis, n))
}

/// Eigendecomposition with eigenvalues clamped at zero and sorted ascending
fn eigen_ascending(gram: DMatrix<f64>) -> (Vec<f64>, Vec<DVector<f64>>) {
    let eigen = gram.symmetric_eigen();
    let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[a]
            .partial_cmp(&eigen.eigenvalues[b])
            .unwrap()
    });
    let values = order
        .iter()
        .map(|&i| eigen.eigenvalues[i].max(0.0))
        .collect();
    let vectors = order
        .iter()
        .map(|&i| eigen.eigenvectors.column(i).clone_owned())
        .collect();
    (values, vectors)
}

fn numerical_rank(values: &[f64]) -> usize {
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    let tol = RANK_TOL * max.max(1.0);
    values.iter().filter(|&&v| v > tol).count()
}

/// Draw exactly m eigenvectors with probabilities given by elementary
/// symmetric polynomials over the eigenvalues (the standard exact k-DPP
/// eigenvector-subset step)
fn sample_fixed_size_basis<R: Rng + ?Sized>(
    rng: &mut R,
    values: &[f64],
    vectors: &[DVector<f64>],
    m: usize,
) -> Vec<DVector<f64>> {
    let n = values.len();
    let esp = esp_table(values, m);

    let mut basis = Vec::with_capacity(m);
    let mut k = m;
    for i in (1..=n).rev() {
        if k == 0 {
            break;
        }
        let denominator = esp[k][i];
        let prob = if denominator > 0.0 {
            values[i - 1] * esp[k - 1][i - 1] / denominator
        } else {
            1.0
        };
        if i == k || rng.gen::<f64>() < prob {
            basis.push(vectors[i - 1].clone());
            k -= 1;
        }
    }
    basis
}

/// Table of elementary symmetric polynomials: esp[k][i] is e_k over the
/// first i eigenvalues
fn esp_table(values: &[f64], m: usize) -> Vec<Vec<f64>> {
    let n = values.len();
    let mut esp = vec![vec![0.0; n + 1]; m + 1];
    for i in 0..=n {
        esp[0][i] = 1.0;
    }
    for k in 1..=m {
        for i in 1..=n {
            esp[k][i] = esp[k][i - 1] + values[i - 1] * esp[k - 1][i - 1];
        }
    }
    esp
}

/// Draw one concrete point per basis vector, eliminating the chosen
/// direction from the basis after each draw (Gram-Schmidt-style projection)
pub(crate) fn sample_points_from_basis<R: Rng + ?Sized>(
    rng: &mut R,
    mut basis: Vec<DVector<f64>>,
    n: usize,
) -> Vec<usize> {
    let mut chosen = Vec::with_capacity(basis.len());
    while !basis.is_empty() {
        // P(i) proportional to the squared mass of row i across the basis
        let weights: Vec<f64> = (0..n)
            .map(|i| basis.iter().map(|v| v[i] * v[i]).sum())
            .collect();
        let idx = sample_weighted_index(rng, &weights);
        chosen.push(idx);

        // Eliminate the basis vector with the largest component on idx and
        // project the rest orthogonal to coordinate idx
        let pivot = basis
            .iter()
            .enumerate()
            .max_by(|a, b| a.1[idx].abs().partial_cmp(&b.1[idx].abs()).unwrap())
            .map(|(j, _)| j)
            .unwrap();
        let pivot_vec = basis.swap_remove(pivot);
        if pivot_vec[idx].abs() > f64::EPSILON {
            for v in basis.iter_mut() {
                let scale = v[idx] / pivot_vec[idx];
                *v -= &pivot_vec * scale;
            }
        }
        orthonormalize(&mut basis);
    }
    chosen
}

/// Modified Gram-Schmidt, dropping numerically collapsed vectors
fn orthonormalize(vectors: &mut Vec<DVector<f64>>) {
    let mut kept: Vec<DVector<f64>> = Vec::with_capacity(vectors.len());
    for mut v in vectors.drain(..) {
        for u in &kept {
            let proj = u.dot(&v);
            v -= u * proj;
        }
        let norm = v.norm();
        if norm > 1e-10 {
            kept.push(v / norm);
        }
    }
    *vectors = kept;
}
