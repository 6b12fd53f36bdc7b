//! Selection protocol dispatcher
//!
//! The two public operations — select from scratch and update an existing
//! set with a new batch — route to the algorithm implementation named by
//! the configuration variant and enforce the argument contracts
//! (dimensionality, per-algorithm keyword requirements) before any
//! computation begins.
//!
//! # Quick Start
//!
//! ```rust
//! use ipsel::{select_with, AlgorithmConfig, KMeans, SelectArgs};
//! use ipsel::core::Point;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data: Vec<Point> = (0..50)
//!     .map(|i| Point::new(vec![(i % 10) as f64, (i / 10) as f64]))
//!     .collect();
//! let config = AlgorithmConfig::from(KMeans::new(5));
//! let mut rng = StdRng::seed_from_u64(42);
//! let selection = select_with(&mut rng, &config, &data, SelectArgs::new())?;
//! assert_eq!(selection.set.len(), 5);
//! # Ok(())
//! # }
//! ```

use crate::core::{Dataset, InducingSet, Point, Result, SelectionError};
use crate::kernel::Kernel;
use crate::offline::{covertree, dpp, greedy, kmeans, random};
use crate::offline::{CoverTree, Greedy, KDPP, KMeans, RandomSubset, StdDPP};
use crate::online::{oips, seqdpp, streamkmeans, unigrid, webscale};
use crate::online::{StreamKmeans, UniGrid, Webscale, OIPS, SeqDPP};
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Per-call keyword arguments
///
/// Each algorithm declares which of these it requires; a missing required
/// argument fails with `MissingArgument` before any computation starts.
#[derive(Clone, Copy, Default)]
pub struct SelectArgs<'a> {
    kernel: Option<&'a dyn Kernel>,
    targets: Option<&'a [f64]>,
    noise: Option<f64>,
    weights: Option<&'a [f64]>,
}

impl<'a> SelectArgs<'a> {
    /// Empty argument bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply the kernel oracle (required by the DPP family and Greedy,
    /// optional for OIPS)
    pub fn with_kernel(mut self, kernel: &'a dyn Kernel) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Supply observed targets (required by Greedy)
    pub fn with_targets(mut self, targets: &'a [f64]) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Supply the observation noise variance (required by Greedy)
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = Some(noise);
        self
    }

    /// Supply sampling weights (optional for RandomSubset)
    pub fn with_weights(mut self, weights: &'a [f64]) -> Self {
        self.weights = Some(weights);
        self
    }

    fn kernel(&self) -> Option<&'a dyn Kernel> {
        self.kernel
    }

    fn weights(&self) -> Option<&'a [f64]> {
        self.weights
    }

    fn require_kernel(&self, algorithm: &'static str) -> Result<&'a dyn Kernel> {
        self.kernel.ok_or(SelectionError::MissingArgument {
            algorithm,
            argument: "kernel",
        })
    }

    fn require_targets(&self, algorithm: &'static str) -> Result<&'a [f64]> {
        self.targets.ok_or(SelectionError::MissingArgument {
            algorithm,
            argument: "targets",
        })
    }

    fn require_noise(&self, algorithm: &'static str) -> Result<f64> {
        self.noise.ok_or(SelectionError::MissingArgument {
            algorithm,
            argument: "noise",
        })
    }
}

/// Algorithm configuration: one variant per selection strategy
///
/// Constructed once and reused across calls; hyperparameters live in the
/// wrapped per-algorithm structs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlgorithmConfig {
    RandomSubset(RandomSubset),
    KMeans(KMeans),
    KDPP(KDPP),
    StdDPP(StdDPP),
    Greedy(Greedy),
    CoverTree(CoverTree),
    OIPS(OIPS),
    UniGrid(UniGrid),
    SeqDPP(SeqDPP),
    StreamKmeans(StreamKmeans),
    Webscale(Webscale),
}

impl AlgorithmConfig {
    /// Human-readable algorithm name
    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmConfig::RandomSubset(_) => "RandomSubset",
            AlgorithmConfig::KMeans(_) => "KMeans",
            AlgorithmConfig::KDPP(_) => "kDPP",
            AlgorithmConfig::StdDPP(_) => "StdDPP",
            AlgorithmConfig::Greedy(_) => "Greedy",
            AlgorithmConfig::CoverTree(_) => "CoverTree",
            AlgorithmConfig::OIPS(_) => "OIPS",
            AlgorithmConfig::UniGrid(_) => "UniGrid",
            AlgorithmConfig::SeqDPP(_) => "SeqDPP",
            AlgorithmConfig::StreamKmeans(_) => "StreamKmeans",
            AlgorithmConfig::Webscale(_) => "Webscale",
        }
    }

    /// Whether the algorithm supports incremental updates
    pub fn is_online(&self) -> bool {
        matches!(
            self,
            AlgorithmConfig::OIPS(_)
                | AlgorithmConfig::UniGrid(_)
                | AlgorithmConfig::SeqDPP(_)
                | AlgorithmConfig::StreamKmeans(_)
                | AlgorithmConfig::Webscale(_)
        )
    }
}

macro_rules! impl_from_config {
    ($($variant:ident),+) => {
        $(impl From<$variant> for AlgorithmConfig {
            fn from(alg: $variant) -> Self {
                AlgorithmConfig::$variant(alg)
            }
        })+
    };
}

impl_from_config!(
    RandomSubset,
    KMeans,
    KDPP,
    StdDPP,
    Greedy,
    CoverTree,
    OIPS,
    UniGrid,
    SeqDPP,
    StreamKmeans,
    Webscale
);

/// Opaque auxiliary state for online selectors
///
/// Travels with the inducing set it was produced for; the contents are
/// algorithm-owned and never exposed. Passing a state to an update call
/// with a different configuration or a foreign inducing set fails with
/// `StateMismatch` where detectable.
#[derive(Debug, Clone)]
pub struct SelectionState {
    inner: StateInner,
}

#[derive(Debug, Clone)]
enum StateInner {
    OIPS {
        threshold: f64,
    },
    SeqDPP {
        gram: DMatrix<f64>,
    },
    UniGrid {
        lo: Vec<f64>,
        hi: Vec<f64>,
    },
    StreamKmeans {
        counts: Vec<f64>,
        facility: f64,
    },
    Webscale {
        counts: Vec<u64>,
    },
}

impl SelectionState {
    /// Name of the algorithm this state belongs to
    pub fn algorithm(&self) -> &'static str {
        match &self.inner {
            StateInner::OIPS { .. } => "OIPS",
            StateInner::SeqDPP { .. } => "SeqDPP",
            StateInner::UniGrid { .. } => "UniGrid",
            StateInner::StreamKmeans { .. } => "StreamKmeans",
            StateInner::Webscale { .. } => "Webscale",
        }
    }
}

/// Result of a selection or update: the inducing set plus, for online
/// algorithms, the opaque state required by subsequent updates
#[derive(Debug, Clone)]
pub struct Selection {
    pub set: InducingSet,
    pub state: Option<SelectionState>,
}

/// Normalize a dataset and validate that every point shares one dimension
fn normalize<D: Dataset + ?Sized>(data: &D) -> Result<Vec<Point>> {
    if data.is_empty() {
        return Err(SelectionError::InvalidSize("empty dataset".into()));
    }
    let points = data.to_points();
    let dim = points[0].dim();
    if dim == 0 {
        return Err(SelectionError::InvalidSize(
            "points must have at least one dimension".into(),
        ));
    }
    for p in &points {
        if p.dim() != dim {
            return Err(SelectionError::DimensionMismatch {
                expected: dim,
                actual: p.dim(),
            });
        }
    }
    Ok(points)
}

/// Select an inducing set from scratch with an explicit random source
pub fn select_with<R, D>(
    rng: &mut R,
    config: &AlgorithmConfig,
    data: &D,
    args: SelectArgs<'_>,
) -> Result<Selection>
where
    R: Rng + ?Sized,
    D: Dataset + ?Sized,
{
    let points = normalize(data)?;
    match config {
        AlgorithmConfig::RandomSubset(alg) => {
            let z = random::select(rng, alg, &points, args.weights())?;
            Ok(offline_selection(z))
        }
        AlgorithmConfig::KMeans(alg) => {
            let z = kmeans::select(rng, alg, &points)?;
            Ok(offline_selection(z))
        }
        AlgorithmConfig::KDPP(alg) => {
            let kernel = args.require_kernel("kDPP")?;
            let z = dpp::select_kdpp(rng, alg, &points, kernel)?;
            Ok(offline_selection(z))
        }
        AlgorithmConfig::StdDPP(_) => {
            let kernel = args.require_kernel("StdDPP")?;
            let z = dpp::select_std_dpp(rng, &points, kernel)?;
            Ok(offline_selection(z))
        }
        AlgorithmConfig::Greedy(alg) => {
            let kernel = args.require_kernel("Greedy")?;
            let targets = args.require_targets("Greedy")?;
            let noise = args.require_noise("Greedy")?;
            let z = greedy::select(rng, alg, &points, targets, kernel, noise)?;
            Ok(offline_selection(z))
        }
        AlgorithmConfig::CoverTree(alg) => {
            let z = covertree::select(alg, &points)?;
            Ok(offline_selection(z))
        }
        AlgorithmConfig::OIPS(alg) => {
            let (z, threshold) = oips::init(alg, &points, args.kernel())?;
            Ok(Selection {
                set: InducingSet::from_points(z),
                state: Some(SelectionState {
                    inner: StateInner::OIPS { threshold },
                }),
            })
        }
        AlgorithmConfig::UniGrid(alg) => {
            let (grid, lo, hi) = unigrid::init(alg, &points)?;
            Ok(Selection {
                set: InducingSet::from_grid(grid),
                state: Some(SelectionState {
                    inner: StateInner::UniGrid { lo, hi },
                }),
            })
        }
        AlgorithmConfig::SeqDPP(_) => {
            let kernel = args.require_kernel("SeqDPP")?;
            let (z, gram) = seqdpp::init(rng, &points, kernel)?;
            Ok(Selection {
                set: InducingSet::from_points(z),
                state: Some(SelectionState {
                    inner: StateInner::SeqDPP { gram },
                }),
            })
        }
        AlgorithmConfig::StreamKmeans(alg) => {
            let (z, state) = streamkmeans::init(rng, alg, &points)?;
            Ok(Selection {
                set: InducingSet::from_points(z),
                state: Some(SelectionState {
                    inner: StateInner::StreamKmeans {
                        counts: state.counts,
                        facility: state.facility,
                    },
                }),
            })
        }
        AlgorithmConfig::Webscale(alg) => {
            let (z, counts) = webscale::init(rng, alg, &points)?;
            Ok(Selection {
                set: InducingSet::from_points(z),
                state: Some(SelectionState {
                    inner: StateInner::Webscale { counts },
                }),
            })
        }
    }
}

/// Select an inducing set from scratch
///
/// Convenience form of [`select_with`] drawing from a locally seeded
/// random source; use the explicit form for reproducibility.
pub fn select<D>(config: &AlgorithmConfig, data: &D, args: SelectArgs<'_>) -> Result<Selection>
where
    D: Dataset + ?Sized,
{
    let mut rng = StdRng::from_entropy();
    select_with(&mut rng, config, data, args)
}

/// Update an existing inducing set with a new batch, returning a fresh set
/// and state (the inputs are left untouched)
pub fn update_with<R, D>(
    rng: &mut R,
    set: &InducingSet,
    state: &SelectionState,
    config: &AlgorithmConfig,
    batch: &D,
    args: SelectArgs<'_>,
) -> Result<Selection>
where
    R: Rng + ?Sized,
    D: Dataset + ?Sized,
{
    let mut new_set = set.clone();
    let mut new_state = state.clone();
    update_in_place_with(rng, &mut new_set, &mut new_state, config, batch, args)?;
    Ok(Selection {
        set: new_set,
        state: Some(new_state),
    })
}

/// Update an existing inducing set with a new batch
///
/// Convenience form of [`update_with`] drawing from a locally seeded
/// random source.
pub fn update<D>(
    set: &InducingSet,
    state: &SelectionState,
    config: &AlgorithmConfig,
    batch: &D,
    args: SelectArgs<'_>,
) -> Result<Selection>
where
    D: Dataset + ?Sized,
{
    let mut rng = StdRng::from_entropy();
    update_with(&mut rng, set, state, config, batch, args)
}

/// Destructively update an inducing set and its state in place with an
/// explicit random source
///
/// Semantically identical to [`update_with`]; only the ownership of the
/// result differs.
pub fn update_in_place_with<R, D>(
    rng: &mut R,
    set: &mut InducingSet,
    state: &mut SelectionState,
    config: &AlgorithmConfig,
    batch: &D,
    args: SelectArgs<'_>,
) -> Result<()>
where
    R: Rng + ?Sized,
    D: Dataset + ?Sized,
{
    let points = normalize(batch)?;
    let dim = points[0].dim();
    if set.dim() != dim {
        return Err(SelectionError::DimensionMismatch {
            expected: set.dim(),
            actual: dim,
        });
    }
    let state_name = state.algorithm();

    match (config, &mut state.inner) {
        (AlgorithmConfig::OIPS(alg), StateInner::OIPS { threshold }) => {
            let z = expect_points_mut(set, "OIPS")?;
            oips::update(alg, z, threshold, &points, args.kernel());
            Ok(())
        }
        (AlgorithmConfig::SeqDPP(alg), StateInner::SeqDPP { gram }) => {
            let kernel = args.require_kernel("SeqDPP")?;
            let z = expect_points_mut(set, "SeqDPP")?;
            if gram.nrows() != z.len() {
                return Err(SelectionError::StateMismatch(format!(
                    "Gram block of size {} does not match an inducing set of size {}",
                    gram.nrows(),
                    z.len()
                )));
            }
            seqdpp::update(rng, alg, z, gram, &points, kernel)
        }
        (AlgorithmConfig::UniGrid(alg), StateInner::UniGrid { lo, hi }) => {
            let grid = set.as_grid().ok_or_else(|| {
                SelectionError::StateMismatch(
                    "UniGrid state paired with a materialized inducing set".into(),
                )
            })?;
            if grid.dim() != lo.len() || grid.points_per_dim() != alg.m {
                return Err(SelectionError::StateMismatch(format!(
                    "grid of {} x {} coordinates does not match the recorded bounding box",
                    grid.points_per_dim(),
                    grid.dim()
                )));
            }
            *set = InducingSet::from_grid(unigrid::update(alg, lo, hi, &points));
            Ok(())
        }
        (AlgorithmConfig::StreamKmeans(alg), StateInner::StreamKmeans { counts, facility }) => {
            let z = expect_points_mut(set, "StreamKmeans")?;
            if counts.len() != z.len() {
                return Err(SelectionError::StateMismatch(format!(
                    "{} centroid counts do not match an inducing set of size {}",
                    counts.len(),
                    z.len()
                )));
            }
            let mut stream_state = streamkmeans::StreamState {
                counts: std::mem::take(counts),
                facility: *facility,
            };
            streamkmeans::update(alg, z, &mut stream_state, &points);
            *counts = stream_state.counts;
            *facility = stream_state.facility;
            Ok(())
        }
        (AlgorithmConfig::Webscale(_), StateInner::Webscale { counts }) => {
            let z = expect_points_mut(set, "Webscale")?;
            if counts.len() != z.len() {
                return Err(SelectionError::StateMismatch(format!(
                    "{} centroid counts do not match an inducing set of size {}",
                    counts.len(),
                    z.len()
                )));
            }
            webscale::update(z, counts, &points);
            Ok(())
        }
        _ => {
            if config.is_online() {
                Err(SelectionError::StateMismatch(format!(
                    "state produced by {} cannot drive a {} update",
                    state_name,
                    config.name()
                )))
            } else {
                Err(SelectionError::UnsupportedUpdate {
                    algorithm: config.name(),
                })
            }
        }
    }
}

/// Destructively update an inducing set and its state in place
pub fn update_in_place<D>(
    set: &mut InducingSet,
    state: &mut SelectionState,
    config: &AlgorithmConfig,
    batch: &D,
    args: SelectArgs<'_>,
) -> Result<()>
where
    D: Dataset + ?Sized,
{
    let mut rng = StdRng::from_entropy();
    update_in_place_with(&mut rng, set, state, config, batch, args)
}

fn offline_selection(z: Vec<Point>) -> Selection {
    Selection {
        set: InducingSet::from_points(z),
        state: None,
    }
}

fn expect_points_mut<'a>(
    set: &'a mut InducingSet,
    algorithm: &'static str,
) -> Result<&'a mut Vec<Point>> {
    set.points_mut().ok_or_else(|| {
        SelectionError::StateMismatch(format!(
            "{} state paired with a lazy-grid inducing set",
            algorithm
        ))
    })
}
