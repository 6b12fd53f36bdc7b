//! Cover tree construction
//!
//! Builds a spatial hierarchy layer by layer at geometrically halving radii
//! down to the configured resolution ε. Each layer's nodes form an ε-cover
//! of the data (every point lies within the layer radius of some node) with
//! sibling separation at least the layer radius. The final layer's node
//! representatives are the inducing points.

use crate::core::{Metric, Point, Result, SelectionError};
use crate::utils::centroid;
use log::debug;
use serde::{Deserialize, Serialize};

/// Cover tree selector with resolution ε
///
/// The output size is determined by ε and the data's packing, not fixed in
/// advance. With `lloyds` disabled (the default) every representative is a
/// dataset member; enabling it recenters new nodes on the centroid of the
/// ball around the sampled point, synthesizing coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverTree {
    /// Cover resolution: final-layer radius
    pub epsilon: f64,
    /// Recenter new nodes on the centroid of their covering ball
    pub lloyds: bool,
    /// Reassign every point to its nearest node after each layer
    pub voronoi: bool,
    /// Metric used for all distance computations
    pub metric: Metric,
}

impl CoverTree {
    /// Create a builder with resolution ε (Euclidean metric, both optional
    /// passes disabled)
    ///
    /// # Panics
    /// Panics if ε is not positive
    pub fn new(epsilon: f64) -> Self {
        assert!(epsilon > 0.0, "Resolution must be positive, got: {}", epsilon);
        Self {
            epsilon,
            lloyds: false,
            voronoi: false,
            metric: Metric::Euclidean,
        }
    }

    /// Enable centroid recentering of new nodes
    pub fn with_lloyds(mut self, lloyds: bool) -> Self {
        self.lloyds = lloyds;
        self
    }

    /// Enable the per-layer Voronoi reassignment pass
    pub fn with_voronoi(mut self, voronoi: bool) -> Self {
        self.voronoi = voronoi;
        self
    }

    /// Set the metric
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
}

/// Tree node: representative plus structural bookkeeping
struct Node {
    center: Point,
    parent: Option<usize>,
    children: Vec<usize>,
    covered: Vec<usize>,
}

pub(crate) fn select(alg: &CoverTree, points: &[Point]) -> Result<Vec<Point>> {
    if points.is_empty() {
        return Err(SelectionError::InvalidSize("empty dataset".into()));
    }

    let mut nodes: Vec<Node> = Vec::new();
    let root_center = if alg.lloyds {
        let all: Vec<usize> = (0..points.len()).collect();
        centroid(points, &all)
    } else {
        points[0].clone()
    };
    let radius0 = points
        .iter()
        .map(|p| alg.metric.distance(&root_center, p))
        .fold(0.0_f64, f64::max);
    nodes.push(Node {
        center: root_center,
        parent: None,
        children: Vec::new(),
        covered: (0..points.len()).collect(),
    });
    let mut layer: Vec<usize> = vec![0];

    let mut radius = radius0;
    while radius > alg.epsilon {
        radius = (radius / 2.0).max(alg.epsilon);
        layer = build_layer(alg, points, &mut nodes, &layer, radius);
        let widest = layer
            .iter()
            .map(|&id| nodes[id].children.len().max(nodes[id].covered.len()))
            .max()
            .unwrap_or(0);
        debug!(
            "cover tree: layer radius {:.6} holds {} nodes (widest membership {})",
            radius,
            layer.len(),
            widest
        );
    }

    let orphans = layer.iter().filter(|&&id| nodes[id].parent.is_none()).count();
    debug_assert!(orphans == 0 || nodes.len() == 1);

    Ok(layer.iter().map(|&i| nodes[i].center.clone()).collect())
}

/// Build one layer at the given radius, covering every dataset point
fn build_layer(
    alg: &CoverTree,
    points: &[Point],
    nodes: &mut Vec<Node>,
    parents: &[usize],
    radius: f64,
) -> Vec<usize> {
    let mut layer: Vec<usize> = Vec::new();
    for (i, p) in points.iter().enumerate() {
        // Assign to an existing node of this layer when covered
        let nearest = layer
            .iter()
            .map(|&id| (id, alg.metric.distance(p, &nodes[id].center)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        if let Some((id, dist)) = nearest {
            if dist <= radius {
                nodes[id].covered.push(i);
                continue;
            }
        }

        // New node; the creation rule keeps siblings separated by > radius
        let center = if alg.lloyds {
            let ball: Vec<usize> = points
                .iter()
                .enumerate()
                .filter(|&(_, q)| alg.metric.distance(p, q) <= radius)
                .map(|(j, _)| j)
                .collect();
            centroid(points, &ball)
        } else {
            p.clone()
        };
        let parent = parents
            .iter()
            .map(|&id| (id, alg.metric.distance(&center, &nodes[id].center)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .map(|(id, _)| id);
        let node_id = nodes.len();
        nodes.push(Node {
            center,
            parent,
            children: Vec::new(),
            covered: vec![i],
        });
        if let Some(pid) = parent {
            nodes[pid].children.push(node_id);
        }
        layer.push(node_id);
    }

    if alg.voronoi {
        // Correct greedy insertion-order artifacts by reassigning every
        // point to its nearest node of this layer
        for &id in &layer {
            nodes[id].covered.clear();
        }
        for (i, p) in points.iter().enumerate() {
            let (best, _) = layer
                .iter()
                .map(|&id| (id, alg.metric.distance(p, &nodes[id].center)))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
                .unwrap();
            nodes[best].covered.push(i);
        }
    }

    layer
}
