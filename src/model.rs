//! DBSCAN clustering model: classification, reachability, and assembly

use tracing::{debug, info};

use crate::assemble::{assemble_core, assign_border, BorderPolicy};
use crate::classify::{classify, validate_radius, Classification, NeighborPolicy};
use crate::cluster::{Cluster, ClusterIds};
use crate::point::FeatureVector;
use crate::reachability::{ClosurePolicy, ReachabilityGraph};

/// Parameters of one clustering run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DbscanParams {
    /// Neighborhood radius; neighbors must be strictly closer
    pub radius: f32,
    /// A core point needs strictly more than this many neighbors
    pub min_neighbors: usize,
    pub neighbors: NeighborPolicy,
    pub closure: ClosurePolicy,
    pub border: BorderPolicy,
}

impl DbscanParams {
    pub fn new(radius: f32, min_neighbors: usize) -> Self {
        Self {
            radius,
            min_neighbors,
            neighbors: NeighborPolicy::default(),
            closure: ClosurePolicy::default(),
            border: BorderPolicy::default(),
        }
    }

    pub fn with_neighbors(mut self, neighbors: NeighborPolicy) -> Self {
        self.neighbors = neighbors;
        self
    }

    pub fn with_closure(mut self, closure: ClosurePolicy) -> Self {
        self.closure = closure;
        self
    }

    pub fn with_border(mut self, border: BorderPolicy) -> Self {
        self.border = border;
        self
    }
}

/// Result of a clustering run
#[derive(Debug, Clone)]
pub struct DbscanModel {
    pub params: DbscanParams,
    /// Clusters in assembly order; noise points appear in none of them
    pub clusters: Vec<Cluster>,
    /// Point indices of the input, grouped by type
    pub classification: Classification,
}

impl DbscanModel {
    pub fn n_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Number of members in each cluster, in cluster order
    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.clusters.iter().map(Cluster::len).collect()
    }

    pub fn noise_count(&self) -> usize {
        self.classification.noise.len()
    }

    /// Centroid of every cluster, in cluster order
    pub fn centroids(&self) -> crate::Result<Vec<FeatureVector>> {
        self.clusters.iter().map(Cluster::centroid).collect()
    }
}

/// Cluster `points` with DBSCAN
///
/// Cluster ids are sequential from 0 within this run.
///
/// # Arguments
/// * `points` - Points to cluster, all sharing one schema
/// * `params` - Radius, core threshold, and the neighbor, closure, and border policies
///
/// # Returns
/// * Fitted `DbscanModel` with clusters and the per-point classification
pub fn fit_dbscan(points: &[FeatureVector], params: &DbscanParams) -> crate::Result<DbscanModel> {
    validate_radius(params.radius)?;
    if let Some(first) = points.first() {
        if points.iter().any(|p| p.schema() != first.schema()) {
            anyhow::bail!("all points of a run must share one schema");
        }
    }

    let classification = classify(points, params.radius, params.min_neighbors, params.neighbors)?;
    info!(
        "Noise points removed: {} of {}",
        classification.noise.len(),
        points.len()
    );

    let core: Vec<&FeatureVector> = classification.core.iter().map(|&i| &points[i]).collect();
    let graph = ReachabilityGraph::build_closed(&core, params.radius, params.closure);
    debug!(core = core.len(), closure = ?params.closure, "built reachability graph");

    let mut ids = ClusterIds::new();
    let mut clusters = assemble_core(&core, &graph, &mut ids)?;

    let border: Vec<&FeatureVector> = classification.border.iter().map(|&i| &points[i]).collect();
    let attached = assign_border(&mut clusters, &border, params.border);
    debug!(attached, policy = ?params.border, "assigned border points");

    Ok(DbscanModel {
        params: *params,
        clusters,
        classification,
    })
}
