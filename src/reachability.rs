//! Reachability among core points: adjacency matrix plus closure

use clap::ValueEnum;
use ndarray::Array2;
use serde::Deserialize;

use crate::point::FeatureVector;

/// How the adjacency matrix is closed into a reachability relation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosurePolicy {
    /// Full Warshall transitive closure: chains of core points connect
    #[default]
    Transitive,
    /// Legacy update `r[i][j] = (r[j][k] && r[i][j]) || r[i][j]`, which never
    /// adds an edge; reachability is plain adjacency
    Direct,
}

/// Symmetric boolean reachability matrix over core points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityGraph {
    matrix: Array2<bool>,
}

impl ReachabilityGraph {
    /// Adjacency: `(i, j)` is set iff the two core points are strictly
    /// closer than `radius`, including `(i, i)`
    pub fn build(core: &[&FeatureVector], radius: f32) -> Self {
        let n = core.len();
        let mut matrix = Array2::from_elem((n, n), false);
        for i in 0..n {
            for j in i..n {
                if core[i].distance(core[j]) < radius {
                    matrix[[i, j]] = true;
                    matrix[[j, i]] = true;
                }
            }
        }
        Self { matrix }
    }

    /// Build and close in one step
    pub fn build_closed(core: &[&FeatureVector], radius: f32, policy: ClosurePolicy) -> Self {
        let mut graph = Self::build(core, radius);
        graph.close(policy);
        graph
    }

    /// Apply `policy` to the matrix in place
    pub fn close(&mut self, policy: ClosurePolicy) {
        let n = self.len();
        let m = &mut self.matrix;
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    m[[i, j]] = match policy {
                        ClosurePolicy::Transitive => m[[i, j]] || (m[[i, k]] && m[[k, j]]),
                        ClosurePolicy::Direct => (m[[j, k]] && m[[i, j]]) || m[[i, j]],
                    };
                }
            }
        }
    }

    pub fn is_reachable(&self, i: usize, j: usize) -> bool {
        self.matrix[[i, j]]
    }

    /// Number of core points in the graph
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn matrix(&self) -> &Array2<bool> {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn chain() -> Vec<FeatureVector> {
        let schema = Schema::generic();
        [0.0, 1.0, 2.0, 3.0, 10.0]
            .iter()
            .map(|&x| FeatureVector::from_present(&schema, &[x, 0.0]).unwrap())
            .collect()
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let points = chain();
        let core: Vec<&FeatureVector> = points.iter().collect();
        let graph = ReachabilityGraph::build(&core, 1.5);

        assert_eq!(graph.len(), 5);
        for i in 0..5 {
            assert!(graph.is_reachable(i, i));
            for j in 0..5 {
                assert_eq!(graph.is_reachable(i, j), graph.is_reachable(j, i));
            }
        }
        assert!(graph.is_reachable(0, 1));
        assert!(!graph.is_reachable(0, 2));
    }

    #[test]
    fn test_transitive_closure_links_chains() {
        let points = chain();
        let core: Vec<&FeatureVector> = points.iter().collect();
        let graph = ReachabilityGraph::build_closed(&core, 1.5, ClosurePolicy::Transitive);

        assert!(graph.is_reachable(0, 3));
        assert!(graph.is_reachable(3, 0));
        assert!(!graph.is_reachable(0, 4));
        assert!(!graph.is_reachable(4, 2));
    }

    #[test]
    fn test_direct_closure_keeps_adjacency() {
        let points = chain();
        let core: Vec<&FeatureVector> = points.iter().collect();
        let adjacency = ReachabilityGraph::build(&core, 1.5);
        let closed = ReachabilityGraph::build_closed(&core, 1.5, ClosurePolicy::Direct);

        assert_eq!(adjacency, closed);
        assert!(!closed.is_reachable(0, 2));
    }

    #[test]
    fn test_empty_graph() {
        let graph = ReachabilityGraph::build_closed(&[], 1.0, ClosurePolicy::Transitive);
        assert!(graph.is_empty());
    }
}
