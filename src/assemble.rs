//! Cluster assembly from reachability and border-point assignment

use clap::ValueEnum;
use serde::Deserialize;
use tracing::debug;

use crate::cluster::{Cluster, ClusterIds};
use crate::point::FeatureVector;
use crate::reachability::ReachabilityGraph;

/// Rule for attaching a border point to one of the clusters
///
/// Both rules score a cluster by its closest member to the border point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderPolicy {
    /// Cluster with the smallest score; the first such cluster wins ties
    #[default]
    Nearest,
    /// Cluster with the largest score; the first such cluster wins ties.
    /// Kept for compatibility with results of the legacy scanner.
    Farthest,
}

impl BorderPolicy {
    /// Index of the chosen cluster, `None` when there are no clusters
    pub fn select(&self, clusters: &[Cluster], point: &FeatureVector) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, cluster) in clusters.iter().enumerate() {
            let Some(distance) = cluster.distance_to_point(point) else {
                continue;
            };
            let better = match (best, self) {
                (None, _) => true,
                (Some((_, current)), BorderPolicy::Nearest) => distance < current,
                (Some((_, current)), BorderPolicy::Farthest) => distance > current,
            };
            if better {
                best = Some((i, distance));
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Group core points into clusters following `graph`
///
/// Core indices are visited in order; each one not yet consumed seeds a new
/// cluster holding itself and every unconsumed core point reachable from it.
/// Every core point ends up in exactly one cluster.
pub fn assemble_core(
    core: &[&FeatureVector],
    graph: &ReachabilityGraph,
    ids: &mut ClusterIds,
) -> crate::Result<Vec<Cluster>> {
    if core.len() != graph.len() {
        anyhow::bail!(
            "reachability graph covers {} points but {} core points were given",
            graph.len(),
            core.len()
        );
    }

    let mut consumed = vec![false; core.len()];
    let mut clusters = Vec::new();

    for seed in 0..core.len() {
        if consumed[seed] {
            continue;
        }
        consumed[seed] = true;
        let mut cluster = Cluster::with_point(ids.next_id(), core[seed].clone());
        for other in 0..core.len() {
            if !consumed[other] && graph.is_reachable(seed, other) {
                cluster.add(core[other].clone());
                consumed[other] = true;
            }
        }
        debug!(cluster = %cluster.id(), size = cluster.len(), "assembled core cluster");
        clusters.push(cluster);
    }

    Ok(clusters)
}

/// Attach each border point to the cluster chosen by `policy`
///
/// All choices are made against the core-only clusters, then the points are
/// appended. Returns the number of points attached.
pub fn assign_border(
    clusters: &mut [Cluster],
    border: &[&FeatureVector],
    policy: BorderPolicy,
) -> usize {
    let choices: Vec<(usize, &FeatureVector)> = border
        .iter()
        .filter_map(|&point| policy.select(clusters, point).map(|i| (i, point)))
        .collect();

    let attached = choices.len();
    for (i, point) in choices {
        clusters[i].add(point.clone());
    }
    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterId;
    use crate::reachability::ClosurePolicy;
    use crate::schema::Schema;

    fn xy(x: f32, y: f32) -> FeatureVector {
        FeatureVector::from_present(&Schema::generic(), &[x, y]).unwrap()
    }

    #[test]
    fn test_every_core_point_in_exactly_one_cluster() {
        let points: Vec<FeatureVector> = [0.0, 1.0, 2.0, 3.0, 10.0, 11.0]
            .iter()
            .map(|&x| xy(x, 0.0))
            .collect();
        let core: Vec<&FeatureVector> = points.iter().collect();

        for policy in [ClosurePolicy::Transitive, ClosurePolicy::Direct] {
            let graph = ReachabilityGraph::build_closed(&core, 1.5, policy);
            let clusters = assemble_core(&core, &graph, &mut ClusterIds::new()).unwrap();

            let total: usize = clusters.iter().map(Cluster::len).sum();
            assert_eq!(total, points.len());
            assert!(clusters.iter().all(|c| !c.is_empty()));
            for point in &points {
                let holders = clusters.iter().filter(|c| c.members().contains(point)).count();
                assert_eq!(holders, 1);
            }
        }
    }

    #[test]
    fn test_transitive_versus_direct_assembly() {
        let points: Vec<FeatureVector> = [0.0, 1.0, 2.0, 3.0].iter().map(|&x| xy(x, 0.0)).collect();
        let core: Vec<&FeatureVector> = points.iter().collect();

        let transitive = ReachabilityGraph::build_closed(&core, 1.5, ClosurePolicy::Transitive);
        let clusters = assemble_core(&core, &transitive, &mut ClusterIds::new()).unwrap();
        assert_eq!(clusters.len(), 1);

        // seed 0 takes 1; seed 2 takes 3
        let direct = ReachabilityGraph::build_closed(&core, 1.5, ClosurePolicy::Direct);
        let clusters = assemble_core(&core, &direct, &mut ClusterIds::new()).unwrap();
        let sizes: Vec<usize> = clusters.iter().map(Cluster::len).collect();
        assert_eq!(sizes, vec![2, 2]);
        assert_eq!(clusters[0].id(), ClusterId(0));
        assert_eq!(clusters[1].id(), ClusterId(1));
    }

    #[test]
    fn test_isolated_core_point_forms_its_own_cluster() {
        let points = vec![xy(0.0, 0.0), xy(100.0, 0.0)];
        let core: Vec<&FeatureVector> = points.iter().collect();
        let graph = ReachabilityGraph::build_closed(&core, 1.0, ClosurePolicy::Transitive);
        let clusters = assemble_core(&core, &graph, &mut ClusterIds::new()).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[1].members(), &[xy(100.0, 0.0)]);
    }

    #[test]
    fn test_graph_size_mismatch() {
        let points = vec![xy(0.0, 0.0)];
        let core: Vec<&FeatureVector> = points.iter().collect();
        let graph = ReachabilityGraph::build(&[], 1.0);
        assert!(assemble_core(&core, &graph, &mut ClusterIds::new()).is_err());
    }

    #[test]
    fn test_border_policies_disagree() {
        let mut ids = ClusterIds::new();
        let near = Cluster::with_point(ids.next_id(), xy(0.0, 0.0));
        let far = Cluster::with_point(ids.next_id(), xy(5.0, 0.0));
        let clusters = vec![near, far];
        let border = xy(1.0, 0.0);

        assert_eq!(BorderPolicy::Nearest.select(&clusters, &border), Some(0));
        assert_eq!(BorderPolicy::Farthest.select(&clusters, &border), Some(1));
        assert_eq!(BorderPolicy::Nearest.select(&[], &border), None);
    }

    #[test]
    fn test_border_ties_go_to_first_cluster() {
        let mut ids = ClusterIds::new();
        let clusters = vec![
            Cluster::with_point(ids.next_id(), xy(-1.0, 0.0)),
            Cluster::with_point(ids.next_id(), xy(1.0, 0.0)),
        ];
        let border = xy(0.0, 0.0);
        assert_eq!(BorderPolicy::Nearest.select(&clusters, &border), Some(0));
        assert_eq!(BorderPolicy::Farthest.select(&clusters, &border), Some(0));
    }

    #[test]
    fn test_assign_border_appends_points() {
        let mut ids = ClusterIds::new();
        let mut clusters = vec![
            Cluster::with_point(ids.next_id(), xy(0.0, 0.0)),
            Cluster::with_point(ids.next_id(), xy(5.0, 0.0)),
        ];
        let a = xy(0.8, 0.0);
        let b = xy(4.5, 0.0);

        let attached = assign_border(&mut clusters, &[&a, &b], BorderPolicy::Nearest);
        assert_eq!(attached, 2);
        assert_eq!(clusters[0].members(), &[xy(0.0, 0.0), a]);
        assert_eq!(clusters[1].members(), &[xy(5.0, 0.0), b]);

        let mut none: Vec<Cluster> = Vec::new();
        assert_eq!(assign_border(&mut none, &[&xy(0.0, 0.0)], BorderPolicy::Nearest), 0);
    }
}
