//! Clusters of feature vectors and the per-run identifier generator

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::point::FeatureVector;

/// Identifier of a cluster, unique within one clustering run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(pub u64);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential cluster identifiers, scoped to whoever owns the generator
#[derive(Debug, Default)]
pub struct ClusterIds {
    next: u64,
}

impl ClusterIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> ClusterId {
        let id = ClusterId(self.next);
        self.next += 1;
        id
    }
}

/// A group of points with a derived centroid
///
/// Two clusters are equal iff they carry the same [`ClusterId`]; member
/// order is insertion order and carries no meaning.
#[derive(Debug, Clone)]
pub struct Cluster {
    id: ClusterId,
    members: Vec<FeatureVector>,
}

impl Cluster {
    pub fn new(id: ClusterId) -> Self {
        Self {
            id,
            members: Vec::new(),
        }
    }

    pub fn with_point(id: ClusterId, point: FeatureVector) -> Self {
        Self {
            id,
            members: vec![point],
        }
    }

    pub fn from_members(id: ClusterId, members: Vec<FeatureVector>) -> Self {
        Self { id, members }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn members(&self) -> &[FeatureVector] {
        &self.members
    }

    pub(crate) fn members_mut(&mut self) -> &mut [FeatureVector] {
        &mut self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn add(&mut self, point: FeatureVector) {
        self.members.push(point);
    }

    /// Elementwise mean of the members
    ///
    /// Each field averages only the members where it is present; a field
    /// missing on every member stays missing. Meaningful mostly after
    /// standardization, which leaves no missing values.
    pub fn centroid(&self) -> crate::Result<FeatureVector> {
        let Some(first) = self.members.first() else {
            anyhow::bail!("cluster {} has no members", self.id);
        };
        let schema = first.schema();
        let values = (0..schema.len())
            .map(|field| {
                let (total, count) = self
                    .members
                    .iter()
                    .filter_map(|m| m.value_at(field))
                    .fold((0.0f64, 0usize), |(total, count), v| (total + f64::from(v), count + 1));
                (count > 0).then(|| (total / count as f64) as f32)
            })
            .collect();
        FeatureVector::from_values(schema, values)
    }

    /// Smallest distance from `point` to any member, `None` for an empty cluster
    pub fn distance_to_point(&self, point: &FeatureVector) -> Option<f32> {
        self.members
            .iter()
            .map(|m| m.distance(point))
            .fold(None, |closest, d| match closest {
                Some(c) if c <= d => Some(c),
                _ => Some(d),
            })
    }

    /// Distance between the centroids of two clusters
    pub fn distance_to_cluster(&self, other: &Cluster) -> crate::Result<f32> {
        Ok(self.centroid()?.distance(&other.centroid()?))
    }

    /// New cluster holding the members of both, under a fresh id
    pub fn merge(&self, other: &Cluster, ids: &mut ClusterIds) -> Cluster {
        let members = self
            .members
            .iter()
            .chain(other.members.iter())
            .cloned()
            .collect();
        Cluster::from_members(ids.next_id(), members)
    }
}

impl PartialEq for Cluster {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Cluster {}

impl Hash for Cluster {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.centroid() {
            Ok(center) => write!(f, "{}", center),
            Err(_) => write!(f, "<empty cluster {}>", self.id),
        }
    }
}
