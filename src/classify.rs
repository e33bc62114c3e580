//! Core / border / noise classification by neighborhood density

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;
use tracing::debug;

use crate::point::FeatureVector;

/// Role of a point within one clustering run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointType {
    /// More than `min_neighbors` other points strictly within the radius
    Core,
    /// Not core, but strictly within the radius of some core point
    Border,
    /// Neither; excluded from every cluster
    Noise,
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointType::Core => write!(f, "core"),
            PointType::Border => write!(f, "border"),
            PointType::Noise => write!(f, "noise"),
        }
    }
}

/// Point indices grouped by [`PointType`], each list in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub core: Vec<usize>,
    pub border: Vec<usize>,
    pub noise: Vec<usize>,
}

impl Classification {
    /// Type of the point at `index`, `None` if it was not classified
    pub fn point_type(&self, index: usize) -> Option<PointType> {
        if self.core.contains(&index) {
            Some(PointType::Core)
        } else if self.border.contains(&index) {
            Some(PointType::Border)
        } else if self.noise.contains(&index) {
            Some(PointType::Noise)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.core.len() + self.border.len() + self.noise.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which other points may count toward a point's neighborhood
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborPolicy {
    /// Skip every point equal in value to the one being counted, so exact
    /// duplicates never make each other dense
    #[default]
    Distinct,
    /// Skip only the point itself; duplicates count as neighbors
    Indexed,
}

impl NeighborPolicy {
    fn excludes(&self, i: usize, point: &FeatureVector, j: usize, other: &FeatureVector) -> bool {
        match self {
            NeighborPolicy::Distinct => point == other,
            NeighborPolicy::Indexed => i == j,
        }
    }
}

/// Reject radii that can never form a neighborhood
pub fn validate_radius(radius: f32) -> crate::Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        anyhow::bail!("radius must be a finite number greater than 0, got {}", radius);
    }
    Ok(())
}

/// Classify every point of `points`
///
/// A point is core when strictly more than `min_neighbors` other points lie
/// strictly closer than `radius`. A non-core point strictly closer than
/// `radius` to any core point is border; the rest are noise. Quadratic in
/// the number of points.
///
/// # Arguments
/// * `points` - Points of one run, all sharing a schema
/// * `radius` - Neighborhood radius, finite and greater than 0
/// * `min_neighbors` - Core threshold; the count must exceed it
/// * `policy` - Which other points are eligible to be counted
///
/// # Returns
/// * Point indices grouped by type, each list in input order
pub fn classify(
    points: &[FeatureVector],
    radius: f32,
    min_neighbors: usize,
    policy: NeighborPolicy,
) -> crate::Result<Classification> {
    validate_radius(radius)?;

    let mut classification = Classification::default();
    let mut tentative_noise = Vec::new();

    for (i, point) in points.iter().enumerate() {
        let neighbors = points
            .iter()
            .enumerate()
            .filter(|&(j, other)| {
                !policy.excludes(i, point, j, other) && point.distance(other) < radius
            })
            .count();
        if neighbors > min_neighbors {
            classification.core.push(i);
        } else {
            tentative_noise.push(i);
        }
    }

    for i in tentative_noise {
        let near_core = classification
            .core
            .iter()
            .any(|&c| points[i].distance(&points[c]) < radius);
        if near_core {
            classification.border.push(i);
        } else {
            classification.noise.push(i);
        }
    }

    debug!(
        core = classification.core.len(),
        border = classification.border.len(),
        noise = classification.noise.len(),
        "classified points"
    );

    Ok(classification)
}
