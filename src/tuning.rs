//! Sorted k-distance curves for choosing a clustering radius

use crate::point::FeatureVector;

/// Sorted distances from every point to its k-th nearest other point
#[derive(Debug, Clone, PartialEq)]
pub struct KDistanceCurve {
    pub k: usize,
    pub distances: Vec<f32>,
}

/// Distance from each point to its `k`-th nearest neighbor, sorted ascending
///
/// `k` must lie in `1..=points.len() - 1`.
pub fn k_distances(points: &[FeatureVector], k: usize) -> crate::Result<Vec<f32>> {
    if k == 0 || k >= points.len() {
        anyhow::bail!(
            "k must be between 1 and {} for {} points, got {}",
            points.len().saturating_sub(1),
            points.len(),
            k
        );
    }

    let mut result: Vec<f32> = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let mut distances: Vec<f32> = points
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, other)| point.distance(other))
                .collect();
            distances.sort_by(f32::total_cmp);
            distances[k - 1]
        })
        .collect();
    result.sort_by(f32::total_cmp);
    Ok(result)
}

/// Curves for every k in `1..=k_max`
pub fn k_distance_curves(points: &[FeatureVector], k_max: usize) -> crate::Result<Vec<KDistanceCurve>> {
    (1..=k_max)
        .map(|k| {
            Ok(KDistanceCurve {
                k,
                distances: k_distances(points, k)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    fn line(xs: &[f32]) -> Vec<FeatureVector> {
        let schema = Schema::generic();
        xs.iter()
            .map(|&x| FeatureVector::from_present(&schema, &[x, 0.0]).unwrap())
            .collect()
    }

    #[test]
    fn test_collinear_points_k1() {
        let distances = k_distances(&line(&[0.0, 1.0, 2.0]), 1).unwrap();
        assert_eq!(distances, vec![1.0, 1.0, 1.0]);
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_k2_is_sorted() {
        let distances = k_distances(&line(&[0.0, 1.0, 2.0, 7.0]), 2).unwrap();
        assert_eq!(distances, vec![1.0, 2.0, 2.0, 6.0]);
    }

    #[test]
    fn test_k_out_of_range() {
        let points = line(&[0.0, 1.0, 2.0]);
        assert!(k_distances(&points, 0).is_err());
        assert!(k_distances(&points, 3).is_err());
        assert!(k_distances(&[], 1).is_err());
    }

    #[test]
    fn test_curves() {
        let curves = k_distance_curves(&line(&[0.0, 1.0, 3.0]), 2).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].k, 1);
        assert_eq!(curves[1].distances, vec![2.0, 3.0, 3.0]);
        assert!(k_distance_curves(&line(&[0.0, 1.0]), 2).is_err());
    }
}
