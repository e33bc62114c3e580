//! Per-field z-score standardization with an exact inverse

use crate::cluster::Cluster;
use crate::point::FeatureVector;
use crate::schema::Schema;

/// Mean and population standard deviation of one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldStats {
    pub mean: f32,
    pub std_dev: f32,
}

impl FieldStats {
    /// Z-score of `value`; a zero-variance field maps everything to 0
    pub fn standardize(&self, value: f32) -> f32 {
        if self.std_dev > 0.0 {
            (value - self.mean) / self.std_dev
        } else {
            0.0
        }
    }

    pub fn unstandardize(&self, value: f32) -> f32 {
        value * self.std_dev + self.mean
    }
}

/// Fitted standardization statistics for every field of a schema
///
/// The statistics are computed once and reused unchanged to reverse the
/// transform when reporting.
#[derive(Debug, Clone)]
pub struct Standardizer {
    schema: Schema,
    stats: Vec<FieldStats>,
}

impl Standardizer {
    /// Compute mean and population standard deviation of every field over
    /// the non-missing values of `points`
    ///
    /// A field with no present values gets mean 0 and standard deviation 0.
    pub fn fit(points: &[FeatureVector], schema: &Schema) -> crate::Result<Self> {
        if let Some(point) = points.iter().find(|p| p.schema() != schema) {
            anyhow::bail!(
                "cannot fit standardizer: point schema {} does not match {}",
                point.schema().kind(),
                schema.kind()
            );
        }

        let stats = (0..schema.len())
            .map(|field| {
                let present: Vec<f64> = points
                    .iter()
                    .filter_map(|p| p.value_at(field))
                    .map(f64::from)
                    .collect();
                if present.is_empty() {
                    return FieldStats {
                        mean: 0.0,
                        std_dev: 0.0,
                    };
                }
                let n = present.len() as f64;
                let mean = present.iter().sum::<f64>() / n;
                let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                FieldStats {
                    mean: mean as f32,
                    std_dev: variance.sqrt() as f32,
                }
            })
            .collect();

        Ok(Self {
            schema: schema.clone(),
            stats,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Statistics for `field`, if it is part of the fitted schema
    pub fn stats(&self, field: &str) -> Option<FieldStats> {
        self.schema.index_of(field).map(|i| self.stats[i])
    }

    /// Standardize `points` into new vectors
    ///
    /// Missing values become the literal 0, indistinguishable afterwards from
    /// a value exactly at the mean.
    pub fn transform(&self, points: &[FeatureVector]) -> crate::Result<Vec<FeatureVector>> {
        points
            .iter()
            .map(|point| {
                self.check_schema(point)?;
                let values = point
                    .values()
                    .iter()
                    .zip(&self.stats)
                    .map(|(value, stats)| Some(value.map_or(0.0, |v| stats.standardize(v))))
                    .collect();
                FeatureVector::from_values(&self.schema, values)
            })
            .collect()
    }

    /// Map a standardized point back to original units in place
    pub fn inverse_transform(&self, point: &mut FeatureVector) -> crate::Result<()> {
        self.check_schema(point)?;
        for (i, stats) in self.stats.iter().enumerate() {
            if let Some(value) = point.value_at(i) {
                point.set_at(i, Some(stats.unstandardize(value)));
            }
        }
        Ok(())
    }

    /// Inverse-transform every member of every cluster
    pub fn inverse_transform_clusters(&self, clusters: &mut [Cluster]) -> crate::Result<()> {
        for cluster in clusters.iter_mut() {
            for member in cluster.members_mut() {
                self.inverse_transform(member)?;
            }
        }
        Ok(())
    }

    fn check_schema(&self, point: &FeatureVector) -> crate::Result<()> {
        if point.schema() != &self.schema {
            anyhow::bail!(
                "point schema {} does not match standardizer schema {}",
                point.schema().kind(),
                self.schema.kind()
            );
        }
        Ok(())
    }
}
