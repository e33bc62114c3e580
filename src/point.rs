//! Feature vectors: named numeric fields with optional values

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::schema::Schema;

/// A record of optional `f32` values, one per schema field
///
/// A missing value is `None`, never zero. All vectors in a run share the
/// same [`Schema`].
#[derive(Debug, Clone)]
pub struct FeatureVector {
    schema: Schema,
    values: Vec<Option<f32>>,
}

impl FeatureVector {
    /// Create a vector with every field missing
    pub fn empty(schema: &Schema) -> Self {
        Self {
            schema: schema.clone(),
            values: vec![None; schema.len()],
        }
    }

    /// Create a vector from values given in schema order
    pub fn from_values(schema: &Schema, values: Vec<Option<f32>>) -> crate::Result<Self> {
        if values.len() != schema.len() {
            anyhow::bail!(
                "expected {} values for schema, got {}",
                schema.len(),
                values.len()
            );
        }
        Ok(Self {
            schema: schema.clone(),
            values,
        })
    }

    /// Create a vector where every field is present
    pub fn from_present(schema: &Schema, values: &[f32]) -> crate::Result<Self> {
        Self::from_values(schema, values.iter().copied().map(Some).collect())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Values in schema order
    pub fn values(&self) -> &[Option<f32>] {
        &self.values
    }

    /// Current value of `field`, `None` when missing or not in the schema
    pub fn get(&self, field: &str) -> Option<f32> {
        self.schema.index_of(field).and_then(|i| self.values[i])
    }

    /// Set `field` to `value` (`None` marks it missing)
    pub fn put(&mut self, field: &str, value: Option<f32>) -> crate::Result<()> {
        match self.schema.index_of(field) {
            Some(i) => {
                self.values[i] = value;
                Ok(())
            }
            None => anyhow::bail!("unknown field '{}'", field),
        }
    }

    pub(crate) fn value_at(&self, index: usize) -> Option<f32> {
        self.values[index]
    }

    pub(crate) fn set_at(&mut self, index: usize, value: Option<f32>) {
        self.values[index] = value;
    }

    /// Euclidean distance over the fields present in both vectors
    ///
    /// Fields missing on either side are skipped, so distances between pairs
    /// with different missing fields are not directly comparable.
    pub fn distance(&self, other: &FeatureVector) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .filter_map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some((a - b).powi(2)),
                _ => None,
            })
            .sum::<f32>()
            .sqrt()
    }

    /// Scale to unit Euclidean norm in place; a zero vector is left unchanged
    pub fn normalize(&mut self) {
        let norm = self.present().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            self.divide_all(norm);
        }
    }

    /// Replace every present value `x` with `log2(x + 1)`
    pub fn to_log(&mut self) {
        self.map_present(|x| (x + 1.0).log2());
    }

    /// Undo [`FeatureVector::to_log`]: `x` becomes `2^x - 1`
    pub fn from_log(&mut self) {
        self.map_present(|x| x.exp2() - 1.0);
    }

    /// Divide every present value by `divisor`
    pub fn divide_all(&mut self, divisor: f32) {
        self.map_present(|x| x / divisor);
    }

    /// Values in schema order for a tab-separated table row
    pub fn to_table_row(&self) -> String {
        self.values
            .iter()
            .map(|v| format!("{}\t", format_value(*v)))
            .collect()
    }

    fn present(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().flatten().copied()
    }

    fn map_present(&mut self, f: impl Fn(f32) -> f32) {
        for value in self.values.iter_mut().flatten() {
            *value = f(*value);
        }
    }
}

fn format_value(value: Option<f32>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

impl PartialEq for FeatureVector {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema && self.values == other.values
    }
}

impl Eq for FeatureVector {}

impl Hash for FeatureVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in &self.values {
            // -0.0 == 0.0, so they must hash alike
            value.map(|v| if v == 0.0 { 0u32 } else { v.to_bits() }).hash(state);
        }
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, value) in self.schema.fields().iter().zip(&self.values) {
            write!(f, "{}:{}\t", field, format_value(*value))?;
        }
        Ok(())
    }
}
