//! Loading delimited datasets into feature vectors

use std::io;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use crate::cluster::Cluster;
use crate::point::FeatureVector;
use crate::schema::Schema;
use crate::standardize::Standardizer;

/// Numeric value that marks a field as missing in the dataset files
pub const MISSING_SENTINEL: f32 = 9999.99;

/// Values closer than this to [`MISSING_SENTINEL`] are treated as missing
pub const SENTINEL_TOLERANCE: f32 = 1.0;

/// How a dataset file is read and prepared
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub schema: Schema,
    /// Column delimiter; defaults to the schema's usual delimiter
    pub delimiter: Option<u8>,
    /// Standardize fields; defaults to the schema's usual choice
    pub standardize: Option<bool>,
    /// Apply `log2(x + 1)` to every value before standardizing
    pub log_transform: bool,
}

impl LoadOptions {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            delimiter: None,
            standardize: None,
            log_transform: false,
        }
    }

    fn delimiter(&self) -> u8 {
        self.delimiter.unwrap_or_else(|| self.schema.default_delimiter())
    }

    fn standardize(&self) -> bool {
        self.standardize
            .unwrap_or_else(|| self.schema.standardize_by_default())
    }
}

/// Points ready for clustering plus what is needed to undo their preparation
#[derive(Debug)]
pub struct Dataset {
    pub schema: Schema,
    /// Values as read from the file
    pub raw_points: Vec<FeatureVector>,
    /// Log-transformed and/or standardized values used for clustering
    pub points: Vec<FeatureVector>,
    /// Fitted standardizer, when standardization is enabled
    pub standardizer: Option<Standardizer>,
    pub log_transformed: bool,
}

impl Dataset {
    /// Prepare already-parsed points according to `options`
    pub fn from_points(raw_points: Vec<FeatureVector>, options: &LoadOptions) -> crate::Result<Self> {
        let mut points = raw_points.clone();
        if options.log_transform {
            points.iter_mut().for_each(FeatureVector::to_log);
        }

        let standardizer = if options.standardize() {
            let standardizer = Standardizer::fit(&points, &options.schema)?;
            points = standardizer.transform(&points)?;
            Some(standardizer)
        } else {
            None
        };

        Ok(Self {
            schema: options.schema.clone(),
            raw_points,
            points,
            standardizer,
            log_transformed: options.log_transform,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Map cluster members back to the units of the input file
    pub fn restore_units(&self, clusters: &mut [Cluster]) -> crate::Result<()> {
        if let Some(standardizer) = &self.standardizer {
            standardizer.inverse_transform_clusters(clusters)?;
        }
        if self.log_transformed {
            for cluster in clusters.iter_mut() {
                cluster.members_mut().iter_mut().for_each(FeatureVector::from_log);
            }
        }
        Ok(())
    }
}

/// Read a dataset file and prepare it for clustering
///
/// The first line is a header and is discarded. An unreadable file aborts
/// the load; malformed values only mark their field missing.
///
/// # Arguments
/// * `path` - Path to the delimited dataset file
/// * `options` - Schema, delimiter, and preparation switches
///
/// # Returns
/// * `Dataset` with raw points, prepared points, and the fitted standardizer
pub fn load_dataset(path: impl AsRef<Path>, options: &LoadOptions) -> crate::Result<Dataset> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open dataset {}", path.display()))?;
    let raw_points = read_points(file, options)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    debug!(points = raw_points.len(), path = %path.display(), "loaded dataset");
    Dataset::from_points(raw_points, options)
}

/// Parse records from any reader; the first line is a header
pub fn read_points<R: io::Read>(reader: R, options: &LoadOptions) -> crate::Result<Vec<FeatureVector>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter())
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let schema = &options.schema;
    let skip = usize::from(schema.has_row_label());
    let mut points = Vec::new();

    // byte records: a token that is not UTF-8 is just another malformed value
    for (line, record) in reader.byte_records().enumerate() {
        let record = record?;
        if record.iter().all(<[u8]>::is_empty) {
            continue;
        }
        let tokens: Vec<&[u8]> = record.iter().skip(skip).collect();
        if tokens.len() > schema.len() {
            warn!(
                line = line + 2,
                extra = tokens.len() - schema.len(),
                "ignoring extra columns"
            );
        }
        let mut values: Vec<Option<f32>> = tokens
            .iter()
            .take(schema.len())
            .map(|t| std::str::from_utf8(t).ok().and_then(parse_value))
            .collect();
        values.resize(schema.len(), None);
        points.push(FeatureVector::from_values(schema, values)?);
    }

    Ok(points)
}

/// Parse one token; non-numeric tokens and the sentinel are missing
pub fn parse_value(token: &str) -> Option<f32> {
    let value: f32 = token.trim().parse().ok()?;
    if !value.is_finite() || (value - MISSING_SENTINEL).abs() < SENTINEL_TOLERANCE {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_generic_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id X Y").unwrap();
        writeln!(file, "1 0 0").unwrap();
        writeln!(file, "2 1.5 abc").unwrap();
        writeln!(file, "3 9999.99 2").unwrap();
        writeln!(file, "4 7").unwrap();
        file
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("1.25"), Some(1.25));
        assert_eq!(parse_value(" -3 "), Some(-3.0));
        assert_eq!(parse_value("9999.99"), None);
        assert_eq!(parse_value("9999.5"), None);
        assert_eq!(parse_value("9998.9"), Some(9998.9));
        assert_eq!(parse_value("n/a"), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
    }

    #[test]
    fn test_load_generic_dataset() {
        let file = create_generic_file();
        let options = LoadOptions::new(Schema::generic());
        let dataset = load_dataset(file.path(), &options).unwrap();

        assert_eq!(dataset.len(), 4);
        assert!(dataset.standardizer.is_none());
        let p = &dataset.points;
        assert_eq!(p[0].values(), &[Some(0.0), Some(0.0)]);
        assert_eq!(p[1].values(), &[Some(1.5), None]);
        assert_eq!(p[2].values(), &[None, Some(2.0)]);
        assert_eq!(p[3].values(), &[Some(7.0), None]);
    }

    #[test]
    fn test_load_tab_separated_portfolio_row() {
        let schema = Schema::portfolio();
        let header = schema.fields().join("\t");
        let row: Vec<String> = (1..=15).map(|v| v.to_string()).collect();
        let input = format!("{}\n{}\n", header, row.join("\t"));

        let mut options = LoadOptions::new(schema);
        options.standardize = Some(false);
        let points = read_points(input.as_bytes(), &options).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].get("Minnesota Credits"), Some(1.0));
        assert_eq!(points[0].get("Writing Credits"), Some(15.0));
    }

    #[test]
    fn test_invalid_utf8_token_is_missing() {
        let input: &[u8] = b"id X Y\na 1 2\nb 3 \xff\xfe\nc 5 6\n";
        let points = read_points(input, &LoadOptions::new(Schema::generic())).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].values(), &[Some(3.0), None]);
        assert_eq!(points[2].values(), &[Some(5.0), Some(6.0)]);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let mut options = LoadOptions::new(Schema::generic());
        options.delimiter = Some(b',');
        let points = read_points("id,X,Y\na,1,2,3,4\n".as_bytes(), &options).unwrap();
        assert_eq!(points[0].values(), &[Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_standardize_and_restore() {
        let schema = Schema::generic();
        let raw = vec![
            FeatureVector::from_present(&schema, &[1.0, 10.0]).unwrap(),
            FeatureVector::from_present(&schema, &[3.0, 30.0]).unwrap(),
        ];
        let mut options = LoadOptions::new(schema);
        options.standardize = Some(true);
        options.log_transform = true;
        let dataset = Dataset::from_points(raw.clone(), &options).unwrap();

        assert!(dataset.standardizer.is_some());
        assert!((dataset.points[0].get("X").unwrap() + 1.0).abs() < 1e-6);
        assert_eq!(dataset.raw_points, raw);

        let mut clusters = vec![Cluster::from_members(
            crate::cluster::ClusterId(0),
            dataset.points.clone(),
        )];
        dataset.restore_units(&mut clusters).unwrap();
        for (restored, original) in clusters[0].members().iter().zip(&raw) {
            for field in ["X", "Y"] {
                let diff = restored.get(field).unwrap() - original.get(field).unwrap();
                assert!(diff.abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let options = LoadOptions::new(Schema::generic());
        let result = load_dataset("/nonexistent/dbscan-input.txt", &options);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("failed to open dataset"));
    }
}
