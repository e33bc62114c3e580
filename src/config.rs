//! Run configuration: optional TOML file merged under command-line values

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::assemble::BorderPolicy;
use crate::classify::NeighborPolicy;
use crate::data::LoadOptions;
use crate::model::DbscanParams;
use crate::reachability::ClosurePolicy;
use crate::report::ReportStyle;
use crate::schema::SchemaKind;

/// Settings read from a TOML file; every key is optional
///
/// ```toml
/// input = "portfolio.txt"
/// schema = "portfolio"
/// radius = 1.2
/// min_neighbors = 3
/// border = "nearest"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<PathBuf>,
    pub schema: Option<SchemaKind>,
    pub radius: Option<f32>,
    pub min_neighbors: Option<usize>,
    pub neighbors: Option<NeighborPolicy>,
    pub closure: Option<ClosurePolicy>,
    pub border: Option<BorderPolicy>,
    pub format: Option<ReportStyle>,
    pub standardize: Option<bool>,
    pub log_transform: Option<bool>,
    pub delimiter: Option<char>,
    pub tune: Option<usize>,
    pub plot: Option<String>,
}

impl FileConfig {
    pub fn from_toml(text: &str) -> crate::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub input: PathBuf,
    pub load: LoadOptions,
    /// Clustering parameters; `None` when only tuning output was requested
    pub params: Option<DbscanParams>,
    /// Upper bound of k for k-distance tuning output
    pub tune: Option<usize>,
    pub style: ReportStyle,
    /// Base path for PNG charts
    pub plot: Option<String>,
}

/// Convert a delimiter character to the single byte the reader needs
pub fn delimiter_byte(delimiter: char) -> crate::Result<u8> {
    if !delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character, got {:?}", delimiter);
    }
    Ok(delimiter as u8)
}
