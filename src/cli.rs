//! Command-line interface definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::assemble::BorderPolicy;
use crate::classify::NeighborPolicy;
use crate::config::{delimiter_byte, FileConfig, RunSettings};
use crate::data::LoadOptions;
use crate::model::DbscanParams;
use crate::reachability::ClosurePolicy;
use crate::report::ReportStyle;
use crate::schema::{Schema, SchemaKind};

/// Density-based (DBSCAN) clustering of tabular feature vectors
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input dataset (header line first)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Field schema of the dataset [default: generic]
    #[arg(short, long, value_enum)]
    pub schema: Option<SchemaKind>,

    /// Neighborhood radius
    #[arg(short, long)]
    pub radius: Option<f32>,

    /// A point is core with strictly more than this many neighbors
    #[arg(short, long)]
    pub min_neighbors: Option<usize>,

    /// Print sorted k-distance curves for k = 1..=K to help pick a radius
    #[arg(short, long, value_name = "K")]
    pub tune: Option<usize>,

    /// Which points count as neighbors: `distinct` skips exact duplicates,
    /// `indexed` skips only the point itself [default: distinct]
    #[arg(long, value_enum)]
    pub neighbors: Option<NeighborPolicy>,

    /// Closure of the core-point reachability relation [default: transitive]
    #[arg(long, value_enum)]
    pub closure: Option<ClosurePolicy>,

    /// Rule for attaching border points to clusters [default: nearest]
    #[arg(long, value_enum)]
    pub border: Option<BorderPolicy>,

    /// Centroid output layout [default: pairs]
    #[arg(short, long, value_enum)]
    pub format: Option<ReportStyle>,

    /// Standardize fields (defaults to on for portfolio, off for generic)
    #[arg(long)]
    pub standardize: Option<bool>,

    /// Apply log2(x + 1) to every value before clustering
    #[arg(long)]
    pub log_transform: bool,

    /// Column delimiter (defaults to tab for portfolio, space for generic)
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Write PNG charts using this path as base name
    #[arg(short, long)]
    pub plot: Option<String>,

    /// TOML file with default settings; command-line values win
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Merge command-line values over the config file, if any
    pub fn resolve(&self) -> crate::Result<RunSettings> {
        let file = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        self.resolve_with(file)
    }

    /// Merge command-line values over an already loaded config
    pub fn resolve_with(&self, file: FileConfig) -> crate::Result<RunSettings> {
        let Some(input) = self.input.clone().or(file.input) else {
            anyhow::bail!("no input dataset given (use --input or set `input` in the config)");
        };

        let kind = self.schema.or(file.schema).unwrap_or(SchemaKind::Generic);
        let mut load = LoadOptions::new(Schema::for_kind(kind)?);
        load.standardize = self.standardize.or(file.standardize);
        load.log_transform = self.log_transform || file.log_transform.unwrap_or(false);
        load.delimiter = self
            .delimiter
            .or(file.delimiter)
            .map(delimiter_byte)
            .transpose()?;

        let tune = self.tune.or(file.tune);
        let radius = self.radius.or(file.radius);
        let min_neighbors = self.min_neighbors.or(file.min_neighbors);
        let params = match (radius, min_neighbors) {
            (Some(radius), Some(min_neighbors)) => Some(
                DbscanParams::new(radius, min_neighbors)
                    .with_neighbors(self.neighbors.or(file.neighbors).unwrap_or_default())
                    .with_closure(self.closure.or(file.closure).unwrap_or_default())
                    .with_border(self.border.or(file.border).unwrap_or_default()),
            ),
            _ if tune.is_some() => None,
            _ => anyhow::bail!("both --radius and --min-neighbors are required to cluster"),
        };

        Ok(RunSettings {
            input,
            load,
            params,
            tune,
            style: self.format.or(file.format).unwrap_or_default(),
            plot: self.plot.clone().or(file.plot),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("densityforge").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_resolve_from_command_line() {
        let args = parse(&["-i", "data.txt", "-r", "1.5", "-m", "2", "--border", "farthest"]);
        let settings = args.resolve().unwrap();

        assert_eq!(settings.input, PathBuf::from("data.txt"));
        assert_eq!(settings.load.schema.kind(), SchemaKind::Generic);
        let params = settings.params.unwrap();
        assert_eq!(params.radius, 1.5);
        assert_eq!(params.min_neighbors, 2);
        assert_eq!(params.neighbors, NeighborPolicy::Distinct);
        assert_eq!(params.closure, ClosurePolicy::Transitive);
        assert_eq!(params.border, BorderPolicy::Farthest);
        assert_eq!(settings.style, ReportStyle::Pairs);
    }

    #[test]
    fn test_command_line_overrides_config() {
        let file = FileConfig::from_toml(
            r#"
            input = "portfolio.txt"
            schema = "portfolio"
            radius = 2.0
            min_neighbors = 4
            closure = "direct"
            neighbors = "indexed"
            delimiter = ","
            "#,
        )
        .unwrap();
        let args = parse(&["--radius", "0.75", "--standardize", "false"]);
        let settings = args.resolve_with(file).unwrap();

        assert_eq!(settings.input, PathBuf::from("portfolio.txt"));
        assert_eq!(settings.load.schema.kind(), SchemaKind::Portfolio);
        assert_eq!(settings.load.standardize, Some(false));
        assert_eq!(settings.load.delimiter, Some(b','));
        let params = settings.params.unwrap();
        assert_eq!(params.radius, 0.75);
        assert_eq!(params.min_neighbors, 4);
        assert_eq!(params.closure, ClosurePolicy::Direct);
        assert_eq!(params.neighbors, NeighborPolicy::Indexed);
    }

    #[test]
    fn test_tuning_only_needs_no_parameters() {
        let settings = parse(&["-i", "data.txt", "--tune", "3"]).resolve().unwrap();
        assert_eq!(settings.tune, Some(3));
        assert!(settings.params.is_none());
    }

    #[test]
    fn test_missing_required_values() {
        assert!(parse(&["-r", "1.0", "-m", "1"]).resolve().is_err());
        assert!(parse(&["-i", "data.txt", "-r", "1.0"]).resolve().is_err());
        assert!(parse(&["-i", "data.txt", "-r", "1", "-m", "1", "-d", "é"]).resolve().is_err());
    }

    #[test]
    fn test_unknown_config_key_is_rejected() {
        assert!(FileConfig::from_toml("radius = 1.0\nepsilon = 2.0\n").is_err());
    }
}
