//! Text reports: cluster sizes and centroids, k-distance listings

use std::fmt::Write;

use clap::ValueEnum;
use serde::Deserialize;

use crate::cluster::Cluster;
use crate::tuning::KDistanceCurve;

/// Layout of centroid lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStyle {
    /// `field:value` pairs, tab separated
    #[default]
    Pairs,
    /// Values only, tab separated, for pasting into a spreadsheet
    Table,
}

/// Render cluster sizes (1-based), the noise count, then one centroid per line
pub fn render_clusters(clusters: &[Cluster], noise: usize, style: ReportStyle) -> crate::Result<String> {
    let mut out = String::new();
    for (i, cluster) in clusters.iter().enumerate() {
        writeln!(out, "Cluster {}: {}", i + 1, cluster.len())?;
    }
    writeln!(out, "Noise points: {}", noise)?;

    for cluster in clusters {
        let centroid = cluster.centroid()?;
        let line = match style {
            ReportStyle::Pairs => centroid.to_string(),
            ReportStyle::Table => centroid.to_table_row(),
        };
        writeln!(out, "{}", line)?;
    }
    Ok(out)
}

/// Render each curve as `k=<k>` followed by its tab-prefixed distances
pub fn render_k_distances(curves: &[KDistanceCurve]) -> String {
    let mut out = String::new();
    for curve in curves {
        out.push_str(&format!("k={}\nDistances=\n", curve.k));
        for distance in &curve.distances {
            out.push_str(&format!("\t{}", distance));
        }
        out.push('\n');
    }
    out
}
