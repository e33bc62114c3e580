//! DensityForge: DBSCAN clustering CLI
//!
//! Loads a dataset, optionally prints k-distance curves for radius tuning,
//! clusters the points, and reports cluster sizes and centroids.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use densityforge::config::RunSettings;
use densityforge::report::{render_clusters, render_k_distances};
use densityforge::{fit_dbscan, k_distance_curves, load_dataset, viz, Args, Dataset, DbscanParams, FeatureVector};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings = args.resolve()?;
    let start_time = Instant::now();

    let dataset = load_dataset(&settings.input, &settings.load)?;
    info!(
        points = dataset.len(),
        schema = %settings.load.schema.kind(),
        standardized = dataset.standardizer.is_some(),
        "dataset loaded"
    );

    if let Some(k_max) = settings.tune {
        run_tuning(&dataset, k_max, &settings)?;
    }

    if let Some(params) = &settings.params {
        run_clustering(&dataset, params, &settings)?;
    }

    debug!("total processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print sorted k-distance curves for k = 1..=k_max
fn run_tuning(dataset: &Dataset, k_max: usize, settings: &RunSettings) -> Result<()> {
    let curves = k_distance_curves(&dataset.points, k_max)?;
    print!("{}", render_k_distances(&curves));

    if let Some(base) = &settings.plot {
        let path = chart_path(base, "_kdist");
        viz::create_k_distance_chart(&curves, &path)?;
        println!("k-distance chart saved to: {}", path);
    }
    Ok(())
}

/// Cluster, restore original units, and report
fn run_clustering(dataset: &Dataset, params: &DbscanParams, settings: &RunSettings) -> Result<()> {
    let fit_start = Instant::now();
    let mut model = fit_dbscan(&dataset.points, params)?;
    info!(
        clusters = model.n_clusters(),
        noise = model.noise_count(),
        "clustering finished in {:.2}s",
        fit_start.elapsed().as_secs_f64()
    );

    dataset.restore_units(&mut model.clusters)?;
    print!(
        "{}",
        render_clusters(&model.clusters, model.noise_count(), settings.style)?
    );

    if let Some(base) = &settings.plot {
        if dataset.schema.len() == 2 {
            let noise: Vec<FeatureVector> = model
                .classification
                .noise
                .iter()
                .map(|&i| dataset.raw_points[i].clone())
                .collect();
            let path = chart_path(base, "");
            viz::create_cluster_scatter(&model.clusters, &noise, &path)?;
            println!("Cluster plot saved to: {}", path);
        } else {
            info!("skipping scatter plot for a {}-field schema", dataset.schema.len());
        }
    }
    Ok(())
}

/// `clusters.png` + `_kdist` -> `clusters_kdist.png`; an empty suffix
/// only ensures the `.png` extension
fn chart_path(base: &str, suffix: &str) -> String {
    match base.strip_suffix(".png") {
        Some(stem) => format!("{}{}.png", stem, suffix),
        None => format!("{}{}.png", base, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_path() {
        assert_eq!(chart_path("out/clusters.png", "_kdist"), "out/clusters_kdist.png");
        assert_eq!(chart_path("clusters", "_kdist"), "clusters_kdist.png");
    }

    #[test]
    fn test_scatter_path_gets_png_extension() {
        assert_eq!(chart_path("clusters", ""), "clusters.png");
        assert_eq!(chart_path("out/clusters.png", ""), "out/clusters.png");
        assert_eq!(chart_path("run.v2", ""), "run.v2.png");
    }
}
