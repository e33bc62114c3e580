//! PNG charts with Plotters: k-distance curves and 2-D cluster scatter plots

use plotters::prelude::*;

use crate::cluster::Cluster;
use crate::point::FeatureVector;
use crate::tuning::KDistanceCurve;

/// Color palette for clusters and curves
const PALETTE: [RGBColor; 5] = [RED, BLUE, GREEN, MAGENTA, CYAN];

fn palette(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

/// Plot every sorted k-distance curve; the knee suggests a radius
pub fn create_k_distance_chart(curves: &[KDistanceCurve], output_path: &str) -> crate::Result<()> {
    let longest = curves.iter().map(|c| c.distances.len()).max().unwrap_or(0);
    if longest == 0 {
        anyhow::bail!("no k-distances to plot");
    }
    let max_distance = curves
        .iter()
        .flat_map(|c| c.distances.iter())
        .fold(0.0f64, |a, &b| a.max(f64::from(b)));

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Sorted k-distances", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..longest as f64, 0f64..(max_distance * 1.1).max(1e-3))?;

    chart
        .configure_mesh()
        .x_desc("Points (sorted)")
        .y_desc("Distance to k-th neighbor")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (i, curve) in curves.iter().enumerate() {
        let color = palette(i);
        let series = curve
            .distances
            .iter()
            .enumerate()
            .map(|(x, &d)| (x as f64, f64::from(d)));
        chart
            .draw_series(LineSeries::new(series, color.stroke_width(2)))?
            .label(format!("k={}", curve.k))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Scatter plot of the first two fields, one color per cluster
///
/// Noise points are drawn as small black dots; centroids as squares.
/// Points missing either plotted field are skipped.
///
/// # Arguments
/// * `clusters` - Clusters to draw, in original units
/// * `noise` - Points that belong to no cluster
/// * `output_path` - PNG file to write
///
/// # Returns
/// * `Ok(())` once the chart is written; an error if there is nothing to plot
pub fn create_cluster_scatter(
    clusters: &[Cluster],
    noise: &[FeatureVector],
    output_path: &str,
) -> crate::Result<()> {
    let Some(schema) = clusters
        .iter()
        .flat_map(|c| c.members().first())
        .chain(noise.first())
        .map(FeatureVector::schema)
        .next()
    else {
        anyhow::bail!("nothing to plot");
    };
    if schema.len() < 2 {
        anyhow::bail!("a scatter plot needs at least two fields, schema has {}", schema.len());
    }
    let (x_field, y_field) = (&schema.fields()[0], &schema.fields()[1]);

    let coords = |p: &FeatureVector| -> Option<(f64, f64)> {
        Some((f64::from(p.value_at(0)?), f64::from(p.value_at(1)?)))
    };
    let all: Vec<(f64, f64)> = clusters
        .iter()
        .flat_map(|c| c.members().iter())
        .chain(noise.iter())
        .filter_map(coords)
        .collect();
    if all.is_empty() {
        anyhow::bail!("no point has both {} and {}", x_field, y_field);
    }

    let x_min = all.iter().fold(f64::INFINITY, |a, p| a.min(p.0)) - 0.5;
    let x_max = all.iter().fold(f64::NEG_INFINITY, |a, p| a.max(p.0)) + 0.5;
    let y_min = all.iter().fold(f64::INFINITY, |a, p| a.min(p.1)) - 0.5;
    let y_max = all.iter().fold(f64::NEG_INFINITY, |a, p| a.max(p.1)) + 0.5;

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("DBSCAN clusters: {} vs {}", x_field, y_field), ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc(x_field.as_str())
        .y_desc(y_field.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(
        noise
            .iter()
            .filter_map(coords)
            .map(|p| Circle::new(p, 2, BLACK.filled())),
    )?;

    for (i, cluster) in clusters.iter().enumerate() {
        let color = palette(i);
        chart
            .draw_series(
                cluster
                    .members()
                    .iter()
                    .filter_map(coords)
                    .map(move |p| Circle::new(p, 4, color.filled())),
            )?
            .label(format!("Cluster {}", i + 1))
            .legend(move |(x, y)| Rectangle::new([(x, y), (x + 10, y + 10)], color.filled()));

        if let Some((cx, cy)) = cluster.centroid().ok().as_ref().and_then(coords) {
            let half = 0.02 * (x_max - x_min).max(y_max - y_min);
            chart.draw_series(std::iter::once(Rectangle::new(
                [(cx - half, cy - half), (cx + half, cy + half)],
                color.filled(),
            )))?;
        }
    }

    chart.configure_series_labels().draw()?;

    root.present()?;
    Ok(())
}
