//! DensityForge: density-based (DBSCAN) clustering of tabular feature vectors
//!
//! Records with named numeric fields, some possibly missing, are optionally
//! standardized, classified as core/border/noise points, linked into
//! clusters through core-point reachability, and reported as cluster
//! centroids in the original units.

pub mod assemble;
pub mod classify;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod data;
pub mod model;
pub mod point;
pub mod reachability;
pub mod report;
pub mod schema;
pub mod standardize;
pub mod tuning;
pub mod viz;

// Re-export public items for easier access
pub use assemble::BorderPolicy;
pub use classify::{classify, Classification, NeighborPolicy, PointType};
pub use cli::Args;
pub use cluster::{Cluster, ClusterId, ClusterIds};
pub use data::{load_dataset, Dataset, LoadOptions};
pub use model::{fit_dbscan, DbscanModel, DbscanParams};
pub use point::FeatureVector;
pub use reachability::{ClosurePolicy, ReachabilityGraph};
pub use report::ReportStyle;
pub use schema::{Schema, SchemaKind};
pub use standardize::{FieldStats, Standardizer};
pub use tuning::{k_distance_curves, k_distances, KDistanceCurve};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
