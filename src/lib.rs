//! # kmeans-demos - API documentation
//!
//! Two small demos, and the library they are built on:
//!
//! - **Point clustering**: nine 2-D points are written to a record file, two of them are written as initial
//!   clusters, and a k-means driver clusters the points and writes each point's cluster assignment. The
//!   `kmeans_cluster` binary prints those assignments.
//! - **User based recommendation**: a ratings file is loaded into a data model, and a nearest-neighbor
//!   recommender (Pearson correlation, neighborhood of two users) recommends a single item for user `1`.
//!   The `user_recommend` binary prints that recommendation.
//!
//! ## k-Means engine
//! The engine is generic over the underlying primitive type ([`f32`] / [`f64`]) and takes samples as a raw
//! row-major vector, instead of any high-level arithmetics / matrix crate such as nalgebra or ndarray.
//! Entry-point is the [`KMeans`] struct. Calling [`KMeans::kmeans_lloyd`] does not mutate it, all state lives in
//! the returned [`KMeansState`].
//!
//! ## Example
//! ```rust
//! use kmeans_demos::*;
//!
//! let points = get_points(&SAMPLE_POINTS);
//! let samples: Vec<f64> = points.iter().flatten().cloned().collect();
//!
//! let conf = KMeansConfig::build()
//!     .abort_strategy(AbortStrategy::CentroidsConverged { delta: 0.001 })
//!     .iteration_done(&|s, nr, new_distsum|
//!         println!("Iteration {} - Error: {:.2} -> {:.2}", nr, s.distsum, new_distsum))
//!     .build();
//!
//! let kmean = KMeans::new(samples, points.len(), 2, DistanceMeasure::Euclidean).unwrap();
//! let result = kmean.kmeans_lloyd(2, 10, KMeans::init_first_k, &conf).unwrap();
//!
//! println!("Centroids: {:?}", result.centroids);
//! println!("Cluster-Assignments: {:?}", result.assignments);
//! ```
//!
//! ## File based clustering
//! [`driver::run`] works on record files (see [`seqfile`]) instead: it reads points and initial clusters,
//! writes the clusters of every iteration and finally the clustered points, which [`report`] prints.
//!
//! ## Recommendations
//! See the [`taste`] module.

#[macro_use] mod helpers;
mod memory;
mod api;
mod variants;
mod inits;
mod abort_strategy;
mod distances;
mod error;
mod vector;
mod cluster;
mod points;

pub mod config;
pub mod seqfile;
pub mod driver;
pub mod report;
pub mod demo;
pub mod taste;

pub use abort_strategy::AbortStrategy;
pub use api::{Execution, KMeansState, KMeansConfig, KMeansConfigBuilder, KMeans};
pub use cluster::{read_clusters, write_seed_clusters, Kluster};
pub use distances::{CosineDistance, DistanceFunction, DistanceMeasure, EuclideanDistance, ManhattanDistance, SquaredEuclideanDistance};
pub use error::{Error, Result};
pub use memory::Primitive;
pub use points::{get_points, read_points, write_points_to_file, SAMPLE_POINTS};
pub use vector::{format_vector, WeightedVector};
