//! Parameters of the two demos. None of them are read from the command line or environment; the binaries
//! always run with the [`Default`] values below.

use crate::{DistanceMeasure, Execution};
use std::path::PathBuf;

pub const POINTS_DIR: &str = "testdata/points";
pub const POINTS_FILE: &str = "file1";
pub const CLUSTERS_DIR: &str = "testdata/clusters";
pub const SEED_CLUSTERS_FILE: &str = "part-00000";
pub const OUTPUT_DIR: &str = "output";
pub const K: usize = 2;
pub const CONVERGENCE_DELTA: f64 = 0.001;
pub const MAX_ITERATIONS: usize = 10;

pub const RATINGS_FILE: &str = "intro.csv";
pub const NEIGHBORHOOD_SIZE: usize = 2;
pub const USER_ID: i64 = 1;
pub const HOW_MANY: usize = 1;

/// Where the point clustering demo puts its files, and how it clusters.
#[derive(Clone, Debug)]
pub struct ClusterDemoConfig {
    pub points_dir: PathBuf,
    pub clusters_dir: PathBuf,
    pub output_dir: PathBuf,
    pub k: usize,
    pub convergence_delta: f64,
    pub max_iterations: usize,
    pub measure: DistanceMeasure,
    pub execution: Execution,
}
impl Default for ClusterDemoConfig {
    fn default() -> Self {
        Self {
            points_dir: PathBuf::from(POINTS_DIR),
            clusters_dir: PathBuf::from(CLUSTERS_DIR),
            output_dir: PathBuf::from(OUTPUT_DIR),
            k: K,
            convergence_delta: CONVERGENCE_DELTA,
            max_iterations: MAX_ITERATIONS,
            measure: DistanceMeasure::Euclidean,
            execution: Execution::Sequential,
        }
    }
}
impl ClusterDemoConfig {
    /// All paths of the default configuration, relocated below **root**.
    pub fn rooted_at<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        let defaults = Self::default();
        Self {
            points_dir: root.join(&defaults.points_dir),
            clusters_dir: root.join(&defaults.clusters_dir),
            output_dir: root.join(&defaults.output_dir),
            ..defaults
        }
    }

    pub fn points_file(&self) -> PathBuf { self.points_dir.join(POINTS_FILE) }
    pub fn seed_clusters_file(&self) -> PathBuf { self.clusters_dir.join(SEED_CLUSTERS_FILE) }
}

/// Input and parameters of the recommendation demo.
#[derive(Clone, Debug)]
pub struct RecommendDemoConfig {
    pub ratings_file: PathBuf,
    pub neighborhood_size: usize,
    pub user_id: i64,
    pub how_many: usize,
}
impl Default for RecommendDemoConfig {
    fn default() -> Self {
        Self {
            ratings_file: PathBuf::from(RATINGS_FILE),
            neighborhood_size: NEIGHBORHOOD_SIZE,
            user_id: USER_ID,
            how_many: HOW_MANY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn cluster_defaults() {
        let conf = ClusterDemoConfig::default();
        assert_eq!(conf.points_file(), Path::new("testdata/points/file1"));
        assert_eq!(conf.seed_clusters_file(), Path::new("testdata/clusters/part-00000"));
        assert_eq!(conf.output_dir, Path::new("output"));
        assert_eq!((conf.k, conf.max_iterations), (2, 10));
        assert_eq!(conf.convergence_delta, 0.001);
        assert_eq!(conf.execution, Execution::Sequential);
    }

    #[test]
    fn rooted_config_keeps_parameters() {
        let conf = ClusterDemoConfig::rooted_at("/tmp/run");
        assert_eq!(conf.points_file(), Path::new("/tmp/run/testdata/points/file1"));
        assert_eq!(conf.output_dir, Path::new("/tmp/run/output"));
        assert_eq!(conf.k, K);
    }

    #[test]
    fn recommend_defaults() {
        let conf = RecommendDemoConfig::default();
        assert_eq!(conf.ratings_file, Path::new("intro.csv"));
        assert_eq!((conf.neighborhood_size, conf.user_id, conf.how_many), (2, 1, 1));
    }
}
