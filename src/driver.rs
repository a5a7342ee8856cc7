//! File based k-means clustering.
//!
//! [`run`] reads points and initial clusters from record files, clusters the points in-process, and lays
//! its results out below the output directory:
//!
//! ```text
//! output/
//!   clusters-0/part-r-00000           the initial clusters
//!   clusters-1/part-r-00000           clusters after iteration 1
//!   ...
//!   clusters-<n>-final/part-r-00000   clusters after the last iteration
//!   clusteredPoints/part-m-00000      cluster id -> WeightedVector, one record per point
//! ```

use crate::error::io_error;
use crate::seqfile::SequenceWriter;
use crate::{
    helpers, read_clusters, read_points, AbortStrategy, DistanceMeasure, Error, Execution, KMeans, KMeansConfig,
    KMeansState, Kluster, Primitive, Result, WeightedVector,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CLUSTERED_POINTS_DIR: &str = "clusteredPoints";
pub const CLUSTERED_POINTS_PART: &str = "part-m-00000";
pub const CLUSTERS_DIR_PREFIX: &str = "clusters-";
pub const FINAL_ITERATION_SUFFIX: &str = "-final";
pub const CLUSTERS_PART: &str = "part-r-00000";

/// Directory holding the clusters after **iteration** (`0` being the initial clusters).
pub fn clusters_dir(output: &Path, iteration: usize, is_final: bool) -> PathBuf {
    let suffix = if is_final { FINAL_ITERATION_SUFFIX } else { "" };
    output.join(format!("{}{}{}", CLUSTERS_DIR_PREFIX, iteration, suffix))
}

/// The record file the clustered points are written to.
pub fn clustered_points_file(output: &Path) -> PathBuf {
    output.join(CLUSTERED_POINTS_DIR).join(CLUSTERED_POINTS_PART)
}

/// Options of a [`run`]. Use [`DriverConfig::build`] to change the defaults.
#[derive(Clone, Debug)]
pub struct DriverConfig<T: Primitive> {
    pub(crate) measure: DistanceMeasure,
    pub(crate) convergence_delta: T,
    pub(crate) max_iterations: usize,
    pub(crate) run_clustering: bool,
    pub(crate) classification_threshold: T,
    pub(crate) execution: Execution,
    pub(crate) classify_only: bool,
}
impl<T: Primitive> Default for DriverConfig<T> {
    fn default() -> Self {
        Self {
            measure: DistanceMeasure::Euclidean,
            convergence_delta: helpers::lit(0.001),
            max_iterations: 10,
            run_clustering: true,
            classification_threshold: T::zero(),
            execution: Execution::Sequential,
            classify_only: false,
        }
    }
}
impl<T: Primitive> DriverConfig<T> {
    pub fn build() -> DriverConfigBuilder<T> {
        DriverConfigBuilder { config: DriverConfig::default() }
    }
}

pub struct DriverConfigBuilder<T: Primitive> {
    config: DriverConfig<T>
}
impl<T: Primitive> DriverConfigBuilder<T> {
    /// Distance measure used for assignments and convergence checks.
    /// ## Default
    /// [`DistanceMeasure::Euclidean`]
    pub fn measure(mut self, measure: DistanceMeasure) -> Self {
        self.config.measure = measure; self
    }
    /// A cluster counts as converged once its centroid moved by at most **delta** in an iteration.
    /// Iteration stops when all clusters converged.
    /// ## Default
    /// `0.001`
    pub fn convergence_delta(mut self, delta: T) -> Self {
        self.config.convergence_delta = delta; self
    }
    /// ## Default
    /// `10`
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations; self
    }
    /// Whether the points are classified against the final clusters, and written to `clusteredPoints`.
    /// ## Default
    /// `true`
    pub fn run_clustering(mut self, run_clustering: bool) -> Self {
        self.config.run_clustering = run_clustering; self
    }
    /// Points whose membership weight is below **threshold** are not written to `clusteredPoints`.
    /// ## Default
    /// `0`
    pub fn classification_threshold(mut self, threshold: T) -> Self {
        self.config.classification_threshold = threshold; self
    }
    /// ## Default
    /// [`Execution::Sequential`]
    pub fn execution(mut self, execution: Execution) -> Self {
        self.config.execution = execution; self
    }
    /// Skip the iterations and only classify the points against the initial clusters.
    /// ## Default
    /// `false`
    pub fn classify_only(mut self, classify_only: bool) -> Self {
        self.config.classify_only = classify_only; self
    }
    pub fn build(self) -> DriverConfig<T> { self.config }
}

/// What a [`run`] produced.
#[derive(Clone, Debug)]
pub struct DriverOutcome<T> {
    /// Clusters of the final iteration
    pub clusters: Vec<Kluster<T>>,
    pub iterations: usize,
    /// Whether all clusters converged before the iteration limit
    pub converged: bool,
    pub final_clusters_dir: PathBuf,
    /// Record file of the classified points, if they were classified
    pub clustered_points: Option<PathBuf>,
}

struct IterationSnapshot<T> {
    centroids: Vec<T>,
    frequency: Vec<usize>,
    shifts: Vec<T>,
}

fn write_clusters<T: Primitive>(dir: &Path, clusters: &[Kluster<T>]) -> Result<()> {
    let mut writer = SequenceWriter::<String, Kluster<T>>::create(dir.join(CLUSTERS_PART))?;
    for kluster in clusters {
        writer.append(&kluster.identifier(), kluster)?;
    }
    writer.close()?;
    Ok(())
}

/// Clusters the points stored under **input**, starting with the clusters stored under **clusters_in**.
/// Everything previously stored in **output** is removed.
pub fn run<T: Primitive>(input: &Path, clusters_in: &Path, output: &Path, config: &DriverConfig<T>) -> Result<DriverOutcome<T>> {
    let points = read_points::<T, _>(input)?;
    let seeds = read_clusters::<T, _>(clusters_in)?;
    let sample_dims = match points.first() {
        Some(first) => first.len(),
        None => return Err(Error::EmptyInput(format!("no points in {}", input.display()))),
    };
    if seeds.is_empty() {
        return Err(Error::EmptyInput(format!("no initial clusters in {}", clusters_in.display())));
    }
    if let Some(seed) = seeds.iter().find(|s| s.center.len() != sample_dims) {
        return Err(Error::DimensionMismatch { expected: sample_dims, actual: seed.center.len() });
    }
    info!(points = points.len(), k = seeds.len(), measure = ?config.measure, "running k-means");

    if output.exists() {
        debug!(path = %output.display(), "removing previous output");
        fs::remove_dir_all(output).map_err(io_error(output))?;
    }
    write_clusters(&clusters_dir(output, 0, false), &seeds)?;

    let samples: Vec<T> = points.iter().flatten().cloned().collect();
    let kmean = KMeans::new(samples, points.len(), sample_dims, config.measure)?;
    let initial_centroids: Vec<T> = seeds.iter().flat_map(|s| s.center.iter().cloned()).collect();
    let max_iter = if config.classify_only { 0 } else { config.max_iterations };

    let history = RefCell::new(Vec::new());
    let state = {
        let iteration_done = |state: &KMeansState<T>, nr: usize, distsum: T| {
            debug!(iteration = nr, previous = %state.distsum, distsum = %distsum, "iteration done");
            history.borrow_mut().push(IterationSnapshot {
                centroids: state.centroids.clone(),
                frequency: state.centroid_frequency.clone(),
                shifts: state.centroid_shifts.clone(),
            });
        };
        let conf = KMeansConfig::build()
            .abort_strategy(AbortStrategy::CentroidsConverged { delta: config.convergence_delta })
            .execution(config.execution)
            .iteration_done(&iteration_done)
            .build();
        kmean.kmeans_lloyd(seeds.len(), max_iter, KMeans::init_precomputed(initial_centroids), &conf)?
    };
    let history = history.into_inner();

    let snapshot_clusters = |snapshot: &IterationSnapshot<T>| -> Vec<Kluster<T>> {
        seeds.iter().enumerate().map(|(ci, seed)| Kluster {
            id: seed.id,
            center: snapshot.centroids[ci * sample_dims..(ci + 1) * sample_dims].to_vec(),
            num_observations: snapshot.frequency[ci] as u64,
            converged: snapshot.shifts[ci] <= config.convergence_delta,
            measure: config.measure,
        }).collect()
    };
    let mut clusters = seeds.clone();
    for (idx, snapshot) in history.iter().enumerate() {
        clusters = snapshot_clusters(snapshot);
        write_clusters(&clusters_dir(output, idx + 1, idx + 1 == history.len()), &clusters)?;
    }
    let final_clusters_dir = clusters_dir(output, history.len(), true);
    if history.is_empty() {
        let initial = clusters_dir(output, 0, false);
        fs::rename(&initial, &final_clusters_dir).map_err(io_error(&initial))?;
    }

    let clustered_points = if config.run_clustering {
        Some(write_clustered_points(output, &points, &clusters, &state, config)?)
    } else {
        None
    };

    info!(iterations = state.iterations, converged = state.converged, "k-means finished");
    for kluster in &clusters {
        info!(cluster = %kluster, "final cluster");
    }
    Ok(DriverOutcome { clusters, iterations: state.iterations, converged: state.converged, final_clusters_dir, clustered_points })
}

/// Every point is a full member (weight 1) of its nearest cluster.
fn write_clustered_points<T: Primitive>(output: &Path, points: &[Vec<T>], clusters: &[Kluster<T>], state: &KMeansState<T>, config: &DriverConfig<T>) -> Result<PathBuf> {
    let path = clustered_points_file(output);
    let mut writer = SequenceWriter::<u32, WeightedVector<T>>::create(&path)?;
    for (idx, point) in points.iter().enumerate() {
        let weight = T::one();
        if weight < config.classification_threshold {
            continue;
        }
        let cluster_id = clusters[state.assignments[idx]].id;
        writer.append(&cluster_id, &WeightedVector { weight, distance: state.centroid_distances[idx], vector: point.clone() })?;
    }
    let written = writer.close()?;
    info!(points = written, path = %path.display(), "clustered points written");
    Ok(path)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing::assert_same_grouping;
    use crate::seqfile::SequenceReader;
    use crate::{get_points, write_points_to_file, write_seed_clusters, SAMPLE_POINTS};

    struct Fixture {
        dir: tempfile::TempDir,
        input: PathBuf,
        clusters_in: PathBuf,
        output: PathBuf,
    }

    fn fixture(k: usize) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let (input, clusters_in, output) = (dir.path().join("testdata/points"), dir.path().join("testdata/clusters"), dir.path().join("output"));
        let points: Vec<Vec<f64>> = get_points(&SAMPLE_POINTS);
        write_points_to_file(&points, input.join("file1")).unwrap();
        write_seed_clusters(&points, k, DistanceMeasure::Euclidean, clusters_in.join("part-00000")).unwrap();
        Fixture { dir, input, clusters_in, output }
    }

    fn clustered(path: &Path) -> Vec<(u32, WeightedVector<f64>)> {
        SequenceReader::open(path).unwrap().collect::<Result<_>>().unwrap()
    }

    #[test]
    fn nine_points_two_clusters() {
        let f = fixture(2);
        let outcome = run(&f.input, &f.clusters_in, &f.output, &DriverConfig::<f64>::default()).unwrap();

        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.final_clusters_dir, f.output.join("clusters-3-final"));
        assert!(f.output.join("clusters-0/part-r-00000").is_file());
        assert!(f.output.join("clusters-1/part-r-00000").is_file());
        assert!(f.output.join("clusters-2/part-r-00000").is_file());
        assert!(f.output.join("clusters-3-final/part-r-00000").is_file());
        assert!(!f.output.join("clusters-3").exists());

        let records = clustered(outcome.clustered_points.as_ref().unwrap());
        assert_eq!(records.len(), 9);
        let ids: Vec<usize> = records.iter().map(|(id, _)| *id as usize).collect();
        assert_same_grouping(&[0, 0, 0, 0, 0, 1, 1, 1, 1], &ids);
        for ((_, wv), point) in records.iter().zip(SAMPLE_POINTS.iter()) {
            assert_eq!(wv.vector, point.to_vec());
            assert_eq!(wv.weight, 1.0);
        }
        assert_eq!(records[5].1.distance, 0.5f64.sqrt());

        let finals = read_clusters::<f64, _>(&outcome.final_clusters_dir).unwrap();
        assert_eq!(finals, outcome.clusters);
        assert!(finals.iter().all(|c| c.converged));
        assert_eq!(finals[0].identifier(), "VL-0");
        assert_eq!(finals[0].num_observations, 5);
        assert_eq!(finals[1].center, vec![8.5, 8.5]);
    }

    #[test]
    fn iteration_limit_leaves_clusters_unconverged() {
        let f = fixture(2);
        let conf = DriverConfig::<f64>::build().max_iterations(1).execution(Execution::Parallel).build();
        let outcome = run(&f.input, &f.clusters_in, &f.output, &conf).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.final_clusters_dir, f.output.join("clusters-1-final"));
        assert_eq!(outcome.clusters[0].center, vec![1.0, 1.5]);
        assert!(!outcome.clusters[1].converged);
    }

    #[test]
    fn classify_only_uses_initial_clusters() {
        let f = fixture(2);
        let conf = DriverConfig::<f64>::build().classify_only(true).build();
        let outcome = run(&f.input, &f.clusters_in, &f.output, &conf).unwrap();
        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.final_clusters_dir, f.output.join("clusters-0-final"));
        assert!(!f.output.join("clusters-0").exists());
        assert_eq!(outcome.clusters, read_clusters::<f64, _>(&f.clusters_in).unwrap());

        // seeds are (1,1) and (2,1): only (1,1) and (1,2) are closer to the first one
        let ids: Vec<u32> = clustered(&clustered_points_file(&f.output)).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 0, 1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn without_clustering_no_points_are_written() {
        let f = fixture(2);
        let conf = DriverConfig::<f64>::build().run_clustering(false).build();
        let outcome = run(&f.input, &f.clusters_in, &f.output, &conf).unwrap();
        assert!(outcome.clustered_points.is_none());
        assert!(!clustered_points_file(&f.output).exists());
    }

    #[test]
    fn classification_threshold_above_weight_filters_everything() {
        let f = fixture(2);
        let conf = DriverConfig::<f64>::build().classification_threshold(1.5).build();
        let outcome = run(&f.input, &f.clusters_in, &f.output, &conf).unwrap();
        assert!(clustered(outcome.clustered_points.as_ref().unwrap()).is_empty());
    }

    #[test]
    fn previous_output_is_replaced() {
        let f = fixture(2);
        fs::create_dir_all(f.output.join("clusters-7-final")).unwrap();
        run(&f.input, &f.clusters_in, &f.output, &DriverConfig::<f64>::default()).unwrap();
        assert!(!f.output.join("clusters-7-final").exists());
    }

    #[test]
    fn missing_input() {
        let f = fixture(2);
        let res = run(&f.dir.path().join("nothing"), &f.clusters_in, &f.output, &DriverConfig::<f64>::default());
        assert!(matches!(res, Err(Error::Io { .. })));
    }

    #[test]
    fn seed_dimension_mismatch() {
        let f = fixture(2);
        let other = f.dir.path().join("clusters-3d/part-00000");
        write_seed_clusters(&[vec![1.0f64, 1.0, 1.0]], 1, DistanceMeasure::Euclidean, &other).unwrap();
        let res = run(&f.input, other.parent().unwrap(), &f.output, &DriverConfig::<f64>::default());
        assert!(matches!(res, Err(Error::DimensionMismatch { expected: 2, actual: 3 })));
    }
}
