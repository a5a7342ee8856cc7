use crate::{helpers, memory::*, AbortStrategy, DistanceFunction, Error, Result};
use std::cell::RefCell;
use rayon::prelude::*;
use rand::prelude::*;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, T);

/// Where the per-sample work of a calculation runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Execution {
    /// Everything runs on the calling thread.
    Sequential,
    /// Cluster assignments and centroid updates are spread over rayon's thread-pool.
    Parallel,
}
impl Default for Execution {
    fn default() -> Self { Execution::Sequential }
}

/// This is a structure holding various configuration options for the a k-means calculations, such as
/// the random number generator to use, or a couple of callbacks, that can be set to get status information from
/// a running k-means calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called, when the initialization phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the initialization
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration
    /// ## Arguments
    /// - **state**: Current[`KMeansState`] after the iteration
    /// - **iteration_id**: Number of the current iteration
    /// - **distsum**: New distance sum (**state** contains the distsum from the previous iteration)
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator to use
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
    /// The abort-strategy to use for the running calculation
    pub(crate) abort_strategy: AbortStrategy<T>,
    /// Whether to use rayon's thread-pool
    pub(crate) execution: Execution,
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_,_,_| {},
            rnd: Box::new(RefCell::new(rand::thread_rng())),
            abort_strategy: AbortStrategy::<T>::CentroidsConverged{
                delta: helpers::lit(0.001)
            },
            execution: Execution::default(),
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("abort_strategy", &self.abort_strategy)
            .field("execution", &self.execution)
            .finish()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization, before the iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration during a running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used in the k-means calculation.
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd)); self
    }
    /// Set the abort-strategy to use during a running k-means calculation. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::CentroidsConverged`] `{ delta: 0.001 }`
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy<T>) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Choose between calculating on the calling thread only, or on rayon's thread-pool.
    /// ## Default
    /// [`Execution::Sequential`]
    pub fn execution(mut self, execution: Execution) -> Self {
        self.config.execution = execution; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}


/// This is the internally used data-structure, storing the current state during calculation, as
/// well as the final result, as returned by the API.
/// All mutations are done in this structure, making [`KMeans`] immutable, and therefore allowing
/// it to be used in parallel, without having to duplicate the input-data.
///
/// ## Generics
/// - **T**: Underlying primitive type that was used for the calculation
///
/// ## Fields
/// - **k**: The amount of clusters that were requested when calculating this k-means result
/// - **distsum**: The total sum of distances from all samples to their respective centroids
/// - **centroids**: Calculated cluster centers [row-major] = [<centroid0>,<centroid1>,<centroid2>,...]
/// - **centroid_frequency**: Amount of samples in each centroid
/// - **assignments**: Vector mapping each sample to its respective nearest cluster
/// - **centroid_distances**: Vector containing each sample's distance to its centroid
/// - **centroid_shifts**: Distance each centroid moved during the last iteration
/// - **iterations**: Amount of iterations that were run
/// - **converged**: Whether the abort-strategy ended the calculation (instead of the iteration limit)
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub distsum: T,
    pub centroids: Vec<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,
    pub centroid_distances: Vec<T>,
    pub centroid_shifts: Vec<T>,
    pub iterations: usize,
    pub converged: bool,

    pub(crate) sample_dims: usize
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            distsum: T::zero(),
            centroids: vec![T::zero();sample_dims * k],
            centroid_frequency: vec![0usize;k],
            assignments: vec![0usize;sample_cnt],
            centroid_distances: vec![T::infinity();sample_cnt],
            centroid_shifts: vec![T::infinity();k],
            iterations: 0,
            converged: false,
            sample_dims
        }
    }
    pub(crate) fn set_centroid_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.centroids.iter_mut().skip(self.sample_dims * idx).take(self.sample_dims)
                .zip(src)
                .for_each(|(c,s)| *c = s);
    }

    /// Dimension of samples and centroids.
    pub fn sample_dims(&self) -> usize { self.sample_dims }

    /// Coordinates of the centroid with index **idx**.
    pub fn centroid(&self, idx: usize) -> &[T] {
        &self.centroids[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }
}




/// Entrypoint of the clustering engine.
///
/// Create an instance of this struct, giving the samples you want to operate on. The primitive type
/// of the passed samples array will be the type used internaly for all calculations, as well as the result
/// as stored in the returned [`KMeansState`] structure.
///
/// ## Supported variants
/// - k-Means clustering (Lloyd) [`KMeans::kmeans_lloyd`]
///
/// ## Supported initialization methods
/// - First-k samples [`KMeans::init_first_k`]
/// - Precomputed centroids [`KMeans::init_precomputed`]
/// - Random-Sample [`KMeans::init_random_sample`]
/// - K-Mean++ [`KMeans::init_kmeanplusplus`]
pub struct KMeans<T: Primitive, D: DistanceFunction<T>> {
    pub(crate) sample_cnt: usize,
    pub(crate) sample_dims: usize,
    pub(crate) samples: Vec<T>,
    pub(crate) distance_fn: D,
}
impl<T: Primitive, D: DistanceFunction<T>> KMeans<T, D> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **sample** vector has
    /// - **distance_fn**: Distance measure used for assignments and convergence checks
    pub fn new(samples: Vec<T>, sample_cnt: usize, sample_dims: usize, distance_fn: D) -> Result<Self> {
        if sample_dims == 0 {
            return Err(Error::InvalidConfiguration("samples need at least one dimension".into()));
        }
        if samples.len() != sample_cnt * sample_dims {
            return Err(Error::DimensionMismatch { expected: sample_cnt * sample_dims, actual: samples.len() });
        }
        Ok(Self { sample_cnt, sample_dims, samples, distance_fn })
    }

    pub fn sample_cnt(&self) -> usize { self.sample_cnt }
    pub fn sample_dims(&self) -> usize { self.sample_dims }

    /// Coordinates of the sample with index **idx**.
    pub fn sample(&self, idx: usize) -> &[T] {
        &self.samples[idx * self.sample_dims..(idx + 1) * self.sample_dims]
    }

    pub(crate) fn distance(&self, a: &[T], b: &[T]) -> T {
        self.distance_fn.distance(a, b)
    }


    pub(crate) fn update_cluster_assignments(&self, state: &mut KMeansState<T>, limit_k: Option<usize>, execution: Execution) {
        let centroids = &state.centroids;
        let k = limit_k.unwrap_or(state.k);
        let nearest = |s: &[T]| -> (usize, T) {
            centroids.chunks_exact(self.sample_dims).take(k)
                .map(|c| self.distance(s, c))
                .enumerate()
                .fold((0, T::infinity()), |best, (idx, dist)| if dist < best.1 { (idx, dist) } else { best })
        };

        match execution {
            Execution::Parallel => self.samples.par_chunks_exact(self.sample_dims)
                .zip(state.assignments.par_iter_mut())
                .zip(state.centroid_distances.par_iter_mut())
                .for_each(|((s, assignment), centroid_dist)| {
                    let (best_idx, best_dist) = nearest(s);
                    *assignment = best_idx;
                    *centroid_dist = best_dist;
                }),
            Execution::Sequential => self.samples.chunks_exact(self.sample_dims)
                .zip(state.assignments.iter_mut())
                .zip(state.centroid_distances.iter_mut())
                .for_each(|((s, assignment), centroid_dist)| {
                    let (best_idx, best_dist) = nearest(s);
                    *assignment = best_idx;
                    *centroid_dist = best_dist;
                }),
        }
    }

    pub(crate) fn update_cluster_frequencies(&self, assignments: &[usize], centroid_frequency: &mut[usize]) -> usize {
        centroid_frequency.iter_mut().for_each(|v| *v = 0);
        let mut used_centroids_cnt = 0;
        assignments.iter().cloned()
            .for_each(|centroid_id| {
                if centroid_frequency[centroid_id] == 0 {
                    used_centroids_cnt += 1; // Count the amount of centroids with more than 0 samples
                }
                centroid_frequency[centroid_id] += 1;
            });
        used_centroids_cnt
    }



    /// Normal K-Means algorithm implementation (Lloyd).
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **max_iter**: Limit the maximum amount of iterations. With `0`, the samples are only classified against
    ///   the initial centroids.
    /// - **init**: Initialization-Method to use for the initialization of the **k** centroids
    /// - **config**: [`KMeansConfig`] instance with callbacks, random generator, abort strategy and execution mode
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_demos::*;
    ///
    /// let samples = vec![1.0f64, 1.0, 2.0, 1.0, 8.0, 8.0, 9.0, 8.0];
    /// let kmean = KMeans::new(samples, 4, 2, EuclideanDistance).unwrap();
    /// let result = kmean.kmeans_lloyd(2, 10, KMeans::init_first_k, &KMeansConfig::default()).unwrap();
    ///
    /// assert_eq!(result.assignments, vec![0, 0, 1, 1]);
    /// println!("Centroids: {:?}", result.centroids);
    /// ```
    pub fn kmeans_lloyd<F>(&self, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'_, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        crate::variants::Lloyd::calculate(self, k, max_iter, init, config)
    }

    /// Uses the first **k** samples, in their given order, as initial centroids.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_first_k(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        crate::inits::firstk::calculate(kmean, state, config)
    }

    /// Uses the given centroids [row-major] as initial centroids. Exactly **k** centroids of the samples'
    /// dimension have to be passed.
    pub fn init_precomputed(centroids: Vec<T>) -> impl FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'_, T>) -> Result<()> {
        move |kmean, state, config| crate::inits::precomputed::calculate(kmean, state, config, centroids)
    }

    /// Random sample initialization method
    /// This initialization method randomly selects k centroids from the samples as initial centroids.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_random_sample(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        crate::inits::randomsample::calculate(kmean, state, config)
    }

    /// K-Means++ initialization method
    /// (see: https://uk.mathworks.com/help/stats/kmeans.html#bueq7aj-5    Section: More About)
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_kmeanplusplus(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        crate::inits::kmeanplusplus::calculate(kmean, state, config)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DistanceMeasure, EuclideanDistance};

    #[test]
    fn new_rejects_inconsistent_sample_count() {
        let res = KMeans::new(vec![1.0f64, 2.0, 3.0], 2, 2, EuclideanDistance);
        assert!(matches!(res, Err(Error::DimensionMismatch { expected: 4, actual: 3 })));
        let res = KMeans::new(Vec::<f64>::new(), 0, 0, EuclideanDistance);
        assert!(matches!(res, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn parallel_and_sequential_assignments_agree() {
        calculate_cluster_assignments::<f64>(1, 1e-10f64);
        calculate_cluster_assignments::<f64>(3, 1e-10f64);
        calculate_cluster_assignments::<f32>(2, 1e-5f32);
        calculate_cluster_assignments::<f32>(17, 1e-5f32);
    }

    fn calculate_cluster_assignments<T: Primitive>(sample_dims: usize, max_diff: T) {
        let sample_cnt = 1000;
        let k = 5;

        let mut rnd = rand::rngs::StdRng::seed_from_u64(1337);
        let mut samples = vec![T::zero();sample_cnt * sample_dims];
        samples.iter_mut().for_each(|i| *i = rnd.gen_range(T::zero(), T::one()));

        let kmean = KMeans::new(samples, sample_cnt, sample_dims, DistanceMeasure::Euclidean).unwrap();

        let mut state = KMeansState::new(kmean.sample_cnt, kmean.sample_dims, k);
        state.centroids.iter_mut()
            .zip(kmean.samples.iter())
            .for_each(|(c,s)| *c = *s);
        let mut parallel_state = state.clone();

        // calculate distances using method that (hopefully) works.
        let mut should_assignments = state.assignments.clone();
        let mut should_centroid_distances = state.centroid_distances.clone();
        kmean.samples.chunks_exact(kmean.sample_dims)
            .zip(should_assignments.iter_mut())
            .zip(should_centroid_distances.iter_mut())
            .for_each(|((s, assignment), centroid_dist)| {
                let (best_idx, best_dist) = state.centroids
                    .chunks_exact(kmean.sample_dims)
                    .map(|c| {
                        s.iter().cloned().zip(c.iter().cloned())
                            .map(|(sv,cv)| sv - cv)
                            .map(|v| v * v)
                            .sum::<T>()
                            .sqrt()
                    })
                    .enumerate()
                    .min_by(|(_,d0), (_,d1)| d0.partial_cmp(d1).unwrap())
                    .unwrap();
                *assignment = best_idx;
                *centroid_dist = best_dist;
            });

        kmean.update_cluster_assignments(&mut state, None, Execution::Sequential);
        kmean.update_cluster_assignments(&mut parallel_state, None, Execution::Parallel);

        for i in 0..should_assignments.len() {
            assert_approx_eq!(state.centroid_distances[i], should_centroid_distances[i], max_diff);
        }
        assert_eq!(state.assignments, should_assignments);
        assert_eq!(parallel_state.assignments, should_assignments);
        assert_eq!(parallel_state.centroid_distances, state.centroid_distances);
    }

    #[test]
    fn limit_k_only_considers_leading_centroids() {
        let kmean = KMeans::new(vec![0.0f64, 10.0], 2, 1, EuclideanDistance).unwrap();
        let mut state = KMeansState::new(2, 1, 2);
        state.centroids = vec![0.0, 10.0];
        kmean.update_cluster_assignments(&mut state, Some(1), Execution::Sequential);
        assert_eq!(state.assignments, vec![0, 0]);
        assert_eq!(state.centroid_distances, vec![0.0, 10.0]);
    }

    #[test]
    fn cluster_frequencies() {
        let kmean = KMeans::new(vec![0.0f64; 4], 4, 1, EuclideanDistance).unwrap();
        let mut frequency = vec![7usize; 3];
        let used = kmean.update_cluster_frequencies(&[0, 2, 2, 0], &mut frequency);
        assert_eq!(used, 2);
        assert_eq!(frequency, vec![2, 0, 2]);
    }

    #[test]
    fn centroid_accessor() {
        let mut state = KMeansState::<f64>::new(3, 2, 2);
        state.set_centroid_from_iter(1, [4.0, 5.0].iter().cloned());
        assert_eq!(state.centroid(0), &[0.0, 0.0]);
        assert_eq!(state.centroid(1), &[4.0, 5.0]);
        assert_eq!(state.sample_dims(), 2);
    }
}
