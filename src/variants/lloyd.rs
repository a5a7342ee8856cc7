use crate::abort_strategy::IterationProgress;
use crate::{DistanceFunction, Error, Execution, KMeans, KMeansConfig, KMeansState, Primitive, Result};
use tracing::{debug, warn};

pub(crate) struct Lloyd<T: Primitive, D: DistanceFunction<T>> {
	_p: std::marker::PhantomData<(T, D)>
}
impl<T: Primitive, D: DistanceFunction<T>> Lloyd<T, D> {
    /// Sum of all samples per cluster [row-major], using the current assignments.
    fn sum_clusters(data: &KMeans<T, D>, assignments: &[usize], k: usize) -> Vec<T> {
        let mut sums = vec![T::zero(); k * data.sample_dims];
        data.samples.chunks_exact(data.sample_dims)
            .zip(assignments.iter().cloned())
            .for_each(|(s, centroid_id)| {
                sums.chunks_exact_mut(data.sample_dims).nth(centroid_id).into_iter()
                    .flat_map(|c| c.iter_mut())
                    .zip(s.iter())
                    .for_each(|(c, s)| *c += s);
            });
        sums
    }

    /// Moves every centroid into the mean of its assigned samples and records how far it moved.
    /// Returns the distance sum of the assignments the update was based on.
    fn update_centroids(data: &KMeans<T, D>, state: &mut KMeansState<T>, execution: Execution) -> T {
        let k = state.k;
        let (centroid_frequency, assignments, centroid_distances) = (&mut state.centroid_frequency, &state.assignments, &state.centroid_distances);
        let mut count = || data.update_cluster_frequencies(assignments, centroid_frequency);
        let sum = || Self::sum_clusters(data, assignments, k);
        let total = || centroid_distances.iter().cloned().sum::<T>();
        let (used_centroids_cnt, (new_centroids, new_distsum)) = match execution {
            Execution::Parallel => rayon::join(count, || rayon::join(sum, total)),
            Execution::Sequential => (count(), (sum(), total())),
        };
        if used_centroids_cnt != k {
            debug!(used = used_centroids_cnt, k, "not every cluster got samples assigned");
        }

        // Calculate new centroids from updated cluster_assignments. Empty clusters keep their centroid.
        state.centroids.chunks_exact_mut(data.sample_dims)
            .zip(new_centroids.chunks_exact(data.sample_dims))
            .zip(state.centroid_frequency.iter().cloned())
            .zip(state.centroid_shifts.iter_mut())
            .enumerate()
            .for_each(|(ci, (((c, nc), cfreq), shift))| {
                if cfreq == 0 {
                    warn!(cluster = ci, "cluster has no samples, keeping its centroid");
                    *shift = T::zero();
                    return;
                }
                let cfreq = T::from(cfreq).unwrap_or_else(T::nan);
                let moved: Vec<T> = nc.iter().map(|&v| v / cfreq).collect();
                *shift = data.distance(c, &moved);
                c.copy_from_slice(&moved);
            });
        new_distsum
    }

    #[inline(always)] pub fn calculate<F>(data: &KMeans<T, D>, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'_, T>) -> Result<KMeansState<T>>
                where for<'c> F: FnOnce(&KMeans<T, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        if k == 0 || k > data.sample_cnt {
            return Err(Error::InvalidConfiguration(
                format!("k = {} has to be within 1..={} (amount of samples)", k, data.sample_cnt)));
        }

        let mut state = KMeansState::new(data.sample_cnt, data.sample_dims, k);
        state.distsum = T::infinity();

        // Initialize clusters and notify subscriber
        init(data, &mut state, config)?;
        (config.init_done)(&state);
        let mut abort_strategy = config.abort_strategy.create_logic();

        for i in 1..=max_iter {
            data.update_cluster_assignments(&mut state, None, config.execution);
            let new_distsum = Self::update_centroids(data, &mut state, config.execution);
            state.iterations = i;

            // Notify subscriber about finished iteration
            (config.iteration_done)(&state, i, new_distsum);
            debug!(iteration = i, distsum = %new_distsum, "k-means iteration done");
            let keep_going = abort_strategy.next(IterationProgress { error: new_distsum, centroid_shifts: &state.centroid_shifts });
            state.distsum = new_distsum;
            if !keep_going {
                state.converged = true;
                break;
            }
        }

        // Final classification against the resulting centroids
        data.update_cluster_assignments(&mut state, None, config.execution);
        data.update_cluster_frequencies(&state.assignments, &mut state.centroid_frequency);
        state.distsum = state.centroid_distances.iter().cloned().sum();
        Ok(state)
    }
}
