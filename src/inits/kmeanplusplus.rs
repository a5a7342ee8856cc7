use crate::{DistanceFunction, Error, KMeans, KMeansConfig, KMeansState, Primitive, Result};
use rand::distributions::{Distribution, WeightedIndex};
use rand::prelude::*;

#[inline(always)]
pub fn calculate<T, D>(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    let mut rnd = config.rnd.borrow_mut();
    { // Randomly select first centroid
        let first_idx = rnd.gen_range(0, kmean.sample_cnt);
        state.set_centroid_from_iter(0, kmean.sample(first_idx).iter().cloned());
    }
    for k in 1..state.k { // For each following centroid...
        // Calculate distances & update cluster-assignments
        kmean.update_cluster_assignments(state, Some(k), config.execution);

        // Each sample's probability to become the next centroid is proportional to its squared distance
        let weights: Vec<T> = state.centroid_distances.iter()
            .map(|&d| d * d)
            .collect();
        let centroid_index = WeightedIndex::new(weights).map_err(|e| Error::InvalidConfiguration(
            format!("k-means++ can not pick centroid {}: {}", k, e)))?;
        let sampled_centroid_id = centroid_index.sample(&mut *rnd);
        state.set_centroid_from_iter(k, kmean.sample(sampled_centroid_id).iter().cloned());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EuclideanDistance;

    #[test]
    fn spreads_centroids_over_separated_groups() {
        // two tight groups: the second centroid has to come from the group not holding the first one
        let samples = vec![0.0f64, 0.1, 0.2, 100.0, 100.1, 100.2];
        let kmean = KMeans::new(samples, 6, 1, EuclideanDistance).unwrap();
        for seed in 0..10 {
            let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(seed)).build();
            let mut state = KMeansState::new(6, 1, 2);
            calculate(&kmean, &mut state, &conf).unwrap();
            assert!((state.centroids[0] < 50.0) != (state.centroids[1] < 50.0), "seed {}: {:?}", seed, state.centroids);
        }
    }

    #[test]
    fn identical_samples_can_not_be_spread() {
        let kmean = KMeans::new(vec![1.0f64; 4], 4, 1, EuclideanDistance).unwrap();
        let mut state = KMeansState::new(4, 1, 2);
        let res = calculate(&kmean, &mut state, &KMeansConfig::default());
        assert!(matches!(res, Err(Error::InvalidConfiguration(_))));
    }
}
