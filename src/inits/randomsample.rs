use crate::{DistanceFunction, KMeans, KMeansConfig, KMeansState, Primitive, Result};
use rand::prelude::*;

#[inline(always)]
pub fn calculate<T, D>(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    let mut rnd = config.rnd.borrow_mut();
    kmean.samples.chunks_exact(kmean.sample_dims)
        .choose_multiple(&mut *rnd, state.k).iter().cloned()
        .enumerate()
        .for_each(|(ci, c)| { // Copy randomly chosen centroids into state.centroids
            state.set_centroid_from_iter(ci, c.iter().cloned());
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EuclideanDistance;

    #[test]
    fn picks_distinct_samples() {
        let samples: Vec<f64> = (0..20).map(|v| v as f64).collect();
        let kmean = KMeans::new(samples, 20, 1, EuclideanDistance).unwrap();
        let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(42)).build();
        let mut state = KMeansState::new(20, 1, 5);
        calculate(&kmean, &mut state, &conf).unwrap();

        let mut picked = state.centroids.clone();
        picked.sort_by(|a, b| a.partial_cmp(b).unwrap());
        picked.dedup();
        assert_eq!(picked.len(), 5);
        assert!(picked.iter().all(|v| (0.0..20.0).contains(v)));
    }
}
