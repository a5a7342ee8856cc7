use crate::{DistanceFunction, Error, KMeans, KMeansConfig, KMeansState, Primitive, Result};

#[inline(always)]
pub fn calculate<T, D>(kmean: &KMeans<T, D>, state: &mut KMeansState<T>, _config: &KMeansConfig<'_, T>) -> Result<()>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    if state.k > kmean.sample_cnt {
        return Err(Error::InvalidConfiguration(
            format!("can not take {} initial centroids from {} samples", state.k, kmean.sample_cnt)));
    }
    for ci in 0..state.k {
        state.set_centroid_from_iter(ci, kmean.sample(ci).iter().cloned());
    }
    Ok(())
}
