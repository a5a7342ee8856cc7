use crate::{DistanceFunction, Error, KMeans, KMeansConfig, KMeansState, Primitive, Result};

#[inline(always)]
pub fn calculate<T, D>(
    kmean: &KMeans<T, D>, state: &mut KMeansState<T>, _config: &KMeansConfig<'_, T>, computed: Vec<T>,
) -> Result<()>
where
    T: Primitive,
    D: DistanceFunction<T>,
{
    if computed.len() != state.k * kmean.sample_dims {
        return Err(Error::InvalidConfiguration(format!(
            "expected {} precomputed centroids of dimension {}, got {} values",
            state.k, kmean.sample_dims, computed.len())));
    }
    computed.chunks_exact(kmean.sample_dims).enumerate().for_each(|(ci, c)| {
        state.set_centroid_from_iter(ci, c.iter().cloned());
    });
    Ok(())
}
