use crate::{DistanceFunction, Primitive};

pub struct EuclideanDistance;

impl<T: Primitive> DistanceFunction<T> for EuclideanDistance {
    #[inline(always)]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        SquaredEuclideanDistance.distance(a, b).sqrt()
    }
}

/// Same ordering as [`EuclideanDistance`], without the final square root.
pub struct SquaredEuclideanDistance;

impl<T: Primitive> DistanceFunction<T> for SquaredEuclideanDistance {
    #[inline(always)]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        a.iter().zip(b.iter())
            .map(|(&sp, &cp)| sp - cp)      // <sample> - <centroid>
            .map(|v| v * v)                 // <vec_components> ^2
            .sum()
    }
}
