//! Distance measures between two samples of equal dimension.

mod euclideandistance;
mod manhattandistance;
mod cosinedistance;

pub use euclideandistance::{EuclideanDistance, SquaredEuclideanDistance};
pub use manhattandistance::ManhattanDistance;
pub use cosinedistance::CosineDistance;

use crate::memory::Primitive;
use serde::{Deserialize, Serialize};

/// Dissimilarity between two samples. Implementations have to be usable from multiple threads,
/// since cluster assignments may be calculated in parallel.
pub trait DistanceFunction<T: Primitive>: Sync + Send {
    fn distance(&self, a: &[T], b: &[T]) -> T;
}

/// Runtime-selectable distance measure.
///
/// This is what gets stored alongside each cluster within record files, so a cluster read back from disk
/// knows which measure it was built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMeasure {
    Euclidean,
    SquaredEuclidean,
    Manhattan,
    Cosine,
}
impl Default for DistanceMeasure {
    fn default() -> Self { DistanceMeasure::Euclidean }
}
impl<T: Primitive> DistanceFunction<T> for DistanceMeasure {
    #[inline(always)]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        match self {
            DistanceMeasure::Euclidean => EuclideanDistance.distance(a, b),
            DistanceMeasure::SquaredEuclidean => SquaredEuclideanDistance.distance(a, b),
            DistanceMeasure::Manhattan => ManhattanDistance.distance(a, b),
            DistanceMeasure::Cosine => CosineDistance.distance(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_dispatches_to_implementation() {
        let (a, b) = ([1.0f64, 1.0], [4.0f64, 5.0]);
        assert_approx_eq!(DistanceMeasure::Euclidean.distance(&a, &b), 5.0);
        assert_approx_eq!(DistanceMeasure::SquaredEuclidean.distance(&a, &b), 25.0);
        assert_approx_eq!(DistanceMeasure::Manhattan.distance(&a, &b), 7.0);
        assert_approx_eq!(DistanceMeasure::Cosine.distance(&a, &a), 0.0);
    }

    #[test]
    fn default_measure_is_euclidean() {
        assert_eq!(DistanceMeasure::default(), DistanceMeasure::Euclidean);
    }
}
