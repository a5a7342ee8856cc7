use crate::{DistanceFunction, Primitive};

pub struct ManhattanDistance;

impl<T: Primitive> DistanceFunction<T> for ManhattanDistance {
    #[inline(always)]
    fn distance(&self, a: &[T], b: &[T]) -> T {
        a.iter().zip(b.iter())
            .map(|(&x, &y)| (x - y).abs())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance() {
        assert_approx_eq!(ManhattanDistance.distance(&[1.0f64, 1.0], &[3.0, -2.0]), 5.0);
    }
}
