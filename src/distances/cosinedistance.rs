use crate::{DistanceFunction, Primitive};

/// `1 - cos(a, b)`. Two zero vectors have a distance of 0.
pub struct CosineDistance;

impl<T: Primitive> DistanceFunction<T> for CosineDistance {
    fn distance(&self, a: &[T], b: &[T]) -> T {
        let (mut dot, mut norm_a, mut norm_b) = (T::zero(), T::zero(), T::zero());
        a.iter().zip(b.iter()).for_each(|(&x, &y)| {
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
        });
        let mut denominator = norm_a.sqrt() * norm_b.sqrt();
        // rounding may push the product of norms slightly below the dot product
        if denominator < dot {
            denominator = dot;
        }
        if denominator == T::zero() && dot == T::zero() {
            return T::zero();
        }
        T::one() - dot / denominator
    }
}
