use crate::Primitive;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Formats a vector as `[1.000, 2.500]`.
pub fn format_vector<T: Primitive>(vector: &[T]) -> String {
    let parts: Vec<String> = vector.iter().map(|v| format!("{:.3}", v)).collect();
    format!("[{}]", parts.join(", "))
}

/// A clustered point, annotated with the weight of its cluster membership and its distance to the
/// cluster's centroid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedVector<T> {
    pub weight: T,
    pub distance: T,
    pub vector: Vec<T>,
}

/// `1.0 : [distance=0.283]: [1.000, 1.000]`
impl<T: Primitive> fmt::Display for WeightedVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} : [distance={:.3}]: {}", self.weight, self.distance, format_vector(&self.vector))
    }
}
