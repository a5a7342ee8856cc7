use num::{NumCast, Zero, Float};
use std::{
    fmt::{Debug, Display, LowerExp}, iter::Sum, ops::{Add, AddAssign, Sub, SubAssign}
};
use rand::distributions::uniform::SampleUniform;
use serde::{de::DeserializeOwned, Serialize};

/// Floating point types the engine can calculate with. Samples, centroids and distances of one
/// calculation always share the same primitive.
///
/// Besides the arithmetic bounds, the primitive has to be serializable, so that points and clusters
/// can be stored within record files.
pub trait Primitive: Add + AddAssign + Sum + Sub + SubAssign + Zero + Float + NumCast + SampleUniform
                + PartialOrd + Copy + Default + Display + Debug + Sync + Send + LowerExp + 'static
                + for<'a> AddAssign<&'a Self> + for<'a> Sub<&'a Self>
                + Serialize + DeserializeOwned {}
impl Primitive for f32 {}
impl Primitive for f64 {}
