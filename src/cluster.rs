use crate::seqfile::{self, SequenceWriter};
use crate::vector::format_vector;
use crate::{DistanceMeasure, Error, Primitive, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

/// A cluster as stored within record files: its centroid, the measure it is built with, and how many
/// points it got during the iteration that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Kluster<T> {
    pub id: u32,
    pub center: Vec<T>,
    pub num_observations: u64,
    pub converged: bool,
    pub measure: DistanceMeasure,
}
impl<T: Primitive> Kluster<T> {
    pub fn new(center: Vec<T>, id: u32, measure: DistanceMeasure) -> Self {
        Self { id, center, num_observations: 0, converged: false, measure }
    }

    /// `CL-<id>` while the cluster still moves, `VL-<id>` once it converged.
    pub fn identifier(&self) -> String {
        format!("{}-{}", if self.converged { "VL" } else { "CL" }, self.id)
    }
}

/// `CL-0{n=5 c=[1.800, 1.800]}`
impl<T: Primitive> fmt::Display for Kluster<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{n={} c={}}}", self.identifier(), self.num_observations, format_vector(&self.center))
    }
}

/// Writes the first **k** of **points**, in their given order, as initial clusters with the ids `0..k`.
/// Records are keyed by the clusters' identifiers.
///
/// Fails with [`Error::InvalidConfiguration`] when `k` is `0` or exceeds the amount of points, instead of
/// writing fewer clusters.
pub fn write_seed_clusters<T: Primitive, P: AsRef<Path>>(points: &[Vec<T>], k: usize, measure: DistanceMeasure, path: P) -> Result<Vec<Kluster<T>>> {
    if k == 0 || k > points.len() {
        return Err(Error::InvalidConfiguration(
            format!("can not seed {} clusters from {} points", k, points.len())));
    }
    let mut writer = SequenceWriter::<String, Kluster<T>>::create(path.as_ref())?;
    let seeds: Vec<Kluster<T>> = points.iter().take(k).enumerate()
        .map(|(id, point)| Kluster::new(point.clone(), id as u32, measure))
        .collect();
    for kluster in &seeds {
        writer.append(&kluster.identifier(), kluster)?;
    }
    writer.close()?;
    info!(k, path = %path.as_ref().display(), "seed clusters written");
    Ok(seeds)
}

/// Reads all clusters stored under **path** (a file, or a directory of part files).
pub fn read_clusters<T: Primitive, P: AsRef<Path>>(path: P) -> Result<Vec<Kluster<T>>> {
    Ok(seqfile::read_all::<String, Kluster<T>, _>(path)?
        .into_iter()
        .map(|(_, kluster)| kluster)
        .collect())
}
