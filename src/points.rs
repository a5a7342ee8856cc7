use crate::seqfile::{self, SequenceWriter};
use crate::{Error, Primitive, Result};
use std::path::Path;
use tracing::info;

/// Nine points on a plane, forming two well separated groups.
pub const SAMPLE_POINTS: [[f64; 2]; 9] = [
    [1.0, 1.0], [2.0, 1.0], [1.0, 2.0],
    [2.0, 2.0], [3.0, 3.0], [8.0, 8.0],
    [9.0, 8.0], [8.0, 9.0], [9.0, 9.0],
];

/// Turns raw coordinates into owned vectors of the requested primitive.
pub fn get_points<T: Primitive, const D: usize>(raw: &[[f64; D]]) -> Vec<Vec<T>> {
    raw.iter()
        .map(|coords| coords.iter().map(|&c| T::from(c).unwrap_or_else(T::nan)).collect())
        .collect()
}

/// Writes **points** to a record file, keyed by their position (`0..N`). Returns the amount of records.
pub fn write_points_to_file<T: Primitive, P: AsRef<Path>>(points: &[Vec<T>], path: P) -> Result<u64> {
    if points.is_empty() {
        return Err(Error::EmptyInput("no points to write".into()));
    }
    let mut writer = SequenceWriter::<u64, Vec<T>>::create(path.as_ref())?;
    for (rec_num, point) in points.iter().enumerate() {
        writer.append(&(rec_num as u64), point)?;
    }
    let written = writer.close()?;
    info!(points = written, path = %path.as_ref().display(), "points written");
    Ok(written)
}

/// Reads the points stored under **path** (a file, or a directory of part files). All points have to share
/// one dimension.
pub fn read_points<T: Primitive, P: AsRef<Path>>(path: P) -> Result<Vec<Vec<T>>> {
    let points: Vec<Vec<T>> = seqfile::read_all::<u64, Vec<T>, _>(path)?
        .into_iter()
        .map(|(_, point)| point)
        .collect();
    if let Some(first) = points.first() {
        let expected = first.len();
        if let Some(other) = points.iter().find(|p| p.len() != expected) {
            return Err(Error::DimensionMismatch { expected, actual: other.len() });
        }
    }
    Ok(points)
}
