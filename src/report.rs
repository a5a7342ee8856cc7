//! Printing of clustered points.

use crate::seqfile::SequenceReader;
use crate::{Error, Primitive, Result, WeightedVector};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Writes one line per record of the clustered points file at **path** to **out**:
/// `1.0 : [distance=0.283]: [1.000, 1.000] belongs to cluster 0`
///
/// Returns the amount of lines written.
pub fn report_clustered_points<T: Primitive, W: Write>(path: &Path, out: &mut W) -> Result<usize> {
    let mut lines = 0;
    for record in SequenceReader::<u32, WeightedVector<T>>::open(path)? {
        let (cluster_id, point) = record?;
        writeln!(out, "{} belongs to cluster {}", point, cluster_id).map_err(Error::Report)?;
        lines += 1;
    }
    debug!(lines, path = %path.display(), "clustered points reported");
    Ok(lines)
}
