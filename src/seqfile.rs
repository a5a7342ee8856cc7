//! Typed key/value record files.
//!
//! A record file is written once, front to back, and read sequentially. Its layout is:
//!
//! | part    | content                                                                 |
//! |---------|-------------------------------------------------------------------------|
//! | magic   | the 4 bytes `KSEQ`                                                      |
//! | header  | `u32` little-endian length, followed by the bincode-encoded [`Header`]  |
//! | records | per record: `u32` little-endian length, followed by bincode `(key, value)` |
//!
//! The header names the key and value types, so opening a file with the wrong types fails early instead
//! of producing garbage.

use crate::error::io_error;
use crate::{Error, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

const MAGIC: &[u8; 4] = b"KSEQ";
const VERSION: u8 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub version: u8,
    pub key_type: String,
    pub value_type: String,
}
impl Header {
    fn of<K, V>() -> Self {
        Header {
            version: VERSION,
            key_type: std::any::type_name::<K>().to_string(),
            value_type: std::any::type_name::<V>().to_string(),
        }
    }
}

fn write_frame<W: Write>(out: &mut W, bytes: &[u8]) -> std::io::Result<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| std::io::Error::new(ErrorKind::InvalidInput, "record larger than 4 GiB"))?;
    out.write_all(&len.to_le_bytes())?;
    out.write_all(bytes)
}

/// Reads one length-prefixed frame. `Ok(None)` means the reader was exactly at its end.
fn read_frame<R: Read>(input: &mut R) -> std::io::Result<Option<Vec<u8>>> {
    let mut len = [0u8; 4];
    let mut filled = 0;
    while filled < len.len() {
        match input.read(&mut len[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(ErrorKind::UnexpectedEof.into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    let mut frame = vec![0u8; u32::from_le_bytes(len) as usize];
    input.read_exact(&mut frame)?;
    Ok(Some(frame))
}


/// Appends `(key, value)` records to a new record file.
pub struct SequenceWriter<K: Serialize, V: Serialize> {
    path: PathBuf,
    out: BufWriter<File>,
    records: u64,
    _p: PhantomData<(K, V)>,
}
impl<K: Serialize, V: Serialize> SequenceWriter<K, V> {
    /// Create (or truncate) the record file at **path**. Missing parent directories are created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let mut out = BufWriter::new(File::create(path).map_err(io_error(path))?);
        out.write_all(MAGIC).map_err(io_error(path))?;
        write_frame(&mut out, &bincode::serialize(&Header::of::<K, V>())?).map_err(io_error(path))?;
        Ok(Self { path: path.to_path_buf(), out, records: 0, _p: PhantomData })
    }

    pub fn append(&mut self, key: &K, value: &V) -> Result<()> {
        let bytes = bincode::serialize(&(key, value))?;
        write_frame(&mut self.out, &bytes).map_err(io_error(&self.path))?;
        self.records += 1;
        Ok(())
    }

    /// Flush all records to disk. Returns the amount of records written.
    pub fn close(mut self) -> Result<u64> {
        self.out.flush().map_err(io_error(&self.path))?;
        debug!(path = %self.path.display(), records = self.records, "record file written");
        Ok(self.records)
    }
}


/// Sequentially reads the `(key, value)` records of a record file.
pub struct SequenceReader<K, V> {
    path: PathBuf,
    input: BufReader<File>,
    _p: PhantomData<(K, V)>,
}
impl<K: DeserializeOwned, V: DeserializeOwned> SequenceReader<K, V> {
    /// Open the record file at **path**, verifying that it holds records of the key type **K** and
    /// value type **V**.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let invalid = |reason: String| Error::InvalidRecordFile { path: path.to_path_buf(), reason };
        let mut input = BufReader::new(File::open(path).map_err(io_error(path))?);

        let mut magic = [0u8; 4];
        input.read_exact(&mut magic).map_err(|_| invalid("file too short".into()))?;
        if &magic != MAGIC {
            return Err(invalid(format!("bad magic {:?}", magic)));
        }
        let header_bytes = read_frame(&mut input).map_err(io_error(path))?
            .ok_or_else(|| invalid("missing header".into()))?;
        let header: Header = bincode::deserialize(&header_bytes)?;
        let expected = Header::of::<K, V>();
        if header != expected {
            return Err(invalid(format!(
                "holds {} -> {} (version {}), expected {} -> {} (version {})",
                header.key_type, header.value_type, header.version,
                expected.key_type, expected.value_type, expected.version)));
        }
        Ok(Self { path: path.to_path_buf(), input, _p: PhantomData })
    }

    /// Read the next record, or `None` at the end of the file.
    pub fn next_record(&mut self) -> Result<Option<(K, V)>> {
        match read_frame(&mut self.input).map_err(io_error(&self.path))? {
            Some(frame) => Ok(Some(bincode::deserialize(&frame)?)),
            None => Ok(None),
        }
    }
}
impl<K: DeserializeOwned, V: DeserializeOwned> Iterator for SequenceReader<K, V> {
    type Item = Result<(K, V)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}


/// The record files making up **path**: a file stands for itself, a directory for all contained files whose
/// names do not start with `_` or `.`, sorted by name.
pub fn part_files<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let meta = fs::metadata(path).map_err(io_error(path))?;
    if meta.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut parts = Vec::new();
    for entry in fs::read_dir(path).map_err(io_error(path))? {
        let entry = entry.map_err(io_error(path))?;
        let hidden = entry.file_name().to_string_lossy().starts_with(|c: char| c == '_' || c == '.');
        if !hidden && entry.file_type().map_err(io_error(&entry.path()))?.is_file() {
            parts.push(entry.path());
        }
    }
    parts.sort();
    Ok(parts)
}

/// Read all records of all part files of **path** (see [`part_files`]).
pub fn read_all<K: DeserializeOwned, V: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<Vec<(K, V)>> {
    let mut records = Vec::new();
    for part in part_files(path)? {
        for record in SequenceReader::open(&part)? {
            records.push(record?);
        }
    }
    Ok(records)
}
