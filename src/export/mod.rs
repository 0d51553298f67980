//! Writers for finished feature stores.
//!
//! Two independent forms exist: a human-readable TSV and fixed-size columnar
//! chunks (HDF5 when the `hdf5` feature is enabled). Both walk every chain
//! entry of an inclusive range of backbone positions.

mod chunked;
#[cfg(feature = "hdf5")]
mod h5;
mod tsv;

pub use chunked::{
    export_chunks, ChunkOutcome, ChunkPlan, ChunkSink, FeatureChunk, FeatureColumns, LabelRecord,
    PositionRecord, SimpleWeightRecord, CHUNK_SIZE,
};
#[cfg(feature = "hdf5")]
pub use h5::Hdf5ChunkWriter;
pub use tsv::{render_tsv, write_tsv, TabularWeights};

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Contig and chunk boundaries written into export headers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ChunkMetadata {
    /// Contig name.
    pub contig: Arc<str>,
    /// Chunk start coordinate on the contig.
    pub start: u64,
    /// Chunk end coordinate on the contig.
    pub end: u64,
}

impl ChunkMetadata {
    /// Construct chunk metadata.
    pub fn new(contig: impl Into<Arc<str>>, start: u64, end: u64) -> Self {
        Self {
            contig: contig.into(),
            start,
            end,
        }
    }
}

/// Errors raised while writing export files.
#[derive(Debug, Error)]
pub enum ExportError {
    /// File could not be created or written.
    #[error("I/O error writing {}: {}", .path.display(), .source)]
    Io {
        /// Underlying error.
        source: std::io::Error,
        /// File being written.
        path: PathBuf,
    },

    /// HDF5 library failure.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error writing {}: {message}", .path.display())]
    Hdf5 {
        /// Library error message.
        message: String,
        /// File being written.
        path: PathBuf,
    },
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// `<base>.tsv`
pub fn tsv_path(base: &Path) -> PathBuf {
    with_suffix(base, ".tsv")
}

/// `<base>.<index>.h5`
pub fn chunk_path(base: &Path, index: usize) -> PathBuf {
    with_suffix(base, &format!(".{index}.h5"))
}
