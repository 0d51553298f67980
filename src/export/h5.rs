use std::path::{Path, PathBuf};

use tracing::debug;

use super::{chunk_path, ChunkSink, ExportError, FeatureChunk};

/// Writes each chunk to `<base>.<index>.h5`.
#[derive(Debug)]
pub struct Hdf5ChunkWriter {
    base: PathBuf,
    written: Vec<PathBuf>,
}

impl Hdf5ChunkWriter {
    /// Writer for files named after `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far.
    pub fn files(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_file(path: &Path, chunk: &FeatureChunk<'_>) -> hdf5::Result<()> {
        let file = hdf5::File::create(path)?;
        file.new_dataset_builder()
            .with_data(chunk.positions)
            .create("position")?;
        file.new_dataset_builder()
            .with_data(chunk.weights)
            .create("simpleWeight")?;
        if let Some(labels) = chunk.labels {
            file.new_dataset_builder().with_data(labels).create("label")?;
        }
        file.close()
    }
}

impl ChunkSink for Hdf5ChunkWriter {
    type Error = ExportError;

    fn write_chunk(&mut self, chunk: FeatureChunk<'_>) -> Result<(), Self::Error> {
        let path = chunk_path(&self.base, chunk.index);
        Self::write_file(&path, &chunk).map_err(|err| ExportError::Hdf5 {
            message: err.to_string(),
            path: path.clone(),
        })?;
        debug!(path = %path.display(), records = chunk.len(), "wrote HDF5 chunk");
        self.written.push(path);
        Ok(())
    }
}
