//! # Feature extraction for partial-order alignment consensus
//!
//! Turns the evidence held in a consensus graph (per-read base observations,
//! deletions and insertions) into a matrix of weight vectors, one column per
//! consensus base and per inserted position, for downstream polishing models.
//!
//! ## Pipeline
//!
//! 1. **Build**: walk the graph backbone and aggregate strand-split weights
//!    into a [`FeatureStore`] (see [`features`]).
//! 2. **Label** (optional): reconcile the store with an alignment of the
//!    consensus against a trusted reference, attaching a truth character to
//!    every column and synthesising columns the consensus missed (see
//!    [`truth`]).
//! 3. **Export**: write a TSV and, with the `hdf5` feature, fixed-size binary
//!    chunks (see [`export`]).
//!
//! ## Usage Example
//!
//! ```
//! use poa_features::{build_simple_features, render_tsv, ChunkMetadata, Poa, PoaRead, Symbol};
//!
//! let reads = vec![PoaRead::new("read-1", true)];
//! let mut poa = Poa::new(b"AC");
//! poa.observe(1, 0, Symbol::A, 1.0).observe(2, 0, Symbol::C, 1.0);
//!
//! let store = build_simple_features(&poa, &reads);
//! let tsv = render_tsv(&ChunkMetadata::new("chr1", 0, 2), &store, store.full_range(), false, 1.0)?;
//! assert_eq!(tsv.lines().count(), 6);
//! # Ok::<(), anyhow::Error>(())
//! ```

#![warn(missing_docs, missing_debug_implementations)]

pub mod export; // TSV and chunked binary writers
pub mod features; // Feature records and weight schemas
pub mod poa; // Consensus graph interface
pub mod truth; // Ground-truth labelling

pub use export::{
    render_tsv, write_tsv, ChunkMetadata, ChunkOutcome, ExportError, FeatureColumns, CHUNK_SIZE,
};
pub use features::{
    build_features, build_rle_features, build_simple_features, FeatureRecord, FeatureStore,
    FeatureWeights, Label, RleWeights, SimpleWeights,
};
pub use poa::{Poa, PoaDelete, PoaGraph, PoaInsert, PoaRead, Strand, Symbol};
pub use truth::{annotate, AlignedPair, MatchedRange, TrueReference, TruthError};

use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{info, info_span};

use export::TabularWeights;

/// Scale of graph weights: one unit of alignment probability.
pub const PAIR_ALIGNMENT_PROB_1: f64 = 10_000_000.0;

/// Weight schema selected for an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum FeatureType {
    /// A/C/G/T/gap per strand.
    #[default]
    SimpleWeight,
    /// A/C/G/T per run length per strand, plus gap.
    RunLengthWeight,
}

impl FeatureType {
    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            FeatureType::SimpleWeight => "simpleWeight",
            FeatureType::RunLengthWeight => "rleWeight",
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureType {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simpleweight" | "simple" => Ok(FeatureType::SimpleWeight),
            "rleweight" | "rle" => Ok(FeatureType::RunLengthWeight),
            _ => Err(FeatureError::UnknownFeatureType(s.to_string())),
        }
    }
}

/// Crate-level configuration errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FeatureError {
    /// Feature type name not recognised.
    #[error("unknown feature type: {0}")]
    UnknownFeatureType(String),

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Parameters of a feature export.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureConfig {
    /// Weight schema.
    pub feature_type: FeatureType,
    /// Divisor applied to weights on output.
    pub weight_scale: f64,
    /// Records per binary chunk.
    pub chunk_size: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            feature_type: FeatureType::default(),
            weight_scale: PAIR_ALIGNMENT_PROB_1,
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl FeatureConfig {
    /// Select the weight schema.
    pub fn with_feature_type(mut self, feature_type: FeatureType) -> Self {
        self.feature_type = feature_type;
        self
    }

    /// Set the output weight divisor.
    pub fn with_weight_scale(mut self, weight_scale: f64) -> Self {
        self.weight_scale = weight_scale;
        self
    }

    /// Set the binary chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Reject values no export can use.
    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.chunk_size == 0 {
            return Err(FeatureError::InvalidConfiguration(
                "chunk size must be > 0".to_string(),
            ));
        }
        if !(self.weight_scale.is_finite() && self.weight_scale > 0.0) {
            return Err(FeatureError::InvalidConfiguration(format!(
                "weight scale must be positive and finite, got {}",
                self.weight_scale
            )));
        }
        Ok(())
    }
}

/// Truth data used to label an export.
#[derive(Debug, Clone, Copy)]
pub struct TruthInput<'a> {
    /// Ordered alignment of backbone positions to reference runs.
    pub alignment: &'a [AlignedPair],
    /// Run-length encoded true reference.
    pub reference: &'a TrueReference,
}

/// Summary of a completed export.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureExport {
    /// TSV written.
    pub tsv_path: PathBuf,
    /// Records written to the TSV.
    pub record_count: usize,
    /// Backbone positions exported, `None` when nothing was.
    pub range: Option<RangeInclusive<usize>>,
    /// Binary export outcome, when one ran.
    pub chunks: Option<ChunkOutcome>,
}

/// Build, optionally label, and write the features of one graph.
///
/// With truth, only the matched range is exported and labels are written;
/// without it every backbone position is exported unlabelled. The TSV goes to
/// `<output_base>.tsv`. With the `hdf5` feature the simple schema is also
/// written as `<output_base>.<index>.h5` chunks.
pub fn write_features<G: PoaGraph + ?Sized>(
    config: &FeatureConfig,
    poa: &G,
    reads: &G::Reads,
    output_base: &Path,
    chunk: &ChunkMetadata,
    truth: Option<TruthInput<'_>>,
) -> Result<FeatureExport> {
    config.validate()?;
    let span = info_span!(
        "write_features",
        contig = %chunk.contig,
        start = chunk.start,
        end = chunk.end,
        feature_type = %config.feature_type,
    );
    let _guard = span.enter();

    match config.feature_type {
        FeatureType::SimpleWeight => {
            let mut store = build_simple_features(poa, reads);
            let export = label_and_write_tsv(config, &mut store, output_base, chunk, truth)?;
            #[cfg(feature = "hdf5")]
            let export = FeatureExport {
                chunks: Some(write_chunks(
                    config,
                    &store,
                    output_base,
                    export.range.clone(),
                    truth.is_some(),
                )?),
                ..export
            };
            Ok(export)
        }
        FeatureType::RunLengthWeight => {
            let mut store = build_rle_features(poa, reads);
            label_and_write_tsv(config, &mut store, output_base, chunk, truth)
        }
    }
}

fn label_and_write_tsv<W: FeatureWeights + TabularWeights>(
    config: &FeatureConfig,
    store: &mut FeatureStore<W>,
    output_base: &Path,
    chunk: &ChunkMetadata,
    truth: Option<TruthInput<'_>>,
) -> Result<FeatureExport> {
    let range = match truth {
        Some(truth) => annotate(store, truth.alignment, truth.reference)
            .context("failed to label features with the true reference")?
            .map(|matched| matched.as_range()),
        None => store.full_range(),
    };

    let tsv_path = export::tsv_path(output_base);
    let file = File::create(&tsv_path).map_err(|source| ExportError::Io {
        source,
        path: tsv_path.clone(),
    })?;
    let mut writer = BufWriter::new(file);
    write_tsv(
        &mut writer,
        chunk,
        store,
        range.clone(),
        truth.is_some(),
        config.weight_scale,
    )
    .with_context(|| format!("failed to write features to {}", tsv_path.display()))?;

    let record_count = range.clone().map_or(0, |range| store.record_count(range));
    info!(path = %tsv_path.display(), records = record_count, "wrote feature TSV");

    Ok(FeatureExport {
        tsv_path,
        record_count,
        range,
        chunks: None,
    })
}

#[cfg(feature = "hdf5")]
fn write_chunks(
    config: &FeatureConfig,
    store: &FeatureStore<SimpleWeights>,
    output_base: &Path,
    range: Option<RangeInclusive<usize>>,
    output_labels: bool,
) -> Result<ChunkOutcome> {
    let columns = range
        .map(|range| FeatureColumns::collect(store, range, output_labels, config.weight_scale))
        .unwrap_or_default();
    let mut writer = export::Hdf5ChunkWriter::new(output_base);
    export::export_chunks(&columns, config.chunk_size, &mut writer)
        .with_context(|| format!("failed to write HDF5 chunks for {}", output_base.display()))
}
