use std::ops::{Range, RangeInclusive};

use tracing::{debug, info};

use crate::features::{FeatureStore, SimpleWeights, GAP_LABEL};

/// Number of records in every binary chunk.
pub const CHUNK_SIZE: usize = 1000;

/// Position of one record in the flattened matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "hdf5", derive(hdf5::H5Type))]
#[repr(C)]
pub struct PositionRecord {
    /// Backbone position.
    #[cfg_attr(feature = "hdf5", hdf5(rename = "refPos"))]
    pub ref_pos: i64,
    /// Insert offset.
    #[cfg_attr(feature = "hdf5", hdf5(rename = "insPos"))]
    pub ins_pos: i64,
}

/// Normalised simple weights of one record, in column order.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "hdf5", derive(hdf5::H5Type))]
#[repr(C)]
pub struct SimpleWeightRecord {
    pub a_fwd: f64,
    pub a_rev: f64,
    pub c_fwd: f64,
    pub c_rev: f64,
    pub g_fwd: f64,
    pub g_rev: f64,
    pub t_fwd: f64,
    pub t_rev: f64,
    pub gap_fwd: f64,
    pub gap_rev: f64,
}

impl SimpleWeightRecord {
    fn from_normalized(values: [f64; 10]) -> Self {
        let [a_fwd, a_rev, c_fwd, c_rev, g_fwd, g_rev, t_fwd, t_rev, gap_fwd, gap_rev] = values;
        Self {
            a_fwd,
            a_rev,
            c_fwd,
            c_rev,
            g_fwd,
            g_rev,
            t_fwd,
            t_rev,
            gap_fwd,
            gap_rev,
        }
    }
}

/// Truth label character of one record, stored as a signed native char.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "hdf5", derive(hdf5::H5Type))]
#[repr(C)]
pub struct LabelRecord {
    /// Label character, `_` for gaps.
    pub label: i8,
}

impl LabelRecord {
    /// Record for an ASCII label character.
    pub fn new(base: u8) -> Self {
        Self { label: base as i8 }
    }

    /// Label as an ASCII character.
    pub fn base(&self) -> u8 {
        self.label as u8
    }
}

/// Parallel columns of a flattened feature range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureColumns {
    /// Positions, one per record.
    pub positions: Vec<PositionRecord>,
    /// Weights, one per record.
    pub weights: Vec<SimpleWeightRecord>,
    /// Labels, one per record, when requested.
    pub labels: Option<Vec<LabelRecord>>,
}

impl FeatureColumns {
    /// Flatten every chain entry of `range`, dividing weights by `weight_scale`.
    pub fn collect(
        store: &FeatureStore<SimpleWeights>,
        range: RangeInclusive<usize>,
        output_labels: bool,
        weight_scale: f64,
    ) -> Self {
        let count = store.record_count(range.clone());
        let mut positions = Vec::with_capacity(count);
        let mut weights = Vec::with_capacity(count);
        let mut labels = output_labels.then(|| Vec::with_capacity(count));

        for record in store.records(range) {
            positions.push(PositionRecord {
                ref_pos: record.ref_position as i64,
                ins_pos: record.insert_position as i64,
            });
            weights.push(SimpleWeightRecord::from_normalized(
                record.weights.normalized(weight_scale),
            ));
            if let Some(labels) = labels.as_mut() {
                labels.push(LabelRecord::new(
                    record.label.map_or(GAP_LABEL, |label| label.base),
                ));
            }
        }

        Self {
            positions,
            weights,
            labels,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no records were collected.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn window(&self, index: usize, window: Range<usize>) -> FeatureChunk<'_> {
        FeatureChunk {
            index,
            positions: &self.positions[window.clone()],
            weights: &self.weights[window.clone()],
            labels: self.labels.as_ref().map(|labels| &labels[window]),
        }
    }
}

/// Overlapping fixed-size windows covering `count` records.
///
/// Every window holds exactly `size` records. Windows advance by
/// `size - offset`, spreading the overlap evenly, and the last window is
/// pinned to the end of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    count: usize,
    size: usize,
    total: usize,
    offset: usize,
}

impl ChunkPlan {
    /// Plan for `count` records, or `None` when fewer than `size` exist.
    pub fn new(count: usize, size: usize) -> Option<Self> {
        if size == 0 || count < size {
            return None;
        }
        let total = count.div_ceil(size);
        let offset = (size * total - count) / (count / size);
        Some(Self {
            count,
            size,
            total,
            offset,
        })
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.total
    }

    /// Plans always hold at least one window.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Overlap subtracted per window index.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// First record of window `index`.
    pub fn start(&self, index: usize) -> usize {
        if index + 1 == self.total {
            self.count - self.size
        } else {
            self.size * index - self.offset * index
        }
    }

    /// Record range of window `index`.
    pub fn window(&self, index: usize) -> Range<usize> {
        let start = self.start(index);
        start..start + self.size
    }

    /// Every window in order.
    pub fn windows(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.total).map(move |index| self.window(index))
    }
}

/// One window of records handed to a [`ChunkSink`].
#[derive(Debug, Clone, Copy)]
pub struct FeatureChunk<'a> {
    /// Window index, used to name the output.
    pub index: usize,
    /// Positions in the window.
    pub positions: &'a [PositionRecord],
    /// Weights in the window.
    pub weights: &'a [SimpleWeightRecord],
    /// Labels in the window, when collected.
    pub labels: Option<&'a [LabelRecord]>,
}

impl FeatureChunk<'_> {
    /// Records in the window.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Destination for binary feature chunks.
pub trait ChunkSink {
    /// Error raised by the destination.
    type Error;

    /// Persist one window.
    fn write_chunk(&mut self, chunk: FeatureChunk<'_>) -> Result<(), Self::Error>;
}

/// Result of a chunked export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Every window was written.
    Written {
        /// Number of windows.
        chunks: usize,
    },
    /// Too few records to fill one window; nothing was written.
    InsufficientData {
        /// Records available.
        count: usize,
        /// Records needed.
        minimum: usize,
    },
}

/// Split `columns` into windows of `chunk_size` records and hand each to
/// `sink`.
pub fn export_chunks<S: ChunkSink>(
    columns: &FeatureColumns,
    chunk_size: usize,
    sink: &mut S,
) -> Result<ChunkOutcome, S::Error> {
    let count = columns.len();
    let Some(plan) = ChunkPlan::new(count, chunk_size) else {
        info!(
            count,
            minimum = chunk_size,
            "too few features for binary export; skipping"
        );
        return Ok(ChunkOutcome::InsufficientData {
            count,
            minimum: chunk_size,
        });
    };

    for (index, window) in plan.windows().enumerate() {
        sink.write_chunk(columns.window(index, window))?;
    }

    debug!(
        count,
        chunks = plan.len(),
        offset = plan.offset(),
        "wrote feature chunks"
    );
    Ok(ChunkOutcome::Written { chunks: plan.len() })
}
