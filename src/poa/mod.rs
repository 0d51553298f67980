//! Read-only view of a partial-order alignment consensus graph.
//!
//! The graph builder and the read-partitioning model live outside this crate;
//! feature extraction only needs per-node base evidence, deletion events and
//! insertion events, exposed through [`PoaGraph`]. [`Poa`] is a small
//! in-memory implementation for hosts without a graph type of their own.

mod graph;
mod symbol;

pub use graph::{BaseObservation, Poa, PoaNode, PoaRead};
pub use symbol::{Strand, Symbol, SYMBOL_NUMBER, SYMBOL_NUMBER_NO_N};

/// Longest homopolymer run tracked separately by run-length evidence.
/// Longer runs share the last bin.
pub const MAX_RUN_LENGTH: usize = 10;

/// Bin for a run length: runs `1..=MAX_RUN_LENGTH` map to `0..MAX_RUN_LENGTH`.
#[inline]
pub fn run_length_bin(run_length: u32) -> usize {
    (run_length as usize).clamp(1, MAX_RUN_LENGTH) - 1
}

/// Deletion event anchored on a node. The deleted span starts at the next node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PoaDelete {
    /// Length of the event, counting the anchoring node.
    pub length: usize,
    /// Weight contributed by forward-strand reads.
    pub weight_forward: f64,
    /// Weight contributed by reverse-strand reads.
    pub weight_reverse: f64,
}

impl PoaDelete {
    /// Construct a deletion event.
    pub fn new(length: usize, weight_forward: f64, weight_reverse: f64) -> Self {
        Self {
            length,
            weight_forward,
            weight_reverse,
        }
    }

    /// Weight for the given strand.
    pub fn weight(&self, strand: Strand) -> f64 {
        match strand {
            Strand::Forward => self.weight_forward,
            Strand::Reverse => self.weight_reverse,
        }
    }
}

/// Insertion event following a node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PoaInsert {
    /// Inserted characters, in order.
    pub sequence: Vec<u8>,
    /// Run length per inserted character; empty means every run has length 1.
    pub run_lengths: Vec<u32>,
    /// Weight contributed by forward-strand reads.
    pub weight_forward: f64,
    /// Weight contributed by reverse-strand reads.
    pub weight_reverse: f64,
}

impl PoaInsert {
    /// Construct an insertion of plain (non run-length encoded) characters.
    pub fn new(sequence: impl Into<Vec<u8>>, weight_forward: f64, weight_reverse: f64) -> Self {
        Self {
            sequence: sequence.into(),
            run_lengths: Vec::new(),
            weight_forward,
            weight_reverse,
        }
    }

    /// Attach run lengths, one per inserted character.
    pub fn with_run_lengths(mut self, run_lengths: Vec<u32>) -> Self {
        self.run_lengths = run_lengths;
        self
    }

    /// Run length of the character at `offset` (0-based).
    pub fn run_length_at(&self, offset: usize) -> u32 {
        self.run_lengths.get(offset).copied().unwrap_or(1)
    }

    /// Weight for the given strand.
    pub fn weight(&self, strand: Strand) -> f64 {
        match strand {
            Strand::Forward => self.weight_forward,
            Strand::Reverse => self.weight_reverse,
        }
    }
}

/// Strand-specific base evidence aggregated over a read set for one node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrandBaseWeights {
    weights: [[f64; 2]; SYMBOL_NUMBER],
    /// Sum over every symbol and strand.
    pub total: f64,
    /// Sum over forward-strand evidence.
    pub total_forward: f64,
    /// Sum over reverse-strand evidence.
    pub total_reverse: f64,
}

impl StrandBaseWeights {
    /// Weight for a symbol on a strand.
    pub fn get(&self, symbol: Symbol, strand: Strand) -> f64 {
        self.weights[symbol.index()][strand.index()]
    }

    /// Add evidence, keeping the totals in step.
    pub fn add(&mut self, symbol: Symbol, strand: Strand, weight: f64) {
        self.weights[symbol.index()][strand.index()] += weight;
        self.total += weight;
        match strand {
            Strand::Forward => self.total_forward += weight,
            Strand::Reverse => self.total_reverse += weight,
        }
    }
}

/// Base evidence for one node, split by observed run length as well as strand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunLengthBaseWeights {
    weights: [[[f64; 2]; MAX_RUN_LENGTH]; SYMBOL_NUMBER],
}

impl RunLengthBaseWeights {
    /// Weight for a symbol observed with `run_length` on a strand.
    pub fn get(&self, symbol: Symbol, run_length: u32, strand: Strand) -> f64 {
        self.weights[symbol.index()][run_length_bin(run_length)][strand.index()]
    }

    /// Add evidence for a symbol run.
    pub fn add(&mut self, symbol: Symbol, run_length: u32, strand: Strand, weight: f64) {
        self.weights[symbol.index()][run_length_bin(run_length)][strand.index()] += weight;
    }

    /// Evidence that carries no run-length information: everything lands on
    /// run length 1.
    pub fn from_unit_runs(base: &StrandBaseWeights) -> Self {
        let mut weights = Self::default();
        for symbol in Symbol::ALL {
            for strand in Strand::BOTH {
                weights.add(symbol, 1, strand, base.get(symbol, strand));
            }
        }
        weights
    }
}

/// Read-only access to a consensus graph.
///
/// Node 0 is a sentinel carrying no data; node `i + 1` backs feature
/// position `i`.
pub trait PoaGraph {
    /// Opaque read collection passed through to the weight queries.
    type Reads: ?Sized;

    /// Number of nodes, sentinel included.
    fn node_count(&self) -> usize;

    /// Deletion events anchored on `node`.
    fn deletes(&self, node: usize) -> &[PoaDelete];

    /// Insertion events following `node`.
    fn inserts(&self, node: usize) -> &[PoaInsert];

    /// Strand-specific per-symbol weight of `node` over `reads`.
    fn strand_base_weights(&self, node: usize, reads: &Self::Reads) -> StrandBaseWeights;

    /// Per-symbol, per-run-length weight of `node` over `reads`.
    ///
    /// Graphs built from plain sequences have no run-length information; the
    /// default places all evidence at run length 1.
    fn strand_run_length_weights(&self, node: usize, reads: &Self::Reads) -> RunLengthBaseWeights {
        RunLengthBaseWeights::from_unit_runs(&self.strand_base_weights(node, reads))
    }
}
