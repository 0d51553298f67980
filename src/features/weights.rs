use std::fmt;

use crate::poa::{run_length_bin, PoaGraph, Strand, Symbol, MAX_RUN_LENGTH, SYMBOL_NUMBER_NO_N};

/// Row of the gap slot, directly after the called bases. The no-call `N`
/// indexes to the same row.
const GAP_ROW: usize = SYMBOL_NUMBER_NO_N;

/// Number of values in a [`SimpleWeights`] vector: A/C/G/T and gap, per strand.
pub const SIMPLE_WEIGHT_SIZE: usize = (SYMBOL_NUMBER_NO_N + 1) * 2;

/// Number of values in a [`RleWeights`] vector.
pub const RLE_WEIGHT_SIZE: usize = (SYMBOL_NUMBER_NO_N * MAX_RUN_LENGTH + 1) * 2;

/// Evidence slot in a weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightSlot {
    /// Support for a called base.
    Base(Symbol),
    /// Support for a deletion.
    Gap,
}

impl WeightSlot {
    /// Slot for a symbol. `N` shares its position with [`WeightSlot::Gap`].
    pub fn for_symbol(symbol: Symbol) -> Self {
        if symbol.is_called() {
            WeightSlot::Base(symbol)
        } else {
            WeightSlot::Gap
        }
    }

    /// Position of this slot in the serialised simple weight layout:
    /// `symbol * 2 + strand` for every symbol (`N` lands on the gap row),
    /// `4 * 2 + strand` for gaps.
    pub fn index(self, strand: Strand) -> usize {
        let row = match self {
            WeightSlot::Base(symbol) => symbol.index(),
            WeightSlot::Gap => GAP_ROW,
        };
        let pos = row * 2 + strand.index();
        assert!(pos < SIMPLE_WEIGHT_SIZE);
        pos
    }

    /// Every slot in serialised column order (bases A..T, then gap).
    pub fn all() -> impl Iterator<Item = WeightSlot> {
        Symbol::BASES
            .into_iter()
            .map(WeightSlot::Base)
            .chain(std::iter::once(WeightSlot::Gap))
    }
}

/// Weight schema stored on every feature record.
///
/// Implementations decide how node, deletion and insertion evidence is laid
/// out; the builder and the truth reconciler are shared.
pub trait FeatureWeights: Default + Clone + fmt::Debug {
    /// Add the aggregated base evidence of `node` over `reads`.
    fn add_node_evidence<G: PoaGraph + ?Sized>(&mut self, poa: &G, node: usize, reads: &G::Reads);

    /// Add deletion evidence.
    fn add_gap(&mut self, strand: Strand, weight: f64);

    /// Add evidence for an inserted symbol run.
    fn add_inserted(&mut self, symbol: Symbol, run_length: u32, strand: Strand, weight: f64);
}

/// Per-strand weights for A, C, G, T and gap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleWeights {
    values: [f64; SIMPLE_WEIGHT_SIZE],
}

impl SimpleWeights {
    /// Weight held in a slot.
    pub fn get(&self, slot: WeightSlot, strand: Strand) -> f64 {
        self.values[slot.index(strand)]
    }

    /// Accumulate weight into a slot.
    pub fn add(&mut self, slot: WeightSlot, strand: Strand, weight: f64) {
        self.values[slot.index(strand)] += weight;
    }

    /// Accumulate weight for a symbol; `N` accumulates into the gap slot.
    pub fn add_base(&mut self, symbol: Symbol, strand: Strand, weight: f64) {
        self.add(WeightSlot::for_symbol(symbol), strand, weight);
    }

    /// Raw values in serialised order.
    pub fn as_array(&self) -> &[f64; SIMPLE_WEIGHT_SIZE] {
        &self.values
    }

    /// Values in serialised order divided by `scale`.
    pub fn normalized(&self, scale: f64) -> [f64; SIMPLE_WEIGHT_SIZE] {
        self.values.map(|value| value / scale)
    }

    /// Whether every slot is still zero.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|&value| value == 0.0)
    }
}

impl FeatureWeights for SimpleWeights {
    fn add_node_evidence<G: PoaGraph + ?Sized>(&mut self, poa: &G, node: usize, reads: &G::Reads) {
        let base_weights = poa.strand_base_weights(node, reads);
        for symbol in Symbol::ALL {
            for strand in Strand::BOTH {
                self.add_base(symbol, strand, base_weights.get(symbol, strand));
            }
        }
    }

    fn add_gap(&mut self, strand: Strand, weight: f64) {
        self.add(WeightSlot::Gap, strand, weight);
    }

    fn add_inserted(&mut self, symbol: Symbol, _run_length: u32, strand: Strand, weight: f64) {
        self.add_base(symbol, strand, weight);
    }
}

/// Per-strand weights for each called base at each run length, plus gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RleWeights {
    values: [f64; RLE_WEIGHT_SIZE],
}

impl Default for RleWeights {
    fn default() -> Self {
        Self {
            values: [0.0; RLE_WEIGHT_SIZE],
        }
    }
}

impl RleWeights {
    /// `(symbol * MAX_RUN_LENGTH + bin) * 2 + strand`; gap sits after the last
    /// base row.
    fn base_index(symbol: Symbol, run_length: u32, strand: Strand) -> usize {
        if !symbol.is_called() {
            return Self::gap_index(strand);
        }
        let pos = (symbol.index() * MAX_RUN_LENGTH + run_length_bin(run_length)) * 2 + strand.index();
        assert!(pos < RLE_WEIGHT_SIZE);
        pos
    }

    fn gap_index(strand: Strand) -> usize {
        let pos = (GAP_ROW * MAX_RUN_LENGTH) * 2 + strand.index();
        assert!(pos < RLE_WEIGHT_SIZE);
        pos
    }

    /// Weight for a base run. `N` reads the gap slot.
    pub fn base(&self, symbol: Symbol, run_length: u32, strand: Strand) -> f64 {
        self.values[Self::base_index(symbol, run_length, strand)]
    }

    /// Gap weight.
    pub fn gap(&self, strand: Strand) -> f64 {
        self.values[Self::gap_index(strand)]
    }

    /// Accumulate weight for a base run; `N` accumulates into the gap slot
    /// whatever its run length.
    pub fn add_base(&mut self, symbol: Symbol, run_length: u32, strand: Strand, weight: f64) {
        self.values[Self::base_index(symbol, run_length, strand)] += weight;
    }

    /// Raw values in serialised order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl FeatureWeights for RleWeights {
    fn add_node_evidence<G: PoaGraph + ?Sized>(&mut self, poa: &G, node: usize, reads: &G::Reads) {
        let run_weights = poa.strand_run_length_weights(node, reads);
        for symbol in Symbol::ALL {
            for run_length in 1..=MAX_RUN_LENGTH as u32 {
                for strand in Strand::BOTH {
                    self.add_base(symbol, run_length, strand, run_weights.get(symbol, run_length, strand));
                }
            }
        }
    }

    fn add_gap(&mut self, strand: Strand, weight: f64) {
        self.values[Self::gap_index(strand)] += weight;
    }

    fn add_inserted(&mut self, symbol: Symbol, run_length: u32, strand: Strand, weight: f64) {
        self.add_base(symbol, run_length, strand, weight);
    }
}
