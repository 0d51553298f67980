use std::sync::Arc;

use tracing::debug;

use super::{PoaDelete, PoaGraph, PoaInsert, RunLengthBaseWeights, StrandBaseWeights, Strand, Symbol};

/// Read that contributed evidence to the graph.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PoaRead {
    /// Read name.
    pub name: Arc<str>,
    /// Whether the read aligned on the forward strand.
    pub forward_strand: bool,
}

impl PoaRead {
    /// Construct a read descriptor.
    pub fn new(name: impl Into<Arc<str>>, forward_strand: bool) -> Self {
        Self {
            name: name.into(),
            forward_strand,
        }
    }

    /// Strand of the read.
    pub fn strand(&self) -> Strand {
        Strand::from_forward(self.forward_strand)
    }
}

/// One read's weighted support for a symbol at a node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseObservation {
    /// Index of the read in the read set.
    pub read: usize,
    /// Observed symbol.
    pub symbol: Symbol,
    /// Observed homopolymer run length (1 for plain sequences).
    pub run_length: u32,
    /// Alignment weight of the observation.
    pub weight: f64,
}

/// Consensus graph node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PoaNode {
    /// Consensus base at this node.
    pub base: u8,
    /// Per-read base evidence.
    pub observations: Vec<BaseObservation>,
    /// Deletions anchored on this node.
    pub deletes: Vec<PoaDelete>,
    /// Insertions following this node.
    pub inserts: Vec<PoaInsert>,
}

impl PoaNode {
    fn new(base: u8) -> Self {
        Self {
            base,
            observations: Vec::new(),
            deletes: Vec::new(),
            inserts: Vec::new(),
        }
    }
}

/// In-memory consensus graph: a sentinel node followed by one node per
/// consensus base.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Poa {
    nodes: Vec<PoaNode>,
}

impl Poa {
    /// Build the backbone for a consensus sequence.
    pub fn new(consensus: &[u8]) -> Self {
        let mut nodes = Vec::with_capacity(consensus.len() + 1);
        nodes.push(PoaNode::new(b'N'));
        nodes.extend(consensus.iter().map(|&base| PoaNode::new(base.to_ascii_uppercase())));
        Self { nodes }
    }

    /// Consensus sequence, sentinel excluded.
    pub fn consensus(&self) -> Vec<u8> {
        self.nodes.iter().skip(1).map(|node| node.base).collect()
    }

    /// Node by index (0 is the sentinel).
    pub fn node(&self, node: usize) -> &PoaNode {
        &self.nodes[node]
    }

    /// Mutable node by index (0 is the sentinel).
    pub fn node_mut(&mut self, node: usize) -> &mut PoaNode {
        &mut self.nodes[node]
    }

    /// Record a plain observation of `symbol` by `read` at `node`.
    pub fn observe(&mut self, node: usize, read: usize, symbol: Symbol, weight: f64) -> &mut Self {
        self.observe_run(node, read, symbol, 1, weight)
    }

    /// Record an observation of a `run_length`-long run of `symbol`.
    pub fn observe_run(
        &mut self,
        node: usize,
        read: usize,
        symbol: Symbol,
        run_length: u32,
        weight: f64,
    ) -> &mut Self {
        self.nodes[node].observations.push(BaseObservation {
            read,
            symbol,
            run_length,
            weight,
        });
        self
    }

    /// Anchor a deletion on `node`.
    pub fn add_delete(&mut self, node: usize, delete: PoaDelete) -> &mut Self {
        self.nodes[node].deletes.push(delete);
        self
    }

    /// Attach an insertion after `node`.
    pub fn add_insert(&mut self, node: usize, insert: PoaInsert) -> &mut Self {
        self.nodes[node].inserts.push(insert);
        self
    }

    fn strand_observations<'a>(
        &'a self,
        node: usize,
        reads: &'a [PoaRead],
    ) -> impl Iterator<Item = (&'a BaseObservation, Strand)> + 'a {
        self.nodes[node]
            .observations
            .iter()
            .filter_map(move |observation| match reads.get(observation.read) {
                Some(read) => Some((observation, read.strand())),
                None => {
                    debug!(
                        node,
                        read = observation.read,
                        "observation references a read outside the read set"
                    );
                    None
                }
            })
    }
}

impl PoaGraph for Poa {
    type Reads = [PoaRead];

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn deletes(&self, node: usize) -> &[PoaDelete] {
        &self.nodes[node].deletes
    }

    fn inserts(&self, node: usize) -> &[PoaInsert] {
        &self.nodes[node].inserts
    }

    fn strand_base_weights(&self, node: usize, reads: &[PoaRead]) -> StrandBaseWeights {
        let mut weights = StrandBaseWeights::default();
        for (observation, strand) in self.strand_observations(node, reads) {
            weights.add(observation.symbol, strand, observation.weight);
        }
        weights
    }

    fn strand_run_length_weights(&self, node: usize, reads: &[PoaRead]) -> RunLengthBaseWeights {
        let mut weights = RunLengthBaseWeights::default();
        for (observation, strand) in self.strand_observations(node, reads) {
            weights.add(
                observation.symbol,
                observation.run_length,
                strand,
                observation.weight,
            );
        }
        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reads() -> Vec<PoaRead> {
        vec![PoaRead::new("fwd", true), PoaRead::new("rev", false)]
    }

    #[test]
    fn backbone_has_leading_sentinel() {
        let poa = Poa::new(b"acg");
        assert_eq!(poa.node_count(), 4);
        assert_eq!(poa.node(0).base, b'N');
        assert_eq!(poa.consensus(), b"ACG".to_vec());
    }

    #[test]
    fn base_weights_split_by_read_strand() {
        let mut poa = Poa::new(b"A");
        poa.observe(1, 0, Symbol::A, 3.0)
            .observe(1, 1, Symbol::A, 1.0)
            .observe(1, 1, Symbol::C, 0.5)
            .observe(1, 7, Symbol::G, 9.0);

        let weights = poa.strand_base_weights(1, &reads());
        assert_eq!(weights.get(Symbol::A, Strand::Forward), 3.0);
        assert_eq!(weights.get(Symbol::A, Strand::Reverse), 1.0);
        assert_eq!(weights.get(Symbol::C, Strand::Reverse), 0.5);
        assert_eq!(weights.get(Symbol::G, Strand::Forward), 0.0);
        assert_eq!(weights.total, 4.5);
        assert_eq!(weights.total_forward, 3.0);
        assert_eq!(weights.total_reverse, 1.5);
    }

    #[test]
    fn run_length_weights_keep_observed_runs() {
        let mut poa = Poa::new(b"T");
        poa.observe_run(1, 0, Symbol::T, 3, 2.0)
            .observe_run(1, 1, Symbol::T, 4, 1.0);

        let weights = poa.strand_run_length_weights(1, &reads());
        assert_eq!(weights.get(Symbol::T, 3, Strand::Forward), 2.0);
        assert_eq!(weights.get(Symbol::T, 4, Strand::Reverse), 1.0);
        assert_eq!(weights.get(Symbol::T, 1, Strand::Forward), 0.0);
    }
}
