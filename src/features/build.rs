use tracing::{debug, info};

use super::{FeatureStore, FeatureWeights, RleWeights, SimpleWeights};
use crate::poa::{PoaGraph, Strand, Symbol};

/// Build a feature store from a consensus graph.
///
/// Backbone position `i` is fed by node `i + 1`. Deletions anchored on a
/// position add gap weight to the positions after it; insertions add weight
/// to the chain entries of the position they follow, sharing entries across
/// reads whose inserted columns coincide.
pub fn build_features<W, G>(poa: &G, reads: &G::Reads) -> FeatureStore<W>
where
    W: FeatureWeights,
    G: PoaGraph + ?Sized,
{
    let len = poa.node_count().saturating_sub(1);
    let mut store: FeatureStore<W> = FeatureStore::with_backbone(len);
    let mut dropped_deletes = 0usize;

    for pos in 0..len {
        let node = pos + 1;

        store
            .chain_mut(pos)
            .backbone_mut()
            .weights
            .add_node_evidence(poa, node, reads);

        for delete in poa.deletes(node) {
            // the deleted span starts after the anchoring position
            for k in 1..delete.length {
                let target = pos + k;
                if target >= len {
                    info!(
                        position = pos,
                        length = delete.length,
                        "encountered delete extending past the end of the POA"
                    );
                    dropped_deletes += 1;
                    break;
                }
                let weights = &mut store.chain_mut(target).backbone_mut().weights;
                for strand in Strand::BOTH {
                    weights.add_gap(strand, delete.weight(strand));
                }
            }
        }

        for insert in poa.inserts(node) {
            let chain = store.chain_mut(pos);
            for (k, &character) in insert.sequence.iter().enumerate() {
                let symbol = Symbol::from_ascii(character);
                let run_length = insert.run_length_at(k);
                let weights = &mut chain.insert_entry_mut(k + 1).weights;
                for strand in Strand::BOTH {
                    weights.add_inserted(symbol, run_length, strand, insert.weight(strand));
                }
            }
        }
    }

    debug!(
        positions = len,
        records = store.total_records(),
        dropped_deletes,
        "built feature store"
    );
    store
}

/// Build features with the simple (symbol × strand) weight schema.
pub fn build_simple_features<G: PoaGraph + ?Sized>(
    poa: &G,
    reads: &G::Reads,
) -> FeatureStore<SimpleWeights> {
    build_features(poa, reads)
}

/// Build features with the run-length (symbol × run length × strand) schema.
pub fn build_rle_features<G: PoaGraph + ?Sized>(poa: &G, reads: &G::Reads) -> FeatureStore<RleWeights> {
    build_features(poa, reads)
}
