use std::collections::HashSet;

use blake3::hash;
use poa_features::{
    annotate, build_simple_features, render_tsv, AlignedPair, ChunkMetadata, Poa, PoaInsert,
    PoaRead, Symbol, TrueReference,
};

#[test]
fn labelled_export_is_deterministic() {
    let reads: Vec<PoaRead> = (0..6)
        .map(|idx| PoaRead::new(format!("read-{idx}"), idx % 2 == 0))
        .collect();
    let consensus = b"ACGTTGCAACGT";
    let alignment: Vec<AlignedPair> = (0..consensus.len())
        .map(|pos| AlignedPair::new(pos, pos + pos / 4))
        .collect();
    let reference = TrueReference::run_length_encode(b"ACGTGTGCAGACGGTAA");

    let mut fingerprints = HashSet::new();
    for _ in 0..5 {
        let mut poa = Poa::new(consensus);
        for (pos, &base) in consensus.iter().enumerate() {
            for read in 0..reads.len() {
                poa.observe(pos + 1, read, Symbol::from_ascii(base), 0.25 + read as f64);
            }
            if pos % 3 == 1 {
                poa.add_insert(pos + 1, PoaInsert::new("GA", 1.5, 0.5));
            }
        }

        let mut store = build_simple_features(&poa, &reads);
        let range = annotate(&mut store, &alignment, &reference)
            .expect("annotation succeeds")
            .map(|matched| matched.as_range());
        let tsv = render_tsv(&ChunkMetadata::new("chrDet", 0, 12), &store, range, true, 1.0)
            .expect("rendering succeeds");
        fingerprints.insert(hash(tsv.as_bytes()));
    }

    assert_eq!(fingerprints.len(), 1, "outputs diverged across runs");
}
