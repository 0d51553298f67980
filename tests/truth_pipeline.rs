#[path = "common/mod.rs"]
mod common;

use std::fs;

use common::{small_poa, small_truth, two_reads};
use poa_features::{
    annotate, build_simple_features, write_features, AlignedPair, ChunkMetadata, FeatureConfig,
    FeatureStore, FeatureType, Label, MatchedRange, Poa, PoaRead, SimpleWeights, Symbol,
    TrueReference, TruthError, TruthInput,
};

fn labels(store: &FeatureStore<SimpleWeights>) -> String {
    store
        .records(0..=store.len() - 1)
        .map(|record| record.label.map_or('?', |label| label.base as char))
        .collect()
}

#[test]
fn truth_character_missing_from_consensus_is_synthesized() {
    let reads = vec![PoaRead::new("r", true)];
    let mut poa = Poa::new(b"XZ");
    poa.observe(1, 0, Symbol::A, 1.0).observe(2, 0, Symbol::C, 1.0);
    let mut store = build_simple_features(&poa, &reads);

    let alignment = [AlignedPair::new(0, 0), AlignedPair::new(1, 2)];
    let range = annotate(&mut store, &alignment, &TrueReference::from_sequence(b"XYZ")).unwrap();

    assert_eq!(range, Some(MatchedRange { first: 0, last: 1 }));
    assert_eq!(store.chain(0).len(), 2);
    assert_eq!(labels(&store), "XYZ");
    assert!(store.chain(0).get(1).unwrap().weights.is_empty());
}

#[test]
fn insert_columns_take_truth_then_gap() {
    let mut store = build_simple_features(&small_poa(), &two_reads());
    let (alignment, reference) = small_truth();

    let range = annotate(&mut store, &alignment, &reference).unwrap();

    assert_eq!(range.map(|matched| matched.as_range()), Some(0..=2));
    assert_eq!(labels(&store), "ACT_G");
    assert_eq!(store.chain(1).get(2).unwrap().label, Some(Label::GAP));
}

#[test]
fn reference_cursor_starts_at_first_pair() {
    let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(3);
    let reference = TrueReference::from_sequence(b"GGGAC");

    let range = annotate(
        &mut store,
        &[AlignedPair::new(1, 3), AlignedPair::new(2, 4)],
        &reference,
    )
    .unwrap();

    assert_eq!(range, Some(MatchedRange { first: 1, last: 2 }));
    assert_eq!(labels(&store), "_AC");
}

#[test]
fn out_of_order_alignment_reports_positions() {
    let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(4);
    let reference = TrueReference::from_sequence(b"ACGT");

    let err = annotate(
        &mut store,
        &[AlignedPair::new(2, 1), AlignedPair::new(1, 2)],
        &reference,
    )
    .unwrap_err();

    assert!(matches!(err, TruthError::OrderingViolation { .. }));
    assert!(err.to_string().contains("regresses"));
}

#[test]
fn labelled_export_writes_matched_range_only() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("chr1_100-200");
    let (alignment, reference) = small_truth();
    let truth = TruthInput {
        alignment: &alignment,
        reference: &reference,
    };

    let export = write_features(
        &FeatureConfig::default(),
        &small_poa(),
        &two_reads(),
        &base,
        &ChunkMetadata::new("chr1", 100, 200),
        Some(truth),
    )
    .unwrap();

    assert_eq!(export.tsv_path, dir.path().join("chr1_100-200.tsv"));
    assert_eq!(export.range, Some(0..=2));
    assert_eq!(export.record_count, 5);

    let written = fs::read_to_string(&export.tsv_path).unwrap();
    let rows: Vec<&str> = written.lines().filter(|line| !line.starts_with('#')).collect();
    assert_eq!(rows.len(), 5);
    assert!(rows[2].starts_with("1\t1\tT\t 2.0000"));
}

#[test]
fn unlabelled_export_covers_every_position() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("plain");

    let export = write_features(
        &FeatureConfig::default(),
        &small_poa(),
        &two_reads(),
        &base,
        &ChunkMetadata::new("chr1", 100, 200),
        None,
    )
    .unwrap();

    let written = fs::read_to_string(&export.tsv_path).unwrap();
    let header = written.lines().nth(3).unwrap();
    assert!(header.starts_with("#refPos\tinsPos\tA_fwd"));
    assert_eq!(export.record_count, 5);
}

#[test]
fn run_length_export_adds_run_length_label() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("rle");
    let reads = vec![PoaRead::new("r", true)];
    let mut poa = Poa::new(b"AT");
    poa.observe_run(1, 0, Symbol::A, 3, 1.0)
        .observe_run(2, 0, Symbol::T, 1, 1.0);
    let alignment = [AlignedPair::new(0, 0), AlignedPair::new(1, 1)];
    let reference = TrueReference::run_length_encode(b"AAAT");

    let export = write_features(
        &FeatureConfig::default()
            .with_feature_type(FeatureType::RunLengthWeight)
            .with_weight_scale(1.0),
        &poa,
        &reads,
        &base,
        &ChunkMetadata::new("chr2", 0, 4),
        Some(TruthInput {
            alignment: &alignment,
            reference: &reference,
        }),
    )
    .unwrap();

    assert_eq!(export.chunks, None);
    let written = fs::read_to_string(&export.tsv_path).unwrap();
    let rows: Vec<Vec<&str>> = written
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| line.split('\t').collect())
        .collect();
    assert_eq!(&rows[0][..4], &["0", "0", "A", "3"]);
    // A3_fwd sits after A1 and A2, two strands each
    assert_eq!(rows[0][4 + 4], " 1.0000");
    assert_eq!(&rows[1][..4], &["1", "0", "T", "1"]);
}

#[test]
fn inconsistent_truth_fails_the_export() {
    let dir = tempfile::tempdir().unwrap();
    let alignment = [AlignedPair::new(0, 0), AlignedPair::new(1, 9)];
    let reference = TrueReference::from_sequence(b"AC");

    let err = write_features(
        &FeatureConfig::default(),
        &small_poa(),
        &two_reads(),
        &dir.path().join("bad"),
        &ChunkMetadata::new("chr1", 0, 3),
        Some(TruthInput {
            alignment: &alignment,
            reference: &reference,
        }),
    )
    .unwrap_err();

    assert!(err.downcast_ref::<TruthError>().is_some());
}

#[cfg(feature = "hdf5")]
#[test]
fn simple_export_writes_fixed_size_chunks() {
    use poa_features::export::{chunk_path, ChunkOutcome, PositionRecord};

    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("chunked");
    let reads = vec![PoaRead::new("r", true)];
    let mut poa = Poa::new(b"ACGTACGTAC");
    for node in 1..=10 {
        poa.observe(node, 0, Symbol::A, 1.0);
    }

    let export = write_features(
        &FeatureConfig::default().with_chunk_size(4),
        &poa,
        &reads,
        &base,
        &ChunkMetadata::new("chr3", 0, 10),
        None,
    )
    .unwrap();

    assert_eq!(export.chunks, Some(ChunkOutcome::Written { chunks: 3 }));
    for index in 0..3 {
        let file = hdf5::File::open(chunk_path(&base, index)).unwrap();
        let positions: Vec<PositionRecord> = file.dataset("position").unwrap().read_raw().unwrap();
        assert_eq!(positions.len(), 4);
        assert!(file.dataset("simpleWeight").is_ok());
        assert!(file.dataset("label").is_err());
    }
    assert!(!chunk_path(&base, 3).exists());
}
