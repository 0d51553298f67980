#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use poa_features::{AlignedPair, Poa, PoaDelete, PoaInsert, PoaRead, Symbol, TrueReference, PAIR_ALIGNMENT_PROB_1};

const P: f64 = PAIR_ALIGNMENT_PROB_1;

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("POA_FEATURES_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set POA_FEATURES_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path,
            expected,
            actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

pub fn two_reads() -> Vec<PoaRead> {
    vec![PoaRead::new("r0", true), PoaRead::new("r1", false)]
}

/// Consensus `ACG` with a mismatch, an `AC` insertion and a one-base deletion
/// after `C`.
pub fn small_poa() -> Poa {
    let mut poa = Poa::new(b"ACG");
    poa.observe(1, 0, Symbol::A, P)
        .observe(1, 1, Symbol::A, P)
        .observe(2, 0, Symbol::C, P)
        .observe(2, 1, Symbol::T, 0.5 * P)
        .add_insert(2, PoaInsert::new("AC", 2.0 * P, 0.0))
        .add_delete(2, PoaDelete::new(2, 0.5 * P, 0.0))
        .observe(3, 0, Symbol::G, P)
        .observe(3, 1, Symbol::G, P);
    poa
}

/// Truth `ACTG` aligned to the consensus of [`small_poa`].
pub fn small_truth() -> (Vec<AlignedPair>, TrueReference) {
    (
        vec![
            AlignedPair::new(0, 0),
            AlignedPair::new(1, 1),
            AlignedPair::new(2, 3),
        ],
        TrueReference::from_sequence(b"ACTG"),
    )
}
