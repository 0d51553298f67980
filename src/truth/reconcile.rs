use std::ops::RangeInclusive;

use tracing::debug;

use super::{AlignedPair, TrueReference, TruthError};
use crate::features::{FeatureStore, Label};

/// Backbone positions bounded by the first and last truth matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedRange {
    /// First backbone position matched at insert offset 0.
    pub first: usize,
    /// Last backbone position matched at insert offset 0.
    pub last: usize,
}

impl MatchedRange {
    /// Inclusive range of backbone positions.
    pub fn as_range(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// Label every record of `store` against the truth alignment.
///
/// `alignment` must be ordered, non-decreasing in both coordinates. The
/// reference cursor starts at the first pair's reference position. Returns
/// `None` when no backbone record was matched.
pub fn annotate<W: Default>(
    store: &mut FeatureStore<W>,
    alignment: &[AlignedPair],
    reference: &TrueReference,
) -> Result<Option<MatchedRange>, TruthError> {
    let mut pairs = alignment.iter().peekable();
    let mut cursor = alignment.first().map_or(0, |pair| pair.reference_position);
    let mut first_matched = None;
    let mut last_matched = None;
    let mut synthesized = 0usize;

    for position in 0..store.len() {
        let chain = store.chain_mut(position);

        for record in chain.iter_mut() {
            let offset = record.insert_position;
            let Some(pair) = pairs.peek().copied() else {
                // past the end of the truth alignment
                record.label = Some(Label::GAP);
                continue;
            };

            if pair.feature_position < position || pair.reference_position < cursor {
                return Err(TruthError::OrderingViolation {
                    feature_position: pair.feature_position,
                    reference_position: pair.reference_position,
                    position,
                    cursor,
                });
            }

            let label = if pair.feature_position == position && pair.reference_position == cursor {
                let label = reference.label(cursor)?;
                cursor += 1;
                pairs.next();
                if offset == 0 {
                    first_matched.get_or_insert(position);
                    last_matched = Some(position);
                }
                label
            } else if cursor < pair.reference_position {
                // truth has characters the consensus aligns nowhere
                let label = reference.label(cursor)?;
                cursor += 1;
                label
            } else if position < pair.feature_position {
                Label::GAP
            } else {
                return Err(TruthError::UnhandledCase { position, offset });
            };
            record.label = Some(label);
        }

        // truth insertions with no generated column
        while let Some(pair) = pairs.peek() {
            if position >= pair.feature_position || cursor >= pair.reference_position {
                break;
            }
            let label = reference.label(cursor)?;
            chain.push_insert().label = Some(label);
            cursor += 1;
            synthesized += 1;
        }
    }

    let unconsumed = pairs.count();
    debug!(
        synthesized,
        unconsumed,
        first = ?first_matched,
        last = ?last_matched,
        "annotated features with truth"
    );

    Ok(first_matched
        .zip(last_matched)
        .map(|(first, last)| MatchedRange { first, last }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::SimpleWeights;

    fn pairs(coords: &[(usize, usize)]) -> Vec<AlignedPair> {
        coords
            .iter()
            .map(|&(feature, reference)| AlignedPair::new(feature, reference))
            .collect()
    }

    fn labels(store: &FeatureStore<SimpleWeights>) -> Vec<(usize, usize, char)> {
        store
            .records(0..=store.len() - 1)
            .map(|record| {
                (
                    record.ref_position,
                    record.insert_position,
                    record.label.map_or('?', |label| label.base as char),
                )
            })
            .collect()
    }

    #[test]
    fn skipped_reference_character_becomes_synthesized_insert() {
        let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(2);
        let reference = TrueReference::from_sequence(b"XYZ");

        let range = annotate(&mut store, &pairs(&[(0, 0), (1, 2)]), &reference).unwrap();

        assert_eq!(range, Some(MatchedRange { first: 0, last: 1 }));
        assert_eq!(labels(&store), vec![(0, 0, 'X'), (0, 1, 'Y'), (1, 0, 'Z')]);
        let synthesized = store.chain(0).get(1).unwrap();
        assert!(synthesized.weights.is_empty());
    }

    #[test]
    fn existing_inserts_take_pending_reference_characters() {
        let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(3);
        store.chain_mut(1).insert_entry_mut(2);
        let reference = TrueReference::from_sequence(b"ACTG");

        let range = annotate(&mut store, &pairs(&[(0, 0), (1, 1), (2, 3)]), &reference).unwrap();

        assert_eq!(range.map(|r| r.as_range()), Some(0..=2));
        assert_eq!(
            labels(&store),
            vec![(0, 0, 'A'), (1, 0, 'C'), (1, 1, 'T'), (1, 2, '_'), (2, 0, 'G')]
        );
    }

    #[test]
    fn unaligned_flanks_are_gaps_outside_matched_range() {
        let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(5);
        let reference = TrueReference::from_sequence(b"NNNNNACG");

        let range = annotate(&mut store, &pairs(&[(1, 5), (2, 6), (3, 7)]), &reference).unwrap();

        assert_eq!(range, Some(MatchedRange { first: 1, last: 3 }));
        assert_eq!(
            labels(&store),
            vec![(0, 0, '_'), (1, 0, 'A'), (2, 0, 'C'), (3, 0, 'G'), (4, 0, '_')]
        );
    }

    #[test]
    fn consensus_deletion_is_labelled_as_gap() {
        let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(3);
        let reference = TrueReference::from_sequence(b"AC");

        let range = annotate(&mut store, &pairs(&[(0, 0), (2, 1)]), &reference).unwrap();

        assert_eq!(range, Some(MatchedRange { first: 0, last: 2 }));
        assert_eq!(labels(&store), vec![(0, 0, 'A'), (1, 0, '_'), (2, 0, 'C')]);
    }

    #[test]
    fn run_lengths_travel_with_labels() {
        let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(2);
        let reference = TrueReference::run_length_encode(b"AAAT");

        annotate(&mut store, &pairs(&[(0, 0), (1, 1)]), &reference).unwrap();

        assert_eq!(store.chain(0).backbone().label, Some(Label::base(b'A', 3)));
        assert_eq!(store.chain(1).backbone().label, Some(Label::base(b'T', 1)));
    }

    #[test]
    fn empty_alignment_labels_everything_as_gap() {
        let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(2);
        store.chain_mut(0).insert_entry_mut(1);
        let reference = TrueReference::from_sequence(b"AC");

        let range = annotate(&mut store, &[], &reference).unwrap();

        assert_eq!(range, None);
        assert!(store
            .records(0..=1)
            .all(|record| record.label == Some(Label::GAP)));
    }

    #[test]
    fn regressing_reference_position_is_fatal() {
        let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(3);
        let reference = TrueReference::from_sequence(b"ACGT");

        let err = annotate(&mut store, &pairs(&[(0, 2), (1, 1)]), &reference).unwrap_err();

        assert_eq!(
            err,
            TruthError::OrderingViolation {
                feature_position: 1,
                reference_position: 1,
                position: 1,
                cursor: 3,
            }
        );
    }

    #[test]
    fn pair_left_behind_is_fatal() {
        let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(3);
        let reference = TrueReference::from_sequence(b"ACGT");

        // a second pair on feature 0 is still pending when position 1 starts
        let err = annotate(&mut store, &pairs(&[(0, 0), (0, 2)]), &reference).unwrap_err();

        assert!(matches!(err, TruthError::OrderingViolation { position: 1, .. }));
    }

    #[test]
    fn short_reference_is_reported() {
        let mut store: FeatureStore<SimpleWeights> = FeatureStore::with_backbone(2);
        let reference = TrueReference::from_sequence(b"A");

        let err = annotate(&mut store, &pairs(&[(0, 0), (1, 1)]), &reference).unwrap_err();

        assert_eq!(err, TruthError::ReferenceOutOfBounds { position: 1, len: 1 });
    }
}
