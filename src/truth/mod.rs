//! Ground-truth labelling of feature records.
//!
//! The consensus that backs a feature store is aligned (outside this crate)
//! against a trusted reference. [`annotate`] walks that alignment alongside
//! the store, labels every chain entry with the reference character it
//! corresponds to (or a gap), synthesises inserted columns the consensus is
//! missing, and reports the span of backbone positions anchored by matches.

mod reconcile;
mod reference;

pub use reconcile::{annotate, MatchedRange};
pub use reference::TrueReference;

use thiserror::Error;

/// Errors raised while reconciling features with the truth alignment.
///
/// All of these indicate inconsistent upstream data; none are recoverable
/// for the chunk being processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TruthError {
    /// The next alignment pair lies behind the walk's cursors.
    #[error(
        "truth alignment pair (feature {feature_position}, reference {reference_position}) \
         regresses behind feature {position}, reference cursor {cursor}"
    )]
    OrderingViolation {
        /// Feature position of the offending pair.
        feature_position: usize,
        /// Reference position of the offending pair.
        reference_position: usize,
        /// Backbone position being labelled.
        position: usize,
        /// Reference cursor at the time.
        cursor: usize,
    },

    /// None of the match, insert or delete rules applied.
    #[error("unhandled case annotating feature {position}:{offset} with true reference characters")]
    UnhandledCase {
        /// Backbone position being labelled.
        position: usize,
        /// Insert offset being labelled.
        offset: usize,
    },

    /// The walk needed a reference character past the end of the reference.
    #[error("reference position {position} out of bounds for true reference of length {len}")]
    ReferenceOutOfBounds {
        /// Requested run index.
        position: usize,
        /// Number of runs in the reference.
        len: usize,
    },

    /// Run characters and run lengths differ in count.
    #[error("true reference has {bases} characters but {run_lengths} run lengths")]
    MismatchedRuns {
        /// Number of characters.
        bases: usize,
        /// Number of run lengths.
        run_lengths: usize,
    },

    /// An alignment tuple carried a negative coordinate.
    #[error("negative coordinate {0} in truth alignment tuple")]
    NegativeCoordinate(i64),
}

/// One aligned (feature, reference) pair of the truth alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignedPair {
    /// Alignment score of the pair; carried but unused.
    pub score: i64,
    /// Backbone position in the feature store.
    pub feature_position: usize,
    /// Run index in the true reference.
    pub reference_position: usize,
}

impl AlignedPair {
    /// Pair with a zero score.
    pub fn new(feature_position: usize, reference_position: usize) -> Self {
        Self {
            score: 0,
            feature_position,
            reference_position,
        }
    }

    /// Set the score.
    pub fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }
}

impl TryFrom<(i64, i64, i64)> for AlignedPair {
    type Error = TruthError;

    /// Convert a `(score, feature, reference)` tuple.
    fn try_from((score, feature, reference): (i64, i64, i64)) -> Result<Self, Self::Error> {
        let feature_position =
            usize::try_from(feature).map_err(|_| TruthError::NegativeCoordinate(feature))?;
        let reference_position =
            usize::try_from(reference).map_err(|_| TruthError::NegativeCoordinate(reference))?;
        Ok(Self {
            score,
            feature_position,
            reference_position,
        })
    }
}
