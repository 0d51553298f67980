use super::TruthError;
use crate::features::Label;

/// Run-length encoded true reference: one character per run, indexed by run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct TrueReference {
    bases: Vec<u8>,
    run_lengths: Vec<u32>,
}

impl TrueReference {
    /// Wrap an already encoded reference.
    pub fn from_runs(bases: Vec<u8>, run_lengths: Vec<u32>) -> Result<Self, TruthError> {
        if bases.len() != run_lengths.len() {
            return Err(TruthError::MismatchedRuns {
                bases: bases.len(),
                run_lengths: run_lengths.len(),
            });
        }
        Ok(Self { bases, run_lengths })
    }

    /// Treat every character of `sequence` as its own run.
    pub fn from_sequence(sequence: &[u8]) -> Self {
        Self {
            bases: sequence.to_vec(),
            run_lengths: vec![1; sequence.len()],
        }
    }

    /// Collapse homopolymer runs of `sequence` (case-insensitive).
    pub fn run_length_encode(sequence: &[u8]) -> Self {
        let mut bases = Vec::new();
        let mut run_lengths: Vec<u32> = Vec::new();
        for &base in sequence {
            let base = base.to_ascii_uppercase();
            if bases.last() == Some(&base) {
                if let Some(run) = run_lengths.last_mut() {
                    *run += 1;
                }
            } else {
                bases.push(base);
                run_lengths.push(1);
            }
        }
        Self { bases, run_lengths }
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Whether the reference has no runs.
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Run characters.
    pub fn bases(&self) -> &[u8] {
        &self.bases
    }

    /// Run lengths.
    pub fn run_lengths(&self) -> &[u32] {
        &self.run_lengths
    }

    /// Expanded (run-length decoded) sequence.
    pub fn expand(&self) -> Vec<u8> {
        self.bases
            .iter()
            .zip(&self.run_lengths)
            .flat_map(|(&base, &run)| std::iter::repeat(base).take(run as usize))
            .collect()
    }

    /// Truth label for the run at `position`.
    pub fn label(&self, position: usize) -> Result<Label, TruthError> {
        match (self.bases.get(position), self.run_lengths.get(position)) {
            (Some(&base), Some(&run_length)) => Ok(Label::base(base, run_length)),
            _ => Err(TruthError::ReferenceOutOfBounds {
                position,
                len: self.bases.len(),
            }),
        }
    }
}
