use std::ops::RangeInclusive;

/// Character used to label columns with no counterpart in the truth.
pub const GAP_LABEL: u8 = b'_';

/// Ground-truth label attached by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Label {
    /// Truth character, or [`GAP_LABEL`].
    pub base: u8,
    /// Run length of the truth character (0 for gaps).
    pub run_length: u32,
}

impl Label {
    /// Label for a column absent from the truth.
    pub const GAP: Label = Label {
        base: GAP_LABEL,
        run_length: 0,
    };

    /// Label for a truth character.
    pub fn base(base: u8, run_length: u32) -> Self {
        Self { base, run_length }
    }

    /// Whether this label marks a gap.
    pub fn is_gap(&self) -> bool {
        self.base == GAP_LABEL
    }
}

/// One column of the feature matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureRecord<W> {
    /// Backbone position (0-based, sentinel node excluded).
    pub ref_position: usize,
    /// 0 on the backbone, `k` for the k-th inserted column after it.
    pub insert_position: usize,
    /// Accumulated evidence.
    pub weights: W,
    /// Truth label, if a reconciler pass ran.
    pub label: Option<Label>,
}

impl<W: Default> FeatureRecord<W> {
    /// Zero-weight, unlabelled record.
    pub fn new(ref_position: usize, insert_position: usize) -> Self {
        Self {
            ref_position,
            insert_position,
            weights: W::default(),
            label: None,
        }
    }
}

/// Records sharing a backbone position, ordered by insert offset.
///
/// Entry `k` always has `insert_position == k`; entry 0 is the backbone
/// record and always exists.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureChain<W> {
    entries: Vec<FeatureRecord<W>>,
}

impl<W: Default> FeatureChain<W> {
    fn new(ref_position: usize) -> Self {
        Self {
            entries: vec![FeatureRecord::new(ref_position, 0)],
        }
    }

    /// Backbone position shared by every entry.
    pub fn ref_position(&self) -> usize {
        self.entries[0].ref_position
    }

    /// Entry for insert offset `offset` (1-based), created with zero weights
    /// if the chain does not reach it yet.
    pub fn insert_entry_mut(&mut self, offset: usize) -> &mut FeatureRecord<W> {
        debug_assert!(offset > 0, "offset 0 is the backbone record");
        let ref_position = self.ref_position();
        while self.entries.len() <= offset {
            let next = self.entries.len();
            self.entries.push(FeatureRecord::new(ref_position, next));
        }
        &mut self.entries[offset]
    }

    /// Append a zero-weight entry at the next insert offset.
    pub fn push_insert(&mut self) -> &mut FeatureRecord<W> {
        let offset = self.entries.len();
        self.insert_entry_mut(offset)
    }
}

impl<W> FeatureChain<W> {
    /// Backbone record.
    pub fn backbone(&self) -> &FeatureRecord<W> {
        &self.entries[0]
    }

    /// Mutable backbone record.
    pub fn backbone_mut(&mut self) -> &mut FeatureRecord<W> {
        &mut self.entries[0]
    }

    /// Entry at an insert offset, if present.
    pub fn get(&self, offset: usize) -> Option<&FeatureRecord<W>> {
        self.entries.get(offset)
    }

    /// Mutable entry at an insert offset, if present.
    pub fn get_mut(&mut self, offset: usize) -> Option<&mut FeatureRecord<W>> {
        self.entries.get_mut(offset)
    }

    /// Number of entries, backbone included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Chains are never empty; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of inserted columns.
    pub fn insert_count(&self) -> usize {
        self.entries.len() - 1
    }

    /// Entries in insert-offset order.
    pub fn iter(&self) -> std::slice::Iter<'_, FeatureRecord<W>> {
        self.entries.iter()
    }

    /// Mutable entries in insert-offset order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, FeatureRecord<W>> {
        self.entries.iter_mut()
    }
}

/// All feature records of one consensus graph, one chain per backbone
/// position.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStore<W> {
    chains: Vec<FeatureChain<W>>,
}

impl<W: Default> FeatureStore<W> {
    /// Store with `len` backbone records and no inserts.
    pub fn with_backbone(len: usize) -> Self {
        Self {
            chains: (0..len).map(FeatureChain::new).collect(),
        }
    }
}

impl<W> FeatureStore<W> {
    /// Number of backbone positions.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the store has no backbone positions.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Chain at a backbone position.
    pub fn chain(&self, position: usize) -> &FeatureChain<W> {
        &self.chains[position]
    }

    /// Mutable chain at a backbone position.
    pub fn chain_mut(&mut self, position: usize) -> &mut FeatureChain<W> {
        &mut self.chains[position]
    }

    /// Chains in backbone order.
    pub fn chains(&self) -> std::slice::Iter<'_, FeatureChain<W>> {
        self.chains.iter()
    }

    /// Inclusive range covering every backbone position, or `None` when empty.
    pub fn full_range(&self) -> Option<RangeInclusive<usize>> {
        self.chains.len().checked_sub(1).map(|last| 0..=last)
    }

    /// Chains of `range`, clamped to the positions the store holds.
    fn chains_in(&self, range: RangeInclusive<usize>) -> &[FeatureChain<W>] {
        let (start, end) = range.into_inner();
        let end = end.saturating_add(1).min(self.chains.len());
        self.chains.get(start..end).unwrap_or(&[])
    }

    /// Every chain entry of the backbone positions in `range`, in
    /// (position, offset) order. Positions past the end are ignored.
    pub fn records(&self, range: RangeInclusive<usize>) -> impl Iterator<Item = &FeatureRecord<W>> {
        self.chains_in(range).iter().flat_map(|chain| chain.iter())
    }

    /// Number of chain entries in `range`.
    pub fn record_count(&self, range: RangeInclusive<usize>) -> usize {
        self.chains_in(range).iter().map(FeatureChain::len).sum()
    }

    /// Number of chain entries in the whole store.
    pub fn total_records(&self) -> usize {
        self.chains.iter().map(FeatureChain::len).sum()
    }
}
