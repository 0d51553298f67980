//! Feature records built from consensus graph evidence.
//!
//! A [`FeatureStore`] holds one [`FeatureChain`] per backbone position; the
//! chain's first entry is the backbone column and any further entries are
//! inserted columns. Records carry a weight vector whose layout is chosen by
//! the [`FeatureWeights`] schema.

mod build;
mod store;
mod weights;

pub use build::{build_features, build_rle_features, build_simple_features};
pub use store::{FeatureChain, FeatureRecord, FeatureStore, Label, GAP_LABEL};
pub use weights::{
    FeatureWeights, RleWeights, SimpleWeights, WeightSlot, RLE_WEIGHT_SIZE, SIMPLE_WEIGHT_SIZE,
};
