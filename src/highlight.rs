//! Highlight clip selection from clusters of detection timestamps.

mod clip;
mod clusterer;

pub use clip::HighlightClip;
pub use clusterer::{ClusterConfig, HighlightClusterer, thin_events};
