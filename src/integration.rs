//! Integration module for running the core components over a media source.
//!
//! This module provides the proposal-source boundary to inference backends
//! (Burn, ONNX Runtime, etc.), pipeline configuration, and the orchestrator that
//! merges detections, tracks, clips and telemetry into one output record.

mod config;
mod detector;
mod pipeline;
mod record;

pub use config::{CONFIG_ENV, OutOfRangePolicy, PipelineConfig};
pub use detector::{IntoProposals, ProposalSource};
pub use pipeline::{HighlightPipeline, frame_timestamp};
pub use record::{DetectionRecord, PipelineOutput};

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BurnDetector, BurnDetectorError, BurnModel};
