//! Detection-to-highlight pipeline for survey video.
//!
//! - [`detection`]: confidence filtering and non-max suppression of raw network output
//! - [`tracker`]: frame-to-frame centroid identity tracking
//! - [`highlight`]: clustering of detection timestamps into padded clip intervals
//! - [`telemetry`]: resampling of a vehicle telemetry log onto the detection timeline
//! - [`integration`]: detector boundary, configuration and the orchestrating pipeline

pub mod detection;
pub mod error;
pub mod highlight;
pub mod integration;
pub mod telemetry;
pub mod tracker;

pub use detection::{
    BoundingBox, Detection, DetectionReducer, FrameDetections, RawProposal, ReducerConfig,
};
pub use error::{ConfigError, Error, Result, TelemetryError};
pub use highlight::{ClusterConfig, HighlightClip, HighlightClusterer};
pub use integration::{
    DetectionRecord, HighlightPipeline, IntoProposals, OutOfRangePolicy, PipelineConfig,
    PipelineOutput, ProposalSource,
};
pub use telemetry::{AlignedValue, AlignerConfig, Anchor, TelemetryAligner, TelemetrySeries};
pub use tracker::{AssignmentStrategy, IdentityTracker, Track, TrackerConfig};
