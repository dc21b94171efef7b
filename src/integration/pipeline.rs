//! HighlightPipeline: sequences reduction, tracking, clustering and telemetry alignment.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::detection::{DetectionReducer, FrameDetections};
use crate::error::{Error, Result};
use crate::highlight::{HighlightClip, HighlightClusterer};
use crate::integration::config::{OutOfRangePolicy, PipelineConfig};
use crate::integration::detector::{IntoProposals, ProposalSource};
use crate::integration::record::{DetectionRecord, PipelineOutput};
use crate::telemetry::{TelemetryAligner, TelemetrySeries};
use crate::tracker::IdentityTracker;

/// Timestamp of a zero-based frame index at a constant frame rate.
pub fn frame_timestamp(index: u64, fps: f64) -> f64 {
    index as f64 / fps
}

#[derive(Debug, Clone)]
struct TrackedFrame {
    frame: FrameDetections,
    track_ids: Vec<Option<u64>>,
}

/// Runs every frame of one media source through the core components and merges
/// their outputs into a [`PipelineOutput`].
///
/// Frames must be fed in timestamp order; the tracker state carries over from one
/// frame to the next.
pub struct HighlightPipeline {
    config: PipelineConfig,
    reducer: DetectionReducer,
    tracker: Option<IdentityTracker>,
    clusterer: HighlightClusterer,
    frames: Vec<TrackedFrame>,
    last_timestamp: Option<f64>,
}

impl HighlightPipeline {
    /// Build every component. Invalid configuration fails here, before any frame.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let reducer = DetectionReducer::new(config.reducer.clone())?;
        let tracker = if config.track_objects {
            Some(IdentityTracker::new(config.tracker.clone())?)
        } else {
            None
        };
        let clusterer = HighlightClusterer::new(config.highlights.clone())?;
        Ok(Self {
            config,
            reducer,
            tracker,
            clusterer,
            frames: Vec::new(),
            last_timestamp: None,
        })
    }

    /// Create a pipeline with default configuration.
    pub fn with_default_config() -> Result<Self> {
        Self::new(PipelineConfig::default())
    }

    /// Run the detector on one frame, then reduce and track its output.
    ///
    /// # Arguments
    /// * `detector` - Backend producing raw proposals
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `timestamp` - Frame time in seconds on the media clock
    pub fn process_frame<D>(
        &mut self,
        detector: &mut D,
        input: &[u8],
        width: u32,
        height: u32,
        timestamp: f64,
    ) -> Result<FrameDetections>
    where
        D: ProposalSource,
        D::Error: std::error::Error + Send + Sync + 'static,
    {
        self.check_order(timestamp)?;
        let proposals = detector
            .propose(input, width, height)
            .map_err(|e| Error::Detector(Box::new(e)))?;
        self.push_proposals(timestamp, proposals, width, height)
    }

    /// Reduce and track precomputed network output for one frame.
    pub fn push_proposals(
        &mut self,
        timestamp: f64,
        proposals: impl IntoProposals,
        width: u32,
        height: u32,
    ) -> Result<FrameDetections> {
        self.check_order(timestamp)?;
        let frame = self
            .reducer
            .reduce_frame(timestamp, &proposals.into_proposals(), width, height)?;
        self.push_frame(frame.clone())?;
        Ok(frame)
    }

    /// Track an already reduced frame.
    pub fn push_frame(&mut self, frame: FrameDetections) -> Result<()> {
        self.check_order(frame.timestamp)?;
        self.last_timestamp = Some(frame.timestamp);

        let mut track_ids = vec![None; frame.len()];
        if let Some(tracker) = self.tracker.as_mut() {
            for track in tracker.update_detections(&frame) {
                if let Some(j) = track.last_detection {
                    track_ids[j] = Some(track.id);
                }
            }
        }

        if !frame.is_empty() {
            self.frames.push(TrackedFrame { frame, track_ids });
        }
        Ok(())
    }

    /// Timestamps of frames with at least one detection, in frame order.
    pub fn event_timestamps(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.frame.timestamp).collect()
    }

    /// Frames with at least one detection.
    pub fn frames(&self) -> impl Iterator<Item = &FrameDetections> {
        self.frames.iter().map(|f| &f.frame)
    }

    pub fn tracker(&self) -> Option<&IdentityTracker> {
        self.tracker.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Cluster the collected events into clips and build the enriched records.
    pub fn finish(
        self,
        media_duration: f64,
        telemetry: Option<&TelemetrySeries>,
    ) -> Result<PipelineOutput> {
        let timestamps = self.event_timestamps();
        let clips = self.clusterer.cluster(&timestamps, media_duration);

        let aligner = telemetry
            .map(|series| TelemetryAligner::new(series, &self.config.telemetry))
            .transpose()?;

        let mut records = Vec::with_capacity(self.frames.len());
        for TrackedFrame { frame, track_ids } in self.frames {
            let telemetry = match &aligner {
                None => None,
                Some(aligner) => match aligner.align_at(frame.timestamp) {
                    Ok(row) => Some(row.values.into_iter().collect::<BTreeMap<_, _>>()),
                    Err(e @ Error::OutOfRange { .. })
                        if self.config.out_of_range == OutOfRangePolicy::Skip =>
                    {
                        warn!("no telemetry for frame at {}: {e}", frame.timestamp);
                        None
                    }
                    Err(e) => return Err(e),
                },
            };

            records.push(DetectionRecord {
                timestamp: frame.timestamp,
                num_objects: frame.len(),
                boxes: frame.boxes(),
                confidences: frame.confidences(),
                class_ids: frame.class_ids(),
                track_ids,
                clip: clip_for(&clips, frame.timestamp),
                telemetry,
            });
        }

        info!(
            "pipeline finished: {} detection frames, {} clips",
            records.len(),
            clips.len()
        );
        Ok(PipelineOutput { clips, records })
    }

    fn check_order(&self, timestamp: f64) -> Result<()> {
        if !timestamp.is_finite() {
            debug!("rejecting frame with timestamp {timestamp}");
            return Err(Error::NonFiniteTimestamp(timestamp));
        }
        match self.last_timestamp {
            Some(previous) if timestamp < previous => {
                debug!("rejecting frame at {timestamp}, previous frame at {previous}");
                Err(Error::FrameOrder {
                    previous,
                    current: timestamp,
                })
            }
            _ => Ok(()),
        }
    }
}

fn clip_for(clips: &[HighlightClip], timestamp: f64) -> Option<usize> {
    clips
        .iter()
        .position(|c| c.group.binary_search_by(|t| t.total_cmp(&timestamp)).is_ok())
}
