//! Per-frame reduction of raw detector output into de-overlapped detections.

use log::{debug, trace};
use nalgebra::Point2;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

use crate::detection::nms::non_max_suppression;
use crate::detection::rect::BoundingBox;
use crate::error::{ConfigError, Result};

/// One raw proposal from the network, before filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProposal {
    /// Normalized center box: [center x, center y, width, height], fractions of frame size
    pub bbox: [f32; 4],
    /// Per-class scores
    pub scores: Vec<f32>,
}

impl RawProposal {
    pub fn new(bbox: [f32; 4], scores: Vec<f32>) -> Self {
        Self { bbox, scores }
    }

    /// Highest-scoring class and its score. The first class wins ties.
    pub fn best_class(&self) -> Option<(usize, f32)> {
        self.scores
            .iter()
            .copied()
            .enumerate()
            .fold(None, |best, (i, s)| match best {
                Some((_, bs)) if bs >= s => best,
                _ => Some((i, s)),
            })
    }
}

/// Convert darknet/YOLO layer output rows into proposals.
///
/// Each row is `[cx, cy, w, h, objectness, class scores...]`; objectness is ignored.
/// Rows without at least one class score yield nothing.
pub fn proposals_from_darknet(rows: ArrayView2<'_, f32>) -> Vec<RawProposal> {
    if rows.ncols() < 6 {
        return Vec::new();
    }
    rows.rows()
        .into_iter()
        .map(|row| RawProposal {
            bbox: [row[0], row[1], row[2], row[3]],
            scores: row.iter().skip(5).copied().collect(),
        })
        .collect()
}

/// One object instance found in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub class_id: usize,
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BoundingBox, class_id: usize, confidence: f32) -> Self {
        Self {
            bbox,
            class_id,
            confidence,
        }
    }

    #[inline]
    pub fn centroid(&self) -> Point2<f32> {
        self.bbox.centroid()
    }
}

/// The kept detections of one frame, tagged with the frame's timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameDetections {
    pub timestamp: f64,
    pub detections: Vec<Detection>,
}

impl FrameDetections {
    pub fn new(timestamp: f64, detections: Vec<Detection>) -> Self {
        Self {
            timestamp,
            detections,
        }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn boxes(&self) -> Vec<BoundingBox> {
        self.detections.iter().map(|d| d.bbox).collect()
    }

    pub fn confidences(&self) -> Vec<f32> {
        self.detections.iter().map(|d| d.confidence).collect()
    }

    pub fn class_ids(&self) -> Vec<usize> {
        self.detections.iter().map(|d| d.class_id).collect()
    }

    pub fn centroids(&self) -> Vec<Point2<f32>> {
        self.detections.iter().map(Detection::centroid).collect()
    }
}

/// Configuration for the [`DetectionReducer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReducerConfig {
    /// Proposals must score strictly above this to survive
    pub confidence_threshold: f32,
    /// Maximum IoU allowed between two kept boxes
    pub nms_threshold: f32,
    /// Only suppress overlaps between boxes of the same class
    pub class_aware_nms: bool,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            nms_threshold: 0.3,
            class_aware_nms: false,
        }
    }
}

impl ReducerConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        check_unit_interval("confidence_threshold", self.confidence_threshold)?;
        check_unit_interval("nms_threshold", self.nms_threshold)
    }
}

fn check_unit_interval(name: &'static str, value: f32) -> std::result::Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfBounds { name, value })
    }
}

/// Turns one frame's raw proposals into a filtered, de-overlapped set of detections.
#[derive(Debug, Clone, Default)]
pub struct DetectionReducer {
    config: ReducerConfig,
}

impl DetectionReducer {
    pub fn new(config: ReducerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    /// Reduce one frame of proposals.
    ///
    /// Returns the kept detections in NMS keep order. An empty result is not an error.
    pub fn reduce(
        &self,
        proposals: &[RawProposal],
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Vec<Detection>> {
        if frame_width == 0 || frame_height == 0 {
            return Err(ConfigError::EmptyFrame {
                width: frame_width,
                height: frame_height,
            }
            .into());
        }

        let tau_c = self.config.confidence_threshold;
        let candidates: Vec<Detection> = proposals
            .iter()
            .filter_map(|p| {
                let (class_id, confidence) = p.best_class()?;
                if confidence.is_nan() || confidence <= tau_c {
                    trace!("drop proposal class={class_id} confidence={confidence}");
                    return None;
                }
                let [cx, cy, w, h] = p.bbox;
                let bbox =
                    BoundingBox::from_normalized_center(cx, cy, w, h, frame_width, frame_height);
                Some(Detection::new(bbox, class_id, confidence))
            })
            .collect();

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let boxes: Vec<BoundingBox> = candidates.iter().map(|d| d.bbox).collect();
        let scores: Vec<f32> = candidates.iter().map(|d| d.confidence).collect();
        let classes: Vec<usize> = candidates.iter().map(|d| d.class_id).collect();
        let keep = non_max_suppression(
            &boxes,
            &scores,
            self.config.class_aware_nms.then_some(classes.as_slice()),
            tau_c,
            self.config.nms_threshold,
        );

        debug!(
            "reduced {} proposals to {} candidates and {} detections",
            proposals.len(),
            candidates.len(),
            keep.len()
        );

        Ok(keep.into_iter().map(|i| candidates[i]).collect())
    }

    /// Reduce one frame and tag it with its timestamp.
    pub fn reduce_frame(
        &self,
        timestamp: f64,
        proposals: &[RawProposal],
        frame_width: u32,
        frame_height: u32,
    ) -> Result<FrameDetections> {
        let detections = self.reduce(proposals, frame_width, frame_height)?;
        Ok(FrameDetections::new(timestamp, detections))
    }
}
