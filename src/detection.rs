//! Per-frame detection reduction: confidence filtering and non-max suppression.

mod nms;
mod rect;
mod reducer;

pub use nms::non_max_suppression;
pub use rect::{BoundingBox, iou_batch};
pub use reducer::{
    Detection, DetectionReducer, FrameDetections, RawProposal, ReducerConfig,
    proposals_from_darknet,
};
