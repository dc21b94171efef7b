use nalgebra::Point2;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in integer pixel units.
///
/// Stored as top-left corner plus dimensions (TLWH). Coordinates may be negative
/// when a detection hangs over the frame edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top-left x coordinate
    pub x: i32,
    /// Top-left y coordinate
    pub y: i32,
    /// Width of the bounding box
    pub width: i32,
    /// Height of the bounding box
    pub height: i32,
}

impl BoundingBox {
    /// Create a new box from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a box from normalized center coordinates (center x, center y, width, height,
    /// each a fraction of the frame size).
    ///
    /// Each value is scaled to pixels and truncated first; the corner is then
    /// `center - size / 2`, truncated again.
    pub fn from_normalized_center(
        cx: f32,
        cy: f32,
        width: f32,
        height: f32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let fw = frame_width as f32;
        let fh = frame_height as f32;
        let center_x = (cx * fw) as i32;
        let center_y = (cy * fh) as i32;
        let w = (width * fw) as i32;
        let h = (height * fh) as i32;
        Self {
            x: (center_x as f32 - w as f32 / 2.0) as i32,
            y: (center_y as f32 - h as f32 / 2.0) as i32,
            width: w,
            height: h,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2). The far corner saturates at `i32::MAX`.
    #[inline]
    pub fn to_tlbr(&self) -> [i32; 4] {
        [
            self.x,
            self.y,
            self.x.saturating_add(self.width),
            self.y.saturating_add(self.height),
        ]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [i32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Geometric center of the box, used as the tracking signal.
    #[inline]
    pub fn centroid(&self) -> Point2<f32> {
        Point2::new(
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }

    /// Area in square pixels. Degenerate boxes have zero area.
    #[inline]
    pub fn area(&self) -> i64 {
        i64::from(self.width.max(0)) * i64::from(self.height.max(0))
    }

    /// Calculate Intersection over Union (IoU) with another bounding box.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        // i64 corners so boxes scaled from out-of-range proposals cannot overflow
        let x1 = i64::from(self.x.max(other.x));
        let y1 = i64::from(self.y.max(other.y));
        let x2 = (i64::from(self.x) + i64::from(self.width))
            .min(i64::from(other.x) + i64::from(other.width));
        let y2 = (i64::from(self.y) + i64::from(self.height))
            .min(i64::from(other.y) + i64::from(other.height));

        let inter_area = (x2 - x1).max(0) as f64 * (y2 - y1).max(0) as f64;
        let union_area = self.area() as f64 + other.area() as f64 - inter_area;

        if union_area > 0.0 {
            (inter_area / union_area) as f32
        } else {
            0.0
        }
    }
}

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[BoundingBox], boxes_b: &[BoundingBox]) -> Array2<f32> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b);
        }
    }
    ious
}
