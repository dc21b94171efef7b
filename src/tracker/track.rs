use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Identity-tagged centroid of one live object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier, never reused
    pub id: u64,
    /// Most recent centroid
    pub centroid: Point2<f32>,
    /// Consecutive updates without a match
    pub misses: u32,
    /// Index into the latest update's centroids that this track matched or was
    /// registered from, `None` when it was missed
    pub last_detection: Option<usize>,
}

impl Track {
    pub(crate) fn new(id: u64, centroid: Point2<f32>, detection: usize) -> Self {
        Self {
            id,
            centroid,
            misses: 0,
            last_detection: Some(detection),
        }
    }

    pub(crate) fn hit(&mut self, centroid: Point2<f32>, detection: usize) {
        self.centroid = centroid;
        self.misses = 0;
        self.last_detection = Some(detection);
    }

    pub(crate) fn miss(&mut self) {
        self.misses = self.misses.saturating_add(1);
        self.last_detection = None;
    }

    /// Whether the track was matched in the latest update.
    pub fn is_visible(&self) -> bool {
        self.last_detection.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_counter_saturates() {
        let mut track = Track::new(3, Point2::new(1.0, 2.0), 0);
        track.miss();
        assert_eq!(track.misses, 1);
        assert!(!track.is_visible());

        track.misses = u32::MAX;
        track.miss();
        assert_eq!(track.misses, u32::MAX);

        track.hit(Point2::new(4.0, 5.0), 2);
        assert_eq!(track.misses, 0);
        assert_eq!(track.last_detection, Some(2));
    }
}
