//! Frame-to-frame centroid identity tracker.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::detection::FrameDetections;
use crate::error::{ConfigError, Result};
use crate::tracker::matching::{self, AssignmentResult, AssignmentStrategy};
use crate::tracker::track::Track;

/// Configuration for the [`IdentityTracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// A track survives this many consecutive missed updates and is removed on the next
    pub max_misses: u32,
    pub strategy: AssignmentStrategy,
    /// Pairs farther apart than this (pixels) are never matched
    pub max_distance: Option<f32>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_misses: 50,
            strategy: AssignmentStrategy::Greedy,
            max_distance: None,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        match self.max_distance {
            Some(d) if !(d.is_finite() && d > 0.0) => Err(ConfigError::InvalidDistanceGate(d)),
            _ => Ok(()),
        }
    }
}

/// Assigns stable identities to centroids across successive frames.
///
/// Live tracks are keyed by id; ids come from a per-tracker counter and are never
/// handed out twice. Updates must be applied in frame order by a single owner.
#[derive(Debug, Clone)]
pub struct IdentityTracker {
    tracks: BTreeMap<u64, Track>,
    next_id: u64,
    config: TrackerConfig,
}

impl IdentityTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tracks: BTreeMap::new(),
            next_id: 0,
            config,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Feed one frame's centroids and return the live tracks, ordered by id.
    pub fn update(&mut self, centroids: &[Point2<f32>]) -> Vec<Track> {
        if centroids.is_empty() {
            let ids: Vec<u64> = self.tracks.keys().copied().collect();
            for id in ids {
                self.mark_missed(id);
            }
            return self.live();
        }

        if self.tracks.is_empty() {
            for (j, &c) in centroids.iter().enumerate() {
                self.register(c, j);
            }
            return self.live();
        }

        let ids: Vec<u64> = self.tracks.keys().copied().collect();
        let live: Vec<Point2<f32>> = self.tracks.values().map(|t| t.centroid).collect();
        let dists = matching::distance_matrix(&live, centroids);

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::assign(self.config.strategy, &dists, self.config.max_distance);

        for (row, col) in matches {
            if let Some(track) = self.tracks.get_mut(&ids[row]) {
                track.hit(centroids[col], col);
            }
        }
        for row in unmatched_tracks {
            self.mark_missed(ids[row]);
        }
        for col in unmatched_detections {
            self.register(centroids[col], col);
        }

        self.live()
    }

    /// Track the centroids of one frame's detections.
    pub fn update_detections(&mut self, frame: &FrameDetections) -> Vec<Track> {
        self.update(&frame.centroids())
    }

    /// Current id to centroid map.
    pub fn centroids(&self) -> BTreeMap<u64, Point2<f32>> {
        self.tracks.iter().map(|(&id, t)| (id, t.centroid)).collect()
    }

    pub fn get(&self, id: u64) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// The id the next registered track will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn register(&mut self, centroid: Point2<f32>, detection: usize) {
        let id = self.next_id;
        self.next_id += 1;
        self.tracks.insert(id, Track::new(id, centroid, detection));
        debug!("registered track {id} at ({}, {})", centroid.x, centroid.y);
    }

    fn mark_missed(&mut self, id: u64) {
        let Some(track) = self.tracks.get_mut(&id) else {
            return;
        };
        track.miss();
        if track.misses > self.config.max_misses {
            self.tracks.remove(&id);
            debug!("deregistered track {id}");
        }
    }

    fn live(&self) -> Vec<Track> {
        self.tracks.values().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(max_misses: u32) -> IdentityTracker {
        IdentityTracker::new(TrackerConfig {
            max_misses,
            ..TrackerConfig::default()
        })
        .unwrap()
    }

    fn p(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    #[test]
    fn test_registers_first_frame() {
        let mut t = tracker(2);
        let tracks = t.update(&[p(0.0, 0.0), p(100.0, 100.0)]);
        assert_eq!(tracks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![0, 1]);
        assert!(tracks.iter().all(|t| t.misses == 0));
        assert_eq!(tracks[1].last_detection, Some(1));
    }

    #[test]
    fn test_follows_moving_objects() {
        let mut t = tracker(2);
        t.update(&[p(0.0, 0.0), p(100.0, 100.0)]);
        // Listed in reverse order this frame
        let tracks = t.update(&[p(102.0, 101.0), p(3.0, 1.0)]);
        assert_eq!(tracks.len(), 2);
        assert_eq!(t.get(0).unwrap().centroid, p(3.0, 1.0));
        assert_eq!(t.get(0).unwrap().last_detection, Some(1));
        assert_eq!(t.get(1).unwrap().centroid, p(102.0, 101.0));
        assert_eq!(t.next_id(), 2);
    }

    #[test]
    fn test_miss_bound() {
        let mut t = tracker(2);
        t.update(&[p(5.0, 5.0)]);
        assert_eq!(t.update(&[]).len(), 1);
        assert_eq!(t.update(&[]).len(), 1);
        assert_eq!(t.get(0).unwrap().misses, 2);
        assert!(t.update(&[]).is_empty());
    }

    #[test]
    fn test_unmatched_track_counts_miss_when_others_match() {
        let mut t = tracker(0);
        t.update(&[p(0.0, 0.0), p(100.0, 0.0)]);
        let tracks = t.update(&[p(1.0, 0.0)]);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, 0);
    }

    #[test]
    fn test_hit_resets_misses() {
        let mut t = tracker(2);
        t.update(&[p(5.0, 5.0)]);
        t.update(&[]);
        t.update(&[]);
        t.update(&[p(6.0, 5.0)]);
        assert_eq!(t.get(0).unwrap().misses, 0);
        t.update(&[]);
        t.update(&[]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_new_centroid_gets_fresh_id() {
        let mut t = tracker(5);
        t.update(&[p(0.0, 0.0)]);
        let tracks = t.update(&[p(0.0, 1.0), p(500.0, 500.0)]);
        assert_eq!(tracks.len(), 2);
        assert_eq!(t.get(1).unwrap().centroid, p(500.0, 500.0));
    }

    #[test]
    fn test_duplicate_centroids_first_listed_wins() {
        let mut t = tracker(5);
        t.update(&[p(0.0, 0.0)]);
        t.update(&[p(1.0, 1.0), p(1.0, 1.0)]);
        assert_eq!(t.get(0).unwrap().last_detection, Some(0));
        assert_eq!(t.get(1).unwrap().last_detection, Some(1));
    }

    #[test]
    fn test_distance_gate_spawns_new_track() {
        let mut t = IdentityTracker::new(TrackerConfig {
            max_misses: 1,
            max_distance: Some(10.0),
            ..TrackerConfig::default()
        })
        .unwrap();
        t.update(&[p(0.0, 0.0)]);
        let tracks = t.update(&[p(50.0, 0.0)]);
        assert_eq!(tracks.len(), 2);
        assert_eq!(t.get(0).unwrap().misses, 1);
        assert_eq!(t.get(1).unwrap().centroid, p(50.0, 0.0));
    }

    #[test]
    fn test_invalid_gate() {
        let config = TrackerConfig {
            max_distance: Some(0.0),
            ..TrackerConfig::default()
        };
        assert!(IdentityTracker::new(config).is_err());
    }

    #[test]
    fn test_centroid_map() {
        let mut t = tracker(1);
        t.update(&[p(1.0, 2.0)]);
        let map = t.centroids();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&0], p(1.0, 2.0));
    }
}
