use std::collections::BTreeSet;

use highlight_track::{IdentityTracker, TrackerConfig};
use nalgebra::Point2;

#[test]
fn test_basic_tracking() {
    let mut tracker = IdentityTracker::new(TrackerConfig {
        max_misses: 2,
        ..TrackerConfig::default()
    })
    .unwrap();

    // Frame 1: One centroid
    let tracks1 = tracker.update(&[Point2::new(150.0, 150.0)]);
    assert_eq!(tracks1.len(), 1);
    let id1 = tracks1[0].id;

    // Frame 2: Same object moved slightly
    let tracks2 = tracker.update(&[Point2::new(155.0, 155.0)]);
    assert_eq!(tracks2.len(), 1);
    assert_eq!(tracks2[0].id, id1); // ID should persist

    // Frames 3-4: Object missing, still within the miss bound
    assert_eq!(tracker.update(&[]).len(), 1);
    assert_eq!(tracker.update(&[]).len(), 1);

    // Frame 5: Object reappears and keeps its id
    let tracks5 = tracker.update(&[Point2::new(165.0, 165.0)]);
    assert_eq!(tracks5.len(), 1);
    assert_eq!(tracks5[0].id, id1);
    assert_eq!(tracks5[0].misses, 0);
}

#[test]
fn test_track_deregistered_after_bound() {
    for max_misses in [0u32, 1, 3, 7] {
        let mut tracker = IdentityTracker::new(TrackerConfig {
            max_misses,
            ..TrackerConfig::default()
        })
        .unwrap();
        tracker.update(&[Point2::new(0.0, 0.0)]);

        for _ in 0..max_misses {
            assert_eq!(tracker.update(&[]).len(), 1);
        }
        assert!(tracker.update(&[]).is_empty());
    }
}

#[test]
fn test_ids_never_reappear() {
    let mut tracker = IdentityTracker::new(TrackerConfig {
        max_misses: 1,
        ..TrackerConfig::default()
    })
    .unwrap();

    let mut ever_seen: BTreeSet<u64> = BTreeSet::new();
    let mut retired = BTreeSet::new();
    let mut previous: BTreeSet<u64> = BTreeSet::new();

    // Objects appear, wander and vanish at different points
    let frames: Vec<Vec<Point2<f32>>> = vec![
        vec![Point2::new(0.0, 0.0), Point2::new(200.0, 0.0)],
        vec![Point2::new(2.0, 0.0)],
        vec![],
        vec![],
        vec![Point2::new(4.0, 0.0), Point2::new(400.0, 400.0)],
        vec![Point2::new(6.0, 0.0), Point2::new(402.0, 400.0), Point2::new(800.0, 0.0)],
        vec![],
        vec![],
        vec![Point2::new(8.0, 0.0)],
    ];

    for centroids in frames {
        let live: BTreeSet<u64> = tracker.update(&centroids).iter().map(|t| t.id).collect();
        for id in &live {
            assert!(!retired.contains(id), "id {id} came back after deregistration");
        }
        for gone in previous.difference(&live) {
            retired.insert(*gone);
        }
        // fresh ids are always larger than every id handed out before
        let newest_before = ever_seen.iter().next_back().copied();
        for id in live.difference(&ever_seen) {
            assert!(newest_before.is_none_or(|m| *id > m));
        }
        ever_seen.extend(live.iter().copied());
        previous = live;
    }
    assert_eq!(tracker.next_id(), 6);
    assert_eq!(ever_seen.len(), 6);
}
