//! Greedy non-max suppression.

use crate::detection::rect::{BoundingBox, iou_batch};

/// Run greedy NMS over a set of scored boxes.
///
/// Candidates scoring at or below `score_threshold` are ignored. The rest are visited
/// in descending score order (stable, so equal scores keep their input order); a
/// candidate is kept unless its IoU with an already-kept box exceeds `nms_threshold`.
/// When `classes` is given, only kept boxes of the same class can suppress a candidate.
///
/// Returns indices into `boxes`, in the order they were kept.
pub fn non_max_suppression(
    boxes: &[BoundingBox],
    scores: &[f32],
    classes: Option<&[usize]>,
    score_threshold: f32,
    nms_threshold: f32,
) -> Vec<usize> {
    debug_assert_eq!(boxes.len(), scores.len());

    let mut order: Vec<usize> = (0..boxes.len().min(scores.len()))
        .filter(|&i| scores[i] > score_threshold)
        .collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    if order.is_empty() {
        return Vec::new();
    }

    let ious = iou_batch(boxes, boxes);
    let mut kept: Vec<usize> = Vec::with_capacity(order.len());

    for candidate in order {
        let suppressed = kept.iter().any(|&k| {
            let same_class = classes.is_none_or(|c| c[k] == c[candidate]);
            same_class && ious[[k, candidate]] > nms_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}
