//! Matching utilities for centroid tracking.

use log::warn;
use nalgebra::Point2;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// How live tracks are paired with the new frame's centroids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Closest pair first, each row and column used at most once
    #[default]
    Greedy,
    /// Minimum total distance (Jonker-Volgenant)
    Optimal,
}

/// Compute the Euclidean distance matrix between live track centroids (rows)
/// and new centroids (columns).
pub fn distance_matrix(tracks: &[Point2<f32>], centroids: &[Point2<f32>]) -> Array2<f32> {
    let mut dists = Array2::zeros((tracks.len(), centroids.len()));
    for (i, t) in tracks.iter().enumerate() {
        for (j, c) in centroids.iter().enumerate() {
            dists[[i, j]] = nalgebra::distance(t, c);
        }
    }
    dists
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

impl AssignmentResult {
    fn all_unmatched(num_rows: usize, num_cols: usize) -> Self {
        Self {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: (0..num_cols).collect(),
        }
    }

    fn from_matches(matches: Vec<(usize, usize)>, num_rows: usize, num_cols: usize) -> Self {
        let mut row_used = vec![false; num_rows];
        let mut col_used = vec![false; num_cols];
        for &(r, c) in &matches {
            row_used[r] = true;
            col_used[c] = true;
        }
        Self {
            matches,
            unmatched_tracks: unused(&row_used),
            unmatched_detections: unused(&col_used),
        }
    }
}

fn unused(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &used)| if used { None } else { Some(i) })
        .collect()
}

pub fn assign(
    strategy: AssignmentStrategy,
    cost_matrix: &Array2<f32>,
    max_cost: Option<f32>,
) -> AssignmentResult {
    match strategy {
        AssignmentStrategy::Greedy => greedy_assignment(cost_matrix, max_cost),
        AssignmentStrategy::Optimal => linear_assignment(cost_matrix, max_cost),
    }
}

/// Greedy matching by ascending cost.
///
/// Equal costs resolve in row-major order, so the first-listed row (then column) wins.
/// Pairs costing more than `max_cost` are never matched.
pub fn greedy_assignment(cost_matrix: &Array2<f32>, max_cost: Option<f32>) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();
    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::all_unmatched(num_rows, num_cols);
    }

    let mut pairs: Vec<(usize, usize)> = (0..num_rows)
        .flat_map(|i| (0..num_cols).map(move |j| (i, j)))
        .filter(|&(i, j)| max_cost.is_none_or(|m| cost_matrix[[i, j]] <= m))
        .collect();
    pairs.sort_by(|&a, &b| cost_matrix[[a.0, a.1]].total_cmp(&cost_matrix[[b.0, b.1]]));

    let mut row_used = vec![false; num_rows];
    let mut col_used = vec![false; num_cols];
    let mut matches = Vec::new();
    for (i, j) in pairs {
        if row_used[i] || col_used[j] {
            continue;
        }
        row_used[i] = true;
        col_used[j] = true;
        matches.push((i, j));
    }

    AssignmentResult::from_matches(matches, num_rows, num_cols)
}

/// Minimum-total-cost matching. Falls back to greedy matching if the solver fails.
pub fn linear_assignment(cost_matrix: &Array2<f32>, max_cost: Option<f32>) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();
    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult::all_unmatched(num_rows, num_cols);
    }

    let size = num_rows.max(num_cols);
    let pad = cost_matrix.iter().fold(0.0f64, |m, &c| m.max(c as f64)) * 2.0 + 1e6;
    let mut padded = Array2::<f64>::from_elem((size, size), pad);

    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = cost_matrix[[i, j]] as f64;
        }
    }

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            let matches = row_to_col
                .iter()
                .enumerate()
                .filter(|&(row, &col)| row < num_rows && col < num_cols)
                .filter(|&(row, &col)| max_cost.is_none_or(|m| cost_matrix[[row, col]] <= m))
                .map(|(row, &col)| (row, col))
                .collect();
            AssignmentResult::from_matches(matches, num_rows, num_cols)
        }
        Err(_) => {
            warn!("linear assignment failed, falling back to greedy matching");
            greedy_assignment(cost_matrix, max_cost)
        }
    }
}
