//! Temporal clustering of event timestamps into merged highlight clips.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::highlight::clip::HighlightClip;

/// Configuration for the [`HighlightClusterer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Seconds added before the first and after the last event of each cluster
    pub padding: f64,
    /// Largest gap between consecutive events that still joins a cluster.
    /// Defaults to `padding`.
    pub max_spacing_before_merge: Option<f64>,
    /// Cap on a cluster's raw span, excluding padding
    pub clip_length: Option<f64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            padding: 10.0,
            max_spacing_before_merge: None,
            clip_length: Some(30.0),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        non_negative("padding", self.padding)?;
        if let Some(spacing) = self.max_spacing_before_merge {
            non_negative("max_spacing_before_merge", spacing)?;
        }
        if let Some(clip_length) = self.clip_length {
            // NaN fails the comparison too
            if !(clip_length > 2.0 * self.padding) || clip_length.is_infinite() {
                return Err(ConfigError::ClipLengthTooShort {
                    clip_length,
                    padding: self.padding,
                });
            }
        }
        Ok(())
    }

    pub fn max_spacing(&self) -> f64 {
        self.max_spacing_before_merge.unwrap_or(self.padding)
    }
}

fn non_negative(name: &'static str, value: f64) -> std::result::Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeDuration { name, value })
    }
}

/// Turns a sparse set of event timestamps into padded, merged, length-bounded clips.
#[derive(Debug, Clone)]
pub struct HighlightClusterer {
    config: ClusterConfig,
}

impl HighlightClusterer {
    pub fn new(config: ClusterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Sort the timestamps and split them into chronological groups.
    ///
    /// A new group starts at the first timestamp, whenever the gap to the previous
    /// timestamp reaches `max_spacing_before_merge`, or whenever the span from the
    /// group's first timestamp would reach `clip_length`. Either condition alone splits.
    pub fn group_timestamps(&self, timestamps: &[f64]) -> Vec<Vec<f64>> {
        let mut sorted: Vec<f64> = timestamps.iter().copied().filter(|t| t.is_finite()).collect();
        let skipped = timestamps.len() - sorted.len();
        if skipped > 0 {
            warn!("skipping {skipped} non-finite event timestamps");
        }
        sorted.sort_by(f64::total_cmp);

        let max_spacing = self.config.max_spacing();
        let clip_length = self.config.clip_length;

        sorted
            .into_iter()
            .fold(Vec::<Vec<f64>>::new(), |mut groups, t| {
                let split = match groups.last() {
                    None => true,
                    Some(group) => {
                        let first = group[0];
                        let prev = group[group.len() - 1];
                        t >= prev + max_spacing || clip_length.is_some_and(|len| t - first >= len)
                    }
                };
                match groups.last_mut() {
                    Some(group) if !split => group.push(t),
                    _ => groups.push(vec![t]),
                }
                groups
            })
    }

    /// Cluster the timestamps and convert each group into a clip within
    /// `[0, media_duration]`.
    ///
    /// Groups whose clamped interval is empty are dropped with a warning.
    pub fn cluster(&self, timestamps: &[f64], media_duration: f64) -> Vec<HighlightClip> {
        let groups = self.group_timestamps(timestamps);
        let group_count = groups.len();
        let padding = self.config.padding;

        let clips: Vec<HighlightClip> = groups
            .into_iter()
            .filter_map(|group| {
                let first = group[0];
                let last = group[group.len() - 1];
                let start = (first - padding).max(0.0);
                let end = (last + padding).min(media_duration);
                if start >= end {
                    warn!(
                        "dropping degenerate clip group {group:?}: [{start}, {end}] is empty within media duration {media_duration}"
                    );
                    return None;
                }
                Some(HighlightClip { start, end, group })
            })
            .collect();

        debug!(
            "clustered {} timestamps into {} groups and {} clips",
            timestamps.len(),
            group_count,
            clips.len()
        );
        clips
    }
}

/// Pick events spaced at least `min_spacing` seconds apart.
///
/// The earliest event is always kept; each later one is kept when it falls at least
/// `min_spacing` after the last kept event. Returns indices into `timestamps`, in
/// chronological order.
pub fn thin_events(timestamps: &[f64], min_spacing: f64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..timestamps.len())
        .filter(|&i| timestamps[i].is_finite())
        .collect();
    order.sort_by(|&a, &b| timestamps[a].total_cmp(&timestamps[b]));

    let mut kept = Vec::new();
    let mut last: Option<f64> = None;
    for i in order {
        let t = timestamps[i];
        if last.is_none_or(|l| t >= l + min_spacing) {
            kept.push(i);
            last = Some(t);
        }
    }
    kept
}
