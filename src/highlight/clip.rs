use serde::{Deserialize, Serialize};

/// A padded, clamped time interval covering one cluster of event timestamps.
///
/// Always satisfies `0 <= start < end <= media_duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightClip {
    pub start: f64,
    pub end: f64,
    /// Raw event timestamps that produced this clip, ascending
    pub group: Vec<f64>,
}

impl HighlightClip {
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }

    /// Earliest event in the group.
    pub fn first_event(&self) -> f64 {
        self.group.first().copied().unwrap_or(self.start)
    }

    /// Output file name for this clip: `{stem}-{first event}.{extension}`.
    pub fn file_name(&self, stem: &str, extension: &str) -> String {
        format!(
            "{stem}-{}.{}",
            self.first_event(),
            extension.trim_start_matches('.')
        )
    }
}
