//! Aggregated pipeline output and its JSON export.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::detection::BoundingBox;
use crate::error::Result;
use crate::highlight::{HighlightClip, thin_events};
use crate::telemetry::AlignedValue;

/// One frame with at least one detection, enriched with tracking, clip and telemetry data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub timestamp: f64,
    pub num_objects: usize,
    pub boxes: Vec<BoundingBox>,
    pub confidences: Vec<f32>,
    pub class_ids: Vec<usize>,
    /// Track id per detection, `None` when tracking is disabled
    pub track_ids: Vec<Option<u64>>,
    /// Index into [`PipelineOutput::clips`], `None` when the frame's group was dropped
    pub clip: Option<usize>,
    /// Aligned telemetry columns, `None` when no telemetry was supplied or the
    /// timestamp fell outside it
    pub telemetry: Option<BTreeMap<String, AlignedValue>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub clips: Vec<HighlightClip>,
    pub records: Vec<DetectionRecord>,
}

impl PipelineOutput {
    /// Records belonging to one clip.
    pub fn records_in_clip(&self, clip: usize) -> impl Iterator<Item = &DetectionRecord> {
        self.records.iter().filter(move |r| r.clip == Some(clip))
    }

    /// File names for every clip, in clip order.
    pub fn clip_file_names(&self, stem: &str, extension: &str) -> Vec<String> {
        self.clips
            .iter()
            .map(|c| c.file_name(stem, extension))
            .collect()
    }

    /// Records spaced at least `min_spacing` seconds apart, for sparse frame export.
    pub fn thinned_records(&self, min_spacing: f64) -> Vec<&DetectionRecord> {
        let timestamps: Vec<f64> = self.records.iter().map(|r| r.timestamp).collect();
        thin_events(&timestamps, min_spacing)
            .into_iter()
            .map(|i| &self.records[i])
            .collect()
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: f64, clip: Option<usize>) -> DetectionRecord {
        DetectionRecord {
            timestamp,
            num_objects: 1,
            boxes: vec![BoundingBox::new(1, 2, 3, 4)],
            confidences: vec![0.9],
            class_ids: vec![0],
            track_ids: vec![Some(7)],
            clip,
            telemetry: Some(BTreeMap::from([
                ("uav_alt".to_string(), AlignedValue::Numeric(12.5)),
                ("uav_mode".to_string(), AlignedValue::Categorical("AUTO".into())),
            ])),
        }
    }

    fn output() -> PipelineOutput {
        PipelineOutput {
            clips: vec![HighlightClip {
                start: 0.0,
                end: 4.0,
                group: vec![1.0],
            }],
            records: vec![record(1.0, Some(0)), record(20.0, None), record(45.0, None)],
        }
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&output().to_json_string().unwrap()).unwrap();
        let first = &json["records"][0];
        assert_eq!(first["timestamp"], 1.0);
        assert_eq!(first["boxes"][0]["width"], 3);
        assert_eq!(first["telemetry"]["uav_alt"], 12.5);
        assert_eq!(first["telemetry"]["uav_mode"], "AUTO");
        assert_eq!(json["clips"][0]["end"], 4.0);
    }

    #[test]
    fn test_write_json_round_trips() {
        let mut buf = Vec::new();
        output().write_json(&mut buf).unwrap();
        let parsed: PipelineOutput = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, output());
    }

    #[test]
    fn test_clip_queries() {
        let out = output();
        assert_eq!(out.records_in_clip(0).count(), 1);
        assert_eq!(out.clip_file_names("survey", "mp4"), vec!["survey-1.mp4"]);
        let thinned: Vec<f64> = out.thinned_records(30.0).iter().map(|r| r.timestamp).collect();
        assert_eq!(thinned, vec![1.0, 45.0]);
    }
}
