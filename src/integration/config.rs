//! Pipeline configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detection::ReducerConfig;
use crate::error::{Error, Result};
use crate::highlight::ClusterConfig;
use crate::telemetry::AlignerConfig;
use crate::tracker::TrackerConfig;

/// Environment variable naming a TOML configuration file for [`PipelineConfig::load`].
pub const CONFIG_ENV: &str = "HIGHLIGHT_TRACK_CONFIG";

/// What to do with detections whose timestamp falls outside the telemetry log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRangePolicy {
    /// Fail the whole alignment batch
    #[default]
    Fail,
    /// Keep the record without telemetry values
    Skip,
}

/// Settings for every stage of the pipeline.
///
/// ```toml
/// track_objects = true
/// out_of_range = "skip"
///
/// [reducer]
/// confidence_threshold = 0.5
/// nms_threshold = 0.3
///
/// [tracker]
/// max_misses = 50
///
/// [highlights]
/// padding = 3.0
/// clip_length = 10.0
///
/// [telemetry]
/// anchor = { explicit = 1611700000.0 }
/// column_prefix = "uav_"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub reducer: ReducerConfig,
    /// Run the identity tracker over the frames
    pub track_objects: bool,
    pub tracker: TrackerConfig,
    pub highlights: ClusterConfig,
    pub telemetry: AlignerConfig,
    pub out_of_range: OutOfRangePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reducer: ReducerConfig::default(),
            track_objects: true,
            tracker: TrackerConfig::default(),
            highlights: ClusterConfig::default(),
            telemetry: AlignerConfig::default(),
            out_of_range: OutOfRangePolicy::Fail,
        }
    }
}

impl PipelineConfig {
    /// Read the file named by [`CONFIG_ENV`], or fall back to defaults when unset.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::from_path(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.reducer.validate()?;
        self.tracker.validate()?;
        self.highlights.validate()?;
        Ok(())
    }
}
