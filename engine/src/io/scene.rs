//! Serialized placement of ears and sound sources

use crate::acoustics::ear::Side;
use crate::acoustics::source::{SoundSource, SourceError};
use crate::config::AcousticConfig;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// Errors that can occur while reading or writing a layout
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid source {index}: {source}")]
    Source {
        index: usize,
        #[source]
        source: SourceError,
    },
}

/// An ear placed in the world, in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarLayout {
    pub position: DVec2,
    pub side: Side,
}

/// A sound source placed in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLayout {
    pub position: DVec2,
    #[serde(default)]
    pub direction: f64,
    #[serde(default = "full_circle")]
    pub fan_width: f64,
    pub volume: i32,
}

fn full_circle() -> f64 {
    360.0
}

impl SourceLayout {
    pub fn build(&self) -> Result<SoundSource, SourceError> {
        SoundSource::new(self.position, self.fan_width, self.direction, self.volume)
    }
}

/// Everything a sound world starts with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    #[serde(default)]
    pub ears: Vec<EarLayout>,
    #[serde(default)]
    pub sources: Vec<SourceLayout>,
}

impl SceneLayout {
    /// A head at (310, 240) with ears 0.2 m apart, listening to one
    /// omnidirectional source
    pub fn demo(config: &AcousticConfig) -> Self {
        let left = DVec2::new(310.0, 240.0);
        let right = left + DVec2::new(config.meters_to_pixels(0.2), 0.0);

        Self {
            ears: vec![
                EarLayout {
                    position: left,
                    side: Side::Left,
                },
                EarLayout {
                    position: right,
                    side: Side::Right,
                },
            ],
            sources: vec![SourceLayout {
                position: DVec2::new(320.0, 100.0),
                direction: 0.0,
                fan_width: 360.0,
                volume: 60,
            }],
        }
    }

    /// Build every source, failing on the first invalid one
    pub fn build_sources(&self) -> Result<Vec<SoundSource>, SceneError> {
        self.sources
            .iter()
            .enumerate()
            .map(|(index, layout)| {
                layout
                    .build()
                    .map_err(|source| SceneError::Source { index, source })
            })
            .collect()
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        info!(path = ?path.as_ref(), "Saved scene layout");
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let json = fs::read_to_string(path.as_ref())?;
        let layout: SceneLayout = serde_json::from_str(&json)?;
        info!(
            path = ?path.as_ref(),
            ears = layout.ears.len(),
            sources = layout.sources.len(),
            "Loaded scene layout"
        );
        Ok(layout)
    }
}
