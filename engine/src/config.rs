//! Configuration types for the acoustic simulation

use crate::acoustics::units::{
    DEFAULT_DEGREES_PER_PARTICLE, EAR_HEIGHT_METERS, EAR_WIDTH_METERS, MAX_PARTICLE_DISTANCE_METERS,
    MAX_SOUND_VOLUME, MIN_SOUND_VOLUME, PARTICLE_BASE_SIZE_PIXELS, PARTICLE_SPEED_SCALE,
    PIXELS_PER_METER, PLAYBACK_DELAY_SCALE, SOUND_PREPARATION_TICKS,
    SOUND_SPEED_METERS_PER_SECOND, TICKS_PER_SECOND,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Errors raised while loading or validating an [`AcousticConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must be a non-negative finite number, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("degrees_per_particle must be in (0, 360], got {0}")]
    AngularStep(f64),

    #[error("min_sound_volume ({min}) must be below max_sound_volume ({max})")]
    VolumeRange { min: i32, max: i32 },
}

/// Immutable acoustic constants shared by every component of a simulation.
///
/// Built once (usually through [`Default`] or [`AcousticConfig::from_json_file`])
/// and handed to the world by value; components only ever see it by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcousticConfig {
    /// Spatial scale of the world
    pub pixels_per_meter: f64,
    /// Simulation steps in one second
    pub ticks_per_second: f64,
    /// Real speed of sound, used for delays
    pub sound_speed_meters_per_second: f64,
    /// Quietest volume that is still played
    pub min_sound_volume: i32,
    /// Loudest volume a played sound may reach
    pub max_sound_volume: i32,
    /// Physical ear width
    pub ear_width_meters: f64,
    /// Physical ear height
    pub ear_height_meters: f64,
    /// Slow-motion factor applied to travelling particles
    pub particle_speed_scale: f64,
    /// Radius of a particle at scale 1
    pub particle_base_size_pixels: f64,
    /// Distance after which a particle gives up
    pub max_particle_distance_meters: f64,
    /// Angular resolution of an emission fan
    pub degrees_per_particle: f64,
    /// How long a stale source waits for its particles before playing
    pub preparation_delay_ticks: f64,
    /// Timer ticks per tick of edge delay
    pub playback_delay_scale: f64,
}

impl Default for AcousticConfig {
    fn default() -> Self {
        Self {
            pixels_per_meter: PIXELS_PER_METER,
            ticks_per_second: TICKS_PER_SECOND,
            sound_speed_meters_per_second: SOUND_SPEED_METERS_PER_SECOND,
            min_sound_volume: MIN_SOUND_VOLUME,
            max_sound_volume: MAX_SOUND_VOLUME,
            ear_width_meters: EAR_WIDTH_METERS,
            ear_height_meters: EAR_HEIGHT_METERS,
            particle_speed_scale: PARTICLE_SPEED_SCALE,
            particle_base_size_pixels: PARTICLE_BASE_SIZE_PIXELS,
            max_particle_distance_meters: MAX_PARTICLE_DISTANCE_METERS,
            degrees_per_particle: DEFAULT_DEGREES_PER_PARTICLE,
            preparation_delay_ticks: SOUND_PREPARATION_TICKS,
            playback_delay_scale: PLAYBACK_DELAY_SCALE,
        }
    }
}

impl AcousticConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        debug!(?config, "Parsed acoustic configuration");
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = ?path, "Loading acoustic configuration");
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check that every constant is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("pixels_per_meter", self.pixels_per_meter),
            ("ticks_per_second", self.ticks_per_second),
            ("sound_speed_meters_per_second", self.sound_speed_meters_per_second),
            ("ear_width_meters", self.ear_width_meters),
            ("ear_height_meters", self.ear_height_meters),
            ("particle_speed_scale", self.particle_speed_scale),
            ("particle_base_size_pixels", self.particle_base_size_pixels),
            ("max_particle_distance_meters", self.max_particle_distance_meters),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let non_negative = [
            ("preparation_delay_ticks", self.preparation_delay_ticks),
            ("playback_delay_scale", self.playback_delay_scale),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        let step = self.degrees_per_particle;
        if !step.is_finite() || step <= 0.0 || step > 360.0 {
            return Err(ConfigError::AngularStep(step));
        }

        if self.min_sound_volume >= self.max_sound_volume {
            return Err(ConfigError::VolumeRange {
                min: self.min_sound_volume,
                max: self.max_sound_volume,
            });
        }

        Ok(())
    }
}
