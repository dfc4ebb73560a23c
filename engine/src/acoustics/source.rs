//! Sound sources emit particle fans and turn the edges they find into playback

use crate::acoustics::edge::SoundEdge;
use crate::acoustics::playback::{DelayedPlayback, SoundClip};
use crate::acoustics::units::normalize_direction;
use crate::config::AcousticConfig;
use glam::DVec2;
use hecs::Entity;
use tracing::debug;

/// Invalid sound source parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("fan width must be in (0, 360] degrees, got {0}")]
    InvalidFanWidth(f64),

    #[error("default volume must not be negative, got {0}")]
    NegativeVolume(i32),

    #[error("direction must be finite, got {0}")]
    InvalidDirection(f64),
}

/// Particles a source wants spawned for a fresh set of edges
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionFan {
    pub origin: DVec2,
    pub volume: i32,
    /// Increases with every rebuild; edges from older fans are ignored
    pub emission: u64,
    /// Travel direction of each particle, in degrees
    pub angles: Vec<f64>,
}

/// An acoustic emitter.
///
/// The edge set describes the current geometry exactly when `needs_new_edges`
/// is false. Moving or turning the source raises the flag; the edges are
/// rebuilt lazily right before the next emission or playback.
#[derive(Debug, Clone)]
pub struct SoundSource {
    position: DVec2,
    direction: f64,
    fan_width: f64,
    default_volume: i32,
    needs_new_edges: bool,
    may_contain_duplicates: bool,
    edges: Vec<SoundEdge>,
    pending_clip: Option<SoundClip>,
    emission: u64,
}

impl SoundSource {
    /// Create a source facing `direction` degrees. A `fan_width` of 360 makes
    /// the sound audible from every direction.
    pub fn new(
        position: DVec2,
        fan_width: f64,
        direction: f64,
        default_volume: i32,
    ) -> Result<Self, SourceError> {
        if !fan_width.is_finite() || fan_width <= 0.0 || fan_width > 360.0 {
            return Err(SourceError::InvalidFanWidth(fan_width));
        }
        if default_volume < 0 {
            return Err(SourceError::NegativeVolume(default_volume));
        }
        if !direction.is_finite() {
            return Err(SourceError::InvalidDirection(direction));
        }

        Ok(Self {
            position,
            direction: normalize_direction(direction),
            fan_width,
            default_volume,
            needs_new_edges: true,
            may_contain_duplicates: false,
            edges: Vec::new(),
            pending_clip: None,
            emission: 0,
        })
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn direction(&self) -> f64 {
        self.direction
    }

    pub fn fan_width(&self) -> f64 {
        self.fan_width
    }

    pub fn default_volume(&self) -> i32 {
        self.default_volume
    }

    pub fn needs_new_edges(&self) -> bool {
        self.needs_new_edges
    }

    pub fn may_contain_duplicates(&self) -> bool {
        self.may_contain_duplicates
    }

    pub fn edges(&self) -> &[SoundEdge] {
        &self.edges
    }

    /// Identifier of the latest emission fan
    pub fn emission(&self) -> u64 {
        self.emission
    }

    /// Move the sound's origin
    pub fn set_position(&mut self, position: DVec2) {
        if self.position == position {
            return;
        }

        self.position = position;
        self.needs_new_edges = true;
    }

    /// Turn the source to face `direction` degrees
    pub fn set_direction(&mut self, direction: f64) {
        if !direction.is_finite() {
            return;
        }

        let direction = normalize_direction(direction);
        if self.direction == direction {
            return;
        }

        self.direction = direction;
        self.needs_new_edges = true;
    }

    pub fn rotate(&mut self, degrees: f64) {
        self.set_direction(self.direction + degrees);
    }

    /// Directions covering `[direction - fan/2, direction + fan/2)` one angular step apart
    pub fn emission_angles(&self, config: &AcousticConfig) -> Vec<f64> {
        let start = self.direction - self.fan_width / 2.0;
        let end = self.direction + self.fan_width / 2.0;
        let step = config.degrees_per_particle;

        (0u32..)
            .map(|i| start + f64::from(i) * step)
            .take_while(|angle| *angle < end)
            .collect()
    }

    /// Drop the stale edges and describe the particles that will find new ones.
    ///
    /// Returns `None` if the current edges are still valid.
    pub fn prepare_for_edges(&mut self, config: &AcousticConfig) -> Option<EmissionFan> {
        if !self.needs_new_edges {
            return None;
        }

        self.edges.clear();
        self.may_contain_duplicates = false;
        self.emission += 1;
        self.needs_new_edges = false;

        let angles = self.emission_angles(config);
        debug!(
            position = ?self.position,
            direction = self.direction,
            particles = angles.len(),
            emission = self.emission,
            "Preparing new sound edges"
        );

        Some(EmissionFan {
            origin: self.position,
            volume: self.default_volume,
            emission: self.emission,
            angles,
        })
    }

    /// Record an edge found by one of this source's particles. Invalid edges are dropped.
    pub fn add_edge(&mut self, edge: SoundEdge) -> bool {
        if !edge.is_valid() {
            return false;
        }

        self.edges.push(edge);
        self.may_contain_duplicates = true;
        true
    }

    /// Keep only the first edge of every group of duplicates. Returns how many were removed.
    pub fn remove_duplicate_edges(&mut self) -> usize {
        if !self.may_contain_duplicates {
            return 0;
        }

        let keep: Vec<bool> = (0..self.edges.len())
            .map(|i| {
                !self.edges[..i]
                    .iter()
                    .any(|earlier| self.edges[i].is_duplicate_with(earlier))
            })
            .collect();

        let before = self.edges.len();
        let mut flags = keep.into_iter();
        self.edges.retain(|_| flags.next().unwrap_or(true));
        let removed = before - self.edges.len();

        debug!(removed, remaining = self.edges.len(), "Removed duplicate edges");
        self.may_contain_duplicates = false;
        removed
    }

    /// Deduplicate the edges and turn each survivor into a delayed playback of `clip`
    pub fn playback_plan(
        &mut self,
        owner: Entity,
        clip: &SoundClip,
        config: &AcousticConfig,
    ) -> Vec<DelayedPlayback> {
        self.remove_duplicate_edges();

        debug!(clip = %clip, sounds = self.edges.len(), "Planning playback");
        self.edges
            .iter()
            .map(|edge| DelayedPlayback {
                owner,
                clip: clip.clone(),
                delay_ticks: (edge.delay_ticks() * config.playback_delay_scale).trunc(),
                volume_adjustment: f64::from(edge.volume_adjustment()),
                pan: edge.target().side.pan(),
            })
            .collect()
    }

    /// Remember the clip to play once preparation is over
    pub fn set_pending_clip(&mut self, clip: SoundClip) {
        self.pending_clip = Some(clip);
    }

    pub fn take_pending_clip(&mut self) -> Option<SoundClip> {
        self.pending_clip.take()
    }

    /// Forget every edge, as when the source is removed
    pub fn clear_edges(&mut self) {
        self.edges.clear();
        self.may_contain_duplicates = false;
    }
}
