//! Delayed, panned playback of sound clips

use crate::timer::TimerError;
use hecs::Entity;
use std::fmt;
use std::sync::Arc;

/// Errors raised while scheduling or performing playback
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("timer error: {0}")]
    Timer(#[from] TimerError),

    #[error("audio sink failed to play '{clip}': {reason}")]
    Sink { clip: String, reason: String },

    #[error("entity {0:?} is not a sound source")]
    UnknownSource(Entity),
}

/// Cheap, clonable handle naming a pre-recorded clip. Sinks decide how a name
/// maps to audio data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SoundClip {
    name: Arc<str>,
}

impl SoundClip {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for SoundClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for SoundClip {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Where sounds finally end up. Implementations must not block.
pub trait AudioSink {
    /// Play `clip` with a decibel `volume_adjustment` and a `pan` in [-1, 1]
    fn play(&mut self, clip: &SoundClip, volume_adjustment: f64, pan: f64)
        -> Result<(), PlaybackError>;
}

/// Everything needed to play one edge's worth of a sound later on
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedPlayback {
    /// Source that scheduled the playback. The playback is dropped if it is gone.
    pub owner: Entity,
    pub clip: SoundClip,
    pub delay_ticks: f64,
    pub volume_adjustment: f64,
    pub pan: f64,
}

/// Linear gain for a decibel adjustment
pub fn decibels_to_gain(decibels: f64) -> f64 {
    10f64.powf(decibels / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_handle() {
        let clip = SoundClip::from("bird");
        assert_eq!(clip.name(), "bird");
        assert_eq!(clip.to_string(), "bird");
        assert_eq!(clip.clone(), SoundClip::new(String::from("bird")));
    }

    #[test]
    fn test_decibels_to_gain() {
        assert!((decibels_to_gain(0.0) - 1.0).abs() < 1e-12);
        assert!((decibels_to_gain(20.0) - 10.0).abs() < 1e-9);
        assert!((decibels_to_gain(-6.0) - 0.501).abs() < 1e-3);
    }

    #[test]
    fn test_timer_error_converts() {
        let err: PlaybackError = TimerError::InvalidDelay(-2.0).into();
        assert!(matches!(err, PlaybackError::Timer(_)));
        assert!(err.to_string().contains("-2"));
    }
}
