//! Particle-traced sound propagation for 2-D games
//!
//! Sound sources emit fans of particles that find the listener's ears. The
//! paths they find decide how loud, how late and from which side a sound is
//! heard.

pub mod acoustics;
pub mod clock;
pub mod collision;
pub mod config;
pub mod io;
pub mod timer;

// Re-export commonly used types
pub mod prelude {
    pub use crate::acoustics::{
        direction_vector, AudioSink, DelayedPlayback, Ear, PlaybackError, Side, SoundClip,
        SoundEdge, SoundParticle, SoundSource, SoundWorld, SourceError, TickReport, TimerEvent,
    };

    pub use crate::clock::TickAccumulator;
    pub use crate::config::{AcousticConfig, ConfigError};
    pub use crate::io::{SceneError, SceneLayout};
    pub use crate::timer::{TickScheduler, Timer, TimerError};

    pub use glam::DVec2;
    pub use hecs::Entity;
}

/// Initialize logging for the engine
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
