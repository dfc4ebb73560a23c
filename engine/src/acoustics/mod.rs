//! Particle-based acoustics for a 2-D world
//!
//! A sound source sends out a fan of particles. Particles that reach an ear
//! leave behind an edge: the volume change and travel delay between source
//! and ear. Playing a sound replays it once per edge, delayed and panned
//! toward the ear's side.

pub mod ear;
pub mod edge;
pub mod particle;
pub mod playback;
pub mod source;
pub mod units;
pub mod world;


pub use ear::{Ear, Side};
pub use edge::{EarRef, SoundEdge};
pub use particle::{ParticleState, SoundParticle};
pub use playback::{decibels_to_gain, AudioSink, DelayedPlayback, PlaybackError, SoundClip};
pub use source::{EmissionFan, SoundSource, SourceError};
pub use units::{direction_vector, normalize_direction};
pub use world::{SoundWorld, TickReport, TimerEvent};
