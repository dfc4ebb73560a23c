//! Sound particles travel around the world and try to find an ear

use crate::acoustics::edge::{EarRef, SoundEdge};
use crate::acoustics::units::direction_vector;
use crate::collision::Circle;
use crate::config::AcousticConfig;
use glam::DVec2;
use hecs::Entity;
use tracing::trace;

/// Lifecycle of a particle. Dead particles are removed by the world at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleState {
    Alive,
    Dead,
}

/// One emitted ray of a sound source.
///
/// The sensing radius grows with the distance travelled so that the fan of
/// particles approximates an expanding wavefront without covering it fully.
#[derive(Debug, Clone)]
pub struct SoundParticle {
    position: DVec2,
    velocity: DVec2,
    start_volume: i32,
    pixels_traveled: f64,
    // Walls are not simulated, so nothing adds to this yet
    volume_lost_on_collisions: f64,
    source: Entity,
    emission: u64,
    first_ear: Option<Entity>,
    scale: f64,
    state: ParticleState,
}

impl SoundParticle {
    /// Create a particle leaving `origin` towards `direction` degrees.
    ///
    /// `emission` identifies the emission fan of `source` this particle belongs to.
    pub fn new(
        origin: DVec2,
        volume: i32,
        direction: f64,
        source: Entity,
        emission: u64,
        config: &AcousticConfig,
    ) -> Self {
        Self {
            position: origin,
            velocity: direction_vector(direction) * config.particle_speed_pixels_per_tick(),
            start_volume: volume,
            pixels_traveled: 0.0,
            volume_lost_on_collisions: 0.0,
            source,
            emission,
            first_ear: None,
            scale: 0.0,
            state: ParticleState::Alive,
        }
    }

    /// Move forward by `dt` ticks, grow, and die if there is no point in living anymore
    pub fn advance(&mut self, dt: f64, config: &AcousticConfig) {
        if self.is_dead() {
            return;
        }

        self.position += self.velocity * dt;
        self.pixels_traveled += self.velocity.length() * dt;

        self.scale = self.pixels_traveled * config.degrees_per_particle / 360.0;

        self.check_if_should_die(config);
    }

    /// Called when the particle overlaps an ear that accepted the contact.
    ///
    /// Returns the new edge, or `None` when the particle is dead or already
    /// reported this ear. A particle dies after reporting its second ear.
    pub fn on_ear_contact(&mut self, ear: EarRef, config: &AcousticConfig) -> Option<SoundEdge> {
        if self.is_dead() || self.first_ear == Some(ear.entity) {
            return None;
        }

        let edge = SoundEdge::new(
            self.start_volume,
            self.volume_lost_on_collisions as i32,
            self.pixels_traveled,
            ear,
            config,
        );

        if self.first_ear.is_some() {
            trace!(source = ?self.source, "Particle found both ears");
            self.kill();
        } else {
            self.first_ear = Some(ear.entity);
        }

        Some(edge)
    }

    fn check_if_should_die(&mut self, config: &AcousticConfig) {
        let remaining = f64::from(self.start_volume) - self.volume_lost_on_collisions;
        if remaining < f64::from(config.min_sound_volume)
            || self.pixels_traveled > config.max_particle_distance_pixels()
        {
            trace!(
                source = ?self.source,
                pixels_traveled = self.pixels_traveled,
                "Particle died without finding an ear"
            );
            self.kill();
        }
    }

    pub fn kill(&mut self) {
        self.state = ParticleState::Dead;
    }

    pub fn is_dead(&self) -> bool {
        self.state == ParticleState::Dead
    }

    pub fn state(&self) -> ParticleState {
        self.state
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn pixels_traveled(&self) -> f64 {
        self.pixels_traveled
    }

    pub fn source(&self) -> Entity {
        self.source
    }

    pub fn emission(&self) -> u64 {
        self.emission
    }

    pub fn first_ear(&self) -> Option<Entity> {
        self.first_ear
    }

    /// Current sensing radius
    pub fn radius(&self, config: &AcousticConfig) -> f64 {
        config.particle_base_size_pixels * self.scale
    }

    pub fn footprint(&self, config: &AcousticConfig) -> Circle {
        Circle::new(self.position, self.radius(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acoustics::ear::Side;

    struct Fixture {
        world: hecs::World,
        config: AcousticConfig,
        source: Entity,
    }

    fn fixture() -> Fixture {
        let mut world = hecs::World::new();
        let source = world.spawn(());
        Fixture {
            world,
            config: AcousticConfig::default(),
            source,
        }
    }

    fn ear(world: &mut hecs::World, side: Side) -> EarRef {
        EarRef {
            entity: world.spawn(()),
            side,
        }
    }

    #[test]
    fn test_moves_at_slowed_sound_speed() {
        let f = fixture();
        let mut particle = SoundParticle::new(DVec2::ZERO, 60, 0.0, f.source, 0, &f.config);

        particle.advance(1.0, &f.config);
        let speed = f.config.particle_speed_pixels_per_tick();
        assert!((particle.position() - DVec2::new(speed, 0.0)).length() < 1e-9);
        assert!((particle.pixels_traveled() - speed).abs() < 1e-9);

        particle.advance(2.5, &f.config);
        assert!((particle.pixels_traveled() - speed * 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_radius_grows_with_distance() {
        let f = fixture();
        let mut particle = SoundParticle::new(DVec2::ZERO, 60, 45.0, f.source, 0, &f.config);
        assert_eq!(particle.radius(&f.config), 0.0);

        let mut previous = 0.0;
        for _ in 0..50 {
            particle.advance(1.0, &f.config);
            let radius = particle.radius(&f.config);
            assert!(radius > previous);
            previous = radius;
        }

        let expected = 6.0 * particle.pixels_traveled() * 10.0 / 360.0;
        assert!((particle.radius(&f.config) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_dies_past_max_distance_without_edges() {
        let f = fixture();
        let mut particle = SoundParticle::new(DVec2::ZERO, 60, 90.0, f.source, 0, &f.config);
        let max = f.config.max_particle_distance_pixels();

        let mut ticks = 0;
        while !particle.is_dead() {
            particle.advance(1.0, &f.config);
            ticks += 1;
            assert!(ticks < 20_000, "particle never died");
        }

        assert!(particle.pixels_traveled() > max);
        assert_eq!(particle.first_ear(), None);
        assert_eq!(particle.state(), ParticleState::Dead);
    }

    #[test]
    fn test_too_quiet_particle_dies_immediately() {
        let f = fixture();
        let mut particle = SoundParticle::new(DVec2::ZERO, 4, 0.0, f.source, 0, &f.config);
        particle.advance(1.0, &f.config);
        assert!(particle.is_dead());
    }

    #[test]
    fn test_same_ear_only_reported_once() {
        let mut f = fixture();
        let left = ear(&mut f.world, Side::Left);
        let mut particle = SoundParticle::new(DVec2::ZERO, 60, 0.0, f.source, 0, &f.config);
        for _ in 0..100 {
            particle.advance(1.0, &f.config);
        }

        assert!(particle.on_ear_contact(left, &f.config).is_some());
        assert!(particle.on_ear_contact(left, &f.config).is_none());
        assert!(particle.on_ear_contact(left, &f.config).is_none());
        assert!(!particle.is_dead());
    }

    #[test]
    fn test_dies_after_second_distinct_ear() {
        let mut f = fixture();
        let left = ear(&mut f.world, Side::Left);
        let right = ear(&mut f.world, Side::Right);
        let mut particle = SoundParticle::new(DVec2::ZERO, 60, 0.0, f.source, 0, &f.config);
        for _ in 0..100 {
            particle.advance(1.0, &f.config);
        }

        let first = particle.on_ear_contact(left, &f.config).unwrap();
        assert_eq!(first.target(), left);
        let second = particle.on_ear_contact(right, &f.config).unwrap();
        assert_eq!(second.target(), right);

        assert!(particle.is_dead());
        assert!(particle.on_ear_contact(left, &f.config).is_none());
    }

    #[test]
    fn test_dead_particle_stops_moving() {
        let f = fixture();
        let mut particle = SoundParticle::new(DVec2::ZERO, 60, 0.0, f.source, 0, &f.config);
        particle.kill();
        particle.advance(10.0, &f.config);
        assert_eq!(particle.position(), DVec2::ZERO);
    }
}
