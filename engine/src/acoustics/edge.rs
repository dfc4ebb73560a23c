//! Sound edges are particle paths that lead from a sound source to an ear

use crate::acoustics::ear::Side;
use crate::config::AcousticConfig;
use hecs::Entity;
use tracing::debug;

/// The ear an edge leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EarRef {
    pub entity: Entity,
    pub side: Side,
}

/// One surviving propagation path from a source to an ear
#[derive(Debug, Clone, PartialEq)]
pub struct SoundEdge {
    target: EarRef,
    volume_adjustment: i32,
    delay_ticks: f64,
    valid: bool,
}

impl SoundEdge {
    /// Create the edge a particle found after travelling `pixels_traveled`.
    ///
    /// The adjustment is clamped so that `start_volume + adjustment` never
    /// exceeds the maximum volume. If the result is quieter than the minimum
    /// volume the edge is marked invalid.
    pub fn new(
        start_volume: i32,
        volume_lost_in_collisions: i32,
        pixels_traveled: f64,
        target: EarRef,
        config: &AcousticConfig,
    ) -> Self {
        let delay_ticks = config.delay_ticks(pixels_traveled);
        let mut volume_adjustment =
            (config.volume_adjustment(pixels_traveled) as i32).saturating_sub(volume_lost_in_collisions);

        let start = i64::from(start_volume);
        if start + i64::from(volume_adjustment) > i64::from(config.max_sound_volume) {
            volume_adjustment = config.max_sound_volume - start_volume;
        }

        let valid = start + i64::from(volume_adjustment) >= i64::from(config.min_sound_volume);

        debug!(
            delay_ms = config.ticks_to_seconds(delay_ticks) * 1000.0,
            delay_ticks,
            volume_adjustment,
            side = ?target.side,
            valid,
            "Sound edge created"
        );

        Self {
            target,
            volume_adjustment,
            delay_ticks,
            valid,
        }
    }

    /// How much the environment changes the sound's volume (dB)
    pub fn volume_adjustment(&self) -> i32 {
        self.volume_adjustment
    }

    /// How long it takes for the sound to travel to its destination
    pub fn delay_ticks(&self) -> f64 {
        self.delay_ticks
    }

    /// Which ear the sound reached
    pub fn target(&self) -> EarRef {
        self.target
    }

    /// Is there any point in using this edge
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether this edge is practically identical to `other`: same side, same
    /// whole number of delay ticks and same volume adjustment
    pub fn is_duplicate_with(&self, other: &SoundEdge) -> bool {
        self.volume_adjustment == other.volume_adjustment
            && self.target.side == other.target.side
            && self.delay_ticks.trunc() == other.delay_ticks.trunc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ear(world: &mut hecs::World, side: Side) -> EarRef {
        EarRef {
            entity: world.spawn(()),
            side,
        }
    }

    #[test]
    fn test_delay_uses_real_sound_speed() {
        let config = AcousticConfig::default();
        let mut world = hecs::World::new();
        let edge = SoundEdge::new(60, 0, 1143.0, ear(&mut world, Side::Left), &config);

        let expected = 1143.0 / config.sound_speed_pixels_per_tick();
        assert!((edge.delay_ticks() - expected).abs() < 1e-12);
        assert!(edge.delay_ticks() < 1.0);
    }

    #[test]
    fn test_adjustment_truncates_then_subtracts_losses() {
        let config = AcousticConfig::default();
        let mut world = hecs::World::new();
        let target = ear(&mut world, Side::Right);

        // 300 px: -6 * ln(3 / ln 2) = -8.79..., truncated to -8
        let edge = SoundEdge::new(60, 0, 300.0, target, &config);
        assert_eq!(edge.volume_adjustment(), -8);
        assert!(edge.is_valid());

        let edge = SoundEdge::new(60, 4, 300.0, target, &config);
        assert_eq!(edge.volume_adjustment(), -12);
    }

    #[test]
    fn test_adjustment_clamped_to_max_volume() {
        let config = AcousticConfig::default();
        let mut world = hecs::World::new();

        // Very short paths produce a huge boost
        let edge = SoundEdge::new(110, 0, 0.5, ear(&mut world, Side::Left), &config);
        assert_eq!(edge.volume_adjustment(), config.max_sound_volume - 110);
        assert!(edge.is_valid());

        // Zero distance is +inf before clamping
        let edge = SoundEdge::new(60, 0, 0.0, ear(&mut world, Side::Left), &config);
        assert_eq!(edge.volume_adjustment(), 60);
        assert!(edge.is_valid());
    }

    #[test]
    fn test_quiet_edge_is_invalid() {
        let config = AcousticConfig::default();
        let mut world = hecs::World::new();

        // 100 m away: -6 * ln(100 / ln 2) = -29.8, so 20 + (-29) < 5
        let edge = SoundEdge::new(20, 0, 10_000.0, ear(&mut world, Side::Left), &config);
        assert!(!edge.is_valid());

        let edge = SoundEdge::new(60, 0, 10_000.0, ear(&mut world, Side::Left), &config);
        assert!(edge.is_valid());
    }

    #[test]
    fn test_valid_edges_stay_within_volume_bounds() {
        let config = AcousticConfig::default();
        let mut world = hecs::World::new();
        let target = ear(&mut world, Side::Left);

        for start_volume in [0, 5, 30, 60, 90, 120, 200] {
            for step in 0..400 {
                let distance = step as f64 * 50.0;
                let edge = SoundEdge::new(start_volume, 0, distance, target, &config);
                let total = start_volume + edge.volume_adjustment();
                assert!(total <= config.max_sound_volume);
                if edge.is_valid() {
                    assert!(total >= config.min_sound_volume);
                }
            }
        }
    }

    #[test]
    fn test_duplicate_detection() {
        let config = AcousticConfig::default();
        let mut world = hecs::World::new();
        let left_a = ear(&mut world, Side::Left);
        let left_b = ear(&mut world, Side::Left);
        let right = ear(&mut world, Side::Right);

        let speed = config.sound_speed_pixels_per_tick();
        let a = SoundEdge::new(60, 0, speed * 2.2, left_a, &config);
        // Same whole tick and same adjustment, different ear on the same side
        let b = SoundEdge::new(60, 0, speed * 2.25, left_b, &config);
        let other_side = SoundEdge::new(60, 0, speed * 2.2, right, &config);
        let later = SoundEdge::new(60, 0, speed * 3.2, left_a, &config);

        assert_eq!(a.volume_adjustment(), b.volume_adjustment());
        assert!(a.is_duplicate_with(&b));
        assert!(b.is_duplicate_with(&a));
        assert!(!a.is_duplicate_with(&other_side));
        assert!(!a.is_duplicate_with(&later));
    }
}
