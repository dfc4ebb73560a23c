//! Unit conversions and distance attenuation
//!
//! The world is measured in pixels and simulation ticks. Everything here is a
//! pure function of the [`AcousticConfig`] it is called on.

use crate::config::AcousticConfig;
use glam::DVec2;
use std::f64::consts::LN_2;

/// Pixels in one meter
pub const PIXELS_PER_METER: f64 = 100.0;
/// Simulation ticks in one second
pub const TICKS_PER_SECOND: f64 = 30.0;
/// How fast sound travels (in meters per second)
pub const SOUND_SPEED_METERS_PER_SECOND: f64 = 343.0;
/// How small sound will still be played
pub const MIN_SOUND_VOLUME: i32 = 5;
/// How loud a sound should be at maximum
pub const MAX_SOUND_VOLUME: i32 = 120;
pub const EAR_WIDTH_METERS: f64 = 0.06;
pub const EAR_HEIGHT_METERS: f64 = 0.05;
/// Particles crawl at a fraction of the real speed so they stay visible
pub const PARTICLE_SPEED_SCALE: f64 = 0.01;
pub const PARTICLE_BASE_SIZE_PIXELS: f64 = 6.0;
pub const MAX_PARTICLE_DISTANCE_METERS: f64 = 150.0;
/// How many degrees each particle of a fan covers
pub const DEFAULT_DEGREES_PER_PARTICLE: f64 = 10.0;
pub const SOUND_PREPARATION_TICKS: f64 = 100.0;
pub const PLAYBACK_DELAY_SCALE: f64 = 100.0;

impl AcousticConfig {
    pub fn meters_to_pixels(&self, meters: f64) -> f64 {
        meters * self.pixels_per_meter
    }

    pub fn pixels_to_meters(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_meter
    }

    pub fn ticks_to_seconds(&self, ticks: f64) -> f64 {
        ticks / self.ticks_per_second
    }

    pub fn seconds_to_ticks(&self, seconds: f64) -> f64 {
        seconds * self.ticks_per_second
    }

    /// Real sound speed in pixels per tick
    pub fn sound_speed_pixels_per_tick(&self) -> f64 {
        self.meters_to_pixels(self.sound_speed_meters_per_second) / self.seconds_to_ticks(1.0)
    }

    /// Speed of a simulated particle, slowed down by `particle_speed_scale`
    pub fn particle_speed_pixels_per_tick(&self) -> f64 {
        self.sound_speed_pixels_per_tick() * self.particle_speed_scale
    }

    /// Ticks the sound needs to cover `pixels` at the real sound speed
    pub fn delay_ticks(&self, pixels: f64) -> f64 {
        pixels / self.sound_speed_pixels_per_tick()
    }

    /// Decibels lost over `pixels` of travel: `6 * log2(1 + meters)`
    pub fn volume_lost_in_distance(&self, pixels: f64) -> f64 {
        6.0 * (self.pixels_to_meters(pixels).ln_1p() / LN_2)
    }

    /// Volume change caused by travelling `pixels`: `-6 * ln(meters / ln 2)`.
    ///
    /// Not the inverse of [`Self::volume_lost_in_distance`]; the two curves
    /// disagree and this one diverges to `+inf` as the distance approaches zero.
    pub fn volume_adjustment(&self, pixels: f64) -> f64 {
        -6.0 * (self.pixels_to_meters(pixels) / LN_2).ln()
    }

    /// Particles travelling further than this die
    pub fn max_particle_distance_pixels(&self) -> f64 {
        self.meters_to_pixels(self.max_particle_distance_meters).trunc()
    }

    /// Whole-pixel ear footprint as (width, height)
    pub fn ear_size_pixels(&self) -> (f64, f64) {
        (
            self.meters_to_pixels(self.ear_width_meters).trunc(),
            self.meters_to_pixels(self.ear_height_meters).trunc(),
        )
    }

    /// Radius of the circle enclosing an ear
    pub fn ear_radius_pixels(&self) -> f64 {
        let (width, height) = self.ear_size_pixels();
        width.max(height) / 2.0
    }
}

/// Wrap a direction in degrees into `[0, 360)`
pub fn normalize_direction(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Unit vector for a direction in degrees. 0 points along +x and angles grow
/// counter-clockwise on a y-down screen.
pub fn direction_vector(degrees: f64) -> DVec2 {
    let radians = degrees.to_radians();
    DVec2::new(radians.cos(), -radians.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_round_trips() {
        let config = AcousticConfig::default();
        assert_eq!(config.meters_to_pixels(1.5), 150.0);
        assert_eq!(config.pixels_to_meters(250.0), 2.5);
        assert_eq!(config.seconds_to_ticks(2.0), 60.0);
        assert!((config.ticks_to_seconds(15.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sound_speed() {
        let config = AcousticConfig::default();
        let expected = 34_300.0 / 30.0;
        assert!((config.sound_speed_pixels_per_tick() - expected).abs() < 1e-9);
        assert!((config.particle_speed_pixels_per_tick() - expected * 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_delay_is_monotonic() {
        let config = AcousticConfig::default();
        assert_eq!(config.delay_ticks(0.0), 0.0);

        let mut previous = config.delay_ticks(0.0);
        for step in 1..200 {
            let delay = config.delay_ticks(step as f64 * 37.5);
            assert!(delay >= 0.0);
            assert!(delay > previous);
            previous = delay;
        }
    }

    #[test]
    fn test_volume_lost_in_distance() {
        let config = AcousticConfig::default();
        assert_eq!(config.volume_lost_in_distance(0.0), 0.0);
        // One meter doubles (1 + d), losing exactly 6 dB
        assert!((config.volume_lost_in_distance(100.0) - 6.0).abs() < 1e-9);
        assert!((config.volume_lost_in_distance(300.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_adjustment_curve() {
        let config = AcousticConfig::default();
        // Neutral where meters == ln 2
        let neutral = config.meters_to_pixels(LN_2);
        assert!(config.volume_adjustment(neutral).abs() < 1e-9);

        assert!(config.volume_adjustment(10.0) > 0.0);
        assert!(config.volume_adjustment(1000.0) < 0.0);
        assert_eq!(config.volume_adjustment(0.0), f64::INFINITY);
    }

    #[test]
    fn test_derived_sizes() {
        let config = AcousticConfig::default();
        assert_eq!(config.max_particle_distance_pixels(), 15_000.0);
        assert_eq!(config.ear_size_pixels(), (6.0, 5.0));
        assert_eq!(config.ear_radius_pixels(), 3.0);
    }

    #[test]
    fn test_normalize_direction() {
        assert_eq!(normalize_direction(0.0), 0.0);
        assert_eq!(normalize_direction(360.0), 0.0);
        assert_eq!(normalize_direction(-90.0), 270.0);
        assert_eq!(normalize_direction(725.0), 5.0);
    }

    #[test]
    fn test_direction_vector() {
        let right = direction_vector(0.0);
        assert!((right - DVec2::X).length() < 1e-12);

        // 90 degrees points up the screen
        let up = direction_vector(90.0);
        assert!((up - DVec2::new(0.0, -1.0)).length() < 1e-12);
    }
}
