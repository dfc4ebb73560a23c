//! Fixed-rate tick accumulator
//!
//! Turns variable frame deltas into whole simulation ticks and keeps the
//! remainder for the next frame.

use tracing::warn;

/// Most ticks a single frame may produce
const MAX_TICKS_PER_FRAME: u32 = 8;

#[derive(Debug, Clone)]
pub struct TickAccumulator {
    accumulated: f64,
    tick_duration: f64,
}

impl TickAccumulator {
    pub fn new(ticks_per_second: f64) -> Self {
        Self {
            accumulated: 0.0,
            tick_duration: 1.0 / ticks_per_second,
        }
    }

    /// Add `delta_seconds` of wall time and return the number of ticks to run
    pub fn accumulate(&mut self, delta_seconds: f64) -> u32 {
        if !delta_seconds.is_finite() || delta_seconds <= 0.0 {
            return 0;
        }
        self.accumulated += delta_seconds;

        let limit = self.tick_duration * f64::from(MAX_TICKS_PER_FRAME);
        if self.accumulated > limit {
            warn!(
                accumulated = self.accumulated,
                "Frame took too long, dropping simulation time"
            );
            self.accumulated = limit;
        }

        let ticks = (self.accumulated / self.tick_duration) as u32;
        self.accumulated -= f64::from(ticks) * self.tick_duration;
        ticks
    }

    /// How far between two ticks we are, in [0, 1)
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulated / self.tick_duration
    }

    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }

    pub fn accumulated_time(&self) -> f64 {
        self.accumulated
    }

    pub fn tick_duration(&self) -> f64 {
        self.tick_duration
    }
}

impl Default for TickAccumulator {
    fn default() -> Self {
        Self::new(crate::acoustics::units::TICKS_PER_SECOND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_ticks() {
        let mut clock = TickAccumulator::new(60.0);

        assert_eq!(clock.accumulate(1.0 / 30.0), 2);
        assert!(clock.interpolation_alpha().abs() < 0.001);

        assert_eq!(clock.accumulate(1.0 / 120.0), 0);
        assert!((clock.interpolation_alpha() - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = TickAccumulator::new(30.0);
        let ticks = clock.accumulate(1.0);
        assert!(ticks <= MAX_TICKS_PER_FRAME && ticks + 1 >= MAX_TICKS_PER_FRAME);
        assert!(clock.accumulated_time() < clock.tick_duration());
    }

    #[test]
    fn test_ignores_bad_deltas() {
        let mut clock = TickAccumulator::default();
        assert_eq!(clock.accumulate(-1.0), 0);
        assert_eq!(clock.accumulate(f64::NAN), 0);
        assert_eq!(clock.accumulated_time(), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut clock = TickAccumulator::new(60.0);
        clock.accumulate(1.0 / 120.0);
        clock.reset();
        assert_eq!(clock.accumulated_time(), 0.0);
    }
}
