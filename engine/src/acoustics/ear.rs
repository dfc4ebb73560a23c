//! Ears receive sounds. Only those sounds can be heard that find an ear.

use crate::acoustics::edge::{EarRef, SoundEdge};
use crate::acoustics::particle::SoundParticle;
use crate::collision::Circle;
use crate::config::AcousticConfig;
use glam::DVec2;
use hecs::Entity;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Which side of the head an ear is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The pan used for playing a sound on this side
    pub fn pan(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// A passive circular sensor that only hears particles arriving from its
/// outward half-plane, so two ears side by side can tell left from right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ear {
    position: DVec2,
    radius: f64,
    side: Side,
}

impl Ear {
    pub fn new(position: DVec2, side: Side, config: &AcousticConfig) -> Self {
        Self {
            position,
            radius: config.ear_radius_pixels(),
            side,
        }
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn set_position(&mut self, position: DVec2) {
        self.position = position;
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn footprint(&self) -> Circle {
        Circle::new(self.position, self.radius)
    }

    /// True if `point` is inside the footprint and strictly on this ear's outer side
    pub fn accepts(&self, point: DVec2) -> bool {
        // Contact points land on the rim, so allow for rounding
        let rim = Circle::new(self.position, self.radius + 1e-9);
        if !rim.contains_point(point) {
            return false;
        }

        match self.side {
            Side::Left => point.x < self.position.x,
            Side::Right => point.x > self.position.x,
        }
    }

    /// Where a particle centred at `particle_center` touches this ear
    pub fn contact_point(&self, particle_center: DVec2) -> DVec2 {
        self.footprint().closest_point_to(particle_center)
    }

    /// Let an overlapping particle register a path to this ear.
    ///
    /// Returns the edge the particle produced, if the contact was accepted and
    /// the particle had not already reported this ear.
    pub fn on_particle_contact(
        &self,
        entity: Entity,
        particle: &mut SoundParticle,
        config: &AcousticConfig,
    ) -> Option<SoundEdge> {
        let point = self.contact_point(particle.position());
        if !self.accepts(point) {
            trace!(ear = ?entity, side = ?self.side, ?point, "Contact from the inner side ignored");
            return None;
        }

        particle.on_ear_contact(
            EarRef {
                entity,
                side: self.side,
            },
            config,
        )
    }
}
