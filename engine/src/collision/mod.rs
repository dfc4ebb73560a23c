//! Collision primitives for the 2-D sound field
//!
//! Only circles take part in collisions: ears have a fixed footprint and
//! particles a sensing radius that grows as they travel.

pub mod broad_phase;

use glam::DVec2;
use hecs::Entity;

/// The closed set of things that can collide in a sound field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderKind {
    Particle,
    Ear,
}

/// A particle overlapping an ear during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub particle: Entity,
    pub ear: Entity,
}

impl Contact {
    /// Build a contact from a colliding pair, if the pair is one that matters
    pub fn from_pair(a: (Entity, ColliderKind), b: (Entity, ColliderKind)) -> Option<Self> {
        match (a.1, b.1) {
            (ColliderKind::Particle, ColliderKind::Ear) => Some(Self {
                particle: a.0,
                ear: b.0,
            }),
            (ColliderKind::Ear, ColliderKind::Particle) => Some(Self {
                particle: b.0,
                ear: a.0,
            }),
            // Particles pass through each other and ears never move into each other
            _ => None,
        }
    }
}

/// Circle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Check if two circles touch or intersect
    pub fn overlaps(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

    pub fn contains_point(&self, point: DVec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    /// The point of this circle's disc nearest to `point`
    pub fn closest_point_to(&self, point: DVec2) -> DVec2 {
        let offset = point - self.center;
        let distance = offset.length();
        if distance <= self.radius {
            point
        } else {
            self.center + offset / distance * self.radius
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, DVec2::splat(self.radius))
    }
}

/// Axis-aligned bounding box for the broad phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec2,
    pub max: DVec2,
}

impl Aabb {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: DVec2, half_extents: DVec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Check if this AABB overlaps with another
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}
