//! Broad phase collision detection using sweep and prune

use super::{Aabb, Circle, ColliderKind};
use hecs::Entity;
use std::cmp::Ordering;

/// Entry for broad phase collision detection
#[derive(Debug, Clone, Copy)]
pub struct BroadPhaseEntry {
    pub entity: Entity,
    pub kind: ColliderKind,
    pub circle: Circle,
}

impl BroadPhaseEntry {
    pub fn aabb(&self) -> Aabb {
        self.circle.aabb()
    }
}

/// Axis for sweep and prune
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Endpoint for sweep and prune
struct Endpoint {
    value: f64,
    index: usize,
    is_min: bool,
}

/// Find every pair of entries whose circles overlap.
///
/// Pairs of the same kind are skipped, and each pair is reported once as
/// `(lower_index, higher_index)`.
pub fn sweep_and_prune(entries: &[BroadPhaseEntry]) -> Vec<(usize, usize)> {
    if entries.len() < 2 {
        return Vec::new();
    }

    let axis = determine_best_axis(entries);

    let mut endpoints = create_endpoints(entries, axis);
    // Min endpoints sort before max endpoints at equal values so touching boxes pair up
    endpoints.sort_by(|a, b| {
        a.value
            .partial_cmp(&b.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.is_min.cmp(&a.is_min))
    });

    let mut pairs = Vec::new();
    let mut active: Vec<usize> = Vec::new();

    for endpoint in endpoints {
        if endpoint.is_min {
            let entry_b = &entries[endpoint.index];
            for &active_index in &active {
                let entry_a = &entries[active_index];
                if entry_a.kind != entry_b.kind
                    && entry_a.aabb().overlaps(&entry_b.aabb())
                    && entry_a.circle.overlaps(&entry_b.circle)
                {
                    pairs.push((
                        active_index.min(endpoint.index),
                        active_index.max(endpoint.index),
                    ));
                }
            }
            active.push(endpoint.index);
        } else {
            active.retain(|&idx| idx != endpoint.index);
        }
    }

    pairs.sort_unstable();
    pairs.dedup();

    pairs
}

/// Determine the best axis for sweep and prune based on variance
fn determine_best_axis(entries: &[BroadPhaseEntry]) -> Axis {
    let count = entries.len() as f64;
    let mean = entries
        .iter()
        .map(|entry| entry.circle.center)
        .sum::<glam::DVec2>()
        / count;

    let variance = entries
        .iter()
        .map(|entry| {
            let diff = entry.circle.center - mean;
            diff * diff
        })
        .sum::<glam::DVec2>()
        / count;

    if variance.x >= variance.y {
        Axis::X
    } else {
        Axis::Y
    }
}

fn create_endpoints(entries: &[BroadPhaseEntry], axis: Axis) -> Vec<Endpoint> {
    let mut endpoints = Vec::with_capacity(entries.len() * 2);

    for (index, entry) in entries.iter().enumerate() {
        let aabb = entry.aabb();
        let (min_val, max_val) = match axis {
            Axis::X => (aabb.min.x, aabb.max.x),
            Axis::Y => (aabb.min.y, aabb.max.y),
        };

        endpoints.push(Endpoint {
            value: min_val,
            index,
            is_min: true,
        });
        endpoints.push(Endpoint {
            value: max_val,
            index,
            is_min: false,
        });
    }

    endpoints
}

/// Simple O(n²) broad phase for small numbers of objects
pub fn brute_force_pairs(entries: &[BroadPhaseEntry]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();

    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if entries[i].kind != entries[j].kind && entries[i].circle.overlaps(&entries[j].circle)
            {
                pairs.push((i, j));
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn entry(world: &mut hecs::World, kind: ColliderKind, x: f64, y: f64, r: f64) -> BroadPhaseEntry {
        BroadPhaseEntry {
            entity: world.spawn(()),
            kind,
            circle: Circle::new(DVec2::new(x, y), r),
        }
    }

    #[test]
    fn test_sweep_and_prune() {
        let mut world = hecs::World::new();
        let entries = vec![
            entry(&mut world, ColliderKind::Ear, 0.0, 0.0, 3.0),
            entry(&mut world, ColliderKind::Particle, 4.0, 0.0, 2.0),
            entry(&mut world, ColliderKind::Particle, 100.0, 0.0, 2.0),
            // Overlaps the first particle but has the same kind
            entry(&mut world, ColliderKind::Particle, 4.5, 0.0, 2.0),
        ];

        let pairs = sweep_and_prune(&entries);
        assert_eq!(pairs, vec![(0, 1), (0, 3)]);
    }

    #[test]
    fn test_boxes_overlapping_but_circles_not() {
        let mut world = hecs::World::new();
        // Diagonal neighbours: the bounding boxes touch, the circles do not
        let entries = vec![
            entry(&mut world, ColliderKind::Ear, 0.0, 0.0, 1.0),
            entry(&mut world, ColliderKind::Particle, 1.9, 1.9, 1.0),
        ];

        assert!(sweep_and_prune(&entries).is_empty());
        assert!(brute_force_pairs(&entries).is_empty());
    }

    #[test]
    fn test_matches_brute_force() {
        let mut world = hecs::World::new();
        let mut entries = Vec::new();
        for i in 0..12 {
            let angle = i as f64 * 0.7;
            let kind = if i % 3 == 0 {
                ColliderKind::Ear
            } else {
                ColliderKind::Particle
            };
            entries.push(entry(
                &mut world,
                kind,
                angle.cos() * i as f64,
                angle.sin() * 2.0,
                1.0 + (i % 4) as f64,
            ));
        }

        assert_eq!(sweep_and_prune(&entries), brute_force_pairs(&entries));
    }

    #[test]
    fn test_too_few_entries() {
        let mut world = hecs::World::new();
        let entries = vec![entry(&mut world, ColliderKind::Ear, 0.0, 0.0, 1.0)];
        assert!(sweep_and_prune(&entries).is_empty());
    }
}
