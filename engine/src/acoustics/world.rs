//! The registry owning every ear, source and particle of a sound field
//!
//! One call to [`SoundWorld::advance`] is one simulation step:
//! 1. every live particle moves and grows
//! 2. particles overlapping ears are found (sweep and prune, then circle tests)
//! 3. each contact is dispatched by collider kind and may yield an edge
//! 4. edges are handed to the source that emitted the particle
//! 5. dead particles are removed
//! 6. the timer advances and fired events are played or dropped

use crate::acoustics::ear::{Ear, Side};
use crate::acoustics::edge::SoundEdge;
use crate::acoustics::particle::SoundParticle;
use crate::acoustics::playback::{AudioSink, DelayedPlayback, PlaybackError, SoundClip};
use crate::acoustics::source::SoundSource;
use crate::collision::broad_phase::{sweep_and_prune, BroadPhaseEntry};
use crate::collision::{ColliderKind, Contact};
use crate::config::{AcousticConfig, ConfigError};
use crate::io::{SceneError, SceneLayout};
use crate::timer::{TickScheduler, Timer};
use glam::DVec2;
use hecs::Entity;
use tracing::{debug, info, trace, warn};

/// Data carried by the world's one-shot timers
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// A stale source has given its particles time to find the ears
    PreparationComplete { source: Entity },
    /// One edge's worth of sound is due
    Playback(DelayedPlayback),
}

/// What happened during one simulation step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub live_particles: usize,
    pub contacts: usize,
    pub edges_recorded: usize,
    pub playbacks_fired: usize,
    /// Playbacks whose source was removed before they came due
    pub playbacks_dropped: usize,
    pub failures: Vec<PlaybackError>,
}

/// Tick-driven registry of a 2-D sound field
pub struct SoundWorld {
    entities: hecs::World,
    config: AcousticConfig,
    timer: Box<dyn Timer<TimerEvent>>,
    tick: u64,
}

impl SoundWorld {
    /// Create an empty world driven by a [`TickScheduler`]
    pub fn new(config: AcousticConfig) -> Result<Self, ConfigError> {
        Self::with_timer(config, Box::new(TickScheduler::new()))
    }

    /// Create an empty world driven by a custom timer
    pub fn with_timer(
        config: AcousticConfig,
        timer: Box<dyn Timer<TimerEvent>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            sound_speed_pixels_per_tick = config.sound_speed_pixels_per_tick(),
            degrees_per_particle = config.degrees_per_particle,
            "Creating sound world"
        );

        Ok(Self {
            entities: hecs::World::new(),
            config,
            timer,
            tick: 0,
        })
    }

    pub fn config(&self) -> &AcousticConfig {
        &self.config
    }

    /// Number of completed simulation steps
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn spawn_ear(&mut self, position: DVec2, side: Side) -> Entity {
        let ear = Ear::new(position, side, &self.config);
        let entity = self.entities.spawn((ear, ColliderKind::Ear));
        debug!(entity = ?entity, ?position, ?side, "Spawned ear");
        entity
    }

    /// Place a left and a right ear `ear_spacing_meters` apart, centred on `center`.
    /// Returns `(left, right)`.
    pub fn spawn_head(&mut self, center: DVec2, ear_spacing_meters: f64) -> (Entity, Entity) {
        let half = DVec2::new(self.config.meters_to_pixels(ear_spacing_meters) / 2.0, 0.0);
        let left = self.spawn_ear(center - half, Side::Left);
        let right = self.spawn_ear(center + half, Side::Right);
        (left, right)
    }

    /// Spawn every ear and source of `layout`. Nothing is spawned if a source is invalid.
    /// Returns the new ears and sources in layout order.
    pub fn load_scene(
        &mut self,
        layout: &SceneLayout,
    ) -> Result<(Vec<Entity>, Vec<Entity>), SceneError> {
        let sources = layout.build_sources()?;

        let ears = layout
            .ears
            .iter()
            .map(|ear| self.spawn_ear(ear.position, ear.side))
            .collect();
        let sources = sources
            .into_iter()
            .map(|source| self.spawn_source(source))
            .collect();

        Ok((ears, sources))
    }

    pub fn ear(&self, entity: Entity) -> Option<Ear> {
        self.entities.get::<&Ear>(entity).ok().map(|ear| *ear)
    }

    /// Move an ear. Returns false if `entity` is not an ear.
    pub fn move_ear(&mut self, entity: Entity, position: DVec2) -> bool {
        match self.entities.query_one_mut::<&mut Ear>(entity) {
            Ok(ear) => {
                ear.set_position(position);
                true
            }
            Err(_) => false,
        }
    }

    pub fn spawn_source(&mut self, source: SoundSource) -> Entity {
        let position = source.position();
        let entity = self.entities.spawn((source,));
        debug!(entity = ?entity, ?position, "Spawned sound source");
        entity
    }

    /// Remove a source. Its particles stop travelling and its pending
    /// playbacks are dropped when they come due.
    pub fn despawn_source(&mut self, entity: Entity) -> Result<(), PlaybackError> {
        self.source_mut(entity)
            .ok_or(PlaybackError::UnknownSource(entity))?
            .clear_edges();

        for (_, particle) in self.entities.query_mut::<&mut SoundParticle>() {
            if particle.source() == entity {
                particle.kill();
            }
        }

        self.entities
            .despawn(entity)
            .map_err(|_| PlaybackError::UnknownSource(entity))?;
        debug!(entity = ?entity, "Despawned sound source");
        Ok(())
    }

    pub fn source(&self, entity: Entity) -> Option<hecs::Ref<'_, SoundSource>> {
        self.entities.get::<&SoundSource>(entity).ok()
    }

    pub fn source_mut(&mut self, entity: Entity) -> Option<&mut SoundSource> {
        self.entities.query_one_mut::<&mut SoundSource>(entity).ok()
    }

    /// Snapshot of a source's current edges
    pub fn edges(&self, source: Entity) -> Vec<SoundEdge> {
        self.source(source)
            .map(|source| source.edges().to_vec())
            .unwrap_or_default()
    }

    pub fn live_particles(&self) -> usize {
        self.entities
            .query::<&SoundParticle>()
            .iter()
            .filter(|(_, particle)| !particle.is_dead())
            .count()
    }

    /// Timers that have not fired yet
    pub fn pending_timers(&self) -> usize {
        self.timer.pending()
    }

    /// Emit a fresh particle fan if the source's edges are stale.
    /// Returns the number of particles spawned.
    pub fn prepare_for_edges(&mut self, source: Entity) -> Result<usize, PlaybackError> {
        let fan = match self.entities.query_one_mut::<&mut SoundSource>(source) {
            Ok(state) => state.prepare_for_edges(&self.config),
            Err(_) => return Err(PlaybackError::UnknownSource(source)),
        };
        let Some(fan) = fan else {
            return Ok(0);
        };

        for &angle in &fan.angles {
            let particle = SoundParticle::new(
                fan.origin,
                fan.volume,
                angle,
                source,
                fan.emission,
                &self.config,
            );
            self.entities.spawn((particle, ColliderKind::Particle));
        }

        Ok(fan.angles.len())
    }

    /// Play `clip` from `source`.
    ///
    /// A source with stale edges emits new particles first and plays once the
    /// preparation delay has passed. Otherwise playback is scheduled right away,
    /// one delayed instance per edge.
    pub fn play_sound(&mut self, source: Entity, clip: SoundClip) -> Result<(), PlaybackError> {
        let stale = self
            .source(source)
            .ok_or(PlaybackError::UnknownSource(source))?
            .needs_new_edges();

        if !stale {
            return self.play_with_edges(source, clip).map(|_| ());
        }

        let particles = self.prepare_for_edges(source)?;
        info!(source = ?source, clip = %clip, particles, "Preparing source before playing");

        if let Some(state) = self.source_mut(source) {
            state.set_pending_clip(clip);
        }

        let delay = self.config.preparation_delay_ticks;
        if let Err(err) = self
            .timer
            .schedule_once(delay, TimerEvent::PreparationComplete { source })
        {
            if let Some(state) = self.source_mut(source) {
                state.take_pending_clip();
            }
            return Err(err.into());
        }

        Ok(())
    }

    fn play_with_edges(&mut self, source: Entity, clip: SoundClip) -> Result<usize, PlaybackError> {
        let plan = match self.entities.query_one_mut::<&mut SoundSource>(source) {
            Ok(state) => state.playback_plan(source, &clip, &self.config),
            Err(_) => return Err(PlaybackError::UnknownSource(source)),
        };

        info!(source = ?source, clip = %clip, sounds = plan.len(), "Scheduling playback");
        let scheduled = plan.len();
        for playback in plan {
            self.timer
                .schedule_once(playback.delay_ticks, TimerEvent::Playback(playback))?;
        }

        Ok(scheduled)
    }

    /// Run one simulation step of `dt` ticks
    pub fn advance(&mut self, dt: f64, sink: &mut dyn AudioSink) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..Default::default()
        };

        self.move_particles(dt);

        let contacts = self.detect_contacts();
        report.contacts = contacts.len();
        report.edges_recorded = self.resolve_contacts(&contacts);

        self.remove_dead_particles();
        report.live_particles = self.live_particles();

        for event in self.timer.advance(dt) {
            self.dispatch(event, sink, &mut report);
        }

        if report.edges_recorded > 0 || report.playbacks_fired > 0 {
            trace!(?report, "Tick finished");
        }
        report
    }

    fn move_particles(&mut self, dt: f64) {
        for (_, particle) in self.entities.query_mut::<&mut SoundParticle>() {
            particle.advance(dt, &self.config);
        }
    }

    fn detect_contacts(&self) -> Vec<Contact> {
        let mut entries = Vec::new();

        for (entity, (kind, ear, particle)) in self
            .entities
            .query::<(&ColliderKind, Option<&Ear>, Option<&SoundParticle>)>()
            .iter()
        {
            let circle = match (kind, ear, particle) {
                (ColliderKind::Ear, Some(ear), _) => ear.footprint(),
                (ColliderKind::Particle, _, Some(particle)) if !particle.is_dead() => {
                    particle.footprint(&self.config)
                }
                _ => continue,
            };
            entries.push(BroadPhaseEntry {
                entity,
                kind: *kind,
                circle,
            });
        }

        sweep_and_prune(&entries)
            .into_iter()
            .filter_map(|(a, b)| {
                Contact::from_pair(
                    (entries[a].entity, entries[a].kind),
                    (entries[b].entity, entries[b].kind),
                )
            })
            .collect()
    }

    /// Let ears and particles react to their contacts. Returns the number of edges recorded.
    fn resolve_contacts(&mut self, contacts: &[Contact]) -> usize {
        let mut found = Vec::new();

        for contact in contacts {
            let Some(ear) = self.ear(contact.ear) else {
                continue;
            };
            let Ok(particle) = self
                .entities
                .query_one_mut::<&mut SoundParticle>(contact.particle)
            else {
                continue;
            };

            let source = particle.source();
            let emission = particle.emission();
            if let Some(edge) = ear.on_particle_contact(contact.ear, particle, &self.config) {
                found.push((source, emission, edge));
            }
        }

        let mut recorded = 0;
        for (source, emission, edge) in found {
            match self.entities.query_one_mut::<&mut SoundSource>(source) {
                Ok(state) if state.emission() == emission => {
                    if state.add_edge(edge) {
                        recorded += 1;
                    }
                }
                Ok(_) => trace!(source = ?source, emission, "Edge from an outdated emission ignored"),
                Err(_) => trace!(source = ?source, "Edge for a removed source dropped"),
            }
        }
        recorded
    }

    fn remove_dead_particles(&mut self) {
        let dead: Vec<Entity> = self
            .entities
            .query::<&SoundParticle>()
            .iter()
            .filter(|(_, particle)| particle.is_dead())
            .map(|(entity, _)| entity)
            .collect();

        for entity in dead {
            let _ = self.entities.despawn(entity);
        }
    }

    fn dispatch(&mut self, event: TimerEvent, sink: &mut dyn AudioSink, report: &mut TickReport) {
        match event {
            TimerEvent::PreparationComplete { source } => {
                let Some(clip) = self
                    .source_mut(source)
                    .and_then(|state| state.take_pending_clip())
                else {
                    trace!(source = ?source, "Preparation finished with nothing to play");
                    return;
                };

                if let Err(err) = self.play_with_edges(source, clip) {
                    warn!(source = ?source, error = %err, "Failed to schedule prepared sound");
                    report.failures.push(err);
                }
            }
            TimerEvent::Playback(playback) => {
                if !self.entities.contains(playback.owner) {
                    trace!(owner = ?playback.owner, "Dropping playback of a removed source");
                    report.playbacks_dropped += 1;
                    return;
                }

                match sink.play(&playback.clip, playback.volume_adjustment, playback.pan) {
                    Ok(()) => report.playbacks_fired += 1,
                    Err(err) => {
                        warn!(clip = %playback.clip, error = %err, "Audio sink failed");
                        report.failures.push(err);
                    }
                }
            }
        }
    }
}
