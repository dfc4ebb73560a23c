//! Demo harness for the earshot sound engine

pub mod sinks;

#[cfg(feature = "audio")]
pub mod panning;

use earshot_engine::prelude::*;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

/// Clip played when the demo source is triggered
pub const DEMO_CLIP: &str = "bird";

/// A world built from the demo's command line
pub struct Demo {
    pub world: SoundWorld,
    pub source: Entity,
}

impl Demo {
    /// Build the demo world.
    ///
    /// Arguments: `[scene.json] [config.json]`. Without a scene file the
    /// built-in head and source are used.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self, Box<dyn Error>> {
        let scene_path = args.next().map(PathBuf::from);
        let config_path = args.next().map(PathBuf::from);

        let config = match &config_path {
            Some(path) => AcousticConfig::from_json_file(path)?,
            None => AcousticConfig::default(),
        };
        let layout = match &scene_path {
            Some(path) => SceneLayout::load_from_file(path)?,
            None => SceneLayout::demo(&config),
        };

        let mut world = SoundWorld::new(config)?;
        let (ears, sources) = world.load_scene(&layout)?;
        let source = *sources
            .first()
            .ok_or("the scene needs at least one sound source")?;

        info!(ears = ears.len(), sources = sources.len(), "Demo scene ready");
        Ok(Self { world, source })
    }
}
