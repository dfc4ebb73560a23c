//! Walks the demo source around the head without opening a window

use earshot_engine::prelude::*;
use earshot_game::sinks::LoggingSink;
use earshot_game::{Demo, DEMO_CLIP};
use std::error::Error;
use tracing::info;

/// Ticks to simulate at each stop, enough for preparation and every echo
const TICKS_PER_STOP: u32 = 200;

fn main() -> Result<(), Box<dyn Error>> {
    earshot_engine::init_logging();

    let Demo { mut world, source } = Demo::from_args(std::env::args().skip(1))?;
    let mut sink = LoggingSink::new();

    let center = DVec2::new(320.0, 240.0);
    let radius = world.config().meters_to_pixels(2.0);

    for step in 0..8 {
        let angle = f64::from(step) * 45.0;
        let position = center + direction_vector(angle) * radius;
        if let Some(state) = world.source_mut(source) {
            state.set_position(position);
        }

        world.play_sound(source, SoundClip::from(DEMO_CLIP))?;
        let mut fired = 0;
        for _ in 0..TICKS_PER_STOP {
            fired += world.advance(1.0, &mut sink).playbacks_fired;
        }

        let edges = world.edges(source);
        let left = edges.iter().filter(|edge| edge.target().side == Side::Left).count();
        info!(
            angle,
            ?position,
            edges = edges.len(),
            left,
            right = edges.len() - left,
            fired,
            "Finished stop"
        );
    }

    info!(played = sink.played(), "Headless demo finished");
    Ok(())
}
