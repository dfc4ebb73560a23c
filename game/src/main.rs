//! Windowed demo: the sound source follows the mouse, a click plays it

use earshot_engine::prelude::*;
use earshot_game::sinks::LoggingSink;
use earshot_game::{Demo, DEMO_CLIP};
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use winit::{
    event::{ElementState, Event, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowAttributes,
};

/// How often the event loop wakes up to run ticks
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> Result<(), Box<dyn Error>> {
    earshot_engine::init_logging();
    info!("Starting earshot demo");

    let Demo { mut world, source } = Demo::from_args(std::env::args().skip(1))?;
    let mut sink = audio_sink();
    let mut clock = TickAccumulator::new(world.config().ticks_per_second);

    let event_loop = EventLoop::builder().build()?;
    let window_attributes = WindowAttributes::default()
        .with_title("Earshot")
        .with_inner_size(winit::dpi::LogicalSize::new(640.0, 480.0));

    #[allow(deprecated)] // Using create_window on EventLoop for simplicity
    let window = event_loop.create_window(window_attributes)?;

    let mut last_time = Instant::now();

    #[allow(deprecated)] // Using the simpler closure-based API for now
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                info!("Window close requested");
                elwt.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = position.to_logical::<f64>(window.scale_factor());
                if let Some(state) = world.source_mut(source) {
                    state.set_position(DVec2::new(position.x, position.y));
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let Err(err) = world.play_sound(source, SoundClip::from(DEMO_CLIP)) {
                    warn!(error = %err, "Could not play sound");
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            let ticks = clock.accumulate((now - last_time).as_secs_f64());
            last_time = now;

            for _ in 0..ticks {
                let report = world.advance(1.0, sink.as_mut());
                if report.playbacks_fired > 0 || !report.failures.is_empty() {
                    info!(
                        tick = report.tick,
                        fired = report.playbacks_fired,
                        failures = report.failures.len(),
                        "Played sounds"
                    );
                }
            }

            elwt.set_control_flow(ControlFlow::WaitUntil(now + FRAME_INTERVAL));
        }
        _ => {}
    })?;

    Ok(())
}

#[cfg(feature = "audio")]
fn audio_sink() -> Box<dyn AudioSink> {
    match earshot_game::sinks::RodioSink::new("game/assets/sounds") {
        Ok(sink) => Box::new(sink),
        Err(err) => {
            warn!(error = %err, "Falling back to logging sink");
            Box::new(LoggingSink::new())
        }
    }
}

#[cfg(not(feature = "audio"))]
fn audio_sink() -> Box<dyn AudioSink> {
    Box::new(LoggingSink::new())
}
