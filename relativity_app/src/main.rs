//! Scripted relativity viewer session
//!
//! Loads the configuration (first argument, TOML or RON; defaults when
//! absent), then drives the engine through a fixed input script against the
//! headless backend: unpause, walk forward, flip the debug toggles, take a
//! screenshot and quit.

mod headless;

use std::path::Path;

use relativity_engine::config::{ApplicationConfig, Config};
use relativity_engine::foundation::logging;
use relativity_engine::input::{InputEvent, KeyCode};
use relativity_engine::{Engine, EngineError};

use headless::HeadlessBackend;

const FRAME_TIME: f32 = 1.0 / 60.0;
const SCRIPT_FRAMES: u32 = 240;

/// Input events for frame `index` of the scripted session
fn scripted_events(index: u32) -> Vec<InputEvent> {
    match index {
        0 => vec![InputEvent::KeyPressed(KeyCode::Space), InputEvent::CursorMoved { x: 800.0, y: 450.0 }],
        1 => vec![InputEvent::KeyPressed(KeyCode::W)],
        60 => vec![InputEvent::KeyReleased(KeyCode::W), InputEvent::CursorMoved { x: 860.0, y: 450.0 }],
        90 => vec![InputEvent::KeyPressed(KeyCode::Num3)],
        91 => vec![InputEvent::KeyReleased(KeyCode::Num3)],
        120 => vec![InputEvent::KeyPressed(KeyCode::Num3)],
        121 => vec![InputEvent::KeyReleased(KeyCode::Num3), InputEvent::KeyPressed(KeyCode::Num4)],
        150 => vec![InputEvent::KeyReleased(KeyCode::Num4), InputEvent::Scrolled(10.0)],
        180 => vec![InputEvent::KeyPressed(KeyCode::Equal)],
        200 => vec![InputEvent::KeyReleased(KeyCode::Equal)],
        238 => vec![InputEvent::KeyPressed(KeyCode::Enter)],
        239 => vec![InputEvent::KeyReleased(KeyCode::Enter), InputEvent::KeyPressed(KeyCode::Escape)],
        _ => Vec::new(),
    }
}

fn load_config() -> Result<ApplicationConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(ApplicationConfig::load_from_file(Path::new(&path))?),
        None => Ok(ApplicationConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_level(&config.engine.log_level);

    match &config.scenario_path {
        Some(path) => log::info!("Starting relativity viewer session (scene file {path})"),
        None => log::info!("Starting relativity viewer session (scenario '{}')", config.scenario),
    }

    let mut backend = HeadlessBackend::new();
    let mut engine = Engine::new(&config, &mut backend)?;

    for index in 0..SCRIPT_FRAMES {
        let outcome = match engine.frame(FRAME_TIME, &scripted_events(index), &mut backend) {
            Ok(outcome) => outcome,
            Err(EngineError::Capture(e)) => {
                log::error!("Screenshot failed: {e}");
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(fps) = outcome.fps {
            log::debug!("t={:.3} fps={fps} objects={}", outcome.time, outcome.objects);
        }
        if let Some(path) = &outcome.screenshot {
            log::info!("Screenshot written to {}", path.display());
        }
        if outcome.quit_requested {
            log::info!("Quit requested at t={:.3}", outcome.time);
            break;
        }
    }

    log::info!(
        "Session finished after {} frames, observer at {:?}",
        backend.frames(),
        engine.pose().position()
    );
    Ok(())
}
