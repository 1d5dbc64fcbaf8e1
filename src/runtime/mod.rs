use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::execute;
use crossterm::cursor::Show;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use crate::audio::RodioBackend;
use crate::controller::{ControllerParts, PlaybackController};

mod event_loop;
mod logging;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    logging::configure_logging(&settings);

    let catalog = env::args().nth(1).map(PathBuf::from);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("legato-worker")
        .build()?;

    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let backend = RodioBackend::new(&settings.audio, runtime.handle().clone(), http.clone())?;
    let resolver = Arc::new(startup::build_resolver(&settings, http));

    let (mut controller, events) = PlaybackController::new(ControllerParts {
        resolver,
        backend: Box::new(backend),
        session: startup::session_store(&settings),
        settings: settings.playback.clone(),
        runtime: runtime.handle().clone(),
    });

    startup::prepare(&mut controller, catalog.as_deref());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();

    let run_result = runtime.block_on(event_loop::run(&mut controller, events, &settings));

    disable_raw_mode()?;
    execute!(stdout, Show)?;
    writeln!(stdout)?;

    tracing::info!("shutting down");
    drop(controller);
    run_result
}
