//! deckscope
//!
//! Starts the deck rig, the import worker, the remote control server
//! and the interface thread, then waits for Ctrl+C or a quit request.
//!
//! Usage: deckscope [-c CONFIG] [-g WxH[+X+Y]] [-p PORT] [-n DECKS] [-l LIBRARY] [-v]

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deckscope::{
    config::{AppConfig, DeckArrangement},
    events::EventQueue,
    import::{ImportWorker, NullDecoder},
    interface::Interface,
    library::{Library, Selector},
    remote::{Namespace, RemoteServer},
    render::{MemoryDisplay, PixelFormat},
    rig::{Rig, SharedRig},
    status::Status,
};

/// Command-line overrides on top of the configuration file
#[derive(Default)]
struct Overrides {
    config: Option<PathBuf>,
    geometry: Option<String>,
    port: Option<String>,
    decks: Option<usize>,
    library: Option<PathBuf>,
    vertical: bool,
}

fn parse_args() -> Result<Overrides> {
    let mut overrides = Overrides::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .with_context(|| format!("{} expects an argument", name))
        };

        match arg.as_str() {
            "-c" => overrides.config = Some(PathBuf::from(value("-c")?)),
            "-g" => overrides.geometry = Some(value("-g")?),
            "-p" => overrides.port = Some(value("-p")?),
            "-n" => {
                let n = value("-n")?;
                overrides.decks = Some(n.parse().with_context(|| format!("Invalid deck count '{}'", n))?);
            }
            "-l" => overrides.library = Some(PathBuf::from(value("-l")?)),
            "-v" => overrides.vertical = true,
            other => bail!("Unknown option '{}'", other),
        }
    }

    Ok(overrides)
}

/// Keep the playheads moving without an audio engine
///
/// Runs on its own thread because it blocks on the rig gate.
fn start_playback(rig: SharedRig, running: Arc<AtomicBool>) -> Result<JoinHandle<()>> {
    let period = Duration::from_millis(10);

    thread::Builder::new()
        .name("playback".to_string())
        .spawn(move || {
            let mut last = Instant::now();
            while running.load(Ordering::Relaxed) {
                thread::sleep(period);
                let now = Instant::now();
                rig.lock().advance(now.duration_since(last).as_secs_f64());
                last = now;
            }
            tracing::debug!("Playback thread finished");
        })
        .context("Failed to spawn playback thread")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting deckscope");

    let overrides = parse_args()?;

    // Load config, then apply the command line
    let mut config = match overrides.config.clone().or_else(AppConfig::default_path) {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };

    if let Some(geometry) = overrides.geometry {
        config.interface.geometry = geometry;
    }
    if let Some(port) = overrides.port {
        config.remote.port = port;
    }
    if let Some(decks) = overrides.decks {
        config.decks = decks;
    }
    if overrides.library.is_some() {
        config.library = overrides.library;
    }
    if overrides.vertical {
        config.interface.arrangement = DeckArrangement::Vertical;
    }

    config.validate()?;
    let geometry = config.geometry()?;

    let library = match &config.library {
        Some(path) => Library::load_json(path)?,
        None => Library::new(),
    };

    let status = Arc::new(Status::new("deckscope"));
    let rig = Rig::new(config.decks)?.into_shared();

    let (mut import_worker, importer) = ImportWorker::start(rig.clone(), status.clone(), NullDecoder)?;
    rig.lock().set_importer(importer);

    let mut remote = if config.remote.enabled {
        let addr = config.remote.socket_addr()?;
        Some(RemoteServer::start(addr, rig.clone(), Namespace::new(config.decks))?)
    } else {
        None
    };

    // Headless display; a windowing front end supplies its own
    let display = MemoryDisplay::new(geometry.width, geometry.height, PixelFormat::BGRX32)?;
    tracing::info!("Display is {}", geometry);

    let queue = Arc::new(EventQueue::new());
    let interface = Interface::new(display, status, Selector::new(library), &config.interface)
        .start(rig.clone(), queue, Duration::from_millis(config.interface.refresh_ms))?;

    let playing = Arc::new(AtomicBool::new(true));
    let playback = start_playback(rig.clone(), playing.clone())?;

    let quit = interface.quit_requested().clone();
    let quit_requested = tokio::task::spawn_blocking(move || quit.recv());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
        _ = quit_requested => tracing::info!("Quit requested"),
    }

    playing.store(false, Ordering::SeqCst);
    if playback.join().is_err() {
        tracing::error!("Playback thread panicked");
    }

    interface.stop()?;
    if let Some(remote) = remote.as_mut() {
        remote.stop();
    }
    import_worker.stop();

    tracing::info!("Shut down cleanly");
    Ok(())
}
