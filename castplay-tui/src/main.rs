use std::time::Duration;
use std::{io, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use crossbeam_channel::Sender;
use ratatui::{
    backend::CrosstermBackend,
    crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
};

use castplay_core::{
    EngineConfig, Episode, PlayerCommand, PlayerEngine, PlayerEngineHandle, PlayerResponse,
    QueueCommand, QueueSnapshot,
    device::{DeviceEvent, PlaybackDevice, RodioDevice, SimulatedDevice},
};

mod router;
mod routes;
mod state;
mod ui;

use router::{Router, Tab};
use state::AppState;

/// Listen to a queue of audio episodes
#[derive(Parser, Debug)]
#[command(name = "castplay", version, about)]
struct Args {
    /// Episode files to queue, in playback order
    files: Vec<PathBuf>,

    /// Play without the terminal UI and exit when the queue ends
    #[arg(long)]
    headless: bool,

    /// Use a simulated device instead of the audio output
    #[arg(long)]
    simulate: bool,

    /// Start with shuffle on
    #[arg(long)]
    shuffle: bool,

    /// Start with loop on
    #[arg(long = "loop")]
    looping: bool,

    /// Index of the first episode to play
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Device polling interval in milliseconds
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.headless {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        // Initialize tui_logger for the Log tab
        tui_logger::init_logger(log::LevelFilter::Debug).context("Failed to init tui_logger")?;
        tui_logger::set_default_level(log::LevelFilter::Debug);
    }

    log::info!("Starting castplay");

    let episodes = load_episodes(&args.files);
    if !episodes.is_empty() {
        anyhow::ensure!(
            args.start < episodes.len(),
            "--start {} is out of range for {} episodes",
            args.start,
            episodes.len()
        );
    }

    let config = EngineConfig {
        tick: Duration::from_millis(args.tick_ms.max(1)),
        looping: args.looping,
        shuffling: args.shuffle,
        seed: None,
    };
    let simulate = args.simulate;
    let (engine, handle) = PlayerEngine::new(config, move |events| make_device(simulate, events));

    // Spawn player engine on dedicated thread
    let engine_thread = engine.spawn()?;

    if !episodes.is_empty() {
        log::info!("Queueing {} episodes from the command line", episodes.len());
        handle.cmd_tx.send(
            QueueCommand::PlayList { episodes: episodes.clone(), start: args.start }.into()
        )?;
    }

    let result = if args.headless {
        run_headless(&handle, !episodes.is_empty())
    } else {
        run_tui(&handle, episodes)
    };

    // Ensure clean shutdown
    let _ = handle.cmd_tx.send(PlayerCommand::Quit);
    let engine_result = engine_thread
        .join()
        .map_err(|_| anyhow::anyhow!("Player engine thread panicked"))?;

    result.and(engine_result)
}

fn make_device(simulate: bool, events: Sender<DeviceEvent>) -> anyhow::Result<Box<dyn PlaybackDevice>> {
    if simulate {
        log::info!("Using the simulated playback device");
        Ok(Box::new(SimulatedDevice::new(events)))
    } else {
        Ok(Box::new(RodioDevice::try_new_default(events)?))
    }
}

/// Read every file into an episode, skipping the ones that cannot be opened
fn load_episodes(files: &[PathBuf]) -> Vec<Episode> {
    files
        .iter()
        .filter_map(|path| match Episode::from_path(path) {
            Ok(episode) => Some(episode),
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

/// Follow the engine without a UI until the queue runs out
fn run_headless(handle: &PlayerEngineHandle, has_episodes: bool) -> anyhow::Result<()> {
    anyhow::ensure!(has_episodes, "No playable episodes given");

    let mut last: Option<QueueSnapshot> = None;
    let mut last_elapsed = None;
    loop {
        let response = handle
            .resp_rx
            .recv()
            .context("Player engine stopped unexpectedly")?;

        match response {
            PlayerResponse::QueueChanged(snapshot) => {
                if let Some(episode) = snapshot.current() {
                    log::debug!(
                        "Queue at {}/{} ({})",
                        snapshot.current_index + 1,
                        snapshot.items.len(),
                        episode.title
                    );
                } else if last.is_some() {
                    log::info!("Queue finished");
                    return Ok(());
                }
                if snapshot.current().is_some() {
                    last = Some(snapshot);
                }
            }
            PlayerResponse::Progress { elapsed, duration } => {
                if last_elapsed != Some(elapsed) {
                    log::trace!("{} / {}", AppState::format_time(elapsed), AppState::format_time(duration));
                    last_elapsed = Some(elapsed);
                }
            }
            PlayerResponse::Error(message) => {
                log::error!("{}", message);
                let Some(snapshot) = &last else {
                    anyhow::bail!("Could not start playback: {}", message);
                };
                for command in skip_failed(snapshot) {
                    handle.cmd_tx.send(command.into())?;
                }
            }
            PlayerResponse::Shutdown => return Ok(()),
        }
    }
}

/// Commands that move past an episode the device could not play
fn skip_failed(snapshot: &QueueSnapshot) -> Vec<QueueCommand> {
    if snapshot.is_playing {
        Vec::new()
    } else if snapshot.has_next {
        vec![QueueCommand::Next, QueueCommand::SetPlaying(true)]
    } else {
        vec![QueueCommand::Clear]
    }
}

fn run_tui(handle: &PlayerEngineHandle, library: Vec<Episode>) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut state = AppState::new(library);
    let mut router = Router::new(Tab::Player.route());

    let result = event_loop(&mut terminal, &mut state, &mut router, handle);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut ratatui::Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    router: &mut Router,
    handle: &PlayerEngineHandle,
) -> anyhow::Result<()> {
    loop {
        // Handle player engine responses
        while let Ok(response) = handle.resp_rx.try_recv() {
            state.handle_response(response);
        }

        // Draw UI
        terminal.draw(|f| ui::draw(f, state, router))?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let should_quit = handle_global_keys(key.code, state, handle, router)?;
                    if should_quit {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Handle global keys and delegate route-specific input to router
fn handle_global_keys(
    key: KeyCode,
    state: &mut AppState,
    handle: &PlayerEngineHandle,
    router: &mut Router,
) -> anyhow::Result<bool> {
    // Global keys that work regardless of route
    let command = match key {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Tab => {
            router.cycle();
            return Ok(false);
        }
        KeyCode::Char(' ') if state.can_toggle_play() => Some(QueueCommand::TogglePlay),
        KeyCode::Char('n') if state.can_play_next() => Some(QueueCommand::Next),
        KeyCode::Char('p') if state.can_play_previous() => Some(QueueCommand::Previous),
        KeyCode::Char('s') if state.can_shuffle() => Some(QueueCommand::ToggleShuffle),
        KeyCode::Char('l') if state.can_loop() => Some(QueueCommand::ToggleLoop),
        KeyCode::Char('c') => Some(QueueCommand::Clear),
        KeyCode::Char(' ' | 'n' | 'p' | 's' | 'l') => None,
        _ => {
            // Delegate to the current route's input handler
            let action = router.current_mut().handle_input(key, state, handle)?;
            return Ok(router.execute_action(action));
        }
    };

    if let Some(command) = command {
        handle.cmd_tx.send(command.into())?;
    }
    Ok(false)
}
