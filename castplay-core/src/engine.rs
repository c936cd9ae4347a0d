use std::{ thread::{ self, JoinHandle }, time::{ Duration, Instant } };

use anyhow::Context;
use crossbeam_channel::{ Receiver, RecvTimeoutError, Sender };

use crate::{
    commands::{ PlayerCommand, PlayerResponse },
    device::{ DeviceEvent, PlaybackDevice, event_channel },
    error::DeviceError,
    queue::{ PlayerQueue, QueueSnapshot },
    surface::PlaybackSurface,
};

/// Upper bound on event/reconcile rounds in one turn of the loop
const MAX_SYNC_PASSES: usize = 8;

/// Engine settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How often the device is polled
    pub tick: Duration,
    /// Initial loop flag
    pub looping: bool,
    /// Initial shuffle flag
    pub shuffling: bool,
    /// Fixed seed for shuffle choices
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            looping: false,
            shuffling: false,
            seed: None,
        }
    }
}

/// Queue, surface and device owned together.
///
/// One `Player` is one event loop's worth of state: the engine thread owns it,
/// tests drive it directly.
pub struct Player<D: PlaybackDevice> {
    queue: PlayerQueue,
    surface: PlaybackSurface,
    device: D,
}

impl<D: PlaybackDevice> Player<D> {
    pub fn new(queue: PlayerQueue, device: D, events: Receiver<DeviceEvent>) -> Self {
        Self {
            queue,
            surface: PlaybackSurface::new(events),
            device,
        }
    }

    pub fn queue(&self) -> &PlayerQueue {
        &self.queue
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn progress(&self) -> u32 {
        self.surface.progress()
    }

    /// Device failures hit while syncing since the last call
    pub fn take_errors(&mut self) -> Vec<DeviceError> {
        self.surface.take_errors()
    }

    /// Apply one UI command. Returns `Ok(false)` when the engine should stop.
    pub fn handle_command(&mut self, command: PlayerCommand) -> anyhow::Result<bool> {
        log::debug!("command: {:?}", command);
        match command {
            PlayerCommand::Queue(command) => {
                self.queue.apply(command)?;
            }
            PlayerCommand::Seek(input) => {
                self.surface.seek(input, &mut self.device)?;
            }
            PlayerCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Push queue state to the device and feed device events back until
    /// neither side has anything left to say.
    pub fn sync(&mut self) {
        for _ in 0..MAX_SYNC_PASSES {
            self.surface.reconcile(&mut self.queue, &mut self.device);
            if self.surface.drain_events(&mut self.queue, &mut self.device) == 0 {
                return;
            }
        }
        log::warn!("Device still reporting events after {} passes", MAX_SYNC_PASSES);
    }

    /// Let the device advance, then settle
    pub fn tick(&mut self, elapsed: Duration) {
        self.device.poll(elapsed);
        self.sync();
    }

    pub fn shutdown(&mut self) {
        self.device.pause();
        self.device.unload();
    }
}

type DeviceFactory =
    Box<dyn FnOnce(Sender<DeviceEvent>) -> anyhow::Result<Box<dyn PlaybackDevice>> + Send>;

/// Handle the UI keeps to talk to a running engine
pub struct PlayerEngineHandle {
    pub cmd_tx: Sender<PlayerCommand>,
    pub resp_rx: Receiver<PlayerResponse>,
}

pub struct PlayerEngine {
    config: EngineConfig,
    cmd_rx: Receiver<PlayerCommand>,
    resp_tx: Sender<PlayerResponse>,
    make_device: DeviceFactory,
}

impl PlayerEngine {
    /// Create an engine and its handle. The device is built on the engine
    /// thread, since audio outputs usually cannot move between threads.
    pub fn new<F>(config: EngineConfig, make_device: F) -> (PlayerEngine, PlayerEngineHandle)
        where F: FnOnce(Sender<DeviceEvent>) -> anyhow::Result<Box<dyn PlaybackDevice>> + Send + 'static
    {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (resp_tx, resp_rx) = crossbeam_channel::unbounded();

        let engine = PlayerEngine {
            config,
            cmd_rx,
            resp_tx,
            make_device: Box::new(make_device),
        };
        (engine, PlayerEngineHandle { cmd_tx, resp_rx })
    }

    /// Run the engine on its own thread
    pub fn spawn(self) -> anyhow::Result<JoinHandle<anyhow::Result<()>>> {
        thread::Builder::new()
            .name("castplay-engine".to_string())
            .spawn(move || {
                let result = self.run();
                if let Err(e) = &result {
                    log::error!("Player engine stopped: {:#}", e);
                }
                result
            })
            .context("Failed to spawn the player engine thread")
    }

    /// Run the event loop on the current thread until `Quit` or until every
    /// handle is dropped.
    pub fn run(self) -> anyhow::Result<()> {
        let PlayerEngine { config, cmd_rx, resp_tx, make_device } = self;

        let (event_tx, event_rx) = event_channel();
        let device = make_device(event_tx).context("Failed to create the playback device")?;

        let mut queue = match config.seed {
            Some(seed) => PlayerQueue::with_seed(seed),
            None => PlayerQueue::new(),
        };
        if config.looping {
            queue.toggle_loop();
        }
        if config.shuffling {
            queue.toggle_shuffle();
        }

        let mut player = Player::new(queue, device, event_rx);
        let mut publisher = Publisher::new(resp_tx);
        publisher.publish(&player);

        log::info!("Player engine started");
        let mut last_tick = Instant::now();

        'event_loop: loop {
            let first = match cmd_rx.recv_timeout(config.tick) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            for command in first.into_iter().chain(cmd_rx.try_iter()) {
                match player.handle_command(command) {
                    Ok(true) => {}
                    Ok(false) => break 'event_loop,
                    Err(e) => {
                        log::warn!("Command failed: {:#}", e);
                        publisher.error(e.to_string());
                    }
                }
            }

            player.sync();
            if last_tick.elapsed() >= config.tick {
                player.tick(last_tick.elapsed());
                last_tick = Instant::now();
            }
            publisher.publish(&player);
            // after the snapshot, so the UI sees the episode that failed
            for e in player.take_errors() {
                publisher.error(e.to_string());
            }
        }

        player.shutdown();
        publisher.shutdown();
        log::info!("Player engine stopped");
        Ok(())
    }
}

/// Sends responses only when something visible changed
struct Publisher {
    resp_tx: Sender<PlayerResponse>,
    last_snapshot: Option<QueueSnapshot>,
    last_progress: Option<(u32, u32)>,
}

impl Publisher {
    fn new(resp_tx: Sender<PlayerResponse>) -> Self {
        Self { resp_tx, last_snapshot: None, last_progress: None }
    }

    fn publish<D: PlaybackDevice>(&mut self, player: &Player<D>) {
        let snapshot = player.queue().snapshot();
        if self.last_snapshot.as_ref() != Some(&snapshot) {
            self.send(PlayerResponse::QueueChanged(snapshot.clone()));
            self.last_snapshot = Some(snapshot);
        }

        let duration = player.queue().current().map(|e| e.duration).unwrap_or(0);
        let progress = (player.progress(), duration);
        if self.last_progress != Some(progress) {
            self.send(PlayerResponse::Progress { elapsed: progress.0, duration: progress.1 });
            self.last_progress = Some(progress);
        }
    }

    fn error(&self, message: String) {
        self.send(PlayerResponse::Error(message));
    }

    fn shutdown(&self) {
        self.send(PlayerResponse::Shutdown);
    }

    fn send(&self, response: PlayerResponse) {
        if self.resp_tx.send(response).is_err() {
            log::debug!("No UI listening for responses");
        }
    }
}
