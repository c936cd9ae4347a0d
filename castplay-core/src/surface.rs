//! Playback surface: keeps the device in step with the queue
//!
//! Two one-way paths meet here. Queue state flows to the device through
//! [`PlaybackSurface::reconcile`], which only issues a device command when the
//! queue differs from what was last pushed. Device events flow back through
//! [`PlaybackSurface::handle_event`] as queue mutations; whatever the device
//! reported is recorded as already applied, so the next reconcile pass never
//! echoes it back as a command.

use crossbeam_channel::Receiver;

use crate::{
    commands::SeekInput,
    device::{ DeviceEvent, PlaybackDevice },
    error::DeviceError,
    queue::PlayerQueue,
};

/// Last queue state pushed to the device
#[derive(Debug, Clone, Copy, Default)]
struct Applied {
    selection: Option<u64>,
    playing: bool,
    looping: Option<bool>,
}

pub struct PlaybackSurface {
    events: Receiver<DeviceEvent>,
    applied: Applied,
    /// Displayed position of the current episode in whole seconds
    progress: u32,
    /// Set once the current source reported its metadata
    tracking_progress: bool,
    /// Device failures not yet reported to the UI
    errors: Vec<DeviceError>,
}

impl PlaybackSurface {
    pub fn new(events: Receiver<DeviceEvent>) -> Self {
        Self {
            events,
            applied: Applied::default(),
            progress: 0,
            tracking_progress: false,
            errors: Vec::new(),
        }
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    /// Device failures since the last call
    pub fn take_errors(&mut self) -> Vec<DeviceError> {
        std::mem::take(&mut self.errors)
    }

    /// Push queue changes to the device.
    pub fn reconcile<D: PlaybackDevice + ?Sized>(&mut self, queue: &mut PlayerQueue, device: &mut D) {
        if self.applied.looping != Some(queue.is_looping()) {
            device.set_looping(queue.is_looping());
            self.applied.looping = Some(queue.is_looping());
        }

        if self.applied.selection != Some(queue.selection()) {
            self.applied.selection = Some(queue.selection());
            self.progress = 0;
            self.tracking_progress = false;

            match queue.current() {
                Some(episode) => {
                    log::info!("Now playing: {}", episode);
                    if let Err(e) = device.load(episode) {
                        log::warn!("Failed to load {}: {}", episode.url, e);
                        queue.set_playing_state(false);
                        self.applied.playing = false;
                        self.errors.push(e);
                        return;
                    }
                }
                None => {
                    device.unload();
                    self.applied.playing = false;
                    return;
                }
            }

            // a fresh source autoplays when the queue says so
            self.apply_playing(queue, device);
            return;
        }

        if self.applied.playing != queue.is_playing() {
            self.apply_playing(queue, device);
        }
    }

    fn apply_playing<D: PlaybackDevice + ?Sized>(&mut self, queue: &mut PlayerQueue, device: &mut D) {
        if queue.is_playing() {
            if let Err(e) = device.play() {
                log::warn!("Playback failed to start: {}", e);
                queue.set_playing_state(false);
                self.errors.push(e);
            }
        } else {
            device.pause();
        }
        self.applied.playing = queue.is_playing();
    }

    /// Translate one device event into queue mutations
    pub fn handle_event<D: PlaybackDevice + ?Sized>(
        &mut self,
        event: DeviceEvent,
        queue: &mut PlayerQueue,
        device: &mut D,
    ) {
        log::trace!("device event: {}", event);
        match event {
            DeviceEvent::Ended => {
                if queue.has_next() {
                    queue.play_next();
                } else {
                    log::info!("Reached the end of the queue");
                    queue.clear_player_state();
                }
            }
            DeviceEvent::TimeUpdate { position } => {
                if self.tracking_progress {
                    self.progress = position.max(0.0).floor() as u32;
                }
            }
            DeviceEvent::LoadedMetadata { duration } => {
                log::debug!("Source ready, duration {:?}", duration);
                if let Err(e) = device.set_current_time(0.0) {
                    log::debug!("Could not rewind new source: {}", e);
                }
                self.progress = 0;
                self.tracking_progress = true;
            }
            DeviceEvent::Play => {
                queue.set_playing_state(true);
                self.applied.playing = queue.is_playing();
            }
            DeviceEvent::Pause => {
                queue.set_playing_state(false);
                self.applied.playing = false;
            }
        }
    }

    /// Handle every device event received so far, returns how many there were
    pub fn drain_events<D: PlaybackDevice + ?Sized>(
        &mut self,
        queue: &mut PlayerQueue,
        device: &mut D,
    ) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event, queue, device);
            handled += 1;
        }
        handled
    }

    /// Move the device to a user-chosen position. Dragged ranges are ignored.
    pub fn seek<D: PlaybackDevice + ?Sized>(
        &mut self,
        input: SeekInput,
        device: &mut D,
    ) -> Result<(), DeviceError> {
        match input {
            SeekInput::Position(seconds) => {
                device.set_current_time(seconds as f64)?;
                self.progress = seconds;
                Ok(())
            }
            SeekInput::Range(start, end) => {
                log::debug!("Ignoring seek range {}..{}", start, end);
                Ok(())
            }
        }
    }
}
