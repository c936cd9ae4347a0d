use std::time::Duration;

use crossbeam_channel::Sender;

use super::{ DeviceEvent, PlaybackDevice };
use crate::{ episode::Episode, error::DeviceError };

/// Clock-driven device that "plays" an episode for its declared duration.
///
/// Nothing is decoded: `poll` just moves the position forward while playing.
/// Used for headless runs without an audio output and in tests.
pub struct SimulatedDevice {
    events: Sender<DeviceEvent>,
    /// Duration of the loaded source in seconds
    source: Option<f64>,
    position: f64,
    paused: bool,
    looping: bool,
    block_playback: bool,
}

impl SimulatedDevice {
    pub fn new(events: Sender<DeviceEvent>) -> Self {
        Self {
            events,
            source: None,
            position: 0.0,
            paused: true,
            looping: false,
            block_playback: false,
        }
    }

    /// Make every following `play` fail, like an output refusing to start
    pub fn set_block_playback(&mut self, block: bool) {
        self.block_playback = block;
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    fn emit(&self, event: DeviceEvent) {
        if self.events.send(event).is_err() {
            log::debug!("Device event {} dropped, no listener", event);
        }
    }
}

impl PlaybackDevice for SimulatedDevice {
    fn load(&mut self, episode: &Episode) -> Result<(), DeviceError> {
        if episode.url.is_empty() {
            return Err(DeviceError::SourceNotFound(episode.title.clone()));
        }
        let duration = episode.duration as f64;
        self.source = Some(duration);
        self.position = 0.0;
        self.paused = true;
        self.emit(DeviceEvent::LoadedMetadata { duration: Some(duration) });
        Ok(())
    }

    fn unload(&mut self) {
        self.source = None;
        self.position = 0.0;
        self.paused = true;
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        if self.source.is_none() {
            return Err(DeviceError::NoSource);
        }
        if self.block_playback {
            return Err(DeviceError::PlaybackBlocked("output refused to start".to_string()));
        }
        if self.paused {
            self.paused = false;
            self.emit(DeviceEvent::Play);
        }
        Ok(())
    }

    fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.emit(DeviceEvent::Pause);
        }
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) -> Result<(), DeviceError> {
        let duration = self.source.ok_or(DeviceError::NoSource)?;
        self.position = seconds.clamp(0.0, duration);
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn poll(&mut self, elapsed: Duration) {
        let Some(duration) = self.source else {
            return;
        };
        if self.paused {
            return;
        }

        self.position += elapsed.as_secs_f64();
        if self.position < duration {
            self.emit(DeviceEvent::TimeUpdate { position: self.position });
            return;
        }

        if self.looping {
            self.position = if duration > 0.0 { self.position % duration } else { 0.0 };
            self.emit(DeviceEvent::TimeUpdate { position: self.position });
        } else {
            self.position = duration;
            self.paused = true;
            self.emit(DeviceEvent::TimeUpdate { position: self.position });
            self.emit(DeviceEvent::Ended);
        }
    }
}
