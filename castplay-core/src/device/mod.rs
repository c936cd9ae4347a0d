//! Playback device contract
//!
//! A device is the opaque element that actually renders audio. It exposes
//! play/pause, a readable and writable position, a native loop flag, and
//! reports what happens to it through [`DeviceEvent`]s sent on the channel it
//! was built with.
//!
//! Every device follows the same rules:
//! - `Play` and `Pause` are only emitted on a real transition, so calling
//!   `play` on a playing device (or `pause` on a paused one) does nothing.
//! - Loading a source leaves the device paused without emitting `Pause`, then
//!   emits `LoadedMetadata`.
//! - Reaching the end of a non-looping source pauses the device silently and
//!   emits `Ended`. A looping source wraps to the start instead.

use std::time::Duration;

use crossbeam_channel::{ Receiver, Sender };

use crate::{ episode::Episode, error::DeviceError };

mod rodio_device;
mod simulated;

pub use rodio_device::RodioDevice;
pub use simulated::SimulatedDevice;

/// Notifications emitted by a playback device
#[derive(Debug, Clone, Copy, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DeviceEvent {
    /// The source played to its end
    Ended,
    /// Periodic position report while playing, in seconds
    TimeUpdate { position: f64 },
    /// A new source is ready; duration in seconds when known
    LoadedMetadata { duration: Option<f64> },
    /// Playback started
    Play,
    /// Playback paused
    Pause,
}

/// Create the channel a device reports its events on
pub fn event_channel() -> (Sender<DeviceEvent>, Receiver<DeviceEvent>) {
    crossbeam_channel::unbounded()
}

pub trait PlaybackDevice {
    /// Replace the current source with the episode's media
    fn load(&mut self, episode: &Episode) -> Result<(), DeviceError>;

    /// Drop the current source
    fn unload(&mut self);

    /// Start or resume playback from the current position
    fn play(&mut self) -> Result<(), DeviceError>;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// Current position in seconds
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64) -> Result<(), DeviceError>;

    fn set_looping(&mut self, looping: bool);

    /// Let the device make progress and emit whatever events are due
    fn poll(&mut self, elapsed: Duration);
}

impl<D: PlaybackDevice + ?Sized> PlaybackDevice for Box<D> {
    fn load(&mut self, episode: &Episode) -> Result<(), DeviceError> {
        (**self).load(episode)
    }

    fn unload(&mut self) {
        (**self).unload()
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }

    fn current_time(&self) -> f64 {
        (**self).current_time()
    }

    fn set_current_time(&mut self, seconds: f64) -> Result<(), DeviceError> {
        (**self).set_current_time(seconds)
    }

    fn set_looping(&mut self, looping: bool) {
        (**self).set_looping(looping)
    }

    fn poll(&mut self, elapsed: Duration) {
        (**self).poll(elapsed)
    }
}
