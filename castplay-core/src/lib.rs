//! Episode queue player core
//!
//! - [`queue::PlayerQueue`]: the queue store (episodes, current index,
//!   playing/loop/shuffle flags) and its transition rules
//! - [`surface::PlaybackSurface`]: keeps a [`device::PlaybackDevice`] in step
//!   with the queue and turns device events into queue mutations
//! - [`engine::PlayerEngine`]: the event loop thread that owns both and talks
//!   to the UI over channels

pub mod commands;
pub mod device;
pub mod engine;
pub mod episode;
pub mod error;
pub mod queue;
pub mod surface;

pub use commands::{ PlayerCommand, PlayerResponse, QueueCommand, SeekInput };
pub use engine::{ EngineConfig, Player, PlayerEngine, PlayerEngineHandle };
pub use episode::Episode;
pub use error::{ DeviceError, QueueError };
pub use queue::{ PlayerQueue, QueueSnapshot };
