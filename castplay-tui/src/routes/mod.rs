pub mod log;
pub mod player;
pub mod queue;
