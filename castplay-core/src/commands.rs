use crate::{ episode::Episode, queue::QueueSnapshot };

/// Mutations accepted by the queue store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCommand {
    /// Replace the queue with one episode and start it
    Play(Episode),
    /// Replace the queue with a list and start at `start`
    PlayList { episodes: Vec<Episode>, start: usize },
    /// Flip between playing and paused
    TogglePlay,
    /// Force the playing flag
    SetPlaying(bool),
    /// Flip the loop flag
    ToggleLoop,
    /// Flip the shuffle flag
    ToggleShuffle,
    /// Skip to next episode
    Next,
    /// Skip to previous episode
    Previous,
    /// Empty the queue
    Clear,
}

/// Seek input coming from the progress control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekInput {
    /// Jump to this position in whole seconds
    Position(u32),
    /// A dragged range; ignored
    Range(u32, u32),
}

/// Commands sent from the UI to the player engine
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    /// Mutate the queue
    Queue(QueueCommand),
    /// Move the playback position of the current episode
    Seek(SeekInput),
    /// Shutdown the player engine
    Quit,
}

impl From<QueueCommand> for PlayerCommand {
    fn from(command: QueueCommand) -> Self {
        PlayerCommand::Queue(command)
    }
}

/// Responses sent from the player engine to the UI
#[derive(Debug, Clone)]
pub enum PlayerResponse {
    /// Queue contents or flags changed
    QueueChanged(QueueSnapshot),
    /// Displayed progress of the current episode, in whole seconds
    Progress { elapsed: u32, duration: u32 },
    /// An error occurred
    Error(String),
    /// Engine is shutting down
    Shutdown,
}
