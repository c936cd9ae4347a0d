use castplay_core::{Episode, PlayerResponse, QueueSnapshot};
use ratatui::widgets::ListState;

/// Application state for the TUI
///
/// Everything here is a copy of what the engine published; the engine owns
/// the real queue.
pub struct AppState {
    // ==============================
    // Queue State
    // ==============================
    pub queue: QueueSnapshot,
    pub queue_state: ListState,
    /// Episodes given on the command line, offered on the Queue tab
    pub library: Vec<Episode>,

    // ==============================
    // Progress State
    // ==============================
    /// Displayed position in whole seconds
    pub elapsed: u32,
    /// Length of the current episode in whole seconds
    pub duration: u32,

    /// Status message to display
    pub status_message: String,
    /// Error message if any
    pub error_message: Option<String>,
}

impl AppState {
    pub fn new(library: Vec<Episode>) -> Self {
        let mut queue_state = ListState::default();
        if !library.is_empty() {
            queue_state.select(Some(0));
        }

        Self {
            queue: QueueSnapshot::default(),
            queue_state,
            library,
            elapsed: 0,
            duration: 0,
            status_message: "Select an episode to listen to".to_string(),
            error_message: None,
        }
    }

    /// Handle response from the player engine
    pub fn handle_response(&mut self, response: PlayerResponse) {
        match response {
            PlayerResponse::QueueChanged(snapshot) => {
                self.error_message = None;
                self.status_message = match snapshot.current() {
                    Some(episode) if snapshot.is_playing => format!(
                        "Playing {}/{}: {}",
                        snapshot.current_index + 1,
                        snapshot.items.len(),
                        episode.title
                    ),
                    Some(episode) => format!("Paused: {}", episode.title),
                    None => "Select an episode to listen to".to_string(),
                };
                self.queue = snapshot;
            }
            PlayerResponse::Progress { elapsed, duration } => {
                self.elapsed = elapsed;
                self.duration = duration;
            }
            PlayerResponse::Error(msg) => {
                self.status_message = format!("Error: {}", msg);
                self.error_message = Some(msg);
            }
            PlayerResponse::Shutdown => {
                self.status_message = "Engine shutdown".to_string();
            }
        }
    }

    pub fn current(&self) -> Option<&Episode> {
        self.queue.current()
    }

    /// Get the progress ratio (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.duration > 0 {
            (self.elapsed as f64 / self.duration as f64).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Format time as MM:SS, or HH:MM:SS past the hour
    pub fn format_time(seconds: u32) -> String {
        let hours = seconds / 3600;
        let mins = (seconds % 3600) / 60;
        let secs = seconds % 60;
        if hours > 0 {
            format!("{:02}:{:02}:{:02}", hours, mins, secs)
        } else {
            format!("{:02}:{:02}", mins, secs)
        }
    }

    // ==============================================
    // Control availability
    // ==============================================

    pub fn can_toggle_play(&self) -> bool {
        self.current().is_some()
    }

    /// Shuffling a single episode changes nothing
    pub fn can_shuffle(&self) -> bool {
        self.current().is_some() && self.queue.items.len() > 1
    }

    pub fn can_loop(&self) -> bool {
        self.current().is_some()
    }

    pub fn can_play_next(&self) -> bool {
        self.current().is_some() && self.queue.has_next
    }

    pub fn can_play_previous(&self) -> bool {
        self.current().is_some() && self.queue.has_previous
    }

    pub fn can_seek(&self) -> bool {
        self.current().is_some()
    }

    /// Seek target `delta` seconds away from the displayed position.
    /// Only bounded above when the episode length is known.
    pub fn seek_target(&self, delta: i64) -> u32 {
        let target = (self.elapsed as i64 + delta).max(0);
        if self.duration > 0 {
            target.min(self.duration as i64) as u32
        } else {
            target.min(u32::MAX as i64) as u32
        }
    }

    // ==============================================
    // Queue Navigation Methods
    // ==============================================

    pub fn library_next(&mut self) {
        if self.library.is_empty() {
            return;
        }
        let i = match self.queue_state.selected() {
            Some(i) if i + 1 < self.library.len() => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.queue_state.select(Some(i));
    }

    pub fn library_prev(&mut self) {
        if self.library.is_empty() {
            return;
        }
        let i = match self.queue_state.selected() {
            Some(0) | None => self.library.len() - 1,
            Some(i) => i - 1,
        };
        self.queue_state.select(Some(i));
    }

    /// Get currently selected library index
    pub fn library_selected(&self) -> Option<usize> {
        self.queue_state.selected().filter(|&i| i < self.library.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Vec<Episode> {
        (0..3)
            .map(|i| Episode::new(format!("Episode {i}"), "Host", "", 90, format!("ep{i}.mp3")))
            .collect()
    }

    fn snapshot(items: Vec<Episode>, current_index: usize) -> QueueSnapshot {
        let len = items.len();
        QueueSnapshot {
            items,
            current_index,
            is_playing: true,
            is_looping: false,
            is_shuffling: false,
            has_next: current_index + 1 < len,
            has_previous: current_index > 0,
        }
    }

    #[test]
    fn format_time_pads_minutes_and_hours() {
        assert_eq!(AppState::format_time(0), "00:00");
        assert_eq!(AppState::format_time(754), "12:34");
        assert_eq!(AppState::format_time(3725), "01:02:05");
    }

    #[test]
    fn controls_are_disabled_without_an_episode() {
        let state = AppState::new(library());
        assert!(!state.can_toggle_play());
        assert!(!state.can_shuffle());
        assert!(!state.can_loop());
        assert!(!state.can_play_next());
        assert!(!state.can_play_previous());
    }

    #[test]
    fn shuffle_needs_more_than_one_episode() {
        let mut state = AppState::new(library());
        state.handle_response(PlayerResponse::QueueChanged(snapshot(library()[..1].to_vec(), 0)));
        assert!(state.can_toggle_play());
        assert!(!state.can_shuffle());

        state.handle_response(PlayerResponse::QueueChanged(snapshot(library(), 1)));
        assert!(state.can_shuffle());
        assert!(state.can_play_next());
        assert!(state.can_play_previous());
        assert_eq!(state.status_message, "Playing 2/3: Episode 1");
    }

    #[test]
    fn seek_target_stays_within_episode() {
        let mut state = AppState::new(library());
        state.handle_response(PlayerResponse::Progress { elapsed: 3, duration: 90 });
        assert_eq!(state.seek_target(-5), 0);
        assert_eq!(state.seek_target(5), 8);
        state.handle_response(PlayerResponse::Progress { elapsed: 88, duration: 90 });
        assert_eq!(state.seek_target(5), 90);
        assert!((state.progress() - 88.0 / 90.0).abs() < 1e-9);
    }

    #[test]
    fn seek_target_is_unbounded_when_length_is_unknown() {
        let mut state = AppState::new(library());
        state.handle_response(PlayerResponse::Progress { elapsed: 12, duration: 0 });
        assert_eq!(state.seek_target(5), 17);
        assert_eq!(state.seek_target(-20), 0);
    }

    #[test]
    fn library_selection_wraps() {
        let mut state = AppState::new(library());
        state.library_prev();
        assert_eq!(state.library_selected(), Some(2));
        state.library_next();
        assert_eq!(state.library_selected(), Some(0));
    }

    #[test]
    fn errors_are_kept_until_next_queue_change() {
        let mut state = AppState::new(library());
        state.handle_response(PlayerResponse::Error("boom".to_string()));
        assert_eq!(state.error_message.as_deref(), Some("boom"));
        state.handle_response(PlayerResponse::QueueChanged(QueueSnapshot::default()));
        assert!(state.error_message.is_none());
    }
}
