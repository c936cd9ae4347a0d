use rand::{ Rng, SeedableRng, rngs::StdRng };

use crate::{ commands::QueueCommand, episode::Episode, error::QueueError };

/// The playback queue state
///
/// The only legal mutators are the methods below; every field is private so
/// `current_index` can never point outside `items`.
#[derive(Debug, Clone)]
pub struct PlayerQueue {
    items: Vec<Episode>,
    current_index: usize,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,
    /// Bumped every time the current item is (re)selected
    selection: u64,
    rng: StdRng,
}

/// Read-only copy of the queue published to UI consumers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub items: Vec<Episode>,
    pub current_index: usize,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

impl QueueSnapshot {
    /// Get current episode
    pub fn current(&self) -> Option<&Episode> {
        self.items.get(self.current_index)
    }
}

impl Default for PlayerQueue {
    fn default() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl PlayerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue whose shuffle choices are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            items: Vec::new(),
            current_index: 0,
            is_playing: false,
            is_looping: false,
            is_shuffling: false,
            selection: 0,
            rng,
        }
    }

    // ==============================================
    // Accessors
    // ==============================================

    pub fn items(&self) -> &[Episode] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Get current episode
    pub fn current(&self) -> Option<&Episode> {
        self.items.get(self.current_index)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    pub fn selection(&self) -> u64 {
        self.selection
    }

    /// A shuffled queue always has a next episode, chosen at random
    pub fn has_next(&self) -> bool {
        !self.items.is_empty()
            && (self.is_shuffling || self.current_index + 1 < self.items.len())
    }

    pub fn has_previous(&self) -> bool {
        self.current_index > 0
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            items: self.items.clone(),
            current_index: self.current_index,
            is_playing: self.is_playing,
            is_looping: self.is_looping,
            is_shuffling: self.is_shuffling,
            has_next: self.has_next(),
            has_previous: self.has_previous(),
        }
    }

    // ==============================================
    // Mutators
    // ==============================================

    /// Replace the queue with a single episode and start it
    pub fn play(&mut self, episode: Episode) {
        log::debug!("play: {}", episode.title);
        self.items = vec![episode];
        self.current_index = 0;
        self.is_playing = true;
        self.selection += 1;
    }

    /// Replace the queue with `episodes` and start at `start`.
    ///
    /// The queue is left untouched when `start` is not a valid index.
    pub fn play_list(&mut self, episodes: Vec<Episode>, start: usize) -> Result<(), QueueError> {
        if start >= episodes.len() {
            return Err(QueueError::InvalidStartIndex { index: start, len: episodes.len() });
        }
        log::debug!("play_list: {} episodes starting at {}", episodes.len(), start);
        self.items = episodes;
        self.current_index = start;
        self.is_playing = true;
        self.selection += 1;
        Ok(())
    }

    pub fn toggle_play(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.is_playing = !self.is_playing;
    }

    /// Set the playing flag explicitly. Nothing can play on an empty queue.
    pub fn set_playing_state(&mut self, playing: bool) {
        if playing && self.items.is_empty() {
            log::debug!("Ignoring play request on an empty queue");
            return;
        }
        self.is_playing = playing;
    }

    pub fn toggle_loop(&mut self) {
        self.is_looping = !self.is_looping;
    }

    pub fn toggle_shuffle(&mut self) {
        self.is_shuffling = !self.is_shuffling;
    }

    /// Advance to the next episode. Shuffle picks uniformly from the whole
    /// queue and may pick the current episode again.
    pub fn play_next(&mut self) {
        if self.items.is_empty() {
            return;
        }

        if self.is_shuffling {
            self.current_index = self.rng.random_range(0..self.items.len());
        } else if self.has_next() {
            self.current_index += 1;
        } else {
            return;
        }
        self.selection += 1;
        log::debug!("play_next: now at {}", self.current_index);
    }

    /// Step back one episode. Always sequential, shuffle or not.
    pub fn play_previous(&mut self) {
        if self.has_previous() {
            self.current_index -= 1;
            self.selection += 1;
            log::debug!("play_previous: now at {}", self.current_index);
        }
    }

    /// Empty the queue. Loop and shuffle preferences survive.
    pub fn clear_player_state(&mut self) {
        log::debug!("clear_player_state");
        self.items.clear();
        self.current_index = 0;
        self.is_playing = false;
        self.selection += 1;
    }

    /// Apply a command value to the queue
    pub fn apply(&mut self, command: QueueCommand) -> Result<(), QueueError> {
        match command {
            QueueCommand::Play(episode) => self.play(episode),
            QueueCommand::PlayList { episodes, start } => self.play_list(episodes, start)?,
            QueueCommand::TogglePlay => self.toggle_play(),
            QueueCommand::SetPlaying(playing) => self.set_playing_state(playing),
            QueueCommand::ToggleLoop => self.toggle_loop(),
            QueueCommand::ToggleShuffle => self.toggle_shuffle(),
            QueueCommand::Next => self.play_next(),
            QueueCommand::Previous => self.play_previous(),
            QueueCommand::Clear => self.clear_player_state(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episodes(n: usize) -> Vec<Episode> {
        (0..n)
            .map(|i| Episode::new(format!("Episode {i}"), "Host", "", 60, format!("ep{i}.mp3")))
            .collect()
    }

    #[test]
    fn new_queue_is_empty_and_idle() {
        let queue = PlayerQueue::with_seed(1);
        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), 0);
        assert!(!queue.is_playing());
        assert!(!queue.has_next());
        assert!(!queue.has_previous());
        assert!(queue.current().is_none());
    }

    #[test]
    fn play_replaces_queue_with_single_episode() {
        let mut queue = PlayerQueue::with_seed(1);
        queue.play_list(episodes(4), 3).unwrap();
        queue.set_playing_state(false);

        let single = Episode::new("Solo", "Host", "", 30, "solo.mp3");
        queue.play(single.clone());

        assert_eq!(queue.items(), &[single]);
        assert_eq!(queue.current_index(), 0);
        assert!(queue.is_playing());
    }

    #[test]
    fn play_list_rejects_out_of_range_start() {
        let mut queue = PlayerQueue::with_seed(1);
        queue.play_list(episodes(2), 1).unwrap();
        let before = queue.snapshot();

        let err = queue.play_list(episodes(3), 3).unwrap_err();
        assert_eq!(err, QueueError::InvalidStartIndex { index: 3, len: 3 });
        assert_eq!(queue.snapshot(), before);

        let err = queue.play_list(Vec::new(), 0).unwrap_err();
        assert_eq!(err, QueueError::InvalidStartIndex { index: 0, len: 0 });
    }

    #[test]
    fn sequential_next_stops_at_the_end() {
        let mut queue = PlayerQueue::with_seed(1);
        queue.play_list(episodes(3), 0).unwrap();

        queue.play_next();
        assert_eq!(queue.current_index(), 1);
        queue.play_next();
        assert_eq!(queue.current_index(), 2);
        assert!(!queue.has_next());

        let selection = queue.selection();
        queue.play_next();
        assert_eq!(queue.current_index(), 2);
        assert_eq!(queue.selection(), selection);
    }

    #[test]
    fn next_does_not_change_playing_flag() {
        let mut queue = PlayerQueue::with_seed(1);
        queue.play_list(episodes(3), 0).unwrap();
        queue.toggle_play();
        queue.play_next();
        assert!(!queue.is_playing());
    }

    #[test]
    fn shuffled_queue_always_has_next() {
        let mut queue = PlayerQueue::with_seed(7);
        queue.play_list(episodes(5), 4).unwrap();
        queue.toggle_shuffle();
        for _ in 0..50 {
            assert!(queue.has_next());
            queue.play_next();
            assert!(queue.current_index() < 5);
        }
    }

    #[test]
    fn shuffle_covers_every_index_roughly_uniformly() {
        let mut queue = PlayerQueue::with_seed(42);
        queue.play_list(episodes(5), 0).unwrap();
        queue.toggle_shuffle();

        let mut counts = [0usize; 5];
        for _ in 0..1000 {
            queue.play_next();
            counts[queue.current_index()] += 1;
        }

        for (index, count) in counts.iter().enumerate() {
            assert!(
                (120..=280).contains(count),
                "index {index} picked {count} times out of 1000"
            );
        }
    }

    #[test]
    fn previous_at_start_is_noop_in_both_modes() {
        let mut queue = PlayerQueue::with_seed(1);
        queue.play_list(episodes(3), 0).unwrap();
        queue.play_previous();
        assert_eq!(queue.current_index(), 0);

        queue.toggle_shuffle();
        queue.play_previous();
        assert_eq!(queue.current_index(), 0);
    }

    #[test]
    fn previous_is_sequential_while_shuffling() {
        let mut queue = PlayerQueue::with_seed(1);
        queue.play_list(episodes(5), 3).unwrap();
        queue.toggle_shuffle();
        queue.play_previous();
        assert_eq!(queue.current_index(), 2);
    }

    #[test]
    fn clear_empties_queue_and_keeps_preferences() {
        let mut queue = PlayerQueue::with_seed(1);
        queue.play_list(episodes(3), 2).unwrap();
        queue.toggle_loop();
        queue.toggle_shuffle();

        queue.clear_player_state();

        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), 0);
        assert!(!queue.has_next());
        assert!(!queue.has_previous());
        assert!(!queue.is_playing());
        assert!(queue.is_looping());
        assert!(queue.is_shuffling());
    }

    #[test]
    fn toggling_flags_leaves_queue_untouched() {
        let mut queue = PlayerQueue::with_seed(1);
        queue.play_list(episodes(3), 1).unwrap();
        let items = queue.items().to_vec();

        queue.toggle_loop();
        queue.toggle_shuffle();
        queue.toggle_loop();

        assert_eq!(queue.items(), items.as_slice());
        assert_eq!(queue.current_index(), 1);
        assert!(queue.is_playing());
        assert!(!queue.is_looping());
        assert!(queue.is_shuffling());
    }

    #[test]
    fn empty_queue_operations_are_noops() {
        let mut queue = PlayerQueue::with_seed(1);
        queue.toggle_shuffle();
        queue.play_next();
        queue.play_previous();
        queue.toggle_play();
        queue.set_playing_state(true);

        assert!(queue.is_empty());
        assert_eq!(queue.current_index(), 0);
        assert!(!queue.is_playing());
    }

    #[test]
    fn duplicates_are_distinct_slots() {
        let episode = Episode::new("Rerun", "Host", "", 10, "rerun.mp3");
        let mut queue = PlayerQueue::with_seed(1);
        queue.play_list(vec![episode.clone(), episode.clone()], 0).unwrap();
        assert!(queue.has_next());
        queue.play_next();
        assert_eq!(queue.current_index(), 1);
        assert_eq!(queue.current(), Some(&episode));
    }

    #[test]
    fn apply_routes_commands() {
        let mut queue = PlayerQueue::with_seed(1);
        queue
            .apply(QueueCommand::PlayList { episodes: episodes(3), start: 0 })
            .unwrap();
        queue.apply(QueueCommand::Next).unwrap();
        queue.apply(QueueCommand::TogglePlay).unwrap();
        assert_eq!(queue.current_index(), 1);
        assert!(!queue.is_playing());

        let err = queue
            .apply(QueueCommand::PlayList { episodes: episodes(1), start: 5 })
            .unwrap_err();
        assert_eq!(err, QueueError::InvalidStartIndex { index: 5, len: 1 });
    }
}
