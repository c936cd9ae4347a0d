//! Property-based tests for the queue store
//!
//! Uses proptest to check the queue invariants across random command
//! sequences.

use castplay_core::{ Episode, PlayerQueue, QueueCommand };
use proptest::prelude::*;

// ===== Helpers =====

fn arbitrary_episode() -> impl Strategy<Value = Episode> {
    (
        "[A-Za-z ]{1,30}", // title
        "[A-Za-z, ]{0,20}", // members
        0u32..7200,         // duration
    )
        .prop_map(|(title, members, duration)| {
            Episode::new(title, members, "/thumbs/cover.jpg", duration, "/episodes/test.mp3")
        })
}

fn arbitrary_episodes() -> impl Strategy<Value = Vec<Episode>> {
    prop::collection::vec(arbitrary_episode(), 1..30)
}

fn arbitrary_command() -> impl Strategy<Value = QueueCommand> {
    prop_oneof![
        arbitrary_episode().prop_map(QueueCommand::Play),
        (arbitrary_episodes(), any::<prop::sample::Index>()).prop_map(|(episodes, start)| {
            let start = start.index(episodes.len());
            QueueCommand::PlayList { episodes, start }
        }),
        Just(QueueCommand::TogglePlay),
        any::<bool>().prop_map(QueueCommand::SetPlaying),
        Just(QueueCommand::ToggleLoop),
        Just(QueueCommand::ToggleShuffle),
        Just(QueueCommand::Next),
        Just(QueueCommand::Previous),
        Just(QueueCommand::Clear),
    ]
}

fn assert_invariants(queue: &PlayerQueue) -> Result<(), TestCaseError> {
    if queue.is_empty() {
        prop_assert_eq!(queue.current_index(), 0);
        prop_assert!(!queue.is_playing(), "playing with an empty queue");
        prop_assert!(!queue.has_next());
        prop_assert!(!queue.has_previous());
    } else {
        prop_assert!(queue.current_index() < queue.len());
        prop_assert!(queue.current().is_some());
    }
    Ok(())
}

// ===== Property Tests =====

proptest! {
    /// Property: any command sequence keeps the queue consistent
    #[test]
    fn invariants_hold_after_any_commands(
        seed in any::<u64>(),
        commands in prop::collection::vec(arbitrary_command(), 1..60)
    ) {
        let mut queue = PlayerQueue::with_seed(seed);
        for command in commands {
            queue.apply(command).unwrap();
            assert_invariants(&queue)?;
        }
    }

    /// Property: next/previous never leave the queue bounds
    #[test]
    fn navigation_stays_in_bounds(
        seed in any::<u64>(),
        episodes in arbitrary_episodes(),
        shuffle in any::<bool>(),
        steps in prop::collection::vec(any::<bool>(), 1..200)
    ) {
        let len = episodes.len();
        let mut queue = PlayerQueue::with_seed(seed);
        queue.play_list(episodes, 0).unwrap();
        if shuffle {
            queue.toggle_shuffle();
        }

        for forward in steps {
            if forward {
                queue.play_next();
            } else {
                queue.play_previous();
            }
            prop_assert!(queue.current_index() < len);
            prop_assert_eq!(queue.len(), len);
        }
    }

    /// Property: play always yields a single playing episode
    #[test]
    fn play_always_yields_single_episode(
        commands in prop::collection::vec(arbitrary_command(), 0..20),
        episode in arbitrary_episode()
    ) {
        let mut queue = PlayerQueue::with_seed(9);
        for command in commands {
            queue.apply(command).unwrap();
        }

        queue.play(episode.clone());

        prop_assert_eq!(queue.items(), &[episode][..]);
        prop_assert_eq!(queue.current_index(), 0);
        prop_assert!(queue.is_playing());
    }

    /// Property: loop and shuffle toggles never touch items, index or playing
    #[test]
    fn flag_toggles_leave_queue_alone(
        episodes in arbitrary_episodes(),
        start in any::<prop::sample::Index>(),
        toggles in prop::collection::vec(any::<bool>(), 1..20)
    ) {
        let start = start.index(episodes.len());
        let mut queue = PlayerQueue::with_seed(1);
        queue.play_list(episodes.clone(), start).unwrap();
        let playing = queue.is_playing();

        for loop_toggle in toggles {
            if loop_toggle {
                queue.toggle_loop();
            } else {
                queue.toggle_shuffle();
            }
            prop_assert_eq!(queue.items(), episodes.as_slice());
            prop_assert_eq!(queue.current_index(), start);
            prop_assert_eq!(queue.is_playing(), playing);
        }
    }

    /// Property: out-of-range starts are rejected and change nothing
    #[test]
    fn invalid_start_is_rejected(
        episodes in arbitrary_episodes(),
        extra in 0usize..10
    ) {
        let mut queue = PlayerQueue::with_seed(1);
        queue.play(Episode::new("Before", "", "", 1, "before.mp3"));
        let before = queue.snapshot();

        let start = episodes.len() + extra;
        prop_assert!(queue.play_list(episodes, start).is_err());
        prop_assert_eq!(queue.snapshot(), before);
    }
}
