//! Engine thread tests: commands in, responses out

use std::time::{ Duration, Instant };

use castplay_core::{
    EngineConfig, Episode, PlayerCommand, PlayerEngine, PlayerEngineHandle, PlayerResponse,
    QueueCommand, QueueSnapshot,
    device::{ PlaybackDevice, SimulatedDevice },
};

const WAIT: Duration = Duration::from_secs(5);

fn start_engine() -> (std::thread::JoinHandle<anyhow::Result<()>>, PlayerEngineHandle) {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = EngineConfig {
        tick: Duration::from_millis(5),
        seed: Some(5),
        ..Default::default()
    };
    let (engine, handle) = PlayerEngine::new(config, |events| {
        Ok(Box::new(SimulatedDevice::new(events)) as Box<dyn PlaybackDevice>)
    });
    (engine.spawn().unwrap(), handle)
}

/// Wait for a queue snapshot matching `pred`
fn wait_for_snapshot(
    handle: &PlayerEngineHandle,
    pred: impl Fn(&QueueSnapshot) -> bool
) -> QueueSnapshot {
    let deadline = Instant::now() + WAIT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match handle.resp_rx.recv_timeout(remaining) {
            Ok(PlayerResponse::QueueChanged(snapshot)) if pred(&snapshot) => return snapshot,
            Ok(_) => {}
            Err(e) => panic!("no matching snapshot: {e}"),
        }
    }
}

fn wait_for_error(handle: &PlayerEngineHandle) -> String {
    let deadline = Instant::now() + WAIT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match handle.resp_rx.recv_timeout(remaining) {
            Ok(PlayerResponse::Error(message)) => return message,
            Ok(_) => {}
            Err(e) => panic!("no error response: {e}"),
        }
    }
}

fn quit(thread: std::thread::JoinHandle<anyhow::Result<()>>, handle: PlayerEngineHandle) {
    handle.cmd_tx.send(PlayerCommand::Quit).unwrap();
    let deadline = Instant::now() + WAIT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match handle.resp_rx.recv_timeout(remaining) {
            Ok(PlayerResponse::Shutdown) => break,
            Ok(_) => {}
            Err(e) => panic!("engine did not shut down: {e}"),
        }
    }
    thread.join().unwrap().unwrap();
}

#[test]
fn engine_publishes_initial_empty_queue() {
    let (thread, handle) = start_engine();
    let snapshot = wait_for_snapshot(&handle, |_| true);
    assert!(snapshot.items.is_empty());
    assert!(!snapshot.is_playing);
    quit(thread, handle);
}

#[test]
fn engine_plays_queue_to_the_end() {
    let (thread, handle) = start_engine();
    let episodes = vec![
        Episode::new("First", "Host", "", 0, "/episodes/first.mp3"),
        Episode::new("Second", "Host", "", 0, "/episodes/second.mp3"),
    ];

    handle
        .cmd_tx
        .send(QueueCommand::PlayList { episodes, start: 0 }.into())
        .unwrap();

    let playing = wait_for_snapshot(&handle, |s| !s.items.is_empty());
    assert!(playing.is_playing);
    assert!(playing.current().is_some());

    let finished = wait_for_snapshot(&handle, |s| s.items.is_empty());
    assert!(!finished.is_playing);
    assert!(!finished.has_next);

    quit(thread, handle);
}

#[test]
fn engine_reports_invalid_start_index() {
    let (thread, handle) = start_engine();
    handle
        .cmd_tx
        .send(
            QueueCommand::PlayList {
                episodes: vec![Episode::new("Only", "", "", 10, "/episodes/only.mp3")],
                start: 4,
            }.into()
        )
        .unwrap();

    let message = wait_for_error(&handle);
    assert!(message.contains("Invalid start index"), "{message}");
    quit(thread, handle);
}

#[test]
fn engine_reports_unloadable_episode_and_recovers_on_next() {
    let (thread, handle) = start_engine();
    let episodes = vec![
        Episode::new("Broken", "Host", "", 10, ""),
        Episode::new("Good", "Host", "", 0, "/episodes/good.mp3"),
    ];
    handle
        .cmd_tx
        .send(QueueCommand::PlayList { episodes, start: 0 }.into())
        .unwrap();

    let stuck = wait_for_snapshot(&handle, |s| !s.items.is_empty());
    assert_eq!(stuck.current_index, 0);
    assert!(!stuck.is_playing);
    assert!(stuck.has_next);

    let message = wait_for_error(&handle);
    assert!(message.contains("Broken"), "{message}");

    handle.cmd_tx.send(QueueCommand::Next.into()).unwrap();
    handle.cmd_tx.send(QueueCommand::SetPlaying(true).into()).unwrap();
    let finished = wait_for_snapshot(&handle, |s| s.items.is_empty());
    assert!(!finished.is_playing);

    quit(thread, handle);
}

#[test]
fn engine_stops_when_handle_is_dropped() {
    let (thread, handle) = start_engine();
    drop(handle);
    thread.join().unwrap().unwrap();
}
