//! Reconciler supervision against small shell scripts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::sys::signal::Signal;
use tempfile::TempDir;
use tokio::sync::{mpsc, oneshot};

use lb_bridge::driver::{DriverCommand, DriverError, Supervisor, SupervisorState};

/// Write `body` as a shell script that announces itself once traps are set.
fn script(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("reconciler.sh");
    let started = dir.path().join("started");
    let content = format!("{body}\ntouch '{}'\nwhile :; do sleep 0.05; done\n", started.display());
    std::fs::write(&path, content).unwrap();
    path
}

fn command(dir: &TempDir, script: &Path) -> DriverCommand {
    DriverCommand::new("sh", script.display().to_string(), dir.path().join("config.json"))
}

async fn wait_for(path: &Path) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !path.exists() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("script never started");
}

#[tokio::test]
async fn test_forwards_shutdown_and_returns_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "trap 'exit 0' TERM\necho '[reconciler DEBUG] hello' >&2");
    let supervisor = Supervisor::new(command(&dir, &path));
    let mut state = supervisor.subscribe_state();

    let (signal_tx, signal_rx) = mpsc::channel(1);
    let (ready_tx, ready_rx) = oneshot::channel();
    let run = tokio::spawn(supervisor.run(signal_rx, ready_tx));

    let pid = ready_rx.await.expect("ready before shutdown");
    assert!(pid > 0);
    assert_eq!(*state.borrow_and_update(), SupervisorState::Running);

    wait_for(&dir.path().join("started")).await;
    signal_tx.send(Signal::SIGTERM).await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(10), run).await.unwrap().unwrap();
    assert!(result.is_ok(), "unexpected error: {result:?}");
    assert_eq!(*state.borrow(), SupervisorState::Stopped);
}

#[tokio::test]
async fn test_received_signal_is_delivered_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("received");
    let body = format!(
        "trap 'echo USR1 > \"{}\"; exit 0' USR1\ntrap 'echo TERM > \"{}\"; exit 0' TERM",
        marker.display(),
        marker.display()
    );
    let path = script(&dir, &body);

    let (signal_tx, signal_rx) = mpsc::channel(1);
    let (ready_tx, ready_rx) = oneshot::channel();
    let run = tokio::spawn(Supervisor::new(command(&dir, &path)).run(signal_rx, ready_tx));

    ready_rx.await.unwrap();
    wait_for(&dir.path().join("started")).await;
    signal_tx.send(Signal::SIGUSR1).await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(10), run).await.unwrap().unwrap();
    assert!(result.is_ok());
    assert_eq!(std::fs::read_to_string(&marker).unwrap().trim(), "USR1");
}

#[tokio::test]
async fn test_closed_signal_channel_counts_as_terminate() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "trap 'exit 0' TERM");

    let (signal_tx, signal_rx) = mpsc::channel::<Signal>(1);
    let (ready_tx, ready_rx) = oneshot::channel();
    let run = tokio::spawn(Supervisor::new(command(&dir, &path)).run(signal_rx, ready_tx));

    ready_rx.await.unwrap();
    wait_for(&dir.path().join("started")).await;
    drop(signal_tx);

    let result = tokio::time::timeout(Duration::from_secs(10), run).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_nonzero_exit_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "echo '[reconciler ERROR] cannot reach device' >&2\nexit 3");

    let (_signal_tx, signal_rx) = mpsc::channel(1);
    let (ready_tx, _ready_rx) = oneshot::channel();
    let err = Supervisor::new(command(&dir, &path))
        .run(signal_rx, ready_tx)
        .await
        .unwrap_err();

    assert!(matches!(err, DriverError::Exited { code: 3 }), "got {err:?}");
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_death_by_signal_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "kill -9 $$");

    let (_signal_tx, signal_rx) = mpsc::channel(1);
    let (ready_tx, _ready_rx) = oneshot::channel();
    let err = Supervisor::new(command(&dir, &path))
        .run(signal_rx, ready_tx)
        .await
        .unwrap_err();

    assert!(matches!(err, DriverError::Signaled { signal: 9 }), "got {err:?}");
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_unexpected_clean_exit_waits_for_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "exit 0");
    let supervisor = Supervisor::new(command(&dir, &path));
    let mut state = supervisor.subscribe_state();

    let (signal_tx, signal_rx) = mpsc::channel(1);
    let (ready_tx, ready_rx) = oneshot::channel();
    let run = tokio::spawn(supervisor.run(signal_rx, ready_tx));
    ready_rx.await.unwrap();

    tokio::time::timeout(
        Duration::from_secs(10),
        state.wait_for(|s| *s == SupervisorState::Stopped),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(!run.is_finished());

    signal_tx.send(Signal::SIGTERM).await.unwrap();
    let result = tokio::time::timeout(Duration::from_secs(10), run).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_missing_interpreter_fails_to_start() {
    let dir = tempfile::tempdir().unwrap();
    let cmd = DriverCommand::new(
        dir.path().join("no-such-interpreter").display().to_string(),
        "driver.py",
        dir.path().join("config.json"),
    );
    let supervisor = Supervisor::new(cmd);

    let (_signal_tx, signal_rx) = mpsc::channel(1);
    let (ready_tx, ready_rx) = oneshot::channel();
    let err = supervisor.run(signal_rx, ready_tx).await.unwrap_err();

    assert!(matches!(err, DriverError::Start { .. }), "got {err:?}");
    assert!(err.is_fatal());
    assert!(ready_rx.await.is_err(), "ready must not fire");
}

#[tokio::test]
async fn test_repeated_signal_reaches_stubborn_child() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "trap '' TERM");
    let supervisor = Supervisor::new(command(&dir, &path));
    let state = supervisor.subscribe_state();

    let (signal_tx, signal_rx) = mpsc::channel(1);
    let (ready_tx, ready_rx) = oneshot::channel();
    let run = tokio::spawn(supervisor.run(signal_rx, ready_tx));

    ready_rx.await.unwrap();
    wait_for(&dir.path().join("started")).await;
    signal_tx.send(Signal::SIGTERM).await.unwrap();
    signal_tx.send(Signal::SIGKILL).await.unwrap();

    let err = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, DriverError::Signaled { signal: 9 }), "got {err:?}");
    assert_eq!(*state.borrow(), SupervisorState::Stopped);
}

#[tokio::test]
async fn test_fatal_exit_publishes_stopped() {
    let dir = tempfile::tempdir().unwrap();
    let path = script(&dir, "exit 4");
    let supervisor = Supervisor::new(command(&dir, &path));
    let state = supervisor.subscribe_state();

    let (_signal_tx, signal_rx) = mpsc::channel(1);
    let (ready_tx, _ready_rx) = oneshot::channel();
    let err = supervisor.run(signal_rx, ready_tx).await.unwrap_err();

    assert!(matches!(err, DriverError::Exited { code: 4 }));
    assert_eq!(*state.borrow(), SupervisorState::Stopped);
}
