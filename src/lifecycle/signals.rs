//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGTERM and SIGINT
//! - Hand the first received signal, unchanged, to the reconciler supervisor
//! - Trigger the shutdown flag for every other task
//! - Escalate a repeated signal to SIGKILL so a stuck reconciler cannot
//!   keep the bridge alive

use nix::sys::signal::Signal;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;

use crate::lifecycle::Shutdown;

/// Listen for termination signals until the supervisor stops accepting them.
pub async fn forward_termination(
    shutdown: Shutdown,
    supervisor_tx: mpsc::Sender<Signal>,
) -> std::io::Result<()> {
    let mut term = signal(SignalKind::terminate())?;
    let mut int = signal(SignalKind::interrupt())?;
    let (received_tx, received_rx) = mpsc::channel(4);

    let listen = async move {
        loop {
            let received = tokio::select! {
                _ = term.recv() => Signal::SIGTERM,
                _ = int.recv() => Signal::SIGINT,
            };
            if received_tx.send(received).await.is_err() {
                break;
            }
        }
    };

    tokio::select! {
        _ = listen => {}
        _ = relay(received_rx, shutdown, supervisor_tx) => {}
    }
    Ok(())
}

/// Forward the first signal as received and every later one as SIGKILL.
///
/// Returns once the supervisor is gone or `received` closes.
pub(crate) async fn relay(
    mut received: mpsc::Receiver<Signal>,
    shutdown: Shutdown,
    supervisor_tx: mpsc::Sender<Signal>,
) {
    let mut forwarded = 0usize;
    while let Some(signal) = received.recv().await {
        let outgoing = if forwarded == 0 {
            tracing::info!(signal = signal.as_str(), "Termination signal received");
            signal
        } else {
            tracing::warn!(
                signal = signal.as_str(),
                repeated = forwarded,
                "Termination signal repeated, killing reconciler"
            );
            Signal::SIGKILL
        };

        shutdown.trigger();
        if supervisor_tx.send(outgoing).await.is_err() {
            tracing::warn!("Reconciler supervisor already stopped");
            return;
        }
        forwarded += 1;
    }
}
