//! Reconciler process supervision.

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::time::Duration;

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::ChildStderr;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::driver::classify::log_line;
use crate::driver::command::DriverCommand;
use crate::driver::{DriverError, SupervisorState};
use crate::observability::metrics;

const READER_DRAIN: Duration = Duration::from_secs(1);

/// Launches the reconciler and owns it until it exits.
pub struct Supervisor {
    command: DriverCommand,
    state_tx: watch::Sender<SupervisorState>,
}

impl Supervisor {
    pub fn new(command: DriverCommand) -> Self {
        let (state_tx, _) = watch::channel(SupervisorState::NotStarted);
        Self { command, state_tx }
    }

    /// Observe lifecycle transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SupervisorState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> SupervisorState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: SupervisorState) {
        debug!(?state, "Supervisor state");
        self.state_tx.send_replace(state);
    }

    /// Run the reconciler until a shutdown signal arrives and it exits.
    ///
    /// `ready` receives the child pid once the process is running. The first
    /// value received on `signals` is forwarded verbatim to the child; a
    /// closed channel counts as `SIGTERM`. Fatal errors (see
    /// [`DriverError::is_fatal`]) mean the reconciler is gone and the caller
    /// should terminate.
    pub async fn run(
        self,
        mut signals: mpsc::Receiver<Signal>,
        ready: oneshot::Sender<u32>,
    ) -> Result<(), DriverError> {
        info!(program = %self.command.program(), "Reconciler driver starting");
        self.set_state(SupervisorState::Starting);

        let mut child = match self.command.to_command().spawn() {
            Ok(child) => child,
            Err(source) => {
                self.set_state(SupervisorState::Stopped);
                metrics::record_reconciler_exit("start_failed");
                return Err(DriverError::Start {
                    program: self.command.program().to_string(),
                    source,
                });
            }
        };

        let Some(pid) = child.id() else {
            self.set_state(SupervisorState::Stopped);
            return Err(DriverError::ProcessLookup { pid: 0 });
        };
        info!(pid, "Reconciler process started");

        let reader = child.stderr.take().map(|stderr| tokio::spawn(forward_diagnostics(pid, stderr)));

        self.set_state(SupervisorState::Running);
        let _ = ready.send(pid);

        let requested = tokio::select! {
            status = child.wait() => {
                finish_reader(reader).await;
                self.set_state(SupervisorState::Stopped);
                classify_exit(pid, status.map_err(DriverError::Wait)?, false)?;

                // Nothing left to forward to; hold until shutdown is requested.
                let signal = signals.recv().await;
                info!(?signal, "Shutdown requested after reconciler exited");
                return Ok(());
            }
            signal = signals.recv() => signal.unwrap_or(Signal::SIGTERM),
        };

        self.set_state(SupervisorState::Stopping);
        info!(pid, signal = requested.as_str(), "Forwarding signal to reconciler");

        if child.id().is_none() {
            warn!(pid, "Reconciler process not found");
            return Err(DriverError::ProcessLookup { pid });
        }
        if let Err(source) = kill(Pid::from_raw(pid as i32), requested) {
            warn!(pid, signal = requested.as_str(), error = %source, "Failed signalling reconciler");
            return Err(DriverError::SignalDelivery {
                pid,
                signal: requested,
                source,
            });
        }

        // Further signals (an operator escalating) go straight to the child.
        let status = loop {
            tokio::select! {
                status = child.wait() => break status,
                Some(next) = signals.recv() => {
                    warn!(pid, signal = next.as_str(), "Forwarding repeated signal to reconciler");
                    if let Err(e) = kill(Pid::from_raw(pid as i32), next) {
                        warn!(pid, signal = next.as_str(), error = %e, "Failed signalling reconciler");
                    }
                }
            }
        };
        finish_reader(reader).await;
        self.set_state(SupervisorState::Stopped);
        classify_exit(pid, status.map_err(DriverError::Wait)?, true)?;

        info!(pid, "Reconciler driver stopped");
        Ok(())
    }
}

/// Map an exit status onto the fatal/clean outcomes.
fn classify_exit(pid: u32, status: ExitStatus, requested: bool) -> Result<(), DriverError> {
    if status.success() {
        if requested {
            metrics::record_reconciler_exit("clean");
        } else {
            metrics::record_reconciler_exit("unexpected_clean");
            warn!(pid, exit_status = 0, "Reconciler exited normally without a shutdown request");
        }
        return Ok(());
    }

    if let Some(signal) = status.signal() {
        metrics::record_reconciler_exit("signaled");
        let err = DriverError::Signaled { signal };
        error!(pid, error = %err, "Reconciler signaled to stop");
        return Err(err);
    }

    metrics::record_reconciler_exit("failed");
    let err = DriverError::Exited {
        code: status.code().unwrap_or(-1),
    };
    error!(pid, error = %err, "Reconciler exited");
    Err(err)
}

/// Stream stderr lines into the logger until the pipe closes.
async fn forward_diagnostics(pid: u32, stderr: ChildStderr) {
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                log_line(pid, line.trim_end_matches(['\r', '\n']));
            }
            Err(e) => {
                warn!(pid, error = %e, "Failed reading reconciler output");
                break;
            }
        }
    }
}

/// Let the reader drain what the child wrote; a grandchild holding the pipe
/// open must not keep us waiting.
async fn finish_reader(reader: Option<JoinHandle<()>>) {
    if let Some(mut reader) = reader {
        if tokio::time::timeout(READER_DRAIN, &mut reader).await.is_err() {
            reader.abort();
        }
    }
}
