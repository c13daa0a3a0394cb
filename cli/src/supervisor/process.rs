//! Escalating-timeout supervision of a child process.
//!
//! Both deadlines are measured from spawn. Exit detection always wins over a
//! deadline that becomes due in the same poll, and the deadlines are dropped
//! as soon as the wait completes, so no signal can reach a reaped pid.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::supervisor::error::SupervisorError;
use crate::supervisor::types::{CommandSpec, Escalation, SupervisedState, SupervisionReport};

/// Runs one external command under a graceful/forced timeout policy.
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    graceful_timeout: Duration,
    force_timeout: Duration,
}

impl Supervisor {
    /// Creates a supervisor with the given deadlines.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::InvalidTimeouts`] unless
    /// `graceful_timeout < force_timeout`.
    pub fn new(
        graceful_timeout: Duration,
        force_timeout: Duration,
    ) -> Result<Self, SupervisorError> {
        if graceful_timeout >= force_timeout {
            return Err(SupervisorError::InvalidTimeouts {
                graceful: graceful_timeout,
                force: force_timeout,
            });
        }

        Ok(Self {
            graceful_timeout,
            force_timeout,
        })
    }

    /// Deadline for SIGTERM, measured from spawn.
    #[must_use]
    pub const fn graceful_timeout(&self) -> Duration {
        self.graceful_timeout
    }

    /// Deadline for SIGKILL, measured from spawn.
    #[must_use]
    pub const fn force_timeout(&self) -> Duration {
        self.force_timeout
    }

    /// Spawns `spec` with inherited stdio and waits for it to exit.
    ///
    /// Returns only after the process has exited.
    ///
    /// # Errors
    ///
    /// - [`SupervisorError::Start`] if the process cannot be spawned
    /// - [`SupervisorError::Wait`] if waiting on the process fails
    /// - [`SupervisorError::Exited`] if it exits non-zero or is killed
    pub async fn supervise(
        &self,
        spec: &CommandSpec,
    ) -> Result<SupervisionReport, SupervisorError> {
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SupervisorError::Start {
                program: spec.program.clone(),
                source,
            })?;

        let started = Instant::now();
        info!(pid = ?child.id(), command = %spec, "Started supervised process");

        let (waited, escalations) = self.race_deadlines(&mut child, started).await;
        let elapsed = started.elapsed();
        let status = waited.map_err(SupervisorError::Wait)?;

        if status.success() {
            info!(elapsed = ?elapsed, "Supervised process exited successfully");
            Ok(SupervisionReport {
                status,
                escalations,
                elapsed,
            })
        } else {
            warn!(%status, elapsed = ?elapsed, ?escalations, "Supervised process failed");
            Err(SupervisorError::Exited {
                status,
                escalations,
            })
        }
    }

    /// Waits for `child`, sending SIGTERM and SIGKILL as each deadline passes.
    ///
    /// The deadline timers are locals of this future and are gone once it
    /// returns.
    async fn race_deadlines(
        &self,
        child: &mut Child,
        started: Instant,
    ) -> (io::Result<ExitStatus>, Vec<Escalation>) {
        let pid = child.id();
        let graceful = sleep_until(started + self.graceful_timeout);
        let force = sleep_until(started + self.force_timeout);
        tokio::pin!(graceful);
        tokio::pin!(force);

        let mut state = SupervisedState::Running;
        let mut escalations = Vec::with_capacity(2);

        let waited = loop {
            tokio::select! {
                biased;

                result = child.wait() => break result,

                () = &mut graceful, if state.awaits_graceful() => {
                    info!(?pid, "Sending SIGTERM to supervised process");
                    if let Err(e) = send_graceful(pid) {
                        warn!(?pid, error = %e, "Error sending SIGTERM");
                    }
                    state = SupervisedState::GracefulSent;
                    escalations.push(Escalation::Graceful);
                }

                () = &mut force, if state.awaits_force() => {
                    info!(?pid, "Sending SIGKILL to supervised process");
                    if let Err(e) = child.start_kill() {
                        warn!(?pid, error = %e, "Error sending SIGKILL");
                    }
                    state = SupervisedState::ForceSent;
                    escalations.push(Escalation::Force);
                }
            }
        };

        debug!(?pid, from = ?state, to = ?SupervisedState::Exited, "Deadlines disarmed");
        (waited, escalations)
    }
}

#[cfg(unix)]
fn send_graceful(pid: Option<u32>) -> io::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let raw = pid
        .and_then(|p| i32::try_from(p).ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "process id unavailable"))?;

    kill(Pid::from_raw(raw), Signal::SIGTERM).map_err(io::Error::from)
}

#[cfg(not(unix))]
fn send_graceful(_pid: Option<u32>) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "graceful termination is not supported on this platform",
    ))
}
