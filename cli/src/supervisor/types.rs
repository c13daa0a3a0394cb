//! Types describing a supervised run.

use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;

/// Program plus arguments for the supervised process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name or path, resolved through `PATH`.
    pub program: String,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Creates a command spec from a program and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Lifecycle of the supervised process.
///
/// Transitions only move forward: `Running -> GracefulSent -> ForceSent -> Exited`,
/// with `Exited` reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisedState {
    Running,
    GracefulSent,
    ForceSent,
    Exited,
}

impl SupervisedState {
    /// Whether the graceful deadline may still fire.
    #[must_use]
    pub const fn awaits_graceful(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether the force deadline may still fire.
    #[must_use]
    pub const fn awaits_force(self) -> bool {
        matches!(self, Self::Running | Self::GracefulSent)
    }
}

/// A termination signal sent to the supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// SIGTERM at the graceful deadline.
    Graceful,
    /// SIGKILL at the force deadline.
    Force,
}

/// Outcome of a run that exited successfully.
#[derive(Debug)]
pub struct SupervisionReport {
    /// Final exit status (always success).
    pub status: ExitStatus,
    /// Signals sent before exit, in order.
    pub escalations: Vec<Escalation>,
    /// Wall-clock time from spawn to exit.
    pub elapsed: Duration,
}
