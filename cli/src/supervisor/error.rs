//! Supervisor-specific error types.

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use crate::supervisor::types::Escalation;

/// Errors produced by a supervised run.
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// The graceful deadline must come before the force deadline.
    #[error("graceful timeout ({graceful:?}) must be shorter than kill timeout ({force:?})")]
    InvalidTimeouts {
        /// Graceful termination deadline.
        graceful: Duration,
        /// Forced kill deadline.
        force: Duration,
    },

    /// The process could not be started.
    #[error("error starting '{program}': {source}")]
    Start {
        /// Program that failed to start.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the process failed.
    #[error("error waiting for process: {0}")]
    Wait(#[source] std::io::Error),

    /// The process exited unsuccessfully or was killed by a signal.
    #[error("process {status}{}", describe_escalations(.escalations))]
    Exited {
        /// Final exit status.
        status: ExitStatus,
        /// Signals sent before the process exited, in order.
        escalations: Vec<Escalation>,
    },
}

impl SupervisorError {
    /// Checks if the process never ran.
    #[must_use]
    pub const fn is_start_failure(&self) -> bool {
        matches!(self, Self::Start { .. })
    }
}

fn describe_escalations(escalations: &[Escalation]) -> String {
    match escalations.last() {
        Some(Escalation::Force) => " after forced kill".to_string(),
        Some(Escalation::Graceful) => " after graceful termination request".to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_failure_is_classified() {
        let err = SupervisorError::Start {
            program: "vault".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.is_start_failure());
        assert!(err.to_string().contains("vault"));
    }

    #[test]
    fn invalid_timeouts_names_both_values() {
        let err = SupervisorError::InvalidTimeouts {
            graceful: Duration::from_secs(90),
            force: Duration::from_secs(60),
        };
        let msg = err.to_string();
        assert!(msg.contains("90s"));
        assert!(msg.contains("60s"));
        assert!(!err.is_start_failure());
    }

    #[test]
    fn describe_escalations_uses_last_signal() {
        assert_eq!(describe_escalations(&[]), "");
        assert!(describe_escalations(&[Escalation::Graceful]).contains("graceful"));
        assert!(
            describe_escalations(&[Escalation::Graceful, Escalation::Force]).contains("forced")
        );
    }
}
