//! Supervision of the external login process.
//!
//! This module runs a child process with inherited stdio and enforces a
//! two-stage escalation policy:
//! - [`Supervisor`] - Spawns the command and races its exit against two deadlines
//! - [`CommandSpec`] - Program and arguments to run
//! - [`SupervisionReport`] - What happened during a successful run
//! - [`SupervisorError`] - Start, wait and exit failures

pub mod error;
pub mod process;
pub mod types;

pub use error::SupervisorError;
pub use process::Supervisor;
pub use types::{CommandSpec, SupervisionReport};
