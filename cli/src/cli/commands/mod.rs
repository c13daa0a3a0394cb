//! Command implementations.

pub mod renew;

pub use renew::{handle_renew, RenewOutcome};
