//! Vault token handling for vault-renew.
//!
//! This module loads the cached token from disk and decides how much
//! validity it has left:
//! - [`VaultToken`] - The raw token value, redacted in debug output
//! - [`Freshness`] - Remaining validity, or why it is unknown
//! - [`evaluate`] - Load the token and ask Vault when it expires

pub mod freshness;
pub mod token;

pub use freshness::{evaluate, format_ttl, Freshness};
pub use token::VaultToken;
