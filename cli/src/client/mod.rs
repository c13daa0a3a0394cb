//! Vault HTTP client.

pub mod api;
pub mod middleware;

pub use api::{TokenIntrospection, TokenLookup, VaultClient};

#[cfg(test)]
pub use api::MockTokenIntrospection;
