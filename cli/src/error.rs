//! Error types and result aliases for vault-renew.
//!
//! This module provides the crate-wide error type with:
//! - Specific variants for configuration, Vault API and login failures
//! - User-friendly messages with recovery suggestions
//! - Helper methods for error classification
//! - Automatic conversion from common error types
//!
//! Freshness evaluation never surfaces these errors; see
//! [`crate::auth::Freshness`] for the soft failure path.

use thiserror::Error;

use crate::supervisor::SupervisorError;

/// Main error type for vault-renew operations.
///
/// Every variant that reaches `main` is fatal: the process reports it and
/// exits with a non-zero status.
#[derive(Error, Debug)]
pub enum RenewError {
    /// A duration flag or setting could not be parsed.
    #[error("Invalid duration '{value}': {reason}. Use a value like '72h' or '90m'.")]
    InvalidDuration {
        /// The rejected input.
        value: String,
        /// Parser error message.
        reason: String,
    },

    /// General configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read or parse the configuration file.
    #[error("Failed to read configuration file: {0}. Check file permissions and format.")]
    ConfigRead(String),

    /// The Vault address is not a valid URL.
    #[error("Invalid Vault address: {0}. Pass --vault-addr or set VAULT_ADDR.")]
    InvalidUrl(#[from] url::ParseError),

    /// Vault returned a non-success status code.
    #[error("Vault request failed ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from Vault.
        message: String,
    },

    /// Vault is unreachable (connection refused, DNS failure).
    #[error("Vault server is unavailable. Check the address and your network connection.")]
    VaultUnavailable,

    /// Request timed out.
    #[error("Request to Vault timed out. The server may be slow or unreachable.")]
    Timeout,

    /// Network error during an HTTP request.
    #[error("Network error: {0}. Check your connection to Vault.")]
    Network(String),

    /// IO operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON or TOML serialization/deserialization failed.
    #[error("Data serialization error: {0}")]
    Serialization(String),

    /// The supervised login process failed.
    #[error("Vault login failed: {0}. Re-run vault-renew to try again.")]
    Supervisor(#[from] SupervisorError),
}

impl RenewError {
    /// Checks if this error came from talking to Vault.
    ///
    /// Lookup errors are demoted to an unknown freshness by the evaluator;
    /// this is used to pick the log level for them.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout | Self::VaultUnavailable
        )
    }
}

/// Result type alias using [`RenewError`].
pub type Result<T> = std::result::Result<T, RenewError>;

impl From<serde_json::Error> for RenewError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(format!("JSON error: {err}"))
    }
}

impl From<toml::de::Error> for RenewError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigRead(format!("TOML parse error: {err}"))
    }
}

impl From<reqwest::Error> for RenewError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::VaultUnavailable
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for RenewError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(inner) => inner.into(),
            reqwest_middleware::Error::Middleware(inner) => Self::Network(inner.to_string()),
        }
    }
}
