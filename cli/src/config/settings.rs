//! Application configuration settings.

use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::config::paths::{expand_env, DEFAULT_TOKEN_PATH};
use crate::error::{RenewError, Result};

/// Main configuration for vault-renew, as read from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenewConfig {
    /// Vault connection settings.
    pub vault: VaultConfig,
    /// Renewal policy.
    pub renewal: RenewalConfig,
    /// Login command settings.
    pub login: LoginConfig,
}

/// Vault connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault address. Empty means the Vault default.
    pub address: String,
    /// Token file path, before environment expansion.
    pub token_path: String,
    /// Request timeout for the token lookup.
    #[serde(with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Renewal policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenewalConfig {
    /// Renew when the token has this much validity left or less.
    #[serde(with = "duration_serde")]
    pub min_ttl: Duration,
}

impl Default for RenewalConfig {
    fn default() -> Self {
        Self {
            min_ttl: Duration::from_secs(72 * 60 * 60),
        }
    }
}

/// Login command configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Program that performs the login.
    pub program: String,
    /// Value passed as `-method=`.
    pub method: String,
    /// Send SIGTERM this long after the login started.
    #[serde(with = "duration_serde")]
    pub graceful_timeout: Duration,
    /// Send SIGKILL this long after the login started.
    #[serde(with = "duration_serde")]
    pub kill_timeout: Duration,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            program: "vault".to_string(),
            method: "oidc".to_string(),
            graceful_timeout: Duration::from_secs(60),
            kill_timeout: Duration::from_secs(90),
        }
    }
}

/// Values given on the command line, applied over the file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub vault_addr: Option<String>,
    pub token_path: Option<String>,
    pub min_ttl: Option<String>,
    pub method: Option<String>,
    pub vault_bin: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RenewSettings {
    /// Vault connection settings.
    pub vault: VaultConfig,
    /// Token file path with environment variables expanded.
    pub token_path: PathBuf,
    /// Minimum acceptable remaining validity.
    pub min_ttl: TimeDelta,
    /// Login command settings.
    pub login: LoginConfig,
}

/// Serde support for humantime duration strings like `"90s"` or `"72h"`.
mod duration_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

/// Environment variables that can override configuration.
pub mod env {
    pub const VAULT_ADDR: &str = "VAULT_ADDR";
    pub const VAULT_BIN: &str = "VAULT_RENEW_BIN";
    pub const CONFIG: &str = "VAULT_RENEW_CONFIG";
    pub const LOG_LEVEL: &str = "VAULT_RENEW_LOG";
}

/// Parses a duration flag such as `72h` or `1h 30m`.
///
/// # Errors
///
/// Returns [`RenewError::InvalidDuration`] if the value is not a duration.
pub fn parse_duration(value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim()).map_err(|e| RenewError::InvalidDuration {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

impl RenewConfig {
    /// Apply environment variable overrides to the configuration.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|name| std::env::var(name).ok())
    }

    fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(env::VAULT_ADDR).filter(|a| !a.is_empty()) {
            self.vault.address = addr;
        }

        if let Some(bin) = lookup(env::VAULT_BIN).filter(|b| !b.is_empty()) {
            self.login.program = bin;
        }

        self
    }

    /// Apply command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns [`RenewError::InvalidDuration`] if `--min-ttl` does not parse.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        if let Some(addr) = &overrides.vault_addr {
            self.vault.address.clone_from(addr);
        }
        if let Some(path) = &overrides.token_path {
            self.vault.token_path.clone_from(path);
        }
        if let Some(min_ttl) = &overrides.min_ttl {
            self.renewal.min_ttl = parse_duration(min_ttl)?;
        }
        if let Some(method) = &overrides.method {
            self.login.method.clone_from(method);
        }
        if let Some(bin) = &overrides.vault_bin {
            self.login.program.clone_from(bin);
        }

        Ok(self)
    }

    /// Validate and resolve into the settings used for a run.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_ttl` is out of range or the graceful timeout
    /// is not shorter than the kill timeout.
    pub fn resolve(self) -> Result<RenewSettings> {
        let min_ttl =
            TimeDelta::from_std(self.renewal.min_ttl).map_err(|e| RenewError::InvalidDuration {
                value: humantime::format_duration(self.renewal.min_ttl).to_string(),
                reason: e.to_string(),
            })?;

        if self.login.graceful_timeout >= self.login.kill_timeout {
            return Err(RenewError::Config(format!(
                "login.graceful_timeout ({}) must be shorter than login.kill_timeout ({})",
                humantime::format_duration(self.login.graceful_timeout),
                humantime::format_duration(self.login.kill_timeout),
            )));
        }

        if self.login.program.trim().is_empty() {
            return Err(RenewError::Config("login.program must not be empty".to_string()));
        }

        let token_path = PathBuf::from(expand_env(&self.vault.token_path));

        Ok(RenewSettings {
            vault: self.vault,
            token_path,
            min_ttl,
            login: self.login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_vault_cli_conventions() {
        let config = RenewConfig::default();
        assert_eq!(config.vault.address, "");
        assert_eq!(config.vault.token_path, "$HOME/.vault-token");
        assert_eq!(config.renewal.min_ttl, Duration::from_secs(72 * 3600));
        assert_eq!(config.login.program, "vault");
        assert_eq!(config.login.method, "oidc");
        assert_eq!(config.login.graceful_timeout, Duration::from_secs(60));
        assert_eq!(config.login.kill_timeout, Duration::from_secs(90));
    }

    #[test]
    fn parses_partial_toml() {
        let config: RenewConfig = toml::from_str(
            r#"
            [vault]
            address = "https://vault.acme.com"

            [renewal]
            min_ttl = "24h"

            [login]
            graceful_timeout = "2m"
            kill_timeout = "3m"
            "#,
        )
        .unwrap();

        assert_eq!(config.vault.address, "https://vault.acme.com");
        assert_eq!(config.vault.token_path, DEFAULT_TOKEN_PATH);
        assert_eq!(config.renewal.min_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(config.login.method, "oidc");
        assert_eq!(config.login.graceful_timeout, Duration::from_secs(120));
        assert_eq!(config.login.kill_timeout, Duration::from_secs(180));
    }

    #[test]
    fn rejects_bad_duration_in_toml() {
        let result = toml::from_str::<RenewConfig>("[renewal]\nmin_ttl = \"soon\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn serializes_durations_as_strings() {
        let text = toml::to_string(&RenewConfig::default()).unwrap();
        assert!(text.contains("min_ttl = \"3days\""));
        assert!(text.contains("kill_timeout = \"1m 30s\""));
    }

    #[test]
    fn env_overrides_address_and_program() {
        let config = RenewConfig::default().with_env_lookup(|name| match name {
            "VAULT_ADDR" => Some("https://env.acme.com".to_string()),
            "VAULT_RENEW_BIN" => Some("/opt/vault/bin/vault".to_string()),
            _ => None,
        });

        assert_eq!(config.vault.address, "https://env.acme.com");
        assert_eq!(config.login.program, "/opt/vault/bin/vault");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = RenewConfig::default().with_env_lookup(|_| Some(String::new()));
        assert_eq!(config.vault.address, "");
        assert_eq!(config.login.program, "vault");
    }

    #[test]
    fn command_line_beats_environment() {
        let overrides = ConfigOverrides {
            vault_addr: Some("https://flag.acme.com".to_string()),
            min_ttl: Some("90m".to_string()),
            method: Some("userpass".to_string()),
            ..ConfigOverrides::default()
        };

        let config = RenewConfig::default()
            .with_env_lookup(|name| (name == "VAULT_ADDR").then(|| "https://env.acme.com".to_string()))
            .with_overrides(&overrides)
            .unwrap();

        assert_eq!(config.vault.address, "https://flag.acme.com");
        assert_eq!(config.renewal.min_ttl, Duration::from_secs(90 * 60));
        assert_eq!(config.login.method, "userpass");
        assert_eq!(config.login.program, "vault");
    }

    #[test]
    fn invalid_min_ttl_flag_is_rejected() {
        let overrides = ConfigOverrides {
            min_ttl: Some("three days".to_string()),
            ..ConfigOverrides::default()
        };

        let err = RenewConfig::default().with_overrides(&overrides).unwrap_err();
        assert!(matches!(err, RenewError::InvalidDuration { .. }));
    }

    #[test]
    fn resolve_expands_token_path() {
        let mut config = RenewConfig::default();
        config.vault.token_path = "/tmp/${VAULT_RENEW_SURELY_UNSET_VAR}tokens/.vault-token".to_string();

        let settings = config.resolve().unwrap();
        assert_eq!(settings.token_path, PathBuf::from("/tmp/tokens/.vault-token"));
        assert_eq!(settings.min_ttl, TimeDelta::hours(72));
    }

    #[test]
    fn resolve_rejects_inverted_timeouts() {
        let mut config = RenewConfig::default();
        config.login.graceful_timeout = Duration::from_secs(120);

        let err = config.resolve().unwrap_err();
        assert!(matches!(err, RenewError::Config(_)));
    }

    #[test]
    fn resolve_rejects_empty_program() {
        let mut config = RenewConfig::default();
        config.login.program = "  ".to_string();

        assert!(config.resolve().is_err());
    }

    #[test]
    fn parse_duration_accepts_compound_values() {
        assert_eq!(parse_duration("72h").unwrap(), Duration::from_secs(72 * 3600));
        assert_eq!(parse_duration("1h 30m").unwrap(), Duration::from_secs(5400));
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn parse_duration_rejects_signed_values() {
        let err = parse_duration("-1h").unwrap_err();
        assert!(matches!(err, RenewError::InvalidDuration { ref value, .. } if value == "-1h"));
        assert!(parse_duration("+1h").is_err());
    }
}
