//! Configuration management for vault-renew.
//!
//! Settings come from, in increasing priority: built-in defaults, the
//! optional `config.toml`, environment variables and command-line flags.

pub mod paths;
pub mod settings;

pub use paths::config_file;
pub use settings::{env, ConfigOverrides, LoginConfig, RenewSettings, VaultConfig};

use std::path::Path;

use crate::config::settings::RenewConfig;
use crate::error::Result;

/// Load configuration from the default config file.
///
/// If the config file doesn't exist, returns default configuration.
pub fn load_config() -> Result<RenewConfig> {
    let path = config_file()?;
    load_config_from(&path)
}

/// Load configuration from a specific path.
///
/// If the file doesn't exist, returns default configuration.
pub fn load_config_from(path: &Path) -> Result<RenewConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(RenewConfig::default().with_env_overrides());
    }

    tracing::debug!(path = %path.display(), "Reading config file");
    let contents = std::fs::read_to_string(path)?;
    let config: RenewConfig = toml::from_str(&contents)?;

    Ok(config.with_env_overrides())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenewError;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config.login.method, "oidc");
        assert_eq!(config.renewal.min_ttl, Duration::from_secs(72 * 3600));
    }

    #[test]
    fn reads_values_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[renewal]\nmin_ttl = \"12h\"\n\n[login]\nmethod = \"github\"\n",
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.renewal.min_ttl, Duration::from_secs(12 * 3600));
        assert_eq!(config.login.method, "github");
    }

    #[test]
    fn malformed_file_is_a_config_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[vault\naddress = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, RenewError::ConfigRead(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn unreadable_path_is_an_io_error() {
        let temp_dir = TempDir::new().unwrap();

        // A directory exists but cannot be read as a file.
        let err = load_config_from(temp_dir.path()).unwrap_err();
        assert!(matches!(err, RenewError::Io(_)));
    }
}
