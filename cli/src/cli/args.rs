//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{env, ConfigOverrides};

/// Renew a Vault token through an interactive login when it is about to expire.
///
/// Looks up the cached token and, if it has less than the minimum TTL left,
/// runs `vault login -method=oidc` with a bounded timeout. Meant to run before
/// other tooling that needs a valid token.
#[derive(Parser, Debug)]
#[command(name = "vault-renew")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Vault address, e.g. <https://vault.acme.com> [env: VAULT_ADDR]
    #[arg(long, value_name = "URL")]
    pub vault_addr: Option<String>,

    /// Path to the Vault token; $VAR and ${VAR} are expanded [default: $HOME/.vault-token]
    #[arg(long, value_name = "PATH")]
    pub token_path: Option<String>,

    /// Minimum TTL for the token, e.g. 72h [default: 72h]
    #[arg(long, value_name = "DURATION")]
    pub min_ttl: Option<String>,

    /// Login method passed to `vault login` [default: oidc]
    #[arg(long, value_name = "METHOD")]
    pub method: Option<String>,

    /// Vault binary used for the login [env: VAULT_RENEW_BIN] [default: vault]
    #[arg(long, value_name = "PROGRAM")]
    pub vault_bin: Option<String>,

    /// Configuration file (defaults to the platform config directory).
    #[arg(long, env = env::CONFIG, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The flags that override file and environment configuration.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            vault_addr: self.vault_addr.clone(),
            token_path: self.token_path.clone(),
            min_ttl: self.min_ttl.clone(),
            method: self.method.clone(),
            vault_bin: self.vault_bin.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "vault-renew",
            "--vault-addr",
            "https://vault.acme.com",
            "--token-path",
            "/tmp/token",
            "--min-ttl",
            "24h",
            "--method",
            "github",
            "--vault-bin",
            "/usr/local/bin/vault",
            "-v",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.vault_addr.as_deref(), Some("https://vault.acme.com"));
        assert_eq!(overrides.token_path.as_deref(), Some("/tmp/token"));
        assert_eq!(overrides.min_ttl.as_deref(), Some("24h"));
        assert_eq!(overrides.method.as_deref(), Some("github"));
        assert_eq!(overrides.vault_bin.as_deref(), Some("/usr/local/bin/vault"));
        assert!(cli.verbose);
    }

    #[test]
    fn flags_are_optional() {
        let cli = Cli::try_parse_from(["vault-renew"]).unwrap();
        let overrides = cli.overrides();
        assert!(overrides.vault_addr.is_none());
        assert!(overrides.min_ttl.is_none());
        assert!(!cli.verbose);
    }
}
