//! Platform-specific path utilities for vault-renew.

use std::path::PathBuf;

use crate::error::{RenewError, Result};

/// Where `vault login` caches its token unless told otherwise.
pub const DEFAULT_TOKEN_PATH: &str = "$HOME/.vault-token";

/// Get the configuration directory for vault-renew.
///
/// - Linux: `~/.config/vault-renew`
/// - macOS: `~/Library/Application Support/vault-renew`
/// - Windows: `%APPDATA%\vault-renew`
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| RenewError::Config("Cannot determine config directory".to_string()))?;
    Ok(base.join("vault-renew"))
}

/// Get the main configuration file path.
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Expands `$VAR` and `${VAR}` from the process environment.
///
/// Unset variables expand to the empty string.
#[must_use]
pub fn expand_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Expands `$VAR` and `${VAR}` using `lookup`.
///
/// A `$` not followed by a variable name is kept as is.
pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                out.push_str(&lookup(&braced[..end]).unwrap_or_default());
                rest = &braced[end + 1..];
                continue;
            }
        }

        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if name_len == 0 {
            out.push('$');
        } else {
            out.push_str(&lookup(&after[..name_len]).unwrap_or_default());
        }
        rest = &after[name_len..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "HOME" => Some("/home/jane".to_string()),
            "USER" => Some("jane".to_string()),
            _ => None,
        }
    }

    #[test]
    fn expands_plain_and_braced_variables() {
        assert_eq!(
            expand_with("$HOME/.vault-token", lookup),
            "/home/jane/.vault-token"
        );
        assert_eq!(
            expand_with("${HOME}/tokens/${USER}.token", lookup),
            "/home/jane/tokens/jane.token"
        );
    }

    #[test]
    fn unset_variables_expand_to_empty() {
        assert_eq!(expand_with("$NOPE/.vault-token", lookup), "/.vault-token");
        assert_eq!(expand_with("${NOPE}x", lookup), "x");
    }

    #[test]
    fn lone_dollar_is_kept() {
        assert_eq!(expand_with("cost$/5", lookup), "cost$/5");
        assert_eq!(expand_with("trailing$", lookup), "trailing$");
        assert_eq!(expand_with("${unterminated", lookup), "${unterminated");
    }

    #[test]
    fn input_without_variables_is_unchanged() {
        assert_eq!(expand_with("/etc/vault/token", lookup), "/etc/vault/token");
    }

    #[test]
    fn config_file_is_named_config_toml() {
        if let Ok(path) = config_file() {
            assert!(path.ends_with("vault-renew/config.toml"));
        }
    }
}
