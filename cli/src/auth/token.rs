//! The cached Vault token.

use std::fmt;
use std::io;
use std::path::Path;

/// A Vault token as stored by `vault login`.
///
/// The value is never printed; `Debug` shows a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct VaultToken(String);

impl VaultToken {
    /// Creates a token from raw file contents.
    ///
    /// Surrounding whitespace (a trailing newline from an editor, for example)
    /// is stripped. Returns `None` if nothing remains.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Reads the token file at `path`.
    ///
    /// `Ok(None)` means the file exists but holds no token.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the file cannot be read.
    pub fn read_from(path: &Path) -> io::Result<Option<Self>> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::new(&contents))
    }

    /// The secret value, for use in request headers only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VaultToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultToken(****)")
    }
}
