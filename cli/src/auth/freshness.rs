//! Token freshness evaluation.
//!
//! Evaluation never fails: anything that prevents computing the remaining
//! validity becomes [`Freshness::Unknown`], which callers read as zero
//! remaining time and therefore as "renew".

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::token::VaultToken;
use crate::client::{TokenIntrospection, TokenLookup};
use crate::error::RenewError;

/// How long the cached token remains valid.
#[derive(Debug)]
pub enum Freshness {
    /// `expire_time - now`. Zero or negative means already expired.
    Fresh(TimeDelta),
    /// The remaining validity could not be determined.
    Unknown(UnknownReason),
}

/// Why freshness could not be determined.
#[derive(Error, Debug)]
pub enum UnknownReason {
    #[error("token file {} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("error accessing token file: {0}")]
    Unreadable(#[source] io::Error),

    #[error("token file is empty")]
    Empty,

    #[error("error looking up token: {0}")]
    LookupFailed(#[source] RenewError),

    #[error("expire_time not found in token lookup data")]
    MissingExpiry,

    #[error("expire_time is not a string")]
    ExpiryNotString,

    #[error("error parsing expire_time '{value}': {source}")]
    MalformedExpiry {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl Freshness {
    /// Remaining validity, with unknown treated as zero.
    #[must_use]
    pub fn remaining(&self) -> TimeDelta {
        match self {
            Self::Fresh(remaining) => *remaining,
            Self::Unknown(_) => TimeDelta::zero(),
        }
    }

    /// Whether the token must be renewed to keep at least `min_ttl` of validity.
    #[must_use]
    pub fn needs_renewal(&self, min_ttl: TimeDelta) -> bool {
        self.remaining() <= min_ttl
    }

    /// The reason freshness is unknown, if it is.
    #[must_use]
    pub const fn unknown_reason(&self) -> Option<&UnknownReason> {
        match self {
            Self::Fresh(_) => None,
            Self::Unknown(reason) => Some(reason),
        }
    }

    /// Computes freshness from a lookup result at the instant `now`.
    #[must_use]
    pub fn from_lookup(lookup: &TokenLookup, now: DateTime<Utc>) -> Self {
        let Some(raw) = lookup.expire_time() else {
            return Self::Unknown(UnknownReason::MissingExpiry);
        };
        let Some(value) = raw.as_str() else {
            return Self::Unknown(UnknownReason::ExpiryNotString);
        };

        match DateTime::parse_from_rfc3339(value) {
            Ok(expiry) => Self::Fresh(expiry.with_timezone(&Utc) - now),
            Err(source) => Self::Unknown(UnknownReason::MalformedExpiry {
                value: value.to_string(),
                source,
            }),
        }
    }
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh(remaining) => f.write_str(&format_ttl(*remaining)),
            Self::Unknown(reason) => write!(f, "unknown ({reason})"),
        }
    }
}

/// Loads the token at `token_path` and asks Vault how long it has left.
///
/// Makes a single lookup attempt. A missing file or an empty one returns
/// without contacting Vault.
pub async fn evaluate<I>(introspector: &I, token_path: &Path) -> Freshness
where
    I: TokenIntrospection + ?Sized,
{
    match std::fs::metadata(token_path) {
        Ok(_) => {},
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return degraded(UnknownReason::Missing(token_path.to_path_buf()));
        },
        Err(e) => return degraded(UnknownReason::Unreadable(e)),
    }

    let token = match VaultToken::read_from(token_path) {
        Ok(Some(token)) => token,
        Ok(None) => return degraded(UnknownReason::Empty),
        Err(e) => return degraded(UnknownReason::Unreadable(e)),
    };

    let lookup = match introspector.lookup_self(&token).await {
        Ok(lookup) => lookup,
        Err(e) => return degraded(UnknownReason::LookupFailed(e)),
    };

    if let Some(name) = lookup.display_name() {
        debug!(display_name = name, policies = ?lookup.policies(), "Looked up token");
    }

    match Freshness::from_lookup(&lookup, Utc::now()) {
        Freshness::Unknown(reason) => degraded(reason),
        fresh => fresh,
    }
}

fn degraded(reason: UnknownReason) -> Freshness {
    match &reason {
        UnknownReason::Missing(path) => {
            debug!(path = %path.display(), "Token file does not exist");
        },
        UnknownReason::LookupFailed(e) if e.is_transport() => {
            warn!(error = %e, "Could not reach Vault to look up token");
        },
        other => warn!(reason = %other, "Token freshness unknown"),
    }
    Freshness::Unknown(reason)
}

/// Formats a signed TTL in whole seconds, e.g. `71h 59m 58s` or `-5m`.
#[must_use]
pub fn format_ttl(ttl: TimeDelta) -> String {
    let secs = ttl.num_seconds();
    let formatted = humantime::format_duration(Duration::from_secs(secs.unsigned_abs()));
    if secs < 0 {
        format!("-{formatted}")
    } else {
        formatted.to_string()
    }
}
