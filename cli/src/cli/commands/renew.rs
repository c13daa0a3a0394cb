//! Token renewal command handler.
//!
//! Checks the cached token, runs the login only when it is close to expiry,
//! and checks again afterwards for the log. The login is attempted once.

use std::path::Path;

use chrono::TimeDelta;
use tracing::{debug, info, warn};

use crate::auth::{evaluate, format_ttl, Freshness};
use crate::client::{TokenIntrospection, VaultClient};
use crate::config::{LoginConfig, RenewSettings};
use crate::error::Result;
use crate::supervisor::{CommandSpec, SupervisionReport, Supervisor};

/// What a successful run did.
#[derive(Debug)]
pub enum RenewOutcome {
    /// The token had more than the minimum TTL left; no login was run.
    AlreadyFresh {
        /// Remaining validity at check time.
        remaining: TimeDelta,
    },
    /// The login ran and exited successfully.
    Renewed {
        /// Freshness before the login.
        previous: Freshness,
        /// Freshness after the login, for reporting only.
        current: Freshness,
        /// How the login process went.
        report: SupervisionReport,
    },
}

/// Handle a `vault-renew` run with resolved settings.
///
/// # Errors
///
/// Returns an error if the Vault client cannot be built, the login timeouts
/// are invalid, or the login fails.
pub async fn handle_renew(settings: &RenewSettings) -> Result<RenewOutcome> {
    let client = VaultClient::new(&settings.vault)?;
    let supervisor =
        Supervisor::new(settings.login.graceful_timeout, settings.login.kill_timeout)?;
    let login = login_command(&settings.login, client.address());
    debug!(
        base_url = %client.base_url(),
        token_path = %settings.token_path.display(),
        "Resolved settings"
    );

    run_renewal(
        &client,
        &supervisor,
        &login,
        &settings.token_path,
        settings.min_ttl,
    )
    .await
}

/// Builds `<program> login -method=<method> -address <address>`.
#[must_use]
pub fn login_command(login: &LoginConfig, address: &str) -> CommandSpec {
    CommandSpec::new(
        &login.program,
        [
            "login".to_string(),
            format!("-method={}", login.method),
            "-address".to_string(),
            address.to_string(),
        ],
    )
}

/// Evaluates the token and renews it with `login` if it has `min_ttl` or less left.
///
/// # Errors
///
/// Returns [`crate::error::RenewError::Supervisor`] if the login fails.
pub async fn run_renewal<I>(
    introspector: &I,
    supervisor: &Supervisor,
    login: &CommandSpec,
    token_path: &Path,
    min_ttl: TimeDelta,
) -> Result<RenewOutcome>
where
    I: TokenIntrospection + ?Sized,
{
    let previous = evaluate(introspector, token_path).await;
    if !previous.needs_renewal(min_ttl) {
        info!(ttl = %previous, "Token TTL is not expiring soon");
        return Ok(RenewOutcome::AlreadyFresh {
            remaining: previous.remaining(),
        });
    }

    info!(
        ttl = %previous,
        min_ttl = %format_ttl(min_ttl),
        command = %login,
        graceful_timeout = ?supervisor.graceful_timeout(),
        kill_timeout = ?supervisor.force_timeout(),
        "Token needs renewal, starting login"
    );
    let report = supervisor.supervise(login).await?;
    info!("Logged in successfully");

    let current = evaluate(introspector, token_path).await;
    if current.unknown_reason().is_some() {
        warn!(ttl = %current, "Login succeeded but the new token could not be verified");
    } else {
        info!(ttl = %current, "Current token TTL is now");
    }

    Ok(RenewOutcome::Renewed {
        previous,
        current,
        report,
    })
}
