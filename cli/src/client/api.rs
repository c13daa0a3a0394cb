//! Vault API client implementation.

use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::auth::VaultToken;
use crate::client::middleware::VaultTokenMiddleware;
use crate::config::VaultConfig;
use crate::error::{RenewError, Result};

/// Address used when none is configured, matching the Vault CLI default.
pub const DEFAULT_VAULT_ADDR: &str = "https://127.0.0.1:8200";

const LOOKUP_SELF_PATH: &str = "v1/auth/token/lookup-self";

/// Token introspection against Vault (enables mocking in tests).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenIntrospection: Send + Sync {
    /// Looks up `token` using the token itself for authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if Vault is unreachable, rejects the token, or
    /// answers with a body that is not a lookup response.
    async fn lookup_self(&self, token: &VaultToken) -> Result<TokenLookup>;
}

/// Response of `GET /v1/auth/token/lookup-self`.
///
/// Only `data` is kept, as a raw map, so callers can tell a missing
/// `expire_time` from one of the wrong type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenLookup {
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

impl TokenLookup {
    /// The raw `expire_time` field.
    #[must_use]
    pub fn expire_time(&self) -> Option<&Value> {
        self.field("expire_time")
    }

    /// Human-readable token name, e.g. `oidc-jane@acme.com`.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.field("display_name").and_then(Value::as_str)
    }

    /// Policies attached to the token.
    #[must_use]
    pub fn policies(&self) -> Vec<&str> {
        self.field("policies")
            .and_then(Value::as_array)
            .map(|policies| policies.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(key))
    }
}

/// Unauthenticated Vault client bound to one address.
///
/// Holds no token. Use [`authenticated`](Self::authenticated) to get a
/// client context for a specific token.
#[derive(Debug, Clone)]
pub struct VaultClient {
    inner: Client,
    base_url: Url,
    address: String,
}

impl VaultClient {
    /// Create a new Vault client.
    ///
    /// An empty address falls back to [`DEFAULT_VAULT_ADDR`].
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let address = match config.address.trim() {
            "" => DEFAULT_VAULT_ADDR,
            addr => addr,
        };

        let mut base_url = Url::parse(address)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(RenewError::Config(format!(
                "Vault address '{address}' must use http or https"
            )));
        }
        // Keep any path prefix when joining API paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let inner = Client::builder()
            .user_agent(format!("vault-renew/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| RenewError::Config(format!("Cannot build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            base_url,
            address: address.to_string(),
        })
    }

    /// The Vault address as configured, for passing on to `vault login`.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Get the base URL API paths are joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns a fresh client context that authenticates with `token`.
    #[must_use]
    pub fn authenticated(&self, token: &VaultToken) -> AuthenticatedClient {
        let client = ClientBuilder::new(self.inner.clone())
            .with(VaultTokenMiddleware::new(token.clone()))
            .build();

        AuthenticatedClient {
            client,
            base_url: self.base_url.clone(),
        }
    }
}

#[async_trait]
impl TokenIntrospection for VaultClient {
    async fn lookup_self(&self, token: &VaultToken) -> Result<TokenLookup> {
        self.authenticated(token).lookup_self().await
    }
}

/// Vault client context carrying one token.
pub struct AuthenticatedClient {
    client: ClientWithMiddleware,
    base_url: Url,
}

impl AuthenticatedClient {
    /// Looks up the token this context authenticates with.
    ///
    /// # Errors
    ///
    /// Returns [`RenewError::ApiError`] for non-success responses and a
    /// transport or serialization error otherwise.
    pub async fn lookup_self(&self) -> Result<TokenLookup> {
        let url = self.base_url.join(LOOKUP_SELF_PATH)?;

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RenewError::ApiError {
                status,
                message: vault_error_message(&body),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Extracts Vault's `{"errors": [...]}` list from an error body.
fn vault_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct VaultErrors {
        #[serde(default)]
        errors: Vec<String>,
    }

    match serde_json::from_str::<VaultErrors>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed.errors.join("; "),
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => "Unknown error".to_string(),
    }
}
