//! Authentication middleware for injecting the Vault token header.

use async_trait::async_trait;
use http::header::HeaderValue;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

use crate::auth::VaultToken;

/// Header Vault reads the client token from.
pub const VAULT_TOKEN_HEADER: &str = "x-vault-token";

/// Middleware that injects a fixed token into every request.
///
/// Each instance carries its own token; there is no shared, mutable
/// "current token" on the client.
pub struct VaultTokenMiddleware {
    token: VaultToken,
}

impl VaultTokenMiddleware {
    /// Create a middleware for `token`.
    #[must_use]
    pub const fn new(token: VaultToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl Middleware for VaultTokenMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        // Tokens with bytes that are illegal in a header are sent without one;
        // Vault then answers 403 like for any bad token.
        if let Ok(mut value) = HeaderValue::from_str(self.token.expose()) {
            value.set_sensitive(true);
            req.headers_mut().insert(VAULT_TOKEN_HEADER, value);
        } else {
            tracing::warn!("Token contains characters not allowed in an HTTP header");
        }

        next.run(req, extensions).await
    }
}
