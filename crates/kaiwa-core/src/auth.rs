//! Credential acquisition and the group-membership gate.
//!
//! Token issuance and refresh belong to the enterprise identity
//! provider; this module only defines the seam the session pulls a
//! bearer token through, plus the client-side authorization gate that
//! mirrors what the gateway enforces. The gate decodes the token's
//! claims segment without verifying the signature; the gateway is the
//! enforcement point, this check just keeps unauthorized users out of
//! the chat surface.

use crate::config::Config;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::future::Future;
use std::io::{self, ErrorKind};

/// Source of bearer tokens for the gateway.
///
/// Called once per send; implementations are expected to refresh
/// transparently, and the session never caches what they return.
pub trait TokenProvider {
    fn access_token(&self) -> impl Future<Output = io::Result<String>> + Send;
}

/// Token provider backed by a pre-issued token from configuration or
/// the environment.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn from_config(config: &Config) -> io::Result<Self> {
        let token = config.resolve_token().ok_or_else(|| {
            io::Error::new(
                ErrorKind::NotFound,
                format!(
                    "No access token configured; set auth.token in config.toml or the {} environment variable",
                    config.auth.token_env
                ),
            )
        })?;
        Ok(Self::new(token))
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> io::Result<String> {
        Ok(self.token.clone())
    }
}

/// Decode the claims segment of a JWT. No signature verification.
pub fn decode_claims(token: &str) -> io::Result<serde_json::Value> {
    let payload = token.split('.').nth(1).ok_or_else(|| {
        io::Error::new(ErrorKind::InvalidData, "Access token is not a JWT")
    })?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|e| {
        io::Error::new(
            ErrorKind::InvalidData,
            format!("Invalid token payload encoding: {}", e),
        )
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            ErrorKind::InvalidData,
            format!("Invalid token claims: {}", e),
        )
    })
}

/// Group-membership gate over decoded claims.
///
/// Authorized iff the `groups` claim names at least one allowed group.
/// A token with a `hasgroups` overage marker (too many groups to embed)
/// is denied: membership would have to be resolved by directory lookup,
/// which this client does not do.
pub fn is_authorized(claims: &serde_json::Value, allowed_groups: &[String]) -> bool {
    if let Some(groups) = claims.get("groups").and_then(|v| v.as_array())
        && !groups.is_empty()
    {
        return groups
            .iter()
            .filter_map(|v| v.as_str())
            .any(|group| allowed_groups.iter().any(|allowed| allowed == group));
    }
    false
}
