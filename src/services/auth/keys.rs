//! Signer key set: fetching and caching the identity provider's JWKS.
//!
//! The key set is published at an operator-configured URL (typically
//! `<issuer>/.well-known/jwks.json`). `SignerKeyCache` keeps the last fetched
//! set for a bounded TTL and replaces it wholesale on refresh; readers hold an
//! `Arc` to the set they looked at, so a refresh never changes a set that is
//! being read.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use tokio::sync::RwLock;

use super::error::AuthError;

/// Where the signer key set comes from.
///
/// Implementations must be cheap to share (`Arc<dyn KeySetSource>`).
#[async_trait]
pub trait KeySetSource: Send + Sync {
    /// Fetch the current JWKS document.
    ///
    /// Any transport, status or parse failure is reported as `AuthError::KeyFetch`.
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// JWKS fetched over HTTP with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HttpJwksSource {
    jwks_url: String,
    http_client: reqwest::Client,
}

impl HttpJwksSource {
    pub fn new(jwks_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            jwks_url: jwks_url.into(),
            http_client,
        })
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }
}

#[async_trait]
impl KeySetSource for HttpJwksSource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        tracing::debug!(url = %self.jwks_url, "fetching signer key set");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::KeyFetch(format!(
                "jwks endpoint returned {status}"
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeyFetch(format!("invalid jwks document: {e}")))
    }
}

/// Verification keys indexed by key id.
#[derive(Clone, Default)]
pub struct SignerKeySet {
    keys: HashMap<String, DecodingKey>,
}

impl fmt::Debug for SignerKeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("SignerKeySet")
            .field("kids", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SignerKeySet {
    /// Build the set from a JWKS document.
    ///
    /// Keys without a `kid` cannot be selected by a token header and are
    /// skipped, as are keys whose material `jsonwebtoken` cannot load.
    pub fn from_jwks(jwks: &JwkSet) -> Self {
        let mut keys = HashMap::with_capacity(jwks.keys.len());

        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.as_deref() else {
                tracing::debug!("skipping jwk without kid");
                continue;
            };

            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid.to_string(), key);
                }
                Err(err) => {
                    tracing::warn!(kid = %kid, error = %err, "skipping unusable jwk");
                }
            }
        }

        Self { keys }
    }

    pub fn get(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

struct CachedKeySet {
    keys: Arc<SignerKeySet>,
    expires_at: Option<Instant>,
}

/// TTL cache in front of a `KeySetSource`.
///
/// A TTL of zero disables caching: every lookup fetches.
pub struct SignerKeyCache {
    source: Arc<dyn KeySetSource>,
    ttl: Duration,
    cached: RwLock<Option<CachedKeySet>>,
}

impl SignerKeyCache {
    pub fn new(source: Arc<dyn KeySetSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: RwLock::new(None),
        }
    }

    /// Current signer key set, fetching when the cache is empty or stale.
    pub async fn current(&self) -> Result<Arc<SignerKeySet>, AuthError> {
        if !self.ttl.is_zero() {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.as_ref()
                && entry.expires_at.is_none_or(|at| at > Instant::now())
            {
                return Ok(Arc::clone(&entry.keys));
            }
        }

        self.refresh().await
    }

    /// Fetch a fresh key set and swap it into the cache.
    pub async fn refresh(&self) -> Result<Arc<SignerKeySet>, AuthError> {
        let jwks = self.source.fetch().await?;
        let keys = Arc::new(SignerKeySet::from_jwks(&jwks));

        if keys.is_empty() {
            tracing::warn!("signer key set has no usable keys");
        } else {
            tracing::info!(key_count = keys.len(), "signer key set refreshed");
        }

        if !self.ttl.is_zero() {
            let now = Instant::now();
            let mut cached = self.cached.write().await;
            *cached = Some(CachedKeySet {
                keys: Arc::clone(&keys),
                // None: ttl too large to represent, never expires
                expires_at: now.checked_add(self.ttl),
            });
        }

        Ok(keys)
    }
}

impl fmt::Debug for SignerKeyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerKeyCache")
            .field("ttl", &self.ttl)
            .finish()
    }
}
