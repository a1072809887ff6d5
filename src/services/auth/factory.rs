//! Factory: build the `AccessGuard` from application `Config`.
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::auth::{AccessGuard, GuardSettings, HttpJwksSource, SignerKeyCache};

pub fn build_access_guard(config: &Config) -> Result<Arc<AccessGuard>, reqwest::Error> {
    let source = HttpJwksSource::new(
        config.auth_jwks_url.as_str(),
        Duration::from_secs(config.auth_jwks_timeout_seconds),
    )?;

    tracing::info!(
        jwks_url = %source.jwks_url(),
        cache_ttl_seconds = config.auth_jwks_cache_ttl_seconds,
        "signer key set source configured"
    );

    let keys = SignerKeyCache::new(
        Arc::new(source),
        Duration::from_secs(config.auth_jwks_cache_ttl_seconds),
    );

    let settings = GuardSettings {
        issuer: config.auth_issuer.clone(),
        audience: config.auth_audience.clone(),
        algorithms: config.auth_algorithms.clone(),
        leeway_seconds: config.access_token_leeway_seconds,
    };

    Ok(Arc::new(AccessGuard::new(keys, settings)))
}
