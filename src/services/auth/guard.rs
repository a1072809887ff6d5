//! Access guard: bearer token -> verified claim set -> permission check.
//!
//! One linear pipeline per request:
//!
//! 1. extract the bearer token from `Authorization`
//! 2. load the signer key set (cached, see `keys`)
//! 3. decode the unverified header for `kid`
//! 4. pick the matching verification key
//! 5. verify signature, `exp`, `iss`, `aud`
//! 6. require the permission in the `permissions` claim
//!
//! Nothing is retried; the first failure is the result.

use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, Validation};
use serde_json::{Map, Value};

use super::bearer;
use super::context::{AuthorizationContext, has_permission};
use super::error::AuthError;
use super::keys::SignerKeyCache;

/// What a token must look like to be accepted.
#[derive(Debug, Clone)]
pub struct GuardSettings {
    pub issuer: String,
    pub audience: String,
    /// Accepted JWS algorithms. The token header's `alg` must be one of these.
    pub algorithms: Vec<Algorithm>,
    pub leeway_seconds: u64,
}

#[derive(Debug)]
pub struct AccessGuard {
    keys: SignerKeyCache,
    settings: GuardSettings,
}

impl AccessGuard {
    pub fn new(keys: SignerKeyCache, settings: GuardSettings) -> Self {
        Self { keys, settings }
    }

    /// Authorize a request for `required` permission.
    ///
    /// On success the caller receives the decoded claim set. Failures are
    /// logged with their kind before being returned.
    #[tracing::instrument(skip_all, fields(permission = %required))]
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        required: &str,
    ) -> Result<AuthorizationContext, AuthError> {
        match self.check(headers, required).await {
            Ok(ctx) => {
                tracing::debug!(sub = ctx.subject().unwrap_or("-"), "request authorized");
                Ok(ctx)
            }
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "authorization failed");
                Err(err)
            }
        }
    }

    async fn check(
        &self,
        headers: &HeaderMap,
        required: &str,
    ) -> Result<AuthorizationContext, AuthError> {
        let token = bearer::extract_token(headers)?;

        let keys = self.keys.current().await?;

        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| AuthError::MalformedToken(e.to_string()))?;
        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| AuthError::MalformedToken("token header has no kid".to_string()))?;

        let key = keys
            .get(kid)
            .ok_or_else(|| AuthError::UnknownSigningKey {
                kid: kid.to_string(),
            })?;

        if !self.settings.algorithms.contains(&header.alg) {
            return Err(AuthError::InvalidSignature(format!(
                "algorithm {:?} is not accepted",
                header.alg
            )));
        }

        let claims =
            jsonwebtoken::decode::<Map<String, Value>>(token, key, &self.validation(header.alg))?
                .claims;

        if !has_permission(&claims, required) {
            return Err(AuthError::PermissionDenied {
                required: required.to_string(),
            });
        }

        Ok(AuthorizationContext::new(claims))
    }

    fn validation(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);
        validation.set_issuer(&[self.settings.issuer.as_str()]);
        validation.set_audience(&[self.settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = self.settings.leeway_seconds;
        validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::keys::KeySetSource;
    use crate::services::auth::testutil::{
        StaticKeySet, TEST_AUDIENCE, TEST_ISSUER, TestSigner, claims_with_permissions,
    };
    use async_trait::async_trait;
    use axum::http::{HeaderValue, StatusCode, header};
    use jsonwebtoken::jwk::JwkSet;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn settings(algorithms: Vec<Algorithm>) -> GuardSettings {
        GuardSettings {
            issuer: TEST_ISSUER.to_string(),
            audience: TEST_AUDIENCE.to_string(),
            algorithms,
            leeway_seconds: 60,
        }
    }

    fn guard_for(signer: &TestSigner) -> AccessGuard {
        let source = Arc::new(StaticKeySet::new(signer.jwks()));
        AccessGuard::new(
            SignerKeyCache::new(source, Duration::from_secs(60)),
            settings(vec![Algorithm::EdDSA]),
        )
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn grants_listed_permission() {
        let signer = TestSigner::new("key-1");
        let guard = guard_for(&signer);
        let token = signer.sign(&claims_with_permissions(&[
            "get:drinks-detail",
            "post:drinks",
        ]));

        let ctx = guard
            .authorize(&bearer(&token), "get:drinks-detail")
            .await
            .unwrap();

        assert!(ctx.permissions().contains(&"get:drinks-detail"));
        assert_eq!(ctx.subject(), Some("auth0|barista-1"));
    }

    #[tokio::test]
    async fn context_exposes_exactly_the_signed_claims() {
        let signer = TestSigner::new("key-1");
        let guard = guard_for(&signer);
        let mut claims = claims_with_permissions(&["post:drinks"]);
        claims["nickname"] = json!("barista");
        let token = signer.sign(&claims);

        let ctx = guard.authorize(&bearer(&token), "post:drinks").await.unwrap();

        assert_eq!(&Value::Object(ctx.claims().clone()), &claims);
    }

    #[tokio::test]
    async fn missing_permission_is_forbidden() {
        let signer = TestSigner::new("key-1");
        let guard = guard_for(&signer);
        let token = signer.sign(&claims_with_permissions(&["get:drinks-detail"]));

        let err = guard
            .authorize(&bearer(&token), "delete:drinks")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::PermissionDenied { .. }), "{err:?}");
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn token_without_permissions_claim_is_forbidden() {
        let signer = TestSigner::new("key-1");
        let guard = guard_for(&signer);
        let mut claims = claims_with_permissions(&[]);
        claims.as_object_mut().unwrap().remove("permissions");
        let token = signer.sign(&claims);

        let err = guard
            .authorize(&bearer(&token), "get:drinks-detail")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::PermissionDenied { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn permissions_claim_must_be_a_list() {
        let signer = TestSigner::new("key-1");
        let guard = guard_for(&signer);
        let mut claims = claims_with_permissions(&[]);
        claims["permissions"] = json!({ "get:drinks-detail": true });
        let token = signer.sign(&claims);

        let err = guard
            .authorize(&bearer(&token), "get:drinks-detail")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::PermissionDenied { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn missing_header() {
        let guard = guard_for(&TestSigner::new("key-1"));

        let err = guard
            .authorize(&HeaderMap::new(), "get:drinks-detail")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::MissingHeader));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_header() {
        let signer = TestSigner::new("key-1");
        let guard = guard_for(&signer);
        let token = signer.sign(&claims_with_permissions(&["get:drinks-detail"]));

        for value in [
            format!("Basic {token}"),
            "Bearer".to_string(),
            format!("Bearer {token} extra"),
        ] {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());

            let err = guard
                .authorize(&headers, "get:drinks-detail")
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::MalformedHeader), "{value}: {err:?}");
        }
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        let guard = guard_for(&TestSigner::new("key-1"));

        let err = guard
            .authorize(&bearer("eyInvalid"), "get:drinks-detail")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::MalformedToken(_)), "{err:?}");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_without_kid_is_malformed() {
        let signer = TestSigner::new("key-1");
        let guard = guard_for(&signer);
        let token = signer.sign_with_kid(&claims_with_permissions(&["post:drinks"]), None);

        let err = guard
            .authorize(&bearer(&token), "post:drinks")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::MalformedToken(_)), "{err:?}");
    }

    #[tokio::test]
    async fn unknown_kid() {
        let published = TestSigner::new("key-1");
        let guard = guard_for(&published);
        let stranger = TestSigner::with_seed("key-2", 7);
        let token = stranger.sign(&claims_with_permissions(&["post:drinks"]));

        let err = guard
            .authorize(&bearer(&token), "post:drinks")
            .await
            .unwrap_err();

        assert!(
            matches!(&err, AuthError::UnknownSigningKey { kid } if kid == "key-2"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn forged_signature() {
        let published = TestSigner::new("key-1");
        let guard = guard_for(&published);
        // different key material claiming the published kid
        let forger = TestSigner::with_seed(published.kid(), 42);
        let token = forger.sign(&claims_with_permissions(&["post:drinks"]));

        let err = guard
            .authorize(&bearer(&token), "post:drinks")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidSignature(_)), "{err:?}");
    }

    #[tokio::test]
    async fn expired_token() {
        let signer = TestSigner::new("key-1");
        let guard = guard_for(&signer);
        let mut claims = claims_with_permissions(&["post:drinks"]);
        let now = jsonwebtoken::get_current_timestamp();
        claims["iat"] = json!(now - 7200);
        claims["exp"] = json!(now - 3600);
        let token = signer.sign(&claims);

        let err = guard
            .authorize(&bearer(&token), "post:drinks")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::TokenExpired), "{err:?}");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_audience_or_issuer() {
        let signer = TestSigner::new("key-1");
        let guard = guard_for(&signer);

        let mut wrong_aud = claims_with_permissions(&["post:drinks"]);
        wrong_aud["aud"] = json!("teashop");
        let mut wrong_iss = claims_with_permissions(&["post:drinks"]);
        wrong_iss["iss"] = json!("https://evil.example/");
        let mut no_aud = claims_with_permissions(&["post:drinks"]);
        no_aud.as_object_mut().unwrap().remove("aud");

        for claims in [wrong_aud, wrong_iss, no_aud] {
            let token = signer.sign(&claims);
            let err = guard
                .authorize(&bearer(&token), "post:drinks")
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::InvalidClaims(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn algorithm_outside_allow_list() {
        let signer = TestSigner::new("key-1");
        let source = Arc::new(StaticKeySet::new(signer.jwks()));
        let guard = AccessGuard::new(
            SignerKeyCache::new(source, Duration::from_secs(60)),
            settings(vec![Algorithm::RS256]),
        );
        let token = signer.sign(&claims_with_permissions(&["post:drinks"]));

        let err = guard
            .authorize(&bearer(&token), "post:drinks")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::InvalidSignature(_)), "{err:?}");
    }

    struct UnreachableKeys;

    #[async_trait]
    impl KeySetSource for UnreachableKeys {
        async fn fetch(&self) -> Result<JwkSet, AuthError> {
            Err(AuthError::KeyFetch("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn key_fetch_failure() {
        let signer = TestSigner::new("key-1");
        let guard = AccessGuard::new(
            SignerKeyCache::new(Arc::new(UnreachableKeys), Duration::from_secs(60)),
            settings(vec![Algorithm::EdDSA]),
        );
        let token = signer.sign(&claims_with_permissions(&["post:drinks"]));

        let err = guard
            .authorize(&bearer(&token), "post:drinks")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::KeyFetch(_)), "{err:?}");
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
