//! Test helpers: an Ed25519 signer that publishes itself as a JWK.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use ed25519_dalek::SigningKey;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

use super::error::AuthError;
use super::keys::KeySetSource;

pub const TEST_ISSUER: &str = "https://coffee.test.auth/";
pub const TEST_AUDIENCE: &str = "coffeeshop";

pub struct TestSigner {
    kid: String,
    signing_key: SigningKey,
}

impl TestSigner {
    pub fn new(kid: &str) -> Self {
        Self::with_seed(kid, 1)
    }

    pub fn with_seed(kid: &str, seed: u8) -> Self {
        let mut bytes = [0u8; 32];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = seed.wrapping_mul(31).wrapping_add(i as u8);
        }

        Self {
            kid: kid.to_string(),
            signing_key: SigningKey::from_bytes(&bytes),
        }
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn jwk_json(&self) -> Value {
        json!({
            "kty": "OKP",
            "kid": self.kid,
            "crv": "Ed25519",
            "x": URL_SAFE_NO_PAD.encode(self.signing_key.verifying_key().to_bytes()),
            "alg": "EdDSA",
            "use": "sig",
        })
    }

    pub fn jwks_json(&self) -> Value {
        json!({ "keys": [self.jwk_json()] })
    }

    pub fn jwks(&self) -> JwkSet {
        serde_json::from_value(self.jwks_json()).unwrap()
    }

    /// Sign `claims` with this key, advertising `kid` in the header.
    pub fn sign(&self, claims: &Value) -> String {
        self.sign_with_kid(claims, Some(&self.kid))
    }

    pub fn sign_with_kid(&self, claims: &Value, kid: Option<&str>) -> String {
        let der = self.signing_key.to_pkcs8_der().unwrap();
        let encoding_key = EncodingKey::from_ed_der(der.as_bytes());

        let mut header = Header::new(Algorithm::EdDSA);
        header.typ = Some("JWT".to_string());
        header.kid = kid.map(str::to_string);

        jsonwebtoken::encode(&header, claims, &encoding_key).unwrap()
    }
}

/// Claims for a token that is valid for the next hour.
pub fn claims_with_permissions(permissions: &[&str]) -> Value {
    let now = jsonwebtoken::get_current_timestamp();
    json!({
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "sub": "auth0|barista-1",
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    })
}

/// Key source that always returns the same document.
pub struct StaticKeySet {
    jwks: JwkSet,
}

impl StaticKeySet {
    pub fn new(jwks: JwkSet) -> Self {
        Self { jwks }
    }
}

#[async_trait]
impl KeySetSource for StaticKeySet {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        Ok(self.jwks.clone())
    }
}
