/*
 * Responsibility
 * - Access Guard が返す失敗の種類 (AuthError)
 * - 種類ごとの HTTP status / caller 向け code, description
 * - IntoResponse 実装 ({success: false, code, description})
 *
 * Notes
 * - 種類 (kind) は tracing で区別できるように全て別 variant にする
 * - caller には code/description のみ返す (内部の詳細は返さない)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Authorization failure produced by the access guard.
///
/// Every variant is terminal for the request. `PermissionDenied` means the
/// caller's identity was established but lacks rights (403); every other
/// variant means identity could not be established (401).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is missing")]
    MissingHeader,
    #[error("authorization header is malformed")]
    MalformedHeader,
    #[error("token is malformed: {0}")]
    MalformedToken(String),
    #[error("signer key set could not be fetched: {0}")]
    KeyFetch(String),
    #[error("no signing key matches kid '{kid}'")]
    UnknownSigningKey { kid: String },
    #[error("token expired")]
    TokenExpired,
    #[error("token claims are invalid: {0}")]
    InvalidClaims(String),
    #[error("token signature is invalid: {0}")]
    InvalidSignature(String),
    #[error("permission '{required}' not granted")]
    PermissionDenied { required: String },
}

/// Caller-facing body, serialized verbatim by the boundary layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthErrorBody {
    pub success: bool,
    pub code: &'static str,
    pub description: &'static str,
}

impl AuthError {
    /// Stable name of the failure kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::MalformedHeader => "malformed_header",
            Self::MalformedToken(_) => "malformed_token",
            Self::KeyFetch(_) => "key_fetch_error",
            Self::UnknownSigningKey { .. } => "unknown_signing_key",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims(_) => "invalid_claims",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::PermissionDenied { .. } => "permission_denied",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "authorization_header_missing",
            Self::MalformedHeader | Self::UnknownSigningKey { .. } => "invalid_header",
            Self::MalformedToken(_) => "invalid_token",
            Self::KeyFetch(_) => "key_set_unavailable",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims(_) => "invalid_claims",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::PermissionDenied { .. } => "forbidden",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingHeader => "Authorization header is expected.",
            Self::MalformedHeader => "Authorization header must be a bearer token.",
            Self::MalformedToken(_) => "Unable to parse authentication token.",
            Self::KeyFetch(_) => "Unable to fetch token verification keys.",
            Self::UnknownSigningKey { .. } => "Unable to find the appropriate key.",
            Self::TokenExpired => "Token expired.",
            Self::InvalidClaims(_) => "Incorrect claims. Please, check the audience and issuer.",
            Self::InvalidSignature(_) => "Token signature could not be verified.",
            Self::PermissionDenied { .. } => "Permission not found.",
        }
    }

    pub fn body(&self) -> AuthErrorBody {
        AuthErrorBody {
            success: false,
            code: self.code(),
            description: self.description(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => Self::InvalidClaims(e.to_string()),
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::MalformedToken(e.to_string()),
            // signature, algorithm and key-material failures
            _ => Self::InvalidSignature(e.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
