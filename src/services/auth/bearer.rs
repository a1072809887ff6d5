//! `Authorization: Bearer <token>` header parsing.

use axum::http::{HeaderMap, header};

use super::error::AuthError;

const BEARER_SCHEME: &str = "bearer";

/// Extract the raw token from the `Authorization` header.
///
/// The header must consist of exactly two whitespace-separated parts, and the
/// first must be the bearer scheme (compared case-insensitively).
pub fn extract_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Ok(token)
        }
        _ => Err(AuthError::MalformedHeader),
    }
}
