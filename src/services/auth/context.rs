/*
 * Responsibility
 * - 検証済みトークンの claim set を handler に渡すための型
 * - middleware が request extensions に格納し、handler は参照のみ (変更不可)
 */
use serde_json::{Map, Value};

/// Decoded, verified claim set of the caller's token.
///
/// Exposes exactly the claims present in the signed token; there are no
/// setters, so handlers can read but not alter it.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationContext {
    claims: Map<String, Value>,
}

impl AuthorizationContext {
    pub(crate) fn new(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.claim("sub").and_then(Value::as_str)
    }

    /// String entries of the `permissions` claim, in token order.
    pub fn permissions(&self) -> Vec<&str> {
        match self.claim("permissions") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        has_permission(&self.claims, permission)
    }
}

pub(crate) fn has_permission(claims: &Map<String, Value>, permission: &str) -> bool {
    match claims.get("permissions") {
        Some(Value::Array(items)) => items.iter().any(|v| v.as_str() == Some(permission)),
        _ => false,
    }
}
