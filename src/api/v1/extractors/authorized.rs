use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{AuthError, AuthorizationContext};
use crate::state::AppState;

/// Handler で AuthorizationContext を受け取るための extractor
/// permission gate (middleware::auth::access) が extensions に insert 済みである前提
/// 見つからない場合は 401 (gate が route に掛かっていない)
pub struct Authorized(pub AuthorizationContext);

impl FromRequestParts<AppState> for Authorized {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthorizationContext>()
            .cloned()
            .map(Authorized)
            .ok_or_else(|| {
                tracing::error!("Authorized extractor used on a route without a permission gate");
                AppError::Auth(AuthError::MissingHeader)
            })
    }
}
