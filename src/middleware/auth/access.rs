//! Permission gate: AccessGuard を handler の前に合成し、AuthorizationContext を extensions に入れる
//!
//! - route ごとに必要な permission を明示的に指定する (グローバル登録はしない)
//! - 失敗時は AuthError をそのまま返す (401 / 403 + {success, code, description})
//! - 成功時は handler が `Authorized` extractor で context を受け取る

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::error::AppError;
use crate::services::auth::AccessGuard;
use crate::state::AppState;

#[derive(Clone)]
struct PermissionGate {
    guard: Arc<AccessGuard>,
    permission: &'static str,
}

/// Require `permission` for every method registered on `route`.
///
/// 例：
/// ```ignore
/// .route("/drinks-detail", access::require(get(get_drinks_detail), &state, "get:drinks-detail"))
/// ```
pub fn require(
    route: MethodRouter<AppState>,
    state: &AppState,
    permission: &'static str,
) -> MethodRouter<AppState> {
    let gate = PermissionGate {
        guard: Arc::clone(&state.guard),
        permission,
    };
    // route_layer: 未登録 method は 405 のまま (認証を先に走らせない)
    route.route_layer(middleware::from_fn_with_state(gate, access_middleware))
}

async fn access_middleware(
    State(gate): State<PermissionGate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let ctx = gate.guard.authorize(req.headers(), gate.permission).await?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
