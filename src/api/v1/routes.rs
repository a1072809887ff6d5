/*
 * Responsibility
 * - URL 構造を定義
 * - permission が必要な route には access::require で gate を掛ける (route ごとに明示)
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::v1::handlers::{
    drinks::{create_drink, delete_drink, get_drinks_detail, list_drinks, update_drink},
    health::health,
};
use crate::middleware::auth::access;
use crate::state::AppState;

pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
pub const POST_DRINKS: &str = "post:drinks";
pub const PATCH_DRINKS: &str = "patch:drinks";
pub const DELETE_DRINKS: &str = "delete:drinks";

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/drinks",
            get(list_drinks).merge(access::require(post(create_drink), state, POST_DRINKS)),
        )
        .route(
            "/drinks-detail",
            access::require(get(get_drinks_detail), state, GET_DRINKS_DETAIL),
        )
        .route(
            "/drinks/{id}",
            access::require(patch(update_drink), state, PATCH_DRINKS).merge(access::require(
                delete(delete_drink),
                state,
                DELETE_DRINKS,
            )),
        )
}
