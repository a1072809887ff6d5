/*
 * Responsibility
 * - /drinks 系 CRUD handler
 * - 認可は route 側の permission gate で済んでいる (ここでは Authorized を受け取るだけ)
 * - 変更系は全件 (long 表現) を返す
 */
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::{
    api::v1::{
        dto::drinks::{
            CreateDrinkRequest, DrinksResponse, LongDrink, ShortDrink, UpdateDrinkRequest,
        },
        extractors::Authorized,
    },
    error::AppError,
    state::AppState,
};

// `/drinks/{id}` with a non-integer id is simply not a drink
fn drink_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::not_found("drink"))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(req)| req)
        .map_err(|e| AppError::unprocessable(e.body_text()))
}

async fn all_long(state: &AppState) -> Result<Json<DrinksResponse<LongDrink>>, AppError> {
    let drinks = state.drinks.list().await?;
    Ok(Json(DrinksResponse::from_drinks(drinks)))
}

pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<ShortDrink>>, AppError> {
    let drinks = state.drinks.list().await?;
    Ok(Json(DrinksResponse::from_drinks(drinks)))
}

pub async fn get_drinks_detail(
    State(state): State<AppState>,
    Authorized(ctx): Authorized,
) -> Result<Json<DrinksResponse<LongDrink>>, AppError> {
    tracing::debug!(sub = ctx.subject().unwrap_or("-"), "drinks detail");
    all_long(&state).await
}

pub async fn create_drink(
    State(state): State<AppState>,
    Authorized(ctx): Authorized,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<LongDrink>>, AppError> {
    let req = body(payload)?;
    req.validate().map_err(AppError::unprocessable)?;

    let (title, recipe) = req.into_parts();
    let drink = state.drinks.create(&title, &recipe).await?;
    tracing::info!(
        sub = ctx.subject().unwrap_or("-"),
        drink_id = drink.id,
        "drink created"
    );

    all_long(&state).await
}

pub async fn update_drink(
    State(state): State<AppState>,
    Authorized(ctx): Authorized,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<LongDrink>>, AppError> {
    let id = drink_id(path)?;
    let req = body(payload)?;
    req.validate().map_err(AppError::unprocessable)?;

    let (title, recipe) = req.into_parts();
    state
        .drinks
        .update(id, title.as_deref(), recipe.as_deref())
        .await?
        .ok_or(AppError::not_found("drink"))?;
    tracing::info!(sub = ctx.subject().unwrap_or("-"), drink_id = id, "drink updated");

    all_long(&state).await
}

pub async fn delete_drink(
    State(state): State<AppState>,
    Authorized(ctx): Authorized,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DrinksResponse<LongDrink>>, AppError> {
    let id = drink_id(path)?;

    if !state.drinks.delete(id).await? {
        return Err(AppError::not_found("drink"));
    }
    tracing::info!(sub = ctx.subject().unwrap_or("-"), drink_id = id, "drink deleted");

    all_long(&state).await
}
