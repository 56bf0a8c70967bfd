//! HTTP request handlers for web adapter.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use std::sync::Arc;

use crate::domain::asset::{Asset, CreateAssetInput, UpdateAssetInput};
use crate::domain::error::TradebookError;
use crate::domain::program::{CreateProgramInput, Program, UpdateProgramInput};
use crate::domain::status::{DeleteOutcome, HealthStatus, IdInput};
use crate::domain::trade::{CreateTradeInput, Trade, TradeWithAssets, UpdateTradeInput};
use crate::ports::store_port::StorePort;

use super::{AppState, WebError};

type Store = dyn StorePort + Send + Sync;

/// Runs a store call on the blocking pool; SQLite calls never run on the
/// async workers.
async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, WebError>
where
    T: Send + 'static,
    F: FnOnce(&Store) -> Result<T, TradebookError> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || op(store.as_ref()))
        .await
        .map_err(|e| WebError::internal(e.to_string()))?
        .map_err(WebError::from)
}

pub async fn healthcheck() -> Json<HealthStatus> {
    Json(HealthStatus::ok())
}

pub async fn not_found() -> WebError {
    WebError::not_found("unknown procedure")
}

pub async fn create_program(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateProgramInput>, JsonRejection>,
) -> Result<Json<Program>, WebError> {
    let Json(input) = payload?;
    with_store(&state, move |store| store.create_program(&input))
        .await
        .map(Json)
}

pub async fn get_programs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Program>>, WebError> {
    with_store(&state, |store| store.list_programs())
        .await
        .map(Json)
}

pub async fn get_program(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdInput>, QueryRejection>,
) -> Result<Json<Option<Program>>, WebError> {
    let Query(IdInput { id }) = query?;
    with_store(&state, move |store| store.get_program(id))
        .await
        .map(Json)
}

pub async fn update_program(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateProgramInput>, JsonRejection>,
) -> Result<Json<Option<Program>>, WebError> {
    let Json(input) = payload?;
    with_store(&state, move |store| store.update_program(&input))
        .await
        .map(Json)
}

pub async fn delete_program(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IdInput>, JsonRejection>,
) -> Result<Json<DeleteOutcome>, WebError> {
    let Json(IdInput { id }) = payload?;
    with_store(&state, move |store| store.delete_program(id))
        .await
        .map(Json)
}

pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAssetInput>, JsonRejection>,
) -> Result<Json<Asset>, WebError> {
    let Json(input) = payload?;
    with_store(&state, move |store| store.create_asset(&input))
        .await
        .map(Json)
}

pub async fn get_assets(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Asset>>, WebError> {
    with_store(&state, |store| store.list_assets())
        .await
        .map(Json)
}

pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdInput>, QueryRejection>,
) -> Result<Json<Option<Asset>>, WebError> {
    let Query(IdInput { id }) = query?;
    with_store(&state, move |store| store.get_asset(id))
        .await
        .map(Json)
}

pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateAssetInput>, JsonRejection>,
) -> Result<Json<Option<Asset>>, WebError> {
    let Json(input) = payload?;
    with_store(&state, move |store| store.update_asset(&input))
        .await
        .map(Json)
}

pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IdInput>, JsonRejection>,
) -> Result<Json<DeleteOutcome>, WebError> {
    let Json(IdInput { id }) = payload?;
    with_store(&state, move |store| store.delete_asset(id))
        .await
        .map(Json)
}

pub async fn create_trade(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTradeInput>, JsonRejection>,
) -> Result<Json<Trade>, WebError> {
    let Json(input) = payload?;
    with_store(&state, move |store| store.create_trade(&input))
        .await
        .map(Json)
}

pub async fn get_trades(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Trade>>, WebError> {
    with_store(&state, |store| store.list_trades())
        .await
        .map(Json)
}

pub async fn get_trade(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdInput>, QueryRejection>,
) -> Result<Json<Option<TradeWithAssets>>, WebError> {
    let Query(IdInput { id }) = query?;
    with_store(&state, move |store| store.get_trade(id))
        .await
        .map(Json)
}

pub async fn update_trade(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateTradeInput>, JsonRejection>,
) -> Result<Json<Option<Trade>>, WebError> {
    let Json(input) = payload?;
    with_store(&state, move |store| store.update_trade(&input))
        .await
        .map(Json)
}

pub async fn delete_trade(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IdInput>, JsonRejection>,
) -> Result<Json<DeleteOutcome>, WebError> {
    let Json(IdInput { id }) = payload?;
    with_store(&state, move |store| store.delete_trade(id))
        .await
        .map(Json)
}
