//! Web server adapter.
//!
//! Exposes the entity operations as JSON procedures. Queries are `GET`
//! (single-entity lookups take `?id=`), mutations are `POST` with a JSON body.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::ports::store_port::StorePort;

pub struct AppState {
    pub store: Arc<dyn StorePort + Send + Sync>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(handlers::healthcheck))
        .route("/createProgram", post(handlers::create_program))
        .route("/getPrograms", get(handlers::get_programs))
        .route("/getProgram", get(handlers::get_program))
        .route("/updateProgram", post(handlers::update_program))
        .route("/deleteProgram", post(handlers::delete_program))
        .route("/createAsset", post(handlers::create_asset))
        .route("/getAssets", get(handlers::get_assets))
        .route("/getAsset", get(handlers::get_asset))
        .route("/updateAsset", post(handlers::update_asset))
        .route("/deleteAsset", post(handlers::delete_asset))
        .route("/createTrade", post(handlers::create_trade))
        .route("/getTrades", get(handlers::get_trades))
        .route("/getTrade", get(handlers::get_trade))
        .route("/updateTrade", post(handlers::update_trade))
        .route("/deleteTrade", post(handlers::delete_trade))
        .fallback(handlers::not_found)
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
