//! HTTP routes. Every `/api` route except registration and login
//! requires a bearer token.

mod auth;
mod catalog;
mod chart;
mod members;
mod training;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth::routes())
        .merge(chart::routes())
        .merge(catalog::routes())
        .merge(members::routes())
        .merge(training::routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
