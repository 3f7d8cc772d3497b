mod blocks;
mod error;
mod transactions;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};

use satstack_core::rpc::NodeRpc;
use satstack_core::NodeConfig;

// ==============================================================================
// Application State
// ==============================================================================

pub struct AppState {
    pub rpc: Arc<dyn NodeRpc>,
    pub config: NodeConfig,
}

type SharedState = Arc<AppState>;

// ==============================================================================
// Router
// ==============================================================================

pub fn build_router(state: AppState, cors_origin: Option<HeaderValue>) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/blockchain/v3/blocks/{reference}", get(blocks::get_block))
        .route(
            "/blockchain/v3/transactions/{hash}",
            get(transactions::get_transaction),
        )
        .fallback(route_not_found)
        .with_state(Arc::new(state));

    match cors_origin {
        // Only reflect the configured origin; any other Origin gets no CORS
        // headers at all.
        Some(allowed) => router.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(
                    move |request_origin: &HeaderValue, _| *request_origin == allowed,
                ))
                .allow_methods([Method::GET, Method::OPTIONS]),
        ),
        None => router,
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    chain: String,
    currency: String,
    pruned: bool,
    txindex: bool,
}

async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        chain: state.config.chain.clone(),
        currency: state.config.currency.clone(),
        pruned: state.config.pruned,
        txindex: state.config.tx_index,
    })
}

async fn route_not_found() -> error::AppError {
    error::AppError::NotFound("route not found".to_string())
}
