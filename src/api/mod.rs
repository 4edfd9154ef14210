pub mod assignments;
pub mod health;
pub mod journal;
pub mod performance;
pub mod positions;
pub mod prices;

use crate::config::Config;
use crate::db::Repository;
use crate::orchestration::AssignmentOrchestrator;
use crate::prices::PriceSource;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub orchestrator: Arc<AssignmentOrchestrator>,
    pub prices: Arc<dyn PriceSource>,
}

impl AppState {
    pub fn new(
        repo: Arc<Repository>,
        config: Config,
        orchestrator: Arc<AssignmentOrchestrator>,
        prices: Arc<dyn PriceSource>,
    ) -> Self {
        Self {
            repo,
            config,
            orchestrator,
            prices,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/v1/positions",
            get(positions::list_positions).post(positions::create_position),
        )
        .route(
            "/v1/positions/:id",
            get(positions::get_position)
                .put(positions::update_plan)
                .delete(positions::delete_position),
        )
        .route("/v1/positions/:id/trades", post(positions::append_trade))
        .route(
            "/v1/positions/:id/performance",
            get(performance::get_performance),
        )
        .route("/v1/positions/:id/review", get(performance::get_review))
        .route(
            "/v1/positions/:id/events",
            get(assignments::list_position_events),
        )
        .route(
            "/v1/assignments/preview",
            post(assignments::preview_assignment),
        )
        .route("/v1/assignments", post(assignments::complete_assignment))
        .route(
            "/v1/journal",
            get(journal::list_entries).post(journal::create_entry),
        )
        .route("/v1/prices", put(prices::upsert_price))
        .layer(cors)
        .with_state(state)
}
