use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn notification_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::create_notification))
        .route("/pending", get(handlers::list_pending))
        .route("/{notification_id}", patch(handlers::update_notification))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
