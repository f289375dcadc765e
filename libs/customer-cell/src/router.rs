use axum::{middleware, routing::get, Router};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn customer_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_customers).post(handlers::create_customer))
        .route("/by-email", get(handlers::get_customer_by_email))
        .route(
            "/{customer_id}",
            get(handlers::get_customer)
                .patch(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
