use axum::{
    middleware,
    routing::{get, patch},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn professional_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_professionals).post(handlers::create_professional))
        .route(
            "/{professional_id}",
            get(handlers::get_professional)
                .patch(handlers::update_professional)
                .delete(handlers::delete_professional),
        )
        .route("/{professional_id}/slots", get(handlers::get_professional_slots))
        .route(
            "/{professional_id}/schedule-rules",
            get(handlers::list_schedule_rules).post(handlers::create_schedule_rule),
        )
        .route(
            "/{professional_id}/schedule-rules/{rule_id}",
            patch(handlers::update_schedule_rule).delete(handlers::delete_schedule_rule),
        )
        .route(
            "/{professional_id}/time-off",
            get(handlers::list_time_off).post(handlers::create_time_off),
        )
        .route(
            "/{professional_id}/time-off/{time_off_id}",
            patch(handlers::update_time_off).delete(handlers::delete_time_off),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
