use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn tenant_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/current",
            get(handlers::get_current_tenant).patch(handlers::update_current_tenant),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

pub fn unit_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_units).post(handlers::create_unit))
        .route(
            "/{unit_id}",
            get(handlers::get_unit)
                .patch(handlers::update_unit)
                .delete(handlers::delete_unit),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route("/by-email", get(handlers::get_user_by_email))
        .route(
            "/{user_id}",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

pub fn service_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_services).post(handlers::create_service))
        .route(
            "/{service_id}",
            get(handlers::get_service)
                .patch(handlers::update_service)
                .delete(handlers::delete_service),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
