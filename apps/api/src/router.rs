use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use customer_cell::router::customer_routes;
use notification_cell::router::notification_routes;
use organization_cell::router::{service_routes, tenant_routes, unit_routes, user_routes};
use professional_cell::router::professional_routes;
use shared_utils::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Booking API is running!" }))
        .route("/health", get(health))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/tenants", tenant_routes(state.clone()))
        .nest("/units", unit_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/services", service_routes(state.clone()))
        .nest("/customers", customer_routes(state.clone()))
        .nest("/professionals", professional_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/notifications", notification_routes(state))
}
