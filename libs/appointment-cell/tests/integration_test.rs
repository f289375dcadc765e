use assert_matches::assert_matches;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AppointmentError, AppointmentStatus, CreateAppointmentRequest};
use appointment_cell::router::appointment_routes;
use appointment_cell::services::BookingService;
use shared_database::SupabaseClient;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

const START: &str = "2024-05-06T12:00:00Z";
const END: &str = "2024-05-06T12:30:00Z";

struct Fixture {
    server: MockServer,
    config: TestConfig,
    tenant_id: Uuid,
    unit_id: String,
    professional_id: String,
    service_id: String,
    token: String,
}

impl Fixture {
    async fn new() -> Self {
        let server = MockServer::start().await;
        let config = TestConfig::with_url(&server.uri());
        let tenant_id = Uuid::new_v4();
        let token = JwtTestUtils::create_test_token(&TestUser::reception(tenant_id), &config.jwt_secret, Some(1));

        Self {
            server,
            config,
            tenant_id,
            unit_id: Uuid::new_v4().to_string(),
            professional_id: Uuid::new_v4().to_string(),
            service_id: Uuid::new_v4().to_string(),
            token,
        }
    }

    fn appointment(&self, id: &str, start: &str, end: &str, status: &str) -> Value {
        MockSupabaseResponses::appointment_response(
            id,
            &self.tenant_id.to_string(),
            &self.unit_id,
            &self.professional_id,
            &self.service_id,
            start,
            end,
            status,
        )
    }

    fn booking(&self, key: Option<&str>) -> Value {
        json!({
            "unit_id": self.unit_id,
            "customer_id": Uuid::new_v4(),
            "professional_id": self.professional_id,
            "service_id": self.service_id,
            "start": START,
            "idempotency_key": key
        })
    }

    async fn mount_service(&self, duration_min: u32) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/services"))
            .and(query_param("id", format!("eq.{}", self.service_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                MockSupabaseResponses::service_response(&self.service_id, &self.tenant_id.to_string(), duration_min)
            ])))
            .mount(&self.server)
            .await;
    }

    async fn mount_conflicts(&self, rows: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/appointments"))
            .and(query_param("professional_id", format!("eq.{}", self.professional_id)))
            .and(query_param("status", "not.in.(cancelled,no_show)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.server)
            .await;
    }

    /// The first lookup under `key` finds nothing, later ones find `stored`.
    async fn mount_key_race(&self, key: &str, stored: Value) {
        Mock::given(method("GET"))
            .and(path("/rest/v1/appointments"))
            .and(query_param("idempotency_key", format!("eq.{}", key)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/appointments"))
            .and(query_param("idempotency_key", format!("eq.{}", key)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored])))
            .mount(&self.server)
            .await;
    }

    fn supabase(&self) -> Arc<SupabaseClient> {
        Arc::new(SupabaseClient::new(&self.config.to_app_config()))
    }

    fn request(&self, http_method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(http_method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", self.token));
        match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn same_idempotency_key_books_once() {
    let fx = Fixture::new().await;
    let appointment_id = Uuid::new_v4().to_string();
    let stored = fx.appointment(&appointment_id, START, END, "pending");

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("idempotency_key", "eq.booking-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&fx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("idempotency_key", "eq.booking-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored.clone()])))
        .mount(&fx.server)
        .await;
    fx.mount_service(30).await;
    fx.mount_conflicts(json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "start": START,
            "end": END,
            "status": "pending",
            "source": "web",
            "price_estimate": 120.0,
            "idempotency_key": "booking-123"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([stored])))
        .expect(1)
        .mount(&fx.server)
        .await;

    let app = appointment_routes(fx.config.to_state());

    let first = app
        .clone()
        .oneshot(fx.request("POST", "/", Some(fx.booking(Some("booking-123")))))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;

    let second = app
        .oneshot(fx.request("POST", "/", Some(fx.booking(Some("booking-123")))))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    let second = body_json(second).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["id"], appointment_id.as_str());
}

#[tokio::test]
async fn overlapping_booking_is_rejected_before_insert() {
    let fx = Fixture::new().await;
    fx.mount_service(30).await;
    fx.mount_conflicts(json!([fx.appointment(
        &Uuid::new_v4().to_string(),
        "2024-05-06T12:15:00Z",
        "2024-05-06T12:45:00Z",
        "confirmed"
    )]))
    .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&fx.server)
        .await;

    let app = appointment_routes(fx.config.to_state());
    let response = app.oneshot(fx.request("POST", "/", Some(fx.booking(None)))).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn exclusion_violation_maps_to_conflict() {
    let fx = Fixture::new().await;
    fx.mount_service(30).await;
    fx.mount_conflicts(json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockSupabaseResponses::error_response(
            "conflicting key value violates exclusion constraint \"appointments_no_overlap\"",
            "23P01",
        )))
        .mount(&fx.server)
        .await;

    let app = appointment_routes(fx.config.to_state());
    let response = app.oneshot(fx.request("POST", "/", Some(fx.booking(None)))).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("already booked"));
}

#[tokio::test]
async fn concurrent_duplicate_key_returns_stored_row() {
    let fx = Fixture::new().await;
    let appointment_id = Uuid::new_v4().to_string();
    fx.mount_key_race("retry-1", fx.appointment(&appointment_id, START, END, "pending"))
        .await;
    fx.mount_service(30).await;
    fx.mount_conflicts(json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockSupabaseResponses::error_response(
            "duplicate key value violates unique constraint \"appointments_idempotency_key_key\"",
            "23505",
        )))
        .expect(1)
        .mount(&fx.server)
        .await;

    let request: CreateAppointmentRequest = serde_json::from_value(fx.booking(Some("retry-1"))).unwrap();
    let outcome = BookingService::new(fx.supabase())
        .create_appointment(fx.tenant_id, request, "token")
        .await
        .unwrap();

    assert!(outcome.is_replay());
    assert_eq!(outcome.into_inner().id.to_string(), appointment_id);
}

#[tokio::test]
async fn twin_found_by_conflict_check_is_replayed() {
    let fx = Fixture::new().await;
    let appointment_id = Uuid::new_v4().to_string();
    let twin = fx.appointment(&appointment_id, START, END, "pending");
    fx.mount_key_race("retry-2", twin.clone()).await;
    fx.mount_service(30).await;
    fx.mount_conflicts(json!([twin])).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&fx.server)
        .await;

    let request: CreateAppointmentRequest = serde_json::from_value(fx.booking(Some("retry-2"))).unwrap();
    let outcome = BookingService::new(fx.supabase())
        .create_appointment(fx.tenant_id, request, "token")
        .await
        .unwrap();

    assert!(outcome.is_replay());
    assert_eq!(outcome.into_inner().id.to_string(), appointment_id);
}

#[tokio::test]
async fn twin_rejected_by_exclusion_constraint_is_replayed() {
    let fx = Fixture::new().await;
    let appointment_id = Uuid::new_v4().to_string();
    fx.mount_key_race("retry-3", fx.appointment(&appointment_id, START, END, "pending"))
        .await;
    fx.mount_service(30).await;
    fx.mount_conflicts(json!([])).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockSupabaseResponses::error_response(
            "conflicting key value violates exclusion constraint \"appointments_no_overlap\"",
            "23P01",
        )))
        .expect(1)
        .mount(&fx.server)
        .await;

    let app = appointment_routes(fx.config.to_state());
    let response = app
        .oneshot(fx.request("POST", "/", Some(fx.booking(Some("retry-3")))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], appointment_id.as_str());
}

#[tokio::test]
async fn keyed_booking_over_someone_else_stays_a_conflict() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("idempotency_key", "eq.fresh-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&fx.server)
        .await;
    fx.mount_service(30).await;
    fx.mount_conflicts(json!([fx.appointment(
        &Uuid::new_v4().to_string(),
        "2024-05-06T12:15:00Z",
        "2024-05-06T12:45:00Z",
        "confirmed"
    )]))
    .await;

    let request: CreateAppointmentRequest = serde_json::from_value(fx.booking(Some("fresh-key"))).unwrap();
    let result = BookingService::new(fx.supabase())
        .create_appointment(fx.tenant_id, request, "token")
        .await;

    assert_matches!(result, Err(AppointmentError::Conflict { .. }));
}

#[tokio::test]
async fn booking_without_customer_never_reaches_storage() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&fx.server)
        .await;

    let mut body = fx.booking(None);
    body.as_object_mut().unwrap().remove("customer_id");

    let app = appointment_routes(fx.config.to_state());
    let response = app.oneshot(fx.request("POST", "/", Some(body))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "customer_id");
}

#[tokio::test]
async fn moving_an_appointment_checks_conflicts_without_itself() {
    let fx = Fixture::new().await;
    let appointment_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([fx.appointment(
            &appointment_id,
            START,
            END,
            "confirmed"
        )])))
        .mount(&fx.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("neq.{}", appointment_id)))
        .and(query_param("start", "lt.2024-05-06T13:30:00Z"))
        .and(query_param("end", "gt.2024-05-06T13:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&fx.server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "start": "2024-05-06T13:00:00Z",
            "end": "2024-05-06T13:30:00Z"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([fx.appointment(
            &appointment_id,
            "2024-05-06T13:00:00Z",
            "2024-05-06T13:30:00Z",
            "confirmed"
        )])))
        .expect(1)
        .mount(&fx.server)
        .await;

    let app = appointment_routes(fx.config.to_state());
    let response = app
        .oneshot(fx.request(
            "PATCH",
            &format!("/{}", appointment_id),
            Some(json!({ "start": "2024-05-06T13:00:00Z" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["end"], "2024-05-06T13:30:00Z");
}

#[tokio::test]
async fn cancelling_skips_the_conflict_guard() {
    let fx = Fixture::new().await;
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([fx.appointment(
            &appointment_id.to_string(),
            START,
            END,
            "confirmed"
        )])))
        .mount(&fx.server)
        .await;
    fx.mount_conflicts(json!([])).await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({ "status": "cancelled" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([fx.appointment(
            &appointment_id.to_string(),
            START,
            END,
            "cancelled"
        )])))
        .mount(&fx.server)
        .await;

    let update = serde_json::from_value(json!({ "status": "cancelled" })).unwrap();
    let updated = BookingService::new(fx.supabase())
        .update_appointment(fx.tenant_id, appointment_id, update, "token")
        .await
        .unwrap();

    assert_eq!(updated.status, AppointmentStatus::Cancelled);
    let requests = fx.server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.url.query().unwrap_or_default().contains("status=not.in")));
}

#[tokio::test]
async fn unknown_appointment_is_not_found() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&fx.server)
        .await;

    let result = BookingService::new(fx.supabase())
        .get_appointment(fx.tenant_id, Uuid::new_v4(), "token")
        .await;

    assert_matches!(result, Err(AppointmentError::NotFound(_)));
}

#[tokio::test]
async fn deleting_unknown_appointment_is_not_found() {
    let fx = Fixture::new().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&fx.server)
        .await;

    let app = appointment_routes(fx.config.to_state());
    let response = app
        .oneshot(fx.request("DELETE", &format!("/{}", Uuid::new_v4()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn availability_marks_booked_slot_unavailable() {
    let fx = Fixture::new().await;
    let tenant = fx.tenant_id.to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/units"))
        .and(query_param("id", format!("eq.{}", fx.unit_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::unit_response(&fx.unit_id, &tenant)
        ])))
        .mount(&fx.server)
        .await;
    fx.mount_service(30).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/professionals"))
        .and(query_param("unit_id", format!("eq.{}", fx.unit_id)))
        .and(query_param("active", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::professional_response(&fx.professional_id, &fx.unit_id)
        ])))
        .mount(&fx.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_rules"))
        .and(query_param("calendar_id", format!("in.({})", fx.professional_id)))
        .and(query_param("day_of_week", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::schedule_rule_response(&fx.professional_id, 1, "09:00:00", "11:00:00", 30)
        ])))
        .mount(&fx.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/time_off"))
        .and(query_param("start", "lt.2024-05-07T03:00:00Z"))
        .and(query_param("end", "gt.2024-05-06T03:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&fx.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("professional_id", format!("in.({})", fx.professional_id)))
        .and(query_param("status", "not.in.(cancelled,no_show)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([fx.appointment(
            &Uuid::new_v4().to_string(),
            "2024-05-06T13:00:00Z",
            "2024-05-06T13:30:00Z",
            "confirmed"
        )])))
        .mount(&fx.server)
        .await;

    let app = appointment_routes(fx.config.to_state());
    let uri = format!(
        "/availability?unit_id={}&service_id={}&date=2024-05-06",
        fx.unit_id, fx.service_id
    );
    let response = app.oneshot(fx.request("GET", &uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let slots = body["slots"].as_array().unwrap();
    let summary: Vec<(&str, bool)> = slots
        .iter()
        .map(|s| (s["start"].as_str().unwrap(), s["available"].as_bool().unwrap()))
        .collect();

    assert_eq!(
        summary,
        vec![
            ("2024-05-06T12:00:00Z", true),
            ("2024-05-06T12:30:00Z", true),
            ("2024-05-06T13:00:00Z", false),
            ("2024-05-06T13:30:00Z", true),
        ]
    );
    assert!(slots.iter().all(|s| s["professional_id"] == fx.professional_id.as_str()));
}

#[tokio::test]
async fn empty_report_lists_every_status() {
    let fx = Fixture::new().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("start", "gte.2024-05-01T00:00:00Z"))
        .and(query_param("start", "lte.2024-05-31T23:59:59Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&fx.server)
        .await;

    let app = appointment_routes(fx.config.to_state());
    let response = app
        .oneshot(fx.request("GET", "/reports?from=2024-05-01&to=2024-05-31", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    for status in ["pending", "confirmed", "cancelled", "no_show", "completed"] {
        assert_eq!(body["by_status"][status], 0, "status {}", status);
    }
}

#[tokio::test]
async fn payment_validation_is_disabled_by_default() {
    let fx = Fixture::new().await;
    let app = appointment_routes(fx.config.to_state());

    let response = app
        .oneshot(fx.request(
            "POST",
            "/payments/validate",
            Some(json!({
                "appointment_id": Uuid::new_v4(),
                "amount": 120.0,
                "currency": "BRL",
                "method": "stripe",
                "customer_data": { "name": "Joana Lima", "email": "joana@example.com" }
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
