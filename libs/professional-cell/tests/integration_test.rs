use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use professional_cell::models::{TimeOffWindow, UpdateTimeOffRequest};
use professional_cell::router::professional_routes;
use professional_cell::services::TimeOffService;
use shared_database::{CredentialTier, SupabaseClient};
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn slots_endpoint_tiles_rules_in_unit_timezone() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let tenant_id = Uuid::new_v4();
    let unit_id = Uuid::new_v4().to_string();
    let professional_id = Uuid::new_v4().to_string();
    let user = TestUser::reception(tenant_id);
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/professionals"))
        .and(query_param("id", format!("eq.{}", professional_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::professional_response(&professional_id, &unit_id)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/units"))
        .and(query_param("id", format!("eq.{}", unit_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::unit_response(&unit_id, &tenant_id.to_string())
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_rules"))
        .and(query_param("calendar_id", format!("eq.{}", professional_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::schedule_rule_response(&professional_id, 1, "09:00:00", "10:00:00", 20),
            MockSupabaseResponses::schedule_rule_response(&professional_id, 2, "09:00:00", "18:00:00", 30)
        ])))
        .mount(&mock_server)
        .await;

    let app = professional_routes(config.to_state());
    let request = Request::builder()
        .uri(format!("/{}/slots?date=2024-05-06", professional_id))
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let slots = body_json(response).await;
    let starts: Vec<&str> = slots
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_str().unwrap())
        .collect();
    assert_eq!(
        starts,
        vec!["2024-05-06T12:00:00Z", "2024-05-06T12:20:00Z", "2024-05-06T12:40:00Z"]
    );
}

#[tokio::test]
async fn slots_endpoint_rejects_malformed_date() {
    let config = TestConfig::default();
    let user = TestUser::reception(Uuid::new_v4());
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    let app = professional_routes(config.to_state());
    let request = Request::builder()
        .uri(format!("/{}/slots?date=06/05/2024", Uuid::new_v4()))
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_schedule_rule_uses_default_slot() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let professional_id = Uuid::new_v4().to_string();
    let user = TestUser::admin(Uuid::new_v4());
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    Mock::given(method("POST"))
        .and(path("/rest/v1/schedule_rules"))
        .and(body_partial_json(json!({
            "calendar_id": professional_id,
            "day_of_week": 3,
            "slot_min": 15
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::schedule_rule_response(&professional_id, 3, "08:00:00", "12:00:00", 15)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = professional_routes(config.to_state());
    let request = Request::builder()
        .method("POST")
        .uri(format!("/{}/schedule-rules", professional_id))
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "day_of_week": 3, "start_time": "08:00", "end_time": "12:00" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn inverted_rule_never_reaches_storage() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let user = TestUser::admin(Uuid::new_v4());
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = professional_routes(config.to_state());
    let request = Request::builder()
        .method("POST")
        .uri(format!("/{}/schedule-rules", Uuid::new_v4()))
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "day_of_week": 1, "start_time": "12:00", "end_time": "9:00", "slot_min": 30 }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn time_off_window_uses_half_open_overlap_predicates() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let calendar_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/time_off"))
        .and(query_param("calendar_id", format!("eq.{}", calendar_id)))
        .and(query_param("start", "lt.2024-05-07T00:00:00Z"))
        .and(query_param("end", "gt.2024-05-06T00:00:00Z"))
        .and(query_param("order", "start.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::time_off_response(
                &calendar_id.to_string(),
                "2024-05-06T15:00:00Z",
                "2024-05-06T17:00:00Z"
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = TimeOffService::new(Arc::new(SupabaseClient::new(&config.to_app_config())));
    let window = TimeOffWindow {
        from: Some(Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap()),
        to: Some(Utc.with_ymd_and_hms(2024, 5, 7, 0, 0, 0).unwrap()),
    };

    let entries = service
        .list_time_off(calendar_id, &window, CredentialTier::UserScoped(Some("token")))
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reason, "Consulta medica");
}

#[tokio::test]
async fn moving_only_rule_end_before_stored_start_is_rejected() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let professional_id = Uuid::new_v4().to_string();
    let rule = MockSupabaseResponses::schedule_rule_response(&professional_id, 1, "09:00:00", "12:00:00", 30);
    let rule_id = rule["id"].as_str().unwrap().to_string();
    let token = JwtTestUtils::create_test_token(&TestUser::admin(Uuid::new_v4()), &config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/schedule_rules"))
        .and(query_param("id", format!("eq.{}", rule_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([rule])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = professional_routes(config.to_state());
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/{}/schedule-rules/{}", professional_id, rule_id))
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "end_time": "08:30" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "end_time");
}

#[tokio::test]
async fn moving_only_time_off_start_keeps_stored_end() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let calendar_id = Uuid::new_v4().to_string();
    let stored = MockSupabaseResponses::time_off_response(&calendar_id, "2024-05-06T15:00:00Z", "2024-05-06T17:00:00Z");
    let time_off_id = stored["id"].as_str().unwrap().to_string();
    let token = JwtTestUtils::create_test_token(&TestUser::admin(Uuid::new_v4()), &config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/time_off"))
        .and(query_param("id", format!("eq.{}", time_off_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = professional_routes(config.to_state());
    let request = Request::builder()
        .method("PATCH")
        .uri(format!("/{}/time-off/{}", calendar_id, time_off_id))
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "start": "2024-05-06T18:00:00Z" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn valid_one_sided_time_off_update_is_stored() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let calendar_id = Uuid::new_v4();
    let stored = MockSupabaseResponses::time_off_response(
        &calendar_id.to_string(),
        "2024-05-06T15:00:00Z",
        "2024-05-06T17:00:00Z",
    );
    let time_off_id: Uuid = stored["id"].as_str().unwrap().parse().unwrap();
    let mut updated = stored.clone();
    updated["end"] = json!("2024-05-06T18:00:00Z");

    Mock::given(method("GET"))
        .and(path("/rest/v1/time_off"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored])))
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/time_off"))
        .and(body_partial_json(json!({ "end": "2024-05-06T18:00:00Z" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = TimeOffService::new(Arc::new(SupabaseClient::new(&config.to_app_config())));
    let request = UpdateTimeOffRequest {
        end: Some(Utc.with_ymd_and_hms(2024, 5, 6, 18, 0, 0).unwrap()),
        ..Default::default()
    };
    let entry = service
        .update_time_off(calendar_id, time_off_id, request, "token")
        .await
        .unwrap();

    assert_eq!(entry.end, Utc.with_ymd_and_hms(2024, 5, 6, 18, 0, 0).unwrap());
}
