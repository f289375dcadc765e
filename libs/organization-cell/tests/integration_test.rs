use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use organization_cell::router::{service_routes, tenant_routes, unit_routes, user_routes};
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn create_unit_defaults_timezone_and_scopes_tenant() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let tenant_id = Uuid::new_v4();
    let user = TestUser::admin(tenant_id);
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));
    let unit_id = Uuid::new_v4().to_string();

    Mock::given(method("POST"))
        .and(path("/rest/v1/units"))
        .and(header("authorization", format!("Bearer {}", token)))
        .and(header("apikey", "test-anon-key"))
        .and(body_partial_json(json!({
            "tenant_id": tenant_id,
            "timezone": "America/Sao_Paulo"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::unit_response(&unit_id, &tenant_id.to_string())
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = unit_routes(config.to_state());
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "name": "Unidade Centro", "address": "Rua Augusta, 1500 - Sao Paulo" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["id"], unit_id);
}

#[tokio::test]
async fn invalid_unit_is_rejected_before_storage() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let user = TestUser::admin(Uuid::new_v4());
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    Mock::given(method("POST"))
        .and(path("/rest/v1/units"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = unit_routes(config.to_state());
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "name": "X", "address": "short" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "address"]);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let config = TestConfig::default();
    let app = unit_routes(config.to_state());

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_without_tenant_is_rejected() {
    let config = TestConfig::default();
    let user = TestUser::without_tenant();
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));
    let app = service_routes(config.to_state());

    let request = Request::builder()
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_services_returns_active_only_query() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let tenant_id = Uuid::new_v4();
    let user = TestUser::reception(tenant_id);
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .and(query_param("tenant_id", format!("eq.{}", tenant_id)))
        .and(query_param("active", "eq.true"))
        .and(query_param("order", "name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::service_response(&Uuid::new_v4().to_string(), &tenant_id.to_string(), 30),
            MockSupabaseResponses::service_response(&Uuid::new_v4().to_string(), &tenant_id.to_string(), 60)
        ])))
        .mount(&mock_server)
        .await;

    let app = service_routes(config.to_state());
    let request = Request::builder()
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_service_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let user = TestUser::admin(Uuid::new_v4());
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = service_routes(config.to_state());
    let request = Request::builder()
        .uri(format!("/{}", Uuid::new_v4()))
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_user_stores_password_hash_only() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let tenant_id = Uuid::new_v4();
    let user = TestUser::admin(tenant_id);
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({ "email": "recepcao@studio.com", "role": "reception" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::user_response(&Uuid::new_v4().to_string(), &tenant_id.to_string())
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = user_routes(config.to_state());
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "name": "Recepcao",
                "email": "Recepcao@Studio.com",
                "role": "reception",
                "password": "super-secret"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let received = mock_server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(sent.get("password").is_none());
    assert!(sent["password_hash"].as_str().unwrap().starts_with("$argon2id$"));
}

#[tokio::test]
async fn current_tenant_is_read_with_service_role() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let tenant_id = Uuid::new_v4();
    let user = TestUser::admin(tenant_id);
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/tenants"))
        .and(header("apikey", "test-service-role-key"))
        .and(query_param("id", format!("eq.{}", tenant_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::tenant_response(&tenant_id.to_string())
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = tenant_routes(config.to_state());
    let request = Request::builder()
        .uri("/current")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["plan"], "free");
}
