//! Plan API integration tests
//!
//! Drives the full router (auth middleware, handlers, coordinator, lease
//! lock) over in-memory storage.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{TestApp, TestUser};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

async fn create_plan(app: &TestApp, owner: &TestUser, is_public: bool) -> i64 {
    let (status, body) = app
        .send(
            Method::POST,
            "/v1/plans",
            Some(owner),
            Some(json!({
                "title": "Jeju weekend",
                "description": "Three days by the sea",
                "tags": ["sea", "food"],
                "is_public": is_public,
                "start_date": "2024-07-01",
                "end_date": "2024-07-03",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", body);
    body["plan_id"].as_i64().expect("plan_id")
}

async fn add_stop(app: &TestApp, user: &TestUser, plan_id: i64, day_index: i32, attraction_id: i64) -> Value {
    let (status, body) = app
        .send(
            Method::POST,
            &format!("/v1/plans/{}/attraction", plan_id),
            Some(user),
            Some(json!({ "day_index": day_index, "attraction_id": attraction_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    body
}

fn route_ids_on(view: &Value, date: &str) -> Vec<i64> {
    view["details"][date]
        .as_array()
        .map(|routes| routes.iter().filter_map(|route| route["route_id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_health_reports_memory_storage() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = TestApp::new();
    let response = app.send(Method::GET, "/v2/nothing", None, None).await;
    assert_api_error!(response, StatusCode::NOT_FOUND, "COMMON-404");
}

#[tokio::test]
async fn test_create_plan_requires_authentication() {
    let app = TestApp::new();
    let response = app
        .send(
            Method::POST,
            "/v1/plans",
            None,
            Some(json!({
                "title": "Trip",
                "start_date": "2024-07-01",
                "end_date": "2024-07-01",
            })),
        )
        .await;
    assert_api_error!(response, StatusCode::UNAUTHORIZED, "AUTH-401");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/v1/plans/1")
        .header("Authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = app.send_request(request).await;
    assert_api_error!(response, StatusCode::UNAUTHORIZED, "AUTH-401");
}

#[tokio::test]
async fn test_create_plan_returns_view_with_creator_as_writer() {
    let app = TestApp::new();
    let alice = app.user("alice").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/v1/plans",
            Some(&alice),
            Some(json!({
                "title": "Busan",
                "tags": ["beach", " beach "],
                "start_date": "2024-08-10",
                "end_date": "2024-08-12",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Busan");
    assert_eq!(body["like_count"], 0);
    assert_eq!(body["plan_writers"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["plan_writers"][0]["user_id"], alice.id.to_string());
    assert_eq!(body["tags"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_create_plan_with_inverted_dates() {
    let app = TestApp::new();
    let alice = app.user("alice").await;

    let response = app
        .send(
            Method::POST,
            "/v1/plans",
            Some(&alice),
            Some(json!({
                "title": "Backwards",
                "start_date": "2024-07-03",
                "end_date": "2024-07-01",
            })),
        )
        .await;
    assert_api_error!(response, StatusCode::BAD_REQUEST, "PLAN-012");
}

#[tokio::test]
async fn test_malformed_body_returns_json_error() {
    let app = TestApp::new();
    let alice = app.user("alice").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/plans")
        .header("Authorization", format!("Bearer {}", alice.token))
        .header("Content-Type", "application/json")
        .body(Body::from("{\"title\": \"Jeju\", "))
        .unwrap();
    let response = app.send_request(request).await;
    assert_api_error!(response, StatusCode::BAD_REQUEST, "COMMON-400");

    let (status, body) = app
        .send(Method::POST, "/v1/plans", Some(&alice), Some(json!({ "title": 5 })))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "COMMON-400");
    assert!(body["error"].is_string(), "body: {}", body);
}

#[tokio::test]
async fn test_missing_plan_returns_not_found() {
    let app = TestApp::new();
    let alice = app.user("alice").await;

    let response = app.send(Method::GET, "/v1/plans/999", Some(&alice), None).await;
    assert_api_error!(response, StatusCode::NOT_FOUND, "PLAN-001");
}

#[tokio::test]
async fn test_private_plan_is_hidden_from_strangers() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let mallory = app.user("mallory").await;
    let plan_id = create_plan(&app, &alice, false).await;
    let uri = format!("/v1/plans/{}", plan_id);

    let response = app.send(Method::GET, &uri, None, None).await;
    assert_api_error!(response, StatusCode::FORBIDDEN, "PLAN-003");

    let response = app.send(Method::GET, &uri, Some(&mallory), None).await;
    assert_api_error!(response, StatusCode::FORBIDDEN, "PLAN-003");

    let (status, _) = app.send(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_public_plan_is_readable_anonymously_but_not_editable() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let mallory = app.user("mallory").await;
    let plan_id = create_plan(&app, &alice, true).await;

    let (status, body) = app
        .send(Method::GET, &format!("/v1/plans/{}", plan_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["liked"], false);

    let response = app
        .send(
            Method::POST,
            &format!("/v1/plans/{}/attraction", plan_id),
            Some(&mallory),
            Some(json!({ "day_index": 1, "attraction_id": 5 })),
        )
        .await;
    assert_api_error!(response, StatusCode::FORBIDDEN, "PLAN-003");
}

#[tokio::test]
async fn test_lock_contention_between_writers() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let plan_id = create_plan(&app, &alice, false).await;

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/v1/plans/{}/invite", plan_id),
            Some(&alice),
            Some(json!({ "email": bob.email })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let lock_uri = format!("/v1/plans/{}/lock", plan_id);
    let (_, body) = app.send(Method::POST, &lock_uri, Some(&alice), None).await;
    assert_eq!(body["success"], true);

    let (_, body) = app.send(Method::POST, &lock_uri, Some(&bob), None).await;
    assert_eq!(body["success"], false);

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/v1/plans/{}/lock-check", plan_id),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lock_status"], true);
    assert_eq!(body["user_id"], alice.id.to_string());

    // Bob's batch is refused while Alice holds the plan
    let response = app
        .send(
            Method::PATCH,
            &format!("/v1/plans/{}/attraction", plan_id),
            Some(&bob),
            Some(json!({ "routes": [] })),
        )
        .await;
    assert_api_error!(response, StatusCode::FORBIDDEN, "PLAN-004");

    // Bob cannot release Alice's lease
    let (_, body) = app
        .send(Method::POST, &format!("/v1/plans/{}/unlock", plan_id), Some(&bob), None)
        .await;
    assert_eq!(body["success"], false);

    let (_, body) = app
        .send(Method::POST, &format!("/v1/plans/{}/unlock", plan_id), Some(&alice), None)
        .await;
    assert_eq!(body["success"], true);

    let (_, body) = app.send(Method::POST, &lock_uri, Some(&bob), None).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_route_batch_requires_a_lease() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let plan_id = create_plan(&app, &alice, false).await;

    let response = app
        .send(
            Method::PATCH,
            &format!("/v1/plans/{}/attraction", plan_id),
            Some(&alice),
            Some(json!({ "routes": [] })),
        )
        .await;
    assert_api_error!(response, StatusCode::FORBIDDEN, "PLAN-006");
}

#[tokio::test]
async fn test_route_batch_reorders_deletes_and_releases_lease() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let plan_id = create_plan(&app, &alice, false).await;

    let view = add_stop(&app, &alice, plan_id, 1, 10).await;
    let first = route_ids_on(&view, "2024-07-01")[0];
    let view = add_stop(&app, &alice, plan_id, 1, 11).await;
    let second = route_ids_on(&view, "2024-07-01")[1];

    app.send(Method::POST, &format!("/v1/plans/{}/lock", plan_id), Some(&alice), None)
        .await;

    let (status, view) = app
        .send(
            Method::PATCH,
            &format!("/v1/plans/{}/attraction", plan_id),
            Some(&alice),
            Some(json!({
                "routes": [
                    { "route_id": second, "day_index": 3, "order": 1 },
                    { "route_id": first, "deleted": true },
                ]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "body: {}", view);
    assert_eq!(route_ids_on(&view, "2024-07-01"), Vec::<i64>::new());
    assert_eq!(route_ids_on(&view, "2024-07-03"), vec![second]);

    let (_, status_body) = app
        .send(
            Method::GET,
            &format!("/v1/plans/{}/lock-check", plan_id),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status_body["lock_status"], false);
}

#[tokio::test]
async fn test_route_batch_with_illegal_day_keeps_routes() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let plan_id = create_plan(&app, &alice, false).await;
    let view = add_stop(&app, &alice, plan_id, 2, 10).await;
    let route_id = route_ids_on(&view, "2024-07-02")[0];

    app.send(Method::POST, &format!("/v1/plans/{}/lock", plan_id), Some(&alice), None)
        .await;

    let response = app
        .send(
            Method::PATCH,
            &format!("/v1/plans/{}/attraction", plan_id),
            Some(&alice),
            Some(json!({ "routes": [{ "route_id": route_id, "day_index": 9, "order": 1 }] })),
        )
        .await;
    assert_api_error!(response, StatusCode::BAD_REQUEST, "PLAN-005");

    let (_, view) = app
        .send(Method::GET, &format!("/v1/plans/{}", plan_id), Some(&alice), None)
        .await;
    assert_eq!(route_ids_on(&view, "2024-07-02"), vec![route_id]);
}

#[tokio::test]
async fn test_add_attraction_outside_schedule() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let plan_id = create_plan(&app, &alice, false).await;

    for day_index in [0, 4] {
        let response = app
            .send(
                Method::POST,
                &format!("/v1/plans/{}/attraction", plan_id),
                Some(&alice),
                Some(json!({ "day_index": day_index, "attraction_id": 1 })),
            )
            .await;
        assert_api_error!(response, StatusCode::BAD_REQUEST, "PLAN-005");
    }
}

#[tokio::test]
async fn test_schedule_change_blocked_while_locked_then_trims_routes() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let plan_id = create_plan(&app, &alice, false).await;
    add_stop(&app, &alice, plan_id, 1, 10).await;
    add_stop(&app, &alice, plan_id, 3, 30).await;

    let schedule_uri = format!("/v1/plans/{}/schedule", plan_id);
    let shorter = json!({ "start_date": "2024-07-01", "end_date": "2024-07-02" });

    app.send(Method::POST, &format!("/v1/plans/{}/lock", plan_id), Some(&alice), None)
        .await;
    let response = app
        .send(Method::PUT, &schedule_uri, Some(&alice), Some(shorter.clone()))
        .await;
    assert_api_error!(response, StatusCode::FORBIDDEN, "PLAN-004");

    app.send(Method::POST, &format!("/v1/plans/{}/unlock", plan_id), Some(&alice), None)
        .await;
    let (status, view) = app
        .send(Method::PUT, &schedule_uri, Some(&alice), Some(shorter))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["end_date"], "2024-07-02");
    assert_eq!(route_ids_on(&view, "2024-07-01").len(), 1);
    assert_eq!(app.store.route_count().await, 1);
}

#[tokio::test]
async fn test_update_route_rejects_foreign_route() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let first = create_plan(&app, &alice, false).await;
    let second = create_plan(&app, &alice, false).await;
    let view = add_stop(&app, &alice, second, 1, 10).await;
    let route_id = route_ids_on(&view, "2024-07-01")[0];

    let response = app
        .send(
            Method::PUT,
            &format!("/v1/plans/{}/routes/{}", first, route_id),
            Some(&alice),
            Some(json!({ "memo": "lunch" })),
        )
        .await;
    assert_api_error!(response, StatusCode::BAD_REQUEST, "PLAN-009");

    let response = app
        .send(
            Method::PUT,
            &format!("/v1/plans/{}/routes/424242", first),
            Some(&alice),
            Some(json!({ "memo": "lunch" })),
        )
        .await;
    assert_api_error!(response, StatusCode::NOT_FOUND, "PLAN-010");

    let (status, view) = app
        .send(
            Method::PUT,
            &format!("/v1/plans/{}/routes/{}", second, route_id),
            Some(&alice),
            Some(json!({ "visit_time": "12:30:00", "memo": "lunch" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["details"]["2024-07-01"][0]["memo"], "lunch");
}

#[tokio::test]
async fn test_invite_errors() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let plan_id = create_plan(&app, &alice, false).await;
    let invite_uri = format!("/v1/plans/{}/invite", plan_id);

    let response = app
        .send(
            Method::POST,
            &invite_uri,
            Some(&alice),
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
    assert_api_error!(response, StatusCode::NOT_FOUND, "PLAN-007");

    let response = app
        .send(Method::POST, &invite_uri, Some(&alice), Some(json!({ "email": alice.email })))
        .await;
    assert_api_error!(response, StatusCode::BAD_REQUEST, "PLAN-008");

    let (status, body) = app
        .send(Method::POST, &invite_uri, Some(&alice), Some(json!({ "email": bob.email })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_last_writer_leaving_deletes_plan() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let plan_id = create_plan(&app, &alice, false).await;
    add_stop(&app, &alice, plan_id, 1, 10).await;

    let (status, body) = app
        .send(Method::POST, &format!("/v1/plans/{}/leave", plan_id), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let response = app
        .send(Method::GET, &format!("/v1/plans/{}", plan_id), Some(&alice), None)
        .await;
    assert_api_error!(response, StatusCode::NOT_FOUND, "PLAN-001");
    assert_eq!(app.store.route_count().await, 0);
}

#[tokio::test]
async fn test_like_and_unlike() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let plan_id = create_plan(&app, &alice, true).await;
    let like_uri = format!("/v1/plans/{}/like", plan_id);

    let (status, _) = app.send(Method::POST, &like_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);

    let response = app.send(Method::POST, &like_uri, Some(&bob), None).await;
    assert_api_error!(response, StatusCode::BAD_REQUEST, "PLAN-002");

    let (_, view) = app
        .send(Method::GET, &format!("/v1/plans/{}", plan_id), Some(&bob), None)
        .await;
    assert_eq!(view["like_count"], 1);
    assert_eq!(view["liked"], true);

    let (status, _) = app.send(Method::DELETE, &like_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);

    let response = app.send(Method::DELETE, &like_uri, Some(&bob), None).await;
    assert_api_error!(response, StatusCode::BAD_REQUEST, "PLAN-002");
}

#[tokio::test]
async fn test_update_plan_basic_info() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let plan_id = create_plan(&app, &alice, false).await;
    let uri = format!("/v1/plans/{}", plan_id);

    let (status, view) = app
        .send(
            Method::PUT,
            &uri,
            Some(&alice),
            Some(json!({ "title": "Renamed", "is_public": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["title"], "Renamed");
    assert_eq!(view["is_public"], true);

    let response = app
        .send(Method::PUT, &uri, Some(&alice), Some(json!({ "title": "  " })))
        .await;
    assert_api_error!(response, StatusCode::BAD_REQUEST, "COMMON-400");
}
