//! Full-flow tests over the router: every request goes through routing,
//! the auth extractor, handlers, and an in-memory store.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cadence_core::{Config, Store};
use cadence_server::{build_router, AppState};

fn test_app() -> (Router, String) {
    let store = Store::open_memory().unwrap();
    let config = Config::default();
    let state = AppState::new(store, &config);
    let token = state.verifier.issue("user-1");
    (build_router(state), token)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn health_needs_no_auth() {
    let (router, _) = test_app();
    let (status, body) = send(&router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let (router, _) = test_app();
    let (status, _) = send(&router, Method::GET, "/habits", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&router, Method::GET, "/habits", Some("cad1.bogus.sig"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn fresh_day_returns_empty_schedule() {
    let (router, token) = test_app();
    let (status, body) = send(
        &router,
        Method::GET,
        "/daily-schedule?date=2026-03-02",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2026-03-02");
    assert_eq!(body["blocks"], json!([]));
}

#[tokio::test]
async fn habit_complete_flow_reports_streak_and_awards_points() {
    let (router, token) = test_app();

    let (status, habit) = send(
        &router,
        Method::POST,
        "/habits",
        Some(&token),
        Some(json!({ "name": "Read 20 pages", "period": "Daily", "goal": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let habit_id = habit["id"].as_str().unwrap().to_string();

    let (status, completed) = send(
        &router,
        Method::POST,
        &format!("/habits/{habit_id}/complete"),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["report"]["current_streak"], 1);
    let kinds: Vec<&str> = completed["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["HabitCompleted", "PointsAwarded"]);

    let (status, report) = send(
        &router,
        Method::GET,
        &format!("/habits/{habit_id}/streak"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["current_streak"], 1);

    // Points landed on the rewards balance.
    let (_, rewards) = send(&router, Method::GET, "/rewards", Some(&token), None).await;
    assert_eq!(rewards["balance"], 5);
}

#[tokio::test]
async fn validation_failure_surfaces_verbatim_message() {
    let (router, token) = test_app();
    let (status, body) = send(
        &router,
        Method::POST,
        "/habits",
        Some(&token),
        Some(json!({ "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn inverted_block_interval_is_rejected() {
    let (router, token) = test_app();
    let (status, body) = send(
        &router,
        Method::POST,
        "/daily-schedule/time-block",
        Some(&token),
        Some(json!({
            "name": "backwards",
            "category": "work",
            "start": "2026-03-02T11:00:00Z",
            "end": "2026-03-02T09:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("time range"));
}

async fn create_block(router: &Router, token: &str) -> String {
    let (status, block) = send(
        router,
        Method::POST,
        "/daily-schedule/time-block",
        Some(token),
        Some(json!({
            "name": "Deep work",
            "category": "work",
            "start": "2026-03-02T09:00:00Z",
            "end": "2026-03-02T11:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    block["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn timer_accumulates_across_stop_start_cycles() {
    let (router, token) = test_app();
    let block_id = create_block(&router, &token).await;

    let (status, started) = send(
        &router,
        Method::POST,
        &format!("/daily-schedule/time-block/{block_id}/start-timer"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["events"][0]["type"], "TimerStarted");
    assert_eq!(started["block"]["timer"]["started_at_epoch_ms"].is_null(), false);

    // Starting again is a no-op.
    let (_, again) = send(
        &router,
        Method::POST,
        &format!("/daily-schedule/time-block/{block_id}/start-timer"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(again["events"], json!([]));

    let (_, stopped) = send(
        &router,
        Method::POST,
        &format!("/daily-schedule/time-block/{block_id}/stop-timer"),
        Some(&token),
        None,
    )
    .await;
    let first_total = stopped["block"]["timer"]["accumulated_ms"].as_u64().unwrap();
    assert_eq!(stopped["events"][0]["type"], "TimerStopped");

    // Stop, restart, stop: the total never goes backwards.
    send(
        &router,
        Method::POST,
        &format!("/daily-schedule/time-block/{block_id}/start-timer"),
        Some(&token),
        None,
    )
    .await;
    let (_, stopped) = send(
        &router,
        Method::POST,
        &format!("/daily-schedule/time-block/{block_id}/stop-timer"),
        Some(&token),
        None,
    )
    .await;
    let second_total = stopped["block"]["timer"]["accumulated_ms"].as_u64().unwrap();
    assert!(second_total >= first_total);
}

#[tokio::test]
async fn task_toggle_round_trips_through_parent_block() {
    let (router, token) = test_app();
    let block_id = create_block(&router, &token).await;

    let (status, block) = send(
        &router,
        Method::POST,
        &format!("/daily-schedule/time-block/{block_id}/tasks"),
        Some(&token),
        Some(json!({ "name": "outline" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = block["tasks"][0]["id"].as_str().unwrap().to_string();

    let uri = format!("/daily-schedule/time-block/{block_id}/tasks/{task_id}");
    let (_, on) = send(
        &router,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(on["block"]["tasks"][0]["completed"], true);
    assert_eq!(on["events"][0]["type"], "TaskCompletionToggled");

    let (_, off) = send(
        &router,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "completed": false })),
    )
    .await;
    assert_eq!(off["block"]["tasks"][0]["completed"], false);
}

#[tokio::test]
async fn completing_block_awards_points_once() {
    let (router, token) = test_app();
    let block_id = create_block(&router, &token).await;

    let uri = format!("/daily-schedule/time-block/{block_id}");
    let (_, done) = send(
        &router,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(done["block"]["completed"], true);

    // Re-sending the same state is a no-op, no double award.
    let (_, same) = send(
        &router,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(same["events"], json!([]));

    let (_, rewards) = send(&router, Method::GET, "/rewards", Some(&token), None).await;
    assert_eq!(rewards["balance"], 10);
}

#[tokio::test]
async fn milestone_delete_leaves_siblings_untouched() {
    let (router, token) = test_app();

    let (status, goal) = send(
        &router,
        Method::POST,
        "/goals",
        Some(&token),
        Some(json!({ "title": "Ship the launch", "priority": "high" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let goal_id = goal["id"].as_str().unwrap().to_string();

    let (_, goal) = send(
        &router,
        Method::POST,
        &format!("/goals/{goal_id}/milestones"),
        Some(&token),
        Some(json!({ "title": "draft" })),
    )
    .await;
    let draft_id = goal["milestones"][0]["id"].as_str().unwrap().to_string();
    let (_, goal) = send(
        &router,
        Method::POST,
        &format!("/goals/{goal_id}/milestones"),
        Some(&token),
        Some(json!({ "title": "review" })),
    )
    .await;
    let review_id = goal["milestones"][1]["id"].as_str().unwrap().to_string();

    let (_, completed) = send(
        &router,
        Method::PUT,
        &format!("/goals/{goal_id}/milestones/{review_id}"),
        Some(&token),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(completed["goal"]["status"], "in_progress");
    assert_eq!(completed["events"][0]["type"], "MilestoneCompleted");

    let (status, goal) = send(
        &router,
        Method::DELETE,
        &format!("/goals/{goal_id}/milestones/{draft_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let milestones = goal["milestones"].as_array().unwrap();
    assert_eq!(milestones.len(), 1);
    assert_eq!(milestones[0]["id"], review_id.as_str());
    assert_eq!(milestones[0]["completed"], true);
    // Sole remaining milestone is complete -> goal completes.
    assert_eq!(goal["status"], "completed");
}

#[tokio::test]
async fn weekly_metrics_recomputes_from_records() {
    let (router, token) = test_app();

    // Use today's date so the block lands in the trailing window.
    let today = chrono::Utc::now().date_naive();
    let start = format!("{today}T09:00:00Z");
    let end = format!("{today}T11:00:00Z");
    let (status, block) = send(
        &router,
        Method::POST,
        "/daily-schedule/time-block",
        Some(&token),
        Some(json!({ "name": "Deep work", "category": "work", "start": start, "end": end })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let block_id = block["id"].as_str().unwrap().to_string();

    send(
        &router,
        Method::PUT,
        &format!("/daily-schedule/time-block/{block_id}"),
        Some(&token),
        Some(json!({ "completed": true })),
    )
    .await;

    let (status, metrics) = send(
        &router,
        Method::GET,
        "/daily-schedule/weekly-metrics",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["hours_by_category"]["work"], 2.0);
    assert_eq!(metrics["schedule_completion_pct"], 100.0);
}

#[tokio::test]
async fn reward_redeem_spends_points() {
    let (router, token) = test_app();

    // Earn 10 points by completing a block.
    let block_id = create_block(&router, &token).await;
    send(
        &router,
        Method::PUT,
        &format!("/daily-schedule/time-block/{block_id}"),
        Some(&token),
        Some(json!({ "completed": true })),
    )
    .await;

    let (_, reward) = send(
        &router,
        Method::POST,
        "/rewards",
        Some(&token),
        Some(json!({ "name": "Fancy coffee", "cost_points": 30 })),
    )
    .await;
    let reward_id = reward["id"].as_str().unwrap().to_string();

    // 10 points cannot cover a 30-point reward.
    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/rewards/{reward_id}/redeem"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("insufficient"));

    let (_, cheap) = send(
        &router,
        Method::POST,
        "/rewards",
        Some(&token),
        Some(json!({ "name": "Episode of TV", "cost_points": 10 })),
    )
    .await;
    let cheap_id = cheap["id"].as_str().unwrap().to_string();

    let (status, redeemed) = send(
        &router,
        Method::POST,
        &format!("/rewards/{cheap_id}/redeem"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(redeemed["balance"], 0);
    assert_eq!(redeemed["events"][0]["type"], "RewardRedeemed");
}

#[tokio::test]
async fn checkout_without_provider_key_is_bad_gateway() {
    let (router, token) = test_app();
    let (status, _) = send(
        &router,
        Method::POST,
        "/stripe/create-checkout-session",
        Some(&token),
        Some(json!({ "name": "Premium", "amount_cents": 500 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn owners_cannot_touch_each_others_entities() {
    let store = Store::open_memory().unwrap();
    let config = Config::default();
    let state = AppState::new(store, &config);
    let alice = state.verifier.issue("alice");
    let bob = state.verifier.issue("bob");
    let router = build_router(state);

    let (_, habit) = send(
        &router,
        Method::POST,
        "/habits",
        Some(&alice),
        Some(json!({ "name": "Meditate" })),
    )
    .await;
    let habit_id = habit["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/habits/delete/{habit_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
