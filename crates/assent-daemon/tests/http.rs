//! HTTP surface tests, driven through the router without a socket.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONNECTION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use assent_approval::prelude::*;
use assent_daemon::{AppState, RoutePaths, router};
use assent_test::{MockNotifier, TEST_CHANNEL, TEST_VERIFICATION_TOKEN, init_test_logging};

fn app(notifier: &MockNotifier) -> Router {
    init_test_logging();
    let broker = ApprovalBroker::new(
        Arc::new(notifier.clone()),
        TEST_VERIFICATION_TOKEN,
        TimeoutPolicy::default(),
    );
    router(AppState::new(broker), &RoutePaths::default())
}

fn form(path: &str, pairs: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn ask(pairs: &[(&str, &str)]) -> Request<Body> {
    form("/ask", pairs)
}

fn callback(id: &CorrelationId, action: &str, actor: &str, token: &str) -> Request<Body> {
    let payload = json!({
        "token": token,
        "callback_id": id.to_string(),
        "actions": [{ "name": action, "type": "button", "value": action }],
        "user": { "id": "U123", "name": actor },
        "original_message": {
            "text": "",
            "ts": "1700000000.000000",
            "attachments": [{
                "pretext": "deploy?",
                "text": "Waiting for someone's approval...",
                "callback_id": id.to_string(),
                "actions": [
                    { "name": "approve", "text": "Approve", "type": "button", "value": "approve" },
                    { "name": "cancel", "text": "Cancel", "type": "button", "value": "cancel" }
                ]
            }]
        }
    })
    .to_string();
    form("/interactive_action_callback", &[("payload", payload.as_str())])
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test(start_paused = true)]
async fn approve_releases_waiting_request() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    let waiting = tokio::spawn(
        app.clone()
            .oneshot(ask(&[("ch", TEST_CHANNEL), ("msg", "deploy v2?")])),
    );
    let id = notifier.next_send(1).await;

    let response = app
        .clone()
        .oneshot(callback(&id, "approve", "alice", TEST_VERIFICATION_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let message = json_body(response).await;
    let attachment = &message["attachments"][0];
    assert_eq!(attachment["text"], "Approved by @alice");
    assert_eq!(attachment["color"], "good");
    assert_eq!(attachment["actions"], json!([]));
    assert_eq!(message["ts"], "1700000000.000000");

    let response = waiting.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(CONNECTION).unwrap(), "close");
    assert_eq!(json_body(response).await, json!({ "result": "approved" }));

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].channel, TEST_CHANNEL);
    assert_eq!(sent[0].text, "deploy v2?");
    assert!(notifier.updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_returns_forbidden() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    let waiting = tokio::spawn(app.clone().oneshot(ask(&[("ch", "ops"), ("msg", "drop table?")])));
    let id = notifier.next_send(1).await;

    let response = app
        .clone()
        .oneshot(callback(&id, "cancel", "bob", TEST_VERIFICATION_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let message = json_body(response).await;
    assert_eq!(message["attachments"][0]["text"], "Canceled by @bob");
    assert_eq!(message["attachments"][0]["color"], "danger");

    let response = waiting.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await, json!({ "result": "canceled" }));
}

#[tokio::test(start_paused = true)]
async fn deadline_expires_and_rewrites_message() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);
    let start = tokio::time::Instant::now();

    let response = app
        .clone()
        .oneshot(ask(&[("ch", "ops"), ("msg", "deploy?"), ("timeout", "30")]))
        .await
        .unwrap();

    assert!(start.elapsed() >= std::time::Duration::from_secs(30));
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers().get(CONNECTION).unwrap(), "close");
    assert_eq!(json_body(response).await, json!({ "result": "expired" }));
    assert_eq!(notifier.updates(), vec![Outcome::Expired]);
}

#[tokio::test(start_paused = true)]
async fn late_click_is_not_pending() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    let response = app
        .clone()
        .oneshot(ask(&[("ch", "ops"), ("msg", "deploy?"), ("timeout", "0")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let id = notifier.next_send(1).await;

    let response = app
        .oneshot(callback(&id, "approve", "alice", TEST_VERIFICATION_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let reply = json_body(response).await;
    assert_eq!(reply["response_type"], "ephemeral");
    assert_eq!(reply["replace_original"], false);
    assert_eq!(reply["text"], "This approval request is no longer pending.");
}

#[tokio::test]
async fn missing_fields_are_invalid() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    for pairs in [
        &[("msg", "deploy?")][..],
        &[("ch", "ops")][..],
        &[("ch", ""), ("msg", "deploy?")][..],
    ] {
        let response = app.clone().oneshot(ask(pairs)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            json_body(response).await,
            json!({ "result": "invalid request" })
        );
    }
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn bad_timeout_is_rejected_before_posting() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    for timeout in ["9999", "-1", "soon"] {
        let response = app
            .clone()
            .oneshot(ask(&[("ch", "ops"), ("msg", "deploy?"), ("timeout", timeout)]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "timeout {timeout}");
    }
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn notifier_failure_is_server_error() {
    let notifier = MockNotifier::new().with_send_error(NotifierError::Api("channel_not_found".into()));
    let app = app(&notifier);

    let response = app
        .clone()
        .oneshot(ask(&[("ch", "nowhere"), ("msg", "deploy?")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "result": "notifier error" }));

    let health = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(json_body(health).await["pending"], 0);
}

#[tokio::test(start_paused = true)]
async fn wrong_token_does_not_resolve() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    let waiting = tokio::spawn(
        app.clone()
            .oneshot(ask(&[("ch", "ops"), ("msg", "deploy?"), ("timeout", "10")])),
    );
    let id = notifier.next_send(1).await;

    let response = app
        .clone()
        .oneshot(callback(&id, "approve", "mallory", "forged"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = waiting.await.unwrap().unwrap();
    assert_eq!(json_body(response).await, json!({ "result": "expired" }));
}

#[tokio::test(start_paused = true)]
async fn unknown_action_leaves_request_pending() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    let waiting = tokio::spawn(app.clone().oneshot(ask(&[("ch", "ops"), ("msg", "deploy?")])));
    let id = notifier.next_send(1).await;

    let response = app
        .clone()
        .oneshot(callback(&id, "snooze", "alice", TEST_VERIFICATION_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(callback(&id, "approve", "alice", TEST_VERIFICATION_TOKEN))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = waiting.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_callback_is_bad_request() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    let response = app
        .clone()
        .oneshot(form("/interactive_action_callback", &[("payload", "{not json")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(form("/interactive_action_callback", &[("other", "x")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_correlation_id_is_not_found() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    let response = app
        .oneshot(callback(
            &CorrelationId::new(),
            "approve",
            "alice",
            TEST_VERIFICATION_TOKEN,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_on_request_endpoint_is_method_not_allowed() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    let response = app
        .oneshot(Request::get("/ask").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test(start_paused = true)]
async fn healthz_reports_pending_count() {
    let notifier = MockNotifier::new();
    let app = app(&notifier);

    let waiting = tokio::spawn(app.clone().oneshot(ask(&[("ch", "ops"), ("msg", "deploy?")])));
    let id = notifier.next_send(1).await;

    let response = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok", "pending": 1 }));

    app.clone()
        .oneshot(callback(&id, "approve", "alice", TEST_VERIFICATION_TOKEN))
        .await
        .unwrap();
    waiting.await.unwrap().unwrap();

    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(json_body(response).await, json!({ "status": "ok", "pending": 0 }));
}

#[tokio::test]
async fn custom_paths_are_routed() {
    let notifier = MockNotifier::new().with_send_error(NotifierError::Transport("down".into()));
    let broker = ApprovalBroker::new(
        Arc::new(notifier.clone()),
        TEST_VERIFICATION_TOKEN,
        TimeoutPolicy::default(),
    );
    let paths = RoutePaths {
        request_path: "/approve".to_owned(),
        callback_path: "/slack/actions".to_owned(),
    };
    let app = router(AppState::new(broker), &paths);

    let response = app
        .clone()
        .oneshot(form("/approve", &[("ch", "ops"), ("msg", "deploy?")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .oneshot(ask(&[("ch", "ops"), ("msg", "deploy?")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
