//! HTTP surface tests for omega-gateway, driven through the router in-process

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use omega_core::{DriftParameters, Signal, Vote};
use omega_gate::{ConsensusGate, DriftMonitor, Witness, WitnessPanel};
use omega_gateway::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(drift: f64) -> (axum::Router, Arc<ConsensusGate>) {
    let gate = Arc::new(
        ConsensusGate::builder()
            .drift(DriftMonitor::new(DriftParameters::bounded(drift, 0.7, 0.6)))
            .panel(WitnessPanel::simulated(&["claude", "deepseek", "gpt"], Some(17)))
            .build(),
    );
    let state = Arc::new(AppState::new(gate.clone()));
    (build_router(state), gate)
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_signal(content: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/consensus/signal")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "content": content }).to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_gate_state() {
    let (app, _) = app(0.6);
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["mode"], "BALANCED");
    assert_eq!(body["dissent_count"], 0);
}

#[tokio::test]
async fn reflex_signal_over_http() {
    let (app, gate) = app(0.6);
    let resp = app.oneshot(post_signal(json!("chicka chicka orange"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "EXECUTED");
    assert_eq!(body["tier"], "REFLEX");
    assert_eq!(gate.dissent_count().unwrap(), 0);
}

#[tokio::test]
async fn held_signal_fills_dissent_endpoint() {
    let (app, _) = app(1.0);
    let resp = app
        .clone()
        .oneshot(post_signal(json!("analyze the relay")))
        .await
        .unwrap();
    let decision = json_body(resp).await;
    assert_eq!(decision["status"], "HELD_FOR_ARBITRATION");
    assert_eq!(decision["quorum"], "multitude");

    let ledger = json_body(app.clone().oneshot(get("/consensus/dissent")).await.unwrap()).await;
    assert_eq!(ledger.as_array().unwrap().len(), 3);
    assert_eq!(ledger[0]["signal_id"], decision["signal_id"]);

    let status = json_body(app.oneshot(get("/consensus/status")).await.unwrap()).await;
    assert_eq!(status["dissent_count"], 3);
    assert_eq!(status["recent_dissent"].as_array().unwrap().len(), 3);
    assert_eq!(status["mode"], "CRITICAL");
}

#[tokio::test]
async fn missing_content_is_treated_as_empty() {
    let (app, _) = app(0.0);
    let req = Request::builder()
        .method("POST")
        .uri("/consensus/signal")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let body = json_body(app.oneshot(req).await.unwrap()).await;
    assert_eq!(body["tier"], "TACTICAL");
    assert_eq!(body["status"], "AUTHORIZED");
}

/// Witness that panics on every evaluation.
struct Crashing;

impl Witness for Crashing {
    fn id(&self) -> &str {
        "crashing"
    }

    fn evaluate(&mut self, _signal: &Signal, _params: &DriftParameters) -> Vote {
        panic!("witness crashed");
    }
}

#[tokio::test]
async fn poisoned_gate_answers_500() {
    let gate = Arc::new(
        ConsensusGate::builder()
            .panel(WitnessPanel::new(vec![Box::new(Crashing)]))
            .build(),
    );
    let worker = gate.clone();
    assert!(std::thread::spawn(move || worker.submit(json!("analyze"))).join().is_err());
    let app = build_router(Arc::new(AppState::new(gate)));

    let resp = app.clone().oneshot(get("/consensus/status")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert!(body["error"].as_str().unwrap().contains("poisoned"));

    let resp = app.clone().oneshot(post_signal(json!("chicka chicka orange"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
