//! Reference mock server for local testing of the dispatcher.
//!
//! Ports the behavior of the original Flask reference
//! (`examples/original_source/simple_rest_server.py`) to an `axum`
//! service: per-key sliding-window rate limiting, nonce ordering
//! enforcement, credential blocking after repeated 429s, and randomized
//! inbound/outbound latency on every code path.

mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;

use state::{timestamp_ms, AppState, PerKeyState, MAX_429_REJECTS, MAX_LATENCY_MS, VALID_API_KEYS};

#[derive(Debug, Deserialize)]
struct RequestParams {
    api_key: Option<String>,
    nonce: Option<String>,
    req_id: Option<String>,
}

async fn random_latency() {
    let ms = rand::thread_rng().gen_range(0..=MAX_LATENCY_MS);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

async fn api_request(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RequestParams>,
) -> impl IntoResponse {
    random_latency().await;

    let Some(api_key) = params.api_key else {
        return error_response(StatusCode::UNAUTHORIZED, "invalid api key").await;
    };
    if !VALID_API_KEYS.contains(&api_key.as_str()) {
        return error_response(StatusCode::UNAUTHORIZED, "invalid api key").await;
    }

    let mut keys = state.keys.lock().expect("state mutex poisoned");
    let key_state = keys.entry(api_key).or_insert_with(PerKeyState::default);

    if key_state.error_429s >= MAX_429_REJECTS {
        drop(keys);
        return error_response(StatusCode::FORBIDDEN, "too many rate limit errors: blocked").await;
    }

    if !key_state.rate_limiter.acquire_slot_if_possible() {
        key_state.error_429s += 1;
        drop(keys);
        return error_response(StatusCode::TOO_MANY_REQUESTS, "exceeded rate limit").await;
    }

    let nonce = match params.nonce.as_deref().map(str::parse::<i64>) {
        Some(Ok(nonce)) if nonce > key_state.prev_nonce => nonce,
        _ => {
            drop(keys);
            return error_response(StatusCode::BAD_REQUEST, "invalid nonce").await;
        }
    };
    key_state.prev_nonce = nonce;
    drop(keys);

    random_latency().await;

    (
        StatusCode::OK,
        Json(json!({
            "status": "OK",
            "req_id": params.req_id.unwrap_or_default(),
        })),
    )
        .into_response()
}

async fn error_response(status: StatusCode, message: &str) -> axum::response::Response {
    random_latency().await;
    (status, Json(json!({"status": "error", "error_msg": message}))).into_response()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let state = Arc::new(AppState::new());
    let app = Router::new()
        .route("/api/request", get(api_request))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 9999));
    tracing::info!(%addr, "mock server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind mock server address");
    axum::serve(listener, app)
        .await
        .expect("mock server stopped unexpectedly");
}
