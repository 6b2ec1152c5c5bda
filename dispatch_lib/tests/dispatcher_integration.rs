use std::time::Duration;

use dispatch_api::{ApiClient, Clock};
use dispatch_lib::producer::Producer;
use dispatch_lib::queue::RequestQueue;
use dispatch_lib::worker::Worker;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NUM_WORKERS: usize = 5;

async fn run_for(server: &MockServer, duration: Duration) {
    let clock = Clock::new();
    let (queue, receiver) = RequestQueue::unbounded();
    let cancel = CancellationToken::new();

    let producer = Producer::new(queue, clock, NUM_WORKERS);
    let mut tasks = vec![tokio::spawn(producer.run(cancel.clone()))];

    for i in 0..NUM_WORKERS {
        let client = ApiClient::with_base_url(format!("{}/api/request", server.uri()));
        let worker = Worker::new(
            format!("key-{i}"),
            receiver.clone(),
            clock,
            client,
            Duration::from_secs(1),
        );
        tasks.push(tokio::spawn(worker.run(cancel.clone())));
    }
    drop(receiver);

    tokio::time::sleep(duration).await;
    cancel.cancel();
    for task in tasks {
        let _ = tokio::time::timeout(Duration::from_secs(2), task).await;
    }
}

/// S1 (scaled down): a server that always returns 200 OK quickly should
/// receive a steady stream of requests with none classified as dropped
/// -- there is no TTL-drop counter at this layer, but the worker must
/// not panic and the server must see a nontrivial number of calls.
#[tokio::test]
async fn steady_state_throughput_against_a_healthy_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "req_id": "0"
        })))
        .mount(&server)
        .await;

    run_for(&server, Duration::from_millis(500)).await;

    let requests = server.received_requests().await.unwrap();
    assert!(
        !requests.is_empty(),
        "expected at least one request to reach the healthy server"
    );
    for req in &requests {
        assert!(req.url.query_pairs().any(|(k, _)| k == "api_key"));
        assert!(req.url.query_pairs().any(|(k, _)| k == "nonce"));
        assert!(req.url.query_pairs().any(|(k, _)| k == "req_id"));
    }
}

/// Invariant 5 ("no retry"): each `req_id` is produced once by the
/// Producer and never resubmitted, so it must appear at most once at
/// the HTTP boundary even under sustained load.
#[tokio::test]
async fn req_id_never_appears_twice_at_the_http_boundary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "req_id": "0"
        })))
        .mount(&server)
        .await;

    run_for(&server, Duration::from_millis(500)).await;

    let requests = server.received_requests().await.unwrap();
    assert!(!requests.is_empty(), "expected at least one request to reach the server");

    let mut req_ids: Vec<String> = requests
        .iter()
        .map(|req| {
            req.url
                .query_pairs()
                .find(|(k, _)| k == "req_id")
                .map(|(_, v)| v.into_owned())
                .expect("every request carries a req_id")
        })
        .collect();
    let before = req_ids.len();
    req_ids.sort_unstable();
    req_ids.dedup();
    assert_eq!(req_ids.len(), before, "a req_id was sent to the server more than once");
}

/// S4: a server that always returns 429 must not crash the client; the
/// client keeps issuing at the same cadence (no backoff is specified).
#[tokio::test]
async fn server_429_storm_does_not_crash_the_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/request"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "status": "error",
            "error_msg": "exceeded rate limit"
        })))
        .mount(&server)
        .await;

    run_for(&server, Duration::from_millis(400)).await;

    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() > 1, "client should keep retrying fresh requests after 429s");
}

/// S5: a server returning non-JSON bodies must not crash the client.
#[tokio::test]
async fn malformed_json_does_not_crash_the_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/request"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    run_for(&server, Duration::from_millis(400)).await;

    let requests = server.received_requests().await.unwrap();
    assert!(requests.len() > 1, "client should keep issuing fresh requests despite malformed bodies");
}
