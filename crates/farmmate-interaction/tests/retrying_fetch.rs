use std::time::Duration;

use farmmate_core::FarmmateError;
use farmmate_core::config::{Backoff, RetryPolicy};
use farmmate_interaction::{FetchBody, RetryingFetch};
use reqwest::Client;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_attempts(max_attempts)
        .with_backoff(Backoff::Fixed { delay_ms: 10 })
}

fn fetch(max_attempts: u32) -> RetryingFetch {
    RetryingFetch::new(Client::new(), fast_policy(max_attempts))
}

fn get(client: &RetryingFetch, server: &MockServer, route: &str) -> reqwest::RequestBuilder {
    client.client().get(format!("{}{}", server.uri(), route))
}

#[tokio::test]
async fn test_always_failing_endpoint_is_called_exactly_n_times() {
    for n in [1u32, 3, 4] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .expect(u64::from(n))
            .mount(&server)
            .await;

        let client = fetch(n);
        let err = client.send(|| get(&client, &server, "/flaky")).await.unwrap_err();

        match &err {
            FarmmateError::RetriesExhausted { attempts, last } => {
                assert_eq!(*attempts, n);
                assert_eq!(last.status(), Some(503));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_success_on_attempt_k_stops_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"messages": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = fetch(5);
    let body = client.send(|| get(&client, &server, "/history")).await.unwrap();
    assert_eq!(body, FetchBody::Json(json!({"messages": []})));
}

#[tokio::test]
async fn test_no_content_is_not_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/bookmarks/B1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = fetch(3);
    let body = client
        .send(|| {
            client
                .client()
                .delete(format!("{}/bookmarks/B1", server.uri()))
        })
        .await
        .unwrap();
    assert_eq!(body, FetchBody::NoContent);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": null, "error": "invalid cropId"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = fetch(5);
    let err = client.send(|| get(&client, &server, "/bad")).await.unwrap_err();
    match err {
        FarmmateError::Http {
            status,
            message,
            retryable,
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid cropId");
            assert!(!retryable);
        }
        other => panic!("expected Http, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_success_is_data_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = fetch(3);
    let err = client.send(|| get(&client, &server, "/html")).await.unwrap_err();
    assert!(err.is_data_format());
}

#[tokio::test]
async fn test_retry_after_overrides_policy_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RetryingFetch::new(
        Client::new(),
        RetryPolicy::default().with_backoff(Backoff::Fixed { delay_ms: 60_000 }),
    );
    let result = tokio::time::timeout(
        Duration::from_secs(10),
        client.send(|| get(&client, &server, "/busy")),
    )
    .await
    .expect("Retry-After: 0 should replace the 60s policy delay");
    assert_eq!(result.unwrap(), FetchBody::Json(json!({"ok": true})));
}

#[tokio::test]
async fn test_transport_failure_is_retried() {
    // Reserve a port, then free it so connections are refused.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let client = fetch(2);
    let err = client
        .send(|| client.client().get(format!("{uri}/gone")))
        .await
        .unwrap_err();
    match err {
        FarmmateError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, FarmmateError::Network(_)));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let client = fetch(3).with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(10),
        client.send(|| get(&client, &server, "/slow")),
    )
    .await
    .expect("cancellation should end the request early")
    .unwrap_err();
    assert!(err.is_cancelled());
    canceller.await.unwrap();
}

#[tokio::test]
async fn test_cancelled_token_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    token.cancel();
    let client = fetch(3).with_cancellation(token);

    let err = client.send(|| get(&client, &server, "/any")).await.unwrap_err();
    assert!(err.is_cancelled());
}
