//! Shared helpers for tests that need a `/predict` server.

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// One request seen by the mock server
#[derive(Debug, Clone)]
pub(crate) struct ReceivedRequest {
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

pub(crate) struct MockPredictServer {
    pub url: String,
    pub requests: Arc<Mutex<Vec<ReceivedRequest>>>,
}

/// Serve `POST /predict` on an ephemeral port, answering every request
/// with `status` and `body`
pub(crate) async fn spawn_predict_server(status: StatusCode, body: &'static str) -> MockPredictServer {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    let app = Router::new().route(
        "/predict",
        post(move |headers: HeaderMap, Json(payload): Json<serde_json::Value>| {
            let recorded = Arc::clone(&recorded);
            async move {
                recorded.lock().push(ReceivedRequest {
                    content_type: headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                    body: payload,
                });
                (status, body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockPredictServer {
        url: format!("http://{}/predict", addr),
        requests,
    }
}

/// URL on which nothing is listening
pub(crate) async fn unreachable_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/predict", addr)
}

/// Serve `POST /predict` but hold every response for `delay`
pub(crate) async fn spawn_stalled_predict_server(delay: Duration) -> String {
    let app = Router::new().route(
        "/predict",
        post(move || async move {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, r#"{"result":"late"}"#)
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/predict", addr)
}
