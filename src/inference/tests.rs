use super::*;
use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::test_support::{spawn_predict_server, spawn_stalled_predict_server, unreachable_endpoint};
use axum::http::StatusCode;
use std::time::{Duration, Instant};

const IMAGE: &str = "data:image/jpeg;base64,/9j/4AAQ";

fn create_test_inference_config(endpoint: String) -> InferenceConfig {
    InferenceConfig {
        endpoint,
        timeout_seconds: Some(5),
    }
}

#[tokio::test]
async fn test_predict_returns_label() {
    let server = spawn_predict_server(StatusCode::OK, r#"{"result":"Fresh"}"#).await;
    let client = HttpInferenceClient::new(&create_test_inference_config(server.url.clone())).unwrap();

    let label = client.predict(IMAGE).await.unwrap();
    assert_eq!(label, "Fresh");

    let requests = server.requests.lock();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(requests[0].body, serde_json::json!({ "image": IMAGE }));
}

#[tokio::test]
async fn test_predict_non_success_status() {
    let server =
        spawn_predict_server(StatusCode::INTERNAL_SERVER_ERROR, r#"{"result":"ignored"}"#).await;
    let client = HttpInferenceClient::new(&create_test_inference_config(server.url.clone())).unwrap();

    let result = client.predict(IMAGE).await;
    assert!(matches!(result, Err(InferenceError::Status { code: 500 })));
}

#[tokio::test]
async fn test_predict_non_json_body() {
    let server = spawn_predict_server(StatusCode::OK, "<html>oops</html>").await;
    let client = HttpInferenceClient::new(&create_test_inference_config(server.url.clone())).unwrap();

    let result = client.predict(IMAGE).await;
    assert!(matches!(result, Err(InferenceError::Decode { .. })));
}

#[tokio::test]
async fn test_predict_missing_result_field() {
    let server = spawn_predict_server(StatusCode::OK, r#"{"label":"Fresh"}"#).await;
    let client = HttpInferenceClient::new(&create_test_inference_config(server.url.clone())).unwrap();

    let result = client.predict(IMAGE).await;
    assert!(matches!(result, Err(InferenceError::Decode { .. })));
}

#[tokio::test]
async fn test_predict_unreachable_server() {
    let endpoint = unreachable_endpoint().await;
    let client = HttpInferenceClient::new(&create_test_inference_config(endpoint)).unwrap();

    let result = client.predict(IMAGE).await;
    assert!(matches!(result, Err(InferenceError::Transport { .. })));
}

#[tokio::test]
async fn test_predict_times_out_as_transport_error() {
    let endpoint = spawn_stalled_predict_server(Duration::from_secs(30)).await;
    let client = HttpInferenceClient::new(&InferenceConfig {
        endpoint,
        timeout_seconds: Some(1),
    })
    .unwrap();

    let started = Instant::now();
    let result = client.predict(IMAGE).await;
    let elapsed = started.elapsed();

    match result {
        Err(InferenceError::Transport { source, .. }) => assert!(source.is_timeout()),
        other => panic!("Expected a transport timeout, got {:?}", other),
    }
    assert!(elapsed >= Duration::from_millis(900), "returned after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(10), "returned after {:?}", elapsed);
}

#[test]
fn test_client_trims_endpoint() {
    let client = HttpInferenceClient::new(&create_test_inference_config(
        "  http://127.0.0.1:5000/predict ".to_string(),
    ))
    .unwrap();

    assert_eq!(client.endpoint(), "http://127.0.0.1:5000/predict");
}
