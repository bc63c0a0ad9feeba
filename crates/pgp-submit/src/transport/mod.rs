//! Submission of ciphertext to the remote API.
//!
//! One POST per call: no retry, no backoff, no timeout. Callers that need
//! resilience wrap [`submit`] themselves.

use common::protocol::SubmitRequest;
use common::WorkflowError;
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

/// POST `{"data": ciphertext}` to `endpoint` with a bearer token.
///
/// On a 2xx response the body is parsed as JSON, logged, and returned.
///
/// # Errors
///
/// Returns [`WorkflowError::Transport`] with the status code for any non-2xx
/// response or an unparseable body, and without a status when no response
/// was received.
pub async fn submit(
    client: &Client,
    ciphertext: &str,
    endpoint: &str,
    token: &str,
) -> Result<Value, WorkflowError> {
    let body = SubmitRequest::new(ciphertext);

    let response = client
        .post(endpoint)
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .map_err(|e| {
            log_failure(
                endpoint,
                WorkflowError::Transport {
                    status: e.status().map(|s| s.as_u16()),
                    message: format!("API request failed: {e}"),
                },
            )
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(log_failure(
            endpoint,
            WorkflowError::Transport {
                status: Some(status.as_u16()),
                message: format!("API request failed with status: {}", status.as_u16()),
            },
        ));
    }

    let data: Value = response.json().await.map_err(|e| {
        log_failure(
            endpoint,
            WorkflowError::Transport {
                status: Some(status.as_u16()),
                message: format!("invalid JSON in API response: {e}"),
            },
        )
    })?;

    info!(%endpoint, status = status.as_u16(), response = %data, "API response");
    Ok(data)
}

fn log_failure(endpoint: &str, err: WorkflowError) -> WorkflowError {
    error!(%endpoint, status = ?err.status(), error = %err, kind = err.kind(), "submission failed");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header, HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::json;

    async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        Json(json!({
            "authorization": header_str(header::AUTHORIZATION),
            "contentType": header_str(header::CONTENT_TYPE),
            "received": body,
        }))
    }

    async fn spawn_api() -> String {
        let app = Router::new()
            .route("/verify", post(echo))
            .route(
                "/fail",
                post(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": "boom"})),
                    )
                }),
            )
            .route("/plain", post(|| async { "ok" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn success_posts_envelope_with_bearer_token() {
        let base = spawn_api().await;
        let client = Client::new();
        let resp = submit(&client, "CIPHERTEXT", &format!("{base}/verify"), "tok123")
            .await
            .unwrap();
        assert_eq!(resp["authorization"], "Bearer tok123");
        assert_eq!(resp["contentType"], "application/json");
        assert_eq!(resp["received"], json!({"data": "CIPHERTEXT"}));
    }

    #[tokio::test]
    async fn server_error_surfaces_status() {
        let base = spawn_api().await;
        let client = Client::new();
        let err = submit(&client, "x", &format!("{base}/fail"), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn unknown_route_surfaces_404() {
        let base = spawn_api().await;
        let client = Client::new();
        let err = submit(&client, "x", &format!("{base}/missing"), "t")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn non_json_success_body_is_transport_error() {
        let base = spawn_api().await;
        let client = Client::new();
        let err = submit(&client, "x", &format!("{base}/plain"), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert_eq!(err.status(), Some(200));
    }

    #[tokio::test]
    async fn connection_failure_has_no_status() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::new();
        let err = submit(&client, "x", &format!("http://{addr}/verify"), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "transport");
        assert_eq!(err.status(), None);
    }
}
