//! Sequential encrypt → frame → submit pipeline, and the decrypt demonstration.
//!
//! Steps run strictly one after another; nothing is shared between calls.

use std::path::Path;

use common::WorkflowError;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::config::Config;
use crate::crypto::{self, armor};
use crate::transport;

/// Encrypt `payload` to the configured recipient and return the armored message.
pub async fn encrypt_payload<T>(cfg: &Config, payload: &T) -> Result<String, WorkflowError>
where
    T: Serialize + ?Sized,
{
    crypto::encrypt_object(payload, cfg.public_key_path()?, cfg.log_plaintext).await
}

/// Encrypt `payload` and submit it to the configured endpoint.
///
/// With `SUBMIT_STRIP_ARMOR=true` only the armor body is sent; otherwise the
/// full armored message is. Returns the parsed API response.
pub async fn encrypt_and_submit<T>(
    cfg: &Config,
    client: &Client,
    payload: &T,
) -> Result<Value, WorkflowError>
where
    T: Serialize + ?Sized,
{
    let endpoint = cfg.api_endpoint()?;
    let token = cfg.api_token()?;

    let armored = encrypt_payload(cfg, payload).await?;
    let data = if cfg.submit_strip_armor {
        armor::armor_body(&armored).map_err(|err| {
            error!(error = %err, kind = err.kind(), "failed to strip armor framing");
            err
        })?
    } else {
        armored
    };

    info!(%endpoint, strip_armor = cfg.submit_strip_armor, "submitting encrypted payload");
    transport::submit(client, &data, endpoint, token).await
}

/// Read an armored message from `message_path` and decrypt it with the
/// configured private key.
pub async fn decrypt_file(cfg: &Config, message_path: &Path) -> Result<String, WorkflowError> {
    let private_key_path = cfg.private_key_path()?;

    let armored = tokio::fs::read_to_string(message_path).await.map_err(|source| {
        let err = WorkflowError::Io {
            path: message_path.display().to_string(),
            source,
        };
        error!(error = %err, kind = err.kind(), "failed to read armored message");
        err
    })?;

    crypto::decrypt_message(&armored, private_key_path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use common::protocol::{LoginPayload, SubmitRequest};
    use serde_json::json;
    use std::io::Write;

    fn fixture(name: &str) -> String {
        format!("{}/testdata/{name}", env!("CARGO_MANIFEST_DIR"))
    }

    fn test_config(endpoint: Option<String>) -> Config {
        Config {
            public_key_path: Some(fixture("recipient_public.asc")),
            private_key_path: Some(fixture("recipient_private.asc")),
            api_endpoint: endpoint,
            api_token: Some("test-token".into()),
            submit_strip_armor: false,
            log_plaintext: false,
            log_level: "debug".into(),
        }
    }

    /// API double that echoes the submitted `data` field back.
    async fn spawn_api() -> String {
        let app = Router::new()
            .route(
                "/verify",
                post(|Json(req): Json<SubmitRequest>| async move {
                    Json(json!({"status": "ok", "echo": req.data}))
                }),
            )
            .route(
                "/down",
                post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn submitted_ciphertext_decrypts_to_payload() {
        let base = spawn_api().await;
        let cfg = test_config(Some(format!("{base}/verify")));
        let payload = LoginPayload {
            email: "a@b.com".into(),
            device_id: "1".into(),
        };

        let resp = encrypt_and_submit(&cfg, &Client::new(), &payload)
            .await
            .unwrap();
        assert_eq!(resp["status"], "ok");

        let sent = resp["echo"].as_str().unwrap();
        assert!(sent.starts_with("-----BEGIN PGP MESSAGE-----"));
        let plaintext = crypto::decrypt_message(sent, fixture("recipient_private.asc"))
            .await
            .unwrap();
        assert_eq!(plaintext, r#"{"email":"a@b.com","deviceId":"1"}"#);
    }

    #[tokio::test]
    async fn strip_armor_sends_body_only() {
        let base = spawn_api().await;
        let cfg = Config {
            submit_strip_armor: true,
            ..test_config(Some(format!("{base}/verify")))
        };

        let resp = encrypt_and_submit(&cfg, &Client::new(), &json!({"k": "v"}))
            .await
            .unwrap();
        let body = resp["echo"].as_str().unwrap();
        assert!(!body.contains("-----"));

        let rewrapped = format!("-----BEGIN PGP MESSAGE-----\n\n{body}\n-----END PGP MESSAGE-----\n");
        let plaintext = crypto::decrypt_message(&rewrapped, fixture("recipient_private.asc"))
            .await
            .unwrap();
        assert_eq!(plaintext, r#"{"k":"v"}"#);
    }

    #[tokio::test]
    async fn server_failure_propagates_status() {
        let base = spawn_api().await;
        let cfg = test_config(Some(format!("{base}/down")));
        let err = encrypt_and_submit(&cfg, &Client::new(), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn missing_endpoint_is_config_error() {
        let cfg = test_config(None);
        let err = encrypt_and_submit(&cfg, &Client::new(), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[tokio::test]
    async fn decrypt_file_reads_armored_message() {
        let cfg = test_config(None);
        let armored = encrypt_payload(&cfg, &json!({"hello": "world"})).await.unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(armored.as_bytes()).unwrap();

        let plaintext = decrypt_file(&cfg, file.path()).await.unwrap();
        assert_eq!(plaintext, r#"{"hello":"world"}"#);
    }

    #[tokio::test]
    async fn decrypt_file_missing_message_is_io_error() {
        let cfg = test_config(None);
        let err = decrypt_file(&cfg, Path::new("/no/such/message.asc"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "io");
    }
}
