//! `pgp-submit` — encrypt a JSON payload to an OpenPGP recipient and submit it.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured logging.
//! 3. Run the requested command:
//!    - `submit <json>`: encrypt the payload and POST it to `API_ENDPOINT`.
//!    - `login <email> <device-id>`: same, with a login verification payload.
//!    - `encrypt <json>`: print the armored ciphertext.
//!    - `decrypt <file>`: decrypt an armored message with `PRIVATE_KEY_PATH`.
//!
//! Any failure is logged once more here and ends the process with a non-zero
//! exit status.

mod config;
mod crypto;
mod telemetry;
mod transport;
mod workflow;

use std::path::Path;

use anyhow::Result;
use common::protocol::LoginPayload;
use common::WorkflowError;
use serde_json::Value;
use tracing::{error, info};

use config::Config;

fn print_usage() {
    eprintln!(
        "Usage: pgp-submit <command> [args]\n\nCommands:\n  submit <json-object>          encrypt and POST to API_ENDPOINT\n  login <email> <device-id>     encrypt and POST a login payload\n  encrypt <json-object>         print the armored ciphertext\n  decrypt <armored-file>        decrypt with PRIVATE_KEY_PATH\n\nEnvironment:\n  PUBLIC_KEY_PATH, PRIVATE_KEY_PATH, API_ENDPOINT, API_TOKEN,\n  SUBMIT_STRIP_ARMOR (default false), LOG_PLAINTEXT (default false), LOG_LEVEL"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        print_usage();
        std::process::exit(2);
    };

    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level)?;
    info!(version = env!("CARGO_PKG_VERSION"), command, "pgp-submit starting");

    // -----------------------------------------------------------------------
    // 3. Command
    // -----------------------------------------------------------------------
    let result = match (command, &args[1..]) {
        ("submit", [json]) => match parse_payload(json) {
            Ok(payload) => submit(&cfg, &payload).await,
            Err(e) => Err(e),
        },
        ("login", [email, device_id]) => {
            let payload = LoginPayload {
                email: email.clone(),
                device_id: device_id.clone(),
            };
            submit(&cfg, &payload).await
        }
        ("encrypt", [json]) => match parse_payload(json) {
            Ok(payload) => workflow::encrypt_payload(&cfg, &payload).await,
            Err(e) => Err(e),
        },
        ("decrypt", [path]) => workflow::decrypt_file(&cfg, Path::new(path)).await,
        _ => {
            print_usage();
            std::process::exit(2);
        }
    };

    match result {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, kind = e.kind(), status = ?e.status(), command, "command failed");
            Err(e.into())
        }
    }
}

async fn submit<T>(cfg: &Config, payload: &T) -> Result<String, WorkflowError>
where
    T: serde::Serialize + ?Sized,
{
    let client = reqwest::Client::new();
    let response = workflow::encrypt_and_submit(cfg, &client, payload).await?;
    Ok(response.to_string())
}

fn parse_payload(json: &str) -> Result<Value, WorkflowError> {
    serde_json::from_str(json).map_err(|e| {
        let err = WorkflowError::Format(format!("payload is not valid JSON: {e}"));
        error!(error = %err, kind = err.kind(), "invalid payload argument");
        err
    })
}
