//! Configuration loading and validation for the encrypt-and-submit workflow.
//!
//! All values are read from environment variables at startup. Paths and API
//! settings are optional at load time and required only by the commands that
//! use them; [`Config::public_key_path`] and friends enforce that.

use anyhow::{Context, Result};
use common::WorkflowError;
use serde::Deserialize;
use tracing::error;

/// Validated workflow configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Armored OpenPGP public key of the payload recipient.
    #[serde(default)]
    pub public_key_path: Option<String>,

    /// Armored, unprotected OpenPGP private key used by `decrypt`.
    #[serde(default)]
    pub private_key_path: Option<String>,

    /// Submission endpoint URL (`http://` or `https://`).
    #[serde(default)]
    pub api_endpoint: Option<String>,

    /// Bearer token sent with every submission. Never logged.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Submit only the base64 armor body instead of the full armored message.
    #[serde(default)]
    pub submit_strip_armor: bool,

    /// Log the serialised plaintext payload at debug level. Sensitive.
    #[serde(default)]
    pub log_plaintext: bool,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("public_key_path", &self.public_key_path)
            .field("private_key_path", &self.private_key_path)
            .field("api_endpoint", &self.api_endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("submit_strip_armor", &self.submit_strip_armor)
            .field("log_plaintext", &self.log_plaintext)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate the fields that are present, returning the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.public_key_path, "PUBLIC_KEY_PATH")?;
        ensure_non_empty(&self.private_key_path, "PRIVATE_KEY_PATH")?;
        ensure_non_empty(&self.api_token, "API_TOKEN")?;
        ensure_non_empty(&self.api_endpoint, "API_ENDPOINT")?;

        if let Some(endpoint) = &self.api_endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                anyhow::bail!("API_ENDPOINT must be an http:// or https:// URL");
            }
        }
        Ok(())
    }

    pub fn public_key_path(&self) -> Result<&str, WorkflowError> {
        require(&self.public_key_path, "PUBLIC_KEY_PATH")
    }

    pub fn private_key_path(&self) -> Result<&str, WorkflowError> {
        require(&self.private_key_path, "PRIVATE_KEY_PATH")
    }

    pub fn api_endpoint(&self) -> Result<&str, WorkflowError> {
        require(&self.api_endpoint, "API_ENDPOINT")
    }

    pub fn api_token(&self) -> Result<&str, WorkflowError> {
        require(&self.api_token, "API_TOKEN")
    }
}

fn ensure_non_empty(value: &Option<String>, name: &str) -> Result<()> {
    if let Some(v) = value {
        if v.trim().is_empty() {
            anyhow::bail!("{name} must not be empty when set");
        }
    }
    Ok(())
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, WorkflowError> {
    value.as_deref().ok_or_else(|| {
        let err = WorkflowError::Config(format!("{name} is required for this command"));
        error!(error = %err, kind = err.kind(), "missing configuration");
        err
    })
}
