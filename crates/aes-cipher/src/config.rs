//! Configuration loading and validation for the AES cipher utility.
//!
//! Key material is read from the environment at startup and never compiled in.

use anyhow::{Context, Result};
use serde::Deserialize;

/// How the initialisation vector is chosen for each encryption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IvMode {
    /// Reuse the configured IV for every call. Output is deterministic and
    /// interoperable with plain `base64(AES-CBC(plaintext))` consumers.
    #[default]
    Fixed,
    /// Draw a fresh IV per call and prepend it to the ciphertext.
    Random,
}

/// Validated cipher utility configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64-encoded AES key (16, 24 or 32 bytes). **Required.**
    pub aes_secret_key: String,

    /// Base64-encoded 16-byte IV. **Required.**
    pub aes_iv: String,

    /// IV selection mode: `fixed` or `random`.
    #[serde(default)]
    pub aes_iv_mode: IvMode,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("aes_secret_key", &"[REDACTED]")
            .field("aes_iv", &"[REDACTED]")
            .field("aes_iv_mode", &self.aes_iv_mode)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build aes-cipher configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise aes-cipher configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.aes_secret_key.trim().is_empty() {
            anyhow::bail!("AES_SECRET_KEY is required and must not be empty");
        }
        if self.aes_iv.trim().is_empty() {
            anyhow::bail!("AES_IV is required and must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            aes_secret_key: "AlxG7Z/xlKBRP1udxKYmuizlJxzRry4fwDX2Bw3cWJ4=".into(),
            aes_iv: "awSJyoShJ7KeodJQsKpRiA==".into(),
            aes_iv_mode: IvMode::default(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(IvMode::default(), IvMode::Fixed);
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_key() {
        let cfg = Config {
            aes_secret_key: "  ".into(),
            ..sample()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_iv() {
        let cfg = Config {
            aes_iv: "".into(),
            ..sample()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_hides_key_material() {
        let rendered = format!("{:?}", sample());
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("AlxG7Z"));
        assert!(!rendered.contains("awSJyo"));
    }
}
