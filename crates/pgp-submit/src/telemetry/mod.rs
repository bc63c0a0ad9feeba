//! Structured logging setup.
//!
//! # Telemetry invariants
//!
//! - **No key material or bearer tokens** may appear in any log field.
//! - Payload plaintext is logged only when `LOG_PLAINTEXT=true`.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden
//!   by `RUST_LOG` when set.

pub mod init;

pub use init::init_telemetry;
