//! Error taxonomy shared by both binaries.

use thiserror::Error;

/// Top-level workflow error type.
///
/// Every variant is logged where it is detected and then propagated unchanged;
/// there is no recovery path. [`WorkflowError::kind`] gives a stable label for
/// log fields:
/// - [`WorkflowError::Config`] → `"config"`
/// - [`WorkflowError::Io`] → `"io"`
/// - [`WorkflowError::Format`] → `"format"`
/// - [`WorkflowError::Crypto`] → `"crypto"`
/// - [`WorkflowError::Transport`] → `"transport"`
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Key material or another setting is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A file could not be read.
    #[error("i/o error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A key, message, or ciphertext failed structural parsing.
    #[error("format error: {0}")]
    Format(String),

    /// A cryptographic operation failed (wrong key, bad passphrase, bad padding).
    #[error("cryptographic error: {0}")]
    Crypto(String),

    /// The HTTP request failed or returned a non-success status.
    #[error("transport error: {message}")]
    Transport {
        /// HTTP status code, absent when no response was received.
        status: Option<u16>,
        message: String,
    },
}

impl WorkflowError {
    /// Short machine-readable category, used as the `kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::Config(_) => "config",
            WorkflowError::Io { .. } => "io",
            WorkflowError::Format(_) => "format",
            WorkflowError::Crypto(_) => "crypto",
            WorkflowError::Transport { .. } => "transport",
        }
    }

    /// HTTP status carried by a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            WorkflowError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(WorkflowError::Config("x".into()).kind(), "config");
        assert_eq!(WorkflowError::Format("x".into()).kind(), "format");
        assert_eq!(WorkflowError::Crypto("x".into()).kind(), "crypto");
        let io = WorkflowError::Io {
            path: "/nope".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(io.kind(), "io");
        let transport = WorkflowError::Transport {
            status: Some(502),
            message: "bad gateway".into(),
        };
        assert_eq!(transport.kind(), "transport");
    }

    #[test]
    fn status_only_on_transport() {
        let e = WorkflowError::Transport {
            status: Some(500),
            message: "API request failed with status: 500".into(),
        };
        assert_eq!(e.status(), Some(500));
        assert_eq!(WorkflowError::Crypto("x".into()).status(), None);
    }

    #[test]
    fn display_includes_message() {
        let e = WorkflowError::Format("invalid armor".into());
        assert!(e.to_string().contains("invalid armor"));

        let io = WorkflowError::Io {
            path: "/keys/public.asc".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(io.to_string().contains("/keys/public.asc"));
    }
}
