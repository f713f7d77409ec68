//! LLV-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, LlvError>;

/// Top-level error type for the log viewer.
#[derive(Debug, Error)]
pub enum LlvError {
    #[error("[LLV-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[LLV-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[LLV-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[LLV-2001] source unavailable during {operation}: {details}")]
    SourceUnavailable {
        operation: &'static str,
        details: String,
    },

    #[error("[LLV-2002] malformed backend response from {operation}: {details}")]
    MalformedResponse {
        operation: &'static str,
        details: String,
    },

    #[error("[LLV-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[LLV-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[LLV-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[LLV-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl LlvError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "LLV-1001",
            Self::MissingConfig { .. } => "LLV-1002",
            Self::ConfigParse { .. } => "LLV-1003",
            Self::SourceUnavailable { .. } => "LLV-2001",
            Self::MalformedResponse { .. } => "LLV-2002",
            Self::Serialization { .. } => "LLV-2101",
            Self::Io { .. } => "LLV-3002",
            Self::ChannelClosed { .. } => "LLV-3003",
            Self::Runtime { .. } => "LLV-3900",
        }
    }

    /// Whether the failure came from the logging or metadata backend.
    ///
    /// Source failures abort the current refresh cycle only; the dashboard
    /// stays interactive.
    #[must_use]
    pub const fn is_source_failure(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::MalformedResponse { .. }
        )
    }

    /// Convenience constructor for backend failures.
    #[must_use]
    pub fn source_unavailable(operation: &'static str, details: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            operation,
            details: details.into(),
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for LlvError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for LlvError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
