use thiserror::Error;

use crate::event::EventKind;

/// Non-fatal anomalies raised while routing events or driving gestures.
///
/// None of these ever abort the caller. They are logged where they occur and
/// handed back inside outcome values so the caller can inspect them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("No listener \"{kind}\" in {controller}")]
    UnresolvedTarget {
        kind: EventKind,
        controller: String,
    },

    #[error("Could not find {name}")]
    MissingView { name: String },

    #[error("Unknown tool \"{name}\"")]
    UnknownTool { name: String },

    #[error("{tool}: \"{kind}\" received without a held mask")]
    InvalidGestureState { tool: &'static str, kind: EventKind },
}

/// Errors that can occur while loading script configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors reported by host operations that touch the outside world
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to write {path}: {reason}")]
    Write { path: String, reason: String },
}

/// Errors that can occur while loading or replaying a recorded session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to read session: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse session: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Session refers to unknown node \"{0}\"")]
    UnknownNode(String),
}
