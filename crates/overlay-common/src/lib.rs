//! # Overlay Common
//!
//! Error types and logging configuration shared by the overlay popup engine.
//!
//! ## Features
//!
//! - Unified error type covering programmer-contract violations and
//!   recoverable render failures
//! - Logging configuration and setup

use thiserror::Error;

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat};

/// Unified error type for the overlay engine.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// No renderer is registered for the requested content name.
    #[error("Unknown popup content: {0}")]
    UnknownContent(String),

    /// Mounting the popup subtree failed.
    #[error("Render error: {message}")]
    Render {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The popup id does not refer to a live popup.
    #[error("Popup not found: {0}")]
    PopupNotFound(u64),

    /// Invalid argument passed by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration errors.
    #[error("Config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Removing an owned subtree failed.
    #[error("Teardown error: {0}")]
    Teardown(String),
}

impl OverlayError {
    /// Create a render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config error with source.
    pub fn config_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a teardown error.
    pub fn teardown(message: impl Into<String>) -> Self {
        Self::Teardown(message.into())
    }

    /// Whether this error is a programmer-contract violation that must not
    /// be swallowed.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            OverlayError::UnknownContent(_) | OverlayError::InvalidArgument(_)
        )
    }

    /// Get the error category for log fields.
    pub fn category(&self) -> &'static str {
        match self {
            OverlayError::UnknownContent(_) => "unknown_content",
            OverlayError::Render { .. } => "render",
            OverlayError::PopupNotFound(_) => "popup_not_found",
            OverlayError::InvalidArgument(_) => "invalid_argument",
            OverlayError::Config { .. } => "config",
            OverlayError::Teardown(_) => "teardown",
        }
    }
}

/// Result type alias for overlay operations.
pub type Result<T> = std::result::Result<T, OverlayError>;
