//! Typed error handling for blogful
//!
//! Handlers and the entry controller report failures as [`BlogError`], which
//! knows its HTTP status and a stable error code. Collaborator traits return
//! `anyhow::Result`; those failures surface as [`StorageError`].
//!
//! # Error Categories
//!
//! - [`EntryError`]: the referenced entry does not exist
//! - [`AuthError`]: bad credentials
//! - [`AccessError`]: authenticated but not allowed (not the owner)
//! - [`StorageError`]: repository or session store failures
//! - [`ConfigError`]: configuration parsing and validation
//! - [`RequestError`]: malformed input
//!
//! # Example
//!
//! ```rust,ignore
//! match controller.edit(&identity, id, title, content).await {
//!     Ok(entry) => println!("Updated {}", entry.id),
//!     Err(BlogError::Entry(EntryError::NotFound { id })) => println!("No entry {}", id),
//!     Err(BlogError::Access(AccessError::Denied { .. })) => println!("Not yours"),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use crate::core::auth::{Action, DenialReason, denial_message};
use crate::core::entry::EntryId;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// Generic message for every credential failure
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Incorrect username or password";

/// The main error type for blogful
#[derive(Debug)]
pub enum BlogError {
    /// Entry lookups
    Entry(EntryError),

    /// Authentication failures
    Auth(AuthError),

    /// Authorization failures
    Access(AccessError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Malformed requests
    Request(RequestError),
}

impl fmt::Display for BlogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlogError::Entry(e) => write!(f, "{}", e),
            BlogError::Auth(e) => write!(f, "{}", e),
            BlogError::Access(e) => write!(f, "{}", e),
            BlogError::Storage(e) => write!(f, "{}", e),
            BlogError::Config(e) => write!(f, "{}", e),
            BlogError::Request(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for BlogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlogError::Entry(e) => Some(e),
            BlogError::Auth(e) => Some(e),
            BlogError::Access(e) => Some(e),
            BlogError::Storage(e) => Some(e),
            BlogError::Config(e) => Some(e),
            BlogError::Request(e) => Some(e),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl BlogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            BlogError::Entry(EntryError::NotFound { .. }) => StatusCode::NOT_FOUND,
            BlogError::Auth(_) => StatusCode::UNAUTHORIZED,
            BlogError::Access(_) => StatusCode::FORBIDDEN,
            BlogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BlogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BlogError::Request(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            BlogError::Entry(EntryError::NotFound { .. }) => "ENTRY_NOT_FOUND",
            BlogError::Auth(AuthError::InvalidCredentials) => "INVALID_CREDENTIALS",
            BlogError::Access(_) => "ACCESS_DENIED",
            BlogError::Storage(_) => "STORAGE_ERROR",
            BlogError::Config(_) => "CONFIG_ERROR",
            BlogError::Request(_) => "INVALID_REQUEST",
        }
    }

    /// Shorthand for a missing entry
    pub fn entry_not_found(id: EntryId) -> Self {
        BlogError::Entry(EntryError::NotFound { id })
    }

    /// Shorthand for a refused action
    pub fn denied(action: Action, reason: DenialReason) -> Self {
        BlogError::Access(AccessError::Denied { action, reason })
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            BlogError::Entry(EntryError::NotFound { id }) => Some(serde_json::json!({ "id": id })),
            BlogError::Access(AccessError::Denied { action, reason }) => Some(serde_json::json!({
                "action": action,
                "reason": reason,
            })),
            BlogError::Request(RequestError::InvalidField { field, .. }) => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for BlogError {
    fn from(err: anyhow::Error) -> Self {
        BlogError::Storage(StorageError::Backend {
            message: format!("{:#}", err),
        })
    }
}

// =============================================================================
// Entry Errors
// =============================================================================

/// Errors related to entry lookups
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// No entry carries this id
    #[error("Entry with id '{id}' not found")]
    NotFound { id: EntryId },
}

impl From<EntryError> for BlogError {
    fn from(err: EntryError) -> Self {
        BlogError::Entry(err)
    }
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Authentication failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password; deliberately undifferentiated
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,
}

impl From<AuthError> for BlogError {
    fn from(err: AuthError) -> Self {
        BlogError::Auth(err)
    }
}

// =============================================================================
// Access Errors
// =============================================================================

/// Authorization failures
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("{}", denial_message(*action, *reason))]
    Denied {
        action: Action,
        reason: DenialReason,
    },
}

impl From<AccessError> for BlogError {
    fn from(err: AccessError) -> Self {
        BlogError::Access(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by repositories and the session store
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage error: {message}")]
    Backend { message: String },
}

impl From<StorageError> for BlogError {
    fn from(err: StorageError) -> Self {
        BlogError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse config: {message}")]
    Parse { message: String },

    #[error("Invalid config field '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl From<ConfigError> for BlogError {
    fn from(err: ConfigError) -> Self {
        BlogError::Config(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Malformed request input
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },
}

impl From<RequestError> for BlogError {
    fn from(err: RequestError) -> Self {
        BlogError::Request(err)
    }
}
