//! Error types for the FarmMate client.

use thiserror::Error;

/// A shared error type for the entire FarmMate client.
///
/// Network and HTTP failures are absorbed by the retry layer up to the
/// configured budget; everything that reaches a caller is meant to be shown
/// to the user as a single alert line.
#[derive(Error, Debug, Clone)]
pub enum FarmmateError {
    /// The request never produced a response (connect failure, timeout, broken body).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("HTTP error ({status}): {message}")]
    Http {
        status: u16,
        message: String,
        retryable: bool,
    },

    /// Every attempt allowed by the retry policy failed.
    #[error("Request failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<FarmmateError>,
    },

    /// The backend answered successfully but the payload had an unexpected shape.
    #[error("Unexpected response format: {0}")]
    DataFormat(String),

    /// Rejected user input (empty message, malformed date, ...).
    #[error("Invalid input: {0}")]
    UserInput(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Local cache could not be read or written
    #[error("Local cache error: {0}")]
    Cache(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The owning view went away while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FarmmateError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates an Http error
    pub fn http(status: u16, message: impl Into<String>, retryable: bool) -> Self {
        Self::Http {
            status,
            message: message.into(),
            retryable,
        }
    }

    /// Creates a DataFormat error
    pub fn data_format(message: impl Into<String>) -> Self {
        Self::DataFormat(message.into())
    }

    /// Creates a UserInput error
    pub fn user_input(message: impl Into<String>) -> Self {
        Self::UserInput(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Whether another attempt of the same request could succeed.
    ///
    /// Transport failures are always transient. HTTP failures carry the
    /// classification made by the retry layer (429/5xx by default).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a DataFormat error
    pub fn is_data_format(&self) -> bool {
        matches!(self, Self::DataFormat(_))
    }

    /// Check if this is a UserInput error
    pub fn is_user_input(&self) -> bool {
        matches!(self, Self::UserInput(_))
    }

    /// Check if this is a Cancelled error
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status of the failure, looking through an exhausted retry chain.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::RetriesExhausted { last, .. } => last.status(),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for FarmmateError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for FarmmateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FarmmateError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for FarmmateError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, FarmmateError>`.
pub type Result<T> = std::result::Result<T, FarmmateError>;
