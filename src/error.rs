//! Error types for the SCIM property core.
//!
//! All failures surface through a single [`ScimError`] enum whose variants
//! correspond to the transport-agnostic SCIM error kinds. Mapping to HTTP
//! status codes is the responsibility of the protocol layer; this crate only
//! reports what went wrong.

/// Main error type for SCIM property and serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum ScimError {
    /// Payload or path text is malformed
    #[error("Invalid syntax: {message}")]
    InvalidSyntax { message: String },

    /// Value does not fit the attribute's type or constraints
    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    /// Path does not resolve under the resource type
    #[error("Invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// Mutually exclusive or otherwise unusable request options
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Referenced attribute does not exist on the resource
    #[error("No target: {message}")]
    NoTarget { message: String },

    /// Attempt to write a read-only attribute or re-set an immutable one
    #[error("Mutability violation: attribute '{attribute}' may not be modified")]
    MutabilityViolation { attribute: String },

    /// Server or global uniqueness constraint broken
    #[error("Uniqueness violation on attribute '{attribute}'")]
    Uniqueness { attribute: String },

    /// Version precondition (ETag) mismatch
    #[error("Precondition failed: {message}")]
    PreConditionFailed { message: String },

    /// Relational operator is not defined for the attribute's type
    #[error("Operation '{operation}' is incompatible with attribute '{attribute}'")]
    IncompatibleOperation {
        operation: String,
        attribute: String,
    },

    /// Programmer invariant broken; indicates a bug, not a client error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ScimError {
    /// Create an invalid syntax error.
    pub fn invalid_syntax(message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a no target error.
    pub fn no_target(message: impl Into<String>) -> Self {
        Self::NoTarget {
            message: message.into(),
        }
    }

    /// Create a mutability violation error.
    pub fn mutability_violation(attribute: impl Into<String>) -> Self {
        Self::MutabilityViolation {
            attribute: attribute.into(),
        }
    }

    /// Create a uniqueness violation error.
    pub fn uniqueness(attribute: impl Into<String>) -> Self {
        Self::Uniqueness {
            attribute: attribute.into(),
        }
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreConditionFailed {
            message: message.into(),
        }
    }

    /// Create an incompatible operation error.
    pub fn incompatible_operation(
        operation: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self::IncompatibleOperation {
            operation: operation.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The SCIM `scimType` keyword for this error kind.
    pub fn scim_type(&self) -> &'static str {
        match self {
            Self::InvalidSyntax { .. } => "invalidSyntax",
            Self::InvalidValue { .. } => "invalidValue",
            Self::InvalidPath { .. } => "invalidPath",
            Self::InvalidRequest { .. } => "invalidRequest",
            Self::NoTarget { .. } => "noTarget",
            Self::MutabilityViolation { .. } => "mutability",
            Self::Uniqueness { .. } => "uniqueness",
            Self::PreConditionFailed { .. } => "preConditionFailed",
            Self::IncompatibleOperation { .. } => "incompatibleOperation",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result type alias used throughout the crate.
pub type ScimResult<T> = Result<T, ScimError>;
