// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Leadpilot engine.

use thiserror::Error;

/// The primary error type used across all Leadpilot adapter traits and core operations.
#[derive(Debug, Error)]
pub enum LeadpilotError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A record the request depends on does not exist (contact, campaign, assignment).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Intent classifier errors (service unreachable, malformed response).
    #[error("intent classifier error: {message}")]
    Classifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Message generation errors (service unreachable, rejected request).
    #[error("message generation error: {message}")]
    Generator {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Segment resolution errors (invalid filter, backend failure).
    #[error("segment resolution error: {message}")]
    Segment {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Requested adapter was not configured.
    #[error("adapter not found: {adapter_type}/{name}")]
    AdapterNotFound { adapter_type: String, name: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// A record was found in a state that does not permit the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadpilotError {
    /// Shorthand for a [`LeadpilotError::NotFound`] on the given entity kind.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Returns true for failures of an external collaborator that callers may absorb.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::Classifier { .. } | Self::Generator { .. } | Self::Timeout { .. }
        )
    }
}
