//! # Error Taxonomy
//!
//! Every failure the path resolver, the parameter parser and the dispatcher can
//! produce is a [`JsonApiError`]. Resolution and parsing errors propagate to the
//! caller immediately; the [`Dispatcher`](crate::dispatcher::Dispatcher) is the
//! single place where they are converted into response envelopes.
//!
//! | Variant | Raised by | Default status |
//! |---|---|---|
//! | `MalformedPath` | path resolver | 400 |
//! | `UnknownResource` | path resolver | 404 |
//! | `UnknownField` | path resolver | 404 |
//! | `InvalidStructure` | path resolver | 400 |
//! | `InvalidSortDirection` | parameter parser | 400 |
//! | `InvalidPageValue` | parameter parser | 400 |
//! | `NoMatchingHandler` | dispatcher | 406 |
//! | `UnhandledFailure` | dispatcher | 422 |

use thiserror::Error;

/// Status used when a handler fails with anything the mapper registry does not know.
pub const FALLBACK_STATUS: u16 = 422;

/// Status used when no controller accepts the (method, path shape) combination.
pub const NOT_ACCEPTABLE_STATUS: u16 = 406;

/// Errors produced while decomposing and dispatching a JSON:API request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonApiError {
    /// The path is empty after trimming separators, or contains an empty token.
    #[error("malformed path '{path}': {reason}")]
    MalformedPath {
        /// The raw path as received
        path: String,
        /// What made it unusable
        reason: &'static str,
    },
    /// The first path segment does not name a registered resource type.
    #[error("resource '{name}' not found")]
    UnknownResource {
        /// The token that failed to resolve
        name: String,
    },
    /// A non-first segment is not a relationship or field of its anchoring resource.
    #[error("field '{field}' not found on resource '{resource}'")]
    UnknownField {
        /// The anchoring resource type
        resource: String,
        /// The unresolved segment name
        field: String,
    },
    /// A relationship or field segment was followed by an id list.
    #[error("segment '{segment}' cannot carry ids '{ids}': relationship and field paths cannot contain ids")]
    InvalidStructure {
        /// The relationship/field segment name
        segment: String,
        /// The offending id token
        ids: String,
    },
    /// A `sort[..][..]` value other than `asc` or `desc`.
    #[error("invalid sort direction '{value}' for '{key}', expected 'asc' or 'desc'")]
    InvalidSortDirection {
        /// Raw parameter key
        key: String,
        /// Raw value
        value: String,
    },
    /// A `page[..]` value that is not an integer.
    #[error("invalid page value '{value}' for '{key}', expected an integer")]
    InvalidPageValue {
        /// Raw parameter key
        key: String,
        /// Raw value
        value: String,
    },
    /// No controller accepts this (method, path shape) combination.
    #[error("no handler accepts {method} {path}")]
    NoMatchingHandler {
        /// HTTP method token
        method: String,
        /// Canonical path
        path: String,
    },
    /// Any other failure raised while handling a request.
    #[error("{message}")]
    UnhandledFailure {
        /// Message echoed in the error body
        message: String,
    },
}

impl JsonApiError {
    /// Default HTTP status for this error kind.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            JsonApiError::MalformedPath { .. }
            | JsonApiError::InvalidStructure { .. }
            | JsonApiError::InvalidSortDirection { .. }
            | JsonApiError::InvalidPageValue { .. } => 400,
            JsonApiError::UnknownResource { .. } | JsonApiError::UnknownField { .. } => 404,
            JsonApiError::NoMatchingHandler { .. } => NOT_ACCEPTABLE_STATUS,
            JsonApiError::UnhandledFailure { .. } => FALLBACK_STATUS,
        }
    }

    pub(crate) fn malformed(path: &str, reason: &'static str) -> Self {
        JsonApiError::MalformedPath {
            path: path.to_string(),
            reason,
        }
    }
}

/// Errors raised while building the resource registry at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two registrations share a resource type name.
    #[error("duplicate resource found for '{0}'")]
    DuplicateResource(String),
    /// A resource declares an empty type name or an empty relationship/attribute name.
    #[error("invalid registration for '{resource}': {reason}")]
    InvalidRegistration {
        /// Resource type (may be empty)
        resource: String,
        /// What is wrong with it
        reason: &'static str,
    },
    /// The registry file could not be read or deserialised.
    #[error("failed to load registry from '{path}'")]
    Load {
        /// File path
        path: String,
        /// Underlying cause
        #[source]
        source: anyhow::Error,
    },
}
