//! Error types for builders.
//!
//! [`ValidationError`] is the only failure this crate introduces: it is
//! returned by [`Builder::build`](crate::builder::Builder::build) when the
//! schema rejects the assembled state. Every other operation is total.

use thiserror::Error;

use crate::schema::{Issue, SchemaFailure};

/// The schema rejected the state a build produced.
///
/// Wraps the schema's [`SchemaFailure`], which is also available through
/// [`std::error::Error::source`].
///
/// # Examples
///
/// ```rust
/// use lenscraft::error::ValidationError;
/// use lenscraft::schema::{Issue, SchemaFailure};
///
/// let error = ValidationError::new(
///     "Person",
///     SchemaFailure::from(Issue::field("age", "expected a positive integer, got -1")),
/// );
/// assert_eq!(
///     format!("{error}"),
///     "invalid Person: age: expected a positive integer, got -1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {schema}: {message}")]
pub struct ValidationError {
    schema: String,
    message: String,
    #[source]
    failure: SchemaFailure,
}

impl ValidationError {
    /// Wraps `failure`, reported by the schema named `schema`.
    #[must_use]
    pub fn new(schema: impl Into<String>, failure: SchemaFailure) -> Self {
        Self {
            schema: schema.into(),
            message: failure.to_string(),
            failure,
        }
    }

    /// Returns the name of the schema that rejected the state.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the human-readable description of every issue.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the individual issues.
    pub fn issues(&self) -> &[Issue] {
        self.failure.issues()
    }

    /// Returns the schema's failure.
    pub const fn failure(&self) -> &SchemaFailure {
        &self.failure
    }

    /// Consumes the error, returning the schema's failure.
    #[must_use]
    pub fn into_failure(self) -> SchemaFailure {
        self.failure
    }
}
