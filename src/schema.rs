//! The schema collaborator a builder validates against.
//!
//! A [`Schema`] describes a structure's shape: its field names, how to decode
//! a [`PartialState`] into the fully-typed output, and which default values it
//! declares. This crate never validates values itself; every check lives in
//! the schema's [`decode`](Schema::decode), which for derived schemas means the
//! `serde::Deserialize` implementations of the field types.
//!
//! Most schemas are generated with `#[derive(Schema)]`. Hand-written schemas
//! can use [`Decoder`] to get the same per-field error reporting.
//!
//! # Examples
//!
//! ```
//! use lenscraft::schema::{Decoder, Schema, SchemaFailure};
//! use lenscraft::state::{PartialState, Value};
//!
//! struct Point { x: i64, y: i64 }
//!
//! struct PointSchema;
//!
//! impl Schema for PointSchema {
//!     type Output = Point;
//!
//!     fn name(&self) -> &str { "Point" }
//!
//!     fn fields(&self) -> Vec<&str> { vec!["x", "y"] }
//!
//!     fn decode(&self, state: &PartialState) -> Result<Point, SchemaFailure> {
//!         let mut decoder = Decoder::new(state);
//!         let x = decoder.field::<i64>("x");
//!         let y = decoder.field::<i64>("y");
//!         match (x, y) {
//!             (Some(x), Some(y)) => Ok(Point { x, y }),
//!             _ => Err(decoder.into_failure()),
//!         }
//!     }
//!
//!     fn field_default(&self, key: &str) -> Option<Value> {
//!         (key == "y").then(|| Value::from(0))
//!     }
//! }
//!
//! let state: PartialState = [("x", Value::from(3))].into_iter().collect();
//! let failure = PointSchema.decode(&state).err().unwrap();
//! assert_eq!(failure.to_string(), "y: missing required field");
//! ```

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::state::{PartialState, Value};

/// Description of a structure a builder can validate and construct.
///
/// # Type Parameters
///
/// - `Output`: The fully-typed structure produced by a successful decode.
pub trait Schema {
    /// The structure produced by [`decode`](Schema::decode).
    type Output;

    /// A human-readable name for the structure, used in error messages.
    fn name(&self) -> &str {
        "structure"
    }

    /// Returns the declared field names, in declaration order.
    fn fields(&self) -> Vec<&str>;

    /// Validates `state` and constructs the output.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaFailure`] listing every field that is missing or
    /// holds an invalid value.
    fn decode(&self, state: &PartialState) -> Result<Self::Output, SchemaFailure>;

    /// Returns the default declared for `key`, if any.
    fn field_default(&self, _key: &str) -> Option<Value> {
        None
    }

    /// Returns the default declared for the whole structure, if any.
    fn struct_default(&self) -> Option<PartialState> {
        None
    }
}

// =============================================================================
// Failures
// =============================================================================

/// One reason a decode failed.
///
/// `path` locates the offending value: the field name, followed by nested
/// segments when the schema reports them. An empty path refers to the whole
/// structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message}", display_path(.path))]
pub struct Issue {
    path: Vec<String>,
    message: String,
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}

impl Issue {
    /// Creates an issue at `path`.
    #[must_use]
    pub fn new<I, S>(path: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// Creates an issue about the field `key`.
    #[must_use]
    pub fn field(key: &str, message: impl Into<String>) -> Self {
        Self::new([key], message)
    }

    /// Creates an issue about the whole structure.
    #[must_use]
    pub fn root(message: impl Into<String>) -> Self {
        Self::new(std::iter::empty::<String>(), message)
    }

    /// Creates the issue reported for a required field that is absent.
    #[must_use]
    pub fn missing(key: &str) -> Self {
        Self::field(key, "missing required field")
    }

    /// Returns the path segments of the offending value.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Returns the reason the value was rejected.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The structured failure returned by [`Schema::decode`].
///
/// Holds at least one [`Issue`]. Its display lists every issue as
/// `path: reason`, separated by `"; "`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", display_issues(.issues))]
pub struct SchemaFailure {
    issues: Vec<Issue>,
}

fn display_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl SchemaFailure {
    /// Creates a failure from `issues`.
    ///
    /// An empty list is replaced by a single root issue so that a failure
    /// always explains itself.
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        if issues.is_empty() {
            Self {
                issues: vec![Issue::root("rejected without a reason")],
            }
        } else {
            Self { issues }
        }
    }

    /// Returns the issues, in the order they were found.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Returns `true` if any issue is about the field `key`.
    pub fn mentions(&self, key: &str) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.path.first().is_some_and(|segment| segment == key))
    }
}

impl From<Issue> for SchemaFailure {
    fn from(issue: Issue) -> Self {
        Self::new(vec![issue])
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Decodes the fields of a partial state one by one, collecting issues.
///
/// - An absent field is decoded from `null`, so `Option<T>` fields are
///   optional; any other type reports [`Issue::missing`].
/// - A present field that does not deserialize reports the deserializer's
///   message under the field's path.
/// - Fields the schema never asks for are ignored.
///
/// Every field is decoded even after an issue is found, so a failure lists
/// all problems at once.
#[derive(Debug)]
pub struct Decoder<'a> {
    state: &'a PartialState,
    issues: Vec<Issue>,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder reading from `state`.
    #[must_use]
    pub const fn new(state: &'a PartialState) -> Self {
        Self {
            state,
            issues: Vec::new(),
        }
    }

    /// Decodes the field `key` as a `T`.
    ///
    /// # Returns
    ///
    /// `Some(value)` on success. `None` if the field is missing or invalid,
    /// in which case an issue has been recorded.
    pub fn field<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let state = self.state;
        match state.get(key) {
            None => T::deserialize(&Value::Null).map_or_else(
                |_| {
                    self.issues.push(Issue::missing(key));
                    None
                },
                Some,
            ),
            Some(value) => match T::deserialize(value) {
                Ok(decoded) => Some(decoded),
                Err(error) => {
                    self.issues.push(Issue::field(key, error.to_string()));
                    None
                }
            },
        }
    }

    /// Records an issue found by the schema itself, for example a check that
    /// spans several fields.
    pub fn report(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Returns `true` if no issue has been recorded.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Converts the recorded issues into a failure.
    #[must_use]
    pub fn into_failure(self) -> SchemaFailure {
        SchemaFailure::new(self.issues)
    }

    /// Returns `Ok(())` if no issue has been recorded.
    ///
    /// # Errors
    ///
    /// Returns the recorded issues as a [`SchemaFailure`].
    pub fn finish(self) -> Result<(), SchemaFailure> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.into_failure())
        }
    }
}
