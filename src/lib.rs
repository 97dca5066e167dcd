//! # lenscraft
//!
//! Immutable, lens-based builders for structured data.
//!
//! Given a [`Schema`] describing a structure and optional default values,
//! lenscraft lets you accumulate field assignments through composable,
//! type-checked transforms, then validate and construct the final value in a
//! single step.
//!
//! ## Overview
//!
//! - **Partial State** ([`state`]): the work-in-progress value, a structure
//!   where any subset of fields may be present
//! - **Lenses** ([`lens`]): typed get/set/modify access to one field
//! - **Transforms** ([`transform`]): pure edits of a partial state, combined
//!   with [`compose!`] and [`when`](transform::when)
//! - **Defaults** ([`defaults`]): schema field defaults, schema structure
//!   defaults and caller defaults, merged once
//! - **Builders** ([`builder`]): [`define`] a builder, then [`build`]
//!   structures from it
//! - **Schemas** ([`schema`]): the validation collaborator, usually generated
//!   with `#[derive(Schema)]`
//!
//! [`build`]: Builder::build
//!
//! ## Feature Flags
//!
//! - `derive` (default): the `#[derive(Schema)]` macro
//!
//! ## Example
//!
//! ```rust
//! # #[cfg(feature = "derive")]
//! # {
//! use lenscraft::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! #[serde(try_from = "i64", into = "i64")]
//! struct Positive(i64);
//!
//! impl TryFrom<i64> for Positive {
//!     type Error = String;
//!     fn try_from(value: i64) -> Result<Self, String> {
//!         if value > 0 { Ok(Self(value)) } else { Err(format!("expected a positive integer, got {value}")) }
//!     }
//! }
//!
//! impl From<Positive> for i64 {
//!     fn from(value: Positive) -> i64 { value.0 }
//! }
//!
//! #[derive(Debug, PartialEq, Schema)]
//! struct Person {
//!     name: String,
//!     #[schema(default = Positive(1))]
//!     age: Positive,
//! }
//!
//! let builder = define(PersonSchema);
//!
//! let person = builder.build(&compose!(builder.set_name("John".to_string()))).unwrap();
//! assert_eq!(person.age, Positive(1));
//!
//! let error = builder
//!     .build(&compose!(builder.set_name("John".to_string()), builder.age().set(Positive(-1))))
//!     .unwrap_err();
//! assert_eq!(error.to_string(), "invalid Person: age: expected a positive integer, got -1");
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the builder entry points, lenses, combinators and the
/// [`Schema`] trait.
///
/// # Usage
///
/// ```rust
/// use lenscraft::prelude::*;
/// ```
pub mod prelude {
    pub use crate::builder::{Builder, define, define_with_defaults};
    pub use crate::compose;
    pub use crate::error::ValidationError;
    pub use crate::lens::Lens;
    pub use crate::schema::{Decoder, Issue, Schema, SchemaFailure};
    pub use crate::state::{PartialState, Value};
    pub use crate::transform::{Transform, identity, when, when_else};

    #[cfg(feature = "derive")]
    pub use lenscraft_derive::Schema;
}

pub mod builder;
pub mod defaults;
pub mod error;
pub mod lens;
pub mod schema;
pub mod state;
pub mod transform;

pub use builder::{Builder, define, define_with_defaults};
pub use error::ValidationError;
pub use lens::Lens;
pub use schema::Schema;
pub use state::{PartialState, Value};
pub use transform::Transform;

#[cfg(feature = "derive")]
pub use lenscraft_derive::Schema;
