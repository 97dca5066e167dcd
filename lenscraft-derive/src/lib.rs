//! Derive macro for lenscraft schemas.
//!
//! This crate provides `#[derive(Schema)]`, which turns a struct with named
//! fields into a schema a lenscraft builder can validate against, and
//! generates named field accessors for that builder.
//!
//! # Example
//!
//! ```rust,ignore
//! use lenscraft::prelude::*;
//!
//! #[derive(Debug, Schema)]
//! struct Person {
//!     name: String,
//!     #[schema(default = "user")]
//!     role: String,
//! }
//!
//! // Generated items:
//! // - PersonSchema: a unit struct implementing Schema<Output = Person>
//! // - PersonFields: builder.name() -> Lens<String>, builder.set_name(value), ...
//!
//! let builder = define(PersonSchema);
//! let person = builder.build(&builder.set_name("Alice".to_string())).unwrap();
//! assert_eq!(person.role, "user");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod schema;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derive macro generating a lenscraft schema and builder accessors.
///
/// # Requirements
///
/// - The struct must have named fields and no generic parameters
/// - Every field type must implement `Serialize` and `DeserializeOwned`
///
/// # Generated Code
///
/// For a struct `Person` with a field `name: String`, generates:
///
/// ```rust,ignore
/// pub struct PersonSchema;
///
/// impl ::lenscraft::Schema for PersonSchema {
///     type Output = Person;
///     // name, fields, decode, field_default, struct_default
/// }
///
/// pub trait PersonFields {
///     fn name(&self) -> ::lenscraft::Lens<String>;
///     fn set_name(&self, value: String) -> ::lenscraft::lens::SetField;
/// }
///
/// impl PersonFields for ::lenscraft::Builder<PersonSchema> { /* ... */ }
/// ```
///
/// # Attributes
///
/// - `#[schema(default)]` on the struct: the struct-level default is
///   `Person::default()`, serialized. Requires `Default + Serialize`.
/// - `#[schema(default = expr)]` on a field: a per-field default, converted
///   with `Into` into the field's type.
/// - `#[schema(rename = "key")]` on a field: the key the field is stored
///   under in the partial state.
///
/// # Shadowed Accessors
///
/// `Builder` has inherent methods named `schema`, `defaults`, `field`,
/// `when`, `when_else`, `compose`, `preview` and `build`. Method-call syntax
/// picks the inherent method, so the lens for a field with one of these names
/// is reached through the trait:
///
/// ```rust,ignore
/// #[derive(Schema)]
/// struct Job {
///     schema: String,
/// }
///
/// let builder = define(JobSchema);
/// let lens = JobFields::schema(&builder);
/// let edit = builder.set_schema("v2".to_string());
/// ```
///
/// Setters are never shadowed.
///
/// # Decoding
///
/// Each field is decoded with its own `Deserialize` implementation. Absent
/// fields decode from `null`, so `Option` fields are optional. All issues
/// are reported together, each under its field's key.
#[proc_macro_derive(Schema, attributes(schema))]
pub fn derive_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    TokenStream::from(schema::derive_schema_impl(&input))
}
