//! The builder factory and the build/validate step.
//!
//! [`define`] turns a [`Schema`] into a [`Builder`]: an immutable bundle of the
//! schema, its resolved defaults, lenses for its fields, and the [`build`]
//! operation. A build applies a [`Transform`] to the defaults and asks the
//! schema to decode the result, yielding either the validated structure or a
//! [`ValidationError`].
//!
//! [`build`]: Builder::build
//!
//! # Examples
//!
//! ```
//! use lenscraft::builder::define;
//! use lenscraft::compose;
//! use lenscraft::schema::{Decoder, Schema, SchemaFailure};
//! use lenscraft::state::PartialState;
//!
//! #[derive(Debug, PartialEq)]
//! struct Greeting { text: String, times: u32 }
//!
//! struct GreetingSchema;
//!
//! impl Schema for GreetingSchema {
//!     type Output = Greeting;
//!
//!     fn fields(&self) -> Vec<&str> { vec!["text", "times"] }
//!
//!     fn decode(&self, state: &PartialState) -> Result<Greeting, SchemaFailure> {
//!         let mut decoder = Decoder::new(state);
//!         let text = decoder.field("text");
//!         let times = decoder.field("times");
//!         match (text, times) {
//!             (Some(text), Some(times)) => Ok(Greeting { text, times }),
//!             _ => Err(decoder.into_failure()),
//!         }
//!     }
//! }
//!
//! let builder = define(GreetingSchema);
//! let text = builder.field::<String>("text");
//! let times = builder.field::<u32>("times");
//!
//! let greeting = builder
//!     .build(&compose!(text.set("hello".to_string()), times.set(2)))
//!     .unwrap();
//! assert_eq!(greeting, Greeting { text: "hello".to_string(), times: 2 });
//!
//! let error = builder.build(&text.set("hello".to_string())).unwrap_err();
//! assert_eq!(error.to_string(), "invalid structure: times: missing required field");
//! ```

use std::sync::Arc;

use crate::defaults::resolve_defaults;
use crate::error::ValidationError;
use crate::lens::Lens;
use crate::schema::Schema;
use crate::state::PartialState;
use crate::transform::{BoxedTransform, Compose, Identity, Transform, When, compose};

/// An immutable builder for the structure described by `S`.
///
/// Cloning is cheap and clones share the schema and defaults. A builder
/// holds no mutable state, so any number of builds may run from it, from
/// any number of threads.
pub struct Builder<S> {
    schema: Arc<S>,
    defaults: PartialState,
}

/// Creates a builder for `schema`, starting from the schema's declared
/// defaults.
///
/// # Examples
///
/// ```
/// # use lenscraft::schema::{Schema, SchemaFailure};
/// # use lenscraft::state::{PartialState, Value};
/// # struct Flag;
/// # impl Schema for Flag {
/// #     type Output = ();
/// #     fn fields(&self) -> Vec<&str> { vec!["on"] }
/// #     fn decode(&self, _: &PartialState) -> Result<(), SchemaFailure> { Ok(()) }
/// #     fn field_default(&self, _: &str) -> Option<Value> { Some(Value::Bool(false)) }
/// # }
/// use lenscraft::builder::define;
///
/// let builder = define(Flag);
/// assert_eq!(builder.defaults().get("on"), Some(&Value::Bool(false)));
/// ```
pub fn define<S: Schema>(schema: S) -> Builder<S> {
    Builder::from_parts(schema, None)
}

/// Creates a builder for `schema` whose defaults are overridden by
/// `defaults`.
///
/// `defaults` may bind any subset of fields; its values win over every
/// default the schema declares.
pub fn define_with_defaults<S: Schema>(schema: S, defaults: impl Into<PartialState>) -> Builder<S> {
    Builder::from_parts(schema, Some(defaults.into()))
}

impl<S: Schema> Builder<S> {
    fn from_parts(schema: S, caller_defaults: Option<PartialState>) -> Self {
        let defaults = resolve_defaults(&schema, caller_defaults.as_ref());
        tracing::debug!(
            schema = schema.name(),
            fields = schema.fields().len(),
            defaults = defaults.len(),
            "defined builder"
        );
        Self {
            schema: Arc::new(schema),
            defaults,
        }
    }

    /// Returns the schema this builder validates against.
    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Returns the resolved defaults every build starts from.
    pub const fn defaults(&self) -> &PartialState {
        &self.defaults
    }

    /// Returns a lens for the field `key`.
    ///
    /// The key is not checked against the schema's fields: a lens on an
    /// undeclared key edits the partial state, and the schema decides at build
    /// time what to make of it.
    #[must_use]
    pub fn field<V>(&self, key: &str) -> Lens<V> {
        Lens::new(key)
    }

    /// Applies `if_true` when `predicate` holds for the current state.
    ///
    /// Same as [`transform::when`](crate::transform::when).
    pub const fn when<P, T>(&self, predicate: P, if_true: T) -> When<P, T, Identity>
    where
        P: Fn(&PartialState) -> bool,
        T: Transform,
    {
        crate::transform::when(predicate, if_true)
    }

    /// Applies `if_true` when `predicate` holds for the current state,
    /// `if_false` otherwise.
    pub const fn when_else<P, T, F>(&self, predicate: P, if_true: T, if_false: F) -> When<P, T, F>
    where
        P: Fn(&PartialState) -> bool,
        T: Transform,
        F: Transform,
    {
        crate::transform::when_else(predicate, if_true, if_false)
    }

    /// Composes `transforms` left-to-right.
    ///
    /// Equivalent to [`transform::compose`](crate::transform::compose).
    pub fn compose<I>(&self, transforms: I) -> Compose
    where
        I: IntoIterator<Item = BoxedTransform>,
    {
        compose(transforms)
    }

    /// Returns the state a build with `transform` would validate.
    ///
    /// No validation happens; this is the first half of [`build`](Self::build).
    pub fn preview<T>(&self, transform: &T) -> PartialState
    where
        T: Transform + ?Sized,
    {
        transform.apply(self.defaults.clone())
    }

    /// Applies `transform` to the defaults and validates the result.
    ///
    /// # Arguments
    ///
    /// * `transform` - The chain of edits to apply; it is borrowed so the same
    ///   chain can be reused for any number of builds
    ///
    /// # Returns
    ///
    /// The fully-typed structure if the schema accepts the state.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] wrapping the schema's failure when any
    /// field is missing or invalid. There is no partial success.
    pub fn build<T>(&self, transform: &T) -> Result<S::Output, ValidationError>
    where
        T: Transform + ?Sized,
    {
        let state = self.preview(transform);
        tracing::trace!(schema = self.schema.name(), fields = state.len(), "decoding built state");

        self.schema.decode(&state).map_err(|failure| {
            let error = ValidationError::new(self.schema.name(), failure);
            tracing::debug!(
                schema = error.schema(),
                issues = error.issues().len(),
                error = %error.message(),
                "build rejected by schema"
            );
            error
        })
    }
}

impl<S> Clone for Builder<S> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            defaults: self.defaults.clone(),
        }
    }
}

impl<S: Schema> std::fmt::Debug for Builder<S> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Builder")
            .field("schema", &self.schema.name())
            .field("defaults", &self.defaults)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Decoder, SchemaFailure};
    use crate::state::Value;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Ticket {
        title: String,
        priority: u8,
    }

    struct TicketSchema;

    impl Schema for TicketSchema {
        type Output = Ticket;

        fn name(&self) -> &str {
            "Ticket"
        }

        fn fields(&self) -> Vec<&str> {
            vec!["title", "priority"]
        }

        fn decode(&self, state: &PartialState) -> Result<Ticket, SchemaFailure> {
            let mut decoder = Decoder::new(state);
            let title = decoder.field("title");
            let priority = decoder.field("priority");
            match (title, priority) {
                (Some(title), Some(priority)) => Ok(Ticket { title, priority }),
                _ => Err(decoder.into_failure()),
            }
        }

        fn field_default(&self, key: &str) -> Option<Value> {
            (key == "priority").then(|| json!(3))
        }
    }

    static_assertions::assert_impl_all!(Builder<TicketSchema>: Send, Sync, Clone);

    #[test]
    fn test_identity_build_of_complete_defaults() {
        let builder = define_with_defaults(
            TicketSchema,
            PartialState::try_from(json!({ "title": "Fix login" })).unwrap(),
        );

        let ticket = builder.build(&Identity).unwrap();

        assert_eq!(
            ticket,
            Ticket {
                title: "Fix login".to_string(),
                priority: 3,
            }
        );
    }

    #[test]
    fn test_build_reports_missing_field() {
        let builder = define(TicketSchema);

        let error = builder.build(&Identity).unwrap_err();

        assert_eq!(error.schema(), "Ticket");
        assert_eq!(error.to_string(), "invalid Ticket: title: missing required field");
    }

    #[test]
    fn test_build_does_not_leak_between_calls() {
        let builder = define(TicketSchema);
        let title = builder.field::<String>("title");

        let first = builder.build(&title.set("One".to_string())).unwrap();
        let second = builder.build(&Identity);

        assert_eq!(first.title, "One");
        assert!(second.is_err());
        assert!(!builder.defaults().contains("title"));
    }

    #[test]
    fn test_preview_shows_state_before_decode() {
        let builder = define(TicketSchema);
        let priority = builder.field::<u8>("priority");

        let state = builder.preview(&priority.modify(|value| value + 1));

        assert_eq!(state.to_value(), json!({ "priority": 4 }));
    }

    #[test]
    fn test_builder_combinators() {
        let builder = define(TicketSchema);
        let title = builder.field::<String>("title");
        let priority = builder.field::<u8>("priority");

        let chain = builder.compose([
            title.set("Crash".to_string()).boxed(),
            builder
                .when_else(
                    |state: &PartialState| {
                        state.get("title").and_then(Value::as_str) == Some("Crash")
                    },
                    priority.set(1),
                    priority.set(5),
                )
                .boxed(),
        ]);

        assert_eq!(builder.build(&chain).unwrap().priority, 1);
    }

    #[test]
    fn test_build_accepts_dyn_transform() {
        let builder = define(TicketSchema);
        let chain: Box<dyn Transform> = Box::new(builder.field::<String>("title").set("Dyn".to_string()));
        assert_eq!(builder.build(&*chain).unwrap().title, "Dyn");
    }

    #[test]
    fn test_debug_names_schema() {
        let builder = define(TicketSchema);
        let debug_string = format!("{builder:?}");
        assert!(debug_string.contains("Ticket"));
        assert!(debug_string.contains("priority"));
    }
}
