//! Lenses focused on one field of a partial state.
//!
//! A [`Lens`] pairs a key with the value type `V` stored under it and offers
//! the three field-level operations a builder is made of:
//!
//! - [`get`](Lens::get): read the field, `None` when absent
//! - [`set`](Lens::set): a transform binding the field to a value
//! - [`modify`](Lens::modify): a transform updating the field if present
//!
//! # Laws
//!
//! For every state `s`, values `v`, `w` and function `f`:
//!
//! 1. **`SetGet` Law**: `get(set(v)(s)) == Some(v)`
//! 2. **`SetSet` Law**: `set(w)(set(v)(s)) == set(w)(s)`
//! 3. **Absent Modify Law**: if the key is absent in `s`, `modify(f)(s) == s`
//!
//! The third law is a contract, not an error: a caller who wants an update
//! with a fallback must `set` a value first.
//!
//! The first two laws hold for every value whose JSON form reads back as a
//! `V`. Non-finite floats (`NaN`, infinities) have no JSON form and are stored
//! as `null`; [`set`](Lens::set) logs a warning when that happens.
//!
//! # Examples
//!
//! ```
//! use lenscraft::lens::Lens;
//! use lenscraft::state::PartialState;
//! use lenscraft::transform::Transform;
//!
//! let age = Lens::<u32>::new("age");
//!
//! let state = age.set(30).apply(PartialState::new());
//! assert_eq!(age.get(&state), Some(30));
//!
//! let older = age.modify(|age| age + 1).apply(state);
//! assert_eq!(age.get(&older), Some(31));
//!
//! let untouched = age.modify(|age| age + 1).apply(PartialState::new());
//! assert_eq!(age.get(&untouched), None);
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::state::{PartialState, Value};
use crate::transform::Transform;

/// A typed accessor for the field stored under one key.
///
/// # Type Parameters
///
/// - `V`: The value type of the field. Defaults to [`Value`], which reads and
///   writes the stored JSON untouched.
///
/// Lenses are cheap to clone and carry no state besides their key.
pub struct Lens<V = Value> {
    key: Arc<str>,
    _marker: PhantomData<fn() -> V>,
}

impl<V> Lens<V> {
    /// Creates a lens focused on `key`.
    #[must_use]
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self {
            key: key.into(),
            _marker: PhantomData,
        }
    }

    /// Returns the key this lens focuses on.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the stored value without converting it.
    pub fn get_raw<'a>(&self, state: &'a PartialState) -> Option<&'a Value> {
        state.get(&self.key)
    }

    /// Returns `true` if the field is bound in `state`.
    pub fn is_present(&self, state: &PartialState) -> bool {
        state.contains(&self.key)
    }

    /// Returns a transform that removes the field.
    #[must_use]
    pub fn unset(&self) -> UnsetField {
        UnsetField {
            key: Arc::clone(&self.key),
        }
    }
}

impl<V: DeserializeOwned> Lens<V> {
    /// Reads the field.
    ///
    /// # Arguments
    ///
    /// * `state` - The partial state to read from
    ///
    /// # Returns
    ///
    /// `Some(value)` if the field is bound and holds a `V`, `None` otherwise.
    /// A stored value of another shape reads as `None`; the schema reports
    /// such values when the state is built.
    pub fn get(&self, state: &PartialState) -> Option<V> {
        state
            .get(&self.key)
            .and_then(|value| V::deserialize(value).ok())
    }

    /// Returns a transform that updates the field with `function`.
    ///
    /// The transform is the identity on states where the field is absent, and
    /// on states where the stored value is not a `V`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lenscraft::lens::Lens;
    /// use lenscraft::state::PartialState;
    /// use lenscraft::transform::Transform;
    ///
    /// let roles = Lens::<Vec<String>>::new("roles");
    /// let add_admin = roles.modify(|mut roles| {
    ///     roles.push("admin".to_string());
    ///     roles
    /// });
    ///
    /// let empty = PartialState::new();
    /// assert_eq!(add_admin.apply(empty.clone()), empty);
    ///
    /// let state = roles.set(vec!["user".to_string()]).apply(empty);
    /// let state = add_admin.apply(state);
    /// assert_eq!(roles.get(&state), Some(vec!["user".to_string(), "admin".to_string()]));
    /// ```
    #[must_use]
    pub fn modify<F>(&self, function: F) -> ModifyField<V, F>
    where
        F: Fn(V) -> V,
    {
        ModifyField {
            key: Arc::clone(&self.key),
            function,
            _marker: PhantomData,
        }
    }
}

impl<V: Serialize + DeserializeOwned> Lens<V> {
    /// Returns a transform binding the field to `value`.
    ///
    /// The previous value, if any, is ignored. No validation happens here;
    /// the value is checked against the schema when the state is built.
    ///
    /// A value that does not survive the trip through JSON is logged at
    /// `warn`. This covers non-finite floats, which serialize as `null`:
    /// `Lens::<f64>::set(f64::NAN)` stores `null` and a later
    /// [`get`](Lens::get) returns `None`.
    #[must_use]
    pub fn set(&self, value: V) -> SetField {
        SetField {
            key: Arc::clone(&self.key),
            value: to_field_value(&self.key, &value),
        }
    }
}

impl<V> Clone for Lens<V> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            _marker: PhantomData,
        }
    }
}

impl<V> std::fmt::Debug for Lens<V> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Lens")
            .field("key", &self.key)
            .field("value_type", &std::any::type_name::<V>())
            .finish()
    }
}

/// Serializes a field value, falling back to `null`.
///
/// Serialization fails for values with no JSON form (for example maps with
/// non-string keys). Non-finite floats serialize without error but as `null`,
/// so the stored value is read back as a `V` to catch them. `null` is
/// rejected by the schema for any field that is not optional.
fn to_field_value<V: Serialize + DeserializeOwned>(key: &str, value: &V) -> Value {
    match serde_json::to_value(value) {
        Ok(stored) => {
            if let Err(error) = V::deserialize(&stored) {
                tracing::warn!(
                    field = key,
                    %error,
                    "field value does not read back from its JSON form; non-finite floats are stored as null"
                );
            }
            stored
        }
        Err(error) => {
            tracing::warn!(field = key, %error, "field value has no JSON form; storing null");
            Value::Null
        }
    }
}

// =============================================================================
// Field transforms
// =============================================================================

/// A transform binding one field to a fixed value. Created by [`Lens::set`].
#[derive(Debug, Clone, PartialEq)]
pub struct SetField {
    key: Arc<str>,
    value: Value,
}

impl SetField {
    /// Returns the key this transform binds.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the value this transform binds.
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

impl Transform for SetField {
    fn apply(&self, state: PartialState) -> PartialState {
        state.with(&*self.key, self.value.clone())
    }
}

/// A transform updating one field if present. Created by [`Lens::modify`].
pub struct ModifyField<V, F> {
    key: Arc<str>,
    function: F,
    _marker: PhantomData<fn(V) -> V>,
}

impl<V, F> Transform for ModifyField<V, F>
where
    V: Serialize + DeserializeOwned,
    F: Fn(V) -> V,
{
    fn apply(&self, state: PartialState) -> PartialState {
        let Some(stored) = state.get(&self.key) else {
            return state;
        };
        let current = match V::deserialize(stored) {
            Ok(current) => current,
            Err(error) => {
                tracing::trace!(field = %self.key, %error, "modify skipped: stored value has another type");
                return state;
            }
        };
        let next = to_field_value(&self.key, &(self.function)(current));
        state.with(&*self.key, next)
    }
}

impl<V, F: Clone> Clone for ModifyField<V, F> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            function: self.function.clone(),
            _marker: PhantomData,
        }
    }
}

impl<V, F> std::fmt::Debug for ModifyField<V, F> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ModifyField")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A transform removing one field. Created by [`Lens::unset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsetField {
    key: Arc<str>,
}

impl Transform for UnsetField {
    fn apply(&self, state: PartialState) -> PartialState {
        state.without(&self.key)
    }
}

static_assertions::assert_impl_all!(Lens<u32>: Send, Sync, Clone);
static_assertions::assert_impl_all!(SetField: Send, Sync, Clone);
