//! Partial state: the work-in-progress representation a builder operates on.
//!
//! A [`PartialState`] is a mapping from field name to [`Value`] where any
//! subset of the schema's fields (including none) may be present. It is the
//! input and output of every [`Transform`](crate::transform::Transform) and the
//! value handed to [`Schema::decode`](crate::schema::Schema::decode) at the end
//! of a build.
//!
//! # Value semantics
//!
//! `PartialState` behaves like an immutable value. Every editing method
//! consumes the state and returns a new one; storage is shared between clones
//! and copied only when a shared state is edited. Cloning the builder's
//! defaults at the start of each build is therefore O(1), and no edit made
//! during one build can be observed by another.
//!
//! # Examples
//!
//! ```
//! use lenscraft::state::PartialState;
//! use serde_json::json;
//!
//! let empty = PartialState::new();
//! let named = empty.clone().with("name", json!("Alice"));
//!
//! assert!(empty.is_empty());
//! assert_eq!(named.get("name"), Some(&json!("Alice")));
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Map;

/// The dynamic value stored under each key of a [`PartialState`].
pub type Value = serde_json::Value;

/// A structure where any subset of fields may be present.
///
/// Keys iterate in sorted order. Equality compares the bound fields only.
///
/// # Examples
///
/// ```
/// use lenscraft::state::PartialState;
/// use serde_json::json;
///
/// let state = PartialState::try_from(json!({ "name": "Alice", "age": 30 })).unwrap();
/// assert_eq!(state.len(), 2);
/// assert!(state.contains("age"));
/// assert!(!state.contains("roles"));
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PartialState {
    fields: Arc<BTreeMap<String, Value>>,
}

impl PartialState {
    /// Creates an empty partial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value bound to `key`, or `None` when the key is absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns `true` if `key` is bound.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns the number of bound fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is bound.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the bound keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates over the bound `(key, value)` pairs in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns a new state with `key` bound to `value`.
    ///
    /// Any previous binding of `key` is replaced.
    ///
    /// # Arguments
    ///
    /// * `key` - The field name
    /// * `value` - The value to bind
    ///
    /// # Returns
    ///
    /// A new state; the receiver's storage is copied only if it is shared.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        Arc::make_mut(&mut self.fields).insert(key.into(), value);
        self
    }

    /// Returns a new state without `key`.
    ///
    /// Removing an absent key returns the state unchanged and does not copy
    /// shared storage.
    #[must_use]
    pub fn without(mut self, key: &str) -> Self {
        if self.fields.contains_key(key) {
            Arc::make_mut(&mut self.fields).remove(key);
        }
        self
    }

    /// Merges `other` over this state.
    ///
    /// Keys bound in `other` win; keys bound only in `self` are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use lenscraft::state::PartialState;
    /// use serde_json::json;
    ///
    /// let base = PartialState::try_from(json!({ "role": "user", "age": 1 })).unwrap();
    /// let over = PartialState::try_from(json!({ "role": "admin" })).unwrap();
    ///
    /// let merged = base.overlay(&over);
    /// assert_eq!(merged.get("role"), Some(&json!("admin")));
    /// assert_eq!(merged.get("age"), Some(&json!(1)));
    /// ```
    #[must_use]
    pub fn overlay(mut self, other: &Self) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other.clone();
        }
        let fields = Arc::make_mut(&mut self.fields);
        for (key, value) in other.fields.iter() {
            fields.insert(key.clone(), value.clone());
        }
        self
    }

    /// Converts this state into a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Builds a partial state from any value that serializes to a JSON object.
    ///
    /// This is the usual way to turn a fully-typed default (for example the
    /// result of `Default::default()`) into a partial state.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized or does not serialize
    /// to an object.
    pub fn from_serialize<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(serde::ser::Error::custom(format!(
                "expected a value that serializes to an object, got {}",
                value_kind(&other)
            ))),
        }
    }
}

/// Short name of a JSON value's kind, used in messages.
const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl std::fmt::Debug for PartialState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_map().entries(self.fields.iter()).finish()
    }
}

impl From<Map<String, Value>> for PartialState {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<BTreeMap<String, Value>> for PartialState {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self {
            fields: Arc::new(fields),
        }
    }
}

/// Only JSON objects convert; any other value is handed back unchanged.
impl TryFrom<Value> for PartialState {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(other),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for PartialState {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iterator: I) -> Self {
        Self::from(
            iterator
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect::<BTreeMap<_, _>>(),
        )
    }
}

impl Serialize for PartialState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter())
    }
}

impl<'de> Deserialize<'de> for PartialState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, Value>::deserialize(deserializer).map(Self::from)
    }
}

static_assertions::assert_impl_all!(PartialState: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_with_does_not_affect_clones() {
        let original = PartialState::new().with("name", json!("Alice"));
        let copy = original.clone();

        let updated = copy.with("name", json!("Bob"));

        assert_eq!(original.get("name"), Some(&json!("Alice")));
        assert_eq!(updated.get("name"), Some(&json!("Bob")));
    }

    #[test]
    fn test_without_absent_key_keeps_storage_shared() {
        let original = PartialState::new().with("name", json!("Alice"));
        let result = original.clone().without("age");

        assert!(Arc::ptr_eq(&original.fields, &result.fields));
    }

    #[test]
    fn test_without_removes_key() {
        let state = PartialState::new()
            .with("name", json!("Alice"))
            .with("age", json!(30));

        let result = state.without("age");

        assert_eq!(result.len(), 1);
        assert!(!result.contains("age"));
    }

    #[test]
    fn test_overlay_right_bias() {
        let base: PartialState = [("a", json!(1)), ("b", json!(2))].into_iter().collect();
        let over: PartialState = [("b", json!(20)), ("c", json!(30))].into_iter().collect();

        let merged = base.overlay(&over);

        assert_eq!(merged.to_value(), json!({ "a": 1, "b": 20, "c": 30 }));
    }

    #[rstest]
    #[case(json!(1), "a number")]
    #[case(json!("text"), "a string")]
    #[case(json!([1, 2]), "an array")]
    #[case(json!(null), "null")]
    fn test_try_from_rejects_non_objects(#[case] value: Value, #[case] kind: &str) {
        let rejected = PartialState::try_from(value.clone()).unwrap_err();
        assert_eq!(rejected, value);
        assert_eq!(value_kind(&rejected), kind);
    }

    #[test]
    fn test_from_serialize_struct() {
        #[derive(Serialize)]
        struct Settings {
            role: String,
            limit: u32,
        }

        let state = PartialState::from_serialize(&Settings {
            role: "guest".to_string(),
            limit: 3,
        })
        .unwrap();

        assert_eq!(state.to_value(), json!({ "role": "guest", "limit": 3 }));
    }

    #[test]
    fn test_from_serialize_rejects_scalars() {
        let error = PartialState::from_serialize(&42).unwrap_err();
        assert!(error.to_string().contains("a number"));
    }

    #[test]
    fn test_serde_round_trip_as_object() {
        let state: PartialState = [("name", json!("Alice"))].into_iter().collect();

        let text = serde_json::to_string(&state).unwrap();
        assert_eq!(text, r#"{"name":"Alice"}"#);

        let parsed: PartialState = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, state);
    }

    #[test]
    fn test_debug_lists_fields() {
        let state: PartialState = [("age", json!(30))].into_iter().collect();
        let debug_string = format!("{state:?}");
        assert!(debug_string.starts_with('{'));
        assert!(debug_string.contains("\"age\""));
        assert!(debug_string.contains("30"));
    }
}
