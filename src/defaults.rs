//! Default resolution.
//!
//! A builder starts every build from one merged partial state. Three sources
//! contribute to it, in increasing precedence:
//!
//! 1. defaults the schema declares on individual fields
//! 2. the default the schema declares for the whole structure
//! 3. the defaults the caller passes to
//!    [`define_with_defaults`](crate::builder::define_with_defaults)
//!
//! The structure-level default wins over field-level ones because it is an
//! explicit composite override; the caller's defaults win over both.
//!
//! Resolution is a pure function of its inputs and runs once, when the
//! builder is defined.

use serde::Serialize;

use crate::schema::Schema;
use crate::state::{PartialState, Value};

/// Merges the three default sources.
///
/// # Arguments
///
/// * `field_defaults` - Per-field defaults declared by the schema
/// * `struct_default` - The schema's whole-structure default, if any
/// * `caller_defaults` - The caller's defaults, if any
///
/// # Returns
///
/// The merged partial state. For every key, the caller's value if present,
/// else the structure-level value, else the field-level value; keys present
/// in no source stay absent.
///
/// # Examples
///
/// ```
/// use lenscraft::defaults::merge_defaults;
/// use lenscraft::state::PartialState;
/// use serde_json::json;
///
/// let field_level: PartialState = [("role", json!("user")), ("age", json!(1))].into_iter().collect();
/// let struct_level: PartialState = [("role", json!("admin"))].into_iter().collect();
/// let caller: PartialState = [("role", json!("guest"))].into_iter().collect();
///
/// let merged = merge_defaults(field_level, Some(&struct_level), Some(&caller));
/// assert_eq!(merged.to_value(), json!({ "role": "guest", "age": 1 }));
/// ```
#[must_use]
pub fn merge_defaults(
    field_defaults: PartialState,
    struct_default: Option<&PartialState>,
    caller_defaults: Option<&PartialState>,
) -> PartialState {
    [struct_default, caller_defaults]
        .into_iter()
        .flatten()
        .fold(field_defaults, PartialState::overlay)
}

/// Collects the defaults `schema` declares and merges them with the caller's.
///
/// Fields without a declared default are left absent; absence is not an
/// error.
#[must_use]
pub fn resolve_defaults<S>(schema: &S, caller_defaults: Option<&PartialState>) -> PartialState
where
    S: Schema + ?Sized,
{
    let field_defaults: PartialState = schema
        .fields()
        .into_iter()
        .filter_map(|key| schema.field_default(key).map(|value| (key, value)))
        .collect();
    let struct_default = schema.struct_default();

    let resolved = merge_defaults(field_defaults, struct_default.as_ref(), caller_defaults);

    tracing::trace!(
        schema = schema.name(),
        struct_default = struct_default.is_some(),
        caller_defaults = caller_defaults.map_or(0, PartialState::len),
        resolved = resolved.len(),
        "resolved defaults"
    );

    resolved
}

/// Serializes a per-field default declared by the schema named `schema`.
///
/// Returns `None` and logs at `warn` when `value` has no JSON form, leaving
/// the field without a default.
pub fn field_default_value<T>(schema: &str, key: &str, value: &T) -> Option<Value>
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value)
        .inspect_err(|error| {
            tracing::warn!(schema, field = key, %error, "field default has no JSON form; ignoring it");
        })
        .ok()
}

/// Serializes the whole-structure default declared by the schema named
/// `schema`.
///
/// Returns `None` and logs at `warn` when `value` has no JSON form or does
/// not serialize to an object.
pub fn struct_default_state<T>(schema: &str, value: &T) -> Option<PartialState>
where
    T: Serialize + ?Sized,
{
    PartialState::from_serialize(value)
        .inspect_err(|error| {
            tracing::warn!(schema, %error, "structure default has no JSON form; ignoring it");
        })
        .ok()
}
