//! Property-based tests for transform combinator laws.
//!
//! ## Composition Laws
//! - **Identity**: `compose!()(s) == s`
//! - **Ordering**: `compose!(t1, t2, t3)(s) == t3(t2(t1(s)))`
//! - **Associativity**: `compose!(t1, compose!(t2, t3)) == compose!(compose!(t1, t2), t3)`
//!
//! ## Conditional Laws
//! - **When True**: `when(p, t)(s) == t(s)` if `p(s)`
//! - **When False**: `when(p, t)(s) == s` if `!p(s)`
//! - **Exclusive Dispatch**: `when_else(p, t, f)` runs exactly one branch
//!
//! ## Default Precedence
//! - caller default, else struct default, else field default, else absent

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lenscraft::compose;
use lenscraft::defaults::merge_defaults;
use lenscraft::lens::Lens;
use lenscraft::state::{PartialState, Value};
use lenscraft::transform::{Transform, compose, identity, when, when_else};
use proptest::prelude::*;
use serde_json::json;

fn arbitrary_state() -> impl Strategy<Value = PartialState> {
    prop::collection::btree_map("[a-e]", any::<i64>().prop_map(Value::from), 0..5)
        .prop_map(PartialState::from)
}

fn add(key: &'static str, amount: i64) -> impl Fn(PartialState) -> PartialState + Send + Sync + Clone + 'static {
    move |state: PartialState| {
        let current = state.get(key).and_then(Value::as_i64).unwrap_or(0);
        state.with(key, json!(current.wrapping_add(amount)))
    }
}

fn double(key: &'static str) -> impl Fn(PartialState) -> PartialState + Send + Sync + Clone + 'static {
    move |state: PartialState| {
        let current = state.get(key).and_then(Value::as_i64).unwrap_or(1);
        state.with(key, json!(current.wrapping_mul(2)))
    }
}

// =============================================================================
// Composition Laws
// =============================================================================

proptest! {
    /// Identity Law: the empty composition returns its input
    #[test]
    fn prop_compose_empty_is_identity(state in arbitrary_state()) {
        prop_assert_eq!(compose!().apply(state.clone()), state.clone());
        prop_assert_eq!(compose(Vec::new()).apply(state.clone()), state.clone());
        prop_assert_eq!(identity().apply(state.clone()), state);
    }

    /// Ordering Law: compose!(t1, t2, t3)(s) == t3(t2(t1(s)))
    #[test]
    fn prop_compose_left_to_right(state in arbitrary_state(), first in -100i64..100, second in -100i64..100) {
        let t1 = add("a", first);
        let t2 = double("a");
        let t3 = add("a", second);

        let composed = compose!(t1.clone(), t2.clone(), t3.clone()).apply(state.clone());
        let manual = t3(t2(t1(state)));

        prop_assert_eq!(composed, manual);
    }

    /// Associativity Law
    #[test]
    fn prop_compose_associativity(state in arbitrary_state(), amount in -100i64..100) {
        let left = compose!(add("b", amount), compose!(double("b"), add("c", amount)));
        let right = compose!(compose!(add("b", amount), double("b")), add("c", amount));

        prop_assert_eq!(left.apply(state.clone()), right.apply(state));
    }

    /// then agrees with compose!
    #[test]
    fn prop_then_matches_compose(state in arbitrary_state(), amount in -100i64..100) {
        let chained = add("d", amount).then(double("d"));
        let composed = compose!(add("d", amount), double("d"));

        prop_assert_eq!(chained.apply(state.clone()), composed.apply(state));
    }
}

// =============================================================================
// Conditional Laws
// =============================================================================

proptest! {
    /// When True / When False Laws
    #[test]
    fn prop_when_dispatch(state in arbitrary_state(), amount in -100i64..100) {
        let has_a = |state: &PartialState| state.contains("a");
        let conditional = when(has_a, add("e", amount));

        let expected = if has_a(&state) {
            add("e", amount)(state.clone())
        } else {
            state.clone()
        };

        prop_assert_eq!(conditional.apply(state), expected);
    }

    /// Exclusive Dispatch Law: exactly one branch runs per evaluation
    #[test]
    fn prop_when_else_runs_one_branch(state in arbitrary_state()) {
        let true_runs = Arc::new(AtomicUsize::new(0));
        let false_runs = Arc::new(AtomicUsize::new(0));

        let count_true = {
            let true_runs = Arc::clone(&true_runs);
            move |state: PartialState| {
                true_runs.fetch_add(1, Ordering::SeqCst);
                state
            }
        };
        let count_false = {
            let false_runs = Arc::clone(&false_runs);
            move |state: PartialState| {
                false_runs.fetch_add(1, Ordering::SeqCst);
                state
            }
        };

        let conditional = when_else(|state: &PartialState| state.len() % 2 == 0, count_true, count_false);
        conditional.apply(state);

        prop_assert_eq!(true_runs.load(Ordering::SeqCst) + false_runs.load(Ordering::SeqCst), 1);
    }

    /// The predicate sees the output of earlier steps, not the chain's input
    #[test]
    fn prop_when_sees_current_state(state in arbitrary_state()) {
        let marker = Lens::<bool>::new("marker");
        let seen = Lens::<bool>::new("seen");
        let chain = compose!(
            marker.unset(),
            marker.set(true),
            when(move |state: &PartialState| marker.get(state) == Some(true), seen.set(true)),
        );

        let result = chain.apply(state);

        prop_assert_eq!(seen.get(&result), Some(true));
    }
}

// =============================================================================
// Default Precedence
// =============================================================================

fn optional_source(value: Option<i64>) -> PartialState {
    value
        .map(|value| ("k", json!(value)))
        .into_iter()
        .collect()
}

proptest! {
    /// Caller default, else struct default, else field default, else absent
    #[test]
    fn prop_default_precedence(
        field_level in proptest::option::of(any::<i64>()),
        struct_level in proptest::option::of(any::<i64>()),
        caller in proptest::option::of(any::<i64>())
    ) {
        let merged = merge_defaults(
            optional_source(field_level),
            Some(&optional_source(struct_level)),
            Some(&optional_source(caller)),
        );

        let expected = caller.or(struct_level).or(field_level).map(Value::from);

        prop_assert_eq!(merged.get("k").cloned(), expected);
    }
}
