//! Transforms and the combinators that assemble them.
//!
//! A [`Transform`] is a pure function from [`PartialState`] to
//! [`PartialState`]. Field-level transforms come from
//! [`Lens`](crate::lens::Lens); this module combines them:
//!
//! - [`compose`] / [`compose!`](crate::compose!): apply transforms left-to-right
//! - [`when`] / [`when_else`]: choose a branch from the current state
//! - [`identity`]: pass the state through unchanged
//! - [`Transform::then`]: chain two transforms
//!
//! # Laws
//!
//! ```text
//! compose!()(s)            == s
//! compose!(t1, t2, t3)(s)  == t3(t2(t1(s)))
//! when(p, t)(s)            == if p(s) { t(s) } else { s }
//! when_else(p, t, f)(s)    == if p(s) { t(s) } else { f(s) }
//! ```
//!
//! # Examples
//!
//! ```
//! use lenscraft::compose;
//! use lenscraft::lens::Lens;
//! use lenscraft::state::PartialState;
//! use lenscraft::transform::{Transform, when};
//!
//! let age = Lens::<u32>::new("age");
//! let adult = Lens::<bool>::new("adult");
//!
//! let chain = compose!(
//!     age.set(30),
//!     when(move |state: &PartialState| age.get(state) >= Some(18), adult.set(true)),
//! );
//!
//! let state = chain.apply(PartialState::new());
//! assert_eq!(adult.get(&state), Some(true));
//! ```

use std::sync::Arc;

use crate::state::PartialState;

/// A pure function from one partial state to the next.
///
/// Every `Fn(PartialState) -> PartialState` closure is a transform, so ad-hoc
/// edits can be mixed freely with lens-derived ones.
///
/// Implementations must not depend on anything but their input: the same
/// transform is applied once per build and may be reused across any number of
/// builds, from any thread.
pub trait Transform {
    /// Applies this transform, returning the next state.
    fn apply(&self, state: PartialState) -> PartialState;

    /// Chains `next` after this transform.
    ///
    /// `first.then(second)` applies `first`, then `second` to its output.
    fn then<T>(self, next: T) -> Then<Self, T>
    where
        Self: Sized,
        T: Transform,
    {
        Then::new(self, next)
    }

    /// Erases this transform's type so it can be stored alongside others.
    fn boxed(self) -> BoxedTransform
    where
        Self: Sized + Send + Sync + 'static,
    {
        BoxedTransform(Arc::new(self))
    }
}

impl<F> Transform for F
where
    F: Fn(PartialState) -> PartialState,
{
    fn apply(&self, state: PartialState) -> PartialState {
        self(state)
    }
}

// =============================================================================
// BoxedTransform
// =============================================================================

/// A type-erased, cloneable transform.
///
/// Cloning shares the underlying transform.
#[derive(Clone)]
pub struct BoxedTransform(Arc<dyn Transform + Send + Sync>);

impl Transform for BoxedTransform {
    fn apply(&self, state: PartialState) -> PartialState {
        self.0.apply(state)
    }

    fn boxed(self) -> BoxedTransform {
        self
    }
}

impl std::fmt::Debug for BoxedTransform {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("BoxedTransform")
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Identity
// =============================================================================

/// The transform that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl Transform for Identity {
    fn apply(&self, state: PartialState) -> PartialState {
        state
    }
}

/// Returns the identity transform.
#[must_use]
pub const fn identity() -> Identity {
    Identity
}

// =============================================================================
// Then
// =============================================================================

/// Two transforms applied in sequence. Created by [`Transform::then`].
#[derive(Debug, Clone)]
pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<A, B> Then<A, B> {
    /// Creates a transform applying `first`, then `second`.
    #[must_use]
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Transform, B: Transform> Transform for Then<A, B> {
    fn apply(&self, state: PartialState) -> PartialState {
        self.second.apply(self.first.apply(state))
    }
}

// =============================================================================
// Compose
// =============================================================================

/// A sequence of transforms folded left-to-right.
///
/// Each transform sees the previous one's output. Every transform runs
/// exactly once per application; there is no short-circuiting. An empty
/// sequence is the identity.
#[derive(Debug, Clone, Default)]
pub struct Compose {
    transforms: Vec<BoxedTransform>,
}

impl Compose {
    /// Creates a composition of `transforms`, applied in iteration order.
    #[must_use]
    pub const fn new(transforms: Vec<BoxedTransform>) -> Self {
        Self { transforms }
    }

    /// Returns the number of composed transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Returns `true` if this composition is the identity.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Transform for Compose {
    fn apply(&self, state: PartialState) -> PartialState {
        self.transforms
            .iter()
            .fold(state, |current, transform| transform.apply(current))
    }
}

impl FromIterator<BoxedTransform> for Compose {
    fn from_iter<I: IntoIterator<Item = BoxedTransform>>(iterator: I) -> Self {
        Self::new(iterator.into_iter().collect())
    }
}

/// Composes `transforms` into one transform applied left-to-right.
///
/// Use the [`compose!`](crate::compose!) macro to compose transforms of
/// different types without boxing them by hand.
///
/// # Examples
///
/// ```
/// use lenscraft::lens::Lens;
/// use lenscraft::state::PartialState;
/// use lenscraft::transform::{Transform, compose};
///
/// let count = Lens::<u32>::new("count");
/// let steps = vec![
///     count.set(1).boxed(),
///     count.modify(|value| value * 10).boxed(),
/// ];
///
/// let state = compose(steps).apply(PartialState::new());
/// assert_eq!(count.get(&state), Some(10));
/// ```
pub fn compose<I>(transforms: I) -> Compose
where
    I: IntoIterator<Item = BoxedTransform>,
{
    transforms.into_iter().collect()
}

/// Composes transforms left-to-right.
///
/// `compose!(t1, t2, t3)` applied to `s` is `t3(t2(t1(s)))`, and `compose!()`
/// is the identity. Arguments may be any mix of [`Transform`] types that are
/// `Send + Sync + 'static`.
///
/// # Examples
///
/// ```
/// use lenscraft::compose;
/// use lenscraft::lens::Lens;
/// use lenscraft::state::PartialState;
/// use lenscraft::transform::Transform;
///
/// let name = Lens::<String>::new("name");
/// let tags = Lens::<Vec<String>>::new("tags");
///
/// let chain = compose!(
///     name.set("Alice".to_string()),
///     tags.set(vec![]),
///     tags.modify(|mut tags| { tags.push("new".to_string()); tags }),
/// );
///
/// let state = chain.apply(PartialState::new());
/// assert_eq!(tags.get(&state), Some(vec!["new".to_string()]));
/// assert!(compose!().apply(state.clone()) == state);
/// ```
#[macro_export]
macro_rules! compose {
    () => {
        $crate::transform::Compose::default()
    };

    ($($transform:expr),+ $(,)?) => {
        $crate::transform::Compose::new(::std::vec![
            $($crate::transform::Transform::boxed($transform)),+
        ])
    };
}

// =============================================================================
// When
// =============================================================================

/// A conditional transform. Created by [`when`] or [`when_else`].
///
/// The predicate is evaluated against the state this transform receives, that
/// is, the output of whatever ran before it in the chain, and exactly one
/// branch is applied.
#[derive(Clone)]
pub struct When<P, T, F = Identity> {
    predicate: P,
    if_true: T,
    if_false: F,
}

impl<P, T> When<P, T, Identity> {
    /// Supplies the branch applied when the predicate is false.
    #[must_use]
    pub fn otherwise<F>(self, if_false: F) -> When<P, T, F>
    where
        F: Transform,
    {
        When {
            predicate: self.predicate,
            if_true: self.if_true,
            if_false,
        }
    }
}

impl<P, T, F> Transform for When<P, T, F>
where
    P: Fn(&PartialState) -> bool,
    T: Transform,
    F: Transform,
{
    fn apply(&self, state: PartialState) -> PartialState {
        if (self.predicate)(&state) {
            self.if_true.apply(state)
        } else {
            self.if_false.apply(state)
        }
    }
}

impl<P, T, F> std::fmt::Debug for When<P, T, F> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("When").finish_non_exhaustive()
    }
}

/// Applies `if_true` when `predicate` holds for the current state; otherwise
/// passes the state through unchanged.
///
/// The predicate receives the whole partial state and must handle fields
/// being absent.
///
/// # Examples
///
/// ```
/// use lenscraft::lens::Lens;
/// use lenscraft::state::PartialState;
/// use lenscraft::transform::{Transform, when};
///
/// let role = Lens::<String>::new("role");
/// let promote = when(|state: &PartialState| !state.contains("role"), role.set("user".to_string()));
///
/// let state = promote.apply(PartialState::new());
/// assert_eq!(role.get(&state).as_deref(), Some("user"));
/// ```
pub const fn when<P, T>(predicate: P, if_true: T) -> When<P, T, Identity>
where
    P: Fn(&PartialState) -> bool,
    T: Transform,
{
    When {
        predicate,
        if_true,
        if_false: Identity,
    }
}

/// Applies `if_true` when `predicate` holds for the current state, `if_false`
/// otherwise.
pub const fn when_else<P, T, F>(predicate: P, if_true: T, if_false: F) -> When<P, T, F>
where
    P: Fn(&PartialState) -> bool,
    T: Transform,
    F: Transform,
{
    When {
        predicate,
        if_true,
        if_false,
    }
}

static_assertions::assert_impl_all!(BoxedTransform: Send, Sync, Clone);
static_assertions::assert_impl_all!(Compose: Send, Sync, Clone);
