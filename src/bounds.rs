//! Common bound aliases used across tracker code.
//!
//! These traits have blanket impls, so any type satisfying the underlying
//! bounds will automatically implement them. They are zero-cost and only
//! reduce duplication in `where` clauses.

/// Canonical bound set for vertex keys (hashes).
///
/// Rationale:
/// - `Copy` for cheap pass-by-value in tight flood loops
/// - `Eq + Hash` for the `HashMap`-backed partition tables
/// - `Debug` for diagnostics and invariant checks
pub trait KeyLike: Copy + Eq + std::hash::Hash + std::fmt::Debug {}
impl<T> KeyLike for T where T: Copy + Eq + std::hash::Hash + std::fmt::Debug {}

/// Bound set for group handles in the rope graph. `Ord` on top of
/// [`KeyLike`] lets unordered pairs canonicalise as (lesser, greater).
pub trait GroupLike: KeyLike + Ord {}
impl<T> GroupLike for T where T: KeyLike + Ord {}

/// Minimal bound we expect of vertex payloads carried through floods.
/// Deliberately small to avoid over-constraining higher layers.
pub trait VertexLike: Clone {}
impl<T: Clone> VertexLike for T {}
