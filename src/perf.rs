//! Fast hash containers for hot partition tables.
//!
//! Iteration order of these containers is arbitrary and varies between
//! runs. Code that iterates them directly (repair seed selection, rope
//! sweeps, flood sibling expansion) must not depend on the order; the
//! trackers only promise order-insensitive results, and tests compare
//! partitions as sets.

/// Hash set with a faster, DoS-resistant-enough hasher for internal tables.
pub type FastSet<T> = ahash::AHashSet<T>;

/// Hash map counterpart of [`FastSet`].
///
/// Used for the partition tables (`key -> component`, `component -> members`)
/// and the rope-graph edge tables, which are touched on every mutation.
pub type FastMap<K, V> = ahash::AHashMap<K, V>;
