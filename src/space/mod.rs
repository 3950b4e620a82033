//! Connectivity trackers: partitions of tracked vertices.
//!
//! Two strategies share this module:
//! - [`VertexSpace`]: unbounded maximal components ("graphs"). One
//!   insertion can merge arbitrarily many components; one removal can
//!   split a component into several.
//! - [`GroupSpace`]: components bounded to a configured size
//!   ("groups"), with the inter-group boundary tracked separately by
//!   the [`RopeGraph`] so coarse connectivity stays cheap to query.
//!
//! Component ids are the canonical external handle; member tables are
//! internal and never shared with callers.

pub mod events;
pub mod group_space;
pub mod rope;
pub mod vertex_space;

use std::fmt;
use std::num::NonZeroU64;

pub use events::{NoEvents, SpaceEvents};
pub use group_space::{GroupOptions, GroupSpace};
pub use rope::RopeGraph;
pub use vertex_space::VertexSpace;

use crate::track_error::TrackError;

/// Handle of one unbounded component in a [`VertexSpace`].
///
/// Monotonically allocated, never reused within one space. Wraps a
/// nonzero `u64`; 0 is reserved as invalid/sentinel.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct GraphId(NonZeroU64);

/// Handle of one bounded component in a [`GroupSpace`].
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[repr(transparent)]
pub struct GroupId(NonZeroU64);

macro_rules! component_id_impls {
    ($name:ident) => {
        impl $name {
            /// Creates an id from a raw `u64`; errors on zero.
            #[inline]
            pub fn new(raw: u64) -> Result<Self, TrackError> {
                NonZeroU64::new(raw)
                    .map($name)
                    .ok_or(TrackError::InvalidComponentId)
            }

            /// The underlying `u64`.
            #[inline]
            pub fn get(&self) -> u64 {
                self.0.get()
            }

            pub(crate) fn first() -> Self {
                $name(NonZeroU64::MIN)
            }

            pub(crate) fn bump(&mut self) -> Self {
                let id = *self;
                self.0 = self.0.checked_add(1).expect("component id overflow");
                id
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.get()).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.get())
            }
        }
    };
}

component_id_impls!(GraphId);
component_id_impls!(GroupId);
