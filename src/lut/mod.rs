//! Handler lookup tables.
//!
//! Two registries drive successor computation: the neighbour-set table
//! (what candidates does a cell offer?) and the inbound-filter table
//! (does the destination accept?). Both are thin domain wrappers over
//! the generic [`HandlerLut`], which supplies duplicate checking and the
//! uniform NoData/HookFail error protocol.

pub mod filters;
pub mod handler;
pub mod neighbors;

pub use filters::{FilterLut, FilterQuery};
pub use handler::{HandlerLut, HookError, QueryError};
pub use neighbors::{Candidates, NeighborLut};
