//! Inbound-filter table: may this destination accept a connection?
//!
//! Keyed by the *destination* cell's name: acceptance is the
//! destination's policy, independent of how the source enumerated its
//! candidates. A missing filter means reject — connectivity is opt-in
//! from both ends.

use crate::grid::{CellData, Offset};
use crate::lut::handler::{HandlerLut, HookError, QueryError};
use crate::track_error::TrackError;

/// One inbound-connection question.
#[derive(Clone, Debug)]
pub struct FilterQuery {
    /// Cell data of the connecting source.
    pub src: CellData,
    /// Cell data of the destination being asked.
    pub dest: CellData,
    /// Extradata key the source's candidate carried.
    pub extradata: String,
    /// Effective inbound direction at the destination.
    pub direction: Offset,
}

/// Cell-name keyed table of inbound predicates.
pub struct FilterLut {
    inner: HandlerLut<String, FilterQuery, bool>,
}

impl FilterLut {
    /// Empty table.
    pub fn new() -> Self {
        FilterLut {
            inner: HandlerLut::new("inbound-filter lut", |q: &FilterQuery| {
                q.dest.name.to_string()
            }),
        }
    }

    /// Register an inbound predicate for destination cells named `name`.
    pub fn register(
        &mut self,
        name: &str,
        hook: impl Fn(&FilterQuery) -> Result<bool, HookError> + 'static,
    ) -> Result<(), TrackError> {
        self.inner.register(name.to_owned(), hook)
    }

    /// Accept every inbound connection to cells named `name`.
    pub fn accept_all(&mut self, name: &str) -> Result<(), TrackError> {
        self.inner.register(name.to_owned(), |_| Ok(true))
    }

    /// Ask the destination's predicate.
    pub fn query(&self, query: &FilterQuery) -> Result<bool, QueryError> {
        self.inner.query(query)
    }

    /// True when a predicate is bound for `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.is_registered(&name.to_owned())
    }
}

impl Default for FilterLut {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FilterLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}
