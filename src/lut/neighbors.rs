//! Neighbour-set table: per-cell-kind candidate offsets.
//!
//! A registered hook receives the cell data and answers the finite set
//! of outbound candidates, each tagged with an opaque extradata key (a
//! side name, a wire channel, whatever the registrant needs to recognise
//! the candidate later in its filter hook). An empty map is a valid
//! answer: the cell simply has no outbound sides.

use crate::grid::{CellData, Offset};
use crate::lut::handler::{HandlerLut, HookError, QueryError};
use crate::perf::FastMap;
use crate::track_error::TrackError;

/// Candidate set: opaque extradata key → outbound offset.
///
/// Keys must be unique and offsets distinct; two candidates resolving to
/// the same destination is a registration bug the successor detects.
pub type Candidates = FastMap<String, Offset>;

/// Cell-name keyed table of candidate-set hooks.
pub struct NeighborLut {
    inner: HandlerLut<String, CellData, Candidates>,
}

impl NeighborLut {
    /// Empty table.
    pub fn new() -> Self {
        NeighborLut {
            inner: HandlerLut::new("neighbour-set lut", |cell: &CellData| {
                cell.name.to_string()
            }),
        }
    }

    /// Register a candidate hook for cells named `name`.
    pub fn add_custom_hook(
        &mut self,
        name: &str,
        hook: impl Fn(&CellData) -> Result<Candidates, HookError> + 'static,
    ) -> Result<(), TrackError> {
        self.inner.register(name.to_owned(), hook)
    }

    /// Convenience registration: a fixed candidate set regardless of the
    /// cell's ancillary data.
    pub fn add_static_hook(
        &mut self,
        name: &str,
        candidates: impl IntoIterator<Item = (&'static str, Offset)>,
    ) -> Result<(), TrackError> {
        let fixed: Candidates = candidates
            .into_iter()
            .map(|(k, off)| (k.to_owned(), off))
            .collect();
        self.inner
            .register(name.to_owned(), move |_| Ok(fixed.clone()))
    }

    /// Candidate set for `cell`.
    pub fn query(&self, cell: &CellData) -> Result<Candidates, QueryError> {
        self.inner.query(cell)
    }

    /// True when a hook is bound for `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.is_registered(&name.to_owned())
    }
}

impl Default for NeighborLut {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NeighborLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}
