//! Cell payloads as seen by the tracker.
//!
//! The tracker never interprets cell contents beyond the name (which keys
//! the handler tables) and whatever a registered hook chooses to read.
//! Cell data is read-only from the tracker's perspective; mutation goes
//! through [`GridMut`](crate::grid::GridMut) and the write-back cache.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Read-only payload of one cell.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CellData {
    /// Interned cell name; keys the neighbour-set and filter tables.
    pub name: Arc<str>,
    /// Orientation byte (facedir-style). Opaque to the core; hooks that
    /// enumerate rotated candidate sets read it.
    pub orientation: u8,
}

impl CellData {
    /// Cell with the given name and default orientation.
    pub fn named(name: &str) -> Self {
        CellData {
            name: Arc::from(name),
            orientation: 0,
        }
    }

    /// Cell with an explicit orientation.
    pub fn oriented(name: &str, orientation: u8) -> Self {
        CellData {
            name: Arc::from(name),
            orientation,
        }
    }
}

/// Per-cell metadata delta. Entries merge key-wise; later patches win.
///
/// The write-back cache batches these and flushes them after node writes,
/// so at any position the node write lands before its metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetaPatch(pub BTreeMap<String, String>);

impl MetaPatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-entry patch.
    pub fn entry(key: &str, value: &str) -> Self {
        let mut map = BTreeMap::new();
        map.insert(key.to_owned(), value.to_owned());
        MetaPatch(map)
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn merge(&mut self, other: MetaPatch) {
        self.0.extend(other.0);
    }
}
