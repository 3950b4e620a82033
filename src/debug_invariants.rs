//! Self-auditing for the partition structures.
//!
//! The vertex-space, group-space and rope graph each maintain several
//! mirrored tables (key→component, component→members, edge↔rope). A
//! structure implements [`DebugInvariants`] by walking its tables and
//! reporting the first disagreement; the audit doubles as executable
//! documentation of what "consistent" means for that structure.
//!
//! Audits run via [`DebugInvariants::debug_assert_invariants`], which
//! panics on a violation in debug builds and under the
//! `strict-invariants`/`check-invariants` features, and compiles to a
//! no-op otherwise.

use crate::track_error::TrackError;

const AUDIT: bool = cfg!(any(
    debug_assertions,
    feature = "strict-invariants",
    feature = "check-invariants"
));

/// Structures that can audit their own internal tables.
pub trait DebugInvariants {
    /// Walk every internal table and report the first violation found.
    fn validate_invariants(&self) -> Result<(), TrackError>;

    /// Run the audit when auditing is compiled in; panic on violation.
    fn debug_assert_invariants(&self) {
        if AUDIT && let Err(violation) = self.validate_invariants() {
            panic!(
                "{} failed its table audit: {violation}",
                std::any::type_name::<Self>()
            );
        }
    }
}
