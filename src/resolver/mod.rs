//! Cross-element pairing checks
//!
//! Each resolver takes its ledger of open keys by value, walks one measure's
//! events and returns the updated ledger with whatever it found. There is no
//! shared registry: the caller decides when a scope ends and calls the
//! matching `close_*` function on the ledger it holds.

pub mod beams;
pub mod groupings;
pub mod ties;

pub use beams::{close_beams, resolve_beams, BeamLedger};
pub use groupings::{close_groupings, resolve_groupings, GroupingKey, GroupingLedger};
pub use ties::{close_ties, resolve_ties, TieLedger};

use crate::diagnostics::Diagnostic;

/// Updated ledger plus the diagnostics produced while updating it
#[derive(Debug, Clone, Default)]
pub struct PairingReport<L> {
    pub ledger: L,
    pub diagnostics: Vec<Diagnostic>,
}
