//! Input dataset shapes.
//!
//! Upstream processing pipelines deliver either one continuous recording or a
//! set of discrete event epochs. The two shapes are distinct variants so that
//! every downstream component matches on them explicitly instead of probing
//! the input at runtime.

use crate::table::SignalTable;
use serde::{Deserialize, Serialize};

/// One discrete event epoch: an identifying label and its signal table.
///
/// Labels are produced by upstream epoching and conventionally render as
/// integers ("1", "2", ...), but are treated as opaque identifiers here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    pub label: String,
    pub table: SignalTable,
}

impl Epoch {
    pub fn new(label: impl Into<String>, table: SignalTable) -> Self {
        Self {
            label: label.into(),
            table,
        }
    }
}

/// A processed multi-channel dataset, ready for feature aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalDataset {
    /// A single continuous recording (optionally carrying `Label`/`Time`
    /// columns that identify epochs within the flat table).
    Single(SignalTable),
    /// One table per discrete epoch, in event order.
    Epochs(Vec<Epoch>),
}

impl SignalDataset {
    /// The table column names are detected from: the single table itself, or
    /// the first epoch of a mapping (every epoch shares the same naming
    /// convention, so one representative suffices).
    pub fn representative(&self) -> Option<&SignalTable> {
        match self {
            SignalDataset::Single(table) => Some(table),
            SignalDataset::Epochs(epochs) => epochs.first().map(|e| &e.table),
        }
    }

    /// Whether this is the per-epoch mapping form.
    pub fn is_epochs(&self) -> bool {
        matches!(self, SignalDataset::Epochs(_))
    }
}
