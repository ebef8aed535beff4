//! Collaborator traits for per-channel analysis.
//!
//! The dispatch core does not extract features from raw signals itself: each
//! channel's analysis (filtering, peak statistics, rate summaries) lives
//! behind [`ChannelAnalyzer`], and the continuous respiratory sinus arrhythmia
//! summary behind [`RsaAggregator`]. Implementations are registered on a
//! [`crate::BioAnalyzer`] and invoked per detected channel.

use crate::dataset::SignalDataset;
use crate::table::{FeatureTable, SignalTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors raised inside collaborators; propagated to the caller unmodified.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The resolved analysis mode a collaborator is asked to run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// Short discrete event epochs: one feature row per epoch.
    EventRelated,
    /// A long continuous recording: one feature row total.
    IntervalRelated,
}

/// A sub-epoch window for rate-related features, forwarded verbatim to the
/// cardiac and respiratory analyzers. `None` endpoints leave that side of the
/// sub-epoch unbounded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum SubepochSpec {
    /// No sub-epoch restriction.
    #[default]
    Unset,
    /// One (start, end) pair applied to every rate feature.
    Range {
        start: Option<f64>,
        end: Option<f64>,
    },
    /// Per rate-feature (start, end) pairs, e.g. `"ECG_Rate" → (1.0, 2.0)`.
    PerFeature(BTreeMap<String, (Option<f64>, Option<f64>)>),
}

/// Per-invocation context handed to a channel analyzer.
#[derive(Debug, Clone, Copy)]
pub struct ChannelRequest<'a> {
    /// Sampling frequency of the signals, in Hz.
    pub sampling_rate: f64,
    /// The resolved analysis mode.
    pub mode: AnalysisMode,
    /// Sub-epoch window for rate features. Only the cardiac and respiratory
    /// analyzers receive one; other channels see `None`.
    pub subepoch_rate: Option<&'a SubepochSpec>,
}

/// Channel-specific feature extraction.
///
/// Implementations must return one row per epoch for
/// [`AnalysisMode::EventRelated`] input and a single row for
/// [`AnalysisMode::IntervalRelated`], with the row index matching the epoch
/// ordering of the input dataset.
pub trait ChannelAnalyzer {
    fn analyze(
        &self,
        data: &SignalDataset,
        request: &ChannelRequest<'_>,
    ) -> Result<FeatureTable, BoxError>;
}

/// Summary statistics over a continuous respiratory sinus arrhythmia
/// recording, used by interval-related analysis.
///
/// Returns a fixed set of named scalar features (e.g. `RSA_P2T_Mean`,
/// `RSA_Gates_SD`). Event-related analysis does not use this trait; it
/// consumes the per-sample `RSA_P2T`/`RSA_Gates` columns directly.
pub trait RsaAggregator {
    fn summarize(
        &self,
        table: &SignalTable,
        sampling_rate: f64,
    ) -> Result<BTreeMap<String, f64>, BoxError>;
}
