//! Tunable thresholds for the analysis dispatch logic.

use serde::{Deserialize, Serialize};

/// Settings governing mode selection and the RSA activation guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeSettings {
    /// Minimum combined count of `ECG_Rate*` and `RSP_Phase*` columns
    /// required before respiratory sinus arrhythmia features are computed.
    ///
    /// The default of 3 is a heuristic cutoff that guards against accidental
    /// single-channel matches; it is not a principled invariant.
    pub rsa_column_threshold: usize,

    /// Mean epoch duration (seconds) at or above which automatic mode
    /// selection switches to interval-related analysis. The boundary is
    /// inclusive on the interval side.
    pub interval_duration_secs: f64,
}

impl Default for AnalyzeSettings {
    fn default() -> Self {
        Self {
            rsa_column_threshold: 3,
            interval_duration_secs: 10.0,
        }
    }
}
