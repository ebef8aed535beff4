//! Epoch duration estimation and automatic mode selection.

use crate::analyze::Method;
use crate::analyzers::AnalysisMode;
use crate::dataset::SignalDataset;
use crate::settings::AnalyzeSettings;
use std::collections::BTreeMap;

/// Mean over the non-NaN entries; NaN when none remain.
pub(crate) fn nan_mean(values: &[f64]) -> f64 {
    use statrs::statistics::Statistics;
    values.iter().copied().filter(|v| !v.is_nan()).mean()
}

/// Mean duration in seconds of the dataset's epoch groups.
///
/// Groups are the entries of a per-epoch mapping, or the distinct `Label`
/// values of a flat table; a flat table without a `Label` column is one group
/// spanning the whole recording. Each group's duration is its row count
/// divided by the sampling rate. Returns NaN when there are no groups.
pub fn mean_duration(data: &SignalDataset, sampling_rate: f64) -> f64 {
    let durations: Vec<f64> = match data {
        SignalDataset::Single(table) => {
            if table.has_column("Label") {
                let mut counts: BTreeMap<String, usize> = BTreeMap::new();
                for value in table.column("Label").unwrap_or(&[]) {
                    *counts.entry(value.to_string()).or_insert(0) += 1;
                }
                counts
                    .values()
                    .map(|&count| count as f64 / sampling_rate)
                    .collect()
            } else {
                vec![table.len() as f64 / sampling_rate]
            }
        }
        SignalDataset::Epochs(epochs) => epochs
            .iter()
            .map(|epoch| epoch.table.len() as f64 / sampling_rate)
            .collect(),
    };
    nan_mean(&durations)
}

/// Resolve the requested method into a concrete analysis mode.
///
/// `Auto` estimates the mean epoch duration and treats recordings at or above
/// the configured cutoff (default 10 s) as interval-related; the boundary is
/// inclusive on the interval side.
pub fn resolve_mode(
    method: Method,
    data: &SignalDataset,
    sampling_rate: f64,
    settings: &AnalyzeSettings,
) -> AnalysisMode {
    let mode = match method {
        Method::EventRelated => AnalysisMode::EventRelated,
        Method::IntervalRelated => AnalysisMode::IntervalRelated,
        Method::Auto => {
            let duration = mean_duration(data, sampling_rate);
            tracing::debug!(duration, "auto mode selection from mean epoch duration");
            if duration >= settings.interval_duration_secs {
                AnalysisMode::IntervalRelated
            } else {
                AnalysisMode::EventRelated
            }
        }
    };
    tracing::debug!(?mode, "resolved analysis mode");
    mode
}
