//! Respiratory sinus arrhythmia reconciliation.
//!
//! RSA is a cross-channel metric: its continuous per-sample estimates
//! (`RSA_P2T`, `RSA_Gates`) are computed upstream from cardiac rate and
//! respiratory phase under a shared time index, and this module reduces them
//! to per-epoch scalars (event-related analysis) or delegates whole-recording
//! summary statistics to the registered aggregator (interval-related
//! analysis), then shapes the result into a feature-table row per epoch or a
//! single row.

use crate::analyze::AnalyzeError;
use crate::analyzers::{AnalysisMode, RsaAggregator};
use crate::core::duration::nan_mean;
use crate::dataset::SignalDataset;
use crate::table::{FeatureTable, SignalTable, Value};
use statrs::statistics::Statistics;
use std::cmp::Ordering;

/// Column carrying the continuous peak-to-trough RSA estimate.
pub const RSA_P2T: &str = "RSA_P2T";
/// Column carrying the continuous Gates RSA estimate. Gate-based computation
/// can be undefined at some samples, so this column may contain NaN.
pub const RSA_GATES: &str = "RSA_Gates";

/// Compute the RSA feature table for the resolved mode.
///
/// Returns `Ok(None)` when interval-related analysis was selected but no
/// aggregator is registered; event-related analysis consumes the continuous
/// columns directly and always yields a table. Output rows may contain NaN.
pub fn rsa_features(
    data: &SignalDataset,
    mode: AnalysisMode,
    sampling_rate: f64,
    aggregator: Option<&dyn RsaAggregator>,
) -> Result<Option<FeatureTable>, AnalyzeError> {
    match mode {
        AnalysisMode::EventRelated => rsa_event(data).map(Some),
        AnalysisMode::IntervalRelated => match aggregator {
            Some(aggregator) => rsa_interval(data, sampling_rate, aggregator).map(Some),
            None => {
                tracing::debug!("no RSA aggregator registered, skipping interval RSA");
                Ok(None)
            }
        },
    }
}

/// Event-related path: one baseline-corrected summary row per epoch.
fn rsa_event(data: &SignalDataset) -> Result<FeatureTable, AnalyzeError> {
    // Fresh accumulator on every call; rows must never leak between calls.
    let mut rows: Vec<(String, [f64; 2])> = Vec::new();

    match data {
        SignalDataset::Epochs(epochs) => {
            for epoch in epochs {
                rows.push((epoch.label.clone(), summarize_epoch(&epoch.table)?));
            }
        }
        SignalDataset::Single(table) => {
            if !table.has_column("Label") {
                return Err(AnalyzeError::MissingColumn("Label"));
            }
            if !table.has_column("Time") {
                return Err(AnalyzeError::MissingColumn("Time"));
            }
            for (label, group) in table.group_by("Label", "Time") {
                rows.push((label, summarize_epoch(&group)?));
            }
            // Grouping yields string labels; epochs are numbered, so restore
            // numeric order for the merge with the other feature tables.
            rows.sort_by(|(a, _), (b, _)| match (a.parse::<i64>(), b.parse::<i64>()) {
                (Ok(a), Ok(b)) => a.cmp(&b),
                _ => Ordering::Equal,
            });
        }
    }

    let mut table =
        FeatureTable::with_index(rows.iter().map(|(label, _)| label.clone()).collect());
    table.insert(
        RSA_P2T,
        rows.iter().map(|(_, summary)| Value::Float(summary[0])).collect(),
    )?;
    table.insert(
        RSA_GATES,
        rows.iter().map(|(_, summary)| Value::Float(summary[1])).collect(),
    )?;
    Ok(table)
}

/// Summarize one epoch's continuous RSA estimates into `[P2T, Gates]`.
///
/// When the epoch's index reaches into pre-onset time (any value ≤ 0), each
/// output is the post-onset mean minus the baseline mean; otherwise it is the
/// plain mean over the whole epoch. `RSA_Gates` uses NaN-ignoring means
/// throughout.
fn summarize_epoch(epoch: &SignalTable) -> Result<[f64; 2], AnalyzeError> {
    let p2t = epoch
        .float_column(RSA_P2T)
        .ok_or(AnalyzeError::MissingColumn(RSA_P2T))?;
    let gates = epoch
        .float_column(RSA_GATES)
        .ok_or(AnalyzeError::MissingColumn(RSA_GATES))?;

    let has_baseline = epoch.index().iter().any(|&t| t <= 0.0);
    if has_baseline {
        let (p2t_base, p2t_signal) = split_baseline(epoch.index(), &p2t);
        let (gates_base, gates_signal) = split_baseline(epoch.index(), &gates);
        Ok([
            p2t_signal.iter().mean() - p2t_base.iter().mean(),
            nan_mean(&gates_signal) - nan_mean(&gates_base),
        ])
    } else {
        Ok([p2t.iter().mean(), nan_mean(&gates)])
    }
}

/// Interval-related path: delegate to the aggregator, one row per recording.
fn rsa_interval(
    data: &SignalDataset,
    sampling_rate: f64,
    aggregator: &dyn RsaAggregator,
) -> Result<FeatureTable, AnalyzeError> {
    match data {
        SignalDataset::Single(table) => {
            let summary = aggregator
                .summarize(table, sampling_rate)
                .map_err(|source| AnalyzeError::Rsa { source })?;
            Ok(FeatureTable::single_row(
                summary
                    .into_iter()
                    .map(|(name, value)| (name, Value::Float(value))),
            ))
        }
        SignalDataset::Epochs(epochs) => {
            let mut labels = Vec::with_capacity(epochs.len());
            let mut summaries = Vec::with_capacity(epochs.len());
            for epoch in epochs {
                // Each entry is treated as its own continuous recording:
                // re-indexed on its sample counter, epoch label dropped.
                let mut prepared = epoch
                    .table
                    .reindex_from("Index")
                    .unwrap_or_else(|| epoch.table.clone());
                prepared.drop_column("Label");
                let summary = aggregator
                    .summarize(&prepared, sampling_rate)
                    .map_err(|source| AnalyzeError::Rsa { source })?;
                labels.push(epoch.label.clone());
                summaries.push(summary);
            }

            let mut columns: Vec<String> = Vec::new();
            for summary in &summaries {
                for name in summary.keys() {
                    if !columns.iter().any(|c| c == name) {
                        columns.push(name.clone());
                    }
                }
            }
            let mut table = FeatureTable::with_index(labels);
            for name in columns {
                let values = summaries
                    .iter()
                    .map(|summary| {
                        Value::Float(summary.get(&name).copied().unwrap_or(f64::NAN))
                    })
                    .collect();
                table.insert(name, values)?;
            }
            Ok(table)
        }
    }
}

/// Partition a column into baseline (index ≤ 0) and signal (index > 0) values.
fn split_baseline(index: &[f64], values: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut baseline = Vec::new();
    let mut signal = Vec::new();
    for (&t, &v) in index.iter().zip(values) {
        if t <= 0.0 {
            baseline.push(v);
        } else {
            signal.push(v);
        }
    }
    (baseline, signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::BoxError;
    use crate::dataset::Epoch;
    use std::collections::BTreeMap;

    fn rsa_epoch(index: Vec<f64>, p2t: Vec<f64>, gates: Vec<f64>) -> SignalTable {
        let mut table = SignalTable::new(index);
        table.insert_floats(RSA_P2T, p2t).unwrap();
        table.insert_floats(RSA_GATES, gates).unwrap();
        table
    }

    #[test]
    fn test_baseline_correction() {
        let epoch = rsa_epoch(
            vec![-2.0, -1.0, 0.0, 1.0, 2.0],
            vec![1.0, 1.0, 1.0, 3.0, 5.0],
            vec![1.0, 1.0, 1.0, 3.0, 5.0],
        );
        let [p2t, gates] = summarize_epoch(&epoch).unwrap();
        // Baseline mean 1.0 (t ≤ 0), post-onset mean 4.0.
        assert_eq!(p2t, 3.0);
        assert_eq!(gates, 3.0);
    }

    #[test]
    fn test_no_baseline_is_plain_mean() {
        let epoch = rsa_epoch(vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0], vec![2.0, 4.0, 6.0]);
        let [p2t, gates] = summarize_epoch(&epoch).unwrap();
        assert_eq!(p2t, 4.0);
        assert_eq!(gates, 4.0);
    }

    #[test]
    fn test_gates_mean_ignores_nan() {
        let epoch = rsa_epoch(
            vec![-1.0, 1.0, 2.0],
            vec![1.0, 3.0, 5.0],
            vec![1.0, f64::NAN, 5.0],
        );
        let [p2t, gates] = summarize_epoch(&epoch).unwrap();
        assert_eq!(p2t, 3.0);
        // Gates baseline nan-mean 1.0, signal nan-mean 5.0.
        assert_eq!(gates, 4.0);
    }

    #[test]
    fn test_missing_continuous_column() {
        let table = SignalTable::new(vec![0.0]);
        assert!(matches!(
            summarize_epoch(&table),
            Err(AnalyzeError::MissingColumn(RSA_P2T))
        ));
    }

    #[test]
    fn test_event_rows_follow_epoch_order() {
        let data = SignalDataset::Epochs(vec![
            Epoch::new("1", rsa_epoch(vec![1.0], vec![2.0], vec![2.0])),
            Epoch::new("2", rsa_epoch(vec![1.0], vec![4.0], vec![4.0])),
        ]);
        let table = rsa_event(&data).unwrap();
        assert_eq!(table.index(), &["1".to_string(), "2".to_string()]);
        assert_eq!(
            table.column(RSA_P2T).unwrap(),
            &[Value::Float(2.0), Value::Float(4.0)]
        );
    }

    #[test]
    fn test_flat_table_groups_sort_numerically() {
        let mut table = SignalTable::new(vec![0.0, 1.0, 2.0, 3.0]);
        table
            .insert(
                "Label",
                vec!["10", "10", "2", "2"]
                    .into_iter()
                    .map(Value::from)
                    .collect(),
            )
            .unwrap();
        table
            .insert_floats("Time", vec![1.0, 2.0, 1.0, 2.0])
            .unwrap();
        table
            .insert_floats(RSA_P2T, vec![10.0, 10.0, 2.0, 2.0])
            .unwrap();
        table
            .insert_floats(RSA_GATES, vec![10.0, 10.0, 2.0, 2.0])
            .unwrap();

        let result = rsa_event(&SignalDataset::Single(table)).unwrap();
        assert_eq!(result.index(), &["2".to_string(), "10".to_string()]);
        assert_eq!(
            result.column(RSA_P2T).unwrap(),
            &[Value::Float(2.0), Value::Float(10.0)]
        );
    }

    #[test]
    fn test_flat_table_requires_label_and_time() {
        let table = rsa_epoch(vec![1.0], vec![1.0], vec![1.0]);
        assert!(matches!(
            rsa_event(&SignalDataset::Single(table)),
            Err(AnalyzeError::MissingColumn("Label"))
        ));
    }

    struct FixedAggregator;

    impl RsaAggregator for FixedAggregator {
        fn summarize(
            &self,
            table: &SignalTable,
            _sampling_rate: f64,
        ) -> Result<BTreeMap<String, f64>, BoxError> {
            let mut out = BTreeMap::new();
            out.insert("RSA_P2T_Mean".to_string(), table.len() as f64);
            out.insert("RSA_Gates_SD".to_string(), 0.5);
            Ok(out)
        }
    }

    #[test]
    fn test_interval_single_recording_is_one_row() {
        let data = SignalDataset::Single(rsa_epoch(
            vec![0.0, 1.0, 2.0],
            vec![1.0; 3],
            vec![1.0; 3],
        ));
        let table = rsa_interval(&data, 100.0, &FixedAggregator).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.index(), &["0".to_string()]);
        assert_eq!(table.column("RSA_P2T_Mean").unwrap(), &[Value::Float(3.0)]);
    }

    #[test]
    fn test_interval_epochs_drop_label_and_reindex() {
        let mut epoch_table = rsa_epoch(vec![0.0, 1.0], vec![1.0; 2], vec![1.0; 2]);
        epoch_table
            .insert("Label", vec![Value::from("1"), Value::from("1")])
            .unwrap();
        epoch_table
            .insert_floats("Index", vec![100.0, 101.0])
            .unwrap();
        let data = SignalDataset::Epochs(vec![Epoch::new("1", epoch_table)]);

        struct Inspecting;
        impl RsaAggregator for Inspecting {
            fn summarize(
                &self,
                table: &SignalTable,
                _sampling_rate: f64,
            ) -> Result<BTreeMap<String, f64>, BoxError> {
                assert!(!table.has_column("Label"));
                assert!(!table.has_column("Index"));
                assert_eq!(table.index(), &[100.0, 101.0]);
                Ok(BTreeMap::new())
            }
        }

        let table = rsa_interval(&data, 100.0, &Inspecting).unwrap();
        assert_eq!(table.index(), &["1".to_string()]);
    }

    #[test]
    fn test_interval_without_aggregator_is_skipped() {
        let data = SignalDataset::Single(rsa_epoch(vec![0.0], vec![1.0], vec![1.0]));
        let result = rsa_features(&data, AnalysisMode::IntervalRelated, 100.0, None).unwrap();
        assert!(result.is_none());
    }
}
