//! Demonstration of the analysis dispatch pipeline.
//!
//! This example shows how to:
//! 1. Build a per-epoch dataset of processed signals
//! 2. Register stub channel analyzers and an RSA aggregator
//! 3. Run automatic event-/interval-related analysis
//! 4. Export the assembled feature table as JSON
//!
//! Run with: cargo run --example analyze_demo
//!
//! Real deployments register analyzers backed by actual signal processing;
//! the stubs here just average one column so the dispatch flow is visible.

use std::collections::BTreeMap;

use physio_features::{
    AnalysisMode, AnalyzeRequest, BioAnalyzer, BoxError, Channel, ChannelAnalyzer, ChannelRequest,
    Epoch, FeatureTable, RsaAggregator, SignalDataset, SignalTable, Value,
};

/// Averages one signal column per epoch and echoes the epoch label.
struct MeanAnalyzer {
    column: &'static str,
    feature: &'static str,
}

impl ChannelAnalyzer for MeanAnalyzer {
    fn analyze(
        &self,
        data: &SignalDataset,
        request: &ChannelRequest<'_>,
    ) -> Result<FeatureTable, BoxError> {
        let SignalDataset::Epochs(epochs) = data else {
            return Err("this demo only handles per-epoch input".into());
        };
        assert_eq!(request.mode, AnalysisMode::EventRelated);

        let mut table = FeatureTable::with_index(epochs.iter().map(|e| e.label.clone()).collect());
        table.insert(
            "Label",
            epochs.iter().map(|e| Value::Text(e.label.clone())).collect(),
        )?;
        table.insert(
            self.feature,
            epochs
                .iter()
                .map(|e| {
                    let values = e.table.float_column(self.column).unwrap_or_default();
                    let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
                    Value::Float(mean)
                })
                .collect(),
        )?;
        Ok(table)
    }
}

struct MeanRsa;

impl RsaAggregator for MeanRsa {
    fn summarize(
        &self,
        table: &SignalTable,
        _sampling_rate: f64,
    ) -> Result<BTreeMap<String, f64>, BoxError> {
        let values = table.float_column("RSA_P2T").unwrap_or_default();
        let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
        let mut out = BTreeMap::new();
        out.insert("RSA_P2T_Mean".to_string(), mean);
        Ok(out)
    }
}

/// One 2-second epoch at 10 Hz with a pre-onset baseline segment.
fn demo_epoch(label: &str, rate: f64, rsa_response: f64) -> Epoch {
    let index: Vec<f64> = (0..20).map(|i| -0.5 + i as f64 * 0.1).collect();
    let rows = index.len();
    let mut table = SignalTable::new(index.clone());
    table.insert_floats("ECG_Rate", vec![rate; rows]).unwrap();
    table.insert_floats("RSP_Rate", vec![14.0; rows]).unwrap();
    table.insert_floats("RSP_Phase", vec![0.0; rows]).unwrap();
    table
        .insert_floats("RSP_Phase_Completion", vec![0.5; rows])
        .unwrap();
    table
        .insert_floats(
            "RSA_P2T",
            index
                .iter()
                .map(|&t| if t <= 0.0 { 0.1 } else { rsa_response })
                .collect(),
        )
        .unwrap();
    table
        .insert_floats("RSA_Gates", vec![0.1; rows])
        .unwrap();
    Epoch::new(label, table)
}

fn main() {
    // RUST_LOG=physio_features=debug shows the dispatch decisions.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Physio Features - Analyze Demo");
    println!("==============================");
    println!();

    let data = SignalDataset::Epochs(vec![
        demo_epoch("1", 62.0, 0.3),
        demo_epoch("2", 68.0, 0.5),
        demo_epoch("3", 65.0, 0.2),
        demo_epoch("4", 71.0, 0.6),
    ]);

    let analyzer = BioAnalyzer::new()
        .with_channel(
            Channel::Ecg,
            MeanAnalyzer {
                column: "ECG_Rate",
                feature: "ECG_Rate_Mean",
            },
        )
        .with_channel(
            Channel::Rsp,
            MeanAnalyzer {
                column: "RSP_Rate",
                feature: "RSP_Rate_Mean",
            },
        )
        .with_rsa(MeanRsa);

    // 2-second epochs: automatic mode selection picks event-related
    // analysis, and RSA is baseline-corrected per epoch.
    let request = AnalyzeRequest {
        sampling_rate: 10.0,
        ..AnalyzeRequest::default()
    };

    match analyzer.analyze(&data, &request) {
        Ok(features) => {
            println!("{features}");
            println!(
                "JSON: {}",
                features.to_json_records().unwrap_or_default()
            );
        }
        Err(e) => eprintln!("Analysis failed: {e}"),
    }
}
