//! Analysis dispatch: the crate's entry point.
//!
//! [`BioAnalyzer`] holds the registered per-channel analyzers and the RSA
//! aggregator, and [`BioAnalyzer::analyze`] runs the full pipeline: detect
//! channels, slice per-channel windows, delegate to each analyzer, reconcile
//! RSA, and assemble one feature table.

use crate::analyzers::{BoxError, ChannelAnalyzer, ChannelRequest, RsaAggregator, SubepochSpec};
use crate::core::channels::{Channel, ChannelPresence};
use crate::core::duration::resolve_mode;
use crate::core::rsa::rsa_features;
use crate::core::windowing::{slice_for_channel, WindowSpec};
use crate::dataset::SignalDataset;
use crate::settings::AnalyzeSettings;
use crate::table::{FeatureTable, TableError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The requested analysis method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    /// Choose based on mean epoch duration: event-related under the
    /// configured cutoff (default 10 s), interval-related at or above it.
    #[default]
    Auto,
    /// Event-related analysis on short discrete epochs.
    EventRelated,
    /// Interval-related analysis on longer continuous recordings.
    IntervalRelated,
}

impl FromStr for Method {
    type Err = AnalyzeError;

    /// Accepted spellings, case-insensitive: `auto`; `event-related`,
    /// `event`, `epoch`; `interval-related`, `interval`, `resting-state`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Method::Auto),
            "event-related" | "event" | "epoch" => Ok(Method::EventRelated),
            "interval-related" | "interval" | "resting-state" => Ok(Method::IntervalRelated),
            _ => Err(AnalyzeError::UnknownMethod(s.to_string())),
        }
    }
}

/// One analysis invocation's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Sampling frequency of the signals, in Hz.
    pub sampling_rate: f64,
    /// Requested analysis method.
    pub method: Method,
    /// Per-channel epoch windows.
    pub window_lengths: WindowSpec,
    /// Sub-epoch window for cardiac/respiratory rate features, forwarded
    /// verbatim to those analyzers.
    pub subepoch_rate: SubepochSpec,
}

impl Default for AnalyzeRequest {
    fn default() -> Self {
        Self {
            sampling_rate: 1000.0,
            method: Method::Auto,
            window_lengths: WindowSpec::Constant,
            subepoch_rate: SubepochSpec::Unset,
        }
    }
}

/// Errors surfaced by [`BioAnalyzer::analyze`].
#[derive(Debug)]
pub enum AnalyzeError {
    /// The method string is not one of the accepted spellings.
    UnknownMethod(String),
    /// The per-epoch input contains no epochs.
    EmptyInput,
    /// A required column is absent from the input.
    MissingColumn(&'static str),
    /// Feature tables produced upstream did not share a row index.
    Table(TableError),
    /// A channel analyzer failed; the underlying error is unmodified.
    Analyzer { channel: Channel, source: BoxError },
    /// The RSA aggregator failed; the underlying error is unmodified.
    Rsa { source: BoxError },
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzeError::UnknownMethod(method) => write!(f, "unknown method '{method}'"),
            AnalyzeError::EmptyInput => write!(f, "input contains no epochs"),
            AnalyzeError::MissingColumn(column) => {
                write!(f, "required column '{column}' is missing")
            }
            AnalyzeError::Table(e) => write!(f, "feature assembly failed: {e}"),
            AnalyzeError::Analyzer { channel, source } => {
                write!(f, "{channel} analyzer failed: {source}")
            }
            AnalyzeError::Rsa { source } => write!(f, "RSA aggregator failed: {source}"),
        }
    }
}

impl std::error::Error for AnalyzeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnalyzeError::Table(e) => Some(e),
            AnalyzeError::Analyzer { source, .. } | AnalyzeError::Rsa { source } => {
                Some(source.as_ref())
            }
            _ => None,
        }
    }
}

impl From<TableError> for AnalyzeError {
    fn from(e: TableError) -> Self {
        AnalyzeError::Table(e)
    }
}

/// Registry of per-channel analyzers and the RSA aggregator.
///
/// Channels whose columns are present but which have no registered analyzer
/// are skipped; delegation, like window slicing, is opportunistic.
#[derive(Default)]
pub struct BioAnalyzer {
    channels: BTreeMap<Channel, Box<dyn ChannelAnalyzer>>,
    rsa: Option<Box<dyn RsaAggregator>>,
    settings: AnalyzeSettings,
}

impl BioAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the analyzer for one channel.
    pub fn with_channel(
        mut self,
        channel: Channel,
        analyzer: impl ChannelAnalyzer + 'static,
    ) -> Self {
        self.channels.insert(channel, Box::new(analyzer));
        self
    }

    /// Register the interval-related RSA aggregator.
    pub fn with_rsa(mut self, aggregator: impl RsaAggregator + 'static) -> Self {
        self.rsa = Some(Box::new(aggregator));
        self
    }

    /// Override the default thresholds.
    pub fn with_settings(mut self, settings: AnalyzeSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run the full analysis and assemble one feature table.
    ///
    /// Feature tables are concatenated column-wise in channel detection order
    /// (ECG, RSP, EDA, EMG, PPG, EOG) followed by RSA, then duplicated
    /// identifier columns (`Label`, `Condition`, or any repeated name) are
    /// dropped keep-first. Analyzer and aggregator failures propagate to the
    /// caller unchanged; this core does not retry or return partial results.
    pub fn analyze(
        &self,
        data: &SignalDataset,
        request: &AnalyzeRequest,
    ) -> Result<FeatureTable, AnalyzeError> {
        let representative = data.representative().ok_or(AnalyzeError::EmptyInput)?;
        let presence = ChannelPresence::detect(representative);
        let mode = resolve_mode(request.method, data, request.sampling_rate, &self.settings);

        let mut features = FeatureTable::new();

        for channel in Channel::ALL {
            if !presence.contains(channel) {
                continue;
            }
            let Some(analyzer) = self.channels.get(&channel) else {
                tracing::debug!(%channel, "columns present but no analyzer registered");
                continue;
            };

            // Each channel works on its own view of the input: slicing
            // produces an owned copy, so one channel's window can never
            // narrow another channel's data.
            let sliced = slice_for_channel(data, channel, &request.window_lengths);
            let view = sliced.as_ref().unwrap_or(data);

            let subepoch_rate = matches!(channel, Channel::Ecg | Channel::Rsp)
                .then_some(&request.subepoch_rate);
            let channel_request = ChannelRequest {
                sampling_rate: request.sampling_rate,
                mode,
                subepoch_rate,
            };

            tracing::debug!(%channel, "delegating to channel analyzer");
            let analyzed = analyzer
                .analyze(view, &channel_request)
                .map_err(|source| AnalyzeError::Analyzer { channel, source })?;
            features.concat(analyzed)?;
        }

        if presence.rsa_column_count() >= self.settings.rsa_column_threshold {
            if let Some(rsa) = rsa_features(
                data,
                mode,
                request.sampling_rate,
                self.rsa.as_deref(),
            )? {
                features.concat(rsa)?;
            }
        } else {
            tracing::debug!(
                count = presence.rsa_column_count(),
                threshold = self.settings.rsa_column_threshold,
                "RSA guard not met"
            );
        }

        features.dedup_columns();
        Ok(features)
    }
}

impl fmt::Debug for BioAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BioAnalyzer")
            .field("channels", &self.channels.keys().collect::<Vec<_>>())
            .field("rsa", &self.rsa.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SignalTable;

    #[test]
    fn test_method_parsing() {
        assert_eq!("AUTO".parse::<Method>().unwrap(), Method::Auto);
        assert_eq!("event".parse::<Method>().unwrap(), Method::EventRelated);
        assert_eq!("Epoch".parse::<Method>().unwrap(), Method::EventRelated);
        assert_eq!(
            "event-related".parse::<Method>().unwrap(),
            Method::EventRelated
        );
        assert_eq!(
            "resting-state".parse::<Method>().unwrap(),
            Method::IntervalRelated
        );
        assert_eq!(
            "Interval-Related".parse::<Method>().unwrap(),
            Method::IntervalRelated
        );
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let err = "frequency-related".parse::<Method>().unwrap_err();
        assert!(matches!(err, AnalyzeError::UnknownMethod(_)));
    }

    #[test]
    fn test_empty_epoch_input_is_an_error() {
        let analyzer = BioAnalyzer::new();
        let data = SignalDataset::Epochs(Vec::new());
        let err = analyzer
            .analyze(&data, &AnalyzeRequest::default())
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::EmptyInput));
    }

    #[test]
    fn test_no_channels_and_no_rsa_yields_empty_table() {
        let mut table = SignalTable::new(vec![0.0, 1.0]);
        table.insert_floats("Photosensor", vec![0.0, 1.0]).unwrap();
        let analyzer = BioAnalyzer::new();
        let features = analyzer
            .analyze(&SignalDataset::Single(table), &AnalyzeRequest::default())
            .unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn test_default_request() {
        let request = AnalyzeRequest::default();
        assert_eq!(request.sampling_rate, 1000.0);
        assert_eq!(request.method, Method::Auto);
        assert_eq!(request.window_lengths, WindowSpec::Constant);
    }
}
