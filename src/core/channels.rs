//! Channel detection.
//!
//! Which channel-specific analyses apply is decided by a single pass over the
//! input's column names: a channel is present when its tag appears as a
//! substring of any column name ("ECG_Rate_Baseline" marks ECG present). The
//! supported channels form a closed set.

use crate::table::SignalTable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The physiological channels this crate can dispatch on, in detection order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    /// Electrocardiography (cardiac)
    Ecg,
    /// Respiration
    Rsp,
    /// Electrodermal activity
    Eda,
    /// Electromyography (muscular)
    Emg,
    /// Photoplethysmography
    Ppg,
    /// Electrooculography (ocular)
    Eog,
}

impl Channel {
    /// All supported channels, in detection (and assembly) order.
    pub const ALL: [Channel; 6] = [
        Channel::Ecg,
        Channel::Rsp,
        Channel::Eda,
        Channel::Emg,
        Channel::Ppg,
        Channel::Eog,
    ];

    /// The column-name tag identifying this channel.
    pub fn tag(&self) -> &'static str {
        match self {
            Channel::Ecg => "ECG",
            Channel::Rsp => "RSP",
            Channel::Eda => "EDA",
            Channel::Emg => "EMG",
            Channel::Ppg => "PPG",
            Channel::Eog => "EOG",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which channels a dataset carries, plus the column counts gating the
/// respiratory sinus arrhythmia reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPresence {
    channels: Vec<Channel>,
    /// Count of columns whose name contains `ECG_Rate`.
    pub ecg_rate_columns: usize,
    /// Count of columns whose name contains `RSP_Phase`.
    pub rsp_phase_columns: usize,
}

impl ChannelPresence {
    /// Detect channels from a representative table's column names.
    pub fn detect(table: &SignalTable) -> Self {
        let channels = Channel::ALL
            .into_iter()
            .filter(|ch| table.column_names().any(|name| name.contains(ch.tag())))
            .collect::<Vec<_>>();
        let ecg_rate_columns = table
            .column_names()
            .filter(|name| name.contains("ECG_Rate"))
            .count();
        let rsp_phase_columns = table
            .column_names()
            .filter(|name| name.contains("RSP_Phase"))
            .count();
        tracing::debug!(
            ?channels,
            ecg_rate_columns,
            rsp_phase_columns,
            "detected channels"
        );
        Self {
            channels,
            ecg_rate_columns,
            rsp_phase_columns,
        }
    }

    /// Whether the given channel was detected.
    pub fn contains(&self, channel: Channel) -> bool {
        self.channels.contains(&channel)
    }

    /// Detected channels, in detection order.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Combined count of cardiac-rate and respiratory-phase columns, compared
    /// against the configured threshold to gate RSA extraction.
    pub fn rsa_column_count(&self) -> usize {
        self.ecg_rate_columns + self.rsp_phase_columns
    }
}
