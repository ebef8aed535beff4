//! Per-channel window slicing.
//!
//! Different channels can be analyzed over different sub-windows of each
//! epoch: a cardiac response may be scored over 0.5–1.5 s after onset while
//! electrodermal activity needs 0.5–3.5 s. Slicing restricts each epoch's
//! rows to the requested window before the channel's analyzer runs; channels
//! without an entry in the specification keep their full data.

use crate::core::channels::Channel;
use crate::dataset::{Epoch, SignalDataset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-channel epoch windows, in seconds relative to event onset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum WindowSpec {
    /// Analyze every channel over its full epoch.
    #[default]
    Constant,
    /// Channel tag → (start, end) window. Channels absent from the map are
    /// analyzed unsliced; entries for channels absent from the data are
    /// ignored.
    PerChannel(BTreeMap<Channel, (f64, f64)>),
}

impl WindowSpec {
    /// The window configured for a channel, if any.
    pub fn window_for(&self, channel: Channel) -> Option<(f64, f64)> {
        match self {
            WindowSpec::Constant => None,
            WindowSpec::PerChannel(map) => map.get(&channel).copied(),
        }
    }
}

/// Produce a sliced copy of the dataset for one channel, or `None` when no
/// slicing applies (constant spec, channel not named in the spec, or a single
/// continuous recording, which has no epoch windows to slice).
///
/// Bounds are strict on both ends: a row survives only when
/// `start < t < end`. An epoch whose slice comes out empty stays in the
/// output as an empty table; whether that is workable is the downstream
/// analyzer's call.
pub fn slice_for_channel(
    data: &SignalDataset,
    channel: Channel,
    spec: &WindowSpec,
) -> Option<SignalDataset> {
    let (start, end) = spec.window_for(channel)?;
    let SignalDataset::Epochs(epochs) = data else {
        tracing::debug!(%channel, "window spec ignored for continuous input");
        return None;
    };
    tracing::debug!(%channel, start, end, "slicing epochs");
    let sliced = epochs
        .iter()
        .map(|epoch| Epoch::new(epoch.label.clone(), epoch.table.slice_between(start, end)))
        .collect();
    Some(SignalDataset::Epochs(sliced))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SignalTable;

    fn epoch(label: &str, index: Vec<f64>) -> Epoch {
        let values = index.clone();
        let mut table = SignalTable::new(index);
        table.insert_floats("ECG_Rate", values).unwrap();
        Epoch::new(label, table)
    }

    #[test]
    fn test_slice_is_strictly_exclusive() {
        let data = SignalDataset::Epochs(vec![epoch("1", vec![0.0, 0.5, 1.0, 1.5, 2.0])]);
        let mut map = BTreeMap::new();
        map.insert(Channel::Ecg, (0.5, 1.5));
        let spec = WindowSpec::PerChannel(map);

        let sliced = slice_for_channel(&data, Channel::Ecg, &spec).unwrap();
        let SignalDataset::Epochs(epochs) = sliced else {
            panic!("expected epochs");
        };
        assert_eq!(epochs[0].table.index(), &[1.0]);
    }

    #[test]
    fn test_channel_without_entry_is_untouched() {
        let data = SignalDataset::Epochs(vec![epoch("1", vec![0.0, 1.0])]);
        let mut map = BTreeMap::new();
        map.insert(Channel::Eda, (0.5, 3.5));
        let spec = WindowSpec::PerChannel(map);

        assert!(slice_for_channel(&data, Channel::Ecg, &spec).is_none());
    }

    #[test]
    fn test_constant_spec_never_slices() {
        let data = SignalDataset::Epochs(vec![epoch("1", vec![0.0, 1.0])]);
        assert!(slice_for_channel(&data, Channel::Ecg, &WindowSpec::Constant).is_none());
    }

    #[test]
    fn test_empty_slice_propagates() {
        let data = SignalDataset::Epochs(vec![epoch("1", vec![0.0, 1.0, 2.0])]);
        let mut map = BTreeMap::new();
        map.insert(Channel::Ecg, (5.0, 6.0));
        let spec = WindowSpec::PerChannel(map);

        let sliced = slice_for_channel(&data, Channel::Ecg, &spec).unwrap();
        let SignalDataset::Epochs(epochs) = sliced else {
            panic!("expected epochs");
        };
        assert_eq!(epochs.len(), 1);
        assert!(epochs[0].table.is_empty());
    }

    #[test]
    fn test_single_recording_is_never_sliced() {
        let data = SignalDataset::Single(SignalTable::new(vec![0.0, 1.0]));
        let mut map = BTreeMap::new();
        map.insert(Channel::Ecg, (0.5, 1.5));
        let spec = WindowSpec::PerChannel(map);

        assert!(slice_for_channel(&data, Channel::Ecg, &spec).is_none());
    }
}
