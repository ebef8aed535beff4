//! Physio Features - multi-channel physiological feature aggregation.
//!
//! This library takes an already-processed multi-channel physiological
//! dataset (cardiac, respiratory, electrodermal, muscular,
//! photoplethysmographic, ocular) and aggregates the features extracted per
//! channel into a single tabular feature set. The per-signal analyses live
//! behind collaborator traits; this crate owns the dispatch and
//! reconciliation logic: detecting which channels are present, slicing
//! per-channel windows, selecting event- vs interval-related analysis, and
//! re-aligning the cross-channel respiratory sinus arrhythmia metric into the
//! assembled table.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        BioAnalyzer                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌──────────────────┐        │
//! │  │  Channel  │──▶│  Window   │──▶│ Channel analyzer │        │
//! │  │ detection │   │  slicing  │   │   delegation     │        │
//! │  └───────────┘   └───────────┘   └──────────────────┘        │
//! │        │                                  │                  │
//! │        ▼                                  ▼                  │
//! │  ┌───────────┐   ┌───────────┐   ┌──────────────────┐        │
//! │  │ Duration  │──▶│    RSA    │──▶│  Feature table   │        │
//! │  │ estimate  │   │ reconcile │   │    assembly      │        │
//! │  └───────────┘   └───────────┘   └──────────────────┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation is a pure, in-memory transformation: no I/O, no
//! background tasks, no state shared across calls.
//!
//! # Example
//!
//! ```
//! use physio_features::{AnalyzeRequest, BioAnalyzer, Channel, SignalDataset, SignalTable};
//! # use physio_features::{BoxError, ChannelAnalyzer, ChannelRequest, FeatureTable};
//! # struct EcgAnalyzer;
//! # impl ChannelAnalyzer for EcgAnalyzer {
//! #     fn analyze(
//! #         &self,
//! #         _data: &SignalDataset,
//! #         _request: &ChannelRequest<'_>,
//! #     ) -> Result<FeatureTable, BoxError> {
//! #         Ok(FeatureTable::new())
//! #     }
//! # }
//! let analyzer = BioAnalyzer::new().with_channel(Channel::Ecg, EcgAnalyzer);
//!
//! let data = SignalDataset::Single(SignalTable::new(Vec::new()));
//! let features = analyzer
//!     .analyze(&data, &AnalyzeRequest::default())
//!     .expect("analysis failed");
//! println!("{features}");
//! ```

pub mod analyze;
pub mod analyzers;
pub mod core;
pub mod dataset;
pub mod settings;
pub mod table;

// Re-export key types at crate root for convenience
pub use analyze::{AnalyzeError, AnalyzeRequest, BioAnalyzer, Method};
pub use analyzers::{
    AnalysisMode, BoxError, ChannelAnalyzer, ChannelRequest, RsaAggregator, SubepochSpec,
};
pub use crate::core::{mean_duration, Channel, ChannelPresence, WindowSpec, RSA_GATES, RSA_P2T};
pub use dataset::{Epoch, SignalDataset};
pub use settings::AnalyzeSettings;
pub use table::{FeatureTable, SignalTable, TableError, Value};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
