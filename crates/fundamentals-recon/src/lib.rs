#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fundamentals/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Contiguous quarter calendar alignment.
pub mod calendar;
/// Duration classification.
pub mod classify;
/// Year-to-date to quarterly delta conversion.
pub mod delta;
/// Absorbed anomalies.
pub mod diagnostics;
/// The full pipeline.
pub mod engine;
/// Fourth-quarter derivation.
pub mod implicit;
/// Restatement handling.
pub mod revision;
/// Sign convention normalization.
pub mod sign;
/// Candidate tag stitching.
pub mod stitch;

pub use calendar::align;
pub use classify::{Tracks, classify, split_tracks};
pub use delta::{to_deltas, to_series};
pub use diagnostics::{Anomaly, Diagnostics, MissingInput};
pub use engine::{Engine, Reconciliation};
pub use implicit::derive_fourth_quarters;
pub use revision::resolve;
pub use sign::{median, normalize_column, normalize_series};
pub use stitch::stitch;
