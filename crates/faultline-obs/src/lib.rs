//! Per-tick feature extraction and dataset emission.
//!
//! The recorder snapshots every node's 9-wide integer feature vector at
//! every tick through the [`NodeObservables`](faultline_core::NodeObservables)
//! trait, keeping the whole run in memory. Emission to CSV happens once,
//! after a successful run — a failed run leaves no partial output files.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod emit;
pub mod feature;
pub mod recorder;

pub use emit::{write_edge_index, write_fault_label};
pub use feature::{FeatureVector, FEATURE_WIDTH};
pub use recorder::FeatureRecorder;
