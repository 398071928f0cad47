//! Faultline: a deterministic, config-driven simulator of a
//! publish/subscribe module graph with controlled fault injection.
//!
//! This is the top-level facade crate re-exporting the public API from
//! the Faultline sub-crates. For most users, adding `faultline` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use faultline::prelude::*;
//!
//! // Two nodes: a sensor publishing every 10 ticks and a consumer
//! // with a 20-tick watchdog.
//! let yaml = r#"
//! nodes:
//!   - name: sensor
//!     loop:
//!       period: 10
//!       publish:
//!         - { topic: reading, value_range: [5, 5], delay_range: [0, 0] }
//!   - name: consumer
//!     subscribe:
//!       - { topic: reading, valid_range: [0, 10], watchdog: 20 }
//! "#;
//! let file: faultline::graph::RawGraphFile = serde_yaml::from_str(yaml).unwrap();
//! let graph = Graph::compile(file.nodes).unwrap();
//!
//! let mut executor = Executor::new(graph, None, 42);
//! let mut recorder = FeatureRecorder::new();
//! executor.run(Tick(20), &mut recorder);
//!
//! assert_eq!(recorder.rows().len(), 21);
//! assert_eq!(executor.stats().deliveries, 3);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `faultline-core` | IDs, ranges, callbacks, fault state, observation trait |
//! | [`graph`] | `faultline-graph` | Config schema, loading, compiled graph model |
//! | [`bus`] | `faultline-bus` | Scheduled delivery queue |
//! | [`obs`] | `faultline-obs` | Feature extraction and dataset emitters |
//! | [`engine`] | `faultline-engine` | Node runtime and deterministic executor |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, ranges, and the observation trait (`faultline-core`).
pub use faultline_core as types;

/// Config schema, loading, and the compiled graph (`faultline-graph`).
pub use faultline_graph as graph;

/// The scheduled delivery queue (`faultline-bus`).
pub use faultline_bus as bus;

/// Feature extraction and dataset emitters (`faultline-obs`).
pub use faultline_obs as obs;

/// Node runtime and the deterministic executor (`faultline-engine`).
pub use faultline_engine as engine;

/// The types most programs need, re-exported flat.
pub mod prelude {
    pub use faultline_core::{
        Callback, InjectedFault, NodeIdx, NodeObservables, Tick, TopicId, Value,
    };
    pub use faultline_engine::{Executor, RunStats};
    pub use faultline_graph::{load_fault, load_graph, Graph, GraphError};
    pub use faultline_obs::{FeatureRecorder, FeatureVector, FEATURE_WIDTH};
}
