//! Deterministic tick executor and node runtime for Faultline.
//!
//! [`Executor`] wires the compiled graph, the message bus, per-node
//! runtime state, and the seeded RNG into a single-threaded tick loop.
//! One [`step()`](Executor::step) executes one tick: fault injection,
//! receipt delivery, loop firings, watchdog evaluation. Feature
//! snapshots are taken by the caller (or [`run()`](Executor::run))
//! after each step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod metrics;
pub mod node;
pub mod tick;

pub use metrics::RunStats;
pub use node::{Classification, NodeState};
pub use tick::Executor;
