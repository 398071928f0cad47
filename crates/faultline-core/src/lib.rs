//! Core types for the Faultline pub/sub fault simulator.
//!
//! This is the leaf crate with zero internal Faultline dependencies. It
//! defines the fundamental vocabulary used throughout the workspace:
//! identifiers, inclusive integer ranges, the declarative callback model,
//! fault state, and the observation trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod callback;
pub mod fault;
pub mod id;
pub mod observe;
pub mod range;

// Re-export core types at crate root for convenience.
pub use callback::{Callback, FaultDirective, PublishFaultKind, PublishSpec};
pub use fault::{FaultAction, InjectedFault, PublishFaultState};
pub use id::{NodeIdx, Tick, TopicId, Value};
pub use observe::NodeObservables;
pub use range::{DelayRange, ValueRange};
