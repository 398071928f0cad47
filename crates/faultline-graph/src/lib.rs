//! Graph and fault configuration for the Faultline simulator.
//!
//! Configuration flows through two layers: a raw serde [`schema`] that
//! maps the YAML files one-to-one, and a compiled [`model`] with interned
//! topics, declaration-order node indices, and the derived edge set. All
//! structural validation happens during compilation, before the executor
//! starts; the engine can assume a well-formed graph.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod load;
pub mod model;
pub mod schema;

pub use error::GraphError;
pub use load::{load_fault, load_graph};
pub use model::{Graph, LoopSpec, NodeConfig, Subscription};
pub use schema::{
    RawAffectPublish, RawAffectReceive, RawCallback, RawFaultConfig, RawFaultDirective,
    RawGraphFile, RawLoop, RawNode, RawPublish, RawSubscribe,
};
