//! Test utilities for Faultline development.
//!
//! Compact constructors for raw schema nodes plus a compile-or-panic
//! [`graph`] helper, so scenario tests read as graph declarations
//! rather than struct-literal noise.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use faultline_graph::{
    Graph, RawAffectPublish, RawCallback, RawFaultDirective, RawLoop, RawNode, RawPublish,
    RawSubscribe,
};

/// Compile raw nodes into a graph, panicking on config errors.
pub fn graph(nodes: Vec<RawNode>) -> Graph {
    Graph::compile(nodes).expect("test graph must compile")
}

/// A publish spec with sampling ranges.
pub fn publish(topic: &str, value_range: [i64; 2], delay_range: [u64; 2]) -> RawPublish {
    RawPublish {
        topic: topic.to_string(),
        value_range,
        delay_range,
    }
}

/// A publish spec with a fixed value and fixed delay.
pub fn publish_const(topic: &str, value: i64, delay: u64) -> RawPublish {
    publish(topic, [value, value], [delay, delay])
}

/// A node with only a periodic loop.
pub fn loop_node(name: &str, period: u64, specs: Vec<RawPublish>) -> RawNode {
    RawNode {
        name: name.to_string(),
        loop_: Some(RawLoop {
            period,
            publish: specs,
        }),
        subscribe: vec![],
    }
}

/// A node with only subscriptions.
pub fn sink_node(name: &str, subscribe: Vec<RawSubscribe>) -> RawNode {
    RawNode {
        name: name.to_string(),
        loop_: None,
        subscribe,
    }
}

/// A subscription with empty callback slots; set the slots directly on
/// the returned value.
pub fn subscribe(topic: &str, valid_range: [i64; 2], watchdog: u64) -> RawSubscribe {
    RawSubscribe {
        topic: topic.to_string(),
        valid_range,
        watchdog,
        nominal_callback: None,
        invalid_input_callback: None,
        lost_input_callback: None,
    }
}

/// A callback that publishes the given specs.
pub fn publish_callback(specs: Vec<RawPublish>) -> RawCallback {
    RawCallback::Publish(specs)
}

/// A callback that installs a drop fault on the node's own topic.
pub fn drop_fault_callback(topic: &str, count: u32) -> RawCallback {
    RawCallback::Fault(RawFaultDirective {
        affect_publish: RawAffectPublish {
            topic: topic.to_string(),
            drop: Some(count),
            value: None,
            count: None,
        },
    })
}

/// A callback that installs an override fault on the node's own topic.
pub fn override_fault_callback(topic: &str, value: i64, count: u32) -> RawCallback {
    RawCallback::Fault(RawFaultDirective {
        affect_publish: RawAffectPublish {
            topic: topic.to_string(),
            drop: None,
            value: Some(value),
            count: Some(count),
        },
    })
}
