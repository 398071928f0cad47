//! The declarative callback model: publish lists and fault directives.
//!
//! Callbacks are data, not code. A subscription slot (nominal, invalid,
//! lost) either publishes a list of specs or installs a publish-side
//! fault on its own node. There is no dynamic dispatch.

use crate::id::{TopicId, Value};
use crate::range::{DelayRange, ValueRange};

/// One outgoing publication: topic, sampled value, sampled delay.
///
/// The value and delay are drawn uniformly from their ranges by the
/// executor's seeded RNG, value first, then delay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishSpec {
    /// The topic to publish on.
    pub topic: TopicId,
    /// Range the value is sampled from.
    pub value_range: ValueRange,
    /// Range the delivery delay is sampled from.
    pub delay_range: DelayRange,
}

/// What a callback slot does when dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Callback {
    /// Publish each spec in declared order.
    Publish(Vec<PublishSpec>),
    /// Install a publish-side fault on the dispatching node.
    Fault(FaultDirective),
}

/// A callback-produced fault directive.
///
/// Always publish-side and always targeting the node that ran the
/// callback. If a fault is already active on the topic, the new one
/// replaces it (last-writer-wins).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultDirective {
    /// The topic whose outgoing publications are affected.
    pub topic: TopicId,
    /// Drop or override, with a discrete publication budget.
    pub kind: PublishFaultKind,
}

/// The two publish-side fault shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishFaultKind {
    /// Suppress the next `count` publications entirely.
    Drop {
        /// Number of publications to suppress.
        count: u32,
    },
    /// Substitute `value` for the next `count` publications.
    Override {
        /// The value substituted for the sampled one.
        value: Value,
        /// Number of publications affected.
        count: u32,
    },
}

impl PublishFaultKind {
    /// The discrete publication budget of this fault.
    pub fn count(&self) -> u32 {
        match self {
            Self::Drop { count } => *count,
            Self::Override { count, .. } => *count,
        }
    }
}
