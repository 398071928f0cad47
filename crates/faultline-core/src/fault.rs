//! Fault state and the externally injected fault.

use std::fmt;

use crate::callback::PublishFaultKind;
use crate::id::{NodeIdx, Tick, TopicId, Value};

/// Currently active publish-side fault on one node/topic.
///
/// Both variants carry a remaining-publication counter that is
/// decremented each time the fault touches a publication; the fault is
/// removed once the counter reaches zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishFaultState {
    /// The next `remaining` publications are suppressed.
    Drop {
        /// Publications left to suppress.
        remaining: u32,
    },
    /// The next `remaining` publications carry `value` instead of the
    /// sampled one.
    Override {
        /// The substituted value.
        value: Value,
        /// Publications left to affect.
        remaining: u32,
    },
}

impl PublishFaultState {
    /// Build the initial state for a directive kind.
    pub fn from_kind(kind: PublishFaultKind) -> Self {
        match kind {
            PublishFaultKind::Drop { count } => Self::Drop { remaining: count },
            PublishFaultKind::Override { value, count } => Self::Override {
                value,
                remaining: count,
            },
        }
    }

    /// Consume one publication from the fault's budget.
    ///
    /// Returns `None` if the publication is suppressed, or `Some(v)`
    /// with the value that replaces the sampled one. Decrements the
    /// remaining counter either way; check
    /// [`is_expired`](Self::is_expired) afterwards and remove the state.
    pub fn consume(&mut self) -> Option<Value> {
        match self {
            Self::Drop { remaining } => {
                *remaining = remaining.saturating_sub(1);
                None
            }
            Self::Override { value, remaining } => {
                *remaining = remaining.saturating_sub(1);
                Some(*value)
            }
        }
    }

    /// Whether the publication budget is exhausted.
    pub fn is_expired(&self) -> bool {
        match self {
            Self::Drop { remaining } => *remaining == 0,
            Self::Override { remaining, .. } => *remaining == 0,
        }
    }
}

impl fmt::Display for PublishFaultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drop { remaining } => write!(f, "drop({remaining})"),
            Self::Override { value, remaining } => write!(f, "override({value}, {remaining})"),
        }
    }
}

/// The side an injected fault attaches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultAction {
    /// Install a publish-side fault on the node's outgoing topic.
    Publish {
        /// The affected topic.
        topic: TopicId,
        /// Drop or override, with a publication budget.
        kind: PublishFaultKind,
    },
    /// Add `delay` ticks to every delivery of `topic` scheduled for the
    /// node. Persists for the rest of the run.
    Receive {
        /// The affected topic.
        topic: TopicId,
        /// Extra delay in ticks.
        delay: u64,
    },
}

/// The externally configured fault, one per simulation run.
///
/// Applied by the executor at the start of `inject_at`, before that
/// tick's receipts and loop firings. Recorded in the fault label output
/// as `node_index,inject_at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InjectedFault {
    /// Declaration index of the targeted node.
    pub node: NodeIdx,
    /// The tick at which the fault is installed.
    pub inject_at: Tick,
    /// What the fault does.
    pub action: FaultAction,
}
