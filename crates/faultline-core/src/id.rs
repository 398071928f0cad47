//! Strongly-typed identifiers for simulated time, nodes, and topics.

use std::fmt;

/// The integer value carried by messages and recorded in feature vectors.
pub type Value = i64;

/// Monotonically increasing unit of simulated time.
///
/// Starts at 0 and advances by one per executor step. There is no
/// wall-clock time anywhere in the simulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tick(pub u64);

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Tick {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Declaration-order index of a node in the compiled graph.
///
/// Node indices are assigned by position in the merged configuration and
/// are the stable indices used by the edge-index and fault-label outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub u32);

impl NodeIdx {
    /// The index as a `usize`, for slice access.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeIdx {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Interned identifier for a topic name.
///
/// Topics are interned by the graph compiler in first-mention order.
/// Every topic has exactly one publisher; this is enforced at load time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicId(pub u32);

impl TopicId {
    /// The identifier as a `usize`, for slice access.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TopicId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
