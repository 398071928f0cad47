//! The fixed-width node feature vector.

use faultline_core::{NodeObservables, Tick, Value};

/// Width of the per-node feature vector. Column semantics are stable
/// across a run; downstream datasets index into them positionally.
pub const FEATURE_WIDTH: usize = 9;

/// One node's observable state at one tick.
///
/// Column layout:
///
/// | idx | meaning |
/// |-----|---------|
/// | 0 | kind flag: 0 = publisher-only loop node, 1 = subscriber or hybrid |
/// | 1 | number of subscriptions |
/// | 2 | last value emitted on the primary output topic (0 if never) |
/// | 3 | tick of this snapshot (authoritative row timestamp) |
/// | 4 | most recently received value across subscriptions (0 if none) |
/// | 5 | subscriptions currently strictly past their watchdog |
/// | 6 | publications emitted so far |
/// | 7 | invalid-input events so far |
/// | 8 | lost-input events so far |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureVector(pub [Value; FEATURE_WIDTH]);

impl FeatureVector {
    /// Extract the feature vector for one node at `tick`.
    pub fn extract(tick: Tick, node: &dyn NodeObservables) -> Self {
        Self([
            i64::from(node.is_subscriber()),
            node.subscription_count() as Value,
            node.last_published().unwrap_or(0),
            tick.0 as Value,
            node.last_received().unwrap_or(0),
            node.past_watchdog_count() as Value,
            node.publications() as Value,
            node.invalid_events() as Value,
            node.lost_events() as Value,
        ])
    }

    /// The columns as a slice.
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}
