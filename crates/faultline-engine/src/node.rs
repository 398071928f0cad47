//! Per-node runtime state: watchdogs, last values, loop schedule, and
//! the fault overlay.
//!
//! `NodeState` is pure state plus small transition methods; callback
//! dispatch and publish sampling live in the executor, which owns the
//! RNG and the bus. The overlay (publish-side fault state and
//! receive-delay overrides) is part of node state because both are
//! per-node, per-topic mutations installed either by injection or by
//! the node's own callbacks.

use indexmap::IndexMap;
use smallvec::SmallVec;

use faultline_core::{
    NodeObservables, PublishFaultKind, PublishFaultState, Tick, TopicId, Value,
};
use faultline_graph::NodeConfig;

/// How a received value was classified against the valid range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// In range; dispatches the nominal callback.
    Nominal,
    /// Out of range; dispatches the invalid-input callback.
    Invalid,
}

/// Runtime state of one subscription.
#[derive(Clone, Debug)]
struct SubState {
    valid_lo: Value,
    valid_hi: Value,
    watchdog: u64,
    last_value: Option<Value>,
    ticks_since: u64,
    armed: bool,
}

/// Runtime state of one node.
#[derive(Clone, Debug)]
pub struct NodeState {
    subs: Vec<SubState>,
    next_loop_tick: Option<Tick>,
    loop_period: u64,
    publish_faults: IndexMap<TopicId, PublishFaultState>,
    receive_delay: IndexMap<TopicId, u64>,
    primary_topic: Option<TopicId>,
    last_published: Option<Value>,
    last_received: Option<Value>,
    publications: u64,
    invalid_events: u64,
    lost_events: u64,
}

impl NodeState {
    /// Fresh state for a node at tick 0. A node with a loop fires it
    /// first at tick 0.
    pub fn new(cfg: &NodeConfig) -> Self {
        let subs = cfg
            .subscriptions
            .iter()
            .map(|s| SubState {
                valid_lo: s.valid_range.lo,
                valid_hi: s.valid_range.hi,
                watchdog: s.watchdog,
                last_value: None,
                ticks_since: 0,
                armed: false,
            })
            .collect();
        Self {
            subs,
            next_loop_tick: cfg.loop_spec.as_ref().map(|_| Tick(0)),
            loop_period: cfg.loop_spec.as_ref().map_or(0, |l| l.period),
            publish_faults: IndexMap::new(),
            receive_delay: IndexMap::new(),
            primary_topic: cfg.primary_topic,
            last_published: None,
            last_received: None,
            publications: 0,
            invalid_events: 0,
            lost_events: 0,
        }
    }

    // ── Loop schedule ──────────────────────────────────────────

    /// Whether the node's loop fires at `now`.
    pub fn loop_due(&self, now: Tick) -> bool {
        self.next_loop_tick == Some(now)
    }

    /// Advance the loop schedule by one period after a firing.
    pub fn advance_loop(&mut self) {
        if let Some(next) = self.next_loop_tick {
            self.next_loop_tick = Some(Tick(next.0 + self.loop_period));
        }
    }

    // ── Receipt path ───────────────────────────────────────────

    /// Register a delivery on subscription `sub_idx` and classify it.
    ///
    /// Resets the watchdog counter, arms the watchdog, records the
    /// value, and counts an invalid-input event when out of range.
    pub fn on_receive(&mut self, sub_idx: usize, value: Value) -> Classification {
        let sub = &mut self.subs[sub_idx];
        sub.last_value = Some(value);
        sub.ticks_since = 0;
        sub.armed = true;
        self.last_received = Some(value);
        if sub.valid_lo <= value && value <= sub.valid_hi {
            Classification::Nominal
        } else {
            self.invalid_events += 1;
            Classification::Invalid
        }
    }

    /// Advance every armed watchdog by one tick.
    ///
    /// Returns the subscriptions whose counter first strictly exceeded
    /// the threshold this tick (fire-on-edge: the counter resets on the
    /// next receipt, so each gap fires exactly once). Lost-input events
    /// are counted here even when the subscription has no lost callback.
    pub fn watchdog_step(&mut self) -> SmallVec<[usize; 2]> {
        let mut crossed = SmallVec::new();
        for (i, sub) in self.subs.iter_mut().enumerate() {
            if !sub.armed {
                continue;
            }
            sub.ticks_since += 1;
            if sub.ticks_since == sub.watchdog + 1 {
                self.lost_events += 1;
                crossed.push(i);
            }
        }
        crossed
    }

    // ── Publish path / fault overlay ───────────────────────────

    /// Install a publish-side fault, replacing any active fault on the
    /// topic (last-writer-wins).
    pub fn install_publish_fault(&mut self, topic: TopicId, kind: PublishFaultKind) {
        self.publish_faults
            .insert(topic, PublishFaultState::from_kind(kind));
    }

    /// Install (or overwrite) a receive-delay override for a topic.
    pub fn install_receive_delay(&mut self, topic: TopicId, delay: u64) {
        self.receive_delay.insert(topic, delay);
    }

    /// Extra delivery delay for this node on `topic`.
    pub fn receive_delay_for(&self, topic: TopicId) -> u64 {
        self.receive_delay.get(&topic).copied().unwrap_or(0)
    }

    /// Run one sampled publication through the fault overlay.
    ///
    /// Returns `None` if an active drop fault suppresses it, otherwise
    /// the value to send (possibly overridden). Expired fault state is
    /// removed here.
    pub fn transform_publication(&mut self, topic: TopicId, sampled: Value) -> Option<Value> {
        match self.publish_faults.get_mut(&topic) {
            None => Some(sampled),
            Some(state) => {
                let out = state.consume();
                if state.is_expired() {
                    self.publish_faults.swap_remove(&topic);
                }
                out
            }
        }
    }

    /// Record an emitted publication for the feature counters.
    pub fn note_publication(&mut self, topic: TopicId, value: Value) {
        self.publications += 1;
        if self.primary_topic == Some(topic) {
            self.last_published = Some(value);
        }
    }

    /// The active publish-side fault on `topic`, if any.
    pub fn publish_fault(&self, topic: TopicId) -> Option<&PublishFaultState> {
        self.publish_faults.get(&topic)
    }
}

impl NodeObservables for NodeState {
    fn is_subscriber(&self) -> bool {
        !self.subs.is_empty()
    }

    fn subscription_count(&self) -> usize {
        self.subs.len()
    }

    fn last_published(&self) -> Option<Value> {
        self.last_published
    }

    fn last_received(&self) -> Option<Value> {
        self.last_received
    }

    fn past_watchdog_count(&self) -> usize {
        self.subs
            .iter()
            .filter(|s| s.armed && s.ticks_since > s.watchdog)
            .count()
    }

    fn publications(&self) -> u64 {
        self.publications
    }

    fn invalid_events(&self) -> u64 {
        self.invalid_events
    }

    fn lost_events(&self) -> u64 {
        self.lost_events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_core::{DelayRange, PublishSpec, ValueRange};
    use faultline_graph::{LoopSpec, Subscription};

    fn sub_cfg(topic: u32, lo: Value, hi: Value, watchdog: u64) -> Subscription {
        Subscription {
            topic: TopicId(topic),
            valid_range: ValueRange::new(lo, hi),
            watchdog,
            on_nominal: None,
            on_invalid: None,
            on_lost: None,
        }
    }

    fn subscriber(watchdog: u64) -> NodeState {
        NodeState::new(&NodeConfig {
            name: "n".to_string(),
            loop_spec: None,
            subscriptions: vec![sub_cfg(0, 0, 10, watchdog)],
            primary_topic: None,
        })
    }

    #[test]
    fn receive_resets_arms_and_classifies() {
        let mut n = subscriber(5);
        assert_eq!(n.on_receive(0, 10), Classification::Nominal);
        assert_eq!(n.last_received(), Some(10));
        assert_eq!(n.on_receive(0, 11), Classification::Invalid);
        assert_eq!(n.invalid_events(), 1);
        assert_eq!(n.last_received(), Some(11));
    }

    #[test]
    fn unarmed_watchdog_never_fires() {
        let mut n = subscriber(2);
        for _ in 0..50 {
            assert!(n.watchdog_step().is_empty());
        }
        assert_eq!(n.lost_events(), 0);
    }

    #[test]
    fn watchdog_fires_once_per_gap_edge() {
        let mut n = subscriber(3);
        n.on_receive(0, 5);
        // Counter runs 1, 2, 3 (within watchdog), then 4 fires.
        for _ in 0..3 {
            assert!(n.watchdog_step().is_empty());
        }
        assert_eq!(n.watchdog_step().as_slice(), &[0]);
        // Still lost: no re-fire.
        for _ in 0..10 {
            assert!(n.watchdog_step().is_empty());
        }
        assert_eq!(n.lost_events(), 1);
        // Receipt re-arms the edge; the next gap fires again.
        n.on_receive(0, 5);
        for _ in 0..3 {
            assert!(n.watchdog_step().is_empty());
        }
        assert_eq!(n.watchdog_step().as_slice(), &[0]);
        assert_eq!(n.lost_events(), 2);
    }

    #[test]
    fn past_watchdog_count_tracks_lost_state() {
        let mut n = subscriber(2);
        n.on_receive(0, 5);
        for _ in 0..3 {
            n.watchdog_step();
        }
        assert_eq!(n.past_watchdog_count(), 1);
        n.on_receive(0, 5);
        assert_eq!(n.past_watchdog_count(), 0);
    }

    #[test]
    fn drop_fault_suppresses_then_expires() {
        let mut n = subscriber(5);
        n.install_publish_fault(TopicId(1), PublishFaultKind::Drop { count: 2 });
        assert_eq!(n.transform_publication(TopicId(1), 9), None);
        assert_eq!(n.transform_publication(TopicId(1), 9), None);
        assert!(n.publish_fault(TopicId(1)).is_none());
        assert_eq!(n.transform_publication(TopicId(1), 9), Some(9));
    }

    #[test]
    fn override_fault_substitutes_value() {
        let mut n = subscriber(5);
        n.install_publish_fault(TopicId(1), PublishFaultKind::Override { value: 500, count: 1 });
        assert_eq!(n.transform_publication(TopicId(1), 9), Some(500));
        assert_eq!(n.transform_publication(TopicId(1), 9), Some(9));
    }

    #[test]
    fn newer_fault_replaces_active_one() {
        let mut n = subscriber(5);
        n.install_publish_fault(TopicId(1), PublishFaultKind::Drop { count: 9 });
        n.install_publish_fault(TopicId(1), PublishFaultKind::Override { value: 7, count: 1 });
        assert_eq!(n.transform_publication(TopicId(1), 0), Some(7));
        assert!(n.publish_fault(TopicId(1)).is_none());
    }

    #[test]
    fn primary_topic_publications_update_last_published() {
        let cfg = NodeConfig {
            name: "n".to_string(),
            loop_spec: Some(LoopSpec {
                period: 1,
                publishes: vec![PublishSpec {
                    topic: TopicId(0),
                    value_range: ValueRange::new(0, 0),
                    delay_range: DelayRange::new(0, 0),
                }],
            }),
            subscriptions: vec![],
            primary_topic: Some(TopicId(0)),
        };
        let mut n = NodeState::new(&cfg);
        n.note_publication(TopicId(1), 99);
        assert_eq!(n.last_published(), None);
        n.note_publication(TopicId(0), 42);
        assert_eq!(n.last_published(), Some(42));
        assert_eq!(n.publications(), 2);
    }

    #[test]
    fn loop_schedule_starts_at_zero_and_steps_by_period() {
        let cfg = NodeConfig {
            name: "n".to_string(),
            loop_spec: Some(LoopSpec {
                period: 10,
                publishes: vec![],
            }),
            subscriptions: vec![],
            primary_topic: None,
        };
        let mut n = NodeState::new(&cfg);
        assert!(n.loop_due(Tick(0)));
        n.advance_loop();
        assert!(!n.loop_due(Tick(5)));
        assert!(n.loop_due(Tick(10)));
    }
}
