//! Scheduled message delivery queue for the Faultline simulator.
//!
//! [`MessageBus`] holds every publication between its publish tick and
//! its delivery tick. Deliveries are keyed by delivery tick; within a
//! tick the bus preserves insertion order via a monotonic sequence
//! number, which is the ordering guarantee the executor relies on.
//! A later publication with a smaller sampled delay may overtake an
//! earlier one — the bus deliberately preserves insertion order per
//! delivery tick, not publish order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use smallvec::SmallVec;

use faultline_core::{NodeIdx, Tick, TopicId, Value};

/// One pending delivery to a single subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// The tick the delivery is due.
    pub deliver_at: Tick,
    /// The receiving node.
    pub subscriber: NodeIdx,
    /// The topic the message was published on.
    pub topic: TopicId,
    /// The message value.
    pub value: Value,
    /// Monotonic insertion sequence number, set by the bus. Ties on
    /// `deliver_at` are broken by this.
    pub seq: u64,
}

/// Time-ordered multiset of pending deliveries.
///
/// Owned by the executor; mutated only by [`schedule`](Self::schedule)
/// and [`drain_due`](Self::drain_due).
#[derive(Debug, Default)]
pub struct MessageBus {
    pending: BTreeMap<u64, SmallVec<[Delivery; 4]>>,
    next_seq: u64,
    scheduled_total: u64,
}

impl MessageBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a delivery for `subscriber` at `deliver_at`.
    ///
    /// The bus assigns the insertion sequence number; callers schedule
    /// in publish order and the bus preserves that order within a tick.
    pub fn schedule(&mut self, deliver_at: Tick, subscriber: NodeIdx, topic: TopicId, value: Value) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.scheduled_total += 1;
        self.pending.entry(deliver_at.0).or_default().push(Delivery {
            deliver_at,
            subscriber,
            topic,
            value,
            seq,
        });
    }

    /// Remove and return every delivery with `deliver_at <= now`.
    ///
    /// Results are ordered by delivery tick, then by insertion sequence.
    /// Returns an empty vector when nothing is due.
    pub fn drain_due(&mut self, now: Tick) -> Vec<Delivery> {
        match self.pending.first_key_value() {
            Some((&t, _)) if t <= now.0 => {}
            _ => return Vec::new(),
        }
        let later = self.pending.split_off(&(now.0 + 1));
        std::mem::replace(&mut self.pending, later)
            .into_values()
            .flatten()
            .collect()
    }

    /// Number of deliveries currently pending.
    pub fn len(&self) -> usize {
        self.pending.values().map(SmallVec::len).sum()
    }

    /// Whether no deliveries are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total deliveries scheduled over the bus's lifetime.
    pub fn scheduled_total(&self) -> u64 {
        self.scheduled_total
    }
}
