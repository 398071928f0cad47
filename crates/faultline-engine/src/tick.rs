//! The deterministic tick loop.
//!
//! Phase order within one tick:
//!
//! 1. apply the injected fault, if this is its tick;
//! 2. deliver every receipt due at or before the current tick, in bus
//!    insertion order, cascading through zero-delay republications;
//! 3. fire due loops in node declaration order, re-delivering after
//!    each firing so a zero-delay publication is classified before the
//!    recipient's own loop fires;
//! 4. advance every armed watchdog and dispatch lost-input callbacks;
//! 5. (caller) snapshot the feature vectors.
//!
//! All value and delay sampling flows through one seeded `ChaCha8Rng`
//! in a fixed order — `(tick, firing node, publish spec)` — so a run is
//! a pure function of `(graph, fault, stop, seed)`.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use faultline_bus::{Delivery, MessageBus};
use faultline_core::{
    Callback, FaultAction, InjectedFault, NodeIdx, NodeObservables, PublishSpec, Tick,
};
use faultline_graph::Graph;
use faultline_obs::FeatureRecorder;

use crate::metrics::RunStats;
use crate::node::{Classification, NodeState};

/// Single-threaded deterministic executor.
///
/// Owns all simulation state: the compiled graph, one [`NodeState`] per
/// node, the message bus, the RNG, and the optional injected fault.
pub struct Executor {
    graph: Graph,
    nodes: Vec<NodeState>,
    bus: MessageBus,
    rng: ChaCha8Rng,
    fault: Option<InjectedFault>,
    now: Tick,
    stats: RunStats,
}

impl Executor {
    /// Build an executor at tick 0 from a compiled graph.
    ///
    /// The graph is already validated; construction cannot fail.
    pub fn new(graph: Graph, fault: Option<InjectedFault>, seed: u64) -> Self {
        let nodes = graph.nodes().iter().map(NodeState::new).collect();
        Self {
            graph,
            nodes,
            bus: MessageBus::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            fault,
            now: Tick(0),
            stats: RunStats::default(),
        }
    }

    /// Execute one full tick and return the tick that was executed.
    ///
    /// After `step()` returns, node state reflects the end of that tick
    /// and is ready to snapshot.
    pub fn step(&mut self) -> Tick {
        let now = self.now;

        // 1. Injection precedes all other work this tick.
        if let Some(fault) = self.fault {
            if fault.inject_at == now {
                self.apply_injected(fault);
            }
        }

        // 2. Receipts before loop firings.
        self.pump(now);

        // 3. Loops in declaration order, re-pumping between firings.
        for i in 0..self.nodes.len() {
            if self.nodes[i].loop_due(now) {
                self.fire_loop(NodeIdx(i as u32), now);
                self.pump(now);
            }
        }

        // 4. Watchdogs, after all of the tick's receipt processing.
        self.watchdog_phase(now);

        self.stats.ticks += 1;
        self.now = Tick(now.0 + 1);
        now
    }

    /// Run every remaining tick through `stop` inclusive, snapshotting
    /// each into the recorder.
    pub fn run(&mut self, stop: Tick, recorder: &mut FeatureRecorder) {
        while self.now <= stop {
            let tick = self.step();
            self.record_into(tick, recorder);
        }
    }

    /// Snapshot every node's features at `tick` into the recorder.
    pub fn record_into(&self, tick: Tick, recorder: &mut FeatureRecorder) {
        recorder.record(
            tick,
            self.graph
                .nodes()
                .iter()
                .zip(&self.nodes)
                .map(|(cfg, state)| (cfg.name.as_str(), state as &dyn NodeObservables)),
        );
    }

    /// The compiled graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Node runtime states, in declaration order.
    pub fn node_states(&self) -> &[NodeState] {
        &self.nodes
    }

    /// The next tick `step()` will execute.
    pub fn current_tick(&self) -> Tick {
        self.now
    }

    /// Run statistics so far.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    // ── Tick phases ────────────────────────────────────────────

    fn apply_injected(&mut self, fault: InjectedFault) {
        match fault.action {
            FaultAction::Publish { topic, kind } => {
                self.nodes[fault.node.index()].install_publish_fault(topic, kind);
            }
            FaultAction::Receive { topic, delay } => {
                self.nodes[fault.node.index()].install_receive_delay(topic, delay);
            }
        }
        self.stats.faults_injected += 1;
    }

    /// Deliver until no receipt is due at `now`. Zero-delay
    /// republications from callbacks land in the same tick.
    fn pump(&mut self, now: Tick) {
        loop {
            let due = self.bus.drain_due(now);
            if due.is_empty() {
                return;
            }
            for delivery in due {
                self.deliver(delivery, now);
            }
        }
    }

    fn deliver(&mut self, delivery: Delivery, now: Tick) {
        let node_cfg = self.graph.node(delivery.subscriber);
        let Some((sub_idx, sub)) = node_cfg.subscription_to(delivery.topic) else {
            return;
        };
        let class = self.nodes[delivery.subscriber.index()].on_receive(sub_idx, delivery.value);
        self.stats.deliveries += 1;
        let callback = match class {
            Classification::Nominal => sub.on_nominal.clone(),
            Classification::Invalid => {
                self.stats.invalid_events += 1;
                sub.on_invalid.clone()
            }
        };
        if let Some(cb) = callback {
            self.run_callback(delivery.subscriber, &cb, now);
        }
    }

    fn fire_loop(&mut self, node: NodeIdx, now: Tick) {
        let Some(loop_spec) = self.graph.node(node).loop_spec.clone() else {
            return;
        };
        for spec in &loop_spec.publishes {
            self.publish(node, spec, now);
        }
        self.nodes[node.index()].advance_loop();
        self.stats.loop_firings += 1;
    }

    fn watchdog_phase(&mut self, now: Tick) {
        for i in 0..self.nodes.len() {
            let crossed = self.nodes[i].watchdog_step();
            for sub_idx in crossed {
                self.stats.lost_events += 1;
                let node = NodeIdx(i as u32);
                let callback = self.graph.node(node).subscriptions[sub_idx].on_lost.clone();
                if let Some(cb) = callback {
                    self.run_callback(node, &cb, now);
                }
            }
        }
    }

    fn run_callback(&mut self, node: NodeIdx, callback: &Callback, now: Tick) {
        match callback {
            Callback::Publish(specs) => {
                for spec in specs {
                    self.publish(node, spec, now);
                }
            }
            Callback::Fault(directive) => {
                self.nodes[node.index()].install_publish_fault(directive.topic, directive.kind);
                self.stats.callback_faults += 1;
            }
        }
    }

    /// Sample and emit one publication.
    ///
    /// Sampling order (value, then delay) is part of the determinism
    /// contract and happens even when a drop fault then suppresses the
    /// publication — the RNG stream must not depend on fault state.
    fn publish(&mut self, publisher: NodeIdx, spec: &PublishSpec, now: Tick) {
        let sampled = self
            .rng
            .random_range(spec.value_range.lo..=spec.value_range.hi);
        let delay = self
            .rng
            .random_range(spec.delay_range.lo..=spec.delay_range.hi);

        let value = match self.nodes[publisher.index()].transform_publication(spec.topic, sampled) {
            Some(v) => v,
            None => {
                self.stats.suppressed_publications += 1;
                return;
            }
        };
        self.nodes[publisher.index()].note_publication(spec.topic, value);
        self.stats.publications += 1;

        for &subscriber in self.graph.subscribers(spec.topic) {
            let extra = self.nodes[subscriber.index()].receive_delay_for(spec.topic);
            self.bus
                .schedule(Tick(now.0 + delay + extra), subscriber, spec.topic, value);
        }
    }
}
