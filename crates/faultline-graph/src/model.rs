//! Compiled graph model: interned topics, validated nodes, derived edges.
//!
//! [`Graph::compile`] turns the raw schema into the runtime model in two
//! passes: conversion (interning topics, registering publishers,
//! validating every range and directive shape) and reference checking
//! (every subscribed topic has a publisher, every fault directive targets
//! a topic its node publishes).

use indexmap::{IndexMap, IndexSet};

use faultline_core::callback::FaultDirective;
use faultline_core::{
    Callback, DelayRange, FaultAction, InjectedFault, NodeIdx, PublishFaultKind, PublishSpec,
    Tick, TopicId, ValueRange,
};

use crate::error::GraphError;
use crate::schema::{RawAffectPublish, RawCallback, RawFaultConfig, RawNode, RawPublish};

// ── Compiled node types ────────────────────────────────────────────

/// A node's periodic loop.
#[derive(Clone, Debug)]
pub struct LoopSpec {
    /// Firing period in ticks. The first firing is at tick 0.
    pub period: u64,
    /// Publish specs fired in declared order.
    pub publishes: Vec<PublishSpec>,
}

/// A compiled subscription with its three callback slots.
#[derive(Clone, Debug)]
pub struct Subscription {
    /// The subscribed topic.
    pub topic: TopicId,
    /// Bounds classifying a received value as nominal.
    pub valid_range: ValueRange,
    /// Watchdog threshold in ticks.
    pub watchdog: u64,
    /// Dispatched on an in-range receipt.
    pub on_nominal: Option<Callback>,
    /// Dispatched on an out-of-range receipt.
    pub on_invalid: Option<Callback>,
    /// Dispatched when the watchdog is first strictly exceeded.
    pub on_lost: Option<Callback>,
}

/// A compiled node.
#[derive(Clone, Debug)]
pub struct NodeConfig {
    /// Unique node name.
    pub name: String,
    /// Optional periodic loop.
    pub loop_spec: Option<LoopSpec>,
    /// Subscriptions in declaration order.
    pub subscriptions: Vec<Subscription>,
    /// First topic this node publishes anywhere (loop first, then
    /// callbacks in subscription order). `None` for pure sinks.
    pub primary_topic: Option<TopicId>,
}

impl NodeConfig {
    /// The subscription to `topic`, with its position, if any.
    ///
    /// At most one exists; duplicate subscriptions are a config error.
    pub fn subscription_to(&self, topic: TopicId) -> Option<(usize, &Subscription)> {
        self.subscriptions
            .iter()
            .enumerate()
            .find(|(_, s)| s.topic == topic)
    }
}

// ── Graph ──────────────────────────────────────────────────────────

/// The compiled, validated pub/sub graph.
///
/// Node indices follow declaration order in the merged config and are
/// the stable indices used by all outputs. Topics are interned in
/// first-mention order. The graph is immutable after compilation.
#[derive(Clone, Debug)]
pub struct Graph {
    nodes: Vec<NodeConfig>,
    by_name: IndexMap<String, NodeIdx>,
    topics: IndexSet<String>,
    publisher_of: Vec<Option<NodeIdx>>,
    subscribers_of: Vec<Vec<NodeIdx>>,
}

impl Graph {
    /// Compile and validate a merged list of raw node declarations.
    pub fn compile(raw_nodes: Vec<RawNode>) -> Result<Self, GraphError> {
        // 1. Must have at least one node.
        if raw_nodes.is_empty() {
            return Err(GraphError::EmptyGraph);
        }

        // 2. Node names must be unique; indices follow declaration order.
        let mut by_name: IndexMap<String, NodeIdx> = IndexMap::new();
        for (i, raw) in raw_nodes.iter().enumerate() {
            if by_name
                .insert(raw.name.clone(), NodeIdx(i as u32))
                .is_some()
            {
                return Err(GraphError::DuplicateNode {
                    name: raw.name.clone(),
                });
            }
        }
        let names: Vec<String> = raw_nodes.iter().map(|n| n.name.clone()).collect();

        // 3. Convert each node, interning topics and registering publishers.
        let mut compiler = Compiler {
            topics: IndexSet::new(),
            publisher_of: Vec::new(),
        };
        let mut nodes: Vec<NodeConfig> = Vec::with_capacity(raw_nodes.len());
        for (i, raw) in raw_nodes.iter().enumerate() {
            let idx = NodeIdx(i as u32);

            let loop_spec = match &raw.loop_ {
                Some(l) => {
                    if l.period == 0 {
                        return Err(GraphError::InvalidPeriod {
                            node: raw.name.clone(),
                        });
                    }
                    let publishes = l
                        .publish
                        .iter()
                        .map(|p| compiler.convert_publish(p, idx, &raw.name, &names, "loop"))
                        .collect::<Result<Vec<_>, _>>()?;
                    Some(LoopSpec {
                        period: l.period,
                        publishes,
                    })
                }
                None => None,
            };

            let mut subscriptions = Vec::with_capacity(raw.subscribe.len());
            for sub in &raw.subscribe {
                let topic = compiler.intern(&sub.topic);
                if subscriptions.iter().any(|s: &Subscription| s.topic == topic) {
                    return Err(GraphError::DuplicateSubscription {
                        node: raw.name.clone(),
                        topic: sub.topic.clone(),
                    });
                }
                let valid_range = ValueRange::new(sub.valid_range[0], sub.valid_range[1]);
                valid_range.validate().map_err(|reason| GraphError::InvalidRange {
                    node: raw.name.clone(),
                    field: format!("valid_range on subscription to '{}'", sub.topic),
                    reason,
                })?;
                let on_nominal = sub
                    .nominal_callback
                    .as_ref()
                    .map(|cb| compiler.convert_callback(cb, idx, &raw.name, &names, "nominal_callback"))
                    .transpose()?;
                let on_invalid = sub
                    .invalid_input_callback
                    .as_ref()
                    .map(|cb| {
                        compiler.convert_callback(cb, idx, &raw.name, &names, "invalid_input_callback")
                    })
                    .transpose()?;
                let on_lost = sub
                    .lost_input_callback
                    .as_ref()
                    .map(|cb| compiler.convert_callback(cb, idx, &raw.name, &names, "lost_input_callback"))
                    .transpose()?;
                subscriptions.push(Subscription {
                    topic,
                    valid_range,
                    watchdog: sub.watchdog,
                    on_nominal,
                    on_invalid,
                    on_lost,
                });
            }

            nodes.push(NodeConfig {
                name: raw.name.clone(),
                loop_spec,
                subscriptions,
                primary_topic: None,
            });
        }

        let Compiler {
            topics,
            publisher_of,
        } = compiler;

        // 4. Every subscribed topic must have a publisher.
        for node in &nodes {
            for sub in &node.subscriptions {
                if publisher_of[sub.topic.index()].is_none() {
                    return Err(GraphError::MissingPublisher {
                        topic: topics[sub.topic.index()].clone(),
                        subscriber: node.name.clone(),
                    });
                }
            }
        }

        // 5. Every callback fault directive must target a topic its own
        //    node publishes.
        for (i, node) in nodes.iter().enumerate() {
            for sub in &node.subscriptions {
                for cb in [&sub.on_nominal, &sub.on_invalid, &sub.on_lost] {
                    if let Some(Callback::Fault(d)) = cb {
                        if publisher_of[d.topic.index()] != Some(NodeIdx(i as u32)) {
                            return Err(GraphError::NotPublished {
                                node: node.name.clone(),
                                topic: topics[d.topic.index()].clone(),
                            });
                        }
                    }
                }
            }
        }

        // 6. Derive subscriber lists in declaration order.
        let mut subscribers_of: Vec<Vec<NodeIdx>> = vec![Vec::new(); topics.len()];
        for (i, node) in nodes.iter().enumerate() {
            for sub in &node.subscriptions {
                subscribers_of[sub.topic.index()].push(NodeIdx(i as u32));
            }
        }

        // 7. Resolve each node's primary output topic.
        for node in &mut nodes {
            node.primary_topic = first_published_topic(node);
        }

        Ok(Self {
            nodes,
            by_name,
            topics,
            publisher_of,
            subscribers_of,
        })
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The node at a declaration index.
    pub fn node(&self, idx: NodeIdx) -> &NodeConfig {
        &self.nodes[idx.index()]
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> &[NodeConfig] {
        &self.nodes
    }

    /// Look up a node index by name.
    pub fn node_idx(&self, name: &str) -> Option<NodeIdx> {
        self.by_name.get(name).copied()
    }

    /// Number of interned topics.
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// The interned name of a topic.
    pub fn topic_name(&self, topic: TopicId) -> &str {
        &self.topics[topic.index()]
    }

    /// Look up a topic by name.
    pub fn topic_id(&self, name: &str) -> Option<TopicId> {
        self.topics.get_index_of(name).map(|i| TopicId(i as u32))
    }

    /// The unique publisher of a topic, if the topic is published at all.
    pub fn publisher(&self, topic: TopicId) -> Option<NodeIdx> {
        self.publisher_of[topic.index()]
    }

    /// Subscribers of a topic, in node declaration order.
    pub fn subscribers(&self, topic: TopicId) -> &[NodeIdx] {
        &self.subscribers_of[topic.index()]
    }

    /// The derived edge set: one `(publisher, subscriber)` pair per
    /// subscription, topics in interning order.
    ///
    /// This set is a pure function of the graph config; it does not
    /// depend on the injected fault or the run seed.
    pub fn edges(&self) -> Vec<(NodeIdx, NodeIdx)> {
        let mut edges = Vec::new();
        for (t, publisher) in self.publisher_of.iter().enumerate() {
            if let Some(p) = *publisher {
                for s in &self.subscribers_of[t] {
                    edges.push((p, *s));
                }
            }
        }
        edges
    }

    /// Resolve the raw fault config against this graph.
    ///
    /// `inject_at_override` is the CLI override; it wins over the file's
    /// own `inject_at`. All references are checked here, before tick 0.
    pub fn resolve_fault(
        &self,
        raw: &RawFaultConfig,
        inject_at_override: Option<Tick>,
    ) -> Result<InjectedFault, GraphError> {
        let node = self
            .node_idx(&raw.inject_to)
            .ok_or_else(|| GraphError::UnknownNode {
                name: raw.inject_to.clone(),
            })?;
        let inject_at = inject_at_override.unwrap_or(Tick(raw.inject_at));

        let action = match (&raw.affect_publish, &raw.affect_receive) {
            (Some(p), None) => {
                let topic = self
                    .topic_id(&p.topic)
                    .ok_or_else(|| GraphError::UnknownTopic {
                        name: p.topic.clone(),
                    })?;
                if self.publisher(topic) != Some(node) {
                    return Err(GraphError::NotPublished {
                        node: raw.inject_to.clone(),
                        topic: p.topic.clone(),
                    });
                }
                let kind = affect_publish_kind(p, &raw.inject_to)?;
                FaultAction::Publish { topic, kind }
            }
            (None, Some(r)) => {
                let topic = self
                    .topic_id(&r.topic)
                    .ok_or_else(|| GraphError::UnknownTopic {
                        name: r.topic.clone(),
                    })?;
                if self.node(node).subscription_to(topic).is_none() {
                    return Err(GraphError::NotSubscribed {
                        node: raw.inject_to.clone(),
                        topic: r.topic.clone(),
                    });
                }
                FaultAction::Receive {
                    topic,
                    delay: r.delay,
                }
            }
            _ => return Err(GraphError::AmbiguousFaultAction),
        };

        Ok(InjectedFault {
            node,
            inject_at,
            action,
        })
    }
}

// ── Conversion helpers ─────────────────────────────────────────────

/// Working state for the conversion pass.
struct Compiler {
    topics: IndexSet<String>,
    publisher_of: Vec<Option<NodeIdx>>,
}

impl Compiler {
    /// Intern a topic name, growing the publisher table alongside.
    fn intern(&mut self, name: &str) -> TopicId {
        let (i, _) = self.topics.insert_full(name.to_string());
        if self.publisher_of.len() <= i {
            self.publisher_of.push(None);
        }
        TopicId(i as u32)
    }

    /// Record `node` as the publisher of `topic`, rejecting a second
    /// distinct publisher.
    fn register_publisher(
        &mut self,
        topic: TopicId,
        node: NodeIdx,
        names: &[String],
    ) -> Result<(), GraphError> {
        match self.publisher_of[topic.index()] {
            None => {
                self.publisher_of[topic.index()] = Some(node);
                Ok(())
            }
            Some(existing) if existing == node => Ok(()),
            Some(existing) => Err(GraphError::DuplicatePublisher {
                topic: self.topics[topic.index()].clone(),
                first: names[existing.index()].clone(),
                second: names[node.index()].clone(),
            }),
        }
    }

    fn convert_publish(
        &mut self,
        raw: &RawPublish,
        node: NodeIdx,
        node_name: &str,
        names: &[String],
        field: &str,
    ) -> Result<PublishSpec, GraphError> {
        let topic = self.intern(&raw.topic);
        self.register_publisher(topic, node, names)?;
        let value_range = ValueRange::new(raw.value_range[0], raw.value_range[1]);
        value_range.validate().map_err(|reason| GraphError::InvalidRange {
            node: node_name.to_string(),
            field: format!("{field}: value_range on topic '{}'", raw.topic),
            reason,
        })?;
        let delay_range = DelayRange::new(raw.delay_range[0], raw.delay_range[1]);
        delay_range.validate().map_err(|reason| GraphError::InvalidRange {
            node: node_name.to_string(),
            field: format!("{field}: delay_range on topic '{}'", raw.topic),
            reason,
        })?;
        Ok(PublishSpec {
            topic,
            value_range,
            delay_range,
        })
    }

    fn convert_callback(
        &mut self,
        raw: &RawCallback,
        node: NodeIdx,
        node_name: &str,
        names: &[String],
        field: &str,
    ) -> Result<Callback, GraphError> {
        match raw {
            RawCallback::Publish(specs) => {
                let specs = specs
                    .iter()
                    .map(|p| self.convert_publish(p, node, node_name, names, field))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Callback::Publish(specs))
            }
            RawCallback::Fault(d) => {
                let topic = self.intern(&d.affect_publish.topic);
                let kind = affect_publish_kind(&d.affect_publish, node_name)?;
                Ok(Callback::Fault(FaultDirective { topic, kind }))
            }
        }
    }
}

/// Validate the `drop` / `value`+`count` shape of a publish-side fault.
pub(crate) fn affect_publish_kind(
    raw: &RawAffectPublish,
    node_name: &str,
) -> Result<PublishFaultKind, GraphError> {
    let kind = match (raw.drop, raw.value, raw.count) {
        (Some(n), None, None) => PublishFaultKind::Drop { count: n },
        (None, Some(value), Some(count)) => PublishFaultKind::Override { value, count },
        _ => {
            return Err(GraphError::InvalidFaultDirective {
                node: node_name.to_string(),
                reason: "exactly one of 'drop' or 'value' with 'count' is required".to_string(),
            })
        }
    };
    if kind.count() == 0 {
        return Err(GraphError::InvalidFaultDirective {
            node: node_name.to_string(),
            reason: "publication count must be at least 1".to_string(),
        });
    }
    Ok(kind)
}

/// The first topic a node publishes in declaration order: loop publish
/// list first, then each subscription's callbacks (nominal, invalid,
/// lost).
fn first_published_topic(node: &NodeConfig) -> Option<TopicId> {
    if let Some(l) = &node.loop_spec {
        if let Some(p) = l.publishes.first() {
            return Some(p.topic);
        }
    }
    for sub in &node.subscriptions {
        for cb in [&sub.on_nominal, &sub.on_invalid, &sub.on_lost] {
            if let Some(Callback::Publish(specs)) = cb {
                if let Some(p) = specs.first() {
                    return Some(p.topic);
                }
            }
        }
    }
    None
}
