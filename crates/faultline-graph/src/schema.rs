//! Raw serde schema for the YAML config files.
//!
//! These types mirror the on-disk format one-to-one and carry no derived
//! information. Compilation into the runtime [`Graph`](crate::model::Graph)
//! interns topics, validates every field, and rejects unknown references.
//! `deny_unknown_fields` everywhere keeps typos from silently vanishing.

use serde::Deserialize;

/// One graph config file: a list of node declarations.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawGraphFile {
    /// Nodes in declaration order.
    pub nodes: Vec<RawNode>,
}

/// A node declaration.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawNode {
    /// Unique node name.
    pub name: String,
    /// Optional periodic loop.
    #[serde(rename = "loop", default)]
    pub loop_: Option<RawLoop>,
    /// Subscriptions, possibly empty.
    #[serde(default)]
    pub subscribe: Vec<RawSubscribe>,
}

/// A periodic loop: every `period` ticks, publish the listed specs.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLoop {
    /// Firing period in ticks, at least 1. The first firing is at tick 0.
    pub period: u64,
    /// Publish specs fired in declared order.
    pub publish: Vec<RawPublish>,
}

/// A publish spec: topic plus value and delay sampling ranges.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPublish {
    /// Topic name.
    pub topic: String,
    /// Inclusive `[lo, hi]` bounds the value is sampled from.
    pub value_range: [i64; 2],
    /// Inclusive `[lo, hi]` bounds the delivery delay is sampled from.
    pub delay_range: [u64; 2],
}

/// A subscription entry with its three callback slots.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSubscribe {
    /// Topic name.
    pub topic: String,
    /// Inclusive bounds classifying a received value as nominal.
    pub valid_range: [i64; 2],
    /// Watchdog threshold in ticks.
    pub watchdog: u64,
    /// Dispatched when a received value is in range.
    #[serde(default)]
    pub nominal_callback: Option<RawCallback>,
    /// Dispatched when a received value is out of range.
    #[serde(default)]
    pub invalid_input_callback: Option<RawCallback>,
    /// Dispatched when the watchdog is first strictly exceeded.
    #[serde(default)]
    pub lost_input_callback: Option<RawCallback>,
}

/// A callback slot: either a publish list or a fault directive.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawCallback {
    /// Publish each spec in declared order.
    Publish(Vec<RawPublish>),
    /// Install a publish-side fault on this node.
    Fault(RawFaultDirective),
}

/// A callback-produced fault directive (publish-side only).
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFaultDirective {
    /// The affected outgoing topic on this node.
    pub affect_publish: RawAffectPublish,
}

/// A publish-side fault: either `drop: N` or `value: V, count: N`.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAffectPublish {
    /// Topic whose publications are affected.
    pub topic: String,
    /// Suppress the next N publications.
    #[serde(default)]
    pub drop: Option<u32>,
    /// Value substituted for the sampled one.
    #[serde(default)]
    pub value: Option<i64>,
    /// Number of publications the substitution applies to.
    #[serde(default)]
    pub count: Option<u32>,
}

/// A receive-side fault: extra delay on all deliveries of a topic.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAffectReceive {
    /// Topic whose deliveries are delayed.
    pub topic: String,
    /// Extra delay in ticks, applied at scheduling time.
    pub delay: u64,
}

/// The fault config file: exactly one injected fault per run.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFaultConfig {
    /// Name of the targeted node.
    pub inject_to: String,
    /// Tick at which the fault is installed (overridable from the CLI).
    pub inject_at: u64,
    /// Publish-side action; mutually exclusive with `affect_receive`.
    #[serde(default)]
    pub affect_publish: Option<RawAffectPublish>,
    /// Receive-side action; mutually exclusive with `affect_publish`.
    #[serde(default)]
    pub affect_receive: Option<RawAffectReceive>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_node_declaration() {
        let yaml = r#"
nodes:
  - name: camera
    loop:
      period: 10
      publish:
        - topic: frame
          value_range: [0, 100]
          delay_range: [0, 2]
  - name: perception
    subscribe:
      - topic: frame
        valid_range: [0, 80]
        watchdog: 25
        nominal_callback:
          publish:
            - topic: track
              value_range: [1, 5]
              delay_range: [0, 0]
        invalid_input_callback:
          fault:
            affect_publish:
              topic: track
              drop: 3
"#;
        let file: RawGraphFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.nodes.len(), 2);
        let camera = &file.nodes[0];
        assert_eq!(camera.loop_.as_ref().unwrap().period, 10);
        assert!(camera.subscribe.is_empty());
        let sub = &file.nodes[1].subscribe[0];
        assert_eq!(sub.valid_range, [0, 80]);
        match sub.invalid_input_callback.as_ref().unwrap() {
            RawCallback::Fault(d) => {
                assert_eq!(d.affect_publish.topic, "track");
                assert_eq!(d.affect_publish.drop, Some(3));
            }
            other => panic!("expected fault callback, got {other:?}"),
        }
    }

    #[test]
    fn parses_both_fault_config_shapes() {
        let publish: RawFaultConfig = serde_yaml::from_str(
            "inject_to: camera\ninject_at: 40\naffect_publish:\n  topic: frame\n  drop: 2\n",
        )
        .unwrap();
        assert_eq!(publish.inject_at, 40);
        assert!(publish.affect_publish.is_some());

        let receive: RawFaultConfig = serde_yaml::from_str(
            "inject_to: perception\ninject_at: 5\naffect_receive:\n  topic: frame\n  delay: 3\n",
        )
        .unwrap();
        assert_eq!(receive.affect_receive.as_ref().unwrap().delay, 3);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = "nodes:\n  - name: a\n    colour: red\n";
        assert!(serde_yaml::from_str::<RawGraphFile>(yaml).is_err());
    }
}
