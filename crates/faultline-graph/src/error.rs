//! Configuration error types.
//!
//! Every variant names the offending node, topic, or field so the CLI
//! can report a single-line error pointing at the configuration mistake.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors detected while loading or compiling graph and fault configs.
///
/// All of these are fatal before tick 0; the simulation itself never
/// fails at runtime.
#[derive(Debug)]
pub enum GraphError {
    /// The merged configuration contains no nodes.
    EmptyGraph,
    /// Two nodes share a name.
    DuplicateNode {
        /// The repeated node name.
        name: String,
    },
    /// Two distinct nodes publish the same topic.
    DuplicatePublisher {
        /// The topic with more than one publisher.
        topic: String,
        /// The node that published it first.
        first: String,
        /// The node that tried to publish it as well.
        second: String,
    },
    /// A subscribed topic has no publisher anywhere in the graph.
    MissingPublisher {
        /// The orphaned topic.
        topic: String,
        /// The node subscribing to it.
        subscriber: String,
    },
    /// A `value_range`, `valid_range`, or `delay_range` is malformed.
    InvalidRange {
        /// The node carrying the range.
        node: String,
        /// Which field the range belongs to.
        field: String,
        /// Description of the problem.
        reason: String,
    },
    /// A loop period of zero.
    InvalidPeriod {
        /// The node with the zero-period loop.
        node: String,
    },
    /// One node subscribes to the same topic twice.
    DuplicateSubscription {
        /// The node with the repeated subscription.
        node: String,
        /// The repeated topic.
        topic: String,
    },
    /// A fault directive is malformed (drop/override shape or zero count).
    InvalidFaultDirective {
        /// The node carrying the directive.
        node: String,
        /// Description of the problem.
        reason: String,
    },
    /// The fault config does not name exactly one of `affect_publish`
    /// and `affect_receive`.
    AmbiguousFaultAction,
    /// A fault references a node that does not exist.
    UnknownNode {
        /// The unresolved node name.
        name: String,
    },
    /// A fault references a topic that does not exist.
    UnknownTopic {
        /// The unresolved topic name.
        name: String,
    },
    /// A receive-side fault targets a topic the node does not subscribe to.
    NotSubscribed {
        /// The targeted node.
        node: String,
        /// The topic it does not subscribe to.
        topic: String,
    },
    /// A publish-side fault targets a topic the node does not publish.
    NotPublished {
        /// The targeted node.
        node: String,
        /// The topic it does not publish.
        topic: String,
    },
    /// A config file could not be read.
    Io {
        /// The offending path.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// A config file could not be parsed as YAML.
    Yaml {
        /// The offending path.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_yaml::Error,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGraph => write!(f, "graph config contains no nodes"),
            Self::DuplicateNode { name } => write!(f, "duplicate node name '{name}'"),
            Self::DuplicatePublisher {
                topic,
                first,
                second,
            } => write!(
                f,
                "topic '{topic}' has two publishers: '{first}' and '{second}'"
            ),
            Self::MissingPublisher { topic, subscriber } => write!(
                f,
                "node '{subscriber}' subscribes to topic '{topic}' which has no publisher"
            ),
            Self::InvalidRange {
                node,
                field,
                reason,
            } => write!(f, "node '{node}': {field}: {reason}"),
            Self::InvalidPeriod { node } => {
                write!(f, "node '{node}': loop period must be at least 1")
            }
            Self::DuplicateSubscription { node, topic } => {
                write!(f, "node '{node}' subscribes to topic '{topic}' twice")
            }
            Self::InvalidFaultDirective { node, reason } => {
                write!(f, "node '{node}': invalid fault directive: {reason}")
            }
            Self::AmbiguousFaultAction => write!(
                f,
                "fault config must name exactly one of affect_publish and affect_receive"
            ),
            Self::UnknownNode { name } => write!(f, "unknown node '{name}'"),
            Self::UnknownTopic { name } => write!(f, "unknown topic '{name}'"),
            Self::NotSubscribed { node, topic } => {
                write!(f, "node '{node}' does not subscribe to topic '{topic}'")
            }
            Self::NotPublished { node, topic } => {
                write!(f, "node '{node}' does not publish topic '{topic}'")
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Yaml { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Yaml { source, .. } => Some(source),
            _ => None,
        }
    }
}
