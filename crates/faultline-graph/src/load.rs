//! File loading: YAML parsing with path context.
//!
//! Subsystem graph files are merged by concatenating their node lists in
//! argument order, then compiled and validated as one graph.

use std::fs;
use std::path::Path;

use faultline_core::{InjectedFault, Tick};

use crate::error::GraphError;
use crate::model::Graph;
use crate::schema::{RawFaultConfig, RawGraphFile, RawNode};

/// Read one YAML file into `T`, attaching the path to any failure.
fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, GraphError> {
    let text = fs::read_to_string(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| GraphError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and compile a graph from one or more config files.
///
/// Files are merged in the order given; node indices follow the merged
/// declaration order.
pub fn load_graph<P: AsRef<Path>>(paths: &[P]) -> Result<Graph, GraphError> {
    let mut nodes: Vec<RawNode> = Vec::new();
    for path in paths {
        let file: RawGraphFile = read_yaml(path.as_ref())?;
        nodes.extend(file.nodes);
    }
    Graph::compile(nodes)
}

/// Load a fault config file and resolve it against the graph.
///
/// `inject_at_override` is the CLI-level override and wins over the
/// file's own `inject_at`.
pub fn load_fault<P: AsRef<Path>>(
    path: P,
    graph: &Graph,
    inject_at_override: Option<Tick>,
) -> Result<InjectedFault, GraphError> {
    let raw: RawFaultConfig = read_yaml(path.as_ref())?;
    graph.resolve_fault(&raw, inject_at_override)
}
