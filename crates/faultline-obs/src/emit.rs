//! CSV emitters for the edge index and fault label outputs.

use std::io::{self, Write};

use faultline_core::{InjectedFault, NodeIdx};

/// Write the edge index: one `publisher_index,subscriber_index` line
/// per edge, no header. Indices are node declaration indices.
pub fn write_edge_index<W: Write>(edges: &[(NodeIdx, NodeIdx)], mut w: W) -> io::Result<()> {
    for (publisher, subscriber) in edges {
        writeln!(w, "{publisher},{subscriber}")?;
    }
    Ok(())
}

/// Write the fault label: a single `node_index,inject_at` line.
///
/// The tick written is the effective injection tick (a CLI override
/// has already been applied during fault resolution).
pub fn write_fault_label<W: Write>(fault: &InjectedFault, mut w: W) -> io::Result<()> {
    writeln!(w, "{},{}", fault.node, fault.inject_at)
}
