//! In-memory accumulation of per-tick feature rows.

use std::io::{self, Write};

use faultline_core::{NodeObservables, Tick};

use crate::feature::FeatureVector;

/// One CSV row: every node's feature vector at a single tick.
#[derive(Clone, Debug)]
pub struct TickRow {
    /// The snapshot tick.
    pub tick: Tick,
    /// `(node name, features)` in node declaration order.
    pub records: Vec<(String, FeatureVector)>,
}

/// Accumulates the full feature table for a run.
///
/// Rows are buffered in memory and written out once at the end of a
/// successful run, so a fatal error never leaves a partial file behind.
#[derive(Debug, Default)]
pub struct FeatureRecorder {
    rows: Vec<TickRow>,
}

impl FeatureRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot every node at `tick`. Nodes must be passed in
    /// declaration order; the row preserves the order given.
    pub fn record<'a, I>(&mut self, tick: Tick, nodes: I)
    where
        I: IntoIterator<Item = (&'a str, &'a dyn NodeObservables)>,
    {
        let records = nodes
            .into_iter()
            .map(|(name, node)| (name.to_string(), FeatureVector::extract(tick, node)))
            .collect();
        self.rows.push(TickRow { tick, records });
    }

    /// The accumulated rows, one per tick.
    pub fn rows(&self) -> &[TickRow] {
        &self.rows
    }

    /// Write the node-feature CSV: one line per tick, each line the
    /// comma-joined `name,f0,…,f8` records of every node.
    pub fn write_csv<W: Write>(&self, mut w: W) -> io::Result<()> {
        for row in &self.rows {
            let mut first = true;
            for (name, features) in &row.records {
                if !first {
                    write!(w, ",")?;
                }
                first = false;
                write!(w, "{name}")?;
                for v in features.as_slice() {
                    write!(w, ",{v}")?;
                }
            }
            writeln!(w)?;
        }
        Ok(())
    }

    /// The node-feature CSV as bytes, for byte-equality determinism
    /// checks and buffered persistence.
    pub fn to_csv_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing to a Vec<u8> cannot fail.
        let _ = self.write_csv(&mut buf);
        buf
    }
}
