//! Faultline command-line interface.
//!
//! Loads the graph (and optional fault) configs, runs the simulation to
//! the stop tick, and either writes the dataset outputs or renders a
//! per-tick textual view (`--viz`). Outputs are buffered in memory and
//! persisted only after a successful run, so a fatal error never leaves
//! partial files behind.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod viz;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use faultline_core::Tick;
use faultline_engine::Executor;
use faultline_graph::{load_fault, load_graph};
use faultline_obs::{write_edge_index, write_fault_label, FeatureRecorder};

/// Deterministic pub/sub fault-propagation simulator.
#[derive(Parser, Debug)]
#[command(name = "faultline", version, about)]
struct Cli {
    /// Graph config file; repeat to merge subsystem files in order.
    #[arg(long = "graph", required = true)]
    graph: Vec<PathBuf>,

    /// Terminal tick, inclusive.
    #[arg(long = "stop", default_value_t = 100)]
    stop: u64,

    /// RNG seed; identical inputs and seed reproduce identical outputs.
    #[arg(long = "seed", default_value_t = 42)]
    seed: u64,

    /// Fault config file (at most one fault per run).
    #[arg(long = "fault")]
    fault: Option<PathBuf>,

    /// Override the fault config's own inject_at tick.
    #[arg(long = "inject_at", requires = "fault")]
    inject_at: Option<u64>,

    /// Where to write per-tick node feature rows.
    #[arg(long = "node_feature_output")]
    node_feature_output: Option<PathBuf>,

    /// Where to write the edge index.
    #[arg(long = "edge_index_output")]
    edge_index_output: Option<PathBuf>,

    /// Where to write the fault label line.
    #[arg(long = "fault_label_output", requires = "fault")]
    fault_label_output: Option<PathBuf>,

    /// Render a per-tick textual view instead of writing tensors.
    #[arg(
        long = "viz",
        conflicts_with_all = ["node_feature_output", "edge_index_output", "fault_label_output"]
    )]
    viz: bool,
}

fn main() -> Result<()> {
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let graph = load_graph(&cli.graph).context("loading graph config")?;

    let fault = match &cli.fault {
        Some(path) => Some(
            load_fault(path, &graph, cli.inject_at.map(Tick))
                .with_context(|| format!("loading fault config {}", path.display()))?,
        ),
        None => None,
    };

    let mut executor = Executor::new(graph, fault, cli.seed);

    if cli.viz {
        viz::render(&mut executor, Tick(cli.stop));
        return Ok(());
    }

    let mut recorder = FeatureRecorder::new();
    executor.run(Tick(cli.stop), &mut recorder);

    // Persist only after the full run has succeeded.
    if let Some(path) = &cli.node_feature_output {
        fs::write(path, recorder.to_csv_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &cli.edge_index_output {
        let mut buf = Vec::new();
        write_edge_index(&executor.graph().edges(), &mut buf)?;
        fs::write(path, buf).with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &cli.fault_label_output {
        // clap's `requires` guarantees a fault config was given.
        let Some(fault) = fault else {
            bail!("--fault_label_output requires --fault");
        };
        let mut buf = Vec::new();
        write_fault_label(&fault, &mut buf)?;
        fs::write(path, buf).with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}
