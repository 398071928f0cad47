//! Textual per-tick rendering for `--viz` runs.

use faultline_core::{NodeObservables, Tick};
use faultline_engine::Executor;

/// Step the executor to `stop`, printing each node's observable state
/// per tick, followed by the run summary.
pub fn render(executor: &mut Executor, stop: Tick) {
    while executor.current_tick() <= stop {
        let tick = executor.step();
        println!("tick {tick}");
        for (cfg, state) in executor
            .graph()
            .nodes()
            .iter()
            .zip(executor.node_states())
        {
            println!(
                "  {:<16} pub={:<6} recv={:<6} past_wd={} emitted={} invalid={} lost={}",
                cfg.name,
                state.last_published().map_or("-".to_string(), |v| v.to_string()),
                state.last_received().map_or("-".to_string(), |v| v.to_string()),
                state.past_watchdog_count(),
                state.publications(),
                state.invalid_events(),
                state.lost_events(),
            );
        }
    }

    let stats = executor.stats();
    println!(
        "done: {} ticks, {} publications ({} suppressed), {} deliveries, {} invalid, {} lost",
        stats.ticks,
        stats.publications,
        stats.suppressed_publications,
        stats.deliveries,
        stats.invalid_events,
        stats.lost_events,
    );
}
