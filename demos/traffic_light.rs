//! Traffic Light Chart
//!
//! This example demonstrates a simple cyclic chart with a guarded
//! pedestrian override.
//!
//! Key concepts:
//! - Cyclic transitions (states repeat)
//! - Guards reading the datamodel
//! - Entry actions updating the datamodel
//! - Transition history
//!
//! Run with: cargo run --example traffic_light
//! Set RUST_LOG=statechart=debug to see every state change.

use serde_json::{json, Value};
use statechart::datamodel::MemoryDataModel;
use statechart::{ChartBuilder, Guard, StateSpec, Transition};
use tracing_subscriber::EnvFilter;

fn count_cycle(chart: &mut statechart::Chart, _: &[Value]) -> statechart::Result<Value> {
    let cycles = chart
        .datamodel()
        .get("cycles")
        .and_then(Value::as_i64)
        .unwrap_or(0);
    chart.datamodel_mut().set("cycles", json!(cycles + 1));
    Ok(Value::Null)
}

fn main() -> statechart::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Traffic Light Chart ===\n");

    let mut chart = ChartBuilder::new()
        .spec(
            StateSpec::compound("light")
                .initial("red")
                .state(
                    StateSpec::atomic("red")
                        .on_entry(count_cycle)
                        .transition(Transition::new("timer", "green")),
                )
                .state(
                    StateSpec::atomic("green")
                        .transition(
                            Transition::new("timer", "red")
                                .guard(Guard::equals("pedestrian_waiting", true)),
                        )
                        .transition(Transition::new("timer", "yellow")),
                )
                .state(StateSpec::atomic("yellow").transition(Transition::new("timer", "red"))),
        )
        .datamodel(MemoryDataModel::new().with_item("pedestrian_waiting", json!(false)))
        .build()?;

    println!("Initial state: {}\n", chart.current_state().name());

    println!("Transition sequence:");
    for _ in 0..3 {
        chart.trigger("timer", &[])?;
        println!("  -> {}", chart.current_state().name());
    }

    println!("\nPedestrian presses the button while green:");
    chart.trigger("timer", &[])?;
    chart.datamodel_mut().set("pedestrian_waiting", json!(true));
    chart.trigger("timer", &[])?;
    println!("  green -> {} (yellow skipped)", chart.current_state().name());

    println!("\nVisited: {}", chart.history().get_path().join(" -> "));
    println!(
        "Cycles started: {}",
        chart.datamodel().get("cycles").cloned().unwrap_or(Value::Null)
    );

    println!("\n=== Example Complete ===");
    Ok(())
}
