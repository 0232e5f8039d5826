//! Media Player Chart
//!
//! This example demonstrates parallel regions: playback and volume are
//! independent regions of one `active` state, each advancing on its own.
//!
//! Key concepts:
//! - Parallel states with independent regions
//! - Events handled by whichever region declares them
//! - Leaving a parallel state exits every region
//! - Adding a region at runtime
//!
//! Run with: cargo run --example media_player
//! Set RUST_LOG=statechart=trace to see every entry and exit.

use serde_json::Value;
use statechart::{Chart, StateSpec, Transition};
use tracing_subscriber::EnvFilter;

fn leaves(chart: &Chart) -> String {
    chart
        .current_states()
        .into_iter()
        .map(|state| chart.path_of(state.id()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn announce(
    name: &'static str,
) -> impl Fn(&mut Chart, &[Value]) -> statechart::Result<Value> + Send + Sync + 'static {
    move |_, _| {
        println!("    (entered {name})");
        Ok(Value::Null)
    }
}

fn main() -> statechart::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Media Player Chart ===\n");

    let mut chart = Chart::new(
        StateSpec::compound("player")
            .initial("off")
            .state(StateSpec::atomic("off").transition(Transition::new("power", "active")))
            .state(
                StateSpec::parallel("active")
                    .on_entry(announce("active"))
                    .transition(Transition::new("power", "off"))
                    .state(
                        StateSpec::compound("playback")
                            .initial("paused")
                            .state(
                                StateSpec::atomic("paused")
                                    .transition(Transition::new("play", "playing")),
                            )
                            .state(
                                StateSpec::atomic("playing")
                                    .on_entry(announce("playing"))
                                    .transition(Transition::new("pause", "paused")),
                            ),
                    )
                    .state(
                        StateSpec::compound("volume")
                            .initial("normal")
                            .state(
                                StateSpec::atomic("normal")
                                    .transition(Transition::new("mute", "muted")),
                            )
                            .state(
                                StateSpec::atomic("muted")
                                    .transition(Transition::new("mute", "normal")),
                            ),
                    ),
            ),
    )?;

    println!("Session: {}", chart.session_id());
    println!("Start: {}\n", leaves(&chart));

    for event in ["power", "play", "mute"] {
        chart.trigger(event, &[])?;
        println!("  {event:<6} -> {}", leaves(&chart));
    }

    println!("\nAdding a subtitles region while active:");
    chart.add_state(
        StateSpec::compound("subtitles")
            .state(StateSpec::atomic("hidden").transition(Transition::new("cc", "shown")))
            .state(StateSpec::atomic("shown")),
        Some("active"),
    )?;
    chart.trigger("cc", &[])?;
    println!("  cc     -> {}", leaves(&chart));

    match chart.trigger("rewind", &[]) {
        Ok(_) => println!("\nrewind handled"),
        Err(err) => println!("\nrewind rejected: {err}"),
    }

    chart.trigger("power", &[])?;
    println!("  power  -> {}", leaves(&chart));

    println!("\n=== Example Complete ===");
    Ok(())
}
