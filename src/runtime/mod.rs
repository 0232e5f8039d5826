//! Executing a chart: event dispatch, state changes and the actions they run.

mod chart;
mod error;
mod resolve;
mod transition;

pub use chart::Chart;
pub use error::{ChartError, Result};
pub use transition::{Action, Transition};
