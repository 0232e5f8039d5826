//! Builder API for declaring and constructing charts.
//!
//! A chart is declared as a [`StateSpec`] record, checked and materialised by
//! [`build_tree`], and started by [`ChartBuilder`] together with its
//! configuration and datamodel.

pub mod error;
pub mod machine;
pub mod spec;
pub(crate) mod tree;

pub use error::ConfigViolation;
pub use machine::ChartBuilder;
pub use spec::StateSpec;
pub use tree::build_tree;
