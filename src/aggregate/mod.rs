//! Content aggregates

pub mod node_aggregate;

pub use node_aggregate::*;
