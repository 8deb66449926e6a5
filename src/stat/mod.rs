//! Statistics accumulation.
//!
//! `tree` holds the path-addressed counter store; `accumulator` drives it
//! once per processed order.

pub mod accumulator;
pub mod tree;

pub use accumulator::Accumulator;
pub use tree::{StatNode, StatTree};
