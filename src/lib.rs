//! OrderStat - statistics accumulator for batch order conversion.
//!
//! The conversion pipeline feeds every processed real-estate order into an
//! [`Accumulator`], which keeps running counters broken down by operation
//! type, estate type, and object type, tracks photo attachments, collects
//! payment statistics from successful orders, and renders an aligned text
//! report at the end of the run.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod order;
pub mod report;
pub mod scanner;
pub mod stat;

pub use error::{LogObserver, RecordError, SkipObserver};
pub use models::{NormalizedRecord, Outcome, Snapshot};
pub use order::OrderInput;
pub use stat::accumulator::Accumulator;
pub use stat::tree::{StatNode, StatTree};
