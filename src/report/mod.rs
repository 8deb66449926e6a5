//! Report generation.

pub mod renderer;

pub use renderer::{render_json_snapshot, render_report, render_report_at};
