//! Text report rendering.
//!
//! Walks the counter tree and produces the aligned multi-section run report:
//! header, totals, photo summary, one section per dimension with its two
//! cross-tab breakdowns, and the payment statistics footer. Counters that
//! were never touched render as 0.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::stat::accumulator::Accumulator;
use crate::stat::tree::{StatNode, StatTree};

/// Column width for top-level dimension labels.
const DIM_LABEL_WIDTH: usize = 17;
/// Column width for cross-tab labels.
const CROSS_LABEL_WIDTH: usize = 30;
/// Labels are padded out to this column before the counters start.
const MAX_LABEL_WIDTH: usize = 30;
/// Column width for the totals label.
const TOTALS_LABEL_WIDTH: usize = 8;

const SECTION_RULE: &str = "================================";

/// Renders the report against the current wall clock.
pub fn render_report(acc: &Accumulator) -> String {
    render_report_at(acc, Utc::now())
}

/// Renders the report with an explicit "now", so the elapsed-time line is
/// deterministic.
pub fn render_report_at(acc: &Accumulator, now: DateTime<Utc>) -> String {
    let stat = acc.stat();
    let elapsed = (now - acc.start_tm()).num_milliseconds() as f64 / 1000.0;

    let mut output = String::new();
    output.push('\n');
    output.push_str(&format!("Statistics for {}: {}\n", acc.task(), acc.id()));
    output.push_str(&format!(
        "  Conversion started at {} and took {} s\n",
        acc.start_tm(),
        elapsed
    ));

    output.push_str(&counter_line(
        "Totals",
        (stat.count("total"), stat.count("ok"), stat.count("fail")),
        TOTALS_LABEL_WIDTH,
    ));
    output.push_str(&photo_line(stat));
    output.push('\n');

    output.push_str(&dimension_section(
        stat,
        "By operation:",
        "by_op",
        ["by_etype", "by_otype"],
    ));
    output.push('\n');
    output.push_str(&dimension_section(
        stat,
        "By estate type:",
        "by_etype",
        ["by_op", "by_otype"],
    ));
    output.push('\n');
    output.push_str(&dimension_section(
        stat,
        "By object type:",
        "by_otype",
        ["by_etype", "by_op"],
    ));

    output.push_str(&footer(acc.len()));
    output
}

/// Pretty-printed JSON snapshot of the accumulator state.
pub fn render_json_snapshot(acc: &Accumulator) -> Result<String> {
    serde_json::to_string_pretty(&acc.serialize()).map_err(Into::into)
}

/// One aligned counter line: label, total, ok count, fail count.
fn counter_line(name: &str, totals: (i64, i64, i64), width: usize) -> String {
    let width = width.max(name.len());
    let pad = MAX_LABEL_WIDTH.saturating_sub(width);
    let (total, ok, fail) = totals;
    format!(
        "{name:>width$}:{empty:>pad$} {total:>8} = {ok:>8} ok + {fail:>8} errors\n",
        empty = ""
    )
}

fn node_totals(node: &StatNode) -> (i64, i64, i64) {
    (
        node.count_of("total"),
        node.count_of("ok"),
        node.count_of("fail"),
    )
}

fn photo_line(stat: &StatTree) -> String {
    match stat.get("photos") {
        Some(photos) if photos.is_branch() => format!(
            "    of them {} have photos, {} do not. {} photos processed.\n",
            photos.count_of("exist"),
            photos.count_of("zero"),
            photos.count_of("total"),
        ),
        _ => "    no photos found.\n".to_string(),
    }
}

/// One dimension section: every observed value with its totals line followed
/// by the breakdowns over the other two dimensions.
fn dimension_section(
    stat: &StatTree,
    title: &str,
    root_key: &str,
    cross_keys: [&str; 2],
) -> String {
    let mut section = String::new();
    section.push_str(title);
    section.push('\n');
    section.push_str(SECTION_RULE);
    section.push('\n');

    if let Some(values) = stat.get(root_key).and_then(StatNode::children) {
        for (value, node) in values {
            section.push_str("  ");
            section.push_str(&counter_line(value, node_totals(node), DIM_LABEL_WIDTH));
            for key in cross_keys {
                section.push_str(&cross_tab(node, key));
            }
        }
    }
    section
}

fn cross_tab(node: &StatNode, key: &str) -> String {
    let mut output = String::new();
    if let Some(entries) = node.child(key).and_then(StatNode::children) {
        for (value, sub) in entries {
            output.push_str("  ");
            output.push_str(&counter_line(value, node_totals(sub), CROSS_LABEL_WIDTH));
        }
    }
    output
}

fn footer(advanced: usize) -> String {
    if advanced > 0 {
        format!("\n{advanced} records in payment statistics\n")
    } else {
        "\nNo payment statistics\n".to_string()
    }
}
