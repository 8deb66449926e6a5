//! The per-run statistics accumulator.
//!
//! One accumulator per conversion run. The pipeline calls [`Accumulator::ok`]
//! or [`Accumulator::fail`] once per processed order; at the end of the run
//! the state can be serialized for persistence or rendered as a text report.
//! Accumulators own their state exclusively: workers processing orders in
//! parallel must each hold their own.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::error::{LogObserver, RecordError, SkipObserver};
use crate::models::{NormalizedRecord, Outcome, Snapshot};
use crate::order::{normalizer, OrderInput};
use crate::report;
use crate::stat::tree::StatTree;

pub struct Accumulator {
    task: String,
    id: String,
    settings: Value,
    start_tm: DateTime<Utc>,
    stat: StatTree,
    advstat: Vec<Value>,
    observer: Box<dyn SkipObserver>,
}

impl Accumulator {
    /// A fresh accumulator with zeroed counters and `start_tm` of now.
    ///
    /// `settings` is opaque: it travels through snapshots untouched.
    pub fn new(task: impl Into<String>, id: impl Into<String>, settings: Value) -> Self {
        Self::with_observer(task, id, settings, Box::new(LogObserver))
    }

    /// Same as [`Accumulator::new`] with a custom skip observer.
    pub fn with_observer(
        task: impl Into<String>,
        id: impl Into<String>,
        settings: Value,
        observer: Box<dyn SkipObserver>,
    ) -> Self {
        Self {
            task: task.into(),
            id: id.into(),
            settings,
            start_tm: Utc::now(),
            stat: StatTree::new(),
            advstat: Vec::new(),
            observer,
        }
    }

    /// Records a successfully converted order. No-op on `None` or an empty
    /// input.
    pub fn ok(&mut self, order: Option<OrderInput>) {
        self.record(order, Outcome::Ok);
    }

    /// Records a failed conversion. No-op on `None` or an empty input.
    pub fn fail(&mut self, order: Option<OrderInput>) {
        self.record(order, Outcome::Fail);
    }

    fn record(&mut self, order: Option<OrderInput>, outcome: Outcome) {
        let order = match order {
            Some(order) => order,
            None => return,
        };
        if order.is_empty() {
            return;
        }
        match normalizer::normalize(&order) {
            Ok(record) => self.apply(&record, outcome),
            // a malformed order contributes nothing, not even to the total
            Err(error) => self.observer.order_skipped(&error),
        }
    }

    fn apply(&mut self, record: &NormalizedRecord, outcome: Outcome) {
        let opr = record.operation_key();
        let etype = record.estate_key();
        let otype = record.object_key();
        let suffix = Some(outcome);

        self.stat.increment("total", 1, None);
        self.stat.increment(outcome.key(), 1, None);

        self.stat.increment(&format!("by_op.{opr}"), 1, suffix);
        self.stat.increment(&format!("by_etype.{etype}"), 1, suffix);
        self.stat.increment(&format!("by_otype.{otype}"), 1, suffix);

        self.stat
            .increment(&format!("by_op.{opr}.by_etype.{etype}"), 1, suffix);
        self.stat
            .increment(&format!("by_otype.{otype}.by_etype.{etype}"), 1, suffix);

        self.stat
            .increment(&format!("by_etype.{etype}.by_op.{opr}"), 1, suffix);
        self.stat
            .increment(&format!("by_otype.{otype}.by_op.{opr}"), 1, suffix);

        self.stat
            .increment(&format!("by_op.{opr}.by_otype.{otype}"), 1, suffix);
        self.stat
            .increment(&format!("by_etype.{etype}.by_otype.{otype}"), 1, suffix);

        self.stat
            .increment("photos.total", record.photo_count as i64, None);
        if record.photo_count == 0 {
            self.stat.increment("photos.zero", 1, None);
        } else {
            self.stat.increment("photos.exist", 1, None);
        }

        // payment statistics only count converted objects
        if let (Some(advanced), Outcome::Ok) = (&record.advanced, outcome) {
            self.advstat.push(advanced.clone());
        }

        debug!(
            external_id = record.external_id.as_deref().unwrap_or("-"),
            %outcome,
            "order recorded"
        );
    }

    /// Captures full state for external persistence.
    pub fn serialize(&self) -> Snapshot {
        Snapshot {
            stat: self.stat.clone(),
            start_tm: self.start_tm,
            task: self.task.clone(),
            id: self.id.clone(),
            advstat: self.advstat.clone(),
            settings: self.settings.clone(),
        }
    }

    /// Replaces all state from a previously captured snapshot.
    pub fn unserialize(&mut self, snapshot: Snapshot) {
        self.stat = snapshot.stat;
        self.start_tm = snapshot.start_tm;
        self.task = snapshot.task;
        self.id = snapshot.id;
        self.advstat = snapshot.advstat;
        self.settings = snapshot.settings;
    }

    /// Number of collected payment statistics entries.
    pub fn len(&self) -> usize {
        self.advstat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advstat.is_empty()
    }

    /// The collected payment statistics payloads.
    pub fn advanced_stats(&self) -> &[Value] {
        &self.advstat
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn settings(&self) -> &Value {
        &self.settings
    }

    pub fn start_tm(&self) -> DateTime<Utc> {
        self.start_tm
    }

    pub fn stat(&self) -> &StatTree {
        &self.stat
    }

    /// The formatted text report.
    pub fn render(&self) -> String {
        report::render_report(self)
    }
}

impl fmt::Display for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
