//! Data models for the statistics accumulator.
//!
//! This module contains the core data structures shared by the normalizer,
//! the aggregation engine, and the report renderer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::stat::tree::StatTree;

/// Dimension key used when a field is absent from the order.
///
/// Unknown data is bucketed under an explicit category instead of being
/// dropped, so a run over partially-filled orders still accounts for every
/// record.
pub const UNDEFINED_KEY: &str = "undefined";

/// Outcome of one converted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The order was converted successfully.
    Ok,
    /// The conversion was attempted and failed.
    Fail,
}

impl Outcome {
    /// Counter name used for this outcome inside the stat tree.
    pub fn key(&self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Fail => "fail",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The fields the aggregation engine needs from one raw order.
///
/// Produced by the normalizer from either input shape; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    /// External identifier of the listing, when the order carries one.
    pub external_id: Option<String>,
    /// Operation type (`create`, `update`, ...).
    pub operation: Option<String>,
    /// Estate type (`house`, `flat`, ...).
    pub estate_type: Option<String>,
    /// Object type (`sale`, `rent`, ...).
    pub object_type: Option<String>,
    /// Number of photo attachments.
    pub photo_count: usize,
    /// Opaque payment/billing payload, collected only on success.
    pub advanced: Option<Value>,
}

impl NormalizedRecord {
    pub fn operation_key(&self) -> &str {
        dimension_key(&self.operation)
    }

    pub fn estate_key(&self) -> &str {
        dimension_key(&self.estate_type)
    }

    pub fn object_key(&self) -> &str {
        dimension_key(&self.object_type)
    }
}

/// Stringifies a dimension value for use as a counter key.
pub fn dimension_key(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNDEFINED_KEY)
}

/// Full accumulator state, suitable for external persistence.
///
/// The caller decides where a snapshot lives (file, database, message bus);
/// restoring one through `unserialize` trusts its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The nested counter tree.
    pub stat: StatTree,
    /// When the run started.
    pub start_tm: DateTime<Utc>,
    /// Task name of the run.
    pub task: String,
    /// Run identifier.
    pub id: String,
    /// Collected payment statistics payloads.
    pub advstat: Vec<Value>,
    /// Opaque settings carried through from construction.
    pub settings: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_keys() {
        assert_eq!(Outcome::Ok.key(), "ok");
        assert_eq!(Outcome::Fail.key(), "fail");
        assert_eq!(Outcome::Fail.to_string(), "fail");
    }

    #[test]
    fn test_dimension_key_fallback() {
        assert_eq!(dimension_key(&Some("house".to_string())), "house");
        assert_eq!(dimension_key(&None), "undefined");
    }

    #[test]
    fn test_record_keys() {
        let record = NormalizedRecord {
            operation: Some("create".to_string()),
            ..Default::default()
        };
        assert_eq!(record.operation_key(), "create");
        assert_eq!(record.estate_key(), "undefined");
        assert_eq!(record.object_key(), "undefined");
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let snapshot = Snapshot {
            stat: StatTree::new(),
            start_tm: Utc::now(),
            task: "conversion".to_string(),
            id: "run-1".to_string(),
            advstat: vec![serde_json::json!({"price": 100})],
            settings: Value::Null,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }
}
