//! Error types for record processing.
//!
//! Malformed orders are never fatal to a run: the accumulator skips them and
//! reports the reason to an injected [`SkipObserver`]. The default observer
//! logs through `tracing`.

use thiserror::Error;
use tracing::warn;

/// Why an individual order was skipped.
///
/// Skipped orders contribute nothing to the run's counters, not even to the
/// total. There is no retry: a skipped record is permanently excluded.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The order arrived as text but is not well-formed XML.
    #[error("XML parsing error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The document parsed, but its root element is not `<order>`.
    #[error("unexpected root element `{0}`, expected `order`")]
    UnexpectedRoot(String),

    /// The order is neither a string nor an object.
    #[error("order is neither a string nor an object")]
    InvalidInput,
}

/// Receives a diagnostic event for every skipped order.
pub trait SkipObserver: Send {
    fn order_skipped(&self, error: &RecordError);
}

/// Default observer: logs skipped orders as warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SkipObserver for LogObserver {
    fn order_skipped(&self, error: &RecordError) {
        warn!("order skipped: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RecordError::UnexpectedRoot("listing".to_string());
        assert_eq!(
            err.to_string(),
            "unexpected root element `listing`, expected `order`"
        );

        let err = RecordError::InvalidInput;
        assert_eq!(err.to_string(), "order is neither a string nor an object");
    }
}
