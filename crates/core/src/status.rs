//! Metrics sink implementations and metric names.

use crate::AppStatusHandler;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Percentage of the block subround's window spent building and sending the
/// proposed block (leader only).
pub const METRIC_CREATED_PROPOSED_BLOCK: &str = "consensus/created_proposed_block";

/// Percentage of the block subround's window spent processing the received
/// proposed block (validators).
pub const METRIC_PROCESSED_PROPOSED_BLOCK: &str = "consensus/processed_proposed_block";

/// Status handler that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStatusHandler;

impl AppStatusHandler for NoopStatusHandler {
    fn set_u64(&self, _name: &str, _value: u64) {}
}

/// Status handler that keeps the latest value per metric in memory.
///
/// Useful for tests and for nodes that scrape their own gauges.
#[derive(Debug, Default)]
pub struct InMemoryStatusHandler {
    values: Mutex<HashMap<String, u64>>,
}

impl InMemoryStatusHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest recorded value for `name`.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.lock().get(name).copied()
    }
}

impl AppStatusHandler for InMemoryStatusHandler {
    fn set_u64(&self, name: &str, value: u64) {
        self.values.lock().insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_handler_keeps_latest() {
        let handler = InMemoryStatusHandler::new();
        assert_eq!(handler.get(METRIC_CREATED_PROPOSED_BLOCK), None);

        handler.set_u64(METRIC_CREATED_PROPOSED_BLOCK, 40);
        handler.set_u64(METRIC_CREATED_PROPOSED_BLOCK, 75);
        assert_eq!(handler.get(METRIC_CREATED_PROPOSED_BLOCK), Some(75));
    }
}
