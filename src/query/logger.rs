/*!
 * Query timing and event logging.
 */

use log::{debug, info};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Context tag prepended to general messages
pub const LOG_CONTEXT: &str = "[Plugins::Polyglot]";

/// Logs the duration of each query and whether it came from the cache
#[derive(Debug, Default)]
pub struct QueryLogger {
    started: Mutex<Option<Instant>>,
    completed: Mutex<usize>,
}

impl QueryLogger {
    /// Create a logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a general message under `context`
    pub fn log(&self, message: &str, context: &str) {
        info!("{} {}", context, message);
    }

    /// Mark the start of a query
    pub fn log_query_start(&self) {
        *self.started.lock() = Some(Instant::now());
    }

    /// Log a finished query with the time since the last start
    pub fn log_query_completion(&self, label: &str, cached: bool) {
        let elapsed = self
            .started
            .lock()
            .take()
            .map(|start| start.elapsed())
            .unwrap_or(Duration::ZERO);
        *self.completed.lock() += 1;

        debug!(
            "{} ({:.3} ms){} {}",
            LOG_CONTEXT,
            elapsed.as_secs_f64() * 1000.0,
            if cached { " [cached]" } else { "" },
            label.split_whitespace().collect::<Vec<_>>().join(" ")
        );
    }

    /// Number of queries logged as completed
    pub fn completed_count(&self) -> usize {
        *self.completed.lock()
    }
}
