//! Line coverage table
//!
//! Process-wide record of which source lines hold executable code. Lowerings
//! of unrelated units write to it concurrently; marking a line is idempotent
//! and order-independent.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use std::sync::Arc;

static GLOBAL: Lazy<Arc<CoverageManager>> = Lazy::new(|| Arc::new(CoverageManager::new()));

/// Lines with code, keyed by source name
#[derive(Debug, Default)]
pub struct CoverageManager {
    lines: DashMap<String, FxHashSet<u32>>,
}

impl CoverageManager {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide table
    pub fn global() -> Arc<CoverageManager> {
        GLOBAL.clone()
    }

    /// Record that `line` of `source` has executable code
    pub fn set_line_has_code(&self, source: &str, line: u32) {
        self.lines.entry(source.to_string()).or_default().insert(line);
    }

    /// Whether `line` of `source` was recorded
    pub fn line_has_code(&self, source: &str, line: u32) -> bool {
        self.lines
            .get(source)
            .map(|lines| lines.contains(&line))
            .unwrap_or(false)
    }

    /// Recorded lines of `source`, sorted
    pub fn lines_with_code(&self, source: &str) -> Vec<u32> {
        let mut lines: Vec<u32> = self
            .lines
            .get(source)
            .map(|lines| lines.iter().copied().collect())
            .unwrap_or_default();
        lines.sort_unstable();
        lines
    }

    /// Forget everything recorded for `source`
    pub fn reset(&self, source: &str) {
        self.lines.remove(source);
    }
}
