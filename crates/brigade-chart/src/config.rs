//! Chart service configuration.

use brigade_core::hierarchy::DEFAULT_MAX_DEPTH;

#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Longest parent chain accepted when a chart is loaded.
    pub max_depth: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
