use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The three distinct dependency-buffer knobs named in the design notes —
/// kept as separate fields on purpose, never merged into one constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferMinutes {
    /// Buffer applied by the Step 3 slotter when computing `earliestStart`.
    pub slot: u32,
    /// Buffer applied by the Step 3 safe-slot fallback retry.
    pub safe_slot: u32,
    /// Buffer applied by the resolver's `applyConstraints` scheduling update.
    pub resolver: u32,
}

impl Default for BufferMinutes {
    fn default() -> Self {
        BufferMinutes {
            slot: 5,
            safe_slot: 10,
            resolver: 15,
        }
    }
}

/// Half-open `[start, end)` interval in minutes-of-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteInterval {
    pub start: u32,
    pub end: u32,
}

impl MinuteInterval {
    pub fn new(start: u32, end: u32) -> Self {
        MinuteInterval { start, end }
    }

    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start && minute < self.end
    }
}

/// Typed replacement for the source's dynamic "options" object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    pub buffer_minutes: BufferMinutes,
    pub slot_granularity_minutes: u32,
    pub windows: HashMap<String, MinuteInterval>,
    pub max_suggestions: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let mut windows = HashMap::new();
        windows.insert("morning".to_string(), MinuteInterval::new(6 * 60, 12 * 60));
        windows.insert("afternoon".to_string(), MinuteInterval::new(12 * 60, 18 * 60));
        windows.insert("evening".to_string(), MinuteInterval::new(18 * 60, 23 * 60));
        windows.insert("anytime".to_string(), MinuteInterval::new(0, 24 * 60));

        PlannerConfig {
            buffer_minutes: BufferMinutes::default(),
            slot_granularity_minutes: 15,
            windows,
            max_suggestions: 5,
        }
    }
}

impl PlannerConfig {
    pub fn window(&self, name: &str) -> MinuteInterval {
        self.windows
            .get(name)
            .copied()
            .unwrap_or_else(|| MinuteInterval::new(0, 24 * 60))
    }
}
