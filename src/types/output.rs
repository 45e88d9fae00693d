//! Aggregate and display structures

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use crate::types::Mode;

/// Running sums over a timeline prefix; always recomputed, never stored
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    /// Sum of positive deltas
    pub positive_sum: i64,
    /// Sum of negative deltas (<= 0)
    pub negative_sum: i64,
    /// Seconds between first and last entry
    pub total_span: f64,
}

impl AggregateSnapshot {
    /// Net score
    pub fn total(&self) -> i64 {
        self.positive_sum.saturating_add(self.negative_sum)
    }
}

/// What the display layer shows after each session event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayUpdate {
    pub timestamp: DateTime<Utc>,
    pub mode: Mode,
    /// Replay cursor, `None` when not replaying
    pub cursor: Option<usize>,
    /// Entries in the full timeline
    pub entry_count: usize,
    /// Sums over the displayed prefix
    pub summary: AggregateSnapshot,
}

impl DisplayUpdate {
    pub fn new(
        mode: Mode,
        cursor: Option<usize>,
        entry_count: usize,
        summary: AggregateSnapshot,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            mode,
            cursor,
            entry_count,
            summary,
        }
    }

    fn progress(&self) -> String {
        match self.cursor {
            Some(cursor) => format!("{}/{}", cursor, self.entry_count),
            None => format!("{}", self.entry_count),
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let s = &self.summary;
        let total = s.total();
        let total_str = format!("{} {}", if total >= 0 { "+" } else { "-" }, total.unsigned_abs());
        format!(
            "[{}] {} {} {} | entries={}",
            self.mode.to_string().as_str().bold(),
            format!("- {}", s.negative_sum.unsigned_abs()).as_str().red(),
            total_str.as_str().bright_black(),
            format!("+ {}", s.positive_sum).as_str().green(),
            self.progress(),
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let s = &self.summary;
        format!(
            "mode={} | positive={} | negative={} | total={} | span={:.2}s | entries={}",
            self.mode,
            s.positive_sum,
            s.negative_sum,
            s.total(),
            s.total_span,
            self.progress(),
        )
    }
}
