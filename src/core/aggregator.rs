//! Aggregator: running sums and click rates over a timeline prefix
//!
//! Pure functions. The same code serves the live "as of now" display and
//! the "as of replay cursor" display, only the prefix differs.

use crate::types::{AggregateSnapshot, TimelineEntry};

/// Sum positive and negative deltas and measure the time span.
///
/// `entries` must be ascending by time (any `Timeline` view is).
pub fn summarize(entries: &[TimelineEntry]) -> AggregateSnapshot {
    let (positive_sum, negative_sum) = entries.iter().fold((0i64, 0i64), |(pos, neg), e| {
        if e.delta > 0 {
            (pos.saturating_add(e.delta), neg)
        } else {
            (pos, neg.saturating_add(e.delta))
        }
    });

    let total_span = match (entries.first(), entries.last()) {
        (Some(first), Some(last)) if entries.len() > 1 => last.time - first.time,
        _ => 0.0,
    };

    AggregateSnapshot {
        positive_sum,
        negative_sum,
        total_span,
    }
}

/// Clicks per second; 0 when the span is 0 (never NaN or infinite)
pub fn rate(sum: i64, span: f64) -> f64 {
    if !(span.is_finite() && span > 0.0) {
        return 0.0;
    }
    let value = sum as f64 / span;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// "1.25 /s"
pub fn format_rate(sum: i64, span: f64) -> String {
    format!("{:.2} /s", rate(sum, span))
}

// =============================================================================
// TESTS
// =============================================================================
