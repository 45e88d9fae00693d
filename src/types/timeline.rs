//! Timeline: sorted time → accumulated score mapping
//!
//! Entries are kept in a sorted vector and new times are placed with a
//! binary search, so ascending order holds no matter what order clicks
//! arrive in (e.g. the judge seeks backward and keeps clicking).

use serde::{Deserialize, Serialize};

/// Direction of a single click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    /// +1 or -1
    pub fn value(&self) -> i64 {
        match self {
            Sign::Positive => 1,
            Sign::Negative => -1,
        }
    }
}

impl std::fmt::Display for Sign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sign::Positive => write!(f, "+1"),
            Sign::Negative => write!(f, "-1"),
        }
    }
}

/// One point on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Playback position in seconds (>= 0)
    pub time: f64,
    /// Sum of all clicks recorded at `time`
    pub delta: i64,
}

impl TimelineEntry {
    pub fn new(time: f64, delta: i64) -> Self {
        Self { time, delta }
    }
}

/// Ordered record of judge reactions, one entry per distinct time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries that are already strictly ascending by time.
    ///
    /// Panics if the entries are out of order or carry a negative/non-finite
    /// time: callers must validate first (see `core::codec`).
    pub fn from_sorted(entries: Vec<TimelineEntry>) -> Self {
        for entry in &entries {
            assert!(
                entry.time.is_finite() && entry.time >= 0.0,
                "timeline time must be finite and non-negative, got {}",
                entry.time
            );
        }
        for pair in entries.windows(2) {
            assert!(
                pair[0].time < pair[1].time,
                "timeline times must be strictly ascending ({} then {})",
                pair[0].time,
                pair[1].time
            );
        }
        Self { entries }
    }

    /// Add `sign` to the entry at `time`, creating it in sorted position if absent.
    /// Returns the accumulated delta at `time`.
    pub fn upsert(&mut self, time: f64, sign: Sign) -> i64 {
        assert!(
            time.is_finite() && time >= 0.0,
            "click time must be finite and non-negative, got {}",
            time
        );
        // -0.0 + 0.0 == +0.0, so both zeros share one key
        let time = time + 0.0;

        match self.entries.binary_search_by(|e| e.time.total_cmp(&time)) {
            Ok(index) => {
                let entry = &mut self.entries[index];
                entry.delta = entry.delta.saturating_add(sign.value());
                entry.delta
            }
            Err(index) => {
                self.entries.insert(index, TimelineEntry::new(time, sign.value()));
                sign.value()
            }
        }
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Ascending view of all entries
    pub fn as_slice(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter()
    }

    /// First `n` entries, `n` clamped to the timeline size
    pub fn prefix(&self, n: usize) -> &[TimelineEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Number of entries with `time <= t`
    pub fn count_at_or_before(&self, t: f64) -> usize {
        self.entries.partition_point(|e| e.time <= t)
    }

    /// Time of the earliest entry
    pub fn first_time(&self) -> Option<f64> {
        self.entries.first().map(|e| e.time)
    }

    /// Time of the latest entry
    pub fn last_time(&self) -> Option<f64> {
        self.entries.last().map(|e| e.time)
    }

    /// Delta recorded at exactly `time`
    pub fn delta_at(&self, time: f64) -> Option<i64> {
        self.entries
            .binary_search_by(|e| e.time.total_cmp(&(time + 0.0)))
            .ok()
            .map(|i| self.entries[i].delta)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn times(timeline: &Timeline) -> Vec<f64> {
        timeline.iter().map(|e| e.time).collect()
    }

    #[test]
    fn test_upsert_merges_same_time() {
        let mut timeline = Timeline::new();
        assert_eq!(timeline.upsert(2.0, Sign::Positive), 1);
        assert_eq!(timeline.upsert(2.0, Sign::Positive), 2);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.delta_at(2.0), Some(2));
    }

    #[test]
    fn test_upsert_saturates_at_extremes() {
        let mut timeline = Timeline::from_sorted(vec![
            TimelineEntry::new(1.0, i64::MAX),
            TimelineEntry::new(2.0, i64::MIN),
        ]);
        assert_eq!(timeline.upsert(1.0, Sign::Positive), i64::MAX);
        assert_eq!(timeline.upsert(2.0, Sign::Negative), i64::MIN);
    }

    #[test]
    fn test_opposite_clicks_keep_zero_entry() {
        let mut timeline = Timeline::new();
        timeline.upsert(4.25, Sign::Positive);
        timeline.upsert(4.25, Sign::Negative);

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.delta_at(4.25), Some(0));
    }

    #[test]
    fn test_out_of_order_inserts_stay_sorted() {
        let mut timeline = Timeline::new();
        for t in [9.0, 1.5, 7.0, 3.0, 1.5, 12.0, 0.0] {
            timeline.upsert(t, Sign::Negative);
        }
        assert_eq!(times(&timeline), vec![0.0, 1.5, 3.0, 7.0, 9.0, 12.0]);
        assert_eq!(timeline.delta_at(1.5), Some(-2));
    }

    #[test]
    fn test_negative_zero_shares_key_with_zero() {
        let mut timeline = Timeline::new();
        timeline.upsert(0.0, Sign::Positive);
        timeline.upsert(-0.0, Sign::Positive);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.delta_at(0.0), Some(2));
    }

    #[test]
    fn test_prefix_is_clamped() {
        let mut timeline = Timeline::new();
        timeline.upsert(1.0, Sign::Positive);
        timeline.upsert(2.0, Sign::Positive);

        assert_eq!(timeline.prefix(0).len(), 0);
        assert_eq!(timeline.prefix(1).len(), 1);
        assert_eq!(timeline.prefix(50).len(), 2);
    }

    #[test]
    fn test_count_at_or_before() {
        let timeline = Timeline::from_sorted(vec![
            TimelineEntry::new(1.0, 1),
            TimelineEntry::new(2.0, -1),
            TimelineEntry::new(3.5, 1),
        ]);
        assert_eq!(timeline.count_at_or_before(0.5), 0);
        assert_eq!(timeline.count_at_or_before(2.0), 2);
        assert_eq!(timeline.count_at_or_before(100.0), 3);
    }

    #[test]
    fn test_clear_empties() {
        let mut timeline = Timeline::new();
        timeline.upsert(1.0, Sign::Positive);
        timeline.clear();
        assert!(timeline.is_empty());
        assert_eq!(timeline.first_time(), None);
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn test_from_sorted_rejects_duplicates() {
        Timeline::from_sorted(vec![TimelineEntry::new(3.0, 1), TimelineEntry::new(3.0, 1)]);
    }

    #[test]
    #[should_panic(expected = "finite and non-negative")]
    fn test_upsert_rejects_nan() {
        Timeline::new().upsert(f64::NAN, Sign::Positive);
    }
}
