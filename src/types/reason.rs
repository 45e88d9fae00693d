//! Reason codes for recorder and replayer decisions
//!
//! R1xx: recording, R2xx: replay

use serde::{Deserialize, Serialize};
use crate::types::TimelineEntry;

/// Why a key press or click did (or did not) touch the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum RecordReason {
    /// Click added to the timeline
    R101_CLICK_RECORDED,
    /// Session is not in Scoring mode
    R102_IGNORED_NOT_SCORING,
    /// Video transport not ready
    R103_IGNORED_TRANSPORT_NOT_READY,
    /// Video duration unknown or not positive
    R104_IGNORED_NO_DURATION,
    /// Key matches neither binding
    R105_IGNORED_UNBOUND_KEY,
    /// Playback position unreadable or negative
    R106_IGNORED_INVALID_POSITION,
    /// No key listener attached
    R107_IGNORED_NO_LISTENER,
}

impl RecordReason {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R101_CLICK_RECORDED => "R101_CLICK_RECORDED",
            Self::R102_IGNORED_NOT_SCORING => "R102_IGNORED_NOT_SCORING",
            Self::R103_IGNORED_TRANSPORT_NOT_READY => "R103_IGNORED_TRANSPORT_NOT_READY",
            Self::R104_IGNORED_NO_DURATION => "R104_IGNORED_NO_DURATION",
            Self::R105_IGNORED_UNBOUND_KEY => "R105_IGNORED_UNBOUND_KEY",
            Self::R106_IGNORED_INVALID_POSITION => "R106_IGNORED_INVALID_POSITION",
            Self::R107_IGNORED_NO_LISTENER => "R107_IGNORED_NO_LISTENER",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R101_CLICK_RECORDED => "Click recorded",
            Self::R102_IGNORED_NOT_SCORING => "Not in scoring mode",
            Self::R103_IGNORED_TRANSPORT_NOT_READY => "Video not ready",
            Self::R104_IGNORED_NO_DURATION => "Video duration unknown",
            Self::R105_IGNORED_UNBOUND_KEY => "Key not bound",
            Self::R106_IGNORED_INVALID_POSITION => "Playback position unavailable",
            Self::R107_IGNORED_NO_LISTENER => "Key listener detached",
        }
    }
}

impl std::fmt::Display for RecordReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Result of one key press / click
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordOutcome {
    pub reason: RecordReason,
    /// Entry state after the click, when one was recorded
    pub entry: Option<TimelineEntry>,
}

impl RecordOutcome {
    pub fn recorded(entry: TimelineEntry) -> Self {
        Self {
            reason: RecordReason::R101_CLICK_RECORDED,
            entry: Some(entry),
        }
    }

    pub fn ignored(reason: RecordReason) -> Self {
        Self { reason, entry: None }
    }

    pub fn is_recorded(&self) -> bool {
        self.entry.is_some()
    }
}

/// Replay state machine decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReplayReason {
    /// Idle → Running
    R201_REPLAY_STARTED,
    /// Tick moved (or confirmed) the cursor
    R202_CURSOR_UPDATED,
    /// Running → Idle
    R203_REPLAY_STOPPED,
    /// Session is not in Playback mode
    R204_NOT_PLAYBACK,
    /// Nothing recorded to replay
    R205_TIMELINE_EMPTY,
    /// Video transport not ready
    R206_TRANSPORT_NOT_READY,
    /// Position read failed, tick skipped
    R207_TICK_SKIPPED,
    /// Too many consecutive transport failures, forced to Idle
    R208_TRANSPORT_FAILED,
    /// Tick from a cancelled or foreign timer
    R209_STALE_TICK,
    /// Stop requested while already Idle
    R210_ALREADY_IDLE,
    /// Start requested while already Running
    R211_ALREADY_RUNNING,
}

impl ReplayReason {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R201_REPLAY_STARTED => "R201_REPLAY_STARTED",
            Self::R202_CURSOR_UPDATED => "R202_CURSOR_UPDATED",
            Self::R203_REPLAY_STOPPED => "R203_REPLAY_STOPPED",
            Self::R204_NOT_PLAYBACK => "R204_NOT_PLAYBACK",
            Self::R205_TIMELINE_EMPTY => "R205_TIMELINE_EMPTY",
            Self::R206_TRANSPORT_NOT_READY => "R206_TRANSPORT_NOT_READY",
            Self::R207_TICK_SKIPPED => "R207_TICK_SKIPPED",
            Self::R208_TRANSPORT_FAILED => "R208_TRANSPORT_FAILED",
            Self::R209_STALE_TICK => "R209_STALE_TICK",
            Self::R210_ALREADY_IDLE => "R210_ALREADY_IDLE",
            Self::R211_ALREADY_RUNNING => "R211_ALREADY_RUNNING",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R201_REPLAY_STARTED => "Replay started",
            Self::R202_CURSOR_UPDATED => "Cursor updated",
            Self::R203_REPLAY_STOPPED => "Replay stopped",
            Self::R204_NOT_PLAYBACK => "Not in playback mode",
            Self::R205_TIMELINE_EMPTY => "Nothing to replay",
            Self::R206_TRANSPORT_NOT_READY => "Video not ready",
            Self::R207_TICK_SKIPPED => "Position unavailable, tick skipped",
            Self::R208_TRANSPORT_FAILED => "Video kept failing, replay stopped",
            Self::R209_STALE_TICK => "Late tick ignored",
            Self::R210_ALREADY_IDLE => "Replay already idle",
            Self::R211_ALREADY_RUNNING => "Replay already running",
        }
    }
}

impl std::fmt::Display for ReplayReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

/// Result of a replay transition or tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub reason: ReplayReason,
    /// Cursor after the call; `None` means not replaying
    pub cursor: Option<usize>,
}

impl ReplayOutcome {
    pub fn new(reason: ReplayReason, cursor: Option<usize>) -> Self {
        Self { reason, cursor }
    }

    pub fn idle(reason: ReplayReason) -> Self {
        Self { reason, cursor: None }
    }
}
