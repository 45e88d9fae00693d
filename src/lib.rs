//! ClickJudge: time-indexed reaction timeline engine
//!
//! A judge presses +1/-1 keys while a video plays. Clicks are recorded against
//! playback time, summed into running scores, replayed in sync with the same
//! video, and exported as a portable JSON document.

pub mod core;
pub mod error;
pub mod types;

// =============================================================================
// REPLAY CLOCK
// =============================================================================

/// Replay tick interval (milliseconds), independent of video frame rate
pub const REPLAY_TICK_MS: u64 = 100;

/// Seconds of pre-roll before the first recorded click when replay starts
pub const REPLAY_PREROLL_SECS: f64 = 5.0;

/// Consecutive failed position reads before replay is forced back to Idle
pub const MAX_TRANSPORT_FAILURES: u32 = 3;

// =============================================================================
// SESSION DEFAULTS
// =============================================================================

/// Maximum judge name length (characters)
pub const JUDGE_NAME_LIMIT: usize = 32;

/// Default key for a +1 click
pub const DEFAULT_KEY_POSITIVE: &str = "a";

/// Default key for a -1 click
pub const DEFAULT_KEY_NEGATIVE: &str = "s";

/// Video loaded by a fresh session
pub const DEFAULT_VIDEO_ID: &str = "Hnn_-y59a84";

/// Largest absolute delta a single imported entry may carry
pub const MAX_ENTRY_DELTA: i64 = 1_000_000;

/// Bytes of the SHA-256 digest kept in a share identifier
pub const SHARE_HASH_BYTES: usize = 12;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
