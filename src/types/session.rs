//! Session context: mode, metadata and the timeline

use serde::{Deserialize, Serialize};
use crate::{DEFAULT_KEY_NEGATIVE, DEFAULT_KEY_POSITIVE, DEFAULT_VIDEO_ID, JUDGE_NAME_LIMIT};
use crate::types::{Sign, Timeline};

/// What key presses and the replay clock are allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Key presses record new timeline entries
    Scoring,
    /// A recorded timeline is played back against video time
    Playback,
}

impl Mode {
    /// The other mode
    pub fn toggled(&self) -> Mode {
        match self {
            Mode::Scoring => Mode::Playback,
            Mode::Playback => Mode::Scoring,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Scoring => "SCORING",
            Mode::Playback => "PLAYBACK",
        };
        write!(f, "{}", name)
    }
}

/// Keys mapped to +1 and -1 (exact, case-sensitive match)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub positive: String,
    pub negative: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            positive: DEFAULT_KEY_POSITIVE.to_string(),
            negative: DEFAULT_KEY_NEGATIVE.to_string(),
        }
    }
}

impl KeyBindings {
    pub fn new(positive: impl Into<String>, negative: impl Into<String>) -> Self {
        Self {
            positive: positive.into(),
            negative: negative.into(),
        }
    }

    /// Which click a key produces, if any
    pub fn sign_for(&self, key: &str) -> Option<Sign> {
        if key == self.positive {
            Some(Sign::Positive)
        } else if key == self.negative {
            Some(Sign::Negative)
        } else {
            None
        }
    }
}

/// External video reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    /// Platform identifier
    pub id: String,
    /// Canonical playable URL
    pub url: String,
}

impl VideoRef {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }

    /// Reference with the canonical watch URL for `id`
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let url = video_id_to_url(&id);
        Self { id, url }
    }
}

impl Default for VideoRef {
    fn default() -> Self {
        Self::from_id(DEFAULT_VIDEO_ID)
    }
}

/// Canonical watch URL for a video id
pub fn video_id_to_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

/// Cut a judge name down to `JUDGE_NAME_LIMIT` characters
pub fn truncate_judge_name(name: &str) -> String {
    name.chars().take(JUDGE_NAME_LIMIT).collect()
}

/// Session-wide metadata; survives a timeline reset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionMetadata {
    pub video: VideoRef,
    pub judge_name: String,
    pub bindings: KeyBindings,
    /// Share identifier, assigned once the session is exported
    pub share_hash: Option<String>,
}

impl SessionMetadata {
    pub fn new(video: VideoRef, judge_name: &str, bindings: KeyBindings) -> Self {
        Self {
            video,
            judge_name: truncate_judge_name(judge_name),
            bindings,
            share_hash: None,
        }
    }
}

/// The session context passed to every component
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub mode: Mode,
    pub metadata: SessionMetadata,
    pub timeline: Timeline,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionMetadata::default())
    }
}

impl Session {
    /// New session in Scoring mode with an empty timeline
    pub fn new(metadata: SessionMetadata) -> Self {
        Self {
            mode: Mode::Scoring,
            metadata,
            timeline: Timeline::new(),
        }
    }
}
