//! Transfer codec: session ⇄ portable document
//!
//! Document shape (one JSON object per recording):
//! `{ videoId, videoUrl, judgeName, hash, entries: [[time, delta], ...] }`
//!
//! Every import path (local file, share server, remote lookup) goes through
//! `decode_value`, so validation is identical everywhere.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::ValidationError;
use crate::types::{Session, Timeline, TimelineEntry, VideoRef};
use crate::{JUDGE_NAME_LIMIT, MAX_ENTRY_DELTA, SHARE_HASH_BYTES};

lazy_static! {
    /// Bare 11-character video id
    static ref RE_VIDEO_ID: Regex = Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap();

    /// Id inside a watch, short, embed or shorts URL
    static ref RE_VIDEO_URL: Regex = Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:.*&)?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})"
    ).unwrap();
}

/// Portable form of a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub video_id: String,
    pub video_url: String,
    #[serde(default)]
    pub judge_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// `[time, delta]` pairs, ascending by time, unique times
    pub entries: Vec<(f64, i64)>,
}

/// Validated document content, ready to replace a session's state
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSession {
    pub video: VideoRef,
    pub judge_name: String,
    pub share_hash: Option<String>,
    pub timeline: Timeline,
}

impl ImportedSession {
    /// Back to document form
    pub fn to_document(&self) -> Document {
        Document {
            video_id: self.video.id.clone(),
            video_url: self.video.url.clone(),
            judge_name: self.judge_name.clone(),
            hash: self.share_hash.clone(),
            entries: self.timeline.iter().map(|e| (e.time, e.delta)).collect(),
        }
    }
}

/// Snapshot a session as a document
pub fn serialize(session: &Session) -> Document {
    let meta = &session.metadata;
    Document {
        video_id: meta.video.id.clone(),
        video_url: meta.video.url.clone(),
        judge_name: meta.judge_name.clone(),
        hash: meta.share_hash.clone(),
        entries: session.timeline.iter().map(|e| (e.time, e.delta)).collect(),
    }
}

/// Parse and validate a JSON document
pub fn decode_str(json: &str) -> Result<ImportedSession, ValidationError> {
    let value: Value = serde_json::from_str(json).map_err(|e| ValidationError::InvalidJson {
        message: e.to_string(),
    })?;
    decode_value(&value)
}

/// Validate a JSON value as a document.
///
/// Rejects: missing/empty `videoId` or `videoUrl`, `entries` that are not
/// `[number, number]` pairs, negative or non-finite times, non-integer deltas,
/// deltas beyond `MAX_ENTRY_DELTA`, and times that are not strictly increasing. Duplicates are never merged here.
pub fn decode_value(value: &Value) -> Result<ImportedSession, ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

    let video_id = required_string(object, "videoId")?;
    let video_url = required_string(object, "videoUrl")?;
    let judge_name = optional_string(object, "judgeName")?.unwrap_or_default();
    let judge_len = judge_name.chars().count();
    if judge_len > JUDGE_NAME_LIMIT {
        return Err(ValidationError::JudgeNameTooLong {
            len: judge_len,
            limit: JUDGE_NAME_LIMIT,
        });
    }
    let share_hash = optional_string(object, "hash")?.filter(|h| !h.is_empty());

    let raw_entries = object
        .get("entries")
        .and_then(Value::as_array)
        .ok_or(ValidationError::EntriesNotArray)?;

    let mut entries = Vec::with_capacity(raw_entries.len());
    let mut previous: Option<f64> = None;
    for (index, raw) in raw_entries.iter().enumerate() {
        let (time, delta) = parse_entry(index, raw)?;
        if let Some(prev) = previous {
            if time <= prev {
                return Err(ValidationError::TimesNotIncreasing {
                    index,
                    previous: prev,
                    time,
                });
            }
        }
        previous = Some(time);
        entries.push(TimelineEntry::new(time, delta));
    }

    Ok(ImportedSession {
        video: VideoRef::new(video_id, video_url),
        judge_name,
        share_hash,
        timeline: Timeline::from_sorted(entries),
    })
}

fn required_string(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match optional_string(object, field)? {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(ValidationError::MissingField { field }),
    }
}

fn optional_string(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::NotAString { field }),
    }
}

fn parse_entry(index: usize, raw: &Value) -> Result<(f64, i64), ValidationError> {
    let pair = match raw.as_array() {
        Some(pair) if pair.len() == 2 => pair,
        _ => return Err(ValidationError::MalformedEntry { index }),
    };
    let (Some(time), Some(delta)) = (pair[0].as_f64(), pair[1].as_f64()) else {
        return Err(ValidationError::MalformedEntry { index });
    };

    if !time.is_finite() {
        return Err(ValidationError::NonFiniteTime { index });
    }
    if time < 0.0 {
        return Err(ValidationError::NegativeTime { index, time });
    }
    if delta.fract() != 0.0 {
        return Err(ValidationError::NonIntegralDelta { index, delta });
    }
    if delta.abs() > MAX_ENTRY_DELTA as f64 {
        return Err(ValidationError::DeltaOutOfRange {
            index,
            delta,
            limit: MAX_ENTRY_DELTA,
        });
    }
    // In range, so the float form is exact
    let delta = pair[1].as_i64().unwrap_or(delta as i64);
    // -0.0 and 0.0 must be the same key
    Ok((time + 0.0, delta))
}

/// Stable share identifier: hex of the first bytes of SHA-256 over the
/// document without its own hash field
pub fn share_hash(document: &Document) -> String {
    let mut unhashed = document.clone();
    unhashed.hash = None;
    // Serializing plain strings/numbers cannot fail
    let bytes = serde_json::to_vec(&unhashed).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    digest[..SHARE_HASH_BYTES]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// True for strings `share_hash` can produce
pub fn is_share_hash(candidate: &str) -> bool {
    candidate.len() == SHARE_HASH_BYTES * 2
        && candidate.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

/// Extract a video id from a bare id or a video URL
pub fn parse_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if RE_VIDEO_ID.is_match(input) {
        return Some(input.to_string());
    }
    RE_VIDEO_URL
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// =============================================================================
// TESTS
// =============================================================================
