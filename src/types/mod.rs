//! Core types for ClickJudge

mod timeline;
mod session;
mod reason;
mod output;

pub use timeline::{Sign, Timeline, TimelineEntry};
pub use session::{Mode, KeyBindings, VideoRef, SessionMetadata, Session, video_id_to_url, truncate_judge_name};
pub use reason::{RecordReason, RecordOutcome, ReplayReason, ReplayOutcome};
pub use output::{AggregateSnapshot, DisplayUpdate};
