//! Recorder: key press + playback position → timeline click
//!
//! A Recorder carries the bindings it was attached with. Re-binding keys
//! replaces the attached Recorder (see `SessionController`), so one key
//! press always reaches exactly one Recorder.

use tracing::debug;

use crate::core::transport::{read_duration, read_position, VideoTransport};
use crate::types::{
    KeyBindings, Mode, RecordOutcome, RecordReason, Session, Sign, TimelineEntry,
};

/// Turns key presses into timeline mutations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorder {
    bindings: KeyBindings,
}

impl Recorder {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Record a click for `key` if it is bound and the session can score
    pub fn handle_key_press<T: VideoTransport + ?Sized>(
        &self,
        session: &mut Session,
        transport: &mut T,
        key: &str,
    ) -> RecordOutcome {
        if session.mode != Mode::Scoring {
            return RecordOutcome::ignored(RecordReason::R102_IGNORED_NOT_SCORING);
        }
        match self.bindings.sign_for(key) {
            Some(sign) => self.record(session, transport, sign),
            None => RecordOutcome::ignored(RecordReason::R105_IGNORED_UNBOUND_KEY),
        }
    }

    /// Record a click at the current playback position (on-screen buttons)
    pub fn record<T: VideoTransport + ?Sized>(
        &self,
        session: &mut Session,
        transport: &mut T,
        sign: Sign,
    ) -> RecordOutcome {
        if session.mode != Mode::Scoring {
            return RecordOutcome::ignored(RecordReason::R102_IGNORED_NOT_SCORING);
        }
        if !transport.is_ready() {
            return RecordOutcome::ignored(RecordReason::R103_IGNORED_TRANSPORT_NOT_READY);
        }
        if read_duration(transport).is_none() {
            return RecordOutcome::ignored(RecordReason::R104_IGNORED_NO_DURATION);
        }
        let Some(time) = read_position(transport) else {
            return RecordOutcome::ignored(RecordReason::R106_IGNORED_INVALID_POSITION);
        };

        let delta = session.timeline.upsert(time, sign);
        transport.return_focus();

        debug!(time, %sign, delta, "click recorded");
        RecordOutcome::recorded(TimelineEntry::new(time, delta))
    }
}

// =============================================================================
// TESTS
// =============================================================================
