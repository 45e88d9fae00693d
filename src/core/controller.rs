//! Session controller: owns the session and switches between modes
//!
//! Single active mutator: in Scoring mode the attached Recorder is the only
//! writer; in Playback mode no Recorder is attached and the Replayer only
//! reads. Every mode switch quiesces the old mode (detach listener / cancel
//! timer) before the new mode starts.

use tracing::{info, warn};

use crate::core::aggregator::summarize;
use crate::core::codec::{self, Document, ImportedSession};
use crate::core::recorder::Recorder;
use crate::core::replayer::{ReplayState, Replayer};
use crate::core::scheduler::{Scheduler, TimerId};
use crate::core::transport::VideoTransport;
use crate::types::{
    truncate_judge_name, DisplayUpdate, KeyBindings, Mode, RecordOutcome, RecordReason,
    ReplayOutcome, Session, Sign,
};

/// Session context plus the components acting on it
#[derive(Debug)]
pub struct SessionController<T, S> {
    session: Session,
    transport: T,
    scheduler: S,
    /// Attached key listener; `None` outside Scoring mode
    listener: Option<Recorder>,
    replayer: Replayer,
}

impl<T: VideoTransport, S: Scheduler> SessionController<T, S> {
    pub fn new(session: Session, transport: T, scheduler: S) -> Self {
        let mut controller = Self {
            session,
            transport,
            scheduler,
            listener: None,
            replayer: Replayer::new(),
        };
        if controller.session.mode == Mode::Scoring {
            controller.attach_listener();
        }
        controller
    }

    pub fn with_replayer(mut self, replayer: Replayer) -> Self {
        self.replayer = replayer;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn replay_state(&self) -> ReplayState {
        self.replayer.state()
    }

    pub fn replay_cursor(&self) -> Option<usize> {
        self.replayer.cursor()
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Attach (or re-attach) the key listener with the current bindings.
    /// Replaces any previous listener, so presses are never handled twice.
    fn attach_listener(&mut self) {
        self.listener = Some(Recorder::new(self.session.metadata.bindings.clone()));
    }

    fn detach_listener(&mut self) {
        self.listener = None;
    }

    /// Route a key press to the attached listener
    pub fn handle_key(&mut self, key: &str) -> RecordOutcome {
        match &self.listener {
            Some(recorder) => recorder.handle_key_press(&mut self.session, &mut self.transport, key),
            None => RecordOutcome::ignored(RecordReason::R107_IGNORED_NO_LISTENER),
        }
    }

    /// On-screen +1/-1 button
    pub fn click(&mut self, sign: Sign) -> RecordOutcome {
        match &self.listener {
            Some(recorder) => recorder.record(&mut self.session, &mut self.transport, sign),
            None => RecordOutcome::ignored(RecordReason::R102_IGNORED_NOT_SCORING),
        }
    }

    /// Change key bindings; the listener is re-registered if attached
    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.session.metadata.bindings = bindings;
        if self.listener.is_some() {
            self.attach_listener();
        }
    }

    /// Judge name can only change while scoring
    pub fn set_judge_name(&mut self, name: &str) -> bool {
        if self.session.mode != Mode::Scoring {
            return false;
        }
        self.session.metadata.judge_name = truncate_judge_name(name);
        true
    }

    /// Switch mode. Returns the replay transition it caused, if any.
    pub fn set_mode(&mut self, mode: Mode) -> Option<ReplayOutcome> {
        if mode == self.session.mode {
            return None;
        }
        info!(from = %self.session.mode, to = %mode, "mode change");
        match mode {
            Mode::Playback => {
                self.detach_listener();
                self.session.mode = Mode::Playback;
                Some(self.replayer.start(&self.session, &mut self.transport, &mut self.scheduler))
            }
            Mode::Scoring => {
                let outcome = self.replayer.stop(&mut self.transport, &mut self.scheduler);
                self.session.mode = Mode::Scoring;
                self.attach_listener();
                Some(outcome)
            }
        }
    }

    pub fn toggle_mode(&mut self) -> Option<ReplayOutcome> {
        self.set_mode(self.session.mode.toggled())
    }

    /// Replay timer fired
    pub fn on_tick(&mut self, timer: TimerId) -> ReplayOutcome {
        let outcome = self
            .replayer
            .tick(timer, &self.session, &mut self.transport, &mut self.scheduler);
        self.scheduler.acknowledge(timer);
        outcome
    }

    /// Transport became ready (video loaded); resumes replay in Playback mode
    pub fn on_transport_ready(&mut self) -> Option<ReplayOutcome> {
        if self.session.mode != Mode::Playback || self.replayer.state() == ReplayState::Running {
            return None;
        }
        Some(self.replayer.start(&self.session, &mut self.transport, &mut self.scheduler))
    }

    /// Transport went away
    pub fn on_transport_lost(&mut self) -> ReplayOutcome {
        self.replayer.stop(&mut self.transport, &mut self.scheduler)
    }

    /// Clear the timeline; metadata is kept
    pub fn reset(&mut self) {
        self.replayer.stop(&mut self.transport, &mut self.scheduler);
        self.session.timeline.clear();
        info!("timeline reset");
    }

    /// Replace timeline and metadata wholesale with a validated document,
    /// then ask the transport to load the referenced video
    pub fn import(&mut self, imported: ImportedSession) {
        self.replayer.stop(&mut self.transport, &mut self.scheduler);

        let ImportedSession {
            video,
            judge_name,
            share_hash,
            timeline,
        } = imported;
        info!(video = %video.id, entries = timeline.len(), "recording imported");

        self.session.timeline = timeline;
        self.session.metadata.judge_name = judge_name;
        self.session.metadata.share_hash = share_hash;
        self.session.metadata.video = video;

        if let Err(e) = self.transport.load(&self.session.metadata.video) {
            warn!(error = %e, "video load failed after import");
        }
    }

    /// Export the session as a document
    pub fn document(&self) -> Document {
        codec::serialize(&self.session)
    }

    /// Remember the share identifier assigned on export
    pub fn set_share_hash(&mut self, hash: String) {
        self.session.metadata.share_hash = Some(hash);
    }

    /// Current display: replay prefix in Playback mode, everything otherwise
    pub fn display(&self) -> DisplayUpdate {
        let timeline = &self.session.timeline;
        let cursor = self.replayer.cursor();
        let shown = match (self.session.mode, cursor) {
            (Mode::Playback, Some(c)) if c < timeline.len() => timeline.prefix(c),
            _ => timeline.as_slice(),
        };
        DisplayUpdate::new(self.session.mode, cursor, timeline.len(), summarize(shown))
    }

    /// Quiesce everything (navigating away)
    pub fn shutdown(&mut self) -> ReplayOutcome {
        self.detach_listener();
        self.replayer.stop(&mut self.transport, &mut self.scheduler)
    }

    /// Tear down into parts
    pub fn into_parts(self) -> (Session, T, S) {
        (self.session, self.transport, self.scheduler)
    }
}

// =============================================================================
// TESTS
// =============================================================================
