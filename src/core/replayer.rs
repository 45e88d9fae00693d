//! Replayer: drives the replay cursor from video time
//!
//! State transitions:
//! - IDLE → RUNNING: Playback mode, non-empty timeline, ready transport
//!   (seek to pre-roll, play, schedule tick, in that order)
//! - RUNNING → RUNNING: tick recomputes cursor = #entries with time <= position
//! - RUNNING → IDLE: mode change, empty timeline, transport lost,
//!   or MAX_TRANSPORT_FAILURES consecutive failed reads
//!
//! The cursor is recomputed from scratch on every tick, so scrubbing the
//! video backward rewinds the displayed score.

use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::scheduler::{Scheduler, TimerId};
use crate::core::transport::{read_duration, read_position, VideoTransport};
use crate::types::{Mode, ReplayOutcome, ReplayReason, Session};
use crate::{MAX_TRANSPORT_FAILURES, REPLAY_PREROLL_SECS, REPLAY_TICK_MS};

/// Replay state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplayState {
    /// No cursor, no timer
    Idle,
    /// Cursor active, tick scheduled
    Running,
}

#[derive(Debug)]
struct ReplayRun {
    timer: TimerId,
    cursor: usize,
    consecutive_failures: u32,
}

/// Replay state machine
#[derive(Debug)]
pub struct Replayer {
    run: Option<ReplayRun>,
    tick_period: Duration,
    max_failures: u32,
}

impl Default for Replayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Replayer {
    pub fn new() -> Self {
        Self {
            run: None,
            tick_period: Duration::from_millis(REPLAY_TICK_MS),
            max_failures: MAX_TRANSPORT_FAILURES,
        }
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    pub fn state(&self) -> ReplayState {
        if self.run.is_some() {
            ReplayState::Running
        } else {
            ReplayState::Idle
        }
    }

    /// Entries consumed so far; `None` when not replaying
    pub fn cursor(&self) -> Option<usize> {
        self.run.as_ref().map(|r| r.cursor)
    }

    /// Timer driving the current run
    pub fn timer(&self) -> Option<TimerId> {
        self.run.as_ref().map(|r| r.timer)
    }

    /// IDLE → RUNNING
    pub fn start<T, S>(&mut self, session: &Session, transport: &mut T, scheduler: &mut S) -> ReplayOutcome
    where
        T: VideoTransport + ?Sized,
        S: Scheduler + ?Sized,
    {
        if let Some(run) = &self.run {
            return ReplayOutcome::new(ReplayReason::R211_ALREADY_RUNNING, Some(run.cursor));
        }
        if session.mode != Mode::Playback {
            return ReplayOutcome::idle(ReplayReason::R204_NOT_PLAYBACK);
        }
        let Some(first_time) = session.timeline.first_time() else {
            return ReplayOutcome::idle(ReplayReason::R205_TIMELINE_EMPTY);
        };
        if !transport.is_ready() || read_duration(transport).is_none() {
            return ReplayOutcome::idle(ReplayReason::R206_TRANSPORT_NOT_READY);
        }

        if transport.can_seek() {
            let preroll = (first_time - REPLAY_PREROLL_SECS).max(0.0);
            if let Err(e) = transport.seek_to(preroll) {
                warn!(error = %e, "pre-roll seek failed");
            }
        }
        if let Err(e) = transport.play() {
            warn!(error = %e, "play failed at replay start");
        }
        let timer = scheduler.schedule_every(self.tick_period);

        self.run = Some(ReplayRun {
            timer,
            cursor: 0,
            consecutive_failures: 0,
        });
        info!(%timer, entries = session.timeline.len(), "replay started");
        ReplayOutcome::new(ReplayReason::R201_REPLAY_STARTED, Some(0))
    }

    /// Handle one fire of `timer`. Fires from cancelled timers are no-ops.
    pub fn tick<T, S>(
        &mut self,
        timer: TimerId,
        session: &Session,
        transport: &mut T,
        scheduler: &mut S,
    ) -> ReplayOutcome
    where
        T: VideoTransport + ?Sized,
        S: Scheduler + ?Sized,
    {
        match &self.run {
            Some(run) if run.timer == timer => {}
            _ => return ReplayOutcome::new(ReplayReason::R209_STALE_TICK, self.cursor()),
        }

        if session.mode != Mode::Playback {
            self.stop(transport, scheduler);
            return ReplayOutcome::idle(ReplayReason::R204_NOT_PLAYBACK);
        }
        if session.timeline.is_empty() {
            self.stop(transport, scheduler);
            return ReplayOutcome::idle(ReplayReason::R205_TIMELINE_EMPTY);
        }
        if !transport.is_ready() {
            self.stop(transport, scheduler);
            return ReplayOutcome::idle(ReplayReason::R206_TRANSPORT_NOT_READY);
        }

        let position = read_position(transport);
        let Some(run) = self.run.as_mut() else {
            return ReplayOutcome::idle(ReplayReason::R209_STALE_TICK);
        };

        match position {
            Some(t) => {
                run.consecutive_failures = 0;
                run.cursor = session.timeline.count_at_or_before(t);
                ReplayOutcome::new(ReplayReason::R202_CURSOR_UPDATED, Some(run.cursor))
            }
            None => {
                run.consecutive_failures += 1;
                let failures = run.consecutive_failures;
                let cursor = run.cursor;
                if failures >= self.max_failures {
                    warn!(failures, "video position unavailable, stopping replay");
                    self.stop(transport, scheduler);
                    ReplayOutcome::idle(ReplayReason::R208_TRANSPORT_FAILED)
                } else {
                    warn!(failures, "video position unavailable, tick skipped");
                    ReplayOutcome::new(ReplayReason::R207_TICK_SKIPPED, Some(cursor))
                }
            }
        }
    }

    /// RUNNING → IDLE: cancel timer, pause video, drop cursor. No-op when idle.
    pub fn stop<T, S>(&mut self, transport: &mut T, scheduler: &mut S) -> ReplayOutcome
    where
        T: VideoTransport + ?Sized,
        S: Scheduler + ?Sized,
    {
        let Some(run) = self.run.take() else {
            return ReplayOutcome::idle(ReplayReason::R210_ALREADY_IDLE);
        };

        scheduler.cancel(run.timer);
        if let Err(e) = transport.pause() {
            warn!(error = %e, "pause failed at replay stop");
        }
        info!(timer = %run.timer, cursor = run.cursor, "replay stopped");
        ReplayOutcome::idle(ReplayReason::R203_REPLAY_STOPPED)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{Call, ManualScheduler, MockTransport};
    use crate::types::{Timeline, TimelineEntry};

    fn playback_session(times: &[f64]) -> Session {
        let mut session = Session::default();
        session.timeline = Timeline::from_sorted(times.iter().map(|&t| TimelineEntry::new(t, 1)).collect());
        session.mode = Mode::Playback;
        session
    }

    #[test]
    fn test_start_seeks_plays_schedules_in_order() {
        let session = playback_session(&[10.0]);
        let mut transport = MockTransport::ready(60.0, 0.0);
        let mut scheduler = ManualScheduler::default();
        let mut replayer = Replayer::new();

        let outcome = replayer.start(&session, &mut transport, &mut scheduler);

        assert_eq!(outcome.reason, ReplayReason::R201_REPLAY_STARTED);
        assert_eq!(transport.calls, vec![Call::Seek(5.0), Call::Play]);
        assert_eq!(scheduler.scheduled.len(), 1);
        assert_eq!(scheduler.scheduled[0].1, Duration::from_millis(REPLAY_TICK_MS));
        assert_eq!(replayer.state(), ReplayState::Running);
    }

    #[test]
    fn test_preroll_floors_at_zero() {
        let session = playback_session(&[2.0]);
        let mut transport = MockTransport::ready(60.0, 30.0);
        let mut scheduler = ManualScheduler::default();

        Replayer::new().start(&session, &mut transport, &mut scheduler);
        assert_eq!(transport.calls[0], Call::Seek(0.0));
    }

    #[test]
    fn test_no_seek_when_unsupported() {
        let session = playback_session(&[20.0]);
        let mut transport = MockTransport::ready(60.0, 0.0);
        transport.seekable = false;
        let mut scheduler = ManualScheduler::default();

        Replayer::new().start(&session, &mut transport, &mut scheduler);
        assert_eq!(transport.calls, vec![Call::Play]);
    }

    #[test]
    fn test_start_refused_without_preconditions() {
        let mut scheduler = ManualScheduler::default();
        let mut replayer = Replayer::new();

        let mut scoring = playback_session(&[1.0]);
        scoring.mode = Mode::Scoring;
        let mut transport = MockTransport::ready(60.0, 0.0);
        assert_eq!(
            replayer.start(&scoring, &mut transport, &mut scheduler).reason,
            ReplayReason::R204_NOT_PLAYBACK
        );

        let empty = playback_session(&[]);
        assert_eq!(
            replayer.start(&empty, &mut transport, &mut scheduler).reason,
            ReplayReason::R205_TIMELINE_EMPTY
        );

        let mut not_ready = MockTransport::ready(60.0, 0.0);
        not_ready.ready = false;
        assert_eq!(
            replayer.start(&playback_session(&[1.0]), &mut not_ready, &mut scheduler).reason,
            ReplayReason::R206_TRANSPORT_NOT_READY
        );

        assert!(scheduler.scheduled.is_empty());
        assert_eq!(replayer.state(), ReplayState::Idle);
    }

    #[test]
    fn test_tick_tracks_position_both_ways() {
        let session = playback_session(&[1.0, 2.0, 3.0, 4.0]);
        let mut transport = MockTransport::ready(60.0, 0.0);
        let mut scheduler = ManualScheduler::default();
        let mut replayer = Replayer::new();
        replayer.start(&session, &mut transport, &mut scheduler);
        let timer = scheduler.scheduled[0].0;

        transport.position = Some(3.0);
        assert_eq!(replayer.tick(timer, &session, &mut transport, &mut scheduler).cursor, Some(3));

        // scrubbed backward
        transport.position = Some(1.5);
        assert_eq!(replayer.tick(timer, &session, &mut transport, &mut scheduler).cursor, Some(1));
    }

    #[test]
    fn test_stale_tick_is_noop() {
        let session = playback_session(&[1.0]);
        let mut transport = MockTransport::ready(60.0, 0.0);
        let mut scheduler = ManualScheduler::default();
        let mut replayer = Replayer::new();
        replayer.start(&session, &mut transport, &mut scheduler);
        let timer = scheduler.scheduled[0].0;
        replayer.stop(&mut transport, &mut scheduler);
        let calls_after_stop = transport.calls.len();

        let outcome = replayer.tick(timer, &session, &mut transport, &mut scheduler);
        assert_eq!(outcome.reason, ReplayReason::R209_STALE_TICK);
        assert_eq!(outcome.cursor, None);
        assert_eq!(transport.calls.len(), calls_after_stop);
    }

    #[test]
    fn test_three_failures_force_idle() {
        let session = playback_session(&[1.0]);
        let mut transport = MockTransport::ready(60.0, 0.0);
        let mut scheduler = ManualScheduler::default();
        let mut replayer = Replayer::new();
        replayer.start(&session, &mut transport, &mut scheduler);
        let timer = scheduler.scheduled[0].0;

        transport.failing_reads = 3;
        assert_eq!(
            replayer.tick(timer, &session, &mut transport, &mut scheduler).reason,
            ReplayReason::R207_TICK_SKIPPED
        );
        assert_eq!(
            replayer.tick(timer, &session, &mut transport, &mut scheduler).reason,
            ReplayReason::R207_TICK_SKIPPED
        );
        assert_eq!(
            replayer.tick(timer, &session, &mut transport, &mut scheduler).reason,
            ReplayReason::R208_TRANSPORT_FAILED
        );
        assert_eq!(replayer.state(), ReplayState::Idle);
        assert_eq!(scheduler.cancelled, vec![timer]);
    }

    #[test]
    fn test_unusable_positions_count_as_failures() {
        for bad in [None, Some(f64::NAN), Some(f64::INFINITY), Some(-2.0)] {
            let session = playback_session(&[1.0]);
            let mut transport = MockTransport::ready(60.0, 0.0);
            let mut scheduler = ManualScheduler::default();
            let mut replayer = Replayer::new();
            replayer.start(&session, &mut transport, &mut scheduler);
            let timer = scheduler.scheduled[0].0;

            transport.position = bad;
            let reasons: Vec<ReplayReason> = (0..3)
                .map(|_| replayer.tick(timer, &session, &mut transport, &mut scheduler).reason)
                .collect();

            assert_eq!(
                reasons,
                vec![
                    ReplayReason::R207_TICK_SKIPPED,
                    ReplayReason::R207_TICK_SKIPPED,
                    ReplayReason::R208_TRANSPORT_FAILED,
                ],
                "position {:?}",
                bad
            );
            assert_eq!(replayer.state(), ReplayState::Idle);
            assert_eq!(transport.count(&Call::Pause), 1);
        }
    }

    #[test]
    fn test_success_resets_failure_count() {
        let session = playback_session(&[1.0]);
        let mut transport = MockTransport::ready(60.0, 0.0);
        let mut scheduler = ManualScheduler::default();
        let mut replayer = Replayer::new();
        replayer.start(&session, &mut transport, &mut scheduler);
        let timer = scheduler.scheduled[0].0;

        for _ in 0..4 {
            transport.failing_reads = 2;
            replayer.tick(timer, &session, &mut transport, &mut scheduler);
            replayer.tick(timer, &session, &mut transport, &mut scheduler);
            let ok = replayer.tick(timer, &session, &mut transport, &mut scheduler);
            assert_eq!(ok.reason, ReplayReason::R202_CURSOR_UPDATED);
        }
        assert_eq!(replayer.state(), ReplayState::Running);
    }

    #[test]
    fn test_stop_twice_has_single_side_effects() {
        let session = playback_session(&[1.0]);
        let mut transport = MockTransport::ready(60.0, 0.0);
        let mut scheduler = ManualScheduler::default();
        let mut replayer = Replayer::new();
        replayer.start(&session, &mut transport, &mut scheduler);

        assert_eq!(replayer.stop(&mut transport, &mut scheduler).reason, ReplayReason::R203_REPLAY_STOPPED);
        assert_eq!(replayer.stop(&mut transport, &mut scheduler).reason, ReplayReason::R210_ALREADY_IDLE);

        assert_eq!(transport.count(&Call::Pause), 1);
        assert_eq!(scheduler.cancelled.len(), 1);
        assert_eq!(replayer.cursor(), None);
    }
}
