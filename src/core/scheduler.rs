//! Periodic timer capability for the replay clock
//!
//! Timers never call back into the session directly. Each fire is delivered
//! as a `SessionEvent::Tick` on the host event channel, so ticks run as
//! discrete tasks between key presses and never overlap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::event_loop::SessionEvent;

/// Handle of a scheduled periodic timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Schedules and cancels periodic ticks
pub trait Scheduler {
    /// Start a timer firing every `period`
    fn schedule_every(&mut self, period: Duration) -> TimerId;

    /// Stop a timer; later fires of it must be ignored by the receiver
    fn cancel(&mut self, id: TimerId);

    /// The tick for `id` has been fully handled
    fn acknowledge(&mut self, _id: TimerId) {}
}

#[derive(Debug)]
struct TimerHandle {
    token: CancellationToken,
    /// A tick is queued and not yet acknowledged
    pending: Arc<AtomicBool>,
}

/// Scheduler backed by tokio intervals, one task and token per timer
#[derive(Debug)]
pub struct TokioScheduler {
    next_id: u64,
    events: mpsc::UnboundedSender<SessionEvent>,
    timers: HashMap<TimerId, TimerHandle>,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            next_id: 1,
            events,
            timers: HashMap::new(),
        }
    }

    /// Timers scheduled and not cancelled
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_every(&mut self, period: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let token = CancellationToken::new();
        let pending = Arc::new(AtomicBool::new(false));
        let task_token = token.clone();
        let task_pending = pending.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = interval.tick() => {
                        // Tick N+1 waits until tick N has been handled
                        if task_pending.swap(true, Ordering::AcqRel) {
                            continue;
                        }
                        if events.send(SessionEvent::Tick(id)).is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("{} finished", id);
        });

        self.timers.insert(id, TimerHandle { token, pending });
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.timers.remove(&id) {
            handle.token.cancel();
        }
    }

    fn acknowledge(&mut self, id: TimerId) {
        if let Some(handle) = self.timers.get(&id) {
            handle.pending.store(false, Ordering::Release);
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for handle in self.timers.values() {
            handle.token.cancel();
        }
    }
}
