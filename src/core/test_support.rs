use std::time::Duration;

use crate::core::scheduler::{Scheduler, TimerId};
use crate::core::transport::VideoTransport;
use crate::error::TransportError;
use crate::types::VideoRef;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Seek(f64),
    Play,
    Pause,
    Load(String),
    ReturnFocus,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    pub ready: bool,
    pub seekable: bool,
    pub position: Option<f64>,
    pub duration: Option<f64>,
    /// Upcoming `current_time` calls that fail
    pub failing_reads: u32,
    pub calls: Vec<Call>,
}

impl MockTransport {
    pub fn ready(duration: f64, position: f64) -> Self {
        Self {
            ready: true,
            seekable: true,
            position: Some(position),
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

impl VideoTransport for MockTransport {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn current_time(&mut self) -> Result<Option<f64>, TransportError> {
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(TransportError::Failed("read failed".to_string()));
        }
        Ok(self.position)
    }

    fn duration(&mut self) -> Result<Option<f64>, TransportError> {
        Ok(self.duration)
    }

    fn can_seek(&self) -> bool {
        self.seekable
    }

    fn seek_to(&mut self, seconds: f64) -> Result<(), TransportError> {
        self.calls.push(Call::Seek(seconds));
        self.position = Some(seconds);
        Ok(())
    }

    fn play(&mut self) -> Result<(), TransportError> {
        self.calls.push(Call::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), TransportError> {
        self.calls.push(Call::Pause);
        Ok(())
    }

    fn load(&mut self, video: &VideoRef) -> Result<(), TransportError> {
        self.calls.push(Call::Load(video.id.clone()));
        Ok(())
    }

    fn return_focus(&mut self) {
        self.calls.push(Call::ReturnFocus);
    }
}

#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pub scheduled: Vec<(TimerId, Duration)>,
    pub cancelled: Vec<TimerId>,
}

impl Scheduler for ManualScheduler {
    fn schedule_every(&mut self, period: Duration) -> TimerId {
        self.next += 1;
        let id = TimerId::new(self.next);
        self.scheduled.push((id, period));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.cancelled.push(id);
    }
}
