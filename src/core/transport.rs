//! Video transport capability
//!
//! Recorder and Replayer only see this trait, never a concrete player.
//! Every call may fail or return nothing; callers degrade to a no-op.

use std::time::Instant;
use crate::error::TransportError;
use crate::types::VideoRef;

/// Playback control surface of a video player
pub trait VideoTransport {
    /// Player has loaded a video and answers queries
    fn is_ready(&self) -> bool;

    /// Current playback position in seconds
    fn current_time(&mut self) -> Result<Option<f64>, TransportError>;

    /// Video length in seconds
    fn duration(&mut self) -> Result<Option<f64>, TransportError>;

    /// Whether `seek_to` is supported
    fn can_seek(&self) -> bool {
        true
    }

    fn seek_to(&mut self, seconds: f64) -> Result<(), TransportError>;

    fn play(&mut self) -> Result<(), TransportError>;

    fn pause(&mut self) -> Result<(), TransportError>;

    /// Load another video; readiness follows once it is playable
    fn load(&mut self, video: &VideoRef) -> Result<(), TransportError>;

    /// Hand keyboard focus back to the recording surface
    fn return_focus(&mut self) {}
}

/// Position read that is usable as a timeline key
pub(crate) fn read_position<T: VideoTransport + ?Sized>(transport: &mut T) -> Option<f64> {
    match transport.current_time() {
        Ok(Some(t)) if t.is_finite() && t >= 0.0 => Some(t),
        _ => None,
    }
}

/// Duration read that is positive and finite
pub(crate) fn read_duration<T: VideoTransport + ?Sized>(transport: &mut T) -> Option<f64> {
    match transport.duration() {
        Ok(Some(d)) if d.is_finite() && d > 0.0 => Some(d),
        _ => None,
    }
}

/// Wall-clock player used by the terminal front end.
///
/// Position advances with real time (scaled by `rate`) while playing and
/// stops at `duration`.
#[derive(Debug)]
pub struct SimulatedTransport {
    video: Option<VideoRef>,
    duration: f64,
    rate: f64,
    /// Position when playback last started or was paused
    offset: f64,
    playing_since: Option<Instant>,
}

impl SimulatedTransport {
    pub fn new(duration: f64) -> Self {
        Self {
            video: None,
            duration,
            rate: 1.0,
            offset: 0.0,
            playing_since: None,
        }
    }

    /// Play faster or slower than real time
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        self
    }

    pub fn video(&self) -> Option<&VideoRef> {
        self.video.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }

    fn position(&self) -> f64 {
        let elapsed = self
            .playing_since
            .map(|since| since.elapsed().as_secs_f64() * self.rate)
            .unwrap_or(0.0);
        (self.offset + elapsed).min(self.duration)
    }
}

impl VideoTransport for SimulatedTransport {
    fn is_ready(&self) -> bool {
        self.video.is_some()
    }

    fn current_time(&mut self) -> Result<Option<f64>, TransportError> {
        if !self.is_ready() {
            return Err(TransportError::NotReady);
        }
        Ok(Some(self.position()))
    }

    fn duration(&mut self) -> Result<Option<f64>, TransportError> {
        if !self.is_ready() {
            return Err(TransportError::NotReady);
        }
        Ok(Some(self.duration))
    }

    fn seek_to(&mut self, seconds: f64) -> Result<(), TransportError> {
        if !self.is_ready() {
            return Err(TransportError::NotReady);
        }
        self.offset = seconds.clamp(0.0, self.duration);
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), TransportError> {
        if !self.is_ready() {
            return Err(TransportError::NotReady);
        }
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), TransportError> {
        if !self.is_ready() {
            return Err(TransportError::NotReady);
        }
        self.offset = self.position();
        self.playing_since = None;
        Ok(())
    }

    fn load(&mut self, video: &VideoRef) -> Result<(), TransportError> {
        self.video = Some(video.clone());
        self.offset = 0.0;
        self.playing_since = None;
        Ok(())
    }
}
