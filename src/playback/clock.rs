//! Tick-paced frame clock.
//!
//! The clock turns host ticks into discrete frame advances. Pacing is keyed to the animation's
//! own frame rate: on every due tick the next deadline is re-armed relative to the tick time,
//! and exactly one frame is advanced, however late the tick is.

use crate::foundation::{
    core::{Fps, FrameIndex},
    error::{PlayerError, PlayerResult},
};
use crate::playback::ticker::{HOST_TICK_HZ, TickSource, TickSubscription};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Lifecycle phase of a [`PlaybackClock`].
pub enum ClockPhase {
    /// Not subscribed; initial phase.
    #[default]
    Stopped,
    /// Subscribed and advancing on due ticks.
    Playing,
    /// Not subscribed; frame and loop counters preserved.
    Paused,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// Mutable playback counters.
pub struct PlaybackState {
    /// Frame currently on screen.
    pub current_frame: FrameIndex,
    /// Completed loops since the last start.
    pub loop_count: u32,
    /// Host timestamp (ms) at or after which the next advance is due.
    pub next_deadline_ms: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Frame count and rate of the loaded animation.
pub struct ClockTiming {
    /// Frames per loop, `>= 1`.
    pub frame_count: u32,
    /// Animation frame rate.
    pub fps: Fps,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Result of feeding one host tick to the clock.
pub enum TickOutcome {
    /// Nothing happened: not playing, nothing loaded, or the deadline has not passed.
    Idle,
    /// One frame was advanced.
    Advanced {
        /// New current frame.
        frame: FrameIndex,
        /// `(frame + 1) / frame_count`.
        percentage: f64,
        /// The advance wrapped back to frame 0.
        wrapped: bool,
    },
    /// The configured loop limit was reached; the clock has stopped itself.
    Finished {
        /// Loops completed.
        loops: u32,
    },
}

/// Playback state machine owning frame position, loop counting and the tick subscription.
#[derive(Debug, Default)]
pub struct PlaybackClock {
    phase: ClockPhase,
    state: PlaybackState,
    timing: Option<ClockTiming>,
    loops: u32,
    subscription: Option<TickSubscription>,
}

impl PlaybackClock {
    /// Stopped clock with nothing loaded and infinite looping.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ClockPhase {
        self.phase
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_frame(&self) -> FrameIndex {
        self.state.current_frame
    }

    pub fn loop_count(&self) -> u32 {
        self.state.loop_count
    }

    pub fn is_playing(&self) -> bool {
        self.phase == ClockPhase::Playing
    }

    pub fn timing(&self) -> Option<ClockTiming> {
        self.timing
    }

    pub fn subscription(&self) -> Option<TickSubscription> {
        self.subscription
    }

    /// Loop limit; `0` loops forever.
    pub fn loops(&self) -> u32 {
        self.loops
    }

    pub fn set_loops(&mut self, loops: u32) {
        self.loops = loops;
    }

    /// Swap in the timing of a newly loaded item and rewind to frame 0.
    pub fn load(&mut self, timing: Option<ClockTiming>) {
        self.timing = timing;
        self.state.current_frame = FrameIndex::ZERO;
    }

    /// Reposition without rendering or touching the phase. Out-of-range frames are ignored.
    pub fn set_current_frame(&mut self, frame: FrameIndex) {
        if self.timing.is_some_and(|t| frame.0 < t.frame_count) {
            self.state.current_frame = frame;
        }
    }

    /// Rewind and (re)subscribe. Safe to call while already playing.
    pub fn start(&mut self, ticker: &dyn TickSource) {
        self.unsubscribe(ticker);
        self.state.current_frame = FrameIndex::ZERO;
        self.state.loop_count = 0;
        self.subscribe(ticker);
    }

    /// Unsubscribe, keeping frame and loop counters.
    pub fn pause(&mut self, ticker: &dyn TickSource) {
        self.unsubscribe(ticker);
        self.phase = ClockPhase::Paused;
    }

    /// Unsubscribe and enter [`ClockPhase::Stopped`].
    pub fn stop(&mut self, ticker: &dyn TickSource) {
        self.unsubscribe(ticker);
        self.phase = ClockPhase::Stopped;
    }

    /// Feed one host tick at `now_ms`.
    pub fn on_tick(&mut self, ticker: &dyn TickSource, now_ms: f64) -> TickOutcome {
        if self.phase != ClockPhase::Playing {
            return TickOutcome::Idle;
        }
        let Some(timing) = self.timing else {
            return TickOutcome::Idle;
        };
        if now_ms < self.state.next_deadline_ms {
            return TickOutcome::Idle;
        }
        self.state.next_deadline_ms =
            timing.fps.frame_interval_ms() + now_ms - timing.fps.catch_up_ms();
        self.advance(ticker, timing)
    }

    fn advance(&mut self, ticker: &dyn TickSource, timing: ClockTiming) -> TickOutcome {
        let mut next = self.state.current_frame.0 + 1;
        let mut wrapped = false;
        if next >= timing.frame_count {
            next = 0;
            wrapped = true;
            self.state.loop_count = self.state.loop_count.saturating_add(1);
            tracing::debug!(loop_count = self.state.loop_count, "frame wrap");
        }
        self.state.current_frame = FrameIndex(next);

        if wrapped && self.loops > 0 && self.state.loop_count >= self.loops {
            self.stop(ticker);
            return TickOutcome::Finished {
                loops: self.state.loop_count,
            };
        }

        TickOutcome::Advanced {
            frame: self.state.current_frame,
            percentage: f64::from(next + 1) / f64::from(timing.frame_count),
            wrapped,
        }
    }

    /// Pause, move to `frame`, and optionally resume from there.
    ///
    /// Frames outside `[0, frame_count)` (or any frame when nothing is loaded) are rejected with
    /// [`PlayerError::OutOfRangeSeek`] and leave the clock untouched.
    pub fn seek(
        &mut self,
        ticker: &dyn TickSource,
        frame: FrameIndex,
        resume: bool,
    ) -> PlayerResult<FrameIndex> {
        let frame_count = self.timing.map(|t| t.frame_count).unwrap_or(0);
        if frame.0 >= frame_count {
            return Err(PlayerError::OutOfRangeSeek {
                frame: i64::from(frame.0),
                frame_count,
            });
        }
        self.pause(ticker);
        self.state.current_frame = frame;
        if resume {
            self.subscribe(ticker);
        }
        Ok(frame)
    }

    /// Seek to `floor(fraction * frame_count)`, clamped to the last frame.
    pub fn seek_fraction(
        &mut self,
        ticker: &dyn TickSource,
        fraction: f64,
        resume: bool,
    ) -> PlayerResult<FrameIndex> {
        let frame_count = self.timing.map(|t| t.frame_count).unwrap_or(0);
        let frame = frame_for_fraction(fraction, frame_count)?;
        self.seek(ticker, frame, resume)
    }

    fn subscribe(&mut self, ticker: &dyn TickSource) {
        self.subscription = Some(ticker.subscribe(HOST_TICK_HZ));
        self.phase = ClockPhase::Playing;
    }

    fn unsubscribe(&mut self, ticker: &dyn TickSource) {
        if let Some(sub) = self.subscription.take() {
            ticker.unsubscribe(sub);
        }
    }
}

/// Map a playback fraction to a frame index.
///
/// Values that land on or past `frame_count` clamp to the last frame; negative or non-finite
/// fractions are out of range.
pub fn frame_for_fraction(fraction: f64, frame_count: u32) -> PlayerResult<FrameIndex> {
    let raw = (fraction * f64::from(frame_count)).floor();
    if !raw.is_finite() || raw < 0.0 {
        return Err(PlayerError::OutOfRangeSeek {
            frame: if raw.is_finite() { raw as i64 } else { i64::MIN },
            frame_count,
        });
    }
    let mut frame = raw as u64;
    if frame >= u64::from(frame_count) && frame_count > 0 {
        frame = u64::from(frame_count - 1);
    }
    let frame = u32::try_from(frame).map_err(|_| PlayerError::OutOfRangeSeek {
        frame: i64::MAX,
        frame_count,
    })?;
    Ok(FrameIndex(frame))
}

#[cfg(test)]
#[path = "../../tests/unit/playback/clock.rs"]
mod tests;
