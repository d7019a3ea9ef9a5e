use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::raster::TextRasterizer;
use crate::sequencer::Sequencer;

/// Paces frames on a fixed grid and drives the sequencer and engine once per frame.
pub struct FrameScheduler<C = SystemClock> {
    clock: C,
    interval: Duration,
    origin: Duration,
    next_frame: Duration,
    running: bool,
    visible: bool,
    frames: u64,
}

impl<C: Clock> FrameScheduler<C> {
    pub fn new(clock: C, fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(Error::InvalidConfig("frame rate must be non-zero".into()));
        }

        Ok(Self {
            clock,
            interval: Duration::from_secs(1) / fps,
            origin: Duration::ZERO,
            next_frame: Duration::ZERO,
            running: false,
            visible: true,
            frames: 0,
        })
    }

    pub fn start<R: TextRasterizer, G: Rng>(&mut self, seq: &mut Sequencer<R, G>) {
        let now = self.clock.now();
        seq.start(now);

        self.origin = now;
        self.next_frame = now;
        self.running = true;
    }

    /// Runs one frame if one is due. Returns whether the engine's positions changed.
    pub fn frame<R: TextRasterizer, G: Rng>(&mut self, seq: &mut Sequencer<R, G>) -> bool {
        if !self.running || !self.visible {
            return false;
        }

        let now = self.clock.now();

        if now < self.next_frame {
            return false;
        }

        seq.poll(now);
        seq.engine_mut().advance(now);

        self.frames += 1;
        self.next_frame = self.next_tick(now);
        true
    }

    /// How long the host may sleep before the next frame is due.
    pub fn until_next_frame(&self) -> Duration {
        if !self.running || !self.visible {
            return self.interval;
        }

        self.next_frame.saturating_sub(self.clock.now())
    }

    pub fn set_visible<R: TextRasterizer, G: Rng>(
        &mut self,
        visible: bool,
        seq: &mut Sequencer<R, G>,
    ) {
        if visible == self.visible {
            return;
        }

        let now = self.clock.now();
        self.visible = visible;

        if visible {
            seq.resume(now);
            self.origin = now;
            self.next_frame = now;
        } else {
            seq.suspend(now);
        }

        debug!("view visibility changed to {visible}");
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("frame scheduler stopped after {} frames", self.frames);
        }

        self.running = false;
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn next_tick(&self, now: Duration) -> Duration {
        let elapsed = now.saturating_sub(self.origin).as_nanos();
        let step = self.interval.as_nanos().max(1);
        let ticks = elapsed / step + 1;

        self.origin + Duration::from_nanos((ticks * step) as u64)
    }
}
