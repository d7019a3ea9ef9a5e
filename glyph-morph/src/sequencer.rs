use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use rand::rngs::StdRng;

use crate::config::SequencerConfig;
use crate::engine::MorphEngine;
use crate::error::{Error, Result};
use crate::raster::TextRasterizer;
use crate::sampler::GlyphSampler;

/// Size of the box words are fitted into, in world units. Never smaller than 1×1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.max(1.0) } else { 1.0 };

        Self {
            width: clamp(width),
            height: clamp(height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Stopped,
    Morphing,
    Holding { until: Duration },
}

#[derive(Debug, Clone, Copy)]
struct PendingResize {
    bounds: Bounds,
    due: Duration,
}

/// Cycles the engine through a word list: morph, hold, next word, forever.
pub struct Sequencer<R, G = StdRng> {
    words: Vec<String>,
    index: usize,
    sampler: GlyphSampler<R>,
    engine: MorphEngine<G>,
    config: SequencerConfig,
    bounds: Bounds,
    desired_points: usize,
    stage: Stage,
    pending_resize: Option<PendingResize>,
    hidden_since: Option<Duration>,
}

impl<R: TextRasterizer, G: Rng> Sequencer<R, G> {
    pub fn new<I, S>(
        words: I,
        sampler: GlyphSampler<R>,
        engine: MorphEngine<G>,
        bounds: Bounds,
        config: SequencerConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();

        if words.is_empty() {
            return Err(Error::NoWords);
        }

        let desired_points = engine.particles().len();

        Ok(Self {
            words,
            index: 0,
            sampler,
            engine,
            config,
            bounds,
            desired_points,
            stage: Stage::Stopped,
            pending_resize: None,
            hidden_since: None,
        })
    }

    pub fn start(&mut self, now: Duration) {
        info!("starting word cycle over {} entries", self.words.len());

        self.index = 0;
        self.stage = self.morph_to_current(now);
    }

    /// Applies any transition due at `now`. Advances at most one word per call.
    pub fn poll(&mut self, now: Duration) {
        if self.stage == Stage::Stopped || self.hidden_since.is_some() {
            return;
        }

        if let Some(pending) = self.pending_resize.filter(|p| p.due <= now) {
            self.pending_resize = None;
            self.bounds = pending.bounds;
            debug!("refitting {:?} to {:?}", self.current_word(), self.bounds);
            self.retarget(now);
        }

        if self.stage == Stage::Morphing && self.engine.is_settled(now) {
            self.stage = Stage::Holding {
                until: self.engine.settle_time() + self.config.hold,
            };
        }

        if let Stage::Holding { until } = self.stage {
            if now >= until {
                self.index = (self.index + 1) % self.words.len();
                self.stage = self.morph_to_current(now);
            }
        }
    }

    /// Schedules a refit of the current word; a newer resize supersedes a pending one.
    pub fn resize(&mut self, width: f32, height: f32, now: Duration) {
        let bounds = Bounds::new(width, height);

        if self.stage == Stage::Stopped {
            self.bounds = bounds;
            return;
        }

        // While hidden the cycle's clock is frozen at the suspend instant;
        // `resume` shifts the deadline by the hidden interval.
        let base = self.hidden_since.unwrap_or(now);

        self.pending_resize = Some(PendingResize {
            bounds,
            due: base + self.config.resize_debounce,
        });
    }

    /// Freezes the cycle while the host view is hidden.
    pub fn suspend(&mut self, now: Duration) {
        if self.hidden_since.is_none() {
            self.hidden_since = Some(now);
        }
    }

    /// Resumes the cycle, excluding the hidden interval from every timer.
    pub fn resume(&mut self, now: Duration) {
        let Some(since) = self.hidden_since.take() else {
            return;
        };

        let hidden = now.saturating_sub(since);
        debug!("resuming after {hidden:?} hidden");

        self.engine.resync(hidden);

        if let Stage::Holding { until } = &mut self.stage {
            *until += hidden;
        }

        if let Some(pending) = &mut self.pending_resize {
            pending.due += hidden;
        }
    }

    pub fn current_word(&self) -> &str {
        &self.words[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn engine(&self) -> &MorphEngine<G> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MorphEngine<G> {
        &mut self.engine
    }

    fn morph_to_current(&mut self, now: Duration) -> Stage {
        if self.retarget(now) {
            Stage::Morphing
        } else {
            Stage::Holding {
                until: now + self.config.hold,
            }
        }
    }

    fn retarget(&mut self, now: Duration) -> bool {
        let word = &self.words[self.index];
        let points = self.sampler.sample(
            word,
            self.bounds.width,
            self.bounds.height,
            self.desired_points,
        );

        if points.is_empty() {
            warn!("{word:?} produced no sample points; keeping the previous shape");
            return false;
        }

        debug!("morphing to {word:?} ({} points)", points.len());
        self.engine.set_target(&points, now)
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;

    use crate::config::{MorphConfig, Wobble};
    use crate::raster::BitmapFont;

    use super::*;

    const BOX: Bounds = Bounds {
        width: 120.0,
        height: 60.0,
    };

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn sequencer(words: &[&str], hold: Duration) -> Sequencer<BitmapFont> {
        let engine = MorphEngine::with_rng(
            MorphConfig {
                pool_size: 400,
                wobble: Wobble::NONE,
                ..MorphConfig::PUBLICATIONS
            },
            StdRng::seed_from_u64(11),
        )
        .unwrap();

        let config = SequencerConfig {
            hold,
            ..SequencerConfig::default()
        };

        Sequencer::new(
            words.iter().copied(),
            GlyphSampler::new(BitmapFont),
            engine,
            BOX,
            config,
        )
        .unwrap()
    }

    fn target_xy(seq: &Sequencer<BitmapFont>) -> Vec<Vec2> {
        seq.engine()
            .particles()
            .iter()
            .map(|p| p.target.truncate())
            .collect()
    }

    fn expected_xy(word: &str, bounds: Bounds, pool: usize) -> Vec<Vec2> {
        let points = GlyphSampler::new(BitmapFont).sample(word, bounds.width, bounds.height, pool);
        (0..pool).map(|i| points[i % points.len()]).collect()
    }

    #[test]
    fn empty_word_list_is_rejected() {
        let engine = MorphEngine::with_rng(MorphConfig::default(), StdRng::seed_from_u64(1)).unwrap();
        let result = Sequencer::new(
            Vec::<String>::new(),
            GlyphSampler::new(BitmapFont),
            engine,
            BOX,
            SequencerConfig::default(),
        );

        assert!(matches!(result, Err(Error::NoWords)));
    }

    #[test]
    fn start_targets_first_word() {
        let mut seq = sequencer(&["AB", "CD"], ms(0));
        seq.start(ms(0));

        assert_eq!(seq.stage(), Stage::Morphing);
        assert_eq!(seq.current_word(), "AB");
        assert_eq!(target_xy(&seq), expected_xy("AB", BOX, 400));
    }

    #[test]
    fn cycles_back_to_first_word() {
        let mut seq = sequencer(&["AB", "CD"], ms(0));
        seq.start(ms(0));

        seq.poll(ms(10_000));
        assert_eq!(seq.current_word(), "CD");
        assert_eq!(target_xy(&seq), expected_xy("CD", BOX, 400));

        seq.poll(ms(20_000));
        assert_eq!(seq.index(), 0);
        assert_eq!(target_xy(&seq), expected_xy("AB", BOX, 400));
    }

    #[test]
    fn holds_after_settling() {
        let mut seq = sequencer(&["AB", "CD"], ms(2500));
        seq.start(ms(0));

        let settle = seq.engine().settle_time();
        seq.poll(settle);

        assert_eq!(
            seq.stage(),
            Stage::Holding {
                until: settle + ms(2500)
            }
        );

        seq.poll(settle + ms(2499));
        assert_eq!(seq.current_word(), "AB");

        seq.poll(settle + ms(2500));
        assert_eq!(seq.current_word(), "CD");
        assert_eq!(seq.stage(), Stage::Morphing);
    }

    #[test]
    fn blank_word_is_skipped_without_touching_particles() {
        let mut seq = sequencer(&["AB", "   ", "CD"], ms(0));
        seq.start(ms(0));
        seq.poll(ms(10_000));

        assert_eq!(seq.current_word(), "   ");
        assert_eq!(target_xy(&seq), expected_xy("AB", BOX, 400));
        assert!(matches!(seq.stage(), Stage::Holding { .. }));

        seq.poll(ms(10_001));
        assert_eq!(seq.current_word(), "CD");
    }

    #[test]
    fn resize_refits_current_word_after_debounce() {
        let mut seq = sequencer(&["AB", "CD"], ms(0));
        seq.start(ms(0));

        seq.resize(200.0, 100.0, ms(50));
        seq.poll(ms(100));
        assert_eq!(seq.bounds(), BOX);

        seq.poll(ms(170));
        let refit = Bounds::new(200.0, 100.0);
        assert_eq!(seq.bounds(), refit);
        assert_eq!(seq.current_word(), "AB");
        assert_eq!(target_xy(&seq), expected_xy("AB", refit, 400));
    }

    #[test]
    fn later_resize_supersedes_pending_one() {
        let mut seq = sequencer(&["AB"], ms(0));
        seq.start(ms(0));

        seq.resize(300.0, 100.0, ms(0));
        seq.resize(90.0, 90.0, ms(100));
        seq.poll(ms(150));
        assert_eq!(seq.bounds(), BOX);

        seq.poll(ms(220));
        assert_eq!(seq.bounds(), Bounds::new(90.0, 90.0));
    }

    #[test]
    fn repeated_resize_to_same_box_is_deterministic() {
        let mut seq = sequencer(&["AB"], ms(0));
        seq.start(ms(0));

        seq.resize(160.0, 80.0, ms(0));
        seq.poll(ms(200));
        let first = target_xy(&seq);

        seq.resize(160.0, 80.0, ms(300));
        seq.poll(ms(500));
        let second = target_xy(&seq);

        assert_eq!(first, second);
    }

    #[test]
    fn retarget_on_resize_keeps_positions_continuous() {
        let mut seq = sequencer(&["AB"], ms(0));
        seq.start(ms(0));
        seq.engine_mut().advance(ms(800));

        let live: Vec<Vec3> = seq.engine().particles().iter().map(|p| p.current).collect();
        seq.resize(50.0, 40.0, ms(680));
        seq.poll(ms(800));

        let starts: Vec<Vec3> = seq.engine().particles().iter().map(|p| p.start).collect();
        assert_eq!(starts, live);
    }

    #[test]
    fn degenerate_resize_is_clamped() {
        let mut seq = sequencer(&["AB"], ms(0));
        seq.start(ms(0));
        seq.resize(0.0, -3.0, ms(0));
        seq.poll(ms(500));

        assert_eq!(seq.bounds(), Bounds::new(1.0, 1.0));
    }

    #[test]
    fn hidden_interval_is_excluded() {
        let mut seq = sequencer(&["AB", "CD"], ms(1000));
        seq.start(ms(0));

        let settle = seq.engine().settle_time();
        seq.poll(settle);

        seq.suspend(settle + ms(100));
        seq.poll(settle + ms(50_000));
        assert_eq!(seq.current_word(), "AB");

        seq.resume(settle + ms(60_100));
        assert_eq!(
            seq.stage(),
            Stage::Holding {
                until: settle + ms(61_000)
            }
        );

        seq.poll(settle + ms(60_999));
        assert_eq!(seq.current_word(), "AB");
        seq.poll(settle + ms(61_000));
        assert_eq!(seq.current_word(), "CD");
    }

    #[test]
    fn resize_while_hidden_applies_after_resume() {
        let mut seq = sequencer(&["AB"], ms(0));
        seq.start(ms(0));

        seq.suspend(ms(1_000));
        seq.resize(200.0, 100.0, ms(600_000));
        seq.poll(ms(600_500));
        assert_eq!(seq.bounds(), BOX);

        seq.resume(ms(601_000));
        seq.poll(ms(601_119));
        assert_eq!(seq.bounds(), BOX);

        seq.poll(ms(601_120));
        let refit = Bounds::new(200.0, 100.0);
        assert_eq!(seq.bounds(), refit);
        assert_eq!(target_xy(&seq), expected_xy("AB", refit, 400));
    }

    #[test]
    fn pending_resize_keeps_remaining_debounce_across_hidden_interval() {
        let mut seq = sequencer(&["AB"], ms(0));
        seq.start(ms(0));

        seq.resize(200.0, 100.0, ms(1_000));
        seq.suspend(ms(1_050));
        seq.poll(ms(30_000));
        assert_eq!(seq.bounds(), BOX);

        seq.resume(ms(61_050));
        seq.poll(ms(61_119));
        assert_eq!(seq.bounds(), BOX);

        seq.poll(ms(61_120));
        assert_eq!(seq.bounds(), Bounds::new(200.0, 100.0));
    }

    #[test]
    fn resize_while_hidden_supersedes_pending_one() {
        let mut seq = sequencer(&["AB"], ms(0));
        seq.start(ms(0));

        seq.resize(300.0, 100.0, ms(1_000));
        seq.suspend(ms(1_050));
        seq.resize(90.0, 90.0, ms(5_000));
        seq.resume(ms(9_050));

        seq.poll(ms(9_169));
        assert_eq!(seq.bounds(), BOX);
        seq.poll(ms(9_170));
        assert_eq!(seq.bounds(), Bounds::new(90.0, 90.0));
    }
}
