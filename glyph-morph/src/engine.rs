use std::f32::consts::TAU;
use std::time::Duration;

use glam::{Vec2, Vec3};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::MorphConfig;
use crate::error::Result;

/// One member of the fixed-size pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Interpolated position, without wobble.
    pub current: Vec3,
    pub start: Vec3,
    pub target: Vec3,
    pub delay: Duration,
    pub duration: Duration,
    /// Palette index, fixed for the particle's lifetime.
    pub tint: u8,
    phase_seed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Morphing,
    Idle,
}

/// Interpolates a particle pool between successive target shapes.
///
/// All timestamps are offsets from a common origin supplied by the caller.
pub struct MorphEngine<G = StdRng> {
    config: MorphConfig,
    particles: Vec<Particle>,
    /// Interpolated positions plus wobble, refreshed by `advance`.
    positions: Vec<Vec3>,
    rng: G,
    phase: Phase,
    morph_start: Duration,
    /// Longest `delay + duration` of the active morph.
    settle_span: Duration,
    /// Hidden time excluded from the wobble clock.
    wobble_offset: Duration,
}

impl MorphEngine<StdRng> {
    pub fn new(config: MorphConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }
}

impl<G: Rng> MorphEngine<G> {
    pub fn with_rng(config: MorphConfig, mut rng: G) -> Result<Self> {
        config.validate()?;

        let particles: Vec<Particle> = (0..config.pool_size)
            .map(|_| {
                let seed = seed_position(&mut rng, config.initial_radius);

                Particle {
                    current: seed,
                    start: seed,
                    target: seed,
                    delay: Duration::ZERO,
                    duration: config.morph_duration,
                    tint: rng.random_range(0..config.tint_levels),
                    phase_seed: rng.random_range(0.0..=1000.0),
                }
            })
            .collect();

        let positions = particles.iter().map(|p| p.current).collect();

        Ok(Self {
            config,
            particles,
            positions,
            rng,
            phase: Phase::Idle,
            morph_start: Duration::ZERO,
            settle_span: Duration::ZERO,
            wobble_offset: Duration::ZERO,
        })
    }

    /// Retargets the pool onto a flat glyph sample, jittering each target's depth.
    ///
    /// Returns `false` and leaves every particle untouched when `points` is empty.
    pub fn set_target(&mut self, points: &[Vec2], now: Duration) -> bool {
        if points.is_empty() {
            warn!("ignoring empty target; keeping the current shape");
            return false;
        }

        let depth = self.config.depth_jitter;
        let targets: Vec<Vec3> = (0..self.particles.len())
            .map(|i| {
                let z = symmetric(&mut self.rng, depth);
                points[i % points.len()].extend(z)
            })
            .collect();

        self.retarget(&targets, now);
        debug!("morphing {} particles onto {} points", self.particles.len(), points.len());
        true
    }

    /// Retargets the pool onto explicit 3D points without depth jitter.
    pub fn set_target_3d(&mut self, points: &[Vec3], now: Duration) -> bool {
        if points.is_empty() {
            warn!("ignoring empty target; keeping the current shape");
            return false;
        }

        let targets: Vec<Vec3> = (0..self.particles.len())
            .map(|i| points[i % points.len()])
            .collect();

        self.retarget(&targets, now);
        true
    }

    fn retarget(&mut self, targets: &[Vec3], now: Duration) {
        let base = self.config.morph_duration.as_secs_f32();
        let jitter = self.config.duration_jitter;
        let stagger = self.config.stagger.as_secs_f32();
        let mut settle_span = Duration::ZERO;

        for (particle, &target) in self.particles.iter_mut().zip(targets) {
            let delay = Duration::from_secs_f32(up_to(&mut self.rng, stagger));
            let factor = 1.0 + symmetric(&mut self.rng, jitter);

            particle.start = particle.current;
            particle.target = target;
            particle.delay = delay;
            particle.duration = Duration::from_secs_f32(base * factor);

            settle_span = settle_span.max(particle.delay + particle.duration);
        }

        self.morph_start = now;
        self.settle_span = settle_span;
        self.phase = Phase::Morphing;
    }

    /// Moves every particle to its position at `now` and returns the render buffer.
    pub fn advance(&mut self, now: Duration) -> &[Vec3] {
        if self.phase == Phase::Morphing {
            let elapsed = now.saturating_sub(self.morph_start);
            let easing = self.config.easing;

            for particle in &mut self.particles {
                let u = local_progress(elapsed, particle.delay, particle.duration);
                let e = easing(u).clamp(0.0, 1.0);
                particle.current = lerp(particle.start, particle.target, e);
            }

            if elapsed >= self.settle_span {
                self.phase = Phase::Idle;
            }
        }

        let wobble = self.config.wobble;
        let clock = now.saturating_sub(self.wobble_offset).as_secs_f32();

        for (out, particle) in self.positions.iter_mut().zip(&self.particles) {
            *out = if wobble.amplitude > 0.0 {
                let w = clock * wobble.speed + particle.phase_seed;
                particle.current
                    + Vec3::new(
                        w.sin() * wobble.amplitude * 0.6,
                        (w * 1.1).cos() * wobble.amplitude * 0.6,
                        (w * 0.7).sin() * wobble.amplitude * 0.35,
                    )
            } else {
                particle.current
            };
        }

        &self.positions
    }
}

impl<G> MorphEngine<G> {
    /// Shifts the timing reference so `hidden` does not count as elapsed time.
    pub fn resync(&mut self, hidden: Duration) {
        self.morph_start += hidden;
        self.wobble_offset += hidden;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Instant at which the last particle of the active morph arrives.
    pub fn settle_time(&self) -> Duration {
        self.morph_start + self.settle_span
    }

    pub fn is_settled(&self, now: Duration) -> bool {
        self.phase == Phase::Idle || now >= self.settle_time()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Positions as of the last `advance`, wobble included.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn config(&self) -> &MorphConfig {
        &self.config
    }
}

fn seed_position(rng: &mut impl Rng, radius: f32) -> Vec3 {
    if radius <= 0.0 {
        return Vec3::ZERO;
    }

    let r = radius * rng.random_range(0.55..=1.0);
    let theta = TAU * rng.random_range(0.0..=1.0f32);
    let phi = (2.0 * rng.random_range(0.0..=1.0f32) - 1.0).acos();

    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

fn up_to(rng: &mut impl Rng, span: f32) -> f32 {
    if span > 0.0 {
        rng.random_range(0.0..=span)
    } else {
        0.0
    }
}

fn symmetric(rng: &mut impl Rng, span: f32) -> f32 {
    if span > 0.0 {
        rng.random_range(-span..=span)
    } else {
        0.0
    }
}

/// Exactly 0 before `delay` has passed and exactly 1 once `delay + duration` has.
fn local_progress(elapsed: Duration, delay: Duration, duration: Duration) -> f32 {
    if elapsed >= delay + duration {
        1.0
    } else if elapsed <= delay {
        0.0
    } else {
        ((elapsed - delay).as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// Written as a weighted sum so both endpoints are reproduced bit-for-bit.
fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}
