use std::time::Duration;

use crate::easing;
use crate::error::{Error, Result};

pub const PUBLICATION_WORDS: &[&str] = &[
    "Math", "Economy", "Animals", "Cancer", "Social", "Medicine", "Eng.",
];

pub const PROJECT_WORDS: &[&str] = &[
    "Machine Learning",
    "Symbolic Regression",
    "System Design",
    "Cancer Treatment",
    "Fluid Dynamics",
    "Knowledge Rep.",
    "Biological Modelling",
    "Informal Economy",
];

/// Sinusoidal float superimposed on every particle's interpolated position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wobble {
    pub amplitude: f32,
    /// Radians per second added to each particle's phase seed.
    pub speed: f32,
}

impl Wobble {
    pub const NONE: Self = Self {
        amplitude: 0.0,
        speed: 0.0,
    };
}

#[derive(Debug, Clone, Copy)]
pub struct MorphConfig {
    pub pool_size: usize,
    pub morph_duration: Duration,
    /// Upper bound of the per-particle start delay drawn on every morph.
    pub stagger: Duration,
    /// Per-particle duration is `morph_duration * [1 - jitter, 1 + jitter]`.
    pub duration_jitter: f32,
    /// Targets get a random depth in `[-depth_jitter, depth_jitter]`.
    pub depth_jitter: f32,
    /// Radius of the shell the pool is seeded on; zero seeds every particle at the origin.
    pub initial_radius: f32,
    pub wobble: Wobble,
    pub tint_levels: u8,
    pub easing: fn(f32) -> f32,
}

impl MorphConfig {
    /// Staggered, floating particles with a cubic ease.
    pub const PUBLICATIONS: Self = Self {
        pool_size: 6000,
        morph_duration: Duration::from_millis(1400),
        stagger: Duration::from_millis(600),
        duration_jitter: 0.15,
        depth_jitter: 1.0,
        initial_radius: 12.0,
        wobble: Wobble {
            amplitude: 0.25,
            speed: 0.7,
        },
        tint_levels: 8,
        easing: easing::ease_in_out_cubic,
    };

    /// One global quadratic ease, every particle moving in lockstep.
    pub const PROJECTS: Self = Self {
        pool_size: 8000,
        morph_duration: Duration::from_millis(3000),
        stagger: Duration::ZERO,
        duration_jitter: 0.0,
        depth_jitter: 1.5,
        initial_radius: 0.0,
        wobble: Wobble::NONE,
        tint_levels: 8,
        easing: easing::ease_in_out,
    };

    /// Rescales the spatial constants for a world measured in different units.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            depth_jitter: self.depth_jitter * factor,
            initial_radius: self.initial_radius * factor,
            wobble: Wobble {
                amplitude: self.wobble.amplitude * factor,
                ..self.wobble
            },
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::EmptyPool);
        }

        if !(0.0..1.0).contains(&self.duration_jitter) {
            return Err(Error::InvalidConfig(format!(
                "duration jitter {} must lie in [0, 1)",
                self.duration_jitter
            )));
        }

        if self.tint_levels == 0 {
            return Err(Error::InvalidConfig("tint levels must be non-zero".into()));
        }

        if !self.depth_jitter.is_finite() || self.depth_jitter < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "depth jitter {} must be a non-negative number",
                self.depth_jitter
            )));
        }

        Ok(())
    }
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self::PUBLICATIONS
    }
}

/// Rasterisation and sampling constants for the glyph sampler.
#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    /// Integer factor the offscreen buffer is enlarged by relative to the box.
    pub supersample: u32,
    /// Font size as a fraction of the box height.
    pub fill: f32,
    /// Horizontal padding on each side, in box units.
    pub padding: f32,
    /// Smallest font size in buffer pixels the shrink step may produce.
    pub min_font_px: f32,
    pub alpha_threshold: u8,
    /// Extra cells per requested point when deriving the stride.
    pub oversample: f32,
    /// Below this many points the sampler retries with a smaller stride.
    pub min_points: usize,
    /// Fraction of the box the emitted points span.
    pub world_scale: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            supersample: 4,
            fill: 0.7,
            padding: 30.0,
            min_font_px: 20.0,
            alpha_threshold: 100,
            oversample: 2.2,
            min_points: 300,
            world_scale: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerConfig {
    /// Pause between a morph settling and the next word.
    pub hold: Duration,
    /// Quiet period a resize must survive before the current word is refitted.
    pub resize_debounce: Duration,
}

impl SequencerConfig {
    pub const PUBLICATIONS: Self = Self {
        hold: Duration::from_millis(2500),
        resize_debounce: Duration::from_millis(120),
    };

    pub const PROJECTS: Self = Self {
        hold: Duration::from_millis(2200),
        resize_debounce: Duration::from_millis(120),
    };
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self::PUBLICATIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        MorphConfig::PUBLICATIONS.validate().unwrap();
        MorphConfig::PROJECTS.validate().unwrap();
    }

    #[test]
    fn scaling_touches_only_spatial_constants() {
        let scaled = MorphConfig::PUBLICATIONS.scaled(4.0);

        assert_eq!(scaled.depth_jitter, 4.0);
        assert_eq!(scaled.initial_radius, 48.0);
        assert_eq!(scaled.wobble.amplitude, 1.0);
        assert_eq!(scaled.wobble.speed, 0.7);
        assert_eq!(scaled.morph_duration, MorphConfig::PUBLICATIONS.morph_duration);
        assert_eq!(scaled.pool_size, 6000);
    }

    #[test]
    fn empty_pool_is_rejected() {
        let config = MorphConfig {
            pool_size: 0,
            ..MorphConfig::default()
        };

        assert!(matches!(config.validate(), Err(Error::EmptyPool)));
    }

    #[test]
    fn full_duration_jitter_is_rejected() {
        let config = MorphConfig {
            duration_jitter: 1.0,
            ..MorphConfig::default()
        };

        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn zero_tint_levels_is_rejected() {
        let config = MorphConfig {
            tint_levels: 0,
            ..MorphConfig::PROJECTS
        };

        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
