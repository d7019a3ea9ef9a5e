//! Particle text morphing: words are rasterised, sampled into point clouds and
//! a fixed pool of particles glides from one cloud to the next.

pub mod clock;
pub mod config;
pub mod easing;
pub mod engine;
pub mod error;
pub mod oklch;
pub mod raster;
pub mod sampler;
pub mod scheduler;
pub mod sequencer;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MorphConfig, SamplerConfig, SequencerConfig, Wobble};
pub use engine::{MorphEngine, Particle, Phase};
pub use error::{Error, Result};
pub use raster::{AlphaBuffer, BitmapFont, TextRasterizer};
pub use sampler::GlyphSampler;
pub use scheduler::FrameScheduler;
pub use sequencer::{Bounds, Sequencer, Stage};
pub use view::{Camera, Palette, ParticleView};
