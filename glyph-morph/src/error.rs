use std::io;

use thiserror::Error;

/// Failures that prevent an animation from starting.
///
/// Sampling a word with no visible glyphs is not an error; the sampler returns
/// an empty point set and callers keep the previous shape.
#[derive(Debug, Error)]
pub enum Error {
    #[error("particle pool must contain at least one particle")]
    EmptyPool,

    #[error("word list must contain at least one entry")]
    NoWords,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("host environment unavailable: {0}")]
    HostUnavailable(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
