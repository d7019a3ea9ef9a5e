//! Progress curves applied to each particle's local morph progress.
//!
//! Every curve maps `[0, 1]` onto `[0, 1]` with `f(0) = 0` and `f(1) = 1`.

pub fn linear(t: f32) -> f32 {
    t
}

pub fn ease_in(t: f32) -> f32 {
    t * t
}

pub fn ease_out(t: f32) -> f32 {
    t * (2.0 - t)
}

/// Quadratic in-out: `2t²` below the midpoint, `1 - (2 - 2t)² / 2` above it.
pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        let k = -2.0 * t + 2.0;
        1.0 - k * k / 2.0
    }
}

/// Cubic in-out, gentler at both ends than the quadratic curve.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let k = -2.0 * t + 2.0;
        1.0 - k * k * k / 2.0
    }
}
