//! Non-linear channel shapes
//!
//! The height curve and the decorative star's parabolic path can't be
//! expressed as plain keyframes, so they live here as closed-form functions.

use crate::clamp01;
use crate::consts::*;

/// Ease-out with a configurable exponent: `1 - (1 - t)^exp`
#[inline]
pub fn ease_out_pow(t: f32, exponent: f32) -> f32 {
    1.0 - (1.0 - clamp01(t)).powf(exponent)
}

/// Three-segment box height (percent of viewport height)
///
/// Flat at `min_pct` until `GROW_START`, linear to 100% at `GROW_END`, then
/// an ease-out shrink toward `floor_pct` by progress 1.0.
pub fn height_pct(progress: f32, min_pct: f32, floor_pct: f32) -> f32 {
    let p = clamp01(progress);
    if p < GROW_START {
        min_pct
    } else if p <= GROW_END {
        let t = (p - GROW_START) / (GROW_END - GROW_START);
        min_pct + (100.0 - min_pct) * t
    } else {
        let t = (p - GROW_END) / (1.0 - GROW_END);
        100.0 - (100.0 - floor_pct) * ease_out_pow(t, SHRINK_EASE_EXPONENT)
    }
}

/// Box height using the default min/floor constants
#[inline]
pub fn box_height_pct(progress: f32) -> f32 {
    height_pct(progress, BOX_MIN_HEIGHT_PCT, BOX_FLOOR_HEIGHT_PCT)
}

/// Parabola through the star's start, mid and end anchors
pub mod parabola {
    pub const A: f32 = 0.83333;
    pub const B: f32 = -0.91667;
    pub const C: f32 = 0.1;
}

/// Offsets (percent) for the decorative star at path fraction `t`
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct PathOffset {
    /// CSS `right`, percent
    pub right_pct: f32,
    /// CSS `bottom`, percent
    pub bottom_pct: f32,
}

/// Evaluate `y = a·t² + b·t + c` and derive the right/bottom offsets
pub fn parabolic_offset(t: f32) -> PathOffset {
    let x = clamp01(t);
    let y = parabola::A * x * x + parabola::B * x + parabola::C;
    PathOffset {
        right_pct: (1.0 - x) * 100.0 - 30.0,
        bottom_pct: y * 100.0 + 2.0,
    }
}
