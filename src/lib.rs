//! Event Horizon - scroll choreography for an animated portfolio landing page
//!
//! Core modules:
//! - `sim`: Deterministic choreography (scroll progress, channels, state machines, timers)
//! - `platform`: Browser host/presenter abstraction
//! - `settings`: Persisted user preferences

pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings};

/// Page configuration constants
pub mod consts {
    /// Root font size in CSS pixels (1rem)
    pub const ROOT_FONT_PX: f32 = 16.0;
    /// Collapsed box width in rem before the grow segment starts
    pub const BOX_MIN_WIDTH_REM: f32 = 16.0;

    /// Scroll container height as a multiple of the viewport (500vh)
    pub const SCROLL_VIEWPORT_MULTIPLE: f32 = 5.0;
    /// Minimum spacing between scroll samples (~60 Hz)
    pub const SCROLL_THROTTLE_MS: f64 = 16.0;

    /// Progress where the box starts growing
    pub const GROW_START: f32 = 0.25;
    /// Progress where the box reaches full viewport width
    pub const GROW_END: f32 = 0.5;
    /// Progress after which the disintegration overlay is removed
    pub const OVERLAY_HIDE_AT: f32 = 0.75;

    /// Box height before growth (percent of viewport height)
    pub const BOX_MIN_HEIGHT_PCT: f32 = 30.0;
    /// Height the box settles toward after full growth
    pub const BOX_FLOOR_HEIGHT_PCT: f32 = 60.0;
    /// Ease-out exponent for the shrink segment
    pub const SHRINK_EASE_EXPONENT: f32 = 1.5;

    /// Intro background (#320809)
    pub const INTRO_BACKGROUND: u32 = 0x320809;
    /// Revealed content background (#ffffff)
    pub const CONTENT_BACKGROUND: u32 = 0xffffff;

    /// Maximum dt fed to springs (prevents blow-ups after tab switches)
    pub const MAX_FRAME_DT: f32 = 0.1;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to [0, 1], mapping NaN to 0
#[inline]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Format a packed 0xRRGGBB color as a CSS hex string
pub fn css_hex(color: u32) -> String {
    format!("#{:06x}", color & 0x00ff_ffff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp01_handles_nan_and_bounds() {
        assert_eq!(clamp01(f32::NAN), 0.0);
        assert_eq!(clamp01(-3.0), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(0.4), 0.4);
    }

    #[test]
    fn test_css_hex() {
        assert_eq!(css_hex(consts::INTRO_BACKGROUND), "#320809");
        assert_eq!(css_hex(consts::CONTENT_BACKGROUND), "#ffffff");
    }
}
