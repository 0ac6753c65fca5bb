//! Progress → animation channel mapping
//!
//! Every channel here is a pure function of one progress sample (plus the
//! viewport for pixel widths). Spring-smoothed channels keep their own state
//! in [`SmoothedChannels`] and are stepped by wall-clock time.

use glam::Vec3;
use serde::Serialize;

use super::easing::{PathOffset, box_height_pct, parabolic_offset};
use super::keyframes::{KeyframeError, Keyframes};
use super::scroll::Viewport;
use super::spring::Spring;
use crate::consts::*;
use crate::{clamp01, css_hex};

/// Camera start position for the intro scene
pub const CAMERA_START: Vec3 = Vec3::new(10.0, -17.5, 10.0);
/// Camera end position once fully scrolled
pub const CAMERA_END: Vec3 = Vec3::ZERO;

/// Derived values for one progress sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channels {
    /// Clamped progress these channels were computed from
    pub progress: f32,
    /// Revealing box width in pixels
    pub box_width_px: f32,
    /// Whether the box covers the full viewport width
    pub box_full_width: bool,
    /// Revealing box height, percent of viewport height
    pub box_height_pct: f32,
    /// Disintegration shader progress uniform
    pub particle_progress: f32,
    /// Disintegration shader scale uniform
    pub particle_scale: f32,
    /// Whether the disintegration overlay is displayed
    pub overlay_visible: bool,
    /// Where the camera is heading this frame
    pub camera_target: Vec3,
    /// Glass panel vertical offset, percent of its height
    pub glass_offset_pct: f32,
    pub glass_opacity: f32,
    pub content_scale: f32,
    pub content_opacity: f32,
    /// Page background, 0xRRGGBB
    pub background: u32,
}

impl Channels {
    /// CSS width; full-viewport boxes are reported in `vw`
    pub fn css_width(&self) -> String {
        if self.box_full_width {
            "100vw".to_string()
        } else {
            format!("{:.1}px", self.box_width_px)
        }
    }

    pub fn css_height(&self) -> String {
        format!("{:.2}%", self.box_height_pct)
    }

    pub fn css_background(&self) -> String {
        css_hex(self.background)
    }

    pub fn css_glass_transform(&self) -> String {
        format!("translateY({:.2}%)", self.glass_offset_pct)
    }
}

/// Keyframe tables for every linear channel
#[derive(Debug, Clone)]
pub struct ProgressMapper {
    particle_progress: Keyframes,
    particle_scale: Keyframes,
    glass_offset: Keyframes,
    glass_opacity: Keyframes,
    content_scale: Keyframes,
    content_opacity: Keyframes,
}

impl ProgressMapper {
    pub fn new() -> Result<Self, KeyframeError> {
        Ok(Self {
            particle_progress: Keyframes::linear((0.1, GROW_END), (0.0, 1.0))?,
            particle_scale: Keyframes::linear((GROW_START, GROW_END), (0.1, 1.0))?,
            glass_offset: Keyframes::linear((0.0, 1.0), (100.0, 0.0))?,
            glass_opacity: Keyframes::linear((0.0, 0.2), (0.0, 1.0))?,
            content_scale: Keyframes::linear((0.0, 1.0), (0.9, 1.0))?,
            content_opacity: Keyframes::linear((0.0, 0.3), (0.0, 1.0))?,
        })
    }

    /// Width keyframes depend on the viewport: 16rem → 100vw → 100vw
    pub fn width_keyframes(viewport: &Viewport) -> Result<Keyframes, KeyframeError> {
        let collapsed = BOX_MIN_WIDTH_REM * viewport.rem;
        let full = viewport.width.max(collapsed);
        Keyframes::new(&[GROW_START, GROW_END, 1.0], &[collapsed, full, full])
    }

    /// Compute every channel from one progress sample
    pub fn map(&self, progress: f32, viewport: &Viewport) -> Channels {
        let p = clamp01(progress);

        let (box_width_px, box_full_width) = match Self::width_keyframes(viewport) {
            Ok(width) => (width.sample(p), p >= GROW_END),
            Err(e) => {
                log::warn!("Invalid viewport {:?}: {}", viewport, e);
                (BOX_MIN_WIDTH_REM * ROOT_FONT_PX, p >= GROW_END)
            }
        };

        Channels {
            progress: p,
            box_width_px,
            box_full_width,
            box_height_pct: box_height_pct(p),
            particle_progress: self.particle_progress.sample(p),
            particle_scale: self.particle_scale.sample(p),
            overlay_visible: p < OVERLAY_HIDE_AT,
            camera_target: camera_target(p),
            glass_offset_pct: self.glass_offset.sample(p),
            glass_opacity: self.glass_opacity.sample(p),
            content_scale: self.content_scale.sample(p),
            content_opacity: self.content_opacity.sample(p),
            background: if p >= GROW_END {
                CONTENT_BACKGROUND
            } else {
                INTRO_BACKGROUND
            },
        }
    }
}

/// Camera target: straight line from the intro pose to the origin
pub fn camera_target(progress: f32) -> Vec3 {
    CAMERA_START.lerp(CAMERA_END, clamp01(progress))
}

/// Spring-smoothed channel values for a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmoothedFrame {
    /// Star path fraction after smoothing
    pub star_t: f32,
    /// Star offsets along the parabola
    pub star: PathOffset,
    /// "About me" heading horizontal offset, percent
    pub heading_x_pct: f32,
}

/// Channels that lag behind their inputs via springs
#[derive(Debug, Clone)]
pub struct SmoothedChannels {
    star: Spring,
    heading: Spring,
}

impl SmoothedChannels {
    pub fn new() -> Self {
        Self {
            star: Spring::new(0.0),
            heading: Spring::new(0.0),
        }
    }

    /// Step the springs toward their targets by `dt` seconds
    pub fn update(&mut self, progress: f32, star_active: bool, dt: f32) -> SmoothedFrame {
        self.star.set_target(if star_active { 1.0 } else { 0.0 });
        self.heading.set_target(clamp01(progress));
        self.star.step(dt);
        self.heading.step(dt);
        self.snapshot()
    }

    /// Current values without advancing time
    pub fn snapshot(&self) -> SmoothedFrame {
        let star_t = clamp01(self.star.value);
        SmoothedFrame {
            star_t,
            star: parabolic_offset(star_t),
            heading_x_pct: -100.0 + 100.0 * clamp01(self.heading.value),
        }
    }
}

impl Default for SmoothedChannels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mapper() -> ProgressMapper {
        ProgressMapper::new().unwrap()
    }

    #[test]
    fn test_width_grows_from_rem_to_viewport() {
        let viewport = Viewport::new(1280.0, 720.0);
        let m = mapper();
        assert_eq!(m.map(0.0, &viewport).box_width_px, 256.0);
        assert_eq!(m.map(0.25, &viewport).box_width_px, 256.0);
        assert!((m.map(0.375, &viewport).box_width_px - 768.0).abs() < 0.01);
        let full = m.map(0.5, &viewport);
        assert_eq!(full.box_width_px, 1280.0);
        assert!(full.box_full_width);
        assert_eq!(full.css_width(), "100vw");
        assert_eq!(m.map(0.3, &viewport).css_width(), "460.8px");
    }

    #[test]
    fn test_out_of_range_matches_clamped() {
        let viewport = Viewport::default();
        let m = mapper();
        assert_eq!(m.map(1.5, &viewport), m.map(1.0, &viewport));
        assert_eq!(m.map(-0.2, &viewport), m.map(0.0, &viewport));
        assert_eq!(m.map(f32::NAN, &viewport), m.map(0.0, &viewport));
    }

    #[test]
    fn test_map_is_idempotent() {
        let viewport = Viewport::default();
        let m = mapper();
        for p in [0.0, 0.13, 0.25, 0.49, 0.5, 0.8, 1.0] {
            assert_eq!(m.map(p, &viewport), m.map(p, &viewport));
        }
    }

    #[test]
    fn test_overlay_and_background_thresholds() {
        let viewport = Viewport::default();
        let m = mapper();
        assert!(m.map(0.74, &viewport).overlay_visible);
        assert!(!m.map(0.75, &viewport).overlay_visible);
        assert_eq!(m.map(0.49, &viewport).css_background(), "#320809");
        assert_eq!(m.map(0.5, &viewport).css_background(), "#ffffff");
    }

    #[test]
    fn test_camera_target_endpoints() {
        assert_eq!(camera_target(0.0), CAMERA_START);
        assert_eq!(camera_target(1.0), CAMERA_END);
        assert_eq!(camera_target(0.5), Vec3::new(5.0, -8.75, 5.0));
    }

    #[test]
    fn test_narrow_viewport_never_shrinks_box() {
        let viewport = Viewport::new(200.0, 600.0);
        let c = mapper().map(0.5, &viewport);
        assert_eq!(c.box_width_px, 256.0);
    }

    #[test]
    fn test_smoothed_channels_lag_and_settle() {
        let mut smoothed = SmoothedChannels::new();
        let first = smoothed.update(1.0, true, 1.0 / 60.0);
        assert!(first.star_t > 0.0 && first.star_t < 1.0);
        assert!(first.heading_x_pct > -100.0 && first.heading_x_pct < 0.0);

        for _ in 0..240 {
            smoothed.update(1.0, true, 1.0 / 60.0);
        }
        let settled = smoothed.snapshot();
        assert!((settled.star_t - 1.0).abs() < 1e-3);
        assert!(settled.heading_x_pct.abs() < 0.1);
    }

    #[test]
    fn test_smoothed_snapshot_is_pure() {
        let mut smoothed = SmoothedChannels::new();
        smoothed.update(0.4, true, 0.05);
        assert_eq!(smoothed.snapshot(), smoothed.snapshot());
    }

    proptest! {
        #[test]
        fn prop_channels_within_ranges(p in -1.0f32..2.0, w in 320.0f32..3840.0, h in 320.0f32..2160.0) {
            let viewport = Viewport::new(w, h);
            let c = mapper().map(p, &viewport);
            prop_assert!((0.0..=1.0).contains(&c.progress));
            prop_assert!((0.0..=1.0).contains(&c.particle_progress));
            prop_assert!((0.1..=1.0).contains(&c.particle_scale));
            prop_assert!((0.0..=100.0).contains(&c.glass_offset_pct));
            prop_assert!((0.0..=1.0).contains(&c.glass_opacity));
            prop_assert!((0.9..=1.0).contains(&c.content_scale));
            prop_assert!((0.0..=1.0).contains(&c.content_opacity));
            prop_assert!(c.box_width_px >= 256.0 - 1e-3);
            prop_assert!(c.box_width_px <= w.max(256.0) + 1e-3);
        }

        #[test]
        fn prop_map_is_pure(p in 0.0f32..1.0) {
            let viewport = Viewport::default();
            let m = mapper();
            prop_assert_eq!(m.map(p, &viewport), m.map(p, &viewport));
        }
    }
}
