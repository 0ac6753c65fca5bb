//! Black hole scene: particle field, central object, camera rig and the
//! decorative star asset

use glam::{Vec2, Vec3};
use rand::Rng;

use super::particles::{ParticleFrame, ParticleSet, group_rotation_z};
use super::mapper::CAMERA_START;

/// Central object spin, radians per second on every axis
pub const CENTRAL_SPIN: f32 = 0.5;
/// Fraction of the remaining camera distance covered per frame
pub const CAMERA_EASE: f32 = 0.05;

/// Star scale at the narrowest supported viewport
pub const STAR_SCALE_MIN: f32 = 0.01;
/// Star scale gained across `STAR_WIDTH_SPAN` pixels of extra width
pub const STAR_SCALE_GAIN: f32 = 0.015;
pub const STAR_WIDTH_MIN_PX: f32 = 320.0;
pub const STAR_WIDTH_SPAN_PX: f32 = 1600.0;

/// Headline font search range and cap, pixels
pub const HEADLINE_FONT_MIN: f32 = 10.0;
pub const HEADLINE_FONT_MAX: f32 = 100.0;
pub const HEADLINE_FONT_CAP: f32 = 60.0;

/// Decorative star model load state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StarAsset {
    #[default]
    Loading,
    Ready,
    /// Load failed; the renderer draws a primitive in its place
    Placeholder,
}

impl StarAsset {
    pub fn on_loaded(&mut self) {
        if *self == StarAsset::Loading {
            log::info!("Star model loaded");
            *self = StarAsset::Ready;
        }
    }

    pub fn on_failed(&mut self, reason: &str) {
        log::warn!("Star model failed to load ({}), using placeholder", reason);
        *self = StarAsset::Placeholder;
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StarAsset::Loading => "loading",
            StarAsset::Ready => "ready",
            StarAsset::Placeholder => "placeholder",
        }
    }
}

/// Star model scale for a viewport width
pub fn star_scale(viewport_width: f32) -> f32 {
    let scale = STAR_SCALE_MIN + (viewport_width - STAR_WIDTH_MIN_PX) * STAR_SCALE_GAIN / STAR_WIDTH_SPAN_PX;
    if scale.is_finite() { scale.max(STAR_SCALE_MIN) } else { STAR_SCALE_MIN }
}

/// Largest whole-pixel font size whose measured width fits, capped.
///
/// `measure` returns the rendered headline width for a font size.
pub fn fit_headline_font(viewport_width: f32, measure: impl Fn(f32) -> f32) -> f32 {
    let mut best = HEADLINE_FONT_MIN;
    let mut size = HEADLINE_FONT_MIN;
    while size <= HEADLINE_FONT_MAX {
        if measure(size) <= viewport_width {
            best = size;
        } else {
            break;
        }
        size += 1.0;
    }
    best.min(HEADLINE_FONT_CAP)
}

/// Camera position eased toward a target, always looking at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            position: CAMERA_START,
        }
    }
}

impl CameraRig {
    pub const LOOK_AT: Vec3 = Vec3::ZERO;

    pub fn update(&mut self, target: Vec3) {
        if target.is_finite() {
            self.position = self.position.lerp(target, CAMERA_EASE);
        }
    }
}

/// Everything the scene renders, owned by the page
#[derive(Debug, Clone)]
pub struct Scene {
    pub particles: ParticleSet,
    pub camera: CameraRig,
    pub star: StarAsset,
    /// Seconds since mount
    pub elapsed_s: f32,
}

impl Scene {
    pub fn new<R: Rng + ?Sized>(inner_count: usize, rng: &mut R) -> Self {
        Self {
            particles: ParticleSet::generate(inner_count, rng),
            camera: CameraRig::default(),
            star: StarAsset::default(),
            elapsed_s: 0.0,
        }
    }

    /// Advance by `dt`; the camera heads for `camera_target`
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        camera_target: Vec3,
        dt: f32,
        pointer: Option<Vec2>,
        jitter: bool,
        rng: &mut R,
    ) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed_s += dt;
        }
        self.particles.update(
            &ParticleFrame {
                elapsed_s: self.elapsed_s,
                pointer,
                jitter,
            },
            rng,
        );
        self.camera.update(camera_target);
    }

    pub fn central_rotation(&self) -> Vec3 {
        Vec3::splat(self.elapsed_s * CENTRAL_SPIN)
    }

    pub fn group_rotation_z(&self) -> f32 {
        group_rotation_z(self.elapsed_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_star_scale() {
        assert_eq!(star_scale(320.0), 0.01);
        assert_eq!(star_scale(100.0), 0.01);
        assert!((star_scale(1920.0) - 0.025).abs() < 1e-6);
        assert_eq!(star_scale(f32::NAN), 0.01);
    }

    #[test]
    fn test_headline_fits_and_caps() {
        // Width grows 10px per font pixel
        let measure = |size: f32| size * 10.0;
        assert_eq!(fit_headline_font(425.0, measure), 42.0);
        assert_eq!(fit_headline_font(5000.0, measure), HEADLINE_FONT_CAP);
        // Nothing fits: fall back to the minimum
        assert_eq!(fit_headline_font(20.0, measure), HEADLINE_FONT_MIN);
    }

    #[test]
    fn test_star_asset_failure_falls_back() {
        let mut star = StarAsset::default();
        star.on_failed("404");
        assert_eq!(star, StarAsset::Placeholder);
        // A late success does not undo the placeholder
        star.on_loaded();
        assert_eq!(star, StarAsset::Placeholder);

        let mut star = StarAsset::default();
        star.on_loaded();
        assert_eq!(star, StarAsset::Ready);
    }

    #[test]
    fn test_camera_eases_toward_target() {
        let mut rig = CameraRig::default();
        let start = rig.position.distance(Vec3::ZERO);
        rig.update(Vec3::ZERO);
        assert!((rig.position.distance(Vec3::ZERO) - start * 0.95).abs() < 1e-4);
        rig.update(Vec3::NAN);
        assert!(rig.position.is_finite());
    }

    #[test]
    fn test_rotation_follows_elapsed_time() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut scene = Scene::new(16, &mut rng);
        for _ in 0..10 {
            scene.update(Vec3::ZERO, 0.2, None, true, &mut rng);
        }
        assert!((scene.elapsed_s - 2.0).abs() < 1e-5);
        assert!((scene.central_rotation() - Vec3::splat(1.0)).length() < 1e-4);
        assert!((scene.group_rotation_z() - 0.1).abs() < 1e-6);
    }
}
