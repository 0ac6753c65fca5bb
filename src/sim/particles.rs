//! Black hole particle field
//!
//! Two ring populations generated once. Each frame free particles shimmer
//! around their base position; after a delay the first few particles drift
//! out to fixed anchor points.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use rand::Rng;
use std::f32::consts::TAU;

/// Inner ring radius bounds
pub const INNER_RADIUS_MIN: f32 = 7.5;
pub const INNER_RADIUS_MAX: f32 = 15.0;
/// Inner ring depth half-range
pub const INNER_DEPTH: f32 = 2.0;
/// Default inner population size (outer is a quarter of this)
pub const DEFAULT_INNER_COUNT: usize = 2500;

/// Per-axis jitter half-range
pub const JITTER: f32 = 0.015;
/// Seconds after mount before anchored particles start moving
pub const ANCHOR_START_S: f32 = 5.0;
/// Extra delay per anchored particle index
pub const ANCHOR_STAGGER_S: f32 = 0.5;
/// Fraction of the remaining distance covered per frame
pub const ANCHOR_EASE: f32 = 0.05;
/// Fixed targets for particles 0..3
pub const ANCHORS: [Vec3; 3] = [
    Vec3::new(5.0, 0.0, 0.0),
    Vec3::new(0.0, 5.0, 0.0),
    Vec3::new(-5.0, 0.0, 0.0),
];

/// Whole-field spin about z, radians per second
pub const GROUP_SPIN: f32 = 0.05;
/// Pointer (NDC) to scene units
pub const POINTER_SCALE: f32 = 10.0;
pub const HOVER_RADIUS: f32 = 2.0;
pub const HOVER_SCALE: f32 = 1.2;

/// GPU-ready particle instance for the renderer feed
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub scale: f32,
}

/// Inputs for one particle update
#[derive(Debug, Clone, Copy, Default)]
pub struct ParticleFrame {
    /// Seconds since the scene mounted
    pub elapsed_s: f32,
    /// Pointer in normalized device coordinates, if known
    pub pointer: Option<Vec2>,
    /// Random shimmer (off for reduced motion)
    pub jitter: bool,
}

/// Fixed-size particle buffer
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSet {
    base: Vec<Vec3>,
    positions: Vec<Vec3>,
    scales: Vec<f32>,
    inner_count: usize,
}

impl ParticleSet {
    /// Generate `inner_count` inner particles and `inner_count / 4` outer ones
    pub fn generate<R: Rng + ?Sized>(inner_count: usize, rng: &mut R) -> Self {
        let outer_count = inner_count / 4;
        let mut base = Vec::with_capacity(inner_count + outer_count);
        for _ in 0..inner_count {
            base.push(ring_point(rng, INNER_RADIUS_MIN, INNER_RADIUS_MAX, INNER_DEPTH));
        }
        for _ in 0..outer_count {
            base.push(ring_point(
                rng,
                INNER_RADIUS_MIN / 2.0,
                INNER_RADIUS_MAX * 2.0,
                INNER_DEPTH * 10.0,
            ));
        }
        log::debug!("Generated {} inner + {} outer particles", inner_count, outer_count);
        Self {
            positions: base.clone(),
            scales: vec![1.0; base.len()],
            base,
            inner_count,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn inner_count(&self) -> usize {
        self.inner_count
    }

    /// Initial layout, never modified
    pub fn base(&self) -> &[Vec3] {
        &self.base
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn scales(&self) -> &[f32] {
        &self.scales
    }

    /// Seconds at which particle `index` starts heading for its anchor
    pub fn anchor_start(index: usize) -> f32 {
        ANCHOR_START_S + index as f32 * ANCHOR_STAGGER_S
    }

    /// Advance one frame in place
    pub fn update<R: Rng + ?Sized>(&mut self, frame: &ParticleFrame, rng: &mut R) {
        let pointer = frame
            .pointer
            .map(|p| Vec3::new(p.x * POINTER_SCALE, p.y * POINTER_SCALE, 0.0));

        for i in 0..self.positions.len() {
            let anchored = i < ANCHORS.len() && frame.elapsed_s > ANCHOR_START_S;
            self.positions[i] = if anchored {
                // Held in place until this particle's own start
                if frame.elapsed_s > Self::anchor_start(i) {
                    self.positions[i].lerp(ANCHORS[i], ANCHOR_EASE)
                } else {
                    self.positions[i]
                }
            } else if frame.jitter {
                self.base[i] + jitter(rng)
            } else {
                self.base[i]
            };

            self.scales[i] = match pointer {
                Some(p) if self.positions[i].distance(p) < HOVER_RADIUS => HOVER_SCALE,
                _ => 1.0,
            };
        }
    }

    /// `(previous, frame) -> next` form of [`update`](Self::update)
    pub fn advanced<R: Rng + ?Sized>(&self, frame: &ParticleFrame, rng: &mut R) -> Self {
        let mut next = self.clone();
        next.update(frame, rng);
        next
    }

    /// Flatten for upload
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.positions
            .iter()
            .zip(&self.scales)
            .map(|(p, &scale)| ParticleInstance {
                position: p.to_array(),
                scale,
            })
            .collect()
    }
}

/// Field spin about z at `elapsed_s`
pub fn group_rotation_z(elapsed_s: f32) -> f32 {
    elapsed_s * GROUP_SPIN
}

fn ring_point<R: Rng + ?Sized>(rng: &mut R, r_min: f32, r_max: f32, depth: f32) -> Vec3 {
    let radius = rng.random_range(r_min..r_max);
    let angle = rng.random::<f32>() * TAU;
    let z = rng.random_range(-depth..depth);
    Vec3::new(angle.cos() * radius, angle.sin() * radius, z)
}

fn jitter<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        (rng.random::<f32>() - 0.5) * 2.0 * JITTER,
        (rng.random::<f32>() - 0.5) * 2.0 * JITTER,
        (rng.random::<f32>() - 0.5) * 2.0 * JITTER,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn field(n: usize) -> (ParticleSet, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(42);
        (ParticleSet::generate(n, &mut rng), rng)
    }

    #[test]
    fn test_generation_bounds() {
        let (set, _) = field(400);
        assert_eq!(set.len(), 500);
        assert_eq!(set.inner_count(), 400);

        for p in &set.base()[..400] {
            let r = p.truncate().length();
            assert!((INNER_RADIUS_MIN - 1e-3..=INNER_RADIUS_MAX + 1e-3).contains(&r));
            assert!(p.z.abs() <= INNER_DEPTH);
        }
        for p in &set.base()[400..] {
            let r = p.truncate().length();
            assert!((3.75 - 1e-3..=30.0 + 1e-3).contains(&r));
            assert!(p.z.abs() <= 20.0);
        }
    }

    #[test]
    fn test_jitter_is_bounded_and_not_accumulated() {
        let (mut set, mut rng) = field(200);
        let frame = ParticleFrame {
            elapsed_s: 1.0,
            jitter: true,
            ..Default::default()
        };
        for _ in 0..500 {
            set.update(&frame, &mut rng);
        }
        for (p, b) in set.positions().iter().zip(set.base()) {
            let d = (*p - *b).abs();
            assert!(d.max_element() <= JITTER + 1e-6);
        }
    }

    #[test]
    fn test_anchors_wait_for_their_delay() {
        let (mut set, mut rng) = field(10);
        let frame = ParticleFrame {
            elapsed_s: 5.2,
            jitter: false,
            ..Default::default()
        };
        set.update(&frame, &mut rng);
        // Particle 0 started at 5.0s, particle 1 starts at 5.5s
        let expected0 = set.base()[0].lerp(ANCHORS[0], ANCHOR_EASE);
        assert!(set.positions()[0].distance(expected0) < 1e-5);
        assert_eq!(set.positions()[1], set.base()[1]);
    }

    #[test]
    fn test_anchored_particles_hold_before_their_start() {
        let (mut set, mut rng) = field(10);
        let early = ParticleFrame {
            elapsed_s: 4.0,
            jitter: true,
            ..Default::default()
        };
        set.update(&early, &mut rng);
        let held = set.positions()[2];
        let before = set.positions()[1].distance(ANCHORS[1]);

        let waiting = ParticleFrame {
            elapsed_s: 5.7,
            ..early
        };
        for _ in 0..10 {
            set.update(&waiting, &mut rng);
        }
        // Particle 2 starts at 6.0s; no shimmer in between
        assert_eq!(set.positions()[2], held);
        assert!(set.positions()[1].distance(ANCHORS[1]) < before);
    }

    #[test]
    fn test_anchors_approach_exponentially() {
        let (mut set, mut rng) = field(10);
        let frame = ParticleFrame {
            elapsed_s: 10.0,
            jitter: true,
            ..Default::default()
        };
        let start = set.positions()[2].distance(ANCHORS[2]);
        set.update(&frame, &mut rng);
        let after_one = set.positions()[2].distance(ANCHORS[2]);
        assert!((after_one - start * (1.0 - ANCHOR_EASE)).abs() < 1e-3);

        for _ in 0..300 {
            set.update(&frame, &mut rng);
        }
        for (i, anchor) in ANCHORS.iter().enumerate() {
            assert!(set.positions()[i].distance(*anchor) < 1e-3);
        }
    }

    #[test]
    fn test_hover_scales_nearby_particles() {
        let (mut set, mut rng) = field(50);
        let target = set.base()[10];
        let frame = ParticleFrame {
            elapsed_s: 0.0,
            pointer: Some(Vec2::new(target.x / POINTER_SCALE, target.y / POINTER_SCALE)),
            jitter: false,
        };
        set.update(&frame, &mut rng);
        // Depth is at most 2 for inner particles, so hover can still miss;
        // only assert when the particle sits near the z=0 plane
        if target.z.abs() < 1.0 {
            assert_eq!(set.scales()[10], HOVER_SCALE);
        }
        assert!(set.scales().iter().all(|&s| s == 1.0 || s == HOVER_SCALE));
    }

    #[test]
    fn test_advanced_leaves_previous_untouched() {
        let (set, mut rng) = field(20);
        let frame = ParticleFrame {
            elapsed_s: 6.0,
            jitter: true,
            ..Default::default()
        };
        let next = set.advanced(&frame, &mut rng);
        assert_eq!(set.positions(), set.base());
        assert_ne!(next.positions(), set.positions());
    }

    #[test]
    fn test_instances_match_buffer() {
        let (set, _) = field(8);
        let instances = set.instances();
        assert_eq!(instances.len(), set.len());
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), set.len() * 16);
    }
}
