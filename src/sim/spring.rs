//! Second-order spring smoothing for lagged channels

use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_DT;

/// Integration step; frames are split into sub-steps of at most this size
const SPRING_STEP: f32 = 1.0 / 240.0;
/// Below this distance and speed the spring snaps to rest
const REST_EPSILON: f32 = 1e-4;

/// Spring constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    /// stiffness 100 / damping 20 / mass 1 (critically damped)
    pub const DEFAULT: Self = Self {
        stiffness: 100.0,
        damping: 20.0,
        mass: 1.0,
    };

    /// Damping ratio; 1.0 is critical
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A spring-smoothed scalar following a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub config: SpringConfig,
    pub value: f32,
    pub velocity: f32,
    pub target: f32,
}

impl Spring {
    pub fn new(initial: f32) -> Self {
        Self::with_config(initial, SpringConfig::DEFAULT)
    }

    pub fn with_config(initial: f32, config: SpringConfig) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Advance by `dt` seconds of wall-clock time.
    ///
    /// Sub-stepped so the result depends on elapsed time, not on how often
    /// frames arrive.
    pub fn step(&mut self, dt: f32) {
        if !(dt > 0.0) || self.is_at_rest() {
            return;
        }
        let mut remaining = dt.min(MAX_FRAME_DT);
        while remaining > 0.0 {
            let h = remaining.min(SPRING_STEP);
            let displacement = self.value - self.target;
            let force = -self.config.stiffness * displacement - self.config.damping * self.velocity;
            self.velocity += force / self.config.mass * h;
            self.value += self.velocity * h;
            remaining -= h;
        }
        if (self.value - self.target).abs() < REST_EPSILON && self.velocity.abs() < REST_EPSILON {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    pub fn is_at_rest(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_critically_damped() {
        assert!((SpringConfig::DEFAULT.damping_ratio() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_converges_without_overshoot() {
        let mut spring = Spring::new(0.0);
        spring.set_target(1.0);
        let mut max_seen: f32 = 0.0;
        for _ in 0..120 {
            spring.step(1.0 / 60.0);
            max_seen = max_seen.max(spring.value);
        }
        assert!((spring.value - 1.0).abs() < 1e-3);
        assert!(max_seen <= 1.0 + 1e-3, "overshoot: {}", max_seen);
    }

    #[test]
    fn test_lags_behind_target() {
        let mut spring = Spring::new(0.0);
        spring.set_target(1.0);
        spring.step(1.0 / 60.0);
        assert!(spring.value > 0.0 && spring.value < 0.5);
    }

    #[test]
    fn test_frame_rate_independent() {
        let mut fast = Spring::new(0.0);
        let mut slow = Spring::new(0.0);
        fast.set_target(1.0);
        slow.set_target(1.0);
        for _ in 0..24 {
            fast.step(1.0 / 120.0);
        }
        for _ in 0..6 {
            slow.step(1.0 / 30.0);
        }
        assert!((fast.value - slow.value).abs() < 0.01);
    }

    #[test]
    fn test_ignores_bad_dt_and_target() {
        let mut spring = Spring::new(0.5);
        spring.set_target(f32::NAN);
        spring.step(f32::NAN);
        spring.step(-1.0);
        assert_eq!(spring.value, 0.5);
        assert!(spring.is_at_rest());
    }
}
