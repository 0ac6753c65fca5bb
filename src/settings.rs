//! Page settings and preferences
//!
//! Persisted in LocalStorage, independent of any page content.

use serde::{Deserialize, Serialize};

use crate::consts::SCROLL_THROTTLE_MS;
use crate::sim::ScrollRange;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    /// Inner ring particle count; the outer ring gets a quarter of this
    pub fn inner_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 600,
            QualityPreset::Medium => 1500,
            QualityPreset::High => 2500,
        }
    }
}

/// Page settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Particle density
    pub quality: QualityPreset,

    // === Effects ===
    /// Periodic glitch bursts over the scene
    pub glitch: bool,

    // === Scrolling ===
    /// Denominator for scroll progress
    pub scroll_range: ScrollRange,
    /// Minimum spacing between scroll samples, milliseconds
    pub throttle_ms: f64,

    // === Accessibility ===
    /// Reduced motion (no glitch, no particle shimmer)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            glitch: true,
            scroll_range: ScrollRange::default(),
            throttle_ms: SCROLL_THROTTLE_MS,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective glitch (respects reduced_motion)
    pub fn effective_glitch(&self) -> bool {
        self.glitch && !self.reduced_motion
    }

    /// Effective particle shimmer (respects reduced_motion)
    pub fn effective_jitter(&self) -> bool {
        !self.reduced_motion
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "event_horizon_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_counts() {
        assert_eq!(QualityPreset::High.inner_particles(), 2500);
        assert_eq!(QualityPreset::Medium.inner_particles(), 1500);
        assert_eq!(QualityPreset::Low.inner_particles(), 600);
    }

    #[test]
    fn test_reduced_motion_overrides_effects() {
        let mut settings = Settings::default();
        assert!(settings.effective_glitch());
        assert!(settings.effective_jitter());
        settings.reduced_motion = true;
        assert!(!settings.effective_glitch());
        assert!(!settings.effective_jitter());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"quality":"Low"}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::Low);
        assert_eq!(settings.scroll_range, ScrollRange::ViewportMultiple(5.0));
        assert_eq!(settings.throttle_ms, SCROLL_THROTTLE_MS);

        let json = serde_json::to_string(&Settings::from_preset(QualityPreset::Medium)).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.quality, QualityPreset::Medium);
    }
}
