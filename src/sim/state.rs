//! Page state and composition root
//!
//! `PageState` owns every piece of the choreography: scroll tracking, the
//! channel mapper, the view controller, the intro text, glitch bursts, the
//! particle scene and the timer queue they all share. Nothing here is global;
//! mount builds the runtime pieces and unmount releases all of them.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::glitch::{Glitch, GlitchTimer};
use super::keyframes::KeyframeError;
use super::mapper::{ProgressMapper, SmoothedChannels};
use super::scene::Scene;
use super::scroll::{ScrollSample, ScrollTracker, Viewport};
use super::text::{TextSequencer, TextTimer};
use super::timers::TimerQueue;
use super::view::{PageCommand, ViewController};
use crate::platform::{Host, ListenerKind};
use crate::settings::Settings;

/// Payload for every timer the page schedules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTimer {
    Text(TextTimer),
    Glitch(GlitchTimer),
}

impl From<TextTimer> for PageTimer {
    fn from(timer: TextTimer) -> Self {
        PageTimer::Text(timer)
    }
}

impl From<GlitchTimer> for PageTimer {
    fn from(timer: GlitchTimer) -> Self {
        PageTimer::Glitch(timer)
    }
}

/// Resources still held, for leak checks after unmount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outstanding {
    pub timers: usize,
    pub listeners: usize,
}

impl Outstanding {
    pub fn is_clear(&self) -> bool {
        self.timers == 0 && self.listeners == 0
    }
}

/// Complete page state
#[derive(Debug, Clone)]
pub struct PageState {
    pub settings: Settings,
    pub viewport: Viewport,
    pub document_height: f32,
    pub scroll_y: f32,

    pub(super) tracker: ScrollTracker,
    pub(super) mapper: ProgressMapper,
    pub(super) smoothed: SmoothedChannels,
    pub(super) view: ViewController,
    pub(super) text: TextSequencer,
    pub(super) glitch: Glitch,
    pub scene: Scene,
    pub(super) timers: TimerQueue<PageTimer>,
    pub(super) rng: Pcg32,

    /// Latest pointer position in normalized device coordinates
    pub pointer: Option<Vec2>,
    pub(super) listeners: Vec<ListenerKind>,
    pub(super) mounted: bool,
    pub(super) scroll_locked: bool,
    pub(super) last_frame_ms: Option<f64>,
    pub(super) commands: Vec<PageCommand>,
}

impl PageState {
    /// Build a page with a seeded RNG
    pub fn new(settings: Settings, viewport: Viewport, seed: u64) -> Result<Self, KeyframeError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let scene = Scene::new(settings.quality.inner_particles(), &mut rng);
        Ok(Self {
            tracker: ScrollTracker::new(settings.scroll_range, settings.throttle_ms),
            mapper: ProgressMapper::new()?,
            smoothed: SmoothedChannels::new(),
            view: ViewController::new(),
            text: TextSequencer::new(),
            glitch: Glitch::new(),
            scene,
            timers: TimerQueue::new(),
            rng,
            document_height: viewport.height,
            scroll_y: 0.0,
            viewport,
            settings,
            pointer: None,
            listeners: Vec::new(),
            mounted: false,
            scroll_locked: false,
            last_frame_ms: None,
            commands: Vec::new(),
        })
    }

    /// Subscribe listeners, start the intro text and lock scrolling.
    ///
    /// Returns the commands that set up the initial presentation.
    pub fn mount(&mut self, host: &mut dyn Host, now_ms: f64) -> Vec<PageCommand> {
        if self.mounted {
            log::warn!("Page already mounted");
            return Vec::new();
        }
        self.mounted = true;

        for kind in [ListenerKind::Scroll, ListenerKind::Resize] {
            host.subscribe(kind);
            self.listeners.push(kind);
        }

        self.scroll_locked = true;
        self.scroll_y = 0.0;
        self.tracker.reset();
        self.commands.push(PageCommand::LockScroll(true));
        self.commands.push(PageCommand::ScrollToTop);
        self.commands.extend(self.view.initial_commands());
        self.commands.push(PageCommand::FitHeadline);

        self.text.mount(&mut self.timers, now_ms);
        self.sync_glitch(now_ms);
        self.last_frame_ms = Some(now_ms);

        log::info!(
            "Page mounted: {} particles, glitch {}",
            self.scene.particles.len(),
            if self.settings.effective_glitch() { "on" } else { "off" }
        );
        self.take_commands()
    }

    /// Release every timer and listener; returns the final commands
    pub fn unmount(&mut self, host: &mut dyn Host) -> Vec<PageCommand> {
        if !self.mounted {
            return Vec::new();
        }
        self.mounted = false;

        self.text.unmount(&mut self.timers);
        if self.glitch.is_active() {
            self.commands.push(PageCommand::Glitch(false));
        }
        self.glitch.unmount(&mut self.timers);
        let stray = self.timers.cancel_all();
        if stray > 0 {
            log::debug!("Cancelled {} stray timers", stray);
        }

        for kind in self.listeners.drain(..) {
            host.unsubscribe(kind);
        }

        if self.scroll_locked {
            self.scroll_locked = false;
            self.commands.push(PageCommand::LockScroll(false));
        }
        self.last_frame_ms = None;

        log::info!("Page unmounted");
        self.take_commands()
    }

    /// Raw scroll event
    pub fn on_scroll(&mut self, scroll_y: f32, document_height: f32, now_ms: f64) {
        self.scroll_y = scroll_y;
        self.document_height = document_height;
        self.sample(now_ms);
    }

    /// Viewport resize; progress is re-derived against the new extent
    pub fn on_resize(&mut self, viewport: Viewport, now_ms: f64) {
        self.viewport = viewport;
        if self.mounted && !self.commands.contains(&PageCommand::FitHeadline) {
            self.commands.push(PageCommand::FitHeadline);
        }
        self.sample(now_ms);
    }

    /// Toggle reduced motion at runtime; glitch bursts follow immediately
    pub fn set_reduced_motion(&mut self, reduced: bool, now_ms: f64) {
        if self.settings.reduced_motion == reduced {
            return;
        }
        self.settings.reduced_motion = reduced;
        log::info!("Reduced motion {}", if reduced { "on" } else { "off" });
        self.sync_glitch(now_ms);
    }

    /// Arm glitch bursts only while mounted, allowed, and the scene is shown
    pub(super) fn sync_glitch(&mut self, now_ms: f64) {
        let wanted =
            self.mounted && self.settings.effective_glitch() && self.view.state().shows_scene();
        if wanted && !self.glitch.is_mounted() {
            self.glitch.mount(&mut self.timers, now_ms, &mut self.rng);
        } else if !wanted && self.glitch.is_mounted() {
            if self.glitch.is_active() {
                self.commands.push(PageCommand::Glitch(false));
            }
            self.glitch.unmount(&mut self.timers);
        }
    }

    pub fn on_pointer(&mut self, pointer: Option<Vec2>) {
        self.pointer = pointer.filter(|p| p.is_finite());
    }

    fn sample(&mut self, now_ms: f64) {
        if !self.mounted {
            return;
        }
        let sample = ScrollSample {
            scroll_y: self.scroll_y,
            viewport: self.viewport,
            document_height: self.document_height,
        };
        self.tracker.on_event(sample, now_ms);
    }

    /// Last published scroll progress
    pub fn progress(&self) -> f32 {
        self.tracker.progress()
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn text(&self) -> &TextSequencer {
        &self.text
    }

    pub fn glitch(&self) -> &Glitch {
        &self.glitch
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Timers and listeners currently held
    pub fn outstanding(&self) -> Outstanding {
        Outstanding {
            timers: self.timers.active(),
            listeners: self.listeners.len(),
        }
    }

    pub(super) fn take_commands(&mut self) -> Vec<PageCommand> {
        std::mem::take(&mut self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::RecordingHost;

    fn page() -> PageState {
        PageState::new(Settings::default(), Viewport::default(), 7).unwrap()
    }

    #[test]
    fn test_mount_sets_up_intro() {
        let mut host = RecordingHost::new();
        let mut state = page();
        let commands = state.mount(&mut host, 0.0);

        assert_eq!(commands[0], PageCommand::LockScroll(true));
        assert_eq!(commands[1], PageCommand::ScrollToTop);
        assert!(commands.contains(&PageCommand::ShowScene(true)));
        assert!(state.is_scroll_locked());
        assert_eq!(host.active(), 2);
        // Typing, blink and glitch interval
        assert_eq!(state.outstanding(), Outstanding { timers: 3, listeners: 2 });
    }

    #[test]
    fn test_unmount_releases_everything() {
        let mut host = RecordingHost::new();
        let mut state = page();
        state.mount(&mut host, 0.0);
        let commands = state.unmount(&mut host);

        assert!(commands.contains(&PageCommand::LockScroll(false)));
        assert!(state.outstanding().is_clear());
        assert_eq!(host.active(), 0);
        assert!(state.unmount(&mut host).is_empty());
    }

    #[test]
    fn test_double_mount_is_ignored() {
        let mut host = RecordingHost::new();
        let mut state = page();
        state.mount(&mut host, 0.0);
        assert!(state.mount(&mut host, 5.0).is_empty());
        assert_eq!(host.active(), 2);
    }

    #[test]
    fn test_reduced_motion_skips_glitch() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut host = RecordingHost::new();
        let mut state = PageState::new(settings, Viewport::default(), 7).unwrap();
        state.mount(&mut host, 0.0);
        assert_eq!(state.outstanding().timers, 2);
    }

    #[test]
    fn test_reduced_motion_toggle_follows_glitch() {
        let mut host = RecordingHost::new();
        let mut state = page();
        state.mount(&mut host, 0.0);
        assert!(state.glitch().is_mounted());

        state.set_reduced_motion(true, 100.0);
        assert!(!state.glitch().is_mounted());
        assert_eq!(state.outstanding().timers, 2);

        state.set_reduced_motion(false, 200.0);
        assert!(state.glitch().is_mounted());
        assert_eq!(state.outstanding().timers, 3);
    }

    #[test]
    fn test_resize_requests_one_headline_fit() {
        let mut host = RecordingHost::new();
        let mut state = page();
        let commands = state.mount(&mut host, 0.0);
        assert!(commands.contains(&PageCommand::FitHeadline));

        state.on_resize(Viewport::new(800.0, 600.0), 10.0);
        state.on_resize(Viewport::new(700.0, 600.0), 12.0);
        let fits = state
            .take_commands()
            .into_iter()
            .filter(|c| *c == PageCommand::FitHeadline)
            .count();
        assert_eq!(fits, 1);
    }

    #[test]
    fn test_scroll_before_mount_is_ignored() {
        let mut state = page();
        state.on_scroll(1000.0, 4320.0, 0.0);
        assert_eq!(state.progress(), 0.0);
    }

    #[test]
    fn test_particle_count_follows_preset() {
        let state = PageState::new(
            Settings::from_preset(crate::QualityPreset::Low),
            Viewport::default(),
            1,
        )
        .unwrap();
        assert_eq!(state.scene.particles.len(), 750);
    }
}
