//! Sporadic glitch bursts over the black hole scene

use rand::Rng;

use super::timers::{TimerId, TimerQueue};

/// Burst period is drawn once per mount from [MIN, MAX)
pub const GLITCH_PERIOD_MIN_MS: f64 = 5000.0;
pub const GLITCH_PERIOD_MAX_MS: f64 = 10000.0;
/// How long a single burst stays on
pub const GLITCH_BURST_MS: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlitchTimer {
    Start,
    End,
}

/// Periodic burst scheduler
#[derive(Debug, Clone, Default)]
pub struct Glitch {
    active: bool,
    period_ms: f64,
    interval: Option<TimerId>,
    burst_end: Option<TimerId>,
}

impl Glitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount<E, R>(&mut self, timers: &mut TimerQueue<E>, now_ms: f64, rng: &mut R)
    where
        E: From<GlitchTimer> + Copy,
        R: Rng + ?Sized,
    {
        if self.interval.is_some() {
            return;
        }
        self.period_ms = rng.random_range(GLITCH_PERIOD_MIN_MS..GLITCH_PERIOD_MAX_MS);
        self.interval = Some(timers.set_interval(now_ms, self.period_ms, GlitchTimer::Start.into()));
        log::debug!("Glitch every {:.0}ms", self.period_ms);
    }

    pub fn unmount<E: Copy>(&mut self, timers: &mut TimerQueue<E>) {
        for id in [self.interval.take(), self.burst_end.take()].into_iter().flatten() {
            timers.cancel(id);
        }
        self.active = false;
    }

    /// Returns the new on/off state when it changes
    pub fn on_timer<E>(&mut self, timer: GlitchTimer, timers: &mut TimerQueue<E>, now_ms: f64) -> Option<bool>
    where
        E: From<GlitchTimer> + Copy,
    {
        match timer {
            GlitchTimer::Start => {
                if let Some(id) = self.burst_end.take() {
                    timers.cancel(id);
                }
                self.burst_end = Some(timers.set_timeout(now_ms, GLITCH_BURST_MS, GlitchTimer::End.into()));
                if self.active {
                    None
                } else {
                    self.active = true;
                    Some(true)
                }
            }
            GlitchTimer::End => {
                self.burst_end = None;
                if self.active {
                    self.active = false;
                    Some(false)
                } else {
                    None
                }
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the repeating interval is armed
    pub fn is_mounted(&self) -> bool {
        self.interval.is_some()
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }
}
