//! Terminal intro: type a command, pause, scramble the answer, then vanish
//!
//! Entirely timer-driven; scroll has no influence here. The sequencer only
//! reports [`TextSignal::Finished`] so the page can unlock scrolling.

use rand::Rng;
use serde::Serialize;

use super::timers::{TimerId, TimerQueue};

/// Command typed at the prompt
pub const TYPING_TEXT: &str = "whoami";
/// Name revealed by the scramble
pub const TARGET_TEXT: &str = "Weslley Miranda";
/// Filler alphabet for not-yet-locked letters
pub const SCRAMBLE_CHARS: &str = "!@#$%^&*():{};|,.<>/?";

pub const TYPING_INTERVAL_MS: f64 = 200.0;
pub const BLINK_INTERVAL_MS: f64 = 300.0;
pub const PAUSE_BEFORE_SCRAMBLE_MS: f64 = 2000.0;
pub const SCRAMBLE_INTERVAL_MS: f64 = 50.0;
pub const CYCLES_PER_LETTER: usize = 2;
/// Delay between the reveal and the prompt line fading out
pub const COMMAND_FADE_DELAY_MS: f64 = 500.0;
/// Delay between the prompt fading and the whole block being removed.
///
/// Counted from the fade, so the block goes 2.5 s after the reveal.
pub const HIDE_DELAY_MS: f64 = 2000.0;

/// Sequencer stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum TextSequenceState {
    #[default]
    Typing,
    Paused,
    Scrambling,
    Revealed,
    Hidden,
}

/// Timer payloads owned by the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTimer {
    TypeChar,
    Blink,
    ScrambleStart,
    ScrambleTick,
    FadeCommand,
    Hide,
}

/// Outward notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSignal {
    /// Text display removed; scrolling may be unlocked
    Finished,
}

#[derive(Debug, Clone, Default)]
struct TextTimers {
    typing: Option<TimerId>,
    blink: Option<TimerId>,
    pause: Option<TimerId>,
    scramble: Option<TimerId>,
    fade: Option<TimerId>,
    hide: Option<TimerId>,
}

impl TextTimers {
    fn all(&mut self) -> [&mut Option<TimerId>; 6] {
        [
            &mut self.typing,
            &mut self.blink,
            &mut self.pause,
            &mut self.scramble,
            &mut self.fade,
            &mut self.hide,
        ]
    }
}

/// The typing → scramble → reveal state machine
#[derive(Debug, Clone)]
pub struct TextSequencer {
    state: TextSequenceState,
    typing_text: String,
    target_text: String,
    typed: usize,
    scramble_pos: usize,
    command: String,
    output: String,
    cursor_visible: bool,
    command_faded: bool,
    mounted: bool,
    timers: TextTimers,
}

impl TextSequencer {
    pub fn new() -> Self {
        Self::with_text(TYPING_TEXT, TARGET_TEXT)
    }

    pub fn with_text(typing_text: &str, target_text: &str) -> Self {
        Self {
            state: TextSequenceState::Typing,
            typing_text: typing_text.to_string(),
            target_text: target_text.to_string(),
            typed: 0,
            scramble_pos: 0,
            command: String::new(),
            output: String::new(),
            cursor_visible: true,
            command_faded: false,
            mounted: false,
            timers: TextTimers::default(),
        }
    }

    /// Start typing and blinking
    pub fn mount<E: From<TextTimer> + Copy>(&mut self, timers: &mut TimerQueue<E>, now_ms: f64) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.timers.typing =
            Some(timers.set_interval(now_ms, TYPING_INTERVAL_MS, TextTimer::TypeChar.into()));
        self.timers.blink =
            Some(timers.set_interval(now_ms, BLINK_INTERVAL_MS, TextTimer::Blink.into()));
        log::debug!("Text sequencer mounted");
    }

    /// Cancel every timer this sequencer owns
    pub fn unmount<E: Copy>(&mut self, timers: &mut TimerQueue<E>) {
        for slot in self.timers.all() {
            if let Some(id) = slot.take() {
                timers.cancel(id);
            }
        }
        self.mounted = false;
    }

    /// React to one of our timers firing
    pub fn on_timer<E, R>(
        &mut self,
        timer: TextTimer,
        timers: &mut TimerQueue<E>,
        now_ms: f64,
        rng: &mut R,
    ) -> Option<TextSignal>
    where
        E: From<TextTimer> + Copy,
        R: Rng + ?Sized,
    {
        match timer {
            TextTimer::TypeChar => self.type_char(timers, now_ms),
            TextTimer::Blink => self.cursor_visible = !self.cursor_visible,
            TextTimer::ScrambleStart => self.start_scramble(timers, now_ms),
            TextTimer::ScrambleTick => self.scramble_tick(timers, now_ms, rng),
            TextTimer::FadeCommand => {
                self.timers.fade = None;
                self.command_faded = true;
                self.timers.hide =
                    Some(timers.set_timeout(now_ms, HIDE_DELAY_MS, TextTimer::Hide.into()));
            }
            TextTimer::Hide => {
                self.timers.hide = None;
                self.unmount(timers);
                self.state = TextSequenceState::Hidden;
                self.cursor_visible = false;
                log::info!("Intro text finished");
                return Some(TextSignal::Finished);
            }
        }
        None
    }

    fn type_char<E: From<TextTimer> + Copy>(&mut self, timers: &mut TimerQueue<E>, now_ms: f64) {
        if self.state != TextSequenceState::Typing {
            return;
        }
        let total = self.typing_text.chars().count();
        self.typed = (self.typed + 1).min(total);
        self.command = self.typing_text.chars().take(self.typed).collect();

        if self.typed == total {
            if let Some(id) = self.timers.typing.take() {
                timers.cancel(id);
            }
            self.state = TextSequenceState::Paused;
            self.timers.pause = Some(timers.set_timeout(
                now_ms,
                PAUSE_BEFORE_SCRAMBLE_MS,
                TextTimer::ScrambleStart.into(),
            ));
            log::debug!("Typing done: {}", self.command);
        }
    }

    fn start_scramble<E: From<TextTimer> + Copy>(&mut self, timers: &mut TimerQueue<E>, now_ms: f64) {
        self.timers.pause = None;
        self.state = TextSequenceState::Scrambling;
        self.command = self.typing_text.clone();
        self.output.clear();
        self.scramble_pos = 0;
        self.timers.scramble = Some(timers.set_interval(
            now_ms,
            SCRAMBLE_INTERVAL_MS,
            TextTimer::ScrambleTick.into(),
        ));
    }

    fn scramble_tick<E, R>(&mut self, timers: &mut TimerQueue<E>, now_ms: f64, rng: &mut R)
    where
        E: From<TextTimer> + Copy,
        R: Rng + ?Sized,
    {
        if self.state != TextSequenceState::Scrambling {
            return;
        }
        self.output = scramble_frame(&self.target_text, self.scramble_pos, rng);
        self.scramble_pos += 1;

        if self.scramble_pos >= self.scramble_ticks() {
            if let Some(id) = self.timers.scramble.take() {
                timers.cancel(id);
            }
            self.output = self.target_text.clone();
            self.state = TextSequenceState::Revealed;
            self.timers.fade = Some(timers.set_timeout(
                now_ms,
                COMMAND_FADE_DELAY_MS,
                TextTimer::FadeCommand.into(),
            ));
            log::debug!("Scramble revealed: {}", self.output);
        }
    }

    /// Ticks needed to lock every letter
    pub fn scramble_ticks(&self) -> usize {
        self.target_text.chars().count() * CYCLES_PER_LETTER
    }

    pub fn state(&self) -> TextSequenceState {
        self.state
    }

    pub fn is_typing_done(&self) -> bool {
        self.state != TextSequenceState::Typing
    }

    pub fn is_finished(&self) -> bool {
        self.state == TextSequenceState::Hidden
    }

    /// Text typed at the prompt so far
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Scrambled / revealed output line
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    /// Prompt line has started fading (zoom-out begins)
    pub fn command_faded(&self) -> bool {
        self.command_faded
    }

    /// Prompt line as displayed, with the blinking cursor while typing
    pub fn command_line(&self) -> String {
        let cursor = self.state == TextSequenceState::Typing && self.cursor_visible;
        format!("$ {}{}", self.command, if cursor { "_" } else { "" })
    }

    /// Output line as displayed; empty until typing finishes
    pub fn output_line(&self) -> String {
        if !self.is_typing_done() || self.is_finished() {
            return String::new();
        }
        format!("{}{}", self.output, if self.cursor_visible { "_" } else { "" })
    }
}

impl Default for TextSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// One scramble frame: letters below `pos / cycles` are final, the rest noise
pub fn scramble_frame<R: Rng + ?Sized>(target: &str, pos: usize, rng: &mut R) -> String {
    let filler: Vec<char> = SCRAMBLE_CHARS.chars().collect();
    target
        .chars()
        .enumerate()
        .map(|(index, ch)| {
            if pos > index * CYCLES_PER_LETTER {
                ch
            } else {
                filler[rng.random_range(0..filler.len())]
            }
        })
        .collect()
}
