//! Intro/content view state and the commands emitted on transitions

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Macro view mode, derived from progress alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ViewState {
    /// Black hole scene, box collapsed
    #[default]
    Intro,
    /// Box growing toward full viewport width
    Transitioning,
    /// Box covers the viewport; content revealed
    Content,
}

impl ViewState {
    /// Threshold the raw progress scalar
    pub fn from_progress(progress: f32) -> Self {
        let p = crate::clamp01(progress);
        if p >= GROW_END {
            ViewState::Content
        } else if p >= GROW_START {
            ViewState::Transitioning
        } else {
            ViewState::Intro
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewState::Intro => "intro",
            ViewState::Transitioning => "transitioning",
            ViewState::Content => "content",
        }
    }

    pub fn shows_scene(&self) -> bool {
        *self != ViewState::Content
    }
}

/// Presentation commands; applied by a single presenter, never by the core
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PageCommand {
    /// Lock (true) or release (false) page scrolling
    LockScroll(bool),
    /// Jump back to the top of the page
    ScrollToTop,
    /// Page background color, 0xRRGGBB
    SetBackground(u32),
    /// Mount/unmount the black hole scene
    ShowScene(bool),
    /// Reveal/conceal the main content panel
    RevealContent(bool),
    /// Start/stop the decorative star path animation
    StarAnimation(bool),
    /// Remove the intro terminal text from the page
    HideIntroText,
    /// Turn the glitch post-processing pass on/off
    Glitch(bool),
    /// Re-fit the intro headline font to the viewport width
    FitHeadline,
}

/// Tracks the current view and reports changes as commands
#[derive(Debug, Clone, Default)]
pub struct ViewController {
    state: ViewState,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Recompute from `progress`; pushes entry/exit commands on a change.
    ///
    /// Only crossing into or out of `Content` has side effects.
    pub fn update(&mut self, progress: f32, commands: &mut Vec<PageCommand>) -> bool {
        let next = ViewState::from_progress(progress);
        if next == self.state {
            return false;
        }
        let was_content = self.state == ViewState::Content;
        let is_content = next == ViewState::Content;
        log::debug!("View {} -> {}", self.state.as_str(), next.as_str());
        self.state = next;

        if is_content && !was_content {
            commands.extend(enter_content());
        } else if was_content && !is_content {
            commands.extend(exit_content());
        }
        true
    }

    /// Commands that put the page in the initial intro presentation
    pub fn initial_commands(&self) -> Vec<PageCommand> {
        exit_content().to_vec()
    }
}

fn enter_content() -> [PageCommand; 4] {
    [
        PageCommand::ShowScene(false),
        PageCommand::SetBackground(CONTENT_BACKGROUND),
        PageCommand::RevealContent(true),
        PageCommand::StarAnimation(true),
    ]
}

fn exit_content() -> [PageCommand; 4] {
    [
        PageCommand::ShowScene(true),
        PageCommand::SetBackground(INTRO_BACKGROUND),
        PageCommand::RevealContent(false),
        PageCommand::StarAnimation(false),
    ]
}
