//! Deterministic choreography module
//!
//! Everything that is a function of scroll progress and elapsed time lives
//! here. This module must stay pure and deterministic:
//! - Time comes in as an argument (frame clock), never read from the platform
//! - Seeded RNG only
//! - Timers fire in (due time, id) order
//! - No rendering or DOM dependencies; effects leave as `PageCommand`s

pub mod easing;
pub mod glitch;
pub mod keyframes;
pub mod mapper;
pub mod particles;
pub mod scene;
pub mod scroll;
pub mod spring;
pub mod state;
pub mod text;
pub mod tick;
pub mod timers;
pub mod view;

pub use keyframes::{Keyframe, KeyframeError, Keyframes};
pub use mapper::{Channels, ProgressMapper, SmoothedChannels, SmoothedFrame};
pub use particles::{ParticleInstance, ParticleSet};
pub use scene::{Scene, StarAsset, fit_headline_font, star_scale};
pub use scroll::{ScrollRange, ScrollSample, ScrollTracker, Viewport};
pub use state::{Outstanding, PageState, PageTimer};
pub use text::{TextSequenceState, TextSequencer};
pub use tick::{Frame, FrameInput, star_loaded, tick};
pub use timers::{TimerId, TimerQueue};
pub use view::{PageCommand, ViewController, ViewState};
