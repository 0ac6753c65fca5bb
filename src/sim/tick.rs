//! Per-frame page tick
//!
//! One call per animation frame. Pending scroll samples are flushed, the
//! view is updated, due timers are fired in order, and then every channel is
//! computed from the single progress value sampled for this frame.

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::glitch::GlitchTimer;
use super::mapper::{Channels, SmoothedFrame};
use super::scene::{CameraRig, star_scale};
use super::state::{PageState, PageTimer};
use super::text::{TextSequenceState, TextSignal};
use super::view::{PageCommand, ViewState};
use crate::consts::*;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Pointer in normalized device coordinates; `None` keeps the last one
    pub pointer: Option<Vec2>,
}

/// Everything the renderer and presenter need for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub now_ms: f64,
    /// Seconds since the previous frame, clamped
    pub dt: f32,
    pub view: ViewState,
    pub channels: Channels,
    pub smoothed: SmoothedFrame,

    // === Scene ===
    pub scene_visible: bool,
    pub camera_position: Vec3,
    pub camera_look_at: Vec3,
    pub central_rotation: Vec3,
    pub group_rotation_z: f32,
    pub star_asset: &'static str,
    pub star_scale: f32,
    pub glitch: bool,

    // === Intro text ===
    pub text_state: TextSequenceState,
    pub command_line: String,
    pub output_line: String,
    pub command_faded: bool,

    /// Presentation commands produced this frame, in order
    pub commands: Vec<PageCommand>,
}

/// Advance the page to `now_ms`
pub fn tick(state: &mut PageState, input: &FrameInput, now_ms: f64) -> Frame {
    // Wall-clock gap drives scene time; springs get the clamped value
    let gap_s = match state.last_frame_ms {
        Some(last) if now_ms > last => ((now_ms - last) / 1000.0) as f32,
        _ => 0.0,
    };
    let dt = gap_s.min(MAX_FRAME_DT);
    state.last_frame_ms = Some(now_ms);
    if input.pointer.is_some() {
        state.on_pointer(input.pointer);
    }

    if state.mounted {
        // Trailing edge of the scroll throttle
        state.tracker.flush(now_ms);
    }

    // Single progress sample for the whole frame
    let progress = state.tracker.progress();
    if state.view.update(progress, &mut state.commands) {
        // Glitch bursts live and die with the scene
        state.sync_glitch(now_ms);
    }
    if state.mounted {
        fire_timers(state, now_ms);
    }

    let channels = state.mapper.map(progress, &state.viewport);
    let view = state.view.state();
    let smoothed = state
        .smoothed
        .update(progress, view == ViewState::Content, dt);

    let scene_visible = view.shows_scene();
    if scene_visible {
        let jitter = state.settings.effective_jitter();
        state
            .scene
            .update(channels.camera_target, gap_s, state.pointer, jitter, &mut state.rng);
    }

    Frame {
        now_ms,
        dt,
        view,
        channels,
        smoothed,
        scene_visible,
        camera_position: state.scene.camera.position,
        camera_look_at: CameraRig::LOOK_AT,
        central_rotation: state.scene.central_rotation(),
        group_rotation_z: state.scene.group_rotation_z(),
        star_asset: state.scene.star.as_str(),
        star_scale: star_scale(state.viewport.width),
        glitch: state.glitch.is_active(),
        text_state: state.text.state(),
        command_line: state.text.command_line(),
        output_line: state.text.output_line(),
        command_faded: state.text.command_faded(),
        commands: state.take_commands(),
    }
}

/// Star model finished loading (or failed)
pub fn star_loaded(state: &mut PageState, result: Result<(), String>) {
    match result {
        Ok(()) => state.scene.star.on_loaded(),
        Err(reason) => state.scene.star.on_failed(&reason),
    }
}

fn fire_timers(state: &mut PageState, now_ms: f64) {
    while let Some(fired) = state.timers.pop_due(now_ms) {
        match fired.event {
            PageTimer::Text(timer) => {
                let signal = state
                    .text
                    .on_timer(timer, &mut state.timers, fired.at_ms, &mut state.rng);
                if signal == Some(TextSignal::Finished) {
                    state.commands.push(PageCommand::HideIntroText);
                    if state.scroll_locked {
                        state.scroll_locked = false;
                        state.commands.push(PageCommand::LockScroll(false));
                        log::info!("Scroll unlocked");
                    }
                }
            }
            PageTimer::Glitch(timer) => {
                if let Some(on) = state.glitch.on_timer(timer, &mut state.timers, fired.at_ms) {
                    state.commands.push(PageCommand::Glitch(on));
                    if timer == GlitchTimer::Start {
                        log::debug!("Glitch burst at {:.0}ms", fired.at_ms);
                    }
                }
            }
        }
    }
}
