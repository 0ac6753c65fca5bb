//! Event Horizon entry point
//!
//! On the web this mounts the page and runs the frame loop. Natively it
//! replays a scripted scroll session and logs what the page would do.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    event_horizon::platform::web::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Event Horizon (native) starting...");
    log::info!("Native mode replays a scroll session - run with `trunk serve` for the web version");

    if let Err(e) = replay::run() {
        log::error!("Replay failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod replay {
    use event_horizon::Settings;
    use event_horizon::platform::{Presenter, RecordingHost, RecordingPresenter};
    use event_horizon::sim::{FrameInput, KeyframeError, PageState, Viewport, tick};

    const FRAME_MS: f64 = 16.0;

    /// (time in ms, scroll progress) waypoints, interpolated per frame
    const SCRIPT: &[(f64, f32)] = &[
        (0.0, 0.0),
        (7500.0, 0.0),
        (9000.0, 0.3),
        (10_500.0, 0.8),
        (12_000.0, 1.0),
        (13_500.0, 0.2),
        (15_000.0, 0.0),
    ];

    fn scripted_progress(now_ms: f64) -> f32 {
        let next = SCRIPT.iter().position(|&(t, _)| t > now_ms);
        match next {
            Some(0) => SCRIPT[0].1,
            Some(i) => {
                let (t0, p0) = SCRIPT[i - 1];
                let (t1, p1) = SCRIPT[i];
                let t = ((now_ms - t0) / (t1 - t0)) as f32;
                event_horizon::lerp(p0, p1, t)
            }
            None => SCRIPT.last().map(|&(_, p)| p).unwrap_or(0.0),
        }
    }

    pub fn run() -> Result<(), KeyframeError> {
        let settings = Settings::load();
        let viewport = Viewport::default();
        let extent = settings.scroll_range.extent(&viewport, viewport.height * 6.0);
        let mut state = PageState::new(settings, viewport, 42)?;
        let mut host = RecordingHost::new();
        let mut presenter = RecordingPresenter::new();

        presenter.apply_all(&state.mount(&mut host, 0.0));

        let end = SCRIPT.last().map(|&(t, _)| t).unwrap_or(0.0);
        let mut last_view = state.view().state();
        let mut last_text = state.text().state();
        let mut now = FRAME_MS;
        while now <= end {
            state.on_scroll(scripted_progress(now) * extent, viewport.height * 6.0, now);
            let frame = tick(&mut state, &FrameInput::default(), now);
            presenter.apply_all(&frame.commands);

            if frame.view != last_view {
                log::info!(
                    "{:>6.0}ms  progress {:.2}  view {} -> {}  box {} x {}",
                    now,
                    frame.channels.progress,
                    last_view.as_str(),
                    frame.view.as_str(),
                    frame.channels.css_width(),
                    frame.channels.css_height()
                );
                last_view = frame.view;
            }
            if frame.text_state != last_text {
                log::info!("{:>6.0}ms  text {:?}  {}", now, frame.text_state, frame.output_line);
                last_text = frame.text_state;
            }
            now += FRAME_MS;
        }

        presenter.apply_all(&state.unmount(&mut host));
        let outstanding = state.outstanding();
        log::info!(
            "Replay done: {} commands applied, {} timers / {} listeners outstanding",
            presenter.applied.len(),
            outstanding.timers,
            outstanding.listeners
        );
        Ok(())
    }
}
