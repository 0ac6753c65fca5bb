//! Browser adapter
//!
//! Owns the DOM side of the page: listener closures, the animation frame
//! loop and the presenter that turns `PageCommand`s into style and class
//! changes. The external renderer pulls frames through [`PageHandle`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, Window};

use super::{Host, ListenerKind, Presenter};
use crate::css_hex;
use crate::settings::Settings;
use crate::sim::{
    Frame, FrameInput, PageCommand, PageState, Viewport, fit_headline_font, star_loaded, tick,
};

/// Element ids the presenter touches
mod ids {
    pub const SCENE: &str = "scene";
    pub const CONTENT: &str = "content";
    pub const STAR: &str = "star";
    pub const INTRO_TEXT: &str = "intro-text";
    pub const COMMAND_LINE: &str = "command-line";
    pub const OUTPUT_LINE: &str = "output-line";
    pub const REVEAL_BOX: &str = "reveal-box";
    pub const GLASS: &str = "glass";
    pub const HEADLINE: &str = "headline";
}

thread_local! {
    static PAGE: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
}

type Listener = Closure<dyn FnMut(web_sys::Event)>;

/// Window/document listener registrations with their closures
struct WebHost {
    window: Window,
    app: Weak<RefCell<App>>,
    listeners: Vec<(ListenerKind, Listener)>,
}

impl Host for WebHost {
    fn subscribe(&mut self, kind: ListenerKind) {
        let app = self.app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(app) = app.upgrade() else { return };
            // A frame callback may hold the borrow; the next frame re-samples anyway
            if let Ok(mut app) = app.try_borrow_mut() {
                app.on_event(kind);
            }
        });
        if let Err(e) = self
            .window
            .add_event_listener_with_callback(kind.event_name(), closure.as_ref().unchecked_ref())
        {
            log::error!("Failed to add {} listener: {:?}", kind.event_name(), e);
            return;
        }
        self.listeners.push((kind, closure));
    }

    fn unsubscribe(&mut self, kind: ListenerKind) {
        let Some(index) = self.listeners.iter().position(|(k, _)| *k == kind) else {
            log::warn!("No {} listener to remove", kind.event_name());
            return;
        };
        let (_, closure) = self.listeners.swap_remove(index);
        let _ = self
            .window
            .remove_event_listener_with_callback(kind.event_name(), closure.as_ref().unchecked_ref());
    }
}

/// Applies commands and per-frame channels to the document
struct DomPresenter {
    window: Window,
    document: Document,
}

impl DomPresenter {
    fn body(&self) -> Option<HtmlElement> {
        self.document.body()
    }

    fn element(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn toggle_class(&self, id: &str, class: &str, on: bool) {
        if let Some(el) = self.element(id) {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    fn set_style(&self, id: &str, property: &str, value: &str) {
        if let Some(el) = self.element(id).and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
            let _ = el.style().set_property(property, value);
        }
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(el) = self.element(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    /// Size the headline to the widest font that fits the window
    fn fit_headline(&self) {
        let Some(el) = self
            .element(ids::HEADLINE)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let width = self
            .window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as f32;
        let style = el.style();
        let size = fit_headline_font(width, |size| {
            let _ = style.set_property("font-size", &format!("{}px", size));
            el.scroll_width() as f32
        });
        let _ = style.set_property("font-size", &format!("{}px", size));
        log::debug!("Headline font {}px for width {}", size, width);
    }

    /// Continuous channels; discrete changes arrive as commands
    fn apply_frame(&self, frame: &Frame) {
        self.set_style(ids::REVEAL_BOX, "width", &frame.channels.css_width());
        self.set_style(ids::REVEAL_BOX, "height", &frame.channels.css_height());
        self.set_style(ids::GLASS, "transform", &frame.channels.css_glass_transform());
        self.set_style(ids::GLASS, "opacity", &format!("{:.3}", frame.channels.glass_opacity));
        self.set_style(
            ids::CONTENT,
            "transform",
            &format!("scale({:.4})", frame.channels.content_scale),
        );
        self.set_style(ids::STAR, "right", &format!("{:.2}%", frame.smoothed.star.right_pct));
        self.set_style(ids::STAR, "bottom", &format!("{:.2}%", frame.smoothed.star.bottom_pct));
        self.set_text(ids::COMMAND_LINE, &frame.command_line);
        self.set_text(ids::OUTPUT_LINE, &frame.output_line);
        self.toggle_class(ids::COMMAND_LINE, "faded", frame.command_faded);
    }
}

impl Presenter for DomPresenter {
    fn apply(&mut self, command: &PageCommand) {
        log::debug!("Apply {:?}", command);
        match command {
            PageCommand::LockScroll(locked) => {
                if let Some(body) = self.body() {
                    let overflow = if *locked { "hidden" } else { "auto" };
                    let _ = body.style().set_property("overflow", overflow);
                }
            }
            PageCommand::ScrollToTop => self.window.scroll_to_with_x_and_y(0.0, 0.0),
            PageCommand::SetBackground(color) => {
                if let Some(body) = self.body() {
                    let _ = body.style().set_property("background-color", &css_hex(*color));
                }
            }
            PageCommand::ShowScene(show) => self.toggle_class(ids::SCENE, "hidden", !show),
            PageCommand::RevealContent(reveal) => self.toggle_class(ids::CONTENT, "revealed", *reveal),
            PageCommand::StarAnimation(on) => self.toggle_class(ids::STAR, "animating", *on),
            PageCommand::HideIntroText => {
                if let Some(el) = self.element(ids::INTRO_TEXT) {
                    el.remove();
                }
            }
            PageCommand::Glitch(on) => self.toggle_class(ids::SCENE, "glitch", *on),
            PageCommand::FitHeadline => self.fit_headline(),
        }
    }
}

/// Page instance holding all state
struct App {
    state: PageState,
    host: WebHost,
    presenter: DomPresenter,
    last_frame: Option<Frame>,
    raf_handle: Option<i32>,
}

impl App {
    fn now(&self) -> f64 {
        self.presenter
            .window
            .performance()
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn viewport(&self) -> Viewport {
        let window = &self.presenter.window;
        let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport::new(width as f32, height as f32)
    }

    fn document_height(&self) -> f32 {
        self.presenter
            .document
            .document_element()
            .map(|el| el.scroll_height() as f32)
            .unwrap_or(0.0)
    }

    fn on_event(&mut self, kind: ListenerKind) {
        let now = self.now();
        match kind {
            ListenerKind::Scroll => {
                let scroll_y = self.presenter.window.scroll_y().unwrap_or(0.0) as f32;
                let document_height = self.document_height();
                self.state.on_scroll(scroll_y, document_height, now);
            }
            ListenerKind::Resize => {
                let viewport = self.viewport();
                self.state.on_resize(viewport, now);
            }
        }
    }

    fn frame(&mut self, time: f64) {
        let frame = tick(&mut self.state, &FrameInput::default(), time);
        self.presenter.apply_all(&frame.commands);
        self.presenter.apply_frame(&frame);
        self.last_frame = Some(frame);
    }

    fn unmount(&mut self) {
        if let Some(handle) = self.raf_handle.take() {
            let _ = self.presenter.window.cancel_animation_frame(handle);
        }
        let App { state, host, presenter, .. } = self;
        let commands = state.unmount(host);
        presenter.apply_all(&commands);
        let outstanding = state.outstanding();
        if !outstanding.is_clear() {
            log::warn!("Unmount left {:?}", outstanding);
        }
    }
}

fn request_animation_frame(app: Rc<RefCell<App>>) {
    let window = app.borrow().presenter.window.clone();
    let weak = Rc::downgrade(&app);
    let closure = Closure::once(move |time: f64| {
        if let Some(app) = weak.upgrade() {
            page_loop(app, time);
        }
    });
    match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        Ok(handle) => app.borrow_mut().raf_handle = Some(handle),
        Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
    }
    closure.forget();
}

fn page_loop(app: Rc<RefCell<App>>, time: f64) {
    {
        let mut a = app.borrow_mut();
        a.raf_handle = None;
        if !a.state.is_mounted() {
            return;
        }
        a.frame(time);
    }
    request_animation_frame(app);
}

/// Mount the page and start the frame loop
pub fn run() {
    log::info!("Event Horizon starting...");

    let Some(window) = web_sys::window() else {
        log::error!("No window; page not mounted");
        return;
    };
    let Some(document) = window.document() else {
        log::error!("No document; page not mounted");
        return;
    };

    let settings = Settings::load();
    let seed = js_sys::Date::now() as u64;
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let state = match PageState::new(settings, Viewport::new(width as f32, height as f32), seed) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Failed to build page: {}", e);
            return;
        }
    };

    let app = Rc::new_cyclic(|weak: &Weak<RefCell<App>>| {
        RefCell::new(App {
            state,
            host: WebHost {
                window: window.clone(),
                app: weak.clone(),
                listeners: Vec::new(),
            },
            presenter: DomPresenter {
                window: window.clone(),
                document,
            },
            last_frame: None,
            raf_handle: None,
        })
    });

    {
        let mut a = app.borrow_mut();
        let now = a.now();
        let App { state, host, presenter, .. } = &mut *a;
        let commands = state.mount(host, now);
        presenter.apply_all(&commands);
        log::info!("Page mounted with seed: {}", seed);
    }

    PAGE.with(|page| *page.borrow_mut() = Some(app.clone()));
    request_animation_frame(app);
}

/// Handle the external renderer uses to pull frames and push asset/pointer events
#[wasm_bindgen]
pub struct PageHandle {
    app: Rc<RefCell<App>>,
}

/// Handle to the page mounted by `run`, if any
#[wasm_bindgen]
pub fn page_handle() -> Option<PageHandle> {
    PAGE.with(|page| page.borrow().as_ref().map(|app| PageHandle { app: app.clone() }))
}

#[wasm_bindgen]
impl PageHandle {
    /// Last frame as JSON (`"null"` before the first frame)
    pub fn frame_json(&self) -> String {
        let app = self.app.borrow();
        match serde_json::to_string(&app.last_frame) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Frame serialization failed: {}", e);
                "null".to_string()
            }
        }
    }

    /// Particle instances as packed `[x, y, z, scale]` floats
    pub fn particle_buffer(&self) -> js_sys::Float32Array {
        let app = self.app.borrow();
        let instances = app.state.scene.particles.instances();
        let floats: &[f32] = bytemuck::cast_slice(&instances);
        js_sys::Float32Array::from(floats)
    }

    /// Pointer in normalized device coordinates
    pub fn set_pointer(&self, x: f32, y: f32) {
        self.app
            .borrow_mut()
            .state
            .on_pointer(Some(glam::Vec2::new(x, y)));
    }

    pub fn clear_pointer(&self) {
        self.app.borrow_mut().state.on_pointer(None);
    }

    /// Star model load result; `error` is `None` on success
    pub fn star_loaded(&self, error: Option<String>) {
        let result = match error {
            None => Ok(()),
            Some(reason) => Err(reason),
        };
        star_loaded(&mut self.app.borrow_mut().state, result);
    }

    /// Reduced motion preference changed; applied now and persisted
    pub fn set_reduced_motion(&self, reduced: bool) {
        let mut app = self.app.borrow_mut();
        let now = app.now();
        app.state.set_reduced_motion(reduced, now);
        app.state.settings.save();
    }

    pub fn unmount(&self) {
        self.app.borrow_mut().unmount();
        PAGE.with(|page| *page.borrow_mut() = None);
    }
}
