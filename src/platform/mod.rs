//! Platform abstraction layer
//!
//! The core never touches the document directly. It asks a [`Host`] for
//! event subscriptions and hands [`PageCommand`]s to a [`Presenter`].
//! The browser implementation lives in `web` (wasm32 only); the recording
//! implementations back the native replay and the tests.

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::collections::BTreeMap;

use crate::sim::PageCommand;

/// Event sources the page listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    Scroll,
    Resize,
}

impl ListenerKind {
    /// DOM event name
    pub fn event_name(&self) -> &'static str {
        match self {
            ListenerKind::Scroll => "scroll",
            ListenerKind::Resize => "resize",
        }
    }
}

/// Owner of event listener registrations
pub trait Host {
    fn subscribe(&mut self, kind: ListenerKind);
    fn unsubscribe(&mut self, kind: ListenerKind);
}

/// Applies presentation commands to the page
pub trait Presenter {
    fn apply(&mut self, command: &PageCommand);

    fn apply_all(&mut self, commands: &[PageCommand]) {
        for command in commands {
            self.apply(command);
        }
    }
}

/// Host that only counts registrations
#[derive(Debug, Default)]
pub struct RecordingHost {
    active: BTreeMap<ListenerKind, usize>,
    subscribed_total: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrations not yet removed
    pub fn active(&self) -> usize {
        self.active.values().sum()
    }

    pub fn is_subscribed(&self, kind: ListenerKind) -> bool {
        self.active.get(&kind).copied().unwrap_or(0) > 0
    }

    pub fn subscribed_total(&self) -> usize {
        self.subscribed_total
    }
}

impl Host for RecordingHost {
    fn subscribe(&mut self, kind: ListenerKind) {
        *self.active.entry(kind).or_insert(0) += 1;
        self.subscribed_total += 1;
    }

    fn unsubscribe(&mut self, kind: ListenerKind) {
        match self.active.get_mut(&kind) {
            Some(count) if *count > 0 => *count -= 1,
            _ => log::warn!("Unsubscribe without subscription: {}", kind.event_name()),
        }
    }
}

/// Presenter that keeps every command it was given
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub applied: Vec<PageCommand>,
    pub scroll_locked: bool,
    pub background: Option<u32>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for RecordingPresenter {
    fn apply(&mut self, command: &PageCommand) {
        log::debug!("Apply {:?}", command);
        match command {
            PageCommand::LockScroll(locked) => self.scroll_locked = *locked,
            PageCommand::SetBackground(color) => self.background = Some(*color),
            _ => {}
        }
        self.applied.push(command.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_host_balances() {
        let mut host = RecordingHost::new();
        host.subscribe(ListenerKind::Scroll);
        host.subscribe(ListenerKind::Resize);
        assert_eq!(host.active(), 2);
        host.unsubscribe(ListenerKind::Scroll);
        host.unsubscribe(ListenerKind::Scroll);
        assert_eq!(host.active(), 1);
        assert!(host.is_subscribed(ListenerKind::Resize));
        assert_eq!(host.subscribed_total(), 2);
    }

    #[test]
    fn test_recording_presenter_tracks_lock() {
        let mut presenter = RecordingPresenter::new();
        presenter.apply_all(&[
            PageCommand::LockScroll(true),
            PageCommand::SetBackground(0x320809),
            PageCommand::LockScroll(false),
        ]);
        assert!(!presenter.scroll_locked);
        assert_eq!(presenter.background, Some(0x320809));
        assert_eq!(presenter.applied.len(), 3);
    }
}
