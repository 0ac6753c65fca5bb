//! Scroll sampling and normalized progress

use serde::{Deserialize, Serialize};

use crate::clamp01;
use crate::consts::*;

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Root font size (1rem) in pixels
    pub rem: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            rem: ROOT_FONT_PX,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Which denominator a caller normalizes scroll offset against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScrollRange {
    /// A fixed multiple of the viewport height
    ViewportMultiple(f32),
    /// Full document scroll extent (document height minus viewport height)
    DocumentExtent,
}

impl Default for ScrollRange {
    fn default() -> Self {
        ScrollRange::ViewportMultiple(SCROLL_VIEWPORT_MULTIPLE)
    }
}

impl ScrollRange {
    /// Scrollable distance in pixels (may be zero or negative for short pages)
    pub fn extent(&self, viewport: &Viewport, document_height: f32) -> f32 {
        match *self {
            ScrollRange::ViewportMultiple(k) => viewport.height * k,
            ScrollRange::DocumentExtent => document_height - viewport.height,
        }
    }
}

/// One raw scroll observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    pub scroll_y: f32,
    pub viewport: Viewport,
    pub document_height: f32,
}

/// Normalize a scroll offset. Degenerate ranges yield 0.
pub fn progress_for(scroll_y: f32, range: f32) -> f32 {
    if !(range > 0.0) || !range.is_finite() {
        return 0.0;
    }
    clamp01(scroll_y / range)
}

/// Turns raw scroll events into a throttled progress value
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    range: ScrollRange,
    min_interval_ms: f64,
    progress: f32,
    last_sample_ms: Option<f64>,
    pending: Option<ScrollSample>,
}

impl ScrollTracker {
    pub fn new(range: ScrollRange, min_interval_ms: f64) -> Self {
        Self {
            range,
            min_interval_ms: min_interval_ms.max(0.0),
            progress: 0.0,
            last_sample_ms: None,
            pending: None,
        }
    }

    pub fn range(&self) -> ScrollRange {
        self.range
    }

    /// Last published progress
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Handle a scroll/resize event at `now_ms`.
    ///
    /// Returns the new progress when a sample is taken; inside the throttle
    /// window the sample is held and `None` is returned.
    pub fn on_event(&mut self, sample: ScrollSample, now_ms: f64) -> Option<f32> {
        if self.window_open(now_ms) {
            self.pending = None;
            Some(self.take(sample, now_ms))
        } else {
            self.pending = Some(sample);
            None
        }
    }

    /// Publish a held sample once the throttle window has passed
    pub fn flush(&mut self, now_ms: f64) -> Option<f32> {
        if self.pending.is_some() && self.window_open(now_ms) {
            let sample = self.pending.take()?;
            Some(self.take(sample, now_ms))
        } else {
            None
        }
    }

    /// Drop any held sample and reset to the top of the page
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.last_sample_ms = None;
        self.pending = None;
    }

    fn window_open(&self, now_ms: f64) -> bool {
        match self.last_sample_ms {
            None => true,
            Some(last) => now_ms - last >= self.min_interval_ms || now_ms < last,
        }
    }

    fn take(&mut self, sample: ScrollSample, now_ms: f64) -> f32 {
        let extent = self.range.extent(&sample.viewport, sample.document_height);
        self.progress = progress_for(sample.scroll_y, extent);
        self.last_sample_ms = Some(now_ms);
        self.progress
    }
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new(ScrollRange::default(), SCROLL_THROTTLE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(scroll_y: f32) -> ScrollSample {
        ScrollSample {
            scroll_y,
            viewport: Viewport::new(1000.0, 800.0),
            document_height: 4800.0,
        }
    }

    #[test]
    fn test_viewport_multiple_progress() {
        let mut tracker = ScrollTracker::new(ScrollRange::ViewportMultiple(5.0), 16.0);
        assert_eq!(tracker.on_event(sample(2000.0), 0.0), Some(0.5));
        assert_eq!(tracker.on_event(sample(9000.0), 100.0), Some(1.0));
    }

    #[test]
    fn test_document_extent_progress() {
        let mut tracker = ScrollTracker::new(ScrollRange::DocumentExtent, 0.0);
        assert_eq!(tracker.on_event(sample(1000.0), 0.0), Some(0.25));
    }

    #[test]
    fn test_degenerate_range_is_zero() {
        assert_eq!(progress_for(100.0, 0.0), 0.0);
        assert_eq!(progress_for(100.0, -50.0), 0.0);
        assert_eq!(progress_for(100.0, f32::NAN), 0.0);

        let mut tracker = ScrollTracker::new(ScrollRange::DocumentExtent, 0.0);
        let short = ScrollSample {
            scroll_y: 10.0,
            viewport: Viewport::new(1000.0, 800.0),
            document_height: 600.0,
        };
        assert_eq!(tracker.on_event(short, 0.0), Some(0.0));
    }

    #[test]
    fn test_negative_scroll_clamps() {
        assert_eq!(progress_for(-40.0, 100.0), 0.0);
    }

    #[test]
    fn test_throttle_holds_then_flushes_latest() {
        let mut tracker = ScrollTracker::new(ScrollRange::ViewportMultiple(5.0), 16.0);
        assert_eq!(tracker.on_event(sample(400.0), 0.0), Some(0.1));
        assert_eq!(tracker.on_event(sample(800.0), 5.0), None);
        assert_eq!(tracker.on_event(sample(1200.0), 10.0), None);
        assert!(tracker.has_pending());
        assert_eq!(tracker.progress(), 0.1);

        // Still inside the window
        assert_eq!(tracker.flush(12.0), None);
        assert_eq!(tracker.flush(16.0), Some(0.3));
        assert!(!tracker.has_pending());
        assert_eq!(tracker.flush(40.0), None);
    }

    #[test]
    fn test_reversal_recomputes_from_offset() {
        let mut tracker = ScrollTracker::new(ScrollRange::ViewportMultiple(5.0), 0.0);
        tracker.on_event(sample(4000.0), 0.0);
        assert_eq!(tracker.progress(), 1.0);
        tracker.on_event(sample(400.0), 1.0);
        assert_eq!(tracker.progress(), 0.1);
    }
}
