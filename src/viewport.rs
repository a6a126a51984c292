use std::time::{Duration, Instant};

use eframe::egui::{Pos2, pos2};

use crate::config::ViewportConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Pos2 {
        pos2(self.width * 0.5, self.height * 0.5)
    }

    pub fn is_measurable(self, min_extent: f32) -> bool {
        self.width.is_finite()
            && self.height.is_finite()
            && self.width >= min_extent
            && self.height >= min_extent
    }
}

fn discretize(value: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return value.round();
    }
    ((value / step).round() * step).max(step)
}

/// Turns a stream of container measurements into settled viewport sizes: sizes
/// are snapped to a pixel step and only released after a quiet period.
#[derive(Debug)]
pub struct DimensionProvider {
    step: f32,
    min_extent: f32,
    quiet: Duration,
    pending: Option<(Dimensions, Instant)>,
    current: Option<Dimensions>,
}

impl DimensionProvider {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            step: config.step_px,
            min_extent: config.min_extent,
            quiet: config.debounce(),
            pending: None,
            current: None,
        }
    }

    pub fn current(&self) -> Option<Dimensions> {
        self.current
    }

    pub fn observe(&mut self, width: f32, height: f32, now: Instant) {
        let raw = Dimensions::new(width, height);
        if !raw.is_measurable(self.min_extent) {
            tracing::trace!(width, height, "container not measurable yet");
            return;
        }

        let snapped = Dimensions::new(discretize(width, self.step), discretize(height, self.step));
        match self.pending {
            // Same bucket: keep the original timestamp so steady sizes settle.
            Some((pending, _)) if pending == snapped => {}
            _ if self.pending.is_none() && self.current == Some(snapped) => {}
            _ => self.pending = Some((snapped, now)),
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<Dimensions> {
        let (pending, since) = self.pending?;
        if now.saturating_duration_since(since) < self.quiet {
            return None;
        }

        self.pending = None;
        if self.current == Some(pending) {
            return None;
        }
        self.current = Some(pending);
        Some(pending)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
