// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll state: offset clamping, line snapping, change tracking, and step sizes.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Size};

use crate::config::{Axis, PIXEL_LINE_DELTA, ScrollUnit};
use crate::geometry::{LayoutMetrics, usize_to_f64};

bitflags::bitflags! {
    /// Fields of a [`ScrollState`] that changed since it was last published.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ScrollChange: u8 {
        /// The horizontal offset moved.
        const OFFSET_X = 0b0000_0001;
        /// The vertical offset moved.
        const OFFSET_Y = 0b0000_0010;
        /// The viewport was resized.
        const VIEWPORT = 0b0000_0100;
        /// The content extent changed.
        const EXTENT   = 0b0000_1000;
    }
}

impl ScrollChange {
    /// The offset flag for `axis`.
    #[must_use]
    pub const fn offset(axis: Axis) -> Self {
        match axis {
            Axis::Horizontal => Self::OFFSET_X,
            Axis::Vertical => Self::OFFSET_Y,
        }
    }
}

/// Offset, viewport, and extent of a scrollable surface.
///
/// A published state always satisfies
/// `0 <= offset <= max(0, extent - viewport)` on both axes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollState {
    /// Top-left of the viewport in content coordinates.
    pub offset: Point,
    /// Visible size.
    pub viewport: Size,
    /// Total content size.
    pub extent: Size,
}

impl ScrollState {
    /// Largest valid offset along `axis`.
    #[must_use]
    pub fn max_offset(&self, axis: Axis) -> f64 {
        (axis.of(self.extent) - axis.of(self.viewport)).max(0.0)
    }

    /// Clamps `value` into `[0, max_offset(axis)]`. NaN clamps to `0`.
    #[must_use]
    pub fn clamp_offset(&self, axis: Axis, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        value.min(self.max_offset(axis)).max(0.0)
    }
}

/// Receives scroll state notifications; implemented by the owning scroll surface.
///
/// Notifications are coalesced: the panel sends at most one per layout pass, with
/// every field that changed since the previous one.
pub trait ScrollOwner {
    /// Called after a pass that changed the offset, viewport, or extent.
    fn scroll_state_changed(&mut self, state: &ScrollState, changes: ScrollChange);
}

impl<F> ScrollOwner for F
where
    F: FnMut(&ScrollState, ScrollChange),
{
    fn scroll_state_changed(&mut self, state: &ScrollState, changes: ScrollChange) {
        self(state, changes);
    }
}

/// Owns the scroll state and accumulates unpublished changes.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTracker {
    state: ScrollState,
    pending: ScrollChange,
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollTracker {
    /// Creates a tracker at offset zero with an empty viewport and extent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ScrollState::default(),
            pending: ScrollChange::empty(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> ScrollState {
        self.state
    }

    /// Returns the changes not yet taken by [`take_changes`](Self::take_changes).
    #[must_use]
    pub const fn pending(&self) -> ScrollChange {
        self.pending
    }

    /// Takes and clears the accumulated changes.
    pub fn take_changes(&mut self) -> ScrollChange {
        core::mem::replace(&mut self.pending, ScrollChange::empty())
    }

    /// Replaces viewport and extent, then re-clamps the offset into the new bounds.
    ///
    /// Returns the changes caused by this call; they are also accumulated.
    pub fn update(&mut self, viewport: Size, extent: Size) -> ScrollChange {
        let mut changes = ScrollChange::empty();
        if self.state.viewport != viewport {
            self.state.viewport = viewport;
            changes |= ScrollChange::VIEWPORT;
        }
        if self.state.extent != extent {
            self.state.extent = extent;
            changes |= ScrollChange::EXTENT;
        }
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let current = axis.of_point(self.state.offset);
            let clamped = self.state.clamp_offset(axis, current);
            if clamped != current {
                self.write_offset(axis, clamped);
                changes |= ScrollChange::offset(axis);
            }
        }
        self.pending |= changes;
        changes
    }

    /// Sets the offset along `axis` and returns the value actually applied.
    ///
    /// The request is clamped into range. With `snap = Some(step)`, it is then
    /// rounded to the nearest multiple of `step` and clamped again.
    pub fn set_offset(&mut self, axis: Axis, value: f64, snap: Option<f64>) -> f64 {
        let mut applied = self.state.clamp_offset(axis, value);
        if let Some(step) = snap.filter(|s| s.is_finite() && *s > 0.0) {
            applied = self
                .state
                .clamp_offset(axis, (applied / step).round() * step);
        }
        if applied != axis.of_point(self.state.offset) {
            self.write_offset(axis, applied);
            self.pending |= ScrollChange::offset(axis);
        }
        applied
    }

    fn write_offset(&mut self, axis: Axis, value: f64) {
        match axis {
            Axis::Horizontal => self.state.offset.x = value,
            Axis::Vertical => self.state.offset.y = value,
        }
    }
}

/// Step unit along `axis` for item-granular scrolling: a line on the main axis, a
/// slot on the cross axis.
fn item_step(metrics: &LayoutMetrics, axis: Axis) -> f64 {
    if axis == metrics.orientation().main_axis() {
        metrics.line_extent()
    } else {
        metrics.slot_extent()
    }
}

/// Distance of one line step along `axis`.
///
/// Pixel scrolling moves [`PIXEL_LINE_DELTA`]; item scrolling moves one whole line
/// (or slot on the cross axis). Without metrics, item scrolling falls back to pixels.
#[must_use]
pub fn line_delta(unit: ScrollUnit, axis: Axis, metrics: Option<&LayoutMetrics>) -> f64 {
    match (unit, metrics) {
        (ScrollUnit::Item, Some(m)) => item_step(m, axis),
        _ => PIXEL_LINE_DELTA,
    }
}

/// Distance of one page step along `axis` for a viewport of length `viewport`.
///
/// Pixel scrolling moves one viewport length; item scrolling moves the number of
/// whole lines that fit in the viewport, at least one.
#[must_use]
pub fn page_delta(
    unit: ScrollUnit,
    axis: Axis,
    viewport: f64,
    metrics: Option<&LayoutMetrics>,
) -> f64 {
    let viewport = if viewport.is_finite() {
        viewport.max(0.0)
    } else {
        0.0
    };
    match (unit, metrics) {
        (ScrollUnit::Item, Some(m)) => {
            let step = item_step(m, axis);
            let whole = (viewport / step).floor().max(1.0);
            whole * step
        }
        _ => viewport,
    }
}

/// Distance of one wheel notch along `axis`: `lines` line steps.
#[must_use]
pub fn wheel_delta(
    unit: ScrollUnit,
    axis: Axis,
    lines: usize,
    metrics: Option<&LayoutMetrics>,
) -> f64 {
    line_delta(unit, axis, metrics) * usize_to_f64(lines)
}
