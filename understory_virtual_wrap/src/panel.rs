// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`WrapPanel`]: the windowing engine that ties geometry, range resolution,
//! realization, and scroll state together.

use alloc::boxed::Box;
use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Size};
use smallvec::SmallVec;

use crate::bring_into_view::reveal_rect_on_axis;
use crate::config::{Axis, ScrollUnit, VirtualizationMode, WrapConfig};
use crate::geometry::{LayoutMetrics, compute_metrics};
use crate::range::{VisibleRange, compute_visible_range};
use crate::realize::{RealizedSet, Realizer};
use crate::scroll::{
    ScrollOwner, ScrollState, ScrollTracker, line_delta, page_delta, wheel_delta,
};

/// A structural mutation of the backing collection.
///
/// The engine does not diff content: any change invalidates every realized entry
/// at the start of the next pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    /// `count` items were inserted before `index`.
    Insert {
        /// Position of the first inserted item.
        index: usize,
        /// Number of inserted items.
        count: usize,
    },
    /// `count` items starting at `index` were removed.
    Remove {
        /// Position of the first removed item.
        index: usize,
        /// Number of removed items.
        count: usize,
    },
    /// `count` items starting at `index` were replaced in place.
    Replace {
        /// Position of the first replaced item.
        index: usize,
        /// Number of replaced items.
        count: usize,
    },
    /// The collection changed arbitrarily.
    Reset,
}

impl CollectionChange {
    /// Returns `true` if the item at index 0 may be different afterwards.
    ///
    /// Such changes also discard the measured probe size.
    #[must_use]
    pub const fn touches_first(&self) -> bool {
        match *self {
            Self::Insert { index, .. }
            | Self::Remove { index, .. }
            | Self::Replace { index, .. } => index == 0,
            Self::Reset => true,
        }
    }
}

bitflags::bitflags! {
    /// Work postponed until a later layout pass.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Deferred: u8 {
        /// A pass ran without an attached [`Realizer`].
        const REALIZER        = 0b0000_0001;
        /// A bring-into-view request is waiting for geometry.
        const BRING_INTO_VIEW = 0b0000_0010;
    }
}

/// A virtualizing wrap layout over the items of a [`Realizer`].
///
/// The host drives the panel:
///
/// 1. Report mutations with [`collection_changed`](Self::collection_changed).
/// 2. Run [`layout`](Self::layout) whenever the available size changes or
///    [`needs_layout`](Self::needs_layout) is set.
/// 3. Position the realized items yielded by [`arrange`](Self::arrange).
///
/// Each pass resolves line geometry, clamps the scroll offset, realizes exactly the
/// visible range (plus cache), and notifies the [`ScrollOwner`] at most once.
pub struct WrapPanel<R: Realizer> {
    config: WrapConfig,
    realizer: Option<R>,
    realized: RealizedSet<R::Handle>,
    owner: Option<Box<dyn ScrollOwner>>,
    scroll: ScrollTracker,

    metrics: Option<LayoutMetrics>,
    range: VisibleRange,
    probe: Option<Size>,
    /// Effective item size that reused handles were last measured against.
    measured_item_size: Option<Size>,

    changes: SmallVec<[CollectionChange; 4]>,
    deferred: Deferred,
    pending_reveal: Option<usize>,
    needs_layout: bool,
}

impl<R: Realizer> fmt::Debug for WrapPanel<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapPanel")
            .field("config", &self.config)
            .field("attached", &self.realizer.is_some())
            .field("realized", &self.realized.len())
            .field("pooled", &self.realized.pooled())
            .field("range", &self.range)
            .field("scroll", &self.scroll.state())
            .field("deferred", &self.deferred)
            .field("needs_layout", &self.needs_layout)
            .finish_non_exhaustive()
    }
}

impl<R: Realizer> WrapPanel<R> {
    /// Creates a panel with no realizer attached.
    ///
    /// Passes run before [`attach`](Self::attach) record [`Deferred::REALIZER`].
    #[must_use]
    pub fn new(config: WrapConfig) -> Self {
        Self {
            config,
            realizer: None,
            realized: RealizedSet::new(),
            owner: None,
            scroll: ScrollTracker::new(),
            metrics: None,
            range: VisibleRange::EMPTY,
            probe: None,
            measured_item_size: None,
            changes: SmallVec::new(),
            deferred: Deferred::empty(),
            pending_reveal: None,
            needs_layout: true,
        }
    }

    /// Creates a panel driving `realizer`.
    #[must_use]
    pub fn with_realizer(config: WrapConfig, realizer: R) -> Self {
        let mut panel = Self::new(config);
        panel.realizer = Some(realizer);
        panel
    }

    /// Returns the current configuration.
    #[must_use]
    pub const fn config(&self) -> &WrapConfig {
        &self.config
    }

    /// Replaces the configuration.
    ///
    /// The probed item size is kept unless an item dimension or the orientation
    /// changed.
    pub fn set_config(&mut self, config: WrapConfig) {
        if config == self.config {
            return;
        }
        if config.probe_differs(&self.config) {
            self.probe = None;
        }
        self.config = config;
        self.needs_layout = true;
    }

    /// Attaches `realizer`, returning the previously attached one (after releasing
    /// everything it had realized).
    pub fn attach(&mut self, realizer: R) -> Option<R> {
        let previous = self.detach();
        self.realizer = Some(realizer);
        self.needs_layout = true;
        previous
    }

    /// Detaches the realizer after releasing every live and pooled handle to it.
    pub fn detach(&mut self) -> Option<R> {
        let mut realizer = self.realizer.take()?;
        #[cfg(feature = "tracing")]
        let released = self.realized.len();
        self.realized
            .release_all(&mut realizer, VirtualizationMode::Standard);
        self.realized.drain_pool(&mut realizer);
        #[cfg(feature = "tracing")]
        tracing::debug!(released, "realizer detached");

        self.changes.clear();
        self.probe = None;
        self.measured_item_size = None;
        self.metrics = None;
        self.range = VisibleRange::EMPTY;
        self.needs_layout = true;
        Some(realizer)
    }

    /// Returns the attached realizer.
    #[must_use]
    pub fn realizer(&self) -> Option<&R> {
        self.realizer.as_ref()
    }

    /// Returns the attached realizer mutably.
    ///
    /// Structural changes made through it must be reported with
    /// [`collection_changed`](Self::collection_changed).
    pub fn realizer_mut(&mut self) -> Option<&mut R> {
        self.realizer.as_mut()
    }

    /// Sets the sink for scroll state notifications.
    pub fn set_scroll_owner(&mut self, owner: Option<Box<dyn ScrollOwner>>) {
        self.owner = owner;
    }

    /// Queues a structural change for the next pass.
    ///
    /// Changes beyond a small queue collapse into [`CollectionChange::Reset`].
    pub fn collection_changed(&mut self, change: CollectionChange) {
        self.needs_layout = true;
        if self.changes.first() == Some(&CollectionChange::Reset) {
            return;
        }
        if change == CollectionChange::Reset || self.changes.len() >= self.changes.inline_size() {
            self.changes.clear();
            self.changes.push(CollectionChange::Reset);
        } else {
            self.changes.push(change);
        }
    }

    /// Changes queued since the last pass.
    #[must_use]
    pub fn pending_changes(&self) -> &[CollectionChange] {
        &self.changes
    }

    /// Returns `true` if state changed since the last pass in a way that needs
    /// another one.
    #[must_use]
    pub const fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Returns the postponed work waiting for a later pass.
    #[must_use]
    pub const fn pending_deferrals(&self) -> Deferred {
        self.deferred
    }

    /// Runs a layout pass against `available` and returns the desired size.
    ///
    /// The desired size is `available`, except that an infinite dimension is
    /// replaced by the content extent along it.
    pub fn layout(&mut self, available: Size) -> Size {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "wrap_layout",
            width = available.width,
            height = available.height
        )
        .entered();

        self.needs_layout = false;
        let Some(mut realizer) = self.realizer.take() else {
            #[cfg(feature = "tracing")]
            tracing::debug!("no realizer attached; pass deferred");
            self.changes.clear();
            self.deferred.insert(Deferred::REALIZER);
            let extent = self.scroll.state().extent;
            self.scroll.update(resolve_viewport(available, extent), extent);
            self.publish();
            return Size::ZERO;
        };
        self.deferred.remove(Deferred::REALIZER);
        let desired = self.run_pass(&mut realizer, available);
        self.realizer = Some(realizer);
        desired
    }

    fn run_pass(&mut self, realizer: &mut R, available: Size) -> Size {
        let mode = self.config.virtualization_mode;

        if !self.changes.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                changes = self.changes.len(),
                released = self.realized.len(),
                "collection changed; realized set invalidated"
            );
            self.realized.release_all(realizer, mode);
            if self.changes.iter().any(CollectionChange::touches_first) {
                self.probe = None;
            }
            self.changes.clear();
        }

        let item_count = realizer.item_count();
        if item_count > 0 && self.config.needs_probe() && self.probe.is_none() {
            let handle = self.realized.ensure(realizer, 0, mode);
            let natural = realizer.measure(handle, self.config.probe_constraint());
            #[cfg(feature = "tracing")]
            tracing::debug!(
                width = natural.width,
                height = natural.height,
                "probed item size"
            );
            self.probe = Some(natural);
            // The probe was measured against a different constraint.
            self.measured_item_size = None;
        }

        let metrics = compute_metrics(available, &self.config, self.probe, item_count);
        let extent = metrics.extent();
        let viewport = resolve_viewport(available, extent);
        self.scroll.update(viewport, extent);

        if let Some(index) = self.pending_reveal.take() {
            self.deferred.remove(Deferred::BRING_INTO_VIEW);
            if index < item_count {
                if geometry_ready(&self.scroll.state()) {
                    self.apply_reveal(&metrics, index);
                } else {
                    // Re-armed without requesting a pass; the next resize retries.
                    self.pending_reveal = Some(index);
                    self.deferred.insert(Deferred::BRING_INTO_VIEW);
                }
            }
        }

        let main = self.config.orientation.main_axis();
        let range = compute_visible_range(
            main.of_point(self.scroll.state().offset),
            main.of(viewport),
            &metrics,
            self.config.cache_length,
        );
        let item_size = metrics.item_size();
        let remeasure = self.measured_item_size != Some(item_size);
        let plan = self
            .realized
            .sync(realizer, range, item_size, mode, remeasure);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            start = range.start,
            end = range.end,
            created = plan.to_create.len(),
            reused = plan.to_reuse.len(),
            released = plan.to_release.len(),
            "realized range"
        );
        debug_assert_eq!(
            plan.to_create.len() + plan.to_reuse.len(),
            range.len(),
            "reconcile must cover the whole range"
        );
        debug_assert_eq!(
            realizer.item_count(),
            item_count,
            "item count changed during a layout pass"
        );

        self.measured_item_size = Some(item_size);
        self.metrics = Some(metrics);
        self.range = range;
        self.publish();
        viewport
    }

    /// Yields every realized item with its rectangle in viewport coordinates, in
    /// ascending index order.
    pub fn arrange(&self) -> impl Iterator<Item = (usize, &'_ R::Handle, Rect)> + '_ {
        let shift = self.scroll.state().offset.to_vec2();
        let metrics = self.metrics;
        self.realized.iter().filter_map(move |(index, handle)| {
            let rect = metrics?.item_rect(index) - shift;
            Some((index, handle, rect))
        })
    }

    /// Returns the range realized by the last pass.
    #[must_use]
    pub const fn visible_range(&self) -> VisibleRange {
        self.range
    }

    /// Returns the metrics computed by the last pass.
    #[must_use]
    pub const fn metrics(&self) -> Option<&LayoutMetrics> {
        self.metrics.as_ref()
    }

    /// Returns the live representations.
    #[must_use]
    pub const fn realized(&self) -> &RealizedSet<R::Handle> {
        &self.realized
    }

    /// Content-space rectangle of the item at `index`, using the last pass's metrics.
    #[must_use]
    pub fn item_rect(&self, index: usize) -> Option<Rect> {
        self.metrics
            .filter(|m| index < m.item_count())
            .map(|m| m.item_rect(index))
    }

    /// Returns the full scroll state.
    #[must_use]
    pub const fn scroll_state(&self) -> ScrollState {
        self.scroll.state()
    }

    /// Total content size.
    #[must_use]
    pub const fn extent(&self) -> Size {
        self.scroll.state().extent
    }

    /// Visible size.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.scroll.state().viewport
    }

    /// Current scroll offset.
    #[must_use]
    pub const fn offset(&self) -> Point {
        self.scroll.state().offset
    }

    /// Sets the offset along `axis` and returns the clamped (and, for item
    /// scrolling on the main axis, snapped) value applied.
    pub fn set_offset(&mut self, axis: Axis, value: f64) -> f64 {
        let before = axis.of_point(self.scroll.state().offset);
        let snap = self.snap_step(axis, self.metrics.as_ref());
        let applied = self.scroll.set_offset(axis, value, snap);
        if applied != before {
            self.needs_layout = true;
        }
        applied
    }

    /// Sets the horizontal offset.
    pub fn set_offset_x(&mut self, value: f64) -> f64 {
        self.set_offset(Axis::Horizontal, value)
    }

    /// Sets the vertical offset.
    pub fn set_offset_y(&mut self, value: f64) -> f64 {
        self.set_offset(Axis::Vertical, value)
    }

    /// Scrolls up by one line.
    pub fn line_up(&mut self) -> f64 {
        self.step_by(Axis::Vertical, -self.line_step(Axis::Vertical))
    }

    /// Scrolls down by one line.
    pub fn line_down(&mut self) -> f64 {
        self.step_by(Axis::Vertical, self.line_step(Axis::Vertical))
    }

    /// Scrolls left by one line.
    pub fn line_left(&mut self) -> f64 {
        self.step_by(Axis::Horizontal, -self.line_step(Axis::Horizontal))
    }

    /// Scrolls right by one line.
    pub fn line_right(&mut self) -> f64 {
        self.step_by(Axis::Horizontal, self.line_step(Axis::Horizontal))
    }

    /// Scrolls up by one page.
    pub fn page_up(&mut self) -> f64 {
        self.step_by(Axis::Vertical, -self.page_step(Axis::Vertical))
    }

    /// Scrolls down by one page.
    pub fn page_down(&mut self) -> f64 {
        self.step_by(Axis::Vertical, self.page_step(Axis::Vertical))
    }

    /// Scrolls left by one page.
    pub fn page_left(&mut self) -> f64 {
        self.step_by(Axis::Horizontal, -self.page_step(Axis::Horizontal))
    }

    /// Scrolls right by one page.
    pub fn page_right(&mut self) -> f64 {
        self.step_by(Axis::Horizontal, self.page_step(Axis::Horizontal))
    }

    /// Scrolls up by one wheel notch.
    pub fn wheel_up(&mut self) -> f64 {
        self.step_by(Axis::Vertical, -self.wheel_step(Axis::Vertical))
    }

    /// Scrolls down by one wheel notch.
    pub fn wheel_down(&mut self) -> f64 {
        self.step_by(Axis::Vertical, self.wheel_step(Axis::Vertical))
    }

    /// Scrolls left by one wheel notch.
    pub fn wheel_left(&mut self) -> f64 {
        self.step_by(Axis::Horizontal, -self.wheel_step(Axis::Horizontal))
    }

    /// Scrolls right by one wheel notch.
    pub fn wheel_right(&mut self) -> f64 {
        self.step_by(Axis::Horizontal, self.wheel_step(Axis::Horizontal))
    }

    /// Scrolls the minimum amount needed to show the item at `index`.
    ///
    /// Out-of-range indices are ignored. Before geometry is known the request is
    /// kept (replacing any older one) and executed by the next pass.
    pub fn bring_index_into_view(&mut self, index: usize) {
        let _ = self.make_visible(index);
    }

    /// Like [`bring_index_into_view`](Self::bring_index_into_view), returning the
    /// item's content-space rectangle when it could be revealed immediately.
    pub fn make_visible(&mut self, index: usize) -> Option<Rect> {
        if self
            .realizer
            .as_ref()
            .is_some_and(|r| index >= r.item_count())
        {
            return None;
        }
        let ready = self
            .metrics
            .filter(|m| {
                self.changes.is_empty()
                    && index < m.item_count()
                    && geometry_ready(&self.scroll.state())
            });
        let Some(metrics) = ready else {
            #[cfg(feature = "tracing")]
            tracing::debug!(index, "bring-into-view deferred until geometry is known");
            self.pending_reveal = Some(index);
            self.deferred.insert(Deferred::BRING_INTO_VIEW);
            self.needs_layout = true;
            return None;
        };
        let before = self.scroll.state().offset;
        let rect = self.apply_reveal(&metrics, index);
        if self.scroll.state().offset != before {
            self.needs_layout = true;
        }
        Some(rect)
    }

    fn apply_reveal(&mut self, metrics: &LayoutMetrics, index: usize) -> Rect {
        let rect = metrics.item_rect(index);
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let state = self.scroll.state();
            if let Some(target) = reveal_rect_on_axis(rect, &state, axis) {
                // Snap away from the item so it stays fully inside the viewport.
                let target = match self.snap_step(axis, Some(metrics)) {
                    Some(step) => snap_outward(target, axis.of_point(state.offset), step),
                    None => target,
                };
                self.scroll.set_offset(axis, target, None);
            }
        }
        rect
    }

    fn snap_step(&self, axis: Axis, metrics: Option<&LayoutMetrics>) -> Option<f64> {
        let metrics = metrics?;
        (self.config.scroll_unit == ScrollUnit::Item
            && axis == self.config.orientation.main_axis())
        .then(|| metrics.line_extent())
    }

    fn step_by(&mut self, axis: Axis, delta: f64) -> f64 {
        let current = axis.of_point(self.scroll.state().offset);
        self.set_offset(axis, current + delta)
    }

    fn line_step(&self, axis: Axis) -> f64 {
        line_delta(self.config.scroll_unit, axis, self.metrics.as_ref())
    }

    fn page_step(&self, axis: Axis) -> f64 {
        let viewport = axis.of(self.scroll.state().viewport);
        page_delta(self.config.scroll_unit, axis, viewport, self.metrics.as_ref())
    }

    fn wheel_step(&self, axis: Axis) -> f64 {
        wheel_delta(
            self.config.scroll_unit,
            axis,
            self.config.wheel_scroll_lines,
            self.metrics.as_ref(),
        )
    }

    fn publish(&mut self) {
        let changes = self.scroll.take_changes();
        if changes.is_empty() {
            return;
        }
        if let Some(owner) = self.owner.as_mut() {
            owner.scroll_state_changed(&self.scroll.state(), changes);
        }
    }
}

/// Replaces unbounded dimensions of `available` with `extent` and clamps the rest
/// to be non-negative.
fn resolve_viewport(available: Size, extent: Size) -> Size {
    let resolve = |available: f64, extent: f64| {
        if available == f64::INFINITY {
            extent
        } else if available > 0.0 {
            available
        } else {
            0.0
        }
    };
    Size::new(
        resolve(available.width, extent.width),
        resolve(available.height, extent.height),
    )
}

/// Rounds a reveal `target` to a multiple of `step`: up when scrolling forward (the
/// trailing edge was aligned), down when scrolling back (the leading edge was).
fn snap_outward(target: f64, current: f64, step: f64) -> f64 {
    let lines = target / step;
    if target > current {
        lines.ceil() * step
    } else {
        lines.floor() * step
    }
}

fn geometry_ready(state: &ScrollState) -> bool {
    state.viewport.width > 0.0 && state.viewport.height > 0.0
}
