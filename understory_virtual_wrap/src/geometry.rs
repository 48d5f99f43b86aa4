// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line geometry: items per line, effective item size, item rectangles, and extent.
//!
//! A wrap layout is a flat sequence of items folded into *lines*. Lines progress
//! along the main (scroll) axis; within a line, items occupy *slots* along the cross
//! axis:
//!
//! - Each line holds [`LayoutMetrics::items_per_line`] slots.
//! - Item `i` lives in line `i / items_per_line` at slot `i % items_per_line`.
//! - All items share one effective size, so positions are pure arithmetic.
//!
//! Hosts interpret lines as rows for [`Orientation::Horizontal`] and as columns for
//! [`Orientation::Vertical`].

use core::num::NonZeroUsize;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Rect, Size};

use crate::config::{Orientation, WrapConfig, clamp_item_extent};

/// Derived line geometry for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    orientation: Orientation,
    base_item_size: Size,
    item_size: Size,
    spacing: Size,
    items_per_line: NonZeroUsize,
    item_count: usize,
}

/// Computes line geometry for `item_count` items laid out within `available`.
///
/// - Fixed item dimensions from `config` are used as-is; `Auto` dimensions come from
///   `probe`, the natural size of a realized item. A missing probe, or a zero,
///   negative, or non-finite dimension, resolves to
///   [`MIN_ITEM_EXTENT`](crate::MIN_ITEM_EXTENT).
/// - Items per line is the number of `item + spacing` slots that fit in the
///   available cross length, counting one trailing spacing as free. It is at least 1.
///   An infinite cross length lays everything out on a single line.
/// - With [`WrapConfig::stretch_items`], leftover cross space is split evenly across
///   the slots of a line. Items never shrink below their base size.
#[must_use]
pub fn compute_metrics(
    available: Size,
    config: &WrapConfig,
    probe: Option<Size>,
    item_count: usize,
) -> LayoutMetrics {
    let orientation = config.orientation;
    let cross_axis = orientation.cross_axis();
    let spacing = config.spacing();

    let probe = probe.unwrap_or(Size::ZERO);
    let base_item_size = Size::new(
        clamp_item_extent(config.item_width.fixed().unwrap_or(probe.width)),
        clamp_item_extent(config.item_height.fixed().unwrap_or(probe.height)),
    );

    let base_cross = cross_axis.of(base_item_size);
    let cross_spacing = cross_axis.of(spacing);
    let mut available_cross = cross_axis.of(available);
    if available_cross.is_nan() || available_cross < 0.0 {
        available_cross = 0.0;
    }

    let per_line = if available_cross.is_infinite() {
        item_count.max(1)
    } else {
        let fit = ((available_cross + cross_spacing) / (base_cross + cross_spacing)).floor();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Saturating float-to-int cast; the value is non-negative and clamped to >= 1"
        )]
        let fit = fit as usize;
        fit.max(1)
    };
    let items_per_line = NonZeroUsize::new(per_line).unwrap_or(NonZeroUsize::MIN);

    let item_size = if config.stretch_items && available_cross.is_finite() {
        let slots = usize_to_f64(items_per_line.get());
        let stretched = (available_cross - (slots - 1.0) * cross_spacing) / slots;
        let cross = base_cross.max(stretched);
        orientation.size(orientation.main_axis().of(base_item_size), cross)
    } else {
        base_item_size
    };

    LayoutMetrics {
        orientation,
        base_item_size,
        item_size,
        spacing,
        items_per_line,
        item_count,
    }
}

impl LayoutMetrics {
    /// Returns the flow orientation these metrics were computed for.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Item size before stretching.
    #[must_use]
    pub const fn base_item_size(&self) -> Size {
        self.base_item_size
    }

    /// Effective item size, including any stretch.
    #[must_use]
    pub const fn item_size(&self) -> Size {
        self.item_size
    }

    /// Sanitized horizontal/vertical spacing.
    #[must_use]
    pub const fn spacing(&self) -> Size {
        self.spacing
    }

    /// Number of slots in each line.
    #[must_use]
    pub const fn items_per_line(&self) -> usize {
        self.items_per_line.get()
    }

    /// Number of items these metrics cover.
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    /// Number of lines needed for all items: `ceil(item_count / items_per_line)`.
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.item_count.div_ceil(self.items_per_line.get())
    }

    /// Returns the line containing `index`.
    #[must_use]
    pub const fn line_of(&self, index: usize) -> usize {
        index / self.items_per_line.get()
    }

    /// Returns the zero-based slot of `index` within its line.
    #[must_use]
    pub const fn slot_of(&self, index: usize) -> usize {
        index % self.items_per_line.get()
    }

    /// Distance between the leading edges of consecutive lines.
    #[must_use]
    pub fn line_extent(&self) -> f64 {
        let main = self.orientation.main_axis();
        main.of(self.item_size) + main.of(self.spacing)
    }

    /// Distance between the leading edges of consecutive slots within a line.
    #[must_use]
    pub fn slot_extent(&self) -> f64 {
        let cross = self.orientation.cross_axis();
        cross.of(self.item_size) + cross.of(self.spacing)
    }

    /// Content-space rectangle of the item at `index`.
    ///
    /// `index` is not checked against [`item_count`](Self::item_count); positions
    /// simply continue past the last item.
    #[must_use]
    pub fn item_rect(&self, index: usize) -> Rect {
        let main = usize_to_f64(self.line_of(index)) * self.line_extent();
        let cross = usize_to_f64(self.slot_of(index)) * self.slot_extent();
        let origin = self.orientation.point(main, cross);
        Rect::from_origin_size(origin, self.item_size)
    }

    /// Total content size of all items.
    ///
    /// Along the main axis this is `lines * item + (lines - 1) * spacing`; along the
    /// cross axis `items_per_line * item + (items_per_line - 1) * spacing`. No items
    /// means an extent of zero.
    #[must_use]
    pub fn extent(&self) -> Size {
        if self.item_count == 0 {
            return Size::ZERO;
        }
        let main_axis = self.orientation.main_axis();
        let cross_axis = self.orientation.cross_axis();
        let lines = usize_to_f64(self.line_count());
        let slots = usize_to_f64(self.items_per_line.get());
        let main = lines * main_axis.of(self.item_size) + (lines - 1.0) * main_axis.of(self.spacing);
        let cross =
            slots * cross_axis.of(self.item_size) + (slots - 1.0) * cross_axis.of(self.spacing);
        self.orientation.size(main, cross)
    }
}

#[allow(
    clippy::cast_precision_loss,
    reason = "Item and line counts stay far below 2^53"
)]
pub(crate) const fn usize_to_f64(v: usize) -> f64 {
    v as f64
}
