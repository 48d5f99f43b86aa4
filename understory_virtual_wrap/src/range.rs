// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible-range resolution over whole lines.

use core::ops::Range;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::geometry::LayoutMetrics;

/// A contiguous run of item indices that should have live representations.
///
/// Stored half-open as `[start, end)`; [`first`](Self::first) and
/// [`last`](Self::last) give the inclusive bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VisibleRange {
    /// First index in the range (inclusive).
    pub start: usize,
    /// One past the last index in the range (exclusive).
    pub end: usize,
}

impl VisibleRange {
    /// The empty range.
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    /// Creates the inclusive range `[first, last]`.
    #[must_use]
    pub const fn inclusive(first: usize, last: usize) -> Self {
        Self {
            start: first,
            end: last.saturating_add(1),
        }
    }

    /// Returns `true` if the range holds no indices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Number of indices in the range.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// First index, if any.
    #[must_use]
    pub const fn first(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.start)
        }
    }

    /// Last index, if any.
    #[must_use]
    pub const fn last(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.end - 1)
        }
    }

    /// Returns `true` if `index` lies within the range.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// Iterates the indices in ascending order.
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl IntoIterator for VisibleRange {
    type Item = usize;
    type IntoIter = Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Computes which items need representations for a scroll position.
///
/// - `main_offset`: scroll offset along the main axis (negative counts as `0`).
/// - `viewport_main`: viewport length along the main axis. An infinite or NaN length
///   covers every line.
/// - `cache_length`: whole lines kept realized beyond *each* edge of the viewport.
///
/// The result starts `cache_length` lines before the line under `main_offset`. It
/// spans enough lines to cover the viewport, one extra line for partially visible
/// edges, and the cache on both sides. It is clamped to the item count.
///
/// The function is pure: the same inputs always give the same range, independent of
/// what is currently realized.
#[must_use]
pub fn compute_visible_range(
    main_offset: f64,
    viewport_main: f64,
    metrics: &LayoutMetrics,
    cache_length: usize,
) -> VisibleRange {
    let len = metrics.item_count();
    if len == 0 {
        return VisibleRange::EMPTY;
    }

    let per_line = metrics.items_per_line();
    let line_extent = metrics.line_extent();
    debug_assert!(
        line_extent > 0.0,
        "line extent must be positive; got {line_extent}"
    );

    let main_offset = if main_offset.is_finite() {
        main_offset.max(0.0)
    } else {
        0.0
    };
    let first_line = lines_in(main_offset / line_extent, metrics.line_count())
        .saturating_sub(cache_length);

    let visible_lines = if viewport_main.is_finite() {
        let viewport_main = viewport_main.max(0.0);
        lines_in(
            ((viewport_main + line_extent) / line_extent).ceil(),
            metrics.line_count(),
        )
        .saturating_add(1)
        .saturating_add(cache_length.saturating_mul(2))
    } else {
        metrics.line_count()
    };

    let start = first_line.saturating_mul(per_line);
    if start >= len {
        return VisibleRange { start: len, end: len };
    }
    let end = start
        .saturating_add(visible_lines.saturating_mul(per_line))
        .min(len);
    VisibleRange { start, end }
}

/// Truncates a non-negative line ratio to a line count, saturating at `cap`.
fn lines_in(ratio: f64, cap: usize) -> usize {
    let ratio = ratio.floor();
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Saturating float-to-int cast, then clamped to the line count"
    )]
    let lines = ratio as usize;
    lines.min(cap)
}
