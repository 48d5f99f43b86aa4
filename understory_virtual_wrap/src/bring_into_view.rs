// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal-scroll rules for revealing an item.

use kurbo::Rect;

use crate::config::Axis;
use crate::scroll::ScrollState;

/// Returns the offset along one axis that reveals the span `[leading, trailing]`, or
/// `None` if it is already fully visible.
///
/// The span is aligned to the trailing edge if it extends past the viewport, or to
/// the leading edge if it starts before it. A span larger than the viewport is
/// aligned to its trailing edge. The result is not clamped.
#[must_use]
pub fn offset_to_reveal(leading: f64, trailing: f64, offset: f64, viewport: f64) -> Option<f64> {
    if trailing > offset + viewport {
        Some(trailing - viewport)
    } else if leading < offset {
        Some(leading)
    } else {
        None
    }
}

/// Per-axis form of [`offset_to_reveal`] for a content-space `rect`, clamped into the
/// valid offset range of `state`.
///
/// Returns `None` when `rect` is already visible along `axis` or the clamped target
/// equals the current offset.
#[must_use]
pub fn reveal_rect_on_axis(rect: Rect, state: &ScrollState, axis: Axis) -> Option<f64> {
    let (leading, trailing) = match axis {
        Axis::Horizontal => (rect.x0, rect.x1),
        Axis::Vertical => (rect.y0, rect.y1),
    };
    let current = axis.of_point(state.offset);
    let target = offset_to_reveal(leading, trailing, current, axis.of(state.viewport))?;
    let target = state.clamp_offset(axis, target);
    (target != current).then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};

    #[test]
    fn visible_span_needs_no_scroll() {
        assert_eq!(offset_to_reveal(10.0, 40.0, 0.0, 100.0), None);
        // Touching both edges exactly.
        assert_eq!(offset_to_reveal(0.0, 100.0, 0.0, 100.0), None);
    }

    #[test]
    fn span_below_aligns_trailing_edge() {
        assert_eq!(offset_to_reveal(150.0, 200.0, 0.0, 100.0), Some(100.0));
    }

    #[test]
    fn span_above_aligns_leading_edge() {
        assert_eq!(offset_to_reveal(20.0, 60.0, 50.0, 100.0), Some(20.0));
    }

    #[test]
    fn oversized_span_prefers_trailing_edge() {
        assert_eq!(offset_to_reveal(0.0, 300.0, 50.0, 100.0), Some(200.0));
    }

    #[test]
    fn rect_reveal_is_clamped() {
        let state = ScrollState {
            offset: Point::ZERO,
            viewport: Size::new(100.0, 100.0),
            extent: Size::new(100.0, 250.0),
        };
        let rect = Rect::new(0.0, 200.0, 50.0, 260.0);
        assert_eq!(reveal_rect_on_axis(rect, &state, Axis::Vertical), Some(150.0));
        assert_eq!(reveal_rect_on_axis(rect, &state, Axis::Horizontal), None);
    }

    #[test]
    fn rect_already_at_clamped_target_is_none() {
        let state = ScrollState {
            offset: Point::new(0.0, 150.0),
            viewport: Size::new(100.0, 100.0),
            extent: Size::new(100.0, 250.0),
        };
        let rect = Rect::new(0.0, 200.0, 50.0, 260.0);
        assert_eq!(reveal_rect_on_axis(rect, &state, Axis::Vertical), None);
    }
}
