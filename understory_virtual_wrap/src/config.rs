// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout configuration and orientation/axis helpers.

use kurbo::{Point, Size};

/// Smallest extent an item may have along either axis.
///
/// Natural sizes reported as zero, negative, or non-finite resolve to this floor so
/// that line and slot math never divides by zero.
pub const MIN_ITEM_EXTENT: f64 = 1.0;

/// Pixel distance of a single line step when scrolling with [`ScrollUnit::Pixel`].
pub const PIXEL_LINE_DELTA: f64 = 16.0;

/// Flow direction of items.
///
/// The orientation names the direction items are laid out in *within* a line. Lines
/// wrap along the orthogonal axis, which is also the scroll (main) axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Items flow left to right and wrap downward; scrolling is vertical.
    #[default]
    Horizontal,
    /// Items flow top to bottom and wrap rightward; scrolling is horizontal.
    Vertical,
}

/// A screen axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The x axis.
    Horizontal,
    /// The y axis.
    Vertical,
}

impl Axis {
    /// Returns the component of `size` along this axis.
    #[must_use]
    pub const fn of(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Returns the component of `point` along this axis.
    #[must_use]
    pub const fn of_point(self, point: Point) -> f64 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }

    /// Returns the other axis.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

impl Orientation {
    /// The axis lines progress along (the scroll direction).
    #[must_use]
    pub const fn main_axis(self) -> Axis {
        match self {
            Self::Horizontal => Axis::Vertical,
            Self::Vertical => Axis::Horizontal,
        }
    }

    /// The axis items within one line are laid out along.
    #[must_use]
    pub const fn cross_axis(self) -> Axis {
        self.main_axis().flip()
    }

    /// Builds a [`Size`] from main- and cross-axis components.
    #[must_use]
    pub const fn size(self, main: f64, cross: f64) -> Size {
        match self {
            Self::Horizontal => Size::new(cross, main),
            Self::Vertical => Size::new(main, cross),
        }
    }

    /// Builds a [`Point`] from main- and cross-axis components.
    #[must_use]
    pub const fn point(self, main: f64, cross: f64) -> Point {
        match self {
            Self::Horizontal => Point::new(cross, main),
            Self::Vertical => Point::new(main, cross),
        }
    }
}

/// Size of an item along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ItemExtent {
    /// Derive the extent from the natural size of the first realized item.
    #[default]
    Auto,
    /// Use this extent for every item.
    Fixed(f64),
}

impl ItemExtent {
    /// Returns the fixed value, if any.
    #[must_use]
    pub const fn fixed(self) -> Option<f64> {
        match self {
            Self::Auto => None,
            Self::Fixed(v) => Some(v),
        }
    }

    /// Constraint to measure a probe with along this axis: the fixed value or unbounded.
    pub(crate) fn probe_constraint(self) -> f64 {
        self.fixed().unwrap_or(f64::INFINITY)
    }
}

/// Granularity of scrolling along the main axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ScrollUnit {
    /// Continuous pixel offsets.
    #[default]
    Pixel,
    /// Offsets snap to whole lines.
    Item,
}

/// What happens to a representation whose index leaves the visible range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VirtualizationMode {
    /// Hand it straight back to the [`Realizer`](crate::Realizer) for destruction.
    #[default]
    Standard,
    /// Keep it in a pool and rebind it to the next index that needs one.
    Recycling,
}

/// Layout configuration for a [`WrapPanel`](crate::WrapPanel).
///
/// This is a plain value; hand a new one to
/// [`WrapPanel::set_config`](crate::WrapPanel::set_config) and the panel compares it
/// against the current one to decide what must be recomputed.
///
/// ```rust
/// use understory_virtual_wrap::{ItemExtent, ScrollUnit, WrapConfig};
///
/// let config = WrapConfig {
///     item_width: ItemExtent::Fixed(100.0),
///     item_height: ItemExtent::Fixed(50.0),
///     horizontal_spacing: 10.0,
///     scroll_unit: ScrollUnit::Item,
///     ..WrapConfig::default()
/// };
/// assert_eq!(config.cache_length, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapConfig {
    /// Flow direction and wrap axis.
    pub orientation: Orientation,
    /// Item width, fixed or probed.
    pub item_width: ItemExtent,
    /// Item height, fixed or probed.
    pub item_height: ItemExtent,
    /// Gap between horizontally adjacent items.
    pub horizontal_spacing: f64,
    /// Gap between vertically adjacent items.
    pub vertical_spacing: f64,
    /// Extra lines kept realized beyond each edge of the viewport.
    pub cache_length: usize,
    /// Grow items along the cross axis to fill leftover line space.
    pub stretch_items: bool,
    /// Pixel or line-snapped scrolling.
    pub scroll_unit: ScrollUnit,
    /// Whether released representations are pooled for reuse.
    pub virtualization_mode: VirtualizationMode,
    /// Number of line steps a single wheel notch scrolls.
    pub wheel_scroll_lines: usize,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            item_width: ItemExtent::Auto,
            item_height: ItemExtent::Auto,
            horizontal_spacing: 0.0,
            vertical_spacing: 0.0,
            cache_length: 2,
            stretch_items: false,
            scroll_unit: ScrollUnit::Pixel,
            virtualization_mode: VirtualizationMode::Standard,
            wheel_scroll_lines: 3,
        }
    }
}

impl WrapConfig {
    /// Returns `true` if at least one item dimension comes from a probe.
    #[must_use]
    pub const fn needs_probe(&self) -> bool {
        self.item_width.fixed().is_none() || self.item_height.fixed().is_none()
    }

    /// Returns `true` if switching from `self` to `other` invalidates a probed size.
    #[must_use]
    pub fn probe_differs(&self, other: &Self) -> bool {
        self.item_width != other.item_width
            || self.item_height != other.item_height
            || self.orientation != other.orientation
    }

    /// Spacing as a size, with negative and non-finite values replaced by zero.
    #[must_use]
    pub fn spacing(&self) -> Size {
        Size::new(
            sanitize_spacing(self.horizontal_spacing),
            sanitize_spacing(self.vertical_spacing),
        )
    }

    /// Constraint a probe representation is measured against.
    pub(crate) fn probe_constraint(&self) -> Size {
        Size::new(
            self.item_width.probe_constraint(),
            self.item_height.probe_constraint(),
        )
    }
}

fn sanitize_spacing(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}

/// Clamps an item extent to [`MIN_ITEM_EXTENT`], mapping non-finite values to the floor.
pub(crate) fn clamp_item_extent(v: f64) -> f64 {
    if v.is_finite() && v > MIN_ITEM_EXTENT {
        v
    } else {
        MIN_ITEM_EXTENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = WrapConfig::default();
        assert_eq!(config.orientation, Orientation::Horizontal);
        assert_eq!(config.item_width, ItemExtent::Auto);
        assert_eq!(config.item_height, ItemExtent::Auto);
        assert_eq!(config.cache_length, 2);
        assert!(!config.stretch_items);
        assert_eq!(config.scroll_unit, ScrollUnit::Pixel);
        assert!(config.needs_probe());
    }

    #[test]
    fn orientation_maps_axes() {
        assert_eq!(Orientation::Horizontal.main_axis(), Axis::Vertical);
        assert_eq!(Orientation::Horizontal.cross_axis(), Axis::Horizontal);
        assert_eq!(Orientation::Vertical.main_axis(), Axis::Horizontal);

        let s = Orientation::Horizontal.size(50.0, 100.0);
        assert_eq!(s, Size::new(100.0, 50.0));
        let s = Orientation::Vertical.size(50.0, 100.0);
        assert_eq!(s, Size::new(50.0, 100.0));
        assert_eq!(Axis::Vertical.of(s), 100.0);
    }

    #[test]
    fn spacing_is_sanitized() {
        let config = WrapConfig {
            horizontal_spacing: -4.0,
            vertical_spacing: f64::NAN,
            ..WrapConfig::default()
        };
        assert_eq!(config.spacing(), Size::ZERO);
    }

    #[test]
    fn probe_invalidation_ignores_unrelated_fields() {
        let a = WrapConfig::default();
        let b = WrapConfig {
            cache_length: 7,
            stretch_items: true,
            ..a
        };
        assert!(!a.probe_differs(&b));
        let c = WrapConfig {
            item_height: ItemExtent::Fixed(20.0),
            ..a
        };
        assert!(a.probe_differs(&c));
    }

    #[test]
    fn item_extent_floor() {
        assert_eq!(clamp_item_extent(0.0), MIN_ITEM_EXTENT);
        assert_eq!(clamp_item_extent(-3.0), MIN_ITEM_EXTENT);
        assert_eq!(clamp_item_extent(f64::INFINITY), MIN_ITEM_EXTENT);
        assert_eq!(clamp_item_extent(42.0), 42.0);
    }
}
