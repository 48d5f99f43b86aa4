// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_virtual_wrap --heading-base-level=0

//! Understory Virtual Wrap: a windowed layout engine for large wrapping grids.
//!
//! This crate lays out `0..len` uniformly sized items in lines that wrap across the
//! cross axis and scroll along the main axis. Only the items near the viewport get
//! live representations, however large the collection is. It is renderer-agnostic:
//! the host owns the actual views and plugs them in through a small trait.
//!
//! The core concepts are:
//!
//! - [`WrapConfig`]: orientation, fixed or auto item size, spacing, cache length,
//!   stretching, and pixel or item scroll granularity.
//! - [`compute_metrics`]: derives [`LayoutMetrics`] (items per line, effective item
//!   size, item rectangles, and content extent) from the available size.
//! - [`compute_visible_range`]: given a scroll offset and viewport, returns the
//!   [`VisibleRange`] of indices that need representations, padded by whole cache
//!   lines on both sides.
//! - [`Realizer`]: the host collaborator that creates, binds, measures, and releases
//!   representations. [`RealizedSet`] tracks them and optionally recycles handles.
//! - [`ScrollTracker`]: clamps and snaps offsets and coalesces [`ScrollChange`]s for
//!   a [`ScrollOwner`].
//! - [`WrapPanel`]: the engine. Each [`layout`](WrapPanel::layout) pass runs
//!   geometry, range resolution, realization, and scroll bookkeeping in order.
//!
//! Host frameworks are responsible for:
//!
//! - Implementing [`Realizer`] over their data and view instances.
//! - Reporting mutations through [`WrapPanel::collection_changed`].
//! - Running a pass when the viewport changes or [`WrapPanel::needs_layout`] is set.
//! - Positioning the items yielded by [`WrapPanel::arrange`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use understory_virtual_wrap::{ItemExtent, Realizer, WrapConfig, WrapPanel};
//!
//! /// Views are just the index they show.
//! struct Labels {
//!     count: usize,
//! }
//!
//! impl Realizer for Labels {
//!     type Handle = usize;
//!
//!     fn item_count(&self) -> usize {
//!         self.count
//!     }
//!     fn create(&mut self, index: usize) -> usize {
//!         index
//!     }
//!     fn bind(&mut self, handle: &mut usize, index: usize) {
//!         *handle = index;
//!     }
//!     fn measure(&mut self, _: &mut usize, constraint: Size) -> Size {
//!         constraint
//!     }
//!     fn release(&mut self, _: usize) {}
//! }
//!
//! let config = WrapConfig {
//!     item_width: ItemExtent::Fixed(100.0),
//!     item_height: ItemExtent::Fixed(40.0),
//!     horizontal_spacing: 10.0,
//!     cache_length: 1,
//!     ..WrapConfig::default()
//! };
//! let mut panel = WrapPanel::with_realizer(config, Labels { count: 10_000 });
//!
//! panel.layout(Size::new(430.0, 200.0));
//! assert_eq!(panel.metrics().unwrap().items_per_line(), 4);
//!
//! panel.bring_index_into_view(5_000);
//! panel.layout(Size::new(430.0, 200.0));
//! assert!(panel.realized().contains(5_000));
//!
//! // Host code would now place each realized view.
//! for (index, view, rect) in panel.arrange() {
//!     assert_eq!(index, *view);
//!     let _ = rect;
//! }
//! ```
//!
//! Items whose size is not fixed are measured once: the panel realizes index 0,
//! measures it unconstrained along the `Auto` dimensions, and uses that natural size
//! for every item until the configuration or the first item changes.
//!
//! This crate is `no_std` and uses `alloc`. Enable the `tracing` feature for
//! structured logs of each layout pass.

#![no_std]

extern crate alloc;

mod bring_into_view;
mod config;
mod geometry;
mod panel;
mod range;
mod realize;
mod scroll;

#[cfg(test)]
mod testing;

pub use bring_into_view::{offset_to_reveal, reveal_rect_on_axis};
pub use config::{
    Axis, ItemExtent, MIN_ITEM_EXTENT, Orientation, PIXEL_LINE_DELTA, ScrollUnit,
    VirtualizationMode, WrapConfig,
};
pub use geometry::{LayoutMetrics, compute_metrics};
pub use panel::{CollectionChange, Deferred, WrapPanel};
pub use range::{VisibleRange, compute_visible_range};
pub use realize::{RealizedSet, ReconcilePlan, Realizer, reconcile};
pub use scroll::{
    ScrollChange, ScrollOwner, ScrollState, ScrollTracker, line_delta, page_delta,
    wheel_delta,
};
