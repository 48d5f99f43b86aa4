// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Realization bookkeeping: which indices have live representations.
//!
//! The engine never constructs representations itself. It asks a [`Realizer`] (the
//! host) to create, bind, measure, and release them, and tracks the results in a
//! [`RealizedSet`]. Each pass:
//!
//! 1. [`reconcile`] diffs the currently realized indices against the new
//!    [`VisibleRange`].
//! 2. Indices that left the range are released (or pooled) *before* anything new is
//!    created, which bounds peak handle count.
//! 3. Indices that stayed are reused untouched.
//! 4. Missing indices are created in ascending order, bound, and measured.

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Size;

use crate::config::VirtualizationMode;
use crate::range::VisibleRange;

/// Representation lifecycle collaborator, implemented by the host.
///
/// A *handle* is whatever the host uses to refer to a live representation of an
/// item (a widget id, a view node, an arena key, …).
pub trait Realizer {
    /// Host handle for one live representation.
    type Handle;

    /// Number of items in the backing collection.
    fn item_count(&self) -> usize;

    /// Creates a fresh, unbound representation suitable for `index`.
    ///
    /// The engine always follows this with [`bind`](Self::bind) before measuring.
    fn create(&mut self, index: usize) -> Self::Handle;

    /// Prepares `handle` to show the item at `index`.
    ///
    /// Called for new and recycled handles alike.
    fn bind(&mut self, handle: &mut Self::Handle, index: usize);

    /// Measures `handle` against `constraint` and returns its natural size.
    ///
    /// Constraint components may be infinite when a dimension is being probed.
    fn measure(&mut self, handle: &mut Self::Handle, constraint: Size) -> Size;

    /// Destroys a representation the engine no longer needs.
    fn release(&mut self, handle: Self::Handle);
}

/// The outcome of diffing realized indices against a new range.
///
/// All lists are in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Indices in the range that have no representation yet.
    pub to_create: Vec<usize>,
    /// Indices that are realized and stay in the range.
    pub to_reuse: Vec<usize>,
    /// Indices that are realized but fell out of the range.
    pub to_release: Vec<usize>,
}

impl ReconcilePlan {
    /// Returns `true` if the plan creates and releases nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.to_create.is_empty() && self.to_release.is_empty()
    }
}

/// Diffs `previous` realized indices against `range`.
///
/// Duplicates in `previous` are ignored.
#[must_use]
pub fn reconcile<I>(previous: I, range: VisibleRange) -> ReconcilePlan
where
    I: IntoIterator<Item = usize>,
{
    let mut previous: Vec<usize> = previous.into_iter().collect();
    previous.sort_unstable();
    previous.dedup();

    let mut plan = ReconcilePlan::default();
    for &index in &previous {
        if range.contains(index) {
            plan.to_reuse.push(index);
        } else {
            plan.to_release.push(index);
        }
    }

    // `to_reuse` is sorted and inside `range`, so walk both in lockstep.
    let mut reused = plan.to_reuse.iter().copied().peekable();
    for index in range {
        if reused.peek() == Some(&index) {
            reused.next();
        } else {
            plan.to_create.push(index);
        }
    }
    plan
}

/// Live representations keyed by item index, plus a pool of recycled handles.
///
/// This type owns both collections exclusively; everything else asks it to realize
/// or release on its behalf.
#[derive(Debug)]
pub struct RealizedSet<H> {
    live: HashMap<usize, H>,
    pool: Vec<H>,
}

impl<H> Default for RealizedSet<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RealizedSet<H> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            live: HashMap::new(),
            pool: Vec::new(),
        }
    }

    /// Number of live representations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns `true` if nothing is realized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of parked handles waiting to be recycled.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Returns `true` if `index` has a live representation.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.live.contains_key(&index)
    }

    /// Returns the handle realized for `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&H> {
        self.live.get(&index)
    }

    /// Realized indices in ascending order.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.live.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Iterates live representations in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &H)> {
        let mut entries: Vec<(usize, &H)> = self.live.iter().map(|(i, h)| (*i, h)).collect();
        entries.sort_unstable_by_key(|(i, _)| *i);
        entries.into_iter()
    }

    /// Realizes a single `index` if it is not already live and returns its handle.
    ///
    /// This is how the engine obtains a probe representation before the range is
    /// known; a later [`sync`](Self::sync) keeps or releases it like any other entry.
    pub fn ensure<R>(&mut self, realizer: &mut R, index: usize, mode: VirtualizationMode) -> &mut H
    where
        R: Realizer<Handle = H>,
    {
        let pool = &mut self.pool;
        self.live
            .entry(index)
            .or_insert_with(|| Self::acquire(pool, realizer, index, mode))
    }

    /// Brings the set in line with `range`.
    ///
    /// Entries outside `range` are released first, then missing entries are created
    /// in ascending order, bound, and measured against `item_size`. Reused entries
    /// are re-measured only when `remeasure_reused` is set.
    pub fn sync<R>(
        &mut self,
        realizer: &mut R,
        range: VisibleRange,
        item_size: Size,
        mode: VirtualizationMode,
        remeasure_reused: bool,
    ) -> ReconcilePlan
    where
        R: Realizer<Handle = H>,
    {
        if mode == VirtualizationMode::Standard {
            self.drain_pool(realizer);
        }

        let plan = reconcile(self.live.keys().copied(), range);
        for index in &plan.to_release {
            if let Some(handle) = self.live.remove(index) {
                self.park(realizer, handle, mode);
            }
        }
        for &index in &plan.to_create {
            let mut handle = Self::acquire(&mut self.pool, realizer, index, mode);
            realizer.measure(&mut handle, item_size);
            self.live.insert(index, handle);
        }
        if remeasure_reused {
            for index in &plan.to_reuse {
                if let Some(handle) = self.live.get_mut(index) {
                    realizer.measure(handle, item_size);
                }
            }
        }
        plan
    }

    /// Releases every live representation, pooling them in recycling mode.
    ///
    /// Returns the number of entries that were live.
    pub fn release_all<R>(&mut self, realizer: &mut R, mode: VirtualizationMode) -> usize
    where
        R: Realizer<Handle = H>,
    {
        let released = self.live.len();
        let mut entries: Vec<(usize, H)> = self.live.drain().collect();
        entries.sort_unstable_by_key(|(i, _)| *i);
        for (_, handle) in entries {
            self.park(realizer, handle, mode);
        }
        released
    }

    /// Hands every pooled handle back to the realizer.
    pub fn drain_pool<R>(&mut self, realizer: &mut R)
    where
        R: Realizer<Handle = H>,
    {
        for handle in self.pool.drain(..) {
            realizer.release(handle);
        }
    }

    fn acquire<R>(pool: &mut Vec<H>, realizer: &mut R, index: usize, mode: VirtualizationMode) -> H
    where
        R: Realizer<Handle = H>,
    {
        let recycled = match mode {
            VirtualizationMode::Recycling => pool.pop(),
            VirtualizationMode::Standard => None,
        };
        let mut handle = recycled.unwrap_or_else(|| realizer.create(index));
        realizer.bind(&mut handle, index);
        handle
    }

    fn park<R>(&mut self, realizer: &mut R, handle: H, mode: VirtualizationMode)
    where
        R: Realizer<Handle = H>,
    {
        match mode {
            VirtualizationMode::Recycling => self.pool.push(handle),
            VirtualizationMode::Standard => realizer.release(handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::Size;

    use super::{RealizedSet, ReconcilePlan, reconcile};
    use crate::config::VirtualizationMode;
    use crate::range::VisibleRange;
    use crate::testing::{Event, MockRealizer};

    const ITEM: Size = Size::new(10.0, 10.0);

    #[test]
    fn reconcile_splits_overlap() {
        let plan = reconcile([5, 3, 4, 6], VisibleRange::inclusive(4, 8));
        assert_eq!(
            plan,
            ReconcilePlan {
                to_create: vec![7, 8],
                to_reuse: vec![4, 5, 6],
                to_release: vec![3],
            }
        );
    }

    #[test]
    fn reconcile_disjoint_releases_everything() {
        let plan = reconcile(20..=40, VisibleRange::inclusive(0, 9));
        assert_eq!(plan.to_release, (20..=40).collect::<Vec<_>>());
        assert_eq!(plan.to_create, (0..=9).collect::<Vec<_>>());
        assert!(plan.to_reuse.is_empty());
    }

    #[test]
    fn reconcile_identical_is_noop() {
        let plan = reconcile(0..5, VisibleRange::inclusive(0, 4));
        assert!(plan.is_noop());
        assert_eq!(plan.to_reuse.len(), 5);
    }

    #[test]
    fn reconcile_to_empty_range() {
        let plan = reconcile([1, 2], VisibleRange::EMPTY);
        assert_eq!(plan.to_release, vec![1, 2]);
        assert!(plan.to_create.is_empty());
    }

    #[test]
    fn sync_releases_before_creating() {
        let mut realizer = MockRealizer::new(100);
        let mut set = RealizedSet::new();
        set.sync(
            &mut realizer,
            VisibleRange::inclusive(0, 2),
            ITEM,
            VirtualizationMode::Standard,
            false,
        );
        realizer.log.clear();

        set.sync(
            &mut realizer,
            VisibleRange::inclusive(2, 3),
            ITEM,
            VirtualizationMode::Standard,
            false,
        );
        let first_create = realizer
            .log
            .iter()
            .position(|e| matches!(e, Event::Create(_)))
            .unwrap();
        let last_release = realizer
            .log
            .iter()
            .rposition(|e| matches!(e, Event::Release(_)))
            .unwrap();
        assert!(last_release < first_create);
        assert_eq!(set.indices(), vec![2, 3]);
        assert_eq!(realizer.live, 2);
    }

    #[test]
    fn created_handles_are_bound_before_measure() {
        let mut realizer = MockRealizer::new(10);
        let mut set = RealizedSet::new();
        set.sync(
            &mut realizer,
            VisibleRange::inclusive(0, 0),
            ITEM,
            VirtualizationMode::Standard,
            false,
        );
        assert_eq!(
            realizer.log,
            vec![Event::Create(0), Event::Bind(0, 0), Event::Measure(0, ITEM)]
        );
        assert_eq!(set.get(0).unwrap().index, Some(0));
    }

    #[test]
    fn reused_entries_are_untouched_unless_remeasured() {
        let mut realizer = MockRealizer::new(10);
        let mut set = RealizedSet::new();
        let range = VisibleRange::inclusive(0, 3);
        set.sync(&mut realizer, range, ITEM, VirtualizationMode::Standard, false);
        realizer.log.clear();

        set.sync(&mut realizer, range, ITEM, VirtualizationMode::Standard, false);
        assert!(realizer.log.is_empty());

        let wider = Size::new(20.0, 10.0);
        set.sync(&mut realizer, range, wider, VirtualizationMode::Standard, true);
        assert_eq!(realizer.log.len(), 4);
        assert!(realizer.log.iter().all(|e| matches!(e, Event::Measure(_, s) if *s == wider)));
    }

    #[test]
    fn recycling_rebinds_pooled_handles() {
        let mut realizer = MockRealizer::new(100);
        let mut set = RealizedSet::new();
        let mode = VirtualizationMode::Recycling;
        set.sync(&mut realizer, VisibleRange::inclusive(0, 4), ITEM, mode, false);
        assert_eq!(realizer.created(), 5);

        set.sync(&mut realizer, VisibleRange::inclusive(10, 14), ITEM, mode, false);
        // All five handles were reused for new indices.
        assert_eq!(realizer.created(), 5);
        assert_eq!(realizer.released(), 0);
        assert_eq!(set.pooled(), 0);
        assert_eq!(set.get(12).unwrap().index, Some(12));

        set.sync(&mut realizer, VisibleRange::inclusive(10, 11), ITEM, mode, false);
        assert_eq!(set.pooled(), 3);

        // Switching back to standard drains the pool.
        set.sync(
            &mut realizer,
            VisibleRange::inclusive(10, 11),
            ITEM,
            VirtualizationMode::Standard,
            false,
        );
        assert_eq!(set.pooled(), 0);
        assert_eq!(realizer.released(), 3);
    }

    #[test]
    fn ensure_realizes_once() {
        let mut realizer = MockRealizer::new(10);
        let mut set = RealizedSet::new();
        set.ensure(&mut realizer, 0, VirtualizationMode::Standard);
        set.ensure(&mut realizer, 0, VirtualizationMode::Standard);
        assert_eq!(realizer.created(), 1);
        assert!(set.contains(0));
    }

    #[test]
    fn release_all_empties_live_set() {
        let mut realizer = MockRealizer::new(100);
        let mut set = RealizedSet::new();
        set.sync(
            &mut realizer,
            VisibleRange::inclusive(20, 40),
            ITEM,
            VirtualizationMode::Standard,
            false,
        );
        assert_eq!(set.release_all(&mut realizer, VirtualizationMode::Standard), 21);
        assert!(set.is_empty());
        assert_eq!(realizer.live, 0);
    }

    #[test]
    fn iter_is_sorted() {
        let mut realizer = MockRealizer::new(100);
        let mut set = RealizedSet::new();
        set.sync(
            &mut realizer,
            VisibleRange::inclusive(3, 9),
            ITEM,
            VirtualizationMode::Standard,
            false,
        );
        let order: Vec<usize> = set.iter().map(|(i, _)| i).collect();
        assert_eq!(order, (3..=9).collect::<Vec<_>>());
    }
}
