// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A recording [`Realizer`] for unit tests.

use alloc::vec::Vec;

use kurbo::Size;

use crate::Realizer;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Event {
    Create(usize),
    Bind(u32, usize),
    Measure(u32, Size),
    Release(u32),
}

#[derive(Debug, PartialEq)]
pub(crate) struct MockHandle {
    pub(crate) id: u32,
    pub(crate) index: Option<usize>,
}

#[derive(Debug)]
pub(crate) struct MockRealizer {
    pub(crate) count: usize,
    pub(crate) natural: Size,
    pub(crate) log: Vec<Event>,
    /// Handles created and not yet released.
    pub(crate) live: usize,
    next_id: u32,
}

impl MockRealizer {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            count,
            natural: Size::new(100.0, 50.0),
            log: Vec::new(),
            live: 0,
            next_id: 0,
        }
    }

    pub(crate) fn with_natural(count: usize, natural: Size) -> Self {
        Self {
            natural,
            ..Self::new(count)
        }
    }

    pub(crate) fn created(&self) -> usize {
        self.log
            .iter()
            .filter(|e| matches!(e, Event::Create(_)))
            .count()
    }

    pub(crate) fn released(&self) -> usize {
        self.log
            .iter()
            .filter(|e| matches!(e, Event::Release(_)))
            .count()
    }

    pub(crate) fn probes(&self) -> usize {
        self.log
            .iter()
            .filter(|e| matches!(e, Event::Measure(_, s) if !s.is_finite()))
            .count()
    }
}

impl Realizer for MockRealizer {
    type Handle = MockHandle;

    fn item_count(&self) -> usize {
        self.count
    }

    fn create(&mut self, index: usize) -> MockHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.live += 1;
        self.log.push(Event::Create(index));
        MockHandle { id, index: None }
    }

    fn bind(&mut self, handle: &mut MockHandle, index: usize) {
        handle.index = Some(index);
        self.log.push(Event::Bind(handle.id, index));
    }

    fn measure(&mut self, handle: &mut MockHandle, constraint: Size) -> Size {
        self.log.push(Event::Measure(handle.id, constraint));
        self.natural
    }

    fn release(&mut self, handle: MockHandle) {
        self.live -= 1;
        self.log.push(Event::Release(handle.id));
    }
}
