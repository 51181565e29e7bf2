// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Double-buffered per-element state.
//!
//! Values stored while a frame is being built only become visible to
//! [`Storage::retrieve`] after [`Storage::swap`]. Reads therefore always answer
//! with what the element recorded last frame, never with a half-built answer
//! from the frame in progress.

use hashbrown::HashMap;
use kurbo::{Rect, Size, Vec2};

use crate::Id;

/// A small value persisted for one element.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stored {
    /// Toggle state, for example an expanded header.
    Bool(bool),
    /// Integer state, for example a selected index.
    Int(i64),
    /// A single measurement, for example a content height.
    Float(f64),
    /// An offset, for example a scroll position.
    Vec2(Vec2),
    /// A measured size.
    Size(Size),
    /// A measured rectangle.
    Rect(Rect),
}

impl From<bool> for Stored {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Stored {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Stored {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Vec2> for Stored {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Size> for Stored {
    fn from(v: Size) -> Self {
        Self::Size(v)
    }
}

impl From<Rect> for Stored {
    fn from(v: Rect) -> Self {
        Self::Rect(v)
    }
}

/// Per-element state keyed by [`Id`], split into last frame and this frame.
#[derive(Clone, Debug, Default)]
pub struct Storage {
    previous: HashMap<(Id, u32), Stored>,
    current: HashMap<(Id, u32), Stored>,
}

impl Storage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `id`; readable from the next frame on.
    pub fn store(&mut self, id: Id, value: impl Into<Stored>) {
        self.store_slot(id, 0, value);
    }

    /// Record `value` in a numbered slot of `id`.
    ///
    /// Slots let one element persist several values (a region keeps both its
    /// scroll offset and its content size).
    pub fn store_slot(&mut self, id: Id, slot: u32, value: impl Into<Stored>) {
        self.current.insert((id, slot), value.into());
    }

    /// Value stored for `id` during the previous frame.
    pub fn retrieve(&self, id: Id) -> Option<Stored> {
        self.retrieve_slot(id, 0)
    }

    /// Value stored in `slot` of `id` during the previous frame.
    pub fn retrieve_slot(&self, id: Id, slot: u32) -> Option<Stored> {
        self.previous.get(&(id, slot)).copied()
    }

    /// Last frame's toggle state of `id`.
    pub fn retrieve_bool(&self, id: Id) -> Option<bool> {
        match self.retrieve(id)? {
            Stored::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Last frame's measurement of `id`.
    pub fn retrieve_float(&self, id: Id) -> Option<f64> {
        match self.retrieve(id)? {
            Stored::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Last frame's offset in `slot` of `id`.
    pub fn retrieve_vec2(&self, id: Id, slot: u32) -> Option<Vec2> {
        match self.retrieve_slot(id, slot)? {
            Stored::Vec2(v) => Some(v),
            _ => None,
        }
    }

    /// Last frame's size in `slot` of `id`.
    pub fn retrieve_size(&self, id: Id, slot: u32) -> Option<Size> {
        match self.retrieve_slot(id, slot)? {
            Stored::Size(v) => Some(v),
            _ => None,
        }
    }

    /// End of frame: this frame's values become last frame's values.
    ///
    /// Values that were not stored again during the frame are dropped, which
    /// forgets elements that are no longer built.
    pub fn swap(&mut self) {
        core::mem::swap(&mut self.previous, &mut self.current);
        self.current.clear();
    }

    /// Number of values readable this frame.
    pub fn len(&self) -> usize {
        self.previous.len()
    }

    /// Whether no values are readable this frame.
    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_visible_only_after_swap() {
        let mut storage = Storage::new();
        let id = Id::ROOT.with("toggle");

        storage.store(id, true);
        assert_eq!(storage.retrieve(id), None);

        storage.swap();
        assert_eq!(storage.retrieve_bool(id), Some(true));

        // Overwriting during the next frame does not change what is read.
        storage.store(id, false);
        assert_eq!(storage.retrieve_bool(id), Some(true));
        storage.swap();
        assert_eq!(storage.retrieve_bool(id), Some(false));
    }

    #[test]
    fn unrefreshed_values_are_dropped() {
        let mut storage = Storage::new();
        let kept = Id::ROOT.with("kept");
        let gone = Id::ROOT.with("gone");
        storage.store(kept, 1.0);
        storage.store(gone, 2.0);
        storage.swap();
        assert_eq!(storage.len(), 2);

        storage.store(kept, 3.0);
        storage.swap();
        assert_eq!(storage.retrieve_float(kept), Some(3.0));
        assert_eq!(storage.retrieve(gone), None);
    }

    #[test]
    fn slots_are_independent() {
        let mut storage = Storage::new();
        let id = Id::ROOT.with("region");
        storage.store_slot(id, 1, Vec2::new(0.0, 40.0));
        storage.store_slot(id, 2, Size::new(100.0, 400.0));
        storage.swap();
        assert_eq!(storage.retrieve_vec2(id, 1), Some(Vec2::new(0.0, 40.0)));
        assert_eq!(storage.retrieve_size(id, 2), Some(Size::new(100.0, 400.0)));
        assert_eq!(storage.retrieve_vec2(id, 2), None, "wrong type reads as absent");
    }
}
