// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hot/active resolution for the primary pointer button.
//!
//! Every interactive element (button, tab, split handle, resize grip,
//! scrollbar thumb) goes through the same press, hold, release contract and
//! differs only in what it does with a successful drag or click.
//!
//! ## Rules
//!
//! 1. **Hover**: an element is hot when nothing else is active, the pointer is
//!    inside both the current clip and the element, the button is not held
//!    from a press that began over another element, and the element's region
//!    is the region that was topmost under the pointer last frame.
//! 2. **Press**: a button-down edge promotes the element to active if it was
//!    also the hot element at the end of the previous frame. This makes the
//!    topmost of several overlapping elements win, since it was submitted
//!    last.
//! 3. **Release**: releasing an active element is a click if the element is
//!    still hot, otherwise a drag-cancel.
//! 4. **Expiry**: an active element that is not submitted during a frame, or
//!    whose button is no longer down, is released at the end of the frame.

use kurbo::{Point, Rect, Vec2};

use crate::Id;

/// Pointer state sampled once per frame, in logical window coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointerInput {
    /// Pointer position.
    pub position: Point,
    /// Primary button is held.
    pub down: bool,
    /// Primary button went down this frame.
    pub pressed: bool,
    /// Primary button went up this frame.
    pub released: bool,
    /// Wheel movement this frame, positive towards the content end.
    pub wheel: Vec2,
}

impl PointerInput {
    /// Pointer resting at `position` with the button up.
    pub fn hover_at(position: Point) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Button-down edge at `position`.
    pub fn press_at(position: Point) -> Self {
        Self {
            position,
            down: true,
            pressed: true,
            ..Self::default()
        }
    }

    /// Button held while at `position`.
    pub fn drag_to(position: Point) -> Self {
        Self {
            position,
            down: true,
            ..Self::default()
        }
    }

    /// Button-up edge at `position`.
    pub fn release_at(position: Point) -> Self {
        Self {
            position,
            released: true,
            ..Self::default()
        }
    }
}

/// Outcome of releasing the button over an element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Release {
    /// The element was not released this frame.
    #[default]
    None,
    /// Released while still hot.
    Click,
    /// Released after the pointer left the element.
    DragCancel,
}

/// Everything one element learns from [`Interaction::interact`].
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Response {
    /// The element that was resolved.
    pub id: Option<Id>,
    /// The element's rectangle.
    pub rect: Rect,
    /// Hot this frame.
    pub hovered: bool,
    /// Became active this frame.
    pub pressed: bool,
    /// Active with the button still down.
    pub held: bool,
    /// Released this frame, and how.
    pub released: Release,
    /// Pointer movement since the previous frame, while held.
    pub drag_delta: Vec2,
    /// Distance from the press position, while held.
    pub drag_distance: f64,
}

impl Response {
    /// Released while hot.
    pub fn clicked(&self) -> bool {
        self.released == Release::Click
    }

    /// Held and moved this frame.
    pub fn dragged(&self) -> bool {
        self.held && self.drag_delta != Vec2::ZERO
    }
}

/// Per-context hot/active tracker.
#[derive(Clone, Debug, Default)]
pub struct Interaction {
    started: bool,
    pointer: PointerInput,
    sampled: Point,
    delta: Vec2,
    hot: Option<Id>,
    last_hot: Option<Id>,
    active: Option<Id>,
    active_touched: bool,
    press_origin: Option<Point>,
    press_owner: Option<Id>,
    hover_region: Option<Id>,
    next_hover_region: Option<Id>,
}

impl Interaction {
    /// A tracker with nothing hot or active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a frame with freshly sampled pointer state.
    pub fn begin_frame(&mut self, pointer: PointerInput) {
        self.delta = if self.started {
            pointer.position - self.sampled
        } else {
            Vec2::ZERO
        };
        self.started = true;
        self.sampled = pointer.position;
        self.pointer = pointer;
        self.hot = None;
        self.active_touched = false;
        self.next_hover_region = None;
        if pointer.pressed {
            self.press_origin = Some(pointer.position);
            self.press_owner = None;
        }
    }

    /// Finish the frame: publish hover results and expire stale presses.
    pub fn end_frame(&mut self) {
        if let Some(active) = self.active
            && (!self.active_touched || !self.pointer.down)
        {
            tracing::trace!(?active, "active element expired");
            self.active = None;
        }
        if !self.pointer.down {
            self.press_origin = None;
            self.press_owner = None;
        }
        self.last_hot = self.hot;
        self.hover_region = self.next_hover_region;
    }

    /// The sampled pointer.
    pub fn pointer(&self) -> &PointerInput {
        &self.pointer
    }

    /// Pointer movement since last frame.
    pub fn pointer_delta(&self) -> Vec2 {
        self.delta
    }

    /// Re-express the pointer in another window's coordinates, returning
    /// the position and movement it replaces.
    ///
    /// `scale` is the new space's units per unit of the space the frame was
    /// started in; this frame's movement is rescaled by it. Drag distance
    /// keeps being measured in the original coordinates.
    pub fn map_pointer(&mut self, position: Point, scale: f64) -> (Point, Vec2) {
        let saved = (self.pointer.position, self.delta);
        self.pointer.position = position;
        self.delta = self.delta * scale;
        saved
    }

    /// Put back what [`Interaction::map_pointer`] returned.
    pub fn restore_pointer(&mut self, (position, delta): (Point, Vec2)) {
        self.pointer.position = position;
        self.delta = delta;
    }

    /// Hot element so far this frame.
    pub fn hot(&self) -> Option<Id> {
        self.hot
    }

    /// Hot element at the end of last frame.
    pub fn last_hot(&self) -> Option<Id> {
        self.last_hot
    }

    /// Active element, if any.
    pub fn active(&self) -> Option<Id> {
        self.active
    }

    /// Whether `id` holds the press.
    pub fn is_active(&self, id: Id) -> bool {
        self.active == Some(id)
    }

    /// Hand the current press to `id`, keeping the button held.
    ///
    /// Used when a drag continues on a different element, such as a tab that
    /// became its own window.
    pub fn set_active(&mut self, id: Id) {
        tracing::trace!(?id, from = ?self.active, "active element transferred");
        self.active = Some(id);
        self.active_touched = true;
        self.press_owner = Some(id);
    }

    /// Keep `id` active this frame without resolving it.
    pub fn keep_alive(&mut self, id: Id) {
        if self.active == Some(id) {
            self.active_touched = true;
        }
    }

    /// Region that was topmost under the pointer last frame.
    pub fn hover_region(&self) -> Option<Id> {
        self.hover_region
    }

    /// Claim the pointer for `region` this frame.
    ///
    /// Regions are submitted back to front, so the last claimant is the
    /// topmost region containing the pointer.
    pub fn claim_hover_region(&mut self, region: Id) {
        self.next_hover_region = Some(region);
    }

    /// Rule 1. Marks `id` hot and returns whether it is.
    pub fn hover(&mut self, id: Id, rect: Rect, clip: Rect, region: Option<Id>) -> bool {
        if self.active.is_some_and(|a| a != id) {
            return false;
        }
        let p = self.pointer.position;
        if !clip.contains(p) || !rect.contains(p) {
            return false;
        }
        if self.pointer.down && !self.pointer.pressed && self.press_owner != Some(id) {
            return false;
        }
        if region.is_some() && region != self.hover_region {
            return false;
        }
        self.hot = Some(id);
        true
    }

    /// Rule 2. Promotes a hot `id` to active on the button-down edge.
    pub fn press(&mut self, id: Id) -> bool {
        if !self.pointer.pressed || self.hot != Some(id) || self.active.is_some() {
            return false;
        }
        if self.last_hot.is_some_and(|h| h != id) {
            return false;
        }
        tracing::trace!(?id, "element pressed");
        self.active = Some(id);
        self.active_touched = true;
        self.press_owner = Some(id);
        true
    }

    /// Rule 3. Resolves a release of an active `id`.
    pub fn release(&mut self, id: Id) -> Release {
        if self.active != Some(id) || !self.pointer.released {
            return Release::None;
        }
        self.active = None;
        if self.hot == Some(id) {
            Release::Click
        } else {
            Release::DragCancel
        }
    }

    /// Hover, press, hold, and release for one element.
    pub fn interact(&mut self, id: Id, rect: Rect, clip: Rect, region: Option<Id>) -> Response {
        let hovered = self.hover(id, rect, clip, region);
        let pressed = hovered && self.press(id);
        let held = self.active == Some(id) && self.pointer.down;
        if held {
            self.active_touched = true;
        }
        let released = self.release(id);
        let (drag_delta, drag_distance) = if held {
            let distance = self
                .press_origin
                .map(|o| o.distance(self.sampled))
                .unwrap_or(0.0);
            (self.pointer_delta(), distance)
        } else {
            (Vec2::ZERO, 0.0)
        };
        Response {
            id: Some(id),
            rect,
            hovered,
            pressed,
            held,
            released,
            drag_delta,
            drag_distance,
        }
    }
}
