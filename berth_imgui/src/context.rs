// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-frame context shared by every element built during a frame.

use kurbo::{Rect, Vec2};

use crate::{Id, IdKey, IdStack, Interaction, LayoutCursor, PointerInput, Storage, Style};

/// Storage slot holding a region's scroll offset.
pub(crate) const SCROLL_SLOT: u32 = 1;
/// Storage slot holding a region's content size.
pub(crate) const CONTENT_SLOT: u32 = 2;

/// An open region: clip, layout, and scroll state.
#[derive(Clone, Debug)]
pub(crate) struct RegionFrame {
    pub(crate) id: Id,
    pub(crate) rect: Rect,
    pub(crate) clip: Rect,
    pub(crate) visible: bool,
    pub(crate) scrollable: bool,
    pub(crate) scroll: Vec2,
    pub(crate) layout: LayoutCursor,
}

/// Identity, storage, interaction, and region state for one UI.
///
/// A `Context` lives across frames. Each frame is bracketed by
/// [`Context::begin_frame`] and [`Context::end_frame`]; in between, widgets
/// are built through a [`crate::Ui`].
#[derive(Clone, Debug, Default)]
pub struct Context {
    pub(crate) ids: IdStack,
    pub(crate) storage: Storage,
    pub(crate) interaction: Interaction,
    pub(crate) regions: Vec<RegionFrame>,
    style: Style,
    frame: u64,
    in_frame: bool,
}

impl Context {
    /// Context with the default style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with a custom style.
    pub fn with_style(style: Style) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    /// Widget metrics and colors.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Mutable style; changes apply from the next widget on.
    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    /// Open a frame with this frame's pointer sample.
    pub fn begin_frame(&mut self, pointer: PointerInput) {
        if self.in_frame {
            debug_assert!(false, "begin_frame called twice without end_frame");
            tracing::error!(frame = self.frame, "begin_frame without end_frame; closing previous frame");
            self.end_frame();
        }
        self.in_frame = true;
        self.ids.reset();
        self.regions.clear();
        self.interaction.begin_frame(pointer);
    }

    /// Close the frame: publish interaction results and swap storage.
    pub fn end_frame(&mut self) {
        if !self.regions.is_empty() {
            debug_assert!(false, "{} regions left open at end_frame", self.regions.len());
            tracing::error!(open = self.regions.len(), "regions left open at end_frame");
            self.regions.clear();
        }
        self.interaction.end_frame();
        self.storage.swap();
        self.frame += 1;
        self.in_frame = false;
    }

    /// Number of completed frames.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Whether a frame is open.
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    /// Id scope stack.
    pub fn ids(&self) -> &IdStack {
        &self.ids
    }

    /// Mutable id scope stack.
    pub fn ids_mut(&mut self) -> &mut IdStack {
        &mut self.ids
    }

    /// Id of `key` under the current scope.
    pub fn id(&self, key: impl IdKey) -> Id {
        self.ids.id(key)
    }

    /// Per-element storage.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Mutable per-element storage.
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Hot/active tracker.
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Mutable hot/active tracker.
    pub fn interaction_mut(&mut self) -> &mut Interaction {
        &mut self.interaction
    }

    /// Hand the current press to `id`.
    pub fn set_active(&mut self, id: Id) {
        self.interaction.set_active(id);
    }

    /// Element currently holding the press.
    pub fn active(&self) -> Option<Id> {
        self.interaction.active()
    }

    /// Innermost open region's id.
    pub fn current_region(&self) -> Option<Id> {
        self.regions.last().map(|r| r.id)
    }

    /// Innermost open region's clip, or an unbounded rectangle outside any
    /// region.
    pub fn current_clip(&self) -> Rect {
        self.regions
            .last()
            .map(|r| r.clip)
            .unwrap_or(Rect::new(f64::MIN, f64::MIN, f64::MAX, f64::MAX))
    }

    /// Nesting depth of open regions.
    pub fn region_depth(&self) -> usize {
        self.regions.len()
    }

    /// Last frame's scroll offset of the region `id`.
    pub fn region_scroll(&self, id: Id) -> Vec2 {
        self.storage.retrieve_vec2(id, SCROLL_SLOT).unwrap_or(Vec2::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn frames_swap_storage() {
        let mut ctx = Context::new();
        let id = Id::ROOT.with("x");
        ctx.begin_frame(PointerInput::hover_at(Point::ZERO));
        ctx.storage_mut().store(id, 5_i64);
        ctx.end_frame();
        assert_eq!(ctx.frame_count(), 1);
        assert_eq!(ctx.storage().retrieve(id), Some(crate::Stored::Int(5)));
    }

    #[test]
    fn id_scopes_reset_each_frame() {
        let mut ctx = Context::new();
        ctx.begin_frame(PointerInput::default());
        ctx.ids_mut().push_scope("leaked");
        let leaked = ctx.id("k");
        ctx.end_frame();

        ctx.begin_frame(PointerInput::default());
        assert_eq!(ctx.ids().depth(), 0);
        assert_ne!(ctx.id("k"), leaked);
        assert_eq!(ctx.id("k"), Id::ROOT.with("k"));
        ctx.end_frame();
    }

    #[test]
    fn outside_regions_clip_is_unbounded() {
        let ctx = Context::new();
        assert!(ctx.current_clip().contains(Point::new(1.0e9, -1.0e9)));
        assert_eq!(ctx.current_region(), None);
    }
}
