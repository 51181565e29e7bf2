// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame builder pairing a [`Context`] with a [`RenderSink`].

use kurbo::{Point, Rect, Size, Vec2};

use crate::context::{CONTENT_SLOT, RegionFrame, SCROLL_SLOT};
use crate::{Context, Extent, Id, IdKey, LayoutCursor, RenderSink, Response};

/// Widget builder for one window during one frame.
///
/// Borrowing the sink here, rather than storing it in the [`Context`], lets a
/// single context render several native windows, each into its own sink.
pub struct Ui<'a> {
    ctx: &'a mut Context,
    sink: &'a mut dyn RenderSink,
}

impl core::fmt::Debug for Ui<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ui")
            .field("region_depth", &self.ctx.region_depth())
            .finish_non_exhaustive()
    }
}

impl<'a> Ui<'a> {
    /// Build into `sink` using `ctx`.
    pub fn new(ctx: &'a mut Context, sink: &'a mut dyn RenderSink) -> Self {
        Self { ctx, sink }
    }

    /// The shared context.
    pub fn ctx(&mut self) -> &mut Context {
        self.ctx
    }

    /// The sink draw calls go to.
    pub fn sink(&mut self) -> &mut dyn RenderSink {
        self.sink
    }

    /// Run `f` with `key` pushed on the id stack.
    pub fn scope<R>(&mut self, key: impl IdKey, f: impl FnOnce(&mut Self) -> R) -> R {
        self.ctx.ids.push_scope(key);
        let r = f(self);
        self.ctx.ids.pop_scope();
        r
    }

    /// Open a clipped region at `rect`.
    ///
    /// The region's clip is `rect` intersected with the enclosing clip. Returns
    /// whether any of it is visible. Every call must be matched by
    /// [`Ui::end_region`], visible or not, so that scroll state persists
    /// while the region is hidden.
    pub fn begin_region(&mut self, key: impl IdKey, rect: Rect, scrollable: bool) -> bool {
        let parent_clip = self.ctx.current_clip();
        let id = self.ctx.ids.push_scope(key);
        let clip = rect.intersect(parent_clip);
        let visible = clip.area() > 0.0;
        if visible && clip.contains(self.ctx.interaction.pointer().position) {
            self.ctx.interaction.claim_hover_region(id);
        }

        let style = self.ctx.style();
        let mut body = rect.inset(-style.padding);
        let scroll = self
            .ctx
            .storage
            .retrieve_vec2(id, SCROLL_SLOT)
            .unwrap_or(Vec2::ZERO);
        if scrollable {
            let content = self
                .ctx
                .storage
                .retrieve_size(id, CONTENT_SLOT)
                .unwrap_or(Size::ZERO);
            if content.height > body.height() {
                body.x1 -= style.scrollbar_size;
            }
            if content.width > body.width() {
                body.y1 -= style.scrollbar_size;
            }
        }
        body.x1 = body.x1.max(body.x0);
        body.y1 = body.y1.max(body.y0);
        let layout = LayoutCursor::new(body - scroll, style);

        self.sink.push_clip(clip);
        self.ctx.regions.push(RegionFrame {
            id,
            rect,
            clip,
            visible,
            scrollable,
            scroll,
            layout,
        });
        visible
    }

    /// Close the innermost region: update scrolling and persist its state.
    ///
    /// A hidden region built no content, so its previous scroll offset and
    /// content size are carried over unchanged.
    pub fn end_region(&mut self) {
        let Some(region) = self.ctx.regions.pop() else {
            debug_assert!(false, "end_region without matching begin_region");
            tracing::error!("end_region without matching begin_region; ignored");
            return;
        };
        let (scroll, content) = if region.visible {
            let content = region.layout.content_size();
            let mut scroll = region.scroll;
            if region.scrollable {
                scroll = self.scrollbars(&region, content);
            }
            let body = region.layout.body() + region.scroll;
            scroll.x = scroll.x.clamp(0.0, (content.width - body.width()).max(0.0));
            scroll.y = scroll.y.clamp(0.0, (content.height - body.height()).max(0.0));
            (scroll, content)
        } else {
            let content = self
                .ctx
                .storage
                .retrieve_size(region.id, CONTENT_SLOT)
                .unwrap_or(Size::ZERO);
            (region.scroll, content)
        };

        self.ctx.storage.store_slot(region.id, SCROLL_SLOT, scroll);
        self.ctx.storage.store_slot(region.id, CONTENT_SLOT, content);
        self.sink.pop_clip();
        self.ctx.ids.pop_scope();
    }

    /// Open a region, run `f` if it is visible, and close it.
    pub fn region<R>(
        &mut self,
        key: impl IdKey,
        rect: Rect,
        scrollable: bool,
        f: impl FnOnce(&mut Self) -> R,
    ) -> Option<R> {
        let visible = self.begin_region(key, rect, scrollable);
        let r = visible.then(|| f(self));
        self.end_region();
        r
    }

    fn scrollbars(&mut self, region: &RegionFrame, content: Size) -> Vec2 {
        let style = self.ctx.style().clone();
        let body = region.layout.body() + region.scroll;
        let mut scroll = region.scroll;
        let hovered_region = self.ctx.interaction.hover_region() == Some(region.id);
        let wheel = self.ctx.interaction.pointer().wheel;

        if content.height > body.height() {
            if hovered_region && wheel.y != 0.0 {
                scroll.y += wheel.y * style.wheel_step;
            }
            let track = Rect::new(
                region.rect.x1 - style.scrollbar_size,
                region.rect.y0,
                region.rect.x1,
                body.y1 + style.padding,
            );
            scroll.y = self.scroll_thumb(
                region,
                "vscroll",
                track,
                scroll.y,
                content.height,
                body.height(),
                true,
            );
        }
        if content.width > body.width() {
            if hovered_region && wheel.x != 0.0 {
                scroll.x += wheel.x * style.wheel_step;
            }
            let track = Rect::new(
                region.rect.x0,
                region.rect.y1 - style.scrollbar_size,
                body.x1 + style.padding,
                region.rect.y1,
            );
            scroll.x = self.scroll_thumb(
                region,
                "hscroll",
                track,
                scroll.x,
                content.width,
                body.width(),
                false,
            );
        }
        scroll
    }

    fn scroll_thumb(
        &mut self,
        region: &RegionFrame,
        key: &str,
        track: Rect,
        offset: f64,
        content: f64,
        view: f64,
        vertical: bool,
    ) -> f64 {
        let thumb_min = self.ctx.style().thumb_min;
        let colors = self.ctx.style().colors.clone();
        let track_len = if vertical {
            track.height()
        } else {
            track.width()
        };
        let max = (content - view).max(0.0);
        let thumb_len = (track_len * view / content).max(thumb_min).min(track_len);
        let travel = (track_len - thumb_len).max(0.0);
        let pos = if max > 0.0 {
            travel * (offset.clamp(0.0, max) / max)
        } else {
            0.0
        };
        let thumb = if vertical {
            Rect::new(track.x0, track.y0 + pos, track.x1, track.y0 + pos + thumb_len)
        } else {
            Rect::new(track.x0 + pos, track.y0, track.x0 + pos + thumb_len, track.y1)
        };

        let id = region.id.with(key);
        let response = self
            .ctx
            .interaction
            .interact(id, thumb, region.clip, Some(region.id));
        let mut offset = offset;
        if response.held && travel > 0.0 {
            let delta = if vertical {
                response.drag_delta.y
            } else {
                response.drag_delta.x
            };
            offset += delta * max / travel;
        }

        self.sink.fill_rect(track, colors.scroll_track);
        self.sink.fill_rect(thumb, colors.scroll_thumb);
        offset
    }

    /// Clip of the innermost region.
    pub fn clip(&self) -> Rect {
        self.ctx.current_clip()
    }

    /// Whether the innermost region has any visible area.
    pub fn visible(&self) -> bool {
        self.ctx.regions.last().is_none_or(|r| r.visible)
    }

    /// Describe the following rows of the innermost region.
    pub fn row(&mut self, widths: &[Extent], height: Extent) {
        if let Some(region) = self.ctx.regions.last_mut() {
            region.layout.row(widths, height);
        }
    }

    /// Allocate the next layout cell of the innermost region.
    ///
    /// Outside any region there is nothing to allocate from; an empty
    /// rectangle is returned.
    pub fn next_cell(&mut self) -> Rect {
        match self.ctx.regions.last_mut() {
            Some(region) => region.layout.next(),
            None => Rect::ZERO,
        }
    }

    /// Nest a column inside the next cell.
    pub fn begin_column(&mut self) {
        if let Some(region) = self.ctx.regions.last_mut() {
            region.layout.begin_column();
        }
    }

    /// Close the innermost column.
    pub fn end_column(&mut self) {
        if let Some(region) = self.ctx.regions.last_mut() {
            region.layout.end_column();
        }
    }

    /// Resolve an interactive element at `rect` within the innermost region.
    pub fn interact(&mut self, key: impl IdKey, rect: Rect) -> Response {
        let id = self.ctx.id(key);
        self.interact_id(id, rect)
    }

    /// Resolve an element whose id was computed elsewhere.
    pub fn interact_id(&mut self, id: Id, rect: Rect) -> Response {
        let clip = self.ctx.current_clip();
        let region = self.ctx.current_region();
        self.ctx.interaction.interact(id, rect, clip, region)
    }

    /// Text in the next cell.
    pub fn label(&mut self, text: &str) {
        let cell = self.next_cell();
        if self.visible() {
            let pad = self.ctx.style().padding;
            let color = self.ctx.style().colors.text;
            self.sink
                .text(cell.origin() + Vec2::new(pad, pad), text, color);
        }
    }

    /// Push button in the next cell. Returns its response; check
    /// [`Response::clicked`].
    pub fn button(&mut self, label: &str) -> Response {
        let cell = self.next_cell();
        let response = self.interact(label, cell);
        if self.visible() {
            let colors = &self.ctx.style().colors;
            let fill = if response.held {
                colors.button_active
            } else if response.hovered {
                colors.button_hover
            } else {
                colors.button
            };
            let text = colors.text;
            let pad = self.ctx.style().padding;
            self.sink.fill_rect(cell, fill);
            self.sink
                .text(cell.origin() + Vec2::new(pad, pad), label, text);
        }
        response
    }

    /// Checkbox bound to `value`, toggled on click.
    pub fn checkbox(&mut self, label: &str, value: &mut bool) -> Response {
        let cell = self.next_cell();
        let response = self.interact(("checkbox", label), cell);
        if response.clicked() {
            *value = !*value;
        }
        if self.visible() {
            let colors = self.ctx.style().colors.clone();
            let side = cell.height();
            let bx = Rect::from_origin_size(cell.origin(), Size::new(side, side));
            self.sink.fill_rect(
                bx,
                if response.hovered {
                    colors.button_hover
                } else {
                    colors.button
                },
            );
            if *value {
                self.sink.fill_rect(bx.inset(-side * 0.25), colors.text);
            }
            self.sink.text(
                Point::new(bx.x1 + self.ctx.style().spacing, cell.y0),
                label,
                colors.text,
            );
        }
        response
    }

    /// Header that remembers whether it is expanded. Returns the new state.
    pub fn collapsing_header(&mut self, label: &str, default_open: bool) -> bool {
        let cell = self.next_cell();
        let id = self.ctx.id(("header", label));
        let mut open = self
            .ctx
            .storage
            .retrieve_bool(id)
            .unwrap_or(default_open);
        let response = self.interact_id(id, cell);
        if response.clicked() {
            open = !open;
        }
        self.ctx.storage.store(id, open);
        if self.visible() {
            let colors = self.ctx.style().colors.clone();
            self.sink.fill_rect(cell, colors.button);
            let marker = if open { "v " } else { "> " };
            let pad = self.ctx.style().padding;
            self.sink.text(
                cell.origin() + Vec2::new(pad, pad),
                &format!("{marker}{label}"),
                colors.text,
            );
        }
        open
    }
}
