// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render sink contract and a recording implementation.

use kurbo::{Affine, Point, Rect};

/// 8-bit RGBA color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Construct from components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Consumer of draw primitives, typically a GPU batcher.
///
/// Clip rectangles nest; an implementation must support at least as many
/// nested clips as the deepest dock tree it renders.
pub trait RenderSink {
    /// Filled axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);
    /// Hollow axis-aligned rectangle with the given line width.
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64);
    /// Text with its top-left corner at `origin`.
    fn text(&mut self, origin: Point, text: &str, color: Color);
    /// Intersect the current scissor with `rect`.
    fn push_clip(&mut self, rect: Rect);
    /// Restore the scissor active before the matching [`RenderSink::push_clip`].
    fn pop_clip(&mut self);
    /// Compose `transform` onto the current transform.
    fn push_transform(&mut self, transform: Affine);
    /// Restore the transform active before the matching push.
    fn pop_transform(&mut self);
}

/// One recorded primitive.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs, reason = "Fields mirror the RenderSink arguments.")]
pub enum DrawCommand {
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, color: Color, width: f64 },
    Text { origin: Point, text: String, color: Color },
    PushClip(Rect),
    PopClip,
    PushTransform(Affine),
    PopTransform,
}

/// Render sink that records commands instead of drawing them.
///
/// Used by headless windows and tests; also handy for snapshotting a frame.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    /// Commands in submission order.
    pub commands: Vec<DrawCommand>,
    clip_depth: usize,
    max_clip_depth: usize,
}

impl RecordingSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget recorded commands, typically at the start of a frame.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.clip_depth = 0;
        self.max_clip_depth = 0;
    }

    /// Deepest clip nesting seen since the last clear.
    pub fn max_clip_depth(&self) -> usize {
        self.max_clip_depth
    }

    /// Current clip nesting; zero when pushes and pops are balanced.
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    /// Text strings drawn since the last clear, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl RenderSink for RecordingSink {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        self.commands
            .push(DrawCommand::StrokeRect { rect, color, width });
    }

    fn text(&mut self, origin: Point, text: &str, color: Color) {
        self.commands.push(DrawCommand::Text {
            origin,
            text: text.to_owned(),
            color,
        });
    }

    fn push_clip(&mut self, rect: Rect) {
        self.clip_depth += 1;
        self.max_clip_depth = self.max_clip_depth.max(self.clip_depth);
        self.commands.push(DrawCommand::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        self.clip_depth = self.clip_depth.saturating_sub(1);
        self.commands.push(DrawCommand::PopClip);
    }

    fn push_transform(&mut self, transform: Affine) {
        self.commands.push(DrawCommand::PushTransform(transform));
    }

    fn pop_transform(&mut self) {
        self.commands.push(DrawCommand::PopTransform);
    }
}
