// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row/column cell allocation inside a rectangular body.
//!
//! A [`LayoutCursor`] hands out cells left to right according to the current
//! row description, wrapping to a new row when the description is used up.
//! It records how far allocations reached so the enclosing region can size
//! its scrollbars.

use kurbo::{Point, Rect, Size, Vec2};
use smallvec::{SmallVec, smallvec};

use crate::Style;

/// Requested size of a cell along one axis.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Extent {
    /// The style default ([`Style::cell_width`] or [`Style::row_height`]).
    Auto,
    /// Exactly this many logical units.
    Fixed(f64),
    /// Share whatever is left of the row (or of the body height).
    Fill,
}

#[derive(Clone, Debug)]
struct LayoutState {
    body: Rect,
    widths: SmallVec<[Extent; 8]>,
    height: Extent,
    item: usize,
    /// Next cell position, relative to `body.origin()`.
    position: Vec2,
    next_row: f64,
    /// Furthest extent reached by any cell, relative to `body.origin()`.
    max: Vec2,
}

impl LayoutState {
    fn new(body: Rect) -> Self {
        Self {
            body,
            widths: smallvec![Extent::Fill],
            height: Extent::Auto,
            item: 0,
            position: Vec2::ZERO,
            next_row: 0.0,
            max: Vec2::ZERO,
        }
    }
}

/// Sequential cell allocator for one region.
#[derive(Clone, Debug)]
pub struct LayoutCursor {
    state: LayoutState,
    columns: SmallVec<[LayoutState; 4]>,
    spacing: f64,
    cell_width: f64,
    row_height: f64,
}

impl LayoutCursor {
    /// Start allocating at the top-left of `body`.
    ///
    /// Scrolled regions pass a body whose origin is already shifted by the
    /// scroll offset; content extent is measured from that origin.
    pub fn new(body: Rect, style: &Style) -> Self {
        Self {
            state: LayoutState::new(body),
            columns: SmallVec::new(),
            spacing: style.spacing,
            cell_width: style.cell_width,
            row_height: style.row_height,
        }
    }

    /// Describe the following rows: one cell per entry of `widths`, all of
    /// the given `height`. Starts a new row.
    pub fn row(&mut self, widths: &[Extent], height: Extent) {
        let s = &mut self.state;
        s.widths = if widths.is_empty() {
            smallvec![Extent::Fill]
        } else {
            SmallVec::from_slice(widths)
        };
        s.height = height;
        s.item = 0;
        s.position = Vec2::new(0.0, s.next_row);
    }

    /// Allocate the next cell.
    pub fn next(&mut self) -> Rect {
        if self.state.item == self.state.widths.len() {
            let widths = core::mem::take(&mut self.state.widths);
            let height = self.state.height;
            self.row(&widths, height);
        }
        let width = self.resolve_width();
        let height = match self.state.height {
            Extent::Auto => self.row_height,
            Extent::Fixed(h) => h.max(0.0),
            Extent::Fill => (self.state.body.height() - self.state.position.y).max(0.0),
        };

        let s = &mut self.state;
        let local = Rect::from_origin_size(
            Point::new(s.position.x, s.position.y),
            Size::new(width, height),
        );
        s.item += 1;
        s.position.x += width + self.spacing;
        s.next_row = s.next_row.max(local.y1 + self.spacing);
        s.max.x = s.max.x.max(local.x1);
        s.max.y = s.max.y.max(local.y1);
        local + s.body.origin().to_vec2()
    }

    fn resolve_width(&self) -> f64 {
        let s = &self.state;
        let fixed = |e: Extent| match e {
            Extent::Auto => self.cell_width,
            Extent::Fixed(w) => w.max(0.0),
            Extent::Fill => 0.0,
        };
        match s.widths[s.item] {
            Extent::Fill => {
                let rest = &s.widths[s.item..];
                let fills = rest.iter().filter(|e| matches!(e, Extent::Fill)).count();
                let reserved: f64 = rest[1..].iter().map(|&e| fixed(e) + self.spacing).sum();
                let available = s.body.width() - s.position.x - reserved;
                (available / fills as f64).max(0.0)
            }
            other => fixed(other),
        }
    }

    /// Nest a vertical sub-layout inside the next cell.
    pub fn begin_column(&mut self) {
        let cell = self.next();
        let parent = core::mem::replace(&mut self.state, LayoutState::new(cell));
        self.columns.push(parent);
    }

    /// Close the column opened by [`LayoutCursor::begin_column`], growing the
    /// parent by whatever the column's content reached.
    pub fn end_column(&mut self) {
        let Some(parent) = self.columns.pop() else {
            debug_assert!(false, "end_column without matching begin_column");
            tracing::error!("end_column without matching begin_column; ignored");
            return;
        };
        let column = core::mem::replace(&mut self.state, parent);
        let offset = column.body.origin() - self.state.body.origin();
        let reach = offset + column.max;
        let s = &mut self.state;
        s.max.x = s.max.x.max(reach.x);
        s.max.y = s.max.y.max(reach.y);
        s.next_row = s.next_row.max(reach.y + self.spacing);
    }

    /// Nesting depth of open columns.
    pub fn column_depth(&self) -> usize {
        self.columns.len()
    }

    /// The rectangle cells are allocated in.
    pub fn body(&self) -> Rect {
        self.state.body
    }

    /// Size of everything allocated so far, measured from the body origin.
    pub fn content_size(&self) -> Size {
        Size::new(self.state.max.x, self.state.max.y)
    }
}
