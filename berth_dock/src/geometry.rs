// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle arithmetic for splits, grips, and drop targets.
//!
//! Everything here is a pure function of its inputs. Degenerate inputs are
//! clamped to empty rectangles rather than rejected.

use kurbo::{Point, Rect, Size, Vec2};

use crate::{Edge, ResizeEdges, SplitAxis};

/// Divide `rect` at `fraction` along `axis`, reserving `gutter` between the
/// two halves for the split handle.
pub fn split_rects(rect: Rect, axis: SplitAxis, fraction: f64, gutter: f64) -> (Rect, Rect) {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.5
    };
    match axis {
        SplitAxis::Horizontal => {
            let gutter = gutter.clamp(0.0, rect.width().max(0.0));
            let span = (rect.width() - gutter).max(0.0);
            let x = rect.x0 + span * fraction;
            (
                Rect::new(rect.x0, rect.y0, x, rect.y1),
                Rect::new(x + gutter, rect.y0, rect.x1.max(x + gutter), rect.y1),
            )
        }
        SplitAxis::Vertical => {
            let gutter = gutter.clamp(0.0, rect.height().max(0.0));
            let span = (rect.height() - gutter).max(0.0);
            let y = rect.y0 + span * fraction;
            (
                Rect::new(rect.x0, rect.y0, rect.x1, y),
                Rect::new(rect.x0, y + gutter, rect.x1, rect.y1.max(y + gutter)),
            )
        }
    }
}

/// The gutter between the two halves produced by [`split_rects`].
pub fn handle_rect(rect: Rect, axis: SplitAxis, fraction: f64, gutter: f64) -> Rect {
    let (a, b) = split_rects(rect, axis, fraction, gutter);
    match axis {
        SplitAxis::Horizontal => Rect::new(a.x1, rect.y0, b.x0, rect.y1),
        SplitAxis::Vertical => Rect::new(rect.x0, a.y1, rect.x1, b.y0),
    }
}

/// Change in split fraction produced by dragging the handle by `delta`.
pub fn fraction_delta(rect: Rect, axis: SplitAxis, gutter: f64, delta: Vec2) -> f64 {
    let (span, d) = match axis {
        SplitAxis::Horizontal => (rect.width() - gutter, delta.x),
        SplitAxis::Vertical => (rect.height() - gutter, delta.y),
    };
    if span > 0.0 { d / span } else { 0.0 }
}

/// Whether `inner` lies entirely within `outer`.
pub fn contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

/// Hitbox of the resize grip for `edges` along the inside border of `rect`.
pub fn grip_rect(rect: Rect, edges: ResizeEdges, grip: f64) -> Rect {
    let mut r = rect;
    if edges.contains(ResizeEdges::LEFT) {
        r.x1 = r.x0 + grip;
    } else if edges.contains(ResizeEdges::RIGHT) {
        r.x0 = r.x1 - grip;
    } else {
        r.x0 += grip;
        r.x1 -= grip;
    }
    if edges.contains(ResizeEdges::TOP) {
        r.y1 = r.y0 + grip;
    } else if edges.contains(ResizeEdges::BOTTOM) {
        r.y0 = r.y1 - grip;
    } else {
        r.y0 += grip;
        r.y1 -= grip;
    }
    Rect::new(r.x0, r.y0, r.x1.max(r.x0), r.y1.max(r.y0))
}

/// Move the given `edges` of `rect` by `delta`, keeping at least `min` size.
///
/// The edge opposite to a moved edge never moves.
pub fn apply_resize(rect: Rect, edges: ResizeEdges, delta: Vec2, min: Size) -> Rect {
    let mut r = rect;
    if edges.contains(ResizeEdges::LEFT) {
        r.x0 = (r.x0 + delta.x).min(r.x1 - min.width);
    }
    if edges.contains(ResizeEdges::RIGHT) {
        r.x1 = (r.x1 + delta.x).max(r.x0 + min.width);
    }
    if edges.contains(ResizeEdges::TOP) {
        r.y0 = (r.y0 + delta.y).min(r.y1 - min.height);
    }
    if edges.contains(ResizeEdges::BOTTOM) {
        r.y1 = (r.y1 + delta.y).max(r.y0 + min.height);
    }
    r
}

/// The five drop targets drawn over a dockable node: a centered square for
/// [`Edge::Fill`] surrounded by one square per side.
pub fn drop_zones(rect: Rect, size: f64) -> [(Edge, Rect); 5] {
    let c = rect.center();
    let step = size * 1.25;
    Edge::ALL.map(|edge| {
        let (dx, dy) = match edge {
            Edge::Fill => (0.0, 0.0),
            Edge::Left => (-step, 0.0),
            Edge::Right => (step, 0.0),
            Edge::Top => (0.0, -step),
            Edge::Bottom => (0.0, step),
        };
        let zone = Rect::from_center_size(Point::new(c.x + dx, c.y + dy), Size::new(size, size));
        (edge, zone)
    })
}

/// Drop target under `point`, if any.
pub fn drop_edge_at(rect: Rect, size: f64, point: Point) -> Option<Edge> {
    drop_zones(rect, size)
        .into_iter()
        .find(|(_, zone)| zone.contains(point))
        .map(|(edge, _)| edge)
}

/// Area a node would occupy after being docked at `edge` of `rect`, drawn as
/// a preview while hovering a drop target.
pub fn dock_preview(rect: Rect, edge: Edge) -> Rect {
    match edge {
        Edge::Fill => rect,
        Edge::Left => Rect::new(rect.x0, rect.y0, rect.center().x, rect.y1),
        Edge::Right => Rect::new(rect.center().x, rect.y0, rect.x1, rect.y1),
        Edge::Top => Rect::new(rect.x0, rect.y0, rect.x1, rect.center().y),
        Edge::Bottom => Rect::new(rect.x0, rect.center().y, rect.x1, rect.y1),
    }
}
