// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native window contract and cross-window coordinate mapping.
//!
//! Three coordinate spaces meet here:
//!
//! - **Screen points**: the OS desktop space windows are positioned in.
//! - **Drawable pixels**: the physical pixels of a window's surface.
//! - **Logical units**: what the UI is laid out in, local to one window.
//!
//! [`WindowMetrics`] carries the numbers that relate them for one window.

use berth_imgui::RenderSink;
use kurbo::{Point, Rect, Size, Vec2};

use crate::WindowError;

/// Position and scale factors of one native window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WindowMetrics {
    /// Top-left corner of the window's client area, in screen points.
    pub position: Point,
    /// Size of the drawable surface in physical pixels.
    pub drawable_size: Size,
    /// Physical pixels per logical unit (content scale and OS scale combined).
    pub content_scale: f64,
    /// Physical pixels per screen point.
    pub drawable_scale: f64,
}

impl Default for WindowMetrics {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            drawable_size: Size::ZERO,
            content_scale: 1.0,
            drawable_scale: 1.0,
        }
    }
}

fn sane_scale(s: f64) -> f64 {
    if s.is_finite() && s > 0.0 { s } else { 1.0 }
}

impl WindowMetrics {
    /// Metrics for a window at `position` whose logical and screen units
    /// coincide.
    pub fn unscaled(position: Point, size: Size) -> Self {
        Self {
            position,
            drawable_size: size,
            content_scale: 1.0,
            drawable_scale: 1.0,
        }
    }

    /// Screen points per logical unit.
    pub fn screen_per_logical(&self) -> f64 {
        sane_scale(self.content_scale) / sane_scale(self.drawable_scale)
    }

    /// Window size in logical units.
    pub fn logical_size(&self) -> Size {
        self.drawable_size / sane_scale(self.content_scale)
    }

    /// The window's own rectangle in its logical space.
    pub fn logical_rect(&self) -> Rect {
        self.logical_size().to_rect()
    }

    /// The window's client area in screen points.
    pub fn screen_rect(&self) -> Rect {
        self.to_screen(self.logical_rect())
    }

    /// Map a rectangle local to this window into screen points.
    pub fn to_screen(&self, local: Rect) -> Rect {
        let s = self.screen_per_logical();
        Rect::new(local.x0 * s, local.y0 * s, local.x1 * s, local.y1 * s) + self.position.to_vec2()
    }

    /// Map a rectangle in screen points into this window's logical space.
    pub fn from_screen(&self, screen: Rect) -> Rect {
        let s = self.screen_per_logical();
        let r = screen - self.position.to_vec2();
        Rect::new(r.x0 / s, r.y0 / s, r.x1 / s, r.y1 / s)
    }

    /// Map a point local to this window into screen points.
    pub fn point_to_screen(&self, local: Point) -> Point {
        self.position + local.to_vec2() * self.screen_per_logical()
    }

    /// Map a point in screen points into this window's logical space.
    pub fn point_from_screen(&self, screen: Point) -> Point {
        ((screen - self.position) / self.screen_per_logical()).to_point()
    }

    /// Convert a logical-space displacement into screen points.
    pub fn vec_to_screen(&self, local: Vec2) -> Vec2 {
        local * self.screen_per_logical()
    }
}

/// Something that happened to a native window since the last drain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum WindowEvent {
    /// The drawable surface changed size (physical pixels).
    Resized(Size),
    /// The OS asked for the window to be redrawn.
    RenderRequested,
    /// The user asked to close the window.
    CloseRequested,
}

/// An OS-level window hosting one standalone dock node.
///
/// OS notifications are queued by the implementation and handed over by
/// [`NativeWindow::drain_events`], once per frame; every event is returned
/// exactly once.
pub trait NativeWindow: core::fmt::Debug {
    /// Current position and scale factors.
    fn metrics(&self) -> WindowMetrics;
    /// Move the client area's top-left corner, in screen points.
    fn set_position(&mut self, position: Point);
    /// Resize the client area, in screen points.
    fn set_size(&mut self, size: Size);
    /// Show or hide the window.
    fn set_visible(&mut self, visible: bool);
    /// Destroy the native window and release its renderer.
    fn close(&mut self);
    /// The window's own render target.
    fn sink(&mut self) -> &mut dyn RenderSink;
    /// Take every event queued since the last call.
    fn drain_events(&mut self) -> Vec<WindowEvent>;
}

/// Factory for native windows.
pub trait WindowProvider: core::fmt::Debug {
    /// Create a hidden window with a client area of `size` screen points.
    fn create_window(&mut self, title: &str, size: Size)
    -> Result<Box<dyn NativeWindow>, WindowError>;
}
