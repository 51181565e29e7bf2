// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window provider without an OS behind it.
//!
//! Windows record their draw calls and queue the events a test injects
//! through a [`HeadlessHandle`]. Creation can be made to fail on demand.

use core::cell::RefCell;
use std::rc::Rc;

use berth_imgui::{Color, DrawCommand, RecordingSink, RenderSink};
use kurbo::{Affine, Point, Rect, Size};

use crate::window::{NativeWindow, WindowEvent, WindowMetrics, WindowProvider};
use crate::WindowError;

#[derive(Debug)]
struct WindowState {
    title: String,
    metrics: WindowMetrics,
    visible: bool,
    closed: bool,
    events: Vec<WindowEvent>,
}

#[derive(Debug)]
struct ProviderState {
    windows: Vec<(Rc<RefCell<WindowState>>, Rc<RefCell<RecordingSink>>)>,
    fail_next: usize,
    attempts: usize,
    content_scale: f64,
    drawable_scale: f64,
}

/// Creates [`HeadlessWindow`]s. Clones share state, so a test can keep one
/// clone while the dock manager owns another.
#[derive(Clone, Debug)]
pub struct HeadlessProvider {
    shared: Rc<RefCell<ProviderState>>,
}

impl Default for HeadlessProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessProvider {
    /// Provider creating windows with unit scale factors.
    pub fn new() -> Self {
        Self::with_scales(1.0, 1.0)
    }

    /// Provider creating windows with the given content and drawable scales.
    pub fn with_scales(content_scale: f64, drawable_scale: f64) -> Self {
        Self {
            shared: Rc::new(RefCell::new(ProviderState {
                windows: Vec::new(),
                fail_next: 0,
                attempts: 0,
                content_scale,
                drawable_scale,
            })),
        }
    }

    /// Make the next `n` creation requests fail.
    pub fn fail_next_creations(&self, n: usize) {
        self.shared.borrow_mut().fail_next = n;
    }

    /// Number of creation requests, failed or not.
    pub fn attempts(&self) -> usize {
        self.shared.borrow().attempts
    }

    /// Number of windows created.
    pub fn created(&self) -> usize {
        self.shared.borrow().windows.len()
    }

    /// Handle to the `index`th window created.
    pub fn window(&self, index: usize) -> Option<HeadlessHandle> {
        let shared = self.shared.borrow();
        let (state, sink) = shared.windows.get(index)?;
        Some(HeadlessHandle {
            state: state.clone(),
            sink: sink.clone(),
        })
    }
}

impl WindowProvider for HeadlessProvider {
    fn create_window(&mut self, title: &str, size: Size) -> Result<Box<dyn NativeWindow>, WindowError> {
        let mut shared = self.shared.borrow_mut();
        shared.attempts += 1;
        if shared.fail_next > 0 {
            shared.fail_next -= 1;
            return Err(WindowError::CreationFailed {
                title: title.to_owned(),
                reason: "injected failure".to_owned(),
            });
        }
        let state = Rc::new(RefCell::new(WindowState {
            title: title.to_owned(),
            metrics: WindowMetrics {
                position: Point::ZERO,
                drawable_size: size * shared.drawable_scale,
                content_scale: shared.content_scale,
                drawable_scale: shared.drawable_scale,
            },
            visible: false,
            closed: false,
            events: Vec::new(),
        }));
        let sink = Rc::new(RefCell::new(RecordingSink::new()));
        shared.windows.push((state.clone(), sink.clone()));
        tracing::debug!(title, ?size, "headless window created");
        Ok(Box::new(HeadlessWindow {
            state,
            sink: SharedSink(sink),
        }))
    }
}

/// Render sink forwarding to a recording shared with a [`HeadlessHandle`].
#[derive(Debug)]
struct SharedSink(Rc<RefCell<RecordingSink>>);

impl RenderSink for SharedSink {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.0.borrow_mut().fill_rect(rect, color);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        self.0.borrow_mut().stroke_rect(rect, color, width);
    }

    fn text(&mut self, origin: Point, text: &str, color: Color) {
        self.0.borrow_mut().text(origin, text, color);
    }

    fn push_clip(&mut self, rect: Rect) {
        self.0.borrow_mut().push_clip(rect);
    }

    fn pop_clip(&mut self) {
        self.0.borrow_mut().pop_clip();
    }

    fn push_transform(&mut self, transform: Affine) {
        self.0.borrow_mut().push_transform(transform);
    }

    fn pop_transform(&mut self) {
        self.0.borrow_mut().pop_transform();
    }
}

/// A window that only records.
#[derive(Debug)]
pub struct HeadlessWindow {
    state: Rc<RefCell<WindowState>>,
    sink: SharedSink,
}

impl NativeWindow for HeadlessWindow {
    fn metrics(&self) -> WindowMetrics {
        self.state.borrow().metrics
    }

    fn set_position(&mut self, position: Point) {
        self.state.borrow_mut().metrics.position = position;
    }

    fn set_size(&mut self, size: Size) {
        let mut state = self.state.borrow_mut();
        let drawable = size * state.metrics.drawable_scale;
        if drawable != state.metrics.drawable_size {
            state.metrics.drawable_size = drawable;
            state.events.push(WindowEvent::Resized(drawable));
        }
    }

    fn set_visible(&mut self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    fn close(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.closed {
            state.closed = true;
            state.visible = false;
            tracing::debug!(title = %state.title, "headless window closed");
        }
    }

    fn sink(&mut self) -> &mut dyn RenderSink {
        &mut self.sink
    }

    fn drain_events(&mut self) -> Vec<WindowEvent> {
        core::mem::take(&mut self.state.borrow_mut().events)
    }
}

/// Test-side view of a [`HeadlessWindow`].
#[derive(Clone, Debug)]
pub struct HeadlessHandle {
    state: Rc<RefCell<WindowState>>,
    sink: Rc<RefCell<RecordingSink>>,
}

impl HeadlessHandle {
    /// Queue an event as if the OS had sent it.
    pub fn push_event(&self, event: WindowEvent) {
        self.state.borrow_mut().events.push(event);
    }

    /// Simulate the user clicking the window's close button.
    pub fn request_close(&self) {
        self.push_event(WindowEvent::CloseRequested);
    }

    /// Simulate the user moving the window.
    pub fn move_to(&self, position: Point) {
        self.state.borrow_mut().metrics.position = position;
    }

    /// Title the window was created with.
    pub fn title(&self) -> String {
        self.state.borrow().title.clone()
    }

    /// Current metrics.
    pub fn metrics(&self) -> WindowMetrics {
        self.state.borrow().metrics
    }

    /// Whether the window has been shown.
    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    /// Whether the window has been destroyed.
    pub fn is_closed(&self) -> bool {
        self.state.borrow().closed
    }

    /// Commands drawn into the window since the last [`HeadlessHandle::clear`].
    pub fn recorded(&self) -> Vec<DrawCommand> {
        self.sink.borrow().commands.clone()
    }

    /// Text drawn into the window since the last clear.
    pub fn texts(&self) -> Vec<String> {
        self.sink.borrow().texts().map(str::to_owned).collect()
    }

    /// Forget recorded commands.
    pub fn clear(&self) {
        self.sink.borrow_mut().clear();
    }
}
