// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Berth Imgui: the immediate-mode substrate under Berth's docking layer.
//!
//! Nothing here keeps a retained widget tree. Each frame the application
//! re-declares its UI, and this crate supplies the handful of services that
//! make that workable:
//!
//! - [`Id`] and [`IdStack`]: stable element identity derived from a key and
//!   the chain of enclosing scopes.
//! - [`Storage`]: per-element state that survives between frames. Writes made
//!   during a frame become readable after [`Context::end_frame`].
//! - [`Interaction`]: hot/active resolution for the primary pointer button,
//!   including the rule that only the topmost region under the pointer may
//!   react.
//! - [`LayoutCursor`]: row/column cell allocation inside a region.
//! - [`Ui`]: widgets (labels, buttons, checkboxes, scrolling regions) drawn
//!   into a [`RenderSink`].
//!
//! ## Minimal example
//!
//! ```rust
//! use berth_imgui::{Context, PointerInput, RecordingSink, Ui};
//! use kurbo::{Point, Rect};
//!
//! let mut ctx = Context::new();
//! let mut sink = RecordingSink::new();
//!
//! ctx.begin_frame(PointerInput::hover_at(Point::new(10.0, 10.0)));
//! let mut ui = Ui::new(&mut ctx, &mut sink);
//! ui.region("window", Rect::new(0.0, 0.0, 200.0, 100.0), true, |ui| {
//!     ui.label("Hello");
//!     if ui.button("Press me").clicked() {
//!         // React to the click.
//!     }
//! });
//! ctx.end_frame();
//!
//! assert!(sink.texts().any(|t| t == "Hello"));
//! ```
//!
//! Coordinates are logical units of the window being built. Converting to
//! physical pixels is the render sink's concern.

mod context;
mod id;
mod interaction;
mod layout;
mod render;
mod storage;
mod style;
mod ui;

pub use context::Context;
pub use id::{Id, IdKey, IdStack};
pub use interaction::{Interaction, PointerInput, Release, Response};
pub use layout::{Extent, LayoutCursor};
pub use render::{Color, DrawCommand, RecordingSink, RenderSink};
pub use storage::{Storage, Stored};
pub use style::{Colors, Style};
pub use ui::Ui;
