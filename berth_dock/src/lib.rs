// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Berth Dock: dockable panels for an immediate-mode UI.
//!
//! Panels are arranged in a binary tree of [dock nodes](DockTree). Each node
//! is either a leaf holding an ordered list of panels shown as tabs, or a
//! split dividing its area between exactly two children. A node lives in one
//! of four [modes](DockMode):
//!
//! - the single **root**, filling the main window;
//! - **docked** inside another node;
//! - **floating** over the main window at its own rectangle;
//! - **standalone** in its own native window.
//!
//! Dragging a tab detaches its panel into a new floating node. Dragging a
//! floating node over a leaf offers drop targets; releasing over one docks
//! the node there, as a tab or as one side of a new split. With
//! [`DockOptions::multi_window`] on, a floating node dragged outside the main
//! window moves into its own native window, and moves back when its window is
//! dragged inside again.
//!
//! ## Layers
//!
//! - [`DockTree`]: the arena of nodes and panels and every structural
//!   operation on it. Pure data, usable without a frame loop.
//! - [`DockManager`]: drives a tree through frames of a
//!   [`berth_imgui::Context`], drawing chrome, resolving drags, and creating
//!   native windows through a [`WindowProvider`].
//! - [`HeadlessProvider`]: a window provider with no OS behind it, for tests
//!   and tools.
//!
//! ## Minimal example
//!
//! ```rust
//! use berth_dock::{DockTree, Edge, EmptyPanel};
//! use kurbo::Rect;
//!
//! let mut tree = DockTree::new();
//! let root = tree.root();
//! let files = tree.create_panel("Files", EmptyPanel);
//! let editor = tree.create_panel("Editor", EmptyPanel);
//! tree.add_panel(root, editor).unwrap();
//! tree.insert_panel(files, root, Edge::Left).unwrap();
//!
//! let (left, right) = tree.children_of(root).unwrap();
//! assert_eq!(tree.panels_of(left), &[files]);
//! assert_eq!(tree.panels_of(right), &[editor]);
//!
//! // Tearing the editor off collapses the split back into the root.
//! let floating = tree.detach_panel(editor, Rect::new(50.0, 50.0, 250.0, 200.0)).unwrap();
//! assert_eq!(tree.panels_of(root), &[files]);
//! assert_eq!(tree.floating(), &[floating]);
//! assert!(tree.check_integrity().is_ok());
//! ```
//!
//! Operations called in a way that can only be a caller bug (docking a node
//! onto itself, unsetting the root, using a stale handle) return a
//! [`DockError`] and are logged at error level. Runtime conditions, such as
//! a native window that could not be created, are logged as warnings and
//! leave the tree in a consistent state.

mod drag;
mod error;
pub mod geometry;
mod headless;
mod manager;
mod panel;
mod tree;
mod types;
mod window;

pub use drag::{DragState, grip_id, node_scope, panel_scope, split_id, tab_id, title_id};
pub use error::{DockError, IntegrityError, WindowError};
pub use headless::{HeadlessHandle, HeadlessProvider, HeadlessWindow};
pub use manager::{DockManager, Dockable, FrameInput, Host};
pub use panel::{EmptyPanel, Panel};
pub use tree::{DockTree, NodeView};
pub use types::{DockMode, DockOptions, Edge, NodeId, PanelId, ResizeEdges, SplitAxis};
pub use window::{NativeWindow, WindowEvent, WindowMetrics, WindowProvider};
