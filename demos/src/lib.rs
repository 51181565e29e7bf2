// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared pieces for the demos: logging setup, sample panels, and a way to
//! print a dock tree.
//!
//! Run a demo with, for example:
//! - `RUST_LOG=berth_dock=debug cargo run -p berth_demos --example headless_dock`

use berth_dock::{DockTree, NodeId};
use berth_imgui::Ui;
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call in the same process keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// A panel with a counter button and a toggle.
#[derive(Debug, Default)]
pub struct CounterPanel {
    /// Times the button was clicked.
    pub clicks: u32,
    /// State of the checkbox.
    pub enabled: bool,
}

impl berth_dock::Panel for CounterPanel {
    fn render(&mut self, ui: &mut Ui<'_>) {
        ui.label(&format!("Clicked {} times", self.clicks));
        if ui.button("Click").clicked() {
            self.clicks += 1;
            tracing::info!(clicks = self.clicks, "counter clicked");
        }
        ui.checkbox("Enabled", &mut self.enabled);
    }
}

/// A panel with enough lines to scroll.
#[derive(Debug)]
pub struct LogPanel {
    /// Lines shown, oldest first.
    pub lines: Vec<String>,
}

impl LogPanel {
    /// Log panel pre-filled with `n` numbered lines.
    pub fn with_lines(n: usize) -> Self {
        Self {
            lines: (0..n).map(|i| format!("line {i}")).collect(),
        }
    }
}

impl berth_dock::Panel for LogPanel {
    fn render(&mut self, ui: &mut Ui<'_>) {
        if ui.collapsing_header("History", true) {
            for line in &self.lines {
                ui.label(line);
            }
        }
    }
}

/// One-line rendering of the tree under `node`: `[A, B]` for a leaf with two
/// tabs, `H(left | right)` for a horizontal split.
pub fn describe(tree: &DockTree, node: NodeId) -> String {
    if let Some((left, right)) = tree.children_of(node) {
        let axis = match tree.split_of(node) {
            Some((berth_dock::SplitAxis::Vertical, _)) => 'V',
            _ => 'H',
        };
        return format!("{axis}({} | {})", describe(tree, left), describe(tree, right));
    }
    let titles: Vec<&str> = tree
        .panels_of(node)
        .iter()
        .filter_map(|&p| tree.panel_title(p))
        .collect();
    format!("[{}]", titles.join(", "))
}

/// Print every tree root with its mode.
pub fn print_trees(tree: &DockTree) {
    for root in tree.tree_roots() {
        let mode = tree.mode_of(root);
        println!("  {mode:?}: {}", describe(tree, root));
    }
}
