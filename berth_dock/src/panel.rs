// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Panel content capability.

use berth_imgui::Ui;

/// Content shown when a panel's tab is active.
///
/// `render` is called once per frame while the panel is visible, inside a
/// scrolling region sized to the node's content area. Ids created inside are
/// scoped to the panel, so widget state follows the panel when it is docked
/// elsewhere.
pub trait Panel {
    /// Build the panel's widgets for this frame.
    fn render(&mut self, ui: &mut Ui<'_>);
}

impl<F> Panel for F
where
    F: FnMut(&mut Ui<'_>),
{
    fn render(&mut self, ui: &mut Ui<'_>) {
        self(ui);
    }
}

/// Panel with no content, useful as a placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyPanel;

impl Panel for EmptyPanel {
    fn render(&mut self, _ui: &mut Ui<'_>) {}
}
