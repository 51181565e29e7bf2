// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag states and the element ids of dock chrome.
//!
//! Chrome ids are derived from [`Id::ROOT`] and the node or panel they
//! belong to, never from the enclosing scopes. A drag therefore survives the
//! node being reparented, floated, or moved into another native window: the
//! element keeps its id and the press stays with it.

use berth_imgui::Id;

use crate::{NodeId, PanelId, ResizeEdges, SplitAxis};

/// What the pointer is doing to a node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    /// Nothing.
    #[default]
    Idle,
    /// Dragging a resize grip or split handle that moves these edges.
    Resizing(ResizeEdges),
    /// Moving the node by its title.
    DraggingWindow,
    /// Dragging one of the node's tabs.
    DraggingTab(PanelId),
}

/// What a chrome element does when held.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Chrome {
    Title(NodeId),
    Tab(NodeId, PanelId),
    Split(NodeId, SplitAxis),
    Grip(NodeId, ResizeEdges),
}

impl Chrome {
    pub(crate) fn node(self) -> NodeId {
        match self {
            Self::Title(n) | Self::Tab(n, _) | Self::Split(n, _) | Self::Grip(n, _) => n,
        }
    }

    pub(crate) fn drag_state(self) -> DragState {
        match self {
            Self::Title(_) => DragState::DraggingWindow,
            Self::Tab(_, panel) => DragState::DraggingTab(panel),
            Self::Split(_, SplitAxis::Horizontal) => DragState::Resizing(ResizeEdges::RIGHT),
            Self::Split(_, SplitAxis::Vertical) => DragState::Resizing(ResizeEdges::BOTTOM),
            Self::Grip(_, edges) => DragState::Resizing(edges),
        }
    }
}

/// Scope of everything a node draws.
pub fn node_scope(node: NodeId) -> Id {
    Id::ROOT.with(("dock", node))
}

/// The title bar of `node`; also the tab of a single-panel node.
pub fn title_id(node: NodeId) -> Id {
    node_scope(node).with("title")
}

/// The tab of `panel`, wherever it is docked.
pub fn tab_id(panel: PanelId) -> Id {
    Id::ROOT.with(("tab", panel))
}

/// The resize grip moving `edges` of a floating node.
pub fn grip_id(node: NodeId, edges: ResizeEdges) -> Id {
    node_scope(node).with(("grip", edges.bits()))
}

/// The split handle of `node`.
pub fn split_id(node: NodeId) -> Id {
    node_scope(node).with("split")
}

/// Scope of a panel's content, so widget state follows the panel.
pub fn panel_scope(panel: PanelId) -> Id {
    Id::ROOT.with(panel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_ids_are_distinct() {
        let a = NodeId::new(1, 1);
        let b = NodeId::new(1, 2);
        let p = PanelId::new(1, 1);
        let ids = [
            title_id(a),
            title_id(b),
            split_id(a),
            grip_id(a, ResizeEdges::LEFT),
            grip_id(a, ResizeEdges::LEFT | ResizeEdges::TOP),
            tab_id(p),
            panel_scope(p),
            node_scope(a),
        ];
        for (i, x) in ids.iter().enumerate() {
            for y in &ids[i + 1..] {
                assert_ne!(x, y, "chrome ids must not collide");
            }
        }
    }

    #[test]
    fn split_handles_resize_the_trailing_edge() {
        let n = NodeId::new(0, 1);
        assert_eq!(
            Chrome::Split(n, SplitAxis::Vertical).drag_state(),
            DragState::Resizing(ResizeEdges::BOTTOM)
        );
        assert_eq!(Chrome::Title(n).drag_state(), DragState::DraggingWindow);
    }
}
