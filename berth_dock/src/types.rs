// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the dock tree: handles, modes, edges, and options.

use berth_imgui::IdKey;
use kurbo::{Size, Vec2};

/// Identifier for a dock node (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl IdKey for NodeId {
    fn key_hash(&self) -> u64 {
        (self.0, self.1).key_hash()
    }
}

/// Identifier for a panel (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PanelId(pub(crate) u32, pub(crate) u32);

impl PanelId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl IdKey for PanelId {
    fn key_hash(&self) -> u64 {
        ("panel", self.0, self.1).key_hash()
    }
}

/// How a node is placed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DockMode {
    /// The base node filling the main window. Exactly one per tree.
    Root,
    /// A child of another node; bounds come from the parent's split.
    Docked,
    /// A tree root positioned by an explicit rectangle inside the main window.
    Floating,
    /// A tree root backed by its own native window.
    Standalone,
}

/// Direction along which a split node divides its rectangle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SplitAxis {
    /// Children side by side: `left` is left of `right`.
    #[default]
    Horizontal,
    /// Children stacked: `left` is above `right`.
    Vertical,
}

/// Where a node is docked relative to its target.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Edge {
    /// Merge into the target's tab strip.
    Fill,
    /// Split the target; the docked node goes left.
    Left,
    /// Split the target; the docked node goes right.
    Right,
    /// Split the target; the docked node goes on top.
    Top,
    /// Split the target; the docked node goes below.
    Bottom,
}

impl Edge {
    /// All edges, in drop-overlay order.
    pub const ALL: [Self; 5] = [Self::Fill, Self::Left, Self::Right, Self::Top, Self::Bottom];

    /// Axis of the split this edge creates; `None` for [`Edge::Fill`].
    pub fn axis(self) -> Option<SplitAxis> {
        match self {
            Self::Fill => None,
            Self::Left | Self::Right => Some(SplitAxis::Horizontal),
            Self::Top | Self::Bottom => Some(SplitAxis::Vertical),
        }
    }

    /// Whether the docked node becomes the first (`left`) child.
    pub fn docked_first(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

bitflags::bitflags! {
    /// Edges being dragged by a resize grip. Corners combine two flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ResizeEdges: u8 {
        /// Left edge.
        const LEFT   = 0b0001;
        /// Right edge.
        const RIGHT  = 0b0010;
        /// Top edge.
        const TOP    = 0b0100;
        /// Bottom edge.
        const BOTTOM = 0b1000;
    }
}

impl ResizeEdges {
    /// The eight grips of a resizable frame: four sides, then four corners.
    pub const GRIPS: [Self; 8] = [
        Self::LEFT,
        Self::RIGHT,
        Self::TOP,
        Self::BOTTOM,
        Self::TOP.union(Self::LEFT),
        Self::TOP.union(Self::RIGHT),
        Self::BOTTOM.union(Self::LEFT),
        Self::BOTTOM.union(Self::RIGHT),
    ];
}

/// Docking behavior and chrome metrics.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DockOptions {
    /// Allow floating nodes to become native windows when dragged outside
    /// the main window.
    pub multi_window: bool,
    /// Thickness of the split handle between two children.
    pub gutter: f64,
    /// Height of tab strips and title bars.
    pub title_height: f64,
    /// Width of one tab.
    pub tab_width: f64,
    /// Thickness of the resize grips around floating and standalone nodes.
    pub grip_size: f64,
    /// Side length of one drop-overlay target.
    pub drop_zone_size: f64,
    /// Split fractions are clamped to `[min, 1 - min]`.
    pub min_split_fraction: f64,
    /// Smallest size a floating node can be resized to.
    pub min_floating_size: Size,
    /// Offset of a torn-off tab's new node from the pointer.
    pub detach_offset: Vec2,
    /// Size used when a torn-off tab has no better estimate.
    pub new_window_size: Size,
}

impl Default for DockOptions {
    fn default() -> Self {
        Self {
            multi_window: true,
            gutter: 4.0,
            title_height: 22.0,
            tab_width: 90.0,
            grip_size: 4.0,
            drop_zone_size: 32.0,
            min_split_fraction: 0.05,
            min_floating_size: Size::new(80.0, 60.0),
            detach_offset: Vec2::new(20.0, 10.0),
            new_window_size: Size::new(320.0, 240.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_map_to_axes() {
        assert_eq!(Edge::Fill.axis(), None);
        assert_eq!(Edge::Left.axis(), Some(SplitAxis::Horizontal));
        assert_eq!(Edge::Right.axis(), Some(SplitAxis::Horizontal));
        assert_eq!(Edge::Top.axis(), Some(SplitAxis::Vertical));
        assert_eq!(Edge::Bottom.axis(), Some(SplitAxis::Vertical));
        assert!(Edge::Left.docked_first() && Edge::Top.docked_first());
        assert!(!Edge::Right.docked_first() && !Edge::Bottom.docked_first());
    }

    #[test]
    fn grips_are_distinct() {
        for (i, a) in ResizeEdges::GRIPS.iter().enumerate() {
            for b in &ResizeEdges::GRIPS[i + 1..] {
                assert_ne!(a, b, "grip edges must not repeat");
            }
        }
    }
}
