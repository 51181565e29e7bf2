// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dock tree: structure, split/merge/detach, and bounds derivation.

use kurbo::Rect;
use smallvec::SmallVec;

use crate::geometry::split_rects;
use crate::window::NativeWindow;
use crate::{DockError, DockMode, Edge, IntegrityError, NodeId, Panel, PanelId, SplitAxis};

/// Log a rejected operation and hand the error back for returning.
fn contract(err: DockError) -> DockError {
    tracing::error!(%err, "dock operation rejected");
    err
}

#[derive(Debug)]
enum Placement {
    Root,
    Docked,
    Floating { rect: Rect },
    /// The window is only ever `None` while the frame loop is rendering into it.
    Standalone { window: Option<Box<dyn NativeWindow>> },
}

impl Placement {
    fn mode(&self) -> DockMode {
        match self {
            Self::Root => DockMode::Root,
            Self::Docked => DockMode::Docked,
            Self::Floating { .. } => DockMode::Floating,
            Self::Standalone { .. } => DockMode::Standalone,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Debug)]
struct Node {
    generation: u32,
    placement: Placement,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    axis: SplitAxis,
    fraction: f64,
    panels: Vec<PanelId>,
    active: usize,
}

impl Node {
    fn new(generation: u32, placement: Placement) -> Self {
        Self {
            generation,
            placement,
            parent: None,
            left: None,
            right: None,
            axis: SplitAxis::Horizontal,
            fraction: 0.5,
            panels: Vec::new(),
            active: 0,
        }
    }

    fn slot_mut(&mut self, side: Side) -> &mut Option<NodeId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn is_split(&self) -> bool {
        self.left.is_some() || self.right.is_some()
    }

    fn is_empty_leaf(&self) -> bool {
        !self.is_split() && self.panels.is_empty()
    }

    fn clamp_active(&mut self) {
        self.active = self.active.min(self.panels.len().saturating_sub(1));
    }
}

/// Read-only snapshot of one live node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeView<'a> {
    /// The node.
    pub id: NodeId,
    /// Current mode.
    pub mode: DockMode,
    /// Parent, for docked nodes.
    pub parent: Option<NodeId>,
    /// `(left, right)` for split nodes.
    pub children: Option<(NodeId, NodeId)>,
    /// Axis and fraction for split nodes.
    pub split: Option<(SplitAxis, f64)>,
    /// Tab strip, in order; empty for split nodes.
    pub panels: &'a [PanelId],
    /// Panel whose content is shown.
    pub active_panel: Option<PanelId>,
    /// Stored rectangle of floating nodes.
    pub floating_rect: Option<Rect>,
}

struct PanelSlot {
    generation: u32,
    title: String,
    node: Option<NodeId>,
    content: Box<dyn Panel>,
}

impl core::fmt::Debug for PanelSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PanelSlot")
            .field("generation", &self.generation)
            .field("title", &self.title)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

/// The docking tree: every dock node and panel of one UI.
///
/// Nodes and panels live in generational arenas and are referred to by
/// [`NodeId`] and [`PanelId`]. Ownership is strictly tree-shaped: a node has at
/// most one parent, and child links are only ever written through one
/// internal operation that also maintains the parent back-reference.
///
/// Besides the [`DockMode::Root`] tree, floating and standalone nodes are
/// roots of their own trees and are kept in registries ([`DockTree::floating`]
/// in z-order, and [`DockTree::standalone`]).
///
/// ## Example
///
/// ```rust
/// use berth_dock::{DockTree, Edge, EmptyPanel};
///
/// let mut tree = DockTree::new();
/// let root = tree.root();
/// let p1 = tree.create_panel("P1", EmptyPanel);
/// let p2 = tree.create_panel("P2", EmptyPanel);
/// tree.add_panel(root, p1).unwrap();
/// tree.insert_panel(p2, root, Edge::Right).unwrap();
///
/// let (left, right) = tree.children_of(root).unwrap();
/// assert_eq!(tree.panels_of(left), &[p1]);
/// assert_eq!(tree.panels_of(right), &[p2]);
///
/// // Closing P1 promotes P2 back into the root.
/// tree.close_panel(p1).unwrap();
/// assert_eq!(tree.children_of(root), None);
/// assert_eq!(tree.panels_of(root), &[p2]);
/// ```
pub struct DockTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    panels: Vec<Option<PanelSlot>>,
    panel_generations: Vec<u32>,
    panel_free_list: Vec<usize>,
    root: NodeId,
    floating: Vec<NodeId>,
    standalone: Vec<NodeId>,
    min_fraction: f64,
}

impl core::fmt::Debug for DockTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let panels = self.panels.iter().filter(|p| p.is_some()).count();
        f.debug_struct("DockTree")
            .field("root", &self.root)
            .field("nodes_alive", &alive)
            .field("panels_alive", &panels)
            .field("floating", &self.floating)
            .field("standalone", &self.standalone)
            .finish_non_exhaustive()
    }
}

impl Default for DockTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DockTree {
    /// Create a tree holding an empty root node.
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            panels: Vec::new(),
            panel_generations: Vec::new(),
            panel_free_list: Vec::new(),
            root: NodeId::new(0, 0),
            floating: Vec::new(),
            standalone: Vec::new(),
            min_fraction: 0.05,
        };
        tree.root = tree.alloc_node(Placement::Root);
        tree
    }

    /// Clamp margin applied by [`DockTree::set_split_fraction`].
    pub fn set_min_split_fraction(&mut self, min: f64) {
        self.min_fraction = if min.is_finite() {
            min.clamp(0.0, 0.5)
        } else {
            0.0
        };
    }

    // --- arena ---

    fn alloc_node(&mut self, placement: Placement) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, placement));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, placement)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    fn free_node(&mut self, id: NodeId) {
        if self.is_alive(id) {
            self.nodes[id.idx()] = None;
            self.free_list.push(id.idx());
        }
    }

    fn alloc_panel(&mut self, title: String, content: Box<dyn Panel>) -> PanelId {
        let slot = |generation| PanelSlot {
            generation,
            title,
            node: None,
            content,
        };
        let (idx, generation) = if let Some(idx) = self.panel_free_list.pop() {
            let generation = self.panel_generations[idx].saturating_add(1);
            self.panel_generations[idx] = generation;
            self.panels[idx] = Some(slot(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.panels.push(Some(slot(generation)));
            self.panel_generations.push(generation);
            (self.panels.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "PanelId uses 32-bit indices by design."
        )]
        PanelId::new(idx as u32, generation)
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn get(&self, id: NodeId) -> Result<&Node, DockError> {
        self.node_opt(id)
            .ok_or_else(|| contract(DockError::StaleNode(id)))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, DockError> {
        self.node_opt_mut(id)
            .ok_or_else(|| contract(DockError::StaleNode(id)))
    }

    fn panel_opt(&self, id: PanelId) -> Option<&PanelSlot> {
        let p = self.panels.get(id.idx())?.as_ref()?;
        (p.generation == id.1).then_some(p)
    }

    fn panel_opt_mut(&mut self, id: PanelId) -> Option<&mut PanelSlot> {
        let p = self.panels.get_mut(id.idx())?.as_mut()?;
        if p.generation != id.1 {
            return None;
        }
        Some(p)
    }

    fn panel_get(&self, id: PanelId) -> Result<&PanelSlot, DockError> {
        self.panel_opt(id)
            .ok_or_else(|| contract(DockError::StalePanel(id)))
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().enumerate().filter_map(|(i, n)| {
            n.as_ref().map(|n| {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "NodeId uses 32-bit indices by design."
                )]
                NodeId::new(i as u32, n.generation)
            })
        })
    }

    // --- queries ---

    /// The root node. Always alive.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns `true` if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Returns `true` if `id` refers to a live panel.
    pub fn is_panel_alive(&self, id: PanelId) -> bool {
        self.panel_opt(id).is_some()
    }

    /// Snapshot of a live node.
    pub fn node(&self, id: NodeId) -> Option<NodeView<'_>> {
        let n = self.node_opt(id)?;
        Some(NodeView {
            id,
            mode: n.placement.mode(),
            parent: n.parent,
            children: n.left.zip(n.right),
            split: n.is_split().then_some((n.axis, n.fraction)),
            panels: &n.panels,
            active_panel: n.panels.get(n.active).copied(),
            floating_rect: match n.placement {
                Placement::Floating { rect } => Some(rect),
                _ => None,
            },
        })
    }

    /// Mode of a live node.
    pub fn mode_of(&self, id: NodeId) -> Option<DockMode> {
        self.node_opt(id).map(|n| n.placement.mode())
    }

    /// Parent of a live docked node.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// `(left, right)` children of a live split node.
    pub fn children_of(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        let n = self.node_opt(id)?;
        Some((n.left?, n.right?))
    }

    /// Split axis and fraction of a live split node.
    pub fn split_of(&self, id: NodeId) -> Option<(SplitAxis, f64)> {
        let n = self.node_opt(id)?;
        n.is_split().then_some((n.axis, n.fraction))
    }

    /// Panels (tab order) of a live node; empty for split or stale nodes.
    pub fn panels_of(&self, id: NodeId) -> &[PanelId] {
        self.node_opt(id).map(|n| n.panels.as_slice()).unwrap_or(&[])
    }

    /// Index of the active tab of a live leaf with panels.
    pub fn active_index(&self, id: NodeId) -> Option<usize> {
        let n = self.node_opt(id)?;
        (!n.panels.is_empty()).then_some(n.active)
    }

    /// Panel whose content a live leaf currently shows.
    pub fn active_panel(&self, id: NodeId) -> Option<PanelId> {
        let n = self.node_opt(id)?;
        n.panels.get(n.active).copied()
    }

    /// Stored rectangle of a floating node, in main-window logical units.
    pub fn floating_rect(&self, id: NodeId) -> Option<Rect> {
        match self.node_opt(id)?.placement {
            Placement::Floating { rect } => Some(rect),
            _ => None,
        }
    }

    /// Native window backing a standalone node.
    pub fn window(&self, id: NodeId) -> Option<&dyn NativeWindow> {
        match &self.node_opt(id)?.placement {
            Placement::Standalone { window } => window.as_deref(),
            _ => None,
        }
    }

    /// Mutable native window backing a standalone node.
    pub fn window_mut(&mut self, id: NodeId) -> Option<&mut (dyn NativeWindow + 'static)> {
        match &mut self.node_opt_mut(id)?.placement {
            Placement::Standalone { window } => window.as_deref_mut(),
            _ => None,
        }
    }

    /// Floating nodes, back to front.
    pub fn floating(&self) -> &[NodeId] {
        &self.floating
    }

    /// Standalone nodes, in creation order.
    pub fn standalone(&self) -> &[NodeId] {
        &self.standalone
    }

    /// Every tree root: the root node, floating nodes back to front, then
    /// standalone nodes.
    pub fn tree_roots(&self) -> Vec<NodeId> {
        let mut roots = Vec::with_capacity(1 + self.floating.len() + self.standalone.len());
        roots.push(self.root);
        roots.extend_from_slice(&self.floating);
        roots.extend_from_slice(&self.standalone);
        roots
    }

    /// The tree root above `id` (itself if it is one).
    pub fn tree_root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = id;
        for _ in 0..=self.nodes.len() {
            match self.node_opt(cur)?.parent {
                Some(p) => cur = p,
                None => return Some(cur),
            }
        }
        None
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = self.parent_of(id);
        let mut steps = 0;
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            cur = self.parent_of(c);
        }
        false
    }

    /// Leaves under `id` (inclusive), left to right.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect(id, &mut out, true);
        out
    }

    /// Every node under `id` (inclusive), in pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect(id, &mut out, false);
        out
    }

    fn collect(&self, id: NodeId, out: &mut Vec<NodeId>, leaves_only: bool) {
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.push(id);
        while let Some(cur) = stack.pop() {
            let Some(n) = self.node_opt(cur) else {
                continue;
            };
            if !leaves_only || !n.is_split() {
                out.push(cur);
            }
            if let Some(r) = n.right {
                stack.push(r);
            }
            if let Some(l) = n.left {
                stack.push(l);
            }
        }
    }

    /// Title of a live panel.
    pub fn panel_title(&self, id: PanelId) -> Option<&str> {
        self.panel_opt(id).map(|p| p.title.as_str())
    }

    /// Rename a live panel.
    pub fn set_panel_title(&mut self, id: PanelId, title: impl Into<String>) {
        if let Some(p) = self.panel_opt_mut(id) {
            p.title = title.into();
        }
    }

    /// Node hosting a live panel, if it is docked anywhere.
    pub fn panel_node(&self, id: PanelId) -> Option<NodeId> {
        self.panel_opt(id).and_then(|p| p.node)
    }

    /// Content of a live panel.
    pub fn panel_content_mut(&mut self, id: PanelId) -> Option<&mut (dyn Panel + 'static)> {
        self.panel_opt_mut(id).map(|p| p.content.as_mut())
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Number of live panels.
    pub fn panel_count(&self) -> usize {
        self.panels.iter().filter(|p| p.is_some()).count()
    }

    // --- structure ---

    /// Assign one child slot of `parent`, keeping back-references consistent.
    ///
    /// The previous occupant loses its parent link, and `child` is removed
    /// from wherever it was attached before.
    fn set_child(&mut self, parent: NodeId, side: Side, child: Option<NodeId>) {
        let Some(p) = self.node_opt_mut(parent) else {
            return;
        };
        let old = core::mem::replace(p.slot_mut(side), child);
        if let Some(old) = old
            && Some(old) != child
            && let Some(o) = self.node_opt_mut(old)
            && o.parent == Some(parent)
        {
            o.parent = None;
        }
        let Some(child) = child else {
            return;
        };
        if let Some(prev) = self.parent_of(child)
            && let Some(pn) = self.node_opt_mut(prev)
        {
            for s in [Side::Left, Side::Right] {
                if (prev, s) != (parent, side) && *pn.slot_mut(s) == Some(child) {
                    *pn.slot_mut(s) = None;
                }
            }
        }
        if let Some(c) = self.node_opt_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Move everything `src` holds (children, split state, panels) into
    /// `dst`, which must be an empty leaf. `src` is left an empty leaf.
    fn move_content(&mut self, dst: NodeId, src: NodeId) {
        let Some(s) = self.node_opt_mut(src) else {
            return;
        };
        let left = s.left.take();
        let right = s.right.take();
        let axis = s.axis;
        let fraction = s.fraction;
        let panels = core::mem::take(&mut s.panels);
        let active = core::mem::take(&mut s.active);
        self.set_child(dst, Side::Left, left);
        self.set_child(dst, Side::Right, right);
        for &p in &panels {
            if let Some(slot) = self.panel_opt_mut(p) {
                slot.node = Some(dst);
            }
        }
        if let Some(d) = self.node_opt_mut(dst) {
            d.axis = axis;
            d.fraction = fraction;
            d.panels = panels;
            d.active = active;
            d.clamp_active();
        }
    }

    /// Move the content of `src` into `dst`.
    ///
    /// When `dst` is an empty leaf it takes over `src` wholesale: children,
    /// split state, panels, and active tab. When `dst` is a leaf with panels,
    /// the panels of `src` (which must then be a leaf) are appended. `src`
    /// is left empty; it is not discarded.
    pub fn take_content(&mut self, dst: NodeId, src: NodeId) -> Result<(), DockError> {
        let d = self.get(dst)?;
        let s = self.get(src)?;
        if dst == src {
            return Err(contract(DockError::DockOntoSelf(dst)));
        }
        if d.is_split() {
            return Err(contract(DockError::FillIntoSplit(dst)));
        }
        if d.panels.is_empty() {
            if self.is_ancestor(src, dst) {
                return Err(contract(DockError::DockOntoDescendant {
                    node: src,
                    target: dst,
                }));
            }
            self.move_content(dst, src);
        } else {
            if s.is_split() {
                return Err(contract(DockError::TargetNotEmpty(dst)));
            }
            let panels = core::mem::take(&mut self.get_mut(src)?.panels);
            self.append_panels(dst, panels);
        }
        Ok(())
    }

    fn append_panels(&mut self, dst: NodeId, panels: Vec<PanelId>) {
        for &p in &panels {
            if let Some(slot) = self.panel_opt_mut(p) {
                slot.node = Some(dst);
            }
        }
        if let Some(d) = self.node_opt_mut(dst) {
            let first_new = d.panels.len();
            let any = !panels.is_empty();
            d.panels.extend(panels);
            if any {
                d.active = first_new;
            }
        }
    }

    /// Dock `node` onto `target` at `edge`.
    ///
    /// `node` is first detached from wherever it lives. With [`Edge::Fill`],
    /// `target` must be a leaf: its tab strip gains the panels of `node`'s
    /// subtree (the first of them becomes active) and `node` is discarded,
    /// or, if `target` has no panels, `target` takes over `node`'s content.
    /// Any other edge turns `target` into a split whose children are `node`
    /// and a new node holding `target`'s previous content, divided evenly.
    pub fn set_as_dock(&mut self, node: NodeId, target: NodeId, edge: Edge) -> Result<(), DockError> {
        let n = self.get(node)?;
        let t = self.get(target)?;
        if node == target {
            return Err(contract(DockError::DockOntoSelf(node)));
        }
        if matches!(n.placement, Placement::Root) {
            return Err(contract(DockError::UnsetRoot));
        }
        if self.is_ancestor(node, target) {
            return Err(contract(DockError::DockOntoDescendant { node, target }));
        }
        if edge == Edge::Fill && t.is_split() {
            return Err(contract(DockError::FillIntoSplit(target)));
        }

        let target = self.unset_tracking(node, target)?;
        self.get(target)?;
        match edge.axis() {
            None => self.fill(node, target),
            Some(axis) => self.split(node, target, axis, edge.docked_first()),
        }
        tracing::debug!(?node, ?target, ?edge, "node docked");
        Ok(())
    }

    fn fill(&mut self, node: NodeId, target: NodeId) {
        let target_empty = self.node_opt(target).is_some_and(Node::is_empty_leaf);
        if target_empty {
            self.move_content(target, node);
            self.free_node(node);
            return;
        }
        let mut panels = Vec::new();
        for leaf in self.leaves(node) {
            if let Some(l) = self.node_opt_mut(leaf) {
                panels.append(&mut l.panels);
            }
        }
        for id in self.subtree(node) {
            self.free_node(id);
        }
        self.append_panels(target, panels);
    }

    fn split(&mut self, node: NodeId, target: NodeId, axis: SplitAxis, docked_first: bool) {
        let other = self.alloc_node(Placement::Docked);
        self.move_content(other, target);
        if let Some(n) = self.node_opt_mut(node) {
            n.placement = Placement::Docked;
        }
        let (first, second) = if docked_first {
            (node, other)
        } else {
            (other, node)
        };
        self.set_child(target, Side::Left, Some(first));
        self.set_child(target, Side::Right, Some(second));
        if let Some(t) = self.node_opt_mut(target) {
            t.axis = axis;
            t.fraction = 0.5;
        }
    }

    /// Take `node` out of its current mode, leaving it detached.
    ///
    /// - Floating and standalone nodes leave their registry; a standalone
    ///   node's window is closed.
    /// - A docked node leaves its parent, and its sibling is promoted into
    ///   the parent. If that leaves a non-root parent empty, the parent is
    ///   unset and discarded in turn.
    /// - The root cannot be unset.
    ///
    /// A detached node belongs to no tree. Callers re-home it right away
    /// (dock, float) or discard it.
    pub fn unset_last_mode(&mut self, node: NodeId) -> Result<(), DockError> {
        self.unset_tracking(node, node).map(|_| ())
    }

    /// [`DockTree::unset_last_mode`], reporting where `follow` ended up if a
    /// promotion moved its content into another node.
    fn unset_tracking(&mut self, node: NodeId, follow: NodeId) -> Result<NodeId, DockError> {
        let n = self.get_mut(node)?;
        match &mut n.placement {
            Placement::Root => Err(contract(DockError::UnsetRoot)),
            Placement::Floating { .. } => {
                n.placement = Placement::Docked;
                self.floating.retain(|&f| f != node);
                tracing::debug!(?node, "floating node unset");
                Ok(follow)
            }
            Placement::Standalone { window } => {
                if let Some(mut w) = window.take() {
                    w.close();
                }
                n.placement = Placement::Docked;
                self.standalone.retain(|&s| s != node);
                tracing::debug!(?node, "standalone node unset; window closed");
                Ok(follow)
            }
            Placement::Docked => {
                let Some(parent) = n.parent else {
                    return Ok(follow);
                };
                let other = self.node_opt(parent).and_then(|p| {
                    if p.left == Some(node) {
                        p.right
                    } else {
                        p.left
                    }
                });
                self.set_child(parent, Side::Left, None);
                self.set_child(parent, Side::Right, None);

                let mut follow = follow;
                if let Some(other) = other {
                    self.move_content(parent, other);
                    self.free_node(other);
                    if follow == other {
                        follow = parent;
                    }
                    tracing::debug!(?node, ?parent, promoted = ?other, "sibling promoted into parent");
                }

                let collapse = self
                    .node_opt(parent)
                    .is_some_and(|p| p.is_empty_leaf() && !matches!(p.placement, Placement::Root));
                if collapse {
                    follow = self.unset_tracking(parent, follow)?;
                    self.free_node(parent);
                    tracing::debug!(?parent, "empty parent discarded");
                }
                Ok(follow)
            }
        }
    }

    /// Discard `node` if it is an empty non-root leaf. Returns whether it was.
    fn discard_if_empty(&mut self, node: NodeId) -> Result<bool, DockError> {
        let Some(n) = self.node_opt(node) else {
            return Ok(false);
        };
        if !n.is_empty_leaf() || matches!(n.placement, Placement::Root) {
            return Ok(false);
        }
        self.unset_tracking(node, node)?;
        self.free_node(node);
        tracing::debug!(?node, "empty node discarded");
        Ok(true)
    }

    /// Discard every empty non-root leaf, repeating until none is left.
    ///
    /// Tree operations already collapse emptiness as it appears, so on a
    /// consistent tree this finds nothing. Returns the number discarded.
    pub fn prune_empty(&mut self) -> Result<usize, DockError> {
        let mut count = 0;
        loop {
            let empty: Vec<NodeId> = self
                .node_ids()
                .filter(|&id| {
                    self.node_opt(id).is_some_and(|n| {
                        n.is_empty_leaf() && !matches!(n.placement, Placement::Root)
                    })
                })
                .collect();
            if empty.is_empty() {
                return Ok(count);
            }
            for id in empty {
                if self.discard_if_empty(id)? {
                    count += 1;
                }
            }
        }
    }

    // --- panels ---

    /// Create a detached panel.
    pub fn create_panel(&mut self, title: impl Into<String>, content: impl Panel + 'static) -> PanelId {
        let id = self.alloc_panel(title.into(), Box::new(content));
        tracing::debug!(panel = ?id, "panel created");
        id
    }

    /// Append a detached `panel` to the tab strip of the leaf `node` and make
    /// it the active tab.
    pub fn add_panel(&mut self, node: NodeId, panel: PanelId) -> Result<(), DockError> {
        if self.panel_get(panel)?.node.is_some() {
            return Err(contract(DockError::PanelAlreadyDocked(panel)));
        }
        if self.get(node)?.is_split() {
            return Err(contract(DockError::FillIntoSplit(node)));
        }
        self.append_panels(node, vec![panel]);
        Ok(())
    }

    /// Dock a detached `panel` at `edge` of `target`.
    ///
    /// [`Edge::Fill`] appends to `target`'s tab strip. Other edges wrap the
    /// panel in a new node and dock that node. Returns the node now hosting
    /// the panel.
    pub fn insert_panel(&mut self, panel: PanelId, target: NodeId, edge: Edge) -> Result<NodeId, DockError> {
        if edge == Edge::Fill {
            self.add_panel(target, panel)?;
            return Ok(target);
        }
        if self.panel_get(panel)?.node.is_some() {
            return Err(contract(DockError::PanelAlreadyDocked(panel)));
        }
        self.get(target)?;
        let node = self.alloc_node(Placement::Docked);
        self.append_panels(node, vec![panel]);
        if let Err(err) = self.set_as_dock(node, target, edge) {
            self.detach_panel_from_node(panel);
            self.free_node(node);
            return Err(err);
        }
        Ok(node)
    }

    /// Take `panel` off its node's tab strip, returning the node.
    fn detach_panel_from_node(&mut self, panel: PanelId) -> Option<NodeId> {
        let node = self.panel_opt_mut(panel)?.node.take()?;
        if let Some(n) = self.node_opt_mut(node)
            && let Some(i) = n.panels.iter().position(|&p| p == panel)
        {
            n.panels.remove(i);
            if i < n.active {
                n.active -= 1;
            }
            n.clamp_active();
        }
        Some(node)
    }

    /// Destroy `panel`, collapsing its node if it was the last tab.
    pub fn close_panel(&mut self, panel: PanelId) -> Result<(), DockError> {
        self.panel_get(panel)?;
        let node = self.detach_panel_from_node(panel);
        self.panels[panel.idx()] = None;
        self.panel_free_list.push(panel.idx());
        tracing::debug!(?panel, ?node, "panel closed");
        if let Some(node) = node {
            self.discard_if_empty(node)?;
        }
        Ok(())
    }

    /// Tear `panel` off into a new floating node at `rect`.
    ///
    /// The panel's old node collapses if this was its last tab. Returns the
    /// new node.
    pub fn detach_panel(&mut self, panel: PanelId, rect: Rect) -> Result<NodeId, DockError> {
        self.panel_get(panel)?;
        let old = self.detach_panel_from_node(panel);
        let node = self.alloc_node(Placement::Floating { rect });
        self.append_panels(node, vec![panel]);
        self.floating.push(node);
        tracing::debug!(?panel, from = ?old, to = ?node, "panel detached");
        if let Some(old) = old {
            self.discard_if_empty(old)?;
        }
        Ok(node)
    }

    /// Show `panel` in its node.
    pub fn select_panel(&mut self, panel: PanelId) {
        if let Some(node) = self.panel_node(panel)
            && let Some(n) = self.node_opt_mut(node)
            && let Some(i) = n.panels.iter().position(|&p| p == panel)
        {
            n.active = i;
        }
    }

    /// Show the tab at `index` (clamped) of `node`.
    pub fn set_active_panel(&mut self, node: NodeId, index: usize) -> Result<(), DockError> {
        let n = self.get_mut(node)?;
        n.active = index;
        n.clamp_active();
        Ok(())
    }

    /// Close every panel under `node` and discard it.
    pub fn close_node(&mut self, node: NodeId) -> Result<(), DockError> {
        if matches!(self.get(node)?.placement, Placement::Root) {
            return Err(contract(DockError::UnsetRoot));
        }
        let nodes = self.subtree(node);
        self.unset_tracking(node, node)?;
        for id in nodes {
            let panels = self
                .node_opt_mut(id)
                .map(|n| core::mem::take(&mut n.panels))
                .unwrap_or_default();
            for p in panels {
                self.panels[p.idx()] = None;
                self.panel_free_list.push(p.idx());
            }
            self.free_node(id);
        }
        tracing::debug!(?node, "node closed");
        Ok(())
    }

    // --- modes ---

    /// Make `node` a floating tree root at `rect`, or move it if it already
    /// is one. A docked node is detached first; a standalone node's window
    /// is closed.
    pub fn float(&mut self, node: NodeId, rect: Rect) -> Result<(), DockError> {
        match &mut self.get_mut(node)?.placement {
            Placement::Root => return Err(contract(DockError::UnsetRoot)),
            Placement::Floating { rect: r } => {
                *r = rect;
                return Ok(());
            }
            _ => {}
        }
        self.unset_tracking(node, node)?;
        self.get_mut(node)?.placement = Placement::Floating { rect };
        self.floating.push(node);
        tracing::debug!(?node, ?rect, "node floated");
        Ok(())
    }

    /// Move or resize a floating node.
    pub fn set_floating_rect(&mut self, node: NodeId, rect: Rect) -> Result<(), DockError> {
        match &mut self.get_mut(node)?.placement {
            Placement::Floating { rect: r } => {
                *r = rect;
                Ok(())
            }
            _ => Err(contract(DockError::NotARoot(node))),
        }
    }

    /// Move `node` to the top of the floating z-order. Returns whether it is
    /// floating.
    pub fn raise_floating(&mut self, node: NodeId) -> bool {
        let Some(i) = self.floating.iter().position(|&f| f == node) else {
            return false;
        };
        if i + 1 != self.floating.len() {
            let n = self.floating.remove(i);
            self.floating.push(n);
            tracing::trace!(?node, "floating node raised");
        }
        true
    }

    /// Give a floating node its own native window. The node keeps its id
    /// and content.
    pub fn set_standalone(&mut self, node: NodeId, window: Box<dyn NativeWindow>) -> Result<(), DockError> {
        let mut window = window;
        let n = match self.get_mut(node) {
            Ok(n) => n,
            Err(err) => {
                window.close();
                return Err(err);
            }
        };
        if !matches!(n.placement, Placement::Floating { .. }) {
            window.close();
            return Err(contract(DockError::NotARoot(node)));
        }
        n.placement = Placement::Standalone {
            window: Some(window),
        };
        self.floating.retain(|&f| f != node);
        self.standalone.push(node);
        tracing::debug!(?node, "node became standalone");
        Ok(())
    }

    /// Turn a standalone node back into a floating node at `rect`, closing its
    /// window. The node keeps its id and content.
    pub fn set_floating_from_standalone(&mut self, node: NodeId, rect: Rect) -> Result<(), DockError> {
        if !matches!(self.get(node)?.placement, Placement::Standalone { .. }) {
            return Err(contract(DockError::NotStandalone(node)));
        }
        self.unset_tracking(node, node)?;
        self.get_mut(node)?.placement = Placement::Floating { rect };
        self.floating.push(node);
        tracing::debug!(?node, ?rect, "standalone node became floating");
        Ok(())
    }

    /// Lend out a standalone node's window while rendering into it.
    pub(crate) fn take_window(&mut self, node: NodeId) -> Option<Box<dyn NativeWindow>> {
        match &mut self.node_opt_mut(node)?.placement {
            Placement::Standalone { window } => window.take(),
            _ => None,
        }
    }

    /// Return a window lent out by [`DockTree::take_window`].
    ///
    /// If the node stopped being standalone in the meantime the window is
    /// closed instead.
    pub(crate) fn restore_window(&mut self, node: NodeId, mut window: Box<dyn NativeWindow>) {
        if let Some(n) = self.node_opt_mut(node)
            && let Placement::Standalone { window: slot } = &mut n.placement
            && slot.is_none()
        {
            *slot = Some(window);
            return;
        }
        window.close();
    }

    // --- geometry ---

    /// Set the split fraction of `node`, clamped to keep both children
    /// visible.
    pub fn set_split_fraction(&mut self, node: NodeId, fraction: f64) -> Result<(), DockError> {
        let min = self.min_fraction;
        let n = self.get_mut(node)?;
        n.fraction = if fraction.is_finite() {
            fraction.clamp(min, 1.0 - min)
        } else {
            0.5
        };
        Ok(())
    }

    /// Rectangles of every node under `root` when `root` occupies `rect`,
    /// in pre-order.
    ///
    /// Docked bounds are never stored: each child gets its share of the
    /// parent's rectangle, minus the `gutter` reserved for the split handle.
    pub fn layout(&self, root: NodeId, rect: Rect, gutter: f64) -> Vec<(NodeId, Rect)> {
        let mut out = Vec::new();
        let mut stack: SmallVec<[(NodeId, Rect); 16]> = SmallVec::new();
        stack.push((root, rect));
        while let Some((id, r)) = stack.pop() {
            let Some(n) = self.node_opt(id) else {
                continue;
            };
            out.push((id, r));
            if let (Some(left), Some(right)) = (n.left, n.right) {
                let (a, b) = split_rects(r, n.axis, n.fraction, gutter);
                stack.push((right, b));
                stack.push((left, a));
            }
        }
        out
    }

    // --- validation ---

    /// Verify the structural invariants of every live node and panel.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let mut owners = vec![0_u32; self.nodes.len()];
        let mut roots = 0;
        for id in self.node_ids() {
            let Some(n) = self.node_opt(id) else {
                continue;
            };
            if n.left.is_some() != n.right.is_some() {
                return Err(IntegrityError::HalfSplit(id));
            }
            if n.is_split() && !n.panels.is_empty() {
                return Err(IntegrityError::ContentAndChildren(id));
            }
            for child in [n.left, n.right].into_iter().flatten() {
                if self.parent_of(child) != Some(id) {
                    return Err(IntegrityError::BrokenParentLink { parent: id, child });
                }
                owners[child.idx()] += 1;
                if owners[child.idx()] > 1 || n.left == n.right {
                    return Err(IntegrityError::SharedChild(child));
                }
            }
            if !n.panels.is_empty() && n.active >= n.panels.len() {
                return Err(IntegrityError::ActiveOutOfRange(id));
            }
            for &p in &n.panels {
                let listed = n.panels.iter().filter(|&&q| q == p).count();
                if listed != 1 || self.panel_node(p) != Some(id) {
                    return Err(IntegrityError::OrphanedPanel(p));
                }
            }
            let registered = |list: &[NodeId]| list.iter().filter(|&&x| x == id).count() == 1;
            let consistent = match n.placement {
                Placement::Root => {
                    roots += 1;
                    id == self.root && n.parent.is_none()
                }
                Placement::Docked => n.parent.is_some_and(|p| {
                    self.children_of(p)
                        .is_some_and(|(l, r)| l == id || r == id)
                }),
                Placement::Floating { .. } => n.parent.is_none() && registered(&self.floating),
                Placement::Standalone { .. } => n.parent.is_none() && registered(&self.standalone),
            };
            if !consistent {
                return Err(IntegrityError::ModeMismatch(id));
            }
            if n.is_empty_leaf() && !matches!(n.placement, Placement::Root) {
                return Err(IntegrityError::EmptyLeaf(id));
            }
            match self.tree_root_of(id).and_then(|r| self.mode_of(r)) {
                Some(DockMode::Docked) | None => return Err(IntegrityError::Unreachable(id)),
                _ => {}
            }
        }
        if roots != 1 {
            return Err(IntegrityError::ModeMismatch(self.root));
        }
        for &id in self.floating.iter().chain(&self.standalone) {
            if !matches!(
                self.mode_of(id),
                Some(DockMode::Floating | DockMode::Standalone)
            ) {
                return Err(IntegrityError::ModeMismatch(id));
            }
        }
        for (i, slot) in self.panels.iter().enumerate() {
            let Some(p) = slot else {
                continue;
            };
            #[allow(
                clippy::cast_possible_truncation,
                reason = "PanelId uses 32-bit indices by design."
            )]
            let id = PanelId::new(i as u32, p.generation);
            if let Some(node) = p.node {
                let listed = self.panels_of(node).iter().filter(|&&q| q == id).count();
                if listed != 1 {
                    return Err(IntegrityError::OrphanedPanel(id));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmptyPanel;
    use kurbo::Point;

    /// Compact description of a subtree: `[A,B]` for leaves, `H(..|..)` and
    /// `V(..|..)` for splits.
    fn shape(tree: &DockTree, id: NodeId) -> String {
        match tree.children_of(id) {
            Some((l, r)) => {
                let axis = match tree.split_of(id) {
                    Some((SplitAxis::Horizontal, _)) => "H",
                    _ => "V",
                };
                format!("{axis}({}|{})", shape(tree, l), shape(tree, r))
            }
            None => {
                let titles: Vec<&str> = tree
                    .panels_of(id)
                    .iter()
                    .filter_map(|&p| tree.panel_title(p))
                    .collect();
                format!("[{}]", titles.join(","))
            }
        }
    }

    fn panel(tree: &mut DockTree, title: &str) -> PanelId {
        tree.create_panel(title, EmptyPanel)
    }

    fn check(tree: &DockTree) {
        if let Err(err) = tree.check_integrity() {
            panic!("integrity violated: {err}");
        }
    }

    #[test]
    fn simple_split() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let p1 = panel(&mut tree, "P1");
        let p2 = panel(&mut tree, "P2");
        tree.add_panel(root, p1).unwrap();
        tree.insert_panel(p2, root, Edge::Right).unwrap();
        check(&tree);

        let (left, right) = tree.children_of(root).unwrap();
        assert!(tree.panels_of(root).is_empty());
        assert_eq!(tree.panels_of(left), &[p1]);
        assert_eq!(tree.panels_of(right), &[p2]);
        assert_eq!(tree.split_of(root), Some((SplitAxis::Horizontal, 0.5)));
        assert_eq!(tree.mode_of(left), Some(DockMode::Docked));
        assert_eq!(tree.parent_of(left), Some(root));
        assert_eq!(tree.panel_node(p2), Some(right));
    }

    #[test]
    fn node_view_reflects_structure() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let p1 = panel(&mut tree, "P1");
        let p2 = panel(&mut tree, "P2");
        tree.add_panel(root, p1).unwrap();
        let right = tree.insert_panel(p2, root, Edge::Right).unwrap();
        let view = tree.node(root).unwrap();
        assert_eq!(view.mode, DockMode::Root);
        assert_eq!(view.split, Some((SplitAxis::Horizontal, 0.5)));
        assert!(view.panels.is_empty());
        let view = tree.node(right).unwrap();
        assert_eq!(view.parent, Some(root));
        assert_eq!(view.panels, &[p2]);
        assert_eq!(view.active_panel, Some(p2));
        assert_eq!(view.floating_rect, None);
    }

    #[test]
    fn closing_last_panel_merges_sibling_into_parent() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let p1 = panel(&mut tree, "P1");
        let p2 = panel(&mut tree, "P2");
        tree.add_panel(root, p1).unwrap();
        let right = tree.insert_panel(p2, root, Edge::Right).unwrap();

        tree.close_panel(p1).unwrap();
        check(&tree);
        assert_eq!(tree.children_of(root), None);
        assert_eq!(tree.panels_of(root), &[p2]);
        assert_eq!(tree.panel_node(p2), Some(root));
        assert!(!tree.is_alive(right), "promoted sibling is discarded");
        assert!(!tree.is_panel_alive(p1));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn vertical_edges_split_vertically_in_order() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        tree.add_panel(root, a).unwrap();
        let top = tree.insert_panel(b, root, Edge::Top).unwrap();
        check(&tree);
        assert_eq!(tree.split_of(root).map(|s| s.0), Some(SplitAxis::Vertical));
        assert_eq!(tree.children_of(root).map(|c| c.0), Some(top));
        assert_eq!(shape(&tree, root), "V([B]|[A])");
    }

    #[test]
    fn splitting_a_split_node_moves_its_children_down() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let c = panel(&mut tree, "C");
        tree.add_panel(root, a).unwrap();
        tree.insert_panel(b, root, Edge::Right).unwrap();
        tree.insert_panel(c, root, Edge::Bottom).unwrap();
        check(&tree);
        assert_eq!(shape(&tree, root), "V(H([A]|[B])|[C])");
    }

    #[test]
    fn fill_appends_panels_and_activates_first_new() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let c = panel(&mut tree, "C");
        tree.add_panel(root, a).unwrap();
        let f = tree.detach_panel(b, Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
        tree.add_panel(f, c).unwrap();

        tree.set_as_dock(f, root, Edge::Fill).unwrap();
        check(&tree);
        assert!(!tree.is_alive(f));
        assert_eq!(shape(&tree, root), "[A,B,C]");
        assert_eq!(tree.active_panel(root), Some(b));
        assert!(tree.floating().is_empty());
    }

    #[test]
    fn fill_into_empty_root_adopts_structure() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let f = tree.detach_panel(a, Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
        tree.insert_panel(b, f, Edge::Right).unwrap();
        assert_eq!(shape(&tree, f), "H([A]|[B])");

        tree.set_as_dock(f, root, Edge::Fill).unwrap();
        check(&tree);
        assert_eq!(shape(&tree, root), "H([A]|[B])");
        assert!(!tree.is_alive(f));
    }

    #[test]
    fn fill_into_split_is_rejected() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let c = panel(&mut tree, "C");
        tree.add_panel(root, a).unwrap();
        tree.insert_panel(b, root, Edge::Left).unwrap();
        let f = tree.detach_panel(c, Rect::ZERO).unwrap();
        assert_eq!(
            tree.set_as_dock(f, root, Edge::Fill),
            Err(DockError::FillIntoSplit(root))
        );
        check(&tree);
        assert_eq!(tree.mode_of(f), Some(DockMode::Floating), "rejected dock leaves node in place");
    }

    #[test]
    fn docking_onto_self_or_descendant_is_rejected() {
        let mut tree = DockTree::new();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let f = tree.detach_panel(a, Rect::ZERO).unwrap();
        let child = tree.insert_panel(b, f, Edge::Right).unwrap();
        assert_eq!(tree.set_as_dock(f, f, Edge::Left), Err(DockError::DockOntoSelf(f)));
        assert_eq!(
            tree.set_as_dock(f, child, Edge::Left),
            Err(DockError::DockOntoDescendant { node: f, target: child })
        );
        assert_eq!(
            tree.set_as_dock(tree.root(), f, Edge::Left),
            Err(DockError::UnsetRoot)
        );
        check(&tree);
    }

    #[test]
    fn docking_onto_own_sibling_follows_the_promotion() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let c = panel(&mut tree, "C");
        tree.add_panel(root, a).unwrap();
        let right = tree.insert_panel(b, root, Edge::Right).unwrap();
        let (left, _) = tree.children_of(root).unwrap();
        let bottom = tree.insert_panel(c, right, Edge::Bottom).unwrap();
        assert_eq!(shape(&tree, root), "H([A]|V([B]|[C]))");

        // `bottom`'s sibling holds B; docking beside it promotes B into the
        // split node first.
        let (sibling, _) = tree.children_of(right).unwrap();
        tree.set_as_dock(bottom, sibling, Edge::Left).unwrap();
        check(&tree);
        assert_eq!(shape(&tree, root), "H([A]|H([C]|[B]))");
        assert!(tree.is_alive(left));
    }

    #[test]
    fn unset_root_is_rejected() {
        let mut tree = DockTree::new();
        assert_eq!(tree.unset_last_mode(tree.root()), Err(DockError::UnsetRoot));
        assert_eq!(tree.float(tree.root(), Rect::ZERO), Err(DockError::UnsetRoot));
        assert_eq!(tree.close_node(tree.root()), Err(DockError::UnsetRoot));
    }

    #[test]
    fn closing_deep_leaf_collapses_fully() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let c = panel(&mut tree, "C");
        tree.add_panel(root, a).unwrap();
        let right = tree.insert_panel(b, root, Edge::Right).unwrap();
        tree.insert_panel(c, right, Edge::Bottom).unwrap();

        tree.close_panel(c).unwrap();
        check(&tree);
        assert_eq!(shape(&tree, root), "H([A]|[B])");

        // Closing the remaining panels in turn never leaves an empty leaf.
        tree.close_panel(b).unwrap();
        check(&tree);
        tree.close_panel(a).unwrap();
        check(&tree);
        assert_eq!(shape(&tree, root), "[]");
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn merge_reaches_a_fixed_point() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let c = panel(&mut tree, "C");
        let d = panel(&mut tree, "D");
        tree.add_panel(root, a).unwrap();
        let right = tree.insert_panel(b, root, Edge::Right).unwrap();
        let deep = tree.insert_panel(c, right, Edge::Bottom).unwrap();
        tree.insert_panel(d, deep, Edge::Right).unwrap();

        tree.close_panel(d).unwrap();
        let after_first = shape(&tree, root);
        let count = tree.node_count();
        for _ in 0..3 {
            assert_eq!(tree.prune_empty(), Ok(0));
            assert_eq!(shape(&tree, root), after_first);
            assert_eq!(tree.node_count(), count);
        }
        check(&tree);
    }

    #[test]
    fn dock_detach_redock_round_trip() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let pa = panel(&mut tree, "A");
        let pb = panel(&mut tree, "B");
        let pc = panel(&mut tree, "C");
        tree.add_panel(root, pb).unwrap();
        tree.add_panel(root, pc).unwrap();
        let a = tree.detach_panel(pa, Rect::new(10.0, 10.0, 60.0, 60.0)).unwrap();

        tree.set_as_dock(a, root, Edge::Right).unwrap();
        check(&tree);
        let docked = shape(&tree, root);
        let (b, _) = tree.children_of(root).unwrap();

        tree.float(a, Rect::new(10.0, 10.0, 60.0, 60.0)).unwrap();
        check(&tree);
        assert_eq!(shape(&tree, root), "[B,C]");
        // The root absorbed `b`'s content; `b` itself is gone.
        assert!(!tree.is_alive(b));

        tree.set_as_dock(a, root, Edge::Right).unwrap();
        check(&tree);
        assert_eq!(shape(&tree, root), docked);
    }

    #[test]
    fn tab_detach_keeps_active_index_valid() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let p1 = panel(&mut tree, "P1");
        let p2 = panel(&mut tree, "P2");
        let p3 = panel(&mut tree, "P3");
        for p in [p1, p2, p3] {
            tree.add_panel(root, p).unwrap();
        }
        assert_eq!(tree.active_panel(root), Some(p3));

        let f = tree.detach_panel(p2, Rect::new(0.0, 0.0, 100.0, 80.0)).unwrap();
        check(&tree);
        assert_eq!(tree.panels_of(f), &[p2]);
        assert_eq!(tree.mode_of(f), Some(DockMode::Floating));
        assert_eq!(tree.panels_of(root), &[p1, p3]);
        assert_eq!(tree.active_panel(root), Some(p3));

        tree.select_panel(p3);
        tree.detach_panel(p3, Rect::ZERO).unwrap();
        check(&tree);
        assert_eq!(tree.active_panel(root), Some(p1));
    }

    #[test]
    fn detaching_only_panel_of_docked_node_collapses_it() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        tree.add_panel(root, a).unwrap();
        let right = tree.insert_panel(b, root, Edge::Right).unwrap();
        let f = tree.detach_panel(b, Rect::ZERO).unwrap();
        check(&tree);
        assert!(!tree.is_alive(right));
        assert_eq!(shape(&tree, root), "[A]");
        assert_eq!(shape(&tree, f), "[B]");
    }

    #[test]
    fn float_keeps_node_identity() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        tree.add_panel(root, a).unwrap();
        let right = tree.insert_panel(b, root, Edge::Right).unwrap();
        let rect = Rect::new(5.0, 5.0, 50.0, 50.0);
        tree.float(right, rect).unwrap();
        check(&tree);
        assert_eq!(tree.mode_of(right), Some(DockMode::Floating));
        assert_eq!(tree.floating_rect(right), Some(rect));
        assert_eq!(tree.panels_of(right), &[b]);
        assert_eq!(tree.tree_roots(), vec![root, right]);
    }

    #[test]
    fn raise_moves_to_top() {
        let mut tree = DockTree::new();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let fa = tree.detach_panel(a, Rect::ZERO).unwrap();
        let fb = tree.detach_panel(b, Rect::ZERO).unwrap();
        assert_eq!(tree.floating(), &[fa, fb]);
        assert!(tree.raise_floating(fa));
        assert_eq!(tree.floating(), &[fb, fa]);
        assert!(!tree.raise_floating(tree.root()));
    }

    #[test]
    fn split_fraction_is_clamped() {
        let mut tree = DockTree::new();
        let root = tree.root();
        tree.set_min_split_fraction(0.1);
        tree.set_split_fraction(root, 1.0).unwrap();
        assert_eq!(tree.node_opt(root).map(|n| n.fraction), Some(0.9));
        tree.set_split_fraction(root, -3.0).unwrap();
        assert_eq!(tree.node_opt(root).map(|n| n.fraction), Some(0.1));
    }

    #[test]
    fn layout_subdivides_with_gutter() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        tree.add_panel(root, a).unwrap();
        let right = tree.insert_panel(b, root, Edge::Right).unwrap();
        let (left, _) = tree.children_of(root).unwrap();
        let rects = tree.layout(root, Rect::new(0.0, 0.0, 104.0, 60.0), 4.0);
        assert_eq!(
            rects,
            vec![
                (root, Rect::new(0.0, 0.0, 104.0, 60.0)),
                (left, Rect::new(0.0, 0.0, 50.0, 60.0)),
                (right, Rect::new(54.0, 0.0, 104.0, 60.0)),
            ]
        );
        assert_eq!(tree.leaves(root), vec![left, right]);
    }

    #[test]
    fn stale_ids_are_rejected_and_slots_reused() {
        let mut tree = DockTree::new();
        let a = panel(&mut tree, "A");
        let f = tree.detach_panel(a, Rect::ZERO).unwrap();
        tree.close_panel(a).unwrap();
        assert!(!tree.is_alive(f));
        assert_eq!(tree.close_panel(a), Err(DockError::StalePanel(a)));
        assert_eq!(tree.float(f, Rect::ZERO), Err(DockError::StaleNode(f)));

        let b = panel(&mut tree, "B");
        let g = tree.detach_panel(b, Rect::ZERO).unwrap();
        if f.0 == g.0 {
            assert!(g.1 > f.1, "generation must increase on reuse");
        }
        if a.0 == b.0 {
            assert!(b.1 > a.1, "generation must increase on reuse");
        }
        check(&tree);
    }

    #[test]
    fn panels_cannot_be_docked_twice() {
        let mut tree = DockTree::new();
        let root = tree.root();
        let a = panel(&mut tree, "A");
        tree.add_panel(root, a).unwrap();
        assert_eq!(tree.add_panel(root, a), Err(DockError::PanelAlreadyDocked(a)));
        assert_eq!(
            tree.insert_panel(a, root, Edge::Left),
            Err(DockError::PanelAlreadyDocked(a))
        );
        check(&tree);
    }

    #[test]
    fn close_node_removes_its_panels() {
        let mut tree = DockTree::new();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let f = tree.detach_panel(a, Rect::ZERO).unwrap();
        tree.insert_panel(b, f, Edge::Bottom).unwrap();
        tree.close_node(f).unwrap();
        check(&tree);
        assert!(!tree.is_panel_alive(a));
        assert!(!tree.is_panel_alive(b));
        assert!(tree.floating().is_empty());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn take_content_moves_split_state() {
        let mut tree = DockTree::new();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let f = tree.detach_panel(a, Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        tree.insert_panel(b, f, Edge::Right).unwrap();
        tree.set_split_fraction(f, 0.3).unwrap();

        let root = tree.root();
        tree.take_content(root, f).unwrap();
        assert_eq!(shape(&tree, root), "H([A]|[B])");
        assert_eq!(tree.split_of(root), Some((SplitAxis::Horizontal, 0.3)));
        assert!(tree.panels_of(f).is_empty());
        assert_eq!(tree.children_of(f), None);
        tree.close_node(f).unwrap();
        check(&tree);
    }

    #[test]
    fn tree_root_walks_up() {
        let mut tree = DockTree::new();
        let a = panel(&mut tree, "A");
        let b = panel(&mut tree, "B");
        let f = tree.detach_panel(a, Rect::from_origin_size(Point::ZERO, (10.0, 10.0))).unwrap();
        let child = tree.insert_panel(b, f, Edge::Left).unwrap();
        assert_eq!(tree.tree_root_of(child), Some(f));
        assert!(tree.is_ancestor(f, child));
        assert!(!tree.is_ancestor(child, f));
    }
}
