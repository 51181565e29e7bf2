// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame driver: chrome, drags, drop overlay, and native windows.

use berth_imgui::{Context, Id, PointerInput, RenderSink, Response, Ui};
use kurbo::{Point, Rect, Vec2};

use crate::drag::{Chrome, grip_id, panel_scope, split_id, tab_id, title_id};
use crate::geometry::{
    apply_resize, contains_rect, dock_preview, drop_edge_at, drop_zones, fraction_delta, grip_rect,
    handle_rect,
};
use crate::window::{WindowEvent, WindowMetrics, WindowProvider};
use crate::{
    DockError, DockMode, DockOptions, DockTree, DragState, Edge, NodeId, Panel, PanelId,
    ResizeEdges, SplitAxis,
};

/// Input sampled once before a frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer state in the main window's logical coordinates.
    pub pointer: PointerInput,
    /// Where the main window is and how it scales.
    pub main_window: WindowMetrics,
}

/// The window a node is drawn into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Host {
    /// The main application window.
    Main,
    /// The native window of this standalone node.
    Standalone(NodeId),
}

/// A leaf the pointer was over, in the logical space of its host window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dockable {
    /// The leaf.
    pub node: NodeId,
    /// Its rectangle when it was drawn.
    pub rect: Rect,
    /// The window it was drawn into.
    pub host: Host,
}

/// Structural change decided during a frame and applied at the start of the
/// next one, before anything is laid out.
#[derive(Clone, Debug, PartialEq)]
enum PendingOp {
    Dock {
        node: NodeId,
        target: NodeId,
        edge: Edge,
    },
    Float {
        node: NodeId,
        rect: Rect,
    },
    DetachPanel {
        panel: PanelId,
        rect: Rect,
    },
    ToStandalone(NodeId),
    ToFloating(NodeId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Subject {
    Node(NodeId),
    Panel(PanelId),
}

impl PendingOp {
    fn subject(&self) -> Subject {
        match self {
            Self::Dock { node, .. } | Self::Float { node, .. } => Subject::Node(*node),
            Self::ToStandalone(node) | Self::ToFloating(node) => Subject::Node(*node),
            Self::DetachPanel { panel, .. } => Subject::Panel(*panel),
        }
    }
}

/// Geometry changes to a standalone window, applied once it is no longer
/// being drawn into.
#[derive(Copy, Clone, Debug, Default)]
struct WindowChange {
    moved: Vec2,
    resized: Option<(ResizeEdges, Vec2)>,
}

/// Owns a [`DockTree`] and drives it through frames.
///
/// Each call to [`DockManager::frame`] applies the structural changes decided
/// in the previous frame, then draws every tree root (the root node, floating
/// nodes back to front, then each standalone node into its own window) and
/// resolves drags on their chrome. Geometry changes (moving or resizing
/// floating nodes, split fractions, tab selection) take effect immediately.
/// Changes that reshape the tree are queued, so a node is never discarded
/// while the frame that drew it is still running.
///
/// ## Example
///
/// ```rust
/// use berth_dock::{DockManager, FrameInput, HeadlessProvider, WindowMetrics};
/// use berth_imgui::{Context, PointerInput, RecordingSink, Ui};
/// use kurbo::{Point, Size};
///
/// let mut dock = DockManager::new(HeadlessProvider::new());
/// dock.add_panel("Hello", |ui: &mut Ui<'_>| ui.label("Hello, dock"));
///
/// let mut ctx = Context::new();
/// let mut sink = RecordingSink::new();
/// let input = FrameInput {
///     pointer: PointerInput::hover_at(Point::new(10.0, 100.0)),
///     main_window: WindowMetrics::unscaled(Point::ZERO, Size::new(640.0, 480.0)),
/// };
/// dock.frame(&mut ctx, input, &mut sink);
/// assert!(sink.texts().any(|t| t == "Hello, dock"));
/// ```
pub struct DockManager {
    tree: DockTree,
    options: DockOptions,
    provider: Box<dyn WindowProvider>,
    pending: Vec<PendingOp>,
    /// chrome submitted this frame, to map the active id back to a node
    chrome: Vec<(Id, Chrome)>,
    drag: Option<(NodeId, DragState)>,
    dragging: Option<NodeId>,
    last_dockable: Option<Dockable>,
    next_dockable: Option<Dockable>,
    main: WindowMetrics,
    main_pointer: Point,
    window_change: WindowChange,
}

impl core::fmt::Debug for DockManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DockManager")
            .field("tree", &self.tree)
            .field("options", &self.options)
            .field("provider", &self.provider)
            .field("pending", &self.pending.len())
            .field("drag", &self.drag)
            .field("last_dockable", &self.last_dockable)
            .finish_non_exhaustive()
    }
}

impl DockManager {
    /// Manager with default options, creating native windows through
    /// `provider`.
    pub fn new(provider: impl WindowProvider + 'static) -> Self {
        Self::with_options(DockOptions::default(), provider)
    }

    /// Manager with the given options.
    pub fn with_options(options: DockOptions, provider: impl WindowProvider + 'static) -> Self {
        let mut tree = DockTree::new();
        tree.set_min_split_fraction(options.min_split_fraction);
        Self {
            tree,
            options,
            provider: Box::new(provider),
            pending: Vec::new(),
            chrome: Vec::new(),
            drag: None,
            dragging: None,
            last_dockable: None,
            next_dockable: None,
            main: WindowMetrics::default(),
            main_pointer: Point::ZERO,
            window_change: WindowChange::default(),
        }
    }

    /// The tree.
    pub fn tree(&self) -> &DockTree {
        &self.tree
    }

    /// The tree, for direct structural edits between frames.
    pub fn tree_mut(&mut self) -> &mut DockTree {
        &mut self.tree
    }

    /// Docking options.
    pub fn options(&self) -> &DockOptions {
        &self.options
    }

    /// Replace the docking options.
    pub fn set_options(&mut self, options: DockOptions) {
        self.tree.set_min_split_fraction(options.min_split_fraction);
        self.options = options;
    }

    /// Create a panel and add it as a tab of the first leaf of the root tree.
    pub fn add_panel(&mut self, title: impl Into<String>, content: impl Panel + 'static) -> PanelId {
        let panel = self.tree.create_panel(title, content);
        let root = self.tree.root();
        let leaf = self.tree.leaves(root).first().copied().unwrap_or(root);
        if self.tree.add_panel(leaf, panel).is_err() {
            tracing::warn!(?panel, "could not place new panel");
        }
        panel
    }

    /// Dock a detached panel at `edge` of `target`.
    pub fn insert_panel(&mut self, panel: PanelId, target: NodeId, edge: Edge) -> Result<NodeId, DockError> {
        self.tree.insert_panel(panel, target, edge)
    }

    /// Close a panel, collapsing its node if it was the last tab.
    pub fn close_panel(&mut self, panel: PanelId) -> Result<(), DockError> {
        self.pending.retain(|op| op.subject() != Subject::Panel(panel));
        self.tree.close_panel(panel)
    }

    /// What the pointer is doing to `node`, as of the last frame.
    pub fn drag_state(&self, node: NodeId) -> DragState {
        match self.drag {
            Some((n, state)) if n == node => state,
            _ => DragState::Idle,
        }
    }

    /// The floating or standalone node being moved by its title, if any.
    pub fn dragging(&self) -> Option<NodeId> {
        self.dragging
    }

    /// The leaf the pointer was over last frame, excluding the dragged node.
    pub fn last_dockable(&self) -> Option<Dockable> {
        self.last_dockable
    }

    /// Run one frame.
    ///
    /// `sink` receives the main window's drawing; standalone nodes draw into
    /// their own windows' sinks. `ctx` must not be inside a frame.
    pub fn frame(&mut self, ctx: &mut Context, input: FrameInput, sink: &mut dyn RenderSink) {
        self.main = input.main_window;
        self.main_pointer = input.pointer.position;

        self.drain_window_events();
        let transfers = self.apply_pending();

        ctx.begin_frame(input.pointer);
        for id in transfers {
            ctx.set_active(id);
        }
        self.chrome.clear();
        self.next_dockable = None;
        if input.pointer.pressed {
            self.raise_under_pointer();
        }

        {
            let area = self.main.logical_rect();
            let mut ui = Ui::new(ctx, sink);
            ui.begin_region("main", area, false);
            let background = ui.ctx().style().colors.background;
            ui.sink().fill_rect(area, background);
            let root = self.tree.root();
            self.walk(&mut ui, root, area, Host::Main);
            for node in self.tree.floating().to_vec() {
                self.floating_root(&mut ui, node);
            }
            self.drop_overlay(&mut ui, Host::Main);
            ui.end_region();
        }
        for node in self.tree.standalone().to_vec() {
            self.standalone_root(ctx, node);
        }
        self.containment();

        ctx.end_frame();
        self.finish_frame(ctx);
    }

    fn queue(&mut self, op: PendingOp) {
        let subject = op.subject();
        // A drop decided this frame outranks a containment conversion.
        if matches!(op, PendingOp::ToStandalone(_) | PendingOp::ToFloating(_))
            && self
                .pending
                .iter()
                .any(|p| matches!(p, PendingOp::Dock { .. }) && p.subject() == subject)
        {
            tracing::trace!(?op, "mode conversion skipped; node is being docked");
            return;
        }
        self.pending.retain(|p| p.subject() != subject);
        tracing::trace!(?op, "dock operation queued");
        self.pending.push(op);
    }

    fn drain_window_events(&mut self) {
        for node in self.tree.standalone().to_vec() {
            let Some(window) = self.tree.window_mut(node) else {
                continue;
            };
            for event in window.drain_events() {
                match event {
                    WindowEvent::CloseRequested => {
                        tracing::info!(?node, "standalone window closed by the user");
                        if self.tree.close_node(node).is_err() {
                            tracing::warn!(?node, "could not close standalone node");
                        }
                        break;
                    }
                    WindowEvent::Resized(size) => tracing::trace!(?node, ?size, "window resized"),
                    WindowEvent::RenderRequested => tracing::trace!(?node, "render requested"),
                }
            }
        }
    }

    /// Apply queued operations. Returns the ids a held press moves to.
    fn apply_pending(&mut self) -> Vec<Id> {
        let mut transfers = Vec::new();
        for op in core::mem::take(&mut self.pending) {
            match op {
                PendingOp::Dock { node, target, edge } => {
                    if !self.tree.is_alive(node) || !self.tree.is_alive(target) {
                        tracing::debug!(?node, ?target, "drop target vanished; drop ignored");
                        continue;
                    }
                    if self.tree.set_as_dock(node, target, edge).is_ok() {
                        tracing::info!(?node, ?target, ?edge, "node dropped onto dock target");
                    }
                }
                PendingOp::Float { node, rect } => {
                    if self.tree.mode_of(node) != Some(DockMode::Docked) {
                        tracing::debug!(?node, "node no longer docked; float ignored");
                        continue;
                    }
                    if self.tree.float(node, rect).is_ok() {
                        tracing::debug!(?node, ?rect, "docked node torn off");
                    }
                }
                PendingOp::DetachPanel { panel, rect } => {
                    if !self.tree.is_panel_alive(panel) {
                        tracing::debug!(?panel, "panel vanished; detach ignored");
                        continue;
                    }
                    if let Ok(node) = self.tree.detach_panel(panel, rect) {
                        transfers.push(title_id(node));
                    }
                }
                PendingOp::ToStandalone(node) => self.to_standalone(node),
                PendingOp::ToFloating(node) => {
                    let Some(window) = self.tree.window(node) else {
                        tracing::debug!(?node, "node no longer standalone; conversion ignored");
                        continue;
                    };
                    let rect = self.main.from_screen(window.metrics().screen_rect());
                    if self.tree.set_floating_from_standalone(node, rect).is_ok() {
                        tracing::info!(?node, ?rect, "standalone node moved back into the main window");
                    }
                }
            }
        }
        transfers
    }

    /// The single place native windows are created.
    fn to_standalone(&mut self, node: NodeId) {
        let Some(rect) = self.tree.floating_rect(node) else {
            tracing::debug!(?node, "node no longer floating; conversion ignored");
            return;
        };
        let screen = self.main.to_screen(rect);
        let title = self.window_title(node);
        match self.provider.create_window(&title, screen.size()) {
            Ok(mut window) => {
                window.set_position(screen.origin());
                window.set_visible(true);
                if self.tree.set_standalone(node, window).is_ok() {
                    tracing::info!(?node, "floating node moved into its own window");
                }
            }
            Err(err) => {
                tracing::warn!(%err, ?node, "window creation failed; node stays floating");
            }
        }
    }

    fn window_title(&self, node: NodeId) -> String {
        self.tree
            .leaves(node)
            .into_iter()
            .find_map(|leaf| self.tree.active_panel(leaf))
            .and_then(|p| self.tree.panel_title(p))
            .unwrap_or("berth")
            .to_owned()
    }

    fn raise_under_pointer(&mut self) {
        let grip = self.options.grip_size;
        let top = self.tree.floating().iter().rev().copied().find(|&node| {
            self.tree
                .floating_rect(node)
                .is_some_and(|r| r.inflate(grip, grip).contains(self.main_pointer))
        });
        if let Some(node) = top {
            self.tree.raise_floating(node);
        }
    }

    fn interact(&mut self, ui: &mut Ui<'_>, id: Id, rect: Rect, chrome: Chrome) -> Response {
        self.chrome.push((id, chrome));
        ui.interact_id(id, rect)
    }

    /// Draw the tree under `root` into `rect`.
    fn walk(&mut self, ui: &mut Ui<'_>, root: NodeId, rect: Rect, host: Host) {
        for (node, r) in self.tree.layout(root, rect, self.options.gutter) {
            match self.tree.split_of(node) {
                Some((axis, fraction)) => self.split_handle(ui, node, r, axis, fraction),
                None => self.leaf(ui, node, r, host),
            }
        }
    }

    fn split_handle(&mut self, ui: &mut Ui<'_>, node: NodeId, r: Rect, axis: SplitAxis, fraction: f64) {
        let gutter = self.options.gutter;
        let handle = handle_rect(r, axis, fraction, gutter);
        let response = self.interact(ui, split_id(node), handle, Chrome::Split(node, axis));
        if response.held && response.drag_delta != Vec2::ZERO {
            let fraction = fraction + fraction_delta(r, axis, gutter, response.drag_delta);
            if let Err(err) = self.tree.set_split_fraction(node, fraction) {
                tracing::debug!(%err, ?node, "split handle drag ignored");
            }
        }
        let colors = &ui.ctx().style().colors;
        let color = if response.held {
            colors.button_active
        } else if response.hovered {
            colors.button_hover
        } else {
            colors.border
        };
        ui.sink().fill_rect(handle, color);
    }

    fn leaf(&mut self, ui: &mut Ui<'_>, node: NodeId, r: Rect, host: Host) {
        let title_height = self.options.title_height;
        let tab_width = self.options.tab_width;
        let strip = Rect::new(r.x0, r.y0, r.x1, (r.y0 + title_height).min(r.y1));
        let content = Rect::new(r.x0, strip.y1, r.x1, r.y1);
        let panels = self.tree.panels_of(node).to_vec();
        let is_root = self.tree.mode_of(node) == Some(DockMode::Root);
        // A lone tab is the node's handle; dragging it moves the node.
        let single = panels.len() == 1 && !is_root;

        let pointer = ui.ctx().interaction().pointer().position;
        let excluded = self
            .dragging
            .is_some_and(|d| d == node || self.tree.is_ancestor(d, node));
        if r.contains(pointer) && !excluded {
            self.next_dockable = Some(Dockable { node, rect: r, host });
        }

        // Past the tabs, the strip is the node's handle.
        let handle = if single {
            strip
        } else {
            #[allow(clippy::cast_precision_loss, reason = "Tab counts are small.")]
            let tabs_end = strip.x0 + panels.len() as f64 * tab_width;
            Rect::new(tabs_end.min(strip.x1), strip.y0, strip.x1, strip.y1)
        };
        let title = self.interact(ui, title_id(node), handle, Chrome::Title(node));
        self.title_drag(node, r, &title);

        let colors = ui.ctx().style().colors.clone();
        ui.sink().fill_rect(strip, colors.border);
        for (i, &panel) in panels.iter().enumerate() {
            #[allow(clippy::cast_precision_loss, reason = "Tab counts are small.")]
            let x0 = strip.x0 + i as f64 * tab_width;
            if x0 >= strip.x1 {
                break;
            }
            let tab = Rect::new(x0, strip.y0, (x0 + tab_width).min(strip.x1), strip.y1);
            let hovered = if single {
                title.hovered
            } else {
                let response = self.interact(ui, tab_id(panel), tab, Chrome::Tab(node, panel));
                if response.pressed {
                    self.tree.select_panel(panel);
                }
                if response.held && response.drag_distance > 0.0 {
                    let origin = self.main_pointer - self.options.detach_offset;
                    let rect = Rect::from_origin_size(origin, self.options.new_window_size);
                    self.queue(PendingOp::DetachPanel { panel, rect });
                }
                response.hovered
            };
            let active = self.tree.active_panel(node) == Some(panel);
            let fill = if active {
                colors.button_active
            } else if hovered {
                colors.button_hover
            } else {
                colors.button
            };
            ui.sink().fill_rect(tab, fill);
            if let Some(text) = self.tree.panel_title(panel) {
                let pad = ui.ctx().style().padding;
                ui.sink().text(tab.origin() + Vec2::new(pad, pad), text, colors.text);
            }
        }

        let Some(panel) = self.tree.active_panel(node) else {
            return;
        };
        ui.sink().fill_rect(content, colors.background);
        ui.ctx().ids_mut().push_id(panel_scope(panel));
        if let Some(body) = self.tree.panel_content_mut(panel) {
            ui.region("content", content, true, |ui| body.render(ui));
        }
        ui.ctx().ids_mut().pop_scope();
    }

    /// React to the title of `node` being held.
    fn title_drag(&mut self, node: NodeId, r: Rect, response: &Response) {
        if !response.held {
            return;
        }
        match self.tree.mode_of(node) {
            Some(DockMode::Floating) => {
                if response.drag_delta != Vec2::ZERO
                    && let Some(rect) = self.tree.floating_rect(node)
                    && let Err(err) = self.tree.set_floating_rect(node, rect + response.drag_delta)
                {
                    tracing::debug!(%err, ?node, "title drag ignored");
                }
            }
            Some(DockMode::Standalone) => self.window_change.moved += response.drag_delta,
            Some(DockMode::Docked) if response.drag_distance > 0.0 => {
                let origin = self.main_pointer - self.options.detach_offset;
                let rect = Rect::from_origin_size(origin, r.size());
                self.queue(PendingOp::Float { node, rect });
            }
            _ => {}
        }
    }

    /// Title bar above a split tree root. Returns the area left for the tree.
    fn root_title_bar(&mut self, ui: &mut Ui<'_>, node: NodeId, rect: Rect) -> Rect {
        if self.tree.split_of(node).is_none() {
            return rect;
        }
        let bar = Rect::new(rect.x0, rect.y0, rect.x1, (rect.y0 + self.options.title_height).min(rect.y1));
        let response = self.interact(ui, title_id(node), bar, Chrome::Title(node));
        self.title_drag(node, rect, &response);
        let colors = ui.ctx().style().colors.clone();
        ui.sink().fill_rect(
            bar,
            if response.held {
                colors.button_active
            } else {
                colors.border
            },
        );
        let title = self.window_title(node);
        let pad = ui.ctx().style().padding;
        ui.sink().text(bar.origin() + Vec2::new(pad, pad), &title, colors.text);
        Rect::new(rect.x0, bar.y1, rect.x1, rect.y1)
    }

    fn floating_root(&mut self, ui: &mut Ui<'_>, node: NodeId) {
        let Some(rect) = self.tree.floating_rect(node) else {
            return;
        };
        let grip = self.options.grip_size;
        let frame = rect.inflate(grip, grip);
        ui.begin_region(("float", node), frame, false);
        let colors = ui.ctx().style().colors.clone();
        ui.sink().fill_rect(rect, colors.background);
        let body = self.root_title_bar(ui, node, rect);
        self.walk(ui, node, body, Host::Main);

        for edges in ResizeEdges::GRIPS {
            let hit = grip_rect(frame, edges, grip);
            let response = self.interact(ui, grip_id(node, edges), hit, Chrome::Grip(node, edges));
            if response.held
                && response.drag_delta != Vec2::ZERO
                && let Some(current) = self.tree.floating_rect(node)
            {
                let resized = apply_resize(current, edges, response.drag_delta, self.options.min_floating_size);
                if let Err(err) = self.tree.set_floating_rect(node, resized) {
                    tracing::debug!(%err, ?node, "grip resize ignored");
                }
            }
        }
        if let Some(rect) = self.tree.floating_rect(node) {
            ui.sink().stroke_rect(rect, colors.border, 1.0);
        }
        ui.end_region();
    }

    fn standalone_root(&mut self, ctx: &mut Context, node: NodeId) {
        let Some(mut window) = self.tree.take_window(node) else {
            return;
        };
        let metrics = window.metrics();
        let local = metrics.point_from_screen(self.main.point_to_screen(self.main_pointer));
        let scale = self.main.screen_per_logical() / metrics.screen_per_logical();
        let saved = ctx.interaction_mut().map_pointer(local, scale);
        self.window_change = WindowChange::default();

        {
            let area = metrics.logical_rect();
            let grip = self.options.grip_size;
            let mut ui = Ui::new(ctx, window.sink());
            ui.begin_region(("standalone", node), area, false);
            let background = ui.ctx().style().colors.background;
            ui.sink().fill_rect(area, background);
            let inner = area.inflate(-grip, -grip);
            let inner = Rect::new(inner.x0, inner.y0, inner.x1.max(inner.x0), inner.y1.max(inner.y0));
            let body = self.root_title_bar(&mut ui, node, inner);
            self.walk(&mut ui, node, body, Host::Standalone(node));
            for edges in ResizeEdges::GRIPS {
                let hit = grip_rect(area, edges, grip);
                let response = self.interact(&mut ui, grip_id(node, edges), hit, Chrome::Grip(node, edges));
                if response.held && response.drag_delta != Vec2::ZERO {
                    let delta = match self.window_change.resized {
                        Some((_, d)) => d + response.drag_delta,
                        None => response.drag_delta,
                    };
                    self.window_change.resized = Some((edges, delta));
                }
            }
            self.drop_overlay(&mut ui, Host::Standalone(node));
            ui.end_region();
        }

        ctx.interaction_mut().restore_pointer(saved);
        // Deltas gathered above are in this window's logical units.
        let change = core::mem::take(&mut self.window_change);
        if change.moved != Vec2::ZERO {
            window.set_position(metrics.position + metrics.vec_to_screen(change.moved));
        }
        if let Some((edges, delta)) = change.resized {
            let screen = metrics.screen_rect();
            let min = self.options.min_floating_size * metrics.screen_per_logical();
            let resized = apply_resize(screen, edges, metrics.vec_to_screen(delta), min);
            window.set_position(resized.origin());
            window.set_size(resized.size());
        }
        self.tree.restore_window(node, window);
    }

    /// Drop targets over the last dockable leaf while a node is dragged.
    fn drop_overlay(&mut self, ui: &mut Ui<'_>, host: Host) {
        let Some(dragged) = self.dragging else {
            return;
        };
        let Some(target) = self.last_dockable.filter(|d| d.host == host) else {
            return;
        };
        if target.node == dragged
            || !self.tree.is_alive(target.node)
            || self.tree.is_ancestor(dragged, target.node)
            || self.tree.split_of(target.node).is_some()
        {
            return;
        }
        let size = self.options.drop_zone_size;
        let pointer = *ui.ctx().interaction().pointer();
        let hovered = drop_edge_at(target.rect, size, pointer.position);
        let colors = ui.ctx().style().colors.clone();
        if let Some(edge) = hovered {
            ui.sink()
                .fill_rect(dock_preview(target.rect, edge), colors.button_active.with_alpha(64));
        }
        for (edge, zone) in drop_zones(target.rect, size) {
            let alpha = if hovered == Some(edge) { 224 } else { 128 };
            ui.sink().fill_rect(zone, colors.button_hover.with_alpha(alpha));
            ui.sink().stroke_rect(zone, colors.border, 1.0);
        }
        if pointer.released && let Some(edge) = hovered {
            tracing::trace!(?dragged, target = ?target.node, ?edge, "drop target resolved");
            self.queue(PendingOp::Dock {
                node: dragged,
                target: target.node,
                edge,
            });
        }
    }

    /// Floating nodes leaving the main window get their own window; native
    /// windows moved back inside become floating again.
    fn containment(&mut self) {
        if !self.options.multi_window {
            return;
        }
        let bounds = self.main.screen_rect();
        for node in self.tree.floating().to_vec() {
            if let Some(rect) = self.tree.floating_rect(node)
                && !contains_rect(bounds, self.main.to_screen(rect))
            {
                self.queue(PendingOp::ToStandalone(node));
            }
        }
        for node in self.tree.standalone().to_vec() {
            if let Some(window) = self.tree.window(node)
                && contains_rect(bounds, window.metrics().screen_rect())
            {
                self.queue(PendingOp::ToFloating(node));
            }
        }
    }

    fn finish_frame(&mut self, ctx: &Context) {
        self.last_dockable = self.next_dockable.take();
        let previous = self.drag;
        self.drag = ctx.active().and_then(|active| {
            self.chrome
                .iter()
                .find(|(id, _)| *id == active)
                .map(|&(_, chrome)| (chrome.node(), chrome.drag_state()))
        });
        self.dragging = match self.drag {
            Some((node, DragState::DraggingWindow))
                if matches!(
                    self.tree.mode_of(node),
                    Some(DockMode::Floating | DockMode::Standalone)
                ) =>
            {
                Some(node)
            }
            _ => None,
        };
        if previous != self.drag {
            tracing::trace!(from = ?previous, to = ?self.drag, "drag state changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmptyPanel, HeadlessProvider};
    use berth_imgui::RecordingSink;
    use kurbo::Size;

    struct Harness {
        dock: DockManager,
        ctx: Context,
        sink: RecordingSink,
        main: WindowMetrics,
    }

    impl Harness {
        fn new(options: DockOptions, provider: HeadlessProvider) -> Self {
            Self {
                dock: DockManager::with_options(options, provider),
                ctx: Context::new(),
                sink: RecordingSink::new(),
                main: WindowMetrics::unscaled(Point::ZERO, Size::new(800.0, 600.0)),
            }
        }

        fn frame(&mut self, pointer: PointerInput) {
            self.sink.clear();
            let input = FrameInput {
                pointer,
                main_window: self.main,
            };
            self.dock.frame(&mut self.ctx, input, &mut self.sink);
            assert_eq!(self.sink.clip_depth(), 0, "clips must balance");
            if let Err(err) = self.dock.tree().check_integrity() {
                panic!("integrity violated: {err}");
            }
        }

        fn panel(&mut self, title: &str) -> PanelId {
            self.dock.tree_mut().create_panel(title, EmptyPanel)
        }
    }

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn tab_drag_detaches_and_keeps_dragging() {
        let mut h = Harness::new(DockOptions::default(), HeadlessProvider::new());
        let root = h.dock.tree().root();
        let p1 = h.dock.add_panel("P1", EmptyPanel);
        let p2 = h.dock.add_panel("P2", EmptyPanel);
        let p3 = h.dock.add_panel("P3", EmptyPanel);

        // Tabs are 90 wide along the top: P2 spans x in [90, 180).
        h.frame(PointerInput::hover_at(pt(130.0, 11.0)));
        h.frame(PointerInput::press_at(pt(130.0, 11.0)));
        assert_eq!(h.dock.tree().active_panel(root), Some(p2));
        assert_eq!(h.dock.drag_state(root), DragState::DraggingTab(p2));

        h.frame(PointerInput::drag_to(pt(150.0, 11.0)));
        // Detaching is applied at the start of the next frame.
        assert_eq!(h.dock.tree().panels_of(root), &[p1, p2, p3]);

        h.frame(PointerInput::drag_to(pt(160.0, 11.0)));
        assert_eq!(h.dock.tree().panels_of(root), &[p1, p3]);
        let active = h.dock.tree().active_panel(root).unwrap();
        assert!(active == p1 || active == p3);
        let floating = h.dock.tree().floating().to_vec();
        assert_eq!(floating.len(), 1);
        let node = floating[0];
        assert_eq!(h.dock.tree().panels_of(node), &[p2]);
        assert_eq!(h.dock.drag_state(node), DragState::DraggingWindow);
        assert_eq!(h.dock.dragging(), Some(node));
        // Spawned at the pointer minus the offset, then moved by this frame's
        // 10 units of pointer motion.
        assert_eq!(
            h.dock.tree().floating_rect(node),
            Some(Rect::from_origin_size(pt(140.0, 1.0), Size::new(320.0, 240.0)))
        );

        h.frame(PointerInput::release_at(pt(160.0, 11.0)));
        assert_eq!(h.dock.drag_state(node), DragState::Idle);
        assert_eq!(h.dock.dragging(), None);
        h.frame(PointerInput::hover_at(pt(160.0, 11.0)));
        assert_eq!(h.dock.tree().mode_of(node), Some(DockMode::Floating));
    }

    #[test]
    fn dragging_a_lone_docked_tab_floats_its_node() {
        let options = DockOptions {
            multi_window: false,
            ..DockOptions::default()
        };
        let mut h = Harness::new(options, HeadlessProvider::new());
        let root = h.dock.tree().root();
        let a = h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        let right = h.dock.insert_panel(b, root, Edge::Right).unwrap();

        // The right leaf spans x in [402, 800].
        h.frame(PointerInput::hover_at(pt(500.0, 11.0)));
        h.frame(PointerInput::press_at(pt(500.0, 11.0)));
        assert_eq!(h.dock.drag_state(right), DragState::DraggingWindow);
        assert_eq!(h.dock.dragging(), None, "docked nodes are not drop candidates");
        h.frame(PointerInput::drag_to(pt(520.0, 11.0)));
        h.frame(PointerInput::drag_to(pt(530.0, 11.0)));

        assert_eq!(h.dock.tree().mode_of(right), Some(DockMode::Floating));
        assert_eq!(h.dock.tree().panels_of(root), &[a]);
        assert_eq!(h.dock.tree().floating_rect(right).map(|r| r.x0), Some(510.0));
        assert_eq!(h.dock.dragging(), Some(right));
    }

    #[test]
    fn releasing_over_a_drop_zone_docks() {
        let mut h = Harness::new(DockOptions::default(), HeadlessProvider::new());
        let root = h.dock.tree().root();
        let a = h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        let f = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(300.0, 200.0, 500.0, 400.0))
            .unwrap();

        h.frame(PointerInput::hover_at(pt(350.0, 210.0)));
        h.frame(PointerInput::press_at(pt(350.0, 210.0)));
        assert_eq!(h.dock.dragging(), Some(f));
        // The root's right drop zone is centred at (440, 300).
        h.frame(PointerInput::drag_to(pt(440.0, 300.0)));
        assert_eq!(h.dock.last_dockable().map(|d| d.node), Some(root));
        h.frame(PointerInput::release_at(pt(440.0, 300.0)));
        h.frame(PointerInput::hover_at(pt(440.0, 300.0)));

        let (left, right) = h.dock.tree().children_of(root).unwrap();
        assert_eq!(h.dock.tree().panels_of(left), &[a]);
        assert_eq!(h.dock.tree().panels_of(right), &[b]);
        assert!(h.dock.tree().floating().is_empty());
        assert_eq!(right, f, "the dropped node keeps its identity");
        assert_eq!(h.dock.tree().mode_of(f), Some(DockMode::Docked));
    }

    #[test]
    fn drop_outranks_a_failing_window_conversion() {
        let provider = HeadlessProvider::new();
        provider.fail_next_creations(usize::MAX);
        let mut h = Harness::new(DockOptions::default(), provider.clone());
        let root = h.dock.tree().root();
        let a = h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        // Wider than the main window has room for, so every frame asks for a
        // native window that cannot be created.
        let f = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(300.0, 200.0, 900.0, 400.0))
            .unwrap();

        h.frame(PointerInput::hover_at(pt(350.0, 210.0)));
        h.frame(PointerInput::press_at(pt(350.0, 210.0)));
        assert_eq!(h.dock.dragging(), Some(f));
        h.frame(PointerInput::drag_to(pt(440.0, 300.0)));
        assert_eq!(h.dock.last_dockable().map(|d| d.node), Some(root));
        h.frame(PointerInput::release_at(pt(440.0, 300.0)));
        h.frame(PointerInput::hover_at(pt(440.0, 300.0)));

        assert_eq!(h.dock.tree().mode_of(f), Some(DockMode::Docked));
        let (left, right) = h.dock.tree().children_of(root).unwrap();
        assert_eq!(h.dock.tree().panels_of(left), &[a]);
        assert_eq!(right, f);
        assert!(h.dock.tree().floating().is_empty());
        assert_eq!(provider.created(), 0);
    }

    #[test]
    fn releasing_elsewhere_leaves_node_floating() {
        let mut h = Harness::new(DockOptions::default(), HeadlessProvider::new());
        let root = h.dock.tree().root();
        h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        let f = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(300.0, 200.0, 500.0, 400.0))
            .unwrap();

        h.frame(PointerInput::hover_at(pt(350.0, 210.0)));
        h.frame(PointerInput::press_at(pt(350.0, 210.0)));
        h.frame(PointerInput::drag_to(pt(100.0, 100.0)));
        h.frame(PointerInput::release_at(pt(100.0, 100.0)));
        h.frame(PointerInput::hover_at(pt(100.0, 100.0)));
        assert_eq!(h.dock.tree().mode_of(f), Some(DockMode::Floating));
        assert_eq!(h.dock.tree().children_of(root), None);
        assert_eq!(
            h.dock.tree().floating_rect(f),
            Some(Rect::new(50.0, 90.0, 250.0, 290.0))
        );
    }

    #[test]
    fn failed_window_creation_stays_floating_and_retries() {
        let provider = HeadlessProvider::new();
        provider.fail_next_creations(1);
        let mut h = Harness::new(DockOptions::default(), provider.clone());
        h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        let f = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(700.0, 500.0, 1000.0, 800.0))
            .unwrap();

        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        assert_eq!(provider.attempts(), 1);
        assert_eq!(h.dock.tree().mode_of(f), Some(DockMode::Floating));

        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        assert_eq!(provider.attempts(), 2);
        assert_eq!(h.dock.tree().mode_of(f), Some(DockMode::Standalone));
        let handle = provider.window(0).unwrap();
        assert_eq!(handle.metrics().position, pt(700.0, 500.0));
        assert_eq!(handle.metrics().drawable_size, Size::new(300.0, 300.0));
        assert!(handle.is_visible());
        assert_eq!(handle.title(), "B");

        // The standalone node draws into its own window.
        handle.clear();
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        assert!(handle.texts().iter().any(|t| t == "B"));
        assert!(!h.sink.texts().any(|t| t == "B"));
    }

    #[test]
    fn closing_a_standalone_window_discards_its_node() {
        let provider = HeadlessProvider::new();
        let mut h = Harness::new(DockOptions::default(), provider.clone());
        h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        let f = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(700.0, 500.0, 1000.0, 800.0))
            .unwrap();
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        assert_eq!(h.dock.tree().mode_of(f), Some(DockMode::Standalone));

        let handle = provider.window(0).unwrap();
        handle.request_close();
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        assert!(handle.is_closed());
        assert!(!h.dock.tree().is_alive(f));
        assert!(!h.dock.tree().is_panel_alive(b));
        assert!(h.dock.tree().standalone().is_empty());
    }

    #[test]
    fn standalone_window_moved_inside_becomes_floating() {
        let provider = HeadlessProvider::new();
        let mut h = Harness::new(DockOptions::default(), provider.clone());
        h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        let f = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(700.0, 500.0, 1000.0, 800.0))
            .unwrap();
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        let handle = provider.window(0).unwrap();

        handle.move_to(pt(100.0, 100.0));
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        assert_eq!(h.dock.tree().mode_of(f), Some(DockMode::Floating));
        assert_eq!(
            h.dock.tree().floating_rect(f),
            Some(Rect::new(100.0, 100.0, 400.0, 400.0))
        );
        assert!(handle.is_closed());
    }

    #[test]
    fn split_handle_in_a_scaled_window_follows_the_pointer() {
        // Content scale 2: one logical unit of the window is two screen points.
        let provider = HeadlessProvider::with_scales(2.0, 1.0);
        let mut h = Harness::new(DockOptions::default(), provider.clone());
        h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        let c = h.panel("C");
        let f = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(700.0, 500.0, 1000.0, 800.0))
            .unwrap();
        h.dock.insert_panel(c, f, Edge::Right).unwrap();
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        assert_eq!(h.dock.tree().mode_of(f), Some(DockMode::Standalone));
        let handle = provider.window(0).unwrap();
        assert_eq!(handle.metrics().logical_size(), Size::new(150.0, 150.0));

        // Inside the grips and below the title bar the split body is
        // (4, 26)..(146, 146): 138 units shared, handle centred at x = 75.
        let grab = pt(700.0 + 75.0 * 2.0, 500.0 + 86.0 * 2.0);
        h.frame(PointerInput::hover_at(grab));
        h.frame(PointerInput::press_at(grab));
        assert_eq!(h.dock.drag_state(f), DragState::Resizing(ResizeEdges::RIGHT));
        h.frame(PointerInput::drag_to(grab + Vec2::new(20.0, 0.0)));

        let (axis, fraction) = h.dock.tree().split_of(f).unwrap();
        assert_eq!(axis, SplitAxis::Horizontal);
        assert!((fraction - (0.5 + 10.0 / 138.0)).abs() < 1e-9, "fraction {fraction}");
    }

    #[test]
    fn dragging_a_standalone_title_moves_its_window() {
        let provider = HeadlessProvider::with_scales(2.0, 1.0);
        let mut h = Harness::new(DockOptions::default(), provider.clone());
        h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        let f = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(700.0, 500.0, 1000.0, 800.0))
            .unwrap();
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        let handle = provider.window(0).unwrap();
        assert_eq!(handle.metrics().position, pt(700.0, 500.0));

        // Local (60, 15) is on the title strip of the lone leaf.
        let grab = pt(820.0, 530.0);
        h.frame(PointerInput::hover_at(grab));
        h.frame(PointerInput::press_at(grab));
        assert_eq!(h.dock.drag_state(f), DragState::DraggingWindow);
        h.frame(PointerInput::drag_to(grab + Vec2::new(20.0, 10.0)));

        assert_eq!(handle.metrics().position, pt(720.0, 510.0));
        assert_eq!(handle.metrics().drawable_size, Size::new(300.0, 300.0));
        h.frame(PointerInput::release_at(grab + Vec2::new(20.0, 10.0)));
        assert_eq!(h.dock.tree().mode_of(f), Some(DockMode::Standalone));
    }

    #[test]
    fn grips_resize_standalone_windows() {
        let provider = HeadlessProvider::with_scales(2.0, 1.0);
        let mut h = Harness::new(DockOptions::default(), provider.clone());
        h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        let f = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(700.0, 500.0, 1000.0, 800.0))
            .unwrap();
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        h.frame(PointerInput::hover_at(pt(10.0, 100.0)));
        let handle = provider.window(0).unwrap();

        // Right grip: local x in [146, 150].
        let grab = pt(700.0 + 148.0 * 2.0, 500.0 + 75.0 * 2.0);
        h.frame(PointerInput::hover_at(grab));
        h.frame(PointerInput::press_at(grab));
        assert_eq!(h.dock.drag_state(f), DragState::Resizing(ResizeEdges::RIGHT));
        h.frame(PointerInput::drag_to(grab + Vec2::new(40.0, 0.0)));
        h.frame(PointerInput::release_at(grab + Vec2::new(40.0, 0.0)));
        assert_eq!(handle.metrics().position, pt(700.0, 500.0));
        assert_eq!(handle.metrics().drawable_size, Size::new(340.0, 300.0));

        // Bottom grip of the now 170 x 150 logical window: y in [146, 150].
        let grab = pt(700.0 + 85.0 * 2.0, 500.0 + 148.0 * 2.0);
        h.frame(PointerInput::hover_at(grab));
        h.frame(PointerInput::press_at(grab));
        assert_eq!(h.dock.drag_state(f), DragState::Resizing(ResizeEdges::BOTTOM));
        h.frame(PointerInput::drag_to(grab + Vec2::new(0.0, 30.0)));
        h.frame(PointerInput::release_at(grab + Vec2::new(0.0, 30.0)));
        assert_eq!(handle.metrics().position, pt(700.0, 500.0));
        assert_eq!(handle.metrics().drawable_size, Size::new(340.0, 330.0));
    }

    #[test]
    fn split_handle_drag_moves_the_fraction() {
        let mut h = Harness::new(DockOptions::default(), HeadlessProvider::new());
        let root = h.dock.tree().root();
        h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        h.dock.insert_panel(b, root, Edge::Right).unwrap();

        // Handle spans x in [398, 402]; 796 units are shared by the halves.
        h.frame(PointerInput::hover_at(pt(400.0, 300.0)));
        h.frame(PointerInput::press_at(pt(400.0, 300.0)));
        assert_eq!(
            h.dock.drag_state(root),
            DragState::Resizing(ResizeEdges::RIGHT)
        );
        h.frame(PointerInput::drag_to(pt(599.0, 300.0)));
        assert_eq!(
            h.dock.tree().split_of(root),
            Some((SplitAxis::Horizontal, 0.75))
        );
        h.frame(PointerInput::release_at(pt(599.0, 300.0)));
        assert_eq!(h.dock.drag_state(root), DragState::Idle);
    }

    #[test]
    fn grips_resize_floating_nodes() {
        let options = DockOptions {
            multi_window: false,
            ..DockOptions::default()
        };
        let mut h = Harness::new(options, HeadlessProvider::new());
        h.dock.add_panel("A", EmptyPanel);
        let b = h.panel("B");
        let f = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(300.0, 200.0, 500.0, 400.0))
            .unwrap();

        // The right grip sits just outside the right edge.
        h.frame(PointerInput::hover_at(pt(502.0, 300.0)));
        h.frame(PointerInput::press_at(pt(502.0, 300.0)));
        assert_eq!(h.dock.drag_state(f), DragState::Resizing(ResizeEdges::RIGHT));
        h.frame(PointerInput::drag_to(pt(552.0, 310.0)));
        assert_eq!(
            h.dock.tree().floating_rect(f),
            Some(Rect::new(300.0, 200.0, 550.0, 400.0))
        );
    }

    #[test]
    fn pressing_a_floating_node_raises_it() {
        let mut h = Harness::new(DockOptions::default(), HeadlessProvider::new());
        let a = h.panel("A");
        let b = h.panel("B");
        let fa = h
            .dock
            .tree_mut()
            .detach_panel(a, Rect::new(100.0, 100.0, 300.0, 300.0))
            .unwrap();
        let fb = h
            .dock
            .tree_mut()
            .detach_panel(b, Rect::new(400.0, 100.0, 600.0, 300.0))
            .unwrap();
        h.frame(PointerInput::hover_at(pt(150.0, 200.0)));
        h.frame(PointerInput::press_at(pt(150.0, 200.0)));
        assert_eq!(h.dock.tree().floating(), &[fb, fa]);
    }

    #[test]
    fn panel_content_is_rendered_with_stable_scroll_scope() {
        let mut h = Harness::new(DockOptions::default(), HeadlessProvider::new());
        let root = h.dock.tree().root();
        let p = h.dock.add_panel("Log", |ui: &mut Ui<'_>| {
            for _ in 0..100 {
                ui.label("line");
            }
        });
        h.frame(PointerInput::hover_at(pt(100.0, 100.0)));
        assert!(h.sink.texts().any(|t| t == "line"));

        let content = panel_scope(p).with("content");
        let wheel = PointerInput {
            wheel: Vec2::new(0.0, 2.0),
            ..PointerInput::hover_at(pt(100.0, 100.0))
        };
        h.frame(wheel);
        h.frame(PointerInput::hover_at(pt(100.0, 100.0)));
        let scrolled = h.ctx.region_scroll(content);
        assert!(scrolled.y > 0.0, "wheel should scroll the panel");

        // Moving the panel to another node keeps its scroll state.
        let other = h.panel("Other");
        h.dock.insert_panel(other, root, Edge::Left).unwrap();
        h.frame(PointerInput::hover_at(pt(10.0, 10.0)));
        assert_eq!(h.ctx.region_scroll(content), scrolled);
    }
}
