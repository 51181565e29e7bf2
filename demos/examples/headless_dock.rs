// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A scripted docking session against the headless window provider.
//!
//! The pointer tears a tab off, drags the new floating node out of the main
//! window (it gets its own native window), drags it back, and docks it to
//! the right of the editor. The tree is printed after each step.
//!
//! Run:
//! - `cargo run -p berth_demos --example headless_dock`
//! - `RUST_LOG=berth_dock=debug cargo run -p berth_demos --example headless_dock`

use berth_demos::{CounterPanel, LogPanel, init_tracing, print_trees};
use berth_dock::{DockManager, Edge, FrameInput, HeadlessProvider, WindowMetrics};
use berth_imgui::{Context, PointerInput, RecordingSink};
use kurbo::{Point, Size};

struct Session {
    dock: DockManager,
    ctx: Context,
    sink: RecordingSink,
    main: WindowMetrics,
}

impl Session {
    fn frame(&mut self, pointer: PointerInput) {
        self.sink.clear();
        let input = FrameInput {
            pointer,
            main_window: self.main,
        };
        self.dock.frame(&mut self.ctx, input, &mut self.sink);
    }

    fn drag(&mut self, from: Point, to: Point, steps: u32) {
        self.frame(PointerInput::hover_at(from));
        self.frame(PointerInput::press_at(from));
        for i in 1..=steps {
            let t = f64::from(i) / f64::from(steps);
            self.frame(PointerInput::drag_to(from.lerp(to, t)));
        }
        self.frame(PointerInput::release_at(to));
        self.frame(PointerInput::hover_at(to));
    }

    fn report(&self, step: &str) {
        println!("{step}");
        print_trees(self.dock.tree());
        if let Err(err) = self.dock.tree().check_integrity() {
            println!("  integrity violated: {err}");
        }
    }
}

fn main() {
    init_tracing();

    let provider = HeadlessProvider::new();
    let mut session = Session {
        dock: DockManager::new(provider.clone()),
        ctx: Context::new(),
        sink: RecordingSink::new(),
        main: WindowMetrics::unscaled(Point::ZERO, Size::new(800.0, 600.0)),
    };

    session.dock.add_panel("Editor", CounterPanel::default());
    let log = session.dock.add_panel("Log", LogPanel::with_lines(200));
    session.dock.add_panel("Notes", |ui: &mut berth_imgui::Ui<'_>| {
        ui.label("Drag a tab to tear it off.");
    });
    let root = session.dock.tree().root();
    let tools = session.dock.tree_mut().create_panel("Tools", CounterPanel::default());
    if let Err(err) = session.dock.insert_panel(tools, root, Edge::Left) {
        println!("could not dock Tools: {err}");
    }
    session.frame(PointerInput::hover_at(Point::new(400.0, 300.0)));
    session.report("initial layout");

    // The editor leaf starts at x = 402; "Log" is its second tab.
    session.drag(Point::new(537.0, 11.0), Point::new(600.0, 200.0), 4);
    session.report("after tearing off Log");

    let Some(node) = session.dock.tree().panel_node(log) else {
        println!("Log was closed unexpectedly");
        return;
    };
    let title = |s: &Session| {
        s.dock
            .tree()
            .floating_rect(node)
            .map(|r| Point::new(r.x0 + 20.0, r.y0 + 11.0))
    };

    // Off the right edge: the node moves into a native window.
    if let Some(grab) = title(&session) {
        session.drag(grab, Point::new(grab.x + 500.0, grab.y), 5);
        session.frame(PointerInput::hover_at(Point::new(10.0, 300.0)));
    }
    session.report("after dragging Log out of the main window");
    if let Some(window) = provider.window(0) {
        println!(
            "  native window {:?} at {:?}, {} draw commands",
            window.title(),
            window.metrics().position,
            window.recorded().len()
        );
        // Moving the native window back inside returns the node to the main
        // window as a floating node.
        window.move_to(Point::new(300.0, 200.0));
    }
    session.frame(PointerInput::hover_at(Point::new(10.0, 300.0)));
    session.frame(PointerInput::hover_at(Point::new(10.0, 300.0)));
    session.report("after moving the window back inside");

    // Drop onto the right zone of the Tools leaf (x in [0, 398]).
    if let Some(grab) = title(&session) {
        session.drag(grab, Point::new(239.0, 300.0), 6);
    }
    session.report("after docking Log next to Tools");
}
