//! The editor state machine.
//!
//! One owned [`Editor`] holds the graph store, viewport, canvas bounds, the
//! current gesture and pending placements. Every handler runs to completion
//! and returns the [`Effect`]s the host must carry out: redraw, send an
//! intent to the authority, show a notice, or resize the surface.

use crate::bounds::{BoundsUpdate, CanvasBounds, SurfaceLayout};
use crate::config::EditorConfig;
use crate::connect::{ConnectMode, ConnectOutcome, Connection, check_compatible};
use crate::drag::DragSession;
use crate::error::{ConnectError, EditorError, SyncError};
use crate::fade::FadeSchedule;
use crate::input::{InputEvent, Modifiers, PaletteItem, PaletteKind};
use crate::placement::find_free_position;
use crate::selection::{self, Marquee, ToolbarState};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::sync::{AuthorityEvent, Intent, PendingPlacement, PendingPlacements, Suggestion};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size};
use lw_core::layout::{composite_frames, node_geometry};
use lw_core::{Edge, GraphStore, Node, NodeId, PortRef, PortSide, resolve_layout};
use lw_render::{DisplayList, GeometricHitTester, Hit, HitTester, PaintInput, Theme, build_display_list};
use serde::Serialize;

// ─── Effects ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    /// Shown as a dialog by the host.
    Blocking,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn blocking(error: &EditorError) -> Self {
        Self {
            level: NoticeLevel::Blocking,
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Render,
    Send(Intent),
    Notify(Notice),
    Resize(BoundsUpdate),
    /// Show the suggestions panel.
    Suggestions(Vec<Suggestion>),
}

// ─── Gestures ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Connecting(Connection),
    Dragging(DragSession),
    Marquee(Marquee),
}

// ─── Editor ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    store: GraphStore,
    viewport: Viewport,
    bounds: CanvasBounds,
    gesture: Gesture,
    fades: FadeSchedule,
    pending: PendingPlacements,
    /// Last list shown; cleared once one is applied.
    suggestions: Vec<Suggestion>,
    theme: Theme,
}

impl Editor {
    pub fn new(config: EditorConfig, viewport_size: Size) -> Self {
        Self {
            viewport: Viewport::from_config(&config),
            bounds: CanvasBounds::new(viewport_size, &config),
            config,
            store: GraphStore::new(),
            gesture: Gesture::Idle,
            fades: FadeSchedule::default(),
            pending: PendingPlacements::default(),
            suggestions: Vec::new(),
            theme: Theme::default(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn surface_layout(&self) -> SurfaceLayout {
        self.bounds.layout()
    }

    pub fn pending_placements(&self) -> &PendingPlacements {
        &self.pending
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        ToolbarState::from_store(&self.store)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Seed the store with an initial payload. Equivalent to `nodes_updated`.
    pub fn load(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Vec<Effect> {
        self.store.replace_nodes(nodes);
        self.store.replace_edges(edges);
        log::info!(
            "editor: loaded {} nodes, {} edges",
            self.store.nodes().len(),
            self.store.edges().len()
        );
        let mut effects = Vec::new();
        self.after_mutation(&mut effects);
        effects
    }

    // ─── Coordinates & hit testing ───────────────────────────────────────

    pub fn screen_to_graph(&self, screen: Point) -> Point {
        self.viewport
            .screen_to_graph(screen, self.bounds.layout().origin_offset)
    }

    fn hit_at(&self, graph: Point) -> Hit {
        let layouts = resolve_layout(&self.store);
        let frames = composite_frames(&self.store, &layouts, self.config.frame_padding);
        GeometricHitTester {
            store: &self.store,
            layouts: &layouts,
            frames: &frames,
            edge_tolerance: self.viewport.screen_len_to_graph(self.config.edge_tolerance),
        }
        .hit(graph)
    }

    fn hit_rect(&self, rect: Rect) -> Vec<NodeId> {
        let layouts = resolve_layout(&self.store);
        GeometricHitTester {
            store: &self.store,
            layouts: &layouts,
            frames: &[],
            edge_tolerance: 0.0,
        }
        .hit_rect(rect)
    }

    /// Rectangles of visible, non-placeholder nodes.
    fn content_rects(&self) -> Vec<Rect> {
        self.store
            .visible_nodes()
            .filter(|n| !n.placeholder)
            .map(|n| node_geometry(n).rect)
            .collect()
    }

    /// Bounds recompute plus a redraw; called after every store mutation.
    fn after_mutation(&mut self, effects: &mut Vec<Effect>) {
        let rects = self.content_rects();
        if let Some(update) = self.bounds.recompute(&rects) {
            effects.push(Effect::Resize(update));
        }
        effects.push(Effect::Render);
    }

    fn send(effects: &mut Vec<Effect>, intent: Intent) {
        log::debug!("sync: -> {}", intent.name());
        effects.push(Effect::Send(intent));
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: InputEvent) -> Vec<Effect> {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => self.pointer_down(Point::new(x, y), modifiers),
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Point::new(x, y)),
            InputEvent::PointerUp { x, y, .. } => self.pointer_up(Point::new(x, y)),
            InputEvent::DoubleClick { x, y } => self.double_click(Point::new(x, y)),
            InputEvent::Wheel { delta_y, modifiers } => self.wheel(delta_y, modifiers),
            InputEvent::Key { key, modifiers } => self.key(&key, modifiers),
            InputEvent::Drop { item, x, y } => self.drop_item(item, Point::new(x, y)),
            InputEvent::Scroll { left, top } => {
                self.bounds.set_scroll(Point::new(left, top));
                Vec::new()
            }
            InputEvent::Resize { width, height } => {
                self.bounds.set_viewport(Size::new(width, height));
                let mut effects = Vec::new();
                self.after_mutation(&mut effects);
                effects
            }
        }
    }

    fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) -> Vec<Effect> {
        let graph = self.screen_to_graph(screen);
        let hit = self.hit_at(graph);
        let mut effects = Vec::new();

        match std::mem::take(&mut self.gesture) {
            Gesture::Connecting(conn) if conn.mode == ConnectMode::Click => match &hit {
                Hit::Port(port) if port.side == PortSide::Input => {
                    self.finish_connection(conn.click_port(port), &mut effects);
                    effects.push(Effect::Render);
                    return effects;
                }
                Hit::Port(port) if *port == conn.source => {
                    log::debug!("connect: source deselected");
                    return vec![Effect::Render];
                }
                // A different output re-targets below; anything else cancels
                // and proceeds as an ordinary press.
                _ => log::debug!("connect: cancelled by press elsewhere"),
            },
            Gesture::Dragging(drag) => {
                // Lost pointer-up; settle the stale drag first.
                drag.cancel(&mut self.store);
                self.resume_bounds(&mut effects);
            }
            _ => {}
        }

        match hit {
            Hit::Port(port) if port.side == PortSide::Output => {
                self.gesture = Gesture::Connecting(Connection::press(port, screen, graph));
            }
            Hit::Port(PortRef { node, .. }) | Hit::Node(node) => {
                self.press_node(node, screen, graph, modifiers.shift, &mut effects);
            }
            Hit::NodeInfo(node_id) => {
                if self.store.node(node_id).is_some_and(|n| !n.placeholder) {
                    Self::send(&mut effects, Intent::NodeInfoClicked { node_id });
                }
            }
            Hit::FrameHeader(_) => {}
            Hit::Edge(id) => {
                if let Some(intent) = selection::select_edge(&mut self.store, id) {
                    Self::send(&mut effects, intent);
                }
            }
            Hit::PotentialEdge(index) => self.accept_potential(index, &mut effects),
            Hit::Canvas => {
                self.gesture = Gesture::Marquee(Marquee::new(graph, modifiers.shift));
            }
        }
        effects.push(Effect::Render);
        effects
    }

    fn press_node(
        &mut self,
        id: NodeId,
        screen: Point,
        graph: Point,
        shift: bool,
        effects: &mut Vec<Effect>,
    ) {
        if self.store.node(id).is_none_or(|n| n.placeholder) {
            return;
        }
        let press = selection::press_node(&mut self.store, id, shift);
        if let Some(intent) = press.intent {
            Self::send(effects, intent);
        }
        if press.selected {
            self.gesture = Gesture::Dragging(DragSession::begin(
                &self.store,
                id,
                screen,
                graph,
                press.narrow_on_click,
            ));
        }
    }

    fn accept_potential(&mut self, index: usize, effects: &mut Vec<Effect>) {
        let Some(potential) = self.store.potential_edges().get(index) else {
            return;
        };
        let source = PortRef::output(potential.source, potential.resource_type.clone());
        let target = PortRef::input(potential.target, potential.resource_type.clone());
        let outcome = match check_compatible(&source, &target) {
            Ok(()) => ConnectOutcome::Connected(Intent::EdgeAdded {
                source_id: source.node,
                target_id: target.node,
                source_port: Some(source.port),
                target_port: Some(target.port),
            }),
            Err(e) => ConnectOutcome::Rejected(e),
        };
        self.finish_connection(outcome, effects);
    }

    fn pointer_move(&mut self, screen: Point) -> Vec<Effect> {
        let graph = self.screen_to_graph(screen);
        let threshold = self.config.drag_threshold;
        let redraw = match &mut self.gesture {
            Gesture::Idle => false,
            Gesture::Connecting(conn) => conn.pointer_move(screen, graph, threshold),
            Gesture::Dragging(drag) => {
                let moved = drag.update(&mut self.store, screen, graph, threshold);
                if moved {
                    self.bounds.suspend();
                }
                moved
            }
            Gesture::Marquee(marquee) => {
                marquee.current = graph;
                true
            }
        };
        if redraw { vec![Effect::Render] } else { Vec::new() }
    }

    fn pointer_up(&mut self, screen: Point) -> Vec<Effect> {
        let graph = self.screen_to_graph(screen);
        let mut effects = Vec::new();
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => return effects,
            Gesture::Connecting(mut conn) => {
                let target = match self.hit_at(graph) {
                    Hit::Port(port) if port.side == PortSide::Input => Some(port),
                    _ => None,
                };
                match conn.release(target.as_ref()) {
                    ConnectOutcome::Pending => self.gesture = Gesture::Connecting(conn),
                    outcome => self.finish_connection(outcome, &mut effects),
                }
            }
            Gesture::Dragging(drag) => {
                if !drag.moved() && drag.narrow_on_click {
                    if let Some(intent) = selection::narrow_to(&mut self.store, drag.pressed()) {
                        Self::send(&mut effects, intent);
                    }
                }
                for intent in drag.finish(&mut self.store, self.config.grid_size) {
                    Self::send(&mut effects, intent);
                }
                self.resume_bounds(&mut effects);
            }
            Gesture::Marquee(marquee) => {
                let slack = self.viewport.screen_len_to_graph(self.config.drag_threshold);
                let rect = marquee.rect();
                let intent = if rect.width() <= slack && rect.height() <= slack {
                    // A plain click on empty canvas.
                    (!marquee.additive && !self.store.selection().is_empty())
                        .then(|| selection::deselect_all(&mut self.store))
                } else {
                    let hits = self.hit_rect(rect);
                    marquee.finish(&mut self.store, hits)
                };
                if let Some(intent) = intent {
                    Self::send(&mut effects, intent);
                }
            }
        }
        effects.push(Effect::Render);
        effects
    }

    fn resume_bounds(&mut self, effects: &mut Vec<Effect>) {
        if self.bounds.is_suspended() {
            let rects = self.content_rects();
            if let Some(update) = self.bounds.resume(&rects) {
                effects.push(Effect::Resize(update));
            }
        }
    }

    fn finish_connection(&mut self, outcome: ConnectOutcome, effects: &mut Vec<Effect>) {
        self.gesture = Gesture::Idle;
        match outcome {
            ConnectOutcome::Connected(intent) => Self::send(effects, intent),
            ConnectOutcome::Rejected(err) => self.report_connect(err, effects),
            ConnectOutcome::Cancelled => log::debug!("connect: cancelled"),
            ConnectOutcome::Pending => {}
        }
    }

    fn report_connect(&self, err: ConnectError, effects: &mut Vec<Effect>) {
        match err {
            ConnectError::SelfLoop { .. } => log::debug!("connect: {err}"),
            ConnectError::PortMismatch { .. } => {
                log::warn!("connect: {err}");
                effects.push(Effect::Notify(Notice::blocking(&err.into())));
            }
        }
    }

    fn double_click(&mut self, screen: Point) -> Vec<Effect> {
        let graph = self.screen_to_graph(screen);
        match self.hit_at(graph) {
            Hit::Node(id) => self.expand_composite(id),
            Hit::FrameHeader(id) => self.collapse_composite(id),
            _ => Vec::new(),
        }
    }

    fn wheel(&mut self, delta_y: f64, modifiers: Modifiers) -> Vec<Effect> {
        // Plain wheel scrolls the host container natively.
        if !modifiers.command() || delta_y == 0.0 {
            return Vec::new();
        }
        let factor = if delta_y < 0.0 {
            self.config.zoom_step
        } else {
            self.config.zoom_out_step()
        };
        if self.viewport.zoom_by(factor) {
            vec![Effect::Render]
        } else {
            Vec::new()
        }
    }

    fn key(&mut self, key: &str, modifiers: Modifiers) -> Vec<Effect> {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        match action {
            ShortcutAction::Undo => Self::send(&mut effects, Intent::Undo),
            ShortcutAction::Redo => Self::send(&mut effects, Intent::Redo),
            ShortcutAction::ToggleHelp => Self::send(&mut effects, Intent::ToggleKeyboardHelp),
            ShortcutAction::Delete => return self.delete_selection(),
            ShortcutAction::SelectAll => {
                Self::send(&mut effects, selection::select_all(&mut self.store));
                effects.push(Effect::Render);
            }
            ShortcutAction::Cancel => {
                self.cancel_gesture(&mut effects);
                Self::send(&mut effects, selection::deselect_all(&mut self.store));
                effects.push(Effect::Render);
            }
            ShortcutAction::ZoomIn => {
                self.viewport.zoom_by(self.config.zoom_step);
                effects.push(Effect::Render);
            }
            ShortcutAction::ZoomOut => {
                self.viewport.zoom_by(self.config.zoom_out_step());
                effects.push(Effect::Render);
            }
            ShortcutAction::ResetView => {
                self.viewport.reset();
                effects.push(Effect::Render);
            }
            ShortcutAction::Pan { dx, dy, fast } => {
                let step = if fast {
                    self.config.pan_step_fast
                } else {
                    self.config.pan_step
                };
                self.viewport.pan_by(f64::from(dx) * step, f64::from(dy) * step);
                effects.push(Effect::Render);
            }
        }
        effects
    }

    /// Drop the current gesture. A drag in progress snaps back.
    fn cancel_gesture(&mut self, effects: &mut Vec<Effect>) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging(drag) => {
                drag.cancel(&mut self.store);
                self.resume_bounds(effects);
            }
            Gesture::Idle => {}
            other => log::debug!("gesture: cancelled {other:?}"),
        }
    }

    fn drop_item(&mut self, item: PaletteItem, screen: Point) -> Vec<Effect> {
        let raw = self.screen_to_graph(screen);
        let existing: Vec<Point> = self
            .store
            .visible_nodes()
            .map(|n| n.position.to_point())
            .collect();
        let at = find_free_position(raw, &existing, &self.config);
        let placeholder = NodeId::placeholder();
        self.store.upsert_node(Node::placeholder(placeholder, at.into()));

        let intent = match item.kind {
            PaletteKind::Project => Intent::NodeAdded {
                project_id: item.id.clone(),
                x: at.x,
                y: at.y,
                placeholder_id: placeholder,
            },
            PaletteKind::Composite => Intent::CompositeNodeAdded {
                composite_id: item.id.clone(),
                x: at.x,
                y: at.y,
                placeholder_id: placeholder,
            },
        };
        self.pending.insert(PendingPlacement {
            placeholder,
            kind: item.kind,
            source_id: item.id,
            requested_at_ms: self.fades.now(),
        });

        let mut effects = Vec::new();
        Self::send(&mut effects, intent);
        self.after_mutation(&mut effects);
        effects
    }

    // ─── Composites ──────────────────────────────────────────────────────

    /// Ask the authority to expand a composite. No-op unless it is a
    /// collapsed composite.
    pub fn expand_composite(&mut self, id: NodeId) -> Vec<Effect> {
        let collapsed = self
            .store
            .node(id)
            .is_some_and(|n| n.is_composite() && !self.store.is_expanded(id));
        if !collapsed {
            return Vec::new();
        }
        let mut effects = Vec::new();
        Self::send(&mut effects, Intent::ExpandCompositeNode { node_id: id });
        effects
    }

    /// Ask the authority to collapse an expanded composite.
    pub fn collapse_composite(&mut self, id: NodeId) -> Vec<Effect> {
        if !self.store.is_expanded(id) {
            return Vec::new();
        }
        let mut effects = Vec::new();
        Self::send(&mut effects, Intent::CollapseCompositeNode { node_id: id });
        effects
    }

    fn reconcile(&mut self, nodes: Vec<Node>, edges: Option<Vec<Edge>>) {
        self.store.replace_nodes(nodes);
        if let Some(edges) = edges {
            self.store.replace_edges(edges);
        }
    }

    fn composite_expanded(&mut self, id: NodeId, nodes: Vec<Node>, edges: Vec<Edge>) {
        let outgoing = self
            .store
            .node(id)
            .filter(|_| self.store.is_visible(id))
            .cloned();
        self.store.set_expanded(id, true);
        self.reconcile(nodes, Some(edges));

        if let Some(node) = outgoing {
            self.fades.fade_out(node, 0.0, self.config.fade_out_ms);
        }
        let children: Vec<NodeId> = self.store.visible_children(id).map(|n| n.id).collect();
        for (i, child) in children.into_iter().enumerate() {
            self.fades
                .fade_in(child, i as f64 * self.config.fade_stagger_ms, self.config.fade_in_ms);
        }
    }

    fn composite_collapsed(&mut self, id: NodeId, nodes: Vec<Node>, edges: Vec<Edge>) {
        let outgoing: Vec<Node> = self.store.visible_children(id).cloned().collect();
        self.store.set_expanded(id, false);
        self.reconcile(nodes, Some(edges));

        for (i, child) in outgoing.into_iter().enumerate() {
            self.fades
                .fade_out(child, i as f64 * self.config.fade_stagger_ms, self.config.fade_out_ms);
        }
        if self.store.is_visible(id) {
            self.fades.fade_in(id, 0.0, self.config.fade_in_ms);
        }
    }

    // ─── Authority ───────────────────────────────────────────────────────

    /// Decode and apply an inbound `{"event", "payload"}` message.
    pub fn receive(&mut self, json: &str) -> Result<Vec<Effect>, SyncError> {
        let event = AuthorityEvent::from_json(json)?;
        Ok(self.handle_authority(event))
    }

    pub fn handle_authority(&mut self, event: AuthorityEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            AuthorityEvent::NodesUpdated { nodes, edges } => {
                log::info!("sync: nodes_updated ({} nodes)", nodes.len());
                self.reconcile(nodes, edges);
            }
            AuthorityEvent::EdgesUpdated { edges } | AuthorityEvent::EdgesReplaced { edges } => {
                log::info!("sync: {} edges", edges.len());
                self.store.replace_edges(edges);
            }
            AuthorityEvent::NodeAddedSuccess {
                placeholder_id,
                node,
            } => {
                if let Some(placeholder) = placeholder_id {
                    self.pending.take(placeholder);
                    self.store.remove_nodes_by_ids(&[placeholder]);
                }
                log::info!("sync: node {} added", node.id);
                self.store.upsert_node(node);
            }
            AuthorityEvent::NodeAddError {
                placeholder_id,
                message,
            } => {
                if let Some(placeholder) = placeholder_id {
                    self.pending.take(placeholder);
                    self.store.remove_nodes_by_ids(&[placeholder]);
                }
                let err = EditorError::PlacementFailure {
                    placeholder: placeholder_id,
                    message,
                };
                log::error!("sync: {err}");
                effects.push(Effect::Notify(Notice::blocking(&err)));
            }
            AuthorityEvent::CompositeExpanded { node_id, nodes, edges } => {
                log::info!("sync: composite {node_id} expanded");
                self.composite_expanded(node_id, nodes, edges);
            }
            AuthorityEvent::CompositeCollapsed { node_id, nodes, edges } => {
                log::info!("sync: composite {node_id} collapsed");
                self.composite_collapsed(node_id, nodes, edges);
            }
            AuthorityEvent::CompositeSystemSaved {
                success,
                message,
                nodes,
                edges,
            } => {
                if success {
                    if let Some(nodes) = nodes {
                        self.reconcile(nodes, edges);
                    } else if let Some(edges) = edges {
                        self.store.replace_edges(edges);
                    }
                    effects.push(Effect::Notify(Notice::info(
                        message.unwrap_or_else(|| "System saved".to_owned()),
                    )));
                } else {
                    let err = EditorError::Rejected(
                        message.unwrap_or_else(|| "Failed to save system".to_owned()),
                    );
                    log::warn!("sync: {err}");
                    effects.push(Effect::Notify(Notice::blocking(&err)));
                }
            }
            AuthorityEvent::SelectionCleared => self.store.selection_mut().clear(),
            AuthorityEvent::NodesSelected { node_ids } => {
                let known: Vec<NodeId> = node_ids
                    .into_iter()
                    .filter(|id| self.store.node(*id).is_some())
                    .collect();
                self.store.selection_mut().set_nodes(known);
            }
            AuthorityEvent::PotentialEdgesUpdated { potential_edges } => {
                self.store.replace_potential_edges(potential_edges);
            }
            AuthorityEvent::NodesDeleted { node_ids } => {
                let removed = self.store.remove_nodes_by_ids(&node_ids);
                log::info!("sync: {removed} nodes deleted");
            }
            AuthorityEvent::NodesHidden { node_ids } => self.store.set_hidden(&node_ids, true),
            AuthorityEvent::ShowAll { nodes } => {
                if nodes.is_empty() {
                    let all: Vec<NodeId> = self.store.nodes().iter().map(|n| n.id).collect();
                    self.store.set_hidden(&all, false);
                } else {
                    self.reconcile(nodes, None);
                }
            }
            AuthorityEvent::CanvasCleared => {
                self.store.clear();
                self.cancel_gesture(&mut effects);
                self.pending.clear();
                self.suggestions.clear();
                self.fades.clear();
                log::info!("sync: canvas cleared");
            }
            AuthorityEvent::ResetZoom => self.viewport.reset(),
            AuthorityEvent::SuggestionsLoaded { suggestions } => {
                log::info!("sync: {} suggestions", suggestions.len());
                if suggestions.is_empty() {
                    effects.push(Effect::Notify(Notice::info("No suggestions available at this time.")));
                } else {
                    effects.push(Effect::Suggestions(suggestions.clone()));
                }
                self.suggestions = suggestions;
            }
        }
        self.after_mutation(&mut effects);
        effects
    }

    // ─── Animation ───────────────────────────────────────────────────────

    /// Advance fades to `now_ms`. Renders while anything animates, plus one
    /// final frame when the last fade ends.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Effect> {
        let was_animating = self.fades.is_animating();
        let animating = self.fades.tick(now_ms);
        if was_animating || animating {
            vec![Effect::Render]
        } else {
            Vec::new()
        }
    }

    pub fn is_animating(&self) -> bool {
        self.fades.is_animating()
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    /// Set a custom display name. Blank or equal to the authority name
    /// clears it.
    pub fn rename_node(&mut self, id: NodeId, name: &str) -> Vec<Effect> {
        let Some(node) = self.store.node_mut(id) else {
            return Vec::new();
        };
        let trimmed = name.trim();
        let custom = (!trimmed.is_empty() && trimmed != node.name).then(|| trimmed.to_owned());
        let before = node.display_name().to_owned();
        node.custom_name = custom.clone();
        if node.display_name() == before {
            return Vec::new();
        }
        let mut effects = Vec::new();
        Self::send(
            &mut effects,
            Intent::NodeRenamed {
                node_id: id,
                custom_name: custom,
            },
        );
        effects.push(Effect::Render);
        effects
    }

    pub fn delete_selection(&mut self) -> Vec<Effect> {
        let sel = self.store.selection().clone();
        let mut effects = Vec::new();
        if !sel.nodes.is_empty() {
            Self::send(&mut effects, Intent::NodesDeleted { node_ids: sel.nodes });
        }
        if !sel.edges.is_empty() {
            Self::send(&mut effects, Intent::EdgesDeleted { edge_ids: sel.edges });
        }
        effects
    }

    pub fn hide_selection(&mut self) -> Vec<Effect> {
        let nodes = self.store.selection().nodes.clone();
        let mut effects = Vec::new();
        if !nodes.is_empty() {
            Self::send(&mut effects, Intent::NodesHidden { node_ids: nodes });
        }
        effects
    }

    pub fn show_all(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        Self::send(&mut effects, Intent::ShowAllNodes);
        effects
    }

    pub fn clear_canvas(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        Self::send(&mut effects, Intent::ClearCanvas);
        effects
    }

    pub fn show_suggestions(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        Self::send(&mut effects, Intent::ShowSuggestions);
        effects
    }

    /// Apply the `index`th suggestion of the last loaded list.
    pub fn apply_suggestion(&mut self, index: usize) -> Vec<Effect> {
        let Some(suggestion) = self.suggestions.get(index) else {
            log::warn!("suggestions: no entry {index}");
            return Vec::new();
        };
        let intent = suggestion.apply_intent();
        self.suggestions.clear();
        let mut effects = Vec::new();
        Self::send(&mut effects, intent);
        effects
    }

    pub fn deselect_all(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        Self::send(&mut effects, selection::deselect_all(&mut self.store));
        effects.push(Effect::Render);
        effects
    }

    /// Connect exactly two selected nodes, first selected as the source.
    pub fn connect_selection(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.store.selection().nodes.as_slice() {
            &[source_id, target_id] => Self::send(
                &mut effects,
                Intent::EdgeAdded {
                    source_id,
                    target_id,
                    source_port: None,
                    target_port: None,
                },
            ),
            _ => effects.push(Effect::Notify(Notice::info("Select exactly two nodes to connect"))),
        }
        effects
    }

    pub fn save_selection_as_system(
        &mut self,
        name: &str,
        description: &str,
        icon_name: Option<String>,
    ) -> Vec<Effect> {
        let nodes = self.store.selection().nodes.clone();
        if nodes.len() < 2 {
            return vec![Effect::Notify(Notice::info(
                "Select at least two nodes to save as a system",
            ))];
        }
        if name.trim().is_empty() {
            return vec![Effect::Notify(Notice::info("System name is required"))];
        }
        let mut effects = Vec::new();
        Self::send(
            &mut effects,
            Intent::SaveCompositeSystem {
                name: name.trim().to_owned(),
                description: description.trim().to_owned(),
                icon_name,
                node_ids: nodes,
            },
        );
        effects
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    pub fn display_list(&self) -> DisplayList {
        let layouts = resolve_layout(&self.store);
        let frames = composite_frames(&self.store, &layouts, self.config.frame_padding);
        let layout = self.bounds.layout();
        let opacity = self.fades.opacities();
        let ghosts = self.fades.ghosts();
        let (connection_source, rubber_band) = match &self.gesture {
            Gesture::Connecting(conn) => (Some(&conn.source), conn.rubber_band(&layouts)),
            _ => (None, None),
        };
        let marquee = match &self.gesture {
            Gesture::Marquee(m) => Some(m.rect()),
            _ => None,
        };
        build_display_list(&PaintInput {
            store: &self.store,
            layouts: &layouts,
            frames: &frames,
            size: layout.size,
            transform: self.viewport.transform(layout.origin_offset),
            theme: &self.theme,
            connection_source,
            rubber_band,
            marquee,
            opacity: &opacity,
            ghosts: &ghosts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn editor() -> Editor {
        let mut editor = Editor::new(EditorConfig::default(), Size::new(800.0, 600.0));
        editor.load(
            vec![
                Node::resource("ed_a", 0.0, 0.0),
                Node::resource("ed_b", 300.0, 0.0),
            ],
            vec![],
        );
        editor
    }

    fn sent(effects: &[Effect]) -> Vec<&Intent> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send(intent) => Some(intent),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rename_only_reports_visible_changes() {
        let mut editor = editor();
        let id = NodeId::intern("ed_a");
        let effects = editor.rename_node(id, "  Pond ");
        assert_eq!(
            sent(&effects),
            vec![&Intent::NodeRenamed {
                node_id: id,
                custom_name: Some("Pond".to_owned())
            }]
        );
        assert!(editor.rename_node(id, "Pond").is_empty());
        let effects = editor.rename_node(id, "");
        assert_eq!(
            sent(&effects),
            vec![&Intent::NodeRenamed {
                node_id: id,
                custom_name: None
            }]
        );
        assert!(editor.rename_node(id, "ed_a").is_empty());
    }

    #[test]
    fn connect_selection_needs_two_nodes() {
        let mut editor = editor();
        let effects = editor.connect_selection();
        assert!(matches!(effects[0], Effect::Notify(_)));

        editor.handle_input(InputEvent::key("a", Modifiers::CTRL));
        let effects = editor.connect_selection();
        assert_eq!(
            sent(&effects),
            vec![&Intent::EdgeAdded {
                source_id: NodeId::intern("ed_a"),
                target_id: NodeId::intern("ed_b"),
                source_port: None,
                target_port: None,
            }]
        );
    }

    #[test]
    fn save_system_validates_name() {
        let mut editor = editor();
        editor.handle_input(InputEvent::key("a", Modifiers::CTRL));
        let effects = editor.save_selection_as_system("   ", "", None);
        assert_eq!(effects, vec![Effect::Notify(Notice::info("System name is required"))]);
        let effects = editor.save_selection_as_system("Pond loop", "water cycle", Some("drop".into()));
        match &sent(&effects)[..] {
            [Intent::SaveCompositeSystem { name, node_ids, .. }] => {
                assert_eq!(name, "Pond loop");
                assert_eq!(node_ids.len(), 2);
            }
            other => panic!("expected save_composite_system, got {other:?}"),
        }
    }

    #[test]
    fn ctrl_wheel_zooms_plain_wheel_does_not() {
        let mut editor = editor();
        assert!(editor
            .handle_input(InputEvent::Wheel { delta_y: -1.0, modifiers: Modifiers::NONE })
            .is_empty());
        editor.handle_input(InputEvent::Wheel { delta_y: -1.0, modifiers: Modifiers::CTRL });
        assert!((editor.viewport().zoom() - 1.1).abs() < 1e-9);
        editor.handle_input(InputEvent::key("0", Modifiers::NONE));
        assert_eq!(editor.viewport().zoom(), 1.0);
    }

    #[test]
    fn arrow_keys_pan() {
        let mut editor = editor();
        editor.handle_input(InputEvent::key("ArrowUp", Modifiers::NONE));
        editor.handle_input(InputEvent::key("ArrowLeft", Modifiers::SHIFT));
        assert_eq!(editor.viewport().pan(), kurbo::Vec2::new(50.0, 10.0));
    }

    #[test]
    fn escape_deselects() {
        let mut editor = editor();
        editor.handle_input(InputEvent::key("a", Modifiers::CTRL));
        let effects = editor.handle_input(InputEvent::key("Escape", Modifiers::NONE));
        assert_eq!(sent(&effects), vec![&Intent::DeselectAll]);
        assert!(editor.store().selection().is_empty());
    }

    #[test]
    fn info_button_reports_without_selecting() {
        let mut editor = editor();
        // ed_a spans (0,0)-(140,80); its info button is (116,56)-(136,76).
        let effects = editor.handle_input(InputEvent::PointerDown {
            x: 126.0,
            y: 66.0,
            modifiers: Modifiers::NONE,
        });
        assert_eq!(
            sent(&effects),
            vec![&Intent::NodeInfoClicked { node_id: NodeId::intern("ed_a") }]
        );
        assert!(editor.store().selection().is_empty());
        assert_eq!(editor.gesture(), &Gesture::Idle);
    }

    #[test]
    fn empty_suggestions_notify_instead_of_showing() {
        let mut editor = editor();
        let effects = editor.handle_authority(AuthorityEvent::SuggestionsLoaded { suggestions: Vec::new() });
        assert!(effects.contains(&Effect::Notify(Notice::info("No suggestions available at this time."))));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Suggestions(_))));
        assert!(editor.apply_suggestion(0).is_empty());
    }
}
