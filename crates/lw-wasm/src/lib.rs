//! WASM bridge for the living-web editor: exposes the Rust engine to the
//! browser page.
//!
//! Compiled via `wasm-pack build --target web`. The page forwards DOM events
//! to [`LwCanvas`], drains outbound intents and notices as JSON, and sends
//! authority replies back through [`LwCanvas::receive`].

mod render2d;

use lw_core::wire::{decode_edges, decode_nodes};
use lw_core::{EdgeId, NodeId};
use lw_editor::{
    BoundsUpdate, Editor, EditorConfig, Effect, InputEvent, Intent, Modifiers, Notice, PaletteItem,
    Suggestion, SurfaceLayout,
};
use lw_render::svg::SvgSurface;
use lw_render::{Theme, replay};
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The browser-facing editor controller.
///
/// Every handler returns `true` when the canvas needs a redraw. Outbound
/// traffic queues up until the page drains it.
#[wasm_bindgen]
pub struct LwCanvas {
    editor: Editor,
    intents: Vec<Intent>,
    notices: Vec<Notice>,
    resize: Option<BoundsUpdate>,
    suggestions: Option<Vec<Suggestion>>,
}

#[wasm_bindgen]
impl LwCanvas {
    /// Create a controller for a viewport of the given size. `config_json`
    /// may be a partial `EditorConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: Option<String>) -> Self {
        init_logging();
        console_error_panic_hook_setup();

        let config = match config_json.as_deref().map(EditorConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                log::warn!("config: {e}; using defaults");
                EditorConfig::default()
            }
            None => EditorConfig::default(),
        };
        Self {
            editor: Editor::new(config, kurbo::Size::new(width, height)),
            intents: Vec::new(),
            notices: Vec::new(),
            resize: None,
            suggestions: None,
        }
    }

    /// Load the initial graph. Both arguments accept a list or an id-keyed
    /// map. Returns `false` if either is not valid JSON.
    pub fn load(&mut self, nodes_json: &str, edges_json: &str) -> bool {
        let (Ok(nodes), Ok(edges)) = (
            serde_json::from_str::<Value>(nodes_json),
            serde_json::from_str::<Value>(edges_json),
        ) else {
            log::warn!("load: invalid JSON");
            return false;
        };
        let nodes = lw_core::wire::or_empty("nodes", decode_nodes(&nodes));
        let edges = lw_core::wire::or_empty("edges", decode_edges(&edges));
        let effects = self.editor.load(nodes, edges);
        self.apply(effects)
    }

    /// Apply an authority `{"event", "payload"}` message.
    pub fn receive(&mut self, event_json: &str) -> bool {
        match self.editor.receive(event_json) {
            Ok(effects) => self.apply(effects),
            Err(e) => {
                log::warn!("sync: {e}");
                false
            }
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle_pointer_down(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        self.input(InputEvent::PointerDown { x, y, modifiers })
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        self.input(InputEvent::PointerMove { x, y, modifiers })
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        self.input(InputEvent::PointerUp { x, y, modifiers })
    }

    pub fn handle_double_click(&mut self, x: f64, y: f64) -> bool {
        self.input(InputEvent::DoubleClick { x, y })
    }

    /// Returns `true` if the wheel zoomed; the page should then
    /// `preventDefault` and redraw.
    pub fn handle_wheel(&mut self, delta_y: f64, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        self.input(InputEvent::Wheel { delta_y, modifiers })
    }

    /// `key` is `KeyboardEvent.key`.
    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        self.input(InputEvent::key(key, modifiers(shift, ctrl, alt, meta)))
    }

    /// Drop a palette item (`{"type": "project"|"composite", "id": ...}`)
    /// at surface coordinates.
    pub fn handle_drop(&mut self, item_json: &str, x: f64, y: f64) -> bool {
        match serde_json::from_str::<PaletteItem>(item_json) {
            Ok(item) => self.input(InputEvent::Drop { item, x, y }),
            Err(e) => {
                log::warn!("drop: bad palette item: {e}");
                false
            }
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.input(InputEvent::Resize { width, height })
    }

    pub fn set_scroll(&mut self, left: f64, top: f64) {
        self.input(InputEvent::Scroll { left, top });
    }

    // ─── Outbound queues ─────────────────────────────────────────────────

    /// Drain queued intents as a JSON array of `{"event", "payload"}`.
    pub fn take_intents(&mut self) -> String {
        let out: Vec<Value> = self.intents.drain(..).map(|i| i.to_json()).collect();
        Value::Array(out).to_string()
    }

    /// Drain queued notices as a JSON array of `{"level", "message"}`.
    pub fn take_notices(&mut self) -> String {
        serde_json::to_string(&std::mem::take(&mut self.notices)).unwrap_or_else(|_| "[]".into())
    }

    /// Pending surface resize as JSON, or `null`. The page sizes its canvas
    /// and then scrolls back to `restore_scroll`.
    pub fn take_resize(&mut self) -> String {
        match self.resize.take() {
            Some(update) => json!({
                "layout": layout_json(&update.layout),
                "restore_scroll": json!({ "left": update.restore_scroll.x, "top": update.restore_scroll.y }),
            })
            .to_string(),
            None => "null".to_string(),
        }
    }

    /// Suggestions to show as a JSON array of `{"type", "priority",
    /// "description", "action"}`, or `null` if nothing new arrived.
    pub fn take_suggestions(&mut self) -> String {
        match self.suggestions.take() {
            Some(list) => serde_json::to_string(&list).unwrap_or_else(|_| "[]".into()),
            None => "null".to_string(),
        }
    }

    /// Current surface layout as JSON.
    pub fn surface_layout(&self) -> String {
        layout_json(&self.editor.surface_layout()).to_string()
    }

    pub fn toolbar_state(&self) -> String {
        serde_json::to_string(&self.editor.toolbar_state()).unwrap_or_else(|_| "{}".into())
    }

    pub fn pending_placement_count(&self) -> usize {
        self.editor.pending_placements().len()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Advance animations to `time_ms` and draw. Returns `true` while an
    /// animation is running, so the page keeps requesting frames.
    pub fn render(&mut self, ctx: &CanvasRenderingContext2d, time_ms: f64) -> bool {
        self.editor.tick(time_ms);
        let list = self.editor.display_list();
        replay(&list, &mut render2d::Canvas2dSurface::new(ctx));
        self.editor.is_animating()
    }

    /// The current diagram as a standalone SVG document.
    pub fn export_svg(&self) -> String {
        let mut surface = SvgSurface::new();
        replay(&self.editor.display_list(), &mut surface);
        surface.finish()
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.editor
            .set_theme(if is_dark { Theme::dark() } else { Theme::light() });
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    pub fn rename_node(&mut self, node_id: &str, name: &str) -> bool {
        let effects = self.editor.rename_node(NodeId::intern(node_id), name);
        self.apply(effects)
    }

    pub fn delete_selection(&mut self) -> bool {
        let effects = self.editor.delete_selection();
        self.apply(effects)
    }

    pub fn hide_selection(&mut self) -> bool {
        let effects = self.editor.hide_selection();
        self.apply(effects)
    }

    pub fn show_all(&mut self) -> bool {
        let effects = self.editor.show_all();
        self.apply(effects)
    }

    pub fn clear_canvas(&mut self) -> bool {
        let effects = self.editor.clear_canvas();
        self.apply(effects)
    }

    pub fn deselect_all(&mut self) -> bool {
        let effects = self.editor.deselect_all();
        self.apply(effects)
    }

    pub fn connect_selection(&mut self) -> bool {
        let effects = self.editor.connect_selection();
        self.apply(effects)
    }

    pub fn save_selection_as_system(&mut self, name: &str, description: &str, icon_name: Option<String>) -> bool {
        let effects = self.editor.save_selection_as_system(name, description, icon_name);
        self.apply(effects)
    }

    pub fn show_suggestions(&mut self) -> bool {
        let effects = self.editor.show_suggestions();
        self.apply(effects)
    }

    /// Apply an entry of the list last returned by `take_suggestions`.
    pub fn apply_suggestion(&mut self, index: usize) -> bool {
        let effects = self.editor.apply_suggestion(index);
        self.apply(effects)
    }

    /// Selected ids as JSON `{"nodes": [...], "edges": [...]}`.
    pub fn selection(&self) -> String {
        let sel = self.editor.store().selection();
        json!({
            "nodes": sel.nodes.iter().map(NodeId::as_str).collect::<Vec<_>>(),
            "edges": sel.edges.iter().map(EdgeId::as_str).collect::<Vec<_>>(),
        })
        .to_string()
    }
}

impl LwCanvas {
    fn input(&mut self, event: InputEvent) -> bool {
        let effects = self.editor.handle_input(event);
        self.apply(effects)
    }

    /// Queue outbound effects; report whether a redraw was requested.
    fn apply(&mut self, effects: Vec<Effect>) -> bool {
        let mut render = false;
        for effect in effects {
            match effect {
                Effect::Render => render = true,
                Effect::Send(intent) => self.intents.push(intent),
                Effect::Notify(notice) => self.notices.push(notice),
                Effect::Resize(update) => self.resize = Some(update),
                Effect::Suggestions(list) => self.suggestions = Some(list),
            }
        }
        render
    }
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn layout_json(layout: &SurfaceLayout) -> Value {
    json!({
        "width": layout.size.width,
        "height": layout.size.height,
        "offset_x": layout.origin_offset.x,
        "offset_y": layout.origin_offset.y,
        "scroll_x": layout.scroll_x,
        "scroll_y": layout.scroll_y,
    })
}

// ─── Logging & panic hook ────────────────────────────────────────────────

fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        // A second init fails harmlessly when several canvases exist.
        let _ = console_log::init_with_level(log::Level::Info);
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("living-web editor panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn canvas() -> LwCanvas {
        let mut canvas = LwCanvas::new(800.0, 600.0, Some(r#"{"grid_size": 10}"#.to_owned()));
        assert!(canvas.load(
            r#"[{"id": "w1", "x": 0, "y": 0}, {"id": 2, "x": 300, "y": 0}]"#,
            r#"{"e1": {"source_id": "w1", "target_id": 2}}"#,
        ));
        canvas
    }

    #[test]
    fn load_and_select_all() {
        let mut canvas = canvas();
        assert!(canvas.handle_key("a", false, true, false, false));
        let intents: Value = serde_json::from_str(&canvas.take_intents()).unwrap();
        assert_eq!(
            intents,
            json!([{ "event": "nodes_selected", "payload": { "node_ids": ["w1", "2"] } }])
        );
        assert_eq!(canvas.take_intents(), "[]");

        let toolbar: Value = serde_json::from_str(&canvas.toolbar_state()).unwrap();
        assert_eq!(toolbar["can_connect"], json!(true));
    }

    #[test]
    fn bad_inputs_are_rejected() {
        let mut canvas = canvas();
        assert!(!canvas.load("not json", "[]"));
        assert!(!canvas.receive(r#"{"event": "nope"}"#));
        assert!(!canvas.handle_drop(r#"{"type": "spaceship", "id": 1}"#, 10.0, 10.0));
    }

    #[test]
    fn connect_selection_without_selection_notifies() {
        let mut canvas = canvas();
        canvas.connect_selection();
        let notices: Value = serde_json::from_str(&canvas.take_notices()).unwrap();
        assert_eq!(notices[0]["level"], json!("info"));
    }

    #[test]
    fn first_load_reports_layout() {
        let mut canvas = canvas();
        let resize: Value = serde_json::from_str(&canvas.take_resize()).unwrap();
        assert_eq!(resize["layout"]["width"], json!(800.0));
        assert_eq!(resize["layout"]["offset_x"], json!(0.0));
        assert_eq!(resize["restore_scroll"], json!({"left": 0.0, "top": 0.0}));
        assert_eq!(canvas.take_resize(), "null");

        let layout: Value = serde_json::from_str(&canvas.surface_layout()).unwrap();
        assert_eq!(layout, resize["layout"]);
    }

    #[test]
    fn suggestions_flow_through_the_bridge() {
        let mut canvas = canvas();
        canvas.show_suggestions();
        assert_eq!(
            serde_json::from_str::<Value>(&canvas.take_intents()).unwrap(),
            json!([{"event": "show_suggestions"}])
        );

        assert!(canvas.receive(
            r#"{"event":"suggestions_loaded","payload":{"suggestions":[{"type":"add_storage","priority":"low","description":"Add a cistern","action":{"project_id":12}}]}}"#
        ));
        let shown: Value = serde_json::from_str(&canvas.take_suggestions()).unwrap();
        assert_eq!(shown[0]["description"], json!("Add a cistern"));
        assert_eq!(canvas.take_suggestions(), "null");

        canvas.apply_suggestion(0);
        assert_eq!(
            serde_json::from_str::<Value>(&canvas.take_intents()).unwrap(),
            json!([{"event": "apply_suggestion", "payload": {"type": "add_storage", "action": {"project_id": 12}}}])
        );
        canvas.apply_suggestion(0);
        assert_eq!(canvas.take_intents(), "[]");
    }

    #[test]
    fn svg_export_contains_edge() {
        let canvas = canvas();
        let svg = canvas.export_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<path"));
    }
}
