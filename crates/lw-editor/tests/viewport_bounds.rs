//! Integration tests: viewport transform and canvas bounds with content at
//! negative coordinates.

use kurbo::{Point, Size, Vec2};
use lw_core::{Node, NodeId};
use lw_editor::{AuthorityEvent, Editor, EditorConfig, Effect, Gesture, InputEvent, Intent, Modifiers};
use pretty_assertions::assert_eq;

fn editor() -> (Editor, Vec<Effect>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut editor = Editor::new(EditorConfig::default(), Size::new(800.0, 600.0));
    let effects = editor.load(
        vec![
            Node::resource("vb_far", -200.0, -100.0),
            Node::resource("vb_near", 100.0, 100.0),
        ],
        vec![],
    );
    (editor, effects)
}

#[test]
fn negative_content_shifts_origin() {
    let (editor, effects) = editor();
    let layout = editor.surface_layout();
    assert_eq!(layout.origin_offset, Vec2::new(250.0, 150.0));
    assert!(effects.iter().any(|e| matches!(e, Effect::Resize(u) if u.layout == layout)));
    // Content spans -200..240 x -100..180, plus padding on both sides.
    assert_eq!(layout.size, Size::new(800.0, 600.0));
}

#[test]
fn pointer_hits_shifted_nodes() {
    let (mut editor, _) = editor();
    let effects = editor.handle_input(InputEvent::PointerDown {
        x: 60.0,
        y: 60.0,
        modifiers: Modifiers::NONE,
    });
    assert!(effects.contains(&Effect::Send(Intent::NodesSelected {
        node_ids: vec![NodeId::intern("vb_far")]
    })));
}

#[test]
fn graph_screen_round_trip_under_zoom_and_pan() {
    let (mut editor, _) = editor();
    editor.handle_input(InputEvent::Wheel { delta_y: -3.0, modifiers: Modifiers::CTRL });
    editor.handle_input(InputEvent::key("ArrowRight", Modifiers::SHIFT));
    let offset = editor.surface_layout().origin_offset;
    let viewport = editor.viewport();
    let p = Point::new(-137.5, 42.25);
    let back = viewport.screen_to_graph(viewport.graph_to_screen(p, offset), offset);
    assert!((back - p).hypot() < 1e-9);
    assert_eq!(editor.screen_to_graph(viewport.graph_to_screen(p, offset)).round(), p.round());
}

#[test]
fn zoom_clamps() {
    let (mut editor, _) = editor();
    for _ in 0..100 {
        editor.handle_input(InputEvent::key("+", Modifiers::SHIFT));
    }
    assert_eq!(editor.viewport().zoom(), 3.0);
    for _ in 0..100 {
        editor.handle_input(InputEvent::key("-", Modifiers::NONE));
    }
    assert_eq!(editor.viewport().zoom(), 0.1);
}

#[test]
fn drag_defers_bounds_until_release() {
    let (mut editor, _) = editor();
    editor.handle_input(InputEvent::Scroll { left: 30.0, top: 10.0 });
    // vb_near sits at screen (350, 250).
    editor.handle_input(InputEvent::PointerDown { x: 360.0, y: 260.0, modifiers: Modifiers::NONE });
    let moving = editor.handle_input(InputEvent::PointerMove {
        x: 360.0,
        y: 1260.0,
        modifiers: Modifiers::NONE,
    });
    assert!(!moving.iter().any(|e| matches!(e, Effect::Resize(_))));

    let done = editor.handle_input(InputEvent::PointerUp {
        x: 360.0,
        y: 1260.0,
        modifiers: Modifiers::NONE,
    });
    let update = done
        .iter()
        .find_map(|e| match e {
            Effect::Resize(u) => Some(*u),
            _ => None,
        })
        .expect("bounds recomputed at drag end");
    assert_eq!(update.restore_scroll, Point::new(30.0, 10.0));
    assert!(update.layout.size.height > 1100.0);
}

fn resize_of(effects: &[Effect]) -> Option<lw_editor::BoundsUpdate> {
    effects.iter().find_map(|e| match e {
        Effect::Resize(u) => Some(*u),
        _ => None,
    })
}

#[test]
fn canvas_cleared_mid_drag_resumes_bounds() {
    let (mut editor, _) = editor();
    editor.handle_input(InputEvent::PointerDown { x: 360.0, y: 260.0, modifiers: Modifiers::NONE });
    editor.handle_input(InputEvent::PointerMove { x: 420.0, y: 300.0, modifiers: Modifiers::NONE });

    let cleared = editor.handle_authority(AuthorityEvent::CanvasCleared);
    assert_eq!(resize_of(&cleared).map(|u| u.layout.origin_offset), Some(Vec2::ZERO));
    assert_eq!(editor.gesture(), &Gesture::Idle);
    editor.handle_input(InputEvent::PointerUp { x: 420.0, y: 300.0, modifiers: Modifiers::NONE });

    let refreshed = editor.handle_authority(AuthorityEvent::NodesUpdated {
        nodes: vec![Node::resource("vb_late", -500.0, -300.0)],
        edges: None,
    });
    let update = resize_of(&refreshed).expect("bounds follow new content");
    assert_eq!(update.layout.origin_offset, Vec2::new(550.0, 350.0));
    assert_eq!(editor.surface_layout().origin_offset, Vec2::new(550.0, 350.0));
}

#[test]
fn growth_outside_drags_restores_scroll() {
    let (mut editor, _) = editor();
    editor.handle_input(InputEvent::Scroll { left: 120.0, top: 40.0 });
    let effects = editor.handle_authority(AuthorityEvent::NodesUpdated {
        nodes: vec![
            Node::resource("vb_far", -200.0, -100.0),
            Node::resource("vb_near", 100.0, 100.0),
            Node::resource("vb_east", 1500.0, 900.0),
        ],
        edges: None,
    });
    let update = resize_of(&effects).expect("surface grew");
    assert_eq!(update.restore_scroll, Point::new(120.0, 40.0));
    assert!(update.layout.size.width > 1500.0);
}
