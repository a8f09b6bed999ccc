//! Integration tests: port-to-port connection gestures through the editor.
//!
//! Pointer events go in; the intents and notices that come out are checked.
//! Nodes sit at positive coordinates at zoom 1, so surface pixels equal
//! graph units.

use kurbo::Size;
use lw_core::{Node, NodeId};
use lw_editor::{
    ConnectError, Editor, EditorConfig, Effect, Gesture, InputEvent, Intent, Modifiers, NoticeLevel,
};
use pretty_assertions::assert_eq;

// Output ports sit on the right edge (x + 140), the first row at y + 45,
// the second at y + 63. Inputs mirror them on the left edge.

fn editor() -> Editor {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut editor = Editor::new(EditorConfig::default(), Size::new(800.0, 600.0));
    editor.load(
        vec![
            Node::resource("pump", 0.0, 0.0)
                .with_inputs(["water"])
                .with_outputs(["water"]),
            Node::resource("garden", 300.0, 0.0).with_inputs(["water", "sunlight"]),
        ],
        vec![],
    );
    editor
}

fn down(editor: &mut Editor, x: f64, y: f64) -> Vec<Effect> {
    editor.handle_input(InputEvent::PointerDown { x, y, modifiers: Modifiers::NONE })
}

fn mv(editor: &mut Editor, x: f64, y: f64) -> Vec<Effect> {
    editor.handle_input(InputEvent::PointerMove { x, y, modifiers: Modifiers::NONE })
}

fn up(editor: &mut Editor, x: f64, y: f64) -> Vec<Effect> {
    editor.handle_input(InputEvent::PointerUp { x, y, modifiers: Modifiers::NONE })
}

fn intents(effects: &[Effect]) -> Vec<Intent> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Send(i) => Some(i.clone()),
            _ => None,
        })
        .collect()
}

fn water_edge() -> Intent {
    Intent::EdgeAdded {
        source_id: NodeId::intern("pump"),
        target_id: NodeId::intern("garden"),
        source_port: Some("water".into()),
        target_port: Some("water".into()),
    }
}

#[test]
fn drag_water_to_water_emits_one_edge() {
    let mut editor = editor();
    let mut all = down(&mut editor, 140.0, 45.0);
    all.extend(mv(&mut editor, 220.0, 40.0));
    assert!(!editor.display_list().items.is_empty());
    all.extend(up(&mut editor, 300.0, 45.0));

    assert_eq!(intents(&all), vec![water_edge()]);
    assert_eq!(editor.gesture(), &Gesture::Idle);
}

#[test]
fn drag_water_to_sunlight_is_rejected_with_notice() {
    let mut editor = editor();
    down(&mut editor, 140.0, 45.0);
    mv(&mut editor, 220.0, 60.0);
    let effects = up(&mut editor, 300.0, 63.0);

    assert!(intents(&effects).is_empty());
    let notice = effects
        .iter()
        .find_map(|e| match e {
            Effect::Notify(n) => Some(n.clone()),
            _ => None,
        })
        .expect("mismatch notice");
    assert_eq!(notice.level, NoticeLevel::Blocking);
    assert_eq!(
        notice.message,
        ConnectError::PortMismatch {
            source_port: "water".into(),
            target_port: "sunlight".into(),
        }
        .to_string()
    );
    assert_eq!(editor.gesture(), &Gesture::Idle);
}

#[test]
fn drag_released_on_canvas_cancels() {
    let mut editor = editor();
    down(&mut editor, 140.0, 45.0);
    mv(&mut editor, 220.0, 300.0);
    let effects = up(&mut editor, 220.0, 300.0);
    assert!(intents(&effects).is_empty());
    assert_eq!(editor.gesture(), &Gesture::Idle);
}

#[test]
fn click_then_click_connects() {
    let mut editor = editor();
    down(&mut editor, 140.0, 45.0);
    up(&mut editor, 141.0, 45.0);
    match editor.gesture() {
        Gesture::Connecting(_) => {}
        other => panic!("expected a selected source, got {other:?}"),
    }

    let effects = down(&mut editor, 300.0, 45.0);
    assert_eq!(intents(&effects), vec![water_edge()]);
    up(&mut editor, 300.0, 45.0);
    assert_eq!(editor.gesture(), &Gesture::Idle);
}

#[test]
fn clicking_the_source_again_toggles_off() {
    let mut editor = editor();
    down(&mut editor, 140.0, 45.0);
    up(&mut editor, 140.0, 45.0);
    let effects = down(&mut editor, 140.0, 45.0);
    assert!(intents(&effects).is_empty());
    assert_eq!(editor.gesture(), &Gesture::Idle);
}

#[test]
fn self_loop_is_rejected_silently() {
    let mut editor = editor();
    down(&mut editor, 140.0, 45.0);
    up(&mut editor, 140.0, 45.0);
    let effects = down(&mut editor, 0.0, 45.0);
    assert!(intents(&effects).is_empty());
    assert!(!effects.iter().any(|e| matches!(e, Effect::Notify(_))));
    assert_eq!(editor.gesture(), &Gesture::Idle);
}

#[test]
fn escape_cancels_connection_and_deselects() {
    let mut editor = editor();
    down(&mut editor, 140.0, 45.0);
    up(&mut editor, 140.0, 45.0);
    let effects = editor.handle_input(InputEvent::key("Escape", Modifiers::NONE));
    assert_eq!(intents(&effects), vec![Intent::DeselectAll]);
    assert_eq!(editor.gesture(), &Gesture::Idle);
}

#[test]
fn click_then_incompatible_input_notifies() {
    let mut editor = editor();
    down(&mut editor, 140.0, 45.0);
    up(&mut editor, 140.0, 45.0);

    let effects = down(&mut editor, 300.0, 63.0);
    assert!(intents(&effects).is_empty());
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Notify(n) if n.level == NoticeLevel::Blocking && n.message.contains("sunlight")
    )));
    assert_eq!(editor.gesture(), &Gesture::Idle);
    up(&mut editor, 300.0, 63.0);
    assert_eq!(editor.gesture(), &Gesture::Idle);
}
