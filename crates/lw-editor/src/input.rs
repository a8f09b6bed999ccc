//! Platform-neutral input events.
//!
//! Pointer coordinates are surface pixels: relative to the top-left of the
//! drawable surface, scroll included. The editor converts to graph space.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Ctrl on Linux/Windows, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What kind of palette entry was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKind {
    Project,
    Composite,
}

/// Drag payload from the palette: `{"type": "project", "id": "12"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteItem {
    #[serde(rename = "type")]
    pub kind: PaletteKind,
    #[serde(deserialize_with = "id_text")]
    pub id: String,
}

fn id_text<'de, D: serde::Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }
    Ok(match Raw::deserialize(d)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },
    DoubleClick {
        x: f64,
        y: f64,
    },
    /// Wheel with `delta_y > 0` meaning scroll down.
    Wheel {
        delta_y: f64,
        modifiers: Modifiers,
    },
    Key {
        key: String,
        modifiers: Modifiers,
    },
    Drop {
        item: PaletteItem,
        x: f64,
        y: f64,
    },
    /// Host scroll position of the surface container.
    Scroll {
        left: f64,
        top: f64,
    },
    /// Host viewport (visible area) resized.
    Resize {
        width: f64,
        height: f64,
    },
}

impl InputEvent {
    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        InputEvent::Key {
            key: key.to_owned(),
            modifiers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_payload_accepts_numeric_ids() {
        let item: PaletteItem = serde_json::from_str(r#"{"type":"composite","id":5}"#).unwrap();
        assert_eq!(item.kind, PaletteKind::Composite);
        assert_eq!(item.id, "5");
    }

    #[test]
    fn command_covers_ctrl_and_meta() {
        assert!(Modifiers::CTRL.command());
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.command());
        assert!(!Modifiers::SHIFT.command());
    }
}
