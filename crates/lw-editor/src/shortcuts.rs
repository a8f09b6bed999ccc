//! Keyboard shortcut mapping.
//!
//! Maps `KeyboardEvent.key` plus modifiers to semantic [`ShortcutAction`]s,
//! so the binding table is shared by every host.

use crate::input::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── History (owned by the authority) ──
    Undo,
    Redo,

    // ── Edit ──
    Delete,
    SelectAll,
    /// Escape: cancel the gesture and deselect.
    Cancel,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ResetView,
    /// Pan by `(dx, dy)` steps; the editor multiplies by the configured step.
    Pan { dx: i8, dy: i8, fast: bool },

    // ── UI ──
    ToggleHelp,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event. `None` if the combination has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "z" | "Z" if modifiers.shift => Some(ShortcutAction::Redo),
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                _ => None,
            };
        }

        // `?`, `+` and `_` need Shift on most layouts, so Shift is not
        // checked for the single-key bindings.
        let fast = modifiers.shift;
        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Cancel),
            "?" => Some(ShortcutAction::ToggleHelp),
            "+" | "=" => Some(ShortcutAction::ZoomIn),
            "-" | "_" => Some(ShortcutAction::ZoomOut),
            "0" => Some(ShortcutAction::ResetView),
            "ArrowUp" => Some(ShortcutAction::Pan { dx: 0, dy: 1, fast }),
            "ArrowDown" => Some(ShortcutAction::Pan { dx: 0, dy: -1, fast }),
            "ArrowLeft" => Some(ShortcutAction::Pan { dx: 1, dy: 0, fast }),
            "ArrowRight" => Some(ShortcutAction::Pan { dx: -1, dy: 0, fast }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const META: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };

    #[test]
    fn history_bindings() {
        assert_eq!(ShortcutMap::resolve("z", Modifiers::CTRL), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutMap::resolve("z", META), Some(ShortcutAction::Undo));
        assert_eq!(
            ShortcutMap::resolve("Z", Modifiers { shift: true, ..META }),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(ShortcutMap::resolve("y", Modifiers::CTRL), Some(ShortcutAction::Redo));
        assert_eq!(ShortcutMap::resolve("z", Modifiers::NONE), None);
    }

    #[test]
    fn view_bindings() {
        assert_eq!(ShortcutMap::resolve("+", Modifiers::SHIFT), Some(ShortcutAction::ZoomIn));
        assert_eq!(ShortcutMap::resolve("_", Modifiers::SHIFT), Some(ShortcutAction::ZoomOut));
        assert_eq!(ShortcutMap::resolve("0", Modifiers::NONE), Some(ShortcutAction::ResetView));
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", Modifiers::SHIFT),
            Some(ShortcutAction::Pan { dx: 1, dy: 0, fast: true })
        );
    }

    #[test]
    fn edit_bindings() {
        assert_eq!(ShortcutMap::resolve("Backspace", Modifiers::NONE), Some(ShortcutAction::Delete));
        assert_eq!(ShortcutMap::resolve("a", Modifiers::CTRL), Some(ShortcutAction::SelectAll));
        assert_eq!(ShortcutMap::resolve("Escape", Modifiers::NONE), Some(ShortcutAction::Cancel));
        assert_eq!(ShortcutMap::resolve("?", Modifiers::SHIFT), Some(ShortcutAction::ToggleHelp));
    }
}
