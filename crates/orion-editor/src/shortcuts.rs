//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Panel toggles
//! are reported back to the host; everything else the editor handles.

use crate::tools::ToolKind;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Tool(ToolKind),
    Undo,
    Redo,
    ToggleLeftPanel,
    ToggleRightPanel,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"["`).
    /// Returns `None` if the combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "[" => Some(ShortcutAction::ToggleLeftPanel),
                "]" => Some(ShortcutAction::ToggleRightPanel),
                _ => None,
            };
        }

        let tool = match key {
            "v" => ToolKind::Select,
            "b" => ToolKind::Brush,
            "e" => ToolKind::Eraser,
            "r" => ToolKind::Rect,
            "c" => ToolKind::Circle,
            "t" => ToolKind::Text,
            _ => return None,
        };
        Some(ShortcutAction::Tool(tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_tool_shortcuts() {
        for (key, tool) in [
            ("v", ToolKind::Select),
            ("b", ToolKind::Brush),
            ("e", ToolKind::Eraser),
            ("r", ToolKind::Rect),
            ("c", ToolKind::Circle),
            ("t", ToolKind::Text),
        ] {
            assert_eq!(
                ShortcutMap::resolve(key, false, false, false, false),
                Some(ShortcutAction::Tool(tool))
            );
        }
        assert_eq!(ShortcutMap::resolve("x", false, false, false, false), None);
    }

    #[test]
    fn resolve_undo_redo() {
        // Cmd+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", false, false, false, true),
            Some(ShortcutAction::Undo)
        );
        // Ctrl+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false, false),
            Some(ShortcutAction::Undo)
        );
        // Ctrl+Shift+Z arrives as "Z" in most browsers
        assert_eq!(
            ShortcutMap::resolve("Z", true, true, false, false),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(
            ShortcutMap::resolve("y", false, false, false, true),
            Some(ShortcutAction::Redo)
        );
    }

    #[test]
    fn resolve_panel_toggles() {
        assert_eq!(
            ShortcutMap::resolve("[", true, false, false, false),
            Some(ShortcutAction::ToggleLeftPanel)
        );
        assert_eq!(
            ShortcutMap::resolve("]", false, false, false, true),
            Some(ShortcutAction::ToggleRightPanel)
        );
    }

    #[test]
    fn cmd_blocks_tool_keys() {
        assert_eq!(ShortcutMap::resolve("c", true, false, false, false), None);
    }
}
