//! WASM bridge for Orion — exposes the editing engine to the browser shell.
//!
//! Compiled via `wasm-pack build --target web`. The shell renders the
//! document text itself and forwards pointer, keyboard and drop events here.

use orion_core::format::{FormatConfig, format_document};
use orion_core::preset::PRESETS;
use orion_editor::library::LIBRARY;
use orion_editor::{
    BrushKind, DrawingSettings, Editor, EditorConfig, Modifiers, PointerButton, ScreenTransform,
    ShortcutAction,
};
use serde_json::json;
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor controller. All interaction from the shell
/// goes through this struct.
#[wasm_bindgen]
pub struct EditorCanvas {
    editor: Editor,
}

#[wasm_bindgen]
impl EditorCanvas {
    /// Create an editor from a JSON `EditorConfig` (empty string for the
    /// defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<EditorCanvas, JsValue> {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(|e| js_sys::Error::new(&e.to_string()))?
        };
        let editor = Editor::new(config).map_err(|e| js_sys::Error::new(&e.to_string()))?;
        Ok(Self { editor })
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the document (code editor, generated output) as one undoable
    /// step. Returns `false` and keeps the current document on a parse error.
    pub fn set_text(&mut self, text: &str) -> bool {
        self.editor.replace_document(text).is_ok()
    }

    /// Load a saved project; history starts over.
    pub fn load_text(&mut self, text: &str) -> bool {
        self.editor.load_document(text).is_ok()
    }

    pub fn get_text(&mut self) -> String {
        self.editor.document().to_string()
    }

    pub fn clear_canvas(&mut self) -> bool {
        self.editor.clear_canvas().is_ok()
    }

    /// Library click: append the snippet before the closing root tag.
    pub fn insert_snippet(&mut self, snippet: &str) -> bool {
        let text = insert_before_closing_root(self.editor.document(), snippet);
        self.editor.replace_document(&text).is_ok()
    }

    /// Library drag-and-drop at a screen position.
    pub fn drop_snippet(&mut self, snippet: &str, x: f64, y: f64) -> bool {
        self.editor.drop_fragment(snippet, x, y).is_ok()
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// The canvas's `getScreenCTM()` entries.
    pub fn set_screen_ctm(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.editor
            .set_screen_transform(ScreenTransform::from_ctm(a, b, c, d, e, f));
    }

    /// Returns `true` if the document changed.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.editor
            .pointer_down(x, y, PointerButton::from_index(button), modifiers)
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64, shift: bool) -> bool {
        let modifiers = Modifiers {
            shift,
            ..Default::default()
        };
        self.editor.pointer_move(x, y, modifiers)
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.editor.pointer_up(x, y, Modifiers::default())
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.editor.pointer_leave()
    }

    /// Selection chrome to layer over the canvas, or an empty string.
    pub fn overlay_markup(&self) -> String {
        self.editor
            .overlay()
            .map(|overlay| overlay.to_markup())
            .unwrap_or_default()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Returns JSON: `{"changed":bool,"action":"<name>","tool":"<name>"}`.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let before = self.editor.history().current().to_string();
        let action = self.editor.shortcut(key, modifiers);
        let changed = self.editor.document() != before;
        json!({
            "changed": changed,
            "action": action.map_or("none", action_name),
            "tool": self.editor.tool().as_str(),
        })
        .to_string()
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    // ─── Tools and settings ──────────────────────────────────────────────

    /// Returns `false` for an unknown tool name.
    pub fn set_tool(&mut self, name: &str) -> bool {
        self.editor
            .set_tool_by_name(name)
            .inspect_err(|e| log::warn!("{e}"))
            .is_ok()
    }

    pub fn get_tool_name(&self) -> String {
        self.editor.tool().as_str().to_string()
    }

    pub fn set_brush(&mut self, name: &str) -> bool {
        self.editor
            .set_brush_by_name(name)
            .inspect_err(|e| log::warn!("{e}"))
            .is_ok()
    }

    /// Brush names in toolbar order.
    pub fn brushes(&self) -> js_sys::Array {
        BrushKind::ALL
            .iter()
            .map(|brush| JsValue::from_str(brush.as_str()))
            .collect()
    }

    /// Partial settings are merged over the defaults.
    pub fn set_settings_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<DrawingSettings>(json) {
            Ok(settings) => {
                self.editor.set_settings(settings);
                true
            }
            Err(e) => {
                log::warn!("ignoring drawing settings: {e}");
                false
            }
        }
    }

    pub fn get_settings_json(&self) -> String {
        serde_json::to_string(self.editor.settings()).unwrap_or_default()
    }

    /// Switch the artboard size by preset name.
    pub fn set_preset(&mut self, name: &str) -> bool {
        self.editor
            .set_preset(name)
            .inspect_err(|e| log::warn!("{e}"))
            .is_ok()
    }

    pub fn get_preset_name(&self) -> String {
        self.editor.preset().name.to_string()
    }
}

fn action_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Tool(_) => "tool",
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::ToggleLeftPanel => "toggleLeftPanel",
        ShortcutAction::ToggleRightPanel => "toggleRightPanel",
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Orion WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no editor needed) ─────────────────────────────

/// Validate a document. Returns JSON: `{"ok":true}` or
/// `{"ok":false,"error":"...","offset":n}`.
#[wasm_bindgen]
pub fn validate(source: &str) -> String {
    match orion_core::parser::parse_document(source) {
        Ok(_) => json!({ "ok": true }).to_string(),
        Err(e) => json!({ "ok": false, "error": e.to_string(), "offset": e.offset() }).to_string(),
    }
}

/// Canonical formatting of (possibly fenced) markup. Returns JSON:
/// `{"ok":true,"text":"..."}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn format(source: &str) -> String {
    match format_document(source, &FormatConfig::default()) {
        Ok(text) => json!({ "ok": true, "text": text }).to_string(),
        Err(e) => json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

#[wasm_bindgen]
pub fn presets_json() -> String {
    serde_json::to_string(&PRESETS).unwrap_or_default()
}

#[wasm_bindgen]
pub fn library_json() -> String {
    serde_json::to_string(&LIBRARY).unwrap_or_default()
}

/// Append `snippet` before the last `</svg>`; documents without one are
/// returned unchanged.
#[wasm_bindgen]
pub fn insert_before_closing_root(document: &str, snippet: &str) -> String {
    match document.rfind("</svg>") {
        Some(at) => format!("{}{snippet}\n{}", &document[..at], &document[at..]),
        None => document.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_goes_before_last_root_close() {
        assert_eq!(
            insert_before_closing_root("<svg><svg></svg></svg>", "<rect/>"),
            "<svg><svg></svg><rect/>\n</svg>"
        );
        assert_eq!(insert_before_closing_root("<g/>", "<rect/>"), "<g/>");
    }

    #[test]
    fn validate_reports_offset() {
        let reply: serde_json::Value =
            serde_json::from_str(&validate("<svg><rect></svg>")).expect("bad json");
        assert_eq!(reply["ok"], false);
        assert!(reply["offset"].is_u64());
        assert_eq!(validate("<svg/>"), r#"{"ok":true}"#);
    }

    #[test]
    fn format_strips_fences() {
        let reply: serde_json::Value =
            serde_json::from_str(&format("```svg\n<svg><g/></svg>\n```")).expect("bad json");
        assert_eq!(reply["ok"], true);
        let text = reply["text"].as_str().unwrap_or_default();
        assert!(text.starts_with("<svg"));
        assert!(!text.contains("```"));
    }

    #[test]
    fn presets_are_listed() {
        let presets: serde_json::Value = serde_json::from_str(&presets_json()).expect("bad json");
        assert_eq!(presets.as_array().map(Vec::len), Some(6));
        assert_eq!(presets[0]["name"], "default");
    }

    #[test]
    fn library_snippet_inserts_into_document() {
        let mut canvas = EditorCanvas::new("").expect("canvas");
        assert!(canvas.insert_snippet(LIBRARY[0].code));
        assert!(canvas.get_text().contains("<polygon"));
        assert!(canvas.can_undo());
        assert!(!canvas.set_text("not markup"));
    }

    #[test]
    fn key_reply_reports_undo() {
        let mut canvas = EditorCanvas::new("").expect("canvas");
        canvas.clear_canvas();
        assert!(canvas.set_tool("rect"));
        canvas.handle_pointer_down(10.0, 10.0, 0, false, false, false, false);
        canvas.handle_pointer_move(30.0, 30.0, false);
        canvas.handle_pointer_up(30.0, 30.0);
        let reply: serde_json::Value =
            serde_json::from_str(&canvas.handle_key("z", true, false, false, false))
                .expect("bad json");
        assert_eq!(reply["changed"], true);
        assert_eq!(reply["action"], "undo");
        assert_eq!(reply["tool"], "rect");
    }
}
