//! The editor: one document, its history, and the active tool.
//!
//! Every gesture ends in a commit: flush the scene to text, store the text
//! as a history snapshot (unless nothing changed), and rebuild the scene
//! from it so the canvas always shows exactly what undo would restore.

use crate::error::{EditorError, ToolError};
use crate::history::History;
use crate::input::{InputEvent, Modifiers, PointerButton, ScreenTransform};
use crate::insert::insert_fragment;
use crate::selection::{Overlay, SelectionController};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::sync::SyncEngine;
use crate::tools::{BrushKind, CreationTool, DrawingSettings, Tool, ToolKind, ToolOutcome};
use kurbo::Point;
use orion_core::NodeIndex;
use orion_core::error::ParseError;
use orion_core::format::clean_markup;
use orion_core::model::Scene;
use orion_core::preset::{CanvasPreset, DEFAULT_DOCUMENT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snapshots kept for undo.
    pub history_depth: usize,
    /// Canvas background; the eraser paints with it.
    pub background: String,
    /// Name of the starting canvas preset.
    pub preset: String,
    pub initial_document: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: 500,
            background: "#ffffff".into(),
            preset: "default".into(),
            initial_document: DEFAULT_DOCUMENT.into(),
        }
    }
}

pub struct Editor {
    engine: SyncEngine,
    history: History,
    creation: CreationTool,
    selection: SelectionController,
    tool: ToolKind,
    screen: ScreenTransform,
    preset: &'static CanvasPreset,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self, EditorError> {
        let preset = CanvasPreset::by_name(&config.preset)
            .ok_or_else(|| ToolError::UnknownPreset(config.preset.clone()))?;
        let engine = SyncEngine::from_text(&config.initial_document, preset.viewport())?;
        let history = History::new(engine.text.clone(), config.history_depth);
        let tool = ToolKind::Brush;
        Ok(Self {
            engine,
            history,
            creation: CreationTool::new(tool, DrawingSettings::default(), config.background),
            selection: SelectionController::new(),
            tool,
            screen: ScreenTransform::default(),
            preset,
        })
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Pointer positions are in screen space.
    pub fn pointer_down(&mut self, x: f64, y: f64, button: PointerButton, modifiers: Modifiers) -> bool {
        self.handle(InputEvent::PointerDown {
            x,
            y,
            button,
            modifiers,
        })
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, modifiers: Modifiers) -> bool {
        self.handle(InputEvent::PointerMove { x, y, modifiers })
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, modifiers: Modifiers) -> bool {
        self.handle(InputEvent::PointerUp { x, y, modifiers })
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.handle(InputEvent::PointerLeave)
    }

    /// Route an event (screen coordinates) to the active tool or the
    /// shortcut map. Returns `true` if the document changed.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        if let InputEvent::Key { key, modifiers } = &event {
            return resolve_shortcut(key, *modifiers).is_some_and(|action| self.perform(action));
        }

        let screen = self.screen;
        let event = event.map_position(|p| screen.to_scene(p));
        if matches!(event, InputEvent::PointerDown { .. }) {
            self.finish_gesture();
        }
        self.dispatch(&event) != ToolOutcome::Ignored
    }

    /// Resolve and perform a keyboard shortcut. Panel toggles are only
    /// reported; the host owns the panels.
    pub fn shortcut(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = resolve_shortcut(key, modifiers)?;
        self.perform(action);
        Some(action)
    }

    /// Returns `true` if the document changed.
    fn perform(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Tool(kind) => {
                self.set_tool(kind);
                false
            }
            ShortcutAction::ToggleLeftPanel | ShortcutAction::ToggleRightPanel => false,
        }
    }

    fn dispatch(&mut self, event: &InputEvent) -> ToolOutcome {
        let outcome = match self.tool {
            ToolKind::Select => self.selection.handle(event, &mut self.engine),
            _ => self.creation.handle(event, &mut self.engine),
        };
        if outcome == ToolOutcome::Completed {
            // A rejected commit is already logged and rolled back.
            let _ = self.commit();
            self.creation.reset();
        }
        outcome
    }

    fn gesture_open(&self) -> bool {
        self.creation.is_creating() || self.selection.is_gesture_open()
    }

    /// End an open gesture as if the pointer left the canvas.
    fn finish_gesture(&mut self) {
        if self.gesture_open() {
            self.dispatch(&InputEvent::PointerLeave);
        }
    }

    /// Store the edited scene as a snapshot. If the emitted text does not
    /// load back (e.g. an edit nested past the depth limit), the edit is
    /// dropped and the last snapshot restored.
    fn commit(&mut self) -> Result<(), ParseError> {
        let selected_path = self
            .selection
            .selected()
            .and_then(|idx| self.engine.scene.path_of(idx));

        self.engine.flush_to_text();
        if self.engine.text == self.history.current() {
            self.selection.refresh(&self.engine.scene);
            return Ok(());
        }

        let snapshot = self.engine.text.clone();
        if let Err(e) = self.engine.set_text(&snapshot) {
            log::warn!("discarding edit: {e}");
            self.selection.clear();
            let last = self.history.current().to_string();
            self.engine.set_text(&last)?;
            return Err(e);
        }
        self.history.commit(self.engine.text.clone());

        let target = selected_path.and_then(|path| self.engine.scene.resolve_path(&path));
        self.selection.select(&self.engine.scene, target);
        Ok(())
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Returns `false` at the start of history.
    pub fn undo(&mut self) -> bool {
        self.finish_gesture();
        match self.history.undo() {
            Some(snapshot) => {
                let snapshot = snapshot.to_string();
                self.restore(&snapshot)
            }
            None => false,
        }
    }

    /// Returns `false` at the end of history.
    pub fn redo(&mut self) -> bool {
        self.finish_gesture();
        match self.history.redo() {
            Some(snapshot) => {
                let snapshot = snapshot.to_string();
                self.restore(&snapshot)
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: &str) -> bool {
        self.selection.clear();
        self.engine.set_text(snapshot).is_ok()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ─── Whole-document operations ───────────────────────────────────────

    /// Replace the document with external markup (generated output, the
    /// code editor, library insertion) as one undoable step. Markdown code
    /// fences are stripped first. On a parse error nothing changes.
    pub fn replace_document(&mut self, text: &str) -> Result<(), ParseError> {
        self.finish_gesture();
        self.engine.set_text(clean_markup(text))?;
        self.selection.clear();
        if self.engine.text != self.history.current() {
            self.history.commit(self.engine.text.clone());
        }
        Ok(())
    }

    /// Start over with `text` and an empty history.
    pub fn load_document(&mut self, text: &str) -> Result<(), ParseError> {
        self.finish_gesture();
        self.engine.set_text(text)?;
        self.selection.clear();
        self.history.reset(self.engine.text.clone());
        Ok(())
    }

    /// Back to the starter document, undoably.
    pub fn clear_canvas(&mut self) -> Result<(), ParseError> {
        self.replace_document(DEFAULT_DOCUMENT)
    }

    /// Drop a markup snippet at a screen position and commit it. Returns
    /// the number of top-level elements inserted. On an error the document
    /// is unchanged.
    pub fn drop_fragment(&mut self, fragment: &str, x: f64, y: f64) -> Result<usize, ParseError> {
        self.finish_gesture();
        let at = self.screen.to_scene(Point::new(x, y));
        let inserted = insert_fragment(&mut self.engine, fragment, at)?;
        self.commit()?;
        Ok(inserted.len())
    }

    // ─── Tools and settings ──────────────────────────────────────────────

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_tool(&mut self, kind: ToolKind) {
        self.finish_gesture();
        self.tool = kind;
        self.creation.kind = kind;
        if kind != ToolKind::Select {
            self.selection.clear();
        }
    }

    pub fn set_tool_by_name(&mut self, name: &str) -> Result<(), ToolError> {
        self.set_tool(name.parse()?);
        Ok(())
    }

    pub fn set_brush(&mut self, brush: BrushKind) {
        self.creation.settings.brush = brush;
    }

    pub fn set_brush_by_name(&mut self, name: &str) -> Result<(), ToolError> {
        self.set_brush(name.parse()?);
        Ok(())
    }

    pub fn settings(&self) -> &DrawingSettings {
        &self.creation.settings
    }

    pub fn set_settings(&mut self, settings: DrawingSettings) {
        self.creation.settings = settings;
    }

    pub fn preset(&self) -> &'static CanvasPreset {
        self.preset
    }

    /// Switch the artboard size. The resized document starts a new history.
    pub fn set_preset(&mut self, name: &str) -> Result<(), ToolError> {
        let preset =
            CanvasPreset::by_name(name).ok_or_else(|| ToolError::UnknownPreset(name.to_string()))?;
        self.finish_gesture();
        self.preset = preset;
        self.engine.set_viewport(preset.viewport());
        self.history.reset(self.engine.current_text().to_string());
        self.selection.refresh(&self.engine.scene);
        log::debug!("canvas preset {} ({}×{})", preset.name, preset.width, preset.height);
        Ok(())
    }

    pub fn set_screen_transform(&mut self, screen: ScreenTransform) {
        self.screen = screen;
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// The current document text.
    pub fn document(&mut self) -> &str {
        self.engine.current_text()
    }

    pub fn scene(&self) -> &Scene {
        &self.engine.scene
    }

    pub fn selected(&self) -> Option<NodeIndex> {
        self.selection.selected()
    }

    /// Select an element programmatically (or clear with `None`).
    pub fn select(&mut self, target: Option<NodeIndex>) {
        self.finish_gesture();
        self.selection.select(&self.engine.scene, target);
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.selection.overlay()
    }
}

fn resolve_shortcut(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
    ShortcutMap::resolve(
        key,
        modifiers.ctrl,
        modifiers.shift,
        modifiers.alt,
        modifiers.meta,
    )
}
