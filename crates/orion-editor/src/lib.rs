pub mod editor;
pub mod error;
pub mod hit;
pub mod history;
pub mod input;
pub mod insert;
pub mod library;
pub mod selection;
pub mod shortcuts;
pub mod sync;
pub mod tools;

pub use editor::{Editor, EditorConfig};
pub use error::{EditorError, ToolError};
pub use hit::{HitTarget, hit_test};
pub use history::History;
pub use input::{InputEvent, Modifiers, PointerButton, ScreenTransform};
pub use insert::insert_fragment;
pub use library::{LIBRARY, LibraryItem};
pub use selection::{Overlay, SelectionController, SelectionState};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use sync::{SceneMutation, SyncEngine};
pub use tools::{BrushKind, CreationTool, DrawingSettings, Tool, ToolKind, ToolOutcome};
