//! Artboard size presets and the starter document.

use crate::model::Viewport;
use serde::Serialize;

/// A named canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanvasPreset {
    pub name: &'static str,
    pub label: &'static str,
    pub width: f64,
    pub height: f64,
}

impl CanvasPreset {
    pub const fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn by_name(name: &str) -> Option<&'static CanvasPreset> {
        PRESETS.iter().find(|p| p.name == name)
    }
}

impl Default for CanvasPreset {
    fn default() -> Self {
        PRESETS[0]
    }
}

pub static PRESETS: [CanvasPreset; 6] = [
    CanvasPreset {
        name: "default",
        label: "Default (4:3)",
        width: 800.0,
        height: 600.0,
    },
    CanvasPreset {
        name: "square",
        label: "Square (1:1)",
        width: 800.0,
        height: 800.0,
    },
    CanvasPreset {
        name: "hd",
        label: "Full HD (16:9)",
        width: 1920.0,
        height: 1080.0,
    },
    CanvasPreset {
        name: "a4",
        label: "A4 Paper",
        width: 595.0,
        height: 842.0,
    },
    CanvasPreset {
        name: "mobile",
        label: "Mobile Screen",
        width: 375.0,
        height: 812.0,
    },
    CanvasPreset {
        name: "icon",
        label: "Icon (512px)",
        width: 512.0,
        height: 512.0,
    },
];

/// White background with a blue circle. Used at start-up and by
/// "clear canvas".
pub const DEFAULT_DOCUMENT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 800 600">
  <rect width="800" height="600" fill="white"/>
  <circle cx="400" cy="300" r="100" fill="#3b82f6" />
</svg>"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        assert_eq!(CanvasPreset::by_name("hd").map(|p| p.width), Some(1920.0));
        assert!(CanvasPreset::by_name("poster").is_none());
        assert_eq!(CanvasPreset::default().name, "default");
    }

    #[test]
    fn default_document_parses() {
        let scene = crate::parser::parse_document(DEFAULT_DOCUMENT).expect("parse failed");
        assert_eq!(scene.children(scene.root).len(), 2);
    }
}
