pub mod effects;
pub mod emitter;
pub mod error;
pub mod format;
pub mod geometry;
pub mod id;
pub mod model;
pub mod parser;
pub mod preset;
pub mod transform;

pub use effects::{Effect, ensure_effects};
pub use emitter::{emit_document, emit_fragment, format_num};
pub use error::ParseError;
pub use format::{FormatConfig, clean_markup, format_document};
pub use geometry::{Geometry, scene_bounds, shape_bounds, subtree_bounds};
pub use id::ElementId;
pub use model::*;
pub use parser::{load_document, parse_document, parse_fragment, parse_length};
pub use preset::{CanvasPreset, DEFAULT_DOCUMENT, PRESETS};
pub use transform::{Transform, TransformOp};

// Re-export geometry and graph types so downstream crates don't need a direct dependency
pub use kurbo;
pub use petgraph::graph::NodeIndex;
