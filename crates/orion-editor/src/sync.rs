//! Scene ↔ document text synchronization.
//!
//! - **Canvas → Text**: gestures apply `SceneMutation`s to the in-memory
//!   `Scene` and mark the text dirty. Nothing is serialized per pointer
//!   sample; `flush_to_text` re-emits once the gesture completes.
//!
//! - **Text → Canvas**: a new document string (undo/redo, external
//!   replacement, the commit round trip) is loaded into a fresh `Scene`.
//!   A string that fails to parse leaves both sides untouched.

use kurbo::{Affine, Point, Vec2};
use orion_core::NodeIndex;
use orion_core::emitter::{emit_document, format_num};
use orion_core::error::ParseError;
use orion_core::geometry::Geometry;
use orion_core::model::*;
use orion_core::parser::load_document;
use std::fmt::Write;

/// Holds the authoritative scene and the text it serializes to.
pub struct SyncEngine {
    /// The current scene (single source of truth while a gesture runs).
    pub scene: Scene,

    /// The current document text. Stale while `text_dirty` is set.
    pub text: String,

    /// Active canvas size; forced onto every loaded document.
    pub viewport: Viewport,

    /// Set when the scene changed and the text needs re-emit.
    text_dirty: bool,
}

impl SyncEngine {
    /// Load a document for the given canvas size.
    pub fn from_text(text: &str, viewport: Viewport) -> Result<Self, ParseError> {
        let scene = load_document(text, viewport)?;
        let canonical_text = emit_document(&scene);
        Ok(Self {
            scene,
            text: canonical_text,
            viewport,
            text_dirty: false,
        })
    }

    // ─── Canvas → Text direction ─────────────────────────────────────────

    /// Apply a mutation from canvas interaction. Returns the node it
    /// affected (the new node for `AddElement`, the parent for
    /// `RemoveElement`), or `None` if the mutation did not apply.
    pub fn apply_mutation(&mut self, mutation: SceneMutation) -> Option<NodeIndex> {
        let affected = match mutation {
            SceneMutation::AddElement { parent, node } => {
                let parent = parent
                    .filter(|&p| self.scene.contains(p))
                    .unwrap_or(self.scene.root);
                Some(self.scene.add_node(parent, *node))
            }
            SceneMutation::RemoveElement { target } => {
                let parent = self.scene.parent(target)?;
                self.scene.remove_node(target)?;
                Some(parent)
            }
            SceneMutation::SetGeometry { target, geometry } => {
                let node = self.scene.node_mut(target)?;
                node.kind.set_geometry(geometry).then_some(target)
            }
            SceneMutation::AppendPathPoint { target, point } => {
                let node = self.scene.node_mut(target)?;
                match &mut node.kind {
                    ElementKind::Path { d } => {
                        let _ = write!(d, " L {} {}", format_num(point.x), format_num(point.y));
                        Some(target)
                    }
                    _ => None,
                }
            }
            SceneMutation::Translate { target, dx, dy } => {
                self.translate(target, Vec2::new(dx, dy))
            }
            SceneMutation::SetAttribute {
                target,
                name,
                value,
            } => {
                let node = self.scene.node_mut(target)?;
                match value {
                    Some(value) => node.attrs.set(name, value),
                    None => {
                        node.attrs.remove(&name);
                    }
                }
                Some(target)
            }
            SceneMutation::SetViewport { viewport } => {
                self.viewport = viewport;
                self.scene.set_view_box(ViewBox::from_viewport(viewport));
                Some(self.scene.root)
            }
        };

        if let Some(idx) = affected {
            log::trace!("scene mutation applied to {idx:?}");
            self.text_dirty = true;
        }
        affected
    }

    /// Move a node by a canvas-space offset. Positional kinds get exact
    /// attribute arithmetic in their own coordinate space; everything else
    /// accumulates a leading `translate` in its parent's space.
    fn translate(&mut self, target: NodeIndex, delta: Vec2) -> Option<NodeIndex> {
        if target == self.scene.root {
            return None;
        }
        let kind = &self.scene.node(target)?.kind;
        if kind.anchor().is_some() {
            let local = local_delta(self.scene.world_transform(target), delta)?;
            self.scene.node_mut(target)?.kind.translate_anchor(local);
        } else if kind.is_drawable() {
            let parent_delta = local_delta(self.scene.parent_transform(target), delta)?;
            let node = self.scene.node_mut(target)?;
            // An unparseable raw transform was ignored when rendering, so
            // replacing it keeps the element where it appeared.
            node.attrs.remove("transform");
            node.transform.translate_by(parent_delta);
        } else {
            return None;
        }
        Some(target)
    }

    /// Re-emit the text from the current scene.
    /// Called once a gesture completes.
    pub fn flush_to_text(&mut self) {
        if self.text_dirty {
            self.text = emit_document(&self.scene);
            self.text_dirty = false;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.text_dirty
    }

    // ─── Text → Canvas direction ─────────────────────────────────────────

    /// Replace the whole document. On a parse error nothing changes.
    pub fn set_text(&mut self, new_text: &str) -> Result<(), ParseError> {
        let scene = load_document(new_text, self.viewport).inspect_err(|e| {
            log::warn!("keeping current document, new text failed to parse: {e}");
        })?;
        self.text = emit_document(&scene);
        self.scene = scene;
        self.text_dirty = false;
        log::debug!("scene rebuilt from text ({} bytes)", new_text.len());
        Ok(())
    }

    /// Switch the canvas size, keeping the scene.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.apply_mutation(SceneMutation::SetViewport { viewport });
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Get current text (synced).
    pub fn current_text(&mut self) -> &str {
        self.flush_to_text();
        &self.text
    }
}

/// Express a canvas-space offset in the coordinate space `space` maps from.
fn local_delta(space: Affine, delta: Vec2) -> Option<Vec2> {
    if space.determinant().abs() < f64::EPSILON {
        return None;
    }
    let inverse = space.inverse();
    Some(inverse * Point::new(delta.x, delta.y) - inverse * Point::ORIGIN)
}

/// A discrete change to the scene produced by a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneMutation {
    /// Append `node` to `parent` (the canvas when `None` or stale).
    AddElement {
        parent: Option<NodeIndex>,
        node: Box<SceneNode>,
    },
    RemoveElement {
        target: NodeIndex,
    },
    /// Overwrite typed geometry, in the node's local space.
    SetGeometry {
        target: NodeIndex,
        geometry: Geometry,
    },
    /// Extend a path's polyline with ` L x y` (local space).
    AppendPathPoint {
        target: NodeIndex,
        point: Point,
    },
    /// Move by a canvas-space offset.
    Translate {
        target: NodeIndex,
        dx: f64,
        dy: f64,
    },
    /// Set (`Some`) or remove (`None`) a presentation attribute.
    SetAttribute {
        target: NodeIndex,
        name: String,
        value: Option<String>,
    },
    SetViewport {
        viewport: Viewport,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use orion_core::transform::TransformOp;

    const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

    fn engine(markup: &str) -> SyncEngine {
        SyncEngine::from_text(markup, VIEWPORT).expect("load failed")
    }

    fn last_top_level(engine: &SyncEngine) -> NodeIndex {
        *engine
            .scene
            .children(engine.scene.root)
            .last()
            .expect("empty canvas")
    }

    #[test]
    fn translate_positional_kinds() {
        let mut engine = engine(r#"<svg><circle cx="100" cy="100" r="5"/></svg>"#);
        let circle = last_top_level(&engine);
        for _ in 0..2 {
            engine.apply_mutation(SceneMutation::Translate {
                target: circle,
                dx: 5.0,
                dy: 0.0,
            });
        }
        assert_eq!(
            engine.scene.graph[circle].kind.geometry(),
            Some(Geometry::Circle {
                cx: 110.0,
                cy: 100.0,
                r: 5.0
            })
        );
    }

    #[test]
    fn translate_respects_own_transform() {
        let mut engine = engine(r#"<svg><rect width="4" height="4" transform="scale(2)"/></svg>"#);
        let rect = last_top_level(&engine);
        engine.apply_mutation(SceneMutation::Translate {
            target: rect,
            dx: 10.0,
            dy: 4.0,
        });
        assert_eq!(
            engine.scene.graph[rect].kind.anchor(),
            Some(Point::new(5.0, 2.0))
        );
    }

    #[test]
    fn translate_path_accumulates_transform() {
        let mut engine = engine(r#"<svg><path d="M 0 0 L 5 5" transform="bogus"/></svg>"#);
        let path = last_top_level(&engine);
        engine.apply_mutation(SceneMutation::Translate {
            target: path,
            dx: 3.0,
            dy: 1.0,
        });
        engine.apply_mutation(SceneMutation::Translate {
            target: path,
            dx: 3.0,
            dy: 1.0,
        });
        let node = &engine.scene.graph[path];
        assert_eq!(node.transform.ops(), &[TransformOp::Translate(6.0, 2.0)]);
        assert_eq!(node.attrs.get("transform"), None);
        assert!(engine.current_text().contains(r#"transform="translate(6 2)""#));
    }

    #[test]
    fn append_path_point() {
        let mut engine = engine("<svg/>");
        let path = engine
            .apply_mutation(SceneMutation::AddElement {
                parent: None,
                node: Box::new(SceneNode::new(ElementKind::Path {
                    d: "M 1 2".into(),
                })),
            })
            .expect("add failed");
        engine.apply_mutation(SceneMutation::AppendPathPoint {
            target: path,
            point: Point::new(3.5, 4.0),
        });
        assert!(matches!(
            &engine.scene.graph[path].kind,
            ElementKind::Path { d } if d == "M 1 2 L 3.5 4"
        ));
    }

    #[test]
    fn mismatched_geometry_is_rejected() {
        let mut engine = engine(r#"<svg><circle r="5"/></svg>"#);
        let circle = last_top_level(&engine);
        let applied = engine.apply_mutation(SceneMutation::SetGeometry {
            target: circle,
            geometry: Geometry::Anchor { x: 0.0, y: 0.0 },
        });
        assert_eq!(applied, None);
        assert!(!engine.is_dirty());
    }

    #[test]
    fn failed_set_text_keeps_state() {
        let mut engine = engine(r#"<svg><rect width="1" height="1"/></svg>"#);
        let before = engine.current_text().to_string();
        assert!(engine.set_text("<svg><rect></svg>").is_err());
        assert_eq!(engine.current_text(), before);
        assert_eq!(engine.scene.children(engine.scene.root).len(), 2);
    }

    #[test]
    fn viewport_change_rewrites_view_box() {
        let mut engine = engine("<svg/>");
        engine.set_viewport(Viewport::new(512.0, 512.0));
        assert!(engine.current_text().contains(r#"viewBox="0 0 512 512""#));
    }
}
