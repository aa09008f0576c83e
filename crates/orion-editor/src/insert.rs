//! Dropping markup snippets onto the canvas.
//!
//! Elements whose source sets a position (`x`/`y` or `cx`/`cy`) have those
//! coordinates moved to the drop point. Anything else is wrapped in a `<g>`
//! whose translation centres the element's bounding box on the drop point.

use crate::sync::{SceneMutation, SyncEngine};
use kurbo::{Point, Rect};
use orion_core::NodeIndex;
use orion_core::emitter::format_num;
use orion_core::error::ParseError;
use orion_core::geometry::subtree_bounds;
use orion_core::model::*;
use orion_core::parser::{fragment_attribute_names, parse_fragment};
use orion_core::transform::Transform;
use smallvec::SmallVec;

/// Box assumed for snippets whose extent can't be computed (library icons
/// are drawn on a 24×24 grid).
const FALLBACK_BOUNDS: Rect = Rect::new(0.0, 0.0, 24.0, 24.0);

const POSITION_ATTRS: [(&str, bool); 4] = [("x", true), ("cx", true), ("y", false), ("cy", false)];

/// Parse `fragment` and append its top-level elements to the canvas at
/// `at` (canvas space). Returns the inserted top-level nodes. On a parse
/// error the scene is untouched.
pub fn insert_fragment(
    engine: &mut SyncEngine,
    fragment: &str,
    at: Point,
) -> Result<SmallVec<[NodeIndex; 4]>, ParseError> {
    let source = parse_fragment(fragment)?;
    let written = fragment_attribute_names(fragment)?;
    let mut inserted = SmallVec::new();

    let elements = source
        .children(source.root)
        .iter()
        .copied()
        .filter(|&idx| !matches!(source.graph[idx].kind, ElementKind::Characters { .. }));
    for (child, names) in elements.zip(&written) {
        let mut node = source.graph[child].clone();

        let placed = if overwrite_position(&mut node, names, at) {
            copy_subtree(engine, &source, child, None, node)
        } else {
            let bounds = subtree_bounds(&source, child)
                .map(|b| node.transform.to_affine().transform_rect_bbox(b))
                .unwrap_or(FALLBACK_BOUNDS);
            let offset = at - bounds.center();
            let mut wrapper = SceneNode::new(ElementKind::Group);
            wrapper.transform = Transform::translation(offset.x, offset.y);
            let group = engine.apply_mutation(SceneMutation::AddElement {
                parent: None,
                node: Box::new(wrapper),
            });
            if let Some(group) = group {
                copy_subtree(engine, &source, child, Some(group), node);
            }
            group
        };
        inserted.extend(placed);
    }

    log::debug!("inserted {} element(s) at {at:?}", inserted.len());
    Ok(inserted)
}

/// Overwrite whichever of `x`, `y`, `cx`, `cy` the source wrote. Returns
/// `false` if it wrote none.
fn overwrite_position(node: &mut SceneNode, written: &[String], at: Point) -> bool {
    let mut moved = false;
    let mut anchor = node.kind.anchor();
    for (name, horizontal) in POSITION_ATTRS {
        if !written.iter().any(|w| w == name) {
            continue;
        }
        let value = if horizontal { at.x } else { at.y };
        // Typed geometry was lifted out of the attribute list.
        match anchor.as_mut() {
            Some(p) if !node.attrs.contains(name) => {
                if horizontal {
                    p.x = value;
                } else {
                    p.y = value;
                }
            }
            _ => node.attrs.set(name, format_num(value)),
        }
        moved = true;
    }
    if let Some(p) = anchor {
        node.kind.set_anchor(p);
    }
    moved
}

fn copy_subtree(
    engine: &mut SyncEngine,
    source: &Scene,
    src: NodeIndex,
    parent: Option<NodeIndex>,
    node: SceneNode,
) -> Option<NodeIndex> {
    let idx = engine.apply_mutation(SceneMutation::AddElement {
        parent,
        node: Box::new(node),
    })?;
    for &child in source.children(src) {
        copy_subtree(engine, source, child, Some(idx), source.graph[child].clone());
    }
    Some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::LIBRARY;
    use orion_core::transform::TransformOp;
    use pretty_assertions::assert_eq;

    fn engine() -> SyncEngine {
        SyncEngine::from_text("<svg/>", Viewport::new(800.0, 600.0)).expect("load failed")
    }

    #[test]
    fn positioned_elements_move_to_drop_point() {
        let mut engine = engine();
        let inserted = insert_fragment(
            &mut engine,
            r#"<circle cx="5" cy="5" r="3"/><line x1="0" y1="0" x2="1" y2="1" x="2"/>"#,
            Point::new(100.0, 50.0),
        )
        .expect("insert failed");
        assert_eq!(inserted.len(), 2);
        assert_eq!(
            engine.scene.graph[inserted[0]].kind,
            ElementKind::Circle {
                cx: 100.0,
                cy: 50.0,
                r: 3.0
            }
        );
        assert_eq!(engine.scene.graph[inserted[1]].attrs.get("x"), Some("100"));
        assert_eq!(engine.scene.graph[inserted[1]].attrs.get("y"), None);
    }

    #[test]
    fn shapes_without_position_are_centred() {
        let mut engine = engine();
        let inserted = insert_fragment(
            &mut engine,
            r#"<path d="M 0 0 L 20 10"/>"#,
            Point::new(100.0, 100.0),
        )
        .expect("insert failed");
        let group = inserted[0];
        assert_eq!(engine.scene.graph[group].kind, ElementKind::Group);
        assert_eq!(
            engine.scene.graph[group].transform.ops(),
            &[TransformOp::Translate(90.0, 95.0)]
        );
        assert_eq!(engine.scene.children(group).len(), 1);
    }

    #[test]
    fn unpositioned_rect_is_centred() {
        let mut engine = engine();
        let inserted = insert_fragment(
            &mut engine,
            r#"<rect width="20" height="10"/>"#,
            Point::new(100.0, 100.0),
        )
        .expect("insert failed");
        let group = inserted[0];
        assert_eq!(engine.scene.graph[group].kind, ElementKind::Group);
        assert_eq!(
            engine.scene.graph[group].transform.ops(),
            &[TransformOp::Translate(90.0, 95.0)]
        );
        let rect = engine.scene.children(group)[0];
        assert_eq!(
            engine.scene.graph[rect].kind,
            ElementKind::Rect {
                x: 0.0,
                y: 0.0,
                width: 20.0,
                height: 10.0
            }
        );
    }

    #[test]
    fn only_written_coordinates_move() {
        let mut engine = engine();
        let inserted = insert_fragment(
            &mut engine,
            r#"<text y="5">hi</text>"#,
            Point::new(40.0, 60.0),
        )
        .expect("insert failed");
        assert_eq!(engine.scene.graph[inserted[0]].kind.anchor(), Some(Point::new(0.0, 60.0)));
    }

    #[test]
    fn unknown_extent_uses_icon_box() {
        let mut engine = engine();
        let inserted =
            insert_fragment(&mut engine, "<g><title>x</title></g>", Point::new(12.0, 12.0))
                .expect("insert failed");
        assert_eq!(
            engine.scene.graph[inserted[0]].transform.ops(),
            &[TransformOp::Translate(0.0, 0.0)]
        );
    }

    #[test]
    fn library_badge_inserts_two_elements() {
        let mut engine = engine();
        let badge = LIBRARY
            .iter()
            .find(|item| item.id == "badge")
            .expect("badge");
        let inserted =
            insert_fragment(&mut engine, badge.code, Point::new(400.0, 300.0)).expect("insert failed");
        assert_eq!(inserted.len(), 2);
        assert!(engine.current_text().contains(r##"<circle cx="400" cy="300" r="100" fill="#3b82f6"/>"##));
    }

    #[test]
    fn malformed_fragment_is_rejected() {
        let mut engine = engine();
        let before = engine.current_text().to_string();
        assert!(insert_fragment(&mut engine, "<rect", Point::ZERO).is_err());
        assert_eq!(engine.current_text(), before);
    }
}
