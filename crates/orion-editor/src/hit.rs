//! Hit testing in canvas space.
//!
//! The overlay's resize handle wins over everything else. Below it, the
//! topmost (last painted) and deepest element whose bounding box contains
//! the point is hit. Boxes are inflated by half the stroke width so thin
//! strokes stay clickable.

use crate::selection::Overlay;
use kurbo::{Point, Rect};
use orion_core::NodeIndex;
use orion_core::geometry::shape_bounds;
use orion_core::model::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    ResizeHandle,
    Element(NodeIndex),
    /// The canvas itself or anything that isn't painted.
    Background,
}

/// Elements whose subtree is never painted directly.
const NON_RENDERING: &[&str] = &[
    "defs",
    "filter",
    "linearGradient",
    "radialGradient",
    "clipPath",
    "mask",
    "pattern",
    "symbol",
    "marker",
    "style",
    "title",
    "desc",
    "metadata",
    "script",
];

pub fn hit_test(scene: &Scene, point: Point, overlay: Option<&Overlay>) -> HitTarget {
    if overlay.is_some_and(|overlay| overlay.handle_contains(point)) {
        return HitTarget::ResizeHandle;
    }
    scene
        .children(scene.root)
        .iter()
        .rev()
        .find_map(|&child| hit_node(scene, child, point))
        .map_or(HitTarget::Background, HitTarget::Element)
}

fn hit_node(scene: &Scene, idx: NodeIndex, point: Point) -> Option<NodeIndex> {
    let node = scene.node(idx)?;
    match &node.kind {
        ElementKind::Definitions | ElementKind::Characters { .. } => return None,
        ElementKind::Generic { tag } if NON_RENDERING.contains(&tag.as_str()) => return None,
        _ => {}
    }

    let deeper = scene
        .children(idx)
        .iter()
        .rev()
        .find_map(|&child| hit_node(scene, child, point));
    if deeper.is_some() {
        return deeper;
    }

    let half = node.half_stroke();
    let local = shape_bounds(node)?.inflate(half, half);
    let world = scene.world_transform(idx).transform_rect_bbox(local);
    contains_inclusive(world, point).then_some(idx)
}

/// `Rect::contains` excludes the far edges; a zero-size shape would never
/// be hit.
pub(crate) fn contains_inclusive(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}
