//! Typed geometry of primitive elements and bounding boxes.
//!
//! Bounds are approximate where the markup leaves layout to the renderer:
//! text uses an average glyph advance of 0.6 em, and unknown elements only
//! report a box when they carry `points`, line endpoints or an x/y/w/h frame.

use crate::model::{ElementKind, Scene, SceneNode};
use kurbo::{BezPath, Point, Rect, Shape, Vec2};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_SIZE: f64 = 16.0;
const GLYPH_ADVANCE_EM: f64 = 0.6;

/// The positional and size attributes of a primitive, in its local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Rect and image frames.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },
    /// Text anchor point.
    Anchor {
        x: f64,
        y: f64,
    },
}

impl ElementKind {
    pub fn geometry(&self) -> Option<Geometry> {
        match *self {
            ElementKind::Rect {
                x,
                y,
                width,
                height,
            }
            | ElementKind::Image {
                x,
                y,
                width,
                height,
            } => Some(Geometry::Rect {
                x,
                y,
                width,
                height,
            }),
            ElementKind::Circle { cx, cy, r } => Some(Geometry::Circle { cx, cy, r }),
            ElementKind::Ellipse { cx, cy, rx, ry } => Some(Geometry::Ellipse { cx, cy, rx, ry }),
            ElementKind::Text { x, y, .. } => Some(Geometry::Anchor { x, y }),
            _ => None,
        }
    }

    /// Write `geometry` into a kind of the matching shape. Returns `false`
    /// (and changes nothing) on a mismatch.
    pub fn set_geometry(&mut self, geometry: Geometry) -> bool {
        match (self, geometry) {
            (
                ElementKind::Rect {
                    x,
                    y,
                    width,
                    height,
                }
                | ElementKind::Image {
                    x,
                    y,
                    width,
                    height,
                },
                Geometry::Rect {
                    x: nx,
                    y: ny,
                    width: nw,
                    height: nh,
                },
            ) => {
                (*x, *y, *width, *height) = (nx, ny, nw, nh);
                true
            }
            (ElementKind::Circle { cx, cy, r }, Geometry::Circle { cx: ncx, cy: ncy, r: nr }) => {
                (*cx, *cy, *r) = (ncx, ncy, nr);
                true
            }
            (
                ElementKind::Ellipse { cx, cy, rx, ry },
                Geometry::Ellipse {
                    cx: ncx,
                    cy: ncy,
                    rx: nrx,
                    ry: nry,
                },
            ) => {
                (*cx, *cy, *rx, *ry) = (ncx, ncy, nrx, nry);
                true
            }
            (ElementKind::Text { x, y, .. }, Geometry::Anchor { x: nx, y: ny }) => {
                (*x, *y) = (nx, ny);
                true
            }
            _ => false,
        }
    }

    /// The attribute-level position: `x/y` for frames and text, `cx/cy`
    /// for round shapes.
    pub fn anchor(&self) -> Option<Point> {
        match *self {
            ElementKind::Rect { x, y, .. }
            | ElementKind::Image { x, y, .. }
            | ElementKind::Text { x, y, .. } => Some(Point::new(x, y)),
            ElementKind::Circle { cx, cy, .. } | ElementKind::Ellipse { cx, cy, .. } => {
                Some(Point::new(cx, cy))
            }
            _ => None,
        }
    }

    /// Move the attribute-level position. Returns `false` for kinds
    /// without one.
    pub fn set_anchor(&mut self, point: Point) -> bool {
        match self {
            ElementKind::Rect { x, y, .. }
            | ElementKind::Image { x, y, .. }
            | ElementKind::Text { x, y, .. } => {
                (*x, *y) = (point.x, point.y);
                true
            }
            ElementKind::Circle { cx, cy, .. } | ElementKind::Ellipse { cx, cy, .. } => {
                (*cx, *cy) = (point.x, point.y);
                true
            }
            _ => false,
        }
    }

    pub fn translate_anchor(&mut self, delta: Vec2) -> bool {
        match self.anchor() {
            Some(p) => self.set_anchor(p + delta),
            None => false,
        }
    }
}

/// Bounding box of a node's own shape in its local coordinate space
/// (before its `transform`). Children are not included.
pub fn shape_bounds(node: &SceneNode) -> Option<Rect> {
    match &node.kind {
        ElementKind::Rect {
            x,
            y,
            width,
            height,
        }
        | ElementKind::Image {
            x,
            y,
            width,
            height,
        } => Some(Rect::new(*x, *y, x + width, y + height)),
        ElementKind::Circle { cx, cy, r } => Some(Rect::new(cx - r, cy - r, cx + r, cy + r)),
        ElementKind::Ellipse { cx, cy, rx, ry } => {
            Some(Rect::new(cx - rx, cy - ry, cx + rx, cy + ry))
        }
        ElementKind::Path { d } => path_bounds(d),
        ElementKind::Text { x, y, content } => {
            let size = font_size(node);
            let width = content.chars().count() as f64 * size * GLYPH_ADVANCE_EM;
            Some(Rect::new(*x, y - size, x + width, *y))
        }
        ElementKind::Generic { tag } => generic_bounds(tag, node),
        ElementKind::Canvas { view_box } => view_box
            .map(|vb| Rect::new(vb.min_x, vb.min_y, vb.min_x + vb.width, vb.min_y + vb.height)),
        ElementKind::Group | ElementKind::Definitions | ElementKind::Characters { .. } => None,
    }
}

pub fn font_size(node: &SceneNode) -> f64 {
    node.attrs.number("font-size").unwrap_or(DEFAULT_FONT_SIZE)
}

fn path_bounds(d: &str) -> Option<Rect> {
    let path = BezPath::from_svg(d).ok()?;
    if path.elements().is_empty() {
        return None;
    }
    Some(path.bounding_box())
}

fn generic_bounds(tag: &str, node: &SceneNode) -> Option<Rect> {
    let attrs = &node.attrs;
    match tag {
        "polygon" | "polyline" => {
            let nums: Vec<f64> = attrs
                .get("points")?
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(str::parse::<f64>)
                .collect::<Result<_, _>>()
                .ok()?;
            let mut points = nums.chunks_exact(2).map(|pair| Point::new(pair[0], pair[1]));
            let first = points.next()?;
            Some(points.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p)))
        }
        "line" => {
            let p0 = Point::new(
                attrs.number("x1").unwrap_or(0.0),
                attrs.number("y1").unwrap_or(0.0),
            );
            let p1 = Point::new(
                attrs.number("x2").unwrap_or(0.0),
                attrs.number("y2").unwrap_or(0.0),
            );
            Some(Rect::from_points(p0, p1))
        }
        _ => {
            let width = attrs.number("width")?;
            let height = attrs.number("height")?;
            let x = attrs.number("x").unwrap_or(0.0);
            let y = attrs.number("y").unwrap_or(0.0);
            Some(Rect::new(x, y, x + width, y + height))
        }
    }
}

fn union(a: Option<Rect>, b: Option<Rect>) -> Option<Rect> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Bounds of a node's shape plus all descendants, in the node's local
/// space (before its own transform).
pub fn subtree_bounds(scene: &Scene, idx: NodeIndex) -> Option<Rect> {
    let node = scene.node(idx)?;
    if matches!(node.kind, ElementKind::Definitions) {
        return None;
    }
    let own = shape_bounds(node);
    scene.children(idx).iter().fold(own, |acc, &child| {
        let child_bounds = subtree_bounds(scene, child).map(|r| {
            scene.graph[child]
                .transform
                .to_affine()
                .transform_rect_bbox(r)
        });
        union(acc, child_bounds)
    })
}

/// Axis-aligned bounds of a node in canvas space.
pub fn scene_bounds(scene: &Scene, idx: NodeIndex) -> Option<Rect> {
    let local = subtree_bounds(scene, idx)?;
    Some(scene.world_transform(idx).transform_rect_bbox(local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    #[test]
    fn primitive_bounds() {
        let circle = SceneNode::new(ElementKind::Circle {
            cx: 10.0,
            cy: 20.0,
            r: 5.0,
        });
        assert_eq!(shape_bounds(&circle), Some(Rect::new(5.0, 15.0, 15.0, 25.0)));

        let path = SceneNode::new(ElementKind::Path {
            d: "M 0 0 L 10 0 L 10 30".into(),
        });
        assert_eq!(shape_bounds(&path), Some(Rect::new(0.0, 0.0, 10.0, 30.0)));

        let text = SceneNode::new(ElementKind::Text {
            x: 0.0,
            y: 40.0,
            content: "abcd".into(),
        })
        .with_attr("font-size", "10");
        assert_eq!(shape_bounds(&text), Some(Rect::new(0.0, 30.0, 24.0, 40.0)));
    }

    #[test]
    fn polygon_bounds() {
        let star = SceneNode::new(ElementKind::Generic {
            tag: "polygon".into(),
        })
        .with_attr("points", "12,2 15,9 22,9 2,20");
        assert_eq!(shape_bounds(&star), Some(Rect::new(2.0, 2.0, 22.0, 20.0)));
    }

    #[test]
    fn group_bounds_include_transformed_children() {
        let mut scene = Scene::default();
        let root = scene.root;
        let mut group = SceneNode::new(ElementKind::Group);
        group.transform = Transform::translation(100.0, 0.0);
        let g = scene.add_node(root, group);
        scene.add_node(
            g,
            SceneNode::new(ElementKind::Rect {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            }),
        );
        assert_eq!(subtree_bounds(&scene, g), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(scene_bounds(&scene, g), Some(Rect::new(100.0, 0.0, 110.0, 10.0)));
    }

    #[test]
    fn geometry_mismatch_is_rejected() {
        let mut kind = ElementKind::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 1.0,
        };
        assert!(!kind.set_geometry(Geometry::Anchor { x: 1.0, y: 1.0 }));
        assert!(kind.set_geometry(Geometry::Circle {
            cx: 1.0,
            cy: 2.0,
            r: 3.0
        }));
        assert!(kind.translate_anchor(Vec2::new(1.0, 1.0)));
        assert_eq!(kind.anchor(), Some(Point::new(2.0, 3.0)));
    }
}
