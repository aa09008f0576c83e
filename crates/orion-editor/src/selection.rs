//! Selection, move and resize of existing elements.
//!
//! ```text
//! Unselected ──down on element──▶ Selected ──move──▶ Moving ──up──▶ Selected
//!      ▲                            │  ▲                              │
//!      └────down on background──────┘  └─────────up── Resizing ◀──down on handle
//! ```
//!
//! Moves patch the scene on every sample; nothing is committed until the
//! pointer is released. A click that never moved is not a gesture.

use crate::hit::{HitTarget, contains_inclusive, hit_test};
use crate::input::{InputEvent, PointerButton};
use crate::sync::{SceneMutation, SyncEngine};
use crate::tools::{Tool, ToolKind, ToolOutcome};
use kurbo::{Point, Rect};
use orion_core::NodeIndex;
use orion_core::emitter::format_num;
use orion_core::geometry::{Geometry, font_size, scene_bounds};
use orion_core::model::*;

/// Side of the square resize handle, in canvas units.
pub const HANDLE_SIZE: f64 = 10.0;

/// Smallest font size a text resize can reach.
pub const MIN_FONT_SIZE: f64 = 4.0;

const OVERLAY_COLOR: &str = "#3b82f6";

// ─── Overlay ─────────────────────────────────────────────────────────────

/// Selection chrome: the target's canvas-space bounding box and the
/// bottom-right resize handle. Never part of the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub bounds: Rect,
    pub handle: Rect,
}

impl Overlay {
    pub fn for_node(scene: &Scene, idx: NodeIndex) -> Option<Self> {
        let node = scene.node(idx)?;
        let half = node.half_stroke();
        let bounds = scene_bounds(scene, idx)?.inflate(half, half);
        let corner = Point::new(bounds.x1, bounds.y1);
        let handle = Rect::from_center_size(corner, (HANDLE_SIZE, HANDLE_SIZE));
        Some(Self { bounds, handle })
    }

    pub fn handle_contains(&self, point: Point) -> bool {
        contains_inclusive(self.handle, point)
    }

    /// Markup the host layers above the canvas.
    pub fn to_markup(&self) -> String {
        let b = self.bounds;
        let h = self.handle;
        format!(
            concat!(
                r#"<g pointer-events="none">"#,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{c}" stroke-width="1" stroke-dasharray="4 2"/>"#,
                r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#ffffff" stroke="{c}" stroke-width="1"/>"##,
                "</g>"
            ),
            format_num(b.x0),
            format_num(b.y0),
            format_num(b.width()),
            format_num(b.height()),
            format_num(h.x0),
            format_num(h.y0),
            format_num(h.width()),
            format_num(h.height()),
            c = OVERLAY_COLOR,
        )
    }
}

// ─── Controller ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    Unselected,
    /// `drag` holds the press position until the pointer is released.
    Selected {
        target: NodeIndex,
        drag: Option<Point>,
    },
    Moving {
        target: NodeIndex,
        last: Point,
    },
    Resizing {
        target: NodeIndex,
        start: Point,
        initial_font_size: f64,
    },
}

/// The select tool.
pub struct SelectionController {
    state: SelectionState,
    overlay: Option<Overlay>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Unselected,
            overlay: None,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn selected(&self) -> Option<NodeIndex> {
        match self.state {
            SelectionState::Unselected => None,
            SelectionState::Selected { target, .. }
            | SelectionState::Moving { target, .. }
            | SelectionState::Resizing { target, .. } => Some(target),
        }
    }

    /// A press is held on a selected element or handle.
    pub fn is_gesture_open(&self) -> bool {
        matches!(
            self.state,
            SelectionState::Selected { drag: Some(_), .. }
                | SelectionState::Moving { .. }
                | SelectionState::Resizing { .. }
        )
    }

    /// Select `target` (or nothing) with no gesture in progress.
    pub fn select(&mut self, scene: &Scene, target: Option<NodeIndex>) {
        self.state = match target.filter(|&t| scene.contains(t) && t != scene.root) {
            Some(target) => SelectionState::Selected { target, drag: None },
            None => SelectionState::Unselected,
        };
        self.refresh(scene);
    }

    pub fn clear(&mut self) {
        self.state = SelectionState::Unselected;
        self.overlay = None;
    }

    /// Recompute the overlay from the scene.
    pub fn refresh(&mut self, scene: &Scene) {
        self.overlay = self
            .selected()
            .and_then(|target| Overlay::for_node(scene, target));
    }

    fn resize(
        &self,
        engine: &mut SyncEngine,
        target: NodeIndex,
        start: Point,
        initial_font_size: f64,
        pointer: Point,
    ) -> ToolOutcome {
        let Some(node) = engine.scene.node(target) else {
            return ToolOutcome::Ignored;
        };
        let world = engine.scene.world_transform(target);
        if world.determinant().abs() < f64::EPSILON {
            return ToolOutcome::Ignored;
        }
        let inverse = world.inverse();
        let local = inverse * pointer;

        let mutation = match node.kind.geometry() {
            Some(Geometry::Rect { x, y, .. }) => SceneMutation::SetGeometry {
                target,
                geometry: Geometry::Rect {
                    x,
                    y,
                    width: (local.x - x).max(1.0),
                    height: (local.y - y).max(1.0),
                },
            },
            Some(Geometry::Circle { cx, cy, .. }) => SceneMutation::SetGeometry {
                target,
                geometry: Geometry::Circle {
                    cx,
                    cy,
                    r: Point::new(cx, cy).distance(local).max(1.0),
                },
            },
            Some(Geometry::Ellipse { cx, cy, .. }) => SceneMutation::SetGeometry {
                target,
                geometry: Geometry::Ellipse {
                    cx,
                    cy,
                    rx: (local.x - cx).abs().max(1.0),
                    ry: (local.y - cy).abs().max(1.0),
                },
            },
            Some(Geometry::Anchor { x, y }) => {
                let anchor = Point::new(x, y);
                let initial = anchor.distance(inverse * start);
                if initial < f64::EPSILON {
                    return ToolOutcome::Ignored;
                }
                let size = (initial_font_size * anchor.distance(local) / initial).max(MIN_FONT_SIZE);
                SceneMutation::SetAttribute {
                    target,
                    name: "font-size".into(),
                    value: Some(format_num(size)),
                }
            }
            None => {
                log::debug!("resize ignored for <{}>", node.kind.tag());
                return ToolOutcome::Ignored;
            }
        };
        match engine.apply_mutation(mutation) {
            Some(_) => ToolOutcome::Changed,
            None => ToolOutcome::Ignored,
        }
    }
}

impl Tool for SelectionController {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn handle(&mut self, event: &InputEvent, engine: &mut SyncEngine) -> ToolOutcome {
        match *event {
            InputEvent::PointerDown {
                x,
                y,
                button: PointerButton::Primary,
                ..
            } => {
                let point = Point::new(x, y);
                match hit_test(&engine.scene, point, self.overlay.as_ref()) {
                    HitTarget::ResizeHandle => {
                        if let Some(target) = self.selected() {
                            let initial_font_size = engine.scene.node(target).map_or(0.0, font_size);
                            self.state = SelectionState::Resizing {
                                target,
                                start: point,
                                initial_font_size,
                            };
                        }
                    }
                    HitTarget::Element(target) => {
                        self.state = SelectionState::Selected {
                            target,
                            drag: Some(point),
                        };
                        self.refresh(&engine.scene);
                    }
                    HitTarget::Background => self.clear(),
                }
                ToolOutcome::Ignored
            }
            InputEvent::PointerMove { x, y, .. } => {
                let point = Point::new(x, y);
                let outcome = match self.state {
                    SelectionState::Selected {
                        target,
                        drag: Some(last),
                    }
                    | SelectionState::Moving { target, last } => {
                        let delta = point - last;
                        self.state = SelectionState::Moving {
                            target,
                            last: point,
                        };
                        match engine.apply_mutation(SceneMutation::Translate {
                            target,
                            dx: delta.x,
                            dy: delta.y,
                        }) {
                            Some(_) => ToolOutcome::Changed,
                            None => ToolOutcome::Ignored,
                        }
                    }
                    SelectionState::Resizing {
                        target,
                        start,
                        initial_font_size,
                    } => self.resize(engine, target, start, initial_font_size, point),
                    _ => ToolOutcome::Ignored,
                };
                if outcome == ToolOutcome::Changed {
                    self.refresh(&engine.scene);
                }
                outcome
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerLeave => match self.state {
                SelectionState::Moving { target, .. } | SelectionState::Resizing { target, .. } => {
                    self.state = SelectionState::Selected { target, drag: None };
                    ToolOutcome::Completed
                }
                SelectionState::Selected {
                    target,
                    drag: Some(_),
                } => {
                    self.state = SelectionState::Selected { target, drag: None };
                    ToolOutcome::Ignored
                }
                _ => ToolOutcome::Ignored,
            },
            _ => ToolOutcome::Ignored,
        }
    }
}
