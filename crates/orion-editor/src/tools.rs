//! Tool system for canvas interactions.
//!
//! Each tool turns input events (already in scene coordinates) into
//! `SceneMutation`s applied through the `SyncEngine`, and reports when a
//! gesture is complete so the editor can commit it.
//!
//! ## Brushes
//!
//! | Brush | Width | Cap | Opacity | Effect |
//! |-------|-------|-----|---------|--------|
//! | pen | ×1 | round | settings | — |
//! | pencil | ×0.5 (min 1) | round | 0.8 | — |
//! | marker | ×2 | square | 0.5 | — |
//! | highlighter | ×3 | butt | 0.3 | — |
//! | chalk | ×1 | round | settings | chalk |
//! | spray | ×1.5 | round | settings | spray |
//! | watercolor | ×2 | round | 0.6 | watercolor |
//! | oil | ×2.5 | round | settings | oil |
//! | charcoal | ×1.2 | square | settings | charcoal |

use crate::error::ToolError;
use crate::input::{InputEvent, PointerButton};
use crate::sync::{SceneMutation, SyncEngine};
use kurbo::Point;
use orion_core::NodeIndex;
use orion_core::effects::Effect;
use orion_core::emitter::format_num;
use orion_core::geometry::Geometry;
use orion_core::model::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The active tool determines how input events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Select,
    Brush,
    Eraser,
    Rect,
    Circle,
    Text,
}

impl ToolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Brush => "brush",
            ToolKind::Eraser => "eraser",
            ToolKind::Rect => "rect",
            ToolKind::Circle => "circle",
            ToolKind::Text => "text",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(ToolKind::Select),
            "brush" => Ok(ToolKind::Brush),
            "eraser" => Ok(ToolKind::Eraser),
            "rect" => Ok(ToolKind::Rect),
            "circle" => Ok(ToolKind::Circle),
            "text" => Ok(ToolKind::Text),
            _ => Err(ToolError::UnknownTool(s.to_string())),
        }
    }
}

// ─── Brushes ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushKind {
    #[default]
    Pen,
    Pencil,
    Marker,
    Highlighter,
    Chalk,
    Spray,
    Watercolor,
    Oil,
    Charcoal,
}

/// How a brush turns the drawing settings into stroke attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushStyle {
    pub width_factor: f64,
    pub min_width: f64,
    pub cap: &'static str,
    /// Fixed opacity; `None` uses the configured one.
    pub opacity: Option<f64>,
    pub effect: Option<Effect>,
}

impl BrushStyle {
    const fn new(width_factor: f64, cap: &'static str) -> Self {
        Self {
            width_factor,
            min_width: 0.0,
            cap,
            opacity: None,
            effect: None,
        }
    }

    const fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    const fn effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    pub fn stroke_width(&self, base: f64) -> f64 {
        (base * self.width_factor).max(self.min_width)
    }
}

impl BrushKind {
    pub const ALL: [BrushKind; 9] = [
        BrushKind::Pen,
        BrushKind::Pencil,
        BrushKind::Marker,
        BrushKind::Highlighter,
        BrushKind::Chalk,
        BrushKind::Spray,
        BrushKind::Watercolor,
        BrushKind::Oil,
        BrushKind::Charcoal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BrushKind::Pen => "pen",
            BrushKind::Pencil => "pencil",
            BrushKind::Marker => "marker",
            BrushKind::Highlighter => "highlighter",
            BrushKind::Chalk => "chalk",
            BrushKind::Spray => "spray",
            BrushKind::Watercolor => "watercolor",
            BrushKind::Oil => "oil",
            BrushKind::Charcoal => "charcoal",
        }
    }

    pub fn style(self) -> BrushStyle {
        match self {
            BrushKind::Pen => BrushStyle::new(1.0, "round"),
            BrushKind::Pencil => BrushStyle {
                min_width: 1.0,
                ..BrushStyle::new(0.5, "round").opacity(0.8)
            },
            BrushKind::Marker => BrushStyle::new(2.0, "square").opacity(0.5),
            BrushKind::Highlighter => BrushStyle::new(3.0, "butt").opacity(0.3),
            BrushKind::Chalk => BrushStyle::new(1.0, "round").effect(Effect::Chalk),
            BrushKind::Spray => BrushStyle::new(1.5, "round").effect(Effect::Spray),
            BrushKind::Watercolor => BrushStyle::new(2.0, "round")
                .opacity(0.6)
                .effect(Effect::Watercolor),
            BrushKind::Oil => BrushStyle::new(2.5, "round").effect(Effect::Oil),
            BrushKind::Charcoal => BrushStyle::new(1.2, "square").effect(Effect::Charcoal),
        }
    }
}

impl FromStr for BrushKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BrushKind::ALL
            .into_iter()
            .find(|brush| brush.as_str() == s)
            .ok_or_else(|| ToolError::UnknownBrush(s.to_string()))
    }
}

/// User-chosen style for newly drawn elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingSettings {
    pub color: String,
    pub stroke_width: f64,
    pub opacity: f64,
    /// Fill for rectangles and circles; `"none"` leaves them hollow.
    pub fill: String,
    pub brush: BrushKind,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        Self {
            color: "#111827".into(),
            stroke_width: 4.0,
            opacity: 1.0,
            fill: "none".into(),
            brush: BrushKind::Pen,
        }
    }
}

// ─── Tool trait ──────────────────────────────────────────────────────────

/// What a tool did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Nothing changed.
    Ignored,
    /// The scene changed; the gesture is still open.
    Changed,
    /// The gesture ended and should be committed.
    Completed,
}

/// Trait for tools that handle input and mutate the scene.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle an input event in scene coordinates.
    fn handle(&mut self, event: &InputEvent, engine: &mut SyncEngine) -> ToolOutcome;
}

// ─── Creation tool ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CreationState {
    Idle,
    Creating {
        target: NodeIndex,
        kind: ToolKind,
        start: Point,
    },
    Committed {
        target: NodeIndex,
    },
}

/// Draws new elements: brush and eraser strokes, rectangles, circles and
/// text labels.
pub struct CreationTool {
    pub kind: ToolKind,
    pub settings: DrawingSettings,
    /// Eraser stroke colour.
    pub background: String,
    state: CreationState,
}

impl CreationTool {
    pub fn new(kind: ToolKind, settings: DrawingSettings, background: impl Into<String>) -> Self {
        Self {
            kind,
            settings,
            background: background.into(),
            state: CreationState::Idle,
        }
    }

    pub fn state(&self) -> CreationState {
        self.state
    }

    pub fn is_creating(&self) -> bool {
        matches!(self.state, CreationState::Creating { .. })
    }

    /// Back to `Idle` once the editor has committed (or dropped) the gesture.
    pub fn reset(&mut self) {
        self.state = CreationState::Idle;
    }

    /// A fresh element of the active kind anchored at `at`.
    fn new_element(&self, at: Point) -> Option<SceneNode> {
        let settings = &self.settings;
        let (x, y) = (at.x, at.y);
        let width = format_num(settings.stroke_width);
        let node = match self.kind {
            ToolKind::Select => return None,
            ToolKind::Rect => SceneNode::new(ElementKind::Rect {
                x,
                y,
                width: 0.0,
                height: 0.0,
            })
            .with_attr("fill", settings.fill.as_str())
            .with_attr("stroke", settings.color.as_str())
            .with_attr("stroke-width", width),
            ToolKind::Circle => SceneNode::new(ElementKind::Circle { cx: x, cy: y, r: 0.0 })
                .with_attr("fill", settings.fill.as_str())
                .with_attr("stroke", settings.color.as_str())
                .with_attr("stroke-width", width),
            ToolKind::Brush => {
                let style = settings.brush.style();
                let mut node = stroke_path(at)
                    .with_attr("stroke", settings.color.as_str())
                    .with_attr(
                        "stroke-width",
                        format_num(style.stroke_width(settings.stroke_width)),
                    )
                    .with_attr("stroke-linecap", style.cap);
                if let Some(effect) = style.effect {
                    node = node.with_attr("filter", effect.reference());
                }
                node.with_attr(
                    "opacity",
                    format_num(style.opacity.unwrap_or(settings.opacity)),
                )
            }
            ToolKind::Eraser => stroke_path(at)
                .with_attr("stroke", self.background.as_str())
                .with_attr("stroke-width", format_num(settings.stroke_width * 2.0))
                .with_attr("stroke-linecap", "round"),
            ToolKind::Text => SceneNode::new(ElementKind::Text {
                x,
                y,
                content: "Text Layer".into(),
            })
            .with_attr("fill", settings.color.as_str())
            .with_attr("font-size", format_num(settings.stroke_width * 10.0)),
        };
        Some(node)
    }
}

fn stroke_path(at: Point) -> SceneNode {
    SceneNode::new(ElementKind::Path {
        d: format!("M {} {}", format_num(at.x), format_num(at.y)),
    })
    .with_attr("fill", "none")
}

impl Tool for CreationTool {
    fn kind(&self) -> ToolKind {
        self.kind
    }

    fn handle(&mut self, event: &InputEvent, engine: &mut SyncEngine) -> ToolOutcome {
        match (event, self.state) {
            (
                InputEvent::PointerDown {
                    x,
                    y,
                    button: PointerButton::Primary,
                    ..
                },
                CreationState::Idle | CreationState::Committed { .. },
            ) => {
                let start = Point::new(*x, *y);
                let Some(node) = self.new_element(start) else {
                    return ToolOutcome::Ignored;
                };
                let Some(target) = engine.apply_mutation(SceneMutation::AddElement {
                    parent: None,
                    node: Box::new(node),
                }) else {
                    return ToolOutcome::Ignored;
                };
                self.state = CreationState::Creating {
                    target,
                    kind: self.kind,
                    start,
                };
                ToolOutcome::Changed
            }
            (
                InputEvent::PointerMove { x, y, .. },
                CreationState::Creating {
                    target,
                    kind,
                    start,
                },
            ) => {
                let current = Point::new(*x, *y);
                let mutation = match kind {
                    ToolKind::Rect => SceneMutation::SetGeometry {
                        target,
                        geometry: Geometry::Rect {
                            x: start.x.min(current.x),
                            y: start.y.min(current.y),
                            width: (current.x - start.x).abs(),
                            height: (current.y - start.y).abs(),
                        },
                    },
                    ToolKind::Circle => SceneMutation::SetGeometry {
                        target,
                        geometry: Geometry::Circle {
                            cx: start.x,
                            cy: start.y,
                            r: start.distance(current),
                        },
                    },
                    ToolKind::Brush | ToolKind::Eraser => SceneMutation::AppendPathPoint {
                        target,
                        point: current,
                    },
                    ToolKind::Text | ToolKind::Select => return ToolOutcome::Ignored,
                };
                match engine.apply_mutation(mutation) {
                    Some(_) => ToolOutcome::Changed,
                    None => ToolOutcome::Ignored,
                }
            }
            (
                InputEvent::PointerUp { .. } | InputEvent::PointerLeave,
                CreationState::Creating { target, .. },
            ) => {
                self.state = CreationState::Committed { target };
                ToolOutcome::Completed
            }
            _ => ToolOutcome::Ignored,
        }
    }
}
