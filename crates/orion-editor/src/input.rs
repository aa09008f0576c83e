//! Platform-neutral input events and the screen → scene mapping.
//!
//! Hosts report pointer positions in screen coordinates together with the
//! canvas's current screen transform (the CTM of the root `<svg>`). Tools
//! only ever see scene coordinates.

use kurbo::{Affine, Point};
use serde::{Deserialize, Serialize};

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Which pointer button went down. Only `Primary` starts a gesture; the
/// secondary button is reserved for the host's context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

impl PointerButton {
    /// From a DOM `MouseEvent.button` index.
    pub fn from_index(index: i16) -> Self {
        match index {
            0 => PointerButton::Primary,
            2 => PointerButton::Secondary,
            _ => PointerButton::Auxiliary,
        }
    }
}

/// An input event, in scene coordinates once it reaches a tool.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },
    /// The pointer left the canvas; ends a gesture like `PointerUp`.
    PointerLeave,
    Key {
        key: String,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    pub fn position(&self) -> Option<Point> {
        match *self {
            InputEvent::PointerDown { x, y, .. }
            | InputEvent::PointerMove { x, y, .. }
            | InputEvent::PointerUp { x, y, .. } => Some(Point::new(x, y)),
            InputEvent::PointerLeave | InputEvent::Key { .. } => None,
        }
    }

    /// The same event with its position mapped through `f`.
    #[must_use]
    pub fn map_position(self, f: impl Fn(Point) -> Point) -> Self {
        match self {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => {
                let p = f(Point::new(x, y));
                InputEvent::PointerDown {
                    x: p.x,
                    y: p.y,
                    button,
                    modifiers,
                }
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                let p = f(Point::new(x, y));
                InputEvent::PointerMove {
                    x: p.x,
                    y: p.y,
                    modifiers,
                }
            }
            InputEvent::PointerUp { x, y, modifiers } => {
                let p = f(Point::new(x, y));
                InputEvent::PointerUp {
                    x: p.x,
                    y: p.y,
                    modifiers,
                }
            }
            other => other,
        }
    }
}

/// Scene → screen mapping of the canvas. Pointer positions are converted
/// back with its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform(Affine);

impl Default for ScreenTransform {
    fn default() -> Self {
        Self(Affine::IDENTITY)
    }
}

impl ScreenTransform {
    /// A degenerate (non-invertible) matrix is replaced by the identity.
    pub fn new(affine: Affine) -> Self {
        if affine.determinant().abs() < f64::EPSILON || !affine.is_finite() {
            log::warn!("ignoring singular screen transform {affine:?}");
            return Self::default();
        }
        Self(affine)
    }

    /// From the six entries of a DOM `getScreenCTM()` matrix.
    pub fn from_ctm(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self::new(Affine::new([a, b, c, d, e, f]))
    }

    pub fn affine(&self) -> Affine {
        self.0
    }

    pub fn to_scene(&self, screen: Point) -> Point {
        self.0.inverse() * screen
    }

    pub fn to_screen(&self, scene: Point) -> Point {
        self.0 * scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_to_scene_matches_ctm_inverse() {
        // Canvas drawn at half size, offset by (100, 50).
        let t = ScreenTransform::from_ctm(0.5, 0.0, 0.0, 0.5, 100.0, 50.0);
        let p = t.to_scene(Point::new(150.0, 100.0));
        assert_eq!(p, Point::new(100.0, 100.0));
        assert_eq!(t.to_screen(p), Point::new(150.0, 100.0));
    }

    #[test]
    fn singular_transform_falls_back_to_identity() {
        let t = ScreenTransform::from_ctm(0.0, 0.0, 0.0, 0.0, 5.0, 5.0);
        assert_eq!(t, ScreenTransform::default());
    }

    #[test]
    fn buttons() {
        assert_eq!(PointerButton::from_index(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_index(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_index(1), PointerButton::Auxiliary);
    }
}
