//! Typed `transform="..."` attribute lists.
//!
//! A transform list is kept as its individual operations (rather than being
//! collapsed into one matrix) so a document round-trips in the form the
//! author wrote it. Moving an element without positional attributes merges
//! the drag offset into a leading `translate(...)`.

use crate::emitter::format_num;
use crate::parser::parse_number;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// One entry of an SVG transform list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformOp {
    Matrix([f64; 6]),
    Translate(f64, f64),
    Scale(f64, f64),
    /// Degrees, clockwise in the y-down canvas, about `(cx, cy)`.
    Rotate { angle: f64, cx: f64, cy: f64 },
    SkewX(f64),
    SkewY(f64),
}

impl TransformOp {
    pub fn to_affine(&self) -> Affine {
        match *self {
            TransformOp::Matrix(m) => Affine::new(m),
            TransformOp::Translate(x, y) => Affine::translate((x, y)),
            TransformOp::Scale(sx, sy) => Affine::scale_non_uniform(sx, sy),
            TransformOp::Rotate { angle, cx, cy } => {
                Affine::rotate_about(angle.to_radians(), Point::new(cx, cy))
            }
            TransformOp::SkewX(a) => Affine::new([1.0, 0.0, a.to_radians().tan(), 1.0, 0.0, 0.0]),
            TransformOp::SkewY(a) => Affine::new([1.0, a.to_radians().tan(), 0.0, 1.0, 0.0, 0.0]),
        }
    }

    fn write(&self, out: &mut String) {
        match *self {
            TransformOp::Matrix(m) => {
                out.push_str("matrix(");
                for (i, v) in m.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(&format_num(*v));
                }
                out.push(')');
            }
            TransformOp::Translate(x, y) => {
                out.push_str(&format!("translate({} {})", format_num(x), format_num(y)));
            }
            TransformOp::Scale(sx, sy) => {
                if sx == sy {
                    out.push_str(&format!("scale({})", format_num(sx)));
                } else {
                    out.push_str(&format!("scale({} {})", format_num(sx), format_num(sy)));
                }
            }
            TransformOp::Rotate { angle, cx, cy } => {
                if cx == 0.0 && cy == 0.0 {
                    out.push_str(&format!("rotate({})", format_num(angle)));
                } else {
                    out.push_str(&format!(
                        "rotate({} {} {})",
                        format_num(angle),
                        format_num(cx),
                        format_num(cy)
                    ));
                }
            }
            TransformOp::SkewX(a) => out.push_str(&format!("skewX({})", format_num(a))),
            TransformOp::SkewY(a) => out.push_str(&format!("skewY({})", format_num(a))),
        }
    }
}

/// An ordered transform list. Empty means identity (no attribute emitted).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    ops: SmallVec<[TransformOp; 2]>,
}

impl Transform {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        let mut t = Self::default();
        t.ops.push(TransformOp::Translate(dx, dy));
        t
    }

    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    /// Parse an SVG transform list. Returns `None` for malformed input, which
    /// browsers ignore; the caller keeps such values as raw attributes.
    pub fn parse(s: &str) -> Option<Self> {
        let mut input = s;
        let mut ops = SmallVec::new();
        skip_separators(&mut input);
        while !input.is_empty() {
            let op = parse_op.parse_next(&mut input).ok()?;
            ops.push(op);
            skip_separators(&mut input);
        }
        Some(Self { ops })
    }

    /// Compose the list into one affine map (leftmost op applied last).
    pub fn to_affine(&self) -> Affine {
        self.ops
            .iter()
            .fold(Affine::IDENTITY, |acc, op| acc * op.to_affine())
    }

    /// Accumulate a parent-space offset. Repeated calls add up into a single
    /// leading `translate`, so a drag never resets between samples.
    pub fn translate_by(&mut self, delta: Vec2) {
        if let Some(TransformOp::Translate(x, y)) = self.ops.first_mut() {
            *x += delta.x;
            *y += delta.y;
        } else {
            self.ops.insert(0, TransformOp::Translate(delta.x, delta.y));
        }
    }

    /// Serialize as the value of a `transform` attribute.
    pub fn to_attribute(&self) -> String {
        let mut out = String::new();
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            op.write(&mut out);
        }
        out
    }
}

fn skip_separators(input: &mut &str) {
    *input = input.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
}

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

fn parse_op(input: &mut &str) -> ModalResult<TransformOp> {
    let name: &str = take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)?;
    *input = input.trim_start();
    let _ = '('.parse_next(input)?;

    let mut args: SmallVec<[f64; 6]> = SmallVec::new();
    skip_separators(input);
    while !input.starts_with(')') {
        if args.len() == 6 || input.is_empty() {
            return Err(backtrack());
        }
        let arg = parse_number(input)?;
        if !arg.is_finite() {
            return Err(backtrack());
        }
        args.push(arg);
        skip_separators(input);
    }
    let _ = ')'.parse_next(input)?;

    let op = match (name, args.as_slice()) {
        ("translate", [x]) => TransformOp::Translate(*x, 0.0),
        ("translate", [x, y]) => TransformOp::Translate(*x, *y),
        ("scale", [s]) => TransformOp::Scale(*s, *s),
        ("scale", [sx, sy]) => TransformOp::Scale(*sx, *sy),
        ("rotate", [a]) => TransformOp::Rotate {
            angle: *a,
            cx: 0.0,
            cy: 0.0,
        },
        ("rotate", [a, cx, cy]) => TransformOp::Rotate {
            angle: *a,
            cx: *cx,
            cy: *cy,
        },
        ("skewX", [a]) => TransformOp::SkewX(*a),
        ("skewY", [a]) => TransformOp::SkewY(*a),
        ("matrix", [a, b, c, d, e, f]) => TransformOp::Matrix([*a, *b, *c, *d, *e, *f]),
        _ => return Err(backtrack()),
    };
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_translate_list() {
        let t = Transform::parse("translate(10, 20) scale(2)").unwrap();
        assert_eq!(
            t.ops(),
            &[TransformOp::Translate(10.0, 20.0), TransformOp::Scale(2.0, 2.0)]
        );
        let p = t.to_affine() * Point::new(1.0, 1.0);
        assert!((p.x - 12.0).abs() < 1e-9);
        assert!((p.y - 22.0).abs() < 1e-9);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Transform::parse("translate(10").is_none());
        assert!(Transform::parse("wobble(1)").is_none());
        assert!(Transform::parse("rotate(1 2)").is_none());
        assert!(Transform::parse("translate(1e400)").is_none());
        assert!(Transform::parse("scale(-1e999 2)").is_none());
    }

    #[test]
    fn empty_list_is_identity() {
        let t = Transform::parse("  ").unwrap();
        assert!(t.is_identity());
        assert_eq!(t.to_affine(), Affine::IDENTITY);
    }

    #[test]
    fn translate_by_accumulates() {
        let mut t = Transform::parse("rotate(45)").unwrap();
        t.translate_by(Vec2::new(5.0, 0.0));
        t.translate_by(Vec2::new(5.0, 2.0));
        assert_eq!(t.ops().len(), 2);
        assert_eq!(t.ops()[0], TransformOp::Translate(10.0, 2.0));
        assert_eq!(t.to_attribute(), "translate(10 2) rotate(45)");
    }

    #[test]
    fn attribute_roundtrip_is_stable() {
        let src = "matrix(1 0 0 1 3.5 -2) skewX(10) rotate(30 5 5) scale(1 2)";
        let t = Transform::parse(src).unwrap();
        let emitted = t.to_attribute();
        assert_eq!(emitted, src);
        assert_eq!(Transform::parse(&emitted).unwrap(), t);
    }
}
