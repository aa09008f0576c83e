//! Emitter: Scene → SVG markup.
//!
//! Output is deterministic: two-space indentation, `xmlns` and `viewBox`
//! first on the root, then `id`, typed geometry, `transform`, and the
//! remaining attributes in source order. Elements containing character data
//! are written inline so no whitespace is introduced into their text.

use crate::model::*;
use petgraph::graph::NodeIndex;
use std::fmt::Write;

/// Emit a `Scene` as an SVG document string.
#[must_use]
pub fn emit_document(scene: &Scene) -> String {
    let mut out = String::with_capacity(1024);
    emit_node(&mut out, scene, scene.root, 0, false);
    out
}

/// Emit a single node and its subtree without indentation, e.g. for a
/// clipboard or preview.
#[must_use]
pub fn emit_fragment(scene: &Scene, idx: NodeIndex) -> String {
    let mut out = String::new();
    emit_node(&mut out, scene, idx, 0, true);
    out
}

/// Shortest decimal that parses back to the same value. Negative zero and
/// non-finite values collapse to `0`.
pub fn format_num(n: f64) -> String {
    if n == 0.0 || !n.is_finite() {
        return "0".to_string();
    }
    format!("{n}")
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn emit_node(out: &mut String, scene: &Scene, idx: NodeIndex, depth: usize, inline: bool) {
    let node = &scene.graph[idx];
    if let ElementKind::Characters { text } = &node.kind {
        escape_text(out, text);
        return;
    }

    let tag = node.kind.tag();
    out.push('<');
    out.push_str(tag);
    emit_attributes(out, node);

    let children = scene.children(idx);
    if let ElementKind::Text { content, .. } = &node.kind {
        out.push('>');
        escape_text(out, content);
        let _ = write!(out, "</{tag}>");
        return;
    }
    if children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    let inline_children = inline
        || children
            .iter()
            .any(|&c| matches!(scene.graph[c].kind, ElementKind::Characters { .. }));
    for &child in children {
        if !inline_children {
            out.push('\n');
            indent(out, depth + 1);
        }
        emit_node(out, scene, child, depth + 1, inline_children);
    }
    if !inline_children {
        out.push('\n');
        indent(out, depth);
    }
    let _ = write!(out, "</{tag}>");
}

fn emit_attributes(out: &mut String, node: &SceneNode) {
    if let ElementKind::Canvas { view_box } = &node.kind {
        attr(out, "xmlns", SVG_NAMESPACE);
        if let Some(vb) = view_box {
            attr(out, "viewBox", &vb.to_attribute());
        }
    }
    if let Some(id) = node.id {
        attr(out, "id", id.as_str());
    }

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
        } => {
            position(out, "x", *x);
            position(out, "y", *y);
            num(out, "width", *width);
            num(out, "height", *height);
        }
        ElementKind::Circle { cx, cy, r } => {
            position(out, "cx", *cx);
            position(out, "cy", *cy);
            num(out, "r", *r);
        }
        ElementKind::Ellipse { cx, cy, rx, ry } => {
            position(out, "cx", *cx);
            position(out, "cy", *cy);
            num(out, "rx", *rx);
            num(out, "ry", *ry);
        }
        ElementKind::Path { d } => {
            if !d.is_empty() {
                attr(out, "d", d);
            }
        }
        ElementKind::Text { x, y, .. } => {
            position(out, "x", *x);
            position(out, "y", *y);
        }
        _ => {}
    }

    if !node.transform.is_identity() {
        attr(out, "transform", &node.transform.to_attribute());
    }
    for (name, value) in node.attrs.iter() {
        attr(out, name, value);
    }
}

/// Positions default to 0 and are omitted at their default.
fn position(out: &mut String, name: &str, value: f64) {
    if value != 0.0 {
        num(out, name, value);
    }
}

fn num(out: &mut String, name: &str, value: f64) {
    let _ = write!(out, " {name}=\"{}\"", format_num(value));
}

fn attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {name}=\"");
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;

    #[test]
    fn emit_default_shape() {
        let input = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 800 600">
  <rect width="800" height="600" fill="white"/>
  <circle cx="400" cy="300" r="100" fill="#3b82f6" />
</svg>"##;
        let scene = parse_document(input).expect("parse failed");
        let expected = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 800 600">
  <rect width="800" height="600" fill="white"/>
  <circle cx="400" cy="300" r="100" fill="#3b82f6"/>
</svg>"##;
        assert_eq!(emit_document(&scene), expected);
    }

    #[test]
    fn attribute_order_is_canonical() {
        let input = r#"<svg><rect fill="red" transform="translate(1 2)" height="5" id="a" x="1.5" width="4"/></svg>"#;
        let scene = parse_document(input).expect("parse failed");
        let expected = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <rect id="a" x="1.5" width="4" height="5" transform="translate(1 2)" fill="red"/>
</svg>"#;
        assert_eq!(emit_document(&scene), expected);
    }

    #[test]
    fn mixed_content_is_inline() {
        let input = r#"<svg><text>a &lt; <tspan fill="red">b</tspan></text></svg>"#;
        let scene = parse_document(input).expect("parse failed");
        let expected = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <text>a &lt; <tspan fill="red">b</tspan></text>
</svg>"#;
        assert_eq!(emit_document(&scene), expected);
    }

    #[test]
    fn attribute_values_are_escaped() {
        let scene = parse_document(r#"<svg><path d="M0 0" data-note="a &quot;b&quot; &amp; c"/></svg>"#)
            .expect("parse failed");
        let text = emit_document(&scene);
        assert!(text.contains(r#"data-note="a &quot;b&quot; &amp; c""#));
    }

    #[test]
    fn numbers() {
        assert_eq!(format_num(10.0), "10");
        assert_eq!(format_num(-0.0), "0");
        assert_eq!(format_num(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_num(1.5), "1.5");
        assert_eq!(format_num(f64::NAN), "0");
    }

    #[test]
    fn fragment_is_unindented() {
        let scene = parse_document(r#"<svg><g><rect width="1" height="2"/></g></svg>"#)
            .expect("parse failed");
        let group = scene.children(scene.root)[0];
        assert_eq!(
            emit_fragment(&scene, group),
            r#"<g><rect width="1" height="2"/></g>"#
        );
    }
}
