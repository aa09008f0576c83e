//! Parser for SVG markup → `Scene`.
//!
//! Built on `winnow` 0.7 tokens over an XML subset: elements, attributes,
//! character data, CDATA, the predefined and numeric entities, comments,
//! processing instructions and a DOCTYPE. Parsing happens in two steps: the
//! markup is first read into a plain element tree, which is then lowered to
//! typed scene nodes. A failure never yields a partial scene.

use crate::effects::ensure_effects;
use crate::error::ParseError;
use crate::id::ElementId;
use crate::model::*;
use crate::transform::Transform;
use petgraph::graph::NodeIndex;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_until, take_while};

/// Deepest element nesting accepted.
pub const MAX_DEPTH: usize = 256;

/// Parse a document string into a `Scene`.
#[must_use = "parsing result should be used"]
pub fn parse_document(input: &str) -> Result<Scene, ParseError> {
    let root = read_tree(input)?;
    lower(root)
}

/// Parse and normalize a document for the active canvas: force the
/// `viewBox` to `0 0 w h` and inject the procedural effects.
///
/// The namespace declaration is implied by the emitter, which always writes
/// it on the root.
pub fn load_document(input: &str, viewport: Viewport) -> Result<Scene, ParseError> {
    let mut scene = parse_document(input)?;
    scene.set_view_box(ViewBox::from_viewport(viewport));
    let added = ensure_effects(&mut scene);
    log::debug!(
        "loaded document: {} nodes, {added} effect definitions injected",
        scene.len()
    );
    Ok(scene)
}

/// Parse a markup fragment (one or more sibling elements, no root) into a
/// scene whose canvas holds the fragment's top-level nodes.
pub fn parse_fragment(input: &str) -> Result<Scene, ParseError> {
    const OPEN: &str = "<svg>";
    let wrapped = format!("{OPEN}{input}</svg>");
    parse_document(&wrapped).map_err(|e| shift_offset(e, OPEN.len()))
}

/// Attribute names written on each top-level element of a fragment, in
/// document order. Typed geometry defaults absent coordinates to 0, so this
/// is the only record of which ones the source actually set.
pub fn fragment_attribute_names(input: &str) -> Result<Vec<Vec<String>>, ParseError> {
    const OPEN: &str = "<svg>";
    let wrapped = format!("{OPEN}{input}</svg>");
    let root = read_tree(&wrapped).map_err(|e| shift_offset(e, OPEN.len()))?;
    Ok(root
        .content
        .into_iter()
        .filter_map(|item| match item {
            RawContent::Element(element) => {
                Some(element.attrs.into_iter().map(|(name, _)| name).collect())
            }
            RawContent::Text(_) => None,
        })
        .collect())
}

fn shift_offset(err: ParseError, by: usize) -> ParseError {
    use ParseError::*;
    match err {
        UnexpectedEof { offset, context } => UnexpectedEof {
            offset: offset.saturating_sub(by),
            context,
        },
        Unexpected { offset, expected } => Unexpected {
            offset: offset.saturating_sub(by),
            expected,
        },
        MismatchedTag {
            offset,
            expected,
            found,
        } => MismatchedTag {
            offset: offset.saturating_sub(by),
            expected,
            found,
        },
        DuplicateAttribute { offset, name } => DuplicateAttribute {
            offset: offset.saturating_sub(by),
            name,
        },
        UnknownEntity { offset, name } => UnknownEntity {
            offset: offset.saturating_sub(by),
            name,
        },
        TrailingContent { offset } => TrailingContent {
            offset: offset.saturating_sub(by),
        },
        TooDeep { offset, limit } => TooDeep {
            offset: offset.saturating_sub(by),
            limit,
        },
        other => other,
    }
}

// ─── Numbers ─────────────────────────────────────────────────────────────

/// An SVG number: optional sign, digits with an optional fraction, and an
/// optional exponent.
pub(crate) fn parse_number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    if input.starts_with('-') || input.starts_with('+') {
        *input = &input[1..];
    }
    let int_part = digits(input);
    let mut frac_part = "";
    if input.starts_with('.') {
        *input = &input[1..];
        frac_part = digits(input);
    }
    if int_part.is_empty() && frac_part.is_empty() {
        *input = start;
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    // Only an `e` followed by digits is an exponent.
    if input.starts_with(['e', 'E']) {
        let before = *input;
        *input = &input[1..];
        if input.starts_with(['-', '+']) {
            *input = &input[1..];
        }
        if digits(input).is_empty() {
            *input = before;
        }
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f64>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

fn digits<'a>(input: &mut &'a str) -> &'a str {
    take_while::<_, _, ContextError>(0.., |c: char| c.is_ascii_digit())
        .parse_next(input)
        .unwrap_or_default()
}

/// A plain numeric attribute value, optionally in `px`. Percentages and
/// other units are not plain numbers.
pub fn parse_length(s: &str) -> Option<f64> {
    let s = s.trim();
    let mut input = s.strip_suffix("px").unwrap_or(s);
    let value = parse_number(&mut input).ok()?;
    (input.is_empty() && value.is_finite()).then_some(value)
}

// ─── Markup reader ───────────────────────────────────────────────────────

#[derive(Debug)]
struct RawElement {
    tag: String,
    attrs: Vec<(String, String)>,
    content: Vec<RawContent>,
}

#[derive(Debug)]
enum RawContent {
    Element(RawElement),
    Text(String),
}

impl RawElement {
    fn push_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(RawContent::Text(last)) = self.content.last_mut() {
            last.push_str(&text);
        } else {
            self.content.push(RawContent::Text(text));
        }
    }
}

struct Reader<'a> {
    src: &'a str,
    rest: &'a str,
}

impl<'a> Reader<'a> {
    fn offset(&self) -> usize {
        self.src.len() - self.rest.len()
    }

    fn skip_ws(&mut self) {
        self.rest = self
            .rest
            .trim_start_matches([' ', '\t', '\r', '\n']);
    }

    /// Error for a missing token: running out of input is reported as such.
    fn expected(&self, expected: &'static str) -> ParseError {
        if self.rest.is_empty() {
            ParseError::UnexpectedEof {
                offset: self.offset(),
                context: expected,
            }
        } else {
            ParseError::Unexpected {
                offset: self.offset(),
                expected,
            }
        }
    }

    fn eat(&mut self, literal: &'static str) -> bool {
        match self.rest.strip_prefix(literal) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    /// Consume through `terminator`, returning what came before it.
    fn until(&mut self, terminator: &'static str, context: &'static str) -> Result<&'a str, ParseError> {
        let body = take_until::<_, _, ContextError>(0.., terminator)
            .parse_next(&mut self.rest)
            .map_err(|_| ParseError::UnexpectedEof {
                offset: self.src.len(),
                context,
            })?;
        self.rest = &self.rest[terminator.len()..];
        Ok(body)
    }

    fn name(&mut self, what: &'static str) -> Result<&'a str, ParseError> {
        if !self.rest.starts_with(is_name_start) {
            return Err(self.expected(what));
        }
        take_while::<_, _, ContextError>(1.., is_name_char)
            .parse_next(&mut self.rest)
            .map_err(|_| self.expected(what))
    }

    /// Whitespace, comments, processing instructions and DOCTYPE outside
    /// the root element.
    fn skip_misc(&mut self) -> Result<(), ParseError> {
        loop {
            self.skip_ws();
            if self.eat("<!--") {
                self.until("-->", "comment")?;
            } else if self.eat("<?") {
                self.until("?>", "processing instruction")?;
            } else if self.eat("<!DOCTYPE") {
                self.doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn doctype(&mut self) -> Result<(), ParseError> {
        let _ = take_till::<_, _, ContextError>(0.., ['>', '[']).parse_next(&mut self.rest);
        if self.eat("[") {
            self.until("]", "DOCTYPE")?;
            self.skip_ws();
        }
        if !self.eat(">") {
            return Err(self.expected("`>` closing DOCTYPE"));
        }
        Ok(())
    }

    /// `<name attr="v" ...>` or `<name .../>`. Returns the element and
    /// whether it was self-closing.
    fn start_tag(&mut self) -> Result<(RawElement, bool), ParseError> {
        self.eat("<");
        let tag = self.name("element name")?.to_owned();
        let mut attrs: Vec<(String, String)> = Vec::new();
        loop {
            self.skip_ws();
            if self.eat("/>") {
                return Ok((RawElement::new(tag, attrs), true));
            }
            if self.eat(">") {
                return Ok((RawElement::new(tag, attrs), false));
            }
            let attr_offset = self.offset();
            let name = self.name("attribute name")?;
            self.skip_ws();
            if !self.eat("=") {
                return Err(self.expected("`=` after attribute name"));
            }
            self.skip_ws();
            let quote = if self.eat("\"") {
                '"'
            } else if self.eat("'") {
                '\''
            } else {
                return Err(self.expected("quoted attribute value"));
            };
            let value_offset = self.offset();
            let raw: &str = take_till::<_, _, ContextError>(0.., quote)
                .parse_next(&mut self.rest)
                .unwrap_or_default();
            if self.rest.is_empty() {
                return Err(ParseError::UnexpectedEof {
                    offset: self.offset(),
                    context: "attribute value",
                });
            }
            self.rest = &self.rest[1..];
            if attrs.iter().any(|(k, _)| k == name) {
                return Err(ParseError::DuplicateAttribute {
                    offset: attr_offset,
                    name: name.to_owned(),
                });
            }
            let value = decode_entities(raw, value_offset)?;
            attrs.push((name.to_owned(), value));
        }
    }

    fn end_tag(&mut self) -> Result<&'a str, ParseError> {
        self.eat("</");
        let name = self.name("closing tag name")?;
        self.skip_ws();
        if !self.eat(">") {
            return Err(self.expected("`>` closing end tag"));
        }
        Ok(name)
    }

    fn char_data(&mut self) -> Result<String, ParseError> {
        let offset = self.offset();
        let raw: &str = take_till::<_, _, ContextError>(0.., '<')
            .parse_next(&mut self.rest)
            .unwrap_or_default();
        decode_entities(raw, offset)
    }
}

impl RawElement {
    fn new(tag: String, attrs: Vec<(String, String)>) -> Self {
        Self {
            tag,
            attrs,
            content: Vec::new(),
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

/// Read markup into a plain element tree.
fn read_tree(input: &str) -> Result<RawElement, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let mut reader = Reader {
        src: input,
        rest: input.strip_prefix('\u{feff}').unwrap_or(input),
    };
    reader.skip_misc()?;
    if !reader.rest.starts_with('<') {
        return Err(reader.expected("root element"));
    }

    let (root, self_closing) = reader.start_tag()?;
    let mut stack = vec![root];
    let mut finished = None;
    if self_closing {
        finished = stack.pop();
    }

    loop {
        let depth = stack.len();
        let Some(top) = stack.last_mut() else { break };
        let offset = reader.offset();
        if reader.rest.is_empty() {
            return Err(ParseError::UnexpectedEof {
                offset,
                context: "element content",
            });
        } else if reader.eat("<!--") {
            reader.until("-->", "comment")?;
        } else if reader.eat("<![CDATA[") {
            let text = reader.until("]]>", "CDATA section")?;
            top.push_text(text.to_owned());
        } else if reader.eat("<?") {
            reader.until("?>", "processing instruction")?;
        } else if reader.rest.starts_with("</") {
            let name = reader.end_tag()?;
            if name != top.tag {
                return Err(ParseError::MismatchedTag {
                    offset,
                    expected: top.tag.clone(),
                    found: name.to_owned(),
                });
            }
            let Some(closed) = stack.pop() else { break };
            match stack.last_mut() {
                Some(parent) => parent.content.push(RawContent::Element(closed)),
                None => finished = Some(closed),
            }
        } else if reader.rest.starts_with('<') {
            if depth >= MAX_DEPTH {
                return Err(ParseError::TooDeep {
                    offset,
                    limit: MAX_DEPTH,
                });
            }
            let (element, self_closing) = reader.start_tag()?;
            if self_closing {
                top.content.push(RawContent::Element(element));
            } else {
                stack.push(element);
            }
        } else {
            let text = reader.char_data()?;
            top.push_text(text);
        }
    }

    reader.skip_misc()?;
    if !reader.rest.is_empty() {
        return Err(ParseError::TrailingContent {
            offset: reader.offset(),
        });
    }
    finished.ok_or(ParseError::Empty)
}

/// Replace the predefined and numeric character references.
fn decode_entities(raw: &str, offset: usize) -> Result<String, ParseError> {
    if !raw.contains('&') {
        return Ok(raw.to_owned());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let at = offset + (raw.len() - rest.len()) + pos;
        let after = &rest[pos + 1..];
        let Some(end) = after.find(';') else {
            let name: String = after
                .chars()
                .take_while(|c| !c.is_whitespace())
                .collect();
            return Err(ParseError::UnknownEntity { offset: at, name });
        };
        let name = &after[..end];
        let decoded = resolve_entity(name).ok_or_else(|| ParseError::UnknownEntity {
            offset: at,
            name: name.to_owned(),
        })?;
        out.push(decoded);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

// ─── Lowering to scene nodes ─────────────────────────────────────────────

fn lower(root: RawElement) -> Result<Scene, ParseError> {
    if root.tag != "svg" {
        return Err(ParseError::NotSvg { found: root.tag });
    }
    let mut attrs: Attributes = root.attrs.into_iter().collect();
    attrs.remove("xmlns");
    let view_box = attrs.get("viewBox").and_then(ViewBox::parse);
    if view_box.is_some() {
        attrs.remove("viewBox");
    }

    let mut scene = Scene::new(view_box);
    let canvas = scene.root;
    if let Some(id) = attrs.remove("id").map(|v| ElementId::intern(&v)) {
        scene.graph[canvas].id = Some(id);
        scene.id_index.insert(id, canvas);
    }
    scene.graph[canvas].attrs = attrs;
    add_content(&mut scene, canvas, root.content);
    Ok(scene)
}

fn add_content(scene: &mut Scene, parent: NodeIndex, content: Vec<RawContent>) {
    // Whitespace between elements is layout, not content, unless the
    // element mixes text with markup. Inside text elements it is a glyph.
    let mixed = is_text_container(&scene.graph[parent].kind)
        || content
            .iter()
            .any(|c| matches!(c, RawContent::Text(t) if !t.trim().is_empty()));
    for item in content {
        match item {
            RawContent::Text(text) => {
                if mixed {
                    scene.add_node(parent, SceneNode::new(ElementKind::Characters { text }));
                }
            }
            RawContent::Element(element) => {
                let (node, children) = lower_element(element);
                let idx = scene.add_node(parent, node);
                add_content(scene, idx, children);
            }
        }
    }
}

fn is_text_container(kind: &ElementKind) -> bool {
    matches!(kind, ElementKind::Generic { tag } if matches!(tag.as_str(), "text" | "tspan" | "textPath"))
}

fn lower_element(element: RawElement) -> (SceneNode, Vec<RawContent>) {
    let RawElement {
        tag,
        attrs,
        mut content,
    } = element;
    let mut attrs: Attributes = attrs.into_iter().collect();
    let id = attrs.remove("id").map(|v| ElementId::intern(&v));
    let transform = match attrs.get("transform").and_then(Transform::parse) {
        Some(parsed) => {
            attrs.remove("transform");
            parsed
        }
        None => Transform::identity(),
    };

    let typed = match tag.as_str() {
        "rect" => take_numbers(&mut attrs, ["x", "y", "width", "height"]).map(
            |[x, y, width, height]| ElementKind::Rect {
                x,
                y,
                width,
                height,
            },
        ),
        "image" => take_numbers(&mut attrs, ["x", "y", "width", "height"]).map(
            |[x, y, width, height]| ElementKind::Image {
                x,
                y,
                width,
                height,
            },
        ),
        "circle" => take_numbers(&mut attrs, ["cx", "cy", "r"])
            .map(|[cx, cy, r]| ElementKind::Circle { cx, cy, r }),
        "ellipse" => take_numbers(&mut attrs, ["cx", "cy", "rx", "ry"])
            .map(|[cx, cy, rx, ry]| ElementKind::Ellipse { cx, cy, rx, ry }),
        "path" => Some(ElementKind::Path {
            d: attrs.remove("d").unwrap_or_default(),
        }),
        "text" if content.iter().all(|c| matches!(c, RawContent::Text(_))) => {
            take_numbers(&mut attrs, ["x", "y"]).map(|[x, y]| {
                let text: String = content
                    .drain(..)
                    .filter_map(|c| match c {
                        RawContent::Text(t) => Some(t),
                        RawContent::Element(_) => None,
                    })
                    .collect();
                ElementKind::Text {
                    x,
                    y,
                    content: text,
                }
            })
        }
        "g" => Some(ElementKind::Group),
        "defs" => Some(ElementKind::Definitions),
        _ => None,
    };
    let kind = typed.unwrap_or(ElementKind::Generic { tag });

    let node = SceneNode {
        id,
        kind,
        transform,
        attrs,
    };
    (node, content)
}

/// Pull numeric geometry attributes (absent = 0). Leaves `attrs` untouched
/// and returns `None` if any present value is not a plain number.
fn take_numbers<const N: usize>(attrs: &mut Attributes, names: [&str; N]) -> Option<[f64; N]> {
    let mut values = [0.0; N];
    for (slot, name) in values.iter_mut().zip(names) {
        if let Some(raw) = attrs.get(name) {
            *slot = parse_length(raw)?;
        }
    }
    for name in names {
        attrs.remove(name);
    }
    Some(values)
}
