//! Core scene model for Orion documents.
//!
//! A document is a tree rooted at the canvas (`<svg>`) node. Nodes live in a
//! `StableDiGraph` arena so indices stay valid while siblings are added or
//! removed; edges go parent → child. Because the arena reuses vacant slots,
//! paint order is tracked explicitly per parent instead of being derived from
//! index order.

use crate::id::ElementId;
use crate::transform::Transform;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

// ─── Canvas metadata ─────────────────────────────────────────────────────

/// Canvas size in user units. Mirrors the active size preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The root `viewBox`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// `0 0 w h` for a viewport.
    pub fn from_viewport(viewport: Viewport) -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            width: viewport.width,
            height: viewport.height,
        }
    }

    /// Parse four numbers separated by whitespace and/or commas.
    pub fn parse(s: &str) -> Option<Self> {
        let mut nums = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<f64>().ok().filter(|v| v.is_finite()));
        let vb = Self {
            min_x: nums.next()??,
            min_y: nums.next()??,
            width: nums.next()??,
            height: nums.next()??,
        };
        if nums.next().is_some() {
            return None;
        }
        Some(vb)
    }

    pub fn to_attribute(&self) -> String {
        use crate::emitter::format_num;
        format!(
            "{} {} {} {}",
            format_num(self.min_x),
            format_num(self.min_y),
            format_num(self.width),
            format_num(self.height)
        )
    }
}

// ─── Attributes ──────────────────────────────────────────────────────────

/// Presentation attributes in source order (stroke, fill, filter, ...).
///
/// Geometry, `id` and `transform` are typed on the node and never stored here,
/// except when their raw value could not be understood.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes(SmallVec<[(String, String); 4]>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    /// Replace in place (keeping position) or append.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.0.push((name, value));
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == name)?;
        Some(self.0.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a numeric attribute, e.g. `stroke-width`.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(crate::parser::parse_length)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

// ─── Scene Nodes ─────────────────────────────────────────────────────────

/// What a node is. Drawable primitives carry typed geometry; anything else
/// is preserved verbatim as `Generic`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    /// Root `<svg>`.
    Canvas { view_box: Option<ViewBox> },
    /// `<defs>`.
    Definitions,
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
    Path {
        d: String,
    },
    /// A `<text>` whose only content is character data.
    Text {
        x: f64,
        y: f64,
        content: String,
    },
    /// `<g>`.
    Group,
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Any other element, kept by tag name.
    Generic { tag: String },
    /// Character data inside mixed content (e.g. around a `<tspan>`).
    Characters { text: String },
}

impl ElementKind {
    /// Markup tag name. Character data has none.
    pub fn tag(&self) -> &str {
        match self {
            ElementKind::Canvas { .. } => "svg",
            ElementKind::Definitions => "defs",
            ElementKind::Rect { .. } => "rect",
            ElementKind::Circle { .. } => "circle",
            ElementKind::Ellipse { .. } => "ellipse",
            ElementKind::Path { .. } => "path",
            ElementKind::Text { .. } => "text",
            ElementKind::Group => "g",
            ElementKind::Image { .. } => "image",
            ElementKind::Generic { tag } => tag,
            ElementKind::Characters { .. } => "",
        }
    }

    /// Whether a user can pick this node on the canvas.
    pub fn is_drawable(&self) -> bool {
        !matches!(
            self,
            ElementKind::Canvas { .. } | ElementKind::Definitions | ElementKind::Characters { .. }
        )
    }
}

/// A single node in the scene tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: Option<ElementId>,
    pub kind: ElementKind,
    pub transform: Transform,
    pub attrs: Attributes,
}

impl SceneNode {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: None,
            kind,
            transform: Transform::identity(),
            attrs: Attributes::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(ElementId::intern(id));
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.set(name, value);
        self
    }

    /// Half the stroke width when the node is stroked, else zero.
    pub fn half_stroke(&self) -> f64 {
        match self.attrs.get("stroke") {
            Some("none") | None => 0.0,
            Some(_) => self.attrs.number("stroke-width").unwrap_or(1.0).max(0.0) / 2.0,
        }
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// The complete document: a tree of `SceneNode`s rooted at the canvas.
#[derive(Debug, Clone)]
pub struct Scene {
    pub graph: StableDiGraph<SceneNode, ()>,
    pub root: NodeIndex,
    /// First node carrying each `id`.
    pub id_index: HashMap<ElementId, NodeIndex>,
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Scene {
    /// A scene holding only an empty canvas.
    #[must_use]
    pub fn new(view_box: Option<ViewBox>) -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(SceneNode::new(ElementKind::Canvas { view_box }));
        let mut child_order = HashMap::new();
        child_order.insert(root, Vec::new());
        Self {
            graph,
            root,
            id_index: HashMap::new(),
            child_order,
        }
    }

    /// Append `node` as the last (topmost) child of `parent`.
    pub fn add_node(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let position = self.children(parent).len();
        self.insert_node(parent, position, node)
    }

    /// Insert `node` at `position` among `parent`'s children (clamped).
    pub fn insert_node(&mut self, parent: NodeIndex, position: usize, node: SceneNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        let order = self.child_order.entry(parent).or_default();
        let position = position.min(order.len());
        order.insert(position, idx);
        self.child_order.insert(idx, Vec::new());
        if let Some(id) = id {
            self.id_index.entry(id).or_insert(idx);
        }
        idx
    }

    /// Remove a node and its whole subtree. The canvas cannot be removed.
    pub fn remove_node(&mut self, idx: NodeIndex) -> Option<SceneNode> {
        if idx == self.root || !self.graph.contains_node(idx) {
            return None;
        }
        if let Some(parent) = self.parent(idx)
            && let Some(order) = self.child_order.get_mut(&parent)
        {
            order.retain(|&c| c != idx);
        }

        let subtree = self.descendants(idx);
        let mut removed = None;
        let mut stale_ids = Vec::new();
        for node_idx in subtree.into_iter().rev() {
            self.child_order.remove(&node_idx);
            if let Some(node) = self.graph.remove_node(node_idx) {
                if let Some(id) = node.id
                    && self.id_index.get(&id) == Some(&node_idx)
                {
                    self.id_index.remove(&id);
                    stale_ids.push(id);
                }
                if node_idx == idx {
                    removed = Some(node);
                }
            }
        }
        for id in stale_ids {
            if let Some(other) = self.find_by_id_scan(id) {
                self.id_index.insert(id, other);
            }
        }
        removed
    }

    fn find_by_id_scan(&self, id: ElementId) -> Option<NodeIndex> {
        self.descendants(self.root)
            .into_iter()
            .find(|&idx| self.graph[idx].id == Some(id))
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&SceneNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut SceneNode> {
        self.graph.node_weight_mut(idx)
    }

    pub fn contains(&self, idx: NodeIndex) -> bool {
        self.graph.contains_node(idx)
    }

    /// Look up a node by its `id` attribute.
    pub fn get_by_id(&self, id: ElementId) -> Option<&SceneNode> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn index_of(&self, id: ElementId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Children of a node in paint order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `idx` and everything below it, in document (pre-)order.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Number of nodes including the canvas.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn view_box(&self) -> Option<ViewBox> {
        match self.graph[self.root].kind {
            ElementKind::Canvas { view_box } => view_box,
            _ => None,
        }
    }

    pub fn set_view_box(&mut self, view_box: ViewBox) {
        let root = &mut self.graph[self.root];
        root.kind = ElementKind::Canvas {
            view_box: Some(view_box),
        };
        root.attrs.remove("viewBox");
    }

    /// The first top-level `<defs>` block.
    pub fn definitions(&self) -> Option<NodeIndex> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&idx| self.graph[idx].kind == ElementKind::Definitions)
    }

    /// Child positions from the canvas down to `idx`.
    pub fn path_of(&self, idx: NodeIndex) -> Option<Vec<usize>> {
        if !self.contains(idx) {
            return None;
        }
        let mut path = Vec::new();
        let mut current = idx;
        while let Some(parent) = self.parent(current) {
            let pos = self.children(parent).iter().position(|&c| c == current)?;
            path.push(pos);
            current = parent;
        }
        if current != self.root {
            return None;
        }
        path.reverse();
        Some(path)
    }

    /// Inverse of [`Scene::path_of`].
    pub fn resolve_path(&self, path: &[usize]) -> Option<NodeIndex> {
        path.iter().try_fold(self.root, |current, &pos| {
            self.children(current).get(pos).copied()
        })
    }

    /// Composite transform from `idx`'s local space to canvas space.
    pub fn world_transform(&self, idx: NodeIndex) -> kurbo::Affine {
        let mut affine = kurbo::Affine::IDENTITY;
        let mut current = Some(idx);
        while let Some(node_idx) = current {
            affine = self.graph[node_idx].transform.to_affine() * affine;
            current = self.parent(node_idx);
        }
        affine
    }

    /// Composite transform of `idx`'s parent (the space its attributes live in).
    pub fn parent_transform(&self, idx: NodeIndex) -> kurbo::Affine {
        self.parent(idx)
            .map(|p| self.world_transform(p))
            .unwrap_or(kurbo::Affine::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64) -> SceneNode {
        SceneNode::new(ElementKind::Rect {
            x,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        })
    }

    #[test]
    fn child_order_survives_slot_reuse() {
        let mut scene = Scene::default();
        let root = scene.root;
        let a = scene.add_node(root, rect(1.0));
        let b = scene.add_node(root, rect(2.0));
        scene.remove_node(a);
        let c = scene.add_node(root, rect(3.0));
        assert_eq!(scene.children(root), &[b, c]);
    }

    #[test]
    fn remove_subtree_and_reindex_ids() {
        let mut scene = Scene::default();
        let root = scene.root;
        let g = scene.add_node(root, SceneNode::new(ElementKind::Group).with_id("dup"));
        let inner = scene.add_node(g, rect(0.0));
        let later = scene.add_node(root, rect(5.0).with_id("dup"));
        assert_eq!(scene.index_of(ElementId::intern("dup")), Some(g));

        scene.remove_node(g);
        assert!(!scene.contains(inner));
        assert_eq!(scene.index_of(ElementId::intern("dup")), Some(later));
        assert!(scene.remove_node(root).is_none());
    }

    #[test]
    fn path_roundtrip() {
        let mut scene = Scene::default();
        let root = scene.root;
        scene.add_node(root, rect(0.0));
        let g = scene.add_node(root, SceneNode::new(ElementKind::Group));
        let inner = scene.add_node(g, rect(1.0));
        let path = scene.path_of(inner).unwrap();
        assert_eq!(path, vec![1, 0]);
        assert_eq!(scene.resolve_path(&path), Some(inner));
        assert_eq!(scene.resolve_path(&[4]), None);
    }

    #[test]
    fn world_transform_composes_ancestors() {
        let mut scene = Scene::default();
        let root = scene.root;
        let mut group = SceneNode::new(ElementKind::Group);
        group.transform = Transform::translation(10.0, 0.0);
        let g = scene.add_node(root, group);
        let mut leaf = rect(0.0);
        leaf.transform = Transform::translation(0.0, 5.0);
        let r = scene.add_node(g, leaf);
        let p = scene.world_transform(r) * kurbo::Point::ORIGIN;
        assert_eq!((p.x, p.y), (10.0, 5.0));
        let pp = scene.parent_transform(r) * kurbo::Point::ORIGIN;
        assert_eq!((pp.x, pp.y), (10.0, 0.0));
    }

    #[test]
    fn view_box_parsing() {
        let vb = ViewBox::parse("0, 0 800 600").unwrap();
        assert_eq!(vb, ViewBox::from_viewport(Viewport::new(800.0, 600.0)));
        assert_eq!(vb.to_attribute(), "0 0 800 600");
        assert!(ViewBox::parse("0 0 800").is_none());
        assert!(ViewBox::parse("0 0 a 1").is_none());
    }

    #[test]
    fn attributes_keep_order() {
        let mut attrs: Attributes = [("fill", "red"), ("stroke", "blue")].into_iter().collect();
        attrs.set("fill", "green");
        attrs.set("opacity", "0.5");
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["fill", "stroke", "opacity"]);
        assert_eq!(attrs.remove("stroke").as_deref(), Some("blue"));
        assert_eq!(attrs.len(), 2);
    }
}
