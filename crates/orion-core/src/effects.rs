//! Procedural brush effects, stored as `<filter>` definitions.
//!
//! Every loaded document gets the full catalogue injected into its first
//! top-level `<defs>` so strokes can reference `url(#filter-…)` without the
//! author having to know about them. The filter ids are a stable contract.

use crate::id::ElementId;
use crate::model::{ElementKind, Scene, SceneNode};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Chalk,
    Spray,
    Watercolor,
    Oil,
    Charcoal,
}

impl Effect {
    pub const ALL: [Effect; 5] = [
        Effect::Chalk,
        Effect::Spray,
        Effect::Watercolor,
        Effect::Oil,
        Effect::Charcoal,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Effect::Chalk => "filter-chalk",
            Effect::Spray => "filter-spray",
            Effect::Watercolor => "filter-watercolor",
            Effect::Oil => "filter-oil",
            Effect::Charcoal => "filter-charcoal",
        }
    }

    /// Value for a `filter` presentation attribute.
    pub fn reference(self) -> String {
        format!("url(#{})", self.id())
    }

    /// The effect a `filter` attribute points at, if it is one of ours.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let id = ElementId::from_reference(reference)?;
        Self::ALL.into_iter().find(|e| e.id() == id.as_str())
    }

    fn pipeline(self) -> &'static [Primitive] {
        match self {
            Effect::Chalk => CHALK,
            Effect::Spray => SPRAY,
            Effect::Watercolor => WATERCOLOR,
            Effect::Oil => OIL,
            Effect::Charcoal => CHARCOAL,
        }
    }

    /// Build the `<filter>` node tree under `parent`.
    fn insert_into(self, scene: &mut Scene, parent: NodeIndex) -> NodeIndex {
        let filter = scene.add_node(
            parent,
            SceneNode::new(ElementKind::Generic {
                tag: "filter".into(),
            })
            .with_id(self.id()),
        );
        for primitive in self.pipeline() {
            primitive.insert_into(scene, filter);
        }
        filter
    }
}

struct Primitive {
    tag: &'static str,
    attrs: &'static [(&'static str, &'static str)],
    children: &'static [Primitive],
}

impl Primitive {
    fn insert_into(&self, scene: &mut Scene, parent: NodeIndex) {
        let mut node = SceneNode::new(ElementKind::Generic {
            tag: self.tag.into(),
        });
        for (name, value) in self.attrs {
            node.attrs.set(*name, *value);
        }
        let idx = scene.add_node(parent, node);
        for child in self.children {
            child.insert_into(scene, idx);
        }
    }
}

const fn turbulence(attrs: &'static [(&'static str, &'static str)]) -> Primitive {
    Primitive {
        tag: "feTurbulence",
        attrs,
        children: &[],
    }
}

const fn leaf(tag: &'static str, attrs: &'static [(&'static str, &'static str)]) -> Primitive {
    Primitive {
        tag,
        attrs,
        children: &[],
    }
}

const CHALK: &[Primitive] = &[
    turbulence(&[
        ("type", "fractalNoise"),
        ("baseFrequency", "0.5"),
        ("numOctaves", "3"),
        ("result", "noise"),
    ]),
    leaf(
        "feDisplacementMap",
        &[
            ("in", "SourceGraphic"),
            ("in2", "noise"),
            ("scale", "3"),
            ("xChannelSelector", "R"),
            ("yChannelSelector", "G"),
        ],
    ),
];

const SPRAY: &[Primitive] = &[
    turbulence(&[
        ("type", "fractalNoise"),
        ("baseFrequency", "0.8"),
        ("numOctaves", "3"),
        ("result", "noise"),
    ]),
    leaf(
        "feDisplacementMap",
        &[("in", "SourceGraphic"), ("in2", "noise"), ("scale", "10")],
    ),
    leaf("feGaussianBlur", &[("stdDeviation", "0.5")]),
];

const WATERCOLOR: &[Primitive] = &[
    turbulence(&[
        ("type", "fractalNoise"),
        ("baseFrequency", "0.04"),
        ("numOctaves", "2"),
        ("result", "noise"),
    ]),
    leaf(
        "feDisplacementMap",
        &[
            ("in", "SourceGraphic"),
            ("in2", "noise"),
            ("scale", "6"),
            ("xChannelSelector", "R"),
            ("yChannelSelector", "G"),
        ],
    ),
    leaf("feGaussianBlur", &[("stdDeviation", "1.2")]),
];

const OIL: &[Primitive] = &[
    turbulence(&[
        ("type", "fractalNoise"),
        ("baseFrequency", "0.02"),
        ("numOctaves", "3"),
        ("result", "noise"),
    ]),
    leaf(
        "feDisplacementMap",
        &[
            ("in", "SourceGraphic"),
            ("in2", "noise"),
            ("scale", "4"),
            ("xChannelSelector", "R"),
            ("yChannelSelector", "G"),
            ("result", "paint"),
        ],
    ),
    Primitive {
        tag: "feSpecularLighting",
        attrs: &[
            ("in", "noise"),
            ("surfaceScale", "2"),
            ("specularConstant", "0.6"),
            ("specularExponent", "20"),
            ("lighting-color", "#ffffff"),
            ("result", "light"),
        ],
        children: &[leaf("feDistantLight", &[("azimuth", "235"), ("elevation", "40")])],
    },
    leaf(
        "feComposite",
        &[
            ("in", "light"),
            ("in2", "paint"),
            ("operator", "in"),
            ("result", "gloss"),
        ],
    ),
    leaf(
        "feComposite",
        &[("in", "gloss"), ("in2", "paint"), ("operator", "over")],
    ),
];

const CHARCOAL: &[Primitive] = &[
    turbulence(&[
        ("type", "fractalNoise"),
        ("baseFrequency", "0.9"),
        ("numOctaves", "4"),
        ("result", "noise"),
    ]),
    leaf(
        "feDisplacementMap",
        &[
            ("in", "SourceGraphic"),
            ("in2", "noise"),
            ("scale", "2"),
            ("xChannelSelector", "R"),
            ("yChannelSelector", "G"),
            ("result", "grain"),
        ],
    ),
    leaf(
        "feGaussianBlur",
        &[("in", "grain"), ("stdDeviation", "0.3"), ("result", "soft")],
    ),
    leaf(
        "feComposite",
        &[("in", "soft"), ("in2", "SourceGraphic"), ("operator", "in")],
    ),
];

/// Make sure every effect is defined exactly once. An existing `<filter>`
/// with the effect's id, anywhere in the scene, is left alone. Missing ones
/// are appended to the first top-level `<defs>`, which is created as the
/// canvas's first child when absent. Returns how many were added.
pub fn ensure_effects(scene: &mut Scene) -> usize {
    let missing: Vec<Effect> = Effect::ALL
        .into_iter()
        .filter(|&e| !claim_id(scene, e))
        .collect();
    if missing.is_empty() {
        return 0;
    }

    let defs = match scene.definitions() {
        Some(defs) => defs,
        None => {
            let root = scene.root;
            scene.insert_node(root, 0, SceneNode::new(ElementKind::Definitions))
        }
    };
    for effect in &missing {
        effect.insert_into(scene, defs);
        log::trace!("injected effect definition {}", effect.id());
    }
    missing.len()
}

/// Whether a `<filter>` already defines `effect`. Effect ids are reserved:
/// any other element carrying one loses its id.
fn claim_id(scene: &mut Scene, effect: Effect) -> bool {
    let id = ElementId::intern(effect.id());
    let holders: Vec<NodeIndex> = scene
        .descendants(scene.root)
        .into_iter()
        .filter(|&idx| scene.graph[idx].id == Some(id))
        .collect();
    if let Some(&filter) = holders
        .iter()
        .find(|&&idx| scene.graph[idx].kind.tag() == "filter")
    {
        scene.id_index.insert(id, filter);
        return true;
    }
    for idx in holders {
        log::debug!("<{}> released reserved id {id}", scene.graph[idx].kind.tag());
        scene.graph[idx].id = None;
    }
    scene.id_index.remove(&id);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn count_id(scene: &Scene, id: &str) -> usize {
        scene
            .descendants(scene.root)
            .into_iter()
            .filter(|&idx| scene.graph[idx].id.is_some_and(|i| i.as_str() == id))
            .count()
    }

    #[test]
    fn injection_is_idempotent() {
        let mut scene = parse_document("<svg><rect width=\"1\" height=\"1\"/></svg>").unwrap();
        assert_eq!(ensure_effects(&mut scene), 5);
        assert_eq!(ensure_effects(&mut scene), 0);
        for effect in Effect::ALL {
            assert_eq!(count_id(&scene, effect.id()), 1);
        }
        let first = scene.children(scene.root)[0];
        assert_eq!(scene.graph[first].kind, ElementKind::Definitions);
    }

    #[test]
    fn existing_definition_is_kept() {
        let mut scene = parse_document(
            r#"<svg><g><filter id="filter-chalk"><feGaussianBlur stdDeviation="9"/></filter></g><defs/></svg>"#,
        )
        .unwrap();
        assert_eq!(ensure_effects(&mut scene), 4);
        assert_eq!(count_id(&scene, "filter-chalk"), 1);
        // The existing top-level defs is reused, not duplicated.
        let defs = scene.definitions().unwrap();
        assert_eq!(scene.children(scene.root)[1], defs);
        assert_eq!(scene.children(defs).len(), 4);
    }

    #[test]
    fn stray_element_cannot_stand_in_for_filter() {
        let mut scene =
            parse_document(r#"<svg><rect id="filter-chalk" width="1" height="1"/></svg>"#).unwrap();
        assert_eq!(ensure_effects(&mut scene), 5);
        assert_eq!(count_id(&scene, "filter-chalk"), 1);
        let chalk = scene.index_of(ElementId::intern("filter-chalk")).unwrap();
        assert_eq!(scene.graph[chalk].kind.tag(), "filter");
        let rect = scene.children(scene.root)[1];
        assert_eq!(scene.graph[rect].id, None);
        assert_eq!(ensure_effects(&mut scene), 0);
    }

    #[test]
    fn references() {
        assert_eq!(Effect::Spray.reference(), "url(#filter-spray)");
        assert_eq!(Effect::from_reference("url(#filter-oil)"), Some(Effect::Oil));
        assert_eq!(Effect::from_reference("url(#other)"), None);
    }
}
