//! Integration tests: scene ↔ text sync (orion-editor ↔ orion-core).
//!
//! Loads a real document, applies canvas mutations and checks that the
//! emitted text reflects them and reloads to the same scene.

use kurbo::Point;
use orion_core::effects::Effect;
use orion_core::geometry::Geometry;
use orion_core::id::ElementId;
use orion_core::NodeIndex;
use orion_core::model::*;
use orion_editor::insert::insert_fragment;
use orion_editor::sync::{SceneMutation, SyncEngine};
use pretty_assertions::assert_eq;

const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

fn make_engine() -> SyncEngine {
    SyncEngine::from_text(include_str!("fixtures/poster.svg"), VIEWPORT).expect("load failed")
}

fn index(engine: &SyncEngine, id: &str) -> NodeIndex {
    engine
        .scene
        .index_of(ElementId::intern(id))
        .unwrap_or_else(|| panic!("#{id} not found"))
}

// ─── Text → Canvas ──────────────────────────────────────────────────────

#[test]
fn load_normalizes_document() {
    let mut engine = make_engine();
    let text = engine.current_text().to_string();
    assert!(text.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 800 600">"#));
    assert!(!text.contains("<?xml"));
    assert!(!text.contains("hand-edited"));
    for effect in Effect::ALL {
        assert_eq!(text.matches(&format!("id=\"{}\"", effect.id())).count(), 1);
    }
    assert_eq!(
        engine.scene.get_by_id(ElementId::intern("caption")).map(|n| n.kind.clone()),
        Some(ElementKind::Text {
            x: 40.0,
            y: 60.0,
            content: "Hello & welcome".into()
        })
    );
}

#[test]
fn set_text_is_a_fixed_point() {
    let mut engine = make_engine();
    let first = engine.current_text().to_string();
    engine.set_text(&first).expect("reload failed");
    assert_eq!(engine.current_text(), first);
}

#[test]
fn set_text_failure_keeps_scene() {
    let mut engine = make_engine();
    let before = engine.current_text().to_string();
    let sun = index(&engine, "sun");
    let err = engine
        .set_text("<svg><g></svg>")
        .expect_err("mismatched tag must fail");
    assert!(err.offset().is_some());
    assert_eq!(engine.current_text(), before);
    assert_eq!(index(&engine, "sun"), sun);
}

// ─── Canvas → Text ──────────────────────────────────────────────────────

#[test]
fn move_inside_translated_group() {
    let mut engine = make_engine();
    let sun = index(&engine, "sun");
    engine.apply_mutation(SceneMutation::Translate {
        target: sun,
        dx: 10.0,
        dy: -5.0,
    });
    assert!(engine.is_dirty());
    assert!(
        engine
            .current_text()
            .contains(r##"<circle id="sun" cx="110" cy="95" r="40" fill="#fbbf24"/>"##)
    );
    assert!(!engine.is_dirty());
}

#[test]
fn move_path_writes_transform() {
    let mut engine = make_engine();
    let wave = index(&engine, "wave");
    for _ in 0..3 {
        engine.apply_mutation(SceneMutation::Translate {
            target: wave,
            dx: 0.0,
            dy: 10.0,
        });
    }
    assert!(engine.current_text().contains(
        r##"<path id="wave" d="M 0 500 L 800 500" transform="translate(0 30)" stroke="#38bdf8""##
    ));
}

#[test]
fn geometry_and_attribute_mutations() {
    let mut engine = make_engine();
    let bg = index(&engine, "bg");
    engine.apply_mutation(SceneMutation::SetGeometry {
        target: bg,
        geometry: Geometry::Rect {
            x: 5.0,
            y: 5.0,
            width: 790.0,
            height: 590.0,
        },
    });
    engine.apply_mutation(SceneMutation::SetAttribute {
        target: bg,
        name: "fill".into(),
        value: Some("#f1f5f9".into()),
    });
    assert!(
        engine
            .current_text()
            .contains(r##"<rect id="bg" x="5" y="5" width="790" height="590" fill="#f1f5f9"/>"##)
    );

    engine.apply_mutation(SceneMutation::RemoveElement { target: bg });
    assert!(!engine.current_text().contains(r#"id="bg""#));
    assert_eq!(engine.scene.index_of(ElementId::intern("bg")), None);
}

#[test]
fn mutations_survive_reload() {
    let mut engine = make_engine();
    let caption = index(&engine, "caption");
    engine.apply_mutation(SceneMutation::Translate {
        target: caption,
        dx: 4.5,
        dy: 0.0,
    });
    let text = engine.current_text().to_string();
    engine.set_text(&text).expect("reload failed");
    let caption = index(&engine, "caption");
    assert_eq!(
        engine.scene.graph[caption].kind.anchor(),
        Some(Point::new(44.5, 60.0))
    );
}

#[test]
fn inserted_snippet_round_trips() {
    let mut engine = make_engine();
    let inserted = insert_fragment(
        &mut engine,
        r##"<rect x="0" y="0" width="10" height="10" fill="#000"/>"##,
        Point::new(300.0, 200.0),
    )
    .expect("insert failed");
    assert_eq!(inserted.len(), 1);
    let text = engine.current_text().to_string();
    assert!(text.contains(r##"<rect x="300" y="200" width="10" height="10" fill="#000"/>"##));
    engine.set_text(&text).expect("reload failed");
    assert_eq!(engine.current_text(), text);
}
