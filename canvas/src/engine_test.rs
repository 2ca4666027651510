#![allow(clippy::float_cmp)]

use std::collections::BTreeMap;

use serde_json::json;

use super::*;
use crate::doc::MemorySurface;
use crate::identity::IdentityAllocator;
use crate::sync::{Outbox, TransportError};

// =============================================================
// Helpers
// =============================================================

type Core = EngineCore<MemorySurface, Outbox>;

fn core() -> Core {
    EngineCore::with_parts(
        MemorySurface::new(),
        Outbox::new(),
        IdentityRegistry::with_allocator(IdentityAllocator::with_session("test")),
        KindRegistry::with_defaults(),
    )
}

fn bag(value: Value) -> PropertyBag {
    value.as_object().cloned().unwrap_or_default()
}

fn center() -> Point {
    Point::new(200.0, 150.0)
}

fn fill(core: &Core, identity: &Identity) -> Option<String> {
    core.object(identity)
        .and_then(|b| b.get("fill").and_then(Value::as_str).map(str::to_owned))
}

/// Live primitives keyed by identity, independent of surface order.
fn state(core: &Core) -> BTreeMap<Identity, PropertyBag> {
    core.objects().into_iter().collect()
}

fn lens(core: &Core) -> (usize, usize) {
    (core.history().undo_len(), core.history().redo_len())
}

/// A mixed sequence of local edits. Returns how many edits were recorded.
fn run_edits(core: &mut Core) -> usize {
    let circle = core.add_shape(Shape::Circle, center());
    let rect = core.add_shape(Shape::Rectangle, Point::new(10.0, 10.0));
    core.add_line(true, center());
    core.add_text(center());
    core.modify(&circle, &bag(json!({ "fill": "#ff0000", "left": 5.0 })));
    core.remove(&rect);
    core.set_tool(Tool::Pencil);
    core.commit_stroke(json!([["M", 0, 0], ["L", 10, 10]]));
    core.modify(&circle, &bag(json!({ "fill": null })));
    8
}

// =============================================================
// recordChange
// =============================================================

#[test]
fn record_change_appends_and_broadcasts() {
    let mut core = core();
    let r = core
        .surface
        .create_primitive(PrimitiveKind::Circle, bag(json!({ "radius": 50.0, "fill": "red" })));
    let a = core.register(r);
    let posterior = core.object(&a);
    core.record_change(ChangeKind::Create, a.clone(), None, posterior.clone());

    assert_eq!(lens(&core), (1, 0));
    let sent = core.broadcaster_mut().drain();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, Action::AddShape);
    assert_eq!(sent[0].identity, a.as_str());
    assert_eq!(sent[0].snapshot, Value::Object(posterior.unwrap()));
}

#[test]
fn record_change_clears_redo() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    core.undo();
    assert_eq!(lens(&core), (0, 1));

    let r = core.surface.create_primitive(PrimitiveKind::Rect, bag(json!({ "width": 1.0, "height": 1.0 })));
    let b = core.register(r);
    let posterior = core.object(&b);
    core.record_change(ChangeKind::Create, b, None, posterior);
    assert_eq!(lens(&core), (1, 0));
    assert!(!core.redo());
    assert!(core.object(&a).is_none());
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "malformed change record"))]
fn record_change_rejects_malformed_record() {
    let mut core = core();
    core.record_change(ChangeKind::Create, Identity::from("a"), None, None);
    assert_eq!(lens(&core), (0, 0));
    assert!(core.broadcaster().is_empty());
}

#[test]
fn adopted_primitive_is_identified_but_not_recorded() {
    let mut core = core();
    let a = core.adopt(&bag(json!({ "type": "rectangle", "width": 3.0 }))).unwrap();
    assert_eq!(core.object(&a).unwrap().get("type"), Some(&json!("rect")));
    assert_eq!(lens(&core), (0, 0));
    assert!(core.broadcaster().is_empty());
    assert!(core.adopt(&bag(json!({ "type": "blob" }))).is_err());
    assert_eq!(core.surface.len(), 1);
}

#[test]
fn host_changes_are_mirrored_then_undoable() {
    let mut core = core();
    let a = core.adopt(&bag(json!({ "type": "circle", "fill": "red" }))).unwrap();
    let created = core.object(&a);
    core.record_host_change(ChangeKind::Create, a.clone(), None, created.clone());

    let prior = created.clone().unwrap();
    let mut posterior = prior.clone();
    posterior.insert("fill".into(), json!("blue"));
    core.record_host_change(ChangeKind::Modify, a.clone(), Some(prior), Some(posterior));
    assert_eq!(fill(&core, &a).as_deref(), Some("blue"));

    let last = core.object(&a);
    core.record_host_change(ChangeKind::Remove, a.clone(), last, None);
    assert!(core.object(&a).is_none());
    assert_eq!(lens(&core), (3, 0));
    assert_eq!(core.broadcaster_mut().drain().len(), 3);

    assert!(core.undo());
    assert_eq!(fill(&core, &a).as_deref(), Some("blue"));
    assert!(core.undo());
    assert_eq!(fill(&core, &a).as_deref(), Some("red"));
    assert!(core.undo());
    assert!(core.surface.is_empty());
    assert_eq!(lens(&core), (0, 3));
}

// =============================================================
// Scenarios
// =============================================================

#[test]
fn circle_modify_undo_redo_scenario() {
    let mut core = core();
    let r = core
        .surface
        .create_primitive(PrimitiveKind::Circle, bag(json!({ "radius": 50.0, "fill": "red" })));
    let a = core.register(r);
    let created = core.object(&a);
    core.record_change(ChangeKind::Create, a.clone(), None, created);

    let prior = core.object(&a).unwrap();
    let mut posterior = prior.clone();
    posterior.insert("fill".into(), json!("blue"));
    core.surface.set_properties(&r, posterior.clone());
    core.record_change(ChangeKind::Modify, a.clone(), Some(prior), Some(posterior));
    assert_eq!(fill(&core, &a).as_deref(), Some("blue"));

    assert!(core.undo());
    assert_eq!(fill(&core, &a).as_deref(), Some("red"));
    assert_eq!(core.history().redo_len(), 1);

    assert!(core.undo());
    assert!(core.object(&a).is_none());
    assert!(core.surface.is_empty());

    assert!(core.redo());
    assert_eq!(fill(&core, &a).as_deref(), Some("red"));

    assert!(core.redo());
    assert_eq!(fill(&core, &a).as_deref(), Some("blue"));
    assert_eq!(lens(&core), (2, 0));
}

#[test]
fn creation_is_broadcast_exactly_once() {
    let mut core = core();
    let a = core.add_shape(Shape::Triangle, center());
    let snapshot = core.object(&a).map(Value::Object).unwrap();

    let sent = core.broadcaster_mut().drain();
    assert_eq!(sent, vec![WireMessage::new(Action::AddShape, a.as_str(), snapshot)]);

    core.undo();
    core.redo();
    core.undo();
    core.redo();
    assert!(core.broadcaster().is_empty());
}

#[test]
fn minimal_text_survives_remove_and_undo() {
    let mut core = core();
    let a = core.create(PrimitiveKind::Text, bag(json!({ "fill": "red" })));
    let sent = core.broadcaster_mut().drain();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, Action::AddText);

    let snapshot = core.object(&a);
    assert!(core.remove(&a));
    assert!(core.undo());
    assert_eq!(core.object(&a), snapshot);
    assert_eq!(core.objects()[0].1.get("type"), Some(&json!("i-text")));

    assert!(core.undo());
    assert!(core.surface.is_empty());
    assert!(core.redo());
    assert_eq!(core.object(&a), snapshot);
}

#[test]
fn shapes_without_geometry_round_trip_through_history() {
    let mut core = core();
    for kind in [PrimitiveKind::Circle, PrimitiveKind::Rect, PrimitiveKind::Triangle, PrimitiveKind::Path] {
        core.create(kind, PropertyBag::new());
    }
    let initial = state(&core);
    for id in initial.keys() {
        core.remove(id);
    }
    assert!(core.surface.is_empty());
    while core.history().undo_len() > 4 {
        core.undo();
    }
    assert_eq!(state(&core), initial);
}

// =============================================================
// Properties
// =============================================================

#[test]
fn n_edits_then_n_undos_restore_initial_state() {
    let mut core = core();
    let n = run_edits(&mut core);
    assert_eq!(core.history().undo_len(), n);
    assert!(!core.surface.is_empty());

    for _ in 0..n {
        assert!(core.undo());
    }
    assert!(core.surface.is_empty());
    assert!(core.all_identities().is_empty());
    assert_eq!(lens(&core), (0, n));
}

#[test]
fn undo_then_redo_restores_exact_state_at_every_step() {
    let mut core = core();
    let n = run_edits(&mut core);

    for _ in 0..n {
        let before = state(&core);
        assert!(core.undo());
        assert!(core.redo());
        assert_eq!(state(&core), before);
        assert!(core.undo());
    }
}

#[test]
fn full_redo_after_full_undo_restores_final_state() {
    let mut core = core();
    let n = run_edits(&mut core);
    let done = state(&core);
    while core.undo() {}
    while core.redo() {}
    assert_eq!(state(&core), done);
    assert_eq!(lens(&core), (n, 0));
}

#[test]
fn local_edit_after_undo_discards_redo_buffer() {
    let mut core = core();
    run_edits(&mut core);
    core.undo();
    core.undo();
    core.undo();
    assert_eq!(core.history().redo_len(), 3);

    core.add_text(center());
    assert_eq!(core.history().redo_len(), 0);
    assert!(!core.redo());
}

#[test]
fn undo_and_redo_on_empty_stacks_are_noops() {
    let mut core = core();
    assert!(!core.undo());
    assert!(!core.redo());
    assert_eq!(lens(&core), (0, 0));

    core.add_shape(Shape::Circle, center());
    assert!(!core.redo());
    assert_eq!(lens(&core), (1, 0));
    assert!(core.undo());
    assert!(!core.undo());
    assert_eq!(lens(&core), (0, 1));
    assert!(core.redo());
    assert!(!core.redo());
    assert_eq!(lens(&core), (1, 0));
}

#[test]
fn identity_survives_remove_undo_redo_cycle() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    let original = core.resolve(&a).unwrap();
    let snapshot = core.object(&a);

    assert!(core.remove(&a));
    assert!(core.resolve(&a).is_none());

    assert!(core.undo());
    let recreated = core.resolve(&a).unwrap();
    assert_ne!(recreated, original);
    assert_eq!(core.object(&a), snapshot);
    assert_eq!(core.all_identities(), vec![a.clone()]);

    assert!(core.redo());
    assert!(core.resolve(&a).is_none());

    assert!(core.undo());
    assert_eq!(core.object(&a), snapshot);
}

#[test]
fn undo_and_redo_never_record_new_entries() {
    let mut core = core();
    core.add_shape(Shape::Circle, center());
    core.add_text(center());
    core.broadcaster_mut().drain();

    core.undo();
    assert_eq!(lens(&core), (1, 1));
    core.undo();
    assert_eq!(lens(&core), (0, 2));
    core.redo();
    assert_eq!(lens(&core), (1, 1));
    assert!(core.broadcaster().is_empty());
}

// =============================================================
// Stale identities
// =============================================================

#[test]
fn undo_of_create_removed_by_peer_is_skipped() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    core.apply_remote(&WireMessage::new(Action::Remove, a.as_str(), json!({}))).unwrap();
    assert!(core.surface.is_empty());

    assert!(core.undo());
    assert_eq!(lens(&core), (0, 1));
    assert!(core.surface.is_empty());
}

#[test]
fn undo_of_modify_on_vanished_primitive_is_skipped() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    core.modify(&a, &bag(json!({ "fill": "blue" })));
    core.apply_remote(&WireMessage::new(Action::Remove, a.as_str(), json!({}))).unwrap();

    assert!(core.undo());
    assert!(core.object(&a).is_none());
    assert!(core.redo());
    assert!(core.object(&a).is_none());
}

#[test]
fn primitive_removed_behind_engines_back_is_stale() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    let r = core.resolve(&a).unwrap();
    core.surface.remove_primitive(&r);

    assert!(core.resolve(&a).is_none());
    assert!(!core.remove(&a));
    assert!(!core.modify(&a, &bag(json!({ "fill": "x" }))));
    assert!(core.undo());
}

#[test]
fn undo_of_remove_when_identity_already_back_overwrites() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    let snapshot = core.object(&a).unwrap();
    core.remove(&a);

    let mut peer_copy = snapshot.clone();
    peer_copy.insert("fill".into(), json!("green"));
    core.apply_remote(&WireMessage::new(Action::AddShape, a.as_str(), Value::Object(peer_copy)))
        .unwrap();

    assert!(core.undo());
    assert_eq!(core.surface.len(), 1);
    assert_eq!(core.object(&a), Some(snapshot));
}

#[test]
fn unknown_kind_in_snapshot_is_skipped_on_redo() {
    let mut core = EngineCore::with_parts(
        MemorySurface::new(),
        Outbox::new(),
        IdentityRegistry::with_allocator(IdentityAllocator::with_session("test")),
        KindRegistry::empty(),
    );
    let a = core.create(PrimitiveKind::Circle, bag(json!({ "radius": 1.0 })));
    assert!(core.undo());
    assert!(core.redo());
    assert!(core.object(&a).is_none());
    assert_eq!(lens(&core), (1, 0));
}

// =============================================================
// Remote edits
// =============================================================

#[test]
fn remote_create_places_primitive_under_its_identity() {
    let mut core = core();
    let applied = core
        .apply_remote_json(r#"{"action":"addShape","identity":"peer_1","snapshot":{"type":"rect","width":10,"height":20}}"#)
        .unwrap();
    assert!(applied);
    let id = Identity::from("peer_1");
    assert!(core.resolve(&id).is_some());
    assert_eq!(core.object(&id).unwrap().get("width"), Some(&json!(10)));
    assert_eq!(lens(&core), (0, 0));
    assert!(core.broadcaster().is_empty());
}

#[test]
fn remote_edits_never_touch_history() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    core.undo();
    core.redo();
    core.undo();
    let before = lens(&core);

    core.apply_remote(&WireMessage::new(Action::AddLine, "p", json!({ "type": "path", "path": "M 0 0" })))
        .unwrap();
    core.apply_remote(&WireMessage::new(Action::Modify, "p", json!({ "type": "path", "path": "M 1 1" })))
        .unwrap();
    core.apply_remote(&WireMessage::new(Action::Remove, a.as_str(), json!({}))).unwrap();
    assert_eq!(lens(&core), before);
    assert!(core.redo());
}

#[test]
fn remote_add_on_live_identity_is_last_write_wins() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    core.apply_remote(&WireMessage::new(
        Action::AddShape,
        a.as_str(),
        json!({ "type": "circle", "radius": 9.0, "fill": "pink" }),
    ))
    .unwrap();
    assert_eq!(core.surface.len(), 1);
    assert_eq!(fill(&core, &a).as_deref(), Some("pink"));
}

#[test]
fn remote_add_with_other_kind_replaces_primitive() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    assert!(core
        .apply_remote(&WireMessage::new(Action::AddShape, a.as_str(), json!({ "type": "rect", "width": 4.0, "fill": "teal" })))
        .unwrap());
    assert_eq!(core.surface.len(), 1);
    let current = core.object(&a).unwrap();
    assert_eq!(current.get("type"), Some(&json!("rect")));
    assert_eq!(current.get("width"), Some(&json!(4.0)));
    assert!(current.get("radius").is_none());
    assert_eq!(core.all_identities(), vec![a]);
}

#[test]
fn remote_minimal_text_is_placed() {
    let mut core = core();
    assert!(core
        .apply_remote(&WireMessage::new(Action::AddText, "peer_t", json!({ "type": "i-text" })))
        .unwrap());
    assert_eq!(core.object(&Identity::from("peer_t")).unwrap().get("type"), Some(&json!("i-text")));
}

#[test]
fn remote_modify_and_remove_of_unknown_identity_are_skipped() {
    let mut core = core();
    assert!(!core.apply_remote(&WireMessage::new(Action::Modify, "ghost", json!({}))).unwrap());
    assert!(!core.apply_remote(&WireMessage::new(Action::Remove, "ghost", json!({}))).unwrap());
}

#[test]
fn remote_create_of_unknown_kind_is_skipped() {
    let mut core = core();
    assert!(!core.apply_remote(&WireMessage::new(Action::AddShape, "x", json!({ "type": "blob" }))).unwrap());
    assert!(core.surface.is_empty());
}

#[test]
fn malformed_remote_json_is_an_error_and_changes_nothing() {
    let mut core = core();
    core.add_shape(Shape::Circle, center());
    assert!(core.apply_remote_json("{not json").is_err());
    assert!(matches!(
        core.apply_remote_json(r#"{"action":"modify","identity":"","snapshot":{}}"#),
        Err(CodecError::EmptyIdentity)
    ));
    assert_eq!(core.surface.len(), 1);
    assert_eq!(lens(&core), (1, 0));
}

#[test]
fn remote_remove_deselects() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    assert_eq!(core.ui.selection, vec![a.clone()]);
    core.apply_remote(&WireMessage::new(Action::Remove, a.as_str(), json!({}))).unwrap();
    assert!(core.ui.selection.is_empty());
}

// =============================================================
// Transport failures
// =============================================================

#[test]
fn failed_broadcast_keeps_local_edit() {
    let failing = |_: &WireMessage| -> Result<(), TransportError> { Err(TransportError::Closed) };
    let mut core = EngineCore::new(MemorySurface::new(), failing);
    let a = core.add_shape(Shape::Circle, center());
    assert!(core.object(&a).is_some());
    assert_eq!(core.history().undo_len(), 1);
    assert!(core.undo());
    assert!(core.object(&a).is_none());
}

// =============================================================
// clearAll
// =============================================================

#[test]
fn clear_all_empties_surface_and_both_stacks() {
    let mut core = core();
    run_edits(&mut core);
    core.undo();
    core.broadcaster_mut().drain();
    let live = core.all_identities().len();

    core.clear_all();
    assert!(core.surface.is_empty());
    assert!(core.all_identities().is_empty());
    assert_eq!(lens(&core), (0, 0));
    assert!(!core.undo());
    assert!(!core.redo());
    assert!(core.ui.selection.is_empty());

    let sent = core.broadcaster_mut().drain();
    assert_eq!(sent.len(), live);
    assert!(sent.iter().all(|m| m.action == Action::Remove));
}

// =============================================================
// Toolbar
// =============================================================

#[test]
fn add_shape_uses_color_and_defaults_then_selects() {
    let mut core = core();
    core.set_tool(Tool::Pencil);
    core.ui.settings.color = "#123456".into();

    let c = core.add_shape(Shape::Circle, center());
    assert_eq!(
        core.object(&c).map(Value::Object),
        Some(json!({ "type": "circle", "radius": 50.0, "fill": "#123456", "left": 200.0, "top": 150.0 }))
    );
    assert_eq!(core.ui.selection, vec![c]);
    assert_eq!(core.ui.tool, Tool::Cursor);

    let r = core.add_shape(Shape::Rectangle, center());
    let rect = core.object(&r).unwrap();
    assert_eq!(rect.get("type"), Some(&json!("rect")));
    assert_eq!(rect.get("width"), Some(&json!(100.0)));

    let t = core.add_shape(Shape::Triangle, center());
    assert_eq!(core.object(&t).unwrap().get("type"), Some(&json!("triangle")));
}

#[test]
fn add_line_and_arrow_are_paths_announced_as_lines() {
    let mut core = core();
    let line = core.add_line(false, center());
    let arrow = core.add_line(true, center());
    assert_eq!(core.object(&line).unwrap().get("path"), Some(&json!("M 0 0 L 100 0")));
    assert_eq!(
        core.object(&arrow).unwrap().get("path"),
        Some(&json!("M 0 0 L 100 0 M 80 -10 L 100 0 L 80 10"))
    );
    assert_eq!(core.object(&arrow).unwrap().get("strokeWidth"), Some(&json!(2.0)));

    let sent = core.broadcaster_mut().drain();
    assert!(sent.iter().all(|m| m.action == Action::AddLine));
}

#[test]
fn add_text_uses_placeholder_and_is_announced_as_text() {
    let mut core = core();
    let t = core.add_text(center());
    let b = core.object(&t).unwrap();
    assert_eq!(Props::new(&b).text(), "Edit me");
    assert_eq!(b.get("fontSize"), Some(&json!(20.0)));
    assert_eq!(core.broadcaster_mut().drain()[0].action, Action::AddText);
}

#[test]
fn pencil_and_eraser_strokes() {
    let mut core = core();
    core.set_tool(Tool::Pencil);
    core.ui.settings.color = "#ff0000".into();
    let pencil = core.commit_stroke(json!("M 0 0 L 5 5"));
    let b = core.object(&pencil).unwrap();
    assert_eq!(Props::new(&b).stroke(), "#ff0000");
    assert_eq!(Props::new(&b).stroke_width(), 2.0);
    assert!(b.get("globalCompositeOperation").is_none());
    assert_eq!(core.ui.tool, Tool::Pencil);

    core.set_tool(Tool::Eraser);
    let eraser = core.commit_stroke(json!("M 0 0 L 5 5"));
    let b = core.object(&eraser).unwrap();
    assert_eq!(Props::new(&b).stroke(), "rgba(255,255,255,1)");
    assert_eq!(Props::new(&b).stroke_width(), 10.0);
    assert_eq!(b.get("globalCompositeOperation"), Some(&json!("destination-out")));
}

#[test]
fn set_color_recolors_active_primitive_as_modify() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    core.broadcaster_mut().drain();

    assert!(core.set_color("#00ff00"));
    assert_eq!(fill(&core, &a).as_deref(), Some("#00ff00"));
    assert_eq!(core.ui.settings.color, "#00ff00");
    let sent = core.broadcaster_mut().drain();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action, Action::Modify);

    assert!(core.undo());
    assert_eq!(fill(&core, &a).as_deref(), Some("#000000"));
}

#[test]
fn set_color_without_selection_only_changes_setting() {
    let mut core = core();
    assert!(!core.set_color("#abcdef"));
    assert_eq!(core.ui.settings.color, "#abcdef");
    assert_eq!(lens(&core), (0, 0));
}

#[test]
fn modify_without_change_records_nothing() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    assert!(!core.modify(&a, &bag(json!({ "fill": "#000000" }))));
    assert_eq!(lens(&core), (1, 0));
}

#[test]
fn modify_of_kind_tag_alone_records_nothing() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    core.broadcaster_mut().drain();
    let before = core.object(&a);
    assert!(!core.modify(&a, &bag(json!({ "type": "rect" }))));
    assert_eq!(lens(&core), (1, 0));
    assert!(core.broadcaster().is_empty());
    assert_eq!(core.object(&a), before);
}

#[test]
fn select_requires_live_identity() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    core.ui.selection.clear();
    assert!(core.select(&a));
    assert_eq!(core.ui.selection, vec![a]);
    assert!(!core.select(&Identity::from("ghost")));
}

// =============================================================
// Keyboard
// =============================================================

#[test]
fn delete_key_removes_selection() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    assert!(core.on_key_down(&Key("Delete".into()), Modifiers::default()));
    assert!(core.object(&a).is_none());
    assert!(core.ui.selection.is_empty());
    assert_eq!(core.history().records().last().map(ChangeRecord::kind), Some(ChangeKind::Remove));
}

#[test]
fn delete_key_removes_every_selected_primitive() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    let b = core.add_line(false, center());
    core.ui.selection = vec![a, b];
    assert_eq!(core.delete_selection(), 2);
    assert!(core.surface.is_empty());
    assert!(core.undo());
    assert!(core.undo());
    assert_eq!(core.surface.len(), 2);
}

#[test]
fn backspace_in_active_text_does_not_delete() {
    let mut core = core();
    let t = core.add_text(center());
    assert!(!core.on_key_down(&Key("Backspace".into()), Modifiers::default()));
    assert!(core.object(&t).is_some());
    assert_eq!(core.ui.selection, vec![t]);
}

#[test]
fn ctrl_z_and_ctrl_y_drive_history() {
    let mut core = core();
    let a = core.add_shape(Shape::Circle, center());
    let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };

    assert!(core.on_key_down(&Key("z".into()), ctrl));
    assert!(core.object(&a).is_none());
    assert!(core.on_key_down(&Key("y".into()), ctrl));
    assert!(core.object(&a).is_some());
    assert!(!core.on_key_down(&Key("q".into()), ctrl));
}
