#![allow(clippy::float_cmp)]

use serde_json::json;
use uuid::Uuid;

use super::*;

fn basic_at(x: f64, y: f64, z: f64) -> ObjectDraft {
    ObjectDraft::new("cube", Category::Basic).at(Vec3::new(x, y, z))
}

// =============================================================
// Category
// =============================================================

#[test]
fn category_serde_names_are_kebab_case() {
    let cases = [
        (Category::Basic, "\"basic\""),
        (Category::Architecture, "\"architecture\""),
        (Category::Furniture, "\"furniture\""),
        (Category::Landscape, "\"landscape\""),
        (Category::AiGenerated, "\"ai-generated\""),
    ];
    for (category, expected) in cases {
        assert_eq!(serde_json::to_string(&category).unwrap(), expected);
        let back: Category = serde_json::from_str(expected).unwrap();
        assert_eq!(back, category);
    }
}

#[test]
fn category_rejects_unknown_name() {
    assert!(serde_json::from_str::<Category>("\"vehicles\"").is_err());
    assert_eq!("vehicles".parse::<Category>(), Err(UnknownCategory("vehicles".into())));
}

#[test]
fn category_from_str_matches_display() {
    for category in Category::ALL {
        assert_eq!(category.to_string().parse::<Category>(), Ok(category));
    }
}

#[test]
fn category_colors_are_distinct() {
    let mut colors: Vec<&str> = Category::ALL.iter().map(|c| c.color()).collect();
    colors.sort_unstable();
    colors.dedup();
    assert_eq!(colors.len(), Category::ALL.len());
}

// =============================================================
// create
// =============================================================

#[test]
fn create_fills_defaults() {
    let mut store = SceneStore::new();
    let id = store.create(ObjectDraft::default());
    let obj = store.get(&id).unwrap();
    assert_eq!(obj.kind, DEFAULT_KIND);
    assert_eq!(obj.category, Category::Basic);
    assert_eq!(obj.position, Vec3::ZERO);
    assert_eq!(obj.scale, Vec3::ONE);
    assert_eq!(obj.rotation, Vec3::ZERO);
    assert!(obj.visible);
    assert!(!obj.locked);
    assert_eq!(obj.name, "cube 1");
}

#[test]
fn create_keeps_provided_fields() {
    let mut store = SceneStore::new();
    let id = store.create(
        ObjectDraft::new("wall", Category::Architecture)
            .at(Vec3::new(1.0, 2.0, 3.0))
            .scaled(Vec3::new(4.0, 3.0, 0.2))
            .named("North wall"),
    );
    let obj = store.get(&id).unwrap();
    assert_eq!(obj.name, "North wall");
    assert_eq!(obj.kind, "wall");
    assert_eq!(obj.category, Category::Architecture);
    assert_eq!(obj.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(obj.scale, Vec3::new(4.0, 3.0, 0.2));
}

#[test]
fn create_assigns_unique_ids() {
    let mut store = SceneStore::new();
    let a = store.create(ObjectDraft::default());
    let b = store.create(ObjectDraft::default());
    assert_ne!(a, b);
    assert_eq!(store.len(), 2);
}

#[test]
fn create_accepts_zero_scale() {
    let mut store = SceneStore::new();
    let id = store.create(ObjectDraft::default().scaled(Vec3::ZERO));
    assert_eq!(store.get(&id).unwrap().scale, Vec3::ZERO);
}

#[test]
fn scenario_single_basic_object() {
    let mut store = SceneStore::new();
    let a = store.create(basic_at(0.0, 0.0, 0.0));

    let list = store.list();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].id, a);

    let groups = store.group_by_category();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups.get(&Category::Basic), Some(&vec![a]));
}

// =============================================================
// update
// =============================================================

#[test]
fn update_merges_only_present_fields() {
    let mut store = SceneStore::new();
    let id = store.create(basic_at(1.0, 1.0, 1.0).named("Box"));
    store
        .update(&id, &ObjectPatch { position: Some(Vec3::new(5.0, 0.0, 0.0)), ..Default::default() })
        .unwrap();
    let obj = store.get(&id).unwrap();
    assert_eq!(obj.position, Vec3::new(5.0, 0.0, 0.0));
    assert_eq!(obj.name, "Box");
    assert_eq!(obj.scale, Vec3::ONE);
}

#[test]
fn update_missing_id_is_not_found() {
    let mut store = SceneStore::new();
    let ghost = Uuid::new_v4();
    let err = store.update(&ghost, &ObjectPatch::default()).unwrap_err();
    assert_eq!(err, ViewportError::NotFound(ghost));
}

#[test]
fn update_accepts_negative_scale() {
    let mut store = SceneStore::new();
    let id = store.create(ObjectDraft::default());
    let scale = Vec3::new(-1.0, 1.0, 1.0);
    store.update(&id, &ObjectPatch { scale: Some(scale), ..Default::default() }).unwrap();
    assert_eq!(store.get(&id).unwrap().scale, scale);
}

#[test]
fn toggling_visibility_leaves_transform_alone() {
    let mut store = SceneStore::new();
    let id = store.create(basic_at(1.0, 2.0, 3.0).scaled(Vec3::new(2.0, 2.0, 2.0)));
    let before = store.get(&id).unwrap().clone();

    for visible in [false, true, false] {
        store.update(&id, &ObjectPatch { visible: Some(visible), ..Default::default() }).unwrap();
        let obj = store.get(&id).unwrap();
        assert_eq!(obj.visible, visible);
        assert_eq!(obj.position, before.position);
        assert_eq!(obj.scale, before.scale);
        assert_eq!(obj.rotation, before.rotation);
    }
}

// =============================================================
// delete / list / group
// =============================================================

#[test]
fn delete_removes_and_returns_object() {
    let mut store = SceneStore::new();
    let id = store.create(ObjectDraft::default());
    let removed = store.delete(&id).unwrap();
    assert_eq!(removed.id, id);
    assert!(store.is_empty());
    assert!(store.list().is_empty());
}

#[test]
fn delete_twice_signals_not_found() {
    let mut store = SceneStore::new();
    let id = store.create(ObjectDraft::default());
    store.delete(&id).unwrap();
    assert_eq!(store.delete(&id).unwrap_err(), ViewportError::NotFound(id));
}

#[test]
fn list_preserves_insertion_order_across_mutation() {
    let mut store = SceneStore::new();
    let a = store.create(ObjectDraft::default());
    let b = store.create(ObjectDraft::default());
    let c = store.create(ObjectDraft::default());
    store.update(&a, &ObjectPatch { name: Some("zzz".into()), ..Default::default() }).unwrap();
    store.delete(&b).unwrap();
    let d = store.create(ObjectDraft::default());

    let ids: Vec<ObjectId> = store.list().iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![a, c, d]);
}

#[test]
fn group_by_category_reflects_latest_state() {
    let mut store = SceneStore::new();
    let wall = store.create(ObjectDraft::new("wall", Category::Architecture));
    let chair = store.create(ObjectDraft::new("chair", Category::Furniture));
    let door = store.create(ObjectDraft::new("door", Category::Architecture));

    let groups = store.group_by_category();
    assert_eq!(groups.get(&Category::Architecture), Some(&vec![wall, door]));
    assert_eq!(groups.get(&Category::Furniture), Some(&vec![chair]));

    store.delete(&chair).unwrap();
    let groups = store.group_by_category();
    assert!(!groups.contains_key(&Category::Furniture));
    assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![Category::Architecture]);
}

#[test]
fn ingest_creates_in_batch_order() {
    let mut store = SceneStore::new();
    let ids = store.ingest(vec![basic_at(0.0, 0.0, 0.0), basic_at(1.0, 0.0, 0.0)]);
    assert_eq!(ids.len(), 2);
    let listed: Vec<ObjectId> = store.list().iter().map(|o| o.id).collect();
    assert_eq!(listed, ids);
}

#[test]
fn ingest_empty_batch_is_noop() {
    let mut store = SceneStore::new();
    assert!(store.ingest(Vec::new()).is_empty());
    assert!(store.is_empty());
}

#[test]
fn visible_centroid_skips_hidden() {
    let mut store = SceneStore::new();
    assert_eq!(store.visible_centroid(), None);
    store.create(basic_at(2.0, 0.0, 0.0));
    store.create(basic_at(4.0, 2.0, 0.0));
    let hidden = store.create(basic_at(100.0, 100.0, 100.0));
    store.update(&hidden, &ObjectPatch { visible: Some(false), ..Default::default() }).unwrap();
    assert_eq!(store.visible_centroid(), Some(Vec3::new(3.0, 1.0, 0.0)));
}

// =============================================================
// serde
// =============================================================

#[test]
fn object_deserializes_with_optional_fields_absent() {
    let id = Uuid::new_v4();
    let obj: SceneObject = serde_json::from_value(json!({
        "id": id,
        "name": "Fern",
        "type": "ai-mesh",
        "category": "ai-generated",
        "position": [0.0, 1.0, 0.0],
        "scale": [1.0, 1.0, 1.0],
    }))
    .unwrap();
    assert_eq!(obj.rotation, Vec3::ZERO);
    assert!(obj.visible);
    assert!(!obj.locked);
    assert_eq!(obj.category, Category::AiGenerated);
}

#[test]
fn draft_deserializes_type_key() {
    let draft: ObjectDraft = serde_json::from_value(json!({ "type": "sofa", "position": [1, 0, 2] })).unwrap();
    assert_eq!(draft.kind.as_deref(), Some("sofa"));
    assert_eq!(draft.position, Some(Vec3::new(1.0, 0.0, 2.0)));
    assert_eq!(draft.category, None);
}
