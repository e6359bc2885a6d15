use std::rc::Rc;

use cgmath::{Matrix4, Vector3};
use model_stats::{
    aggregate,
    data_structures::scene_graph::{
        Geometry, Material, MaterialProperty, MaterialSlot, Mesh, Object3D, Scene, Texture,
    },
    stats::{IdentitySet, TextureSet},
};

use crate::common::test_utils::{
    indexed_geometry, mesh_node, scene_of, soup_geometry, translated,
};

mod common;

#[test]
fn scene_without_meshes_reports_zero() {
    let mut group = Object3D::group("Lights");
    group.add_child(Object3D::group("Sun"));
    let snapshot = aggregate(&scene_of(vec![group]), 0);

    assert_eq!(snapshot.triangles, 0.0);
    assert_eq!(snapshot.meshes, 0);
    assert_eq!(snapshot.materials, 0);
    assert_eq!(snapshot.textures, 0);
    assert!(snapshot.bounds.is_empty());
    assert_eq!(snapshot.dimensions(), Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn indexed_and_soup_meshes_count_the_same() {
    let material = Rc::new(Material::new("m"));
    let indexed = aggregate(&scene_of(vec![mesh_node("a", indexed_geometry(300), material.clone())]), 0);
    let soup = aggregate(&scene_of(vec![mesh_node("b", soup_geometry(300), material)]), 0);

    assert_eq!(indexed.triangles, 100.0);
    assert_eq!(soup.triangles, 100.0);
}

#[test]
fn triangles_are_not_rounded_while_accumulating() {
    let material = Rc::new(Material::new("m"));
    let scene = scene_of(vec![
        mesh_node("a", soup_geometry(4), material.clone()),
        mesh_node("b", soup_geometry(4), material.clone()),
        mesh_node("c", soup_geometry(1), material),
    ]);
    // 4/3 + 4/3 + 1/3 = 3, rounding per mesh would give 2
    let snapshot = aggregate(&scene, 0);
    assert!((snapshot.triangles - 3.0).abs() < 1e-9);
}

#[test]
fn shared_material_is_counted_once() {
    let shared = Rc::new(Material::new("shared"));
    let twin = Rc::new(Material::new("shared"));
    let scene = scene_of(vec![
        mesh_node("a", indexed_geometry(3), shared.clone()),
        mesh_node("b", indexed_geometry(3), shared.clone()),
        mesh_node("c", indexed_geometry(3), shared),
        // same parameters, different instance
        mesh_node("d", indexed_geometry(3), twin),
    ]);
    let snapshot = aggregate(&scene, 0);
    assert_eq!(snapshot.meshes, 4);
    assert_eq!(snapshot.materials, 2);
}

#[test]
fn texture_under_several_names_is_counted_once() {
    let packed = Rc::new(Texture::new("orm"));
    let albedo = Rc::new(Texture::new("albedo"));
    let material = Material::new("pbr")
        .with("map", MaterialProperty::Texture(albedo))
        .with("roughnessMap", MaterialProperty::Texture(packed.clone()))
        .with("metalnessMap", MaterialProperty::Texture(packed.clone()))
        .with("aoMap", MaterialProperty::Texture(packed))
        .with("roughness", MaterialProperty::Scalar(0.5));
    let scene = scene_of(vec![mesh_node("a", indexed_geometry(3), Rc::new(material))]);

    assert_eq!(aggregate(&scene, 0).textures, 2);
}

#[test]
fn textures_are_deduplicated_by_uuid_not_reference() {
    let original = Texture::new("albedo");
    // A second handle to the same texture resource.
    let wrapped = Rc::new(original.clone());
    let first = Material::new("first").with("map", MaterialProperty::Texture(Rc::new(original)));
    let second = Material::new("second").with("emissiveMap", MaterialProperty::Texture(wrapped));
    let scene = scene_of(vec![
        mesh_node("a", indexed_geometry(3), Rc::new(first)),
        mesh_node("b", indexed_geometry(3), Rc::new(second)),
    ]);

    let snapshot = aggregate(&scene, 0);
    assert_eq!(snapshot.materials, 2);
    assert_eq!(snapshot.textures, 1);
}

#[test]
fn material_lists_contribute_every_entry() {
    let a = Rc::new(Material::new("a"));
    let b = Rc::new(Material::new("b"));
    let mesh = Object3D::mesh(
        "multi",
        Mesh {
            geometry: Some(indexed_geometry(6)),
            material: MaterialSlot::List(vec![a.clone(), b, a]),
        },
    );
    let snapshot = aggregate(&scene_of(vec![mesh]), 0);
    assert_eq!(snapshot.meshes, 1);
    assert_eq!(snapshot.materials, 2);
}

#[test]
fn meshes_without_geometry_are_skipped() {
    let broken = Object3D::mesh(
        "broken",
        Mesh {
            geometry: None,
            material: MaterialSlot::Single(Rc::new(Material::new("orphan"))),
        },
    );
    let snapshot = aggregate(&scene_of(vec![broken]), 0);
    assert_eq!(snapshot.meshes, 0);
    assert_eq!(snapshot.materials, 0);
    assert!(snapshot.bounds.is_empty());
}

#[test]
fn bounds_are_taken_in_world_space() {
    let material = Rc::new(Material::new("m"));
    let unit = Rc::new(Geometry {
        index: None,
        positions: vec![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
    });
    let mut parent = translated(Object3D::group("parent"), 10.0, 0.0, 0.0);
    parent.add_child(
        mesh_node("child", unit.clone(), material.clone())
            .with_transform(Matrix4::from_scale(2.0)),
    );
    let scene = scene_of(vec![parent, mesh_node("origin", unit, material)]);

    let snapshot = aggregate(&scene, 0);
    assert_eq!(snapshot.bounds.min().x, 0.0);
    assert_eq!(snapshot.bounds.max().x, 12.0);
    assert_eq!(snapshot.dimensions(), Vector3::new(12.0, 2.0, 2.0));
}

#[test]
fn visiting_order_does_not_change_the_result() {
    let shared = Rc::new(Material::new("shared"));
    let texture = Rc::new(Texture::new("t"));
    let textured = Rc::new(Material::new("textured").with("map", MaterialProperty::Texture(texture)));
    let nodes = vec![
        translated(mesh_node("a", indexed_geometry(9), shared.clone()), -3.0, 0.0, 0.0),
        mesh_node("b", soup_geometry(6), textured.clone()),
        translated(mesh_node("c", indexed_geometry(3), shared), 0.0, 4.0, 0.0),
        mesh_node("d", soup_geometry(12), textured),
    ];
    let mut reversed = nodes.clone();
    reversed.reverse();

    assert_eq!(aggregate(&scene_of(nodes), 3), aggregate(&scene_of(reversed), 3));
}

#[test]
fn animation_count_is_passed_through() {
    assert_eq!(aggregate(&Scene::default(), 4).animations, 4);
}

#[test]
fn identity_and_uuid_sets_use_different_equality() {
    let a = Rc::new(Material::new("same"));
    let b = Rc::new(Material::new("same"));
    let mut materials = IdentitySet::new();
    assert!(materials.is_empty());
    assert!(materials.insert(a.clone()));
    assert!(!materials.insert(a));
    assert!(materials.insert(b));
    assert_eq!(materials.len(), 2);

    let mut textures = TextureSet::new();
    assert!(textures.insert("uuid-1".to_string()));
    assert!(!textures.insert("uuid-1".to_string()));
    assert_eq!(textures.len(), 1);
}

#[test]
fn textures_get_random_v4_uuids() {
    let a = Texture::new("albedo");
    let b = Texture::new("albedo");
    assert_ne!(a.uuid, b.uuid);
    for texture in [&a, &b] {
        let parsed = uuid::Uuid::parse_str(&texture.uuid).expect("uuid should parse");
        assert_eq!(parsed.get_version_num(), 4);
    }
    // A clone is the same resource.
    assert_eq!(a.clone().uuid, a.uuid);
}
