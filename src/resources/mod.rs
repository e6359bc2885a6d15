use std::rc::Rc;

use cgmath::Matrix4;

use crate::data_structures::scene_graph::{
    Geometry, Material, MaterialProperty, MaterialSlot, Mesh, Object3D, Scene, Texture,
};

/**
 * This module contains all logic for loading assets and their metadata from external files.
 */
pub mod io;

/// A loaded asset as the host viewer keeps it.
#[derive(Debug)]
pub struct LoadedAsset {
    pub scene: Scene,
    pub animations: Vec<String>,
}

/// A primitive ready to be placed in the tree. Geometry and material are
/// shared by every node instancing the same glTF mesh.
type Primitive = (Rc<Geometry>, Rc<Material>);

pub async fn load_scene_gltf(src: &str) -> anyhow::Result<LoadedAsset> {
    let gltf_bytes = io::load_binary(src).await?;
    let gltf = gltf::Gltf::from_slice(&gltf_bytes)?;
    let buffer_data = load_buffers(&gltf, src).await?;
    Ok(to_asset(&gltf.document, &buffer_data))
}

/// Loads a self-contained asset (GLB, or glTF with embedded data) from memory.
pub fn load_scene_gltf_slice(bytes: &[u8]) -> anyhow::Result<LoadedAsset> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    let buffer_data = gltf::import_buffers(&gltf.document, None, gltf.blob.clone())?
        .into_iter()
        .map(|data| data.0)
        .collect::<Vec<_>>();
    Ok(to_asset(&gltf.document, &buffer_data))
}

async fn load_buffers(gltf: &gltf::Gltf, src: &str) -> anyhow::Result<Vec<Vec<u8>>> {
    #[cfg(not(target_arch = "wasm32"))]
    if !io::is_remote(src) {
        let base = std::path::Path::new(src).parent();
        let buffers = gltf::import_buffers(&gltf.document, base, gltf.blob.clone())?;
        return Ok(buffers.into_iter().map(|data| data.0).collect());
    }

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => match gltf.blob.as_deref() {
                Some(blob) => buffer_data.push(blob.into()),
                None => anyhow::bail!("{src}: buffer {} refers to a missing GLB chunk", buffer.index()),
            },
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                anyhow::bail!("{src}: embedded data URIs are only supported for local files");
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = io::load_binary(&io::resolve_relative(src, uri)).await?;
                buffer_data.push(bin);
            }
        }
    }
    Ok(buffer_data)
}

fn to_asset(document: &gltf::Document, buffers: &[Vec<u8>]) -> LoadedAsset {
    let textures: Vec<Rc<Texture>> = document
        .textures()
        .map(|texture| {
            let name = texture
                .name()
                .or_else(|| texture.source().name())
                .unwrap_or("texture");
            Rc::new(Texture::new(name))
        })
        .collect();

    let materials: Vec<Rc<Material>> = document
        .materials()
        .map(|material| Rc::new(to_material(&material, &textures)))
        .collect();
    // Primitives without a material all share one default instance.
    let default_material = Rc::new(Material::new("default"));

    let meshes: Vec<Vec<Primitive>> = document
        .meshes()
        .map(|mesh| {
            mesh.primitives()
                .map(|primitive| {
                    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                    let geometry = Geometry {
                        index: reader.read_indices().map(|indices| indices.into_u32().collect()),
                        positions: reader
                            .read_positions()
                            .map(|positions| positions.collect())
                            .unwrap_or_default(),
                    };
                    let material = primitive
                        .material()
                        .index()
                        .and_then(|idx| materials.get(idx).cloned())
                        .unwrap_or_else(|| default_material.clone());
                    (Rc::new(geometry), material)
                })
                .collect()
        })
        .collect();

    let mut root = Object3D::group("Scene");
    if let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) {
        for node in scene.nodes() {
            root.add_child(to_scene_node(node, &meshes));
        }
    } else {
        log::warn!("asset contains no scene, statistics will be empty");
    }

    let animations = document
        .animations()
        .map(|animation| {
            animation
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("animation_{}", animation.index()))
        })
        .collect();

    LoadedAsset {
        scene: Scene::new(root),
        animations,
    }
}

fn to_material(material: &gltf::Material, textures: &[Rc<Texture>]) -> Material {
    let texture = |idx: usize| textures.get(idx).cloned().map(MaterialProperty::Texture);
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b] = material.emissive_factor();

    let mut properties = vec![
        ("color", Some(MaterialProperty::Color(pbr.base_color_factor()))),
        ("roughness", Some(MaterialProperty::Scalar(pbr.roughness_factor()))),
        ("metalness", Some(MaterialProperty::Scalar(pbr.metallic_factor()))),
        ("emissive", Some(MaterialProperty::Color([r, g, b, 1.0]))),
        (
            "transparent",
            Some(MaterialProperty::Flag(
                material.alpha_mode() == gltf::material::AlphaMode::Blend,
            )),
        ),
        ("map", pbr.base_color_texture().and_then(|info| texture(info.texture().index()))),
        ("normalMap", material.normal_texture().and_then(|info| texture(info.texture().index()))),
        ("aoMap", material.occlusion_texture().and_then(|info| texture(info.texture().index()))),
        ("emissiveMap", material.emissive_texture().and_then(|info| texture(info.texture().index()))),
    ];
    // One packed texture drives both channels, it is the same resource under two names.
    let metallic_roughness = pbr
        .metallic_roughness_texture()
        .and_then(|info| texture(info.texture().index()));
    properties.push(("roughnessMap", metallic_roughness.clone()));
    properties.push(("metalnessMap", metallic_roughness));

    properties
        .into_iter()
        .filter_map(|(key, property)| property.map(|p| (key, p)))
        .fold(
            Material::new(material.name().unwrap_or("material")),
            |material, (key, property)| material.with(key, property),
        )
}

fn to_scene_node(node: gltf::scene::Node, meshes: &[Vec<Primitive>]) -> Object3D {
    let name = node.name().unwrap_or("node").to_string();
    let primitives = node.mesh().and_then(|mesh| meshes.get(mesh.index()));
    let scene_node = match primitives.map(Vec::as_slice) {
        Some([(geometry, material)]) => Object3D::mesh(name, to_mesh(geometry, material)),
        Some(primitives) => {
            let mut group = Object3D::group(name.as_str());
            for (idx, (geometry, material)) in primitives.iter().enumerate() {
                group.add_child(Object3D::mesh(format!("{name}_{idx}"), to_mesh(geometry, material)));
            }
            group
        }
        None => Object3D::group(name),
    };
    let mut scene_node = scene_node.with_transform(Matrix4::from(node.transform().matrix()));
    for child in node.children() {
        scene_node.add_child(to_scene_node(child, meshes));
    }

    scene_node
}

fn to_mesh(geometry: &Rc<Geometry>, material: &Rc<Material>) -> Mesh {
    Mesh {
        geometry: Some(geometry.clone()),
        material: MaterialSlot::Single(material.clone()),
    }
}
