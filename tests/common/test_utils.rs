#![allow(dead_code)]

use std::{path::PathBuf, rc::Rc};

use cgmath::Matrix4;
use model_stats::{
    data_structures::{
        reflect::{Reflect, Symbol},
        scene_graph::{Geometry, Material, MaterialSlot, Mesh, Object3D, Scene},
    },
    locator::{HostViewer, SymbolKeyed},
};

/// A host whose internals are set up by the test.
pub(crate) struct SlotHost {
    pub slots: Vec<(Symbol, Rc<dyn Reflect>)>,
    pub src: Option<String>,
    pub animations: usize,
}

impl SlotHost {
    pub fn bare() -> Self {
        Self {
            slots: Vec::new(),
            src: None,
            animations: 0,
        }
    }

    pub fn with_slot(mut self, description: &'static str, value: Rc<dyn Reflect>) -> Self {
        self.slots.push((Symbol::new(Some(description)), value));
        self
    }

    pub fn with_scene(self, scene: Scene) -> Self {
        let holder: Rc<dyn Reflect> = Rc::new(Holder::of(Rc::new(scene)));
        self.with_slot("scene", holder)
    }
}

impl SymbolKeyed for SlotHost {
    fn own_property_symbols(&self) -> Vec<Symbol> {
        self.slots.iter().map(|(symbol, _)| symbol.clone()).collect()
    }

    fn get(&self, symbol: &Symbol) -> Option<Rc<dyn Reflect>> {
        self.slots
            .iter()
            .find(|(key, _)| key == symbol)
            .map(|(_, value)| value.clone())
    }
}

impl HostViewer for SlotHost {
    fn source(&self) -> Option<String> {
        self.src.clone()
    }

    fn animation_count(&self) -> usize {
        self.animations
    }
}

/// Slot value with an optional `scene` field.
pub(crate) struct Holder {
    pub scene: Option<Rc<dyn Reflect>>,
}

impl Holder {
    pub fn empty() -> Self {
        Self { scene: None }
    }

    pub fn of(scene: Rc<dyn Reflect>) -> Self {
        Self { scene: Some(scene) }
    }
}

impl Reflect for Holder {
    fn field(&self, name: &str) -> Option<Rc<dyn Reflect>> {
        match name {
            "scene" => self.scene.clone(),
            _ => None,
        }
    }
}

/// Looks like a slot value but carries no scene marker.
pub(crate) struct Impostor;

impl Reflect for Impostor {}

/// Carries the scene marker without being a scene.
pub(crate) struct MarkedImpostor;

impl Reflect for MarkedImpostor {
    fn flag(&self, marker: &str) -> bool {
        marker == "isScene"
    }
}

pub(crate) fn indexed_geometry(index_len: usize) -> Rc<Geometry> {
    Rc::new(Geometry {
        index: Some((0..index_len as u32).map(|i| i % 3).collect()),
        positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    })
}

pub(crate) fn soup_geometry(positions: usize) -> Rc<Geometry> {
    Rc::new(Geometry {
        index: None,
        positions: (0..positions).map(|i| [i as f32 * 0.01, 0.0, 0.0]).collect(),
    })
}

pub(crate) fn mesh_node(name: &str, geometry: Rc<Geometry>, material: Rc<Material>) -> Object3D {
    Object3D::mesh(
        name,
        Mesh {
            geometry: Some(geometry),
            material: MaterialSlot::Single(material),
        },
    )
}

pub(crate) fn scene_of(children: Vec<Object3D>) -> Scene {
    let mut root = Object3D::group("Scene");
    for child in children {
        root.add_child(child);
    }
    Scene::new(root)
}

pub(crate) fn translated(node: Object3D, x: f32, y: f32, z: f32) -> Object3D {
    node.with_transform(Matrix4::from_translation([x, y, z].into()))
}

/// Writes `bytes` to a per-process temp file and returns its path.
pub(crate) fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("model-stats-{}-{}", std::process::id(), name));
    std::fs::write(&path, bytes).expect("failed to write temp file");
    path
}

/// Packs a glTF JSON document and its binary buffer into a GLB container.
pub(crate) fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    out.extend_from_slice(b"BIN\0");
    out.extend_from_slice(&bin);
    out
}

/**
 * A small asset with known statistics:
 * - `Panel`: one indexed quad (2 triangles), material `Painted`, moved to x = 5
 * - `Pair`: two primitives of the same quad scaled by 2, materials `Plain` and none
 * - `Empty`: a node without mesh
 *
 * `Painted` uses texture 0 as base color and normal map and texture 1 as
 * metallic-roughness map. Two animations, one unnamed.
 *
 * Expected: 6 triangles, 3 meshes, 3 materials, 2 textures, 6 x 4 x 0, 2 animations.
 */
pub(crate) fn fixture_glb() -> Vec<u8> {
    let mut bin = Vec::new();
    // positions, offset 0, 48 bytes
    for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 2.0, 0.0], [0.0, 2.0, 0.0]] {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    // indices, offset 48, 12 bytes
    for i in [0u16, 1, 2, 0, 2, 3] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    // keyframe times, offset 60, 8 bytes
    for t in [0.0f32, 1.0] {
        bin.extend_from_slice(&t.to_le_bytes());
    }
    // translations, offset 68, 24 bytes
    for t in [[5.0f32, 0.0, 0.0], [5.0, 1.0, 0.0]] {
        for c in t {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    assert_eq!(bin.len(), 92);

    let json = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [0] } ],
  "nodes": [
    { "name": "Root", "children": [1, 2, 3] },
    { "name": "Panel", "mesh": 0, "translation": [5.0, 0.0, 0.0] },
    { "name": "Pair", "mesh": 1, "scale": [2.0, 2.0, 2.0] },
    { "name": "Empty" }
  ],
  "meshes": [
    { "name": "Quad", "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 } ] },
    { "name": "Twins", "primitives": [
      { "attributes": { "POSITION": 0 }, "indices": 1, "material": 1 },
      { "attributes": { "POSITION": 0 }, "indices": 1 }
    ] }
  ],
  "materials": [
    {
      "name": "Painted",
      "pbrMetallicRoughness": {
        "baseColorTexture": { "index": 0 },
        "metallicRoughnessTexture": { "index": 1 }
      },
      "normalTexture": { "index": 0 }
    },
    { "name": "Plain" }
  ],
  "textures": [ { "source": 0 }, { "source": 1 } ],
  "images": [ { "uri": "albedo.png" }, { "uri": "orm.png" } ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 2.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 6, "type": "SCALAR" },
    { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] },
    { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }
  ],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 48, "target": 34962 },
    { "buffer": 0, "byteOffset": 48, "byteLength": 12, "target": 34963 },
    { "buffer": 0, "byteOffset": 60, "byteLength": 8 },
    { "buffer": 0, "byteOffset": 68, "byteLength": 24 }
  ],
  "buffers": [ { "byteLength": 92 } ],
  "animations": [
    {
      "name": "Wave",
      "channels": [ { "sampler": 0, "target": { "node": 1, "path": "translation" } } ],
      "samplers": [ { "input": 2, "output": 3 } ]
    },
    {
      "channels": [ { "sampler": 0, "target": { "node": 1, "path": "translation" } } ],
      "samplers": [ { "input": 2, "output": 3 } ]
    }
  ]
}"#;
    glb(json, &bin)
}

/// A valid asset with no meshes at all.
pub(crate) fn empty_glb() -> Vec<u8> {
    let json = r#"{
  "asset": { "version": "2.0" },
  "scene": 0,
  "scenes": [ { "nodes": [0] } ],
  "nodes": [ { "name": "Lonely" } ]
}"#;
    let mut out = Vec::new();
    let mut padded = json.as_bytes().to_vec();
    while padded.len() % 4 != 0 {
        padded.push(b' ');
    }
    let total = 12 + 8 + padded.len();
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(padded.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&padded);
    out
}

/// Serves `body` to the first HTTP request on a local port and returns its url.
pub(crate) async fn serve_once(path: &str, body: Vec<u8>) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test server");
    let addr = listener.local_addr().expect("no local address");
    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
            }
        }
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).await.ok();
        stream.write_all(&body).await.ok();
        stream.shutdown().await.ok();
    });
    format!("http://{addr}/{path}")
}
