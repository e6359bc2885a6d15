//! Scene graph of a loaded asset.
//!
//! A `Scene` owns a tree of `Object3D` nodes. Nodes carry a local transform and
//! are either plain groups or meshes. Meshes share `Geometry` and `Material`
//! resources through `Rc`, so the same material instance can be referenced by
//! many meshes and still be a single resource.

use std::{collections::BTreeMap, fmt, rc::Rc};

use cgmath::{Matrix4, Point3, SquareMatrix};
use uuid::Uuid;

use crate::data_structures::{bounds::Box3, reflect::Reflect};

/// An image resource referenced by materials.
///
/// Textures are compared by `uuid`: a cloned `Texture` is the same resource.
#[derive(Clone, Debug)]
pub struct Texture {
    pub uuid: String,
    pub name: String,
}

impl Texture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            name: name.into(),
        }
    }
}

impl Reflect for Texture {
    fn flag(&self, marker: &str) -> bool {
        marker == "isTexture"
    }
}

/// A named material parameter.
#[derive(Clone, Debug)]
pub enum MaterialProperty {
    Texture(Rc<Texture>),
    Color([f32; 4]),
    Scalar(f32),
    Flag(bool),
}

impl MaterialProperty {
    /// Some only for properties that hold a texture.
    pub fn as_texture(&self) -> Option<&Texture> {
        match self {
            MaterialProperty::Texture(texture) if texture.flag("isTexture") => Some(&**texture),
            _ => None,
        }
    }
}

/// A surface description. Materials have no stable identifier; two materials
/// with identical properties are still two resources.
#[derive(Debug, Default)]
pub struct Material {
    pub name: String,
    pub properties: BTreeMap<String, MaterialProperty>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, property: MaterialProperty) -> Self {
        self.properties.insert(key.to_string(), property);
        self
    }

    pub fn textures(&self) -> impl Iterator<Item = &Texture> {
        self.properties.values().filter_map(MaterialProperty::as_texture)
    }
}

/// Vertex data of a mesh. Only what statistics need is kept.
#[derive(Debug, Default)]
pub struct Geometry {
    pub index: Option<Vec<u32>>,
    pub positions: Vec<[f32; 3]>,
}

impl Geometry {
    /// Bounding box of the positions in local space.
    pub fn bounding_box(&self) -> Box3 {
        Box3::from_points(self.positions.iter().map(|p| Point3::from(*p)))
    }
}

/// Material binding of a mesh: three.js style single material or list.
#[derive(Clone, Debug, Default)]
pub enum MaterialSlot {
    #[default]
    None,
    Single(Rc<Material>),
    List(Vec<Rc<Material>>),
}

impl MaterialSlot {
    pub fn iter(&self) -> impl Iterator<Item = &Rc<Material>> {
        let slice: &[Rc<Material>] = match self {
            MaterialSlot::None => &[],
            MaterialSlot::Single(material) => std::slice::from_ref(material),
            MaterialSlot::List(materials) => materials,
        };
        slice.iter()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub geometry: Option<Rc<Geometry>>,
    pub material: MaterialSlot,
}

#[derive(Clone, Debug, Default)]
pub enum NodeKind {
    #[default]
    Group,
    Mesh(Mesh),
}

/// A node in the scene tree.
#[derive(Clone)]
pub struct Object3D {
    pub name: String,
    pub local_transform: Matrix4<f32>,
    pub kind: NodeKind,
    pub children: Vec<Object3D>,
}

impl Object3D {
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local_transform: Matrix4::identity(),
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            kind: NodeKind::Mesh(mesh),
            ..Self::group(name)
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.local_transform = transform;
        self
    }

    pub fn add_child(&mut self, child: Object3D) {
        self.children.push(child);
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    /**
     * Visits this node and all descendants depth-first. The callback receives
     * each node together with its world matrix (parents' transforms applied).
     */
    pub fn traverse(&self, parent_world: &Matrix4<f32>, visit: &mut dyn FnMut(&Object3D, &Matrix4<f32>)) {
        let world = *parent_world * self.local_transform;
        visit(self, &world);
        for child in &self.children {
            child.traverse(&world, visit);
        }
    }
}

impl fmt::Debug for Object3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object3D")
            .field("name", &self.name)
            .field("mesh", &self.as_mesh().is_some())
            .field("children", &self.children.len())
            .finish()
    }
}

/// Root of a renderable tree.
#[derive(Debug)]
pub struct Scene {
    pub root: Object3D,
}

impl Scene {
    pub fn new(root: Object3D) -> Self {
        Self { root }
    }

    pub fn traverse(&self, visit: &mut dyn FnMut(&Object3D, &Matrix4<f32>)) {
        self.root.traverse(&Matrix4::identity(), visit);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Object3D::group("Scene"))
    }
}

impl Reflect for Scene {
    fn flag(&self, marker: &str) -> bool {
        marker == "isScene"
    }
}
