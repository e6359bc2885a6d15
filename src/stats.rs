//! Scene statistics.
//!
//! `aggregate` walks a scene once and folds every mesh into a `StatsSnapshot`.
//! Scene backends plug in through `Traverse`: they only need to report one
//! `MeshSample` per mesh node that has geometry. The fold itself is order
//! independent, so backends may visit nodes in any order.

use std::collections::HashSet;
use std::rc::Rc;

use cgmath::{Matrix4, Vector3};

use crate::data_structures::{
    bounds::Box3,
    scene_graph::{Material, Scene},
};

/// Reference identity, as opposed to value equality.
pub trait SameInstance {
    fn same_instance(&self, other: &Self) -> bool;
}

impl<T> SameInstance for Rc<T> {
    fn same_instance(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

/// A material handle produced by a scene backend.
pub trait MaterialRef: SameInstance {
    /// Stable identifiers of every texture found among the material's properties.
    fn texture_ids(&self) -> Vec<String>;
}

impl MaterialRef for Rc<Material> {
    fn texture_ids(&self) -> Vec<String> {
        self.textures().map(|texture| texture.uuid.clone()).collect()
    }
}

/// What a single mesh node contributes.
#[derive(Debug, Clone)]
pub struct MeshSample<M> {
    /// Length of the index buffer, if the geometry is indexed.
    pub index_count: Option<usize>,
    /// Number of entries in the position attribute.
    pub position_count: usize,
    /// Extent of the mesh in world space.
    pub world_bounds: Box3,
    pub materials: Vec<M>,
}

impl<M> MeshSample<M> {
    pub fn triangles(&self) -> f64 {
        self.index_count.unwrap_or(self.position_count) as f64 / 3.0
    }
}

/// A scene that can report its meshes.
pub trait Traverse {
    type Material: MaterialRef;

    /// Calls `visit` once for every mesh node with attached geometry.
    fn traverse_meshes(&self, visit: &mut dyn FnMut(MeshSample<Self::Material>));
}

impl<T: Traverse + ?Sized> Traverse for Rc<T> {
    type Material = T::Material;

    fn traverse_meshes(&self, visit: &mut dyn FnMut(MeshSample<Self::Material>)) {
        (**self).traverse_meshes(visit)
    }
}

impl Traverse for Scene {
    type Material = Rc<Material>;

    fn traverse_meshes(&self, visit: &mut dyn FnMut(MeshSample<Self::Material>)) {
        self.traverse(&mut |node, world: &Matrix4<f32>| {
            let Some(mesh) = node.as_mesh() else {
                return;
            };
            // Meshes without geometry are skipped, not counted.
            let Some(geometry) = &mesh.geometry else {
                return;
            };
            visit(MeshSample {
                index_count: geometry.index.as_ref().map(Vec::len),
                position_count: geometry.positions.len(),
                world_bounds: geometry.bounding_box().apply_matrix(world),
                materials: mesh.material.iter().cloned().collect(),
            });
        });
    }
}

/// Set of materials deduplicated by reference identity.
pub struct IdentitySet<T> {
    items: Vec<T>,
}

impl<T: SameInstance> IdentitySet<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Returns false if this exact instance was already present.
    pub fn insert(&mut self, item: T) -> bool {
        if self.items.iter().any(|known| known.same_instance(&item)) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: SameInstance> Default for IdentitySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Set of textures deduplicated by their uuid, so wrappers of the same
/// texture collapse into one entry.
#[derive(Debug, Default)]
pub struct TextureSet {
    ids: HashSet<String>,
}

impl TextureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: String) -> bool {
        self.ids.insert(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Derived statistics of one loaded asset.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    /// Unrounded; only formatting rounds.
    pub triangles: f64,
    pub meshes: usize,
    pub materials: usize,
    pub textures: usize,
    pub bounds: Box3,
    pub animations: usize,
}

impl StatsSnapshot {
    /// Width, height and depth of the world-space bounds, zero if empty.
    pub fn dimensions(&self) -> Vector3<f32> {
        self.bounds.size()
    }
}

impl Default for StatsSnapshot {
    fn default() -> Self {
        Self {
            triangles: 0.0,
            meshes: 0,
            materials: 0,
            textures: 0,
            bounds: Box3::empty(),
            animations: 0,
        }
    }
}

/// Walks `scene` once and produces a fresh snapshot.
pub fn aggregate<S: Traverse + ?Sized>(scene: &S, animations: usize) -> StatsSnapshot {
    let started = instant::Instant::now();

    let mut triangles = 0.0;
    let mut meshes = 0;
    let mut bounds = Box3::empty();
    let mut materials = IdentitySet::new();
    let mut textures = TextureSet::new();

    scene.traverse_meshes(&mut |sample| {
        triangles += sample.triangles();
        meshes += 1;
        bounds = bounds.union(&sample.world_bounds);
        for material in sample.materials {
            for id in material.texture_ids() {
                textures.insert(id);
            }
            materials.insert(material);
        }
    });

    log::debug!(
        "aggregated {} meshes in {:?}",
        meshes,
        started.elapsed()
    );

    StatsSnapshot {
        triangles,
        meshes,
        materials: materials.len(),
        textures: textures.len(),
        bounds,
        animations,
    }
}
