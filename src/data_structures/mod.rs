//! Data structures the statistics are computed from.
//!
//! - `bounds` holds the axis-aligned box accumulator used for world extents
//! - `reflect` models symbol-keyed internals and structural lookups on them
//! - `scene_graph` contains the node tree, meshes, geometries, materials and textures

pub mod bounds;
pub mod reflect;
pub mod scene_graph;
