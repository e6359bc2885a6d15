//! model-stats
//!
//! A small statistics overlay for 3D model viewers. Whenever the host viewer
//! reports a finished load, the overlay finds the viewer's scene graph, walks
//! it once and shows triangle, mesh, material and texture counts, the
//! world-space dimensions, the number of animations and the asset's file size.
//!
//! High-level modules
//! - `data_structures`: bounding boxes, reflection helpers and the scene graph
//! - `resources`: glTF loading and file-size lookups
//! - `locator`: finding the scene inside an opaque host viewer
//! - `stats`: the single-pass aggregation into a `StatsSnapshot`
//! - `format`: text rendering of byte counts, counters and dimensions
//! - `overlay`: the overlay state driven by load notifications
//! - `viewer`: a headless host viewer for native use
//! - `web`: the `<model-viewer>` backend (wasm only)
//!

pub mod config;
pub mod data_structures;
pub mod error;
pub mod format;
pub mod locator;
pub mod overlay;
pub mod resources;
pub mod stats;
pub mod viewer;
#[cfg(target_arch = "wasm32")]
pub mod web;

// Re-exports commonly used types for convenience in downstream code.
pub use config::StatsConfig;
pub use locator::{HostViewer, SceneProvider, SymbolScanProvider};
pub use overlay::{Metric, ModelStats};
pub use stats::{StatsSnapshot, aggregate};
pub use viewer::ModelViewer;

/// Sets up logging for the current platform. Safe to call more than once.
pub fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        // Fails only if a logger is already installed.
        let _ = console_log::init_with_level(log::Level::Info);
    }
}
