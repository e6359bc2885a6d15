//! Locating the scene graph inside a host viewer.
//!
//! Host viewers do not hand out their scene through a public API. The lookup
//! is therefore isolated behind `SceneProvider`, so the brittle part can be
//! replaced once a host offers something better.

use std::{marker::PhantomData, rc::Rc};

use crate::{
    data_structures::{
        reflect::{Reflect, Symbol, downcast},
        scene_graph::Scene,
    },
    stats::Traverse,
};

/// Read-only facts a host viewer exposes publicly.
pub trait HostViewer {
    /// Location the current asset was loaded from.
    fn source(&self) -> Option<String>;

    /// Length of the viewer's list of available animations.
    fn animation_count(&self) -> usize;
}

/// Objects whose internals live in symbol-keyed slots.
pub trait SymbolKeyed {
    fn own_property_symbols(&self) -> Vec<Symbol>;

    fn get(&self, symbol: &Symbol) -> Option<Rc<dyn Reflect>>;
}

/// Given a host viewer handle, find its scene graph root.
pub trait SceneProvider {
    type Host: ?Sized;
    type Scene: Traverse;

    /// `None` if the host is absent or no scene could be found. Never fails.
    fn locate(&self, host: Option<&Self::Host>) -> Option<Self::Scene>;
}

/// Finds the scene by scanning every symbol-keyed slot of the host for a
/// value with a `scene` field that carries the `isScene` marker.
///
/// Neither symbol descriptions nor the type of the slot value are consulted,
/// only the shape `slot.scene.isScene`.
pub struct SymbolScanProvider<H: ?Sized> {
    host: PhantomData<fn(&H)>,
}

impl<H: ?Sized> SymbolScanProvider<H> {
    pub fn new() -> Self {
        Self { host: PhantomData }
    }
}

impl<H: ?Sized> Default for SymbolScanProvider<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: SymbolKeyed + ?Sized> SceneProvider for SymbolScanProvider<H> {
    type Host = H;
    type Scene = Rc<Scene>;

    fn locate(&self, host: Option<&H>) -> Option<Rc<Scene>> {
        let host = host?;
        let (symbol, scene) = host.own_property_symbols().into_iter().find_map(|symbol| {
            let scene = host.get(&symbol)?.field("scene")?;
            scene.flag("isScene").then_some((symbol, scene))
        })?;
        log::debug!("found scene behind {:?}", symbol);
        // The first marked value wins even if it turns out to be unreadable.
        downcast::<Scene>(scene)
    }
}
