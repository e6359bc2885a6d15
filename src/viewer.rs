//! A headless model viewer.
//!
//! `ModelViewer` plays the part of the host viewer outside the browser: it
//! loads glTF assets, exposes its source location and animation names, and
//! notifies subscribers once a load has finished. Its scene is deliberately
//! only reachable through symbol-keyed internals.

use std::rc::Rc;

use futures::channel::mpsc;

use crate::{
    data_structures::{
        reflect::{Reflect, Symbol},
        scene_graph::Scene,
    },
    locator::{HostViewer, SymbolKeyed},
    resources::{self, LoadedAsset},
};

/// Fired once per successfully loaded asset.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadEvent {
    pub src: String,
}

/// Internal renderer state holding the current scene.
struct ModelScene {
    scene: Rc<Scene>,
}

impl Reflect for ModelScene {
    fn field(&self, name: &str) -> Option<Rc<dyn Reflect>> {
        match name {
            "scene" => Some(self.scene.clone()),
            _ => None,
        }
    }
}

/// Internal progress bookkeeping, a slot that holds no scene.
struct LoadProgress {
    completed: usize,
}

impl Reflect for LoadProgress {
    fn flag(&self, marker: &str) -> bool {
        marker == "isComplete" && self.completed > 0
    }
}

pub struct ModelViewer {
    src: Option<String>,
    animations: Vec<String>,
    internals: Vec<(Symbol, Rc<dyn Reflect>)>,
    progress_symbol: Symbol,
    completed: usize,
    listeners: Vec<mpsc::UnboundedSender<LoadEvent>>,
}

impl ModelViewer {
    pub fn new() -> Self {
        let progress_symbol = Symbol::new(Some("progressTracker"));
        let progress: Rc<dyn Reflect> = Rc::new(LoadProgress { completed: 0 });
        Self {
            src: None,
            animations: Vec::new(),
            internals: vec![(progress_symbol.clone(), progress)],
            progress_symbol,
            completed: 0,
            listeners: Vec::new(),
        }
    }

    /// Subscribes to load notifications.
    pub fn on_load(&mut self) -> mpsc::UnboundedReceiver<LoadEvent> {
        let (sender, receiver) = mpsc::unbounded();
        self.listeners.push(sender);
        receiver
    }

    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn available_animations(&self) -> &[String] {
        &self.animations
    }

    /// Loads the asset at `src` and notifies subscribers on success.
    ///
    /// On failure the previous asset stays in place and nobody is notified.
    pub async fn load(&mut self, src: &str) -> anyhow::Result<()> {
        let asset = resources::load_scene_gltf(src).await?;
        self.show(src, asset);
        Ok(())
    }

    /// Installs an already loaded asset as if it had just been loaded from `src`.
    pub fn show(&mut self, src: &str, asset: LoadedAsset) {
        let LoadedAsset { scene, animations } = asset;
        self.src = Some(src.to_string());
        self.animations = animations;
        self.completed += 1;

        // Each load gets a fresh internal slot, the way a renderer is rebuilt per model.
        let progress_symbol = self.progress_symbol.clone();
        let progress: Rc<dyn Reflect> = Rc::new(LoadProgress {
            completed: self.completed,
        });
        let model_scene: Rc<dyn Reflect> = Rc::new(ModelScene {
            scene: Rc::new(scene),
        });
        self.internals = vec![
            (progress_symbol, progress),
            (Symbol::new(Some("scene")), model_scene),
        ];

        log::info!("{} finished loading", src);
        let event = LoadEvent {
            src: src.to_string(),
        };
        self.listeners
            .retain(|listener| listener.unbounded_send(event.clone()).is_ok());
    }
}

impl Default for ModelViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolKeyed for ModelViewer {
    fn own_property_symbols(&self) -> Vec<Symbol> {
        self.internals.iter().map(|(symbol, _)| symbol.clone()).collect()
    }

    fn get(&self, symbol: &Symbol) -> Option<Rc<dyn Reflect>> {
        self.internals
            .iter()
            .find(|(key, _)| key == symbol)
            .map(|(_, value)| value.clone())
    }
}

impl HostViewer for ModelViewer {
    fn source(&self) -> Option<String> {
        self.src.clone()
    }

    fn animation_count(&self) -> usize {
        self.animations.len()
    }
}
