//! The statistics overlay.
//!
//! `ModelStats` owns what the overlay shows: a visibility flag and one text
//! field per metric. Every load notification starts a new cycle that locates
//! the scene, aggregates it and rewrites the fields. The file size is looked
//! up asynchronously and only lands if no newer cycle has started since.

use std::{cell::RefCell, fmt, rc::Rc};

use futures::channel::mpsc;

use crate::{
    config::StatsConfig,
    error::FetchError,
    format::{format_bytes, format_count, format_dimensions, format_triangles},
    locator::{HostViewer, SceneProvider, SymbolScanProvider},
    resources::io::fetch_file_size,
    stats::{self, StatsSnapshot},
    viewer::{LoadEvent, ModelViewer},
};

/// One row of the overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    Triangles,
    Meshes,
    Materials,
    Textures,
    Dimensions,
    Animations,
    FileSize,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Triangles,
        Metric::Meshes,
        Metric::Materials,
        Metric::Textures,
        Metric::Dimensions,
        Metric::Animations,
        Metric::FileSize,
    ];

    /// Element id of the value cell in the markup.
    pub fn id(self) -> &'static str {
        match self {
            Metric::Triangles => "tri",
            Metric::Meshes => "mesh",
            Metric::Materials => "mat",
            Metric::Textures => "tex",
            Metric::Dimensions => "dim",
            Metric::Animations => "anim",
            Metric::FileSize => "size",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Triangles => "Tris:",
            Metric::Meshes => "Meshes:",
            Metric::Materials => "Materials:",
            Metric::Textures => "Textures:",
            Metric::Dimensions => "Size (WxHxD):",
            Metric::Animations => "Animations:",
            Metric::FileSize => "File size:",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

const STYLE: &str = r#"
  :host {
    position: absolute;
    top: 1rem;
    left: 1rem;
    z-index: 1000;
    background-color: rgba(0, 0, 0, 0.7);
    color: white;
    padding: 1rem;
    border-radius: 1rem;
    pointer-events: none;
    opacity: 0;
    transition: opacity 0.3s;
  }
  :host([visible]) { opacity: 1; }
  .row { display: flex; justify-content: space-between; gap: 15px; }
  .val { font-weight: bold; font-family: monospace; }
"#;

/// A pending file-size lookup, tagged with the cycle that asked for it.
#[derive(Clone, Debug, PartialEq)]
pub struct FileSizeRequest {
    pub generation: u64,
    pub src: String,
}

pub struct ModelStats<P: SceneProvider> {
    provider: P,
    config: StatsConfig,
    visible: bool,
    fields: Vec<String>,
    snapshot: Option<StatsSnapshot>,
    generation: u64,
    events: Option<mpsc::UnboundedReceiver<LoadEvent>>,
}

impl<P: SceneProvider> ModelStats<P> {
    pub fn new(provider: P, config: StatsConfig) -> Self {
        let fields = vec![config.loading_placeholder.clone(); Metric::ALL.len()];
        Self {
            provider,
            visible: config.start_visible,
            config,
            fields,
            snapshot: None,
            generation: 0,
            events: None,
        }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Flips visibility and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Text currently shown for `metric`.
    pub fn text(&self, metric: Metric) -> &str {
        &self.fields[metric.slot()]
    }

    pub fn update_text(&mut self, metric: Metric, text: impl Into<String>) {
        self.fields[metric.slot()] = text.into();
    }

    /// Statistics of the last successful cycle, if the last cycle found a scene.
    pub fn snapshot(&self) -> Option<&StatsSnapshot> {
        self.snapshot.as_ref()
    }

    /// Number of load cycles started so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs the synchronous part of a load cycle.
    ///
    /// Returns the file-size lookup the caller should perform, if any. When
    /// no scene can be found every field falls back to the missing
    /// placeholder and nothing else happens.
    pub fn calculate_stats(&mut self, host: &P::Host) -> Option<FileSizeRequest>
    where
        P::Host: HostViewer,
    {
        self.generation += 1;
        let Some(scene) = self.provider.locate(Some(host)) else {
            log::warn!("model viewer exposes no scene, statistics skipped");
            self.snapshot = None;
            let missing = self.config.missing_placeholder.clone();
            self.fields.iter_mut().for_each(|field| *field = missing.clone());
            return None;
        };

        let snapshot = stats::aggregate(&scene, host.animation_count());
        self.show_snapshot(&snapshot);
        self.snapshot = Some(snapshot);
        self.visible = true;

        if !self.config.fetch_file_size {
            let missing = self.config.missing_placeholder.clone();
            self.update_text(Metric::FileSize, missing);
            return None;
        }
        match host.source() {
            Some(src) => {
                let loading = self.config.loading_placeholder.clone();
                self.update_text(Metric::FileSize, loading);
                Some(FileSizeRequest {
                    generation: self.generation,
                    src,
                })
            }
            None => {
                let unknown = self.config.unknown_size.clone();
                self.update_text(Metric::FileSize, unknown);
                None
            }
        }
    }

    /// Stores the outcome of a file-size lookup. Returns false if the result
    /// belongs to an earlier cycle and was dropped.
    pub fn apply_file_size(&mut self, request: &FileSizeRequest, result: Result<u64, FetchError>) -> bool {
        if request.generation != self.generation {
            log::debug!("dropping file size of {} from an earlier load", request.src);
            return false;
        }
        let text = match result {
            Ok(bytes) => format_bytes(bytes as f64, self.config.decimals),
            Err(err) => {
                log::warn!("file size of {} unknown: {}", request.src, err);
                self.config.unknown_size.clone()
            }
        };
        self.update_text(Metric::FileSize, text);
        true
    }

    /// A complete load cycle including the file-size lookup.
    pub async fn refresh(&mut self, host: &P::Host)
    where
        P::Host: HostViewer,
    {
        if let Some(request) = self.calculate_stats(host) {
            let result = fetch_file_size(&request.src).await;
            self.apply_file_size(&request, result);
        }
    }

    fn show_snapshot(&mut self, snapshot: &StatsSnapshot) {
        let separator = self.config.thousands_separator;
        let count = |n: usize| format_count(n as u64, separator);
        let triangles = format_triangles(snapshot.triangles, separator)
            .unwrap_or_else(|| self.config.missing_placeholder.clone());
        let rows = [
            (Metric::Triangles, triangles),
            (Metric::Meshes, count(snapshot.meshes)),
            (Metric::Materials, count(snapshot.materials)),
            (Metric::Textures, count(snapshot.textures)),
            (Metric::Dimensions, format_dimensions(snapshot.dimensions())),
            (Metric::Animations, count(snapshot.animations)),
        ];
        for (metric, text) in rows {
            self.update_text(metric, text);
        }
    }

    /// Shadow-root content: scoped style plus one row per metric.
    pub fn markup(&self) -> String {
        let rows: String = Metric::ALL
            .iter()
            .map(|metric| {
                format!(
                    r#"<div class="row"><span>{}</span><span class="val" id="{}">{}</span></div>"#,
                    metric.label(),
                    metric.id(),
                    self.text(*metric)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("<style>{STYLE}</style>\n{rows}")
    }
}

impl ModelStats<SymbolScanProvider<ModelViewer>> {
    /// Creates an overlay subscribed to `viewer`'s load notifications.
    pub fn attach(viewer: &mut ModelViewer, config: StatsConfig) -> Self {
        let mut stats = Self::new(SymbolScanProvider::new(), config);
        stats.events = Some(viewer.on_load());
        stats
    }

    /// Runs one cycle per load notification received since the last call,
    /// strictly one after another. Returns the number of cycles run.
    pub async fn process_loads(&mut self, viewer: &ModelViewer) -> usize {
        let mut cycles = 0;
        while let Some(event) = self.next_event() {
            log::info!("model viewer loaded {}", event.src);
            self.refresh(viewer).await;
            cycles += 1;
        }
        cycles
    }

    fn next_event(&mut self) -> Option<LoadEvent> {
        match self.events.as_mut()?.try_recv() {
            Ok(event) => Some(event),
            // Nothing queued right now, or the viewer is gone.
            Err(_) => None,
        }
    }
}

impl<P: SceneProvider> fmt::Display for ModelStats<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for metric in Metric::ALL {
            writeln!(f, "{:<14} {}", metric.label(), self.text(metric))?;
        }
        Ok(())
    }
}

/// Overlays keyed by the element they are rendered into. An element holds at
/// most one overlay; the first one registered stays.
pub struct Attachments<K, V> {
    entries: Vec<(K, Rc<RefCell<V>>)>,
}

impl<K: PartialEq, V> Attachments<K, V> {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn get(&self, key: &K) -> Option<Rc<RefCell<V>>> {
        self.entries
            .iter()
            .find(|(known, _)| known == key)
            .map(|(_, value)| Rc::clone(value))
    }

    /// Registers `value` for `key` and returns the overlay that is now attached.
    pub fn insert(&mut self, key: K, value: Rc<RefCell<V>>) -> Rc<RefCell<V>> {
        if let Some(existing) = self.get(&key) {
            return existing;
        }
        self.entries.push((key, Rc::clone(&value)));
        value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: PartialEq, V> Default for Attachments<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
