//! Browser backend for `<model-viewer>` pages.
//!
//! The host viewer here is a DOM element whose three.js scene sits behind one
//! of its symbol-keyed properties. Everything is read through `js_sys::Reflect`
//! so no class or property name of the viewer's build is relied upon besides
//! the three.js object shape (`scene.isScene`, `isMesh`, `isTexture`, ...).

use std::{cell::RefCell, rc::Rc};

use cgmath::{Matrix4, Point3};
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{
    Document, Element, MutationObserver, MutationObserverInit, ShadowRoot, ShadowRootInit,
    ShadowRootMode,
};

use crate::{
    config::StatsConfig,
    data_structures::bounds::Box3,
    locator::{HostViewer, SceneProvider},
    overlay::{Attachments, Metric, ModelStats},
    resources::io::fetch_file_size,
    stats::{MaterialRef, MeshSample, SameInstance, Traverse},
};

/// Property lookup that treats non-objects, `null` and `undefined` as absent.
fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    if !target.is_object() {
        return None;
    }
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

fn flag(target: &JsValue, marker: &str) -> bool {
    get(target, marker).and_then(|value| value.as_bool()) == Some(true)
}

fn count(target: Option<JsValue>) -> Option<usize> {
    target
        .and_then(|value| get(&value, "count"))
        .and_then(|count| count.as_f64())
        .filter(|count| count.is_finite() && *count >= 0.0)
        .map(|count| count as usize)
}

fn call_method(target: &JsValue, name: &str, args: &Array) {
    if let Some(method) = get(target, name).and_then(|m| m.dyn_into::<Function>().ok()) {
        if let Err(err) = method.apply(target, args) {
            log::warn!("{} failed: {:?}", name, err);
        }
    }
}

fn point(vector: Option<JsValue>) -> Option<Point3<f32>> {
    let vector = vector?;
    let axis = |key| get(&vector, key).and_then(|v| v.as_f64()).map(|v| v as f32);
    Some(Point3::new(axis("x")?, axis("y")?, axis("z")?))
}

fn matrix(node: &JsValue) -> Option<Matrix4<f32>> {
    let elements = get(node, "matrixWorld").and_then(|m| get(&m, "elements"))?;
    let e: Vec<f32> = Array::from(&elements)
        .iter()
        .filter_map(|v| v.as_f64())
        .map(|v| v as f32)
        .collect();
    if e.len() != 16 {
        return None;
    }
    // three.js stores matrices column-major, as does cgmath.
    Some(Matrix4::new(
        e[0], e[1], e[2], e[3], e[4], e[5], e[6], e[7], e[8], e[9], e[10], e[11], e[12], e[13],
        e[14], e[15],
    ))
}

impl SameInstance for JsValue {
    fn same_instance(&self, other: &Self) -> bool {
        Object::is(self, other)
    }
}

/// A three.js material.
#[derive(Clone, Debug)]
pub struct JsMaterial(JsValue);

impl SameInstance for JsMaterial {
    fn same_instance(&self, other: &Self) -> bool {
        self.0.same_instance(&other.0)
    }
}

impl MaterialRef for JsMaterial {
    fn texture_ids(&self) -> Vec<String> {
        let Some(material) = self.0.dyn_ref::<Object>() else {
            return Vec::new();
        };
        Object::values(material)
            .iter()
            .filter(|value| flag(value, "isTexture"))
            .filter_map(|texture| get(&texture, "uuid").and_then(|uuid| uuid.as_string()))
            .collect()
    }
}

/// A three.js scene found inside a viewer element.
#[derive(Clone, Debug)]
pub struct JsScene(JsValue);

impl JsScene {
    fn visit(node: &JsValue, visit: &mut dyn FnMut(MeshSample<JsMaterial>)) {
        if flag(node, "isMesh") {
            if let Some(sample) = Self::sample(node) {
                visit(sample);
            }
        }
        if let Some(children) = get(node, "children") {
            for child in Array::from(&children).iter() {
                Self::visit(&child, visit);
            }
        }
    }

    fn sample(node: &JsValue) -> Option<MeshSample<JsMaterial>> {
        let geometry = get(node, "geometry")?;
        let position_count = count(get(&geometry, "attributes").and_then(|a| get(&a, "position")));
        let materials = match get(node, "material") {
            Some(list) if Array::is_array(&list) => Array::from(&list)
                .iter()
                .filter(|m| m.is_object())
                .map(JsMaterial)
                .collect(),
            Some(single) => vec![JsMaterial(single)],
            None => Vec::new(),
        };
        Some(MeshSample {
            index_count: count(get(&geometry, "index")),
            position_count: position_count.unwrap_or(0),
            world_bounds: Self::world_bounds(node, &geometry),
            materials,
        })
    }

    fn world_bounds(node: &JsValue, geometry: &JsValue) -> Box3 {
        if get(geometry, "boundingBox").is_none() {
            call_method(geometry, "computeBoundingBox", &Array::new());
        }
        call_method(node, "updateWorldMatrix", &Array::of2(&JsValue::FALSE, &JsValue::FALSE));
        let Some(bbox) = get(geometry, "boundingBox") else {
            return Box3::empty();
        };
        let (Some(min), Some(max)) = (point(get(&bbox, "min")), point(get(&bbox, "max"))) else {
            return Box3::empty();
        };
        let local = Box3::new(min, max);
        match matrix(node) {
            Some(world) => local.apply_matrix(&world),
            None => local,
        }
    }
}

impl Traverse for JsScene {
    type Material = JsMaterial;

    fn traverse_meshes(&self, visit: &mut dyn FnMut(MeshSample<JsMaterial>)) {
        Self::visit(&self.0, visit);
    }
}

/// Finds the scene through `Object.getOwnPropertySymbols(viewer)`.
#[derive(Default)]
pub struct JsSymbolProvider;

impl SceneProvider for JsSymbolProvider {
    type Host = Element;
    type Scene = JsScene;

    fn locate(&self, host: Option<&Element>) -> Option<JsScene> {
        let host: &JsValue = host?.as_ref();
        let object = host.dyn_ref::<Object>()?;
        Object::get_own_property_symbols(object).iter().find_map(|symbol| {
            let slot = Reflect::get(host, &symbol).ok()?;
            let scene = get(&slot, "scene")?;
            flag(&scene, "isScene").then(|| JsScene(scene))
        })
    }
}

impl HostViewer for Element {
    fn source(&self) -> Option<String> {
        get(self.as_ref(), "src")
            .and_then(|src| src.as_string())
            .or_else(|| self.get_attribute("src"))
            .filter(|src| !src.is_empty())
    }

    fn animation_count(&self) -> usize {
        get(self.as_ref(), "availableAnimations")
            .filter(|list| Array::is_array(list))
            .map(|list| Array::from(&list).length() as usize)
            .unwrap_or(0)
    }
}

struct Overlay {
    element: Element,
    shadow: ShadowRoot,
    stats: ModelStats<JsSymbolProvider>,
}

impl Overlay {
    fn sync(&self) {
        for metric in Metric::ALL {
            if let Some(cell) = self.shadow.get_element_by_id(metric.id()) {
                cell.set_text_content(Some(self.stats.text(metric)));
            }
        }
        let result = if self.stats.is_visible() {
            self.element.set_attribute("visible", "")
        } else {
            self.element.remove_attribute("visible")
        };
        if let Err(err) = result {
            log::warn!("could not update visibility: {:?}", err);
        }
    }

    fn toggle(&mut self) -> bool {
        let visible = self.stats.toggle();
        self.sync();
        visible
    }
}

thread_local! {
    static ATTACHED: RefCell<Attachments<Element, Overlay>> = const { RefCell::new(Attachments::new()) };
}

fn attached(element: &Element) -> Option<Rc<RefCell<Overlay>>> {
    ATTACHED.with(|attached| attached.borrow().get(element))
}

/// Handle to an attached overlay.
#[wasm_bindgen]
pub struct ModelStatsHandle {
    overlay: Rc<RefCell<Overlay>>,
}

#[wasm_bindgen]
impl ModelStatsHandle {
    pub fn toggle(&self) -> bool {
        self.overlay.borrow_mut().toggle()
    }

    #[wasm_bindgen(getter)]
    pub fn visible(&self) -> bool {
        self.overlay.borrow().stats.is_visible()
    }
}

/// Renders the overlay into `element`'s shadow root and subscribes to the
/// `load` event of the closest `<model-viewer>` ancestor.
///
/// Attaching the same element twice returns the existing overlay. The element
/// also gets a `toggle()` method.
#[wasm_bindgen(js_name = attachModelStats)]
pub fn attach_model_stats(element: Element) -> Result<ModelStatsHandle, JsValue> {
    if let Some(overlay) = attached(&element) {
        return Ok(ModelStatsHandle { overlay });
    }

    let shadow = element.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))?;
    let stats = ModelStats::new(JsSymbolProvider, StatsConfig::default());
    shadow.set_inner_html(&stats.markup());
    let viewer = element.closest("model-viewer")?;

    let overlay = Rc::new(RefCell::new(Overlay {
        element: element.clone(),
        shadow,
        stats,
    }));
    overlay.borrow().sync();

    let state = Rc::clone(&overlay);
    let toggle = Closure::<dyn FnMut() -> bool>::new(move || state.borrow_mut().toggle());
    Reflect::set(element.as_ref(), &JsValue::from_str("toggle"), toggle.as_ref())?;
    toggle.forget();

    match viewer {
        Some(viewer) => {
            let state = Rc::clone(&overlay);
            let host = viewer.clone();
            let on_load = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
                log::info!("model viewer loaded");
                let request = {
                    let mut overlay = state.borrow_mut();
                    let request = overlay.stats.calculate_stats(&host);
                    overlay.sync();
                    request
                };
                if let Some(request) = request {
                    let state = Rc::clone(&state);
                    wasm_bindgen_futures::spawn_local(async move {
                        let result = fetch_file_size(&request.src).await;
                        let mut overlay = state.borrow_mut();
                        if overlay.stats.apply_file_size(&request, result) {
                            overlay.sync();
                        }
                    });
                }
            });
            viewer.add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())?;
            // The listener lives as long as the page.
            on_load.forget();
        }
        None => log::warn!("<model-stats> is not placed inside a <model-viewer>"),
    }

    let overlay = ATTACHED.with(|attached| attached.borrow_mut().insert(element, overlay));
    Ok(ModelStatsHandle { overlay })
}

/// Shows or hides the overlay attached to `element`. Returns the new visibility.
#[wasm_bindgen(js_name = toggleModelStats)]
pub fn toggle_model_stats(element: &Element) -> bool {
    match attached(element) {
        Some(overlay) => overlay.borrow_mut().toggle(),
        None => {
            log::warn!("no overlay attached to this element");
            false
        }
    }
}

fn attach_all(document: &Document) {
    let nodes = match document.query_selector_all("model-stats") {
        Ok(nodes) => nodes,
        Err(err) => {
            log::warn!("could not query <model-stats> elements: {:?}", err);
            return;
        }
    };
    for idx in 0..nodes.length() {
        let Some(element) = nodes.item(idx).and_then(|node| node.dyn_into::<Element>().ok()) else {
            continue;
        };
        if attached(&element).is_some() {
            continue;
        }
        if let Err(err) = attach_model_stats(element) {
            log::warn!("could not attach <model-stats>: {:?}", err);
        }
    }
}

/// Attaches an overlay to every `<model-stats>` element on the page, including
/// ones inserted later.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    crate::init_logging();
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return Ok(());
    };
    attach_all(&document);

    let watched = document.clone();
    let on_mutation = Closure::<dyn FnMut()>::new(move || attach_all(&watched));
    let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&document, &init)?;
    on_mutation.forget();
    Ok(())
}
