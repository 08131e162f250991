//! moodboard - A browser-based mood board editor using Rust, WASM, and egui
//!
//! Images dropped or handed over from JavaScript are decoded in-process,
//! placed on an unbounded canvas in a simple flow layout, and can be dragged,
//! raised, and removed. The view pans with space + drag and zooms towards the
//! pointer.
//!
//! ## Architecture
//!
//! - `transform`: screen/canvas coordinate mapping and zoom-about-a-point
//! - `layout`: grid snapping, collision, display sizing, next free slot
//! - `board`: the image collection and its state transitions
//! - `ingest`: validating files and turning them into placed images
//! - `decode`: `image`-crate backend holding decoded pixels
//! - `session`: one editing session and its gesture handling
//! - `MoodBoardWidget`: Self-contained egui widget drawing a session
//! - `MoodBoardApp`: Thin eframe App shell that hosts the widget
//! - `MoodBoardHandle`: WASM interface for JavaScript to control the board

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::HtmlCanvasElement;

#[cfg(target_arch = "wasm32")]
mod app;
pub mod board;
pub mod decode;
pub mod ingest;
pub mod layout;
pub mod session;
pub mod transform;
pub mod widget;

#[cfg(target_arch = "wasm32")]
use app::MoodBoardApp;
#[cfg(target_arch = "wasm32")]
use board::ImageId;
#[cfg(target_arch = "wasm32")]
use decode::SelectedFile;
#[cfg(target_arch = "wasm32")]
use widget::MoodBoardWidget;

/// Callbacks that can be registered from JavaScript
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct MoodBoardCallbacks {
    /// Called when board state changes (zoom, pan, images, loading, error)
    pub on_state_change: Option<js_sys::Function>,
}

/// Callbacks that can be registered from JavaScript
#[cfg(not(target_arch = "wasm32"))]
#[derive(Default)]
pub struct MoodBoardCallbacks {}

/// Clone a registered callback out of shared state.
///
/// The borrow ends before this returns, so the callback is free to register
/// or clear callbacks on the same state while it runs.
pub fn cloned_callback<S, F: Clone>(
    state: &std::cell::RefCell<S>,
    select: impl FnOnce(&S) -> Option<&F>,
) -> Option<F> {
    let state = state.borrow();
    select(&state).cloned()
}

/// A handle to a mood board instance. Each handle manages its own canvas and state.
///
/// This struct is exposed to JavaScript and provides methods to control the board.
/// It holds an Rc to the widget so it can call methods on it, and also stores
/// the eframe runner for the application lifecycle.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct MoodBoardHandle {
    /// The widget instance (shared with MoodBoardApp)
    widget: Rc<RefCell<MoodBoardWidget>>,
    /// Callbacks registered from JavaScript
    callbacks: Rc<RefCell<MoodBoardCallbacks>>,
    /// The eframe runner (kept alive to maintain the render loop)
    runner: eframe::WebRunner,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl MoodBoardHandle {
    /// Create a new board attached to the given canvas element.
    /// Returns a promise that resolves to a MoodBoardHandle when initialization completes.
    ///
    /// Use this static factory method instead of a constructor since async constructors
    /// are deprecated in wasm-bindgen.
    #[wasm_bindgen]
    pub async fn create(canvas: HtmlCanvasElement) -> Result<MoodBoardHandle, JsValue> {
        // Initialize logging for debug builds
        #[cfg(debug_assertions)]
        {
            eframe::WebLogger::init(log::LevelFilter::Debug).ok();
        }
        #[cfg(not(debug_assertions))]
        {
            eframe::WebLogger::init(log::LevelFilter::Warn).ok();
        }

        // Create the widget that will be shared between the handle and the app
        let widget = Rc::new(RefCell::new(MoodBoardWidget::default()));
        let widget_for_app = widget.clone();

        let callbacks = Rc::new(RefCell::new(MoodBoardCallbacks::default()));
        let callbacks_for_app = callbacks.clone();

        let web_options = eframe::WebOptions::default();
        let runner = eframe::WebRunner::new();

        runner
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(MoodBoardApp::new(cc, widget_for_app.clone(), callbacks_for_app.clone())))),
            )
            .await?;

        Ok(MoodBoardHandle { widget, callbacks, runner })
    }

    /// Add images from a `FileList` (e.g. `input.files`) or an array of `File`.
    ///
    /// Unsupported, oversized, and undecodable files are skipped. Returns a
    /// promise resolving to the number of images added; it rejects only when
    /// the argument is neither.
    #[wasm_bindgen(js_name = addFiles)]
    pub fn add_files(&self, files: JsValue) -> js_sys::Promise {
        let widget = self.widget.clone();

        wasm_bindgen_futures::future_to_promise(async move {
            let loader = {
                let mut widget = widget.borrow_mut();
                widget.board_mut().begin_loading();
                widget.loader().clone()
            };

            match read_file_list(files).await {
                Ok(selected) => {
                    let images = ingest::ingest_batch(&selected, &loader).await;
                    let added = images.len() as u32;
                    widget.borrow_mut().board_mut().finish_loading(Ok(images));
                    Ok(JsValue::from(added))
                }
                Err(message) => {
                    widget.borrow_mut().board_mut().finish_loading(Err(message.clone()));
                    Err(JsValue::from_str(&message))
                }
            }
        })
    }

    /// End event loop and release resources
    #[wasm_bindgen(js_name = destroy)]
    pub fn destroy(&self) {
        self.runner.destroy();
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Zoom by `delta` around a point given in element coordinates
    #[wasm_bindgen(js_name = zoom)]
    pub fn zoom(&self, delta: f32, center_x: f32, center_y: f32) {
        self.widget
            .borrow_mut()
            .board_mut()
            .zoom(delta, egui::pos2(center_x, center_y));
    }

    /// Translate the view by a screen-space delta
    #[wasm_bindgen(js_name = pan)]
    pub fn pan(&self, dx: f32, dy: f32) {
        self.widget.borrow_mut().board_mut().pan(egui::vec2(dx, dy));
    }

    /// Return to zoom 1 with no pan
    #[wasm_bindgen(js_name = resetView)]
    pub fn reset_view(&self) {
        self.widget.borrow_mut().board_mut().reset_view();
    }

    #[wasm_bindgen(js_name = getZoom)]
    pub fn get_zoom(&self) -> f32 {
        self.widget.borrow().board().transform().zoom
    }

    /// Get pan offset as [x, y] in screen pixels
    #[wasm_bindgen(js_name = getPan)]
    pub fn get_pan(&self) -> js_sys::Float32Array {
        let pan = self.widget.borrow().board().transform().pan;
        let result = js_sys::Float32Array::new_with_length(2);
        result.copy_from(&[pan.x, pan.y]);
        result
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// All placed images as a JSON array
    #[wasm_bindgen(js_name = getImages)]
    pub fn get_images(&self) -> Result<String, JsValue> {
        let widget = self.widget.borrow();
        serde_json::to_string(widget.board().images().as_slice()).map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Move an image's top-left corner to a canvas position
    #[wasm_bindgen(js_name = moveImage)]
    pub fn move_image(&self, id: &str, x: f32, y: f32) {
        self.widget
            .borrow_mut()
            .board_mut()
            .update_image_position(&ImageId::from(id), egui::pos2(x, y));
    }

    /// Remove an image and free its pixels
    #[wasm_bindgen(js_name = removeImage)]
    pub fn remove_image(&self, id: &str) {
        self.widget.borrow_mut().remove_image(&ImageId::from(id));
    }

    /// Bring an image to the front
    #[wasm_bindgen(js_name = selectImage)]
    pub fn select_image(&self, id: &str) {
        self.widget.borrow_mut().board_mut().select_image(&ImageId::from(id));
    }

    /// Last batch-level error, if any
    #[wasm_bindgen(js_name = getError)]
    pub fn get_error(&self) -> Option<String> {
        self.widget.borrow().board().last_error().map(str::to_string)
    }

    #[wasm_bindgen(js_name = clearError)]
    pub fn clear_error(&self) {
        self.widget.borrow_mut().board_mut().clear_error();
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.widget.borrow().board().is_loading()
    }

    // =========================================================================
    // Callback registration
    // =========================================================================

    /// Register a callback to be called when board state changes.
    /// The callback receives an object with the current state:
    /// { zoom, panX, panY, isPanning, imageCount, isLoading, error }
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_state_change = Some(callback);
    }

    /// Clear all registered callbacks.
    #[wasm_bindgen(js_name = clearCallbacks)]
    pub fn clear_callbacks(&self) {
        self.callbacks.borrow_mut().on_state_change = None;
    }
}

#[cfg(target_arch = "wasm32")]
impl ingest::ImageFile for web_sys::File {
    fn name(&self) -> String {
        web_sys::File::name(self)
    }

    fn mime_type(&self) -> String {
        self.type_()
    }

    fn size(&self) -> u64 {
        web_sys::Blob::size(self) as u64
    }
}

/// Read every acceptable file of a `FileList` or an array of `File` into memory.
///
/// Files failing validation are skipped without reading their contents. All
/// reads are started before the first is awaited; results keep input order.
#[cfg(target_arch = "wasm32")]
async fn read_file_list(files: JsValue) -> Result<Vec<SelectedFile>, String> {
    let mut pending = Vec::new();
    for file in files_from_js(&files)? {
        if let Err(err) = ingest::validate_file(&file) {
            log::warn!("skipping {}: {}", file.name(), err);
            continue;
        }
        let read = wasm_bindgen_futures::JsFuture::from(file.array_buffer());
        pending.push((file, read));
    }

    let mut selected = Vec::with_capacity(pending.len());
    for (file, read) in pending {
        match read.await {
            Ok(buffer) => {
                let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
                selected.push(SelectedFile::new(file.name(), file.type_(), bytes));
            }
            Err(err) => log::warn!("could not read {}: {:?}", file.name(), err),
        }
    }
    Ok(selected)
}

/// Accept `input.files` as well as `Array.from(input.files)`
#[cfg(target_arch = "wasm32")]
fn files_from_js(files: &JsValue) -> Result<Vec<web_sys::File>, String> {
    if let Some(list) = files.dyn_ref::<web_sys::FileList>() {
        return Ok((0..list.length()).filter_map(|index| list.get(index)).collect());
    }

    if js_sys::Array::is_array(files) {
        return js_sys::Array::from(files)
            .iter()
            .map(|entry| entry.dyn_into::<web_sys::File>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| "Failed to load images: array entries must be File objects".to_string());
    }

    Err("Failed to load images: expected a FileList or an array of File".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Listeners {
        on_change: Option<Rc<dyn Fn()>>,
    }

    #[test]
    fn test_callback_can_clear_itself() {
        let listeners = Rc::new(RefCell::new(Listeners::default()));
        let inner = listeners.clone();
        listeners.borrow_mut().on_change = Some(Rc::new(move || {
            inner.borrow_mut().on_change = None;
        }));

        let callback = cloned_callback(&listeners, |l| l.on_change.as_ref()).expect("registered");
        callback();

        assert!(listeners.borrow().on_change.is_none());
    }

    #[test]
    fn test_cloned_callback_when_unset() {
        let listeners = RefCell::new(Listeners::default());
        assert!(cloned_callback(&listeners, |l| l.on_change.as_ref()).is_none());
    }
}
