//! Board session state: transform, images, and gesture handling
//!
//! `MoodBoard` holds everything one editing session needs and turns discrete
//! gesture inputs (wheel deltas, pointer positions, space bar) into calls on
//! the transform and collection. It has no UI dependency beyond egui's math
//! types, so every gesture path is unit tested here.

use egui::{Pos2, Vec2};
use serde::Serialize;

use crate::board::{HandleReleaser, ImageCollection, ImageId, PlacedImage};
use crate::transform::{self, TransformState, WHEEL_ZOOM_SENSITIVITY};

/// An image drag in progress
#[derive(Clone, Debug, PartialEq)]
struct DragState {
    image_id: ImageId,
    /// Pointer position minus the image's top-left corner, in canvas space
    offset: Vec2,
}

/// One editing session
#[derive(Debug, Default)]
pub struct MoodBoard {
    images: ImageCollection,
    transform: TransformState,
    space_pressed: bool,
    drag: Option<DragState>,
    is_loading: bool,
    last_error: Option<String>,
    /// Bumped on every visible change, so hosts can notify observers
    revision: u64,
}

/// Serializable summary of the board handed to JavaScript
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
    pub is_panning: bool,
    pub image_count: usize,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl MoodBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn images(&self) -> &ImageCollection {
        &self.images
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_space_pressed(&self) -> bool {
        self.space_pressed
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Id of the image being dragged, if any
    pub fn dragged_image(&self) -> Option<&ImageId> {
        self.drag.as_ref().map(|drag| &drag.image_id)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            zoom: self.transform.zoom,
            pan_x: self.transform.pan.x,
            pan_y: self.transform.pan.y,
            is_panning: self.transform.is_panning,
            image_count: self.images.len(),
            is_loading: self.is_loading,
            error: self.last_error.clone(),
        }
    }

    fn set_transform(&mut self, transform: TransformState) {
        if transform != self.transform {
            self.transform = transform;
            self.revision += 1;
        }
    }

    fn set_images(&mut self, images: ImageCollection) {
        if images != self.images {
            self.images = images;
            self.revision += 1;
        }
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Zoom by `delta` around `center` (element-local screen coordinates)
    pub fn zoom(&mut self, delta: f32, center: Pos2) {
        let transform = self.transform.zoom_at(delta, center);
        self.set_transform(transform);
    }

    /// Zoom from a mouse wheel. `wheel_delta` follows the DOM convention
    /// (positive scrolls down and zooms out).
    pub fn wheel(&mut self, wheel_delta: f32, center: Pos2) {
        self.zoom(-wheel_delta * WHEEL_ZOOM_SENSITIVITY, center);
    }

    pub fn pan(&mut self, delta: Vec2) {
        let transform = self.transform.pan_by(delta);
        self.set_transform(transform);
    }

    pub fn reset_view(&mut self) {
        let transform = self.transform.reset();
        self.set_transform(transform);
    }

    // =========================================================================
    // Pan gesture (space + primary drag)
    // =========================================================================

    /// Track the space bar. Releasing it ends any pan in progress.
    pub fn set_space_pressed(&mut self, pressed: bool) {
        self.space_pressed = pressed;
        if !pressed {
            self.set_panning(false);
        }
    }

    pub fn set_panning(&mut self, panning: bool) {
        let transform = self.transform.with_panning(panning);
        self.set_transform(transform);
    }

    /// Primary button went down on the canvas. Returns true if this starts a
    /// pan, which takes priority over anything under the pointer.
    pub fn primary_pressed(&mut self) -> bool {
        if self.space_pressed {
            self.set_panning(true);
            true
        } else {
            false
        }
    }

    /// Pointer moved by `movement` screen pixels. Pans if a pan is active.
    pub fn pointer_moved(&mut self, movement: Vec2) {
        if self.transform.is_panning {
            self.pan(movement);
        }
    }

    pub fn primary_released(&mut self) {
        if self.transform.is_panning {
            self.set_panning(false);
        }
    }

    // =========================================================================
    // Image drag
    // =========================================================================

    /// Start dragging `id` from screen position `pointer`.
    ///
    /// Raises the image to the front. Ignored (returns false) while the space
    /// bar is held or if `id` is unknown.
    pub fn begin_drag(&mut self, id: &ImageId, pointer: Pos2, element_origin: Pos2) -> bool {
        if self.space_pressed {
            return false;
        }

        let Some(image) = self.images.get(id) else {
            return false;
        };
        let position = image.position;

        self.select_image(id);

        let pointer_canvas = transform::screen_to_canvas(pointer, element_origin, &self.transform);
        self.drag = Some(DragState {
            image_id: id.clone(),
            offset: pointer_canvas - position,
        });
        true
    }

    /// Move the dragged image so it stays under the pointer at the grab offset
    pub fn drag_to(&mut self, pointer: Pos2, element_origin: Pos2) {
        let Some(drag) = &self.drag else {
            return;
        };
        let id = drag.image_id.clone();
        let offset = drag.offset;
        let pointer_canvas = transform::screen_to_canvas(pointer, element_origin, &self.transform);
        self.update_image_position(&id, pointer_canvas - offset);
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    // =========================================================================
    // Collection
    // =========================================================================

    pub fn update_image_position(&mut self, id: &ImageId, position: Pos2) {
        let images = std::mem::take(&mut self.images).update_position(id, position);
        self.set_images(images);
    }

    pub fn select_image(&mut self, id: &ImageId) {
        let images = std::mem::take(&mut self.images).select_and_raise(id);
        self.set_images(images);
    }

    pub fn remove_image(&mut self, id: &ImageId, releaser: &impl HandleReleaser) {
        if self.dragged_image() == Some(id) {
            self.drag = None;
        }
        let images = std::mem::take(&mut self.images).remove(id, releaser);
        self.set_images(images);
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// A batch is starting: set the loading flag and clear the last error
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
        self.last_error = None;
        self.revision += 1;
    }

    /// A batch finished. Successful images are placed and appended in order;
    /// an `Err` means the batch as a whole failed and becomes the shown error.
    pub fn finish_loading(&mut self, result: Result<Vec<PlacedImage>, String>) {
        match result {
            Ok(new_images) => {
                let images = std::mem::take(&mut self.images).add_images(new_images);
                self.set_images(images);
            }
            Err(message) => {
                log::warn!("adding images failed: {}", message);
                self.last_error = Some(message);
            }
        }
        self.is_loading = false;
        self.revision += 1;
    }

    pub fn clear_error(&mut self) {
        if self.last_error.take().is_some() {
            self.revision += 1;
        }
    }
}
