//! Placed images and the ordered collection that owns them
//!
//! Every collection operation consumes the old collection and returns the
//! new one. Unknown ids are not an error: the collection comes back unchanged.

use std::fmt;

use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

use crate::layout::{self, DisplaySize};

/// Opaque, unique identifier of a placed image
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(String);

impl ImageId {
    /// A fresh random (v4 UUID) id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ImageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of the resource backing an image's pixels.
/// Owned by exactly one `PlacedImage`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceHandle(String);

impl SourceHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceHandle {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for SourceHandle {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Releases backing resources when images are removed
pub trait HandleReleaser {
    /// Called exactly once per handle, when its image is removed
    fn release_handle(&self, handle: &SourceHandle);
}

/// An image on the board
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedImage {
    pub id: ImageId,
    pub handle: SourceHandle,
    /// Original file name
    pub name: String,
    pub original_width: u32,
    pub original_height: u32,
    /// Top-left corner in canvas space (pixels, not grid cells)
    pub position: Pos2,
    /// Stacking order; only the relative order matters
    pub z_index: i32,
}

impl PlacedImage {
    /// A new unplaced image at the canvas origin with `z_index` 1
    pub fn new(handle: SourceHandle, name: String, original_width: u32, original_height: u32) -> Self {
        Self {
            id: ImageId::generate(),
            handle,
            name,
            original_width,
            original_height,
            position: Pos2::ZERO,
            z_index: 1,
        }
    }

    pub fn display_size(&self) -> DisplaySize {
        layout::compute_display_size(self.original_width, self.original_height)
    }

    /// Canvas-space rectangle covered by the image
    pub fn canvas_rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.display_size().to_vec2())
    }
}

/// Ordered set of placed images.
///
/// Insertion order is kept and only used as a tie-break when rendering;
/// `z_index` decides stacking.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageCollection {
    images: Vec<PlacedImage>,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlacedImage> {
        self.images.iter()
    }

    pub fn as_slice(&self) -> &[PlacedImage] {
        &self.images
    }

    pub fn get(&self, id: &ImageId) -> Option<&PlacedImage> {
        self.images.iter().find(|image| &image.id == id)
    }

    fn index_of(&self, id: &ImageId) -> Option<usize> {
        self.images.iter().position(|image| &image.id == id)
    }

    /// Append freshly created images in order, placing each one with the flow
    /// layout. Images earlier in the same batch count towards later placements.
    #[must_use]
    pub fn add_images(mut self, new_images: impl IntoIterator<Item = PlacedImage>) -> Self {
        for mut image in new_images {
            image.position = layout::find_next_available_position(&self.images);
            image.z_index = 1;
            log::debug!("placing {} at ({}, {})", image.id, image.position.x, image.position.y);
            self.images.push(image);
        }
        self
    }

    /// Move an image. No collision or bounds checks: the canvas is infinite.
    #[must_use]
    pub fn update_position(mut self, id: &ImageId, position: Pos2) -> Self {
        if let Some(index) = self.index_of(id) {
            self.images[index].position = position;
        }
        self
    }

    /// Drop an image and release its backing resource
    #[must_use]
    pub fn remove(mut self, id: &ImageId, releaser: &impl HandleReleaser) -> Self {
        if let Some(index) = self.index_of(id) {
            let removed = self.images.remove(index);
            releaser.release_handle(&removed.handle);
            log::debug!("removed {}", removed.id);
        }
        self
    }

    /// Bring an image in front of all others
    #[must_use]
    pub fn select_and_raise(mut self, id: &ImageId) -> Self {
        if let Some(index) = self.index_of(id) {
            // Non-empty since `id` matched
            let max_z = self.images.iter().map(|image| image.z_index).max().unwrap_or(0);
            self.images[index].z_index = max_z + 1;
        }
        self
    }

    /// Images back to front: ascending `z_index`, insertion order on ties
    pub fn render_order(&self) -> Vec<&PlacedImage> {
        let mut ordered: Vec<&PlacedImage> = self.images.iter().collect();
        // Stable sort keeps insertion order for equal z
        ordered.sort_by_key(|image| image.z_index);
        ordered
    }

    /// Topmost image covering `point` (canvas space)
    pub fn hit_test(&self, point: Pos2) -> Option<&PlacedImage> {
        self.render_order()
            .into_iter()
            .rev()
            .find(|image| image.canvas_rect().contains(point))
    }
}

impl<'a> IntoIterator for &'a ImageCollection {
    type Item = &'a PlacedImage;
    type IntoIter = std::slice::Iter<'a, PlacedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}
