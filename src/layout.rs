//! Placement and sizing rules for images on the board
//!
//! Two coordinate notions live here and are kept apart on purpose:
//! `Pos2` is a pixel position in canvas space (what `PlacedImage` stores),
//! `GridCell` is a quantized cell index produced by [`snap_to_grid`].

use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::board::{ImageId, PlacedImage};

/// Edge length of one grid cell in canvas pixels
pub const GRID_SIZE: f32 = 100.0;
/// Widest an image is ever displayed, in canvas pixels
pub const MAX_WIDTH: u32 = 700;
/// Offset of the first placed image from the canvas origin
pub const EDGE_PADDING: f32 = 50.0;
/// Images per row in the flow layout
pub const IMAGES_PER_ROW: usize = 3;
/// Horizontal distance between flow layout columns
pub const X_SPACING: f32 = 400.0;
/// Vertical distance between flow layout rows
pub const Y_SPACING: f32 = 300.0;

/// A cell of the snapping grid (indices, not pixels)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
}

/// On-canvas size of an image
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub fn to_vec2(self) -> egui::Vec2 {
        egui::vec2(self.width as f32, self.height as f32)
    }
}

/// Snap a canvas position to the grid cell containing it.
/// Negative coordinates clamp to cell 0.
pub fn snap_to_grid(point: Pos2) -> GridCell {
    GridCell {
        col: (point.x / GRID_SIZE).floor().max(0.0) as u32,
        row: (point.y / GRID_SIZE).floor().max(0.0) as u32,
    }
}

/// Check whether any image other than `exclude` occupies `cell`.
///
/// An image occupies the cell its top-left corner snaps to. Neither placement
/// nor dragging consults this; it is available to callers that want snapping.
pub fn check_collision(cell: GridCell, images: &[PlacedImage], exclude: Option<&ImageId>) -> bool {
    images
        .iter()
        .filter(|image| exclude != Some(&image.id))
        .any(|image| snap_to_grid(image.position) == cell)
}

/// Size to display an image at: original size, or scaled down to
/// `MAX_WIDTH` wide with the aspect ratio preserved. Never upscales.
pub fn compute_display_size(original_width: u32, original_height: u32) -> DisplaySize {
    if original_width <= MAX_WIDTH {
        return DisplaySize {
            width: original_width,
            height: original_height,
        };
    }

    let scale = MAX_WIDTH as f64 / original_width as f64;
    DisplaySize {
        width: MAX_WIDTH,
        height: (original_height as f64 * scale).round() as u32,
    }
}

/// Position for the next image appended to `images`.
///
/// Flow layout: rows of `IMAGES_PER_ROW` derived from the current count only.
/// Existing positions are not inspected, so slots freed by removal are not
/// reused.
pub fn find_next_available_position(images: &[PlacedImage]) -> Pos2 {
    if images.is_empty() {
        return Pos2::new(EDGE_PADDING, EDGE_PADDING);
    }

    let count = images.len();
    let row = count / IMAGES_PER_ROW;
    let col = count % IMAGES_PER_ROW;

    Pos2::new(
        EDGE_PADDING + col as f32 * X_SPACING,
        EDGE_PADDING + row as f32 * Y_SPACING,
    )
}
