//! MoodBoardWidget - A self-contained egui widget for the mood board canvas
//!
//! This widget owns a `MoodBoard` session plus the GPU textures built from the
//! decoded pixels, and maps egui input onto the session's gesture methods.
//! Files dropped onto the canvas are queued for the host to ingest.

use std::collections::{HashMap, HashSet};

use egui::{
    Align2, Color32, CursorIcon, FontId, Key, PointerButton, Pos2, Rect, Response, Stroke, StrokeKind,
    TextureHandle, TextureOptions, Ui, Vec2,
};

use crate::board::{ImageId, PlacedImage, SourceHandle};
use crate::decode::{self, ImageLoader, SelectedFile};
use crate::session::MoodBoard;
use crate::transform::{self, TransformState, ZOOM_STEP};

/// Canvas background
const BACKGROUND: Color32 = Color32::from_gray(23);
/// Fill for images whose pixels are not uploaded yet
const PLACEHOLDER: Color32 = Color32::from_gray(60);
/// Outline of the image being dragged
const DRAG_HIGHLIGHT: Color32 = Color32::from_rgb(96, 165, 250);
/// Remove button radius in screen pixels
const REMOVE_BUTTON_RADIUS: f32 = 11.0;
/// Remove button inset from the image's top-right corner
const REMOVE_BUTTON_INSET: f32 = 6.0;
/// Corner rounding of drawn images
const IMAGE_ROUNDING: f32 = 6.0;
/// Duration to show zoom level overlay after zooming
const ZOOM_OVERLAY_DURATION: f64 = 0.5;

/// Actions returned from zoom controls overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ZoomAction {
    None,
    ZoomIn,
    ZoomOut,
    Reset,
}

/// A self-contained widget showing one mood board.
///
/// Multiple instances can coexist; each owns its session and textures and
/// shares only what its `ImageLoader` shares.
pub struct MoodBoardWidget {
    /// Session state (transform, images, gestures)
    board: MoodBoard,
    /// Decoder and pixel store backing the images
    loader: ImageLoader,
    /// Uploaded textures by source handle
    textures: HashMap<SourceHandle, TextureHandle>,
    /// Files dropped on the canvas, waiting for the host to ingest them
    dropped_files: Vec<SelectedFile>,
    /// Track when zoom was last changed (for overlay display)
    zoom_changed_time: Option<f64>,
    /// Previous zoom level to detect changes
    prev_zoom_level: f32,
}

impl Default for MoodBoardWidget {
    fn default() -> Self {
        Self::new(ImageLoader::default())
    }
}

impl MoodBoardWidget {
    /// Create an empty board drawing pixels from `loader`'s store
    pub fn new(loader: ImageLoader) -> Self {
        Self {
            board: MoodBoard::new(),
            loader,
            textures: HashMap::new(),
            dropped_files: Vec::new(),
            zoom_changed_time: None,
            prev_zoom_level: 1.0,
        }
    }

    // =========================================================================
    // Public API (called from outside, e.g., from JS via MoodBoardHandle)
    // =========================================================================

    pub fn board(&self) -> &MoodBoard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut MoodBoard {
        &mut self.board
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// Remove an image, releasing its pixels. The texture goes on the next frame.
    pub fn remove_image(&mut self, id: &ImageId) {
        self.board.remove_image(id, &self.loader);
    }

    /// Files dropped since the last call
    pub fn take_dropped_files(&mut self) -> Vec<SelectedFile> {
        std::mem::take(&mut self.dropped_files)
    }

    // =========================================================================
    // Main rendering
    // =========================================================================

    /// Show the widget, rendering into the given UI with a specified container size.
    pub fn show(&mut self, ui: &mut Ui, container_size: Vec2) -> Response {
        let ctx = ui.ctx().clone();

        self.sync_textures(&ctx);
        self.collect_dropped_files(&ctx);

        let (rect, response) = ui.allocate_exact_size(container_size, egui::Sense::click_and_drag());
        let origin = rect.min;
        self.handle_keyboard_input(&ctx, rect.size());

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);

        let transform = *self.board.transform();
        let hovered = response
            .hover_pos()
            .and_then(|pos| self.image_at(pos, origin))
            .map(|image| image.id.clone());

        for image in self.board.images().render_order() {
            let screen_rect = image_screen_rect(image, origin, &transform);
            if !screen_rect.intersects(rect) {
                continue;
            }

            match self.textures.get(&image.handle) {
                Some(texture) => {
                    painter.image(
                        texture.id(),
                        screen_rect,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }
                None => {
                    painter.rect_filled(screen_rect, IMAGE_ROUNDING, PLACEHOLDER);
                }
            }

            if self.board.dragged_image() == Some(&image.id) {
                painter.rect_stroke(screen_rect, IMAGE_ROUNDING, Stroke::new(2.0, DRAG_HIGHLIGHT), StrokeKind::Outside);
            }

            if hovered.as_ref() == Some(&image.id) && !self.board.is_space_pressed() {
                let button = remove_button_rect(screen_rect);
                painter.circle_filled(button.center(), REMOVE_BUTTON_RADIUS, Color32::from_rgb(239, 68, 68));
                painter.text(
                    button.center(),
                    Align2::CENTER_CENTER,
                    "×",
                    FontId::proportional(16.0),
                    Color32::WHITE,
                );
            }
        }

        self.handle_pointer_input(ui, &response, rect);

        // Track zoom changes for overlay display
        let current_zoom = self.board.transform().zoom;
        let current_time = ctx.input(|i| i.time);
        if (current_zoom - self.prev_zoom_level).abs() > 0.001 {
            self.zoom_changed_time = Some(current_time);
            self.prev_zoom_level = current_zoom;
        }

        self.update_cursor(&ctx, hovered.is_some());

        let zoom_action = self.render_zoom_controls(&ctx, rect);
        self.render_zoom_info_overlay(&ctx, rect, current_time);
        self.render_status_overlay(&ctx, rect);
        self.render_drop_hint(&ctx, ui, rect);

        let viewport_center = (rect.size() / 2.0).to_pos2();
        match zoom_action {
            ZoomAction::None => {}
            ZoomAction::ZoomIn => self.board.zoom(ZOOM_STEP, viewport_center),
            ZoomAction::ZoomOut => self.board.zoom(-ZOOM_STEP, viewport_center),
            ZoomAction::Reset => self.board.reset_view(),
        }

        response
    }

    /// Topmost image under a screen position
    fn image_at(&self, screen_pos: Pos2, origin: Pos2) -> Option<&PlacedImage> {
        let canvas_pos = transform::screen_to_canvas(screen_pos, origin, self.board.transform());
        self.board.images().hit_test(canvas_pos)
    }

    /// Upload pixels for new images and drop textures of removed ones.
    /// Pixels larger than the renderer's texture limit are downscaled first.
    fn sync_textures(&mut self, ctx: &egui::Context) {
        let max_side = ctx.input(|i| i.max_texture_side);
        let live: HashSet<&SourceHandle> = self.board.images().iter().map(|image| &image.handle).collect();
        self.textures.retain(|handle, _| live.contains(handle));

        for image in self.board.images() {
            if self.textures.contains_key(&image.handle) {
                continue;
            }
            if let Some(pixels) = self.loader.store().get(&image.handle) {
                let pixels = decode::fit_within(pixels, max_side);
                let texture = ctx.load_texture(format!("image-{}", image.id), pixels, TextureOptions::LINEAR);
                self.textures.insert(image.handle.clone(), texture);
            }
        }
    }

    fn collect_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in &dropped {
            match SelectedFile::from_dropped(file) {
                Some(selected) => self.dropped_files.push(selected),
                None => log::warn!("dropped file {:?} has no content", file.name),
            }
        }
    }

    /// Handle wheel zoom, space panning, image drag, and clicks
    fn handle_pointer_input(&mut self, ui: &Ui, response: &Response, rect: Rect) {
        let origin = rect.min;
        let pointer_pos = ui.input(|i| i.pointer.latest_pos());
        let pointer_in_rect = pointer_pos.is_some_and(|pos| rect.contains(pos));

        // Pinch / ctrl+wheel zoom arrives as a multiplicative factor
        let zoom_delta = ui.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 && pointer_in_rect {
            if let Some(pos) = pointer_pos {
                let current = self.board.transform().zoom;
                self.board.zoom(current * (zoom_delta - 1.0), (pos - origin).to_pos2());
            }
        }

        // Plain wheel; egui reports scrolling up as positive y
        let scroll_delta = ui.input(|i| i.raw_scroll_delta);
        if scroll_delta.y != 0.0 && zoom_delta == 1.0 && pointer_in_rect {
            if let Some(pos) = pointer_pos {
                self.board.wheel(-scroll_delta.y, (pos - origin).to_pos2());
            }
        }

        if response.drag_started_by(PointerButton::Primary) && !self.board.primary_pressed() {
            let press = ui.input(|i| i.pointer.press_origin());
            if let Some(press) = press {
                if let Some(id) = self.image_at(press, origin).map(|image| image.id.clone()) {
                    self.board.begin_drag(&id, press, origin);
                }
            }
        }

        if response.dragged_by(PointerButton::Primary) {
            if self.board.transform().is_panning {
                self.board.pointer_moved(response.drag_delta());
            } else if let Some(pos) = response.interact_pointer_pos() {
                self.board.drag_to(pos, origin);
            }
        }

        if response.drag_stopped_by(PointerButton::Primary) {
            self.board.primary_released();
            self.board.end_drag();
        }

        if response.clicked_by(PointerButton::Primary) && !self.board.is_space_pressed() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.handle_click(pos, origin);
            }
        }
    }

    /// A click on the remove button removes; anywhere else on an image raises it
    fn handle_click(&mut self, pos: Pos2, origin: Pos2) {
        let transform = *self.board.transform();
        let Some((id, screen_rect)) = self
            .image_at(pos, origin)
            .map(|image| (image.id.clone(), image_screen_rect(image, origin, &transform)))
        else {
            return;
        };

        let button = remove_button_rect(screen_rect);
        if button.center().distance(pos) <= REMOVE_BUTTON_RADIUS {
            self.remove_image(&id);
        } else {
            self.board.select_image(&id);
        }
    }

    /// Track the space bar and zoom shortcuts
    fn handle_keyboard_input(&mut self, ctx: &egui::Context, viewport_size: Vec2) {
        let space_down = ctx.input(|i| i.key_down(Key::Space));
        if space_down != self.board.is_space_pressed() {
            self.board.set_space_pressed(space_down);
        }

        let viewport_center = (viewport_size / 2.0).to_pos2();
        ctx.input(|i| {
            if i.key_pressed(Key::Equals) || i.key_pressed(Key::Plus) {
                self.board.zoom(ZOOM_STEP, viewport_center);
            }
            if i.key_pressed(Key::Minus) {
                self.board.zoom(-ZOOM_STEP, viewport_center);
            }
            if i.key_pressed(Key::Num0) {
                self.board.reset_view();
            }
        });
    }

    fn update_cursor(&self, ctx: &egui::Context, over_image: bool) {
        if self.board.transform().is_panning {
            ctx.set_cursor_icon(CursorIcon::Grabbing);
        } else if self.board.is_space_pressed() {
            ctx.set_cursor_icon(CursorIcon::Grab);
        } else if self.board.dragged_image().is_some() || over_image {
            ctx.set_cursor_icon(CursorIcon::Move);
        }
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    /// Render zoom control buttons at bottom-right of widget.
    /// Returns an action to be applied after rendering.
    fn render_zoom_controls(&self, ctx: &egui::Context, widget_rect: Rect) -> ZoomAction {
        let button_size = egui::vec2(28.0, 28.0);
        let margin = 10.0;
        let spacing = 4.0;

        let num_buttons = 3.0;
        let base_x = widget_rect.max.x - margin - button_size.x * num_buttons - spacing * (num_buttons - 1.0);
        let base_y = widget_rect.max.y - margin - button_size.y;

        let mut action = ZoomAction::None;

        egui::Area::new(egui::Id::new("zoom_controls"))
            .fixed_pos(egui::pos2(base_x, base_y))
            .show(ctx, |ui| {
                let frame_style = overlay_frame(ui);
                let text_color = get_overlay_text_color(ui);

                frame_style.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = spacing;

                        let can_reset = !self.board.transform().is_default();
                        let reset_color = if can_reset { text_color } else { text_color.gamma_multiply(0.3) };
                        let reset_btn = egui::Button::new(egui::RichText::new("⟲").color(reset_color))
                            .fill(Color32::TRANSPARENT);
                        if ui.add_sized(button_size, reset_btn).clicked() && can_reset {
                            action = ZoomAction::Reset;
                        }

                        let minus_btn = egui::Button::new(egui::RichText::new("−").color(text_color))
                            .fill(Color32::TRANSPARENT);
                        if ui.add_sized(button_size, minus_btn).clicked() {
                            action = ZoomAction::ZoomOut;
                        }

                        let plus_btn = egui::Button::new(egui::RichText::new("+").color(text_color))
                            .fill(Color32::TRANSPARENT);
                        if ui.add_sized(button_size, plus_btn).clicked() {
                            action = ZoomAction::ZoomIn;
                        }
                    });
                });
            });

        action
    }

    /// Render zoom level overlay while zooming
    fn render_zoom_info_overlay(&self, ctx: &egui::Context, widget_rect: Rect, current_time: f64) {
        let should_show = self
            .zoom_changed_time
            .is_some_and(|changed_time| (current_time - changed_time) < ZOOM_OVERLAY_DURATION);
        if !should_show {
            return;
        }

        egui::Area::new(egui::Id::new("zoom_info_overlay"))
            .fixed_pos(egui::pos2(widget_rect.center().x - 40.0, widget_rect.center().y - 20.0))
            .show(ctx, |ui| {
                let text_color = get_overlay_text_color(ui);
                let bg = get_overlay_bg(ui);
                egui::Frame::popup(ui.style())
                    .fill(bg)
                    .corner_radius(8)
                    .inner_margin(egui::Margin::symmetric(16, 8))
                    .show(ui, |ui| {
                        ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend);
                        ui.label(
                            egui::RichText::new(format_zoom_percent(self.board.transform().zoom))
                                .color(text_color)
                                .size(24.0),
                        );
                    });
            });
    }

    /// Loading indicator and error banner at top-left of widget
    fn render_status_overlay(&self, ctx: &egui::Context, widget_rect: Rect) {
        let error = self.board.last_error();
        if error.is_none() && !self.board.is_loading() {
            return;
        }

        egui::Area::new(egui::Id::new("status_overlay"))
            .fixed_pos(egui::pos2(widget_rect.min.x + 10.0, widget_rect.min.y + 10.0))
            .show(ctx, |ui| {
                ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend);
                if let Some(message) = error {
                    egui::Frame::NONE
                        .fill(Color32::from_rgb(254, 226, 226))
                        .stroke(Stroke::new(1.0, Color32::from_rgb(248, 113, 113)))
                        .corner_radius(4)
                        .inner_margin(egui::Margin::symmetric(12, 8))
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(format!("⚠ {}", message)).color(Color32::from_rgb(185, 28, 28)));
                        });
                }
                if self.board.is_loading() {
                    overlay_frame(ui).show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(egui::RichText::new("Loading images…").color(get_overlay_text_color(ui)));
                        });
                    });
                }
            });
    }

    /// Hint on an empty board, and a highlight while files hover over it
    fn render_drop_hint(&self, ctx: &egui::Context, ui: &Ui, widget_rect: Rect) {
        let files_hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let painter = ui.painter_at(widget_rect);

        if files_hovering {
            painter.rect_stroke(
                widget_rect.shrink(4.0),
                8.0,
                Stroke::new(2.0, DRAG_HIGHLIGHT),
                StrokeKind::Inside,
            );
            painter.text(
                widget_rect.center(),
                Align2::CENTER_CENTER,
                "Drop images to add them",
                FontId::proportional(20.0),
                DRAG_HIGHLIGHT,
            );
        } else if self.board.images().is_empty() && !self.board.is_loading() {
            painter.text(
                widget_rect.center(),
                Align2::CENTER_CENTER,
                "Drop images here (JPEG, PNG, GIF, WebP)",
                FontId::proportional(16.0),
                Color32::from_gray(140),
            );
        }
    }
}

/// Screen rectangle of an image given the element origin and view transform
fn image_screen_rect(image: &PlacedImage, origin: Pos2, transform: &TransformState) -> Rect {
    let top_left = transform::canvas_to_screen(image.position, transform) + origin.to_vec2();
    Rect::from_min_size(top_left, image.display_size().to_vec2() * transform.zoom)
}

/// Remove button area inside the top-right corner of an image
fn remove_button_rect(image_rect: Rect) -> Rect {
    let center = image_rect.right_top()
        + egui::vec2(
            -(REMOVE_BUTTON_RADIUS + REMOVE_BUTTON_INSET),
            REMOVE_BUTTON_RADIUS + REMOVE_BUTTON_INSET,
        );
    Rect::from_center_size(center, Vec2::splat(REMOVE_BUTTON_RADIUS * 2.0))
}

/// Get a translucent background color appropriate for light/dark mode
fn get_overlay_bg(ui: &Ui) -> Color32 {
    if ui.visuals().dark_mode {
        Color32::from_black_alpha(180)
    } else {
        Color32::from_white_alpha(220)
    }
}

/// Get text color appropriate for light/dark mode overlays
fn get_overlay_text_color(ui: &Ui) -> Color32 {
    if ui.visuals().dark_mode {
        Color32::WHITE
    } else {
        Color32::from_gray(30)
    }
}

/// Create a frame style for overlay controls that adapts to light/dark mode
fn overlay_frame(ui: &Ui) -> egui::Frame {
    let bg = get_overlay_bg(ui);
    egui::Frame::NONE
        .fill(bg)
        .corner_radius(4)
        .inner_margin(egui::Margin::symmetric(6, 4))
}

/// Format zoom level as a percentage
fn format_zoom_percent(zoom: f32) -> String {
    format!("{:.0}%", zoom * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_at(x: f32, y: f32, width: u32, height: u32) -> PlacedImage {
        PlacedImage {
            id: ImageId::from("a"),
            handle: SourceHandle::from("pixels:a"),
            name: "a.png".to_string(),
            original_width: width,
            original_height: height,
            position: Pos2::new(x, y),
            z_index: 1,
        }
    }

    #[test]
    fn test_image_screen_rect_applies_transform_and_origin() {
        let transform = TransformState::new().zoom_at(1.0, Pos2::ZERO).pan_by(Vec2::new(5.0, -5.0));
        let rect = image_screen_rect(&image_at(50.0, 50.0, 400, 300), Pos2::new(100.0, 10.0), &transform);

        // zoom 2: (50 * 2 + 5 + 100, 50 * 2 - 5 + 10)
        assert!((rect.min.x - 205.0).abs() < 0.001);
        assert!((rect.min.y - 105.0).abs() < 0.001);
        assert!((rect.width() - 800.0).abs() < 0.001);
        assert!((rect.height() - 600.0).abs() < 0.001);
    }

    #[test]
    fn test_image_screen_rect_uses_capped_size() {
        let rect = image_screen_rect(&image_at(0.0, 0.0, 1400, 1000), Pos2::ZERO, &TransformState::new());
        assert!((rect.width() - 700.0).abs() < 0.001);
        assert!((rect.height() - 500.0).abs() < 0.001);
    }

    #[test]
    fn test_remove_button_inside_image() {
        let image_rect = Rect::from_min_size(Pos2::ZERO, egui::vec2(400.0, 300.0));
        let button = remove_button_rect(image_rect);
        assert!(image_rect.contains_rect(button));
        assert!(button.center().x > 350.0 && button.center().y < 50.0);
    }

    #[test]
    fn test_format_zoom_percent() {
        assert_eq!(format_zoom_percent(1.0), "100%");
        assert_eq!(format_zoom_percent(0.1), "10%");
        assert_eq!(format_zoom_percent(2.5), "250%");
    }

    #[test]
    fn test_remove_image_releases_pixels() {
        let loader = ImageLoader::default();
        let mut widget = MoodBoardWidget::new(loader.clone());
        let handle = SourceHandle::from("pixels:a");
        loader.store().insert(handle.clone(), egui::ColorImage::filled([1, 1], Color32::RED));
        widget.board_mut().finish_loading(Ok(vec![image_at(0.0, 0.0, 1, 1)]));

        widget.remove_image(&ImageId::from("a"));

        assert!(widget.board().images().is_empty());
        assert!(!loader.store().contains(&handle));
    }

    fn placed(id: &str, width: u32, height: u32) -> PlacedImage {
        PlacedImage {
            id: ImageId::from(id),
            handle: SourceHandle::from(format!("pixels:{}", id)),
            name: format!("{}.png", id),
            original_width: width,
            original_height: height,
            position: Pos2::ZERO,
            z_index: 1,
        }
    }

    /// Widget with 400x300 images laid out at (50, 50), (450, 50), ...
    fn widget_with(ids: &[&str], pixel_size: [usize; 2]) -> (MoodBoardWidget, ImageLoader) {
        let loader = ImageLoader::default();
        let mut widget = MoodBoardWidget::new(loader.clone());
        let images: Vec<PlacedImage> = ids.iter().map(|id| placed(id, 400, 300)).collect();
        for image in &images {
            loader
                .store()
                .insert(image.handle.clone(), egui::ColorImage::filled(pixel_size, Color32::RED));
        }
        widget.board_mut().finish_loading(Ok(images));
        (widget, loader)
    }

    fn z_of(widget: &MoodBoardWidget, id: &str) -> i32 {
        widget
            .board()
            .images()
            .get(&ImageId::from(id))
            .map(|image| image.z_index)
            .expect("image present")
    }

    #[test]
    fn test_click_on_image_raises_it() {
        let (mut widget, loader) = widget_with(&["a", "b"], [2, 2]);
        widget
            .board_mut()
            .update_image_position(&ImageId::from("b"), Pos2::new(300.0, 200.0));

        widget.handle_click(Pos2::new(100.0, 100.0), Pos2::ZERO);

        assert!(z_of(&widget, "a") > z_of(&widget, "b"));
        assert_eq!(widget.board().images().len(), 2);
        assert_eq!(loader.store().len(), 2);
    }

    #[test]
    fn test_click_on_remove_button_removes_image() {
        let (mut widget, loader) = widget_with(&["a", "b"], [2, 2]);

        // "a" covers (50, 50)..(450, 350); its button sits inset from the top-right corner
        let button = remove_button_rect(Rect::from_min_size(Pos2::new(50.0, 50.0), egui::vec2(400.0, 300.0)));
        widget.handle_click(button.center(), Pos2::ZERO);

        assert!(widget.board().images().get(&ImageId::from("a")).is_none());
        assert!(widget.board().images().get(&ImageId::from("b")).is_some());
        assert!(!loader.store().contains(&SourceHandle::from("pixels:a")));
        assert_eq!(loader.store().len(), 1);
    }

    #[test]
    fn test_click_on_empty_canvas_changes_nothing() {
        let (mut widget, _loader) = widget_with(&["a"], [2, 2]);
        let revision = widget.board().revision();

        widget.handle_click(Pos2::new(2000.0, 2000.0), Pos2::ZERO);

        assert_eq!(widget.board().revision(), revision);
    }

    #[test]
    fn test_sync_textures_drops_removed_handles() {
        let ctx = egui::Context::default();
        let (mut widget, _loader) = widget_with(&["a", "b"], [2, 2]);

        let _ = ctx.run(egui::RawInput::default(), |ctx| widget.sync_textures(ctx));
        assert_eq!(widget.textures.len(), 2);

        widget.remove_image(&ImageId::from("a"));
        let _ = ctx.run(egui::RawInput::default(), |ctx| widget.sync_textures(ctx));

        assert_eq!(widget.textures.len(), 1);
        assert!(widget.textures.contains_key(&SourceHandle::from("pixels:b")));
    }

    #[test]
    fn test_sync_textures_respects_max_texture_side() {
        let ctx = egui::Context::default();
        let (mut widget, _loader) = widget_with(&["a"], [20, 4]);
        let raw = egui::RawInput {
            max_texture_side: Some(8),
            ..Default::default()
        };

        let _ = ctx.run(raw, |ctx| widget.sync_textures(ctx));

        let texture = widget
            .textures
            .get(&SourceHandle::from("pixels:a"))
            .expect("texture uploaded");
        assert_eq!(texture.size()[0], 8);
        assert!(texture.size()[1] <= 2);
    }
}
