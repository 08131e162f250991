//! In-memory image loading with the `image` crate
//!
//! `SelectedFile` is a file whose bytes are already in memory (read from a
//! browser `File`, or dropped onto the egui canvas). `ImageLoader` reads its
//! dimensions from the header only, and decodes the full RGBA pixels into a
//! shared `PixelStore` when a handle is created. Releasing a handle drops the
//! pixels and, through the widget, the texture built from them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::{self, Future};
use std::io::Cursor;
use std::rc::Rc;
use std::sync::Arc;

use egui::ColorImage;
use image::imageops::FilterType;

use crate::board::{HandleReleaser, SourceHandle};
use crate::ingest::{ImageDecoder, ImageDimensions, ImageFile, IngestError};

/// Longest side kept when decoding; larger images are downscaled to fit.
/// Covers the widest display size at maximum zoom.
pub const MAX_PIXEL_SIDE: u32 = 4096;

/// A user-selected file with its contents
#[derive(Clone, Debug)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Convert a file dropped onto the egui canvas.
    ///
    /// On the web the bytes are attached to the drop event; natively only the
    /// path is, so the file is read here. Returns None if no content is available.
    pub fn from_dropped(file: &egui::DroppedFile) -> Option<Self> {
        let bytes: Arc<[u8]> = match (&file.bytes, &file.path) {
            (Some(bytes), _) => bytes.clone(),
            (None, Some(path)) => match std::fs::read(path) {
                Ok(data) => data.into(),
                Err(err) => {
                    log::warn!("could not read dropped file {}: {}", path.display(), err);
                    return None;
                }
            },
            (None, None) => return None,
        };

        let name = if !file.name.is_empty() {
            file.name.clone()
        } else {
            file.path
                .as_ref()
                .and_then(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        let mime_type = if file.mime.is_empty() {
            mime_from_name(&name).to_string()
        } else {
            file.mime.clone()
        };

        Some(Self::new(name, mime_type, bytes))
    }
}

impl ImageFile for SelectedFile {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn mime_type(&self) -> String {
        self.mime_type.clone()
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Guess a MIME type from a file extension, the way browsers fill `File.type`
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "",
    }
}

/// Decoded pixels keyed by source handle, shared by the loader and the widget
#[derive(Clone, Default)]
pub struct PixelStore {
    pixels: Rc<RefCell<HashMap<SourceHandle, ColorImage>>>,
}

impl PixelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, handle: SourceHandle, image: ColorImage) {
        self.pixels.borrow_mut().insert(handle, image);
    }

    /// Whether pixels are stored for `handle`
    pub fn contains(&self, handle: &SourceHandle) -> bool {
        self.pixels.borrow().contains_key(handle)
    }

    /// Clone the pixels for `handle` (to upload as a texture)
    pub fn get(&self, handle: &SourceHandle) -> Option<ColorImage> {
        self.pixels.borrow().get(handle).cloned()
    }

    pub fn remove(&self, handle: &SourceHandle) -> Option<ColorImage> {
        self.pixels.borrow_mut().remove(handle)
    }

    pub fn len(&self) -> usize {
        self.pixels.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.borrow().is_empty()
    }
}

impl std::fmt::Debug for PixelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelStore").field("len", &self.len()).finish()
    }
}

/// Image backend decoding in-memory files into a `PixelStore`
#[derive(Clone, Debug, Default)]
pub struct ImageLoader {
    store: PixelStore,
}

impl ImageLoader {
    pub fn new(store: PixelStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &PixelStore {
        &self.store
    }
}

impl ImageDecoder<SelectedFile> for ImageLoader {
    fn read_dimensions(&self, file: &SelectedFile) -> impl Future<Output = Result<ImageDimensions, IngestError>> + 'static {
        // Header only; the bytes are already in memory so this resolves at once
        future::ready(read_header_dimensions(&file.bytes))
    }

    fn create_handle(&self, file: &SelectedFile) -> Result<SourceHandle, IngestError> {
        let mut decoded = image::load_from_memory(&file.bytes).map_err(decode_failure)?;
        if decoded.width() > MAX_PIXEL_SIDE || decoded.height() > MAX_PIXEL_SIDE {
            decoded = decoded.resize(MAX_PIXEL_SIDE, MAX_PIXEL_SIDE, FilterType::Triangle);
        }
        let rgba = decoded.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());

        let handle = SourceHandle::from(format!("pixels:{}", uuid::Uuid::new_v4()));
        log::debug!("decoded {} ({}x{}) into {}", file.name, size[0], size[1], handle.as_str());
        self.store.insert(handle.clone(), pixels);
        Ok(handle)
    }
}

impl HandleReleaser for ImageLoader {
    fn release_handle(&self, handle: &SourceHandle) {
        if self.store.remove(handle).is_none() {
            log::warn!("released unknown handle {}", handle.as_str());
        }
    }
}

/// Downscale `pixels` so neither side exceeds `max_side`, keeping the aspect ratio
pub fn fit_within(pixels: ColorImage, max_side: usize) -> ColorImage {
    let [width, height] = pixels.size;
    if width <= max_side && height <= max_side {
        return pixels;
    }

    let Some(rgba) = image::RgbaImage::from_raw(width as u32, height as u32, pixels.as_raw().to_vec()) else {
        return pixels;
    };
    let side = max_side as u32;
    let scaled = image::DynamicImage::ImageRgba8(rgba)
        .resize(side, side, FilterType::Triangle)
        .to_rgba8();
    ColorImage::from_rgba_premultiplied([scaled.width() as usize, scaled.height() as usize], scaled.as_raw())
}

fn read_header_dimensions(bytes: &[u8]) -> Result<ImageDimensions, IngestError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| IngestError::DecodeFailure(err.to_string()))?;
    let (width, height) = reader.into_dimensions().map_err(decode_failure)?;
    Ok(ImageDimensions { width, height })
}

fn decode_failure(err: image::ImageError) -> IngestError {
    IngestError::DecodeFailure(err.to_string())
}
