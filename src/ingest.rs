//! Turning user-supplied files into `PlacedImage`s
//!
//! The pipeline is: validate metadata, read the natural dimensions, create a
//! backing resource handle. The concrete reader/handle backend is behind
//! [`ImageDecoder`] so it can be swapped (see `decode::ImageLoader`).

use std::future::Future;

use thiserror::Error;

use crate::board::{PlacedImage, SourceHandle};

/// MIME types accepted for upload
pub const SUPPORTED_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Largest accepted file, in bytes (10 MiB, inclusive)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Why a file could not be turned into an image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("Invalid file type: {mime:?}")]
    InvalidFileType { mime: String },

    #[error("File too large: {size} bytes")]
    FileTooLarge { size: u64 },

    #[error("Failed to load image: {0}")]
    DecodeFailure(String),
}

/// Metadata of a file offered for upload
pub trait ImageFile {
    fn name(&self) -> String;
    fn mime_type(&self) -> String;
    /// Size in bytes
    fn size(&self) -> u64;
}

/// Natural pixel dimensions of an image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Reads image dimensions and creates backing resources
pub trait ImageDecoder<F: ImageFile> {
    /// Start reading the natural dimensions of `file`.
    ///
    /// Implementations should kick off any I/O when called, not when the
    /// returned future is first polled, so that several reads can overlap.
    fn read_dimensions(&self, file: &F) -> impl Future<Output = Result<ImageDimensions, IngestError>> + 'static;

    /// Create the resource backing `file`'s pixels
    fn create_handle(&self, file: &F) -> Result<SourceHandle, IngestError>;
}

/// Check a file against the type allow-list and the size ceiling
pub fn validate_file(file: &impl ImageFile) -> Result<(), IngestError> {
    let mime = file.mime_type();
    if !SUPPORTED_TYPES.contains(&mime.as_str()) {
        return Err(IngestError::InvalidFileType { mime });
    }

    let size = file.size();
    if size > MAX_FILE_SIZE {
        return Err(IngestError::FileTooLarge { size });
    }

    Ok(())
}

pub fn is_valid_file(file: &impl ImageFile) -> bool {
    validate_file(file).is_ok()
}

/// Build an unplaced image from `file`.
///
/// Validation runs before the decoder is touched. The result sits at the
/// canvas origin with `z_index` 1; the collection assigns the real placement.
pub async fn create_from_file<F, D>(file: &F, decoder: &D) -> Result<PlacedImage, IngestError>
where
    F: ImageFile,
    D: ImageDecoder<F>,
{
    validate_file(file)?;
    let dimensions = decoder.read_dimensions(file).await?;
    finish_image(file, decoder, dimensions)
}

fn finish_image<F, D>(file: &F, decoder: &D, dimensions: ImageDimensions) -> Result<PlacedImage, IngestError>
where
    F: ImageFile,
    D: ImageDecoder<F>,
{
    if dimensions.width == 0 || dimensions.height == 0 {
        return Err(IngestError::DecodeFailure(format!(
            "empty image {}x{}",
            dimensions.width, dimensions.height
        )));
    }

    let handle = decoder.create_handle(file)?;
    Ok(PlacedImage::new(handle, file.name(), dimensions.width, dimensions.height))
}

/// Turn a batch of files into images, in input order.
///
/// Every valid file's dimension read is started before the first one is
/// awaited. A file that fails at any stage is logged and left out; the rest
/// of the batch carries on.
pub async fn ingest_batch<F, D>(files: &[F], decoder: &D) -> Vec<PlacedImage>
where
    F: ImageFile,
    D: ImageDecoder<F>,
{
    let mut pending = Vec::with_capacity(files.len());
    for file in files {
        match validate_file(file) {
            Ok(()) => pending.push((file, decoder.read_dimensions(file))),
            Err(err) => log::warn!("skipping {}: {}", file.name(), err),
        }
    }

    let mut images = Vec::with_capacity(pending.len());
    for (file, read) in pending {
        let result = match read.await {
            Ok(dimensions) => finish_image(file, decoder, dimensions),
            Err(err) => Err(err),
        };
        match result {
            Ok(image) => images.push(image),
            Err(err) => log::warn!("skipping {}: {}", file.name(), err),
        }
    }

    log::info!("ingested {} of {} files", images.len(), files.len());
    images
}
