//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::preview_dimensions;
use super::params::{PreviewParams, Quality, ThumbnailParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Sizes and encoding quality of the two derived images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeriveConfig {
    /// Edge of the square thumbnail.
    pub thumbsize: u32,
    /// Edge of the square box the preview must fit in.
    pub previewsize: u32,
    pub quality: Quality,
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(source: &Path, output: &Path, config: &DeriveConfig) -> ThumbnailParams {
    ThumbnailParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        size: config.thumbsize,
        quality: config.quality,
    }
}

/// Plan a preview operation for a source of the given dimensions.
pub fn plan_preview(
    source: &Path,
    output: &Path,
    source_dims: (u32, u32),
    config: &DeriveConfig,
) -> PreviewParams {
    let (width, height) = preview_dimensions(source_dims, config.previewsize);
    PreviewParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        quality: config.quality,
    }
}

/// Produce the thumbnail and preview of one source image.
///
/// The source is identified first, so an undecodable file fails before any
/// output is written. The two targets are independent files.
pub fn derive_images(
    backend: &impl ImageBackend,
    source: &Path,
    thumbnail: &Path,
    preview: &Path,
    config: &DeriveConfig,
) -> Result<()> {
    let dims = get_dimensions(backend, source)?;
    backend.thumbnail(&plan_thumbnail(source, thumbnail, config))?;
    backend.preview(&plan_preview(source, preview, dims, config))?;
    Ok(())
}
