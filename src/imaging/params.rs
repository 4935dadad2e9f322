//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations), which decides which
//! derived images a source needs, and the [`backend`](super::backend), which
//! does the pixel work. A mock backend can therefore stand in during tests
//! without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 90). Clamped on construction.
//! - [`ThumbnailParams`]: source, output, and the square edge of the thumbnail.
//! - [`PreviewParams`]: source, output, and the exact output dimensions.

use std::path::PathBuf;

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Parameters for a thumbnail: centered square crop, then resize to `size²`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub size: u32,
    pub quality: Quality,
}

/// Parameters for a preview: aspect-preserving resize to `width × height`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
