//! Image processing on top of the pure Rust `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Thumbnail** | centered square `crop_imm` + Lanczos3 `resize_exact` → JPEG |
//! | **Preview** | aspect-preserving Lanczos3 resize, never upscaled → JPEG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop and dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{CropBox, preview_dimensions, square_crop};
pub use operations::{DeriveConfig, derive_images, get_dimensions};
pub use params::{PreviewParams, Quality, ThumbnailParams};
pub use rust_backend::RustBackend;
