//! Site configuration module.
//!
//! Handles loading and validating `_config.toml` at the site root and the
//! optional `_gallery.toml` found in any gallery directory. Both files are
//! underscore-prefixed, so they are never copied into the output tree.
//!
//! ## Site Configuration
//!
//! ```toml
//! title = "Field Notes"               # Site title (root gallery heading)
//! author = "A. Photographer"          # Feed author
//! baseurl = "https://photos.example"  # Absolute URL prefix for feed links
//! output = "_site"                    # Output directory, relative to the site root
//! thumbsize = 200                     # Square thumbnail edge in pixels
//! previewsize = 1200                  # Preview bounding box edge in pixels
//! quality = 90                        # JPEG quality of derived images (optional)
//!
//! [processing]
//! max_processes = 4                   # Max derivation workers (optional, auto = CPU cores)
//! ```
//!
//! Every key above `quality` is required. Unknown keys are rejected to catch
//! typos early.
//!
//! ## Gallery Configuration
//!
//! ```toml
//! title = "Rome, Spring 2019"   # Replaces the directory name as gallery title
//! image = "Colosseum at Dusk"   # Title of the record used as the album cover
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the site configuration file in the site root.
pub const SITE_CONFIG_FILE: &str = "_config.toml";

/// Name of the per-directory gallery configuration file.
pub const GALLERY_CONFIG_FILE: &str = "_gallery.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Site configuration not found: {0}")]
    Missing(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `_config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, used for the root gallery and as suffix of every page title.
    pub title: String,
    /// Feed author name.
    pub author: String,
    /// Absolute site URL; feed links and entry ids are built on top of it.
    pub baseurl: String,
    /// Output directory, relative to the site root.
    pub output: String,
    /// Edge of the square thumbnails, in pixels.
    pub thumbsize: u32,
    /// Edge of the square box previews must fit in, in pixels.
    pub previewsize: u32,
    /// JPEG encoding quality for derived images (1 = worst, 100 = best).
    #[serde(default = "default_quality")]
    pub quality: u32,
    /// Parallel processing settings.
    #[serde(default)]
    pub processing: ProcessingConfig,
}

fn default_quality() -> u32 {
    90
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".into()));
        }
        if self.baseurl.trim().is_empty() {
            return Err(ConfigError::Validation("baseurl must not be empty".into()));
        }
        if self.output.trim().is_empty() {
            return Err(ConfigError::Validation("output must not be empty".into()));
        }
        if self.thumbsize == 0 {
            return Err(ConfigError::Validation("thumbsize must be non-zero".into()));
        }
        if self.previewsize == 0 {
            return Err(ConfigError::Validation(
                "previewsize must be non-zero".into(),
            ));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash, ready to have absolute paths appended.
    pub fn base_url(&self) -> &str {
        self.baseurl.trim_end_matches('/')
    }

    /// Output directory resolved against the site root.
    pub fn output_dir(&self, site_root: &Path) -> PathBuf {
        site_root.join(&self.output)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image derivation workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never below one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Optional per-directory overrides from `_gallery.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Gallery title; the directory path is used when absent.
    pub title: Option<String>,
    /// Title of the record to use as the gallery's cover in the album listing.
    pub image: Option<String>,
}

/// Load and validate `_config.toml` from the site root.
pub fn load_config(site_root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = site_root.join(SITE_CONFIG_FILE);
    if !path.is_file() {
        return Err(ConfigError::Missing(path));
    }
    let config: SiteConfig = read_toml(&path)?;
    config.validate()?;
    Ok(config)
}

/// Load `_gallery.toml` from a gallery directory.
///
/// Returns `Ok(None)` when the directory has no gallery config.
pub fn load_gallery_config(dir: &Path) -> Result<Option<GalleryConfig>, ConfigError> {
    let path = dir.join(GALLERY_CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    read_toml(&path).map(Some)
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}
