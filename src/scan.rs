//! Site tree discovery.
//!
//! Walks the site root to find description files and the passthrough files
//! that are copied verbatim into the output tree.
//!
//! ## Directory Structure
//!
//! ```text
//! site/                        # Site root
//! ├── _config.toml             # Site configuration (never copied)
//! ├── _gallery.html            # Optional template override (never copied)
//! ├── about.md                 # Description at the root: root gallery only
//! ├── about.jpg
//! ├── rome/                    # Directory gallery
//! │   ├── _gallery.toml        # Optional title / cover override
//! │   ├── colosseum.md         # Description file
//! │   └── colosseum.jpg        # Paired photo
//! └── .git/                    # Hidden: skipped
//! ```
//!
//! ## Rules
//!
//! - Entries whose name starts with `_` or `.` are skipped, directories
//!   included, and so is the output directory.
//! - Entries are visited in file-name order, depth first. This discovery order
//!   is the tie-break for records sharing a date.
//! - Every `*.md` is a description file. Every regular file, descriptions and
//!   photos included, is a passthrough file.

use crate::config::{self, ConfigError, GalleryConfig};
use crate::record::{self, ImageRecord, MetadataError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("Path is not valid UTF-8: {0}")]
    InvalidPath(PathBuf),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Files found under the site root, as `/`-separated paths relative to it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// `*.md` description files, in discovery order.
    pub descriptions: Vec<String>,
    /// Every regular file to copy into the output tree, in discovery order.
    pub files: Vec<String>,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('_') || name.starts_with('.'))
}

fn relative_path(site_root: &Path, path: &Path) -> Result<String, ScanError> {
    let relative = path
        .strip_prefix(site_root)
        .map_err(|_| ScanError::InvalidPath(path.to_path_buf()))?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    parts
        .map(|p| p.join("/"))
        .ok_or_else(|| ScanError::InvalidPath(path.to_path_buf()))
}

/// Walk the site root.
pub fn discover(site_root: &Path, output_dir: &Path) -> Result<Discovery, ScanError> {
    let mut discovery = Discovery::default();

    let walker = WalkDir::new(site_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(is_hidden(e) || e.path() == output_dir));

    for entry in walker {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: site_root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = relative_path(site_root, entry.path())?;
        let is_description = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == "md");
        if is_description {
            discovery.descriptions.push(relative.clone());
        }
        discovery.files.push(relative);
    }

    Ok(discovery)
}

/// Load every description file, in order. The first malformed file fails
/// the whole load.
pub fn load_records(
    site_root: &Path,
    descriptions: &[String],
) -> Result<Vec<ImageRecord>, ScanError> {
    descriptions
        .iter()
        .map(|relative| record::load_record(site_root, relative).map_err(ScanError::from))
        .collect()
}

/// `_gallery.toml` of every directory holding at least one record.
pub fn load_gallery_configs(
    site_root: &Path,
    records: &[ImageRecord],
) -> Result<HashMap<String, GalleryConfig>, ScanError> {
    let mut configs = HashMap::new();
    for record in records {
        let dir = record.directory();
        if dir.is_empty() || configs.contains_key(dir) {
            continue;
        }
        if let Some(config) = config::load_gallery_config(&site_root.join(dir))? {
            configs.insert(dir.to_string(), config);
        }
    }
    Ok(configs)
}
