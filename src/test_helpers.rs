//! Shared test utilities for the photofolio test suite.
//!
//! Provides record constructors, a synthetic JPEG writer, and a site fixture
//! builder so unit tests can lay out a complete site in a temp directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new();
//! site.photo("rome/colosseum", "Colosseum", "2019-04-12 19:42:00");
//! let found = crate::scan::discover(site.root(), &site.output());
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::SITE_CONFIG_FILE;
use crate::record::{ImageRecord, parse_record};

// =========================================================================
// Records
// =========================================================================

/// Build a record for `path` with the given title and date. Panics on a bad
/// date so test typos surface immediately.
pub fn record(path: &str, title: &str, date: &str) -> ImageRecord {
    parse_record(path, &description(title, date, ""))
        .unwrap_or_else(|e| panic!("bad test record {path}: {e}"))
}

/// Description file text with the given header values and body.
pub fn description(title: &str, date: &str, body: &str) -> String {
    format!("---\ntitle: {title}\ndate: {date}\n---\n{body}")
}

// =========================================================================
// Images
// =========================================================================

/// Write a small gradient JPEG at `path`, creating parent directories.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

// =========================================================================
// Site fixture
// =========================================================================

pub const TEST_CONFIG: &str = r#"
title = "Field Notes"
author = "Jo Tester"
baseurl = "https://photos.example.com/"
output = "_site"
thumbsize = 16
previewsize = 32
"#;

/// A throwaway site root with a `_config.toml`.
pub struct SiteFixture {
    pub dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self::with_config(TEST_CONFIG)
    }

    pub fn with_config(config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SITE_CONFIG_FILE), config).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("_site")
    }

    /// Write any file under the site root.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write a description file and its paired JPEG. `stem` has no extension.
    pub fn photo(&self, stem: &str, title: &str, date: &str) {
        self.write(&format!("{stem}.md"), &description(title, date, ""));
        create_test_jpeg(&self.root().join(format!("{stem}.jpg")), 40, 30);
    }

    /// Read a file from the output directory.
    pub fn read_output(&self, relative: &str) -> String {
        let path = self.output().join(relative);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
    }
}
