//! End-to-end site build.
//!
//! ```text
//! _config.toml ─┐
//! templates ────┤ validated before anything is written
//! descriptions ─┘
//!       │
//!       ├─ publish   passthrough files → output tree
//!       ├─ gallery   records → root, directory and listing galleries
//!       ├─ render    index + feed per gallery, single pages for root
//!       └─ process   queued derivations on the worker pool
//! ```
//!
//! Every failure before the derivation stage aborts the build. Derivation
//! failures are per image and end up in [`BuildSummary::report`].

use crate::config::{self, ConfigError};
use crate::gallery;
use crate::imaging::{DeriveConfig, ImageBackend, Quality, RustBackend};
use crate::process::{self, DerivationQueue, ProcessError, ProcessEvent, ProcessReport};
use crate::publish::{self, PublishError};
use crate::render::{self, RenderContext, RenderError, RenderStats};
use crate::scan::{self, ScanError};
use crate::template::{TemplateError, Templates};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// What a build did.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub records: usize,
    pub galleries: usize,
    pub copied: usize,
    pub render: RenderStats,
    pub report: ProcessReport,
}

/// Build the site rooted at `site_root` with the production image backend.
pub fn build(
    site_root: &Path,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BuildSummary, SiteError> {
    build_with_backend(&RustBackend::new(), site_root, Utc::now(), events)
}

/// Build with a specific backend and feed timestamp (allows testing with mock).
pub fn build_with_backend<B: ImageBackend>(
    backend: &B,
    site_root: &Path,
    updated: DateTime<Utc>,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BuildSummary, SiteError> {
    let config = config::load_config(site_root)?;
    let templates = Templates::load(site_root)?;
    let output_dir = config.output_dir(site_root);

    let discovery = scan::discover(site_root, &output_dir)?;
    let records = scan::load_records(site_root, &discovery.descriptions)?;
    let gallery_configs = scan::load_gallery_configs(site_root, &records)?;

    let copied = publish::publish_all(site_root, &output_dir, &discovery.files)?;

    let galleries = gallery::build_galleries(&records, &config.title, &gallery_configs);

    let ctx = RenderContext {
        config: &config,
        templates: &templates,
        site_root,
        output_dir: &output_dir,
        updated,
    };
    let mut queue = DerivationQueue::new();
    let mut stats = RenderStats::default();
    for gallery in galleries.iter() {
        stats += render::render_gallery(&ctx, gallery, &mut queue)?;
    }

    let derive = DeriveConfig {
        thumbsize: config.thumbsize,
        previewsize: config.previewsize,
        quality: Quality::new(config.quality),
    };
    let threads = config::effective_threads(&config.processing);
    let report = process::derive_all(backend, queue.tasks(), &derive, threads, events)?;

    Ok(BuildSummary {
        records: records.len(),
        galleries: galleries.count(),
        copied,
        render: stats,
        report,
    })
}
