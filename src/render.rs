//! Gallery rendering.
//!
//! Every gallery produces two documents:
//!
//! - **Index** (`{base}/index.html`): one thumbnail entry per member.
//! - **Feed** (`{base}/feed/index.xml`): one Atom entry per member.
//!
//! The root gallery additionally produces one **single-image page** per
//! record at `/<stem>/index.html`, chained to its neighbours in display order,
//! and queues thumbnail/preview derivation for records whose derived images
//! are stale.
//!
//! ## Output Structure
//!
//! ```text
//! _site/
//! ├── index.html              # root gallery
//! ├── feed/index.xml
//! ├── albums/
//! │   ├── index.html          # album listing
//! │   └── feed/index.xml
//! ├── rome/
//! │   ├── index.html          # directory gallery
//! │   ├── feed/index.xml
//! │   └── colosseum/
//! │       ├── index.html      # single-image page (from the root pass)
//! │       ├── thumb.jpg
//! │       └── preview.jpg
//! └── ...
//! ```
//!
//! Documents are always rewritten; only image derivation is skipped when
//! fresh. Each document is rendered from its own [`Bindings`], so nothing
//! carries over between pages.

use crate::config::SiteConfig;
use crate::feed::{FeedBinding, FeedEntry, FeedError};
use crate::gallery::{Gallery, GalleryKind};
use crate::links;
use crate::process::{DerivationQueue, DerivationTask};
use crate::publish;
use crate::record::ImageRecord;
use crate::template::{Bindings, TemplateError, Templates};
use chrono::{DateTime, Utc};
use maud::{Markup, PreEscaped, html};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Link target used at both ends of the prev/next chain.
pub const INERT_LINK: &str = "#";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Everything rendering needs besides the gallery itself.
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub templates: &'a Templates,
    pub site_root: &'a Path,
    pub output_dir: &'a Path,
    /// Feed-level `<updated>` timestamp.
    pub updated: DateTime<Utc>,
}

/// What one or more `render_gallery` calls produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub indexes: usize,
    pub feeds: usize,
    pub pages: usize,
    pub queued: usize,
}

impl std::ops::AddAssign for RenderStats {
    fn add_assign(&mut self, other: Self) {
        self.indexes += other.indexes;
        self.feeds += other.feeds;
        self.pages += other.pages;
        self.queued += other.queued;
    }
}

/// Render one gallery's documents, queuing stale derivations for the root.
pub fn render_gallery(
    ctx: &RenderContext<'_>,
    gallery: &Gallery<'_>,
    queue: &mut DerivationQueue,
) -> Result<RenderStats, RenderError> {
    let mut stats = RenderStats::default();
    let dir = gallery_dir(ctx.output_dir, &gallery.base);

    if gallery.is_root() {
        let records: Vec<&ImageRecord> = gallery.records().collect();
        for (i, record) in records.iter().enumerate() {
            let prev = i.checked_sub(1).and_then(|p| records.get(p)).copied();
            let next = records.get(i + 1).copied();

            let task = DerivationTask::for_record(record, ctx.site_root, ctx.output_dir);
            if queue.enqueue_if_stale(task) {
                stats.queued += 1;
            }

            let html = ctx
                .templates
                .single
                .render(&single_bindings(record, prev, next))?;
            let page_dir = ctx
                .output_dir
                .join(links::page_path(record).trim_matches('/'));
            write_file(&page_dir.join("index.html"), &html)?;
            stats.pages += 1;
        }
    }

    let index = ctx
        .templates
        .gallery
        .render(&gallery_bindings(gallery, &ctx.config.title, ctx.config.thumbsize))?;
    write_file(&dir.join("index.html"), &index)?;
    stats.indexes += 1;

    feed_binding(ctx, gallery).write_to_path(&dir.join("feed").join("index.xml"))?;
    stats.feeds += 1;

    Ok(stats)
}

/// Output directory of a gallery base (`/` → output root).
pub fn gallery_dir(output_dir: &Path, base: &str) -> PathBuf {
    let relative = base.trim_matches('/');
    if relative.is_empty() {
        output_dir.to_path_buf()
    } else {
        output_dir.join(relative)
    }
}

/// `<title>` of a gallery document.
pub fn document_title(gallery: &Gallery<'_>, site_title: &str) -> String {
    match gallery.kind {
        GalleryKind::Root => site_title.to_string(),
        GalleryKind::Directory | GalleryKind::Listing => {
            format!("{} » {}", gallery.title, site_title)
        }
    }
}

pub fn gallery_bindings(gallery: &Gallery<'_>, site_title: &str, thumbsize: u32) -> Bindings {
    let mut bindings = Bindings::new();
    bindings
        .text("page_title", &document_title(gallery, site_title))
        .text("heading", &gallery.title)
        .set("entries", entries_markup(gallery, thumbsize));
    bindings
}

fn entries_markup(gallery: &Gallery<'_>, thumbsize: u32) -> Markup {
    html! {
        @for entry in &gallery.entries {
            li {
                h2 { (entry.caption) }
                a href=(entry.href) {
                    img src=(links::thumbnail_path(entry.record)) alt="" title=(entry.caption)
                        width=(thumbsize) height=(thumbsize);
                }
            }
        }
    }
}

/// Bindings of a single-image page. Absent EXIF fields bind to empty text.
pub fn single_bindings(
    record: &ImageRecord,
    prev: Option<&ImageRecord>,
    next: Option<&ImageRecord>,
) -> Bindings {
    let neighbour = |r: Option<&ImageRecord>| {
        r.map(links::page_path)
            .unwrap_or_else(|| INERT_LINK.to_string())
    };
    let image_path = record.image_path();
    let file_name = image_path.rsplit('/').next().unwrap_or(&image_path);

    let mut bindings = Bindings::new();
    bindings
        .text("title", &record.title)
        .text("heading", &record.title)
        .text("full", &format!("../{file_name}"))
        .text("preview", &links::preview_path(record))
        .text("prev", &neighbour(prev))
        .text("next", &neighbour(next))
        .text("date", &record.display_date())
        .text("datetime", &record.timestamp())
        .set("body", PreEscaped(record.body_html.clone()))
        .text("f_stop", record.f_stop.as_deref().unwrap_or(""))
        .text("exposure_time", record.exposure_time.as_deref().unwrap_or(""))
        .text("iso", record.iso.as_deref().unwrap_or(""));
    bindings
}

/// Feed of a gallery: one entry per gallery entry, in display order.
pub fn feed_binding(ctx: &RenderContext<'_>, gallery: &Gallery<'_>) -> FeedBinding {
    let base_url = ctx.config.base_url();
    let href = links::gallery_href(&gallery.base);
    FeedBinding {
        title: document_title(gallery, &ctx.config.title),
        author: ctx.config.author.clone(),
        updated: ctx.updated,
        id: links::entry_urn(&links::absolute_url(base_url, &gallery.base)),
        self_link: links::absolute_url(base_url, &format!("{href}feed/")),
        alternate_link: links::absolute_url(base_url, &href),
        entries: gallery
            .entries
            .iter()
            .map(|e| FeedEntry::from_gallery_entry(e, base_url))
            .collect(),
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), RenderError> {
    let write = || {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        publish::unlink_existing(path)?;
        std::fs::write(path, content)
    };
    write().map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })
}
