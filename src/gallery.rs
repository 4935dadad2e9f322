//! Gallery index construction.
//!
//! Loaded records are partitioned into three kinds of galleries:
//!
//! - **Root**: every record in the site, newest first. The only gallery that
//!   gets single-image pages.
//! - **Directory**: one per directory below the site root that holds at least
//!   one description file, newest first.
//! - **Listing**: the album listing at `/albums/`, one entry per directory
//!   gallery pointing at the gallery index and showing its cover.
//!
//! Sorting is stable, so records sharing a date keep their discovery order.

use crate::config::GalleryConfig;
use crate::links;
use crate::record::ImageRecord;
use std::collections::{BTreeMap, HashMap};

/// Which of the three gallery shapes a [`Gallery`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKind {
    Root,
    Directory,
    Listing,
}

/// One item in a gallery index or feed.
#[derive(Debug, Clone)]
pub struct GalleryEntry<'a> {
    /// The record providing the thumbnail, date and content.
    pub record: &'a ImageRecord,
    /// Caption shown under the thumbnail and used as the feed entry title.
    pub caption: String,
    /// Link target of the entry.
    pub href: String,
}

impl<'a> GalleryEntry<'a> {
    fn for_record(record: &'a ImageRecord) -> Self {
        Self {
            record,
            caption: record.title.clone(),
            href: links::page_path(record),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gallery<'a> {
    pub kind: GalleryKind,
    /// `/` for root, `/<dir>` for directories, `/albums/` for the listing.
    pub base: String,
    pub title: String,
    /// Representative record of a directory gallery.
    pub cover: Option<&'a ImageRecord>,
    pub entries: Vec<GalleryEntry<'a>>,
}

impl<'a> Gallery<'a> {
    pub fn is_root(&self) -> bool {
        self.kind == GalleryKind::Root
    }

    /// Member records in display order.
    pub fn records(&self) -> impl Iterator<Item = &'a ImageRecord> + '_ {
        self.entries.iter().map(|e| e.record)
    }
}

/// The complete set of galleries of one generation run.
#[derive(Debug)]
pub struct GallerySet<'a> {
    pub root: Gallery<'a>,
    /// Directory galleries ordered by base path.
    pub directories: Vec<Gallery<'a>>,
    pub listing: Gallery<'a>,
}

impl<'a> GallerySet<'a> {
    /// All galleries in rendering order: listing, root, then directories.
    pub fn iter(&self) -> impl Iterator<Item = &Gallery<'a>> {
        std::iter::once(&self.listing)
            .chain(std::iter::once(&self.root))
            .chain(self.directories.iter())
    }

    /// Number of galleries, root and listing included.
    pub fn count(&self) -> usize {
        self.directories.len() + 2
    }
}

/// Title of the album listing gallery.
pub const LISTING_TITLE: &str = "List of Albums";

/// Sort records newest first. Equal dates keep their input order.
pub fn sort_newest_first(records: &mut [&ImageRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Build all galleries from the loaded records.
///
/// `records` must be in discovery order. `configs` maps a directory (relative
/// to the site root) to its optional `_gallery.toml` overrides.
pub fn build_galleries<'a>(
    records: &'a [ImageRecord],
    site_title: &str,
    configs: &HashMap<String, GalleryConfig>,
) -> GallerySet<'a> {
    let mut sorted: Vec<&ImageRecord> = records.iter().collect();
    sort_newest_first(&mut sorted);

    let mut by_directory: BTreeMap<&str, Vec<&ImageRecord>> = BTreeMap::new();
    for record in sorted.iter().copied() {
        let dir = record.directory();
        if !dir.is_empty() {
            by_directory.entry(dir).or_default().push(record);
        }
    }

    let root = Gallery {
        kind: GalleryKind::Root,
        base: links::gallery_base(""),
        title: site_title.to_string(),
        cover: None,
        entries: sorted.iter().copied().map(GalleryEntry::for_record).collect(),
    };

    let directories: Vec<Gallery> = by_directory
        .into_iter()
        .map(|(dir, members)| directory_gallery(dir, members, configs.get(dir)))
        .collect();

    let listing = Gallery {
        kind: GalleryKind::Listing,
        base: links::LISTING_BASE.to_string(),
        title: LISTING_TITLE.to_string(),
        cover: None,
        entries: directories
            .iter()
            .filter_map(|g| {
                g.cover.map(|record| GalleryEntry {
                    record,
                    caption: g.title.clone(),
                    href: links::gallery_href(&g.base),
                })
            })
            .collect(),
    };

    GallerySet {
        root,
        directories,
        listing,
    }
}

fn directory_gallery<'a>(
    dir: &str,
    members: Vec<&'a ImageRecord>,
    config: Option<&GalleryConfig>,
) -> Gallery<'a> {
    let title = config
        .and_then(|c| c.title.clone())
        .unwrap_or_else(|| dir.to_string());
    let cover = select_cover(&members, config.and_then(|c| c.image.as_deref()));

    Gallery {
        kind: GalleryKind::Directory,
        base: links::gallery_base(dir),
        title,
        cover,
        entries: members
            .into_iter()
            .map(GalleryEntry::for_record)
            .collect(),
    }
}

/// Pick a gallery's representative record.
///
/// Defaults to the last (oldest) member. A configured cover title selects the
/// last member carrying that title instead; an unmatched title keeps the
/// default.
pub fn select_cover<'a>(
    members: &[&'a ImageRecord],
    cover_title: Option<&str>,
) -> Option<&'a ImageRecord> {
    let configured =
        cover_title.and_then(|title| members.iter().rev().find(|r| r.title == title));
    configured.or_else(|| members.last()).copied()
}
