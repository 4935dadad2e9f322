//! Atom feed documents.
//!
//! Each gallery gets a feed at `{base}/feed/index.xml`. The feed is described
//! by a [`FeedBinding`] and assembled into an [`atom_syndication::Feed`], so
//! every emission builds a fresh document.

use crate::gallery::GalleryEntry;
use crate::links;
use crate::publish;
use atom_syndication::{Content, Entry, Feed, FixedDateTime, Link, Person};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to write feed {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to serialize feed {path}: {source}")]
    Atom {
        path: PathBuf,
        source: atom_syndication::Error,
    },
}

/// One `<entry>` of a feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    /// `urn:uuid:` identifier derived from `link`.
    pub id: String,
    /// Absolute URL of the entry's page.
    pub link: String,
    pub updated: DateTime<Utc>,
    /// Rendered HTML content.
    pub content_html: String,
}

impl FeedEntry {
    /// Entry for a gallery item, with its link made absolute against `base_url`.
    pub fn from_gallery_entry(entry: &GalleryEntry<'_>, base_url: &str) -> Self {
        let link = links::absolute_url(base_url, &entry.href);
        Self {
            title: entry.caption.clone(),
            id: links::entry_urn(&link),
            updated: entry.record.date.and_utc(),
            content_html: entry.record.body_html.clone(),
            link,
        }
    }
}

/// Feed-level values plus entries.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedBinding {
    pub title: String,
    pub author: String,
    pub updated: DateTime<Utc>,
    pub id: String,
    /// Absolute URL of the feed itself.
    pub self_link: String,
    /// Absolute URL of the gallery index the feed describes.
    pub alternate_link: String,
    pub entries: Vec<FeedEntry>,
}

impl FeedBinding {
    /// Assemble the Atom document.
    pub fn to_feed(&self) -> Feed {
        let mut feed = Feed::default();
        feed.set_title(self.title.as_str());
        feed.set_id(self.id.as_str());
        feed.set_updated(utc(self.updated));
        feed.set_authors(vec![person(&self.author)]);
        feed.set_links(vec![
            link(&self.self_link, "self", "application/atom+xml"),
            link(&self.alternate_link, "alternate", "text/html"),
        ]);
        feed.set_entries(
            self.entries
                .iter()
                .map(|e| e.to_entry(&self.author))
                .collect::<Vec<_>>(),
        );
        feed
    }

    /// Serialize the document. Every timestamp is UTC and written with a
    /// `Z` suffix.
    pub fn to_xml(&self) -> Result<String, atom_syndication::Error> {
        let bytes = self.to_feed().write_to(Vec::new())?;
        Ok(zulu(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Serialize to `path`, replacing any existing file.
    pub fn write_to_path(&self, path: &Path) -> Result<(), FeedError> {
        let io_err = |source: std::io::Error| FeedError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let xml = self.to_xml().map_err(|source| FeedError::Atom {
            path: path.to_path_buf(),
            source,
        })?;
        publish::unlink_existing(path).map_err(io_err)?;
        std::fs::write(path, xml).map_err(io_err)
    }
}

impl FeedEntry {
    fn to_entry(&self, author: &str) -> Entry {
        let mut content = Content::default();
        content.set_value(self.content_html.clone());
        content.set_content_type("html".to_string());

        let mut entry = Entry::default();
        entry.set_title(self.title.as_str());
        entry.set_id(self.id.as_str());
        entry.set_updated(utc(self.updated));
        entry.set_authors(vec![person(author)]);
        entry.set_links(vec![link(&self.link, "alternate", "text/html")]);
        entry.set_content(content);
        entry
    }
}

fn utc(time: DateTime<Utc>) -> FixedDateTime {
    time.fixed_offset()
}

/// Atom dates are serialized with a numeric `+00:00` offset; rewrite them to
/// the `Z` form. Markup inside `<content>` is escaped, so only real
/// `<updated>` elements can match.
fn zulu(xml: String) -> String {
    xml.replace("+00:00</updated>", "Z</updated>")
}

fn person(name: &str) -> Person {
    let mut person = Person::default();
    person.set_name(name);
    person
}

fn link(href: &str, rel: &str, mime_type: &str) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel(rel);
    link.set_mime_type(mime_type.to_string());
    link
}
