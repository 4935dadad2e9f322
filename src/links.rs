//! Canonical paths, absolute URLs and stable entry identifiers.
//!
//! Every record is published at `/<source path without extension>/`, with its
//! derived images beside the page. Feed entry ids are version-3 UUIDs in the
//! URL namespace, seeded by the entry's absolute URL, so an entry keeps its
//! identity across rebuilds as long as the base URL and path are unchanged.

use crate::record::ImageRecord;
use uuid::Uuid;

/// Base path of the album listing gallery.
pub const LISTING_BASE: &str = "/albums/";

/// Canonical page path for a record (`rome/colosseum.md` → `/rome/colosseum/`).
pub fn page_path(record: &ImageRecord) -> String {
    format!("/{}/", record.stem())
}

/// URL path of a record's square thumbnail.
pub fn thumbnail_path(record: &ImageRecord) -> String {
    format!("{}thumb.jpg", page_path(record))
}

/// URL path of a record's preview image.
pub fn preview_path(record: &ImageRecord) -> String {
    format!("{}preview.jpg", page_path(record))
}

/// Base path of the gallery for a directory (`""` → `/`, `rome` → `/rome`).
pub fn gallery_base(directory: &str) -> String {
    format!("/{directory}")
}

/// Link target of a gallery index (`/` → `/`, `/rome` → `/rome/`).
pub fn gallery_href(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

/// Absolute URL of a site path.
pub fn absolute_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Content-addressed identifier for a URL.
pub fn entry_id(url: &str) -> Uuid {
    Uuid::new_v3(&Uuid::NAMESPACE_URL, url.as_bytes())
}

/// Identifier formatted for an Atom `<id>` element (`urn:uuid:...`).
pub fn entry_urn(url: &str) -> String {
    entry_id(url).urn().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_record;

    fn record(path: &str) -> ImageRecord {
        parse_record(path, "---\ntitle: T\ndate: 2020-01-01\n---\n").unwrap()
    }

    #[test]
    fn page_path_strips_extension() {
        assert_eq!(page_path(&record("rome/colosseum.md")), "/rome/colosseum/");
        assert_eq!(page_path(&record("colosseum.md")), "/colosseum/");
    }

    #[test]
    fn derived_image_paths_sit_beside_page() {
        let r = record("rome/colosseum.md");
        assert_eq!(thumbnail_path(&r), "/rome/colosseum/thumb.jpg");
        assert_eq!(preview_path(&r), "/rome/colosseum/preview.jpg");
    }

    #[test]
    fn gallery_bases_and_hrefs() {
        assert_eq!(gallery_base(""), "/");
        assert_eq!(gallery_base("rome"), "/rome");
        assert_eq!(gallery_href("/"), "/");
        assert_eq!(gallery_href("/rome"), "/rome/");
        assert_eq!(gallery_href(LISTING_BASE), "/albums/");
    }

    #[test]
    fn absolute_url_joins_without_double_slash() {
        assert_eq!(
            absolute_url("https://example.com/", "/rome/"),
            "https://example.com/rome/"
        );
        assert_eq!(
            absolute_url("https://example.com", "/rome/"),
            "https://example.com/rome/"
        );
    }

    #[test]
    fn entry_id_is_stable() {
        let url = "https://example.com/rome/colosseum/";
        assert_eq!(entry_id(url), entry_id(url));
        assert_eq!(entry_id(url).get_version_num(), 3);
    }

    #[test]
    fn entry_id_changes_with_path() {
        assert_ne!(
            entry_id("https://example.com/rome/colosseum/"),
            entry_id("https://example.com/rome/forum/")
        );
    }

    #[test]
    fn entry_id_changes_with_base_url() {
        assert_ne!(
            entry_id("https://example.com/rome/"),
            entry_id("https://example.org/rome/")
        );
    }

    #[test]
    fn entry_urn_format() {
        let urn = entry_urn("https://example.com/");
        assert!(urn.starts_with("urn:uuid:"));
        assert_eq!(urn.len(), "urn:uuid:".len() + 36);
        assert_eq!(urn, format!("urn:uuid:{}", entry_id("https://example.com/")));
    }
}
