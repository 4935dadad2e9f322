//! Image description records.
//!
//! Every photo is described by a markdown file sitting next to it: a YAML
//! header fenced by `---` lines, followed by a free-form markdown body.
//!
//! ```text
//! ---
//! title: Colosseum at Dusk
//! date: 2019-04-12 19:42:00
//! f-stop: f/8
//! exposure-time: 1/125
//! iso: 200
//! ---
//! Shot from the *Oppian Hill* just after the lights came on.
//! ```
//!
//! `title` and `date` are required. `f-stop`, `exposure-time` and `iso` are
//! optional display strings; any other key is kept in [`ImageRecord::extra`]
//! without interpretation.
//!
//! ## Header fencing
//!
//! The first line must be the `---` marker. The header ends at the first later
//! line that is exactly `---` (trailing whitespace ignored), so a bare `---`
//! line can never appear inside the header itself. Everything after the
//! closing marker is the body, including any further `---` lines.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pulldown_cmark::{Parser, html as md_html};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MARKER: &str = "---";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed metadata in {path}: {reason}")]
    Malformed { path: String, reason: String },
}

impl MetadataError {
    fn malformed(path: &str, reason: impl Into<String>) -> Self {
        MetadataError::Malformed {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// One photo's complete description, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    /// Description file path relative to the site root, `/`-separated.
    /// Unique per record.
    pub source_path: String,
    pub title: String,
    /// Capture date, interpreted as UTC.
    pub date: NaiveDateTime,
    pub f_stop: Option<String>,
    pub exposure_time: Option<String>,
    pub iso: Option<String>,
    /// Body rendered to HTML.
    pub body_html: String,
    /// Header keys not interpreted by the generator.
    pub extra: BTreeMap<String, Value>,
}

impl ImageRecord {
    /// Directory containing the description file, relative to the site root.
    /// Empty for records in the site root itself.
    pub fn directory(&self) -> &str {
        match self.source_path.rfind('/') {
            Some(idx) => &self.source_path[..idx],
            None => "",
        }
    }

    /// Path stem of the description file (`travel/rome.md` → `travel/rome`).
    pub fn stem(&self) -> &str {
        let file_start = self.source_path.rfind('/').map(|i| i + 1).unwrap_or(0);
        match self.source_path[file_start..].rfind('.') {
            Some(dot) if dot > 0 => &self.source_path[..file_start + dot],
            _ => &self.source_path,
        }
    }

    /// The paired source photo, relative to the site root.
    pub fn image_path(&self) -> String {
        format!("{}.jpg", self.stem())
    }

    /// Human-readable capture date, e.g. `April 12, 2019`.
    pub fn display_date(&self) -> String {
        self.date.format("%B %d, %Y").to_string()
    }

    /// Machine-readable UTC timestamp, e.g. `2019-04-12T19:42:00Z`.
    pub fn timestamp(&self) -> String {
        self.date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

/// Load a description file. `relative` is the path relative to `site_root`
/// and becomes the record's identity.
pub fn load_record(site_root: &Path, relative: &str) -> Result<ImageRecord, MetadataError> {
    let path = site_root.join(relative);
    let content = std::fs::read_to_string(&path).map_err(|source| MetadataError::Io {
        path: path.clone(),
        source,
    })?;
    parse_record(relative, &content)
}

/// Parse the contents of a description file.
pub fn parse_record(source_path: &str, content: &str) -> Result<ImageRecord, MetadataError> {
    let (header, body) = split_front_matter(content)
        .ok_or_else(|| MetadataError::malformed(source_path, "missing or unterminated header"))?;

    let value: Value = serde_yaml::from_str(header)
        .map_err(|e| MetadataError::malformed(source_path, e.to_string()))?;
    let mut mapping = match value {
        Value::Mapping(m) => m,
        _ => return Err(MetadataError::malformed(source_path, "header is not a mapping")),
    };

    let title = take_scalar(&mut mapping, "title")
        .ok_or_else(|| MetadataError::malformed(source_path, "missing `title`"))?;
    let raw_date = take_scalar(&mut mapping, "date")
        .ok_or_else(|| MetadataError::malformed(source_path, "missing `date`"))?;
    let date = parse_date(&raw_date).ok_or_else(|| {
        MetadataError::malformed(source_path, format!("unrecognized date `{raw_date}`"))
    })?;

    let f_stop = take_scalar(&mut mapping, "f-stop");
    let exposure_time = take_scalar(&mut mapping, "exposure-time");
    let iso = take_scalar(&mut mapping, "iso");

    let extra = mapping
        .into_iter()
        .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v)))
        .collect();

    Ok(ImageRecord {
        source_path: source_path.to_string(),
        title,
        date,
        f_stop,
        exposure_time,
        iso,
        body_html: render_markdown(body),
        extra,
    })
}

/// Split a description into `(header, body)`.
///
/// Returns `None` when the opening marker is missing or no closing marker
/// follows it.
pub fn split_front_matter(content: &str) -> Option<(&str, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != MARKER {
        return None;
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == MARKER {
            let body_start = offset + line.len();
            return Some((&content[header_start..offset], &content[body_start..]));
        }
        offset += line.len();
    }
    None
}

/// Render markdown to an HTML fragment.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

/// Remove a key and return it as display text. Null and empty values count as
/// absent.
fn take_scalar(mapping: &mut Mapping, key: &str) -> Option<String> {
    let text = match mapping.remove(key)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse the accepted `date` forms. Offsets are normalized to UTC.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
