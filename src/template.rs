//! Slot templates for the gallery index and single-image documents.
//!
//! A template is plain markup with `{{ slot }}` markers. It is parsed once;
//! each [`Template::render`] call builds a fresh document from a
//! [`Bindings`] map, so nothing is shared between emitted pages.
//!
//! Sites can override the compiled-in documents by placing `_gallery.html`
//! and/or `_single.html` in the site root. Required slots are checked when the
//! templates are loaded so that a broken template fails the build before any
//! output is written.
//!
//! Binding values are [`Markup`], so plain text is escaped by
//! [maud](https://maud.lambda.xyz/) before it reaches the document while
//! rendered markdown is inserted verbatim.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const GALLERY_TEMPLATE_FILE: &str = "_gallery.html";
pub const SINGLE_TEMPLATE_FILE: &str = "_single.html";

pub const GALLERY_SLOTS: &[&str] = &["page_title", "heading", "entries"];

pub const SINGLE_SLOTS: &[&str] = &[
    "title",
    "heading",
    "full",
    "preview",
    "prev",
    "next",
    "date",
    "datetime",
    "body",
    "f_stop",
    "exposure_time",
    "iso",
];

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Template {template}: unterminated slot at byte {offset}")]
    Syntax { template: String, offset: usize },
    #[error("Template {template} is missing required slot `{slot}`")]
    MissingSlot { template: String, slot: String },
    #[error("Template {template}: no binding for slot `{slot}`")]
    MissingBinding { template: String, slot: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(String),
}

/// A parsed slot template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

/// Values for the slots of one emission.
#[derive(Debug, Default)]
pub struct Bindings {
    values: BTreeMap<&'static str, Markup>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a slot, replacing any previous value.
    pub fn set(&mut self, slot: &'static str, value: Markup) -> &mut Self {
        self.values.insert(slot, value);
        self
    }

    /// Bind a slot to plain text (escaped on insertion).
    pub fn text(&mut self, slot: &'static str, value: &str) -> &mut Self {
        self.set(slot, html! { (value) })
    }
}

impl Template {
    /// Parse template source. `name` is used in error messages.
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut consumed = 0;

        while let Some(open) = rest.find("{{") {
            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or_else(|| TemplateError::Syntax {
                template: name.to_string(),
                offset: consumed + open,
            })?;
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }
            segments.push(Segment::Slot(after_open[..close].trim().to_string()));

            let advance = open + 2 + close + 2;
            consumed += advance;
            rest = &rest[advance..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the template contains a slot with the given name.
    pub fn has_slot(&self, slot: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Slot(name) if name == slot))
    }

    /// Fail unless every slot in `required` appears in the template.
    pub fn require(&self, required: &[&str]) -> Result<(), TemplateError> {
        match required.iter().find(|slot| !self.has_slot(slot)) {
            Some(slot) => Err(TemplateError::MissingSlot {
                template: self.name.clone(),
                slot: slot.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Render a fresh document. Every slot in the template must be bound.
    pub fn render(&self, bindings: &Bindings) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(slot) => {
                    let value = bindings.values.get(slot.as_str()).ok_or_else(|| {
                        TemplateError::MissingBinding {
                            template: self.name.clone(),
                            slot: slot.clone(),
                        }
                    })?;
                    out.push_str(&value.0);
                }
            }
        }
        Ok(out)
    }
}

/// The two page templates of a site.
#[derive(Debug, Clone)]
pub struct Templates {
    pub gallery: Template,
    pub single: Template,
}

impl Templates {
    /// The compiled-in templates.
    pub fn builtin() -> Result<Self, TemplateError> {
        let templates = Self {
            gallery: Template::parse("builtin gallery", &default_gallery_source())?,
            single: Template::parse("builtin single", &default_single_source())?,
        };
        templates.validate()?;
        Ok(templates)
    }

    /// Load templates for a site: `_gallery.html` and `_single.html` in the
    /// site root override the compiled-in documents.
    pub fn load(site_root: &Path) -> Result<Self, TemplateError> {
        let gallery = match read_override(&site_root.join(GALLERY_TEMPLATE_FILE))? {
            Some(source) => Template::parse(GALLERY_TEMPLATE_FILE, &source)?,
            None => Template::parse("builtin gallery", &default_gallery_source())?,
        };
        let single = match read_override(&site_root.join(SINGLE_TEMPLATE_FILE))? {
            Some(source) => Template::parse(SINGLE_TEMPLATE_FILE, &source)?,
            None => Template::parse("builtin single", &default_single_source())?,
        };
        let templates = Self { gallery, single };
        templates.validate()?;
        Ok(templates)
    }

    fn validate(&self) -> Result<(), TemplateError> {
        self.gallery.require(GALLERY_SLOTS)?;
        self.single.require(SINGLE_SLOTS)
    }
}

fn read_override(path: &Path) -> Result<Option<String>, TemplateError> {
    if !path.is_file() {
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Slot marker emitted into the built-in documents.
fn slot(name: &str) -> PreEscaped<String> {
    PreEscaped(format!("{{{{ {name} }}}}"))
}

fn default_gallery_source() -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (slot("page_title")) }
                link rel="alternate" type="application/atom+xml" href="feed/";
            }
            body {
                h1 #title { (slot("heading")) }
                ul #gallery { (slot("entries")) }
            }
        }
    }
    .into_string()
}

fn default_single_source() -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (slot("title")) }
            }
            body {
                nav {
                    a #prev href=(slot("prev")) { "Previous" }
                    " "
                    a #next href=(slot("next")) { "Next" }
                }
                a #full href=(slot("full")) {
                    img #photo src=(slot("preview")) alt=(slot("title"));
                }
                h1 #title { (slot("heading")) }
                time datetime=(slot("datetime")) { (slot("date")) }
                div #info { (slot("body")) }
                dl #exif {
                    dt { "Aperture" }
                    dd #f-stop { (slot("f_stop")) }
                    dt { "Exposure" }
                    dd #exposure-time { (slot("exposure_time")) }
                    dt { "ISO" }
                    dd #iso { (slot("iso")) }
                }
            }
        }
    }
    .into_string()
}
