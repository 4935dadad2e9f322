//! # Photofolio
//!
//! A batch static site generator for photo galleries. Every photo is paired
//! with a markdown description file carrying a YAML header; the directory tree
//! becomes galleries, each with an index page and an Atom feed.
//!
//! # Architecture: One-Shot Pipeline
//!
//! Every run is a full rebuild of the HTML and feed documents. Only the image
//! derivation step is skipped for photos whose thumbnail and preview are
//! already newer than the source.
//!
//! ```text
//! 1. Load       _config.toml, templates, description files   (all-or-nothing)
//! 2. Publish    passthrough files → output tree
//! 3. Index      records → root, directory and listing galleries
//! 4. Render     index + feed per gallery, single pages for the root gallery
//! 5. Derive     stale thumbnails/previews on a worker pool
//! ```
//!
//! Steps 1-4 run sequentially on one thread. Step 5 runs queued tasks in
//! parallel; a failing image is reported without failing the build.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `_config.toml` and per-directory `_gallery.toml` loading and validation |
//! | [`record`] | Description file parsing: YAML header, markdown body, dates |
//! | [`scan`] | Site tree discovery and bulk record loading |
//! | [`gallery`] | Root, directory and album-listing gallery construction |
//! | [`links`] | Page paths, absolute URLs, content-addressed entry ids |
//! | [`template`] | `{{ slot }}` templates for gallery and single-image documents |
//! | [`feed`] | Atom feed assembly |
//! | [`render`] | Per-gallery document emission and derivation queuing |
//! | [`imaging`] | Pure-Rust crop/resize operations behind a backend trait |
//! | [`process`] | Staleness checks, derivation queue, parallel worker pool |
//! | [`publish`] | Replace-on-write passthrough copy |
//! | [`site`] | The end-to-end build |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Templates Parsed Once, Rendered Fresh
//!
//! Templates are parsed into segments a single time. Every page is rendered
//! into its own `String` from its own bindings, so no document state leaks
//! from one page to the next. Binding values are [maud](https://maud.lambda.xyz/)
//! markup: plain text is escaped, rendered markdown is inserted as-is.
//!
//! ## Stable Feed Identity
//!
//! Feed and entry ids are version-3 UUIDs of the absolute URL. Rebuilding the
//! site, even from scratch, never changes an entry's id as long as its URL
//! stays the same.

pub mod config;
pub mod feed;
pub mod gallery;
pub mod imaging;
pub mod links;
pub mod output;
pub mod process;
pub mod publish;
pub mod record;
pub mod render;
pub mod scan;
pub mod site;
pub mod template;

#[cfg(test)]
pub(crate) mod test_helpers;
