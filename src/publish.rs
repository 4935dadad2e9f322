//! Passthrough copy into the output tree.
//!
//! Files are published with replace-on-write semantics: any existing target
//! is removed first, then the source is hard-linked into place. Linking fails
//! across filesystems, in which case the bytes are copied instead.
//!
//! Because passthrough targets share an inode with their source, every
//! generated file must go through [`unlink_existing`] before it is written.
//! Truncating a linked target in place would rewrite the source file.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to publish {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Remove `path` if it exists, so the next write creates a fresh inode.
pub fn unlink_existing(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Replace `target` with the contents of `source`.
pub fn replace_file(source: &Path, target: &Path) -> Result<(), PublishError> {
    let io_err = |source: std::io::Error| PublishError::Io {
        path: target.to_path_buf(),
        source,
    };

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    unlink_existing(target).map_err(io_err)?;
    if fs::hard_link(source, target).is_err() {
        fs::copy(source, target).map_err(io_err)?;
    }
    Ok(())
}

/// Publish every relative path from `site_root` to the same path under
/// `output_dir`. Returns the number of files published.
pub fn publish_all(
    site_root: &Path,
    output_dir: &Path,
    files: &[String],
) -> Result<usize, PublishError> {
    for relative in files {
        replace_file(&site_root.join(relative), &output_dir.join(relative))?;
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn replace_file_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.txt");
        fs::write(&source, "hello").unwrap();

        let target = tmp.path().join("out/deep/a.txt");
        replace_file(&source, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
    }

    #[test]
    fn replace_file_overwrites_existing_target() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.txt");
        fs::write(&source, "new").unwrap();
        let target = tmp.path().join("b.txt");
        fs::write(&target, "old").unwrap();

        replace_file(&source, &target).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn replace_file_does_not_write_through_old_link() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("first.txt");
        fs::write(&first, "first").unwrap();
        let target = tmp.path().join("out.txt");
        replace_file(&first, &target).unwrap();

        let second = tmp.path().join("second.txt");
        fs::write(&second, "second").unwrap();
        replace_file(&second, &target).unwrap();

        assert_eq!(fs::read_to_string(&first).unwrap(), "first");
        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
    }

    #[test]
    fn unlink_existing_breaks_link_to_source() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("index.html");
        fs::write(&source, "mine").unwrap();
        let target = tmp.path().join("out/index.html");
        replace_file(&source, &target).unwrap();

        unlink_existing(&target).unwrap();
        fs::write(&target, "generated").unwrap();
        assert_eq!(fs::read_to_string(&source).unwrap(), "mine");
        assert_eq!(fs::read_to_string(&target).unwrap(), "generated");
    }

    #[test]
    fn unlink_existing_missing_is_ok() {
        let tmp = TempDir::new().unwrap();
        assert!(unlink_existing(&tmp.path().join("nope")).is_ok());
    }

    #[test]
    fn replace_file_missing_source_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = replace_file(&tmp.path().join("nope"), &tmp.path().join("out"));
        assert!(matches!(result, Err(PublishError::Io { .. })));
    }

    #[test]
    fn publish_all_mirrors_relative_paths() {
        let tmp = TempDir::new().unwrap();
        let site = tmp.path().join("site");
        fs::create_dir_all(site.join("rome")).unwrap();
        fs::write(site.join("rome/a.jpg"), "jpg").unwrap();
        fs::write(site.join("style.css"), "css").unwrap();
        let out = tmp.path().join("out");

        let count = publish_all(
            &site,
            &out,
            &["rome/a.jpg".to_string(), "style.css".to_string()],
        )
        .unwrap();
        assert_eq!(count, 2);
        assert!(out.join("rome/a.jpg").is_file());
        assert!(out.join("style.css").is_file());
    }
}
