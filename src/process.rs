//! Thumbnail and preview derivation.
//!
//! The final stage of a build. While galleries are rendered, every record
//! whose derived images are missing or older than the source photo is queued
//! as a [`DerivationTask`]. The queue is then drained by a dedicated pool of
//! worker threads.
//!
//! ## Output Structure
//!
//! ```text
//! _site/
//! └── rome/
//!     └── colosseum/
//!         ├── index.html     # single-image page
//!         ├── thumb.jpg      # thumbsize × thumbsize, center-cropped
//!         └── preview.jpg    # fits inside previewsize × previewsize
//! ```
//!
//! ## Staleness
//!
//! A task is stale when either target is missing or the source's modification
//! time is strictly newer than the target's. A missing source is also stale so
//! the failure surfaces as a per-task error instead of a silent skip.
//!
//! ## Parallel Processing
//!
//! Tasks are independent (one source in, two files out) and run on a local
//! [rayon](https://docs.rs/rayon) pool sized from `[processing] max_processes`.
//! A failing task never stops its siblings; failures are collected into the
//! [`ProcessReport`] once the pool is done.

use crate::imaging::{BackendError, DeriveConfig, ImageBackend, derive_images};
use crate::links;
use crate::record::ImageRecord;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// One source photo and the two files derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationTask {
    pub source: PathBuf,
    pub thumbnail: PathBuf,
    pub preview: PathBuf,
}

impl DerivationTask {
    /// Task for a record: the paired photo in the site tree, targets in the
    /// record's page directory of the output tree.
    pub fn for_record(record: &ImageRecord, site_root: &Path, output_dir: &Path) -> Self {
        Self {
            source: site_root.join(record.image_path()),
            thumbnail: output_dir.join(links::thumbnail_path(record).trim_start_matches('/')),
            preview: output_dir.join(links::preview_path(record).trim_start_matches('/')),
        }
    }
}

/// Tasks queued during rendering, at most one per source photo.
#[derive(Debug, Default)]
pub struct DerivationQueue {
    tasks: Vec<DerivationTask>,
    seen: HashSet<PathBuf>,
}

impl DerivationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task unless one for the same source is already queued.
    /// Returns whether the task was added.
    pub fn push(&mut self, task: DerivationTask) -> bool {
        if !self.seen.insert(task.source.clone()) {
            return false;
        }
        self.tasks.push(task);
        true
    }

    /// Queue a task only when its targets are out of date.
    pub fn enqueue_if_stale(&mut self, task: DerivationTask) -> bool {
        if self.seen.contains(&task.source) || !needs_derivation(&task) {
            return false;
        }
        self.push(task)
    }

    pub fn tasks(&self) -> &[DerivationTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Whether `target` must be regenerated from `source`.
pub fn is_stale(source: &Path, target: &Path) -> bool {
    match (modified(source), modified(target)) {
        (Some(src), Some(tgt)) => src > tgt,
        _ => true,
    }
}

/// Whether either derived image of a task is out of date.
pub fn needs_derivation(task: &DerivationTask) -> bool {
    is_stale(&task.source, &task.thumbnail) || is_stale(&task.source, &task.preview)
}

/// Progress events sent from the worker threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Derived { source: PathBuf },
    Failed { source: PathBuf, error: String },
}

/// A task that could not be completed.
#[derive(Debug)]
pub struct DerivationFailure {
    pub source: PathBuf,
    pub error: BackendError,
}

/// Outcome of draining the queue.
#[derive(Debug, Default)]
pub struct ProcessReport {
    pub derived: usize,
    /// Failed tasks, in queue order.
    pub failures: Vec<DerivationFailure>,
}

impl ProcessReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run every task exactly once on a pool of `threads` workers.
///
/// Per-task errors are reported, never propagated; only failing to start the
/// pool is an error.
pub fn derive_all<B: ImageBackend>(
    backend: &B,
    tasks: &[DerivationTask],
    config: &DeriveConfig,
    threads: usize,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessReport, ProcessError> {
    if tasks.is_empty() {
        return Ok(ProcessReport::default());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;

    let results: Vec<Result<(), BackendError>> = pool.install(|| {
        tasks
            .par_iter()
            .map(|task| {
                let result = derive_task(backend, task, config);
                if let Some(tx) = &events {
                    let event = match &result {
                        Ok(()) => ProcessEvent::Derived {
                            source: task.source.clone(),
                        },
                        Err(e) => ProcessEvent::Failed {
                            source: task.source.clone(),
                            error: e.to_string(),
                        },
                    };
                    // A closed receiver only means nobody is listening.
                    tx.send(event).ok();
                }
                result
            })
            .collect()
    });

    let mut report = ProcessReport::default();
    for (task, result) in tasks.iter().zip(results) {
        match result {
            Ok(()) => report.derived += 1,
            Err(error) => report.failures.push(DerivationFailure {
                source: task.source.clone(),
                error,
            }),
        }
    }
    Ok(report)
}

fn derive_task<B: ImageBackend>(
    backend: &B,
    task: &DerivationTask,
    config: &DeriveConfig,
) -> Result<(), BackendError> {
    for target in [&task.thumbnail, &task.preview] {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    derive_images(backend, &task.source, &task.thumbnail, &task.preview, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::record;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config() -> DeriveConfig {
        DeriveConfig {
            thumbsize: 16,
            previewsize: 32,
            quality: Quality::default(),
        }
    }

    fn task_in(dir: &Path, name: &str) -> DerivationTask {
        DerivationTask {
            source: dir.join(format!("{name}.jpg")),
            thumbnail: dir.join("out").join(name).join("thumb.jpg"),
            preview: dir.join("out").join(name).join("preview.jpg"),
        }
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    // =========================================================================
    // Task construction
    // =========================================================================

    #[test]
    fn task_for_record_pairs_paths() {
        let r = record("rome/colosseum.md", "Colosseum", "2020-01-01");
        let task = DerivationTask::for_record(&r, Path::new("/site"), Path::new("/site/_site"));
        assert_eq!(task.source, PathBuf::from("/site/rome/colosseum.jpg"));
        assert_eq!(
            task.thumbnail,
            PathBuf::from("/site/_site/rome/colosseum/thumb.jpg")
        );
        assert_eq!(
            task.preview,
            PathBuf::from("/site/_site/rome/colosseum/preview.jpg")
        );
    }

    // =========================================================================
    // Staleness
    // =========================================================================

    #[test]
    fn missing_targets_are_stale() {
        let tmp = TempDir::new().unwrap();
        let task = task_in(tmp.path(), "a");
        fs::write(&task.source, b"x").unwrap();
        assert!(needs_derivation(&task));
    }

    #[test]
    fn missing_source_is_stale() {
        let tmp = TempDir::new().unwrap();
        let task = task_in(tmp.path(), "a");
        assert!(needs_derivation(&task));
    }

    #[test]
    fn fresh_targets_are_not_stale() {
        let tmp = TempDir::new().unwrap();
        let task = task_in(tmp.path(), "a");
        fs::create_dir_all(task.thumbnail.parent().unwrap()).unwrap();
        fs::write(&task.source, b"x").unwrap();
        fs::write(&task.thumbnail, b"t").unwrap();
        fs::write(&task.preview, b"p").unwrap();

        let base = SystemTime::now() - Duration::from_secs(3600);
        set_mtime(&task.source, base);
        set_mtime(&task.thumbnail, base);
        set_mtime(&task.preview, base + Duration::from_secs(10));
        assert!(!needs_derivation(&task));
    }

    #[test]
    fn newer_source_than_one_target_is_stale() {
        let tmp = TempDir::new().unwrap();
        let task = task_in(tmp.path(), "a");
        fs::create_dir_all(task.thumbnail.parent().unwrap()).unwrap();
        fs::write(&task.source, b"x").unwrap();
        fs::write(&task.thumbnail, b"t").unwrap();
        fs::write(&task.preview, b"p").unwrap();

        let base = SystemTime::now() - Duration::from_secs(3600);
        set_mtime(&task.thumbnail, base + Duration::from_secs(60));
        set_mtime(&task.preview, base);
        set_mtime(&task.source, base + Duration::from_secs(30));
        assert!(needs_derivation(&task));
    }

    // =========================================================================
    // Queue
    // =========================================================================

    #[test]
    fn queue_dedupes_by_source() {
        let tmp = TempDir::new().unwrap();
        let mut queue = DerivationQueue::new();
        assert!(queue.push(task_in(tmp.path(), "a")));
        assert!(!queue.push(task_in(tmp.path(), "a")));
        assert!(queue.push(task_in(tmp.path(), "b")));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn enqueue_if_stale_skips_fresh_and_duplicates() {
        let tmp = TempDir::new().unwrap();
        let fresh = task_in(tmp.path(), "fresh");
        fs::create_dir_all(fresh.thumbnail.parent().unwrap()).unwrap();
        fs::write(&fresh.source, b"x").unwrap();
        fs::write(&fresh.thumbnail, b"t").unwrap();
        fs::write(&fresh.preview, b"p").unwrap();
        set_mtime(&fresh.source, SystemTime::now() - Duration::from_secs(3600));

        let mut queue = DerivationQueue::new();
        assert!(!queue.enqueue_if_stale(fresh));
        assert!(queue.enqueue_if_stale(task_in(tmp.path(), "new")));
        assert!(!queue.enqueue_if_stale(task_in(tmp.path(), "new")));
        assert_eq!(queue.len(), 1);
        assert!(!queue.is_empty());
    }

    // =========================================================================
    // Draining
    // =========================================================================

    #[test]
    fn derive_all_runs_each_task_once() {
        let tmp = TempDir::new().unwrap();
        let tasks: Vec<DerivationTask> = ["a", "b", "c"]
            .iter()
            .map(|n| task_in(tmp.path(), n))
            .collect();
        let backend = MockBackend::new();

        let report = derive_all(&backend, &tasks, &config(), 2, None).unwrap();
        assert_eq!(report.derived, 3);
        assert!(report.is_clean());

        let ops = backend.get_operations();
        let thumbs = ops
            .iter()
            .filter(|op| matches!(op, RecordedOp::Thumbnail { .. }))
            .count();
        let previews = ops
            .iter()
            .filter(|op| matches!(op, RecordedOp::Preview { .. }))
            .count();
        assert_eq!((thumbs, previews), (3, 3));
        assert!(tmp.path().join("out/a").is_dir());
    }

    #[test]
    fn failing_task_does_not_stop_siblings() {
        let tmp = TempDir::new().unwrap();
        let tasks: Vec<DerivationTask> = ["a", "bad", "c"]
            .iter()
            .map(|n| task_in(tmp.path(), n))
            .collect();
        let backend = MockBackend::new().failing_on(tmp.path().join("bad.jpg"));

        let report = derive_all(&backend, &tasks, &config(), 4, None).unwrap();
        assert_eq!(report.derived, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source, tmp.path().join("bad.jpg"));
    }

    #[test]
    fn derive_all_sends_events() {
        let tmp = TempDir::new().unwrap();
        let tasks = vec![task_in(tmp.path(), "a"), task_in(tmp.path(), "bad")];
        let backend = MockBackend::new().failing_on(tmp.path().join("bad.jpg"));

        let (tx, rx) = std::sync::mpsc::channel();
        derive_all(&backend, &tasks, &config(), 1, Some(tx)).unwrap();
        let events: Vec<ProcessEvent> = rx.iter().collect();

        assert_eq!(events.len(), 2);
        assert!(events.contains(&ProcessEvent::Derived {
            source: tmp.path().join("a.jpg")
        }));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ProcessEvent::Failed { source, .. } if source.ends_with("bad.jpg")))
        );
    }

    #[test]
    fn derive_all_empty_is_noop() {
        let backend = MockBackend::new();
        let report = derive_all(&backend, &[], &config(), 4, None).unwrap();
        assert_eq!(report.derived, 0);
        assert!(backend.get_operations().is_empty());
    }
}
