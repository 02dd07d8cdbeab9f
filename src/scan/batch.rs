use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::media::metadata::MetadataExtractor;
use crate::media::probe::MediaProbe;
use crate::scan::flatten::flatten_directory;
use crate::FileRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// A root could not be enumerated.
    Directory,
    /// A file could not be parsed.
    File,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Directory => write!(f, "directory"),
            FailureStage::File => write!(f, "file"),
        }
    }
}

/// A unit of work that produced no record.
#[derive(Debug, Clone)]
pub struct Failure {
    pub path: PathBuf,
    pub stage: FailureStage,
    pub reason: String,
}

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Extracted records, in extraction order.
    pub records: Vec<FileRecord>,
    pub failures: Vec<Failure>,
    /// Files skipped because they were already seen from another root.
    pub duplicates_skipped: usize,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures_at(&self, stage: FailureStage) -> impl Iterator<Item = &Failure> {
        self.failures.iter().filter(move |f| f.stage == stage)
    }
}

pub struct BatchProcessor<P> {
    extractor: MetadataExtractor<P>,
    follow_links: bool,
    dedupe: bool,
}

impl<P: MediaProbe> BatchProcessor<P> {
    pub fn new(extractor: MetadataExtractor<P>) -> Self {
        Self {
            extractor,
            follow_links: false,
            dedupe: false,
        }
    }

    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    /// Skip files already extracted from an earlier root in the same run.
    pub fn dedupe(mut self, yes: bool) -> Self {
        self.dedupe = yes;
        self
    }

    pub fn process_directories(&self, dirs: &[impl AsRef<Path>]) -> BatchReport {
        let mut report = BatchReport::default();
        let mut seen = HashSet::new();

        for dir in dirs {
            let dir = dir.as_ref();
            info!("Processing directory: {}", dir.display());

            let files = match flatten_directory(dir, self.follow_links) {
                Ok(files) => files,
                Err(e) => {
                    error!("Failed to flatten directory {}: {}", dir.display(), e);
                    report.failures.push(Failure {
                        path: dir.to_path_buf(),
                        stage: FailureStage::Directory,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            info!("Found {} files in {}", files.len(), dir.display());

            for (path, name) in files {
                if self.dedupe && !seen.insert(path.clone()) {
                    report.duplicates_skipped += 1;
                    continue;
                }

                match self.extractor.extract_metadata(&path, &name) {
                    Ok(record) => report.records.push(record),
                    Err(e) => report.failures.push(Failure {
                        path,
                        stage: FailureStage::File,
                        reason: e.to_string(),
                    }),
                }
            }
        }

        info!(
            "Extracted {} records, {} failures",
            report.records.len(),
            report.failures.len()
        );
        report
    }
}
