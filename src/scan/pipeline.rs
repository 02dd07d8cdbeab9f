//! End-to-end run: scan the roots, then produce every report artifact.
//!
//! Artifacts are attempted in order (table, JSON, chart, embedded chart).
//! A failed artifact is logged and recorded; the following ones are still
//! attempted unless they depend on it.

use std::fmt;

use log::{error, info};

use crate::analyzers::extensions::ExtensionAnalyzer;
use crate::media::metadata::MetadataExtractor;
use crate::media::probe::MediaProbe;
use crate::scan::batch::{BatchProcessor, BatchReport};
use crate::utils::chart::render_extension_chart;
use crate::utils::config::{Config, TableFormat};
use crate::utils::reporting::Reporter;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Table,
    Json,
    Chart,
    EmbeddedChart,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Table => write!(f, "table"),
            Artifact::Json => write!(f, "JSON"),
            Artifact::Chart => write!(f, "chart"),
            Artifact::EmbeddedChart => write!(f, "embedded chart"),
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub report: BatchReport,
    pub artifact_failures: Vec<(Artifact, String)>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.report.is_clean() && self.artifact_failures.is_empty()
    }

    pub fn failed(&self, artifact: Artifact) -> bool {
        self.artifact_failures.iter().any(|(a, _)| *a == artifact)
    }
}

/// Run with the probe selected in `config`.
pub fn run(config: &Config) -> Result<RunSummary> {
    let probe = config.backend.build(&config.mediainfo_bin);
    run_with_probe(config, probe)
}

/// Validate `config`, scan its roots with `probe` and write the reports.
///
/// Only configuration problems are returned as errors.
pub fn run_with_probe<P: MediaProbe>(config: &Config, probe: P) -> Result<RunSummary> {
    config.validate()?;

    let extractor = MetadataExtractor::new(probe).with_strip_prefix(config.prefix_pattern()?);
    let processor = BatchProcessor::new(extractor)
        .follow_links(config.follow_links)
        .dedupe(config.dedupe);

    let report = processor.process_directories(&config.roots);
    let mut summary = RunSummary {
        report,
        artifact_failures: Vec::new(),
    };

    let reporter = Reporter::new();
    let records = &summary.report.records;

    let table_written = attempt(
        &mut summary.artifact_failures,
        Artifact::Table,
        reporter.append_table(records, &config.spreadsheet, &config.sheet_name, config.table_format),
    );

    attempt(
        &mut summary.artifact_failures,
        Artifact::Json,
        reporter.write_json(records, &config.json),
    );

    // The chart covers every row in the table, including earlier runs
    let chart_written = table_written
        && attempt(
            &mut summary.artifact_failures,
            Artifact::Chart,
            reporter
                .read_extensions(&config.spreadsheet, &config.sheet_name, config.table_format)
                .and_then(|extensions| {
                    let counts = ExtensionAnalyzer::new().analyze(extensions.iter().map(String::as_str));
                    render_extension_chart(&counts, &config.chart)
                }),
        );

    if chart_written && config.table_format == TableFormat::Xlsx {
        attempt(
            &mut summary.artifact_failures,
            Artifact::EmbeddedChart,
            reporter.embed_image(
                &config.spreadsheet,
                &config.sheet_name,
                &config.chart,
                &config.chart_anchor,
            ),
        );
    }

    info!(
        "Run finished: {} records, {} failures, {} artifact failures",
        summary.report.records.len(),
        summary.report.failures.len(),
        summary.artifact_failures.len()
    );
    Ok(summary)
}

fn attempt(failures: &mut Vec<(Artifact, String)>, artifact: Artifact, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to write {}: {}", artifact, e);
            failures.push((artifact, e.to_string()));
            false
        }
    }
}

