use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use media_inventory::cli::commands::{Cli, Commands, ProbeArgs, ScanArgs};
use media_inventory::media::probe::Backend;
use media_inventory::scan::pipeline;
use media_inventory::{flatten_directory, MediaError, MetadataExtractor};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan(args) => scan(args),
        Commands::Flatten { dir, follow_links } => flatten(dir, follow_links),
        Commands::Probe {
            file,
            probe,
            strip_prefix,
        } => probe_file(file, probe, strip_prefix),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn scan(args: ScanArgs) -> Result<ExitCode, MediaError> {
    let config = args.into_config()?;

    println!("=== Starting Media Scan ===");
    for dir in &config.roots {
        println!("  - {}", dir.display());
    }

    let summary = pipeline::run(&config)?;
    let report = &summary.report;

    println!("\nExtracted {} records", report.records.len());
    if report.duplicates_skipped > 0 {
        println!("Skipped {} duplicate files", report.duplicates_skipped);
    }
    if !report.failures.is_empty() {
        println!("{} failures:", report.failures.len());
        for failure in &report.failures {
            println!("  [{}] {}: {}", failure.stage, failure.path.display(), failure.reason);
        }
    }
    for (artifact, reason) in &summary.artifact_failures {
        println!("  [{}] not written: {}", artifact, reason);
    }

    println!("\n=== Media Scan Complete ===");

    if config.strict && !summary.is_clean() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn flatten(dir: PathBuf, follow_links: bool) -> Result<ExitCode, MediaError> {
    let files = flatten_directory(&dir, follow_links)?;
    for path in files.keys() {
        println!("{}", path.display());
    }
    println!("\nFound {} files", files.len());
    Ok(ExitCode::SUCCESS)
}

fn probe_file(
    file: PathBuf,
    probe: ProbeArgs,
    strip_prefix: Option<String>,
) -> Result<ExitCode, MediaError> {
    let backend = probe.backend.unwrap_or_default();
    let mediainfo_bin = probe
        .mediainfo_bin
        .unwrap_or_else(|| PathBuf::from("mediainfo"));
    let strip_prefix = strip_prefix
        .filter(|p| !p.is_empty())
        .map(|p| regex::Regex::new(&p))
        .transpose()?;

    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| MediaError::Config(format!("{} is not a file", file.display())))?;

    let extractor = MetadataExtractor::new(Backend::build(backend, &mediainfo_bin))
        .with_strip_prefix(strip_prefix);
    let record = extractor.extract_metadata(&file, &file_name)?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(ExitCode::SUCCESS)
}
