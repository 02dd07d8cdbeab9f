use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::media::probe::Backend;
use crate::utils::config::{Config, TableFormat};
use crate::Result;

#[derive(Parser)]
#[command(name = "media-inventory")]
#[command(version = "1.0")]
#[command(about = "Catalogue media files into a spreadsheet, a JSON file and an extension chart", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan directories and write the spreadsheet, JSON and chart
    Scan(ScanArgs),

    /// List every file found under a directory
    Flatten {
        /// Directory to walk
        dir: PathBuf,

        /// Descend into symlinked directories
        #[arg(short = 'L', long)]
        follow_links: bool,
    },

    /// Print the record extracted from a single file as JSON
    Probe {
        /// Media file to inspect
        file: PathBuf,

        #[command(flatten)]
        probe: ProbeArgs,

        /// Regex removed from the recorded path
        #[arg(long)]
        strip_prefix: Option<String>,
    },
}

#[derive(Args, Clone, Default)]
pub struct ProbeArgs {
    /// Metadata backend
    #[arg(short = 'b', long, value_enum)]
    pub backend: Option<Backend>,

    /// Path to the mediainfo executable
    #[arg(long)]
    pub mediainfo_bin: Option<PathBuf>,
}

#[derive(Args, Clone, Default)]
pub struct ScanArgs {
    /// Directories to scan (added after any listed in the config file)
    pub dirs: Vec<PathBuf>,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Spreadsheet to append records to
    #[arg(short = 'o', long)]
    pub spreadsheet: Option<PathBuf>,

    /// Sheet that receives the rows and the chart
    #[arg(long = "sheet")]
    pub sheet_name: Option<String>,

    /// Spreadsheet format
    #[arg(long, value_enum)]
    pub table_format: Option<TableFormat>,

    /// JSON output file
    #[arg(short = 'j', long)]
    pub json: Option<PathBuf>,

    /// Chart image file
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Cell where the chart is anchored, e.g. H1
    #[arg(long = "anchor")]
    pub chart_anchor: Option<String>,

    /// Regex removed from every recorded path
    #[arg(long)]
    pub strip_prefix: Option<String>,

    #[command(flatten)]
    pub probe: ProbeArgs,

    /// Descend into symlinked directories
    #[arg(short = 'L', long)]
    pub follow_links: bool,

    /// Skip files already seen from an earlier directory
    #[arg(short = 'd', long)]
    pub dedupe: bool,

    /// Exit with an error status when any file, directory or output failed
    #[arg(short = 's', long)]
    pub strict: bool,
}

impl ScanArgs {
    /// Load the config file, if any, and apply the flags on top of it.
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.roots.extend(self.dirs);
        if let Some(spreadsheet) = self.spreadsheet {
            config.spreadsheet = spreadsheet;
        }
        if let Some(sheet_name) = self.sheet_name {
            config.sheet_name = sheet_name;
        }
        if let Some(table_format) = self.table_format {
            config.table_format = table_format;
        }
        if let Some(json) = self.json {
            config.json = json;
        }
        if let Some(chart) = self.chart {
            config.chart = chart;
        }
        if let Some(anchor) = self.chart_anchor {
            config.chart_anchor = anchor;
        }
        if self.strip_prefix.is_some() {
            config.path_prefix = self.strip_prefix;
        }
        if let Some(backend) = self.probe.backend {
            config.backend = backend;
        }
        if let Some(bin) = self.probe.mediainfo_bin {
            config.mediainfo_bin = bin;
        }
        config.follow_links |= self.follow_links;
        config.dedupe |= self.dedupe;
        config.strict |= self.strict;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("inventory.toml");
        std::fs::write(
            &config_path,
            "roots = [\"/srv/tv\"]\nsheet_name = \"Media\"\njson = \"a.json\"\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "media-inventory",
            "scan",
            "/srv/radio",
            "--config",
            config_path.to_str().unwrap(),
            "--json",
            "b.json",
            "--backend",
            "mediainfo",
            "--dedupe",
        ]);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan command");
        };
        let config = args.into_config().unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("/srv/tv"), PathBuf::from("/srv/radio")]);
        assert_eq!(config.sheet_name, "Media");
        assert_eq!(config.json, PathBuf::from("b.json"));
        assert_eq!(config.backend, Backend::Mediainfo);
        assert!(config.dedupe);
        assert!(!config.strict);
    }

    #[test]
    fn defaults_without_config_file() {
        let cli = Cli::parse_from(["media-inventory", "scan", "/srv/tv", "--anchor", "B2"]);
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan command");
        };
        let config = args.into_config().unwrap();

        assert_eq!(config.chart_anchor, "B2");
        assert_eq!(config.spreadsheet, PathBuf::from("records.xlsx"));
        assert_eq!(config.table_format, TableFormat::Xlsx);
    }
}
