//! Run configuration.
//!
//! Values come from an optional TOML file; command line flags override them.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::media::probe::Backend;
use crate::utils::reporting::parse_cell_anchor;
use crate::{MediaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Xlsx,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directories to scan, in order
    pub roots: Vec<PathBuf>,
    /// Spreadsheet the records are appended to
    pub spreadsheet: PathBuf,
    /// Sheet that receives the rows and the chart
    pub sheet_name: String,
    pub table_format: TableFormat,
    /// JSON dump of this run's records
    pub json: PathBuf,
    /// Extension chart image
    pub chart: PathBuf,
    /// Top-left cell of the embedded chart, in A1 notation
    pub chart_anchor: String,
    /// Regex removed from every recorded path, e.g. a network share prefix
    pub path_prefix: Option<String>,
    pub backend: Backend,
    pub mediainfo_bin: PathBuf,
    pub follow_links: bool,
    /// Skip files already seen from an earlier root
    pub dedupe: bool,
    /// Exit non-zero when anything failed
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            spreadsheet: PathBuf::from("records.xlsx"),
            sheet_name: "Records".to_string(),
            table_format: TableFormat::Xlsx,
            json: PathBuf::from("records.json"),
            chart: PathBuf::from("graph.png"),
            chart_anchor: "H1".to_string(),
            path_prefix: None,
            backend: Backend::Symphonia,
            mediainfo_bin: PathBuf::from("mediainfo"),
            follow_links: false,
            dedupe: false,
            strict: false,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Compiled `path_prefix`, if one is configured.
    pub fn prefix_pattern(&self) -> Result<Option<Regex>> {
        match self.path_prefix.as_deref() {
            Some(pattern) if !pattern.is_empty() => Ok(Some(Regex::new(pattern)?)),
            _ => Ok(None),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            return Err(MediaError::Config("no directories to scan".into()));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(MediaError::Config("sheet name must not be empty".into()));
        }
        self.prefix_pattern()?;
        parse_cell_anchor(&self.chart_anchor)?;
        Ok(())
    }
}
