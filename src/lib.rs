use serde::{Deserialize, Serialize};

pub mod analyzers;
pub mod cli;
pub mod media;
pub mod scan;
pub mod utils;

/// Normalized metadata for one media file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_name: String,
    pub creation_date: Option<String>,
    pub modified_date: Option<String>,
    pub duration: Option<String>,
    pub size: Option<String>,
    pub path: String,
    pub extension: String,
}

impl FileRecord {
    /// Column names, in the order records are tabulated.
    pub const COLUMNS: [&'static str; 7] = [
        "file_name",
        "creation_date",
        "modified_date",
        "duration",
        "size",
        "path",
        "extension",
    ];

    /// Cell values in `COLUMNS` order; missing values become empty cells.
    pub fn to_row(&self) -> [String; 7] {
        [
            self.file_name.clone(),
            self.creation_date.clone().unwrap_or_default(),
            self.modified_date.clone().unwrap_or_default(),
            self.duration.clone().unwrap_or_default(),
            self.size.clone().unwrap_or_default(),
            self.path.clone(),
            self.extension.clone(),
        ]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Media probe error: {0}")]
    Probe(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("Spreadsheet read error: {0}")]
    SpreadsheetRead(#[from] calamine::Error),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
    #[error("Chart error: {0}")]
    Chart(String),
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MediaError>;

// Re-exports for convenience
pub use analyzers::extensions::ExtensionAnalyzer;
pub use media::metadata::MetadataExtractor;
pub use media::probe::{MediaProbe, Track, TrackKind};
pub use scan::batch::{BatchProcessor, BatchReport, Failure, FailureStage};
pub use scan::flatten::flatten_directory;
pub use utils::config::Config;
