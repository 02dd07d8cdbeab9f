use std::collections::HashMap;

use log::info;
use serde::Serialize;

/// Number of files sharing one (lower-cased) extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionCount {
    pub extension: String,
    pub count: usize,
}

pub struct ExtensionAnalyzer;

impl ExtensionAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Count extensions case-insensitively. The result is ordered by count,
    /// highest first, with ties broken by extension name.
    pub fn analyze<'a>(&self, extensions: impl IntoIterator<Item = &'a str>) -> Vec<ExtensionCount> {
        let mut distribution: HashMap<String, usize> = HashMap::new();
        for extension in extensions {
            *distribution.entry(extension.to_lowercase()).or_insert(0) += 1;
        }

        let mut counts: Vec<ExtensionCount> = distribution
            .into_iter()
            .map(|(extension, count)| ExtensionCount { extension, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.extension.cmp(&b.extension)));

        let total: usize = counts.iter().map(|c| c.count).sum();
        for entry in &counts {
            let percentage = (entry.count as f64 / total as f64 * 100.0).round();
            info!("{}: {} files ({:.1}%)", display_name(&entry.extension), entry.count, percentage);
        }

        counts
    }
}

impl Default for ExtensionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Label used for files without an extension.
pub fn display_name(extension: &str) -> &str {
    if extension.is_empty() {
        "(none)"
    } else {
        extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn count(extension: &str, count: usize) -> ExtensionCount {
        ExtensionCount {
            extension: extension.to_string(),
            count,
        }
    }

    #[test]
    fn counts_case_insensitively_and_sorts_by_frequency() {
        let counts = ExtensionAnalyzer::new().analyze([".MP4", ".mp4", ".mkv", ".Mp4", ".avi", ".MKV"]);

        assert_eq!(counts, vec![count(".mp4", 3), count(".mkv", 2), count(".avi", 1)]);
    }

    #[test]
    fn ties_are_ordered_by_name() {
        let counts = ExtensionAnalyzer::new().analyze([".wav", "", ".flac"]);

        assert_eq!(counts, vec![count("", 1), count(".flac", 1), count(".wav", 1)]);
        assert_eq!(display_name(&counts[0].extension), "(none)");
    }

    #[test]
    fn empty_input_gives_empty_result() {
        assert!(ExtensionAnalyzer::new().analyze(Vec::<&str>::new()).is_empty());
    }
}
