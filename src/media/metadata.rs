use std::path::Path;
use std::sync::OnceLock;

use log::{error, info};
use regex::Regex;

use crate::media::probe::{MediaProbe, Track, TrackKind};
use crate::{FileRecord, Result};

/// Turns probe output for one file into a [`FileRecord`].
///
/// Tracks are folded in the order the probe reports them, with one merge
/// rule per field:
///
/// * `size`: only `General` tracks with a non-zero size count; the last one wins.
/// * `creation_date` / `modified_date`: any track whose encoded/tagged date
///   contains an ISO date; the last one wins. Values without a date are ignored.
/// * `duration`: any track with a non-zero duration; the last one wins.
pub struct MetadataExtractor<P> {
    probe: P,
    strip_prefix: Option<Regex>,
}

impl<P: MediaProbe> MetadataExtractor<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            strip_prefix: None,
        }
    }

    /// Remove every match of `pattern` from the displayed path.
    pub fn with_strip_prefix(mut self, pattern: Option<Regex>) -> Self {
        self.strip_prefix = pattern;
        self
    }

    pub fn extract_metadata(&self, path: impl AsRef<Path>, file_name: &str) -> Result<FileRecord> {
        let path = path.as_ref();

        let tracks = self.probe.probe(path).map_err(|e| {
            error!("Failed to parse {}: {}", path.display(), e);
            e
        })?;

        let raw_path = path.to_string_lossy();
        let display_path = match &self.strip_prefix {
            Some(pattern) => pattern.replace_all(&raw_path, "").into_owned(),
            None => raw_path.into_owned(),
        };

        let mut record = FileRecord {
            file_name: file_name.to_string(),
            creation_date: None,
            modified_date: None,
            duration: None,
            size: None,
            path: display_path,
            extension: file_extension(file_name).to_string(),
        };
        self.merge_tracks(&mut record, &tracks);

        info!("{:?}", record);
        Ok(record)
    }

    fn merge_tracks(&self, record: &mut FileRecord, tracks: &[Track]) {
        for track in tracks {
            if track.kind == TrackKind::General {
                if let Some(bytes) = track.file_size.filter(|&b| b > 0) {
                    record.size = Some(format_size(bytes));
                }
            }

            if let Some(date) = track
                .encoded_date
                .as_deref()
                .and_then(extract_iso_date)
            {
                record.creation_date = Some(date);
            }

            if let Some(date) = track
                .tagged_date
                .as_deref()
                .and_then(extract_iso_date)
            {
                record.modified_date = Some(date);
            }

            if let Some(ms) = track.duration_ms.filter(|&ms| ms > 0) {
                record.duration = Some(format_duration(ms));
            }
        }
    }
}

fn date_regex() -> &'static Regex {
    static DATE: OnceLock<Regex> = OnceLock::new();
    DATE.get_or_init(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap())
}

/// First `YYYY-MM-DD` substring of `value`, if any.
pub fn extract_iso_date(value: &str) -> Option<String> {
    date_regex().find(value).map(|m| m.as_str().to_string())
}

/// `HH:MM:SS` from milliseconds. Hours are not wrapped at 24.
pub fn format_duration(ms: u64) -> String {
    let hours = ms / (1000 * 60 * 60);
    let minutes = (ms / (1000 * 60)) % 60;
    let seconds = (ms / 1000) % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Decimal megabytes (10^6 bytes) with two decimals.
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1_000_000.0)
}

/// Suffix of `file_name` including the dot, case preserved. Empty for names
/// without a suffix and for dotfiles such as `.bashrc`.
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => "",
        Some(i) if i + 1 == file_name.len() => "",
        Some(i) => &file_name[i..],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MediaError;
    use pretty_assertions::assert_eq;

    struct FixedProbe(Vec<Track>);

    impl MediaProbe for FixedProbe {
        fn probe(&self, _path: &Path) -> Result<Vec<Track>> {
            Ok(self.0.clone())
        }
    }

    struct FailingProbe;

    impl MediaProbe for FailingProbe {
        fn probe(&self, _path: &Path) -> Result<Vec<Track>> {
            Err(MediaError::Probe("unsupported".into()))
        }
    }

    fn general() -> Track {
        let mut track = Track::new(TrackKind::General);
        track.file_size = Some(1_500_000);
        track.encoded_date = Some("UTC 2021-07-04 10:00:00".into());
        track.tagged_date = Some("2021-07-05 08:30:00 UTC".into());
        track.duration_ms = Some(3_661_000);
        track
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(3_661_000), "01:01:01");
        assert_eq!(format_duration(90_000), "00:01:30");
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(90_061_999), "25:01:01");
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(1_500_000), "1.50 MB");
        assert_eq!(format_size(999), "0.00 MB");
        assert_eq!(format_size(1_048_576), "1.05 MB");
    }

    #[test]
    fn date_extraction() {
        assert_eq!(
            extract_iso_date("2021-07-04 10:00:00 UTC").as_deref(),
            Some("2021-07-04")
        );
        assert_eq!(extract_iso_date("UTC 2021-07-04").as_deref(), Some("2021-07-04"));
        assert_eq!(extract_iso_date("July 4th, 2021"), None);
    }

    #[test]
    fn extension_keeps_case_and_dot() {
        assert_eq!(file_extension("Clip.MP4"), ".MP4");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension(".hidden"), "");
        assert_eq!(file_extension("trailing."), "");
    }

    #[test]
    fn builds_record_from_general_track() {
        let extractor = MetadataExtractor::new(FixedProbe(vec![general()]));
        let record = extractor
            .extract_metadata("/media/show/Clip.MP4", "Clip.MP4")
            .unwrap();

        assert_eq!(
            record,
            FileRecord {
                file_name: "Clip.MP4".into(),
                creation_date: Some("2021-07-04".into()),
                modified_date: Some("2021-07-05".into()),
                duration: Some("01:01:01".into()),
                size: Some("1.50 MB".into()),
                path: "/media/show/Clip.MP4".into(),
                extension: ".MP4".into(),
            }
        );
    }

    #[test]
    fn size_only_comes_from_general_tracks() {
        let mut video = Track::new(TrackKind::Video);
        video.file_size = Some(42_000_000);

        let extractor = MetadataExtractor::new(FixedProbe(vec![video]));
        let record = extractor.extract_metadata("/a/b.mkv", "b.mkv").unwrap();

        assert_eq!(record.size, None);
    }

    #[test]
    fn later_tracks_overwrite_earlier_values() {
        let mut audio = Track::new(TrackKind::Audio);
        audio.duration_ms = Some(90_000);
        audio.encoded_date = Some("no date here".into());

        let extractor = MetadataExtractor::new(FixedProbe(vec![general(), audio]));
        let record = extractor.extract_metadata("/a/b.mp4", "b.mp4").unwrap();

        assert_eq!(record.duration.as_deref(), Some("00:01:30"));
        assert_eq!(record.creation_date.as_deref(), Some("2021-07-04"));
    }

    #[test]
    fn zero_values_are_treated_as_missing() {
        let mut track = Track::new(TrackKind::General);
        track.file_size = Some(0);
        track.duration_ms = Some(0);

        let extractor = MetadataExtractor::new(FixedProbe(vec![track]));
        let record = extractor.extract_metadata("/a/b.mp3", "b.mp3").unwrap();

        assert_eq!(record.size, None);
        assert_eq!(record.duration, None);
    }

    #[test]
    fn strips_configured_prefix_from_path() {
        let pattern = Regex::new(r"\\\\192\.168\.4\.71\\").unwrap();
        let extractor =
            MetadataExtractor::new(FixedProbe(vec![])).with_strip_prefix(Some(pattern));

        let record = extractor
            .extract_metadata(r"\\192.168.4.71\share\tv\ep1.mp4", "ep1.mp4")
            .unwrap();

        assert_eq!(record.path, r"share\tv\ep1.mp4");
    }

    #[test]
    fn probe_failure_drops_record() {
        let extractor = MetadataExtractor::new(FailingProbe);
        let result = extractor.extract_metadata("/a/broken.avi", "broken.avi");

        assert!(matches!(result, Err(MediaError::Probe(_))));
    }
}
