//! Probe backend that shells out to the `mediainfo` command line tool.
//!
//! `mediainfo --Output=JSON <file>` reports one object per track under
//! `media.track`, every value encoded as a string. Durations are given in
//! seconds with millisecond precision.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use serde::Deserialize;

use crate::media::probe::{MediaProbe, Track, TrackKind};
use crate::{MediaError, Result};

#[derive(Debug, Deserialize)]
struct Report {
    media: Option<ReportMedia>,
}

#[derive(Debug, Deserialize)]
struct ReportMedia {
    #[serde(default)]
    track: Vec<ReportTrack>,
}

#[derive(Debug, Deserialize)]
struct ReportTrack {
    #[serde(rename = "@type")]
    kind: String,
    #[serde(rename = "FileSize")]
    file_size: Option<String>,
    #[serde(rename = "Encoded_Date")]
    encoded_date: Option<String>,
    #[serde(rename = "Tagged_Date")]
    tagged_date: Option<String>,
    #[serde(rename = "Duration")]
    duration: Option<String>,
}

pub struct MediaInfoProbe {
    binary: PathBuf,
}

impl MediaInfoProbe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Decode the JSON document printed by `mediainfo --Output=JSON`.
    pub fn parse_report(json: &[u8]) -> Result<Vec<Track>> {
        let report: Report = serde_json::from_slice(json)?;
        let media = report
            .media
            .ok_or_else(|| MediaError::Probe("mediainfo reported no media".into()))?;

        Ok(media.track.into_iter().map(convert_track).collect())
    }
}

impl MediaProbe for MediaInfoProbe {
    fn probe(&self, path: &Path) -> Result<Vec<Track>> {
        debug!("Running {} on {}", self.binary.display(), path.display());
        let output = Command::new(&self.binary)
            .arg("--Output=JSON")
            .arg(path)
            .output()?;

        if !output.status.success() {
            return Err(MediaError::Probe(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Self::parse_report(&output.stdout)
    }
}

fn convert_track(raw: ReportTrack) -> Track {
    Track {
        kind: TrackKind::from_name(&raw.kind),
        file_size: raw.file_size.and_then(|s| s.trim().parse().ok()),
        encoded_date: raw.encoded_date,
        tagged_date: raw.tagged_date,
        duration_ms: raw.duration.as_deref().and_then(seconds_to_millis),
    }
}

/// Convert a decimal seconds string such as `"3661.040"` to whole
/// milliseconds, truncating anything below a millisecond.
fn seconds_to_millis(value: &str) -> Option<u64> {
    let value = value.trim();
    let (whole, frac) = value.split_once('.').unwrap_or((value, ""));
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let millis: String = frac.chars().chain("000".chars()).take(3).collect();
    let millis: u64 = millis.parse().ok()?;

    whole.checked_mul(1000)?.checked_add(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "creatingLibrary": {"name": "MediaInfoLib", "version": "23.04"},
        "media": {
            "@ref": "clip.mp4",
            "track": [
                {
                    "@type": "General",
                    "FileSize": "1500000",
                    "Duration": "3661.000",
                    "Encoded_Date": "2021-07-04 10:00:00 UTC",
                    "Tagged_Date": "2021-07-05 08:30:00 UTC"
                },
                {"@type": "Video", "Duration": "3660.960"},
                {"@type": "Audio", "Duration": "90"}
            ]
        }
    }"#;

    #[test]
    fn parses_tracks_from_report() {
        let tracks = MediaInfoProbe::parse_report(SAMPLE.as_bytes()).unwrap();

        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].kind, TrackKind::General);
        assert_eq!(tracks[0].file_size, Some(1_500_000));
        assert_eq!(tracks[0].duration_ms, Some(3_661_000));
        assert_eq!(
            tracks[0].encoded_date.as_deref(),
            Some("2021-07-04 10:00:00 UTC")
        );
        assert_eq!(tracks[1].kind, TrackKind::Video);
        assert_eq!(tracks[1].duration_ms, Some(3_660_960));
        assert_eq!(tracks[2].duration_ms, Some(90_000));
        assert_eq!(tracks[2].file_size, None);
    }

    #[test]
    fn report_without_media_is_an_error() {
        let result = MediaInfoProbe::parse_report(br#"{"media": null}"#);
        assert!(matches!(result, Err(MediaError::Probe(_))));
    }

    #[test]
    fn seconds_are_truncated_to_millis() {
        assert_eq!(seconds_to_millis("1.2345"), Some(1234));
        assert_eq!(seconds_to_millis("0.5"), Some(500));
        assert_eq!(seconds_to_millis(".25"), Some(250));
        assert_eq!(seconds_to_millis("abc"), None);
        assert_eq!(seconds_to_millis("1.2e3"), None);
    }

    #[test]
    fn missing_binary_is_reported_as_error() {
        let probe = MediaInfoProbe::new("/nonexistent/mediainfo-binary");
        assert!(probe.probe(Path::new("whatever.mp4")).is_err());
    }
}
