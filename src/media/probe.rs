use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::media::mediainfo::MediaInfoProbe;
use crate::media::symphonia_probe::SymphoniaProbe;
use crate::Result;

/// Kind of metadata stream reported for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackKind {
    General,
    Video,
    Audio,
    Text,
    Image,
    Menu,
    Other(String),
}

impl TrackKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "General" => TrackKind::General,
            "Video" => TrackKind::Video,
            "Audio" => TrackKind::Audio,
            "Text" => TrackKind::Text,
            "Image" => TrackKind::Image,
            "Menu" => TrackKind::Menu,
            other => TrackKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::General => write!(f, "General"),
            TrackKind::Video => write!(f, "Video"),
            TrackKind::Audio => write!(f, "Audio"),
            TrackKind::Text => write!(f, "Text"),
            TrackKind::Image => write!(f, "Image"),
            TrackKind::Menu => write!(f, "Menu"),
            TrackKind::Other(name) => write!(f, "{}", name),
        }
    }
}

/// One metadata stream as reported by a probe backend. Dates are raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub kind: TrackKind,
    pub file_size: Option<u64>,
    pub encoded_date: Option<String>,
    pub tagged_date: Option<String>,
    pub duration_ms: Option<u64>,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            file_size: None,
            encoded_date: None,
            tagged_date: None,
            duration_ms: None,
        }
    }
}

/// Source of per-file track metadata.
pub trait MediaProbe {
    fn probe(&self, path: &Path) -> Result<Vec<Track>>;
}

impl<P: MediaProbe + ?Sized> MediaProbe for Box<P> {
    fn probe(&self, path: &Path) -> Result<Vec<Track>> {
        (**self).probe(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Symphonia,
    Mediainfo,
}

impl Backend {
    /// Build the probe for this backend. `mediainfo_bin` is only used by `Mediainfo`.
    pub fn build(self, mediainfo_bin: &Path) -> Box<dyn MediaProbe> {
        match self {
            Backend::Symphonia => Box::new(SymphoniaProbe::new()),
            Backend::Mediainfo => Box::new(MediaInfoProbe::new(mediainfo_bin)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_kind_names_round_trip_through_display() {
        for name in ["General", "Video", "Audio", "Text", "Image", "Menu", "Chapters"] {
            assert_eq!(TrackKind::from_name(name).to_string(), name);
        }
        assert_eq!(
            TrackKind::from_name("Chapters"),
            TrackKind::Other("Chapters".to_string())
        );
    }
}
