use std::path::Path;

use log::debug;
use symphonia::core::codecs::{CodecParameters, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, StandardTagKey, Tag};
use symphonia::core::probe::Hint;

use crate::media::probe::{MediaProbe, Track, TrackKind};
use crate::{MediaError, Result};

/// Pure Rust probe built on symphonia's format readers.
///
/// Reports a `General` track carrying the file size, the container tags and
/// the default track's duration, followed by one track per stream in the
/// container.
///
/// symphonia only decodes audio, so every stream it has a codec for is
/// reported as `Audio`. Streams it cannot decode (video, subtitles, data)
/// carry no codec and are reported as `Other("Data")`.
#[derive(Debug, Default)]
pub struct SymphoniaProbe;

impl SymphoniaProbe {
    pub fn new() -> Self {
        Self
    }
}

impl MediaProbe for SymphoniaProbe {
    fn probe(&self, path: &Path) -> Result<Vec<Track>> {
        let file = std::fs::File::open(path)?;
        let file_size = file.metadata()?.len();

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        let mut probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| MediaError::Probe(e.to_string()))?;

        let mut general = Track::new(TrackKind::General);
        general.file_size = Some(file_size);

        // Tags found ahead of the container (ID3v2 on MP3, for example)
        if let Some(metadata) = probed.metadata.get() {
            if let Some(revision) = metadata.current() {
                apply_tags(&mut general, revision.tags());
            }
        }

        let mut format = probed.format;
        if let Some(revision) = format.metadata().current() {
            apply_tags(&mut general, revision.tags());
        }

        general.duration_ms = format
            .default_track()
            .and_then(|track| duration_ms(&track.codec_params));

        let mut tracks = vec![general];
        for track in format.tracks() {
            let kind = if track.codec_params.codec == CODEC_TYPE_NULL {
                TrackKind::Other("Data".to_string())
            } else {
                TrackKind::Audio
            };
            let mut stream = Track::new(kind);
            stream.duration_ms = duration_ms(&track.codec_params);
            tracks.push(stream);
        }

        debug!("{}: {} tracks", path.display(), tracks.len());
        Ok(tracks)
    }
}

fn apply_tags(track: &mut Track, tags: &[Tag]) {
    for tag in tags {
        match tag.std_key {
            Some(StandardTagKey::EncodingDate) => {
                track.encoded_date = Some(tag.value.to_string());
            }
            Some(StandardTagKey::TaggingDate) => {
                track.tagged_date = Some(tag.value.to_string());
            }
            _ => {}
        }
    }
}

fn duration_ms(params: &CodecParameters) -> Option<u64> {
    let time_base = params.time_base?;
    let n_frames = params.n_frames?;
    let time = time_base.calc_time(n_frames);
    Some(time.seconds * 1000 + (time.frac * 1000.0) as u64)
}
