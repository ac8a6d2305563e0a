use std::fs::File;
use std::io;
use std::path::Path;

use log::debug;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::get_probe;

use super::{frames_to_duration, AudioInfo, AudioParameters, MediaProbe};
use crate::error::ProbeError;

/// Probe that reads container headers in-process with Symphonia.
///
/// When the container does not advertise a frame count (e.g. a CBR MP3
/// without a Xing/Info header) the packets are walked to sum their
/// durations. Nothing is decoded.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymphoniaProbe;

impl MediaProbe for SymphoniaProbe {
    fn probe(&self, path: &Path) -> Result<AudioInfo, ProbeError> {
        let decode_error = |source| ProbeError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let file = File::open(path).map_err(|source| ProbeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let probed = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(decode_error)?;
        let mut reader = probed.format;

        let track = reader
            .default_track()
            .filter(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| ProbeError::NoAudioStream(path.to_path_buf()))?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        let parse_error = |reason: &str| ProbeError::Parse {
            path: path.to_path_buf(),
            reason: reason.to_owned(),
        };

        let sample_rate = params
            .sample_rate
            .ok_or_else(|| parse_error("stream does not advertise a sample rate"))?;
        let channels = params
            .channels
            .map(|channels| channels.count() as u32)
            .ok_or_else(|| parse_error("stream does not advertise a channel layout"))?;

        let frames = match params.n_frames {
            Some(frames) => frames,
            None => {
                debug!(
                    "'{}' has no frame count, summing packet durations",
                    path.display()
                );
                let mut total: u64 = 0;
                loop {
                    match reader.next_packet() {
                        Ok(packet) if packet.track_id() == track_id => total += packet.dur,
                        Ok(_) => {}
                        Err(SymphoniaError::IoError(err))
                            if err.kind() == io::ErrorKind::UnexpectedEof =>
                        {
                            break
                        }
                        Err(err) => return Err(decode_error(err)),
                    }
                }
                total
            }
        };

        let (numer, denom) = match params.time_base {
            Some(time_base) => (time_base.numer, time_base.denom),
            None => (1, sample_rate),
        };
        let duration = frames_to_duration(frames, numer, denom)
            .ok_or_else(|| parse_error("stream has an invalid time base"))?;

        Ok(AudioInfo {
            duration,
            parameters: AudioParameters {
                sample_rate,
                channels,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SymphoniaProbe
            .probe(&dir.path().join("missing.mp3"))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Open { .. }));
    }

    #[test]
    fn unknown_format_reports_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.bin");
        std::fs::write(&path, b"definitely not audio").unwrap();
        let err = SymphoniaProbe.probe(&path).unwrap_err();
        assert!(matches!(err, ProbeError::Decode { .. }));
    }
}
