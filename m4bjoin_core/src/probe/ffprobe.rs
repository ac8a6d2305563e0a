use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use serde::Deserialize;

use super::{parse_seconds, AudioInfo, AudioParameters, MediaProbe};
use crate::error::ProbeError;

/// Probe backed by an external `ffprobe` binary.
#[derive(Clone, Debug)]
pub struct FfprobeProbe {
    program: PathBuf,
}

impl FfprobeProbe {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl MediaProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> Result<AudioInfo, ProbeError> {
        debug!("running {} on '{}'", self.program.display(), path.display());

        let output = Command::new(&self.program)
            .args(["-v", "error"])
            .args(["-select_streams", "a:0"])
            .args(["-show_entries", "stream=sample_rate,channels"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "json"])
            .arg(path)
            .output()
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        parse_ffprobe_output(path, &output.stdout)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    sample_rate: Option<NumberOrString>,
    channels: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<NumberOrString>,
}

/// ffprobe prints most numeric fields as JSON strings, but not all of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(serde_json::Number),
    String(String),
}

impl NumberOrString {
    fn as_text(&self) -> String {
        match self {
            NumberOrString::Number(number) => number.to_string(),
            NumberOrString::String(text) => text.clone(),
        }
    }
}

/// Interpret the JSON printed by the `ffprobe` invocation used by
/// [`FfprobeProbe`].
pub fn parse_ffprobe_output(path: &Path, stdout: &[u8]) -> Result<AudioInfo, ProbeError> {
    let parse_error = |reason: String| ProbeError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let parsed: ProbeOutput =
        serde_json::from_slice(stdout).map_err(|err| parse_error(err.to_string()))?;

    let stream = parsed
        .streams
        .first()
        .ok_or_else(|| ProbeError::NoAudioStream(path.to_path_buf()))?;

    let sample_rate = stream
        .sample_rate
        .as_ref()
        .map(NumberOrString::as_text)
        .ok_or_else(|| parse_error("missing sample_rate".into()))?;
    let sample_rate = sample_rate
        .trim()
        .parse::<u32>()
        .map_err(|_| parse_error(format!("invalid sample_rate '{sample_rate}'")))?;

    let channels = stream
        .channels
        .ok_or_else(|| parse_error("missing channels".into()))?;

    let duration = parsed
        .format
        .as_ref()
        .and_then(|format| format.duration.as_ref())
        .map(NumberOrString::as_text)
        .ok_or_else(|| parse_error("missing format duration".into()))?;
    let duration = parse_seconds(&duration)
        .ok_or_else(|| parse_error(format!("invalid duration '{duration}'")))?;

    Ok(AudioInfo {
        duration,
        parameters: AudioParameters {
            sample_rate,
            channels,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SAMPLE: &str = r#"{
        "programs": [],
        "streams": [{ "sample_rate": "44100", "channels": 2 }],
        "format": { "duration": "61.152000" }
    }"#;

    #[test]
    fn parses_typical_output() {
        let info = parse_ffprobe_output(Path::new("a.mp3"), SAMPLE.as_bytes()).unwrap();
        assert_eq!(info.duration, Duration::from_millis(61_152));
        assert_eq!(
            info.parameters,
            AudioParameters {
                sample_rate: 44_100,
                channels: 2
            }
        );
    }

    #[test]
    fn accepts_numeric_fields() {
        let json = r#"{"streams":[{"sample_rate":22050,"channels":1}],"format":{"duration":5}}"#;
        let info = parse_ffprobe_output(Path::new("a.mp3"), json.as_bytes()).unwrap();
        assert_eq!(info.parameters.sample_rate, 22_050);
        assert_eq!(info.duration, Duration::from_secs(5));
    }

    #[test]
    fn reports_missing_audio_stream() {
        let json = r#"{"streams":[],"format":{"duration":"1.0"}}"#;
        let err = parse_ffprobe_output(Path::new("cover.jpg"), json.as_bytes()).unwrap_err();
        assert!(matches!(err, ProbeError::NoAudioStream(_)));
    }

    #[test]
    fn reports_unavailable_duration() {
        let json = r#"{"streams":[{"sample_rate":"44100","channels":2}],"format":{"duration":"N/A"}}"#;
        let err = parse_ffprobe_output(Path::new("a.mp3"), json.as_bytes()).unwrap_err();
        match err {
            ProbeError::Parse { reason, .. } => assert!(reason.contains("N/A")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reports_garbage_output() {
        let err = parse_ffprobe_output(Path::new("a.mp3"), b"not json").unwrap_err();
        assert!(matches!(err, ProbeError::Parse { .. }));
    }

    #[test]
    fn missing_binary_is_a_probe_error() {
        let probe = FfprobeProbe::new("/nonexistent/m4bjoin-ffprobe");
        let err = probe.probe(Path::new("a.mp3")).unwrap_err();
        assert!(matches!(err, ProbeError::Spawn { .. }));
    }
}
