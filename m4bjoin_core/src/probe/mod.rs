//! Audio parameter inspection.
//!
//! Probing sits behind the [`MediaProbe`] trait so the pipeline can run
//! against `ffprobe`, the in-process Symphonia demuxers, or a test double.

mod ffprobe;
mod native;

use std::path::Path;
use std::time::Duration;

pub use ffprobe::{parse_ffprobe_output, FfprobeProbe};
pub use native::SymphoniaProbe;

use crate::error::ProbeError;

/// Parameters that must agree across every input for a stream copy to work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AudioParameters {
    pub sample_rate: u32,
    pub channels: u32,
}

/// Everything the pipeline needs to know about one input file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioInfo {
    pub duration: Duration,
    pub parameters: AudioParameters,
}

/// Capability to inspect an audio file.
pub trait MediaProbe {
    fn probe(&self, path: &Path) -> Result<AudioInfo, ProbeError>;
}

impl<T: MediaProbe + ?Sized> MediaProbe for &T {
    fn probe(&self, path: &Path) -> Result<AudioInfo, ProbeError> {
        (**self).probe(path)
    }
}

impl<T: MediaProbe + ?Sized> MediaProbe for Box<T> {
    fn probe(&self, path: &Path) -> Result<AudioInfo, ProbeError> {
        (**self).probe(path)
    }
}

const NANOS_PER_SEC: u64 = 1_000_000_000;
const FRACTION_DIGITS: usize = 9;

/// Parse a decimal seconds value such as `"60.024000"` without going through
/// floating point. Digits beyond nanosecond precision are truncated.
pub fn parse_seconds(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (value, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let secs = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().ok()?
    };

    let mut nanos: u64 = 0;
    for (position, digit) in fraction.bytes().take(FRACTION_DIGITS).enumerate() {
        let scale = 10u64.pow((FRACTION_DIGITS - 1 - position) as u32);
        nanos += u64::from(digit - b'0') * scale;
    }
    debug_assert!(nanos < NANOS_PER_SEC);

    Some(Duration::new(secs, nanos as u32))
}

/// Convert a frame count into a duration using a rational time base.
pub(crate) fn frames_to_duration(frames: u64, numer: u32, denom: u32) -> Option<Duration> {
    if denom == 0 {
        return None;
    }
    let nanos =
        u128::from(frames) * u128::from(numer) * u128::from(NANOS_PER_SEC) / u128::from(denom);
    let secs = u64::try_from(nanos / u128::from(NANOS_PER_SEC)).ok()?;
    Some(Duration::new(secs, (nanos % u128::from(NANOS_PER_SEC)) as u32))
}
