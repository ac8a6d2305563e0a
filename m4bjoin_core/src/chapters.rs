//! Chapter synthesis and FFMETADATA rendering.

use std::fmt::Write as _;
use std::time::Duration;

use crate::manifest::ManifestEntry;

/// A chapter of the joined output, spanning exactly one input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterEntry {
    pub filename: String,
    pub title: String,
    pub start: Duration,
    pub end: Duration,
}

impl ChapterEntry {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Lay out one chapter per input, back to back from zero.
pub fn build_chapters<'a, I>(tracks: I) -> Vec<ChapterEntry>
where
    I: IntoIterator<Item = (&'a ManifestEntry, Duration)>,
{
    let mut cursor = Duration::ZERO;
    tracks
        .into_iter()
        .map(|(entry, duration)| {
            let start = cursor;
            cursor = cursor.saturating_add(duration);
            ChapterEntry {
                filename: entry.filename.clone(),
                title: entry.chapter_title(),
                start,
                end: cursor,
            }
        })
        .collect()
}

/// Render chapters as an ffmpeg `;FFMETADATA1` document with a nanosecond
/// time base.
pub fn render_ffmetadata(chapters: &[ChapterEntry]) -> String {
    let mut out = String::from(";FFMETADATA1\n");
    for chapter in chapters {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "[CHAPTER]\nTIMEBASE=1/1000000000\nSTART={}\nEND={}\ntitle={}\n",
            chapter.start.as_nanos(),
            chapter.end.as_nanos(),
            escape_metadata(&chapter.title)
        );
    }
    out
}

/// Escape the characters FFMETADATA treats specially.
pub fn escape_metadata(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '=' | ';' | '#' | '\n') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Format a chapter offset as `HH:MM:SS.mmm`.
pub fn format_timestamp(offset: Duration) -> String {
    let total_millis = offset.as_millis();
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis / 60_000) % 60;
    let seconds = (total_millis / 1_000) % 60;
    let millis = total_millis % 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}
