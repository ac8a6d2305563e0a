//! Order file parsing.
//!
//! The order file lists one input per line, either as a bare `filename` or as
//! `filename|Chapter Title`. Blank lines are ignored and the order of the
//! remaining lines is the order of the joined audio.

use std::fs;
use std::path::Path;

use crate::error::ManifestError;

/// One line of the order file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    /// File name relative to the input directory.
    pub filename: String,
    /// Explicit chapter title, if the line carried one.
    pub title: Option<String>,
}

impl ManifestEntry {
    /// The chapter title for this entry, falling back to the file stem.
    pub fn chapter_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_owned(),
            _ => Path::new(&self.filename)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.filename.clone()),
        }
    }
}

/// The ordered contents of an order file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Read and parse the order file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse order file contents.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut entries = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let (filename, title) = match line.split_once('|') {
                Some((filename, title)) => (filename.trim(), Some(title.trim())),
                None => (line, None),
            };
            if filename.is_empty() {
                return Err(ManifestError::MissingFilename { line: index + 1 });
            }

            entries.push(ManifestEntry {
                filename: filename.to_owned(),
                title: title.map(str::to_owned),
            });
        }

        if entries.is_empty() {
            return Err(ManifestError::Empty);
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
