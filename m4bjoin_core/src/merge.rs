//! Lossless concatenation into an M4B container.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::chapters::{render_ffmetadata, ChapterEntry};
use crate::error::MergeError;

/// Everything a muxer needs to produce the final container.
#[derive(Clone, Copy, Debug)]
pub struct MuxRequest<'a> {
    /// Input files, in playback order.
    pub inputs: &'a [PathBuf],
    /// One chapter per input.
    pub chapters: &'a [ChapterEntry],
    /// Optional cover image embedded as attached picture.
    pub cover: Option<&'a Path>,
    /// Destination of the container.
    pub output: &'a Path,
}

/// Capability to stream-copy inputs into a chaptered container.
pub trait Muxer {
    fn mux(&self, request: &MuxRequest<'_>) -> Result<(), MergeError>;
}

impl<T: Muxer + ?Sized> Muxer for &T {
    fn mux(&self, request: &MuxRequest<'_>) -> Result<(), MergeError> {
        (**self).mux(request)
    }
}

impl<T: Muxer + ?Sized> Muxer for Box<T> {
    fn mux(&self, request: &MuxRequest<'_>) -> Result<(), MergeError> {
        (**self).mux(request)
    }
}

/// Muxer backed by an external `ffmpeg` binary using the concat demuxer.
#[derive(Clone, Debug)]
pub struct FfmpegMuxer {
    program: PathBuf,
}

impl FfmpegMuxer {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Muxer for FfmpegMuxer {
    fn mux(&self, request: &MuxRequest<'_>) -> Result<(), MergeError> {
        // Removed on drop, whether ffmpeg succeeds or not.
        let scratch = tempfile::Builder::new()
            .prefix("m4bjoin-")
            .tempdir()
            .map_err(MergeError::Scratch)?;
        let list_path = scratch.path().join("files_to_concat.txt");
        let metadata_path = scratch.path().join("metadata.txt");

        fs::write(&list_path, concat_list(request.inputs)).map_err(MergeError::Scratch)?;
        fs::write(&metadata_path, render_ffmetadata(request.chapters))
            .map_err(MergeError::Scratch)?;

        let args = ffmpeg_args(&list_path, &metadata_path, request.cover, request.output);
        debug!("spawning {} with {:?}", self.program.display(), args);
        info!(
            "joining {} file(s) into '{}'",
            request.inputs.len(),
            request.output.display()
        );

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| MergeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(MergeError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

/// Render the concat demuxer input list for `inputs`.
pub fn concat_list(inputs: &[PathBuf]) -> String {
    let mut list = String::new();
    for input in inputs {
        let mut path = input.to_string_lossy().into_owned();
        if cfg!(windows) {
            path = path.replace('\\', "/");
        }
        list.push_str("file '");
        list.push_str(&path.replace('\'', r"'\''"));
        list.push_str("'\n");
    }
    list
}

/// Build the ffmpeg argument vector: concat list as input 0, chapter
/// metadata as input 1, optional cover art as input 2.
pub fn ffmpeg_args(
    list: &Path,
    metadata: &Path,
    cover: Option<&Path>,
    output: &Path,
) -> Vec<OsString> {
    let mut args = words(&["-nostdin", "-v", "error", "-f", "concat", "-safe", "0"]);
    for input in [Some(list), Some(metadata), cover].into_iter().flatten() {
        args.push(OsString::from("-i"));
        args.push(input.as_os_str().to_owned());
    }

    args.extend(words(&[
        "-map_metadata",
        "1",
        "-map_chapters",
        "1",
        "-map",
        "0:a",
        "-c",
        "copy",
    ]));
    if cover.is_some() {
        args.extend(words(&[
            "-map",
            "2:v",
            "-c:v",
            "copy",
            "-disposition:v:0",
            "attached_pic",
            "-metadata:s:v",
            "title=Album cover",
            "-metadata:s:v",
            "comment=Cover (front)",
        ]));
    }
    args.extend(words(&["-f", "mp4", "-y"]));
    args.push(output.as_os_str().to_owned());
    args
}

fn words(values: &[&str]) -> Vec<OsString> {
    values.iter().map(|value| OsString::from(*value)).collect()
}
