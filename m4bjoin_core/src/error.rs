use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while reading the order file.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The order file could not be opened or is not valid UTF-8.
    #[error("failed to read order file '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The order file contains no usable entries.
    #[error("order file does not list any files")]
    Empty,

    /// A line carries a title but no file name, e.g. `|Intro`.
    #[error("line {line} of the order file has no file name")]
    MissingFilename { line: usize },
}

/// Errors produced while inspecting a single input file.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The probing tool could not be started.
    #[error("failed to run '{}'", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The probing tool ran but reported failure.
    #[error("probing '{}' failed ({status}): {stderr}", .path.display())]
    Failed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    /// The probe output could not be interpreted.
    #[error("could not parse audio information for '{}': {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    /// The file does not contain an audio stream.
    #[error("no audio stream found in '{}'", .0.display())]
    NoAudioStream(PathBuf),

    /// The file could not be opened for in-process probing.
    #[error("failed to open '{}'", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Wrapper around errors produced by the Symphonia demuxers.
    #[error("failed to read '{}'", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: symphonia::core::errors::Error,
    },
}

/// Audio parameter compared across all inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameter {
    SampleRate,
    Channels,
}

impl Parameter {
    /// Render a value of this parameter with its unit.
    pub fn describe(self, value: u32) -> String {
        match self {
            Parameter::SampleRate => format!("{value} Hz"),
            Parameter::Channels if value == 1 => "1 channel".to_owned(),
            Parameter::Channels => format!("{value} channels"),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::SampleRate => f.write_str("sample rate"),
            Parameter::Channels => f.write_str("channel count"),
        }
    }
}

/// An input whose audio parameters differ from the first input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{parameter} mismatch in '{file}': expected {}, found {}",
    .parameter.describe(*.expected),
    .parameter.describe(*.actual)
)]
pub struct ParameterMismatchError {
    pub file: String,
    pub parameter: Parameter,
    pub expected: u32,
    pub actual: u32,
}

/// Errors produced while muxing the final container.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The mux tool could not be started.
    #[error("failed to run '{}'", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The mux tool exited unsuccessfully; `stderr` is its output verbatim.
    #[error("'{}' exited with {status}:\n{stderr}", .program.display())]
    Failed {
        program: PathBuf,
        status: String,
        stderr: String,
    },

    /// The concat list or chapter metadata could not be written.
    #[error("failed to write merge scratch files")]
    Scratch(#[source] io::Error),
}

/// Errors produced while locating or checking external tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool is not on the search path and no explicit path was given.
    #[error("'{name}' not found in the search path")]
    NotFound { name: String },

    /// An explicitly configured tool path does not point to a file.
    #[error("'{}' does not exist", .0.display())]
    MissingOverride(PathBuf),

    /// The tool was found but does not run.
    #[error("'{}' was found but failed to run", .path.display())]
    Broken {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Top-level error returned by the join pipeline.
#[derive(Debug, Error)]
pub enum JoinError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    ParameterMismatch(#[from] ParameterMismatchError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The input directory does not exist.
    #[error("input directory '{}' does not exist", .0.display())]
    MissingInputDirectory(PathBuf),

    /// The cover image does not exist.
    #[error("cover image '{}' not found", .0.display())]
    MissingCover(PathBuf),

    /// The output file exists and overwriting was not requested.
    #[error("output file '{}' already exists (use --overwrite to replace it)", .0.display())]
    OutputExists(PathBuf),

    /// Every manifest entry was skipped.
    #[error("no valid input files found to process")]
    NoInputs,

    /// The staged output file could not be created or moved into place.
    #[error("failed to stage output file '{}'", .path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Wrapper around IO errors encountered while resolving paths.
    #[error(transparent)]
    Io(#[from] io::Error),
}
