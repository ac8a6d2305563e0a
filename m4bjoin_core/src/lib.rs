//! Join MP3 files into a single chaptered M4B container without re-encoding.
//!
//! The pipeline reads an order file, probes every listed input, refuses to
//! continue unless all inputs share sample rate and channel count, lays out
//! one chapter per input and finally hands everything to a [`Muxer`] that
//! stream-copies the audio into the output container.

pub mod chapters;
pub mod error;
pub mod manifest;
pub mod merge;
pub mod probe;
pub mod tools;
pub mod validate;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};

pub use chapters::{build_chapters, format_timestamp, render_ffmetadata, ChapterEntry};
pub use error::{
    JoinError, ManifestError, MergeError, Parameter, ParameterMismatchError, ProbeError, ToolError,
};
pub use manifest::{Manifest, ManifestEntry};
pub use merge::{FfmpegMuxer, MuxRequest, Muxer};
pub use probe::{AudioInfo, AudioParameters, FfprobeProbe, MediaProbe, SymphoniaProbe};
pub use validate::validate_parameters;

/// Configuration for a join operation.
#[derive(Clone, Debug)]
pub struct Config {
    /// Canonicalized directory the order file's names are relative to.
    pub input_dir: PathBuf,
    /// Path of the order file.
    pub order_file: PathBuf,
    /// Destination container.
    pub output_file: PathBuf,
    /// Optional cover image embedded into the container.
    pub cover: Option<PathBuf>,
    /// Whether an existing output file may be replaced.
    pub overwrite: bool,
}

impl Config {
    /// Construct a new [`Config`] with default options.
    pub fn new<P, Q, R>(input_dir: P, order_file: Q, output_file: R) -> Result<Self, JoinError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        Self::builder(input_dir, order_file, output_file).build()
    }

    /// Start building a [`Config`] with optional settings.
    pub fn builder<P, Q, R>(input_dir: P, order_file: Q, output_file: R) -> ConfigBuilder
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        ConfigBuilder {
            input_dir: input_dir.as_ref().to_path_buf(),
            order_file: order_file.as_ref().to_path_buf(),
            output_file: output_file.as_ref().to_path_buf(),
            cover: None,
            overwrite: false,
        }
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    input_dir: PathBuf,
    order_file: PathBuf,
    output_file: PathBuf,
    cover: Option<PathBuf>,
    overwrite: bool,
}

impl ConfigBuilder {
    /// Embed the image at `path` as cover art.
    pub fn cover<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        self.cover = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Allow replacing an existing output file.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Validate the paths and produce a [`Config`].
    pub fn build(self) -> Result<Config, JoinError> {
        if !self.input_dir.is_dir() {
            return Err(JoinError::MissingInputDirectory(self.input_dir));
        }
        let input_dir = fs::canonicalize(&self.input_dir)?;

        if let Some(cover) = &self.cover {
            if !cover.is_file() {
                return Err(JoinError::MissingCover(cover.clone()));
            }
        }

        Ok(Config {
            input_dir,
            order_file: self.order_file,
            output_file: self.output_file,
            cover: self.cover,
            overwrite: self.overwrite,
        })
    }
}

/// Progress notifications emitted while joining.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The order file was read; `total_files` entries will be analyzed.
    Start { total_files: usize },
    /// One entry was probed successfully.
    Analyzed { completed: usize, filename: String },
    /// An entry was skipped because its file does not exist.
    Skipped { completed: usize, filename: String },
    /// All inputs passed validation and muxing is about to start.
    Merging { chapters: usize },
    /// The output file is in place.
    Finish,
}

/// The validated outcome of analyzing an order file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinPlan {
    /// Absolute input paths, in playback order.
    pub inputs: Vec<PathBuf>,
    /// One chapter per input.
    pub chapters: Vec<ChapterEntry>,
    /// Manifest file names that were not found and left out.
    pub skipped: Vec<String>,
}

impl JoinPlan {
    /// Length of the joined audio.
    pub fn total_duration(&self) -> Duration {
        self.chapters
            .last()
            .map(|chapter| chapter.end)
            .unwrap_or(Duration::ZERO)
    }

    /// Chapter metadata in the format handed to the muxer.
    pub fn metadata(&self) -> String {
        render_ffmetadata(&self.chapters)
    }
}

/// Analyze the order file without producing any output.
pub fn plan<P>(config: &Config, probe: &P) -> Result<JoinPlan, JoinError>
where
    P: MediaProbe + ?Sized,
{
    plan_with_progress(config, probe, |_| {})
}

/// Analyze the order file, reporting progress through `on_event`.
pub fn plan_with_progress<P, F>(
    config: &Config,
    probe: &P,
    mut on_event: F,
) -> Result<JoinPlan, JoinError>
where
    P: MediaProbe + ?Sized,
    F: FnMut(ProgressEvent),
{
    analyze(config, probe, &mut on_event)
}

/// Join the inputs listed in the order file into `config.output_file`.
pub fn run<P, M>(config: &Config, probe: &P, muxer: &M) -> Result<JoinPlan, JoinError>
where
    P: MediaProbe + ?Sized,
    M: Muxer + ?Sized,
{
    run_with_progress(config, probe, muxer, |_| {})
}

/// Join the inputs, reporting progress through `on_event`.
///
/// The muxer writes into a temporary file next to the output which is only
/// renamed into place once muxing succeeded, so a failed run never leaves a
/// partial output behind.
pub fn run_with_progress<P, M, F>(
    config: &Config,
    probe: &P,
    muxer: &M,
    mut on_event: F,
) -> Result<JoinPlan, JoinError>
where
    P: MediaProbe + ?Sized,
    M: Muxer + ?Sized,
    F: FnMut(ProgressEvent),
{
    let output = &config.output_file;
    if !config.overwrite && output.exists() {
        return Err(JoinError::OutputExists(output.clone()));
    }

    let plan = analyze(config, probe, &mut on_event)?;

    let staging_error = |source| JoinError::Staging {
        path: output.clone(),
        source,
    };
    let output_dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    builder.prefix(".m4bjoin-").suffix(".m4b");
    // Same creation mode as `File::create`, so the process umask applies.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let staged = builder
        .tempfile_in(output_dir)
        .map_err(staging_error)?
        .into_temp_path();

    on_event(ProgressEvent::Merging {
        chapters: plan.chapters.len(),
    });
    muxer.mux(&MuxRequest {
        inputs: &plan.inputs,
        chapters: &plan.chapters,
        cover: config.cover.as_deref(),
        output: &staged,
    })?;

    // Without --overwrite, a file that appeared while muxing is left alone.
    let persisted = if config.overwrite {
        staged.persist(output)
    } else {
        staged.persist_noclobber(output)
    };
    persisted.map_err(|err| match err.error.kind() {
        io::ErrorKind::AlreadyExists if !config.overwrite => {
            JoinError::OutputExists(output.clone())
        }
        _ => staging_error(err.error),
    })?;
    info!("wrote '{}'", output.display());
    on_event(ProgressEvent::Finish);

    Ok(plan)
}

fn analyze<P>(
    config: &Config,
    probe: &P,
    on_event: &mut dyn FnMut(ProgressEvent),
) -> Result<JoinPlan, JoinError>
where
    P: MediaProbe + ?Sized,
{
    let manifest = Manifest::from_path(&config.order_file)?;
    info!("order file lists {} file(s)", manifest.len());
    on_event(ProgressEvent::Start {
        total_files: manifest.len(),
    });

    let mut found = Vec::with_capacity(manifest.len());
    let mut skipped = Vec::new();

    for (index, entry) in manifest.entries().iter().enumerate() {
        let path = config.input_dir.join(&entry.filename);
        if !path.is_file() {
            info!(
                "file '{}' not found in input directory, skipping",
                entry.filename
            );
            skipped.push(entry.filename.clone());
            on_event(ProgressEvent::Skipped {
                completed: index + 1,
                filename: entry.filename.clone(),
            });
            continue;
        }

        debug!("analyzing {}", entry.filename);
        let info = probe.probe(&path)?;
        debug!(
            "  duration: {:?}, rate: {} Hz, channels: {}",
            info.duration, info.parameters.sample_rate, info.parameters.channels
        );

        found.push((entry, path, info));
        on_event(ProgressEvent::Analyzed {
            completed: index + 1,
            filename: entry.filename.clone(),
        });
    }

    if found.is_empty() {
        return Err(JoinError::NoInputs);
    }

    let parameters: Vec<_> = found
        .iter()
        .map(|(entry, _, info)| (entry.filename.as_str(), info.parameters))
        .collect();
    validate_parameters(&parameters)?;
    if let Some((_, reference)) = parameters.first() {
        debug!(
            "all inputs share {} Hz, {} channel(s)",
            reference.sample_rate, reference.channels
        );
    }

    let chapters = build_chapters(found.iter().map(|(entry, _, info)| (*entry, info.duration)));
    let inputs = found.into_iter().map(|(_, path, _)| path).collect();

    Ok(JoinPlan {
        inputs,
        chapters,
        skipped,
    })
}
