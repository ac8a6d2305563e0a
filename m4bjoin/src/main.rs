mod cli;

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use indicatif::{HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::debug;
use m4bjoin_core::tools::{resolve_tool, verify_tool, INSTALL_HELP};
use m4bjoin_core::{
    format_timestamp, plan, run_with_progress, Config, FfmpegMuxer, FfprobeProbe, JoinPlan,
    MediaProbe, ProgressEvent, SymphoniaProbe, ToolError,
};

use crate::cli::{build_cli, PROBE_SYMPHONIA};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Locate and health-check an external tool, attaching install help on failure.
fn locate_tool(name: &str, override_path: Option<&PathBuf>) -> anyhow::Result<PathBuf> {
    let search_path = env::var_os("PATH");
    let checked = resolve_tool(name, override_path.map(PathBuf::as_path), search_path.as_deref())
        .and_then(|path| verify_tool(&path).map(|()| path));
    match checked {
        Ok(path) => {
            debug!("using {name} at {}", path.display());
            Ok(path)
        }
        Err(err @ (ToolError::NotFound { .. } | ToolError::Broken { .. })) => {
            Err(anyhow::Error::new(err).context(format!("{name} is unavailable\n{INSTALL_HELP}")))
        }
        Err(err) => Err(err.into()),
    }
}

fn print_plan(plan: &JoinPlan, output: &Path) {
    if plan.chapters.is_empty() {
        println!("Dry run: no chapters would be generated.");
        return;
    }

    println!(
        "Dry run: would join {} file(s) into '{}' ({}):",
        plan.chapters.len(),
        output.display(),
        format_timestamp(plan.total_duration())
    );
    for chapter in &plan.chapters {
        println!(
            "  [{} - {}] {} ({})",
            format_timestamp(chapter.start),
            format_timestamp(chapter.end),
            chapter.title,
            chapter.filename
        );
    }
    for name in &plan.skipped {
        println!("  skipped missing file: {name}");
    }
}

fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let input_dir = matches
        .get_one::<PathBuf>("input_dir")
        .expect("required argument");
    let order_file = matches
        .get_one::<PathBuf>("order_file")
        .expect("required argument");
    let output_file = matches
        .get_one::<PathBuf>("output_file")
        .expect("required argument");
    let cover = matches.get_one::<PathBuf>("cover");
    let overwrite = matches.get_flag("overwrite");
    let dry_run = matches.get_flag("dry-run");
    let use_symphonia = matches
        .get_one::<String>("probe")
        .is_some_and(|backend| backend == PROBE_SYMPHONIA);

    let config = Config::builder(input_dir, order_file, output_file)
        .cover(cover)
        .overwrite(overwrite)
        .build()
        .context("invalid arguments")?;

    let probe: Box<dyn MediaProbe> = if use_symphonia {
        Box::new(SymphoniaProbe)
    } else {
        let ffprobe = locate_tool("ffprobe", matches.get_one::<PathBuf>("ffprobe"))?;
        Box::new(FfprobeProbe::new(ffprobe))
    };

    if dry_run {
        let plan = plan(&config, &probe)
            .with_context(|| format!("failed to analyze '{}'", order_file.display()))?;
        print_plan(&plan, output_file);
        return Ok(());
    }

    let muxer = FfmpegMuxer::new(locate_tool("ffmpeg", matches.get_one::<PathBuf>("ffmpeg"))?);

    println!("Reading order file and analyzing audio files...");
    if let Some(cover) = cover {
        println!("Embedding cover image: {}", cover.display());
    }

    let progress = ProgressBar::new(0);
    progress.set_draw_target(ProgressDrawTarget::stderr());
    let bar_style = ProgressStyle::with_template("Processing: {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    let spinner_style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    let progress_handle = progress.clone();
    let result = run_with_progress(&config, &probe, &muxer, move |event| match event {
        ProgressEvent::Start { total_files } => {
            progress_handle.set_style(bar_style.clone());
            progress_handle.set_length(total_files as u64);
        }
        ProgressEvent::Analyzed {
            completed,
            filename,
        } => {
            progress_handle.set_position(completed as u64);
            progress_handle.set_message(filename);
        }
        ProgressEvent::Skipped {
            completed,
            filename,
        } => {
            progress_handle.set_position(completed as u64);
            let warning =
                format!("Warning: file '{filename}' not found in input directory. Skipping.");
            if progress_handle.is_hidden() {
                eprintln!("{warning}");
            } else {
                progress_handle.println(warning);
            }
        }
        ProgressEvent::Merging { chapters } => {
            progress_handle.set_style(spinner_style.clone());
            progress_handle.enable_steady_tick(Duration::from_millis(100));
            progress_handle.set_message(format!("Joining {chapters} chapter(s)..."));
        }
        ProgressEvent::Finish => {
            progress_handle.set_message("Completed");
        }
    })
    .with_context(|| format!("failed to create '{}'", output_file.display()));

    progress.finish_and_clear();
    let plan = result?;

    println!(
        "Success! Output saved to: {} ({} chapter(s), {})",
        output_file.display(),
        plan.chapters.len(),
        HumanDuration(plan.total_duration())
    );

    Ok(())
}
