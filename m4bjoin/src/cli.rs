use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub const PROBE_FFPROBE: &str = "ffprobe";
pub const PROBE_SYMPHONIA: &str = "symphonia";

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Join MP3 files into a chapterized M4B (MP4) file without re-encoding")
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(
            "The order file lists one file per line as `filename` or \
             `filename|Chapter Title`. Chapters without a title are named \
             after the file.",
        )
        .arg(
            Arg::new("input_dir")
                .value_name("INPUT_DIR")
                .help("Directory containing the MP3 files")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("order_file")
                .value_name("ORDER_FILE")
                .help("Text file specifying the order of files (filename|Chapter Title)")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output_file")
                .value_name("OUTPUT_FILE")
                .help("Output .m4b file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cover")
                .long("cover")
                .value_name("IMAGE")
                .help("Path to a cover image (jpg/png) to embed")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .help("Allow replacing an existing output file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the chapter layout without writing the output file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("probe")
                .long("probe")
                .value_name("BACKEND")
                .help("How to read sample rate, channels and duration of the inputs")
                .value_parser([PROBE_FFPROBE, PROBE_SYMPHONIA])
                .default_value(PROBE_FFPROBE),
        )
        .arg(
            Arg::new("ffmpeg")
                .long("ffmpeg")
                .value_name("PATH")
                .env("M4BJOIN_FFMPEG")
                .help("ffmpeg executable to use instead of searching PATH")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("ffprobe")
                .long("ffprobe")
                .value_name("PATH")
                .env("M4BJOIN_FFPROBE")
                .help("ffprobe executable to use instead of searching PATH")
                .value_parser(value_parser!(PathBuf)),
        )
}
