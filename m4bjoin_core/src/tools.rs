//! Locating and sanity-checking the external ffmpeg tools.
//!
//! Nothing here reads the process environment; callers pass the search path
//! (usually the value of `PATH`) explicitly.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::error::ToolError;

/// Installation hint shown when ffmpeg or ffprobe cannot be used.
pub const INSTALL_HELP: &str = "\
Please install ffmpeg (static build) and ensure the executables are in PATH.
  - Windows: https://www.gyan.dev/ffmpeg/builds/ (ffmpeg-git-full.7z)
  - Linux: sudo apt install ffmpeg
  - macOS: brew install ffmpeg";

/// Resolve the executable for `name`.
///
/// An explicit `override_path` wins and must point to an existing file.
/// Otherwise every directory of `search_path` is tried in order.
pub fn resolve_tool(
    name: &str,
    override_path: Option<&Path>,
    search_path: Option<&OsStr>,
) -> Result<PathBuf, ToolError> {
    if let Some(path) = override_path {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(ToolError::MissingOverride(path.to_path_buf()))
        };
    }

    search_path
        .and_then(|paths| find_in_path(name, paths))
        .ok_or_else(|| ToolError::NotFound {
            name: name.to_owned(),
        })
}

/// Scan a `PATH`-style list of directories for `name`.
pub fn find_in_path(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_path) {
        let full = dir.join(name);
        if full.is_file() {
            return Some(full);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{name}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

/// Run `<tool> -version` to catch binaries that exist but cannot start,
/// such as shared builds with missing libraries.
pub fn verify_tool(path: &Path) -> Result<(), ToolError> {
    let broken = |source| ToolError::Broken {
        path: path.to_path_buf(),
        source,
    };

    let status = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(broken)?;

    if !status.success() {
        return Err(broken(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("'-version' exited with {status}"),
        )));
    }

    debug!("verified {}", path.display());
    Ok(())
}
